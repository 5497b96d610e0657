use ratatui::Frame;

use crate::{
    ui::{session::render_session, setup::render_setup},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Setup form: selectors, numeric entries and validation messages
pub struct SetupScreen;

impl Screen for SetupScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_setup(app, f);
    }
}

/// Running or paused session countdown
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_session(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Setup => Box::new(SetupScreen),
        AppState::Session => Box::new(SessionScreen),
    }
}
