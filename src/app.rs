use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{Config, ConfigStore};
use crate::controller::IntervalSession;
use crate::form::{Field, FormError, SetupForm};
use crate::notify::Notifier;
use crate::runtime::{TickId, TickSource};
use crate::session::SessionOutcome;

pub type BoxedSession = IntervalSession<Box<dyn TickSource>, Box<dyn Notifier>>;
pub type TickerFactory = Box<dyn FnMut() -> Box<dyn TickSource>>;
pub type NotifierFactory = Box<dyn FnMut() -> Box<dyn Notifier>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// How and when the previous session ended, shown on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastSession {
    pub outcome: SessionOutcome,
    pub ended_at: DateTime<Local>,
}

pub struct App {
    pub form: SetupForm,
    pub state: AppState,
    pub last_session: Option<LastSession>,
    config: Config,
    store: Option<Box<dyn ConfigStore>>,
    session: Option<BoxedSession>,
    ticker_factory: TickerFactory,
    notifier_factory: NotifierFactory,
}

impl App {
    pub fn new(
        form: SetupForm,
        config: Config,
        ticker_factory: TickerFactory,
        notifier_factory: NotifierFactory,
    ) -> Self {
        Self {
            form,
            state: AppState::Setup,
            last_session: None,
            config,
            store: None,
            session: None,
            ticker_factory,
            notifier_factory,
        }
    }

    /// Persist the form to `store` every time a session starts.
    pub fn with_store(mut self, store: Box<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Option<&BoxedSession> {
        self.session.as_ref()
    }

    /// Activation id of the running session's tick source.
    pub fn current_tick(&self) -> Option<TickId> {
        self.session.as_ref().and_then(|s| s.ticker().current())
    }

    /// Validates the form and enters the session screen.
    pub fn start_session(&mut self) -> Result<(), FormError> {
        let config = match self.form.validate() {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(error = %err, "Session start rejected");
                return Err(err);
            }
        };

        self.form.apply_to(&mut self.config);
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.config) {
                tracing::warn!(error = %err, "Failed to save settings");
            }
        }

        let ticker = (self.ticker_factory)();
        let notifier = (self.notifier_factory)();
        self.session = Some(IntervalSession::new(config, ticker, notifier));
        self.state = AppState::Session;
        Ok(())
    }

    pub fn stop_session(&mut self) {
        if let Some(outcome) = self.session.as_mut().and_then(|s| s.stop()) {
            self.end_session(outcome);
        }
    }

    pub fn on_tick(&mut self, tick: TickId) {
        if let Some(outcome) = self.session.as_mut().and_then(|s| s.on_tick(tick)) {
            self.end_session(outcome);
        }
    }

    // Dropping the session releases its tick source.
    fn end_session(&mut self, outcome: SessionOutcome) {
        self.session = None;
        self.last_session = Some(LastSession {
            outcome,
            ended_at: Local::now(),
        });
        self.state = AppState::Setup;
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::Continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.stop_session();
            return AppAction::Quit;
        }

        match self.state {
            AppState::Setup => self.on_setup_key(key),
            AppState::Session => self.on_session_key(key),
        }
    }

    fn on_setup_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc => return AppAction::Quit,
            KeyCode::Up | KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => self.form.focus_next(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => self.form.toggle(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => {
                // Failures stay on the form as per-field messages.
                let _ = self.start_session();
            }
            KeyCode::Char(c) if c.is_ascii_digit() => self.form.push_digit(c),
            _ => {}
        }
        AppAction::Continue
    }

    fn on_session_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                if let Some(session) = self.session.as_mut() {
                    session.toggle();
                }
            }
            KeyCode::Char('s') | KeyCode::Esc => self.stop_session(),
            _ => {}
        }
        AppAction::Continue
    }

    pub fn focused_field(&self) -> Field {
        self.form.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfigStore;
    use crate::form::TimeUnit;
    use crate::notify::{Alert, RecordingNotifier};
    use crate::runtime::ManualTicker;
    use crate::session::{Phase, SessionMode};
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn seconds_form(total: &str, work: &str, rest: &str) -> SetupForm {
        SetupForm {
            unit: TimeUnit::Seconds,
            total: total.into(),
            work: work.into(),
            rest: rest.into(),
            ..SetupForm::default()
        }
    }

    fn test_app(form: SetupForm) -> (App, RecordingNotifier) {
        let recorder = RecordingNotifier::new();
        let handle = recorder.clone();
        let app = App::new(
            form,
            Config::default(),
            Box::new(|| Box::new(ManualTicker::new()) as Box<dyn TickSource>),
            Box::new(move || Box::new(handle.clone()) as Box<dyn Notifier>),
        );
        (app, recorder)
    }

    fn tick(app: &mut App) {
        let id = app.current_tick().expect("session should be ticking");
        app.on_tick(id);
    }

    #[test]
    fn starts_on_setup_screen() {
        let (app, _) = test_app(SetupForm::default());
        assert_eq!(app.state, AppState::Setup);
        assert!(app.session().is_none());
        assert!(app.last_session.is_none());
    }

    #[test]
    fn enter_with_invalid_form_stays_on_setup() {
        let (mut app, _) = test_app(seconds_form("0", "1", "1"));
        app.on_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::Setup);
        assert!(app.form.error(Field::Total).is_some());
        assert!(app.session().is_none());
    }

    #[test]
    fn completed_session_returns_to_setup() {
        let (mut app, recorder) = test_app(seconds_form("3", "1", "1"));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Session);

        for _ in 0..3 {
            tick(&mut app);
        }

        assert_eq!(app.state, AppState::Setup);
        assert!(app.session().is_none());
        assert_matches!(
            app.last_session,
            Some(LastSession {
                outcome: SessionOutcome::Completed,
                ..
            })
        );
        assert_matches!(recorder.alerts().last(), Some(Alert::Completed { .. }));
    }

    #[test]
    fn stop_key_returns_without_completion_alert() {
        let (mut app, recorder) = test_app(seconds_form("30", "1", "1"));
        app.on_key(key(KeyCode::Enter));
        tick(&mut app);
        app.on_key(key(KeyCode::Char('s')));

        assert_eq!(app.state, AppState::Setup);
        assert_eq!(
            app.last_session.map(|l| l.outcome),
            Some(SessionOutcome::Stopped)
        );
        assert_eq!(recorder.alerts(), vec![Alert::PhaseChanged(Phase::Rest)]);
    }

    #[test]
    fn space_pauses_and_stale_ticks_are_ignored() {
        let (mut app, _) = test_app(seconds_form("30", "5", "5"));
        app.on_key(key(KeyCode::Enter));
        let first = app.current_tick().unwrap();
        app.on_tick(first);

        app.on_key(key(KeyCode::Char(' ')));
        assert!(!app.session().unwrap().is_running());
        assert_eq!(app.current_tick(), None);
        app.on_tick(first);

        app.on_key(key(KeyCode::Char('p')));
        app.on_tick(first);
        assert_eq!(app.session().unwrap().state().elapsed_total, 1);
        tick(&mut app);
        assert_eq!(app.session().unwrap().state().elapsed_total, 2);
    }

    #[test]
    fn ctrl_c_quits_from_session() {
        let (mut app, _) = test_app(SetupForm::default());
        app.on_key(key(KeyCode::Enter));

        let action = app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(action, AppAction::Quit);
        assert!(app.session().is_none());
        assert_eq!(
            app.last_session.map(|l| l.outcome),
            Some(SessionOutcome::Stopped)
        );
    }

    #[test]
    fn esc_quits_from_setup_but_stops_in_session() {
        let (mut app, _) = test_app(SetupForm::default());
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.on_key(key(KeyCode::Esc)), AppAction::Continue);
        assert_eq!(app.state, AppState::Setup);
        assert_eq!(app.on_key(key(KeyCode::Esc)), AppAction::Quit);
    }

    #[test]
    fn setup_keys_edit_the_form() {
        let (mut app, _) = test_app(SetupForm::default());
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.form.mode, SessionMode::Cycles);

        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Down));
        assert_eq!(app.focused_field(), Field::Cycles);
        app.on_key(key(KeyCode::Backspace));
        app.on_key(key(KeyCode::Char('6')));
        assert_eq!(app.form.cycles, "6");

        app.on_key(key(KeyCode::Up));
        assert_eq!(app.focused_field(), Field::Unit);
    }

    #[test]
    fn start_persists_form_to_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let (app, _) = test_app(seconds_form("45", "10", "5"));
        let mut app = app.with_store(Box::new(FileConfigStore::with_path(&path)));

        app.start_session().unwrap();

        let saved = FileConfigStore::with_path(&path).load();
        assert_eq!(saved.unit, TimeUnit::Seconds);
        assert_eq!(saved.total, 45);
        assert_eq!(saved.work, 10);
        assert_eq!(app.config(), &saved);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _) = test_app(SetupForm::default());
        let mut release = key(KeyCode::Esc);
        release.kind = KeyEventKind::Release;
        assert_eq!(app.on_key(release), AppAction::Continue);
    }
}
