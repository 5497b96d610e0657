use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use notify_rust::Notification;

use crate::session::{Phase, SessionGoal};
use crate::util::whole_minutes;

const APP_NAME: &str = "cadence";

/// Events the session emits toward the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// Carries the phase that just began.
    PhaseChanged(Phase),
    Completed { goal: SessionGoal },
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Alert::PhaseChanged(_) => "Time to switch!",
            Alert::Completed { .. } => "Session Complete!",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Alert::PhaseChanged(Phase::Work) => "Start working".to_string(),
            Alert::PhaseChanged(Phase::Rest) => "Take a break".to_string(),
            Alert::Completed {
                goal: SessionGoal::Cycles { max_cycles },
            } => format!("You've completed all {} cycle(s)! Great work!", max_cycles),
            Alert::Completed {
                goal: SessionGoal::Duration { total_secs },
            } => format!(
                "Your {} minute timer is finished!",
                whole_minutes(*total_secs)
            ),
        }
    }
}

/// Fire-and-forget alert sink. Delivery is never confirmed back to the session.
pub trait Notifier {
    fn notify(&mut self, alert: &Alert);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, alert: &Alert) {
        (**self).notify(alert)
    }
}

fn bell() {
    print!("\x07");
    io::stdout().flush().ok();
}

/// Desktop notification via the platform notification daemon
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&mut self, alert: &Alert) {
        let result = Notification::new()
            .appname(APP_NAME)
            .summary(alert.title())
            .body(&alert.body())
            .show();

        if let Err(err) = result {
            tracing::warn!(error = %err, title = alert.title(), "Desktop notification failed");
            bell();
        }
    }
}

/// Terminal bell only
#[derive(Debug, Default, Clone, Copy)]
pub struct BellNotifier;

impl Notifier for BellNotifier {
    fn notify(&mut self, _alert: &Alert) {
        bell();
    }
}

/// Keeps every alert in a shared list so tests can inspect them after the
/// session that produced them is gone.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    alerts: Rc<RefCell<Vec<Alert>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.alerts.borrow().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, alert: &Alert) {
        self.alerts.borrow_mut().push(*alert);
    }
}
