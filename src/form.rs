use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::session::{SessionConfig, SessionMode};

const MAX_DIGITS: usize = 6;
pub const POSITIVE_REQUIRED: &str = "Must be greater than 0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub fn to_secs(self, value: u64) -> u64 {
        match self {
            TimeUnit::Minutes => value.saturating_mul(60),
            TimeUnit::Seconds => value,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TimeUnit::Minutes => TimeUnit::Seconds,
            TimeUnit::Seconds => TimeUnit::Minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum Field {
    Mode,
    Unit,
    Total,
    Cycles,
    Work,
    Rest,
}

/// Per-field validation failures. The form refuses to produce a config
/// while any are present.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid session settings: {}", summarize(.errors))]
pub struct FormError {
    pub errors: BTreeMap<Field, &'static str>,
}

/// The setup form: selectors plus the raw text of each numeric entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupForm {
    pub mode: SessionMode,
    pub unit: TimeUnit,
    pub total: String,
    pub cycles: String,
    pub work: String,
    pub rest: String,
    pub focus: Field,
    pub errors: BTreeMap<Field, &'static str>,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SetupForm {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            mode: cfg.mode,
            unit: cfg.unit,
            total: cfg.total.to_string(),
            cycles: cfg.cycles.to_string(),
            work: cfg.work.to_string(),
            rest: cfg.rest.to_string(),
            focus: Field::Mode,
            errors: BTreeMap::new(),
        }
    }

    /// Writes the entries back into `cfg`. Entries that do not parse keep the
    /// previously stored value.
    pub fn apply_to(&self, cfg: &mut Config) {
        cfg.mode = self.mode;
        cfg.unit = self.unit;
        if let Some(v) = parse_positive(&self.total) {
            cfg.total = v;
        }
        if let Some(v) = parse_positive(&self.cycles) {
            cfg.cycles = v;
        }
        if let Some(v) = parse_positive(&self.work) {
            cfg.work = v;
        }
        if let Some(v) = parse_positive(&self.rest) {
            cfg.rest = v;
        }
    }

    /// Fields in display order. Only one of Total/Cycles is shown.
    pub fn fields(&self) -> [Field; 5] {
        let goal = match self.mode {
            SessionMode::Duration => Field::Total,
            SessionMode::Cycles => Field::Cycles,
        };
        [Field::Mode, Field::Unit, goal, Field::Work, Field::Rest]
    }

    fn focus_index(&self) -> usize {
        self.fields()
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or(0)
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        self.focus = fields[(self.focus_index() + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        self.focus = fields[(self.focus_index() + fields.len() - 1) % fields.len()];
    }

    /// Flips the focused selector. No effect on numeric fields.
    pub fn toggle(&mut self) {
        match self.focus {
            Field::Mode => {
                self.mode = match self.mode {
                    SessionMode::Duration => SessionMode::Cycles,
                    SessionMode::Cycles => SessionMode::Duration,
                };
                self.errors.remove(&Field::Total);
                self.errors.remove(&Field::Cycles);
            }
            Field::Unit => self.unit = self.unit.toggled(),
            _ => {}
        }
    }

    pub fn entry(&self, field: Field) -> Option<&str> {
        match field {
            Field::Total => Some(&self.total),
            Field::Cycles => Some(&self.cycles),
            Field::Work => Some(&self.work),
            Field::Rest => Some(&self.rest),
            Field::Mode | Field::Unit => None,
        }
    }

    fn entry_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Total => Some(&mut self.total),
            Field::Cycles => Some(&mut self.cycles),
            Field::Work => Some(&mut self.work),
            Field::Rest => Some(&mut self.rest),
            Field::Mode | Field::Unit => None,
        }
    }

    pub fn push_digit(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        let focus = self.focus;
        if let Some(entry) = self.entry_mut(focus) {
            if entry.len() < MAX_DIGITS {
                entry.push(c);
            }
            self.errors.remove(&focus);
        }
    }

    pub fn backspace(&mut self) {
        let focus = self.focus;
        if let Some(entry) = self.entry_mut(focus) {
            entry.pop();
            self.errors.remove(&focus);
        }
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// Cheap pre-check for enabling the start action; `validate` is the
    /// authoritative gate.
    pub fn is_submittable(&self) -> bool {
        let goal = match self.mode {
            SessionMode::Duration => &self.total,
            SessionMode::Cycles => &self.cycles,
        };
        [goal, &self.work, &self.rest]
            .iter()
            .all(|v| parse_positive(v).is_some())
    }

    /// Checks every visible entry and converts to a session config in
    /// seconds. Errors are recorded on the form as well as returned.
    pub fn validate(&mut self) -> Result<SessionConfig, FormError> {
        self.errors.clear();
        let goal_field = self.fields()[2];

        // Check all three before bailing so every bad field gets a message.
        let goal = self.check_positive(goal_field);
        let work = self.check_positive(Field::Work);
        let rest = self.check_positive(Field::Rest);

        let (goal, work, rest) = match (goal, work, rest) {
            (Some(goal), Some(work), Some(rest)) => (goal, work, rest),
            _ => {
                return Err(FormError {
                    errors: self.errors.clone(),
                })
            }
        };

        let work_secs = self.unit.to_secs(work);
        let rest_secs = self.unit.to_secs(rest);
        Ok(match self.mode {
            SessionMode::Duration => {
                SessionConfig::duration(work_secs, rest_secs, self.unit.to_secs(goal))
            }
            SessionMode::Cycles => SessionConfig::cycles(work_secs, rest_secs, goal),
        })
    }

    fn check_positive(&mut self, field: Field) -> Option<u64> {
        let value = self.entry(field).and_then(parse_positive);
        if value.is_none() {
            self.errors.insert(field, POSITIVE_REQUIRED);
        }
        value
    }
}

fn summarize(errors: &BTreeMap<Field, &'static str>) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .join(", ")
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::session::SessionGoal;

    #[test]
    fn default_form_matches_default_config() {
        let form = SetupForm::default();
        assert_eq!(form.mode, SessionMode::Duration);
        assert_eq!(form.unit, TimeUnit::Minutes);
        assert_eq!(form.total, "30");
        assert_eq!(form.cycles, "4");
        assert_eq!(form.work, "1");
        assert_eq!(form.rest, "2");
        assert_eq!(form.focus, Field::Mode);
    }

    #[test]
    fn validate_duration_converts_minutes() {
        let mut form = SetupForm::default();
        let config = form.validate().unwrap();
        assert_eq!(config, SessionConfig::duration(60, 120, 1800));
    }

    #[test]
    fn validate_cycles_does_not_convert_count() {
        let mut form = SetupForm::default();
        form.toggle();
        assert_eq!(form.mode, SessionMode::Cycles);

        let config = form.validate().unwrap();
        assert_eq!(config.goal, SessionGoal::Cycles { max_cycles: 4 });
        assert_eq!(config.work_secs, 60);
    }

    #[test]
    fn validate_seconds_unit() {
        let mut form = SetupForm::default();
        form.focus = Field::Unit;
        form.toggle();
        assert_eq!(form.validate().unwrap(), SessionConfig::duration(1, 2, 30));
    }

    #[test]
    fn validate_reports_every_bad_field() {
        let mut form = SetupForm {
            work: "0".into(),
            rest: String::new(),
            ..SetupForm::default()
        };

        let err = form.validate().unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(form.error(Field::Work), Some(POSITIVE_REQUIRED));
        assert_eq!(form.error(Field::Rest), Some(POSITIVE_REQUIRED));
        assert_eq!(form.error(Field::Total), None);
        assert!(err.to_string().contains("Work: Must be greater than 0"));
    }

    #[test]
    fn validate_reports_all_three_entries_when_all_bad() {
        let mut form = SetupForm {
            total: "abc".into(),
            work: String::new(),
            rest: "0".into(),
            ..SetupForm::default()
        };

        let err = form.validate().unwrap_err();
        assert_eq!(
            err.errors.keys().copied().collect::<Vec<_>>(),
            vec![Field::Total, Field::Work, Field::Rest]
        );
    }

    #[test]
    fn validate_cycles_only_bad_goal_is_rejected() {
        let mut form = SetupForm {
            mode: SessionMode::Cycles,
            cycles: String::new(),
            ..SetupForm::default()
        };

        let err = form.validate().unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(form.error(Field::Cycles), Some(POSITIVE_REQUIRED));
    }

    #[test]
    fn hidden_goal_field_is_not_validated() {
        let mut form = SetupForm {
            cycles: "0".into(),
            ..SetupForm::default()
        };
        assert_matches!(form.validate(), Ok(_));

        form.toggle();
        assert_matches!(form.validate(), Err(FormError { .. }));
        assert_eq!(form.error(Field::Cycles), Some(POSITIVE_REQUIRED));
    }

    #[test]
    fn editing_clears_that_fields_error() {
        let mut form = SetupForm {
            work: "0".into(),
            ..SetupForm::default()
        };
        let _ = form.validate();
        form.focus = Field::Work;
        form.backspace();
        assert_eq!(form.error(Field::Work), None);
        form.push_digit('5');
        assert_eq!(form.work, "5");
    }

    #[test]
    fn push_digit_ignores_non_digits_and_selectors() {
        let mut form = SetupForm::default();
        form.push_digit('7');
        assert_eq!(form.mode, SessionMode::Duration);

        form.focus = Field::Total;
        form.push_digit('x');
        form.push_digit('5');
        assert_eq!(form.total, "305");

        for _ in 0..10 {
            form.push_digit('9');
        }
        assert_eq!(form.total.len(), MAX_DIGITS);
    }

    #[test]
    fn focus_cycles_through_visible_fields() {
        let mut form = SetupForm::default();
        let mut seen = vec![form.focus];
        for _ in 0..4 {
            form.focus_next();
            seen.push(form.focus);
        }
        assert_eq!(
            seen,
            vec![Field::Mode, Field::Unit, Field::Total, Field::Work, Field::Rest]
        );
        form.focus_next();
        assert_eq!(form.focus, Field::Mode);
        form.focus_prev();
        assert_eq!(form.focus, Field::Rest);
    }

    #[test]
    fn is_submittable_tracks_visible_entries() {
        let mut form = SetupForm::default();
        assert!(form.is_submittable());
        form.total = "0".into();
        assert!(!form.is_submittable());
        form.mode = SessionMode::Cycles;
        assert!(form.is_submittable());
    }

    #[test]
    fn apply_to_keeps_previous_values_for_bad_entries() {
        let mut cfg = Config::default();
        let form = SetupForm {
            mode: SessionMode::Cycles,
            cycles: "8".into(),
            work: "".into(),
            ..SetupForm::default()
        };
        form.apply_to(&mut cfg);
        assert_eq!(cfg.mode, SessionMode::Cycles);
        assert_eq!(cfg.cycles, 8);
        assert_eq!(cfg.work, Config::default().work);
    }
}
