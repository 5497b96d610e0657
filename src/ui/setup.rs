use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::{
    form::{Field, SetupForm, TimeUnit},
    session::{SessionMode, SessionOutcome},
    App,
};

use super::{bold, dim, legend, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

const LABEL_WIDTH: usize = 28;

fn label(form: &SetupForm, field: Field) -> String {
    let unit = match form.unit {
        TimeUnit::Minutes => "minutes",
        TimeUnit::Seconds => "seconds",
    };
    match field {
        Field::Mode => "Mode".to_string(),
        Field::Unit => "Time Unit".to_string(),
        Field::Total => format!("Total Duration ({})", unit),
        Field::Cycles => "Number of Cycles".to_string(),
        Field::Work => format!("Work Interval ({})", unit),
        Field::Rest => format!("Rest Interval ({})", unit),
    }
}

fn selector<'a>(options: [&'a str; 2], active: usize, focused: bool) -> Vec<Span<'a>> {
    let active_style = if focused {
        bold().fg(Color::Black).bg(Color::Cyan)
    } else {
        bold().fg(Color::Cyan)
    };

    let mut spans = Vec::new();
    for (idx, option) in options.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        if idx == active {
            spans.push(Span::styled(format!("[{}]", option), active_style));
        } else {
            spans.push(Span::styled(format!(" {} ", option), dim()));
        }
    }
    spans
}

fn field_line<'a>(form: &'a SetupForm, field: Field) -> Line<'a> {
    let focused = form.focus == field;
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused { bold() } else { Style::default() };

    let mut spans = vec![
        Span::styled(marker, bold().fg(Color::Cyan)),
        Span::styled(
            format!("{:<width$}", label(form, field), width = LABEL_WIDTH),
            label_style,
        ),
    ];

    match field {
        Field::Mode => {
            let active = match form.mode {
                SessionMode::Duration => 0,
                SessionMode::Cycles => 1,
            };
            spans.extend(selector(["Duration", "Cycles"], active, focused));
        }
        Field::Unit => {
            let active = match form.unit {
                TimeUnit::Minutes => 0,
                TimeUnit::Seconds => 1,
            };
            spans.extend(selector(["Minutes", "Seconds"], active, focused));
        }
        _ => {
            let value = form.entry(field).unwrap_or_default();
            let has_error = form.error(field).is_some();
            let mut style = bold();
            if has_error {
                style = style.fg(Color::Red);
            }
            if focused {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            let shown = if value.is_empty() { " " } else { value };
            spans.push(Span::styled(shown.to_string(), style));
            if focused {
                spans.push(Span::styled("_", dim()));
            }
            if let Some(msg) = form.error(field) {
                spans.push(Span::styled(format!("  {}", msg), Style::default().fg(Color::Red)));
            }
        }
    }

    Line::from(spans)
}

fn last_session_line(app: &App) -> Line<'static> {
    match app.last_session {
        Some(last) => {
            let (text, color) = match last.outcome {
                SessionOutcome::Completed => ("Last session completed", Color::Green),
                SessionOutcome::Stopped => ("Last session stopped", Color::Yellow),
            };
            Line::from(vec![
                Span::styled(text, Style::default().fg(color)),
                Span::styled(format!(" at {}", last.ended_at.format("%H:%M")), dim()),
            ])
        }
        None => Line::from(""),
    }
}

pub fn render_setup(app: &App, f: &mut Frame) {
    let form = &app.form;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(7),    // fields
            Constraint::Length(1), // last session
            Constraint::Length(3), // legend
        ])
        .split(f.area());

    let title = Paragraph::new("Setup Your Timer")
        .block(Block::default().borders(Borders::ALL).title("cadence"))
        .style(bold().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let mut lines = vec![Line::from("")];
    for field in form.fields() {
        lines.push(field_line(form, field));
        lines.push(Line::from(""));
    }
    f.render_widget(Paragraph::new(lines), chunks[1]);

    f.render_widget(
        Paragraph::new(last_session_line(app)).alignment(Alignment::Center),
        chunks[2],
    );

    let start_hint = if form.is_submittable() {
        Span::styled("(enter) start", bold().fg(Color::Green))
    } else {
        Span::styled("(enter) start", dim())
    };
    let instructions = Paragraph::new(Line::from(vec![
        start_hint,
        Span::styled(
            " | ↑/↓ move | ←/→ (space) toggle | 0-9 edit | (esc)ape",
            legend(),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[3]);
}
