use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::App;

use super::{bold, dim, legend, phase_color, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

pub fn render_session(app: &App, f: &mut Frame) {
    let Some(session) = app.session() else {
        return;
    };
    let view = session.view();

    let area = f.area();
    let body_height = 7;
    let padding = area.height.saturating_sub(body_height + 3 + VERTICAL_MARGIN * 2) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // phase
            Constraint::Length(1),
            Constraint::Length(1), // countdown
            Constraint::Length(1),
            Constraint::Length(1), // progress
            Constraint::Length(1), // status
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3), // legend
        ])
        .split(area);

    let phase = Paragraph::new(Span::styled(
        format!("{} Time", view.phase),
        bold().fg(phase_color(view.phase)),
    ))
    .alignment(Alignment::Center);
    f.render_widget(phase, chunks[1]);

    let countdown = Paragraph::new(Span::styled(view.countdown.clone(), bold()))
        .alignment(Alignment::Center);
    f.render_widget(countdown, chunks[3]);

    let progress = Paragraph::new(Span::styled(view.progress.label(), dim()))
        .alignment(Alignment::Center);
    f.render_widget(progress, chunks[5]);

    let status = if view.running {
        Line::from(Span::styled(
            format!("started {}", session.started_at().format("%H:%M")),
            dim(),
        ))
    } else {
        Line::from(Span::styled(
            "PAUSED",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
    };
    f.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[6]);

    let toggle = if view.running { "pause" } else { "resume" };
    let instructions = Paragraph::new(format!(
        "(space) {} | (s)top | (ctrl+c) quit",
        toggle
    ))
    .block(Block::default().borders(Borders::ALL))
    .style(legend())
    .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[9]);
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::config::Config;
    use crate::form::{SetupForm, TimeUnit};
    use crate::notify::{BellNotifier, Notifier};
    use crate::runtime::{ManualTicker, TickSource};
    use crate::session::SessionMode;
    use crate::ui::render_to_string;

    fn running_app(mode: SessionMode) -> App {
        let form = SetupForm {
            mode,
            unit: TimeUnit::Seconds,
            total: "90".into(),
            cycles: "3".into(),
            work: "75".into(),
            rest: "15".into(),
            ..SetupForm::default()
        };
        let mut app = App::new(
            form,
            Config::default(),
            Box::new(|| Box::new(ManualTicker::new()) as Box<dyn TickSource>),
            Box::new(|| Box::new(BellNotifier) as Box<dyn Notifier>),
        );
        app.start_session().unwrap();
        app
    }

    #[test]
    fn renders_duration_session() {
        let mut app = running_app(SessionMode::Duration);
        let id = app.current_tick().unwrap();
        app.on_tick(id);

        let screen = render_to_string(&app, 80, 24);
        assert!(screen.contains("Work Time"));
        assert!(screen.contains("01:14"));
        assert!(screen.contains("Elapsed: 00:01 / 01:30"));
        assert!(screen.contains("(space) pause"));
    }

    #[test]
    fn renders_cycles_session_and_pause_marker() {
        let mut app = running_app(SessionMode::Cycles);
        app.on_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char(' '),
            crossterm::event::KeyModifiers::NONE,
        ));

        let screen = render_to_string(&app, 80, 24);
        assert!(screen.contains("Cycle: 0 / 3"));
        assert!(screen.contains("PAUSED"));
        assert!(screen.contains("(space) resume"));
    }
}
