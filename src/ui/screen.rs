use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use super::{centered, format_clock, inner, quiz::QuizScreen, results::ResultsScreen, theme::Theme};
use crate::app::{App, AppState};

/// One full-terminal view of the app
pub trait Screen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer);
}

pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let pool = app.controller.pool().len();
        let dark = if app.dark_mode() { "on" } else { "off" };
        let lines = vec![
            Line::from(Span::styled("certquiz", theme.title())),
            Line::from(Span::styled(
                format!("{pool} questions loaded"),
                theme.dim(),
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("(1) ", theme.bold()),
                Span::styled("Practice", theme.bold()),
                Span::styled("  untimed, instant feedback, every question", theme.base()),
            ]),
            Line::from(vec![
                Span::styled("(2) ", theme.bold()),
                Span::styled("Mock exam", theme.bold()),
                Span::styled("  timed, scored at the end", theme.base()),
            ]),
            Line::default(),
            Line::from(Span::styled(
                format!("(d)ark mode: {dark} / (q)uit"),
                theme.legend(),
            )),
        ];

        let height = lines.len() as u16;
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(centered(inner(area), 70, height), buf);
    }
}

pub struct InstructionsScreen;

impl Screen for InstructionsScreen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let session = app.session();
        let total = session.sequence().len();
        let minutes = session.config().mock_duration_secs / 60;
        let pass = app.controller.pass_percentage();
        let needed = (total as f64 * pass / 100.0).ceil() as usize;

        let lines = vec![
            Line::from(Span::styled("Mock exam instructions", theme.title())),
            Line::default(),
            Line::from(format!("- {total} questions, drawn at random from the bank")),
            Line::from(format!("- {minutes} minutes, shown as a countdown")),
            Line::from(format!(
                "- {pass}% to pass ({needed} of {total} points)"
            )),
            Line::from("- multi-select questions earn half a point for a correct partial answer"),
            Line::from("- confirmed answers are final and move you to the next question"),
            Line::from("- no feedback until the exam is submitted"),
            Line::from("- the exam submits itself when time runs out"),
            Line::default(),
            Line::from(Span::styled("(enter) start / (esc) back", theme.legend())),
        ];

        let height = lines.len() as u16;
        Paragraph::new(lines)
            .style(theme.base())
            .wrap(Wrap { trim: true })
            .render(centered(inner(area), 80, height), buf);
    }
}

/// The quiz stays visible behind the dialog
pub struct ConfirmSubmitScreen;

impl Screen for ConfirmSubmitScreen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
        QuizScreen.render(app, theme, area, buf);

        let session = app.session();
        let unanswered = session.sequence().len() - session.answered_count();
        let time = session.time_left().map(format_clock).unwrap_or_default();
        let lines = vec![
            Line::from(Span::styled("Submit exam?", theme.title())),
            Line::from(format!("{unanswered} unanswered, {time} left")),
            Line::from(Span::styled("(y)es / (n)o", theme.legend())),
        ];

        let dialog = centered(area, 40, 5);
        Clear.render(dialog, buf);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).style(theme.base()))
            .render(dialog, buf);
    }
}

pub struct LoadFailedScreen;

impl Screen for LoadFailedScreen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let error = app.load_error.as_deref().unwrap_or("unknown error");
        let lines = vec![
            Line::from(Span::styled("Failed to load questions", theme.bad())),
            Line::default(),
            Line::from(Span::styled(error.to_string(), theme.base())),
            Line::default(),
            Line::from(Span::styled("(r)eload / (q)uit", theme.legend())),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(centered(inner(area), 80, 8), buf);
    }
}

pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Menu => Box::new(MenuScreen),
        AppState::Instructions => Box::new(InstructionsScreen),
        AppState::Quiz => Box::new(QuizScreen),
        AppState::ConfirmSubmit => Box::new(ConfirmSubmitScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::LoadFailed => Box::new(LoadFailedScreen),
    }
}
