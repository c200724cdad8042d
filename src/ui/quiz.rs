use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::{format_clock, inner, screen::Screen, theme::Theme, LOW_TIME_WARNING_SECS};
use crate::app::App;
use crate::scoring::Points;
use crate::session::{GridStatus, Mode, QuizSession};

/// Width of a navigation grid cell below a thousand questions, e.g. ` 12* `
const GRID_CELL_WIDTH: usize = 5;

pub struct QuizScreen;

impl Screen for QuizScreen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let session = app.session();
        let Some(question) = session.current_question() else {
            return;
        };
        let area = inner(area);
        let grid = grid_lines(session, theme, area.width as usize);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),                             // header
                Constraint::Length(1),                             // padding
                Constraint::Min(2),                                // question
                Constraint::Length(question.options.len() as u16), // options
                Constraint::Length(1),                             // padding
                Constraint::Length(2),                             // feedback
                Constraint::Length(grid.len() as u16),             // grid
                Constraint::Length(1),                             // legend
            ])
            .split(area);

        Paragraph::new(header(app, theme)).render(chunks[0], buf);

        let mut title = vec![Span::styled(question.question.clone(), theme.bold())];
        if question.is_multi() {
            title.push(Span::styled("  (select all that apply)", theme.dim()));
        }
        Paragraph::new(Line::from(title))
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        Paragraph::new(option_lines(session, theme)).render(chunks[3], buf);
        Paragraph::new(feedback_lines(session, theme))
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);
        Paragraph::new(grid).render(chunks[6], buf);
        Paragraph::new(Span::styled(legend(app), theme.legend())).render(chunks[7], buf);
    }
}

fn header(app: &App, theme: &Theme) -> Line<'static> {
    let session = app.session();
    let mut spans = vec![
        Span::styled(
            match session.mode() {
                Mode::Practice => "Practice",
                Mode::Mock => "Mock exam",
            },
            theme.title(),
        ),
        Span::styled(
            format!(
                "   Question {}/{}   Answered {}",
                session.current_index() + 1,
                session.sequence().len(),
                session.answered_count()
            ),
            theme.base(),
        ),
    ];

    if session.mode() == Mode::Practice {
        spans.push(Span::styled(
            format!("   Score {}", format_points(session.score())),
            theme.base(),
        ));
    }
    if let Some(left) = session.time_left() {
        let style = if left <= LOW_TIME_WARNING_SECS {
            theme.alert()
        } else {
            theme.bold()
        };
        spans.push(Span::styled(format!("   {}", format_clock(left)), style));
    }
    if let Some(q) = session.current_question() {
        if session.is_marked(&q.id) {
            spans.push(Span::styled("   [marked]", theme.bold().fg(theme.marked)));
        }
    }
    Line::from(spans)
}

fn option_lines(session: &QuizSession, theme: &Theme) -> Vec<Line<'static>> {
    let Some(question) = session.current_question() else {
        return Vec::new();
    };
    let reveal = session.is_confirmed() && session.mode() == Mode::Practice;

    question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let picked = session.selection().contains(option);
            let marker = match (question.is_multi(), picked) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(*)",
                (false, false) => "( )",
            };
            let style = match (reveal, question.is_correct_option(option), picked) {
                (true, true, _) => theme.good(),
                (true, false, true) => theme.bad(),
                (false, _, true) => theme.bold().fg(theme.accent),
                _ => theme.base(),
            };
            Line::from(Span::styled(format!("{marker} {}. {option}", i + 1), style))
        })
        .collect()
}

fn feedback_lines(session: &QuizSession, theme: &Theme) -> Vec<Line<'static>> {
    if session.needs_selection() {
        return vec![Line::from(Span::styled(
            "Select an answer before confirming.",
            theme.alert(),
        ))];
    }
    if let Some(left) = session.time_left() {
        if left <= LOW_TIME_WARNING_SECS && session.mode() == Mode::Mock {
            return vec![Line::from(Span::styled(
                format!("Less than 5 minutes left: {}", format_clock(left)),
                theme.alert(),
            ))];
        }
    }
    if session.mode() != Mode::Practice || !session.is_confirmed() {
        return Vec::new();
    }

    let (Some(question), Some(record)) = (
        session.current_question(),
        session.recorded(session.current_index()),
    ) else {
        return Vec::new();
    };
    let verdict = match record.points {
        Points::Full => Span::styled("Correct! +1", theme.good()),
        Points::Half => Span::styled("Partially correct. +0.5", theme.alert()),
        Points::Zero => Span::styled("Incorrect. +0", theme.bad()),
    };
    let mut lines = vec![Line::from(verdict)];
    if !record.fully_correct {
        lines.push(Line::from(Span::styled(
            format!("Correct answer: {}", question.answer.display()),
            theme.base(),
        )));
    }
    lines
}

fn grid_lines(session: &QuizSession, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let cells: Vec<Span<'static>> = session
        .sequence()
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let mark = if session.is_marked(&q.id) { "*" } else { " " };
            let label = format!("{:>3}{mark} ", i + 1);

            let mut style = match session.grid_status(i) {
                GridStatus::Unattempted => theme.dim(),
                GridStatus::Correct => theme.good(),
                GridStatus::Incorrect => theme.bad(),
                GridStatus::Attempted => theme.bold().fg(theme.accent),
            };
            if i == session.current_index() {
                style = style.patch(Style::default().add_modifier(Modifier::REVERSED));
            }
            Span::styled(label, style)
        })
        .collect();

    let cell_width = cells
        .iter()
        .map(|c| c.content.width())
        .max()
        .unwrap_or(GRID_CELL_WIDTH);
    let per_row = (width / cell_width.max(1)).max(1);

    cells
        .chunks(per_row)
        .map(|row| Line::from(row.to_vec()))
        .collect()
}

fn legend(app: &App) -> String {
    if let Some(buffer) = &app.jump_buffer {
        return format!("go to question: {buffer}_  (enter) jump / (esc) cancel");
    }
    match app.session().mode() {
        Mode::Practice => {
            "(1-9) pick / (enter) confirm / (n)ext (p)rev / (g)o to / (m)ark / (e)dit / (c)lear / (r)estart / (s)ubmit / (esc) menu"
                .to_string()
        }
        Mode::Mock => {
            "(1-9) pick / (enter) confirm / (n)ext (p)rev / (g)o to / (m)ark / (c)lear / (s)ubmit / (esc) menu"
                .to_string()
        }
    }
}

/// Whole scores print without a fraction
pub fn format_points(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}
