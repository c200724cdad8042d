use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use super::{inner, quiz::format_points, screen::Screen, theme::Theme};
use crate::app::App;
use crate::results::ResultsSummary;

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, theme: &Theme, area: Rect, buf: &mut Buffer) {
        let Some(summary) = app.controller.results() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // headline
                Constraint::Min(1),    // breakdown
                Constraint::Length(1), // legend
            ])
            .split(inner(area));

        Paragraph::new(headline(&summary, theme)).render(chunks[0], buf);
        Paragraph::new(breakdown(&summary, theme))
            .wrap(Wrap { trim: false })
            .scroll((app.results_scroll, 0))
            .render(chunks[1], buf);
        Paragraph::new(Span::styled(
            "(r)estart / (h)ome / (j/k) scroll / (d)ark / (q)uit",
            theme.legend(),
        ))
        .render(chunks[2], buf);
    }
}

fn headline(summary: &ResultsSummary, theme: &Theme) -> Vec<Line<'static>> {
    let verdict = match summary.passed {
        Some(true) => Span::styled("  PASSED", theme.good()),
        Some(false) => Span::styled("  FAILED", theme.bad()),
        None => Span::raw(""),
    };
    vec![
        Line::from(vec![
            Span::styled(format!("{} Results", summary.mode), theme.title()),
            verdict,
        ]),
        Line::from(Span::styled(
            format!(
                "Score {} / {}  ({:.1}%)",
                format_points(summary.score),
                summary.max_score,
                summary.percentage
            ),
            theme.bold(),
        )),
        Line::from(Span::styled(
            format!(
                "Answered {} of {}   Incorrect {}   Marked {}   Unattempted {}",
                summary.answered,
                summary.total,
                summary.incorrect.len(),
                summary.marked.len(),
                summary.unattempted.len()
            ),
            theme.base(),
        )),
    ]
}

fn breakdown(summary: &ResultsSummary, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled("Incorrect answers", theme.title())));
    if summary.incorrect.is_empty() {
        lines.push(Line::from(Span::styled("  none", theme.dim())));
    }
    for entry in &summary.incorrect {
        lines.push(Line::from(Span::styled(
            format!("{}. {}", entry.index + 1, entry.question),
            theme.bold(),
        )));
        lines.push(Line::from(vec![
            Span::styled("   yours: ", theme.dim()),
            Span::styled(entry.your_answer.join(", "), theme.bad()),
            Span::styled(format!("  (+{})", entry.points.value()), theme.dim()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("   correct: ", theme.dim()),
            Span::styled(entry.correct_answer.join(", "), theme.good()),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Marked for review", theme.title())));
    if summary.marked.is_empty() {
        lines.push(Line::from(Span::styled("  none", theme.dim())));
    }
    for entry in &summary.marked {
        lines.push(Line::from(Span::styled(
            format!("{}. {}", entry.index + 1, entry.question),
            theme.bold(),
        )));
        let yours = entry
            .your_answer
            .as_ref()
            .map(|a| a.join(", "))
            .unwrap_or_else(|| "not answered".to_string());
        lines.push(Line::from(vec![
            Span::styled("   yours: ", theme.dim()),
            Span::styled(yours, theme.base()),
            Span::styled("   correct: ", theme.dim()),
            Span::styled(entry.correct_answer.join(", "), theme.good()),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Unattempted", theme.title())));
    if summary.unattempted.is_empty() {
        lines.push(Line::from(Span::styled("  none", theme.dim())));
    }
    for entry in &summary.unattempted {
        lines.push(Line::from(Span::styled(
            format!("{}. {}", entry.index + 1, entry.question),
            theme.base(),
        )));
    }

    lines
}
