use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::quiz::ReviewItem;

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let score = session.score() as usize;
    let total = session.total();
    let percentage = calculate_percentage(score, total);
    let grade_color = get_grade_color(percentage);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], app, score, total, percentage, grade_color);
    render_question_breakdown(frame, chunks[2], &session.review(), app.result_scroll());
    render_controls(frame, chunks[3]);
}

fn calculate_percentage(score: usize, total: usize) -> f64 {
    if total > 0 {
        (score as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    score: usize,
    total: usize,
    percentage: f64,
    grade_color: Color,
) {
    let duration = app
        .session()
        .attempt()
        .map(|a| format!("{}m {:02}s", a.duration_seconds / 60, a.duration_seconds % 60))
        .unwrap_or_default();
    let saved = match app.saved() {
        Some(true) => "attempt saved".fg(Color::DarkGray),
        Some(false) => "could not save attempt".fg(Color::Yellow),
        None => "saving...".fg(Color::DarkGray),
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({:.0}%)", score, total, percentage),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(vec![duration.fg(Color::Gray), "  ·  ".fg(Color::DarkGray), saved]),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, review: &[ReviewItem], scroll: usize) {
    let mut lines: Vec<Line> = Vec::with_capacity(review.len() * 2);

    for item in review {
        let (symbol, color) = if item.is_correct {
            ("+", Color::Green)
        } else {
            ("-", Color::Red)
        };
        let flag = if item.flagged { " *" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
            Span::styled(
                format!("{:2}. ", item.index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(truncate_question(&item.question), Style::default().fg(Color::Gray)),
            Span::styled(flag, Style::default().fg(Color::Magenta)),
        ]));

        let answer = item.answer.as_deref().unwrap_or("(no answer)");
        let mut detail = vec![Span::styled(
            format!("       you: {}", answer),
            Style::default().fg(color),
        )];
        if !item.is_correct {
            detail.push(Span::styled(
                format!("   correct: {}", item.correct_answer),
                Style::default().fg(Color::Green),
            ));
        }
        lines.push(Line::from(detail));
    }

    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll(((scroll * 2) as u16, 0));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  * flagged  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_question() {
        let long = "x".repeat(80);
        assert_eq!(truncate_question(&long).chars().count(), QUESTION_PREVIEW_LENGTH + 3);
        assert_eq!(truncate_question("short"), "short");
    }

    #[test]
    fn test_grade_color_bands() {
        assert_eq!(get_grade_color(95.0), Color::Green);
        assert_eq!(get_grade_color(calculate_percentage(0, 0)), Color::Red);
    }
}
