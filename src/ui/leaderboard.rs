//! Leaderboard screen: ranking table and recent attempts.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::analytics::{LeaderboardRow, Lookups};
use crate::models::QuizAttempt;

/// Everything the leaderboard screen draws.
pub struct LeaderboardView {
    pub rows: Vec<LeaderboardRow>,
    pub recent: Vec<QuizAttempt>,
    pub lookups: Lookups,
    /// Human-readable description of the active filter.
    pub filter_label: String,
    pub scroll: usize,
}

pub fn render(frame: &mut Frame, view: &LeaderboardView) {
    let area = frame.area();
    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Percentage(60),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    let header = Line::from(vec![
        Span::styled("LEADERBOARD", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("  {}", view.filter_label), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    render_ranking(frame, chunks[1], view);
    render_recent(frame, chunks[2], view);

    frame.render_widget(
        Paragraph::new("j/k scroll  ·  q quit")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray),
        chunks[3],
    );
}

fn rank_style(rank: usize) -> (String, Color) {
    match rank {
        1 => ("1st".to_string(), Color::Yellow),
        2 => ("2nd".to_string(), Color::Blue),
        3 => ("3rd".to_string(), Color::LightRed),
        n => (format!("#{}", n), Color::DarkGray),
    }
}

fn render_ranking(frame: &mut Frame, area: Rect, view: &LeaderboardView) {
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        format!(
            "  {:<5}{:<22}{:>9}{:>8}{:>8}{:>10}{:>8}",
            "rank", "player", "attempts", "best", "best%", "avg%", "time"
        ),
        Style::default().fg(Color::DarkGray),
    ))];

    for row in view.rows.iter().skip(view.scroll) {
        let (rank, color) = rank_style(row.rank);
        let name = row
            .user_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&row.user_key);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<5}", rank), Style::default().fg(color).bold()),
            Span::styled(format!("{:<22}", truncate(name, 20)), Style::default().fg(Color::White)),
            Span::styled(format!("{:>9}", row.total_attempts), Style::default().fg(Color::Gray)),
            Span::styled(format!("{:>8}", row.best_score), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:>7.1}%", row.best_accuracy),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("{:>9.1}%", row.average_accuracy),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("{:>7}s", row.average_duration_seconds.round() as u64),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    if view.rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No attempts yet...",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Rankings ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_recent(frame: &mut Frame, area: Rect, view: &LeaderboardView) {
    let max_display = (area.height as usize).saturating_sub(2);
    let mut lines: Vec<Line> = Vec::new();

    for attempt in view.recent.iter().take(max_display) {
        let quiz = match attempt.sub_category_id.as_deref() {
            Some(sub) => view.lookups.subcategory(sub),
            None => view.lookups.category(&attempt.category_id),
        };
        let date = attempt
            .timestamp()
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", date), Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:<20}", truncate(attempt.user_key(), 18)),
                Style::default().fg(Color::White),
            ),
            Span::styled(format!("{:<24}", truncate(quiz, 22)), Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", attempt.score, attempt.total_questions),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("  {}", attempt.level.as_deref().unwrap_or("-")),
                Style::default().fg(Color::Yellow),
            ),
        ]));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Recent ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        text.to_string()
    }
}
