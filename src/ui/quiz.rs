use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Gauge, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::decode_entities;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];
const LOW_TIME_SECONDS: u32 = 10;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_header(frame, chunks[0], app);
    render_progress(frame, chunks[1], app);
    render_banner(frame, chunks[2], app);

    let Some(question) = app.session().current() else {
        return;
    };
    render_question_text(frame, chunks[3], &question.text());
    render_options(frame, chunks[4], app, &question.merged);
    render_status(frame, chunks[5], app);
    render_controls(frame, chunks[6]);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let countdown = session.countdown();
    let timer_color = match countdown.remaining() {
        0 => Color::Red,
        s if s <= LOW_TIME_SECONDS => Color::Yellow,
        _ => Color::Green,
    };
    let flag = if session.is_flagged(session.index()) {
        Span::styled("  [flagged]", Style::default().fg(Color::Magenta))
    } else {
        Span::raw("")
    };
    let title = session
        .meta()
        .map(|m| m.name.clone())
        .unwrap_or_else(|| "Trivia".to_string());

    let columns = Layout::horizontal([Constraint::Fill(1), Constraint::Length(24)]).split(area);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().fg(Color::Cyan).bold()),
            Span::styled(
                format!("  {}/{}", session.index() + 1, session.total()),
                Style::default().fg(Color::DarkGray),
            ),
            flag,
        ])),
        columns[0],
    );
    let timer = if countdown.expired() {
        "time's up".to_string()
    } else {
        format!("{}s left", countdown.remaining())
    };
    frame.render_widget(
        Paragraph::new(timer)
            .alignment(Alignment::Right)
            .fg(timer_color)
            .bold(),
        columns[1],
    );
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App) {
    let percent = app.session().progress_percent();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(percent.min(100))
        .label(format!("{}%", percent));
    frame.render_widget(gauge, area);
}

fn render_banner(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(banner) = app.banner() {
        frame.render_widget(Paragraph::new(banner).fg(Color::Magenta).italic(), area);
    }
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, app: &App, options: &[String]) {
    let session = app.session();
    let answer = session.answer(session.index());
    let locked = session.countdown().expired();
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == app.cursor();
        let is_chosen = answer == Some(option.as_str());
        let style = match (is_chosen, is_cursor, locked) {
            (true, _, _) => Style::default().fg(Color::Green).bold(),
            (false, true, false) => Style::default().fg(Color::Cyan).bold(),
            (false, _, true) => Style::default().fg(Color::DarkGray),
            _ => Style::default().fg(Color::Gray),
        };
        let marker = if is_cursor { ">" } else { " " };
        let label = OPTION_LABELS.get(index).copied().unwrap_or('?');

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", label), style),
            Span::styled(decode_entities(option), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let next_hint = if session.can_advance() {
        Span::styled("next ready", Style::default().fg(Color::Green))
    } else {
        Span::styled("answer to continue", Style::default().fg(Color::DarkGray))
    };
    let line = Line::from(vec![
        Span::styled(
            format!("answered {}  ", session.answered_count()),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("unanswered {}  ", session.unanswered_count()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("flagged {}  ", session.flagged_count()),
            Style::default().fg(Color::Magenta),
        ),
        next_hint,
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k move  ·  enter/1-4 answer  ·  h/l prev/next  ·  f flag  ·  s submit  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

/// Submission dialog drawn over the question view.
pub fn render_confirm(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let popup = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Fill(1),
    ])
    .horizontal_margin(area.width.saturating_sub(50) / 2)
    .split(area)[1];

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Submit quiz?",
            Style::default().fg(Color::Cyan).bold(),
        )),
    ];
    if session.unanswered_count() > 0 {
        content.push(Line::from(
            format!("{} question(s) unanswered", session.unanswered_count()).fg(Color::Yellow),
        ));
    } else {
        content.push(Line::from(""));
    }
    content.push(Line::from(""));
    content.push(Line::from("y submit  ·  n keep going".fg(Color::DarkGray)));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(content).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::Cyan)
                .padding(Padding::horizontal(1)),
        ),
        popup,
    );
}
