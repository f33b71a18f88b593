use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::quiz::TargetSource;

fn centered_box(area: Rect, height: u16) -> Rect {
    Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .horizontal_margin(4)
    .split(area)[1]
}

fn target_label(app: &App) -> String {
    let target = app.session().target();
    let source = match &target.source {
        TargetSource::Remote { category } => format!("Category {}", category),
        TargetSource::Local { sub_category_id } => format!("Community set {}", sub_category_id),
    };
    let level = target.level.map_or("any difficulty", |l| l.as_str());
    format!("{} · {}", source, level)
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "TRIVIA TREK",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(target_label(app).fg(Color::DarkGray)),
        Line::from(""),
        Line::from("Loading questions...".fg(Color::Yellow)),
    ];
    if let Some(banner) = app.banner() {
        content.push(Line::from(""));
        content.push(Line::from(banner.fg(Color::Magenta)));
    }

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, centered_box(area, 10));
}

pub fn render_failed(frame: &mut Frame, area: Rect, app: &App) {
    let message = app.session().error().unwrap_or("Something went wrong.");
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "COULD NOT START QUIZ",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(target_label(app).fg(Color::DarkGray)),
        Line::from(""),
        Line::from(message.fg(Color::White)),
        Line::from(""),
        Line::from("q to quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::Red),
        );
    frame.render_widget(widget, centered_box(area, 10));
}
