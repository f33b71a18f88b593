mod leaderboard;
mod loading;
mod quiz;
mod result;

use ratatui::{prelude::*, widgets::Block};

use crate::app::{App, Screen};

pub use leaderboard::{render as render_leaderboard, LeaderboardView};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.screen() {
        Screen::Loading => loading::render(frame, area, app),
        Screen::Failed => loading::render_failed(frame, area, app),
        Screen::Quiz => quiz::render(frame, area, app),
        Screen::ConfirmSubmit => {
            quiz::render(frame, area, app);
            quiz::render_confirm(frame, area, app);
        }
        Screen::Result => result::render(frame, area, app),
    }
}
