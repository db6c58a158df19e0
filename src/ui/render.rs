use crate::app::App;
use crate::ui::{footer, form, header, popup, results};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    // Top: form on the left, overview on the right
    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(vertical_chunks[0]);
    form::render(f, app, top_chunks[0]);
    header::render(f, app, top_chunks[1]);

    results::render(f, app, vertical_chunks[1]);
    footer::render(f, app, vertical_chunks[2]);

    popup::render(f, app);
}
