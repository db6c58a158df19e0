use crate::app::{App, Focus, NoticeKind};
use crate::ui::colors::ColorPalette;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let palette = ColorPalette::standard();

    let line = match &app.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => palette.accent,
                NoticeKind::Validation => palette.accent,
                NoticeKind::Error => palette.error,
            };
            Line::from(Span::styled(
                crate::render::sanitize_inline(&notice.message),
                Style::default().fg(color),
            ))
        }
        None => Line::from(command_spans(app, &palette)),
    };

    f.render_widget(
        Paragraph::new(vec![line])
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center),
        area,
    );
}

fn command_spans(app: &App, palette: &ColorPalette) -> Vec<Span<'static>> {
    let keys: &[(&str, &str)] = match app.focus {
        Focus::Ticker => &[("Enter", "=analyse "), ("Tab", "=options "), ("Esc", "=quit")],
        Focus::Options => &[
            ("↑/↓", "=move "),
            ("Space", "=toggle "),
            ("r", "=analyse "),
            ("f", "=predict "),
            ("j", "=json "),
            ("h", "=health "),
            ("n", "=notes "),
            ("q", "=quit"),
        ],
    };

    let mut spans = vec![Span::raw("Commands: ")];
    for (idx, (key, action)) in keys.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("| "));
        }
        let color = if *key == "q" || *key == "Esc" {
            palette.error
        } else {
            palette.accent
        };
        spans.push(Span::styled(key.to_string(), Style::default().fg(color)));
        spans.push(Span::raw(action.to_string()));
    }
    spans
}
