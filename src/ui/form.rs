use crate::app::{App, Focus, OptionItem};
use crate::ui::colors::ColorPalette;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let palette = ColorPalette::standard();
    let lang = app.language;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_ticker_input(f, app, chunks[0], &palette);

    let is_active = app.focus == Focus::Options;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(lang.pick(" 옵션 ", " Options "))
        .border_style(focus_style(is_active, &palette));
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    let lines: Vec<Line> = OptionItem::ALL
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let is_selected = is_active && idx == app.option_cursor;
            let prefix = if is_selected { "> " } else { "  " };
            let value = match option {
                OptionItem::Language => format!("[{}]", app.language.label()),
                _ if app.option_enabled(*option) => "[x]".to_string(),
                _ => "[ ]".to_string(),
            };

            let style = if is_selected {
                Style::default()
                    .fg(palette.selected_fg)
                    .bg(palette.selected_bg)
                    .add_modifier(Modifier::BOLD)
            } else if app.option_enabled(*option) || *option == OptionItem::Language {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            Line::from(Span::styled(
                format!("{prefix}{value} {}", option.label(lang)),
                style,
            ))
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_ticker_input(f: &mut Frame, app: &App, area: Rect, palette: &ColorPalette) {
    let is_active = app.focus == Focus::Ticker;
    let cursor = if is_active { "_" } else { "" };
    let text = if app.ticker_input.is_empty() && !is_active {
        Span::styled(
            app.language.pick("예: AAPL", "e.g. AAPL"),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            format!("{}{cursor}", app.ticker_input),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        )
    };

    f.render_widget(
        Paragraph::new(Line::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.language.pick(" 티커 ", " Ticker "))
                .border_style(focus_style(is_active, palette)),
        ),
        area,
    );
}

fn focus_style(is_active: bool, palette: &ColorPalette) -> Style {
    if is_active {
        Style::default().fg(palette.primary)
    } else {
        Style::default().fg(palette.muted)
    }
}
