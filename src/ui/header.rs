use crate::app::{App, HealthState};
use crate::render::{render_health, render_overview, sanitize_inline, Tone};
use crate::ui::banner;
use crate::ui::colors::ColorPalette;
use crate::ui::section::section_lines;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let palette = ColorPalette::standard();
    let lang = app.language;
    let mut text = vec![];

    let mut title = vec![
        Span::styled(
            "Tickview",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(lang.pick(" - 재무 비율 분석", " - Financial ratio analysis")),
    ];
    if app.patch_notes.has_unread() {
        title.push(Span::styled(
            lang.pick("  ● 새 소식 (n)", "  ● What's new (n)"),
            Style::default().fg(palette.accent),
        ));
    }
    text.push(Line::from(title));
    text.push(health_line(app, &palette));
    text.push(Line::from(""));

    match app.analysis.content() {
        Some(result) => text.extend(section_lines(&render_overview(result, lang), &palette)),
        None => text.extend(banner::render_animated_banner(app, &palette)),
    }

    f.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(lang.pick(" 개요 ", " Overview ")),
            ),
        area,
    );
}

fn health_line(app: &App, palette: &ColorPalette) -> Line<'static> {
    let lang = app.language;
    let (label, color) = match &app.health {
        HealthState::Unknown => (
            lang.pick("상태 미확인", "Status unknown").to_string(),
            Color::DarkGray,
        ),
        HealthState::Checking => (
            lang.pick("상태 확인 중…", "Checking status…").to_string(),
            Color::DarkGray,
        ),
        HealthState::Online(status) => {
            let (label, tone) = render_health(status);
            (label, palette.tone(tone))
        }
        HealthState::Offline(reason) => (
            format!(
                "{}: {}",
                lang.pick("API 연결 실패", "API unreachable"),
                sanitize_inline(reason)
            ),
            palette.tone(Tone::Negative),
        ),
    };
    Line::from(vec![
        Span::styled("● ", Style::default().fg(color)),
        Span::styled(label, Style::default().fg(palette.muted)),
    ])
}
