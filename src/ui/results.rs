use crate::app::App;
use crate::progress::ProgressState;
use crate::render::{render_extras, render_narrative, render_ratios, SectionView};
use crate::ui::colors::ColorPalette;
use crate::ui::section::section_lines;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if app.show_json {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        render_report(f, app, chunks[0]);
        render_json(f, app, chunks[1]);
    } else {
        render_report(f, app, area);
    }
}

/// Every section in display order, filtered by the current preferences.
pub fn report_sections(app: &App) -> Vec<SectionView> {
    let lang = app.language;
    let mut views = Vec::new();
    if let Some(result) = app.analysis.content() {
        views.extend(render_ratios(result, lang));
        if app.preferences.narrative {
            views.push(render_narrative(result, lang));
        }
    }
    views.extend(
        render_extras(&app.extras, &app.preferences, lang)
            .into_iter()
            .map(|(_, view)| view),
    );
    views
}

fn render_report(f: &mut Frame, app: &App, area: Rect) {
    let palette = ColorPalette::standard();
    let lang = app.language;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(lang.pick(" 분석 ", " Analysis "));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let body = if app.analysis.is_active() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        let label = match app.analysis.state() {
            ProgressState::Completing { .. } => lang.pick("완료", "Done").to_string(),
            _ => format!("{}%", app.analysis.percent()),
        };
        f.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(palette.primary).bg(Color::Black))
                .percent(app.analysis.percent().min(100))
                .label(label),
            chunks[0],
        );
        chunks[1]
    } else {
        inner
    };

    let mut lines = Vec::new();
    if let Some(failure) = app.analysis.failure() {
        lines.push(Line::from(Span::styled(
            format!("{}: {failure}", lang.pick("분석 실패", "Analysis failed")),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    let views = report_sections(app);
    if views.is_empty() && app.analysis.failure().is_none() {
        lines.push(Line::from(Span::styled(
            lang.pick(
                "티커를 입력하고 Enter를 누르세요",
                "Type a ticker and press Enter",
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }
    for view in &views {
        lines.extend(section_lines(view, &palette));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

fn render_json(f: &mut Frame, app: &App, area: Rect) {
    let palette = ColorPalette::standard();
    let mut lines = Vec::new();

    let panels = [
        ("/analyse", app.analysis.content().map(|a| &a.raw)),
        ("/agent", app.agent_raw.as_ref()),
    ];
    for (name, raw) in panels {
        lines.push(Line::from(Span::styled(
            name,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        match raw.filter(|v| !v.is_null()) {
            Some(value) => {
                lines.extend(pretty(value).lines().map(|l| Line::from(l.to_string())))
            }
            None => lines.push(Line::from(Span::styled(
                "(none)",
                Style::default().fg(Color::DarkGray),
            ))),
        }
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" JSON ")),
        area,
    );
}
