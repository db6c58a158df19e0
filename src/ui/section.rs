use crate::render::{Badge, SectionView};
use crate::ui::colors::ColorPalette;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

fn badge_span(badge: &Badge, palette: &ColorPalette) -> Span<'static> {
    Span::styled(
        format!("[{}]", badge.label),
        Style::default()
            .fg(palette.tone(badge.tone))
            .add_modifier(Modifier::BOLD),
    )
}

/// Lays a section out as a title row, fields, then free text.
pub fn section_lines(view: &SectionView, palette: &ColorPalette) -> Vec<Line<'static>> {
    let mut title = vec![Span::styled(
        view.title.clone(),
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for badge in &view.badges {
        title.push(Span::raw(" "));
        title.push(badge_span(badge, palette));
    }

    let mut lines = vec![Line::from(title)];

    if let Some(message) = &view.placeholder {
        lines.push(Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let label_width = view
        .fields
        .iter()
        .map(|field| field.label.chars().count())
        .max()
        .unwrap_or(0);
    for field in &view.fields {
        let pad = label_width.saturating_sub(field.label.chars().count());
        let mut spans = vec![
            Span::styled(
                format!("  {}{}: ", field.label, " ".repeat(pad)),
                Style::default().fg(palette.muted),
            ),
            Span::styled(field.value.clone(), Style::default().fg(Color::White)),
        ];
        if let Some(tag) = &field.tag {
            spans.push(Span::raw(" "));
            spans.push(badge_span(tag, palette));
        }
        lines.push(Line::from(spans));
    }

    for text in &view.lines {
        lines.push(Line::from(Span::raw(format!("  {text}"))));
    }
    lines.push(Line::from(""));
    lines
}
