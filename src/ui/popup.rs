use crate::app::App;
use crate::ui::colors::ColorPalette;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    if app.patch_notes_open {
        render_patch_notes_popup(f, app, f.size());
    }
}

fn create_centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn create_popup_block(title: &str, primary_color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(primary_color))
        .title(title)
        .title_style(
            Style::default()
                .fg(primary_color)
                .add_modifier(Modifier::BOLD),
        )
}

fn render_patch_notes_popup(f: &mut Frame, app: &App, area: Rect) {
    let palette = ColorPalette::standard();
    let lang = app.language;
    let popup_area = create_centered_popup(area, 72, 20);
    let title = lang.pick(" 패치 노트 ", " Patch notes ");
    let block = create_popup_block(title, palette.primary);
    let inner = block.inner(popup_area);

    let mut lines = Vec::new();
    for note in app.patch_notes.entries() {
        let mut heading = vec![
            Span::styled(note.date, Style::default().fg(palette.muted)),
            Span::raw("  "),
            Span::styled(
                note.title,
                Style::default()
                    .fg(palette.primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if app.patch_notes.is_unread(note) {
            heading.push(Span::styled(
                lang.pick("  새 글", "  new"),
                Style::default().fg(palette.accent),
            ));
        }
        lines.push(Line::from(heading));
        for item in note.items {
            lines.push(Line::from(format!("  • {item}")));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        lang.pick("Esc 또는 Enter로 닫기", "Press Esc or Enter to close"),
        Style::default().fg(palette.primary),
    )));

    f.render_widget(Clear, popup_area);
    f.render_widget(block, popup_area);
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
