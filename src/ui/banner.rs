use crate::app::App;
use crate::ui::colors::ColorPalette;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

const ASCII_LINES: &[&str] = &[
    " _   _      _          _",
    "| |_(_) ___| | ____   _(_) _____      __",
    "| __| |/ __| |/ /\\ \\ / / |/ _ \\ \\ /\\ / /",
    "| |_| | (__|   <  \\ V /| |  __/\\ V  V /",
    " \\__|_|\\___|_|\\_\\  \\_/ |_|\\___| \\_/\\_/",
];

const SWEEP_WIDTH: usize = 6;
const FRAMES_PER_STEP: u32 = 1;

/// Idle banner with a highlight band sweeping left to right.
pub fn render_animated_banner(app: &App, palette: &ColorPalette) -> Vec<Line<'static>> {
    let normal_style = Style::default().fg(palette.primary);
    let bright_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);

    let width = ASCII_LINES
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let cycle = width + SWEEP_WIDTH;
    let head = (app.animation_frame / FRAMES_PER_STEP) as usize % cycle.max(1);

    ASCII_LINES
        .iter()
        .enumerate()
        .map(|(row, line)| {
            // Lower rows trail slightly so the band leans.
            let row_head = head.saturating_sub(row);
            let mut spans: Vec<Span<'static>> = Vec::new();
            let mut run = String::new();
            let mut run_style = normal_style;

            for (col, ch) in line.chars().enumerate() {
                let lit = col < row_head && row_head - col <= SWEEP_WIDTH;
                let style = if lit && !ch.is_whitespace() {
                    bright_style
                } else {
                    normal_style
                };
                if style != run_style && !run.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style));
                }
                run_style = style;
                run.push(ch);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style));
            }
            Line::from(spans)
        })
        .collect()
}
