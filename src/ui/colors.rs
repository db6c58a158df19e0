use crate::render::Tone;
use ratatui::style::Color;

pub struct ColorPalette {
    pub primary: Color,
    pub accent: Color,
    pub error: Color,
    pub muted: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
}

impl ColorPalette {
    pub fn standard() -> Self {
        Self {
            // Ledger teal
            primary: Color::Rgb(0x2A, 0x9D, 0x8F),
            accent: Color::Rgb(0xE9, 0xC4, 0x6A),
            error: Color::Rgb(0xE7, 0x6F, 0x51),
            muted: Color::Gray,
            selected_bg: Color::Rgb(0x2A, 0x9D, 0x8F),
            selected_fg: Color::Black,
        }
    }

    pub fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Positive => Color::Green,
            Tone::Negative => Color::Red,
            Tone::Caution => Color::Yellow,
            Tone::Neutral => self.muted,
        }
    }
}
