//! Plain-text rendering for `--once`.

use crate::app::App;
use crate::render::{render_overview, SectionView};
use crate::ui::results::report_sections;
use std::fmt::Write;

pub fn section_text(view: &SectionView) -> String {
    let mut out = String::new();
    let _ = write!(out, "== {}", view.title);
    for badge in &view.badges {
        let _ = write!(out, " [{}]", badge.label);
    }
    out.push('\n');

    if let Some(message) = &view.placeholder {
        let _ = writeln!(out, "  {message}");
    }
    let width = view
        .fields
        .iter()
        .map(|field| field.label.chars().count())
        .max()
        .unwrap_or(0);
    for field in &view.fields {
        let pad = width.saturating_sub(field.label.chars().count());
        let _ = write!(out, "  {}{}: {}", field.label, " ".repeat(pad), field.value);
        if let Some(tag) = &field.tag {
            let _ = write!(out, " [{}]", tag.label);
        }
        out.push('\n');
    }
    for line in &view.lines {
        let _ = writeln!(out, "  {line}");
    }
    out
}

/// Overview, ratios, narrative and the visible extras, blank-line separated.
pub fn report_text(app: &App) -> String {
    let mut views = Vec::new();
    if let Some(result) = app.analysis.content() {
        views.push(render_overview(result, app.language));
    }
    views.extend(report_sections(app));
    views
        .iter()
        .map(section_text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentResponse, AnalysisResult, ExtrasPreferences, Language};
    use crate::patch_notes::PatchNotes;
    use crate::render::{Badge, Field, Tone};
    use serde_json::json;

    #[test]
    fn section_text_aligns_fields() {
        let mut view = SectionView::new("Liquidity");
        view.badges.push(Badge::new("AAPL", Tone::Neutral));
        view.fields.push(
            Field::new("Current ratio", "1.50").tagged(Badge::new("Strong", Tone::Positive)),
        );
        view.fields.push(Field::new("Cash ratio", "N/A"));
        view.lines.push("note".into());

        assert_eq!(
            section_text(&view),
            "== Liquidity [AAPL]\n  Current ratio: 1.50 [Strong]\n  Cash ratio   : N/A\n  note\n"
        );
    }

    #[test]
    fn report_follows_current_preferences() {
        let mut app = App::new(
            Language::En,
            ExtrasPreferences::default(),
            PatchNotes::in_memory(),
        );
        app.analysis.start();
        let result = AnalysisResult::from_value(json!({
            "core": {"company": "Apple Inc.", "ticker": "AAPL", "price": 190.5, "ratios": {}},
            "explanation": "Liquidity is strong."
        }))
        .unwrap();
        app.analysis.finish(result).unwrap();
        app.analysis.complete_now();

        let requested = app.preferences;
        app.extras.begin(&requested);
        app.extras.apply(
            &requested,
            AgentResponse::from_value(json!({"summary": "Solid balance sheet."})),
            false,
        );

        let text = report_text(&app);
        assert!(text.starts_with("== Apple Inc. [AAPL]"));
        assert!(text.contains("Liquidity is strong."));
        assert!(text.contains("Solid balance sheet."));

        app.preferences.summary = false;
        app.preferences.narrative = false;
        let text = report_text(&app);
        assert!(!text.contains("Solid balance sheet."));
        assert!(!text.contains("Liquidity is strong."));
    }
}
