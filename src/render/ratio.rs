use super::text::sanitize_inline;
use super::{Badge, Field, SectionView, Tone};
use crate::models::{AnalysisResult, Language, RatioCategory, RatioNode};
use crate::render::format_price;

const KNOWN_CATEGORIES: &[(&str, &[(&str, &str)])] = &[
    (
        "Liquidity",
        &[
            ("current_ratio", "Current Ratio"),
            ("quick_ratio", "Quick Ratio"),
            ("cash_ratio", "Cash Ratio"),
        ],
    ),
    (
        "Solvency",
        &[
            ("debt_to_equity", "Debt-to-Equity"),
            ("debt_ratio", "Debt Ratio"),
            ("interest_coverage", "Interest Coverage"),
        ],
    ),
];

pub fn format_ratio_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => "N/A".to_string(),
    }
}

fn band_tone(band: &str) -> Tone {
    match band.trim().to_ascii_lowercase().as_str() {
        "strong" => Tone::Positive,
        "fair" => Tone::Caution,
        "weak" => Tone::Negative,
        _ => Tone::Neutral,
    }
}

/// `None` when the server sent no node for this ratio; the row is omitted.
pub fn render_ratio(label: &str, node: Option<&RatioNode>) -> Option<Field> {
    let node = node?;
    let band = node
        .band
        .as_deref()
        .map(sanitize_inline)
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| "N/A".to_string());
    let tone = band_tone(&band);
    Some(Field::new(label, format_ratio_value(node.value)).tagged(Badge::new(band, tone)))
}

fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_category(title: &str, category: &RatioCategory, known: &[(&str, &str)]) -> SectionView {
    let mut view = SectionView::new(sanitize_inline(title));
    for (key, label) in known {
        if let Some(field) = render_ratio(label, category.get(*key).and_then(Option::as_ref)) {
            view.fields.push(field);
        }
    }
    for (key, node) in category {
        if known.iter().any(|(k, _)| *k == key.as_str()) {
            continue;
        }
        if let Some(field) = render_ratio(&humanize(&sanitize_inline(key)), node.as_ref()) {
            view.fields.push(field);
        }
    }
    view
}

/// One view per ratio category, known categories first in canonical order.
pub fn render_ratios(result: &AnalysisResult, language: Language) -> Vec<SectionView> {
    let ratios = &result.core.ratios;
    let mut views = Vec::new();

    for (name, known) in KNOWN_CATEGORIES {
        if let Some(category) = ratios.get(*name) {
            let title = match *name {
                "Liquidity" => language.pick("유동성 (Liquidity)", "Liquidity"),
                "Solvency" => language.pick("건전성 (Solvency)", "Solvency"),
                other => other,
            };
            views.push(render_category(title, category, known));
        }
    }
    for (name, category) in ratios {
        if KNOWN_CATEGORIES.iter().any(|(k, _)| *k == name.as_str()) {
            continue;
        }
        views.push(render_category(name, category, &[]));
    }

    for view in &mut views {
        if view.fields.is_empty() {
            view.placeholder = Some(
                language
                    .pick("재무 데이터가 없습니다", "No ratio data")
                    .to_string(),
            );
        }
    }
    views
}

/// Company header card: name, ticker, last price, source and notes.
pub fn render_overview(result: &AnalysisResult, language: Language) -> SectionView {
    let core = &result.core;
    let ticker = core
        .ticker
        .as_deref()
        .map(sanitize_inline)
        .unwrap_or_default();
    let company = core
        .company
        .as_deref()
        .map(sanitize_inline)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ticker.clone());

    let mut view = SectionView::new(company);
    if !ticker.is_empty() {
        view.badges.push(Badge::new(ticker, Tone::Neutral));
    }
    view.fields.push(Field::new(
        language.pick("현재가", "Price"),
        format_price(core.price),
    ));
    if let Some(source) = result.meta.source.as_deref() {
        view.fields.push(Field::new(
            language.pick("데이터 출처", "Source"),
            sanitize_inline(source),
        ));
    }
    if let Some(notes) = result.notes.as_deref().map(sanitize_inline) {
        if !notes.is_empty() {
            view.lines.push(notes);
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_values_have_two_decimals() {
        assert_eq!(format_ratio_value(Some(1.0745)), "1.07");
        assert_eq!(format_ratio_value(Some(2.0)), "2.00");
        assert_eq!(format_ratio_value(Some(-0.456)), "-0.46");
    }

    #[test]
    fn missing_or_nan_values_are_na() {
        assert_eq!(format_ratio_value(None), "N/A");
        assert_eq!(format_ratio_value(Some(f64::NAN)), "N/A");
        assert_eq!(format_ratio_value(Some(f64::INFINITY)), "N/A");
    }

    #[test]
    fn absent_node_renders_nothing() {
        assert!(render_ratio("Quick Ratio", None).is_none());
        let node = RatioNode {
            value: None,
            band: Some("Weak".into()),
        };
        let field = render_ratio("Quick Ratio", Some(&node)).unwrap();
        assert_eq!(field.value, "N/A");
        assert_eq!(field.tag, Some(Badge::new("Weak", Tone::Negative)));
    }

    #[test]
    fn categories_follow_canonical_order() {
        let result = AnalysisResult::from_value(json!({
            "core": {
                "company": "Apple Inc.",
                "ticker": "AAPL",
                "price": 189.5,
                "ratios": {
                    "Solvency": {
                        "interest_coverage": {"value": 29.1, "band": "Strong"},
                        "debt_to_equity": {"value": 1.8, "band": "Fair"}
                    },
                    "Liquidity": {
                        "cash_ratio": {"value": 0.2, "band": "Fair"},
                        "current_ratio": {"value": 1.07, "band": "Fair"},
                        "working_capital_days": {"value": 12, "band": "N/A"}
                    }
                }
            }
        }))
        .unwrap();

        let views = render_ratios(&result, Language::En);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].title, "Liquidity");
        let labels: Vec<&str> = views[0].fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Current Ratio", "Cash Ratio", "Working Capital Days"]);
        let labels: Vec<&str> = views[1].fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Debt-to-Equity", "Interest Coverage"]);
    }

    #[test]
    fn empty_category_gets_placeholder() {
        let result = AnalysisResult::from_value(json!({
            "core": {"ticker": "ZZZZ", "ratios": {"Liquidity": {}, "Solvency": {}}},
            "notes": "Balance sheet not found."
        }))
        .unwrap();
        let views = render_ratios(&result, Language::En);
        assert!(views.iter().all(SectionView::is_placeholder));

        let overview = render_overview(&result, Language::En);
        assert_eq!(overview.title, "ZZZZ");
        assert_eq!(overview.fields[0].value, "N/A");
        assert_eq!(overview.lines, vec!["Balance sheet not found."]);
    }
}
