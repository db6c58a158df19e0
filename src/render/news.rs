use super::text::sanitize_inline;
use super::{Badge, Field, SectionView, Tone};
use crate::models::{Language, NewsData, NewsItem, NewsOverall};

pub const MAX_KEYWORDS: usize = 10;
pub const MAX_NEWS_ITEMS: usize = 5;

pub fn localized_sentiment(label: &str, language: Language) -> String {
    let normalized = label.trim().to_ascii_lowercase();
    let known = match normalized.as_str() {
        "bullish" | "positive" => Some(("강세", "Bullish")),
        "bearish" | "negative" => Some(("약세", "Bearish")),
        "mixed" => Some(("혼조", "Mixed")),
        "neutral" => Some(("중립", "Neutral")),
        _ => None,
    };
    match known {
        Some((ko, en)) => language.pick(ko, en).to_string(),
        None => sanitize_inline(label),
    }
}

fn sentiment_tone(label: &str) -> Tone {
    match label.trim().to_ascii_lowercase().as_str() {
        "bullish" | "positive" => Tone::Positive,
        "bearish" | "negative" => Tone::Negative,
        "mixed" => Tone::Caution,
        _ => Tone::Neutral,
    }
}

fn signed3(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:+.3}", v),
        _ => "N/A".to_string(),
    }
}

fn item_line(item: &NewsItem, with_score: bool) -> Option<String> {
    let title = item.title.as_deref().map(sanitize_inline)?;
    if title.is_empty() {
        return None;
    }
    let mut line = format!("• {}", title);
    if with_score && item.score.is_some() {
        line.push_str(&format!(" ({})", signed3(item.score)));
    }
    let tags: Vec<String> = item
        .impact_tags
        .iter()
        .map(|t| sanitize_inline(t))
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    if let Some(at) = item.published_at() {
        line.push_str(&format!(" · {}", at.format("%Y-%m-%d %H:%M")));
    }
    Some(line)
}

fn link_line(item: &NewsItem) -> Option<String> {
    item.link
        .as_deref()
        .map(sanitize_inline)
        .filter(|l| !l.is_empty())
        .map(|l| format!("  {}", l))
}

fn push_items(view: &mut SectionView, items: &[NewsItem], with_score: bool) {
    let mut shown = 0;
    for item in items {
        if shown == MAX_NEWS_ITEMS {
            break;
        }
        if let Some(line) = item_line(item, with_score) {
            view.lines.push(line);
            if let Some(link) = link_line(item) {
                view.lines.push(link);
            }
            shown += 1;
        }
    }
}

fn render_overall(overall: &NewsOverall, items: &[NewsItem], language: Language) -> SectionView {
    let mut view = SectionView::new(language.pick("뉴스 심리", "News sentiment"));
    let label = overall.label.as_deref().unwrap_or("mixed");
    view.badges.push(Badge::new(
        localized_sentiment(label, language),
        sentiment_tone(label),
    ));

    view.fields.push(Field::new(
        language.pick("심리 점수", "Score"),
        signed3(overall.score),
    ));
    view.fields.push(Field::new(
        language.pick("영향도", "Impact"),
        signed3(overall.impact),
    ));
    view.fields.push(Field::new(
        language.pick("기사 수", "Articles"),
        format!(
            "+{} / -{} / ={}",
            overall.pos, overall.neg, overall.neu
        ),
    ));

    let keywords: Vec<String> = overall
        .keywords
        .iter()
        .map(|k| sanitize_inline(k))
        .filter(|k| !k.is_empty())
        .take(MAX_KEYWORDS)
        .collect();
    if !keywords.is_empty() {
        view.fields.push(Field::new(
            language.pick("키워드", "Keywords"),
            keywords.join(", "),
        ));
    }

    push_items(&mut view, items, true);
    view
}

/// Sentiment summary when present, else the plain headline list, else a
/// "no analysis" placeholder.
pub fn render_news(news: &NewsData, language: Language) -> SectionView {
    if let Some(summary) = &news.analysis {
        if let Some(overall) = &summary.overall {
            return render_overall(overall, &summary.items, language);
        }
    }

    let headlines = if !news.headlines.is_empty() {
        news.headlines.as_slice()
    } else {
        news.analysis
            .as_ref()
            .map(|s| s.items.as_slice())
            .unwrap_or_default()
    };

    let mut view = SectionView::new(language.pick("뉴스", "Headlines"));
    push_items(&mut view, headlines, false);
    if view.lines.is_empty() {
        return SectionView::placeholder(
            language.pick("뉴스 심리", "News sentiment"),
            language.pick("뉴스 분석이 없습니다", "No news analysis available"),
        );
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsSentimentSummary;

    fn item(title: &str, score: Option<f64>) -> NewsItem {
        NewsItem {
            title: Some(title.to_string()),
            link: Some(format!("https://news.example/{}", title.len())),
            publish_time: Some(1_726_000_000),
            score,
            impact_tags: vec!["earnings".to_string()],
        }
    }

    fn summary(keywords: usize, items: usize) -> NewsData {
        NewsData {
            analysis: Some(NewsSentimentSummary {
                overall: Some(NewsOverall {
                    label: Some("bullish".into()),
                    score: Some(0.4216),
                    impact: Some(-0.05),
                    pos: 7,
                    neg: 2,
                    neu: 3,
                    keywords: (0..keywords).map(|i| format!("kw{i}")).collect(),
                }),
                items: (0..items).map(|i| item(&format!("story {i}"), Some(0.1))).collect(),
            }),
            headlines: Vec::new(),
        }
    }

    #[test]
    fn overall_renders_label_scores_and_counts() {
        let view = render_news(&summary(3, 2), Language::En);
        assert_eq!(view.badges, vec![Badge::new("Bullish", Tone::Positive)]);
        let fields: Vec<(&str, &str)> = view
            .fields
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Score", "+0.422"),
                ("Impact", "-0.050"),
                ("Articles", "+7 / -2 / =3"),
                ("Keywords", "kw0, kw1, kw2"),
            ]
        );
    }

    #[test]
    fn keywords_and_items_are_capped() {
        let view = render_news(&summary(25, 12), Language::En);
        let keywords = &view.fields.last().unwrap().value;
        assert_eq!(keywords.split(", ").count(), MAX_KEYWORDS);
        let items = view.lines.iter().filter(|l| l.starts_with('•')).count();
        assert_eq!(items, MAX_NEWS_ITEMS);
    }

    #[test]
    fn korean_label_is_localized() {
        let view = render_news(&summary(0, 0), Language::Ko);
        assert_eq!(view.badges[0].label, "강세");
    }

    #[test]
    fn falls_back_to_headlines_then_placeholder() {
        let headlines = NewsData {
            analysis: None,
            headlines: vec![item("Apple unveils", None)],
        };
        let view = render_news(&headlines, Language::En);
        assert_eq!(view.title, "Headlines");
        assert!(view.lines[0].starts_with("• Apple unveils [earnings] · 2024-09-10"));

        let view = render_news(&NewsData::default(), Language::En);
        assert_eq!(view.placeholder.as_deref(), Some("No news analysis available"));
    }

    #[test]
    fn titles_are_sanitized() {
        let news = NewsData {
            analysis: None,
            headlines: vec![item("\u{1b}[2JWiped", None)],
        };
        let view = render_news(&news, Language::En);
        assert!(view.lines[0].starts_with("• Wiped"));
    }
}
