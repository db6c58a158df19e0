//! Pure mappings from response data to a presentation-agnostic view model.
//! The terminal UI and the `--once` printer both consume `SectionView`.

mod news;
mod prediction;
mod ratio;
mod text;

pub use news::render_news;
pub use prediction::{format_price, render_prediction};
pub use ratio::{render_overview, render_ratios};
pub use text::{render_health, render_narrative, render_summary, sanitize_inline};

use crate::models::{ExtraSection, ExtrasPreferences, Language};
use crate::section::{ExtrasSections, SectionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Caution,
    Neutral,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: String,
    pub tag: Option<Badge>,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            tag: None,
        }
    }

    pub fn tagged(mut self, tag: Badge) -> Self {
        self.tag = Some(tag);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SectionView {
    pub title: String,
    pub badges: Vec<Badge>,
    pub fields: Vec<Field>,
    pub lines: Vec<String>,
    pub placeholder: Option<String>,
}

impl SectionView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn placeholder(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            placeholder: Some(message.into()),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}

pub fn section_title(section: ExtraSection, language: Language) -> &'static str {
    match section {
        ExtraSection::Prediction => language.pick("가격 예측", "Prediction"),
        ExtraSection::Summary => language.pick("요약", "Summary"),
        ExtraSection::News => language.pick("뉴스 심리", "News sentiment"),
    }
}

fn render_state<T>(
    title: &str,
    state: &SectionState<T>,
    language: Language,
    ready: impl FnOnce(&T) -> SectionView,
) -> SectionView {
    match state {
        SectionState::NotRequested => SectionView::placeholder(
            title,
            language.pick(
                "요청되지 않음 · Enter로 다시 조회",
                "Not requested · press Enter to fetch",
            ),
        ),
        SectionState::Loading => {
            SectionView::placeholder(title, language.pick("불러오는 중…", "Loading…"))
        }
        SectionState::Unavailable(reason) => {
            let mut view = SectionView::placeholder(
                title,
                language.pick("사용할 수 없음", "Unavailable"),
            );
            if !reason.is_empty() {
                view.lines.push(sanitize_inline(reason));
            }
            view
        }
        SectionState::Ready(data) => ready(data),
    }
}

/// Views for the extras the user currently wants to see. Visibility follows
/// `visible` at call time, independent of what is in flight.
pub fn render_extras(
    sections: &ExtrasSections,
    visible: &ExtrasPreferences,
    language: Language,
) -> Vec<(ExtraSection, SectionView)> {
    ExtraSection::ALL
        .into_iter()
        .filter(|section| visible.wants(*section))
        .map(|section| {
            let title = section_title(section, language);
            let view = match section {
                ExtraSection::Prediction => render_state(title, &sections.prediction, language, |p| {
                    render_prediction(p, language)
                }),
                ExtraSection::Summary => render_state(title, &sections.summary, language, |s| {
                    render_summary(s, language)
                }),
                ExtraSection::News => render_state(title, &sections.news, language, |n| {
                    render_news(n, language)
                }),
            };
            (section, view)
        })
        .collect()
}
