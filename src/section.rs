use crate::models::{AgentResponse, ExtraSection, ExtrasPreferences, NewsData, PredictionResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SectionState<T> {
    #[default]
    NotRequested,
    Loading,
    Ready(T),
    Unavailable(String),
}

impl<T> SectionState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SectionState::Loading)
    }

    fn settle(&mut self, data: Option<T>, missing: &str) {
        *self = match data {
            Some(data) => SectionState::Ready(data),
            None => SectionState::Unavailable(missing.to_string()),
        };
    }
}

/// Prediction, summary and news, each settling on its own.
#[derive(Debug, Clone, Default)]
pub struct ExtrasSections {
    pub prediction: SectionState<PredictionResult>,
    pub summary: SectionState<String>,
    pub news: SectionState<NewsData>,
}

impl ExtrasSections {
    /// Requested sections go to Loading; the rest are cleared so stale data
    /// for a previous ticker is never shown.
    pub fn begin(&mut self, requested: &ExtrasPreferences) {
        for section in ExtraSection::ALL {
            if requested.wants(section) {
                self.set_loading(section);
            } else {
                self.clear(section);
            }
        }
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn set_loading(&mut self, section: ExtraSection) {
        match section {
            ExtraSection::Prediction => self.prediction = SectionState::Loading,
            ExtraSection::Summary => self.summary = SectionState::Loading,
            ExtraSection::News => self.news = SectionState::Loading,
        }
    }

    fn clear(&mut self, section: ExtraSection) {
        match section {
            ExtraSection::Prediction => self.prediction = SectionState::NotRequested,
            ExtraSection::Summary => self.summary = SectionState::NotRequested,
            ExtraSection::News => self.news = SectionState::NotRequested,
        }
    }

    /// Applies a successful `/agent` payload. `keep_prediction` leaves the
    /// prediction alone when a forced `/predict` owns it.
    pub fn apply(
        &mut self,
        requested: &ExtrasPreferences,
        response: AgentResponse,
        keep_prediction: bool,
    ) {
        if requested.prediction && !keep_prediction {
            self.prediction
                .settle(response.prediction, "No prediction returned");
        }
        if requested.summary {
            self.summary.settle(response.summary, "No summary returned");
        }
        if requested.news {
            let news = response.news;
            let has_news = news.analysis.is_some() || !news.headlines.is_empty();
            self.news.settle(has_news.then_some(news), "No news returned");
        }
    }

    pub fn mark_unavailable(
        &mut self,
        requested: &ExtrasPreferences,
        reason: &str,
        keep_prediction: bool,
    ) {
        if requested.prediction && !keep_prediction {
            self.prediction = SectionState::Unavailable(reason.to_string());
        }
        if requested.summary {
            self.summary = SectionState::Unavailable(reason.to_string());
        }
        if requested.news {
            self.news = SectionState::Unavailable(reason.to_string());
        }
    }
}
