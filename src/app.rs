use crate::api::ClientError;
use crate::models::{
    AgentRequest, AgentResponse, AnalyseRequest, AnalysisResult, ExtraSection, ExtrasPreferences,
    HealthStatus, Language, PredictRequest, PredictionResult, Ticker, ValidationError,
};
use crate::patch_notes::PatchNotes;
use crate::progress::ProgressIndicator;
use crate::section::{ExtrasSections, SectionState};
use crate::slot::{RequestSlot, RequestTicket};
use serde_json::Value;
use tracing::{debug, info, warn};

const MAX_TICKER_LEN: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Ticker,
    Options,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionItem {
    Language,
    Narrative,
    Prediction,
    Summary,
    News,
    RawJson,
}

impl OptionItem {
    pub const ALL: [OptionItem; 6] = [
        OptionItem::Language,
        OptionItem::Narrative,
        OptionItem::Prediction,
        OptionItem::Summary,
        OptionItem::News,
        OptionItem::RawJson,
    ];

    pub fn label(self, language: Language) -> &'static str {
        match self {
            OptionItem::Language => language.pick("언어", "Language"),
            OptionItem::Narrative => language.pick("분석 설명", "Narrative"),
            OptionItem::Prediction => language.pick("가격 예측", "Prediction"),
            OptionItem::Summary => language.pick("요약", "Summary"),
            OptionItem::News => language.pick("뉴스 심리", "News"),
            OptionItem::RawJson => language.pick("원본 JSON", "Raw JSON"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NoticeKind {
    Info,
    Validation,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub enum HealthState {
    #[default]
    Unknown,
    Checking,
    Online(HealthStatus),
    Offline(String),
}

/// What a primary run needs after the lock is released.
#[derive(Debug)]
pub struct AnalysisPlan {
    pub ticker: Ticker,
    pub language: Language,
    pub preferences: ExtrasPreferences,
    pub request: AnalyseRequest,
    pub ticket: RequestTicket,
}

#[derive(Debug)]
pub struct ExtrasPlan {
    pub requested: ExtrasPreferences,
    pub request: AgentRequest,
    pub ticket: RequestTicket,
}

#[derive(Debug)]
pub struct PredictPlan {
    pub request: PredictRequest,
    pub ticket: RequestTicket,
}

pub struct App {
    pub ticker_input: String,
    pub language: Language,
    pub preferences: ExtrasPreferences,
    pub show_json: bool,
    pub focus: Focus,
    pub option_cursor: usize,
    pub analysis: ProgressIndicator<AnalysisResult>,
    pub analysis_slot: RequestSlot,
    pub extras: ExtrasSections,
    pub extras_slot: RequestSlot,
    pub predict_slot: RequestSlot,
    pub agent_raw: Option<Value>,
    pub health: HealthState,
    pub health_slot: RequestSlot,
    pub notice: Option<Notice>,
    pub patch_notes: PatchNotes,
    pub patch_notes_open: bool,
    pub animation_frame: u32,
}

impl App {
    pub fn new(language: Language, preferences: ExtrasPreferences, patch_notes: PatchNotes) -> Self {
        Self {
            ticker_input: String::new(),
            language,
            preferences,
            show_json: false,
            focus: Focus::Ticker,
            option_cursor: 0,
            analysis: ProgressIndicator::new(),
            analysis_slot: RequestSlot::new(),
            extras: ExtrasSections::default(),
            extras_slot: RequestSlot::new(),
            predict_slot: RequestSlot::new(),
            agent_raw: None,
            health: HealthState::Unknown,
            health_slot: RequestSlot::new(),
            notice: None,
            patch_notes,
            patch_notes_open: false,
            animation_frame: 0,
        }
    }

    // ---- form ----

    pub fn push_ticker_char(&mut self, c: char) {
        let allowed = c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=');
        if allowed && self.ticker_input.len() < MAX_TICKER_LEN {
            self.ticker_input.push(c.to_ascii_uppercase());
        }
    }

    pub fn pop_ticker_char(&mut self) {
        self.ticker_input.pop();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Ticker => Focus::Options,
            Focus::Options => Focus::Ticker,
        };
    }

    pub fn move_option_cursor(&mut self, delta: isize) {
        let len = OptionItem::ALL.len() as isize;
        let next = (self.option_cursor as isize + delta).rem_euclid(len);
        self.option_cursor = next as usize;
    }

    pub fn selected_option(&self) -> OptionItem {
        OptionItem::ALL[self.option_cursor.min(OptionItem::ALL.len() - 1)]
    }

    pub fn toggle_selected_option(&mut self) {
        self.toggle_option(self.selected_option());
    }

    /// Takes effect on the visible sections immediately, whatever is in flight.
    pub fn toggle_option(&mut self, option: OptionItem) {
        match option {
            OptionItem::Language => self.language = self.language.toggled(),
            OptionItem::Narrative => self.preferences.narrative = !self.preferences.narrative,
            OptionItem::Prediction => self.toggle_section(ExtraSection::Prediction),
            OptionItem::Summary => self.toggle_section(ExtraSection::Summary),
            OptionItem::News => self.toggle_section(ExtraSection::News),
            OptionItem::RawJson => self.show_json = !self.show_json,
        }
    }

    pub fn toggle_section(&mut self, section: ExtraSection) {
        let enabled = self.preferences.wants(section);
        self.preferences.set(section, !enabled);
    }

    pub fn option_enabled(&self, option: OptionItem) -> bool {
        match option {
            OptionItem::Language => self.language.is_korean(),
            OptionItem::Narrative => self.preferences.narrative,
            OptionItem::Prediction => self.preferences.prediction,
            OptionItem::Summary => self.preferences.summary,
            OptionItem::News => self.preferences.news,
            OptionItem::RawJson => self.show_json,
        }
    }

    pub fn set_notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ---- primary analysis ----

    /// Validates the form and issues the primary request ticket. An empty
    /// ticker is reported and nothing is issued.
    pub fn begin_analysis(&mut self) -> Result<AnalysisPlan, ValidationError> {
        let ticker = match Ticker::parse(&self.ticker_input) {
            Ok(ticker) => ticker,
            Err(e) => {
                self.set_notice(NoticeKind::Validation, e.to_string());
                return Err(e);
            }
        };
        self.ticker_input = ticker.as_str().to_string();
        self.clear_notice();

        let ticket = self.analysis_slot.begin();
        self.analysis.start();
        info!(ticker = %ticker, language = self.language.code(), "analysis started");

        Ok(AnalysisPlan {
            request: AnalyseRequest::new(&ticker, self.language),
            ticker,
            language: self.language,
            preferences: self.preferences,
            ticket,
        })
    }

    /// Applies the primary outcome. Returns the extras plan to run next, if
    /// the run is still current, succeeded and wants extras.
    pub fn settle_analysis(
        &mut self,
        plan: &AnalysisPlan,
        outcome: Result<AnalysisResult, ClientError>,
    ) -> Option<ExtrasPlan> {
        if !self.analysis_slot.settle(&plan.ticket) {
            debug!(ticker = %plan.ticker, "dropping superseded analysis");
            return None;
        }
        match outcome {
            Ok(result) => {
                if let Err(e) = self.analysis.finish(result) {
                    warn!(error = %e, "analysis finished outside a running progress bar");
                }
                if plan.preferences.wants_extras() {
                    Some(self.begin_extras(plan))
                } else {
                    self.extras_slot.cancel();
                    self.predict_slot.cancel();
                    self.extras.clear_all();
                    self.agent_raw = None;
                    None
                }
            }
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!(ticker = %plan.ticker, error = %e, "analysis failed");
                let message = format!("{}: {}", plan.ticker, e);
                if let Err(progress_err) = self.analysis.fail(message.clone()) {
                    debug!(error = %progress_err, "progress already settled");
                }
                self.set_notice(NoticeKind::Error, message);
                None
            }
        }
    }

    // ---- extras ----

    fn begin_extras(&mut self, plan: &AnalysisPlan) -> ExtrasPlan {
        let ticket = self.extras_slot.begin();
        self.predict_slot.cancel();
        self.extras.begin(&plan.preferences);
        ExtrasPlan {
            requested: plan.preferences,
            request: AgentRequest::new(&plan.ticker, plan.language, &plan.preferences),
            ticket,
        }
    }

    pub fn settle_extras(&mut self, plan: &ExtrasPlan, outcome: Result<AgentResponse, ClientError>) {
        if !self.extras_slot.settle(&plan.ticket) {
            debug!(generation = plan.ticket.generation(), "dropping superseded extras");
            return;
        }
        let keep_prediction = self.predict_slot.is_pending();
        match outcome {
            Ok(response) => {
                self.agent_raw = Some(response.raw.clone());
                self.extras.apply(&plan.requested, response, keep_prediction);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                warn!(error = %e, "extras failed");
                self.extras
                    .mark_unavailable(&plan.requested, &e.to_string(), keep_prediction);
            }
        }
    }

    // ---- forced prediction ----

    /// The most recently analysed ticker, even if its report is still in the
    /// completion pause, else whatever is typed.
    pub fn current_symbol(&self) -> Option<Ticker> {
        self.analysis
            .latest()
            .and_then(|a| a.core.ticker.as_deref())
            .and_then(|t| Ticker::parse(t).ok())
            .or_else(|| Ticker::parse(&self.ticker_input).ok())
    }

    pub fn begin_force_predict(&mut self) -> Result<PredictPlan, ValidationError> {
        let Some(ticker) = self.current_symbol() else {
            let e = ValidationError::EmptyTicker;
            self.set_notice(NoticeKind::Validation, e.to_string());
            return Err(e);
        };
        let ticket = self.predict_slot.begin();
        self.preferences.prediction = true;
        self.extras.set_loading(ExtraSection::Prediction);
        let label = self
            .language
            .pick("예측 갱신 중:", "Refreshing prediction for");
        self.set_notice(NoticeKind::Info, format!("{label} {ticker}"));
        info!(ticker = %ticker, "forced prediction started");
        Ok(PredictPlan {
            request: PredictRequest {
                symbol: ticker.as_str().to_string(),
                force: true,
            },
            ticket,
        })
    }

    pub fn settle_force_predict(
        &mut self,
        plan: &PredictPlan,
        outcome: Result<PredictionResult, ClientError>,
    ) {
        if !self.predict_slot.settle(&plan.ticket) {
            debug!("dropping superseded prediction");
            return;
        }
        if matches!(&self.notice, Some(n) if n.kind == NoticeKind::Info) {
            self.clear_notice();
        }
        self.extras.prediction = match outcome {
            Ok(prediction) => SectionState::Ready(prediction),
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                warn!(error = %e, "forced prediction failed");
                SectionState::Unavailable(e.to_string())
            }
        };
    }

    // ---- health ----

    /// A re-check supersedes one still in flight.
    pub fn begin_health_check(&mut self) -> RequestTicket {
        self.health = HealthState::Checking;
        self.health_slot.begin()
    }

    pub fn settle_health(
        &mut self,
        ticket: &RequestTicket,
        outcome: Result<HealthStatus, ClientError>,
    ) {
        if !self.health_slot.settle(ticket) {
            debug!("dropping superseded health check");
            return;
        }
        self.health = match outcome {
            Ok(status) => HealthState::Online(status),
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                warn!(error = %e, "health check failed");
                HealthState::Offline(e.to_string())
            }
        };
    }

    // ---- patch notes ----

    pub fn open_patch_notes(&mut self) {
        self.patch_notes_open = true;
    }

    pub fn close_patch_notes(&mut self) {
        self.patch_notes_open = false;
        if let Err(e) = self.patch_notes.acknowledge() {
            warn!(error = %e, "could not save patch notes state");
        }
    }

    // ---- animation ----

    pub fn is_loading(&self) -> bool {
        self.analysis.is_active()
            || self.extras_slot.is_pending()
            || self.predict_slot.is_pending()
    }

    pub fn tick(&mut self) {
        self.analysis.tick();
        if self.is_loading() || self.analysis.content().is_none() {
            self.animation_frame = self.animation_frame.wrapping_add(1);
        } else {
            self.animation_frame = 0;
        }
    }

    /// Cancels everything in flight.
    pub fn shutdown(&mut self) {
        self.analysis_slot.cancel();
        self.extras_slot.cancel();
        self.predict_slot.cancel();
        self.health_slot.cancel();
    }
}
