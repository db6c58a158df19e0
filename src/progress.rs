use thiserror::Error;

/// The fake percentage eases toward this and never passes it while running.
pub const PROGRESS_CEILING: f64 = 95.0;
/// Ticks the bar stays at 100% before the content is swapped in.
pub const COMPLETING_TICKS: u8 = 6;

const EASING: f64 = 0.06;
const MIN_STEP: f64 = 0.2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("progress indicator is not running")]
    NotRunning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressState {
    Idle,
    Running,
    Completing { ticks_left: u8 },
    Finished,
    Failed(String),
}

/// Cosmetic loading bar for one outstanding request.
///
/// `content` holds the last finished result and survives `start` and
/// `fail`, so a failed refresh leaves the previous display in place.
#[derive(Debug)]
pub struct ProgressIndicator<T> {
    state: ProgressState,
    percent: f64,
    pending: Option<T>,
    content: Option<T>,
}

impl<T> Default for ProgressIndicator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ProgressIndicator<T> {
    pub fn new() -> Self {
        Self {
            state: ProgressState::Idle,
            percent: 0.0,
            pending: None,
            content: None,
        }
    }

    /// A result still waiting out its completion pause is kept as content.
    pub fn start(&mut self) {
        self.complete_now();
        self.state = ProgressState::Running;
        self.percent = 0.0;
        self.pending = None;
    }

    pub fn finish(&mut self, content: T) -> Result<(), ProgressError> {
        if self.state != ProgressState::Running {
            return Err(ProgressError::NotRunning);
        }
        self.percent = 100.0;
        self.pending = Some(content);
        self.state = ProgressState::Completing {
            ticks_left: COMPLETING_TICKS,
        };
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ProgressError> {
        if self.state != ProgressState::Running {
            return Err(ProgressError::NotRunning);
        }
        self.state = ProgressState::Failed(message.into());
        Ok(())
    }

    /// Advances the animation. Returns true when new content was swapped in.
    pub fn tick(&mut self) -> bool {
        match self.state {
            ProgressState::Running => {
                let step = ((PROGRESS_CEILING - self.percent) * EASING).max(MIN_STEP);
                self.percent = (self.percent + step).min(PROGRESS_CEILING);
                false
            }
            ProgressState::Completing { ticks_left } if ticks_left > 1 => {
                self.state = ProgressState::Completing {
                    ticks_left: ticks_left - 1,
                };
                false
            }
            ProgressState::Completing { .. } => {
                self.swap_in();
                true
            }
            _ => false,
        }
    }

    /// Skips the completed-state pause, for callers that do not animate.
    pub fn complete_now(&mut self) {
        if matches!(self.state, ProgressState::Completing { .. }) {
            self.swap_in();
        }
    }

    fn swap_in(&mut self) {
        if let Some(content) = self.pending.take() {
            self.content = Some(content);
        }
        self.state = ProgressState::Finished;
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn percent(&self) -> u16 {
        self.percent.round() as u16
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            ProgressState::Running | ProgressState::Completing { .. }
        )
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            ProgressState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// The newest settled result, including one still in its completion
    /// pause and not yet shown.
    pub fn latest(&self) -> Option<&T> {
        self.pending.as_ref().or(self.content.as_ref())
    }
}
