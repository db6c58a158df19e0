use crate::api::Timeouts;
use crate::models::{ExtrasPreferences, Language};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Terminal client for the ratio analysis service.
#[derive(Parser, Debug, Clone)]
#[command(name = "tickview", version, about)]
pub struct Config {
    /// Base URL of the analysis API
    #[arg(long, env = "TICKVIEW_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Ticker to analyse on startup
    #[arg(long, env = "TICKVIEW_TICKER")]
    pub ticker: Option<String>,

    #[arg(long, value_enum, env = "TICKVIEW_LANGUAGE", default_value = "ko")]
    pub language: Language,

    /// Hide the narrative explanation
    #[arg(long)]
    pub no_narrative: bool,

    /// Skip the price prediction
    #[arg(long)]
    pub no_prediction: bool,

    /// Skip the LLM summary
    #[arg(long)]
    pub no_summary: bool,

    /// Skip news sentiment
    #[arg(long)]
    pub no_news: bool,

    /// Show raw JSON responses
    #[arg(long)]
    pub show_json: bool,

    #[arg(long, env = "TICKVIEW_HEALTH_TIMEOUT_SECS", default_value_t = 9)]
    pub health_timeout_secs: u64,

    #[arg(long, env = "TICKVIEW_ANALYSE_TIMEOUT_SECS", default_value_t = 25)]
    pub analyse_timeout_secs: u64,

    #[arg(long, env = "TICKVIEW_AGENT_TIMEOUT_SECS", default_value_t = 25)]
    pub agent_timeout_secs: u64,

    #[arg(long, env = "TICKVIEW_PREDICT_TIMEOUT_SECS", default_value_t = 9)]
    pub predict_timeout_secs: u64,

    /// Where the last-read patch notes timestamp is kept
    #[arg(long, env = "TICKVIEW_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Log file for the interactive UI (defaults to the user cache dir)
    #[arg(long, env = "TICKVIEW_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Run one analysis for --ticker, print it and exit
    #[arg(long, requires = "ticker")]
    pub once: bool,
}

impl Config {
    pub fn preferences(&self) -> ExtrasPreferences {
        ExtrasPreferences {
            narrative: !self.no_narrative,
            prediction: !self.no_prediction,
            summary: !self.no_summary,
            news: !self.no_news,
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            health: Duration::from_secs(self.health_timeout_secs),
            analyse: Duration::from_secs(self.analyse_timeout_secs),
            agent: Duration::from_secs(self.agent_timeout_secs),
            predict: Duration::from_secs(self.predict_timeout_secs),
        }
    }

    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_file
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join("tickview").join("state.json")))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("tickview").join("tickview.log")))
    }
}
