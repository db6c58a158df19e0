use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a ticker symbol first")]
    EmptyTicker,
}

/// Upper-cased, trimmed ticker symbol. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Ko => "한국어",
            Language::En => "English",
        }
    }

    pub fn is_korean(self) -> bool {
        self.code().starts_with("ko")
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::Ko => Language::En,
            Language::En => Language::Ko,
        }
    }

    pub fn pick(self, ko: &'static str, en: &'static str) -> &'static str {
        if self.is_korean() {
            ko
        } else {
            en
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExtraSection {
    Prediction,
    Summary,
    News,
}

impl ExtraSection {
    pub const ALL: [ExtraSection; 3] = [
        ExtraSection::Prediction,
        ExtraSection::Summary,
        ExtraSection::News,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtrasPreferences {
    pub narrative: bool,
    pub prediction: bool,
    pub summary: bool,
    pub news: bool,
}

impl Default for ExtrasPreferences {
    fn default() -> Self {
        Self {
            narrative: true,
            prediction: true,
            summary: true,
            news: true,
        }
    }
}

impl ExtrasPreferences {
    pub fn wants(&self, section: ExtraSection) -> bool {
        match section {
            ExtraSection::Prediction => self.prediction,
            ExtraSection::Summary => self.summary,
            ExtraSection::News => self.news,
        }
    }

    pub fn set(&mut self, section: ExtraSection, enabled: bool) {
        match section {
            ExtraSection::Prediction => self.prediction = enabled,
            ExtraSection::Summary => self.summary = enabled,
            ExtraSection::News => self.news = enabled,
        }
    }

    /// True when the secondary `/agent` call has anything to fetch.
    pub fn wants_extras(&self) -> bool {
        self.prediction || self.summary || self.news
    }
}

// ---- requests ----

#[derive(Debug, Clone, Serialize)]
pub struct AnalyseRequest {
    pub query: String,
    pub language: Language,
}

impl AnalyseRequest {
    pub fn new(ticker: &Ticker, language: Language) -> Self {
        Self {
            query: ticker.as_str().to_string(),
            language,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentRequest {
    pub query: String,
    pub language: Language,
    pub include_news: bool,
}

impl AgentRequest {
    pub fn new(ticker: &Ticker, language: Language, preferences: &ExtrasPreferences) -> Self {
        Self {
            query: ticker.as_str().to_string(),
            language,
            include_news: preferences.news,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub symbol: String,
    pub force: bool,
}

// ---- /health ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub finance_llm: Option<LlmStatus>,
    #[serde(default)]
    pub agent_llm: Option<LlmStatus>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

// ---- /analyse ----

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RatioNode {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default)]
    pub band: Option<String>,
}

pub type RatioCategory = BTreeMap<String, Option<RatioNode>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreAnalysis {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub ratios: BTreeMap<String, RatioCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisMeta {
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisResult {
    pub core: CoreAnalysis,
    #[serde(default)]
    pub meta: AnalysisMeta,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl AnalysisResult {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let mut result: AnalysisResult = serde_json::from_value(raw.clone())?;
        result.raw = raw;
        Ok(result)
    }

    pub fn ratio(&self, category: &str, name: &str) -> Option<&RatioNode> {
        self.core
            .ratios
            .get(category)
            .and_then(|c| c.get(name))
            .and_then(Option::as_ref)
    }
}

// ---- /predict and /agent.prediction ----

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "BUY" => Signal::Buy,
            "SELL" => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictionResult {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_signal")]
    pub signal: Signal,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub last_close: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub live_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pred_ret_1d: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pred_close_1d: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub ts: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---- news ----

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(
        default,
        alias = "providerPublishTime",
        alias = "published",
        deserialize_with = "lenient_timestamp"
    )]
    pub publish_time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
    #[serde(default, alias = "tags", deserialize_with = "lenient_strings")]
    pub impact_tags: Vec<String>,
}

impl NewsItem {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.publish_time
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewsOverall {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub impact: Option<f64>,
    #[serde(default, alias = "positive", deserialize_with = "lenient_count")]
    pub pos: u32,
    #[serde(default, alias = "negative", deserialize_with = "lenient_count")]
    pub neg: u32,
    #[serde(default, alias = "neutral", deserialize_with = "lenient_count")]
    pub neu: u32,
    #[serde(default, alias = "top_keywords", deserialize_with = "lenient_strings")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewsSentimentSummary {
    #[serde(default)]
    pub overall: Option<NewsOverall>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<NewsItem>,
}

/// Everything the news section can be rendered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsData {
    pub analysis: Option<NewsSentimentSummary>,
    pub headlines: Vec<NewsItem>,
}

// ---- /agent ----

/// `/agent` payload decoded field by field, so one malformed field only
/// blanks its own section.
#[derive(Debug, Clone, Default)]
pub struct AgentResponse {
    pub prediction: Option<PredictionResult>,
    pub summary: Option<String>,
    pub news: NewsData,
    pub raw: Value,
}

impl AgentResponse {
    pub fn from_value(raw: Value) -> Self {
        let prediction = present(&raw, "prediction").and_then(decode::<PredictionResult>);
        let summary = present(&raw, "summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let analysis = present(&raw, "news_analysis").and_then(decode::<NewsSentimentSummary>);
        let headlines = present(&raw, "news")
            .map(headlines_from_value)
            .unwrap_or_default();

        Self {
            prediction,
            summary,
            news: NewsData {
                analysis,
                headlines,
            },
            raw,
        }
    }
}

fn present<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|v| !v.is_null())
}

fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed field");
            None
        }
    }
}

/// The `news` field is either a list of headlines or an object wrapping one.
pub fn headlines_from_value(value: &Value) -> Vec<NewsItem> {
    let list = match value {
        Value::Array(_) => Some(value),
        Value::Object(map) => ["items", "headlines", "articles"]
            .iter()
            .find_map(|key| map.get(*key).filter(|v| v.is_array())),
        _ => None,
    };
    list.and_then(Value::as_array)
        .map(|items| items.iter().filter_map(decode::<NewsItem>).collect())
        .unwrap_or_default()
}

// ---- lenient field decoding ----

pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map(|ts| ts as i64))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|n| *n >= 0.0)
        .map(|n| n as u32)
        .unwrap_or(0))
}

fn lenient_signal<'de, D>(deserializer: D) -> Result<Signal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .map(Signal::from_label)
        .unwrap_or_default())
}

/// Accepts `["a", "b"]` as well as `[["a", 3], ["b", 1]]` keyword tallies.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Array(pair) => pair.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .filter(|s| !s.trim().is_empty())
        .collect())
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(decode::<T>).collect())
}
