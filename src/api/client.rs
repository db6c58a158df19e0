use crate::api::error::{ClientError, ClientResult};
use crate::api::http::{HttpClient, RequestOptions};
use crate::models::{
    AgentRequest, AgentResponse, AnalyseRequest, AnalysisResult, HealthStatus, PredictRequest,
    PredictionResult,
};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT_LANGUAGE};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Per-endpoint timeouts. `/analyse` and `/agent` run LLM calls server-side.
#[derive(Clone, Copy, Debug)]
pub struct Timeouts {
    pub health: Duration,
    pub analyse: Duration,
    pub agent: Duration,
    pub predict: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(9),
            analyse: Duration::from_secs(25),
            agent: Duration::from_secs(25),
            predict: Duration::from_secs(9),
        }
    }
}

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn health(&self, cancel: CancellationToken) -> ClientResult<HealthStatus>;

    async fn analyse(
        &self,
        request: &AnalyseRequest,
        cancel: CancellationToken,
    ) -> ClientResult<AnalysisResult>;

    async fn agent(
        &self,
        request: &AgentRequest,
        cancel: CancellationToken,
    ) -> ClientResult<AgentResponse>;

    async fn predict(
        &self,
        request: &PredictRequest,
        cancel: CancellationToken,
    ) -> ClientResult<PredictionResult>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    timeouts: Timeouts,
}

impl ApiClient {
    pub fn new(base_url: &str, timeouts: Timeouts) -> Self {
        Self {
            http: HttpClient::new(base_url, timeouts.analyse),
            timeouts,
        }
    }
}

#[async_trait]
impl AnalysisApi for ApiClient {
    #[instrument(skip(self, cancel))]
    async fn health(&self, cancel: CancellationToken) -> ClientResult<HealthStatus> {
        self.http
            .get_json(
                "/health",
                RequestOptions::with_timeout(self.timeouts.health).cancellable(cancel),
            )
            .await
    }

    #[instrument(skip(self, cancel), fields(query = %request.query))]
    async fn analyse(
        &self,
        request: &AnalyseRequest,
        cancel: CancellationToken,
    ) -> ClientResult<AnalysisResult> {
        let raw: Value = self
            .http
            .post_json(
                "/analyse",
                request,
                RequestOptions::with_timeout(self.timeouts.analyse)
                    .cancellable(cancel)
                    .header(ACCEPT_LANGUAGE, HeaderValue::from_static(request.language.code())),
            )
            .await?;
        AnalysisResult::from_value(raw).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    #[instrument(skip(self, cancel), fields(query = %request.query))]
    async fn agent(
        &self,
        request: &AgentRequest,
        cancel: CancellationToken,
    ) -> ClientResult<AgentResponse> {
        let raw: Value = self
            .http
            .post_json(
                "/agent",
                request,
                RequestOptions::with_timeout(self.timeouts.agent)
                    .cancellable(cancel)
                    .header(ACCEPT_LANGUAGE, HeaderValue::from_static(request.language.code())),
            )
            .await?;
        if !raw.is_object() {
            return Err(ClientError::Malformed(
                "expected a JSON object from /agent".to_string(),
            ));
        }
        Ok(AgentResponse::from_value(raw))
    }

    #[instrument(skip(self, cancel), fields(symbol = %request.symbol))]
    async fn predict(
        &self,
        request: &PredictRequest,
        cancel: CancellationToken,
    ) -> ClientResult<PredictionResult> {
        self.http
            .post_json(
                "/predict",
                request,
                RequestOptions::with_timeout(self.timeouts.predict).cancellable(cancel),
            )
            .await
    }
}
