use crate::api::AnalysisApi;
use crate::app::App;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Primary `/analyse`, then `/agent` for the requested extras.
///
/// The lock is only held to read the form and to write results; both
/// network calls run unlocked. Extras are never issued before the primary
/// settles, and a run superseded by a newer one writes nothing.
pub async fn run_analysis(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) {
    let plan = {
        let mut app_lock = app.lock().await;
        match app_lock.begin_analysis() {
            Ok(plan) => plan,
            Err(e) => {
                debug!(error = %e, "analysis not started");
                return;
            }
        }
    };

    let outcome = api.analyse(&plan.request, plan.ticket.token()).await;

    let extras = {
        let mut app_lock = app.lock().await;
        app_lock.settle_analysis(&plan, outcome)
    };
    let Some(extras) = extras else {
        return;
    };

    let outcome = api.agent(&extras.request, extras.ticket.token()).await;

    let mut app_lock = app.lock().await;
    app_lock.settle_extras(&extras, outcome);
}

/// `/predict` with `force: true` for the current ticker.
pub async fn run_force_predict(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) {
    let plan = {
        let mut app_lock = app.lock().await;
        match app_lock.begin_force_predict() {
            Ok(plan) => plan,
            Err(e) => {
                debug!(error = %e, "prediction not started");
                return;
            }
        }
    };

    let outcome = api.predict(&plan.request, plan.ticket.token()).await;

    let mut app_lock = app.lock().await;
    app_lock.settle_force_predict(&plan, outcome);
}

pub async fn run_health_check(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) {
    let ticket = app.lock().await.begin_health_check();
    let outcome = api.health(ticket.token()).await;
    app.lock().await.settle_health(&ticket, outcome);
}

pub fn spawn_analysis(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) -> JoinHandle<()> {
    tokio::spawn(run_analysis(app, api))
}

pub fn spawn_force_predict(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) -> JoinHandle<()> {
    tokio::spawn(run_force_predict(app, api))
}

pub fn spawn_health_check(app: Arc<Mutex<App>>, api: Arc<dyn AnalysisApi>) -> JoinHandle<()> {
    tokio::spawn(run_health_check(app, api))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClientError, ClientResult};
    use crate::app::NoticeKind;
    use crate::models::{
        AgentRequest, AgentResponse, AnalyseRequest, AnalysisResult, ExtrasPreferences,
        HealthStatus, Language, PredictRequest, PredictionResult, Signal,
    };
    use crate::patch_notes::PatchNotes;
    use crate::render::render_extras;
    use crate::section::SectionState;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio_util::sync::CancellationToken;

    type Gate<T> = oneshot::Receiver<ClientResult<T>>;

    /// Each call pops the next scripted reply. A reply arrives when the test
    /// sends on its gate; a cancelled token wins over a pending gate.
    #[derive(Default)]
    struct FakeApi {
        analyse: StdMutex<VecDeque<Gate<Value>>>,
        agent: StdMutex<VecDeque<Gate<Value>>>,
        predict: StdMutex<VecDeque<Gate<Value>>>,
        analyse_calls: AtomicUsize,
        agent_calls: AtomicUsize,
        agent_requests: StdMutex<Vec<AgentRequest>>,
    }

    impl FakeApi {
        fn script(
            queue: &StdMutex<VecDeque<Gate<Value>>>,
        ) -> oneshot::Sender<ClientResult<Value>> {
            let (tx, rx) = oneshot::channel();
            queue.lock().unwrap().push_back(rx);
            tx
        }

        fn next_analyse(&self) -> oneshot::Sender<ClientResult<Value>> {
            Self::script(&self.analyse)
        }

        fn next_agent(&self) -> oneshot::Sender<ClientResult<Value>> {
            Self::script(&self.agent)
        }

        fn next_predict(&self) -> oneshot::Sender<ClientResult<Value>> {
            Self::script(&self.predict)
        }

        async fn wait(
            queue: &StdMutex<VecDeque<Gate<Value>>>,
            cancel: CancellationToken,
        ) -> ClientResult<Value> {
            let gate = queue.lock().unwrap().pop_front().expect("unscripted call");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ClientError::Cancelled),
                reply = gate => reply.unwrap_or(Err(ClientError::Cancelled)),
            }
        }
    }

    #[async_trait]
    impl AnalysisApi for FakeApi {
        async fn health(&self, _cancel: CancellationToken) -> ClientResult<HealthStatus> {
            Ok(serde_json::from_value(json!({"status": "ok"})).unwrap())
        }

        async fn analyse(
            &self,
            _request: &AnalyseRequest,
            cancel: CancellationToken,
        ) -> ClientResult<AnalysisResult> {
            self.analyse_calls.fetch_add(1, Ordering::SeqCst);
            let raw = Self::wait(&self.analyse, cancel).await?;
            AnalysisResult::from_value(raw).map_err(|e| ClientError::Malformed(e.to_string()))
        }

        async fn agent(
            &self,
            request: &AgentRequest,
            cancel: CancellationToken,
        ) -> ClientResult<AgentResponse> {
            self.agent_calls.fetch_add(1, Ordering::SeqCst);
            self.agent_requests.lock().unwrap().push(request.clone());
            let raw = Self::wait(&self.agent, cancel).await?;
            Ok(AgentResponse::from_value(raw))
        }

        async fn predict(
            &self,
            _request: &PredictRequest,
            cancel: CancellationToken,
        ) -> ClientResult<PredictionResult> {
            let raw = Self::wait(&self.predict, cancel).await?;
            serde_json::from_value(raw).map_err(|e| ClientError::Malformed(e.to_string()))
        }
    }

    fn analysis(ticker: &str) -> Value {
        json!({
            "core": {
                "company": format!("{ticker} Corp"),
                "ticker": ticker,
                "price": 100.0,
                "ratios": {"Liquidity": {"current_ratio": {"value": 1.5, "band": "Strong"}}}
            },
            "meta": {"source": "llm"},
            "explanation": format!("{ticker} narrative")
        })
    }

    fn agent_reply(symbol: &str, summary: &str) -> Value {
        json!({
            "prediction": {"symbol": symbol, "signal": "BUY", "pred_ret_1d": 0.02},
            "summary": summary,
            "news": [{"title": format!("{symbol} headline")}]
        })
    }

    fn setup(ticker: &str) -> (Arc<Mutex<App>>, Arc<FakeApi>) {
        let mut app = App::new(
            Language::En,
            ExtrasPreferences::default(),
            PatchNotes::in_memory(),
        );
        app.ticker_input = ticker.to_string();
        (Arc::new(Mutex::new(app)), Arc::new(FakeApi::default()))
    }

    async fn until<F: Fn(&App) -> bool>(app: &Arc<Mutex<App>>, condition: F) {
        for _ in 0..200 {
            if condition(&*app.lock().await) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    fn settled_content(app: &mut App) -> Option<String> {
        app.analysis.complete_now();
        app.analysis
            .content()
            .and_then(|a| a.core.ticker.clone())
    }

    #[tokio::test]
    async fn empty_ticker_issues_no_request() {
        let (app, api) = setup("  ");
        run_analysis(app.clone(), api.clone()).await;

        assert_eq!(api.analyse_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.agent_calls.load(Ordering::SeqCst), 0);
        let app = app.lock().await;
        assert_eq!(app.notice.as_ref().unwrap().kind, NoticeKind::Validation);
    }

    #[tokio::test]
    async fn analysis_then_extras_in_order() {
        let (app, api) = setup("aapl");
        let analyse = api.next_analyse();
        let agent = api.next_agent();
        let task = spawn_analysis(app.clone(), api.clone());

        until(&app, |a| a.analysis.is_active()).await;
        assert_eq!(api.agent_calls.load(Ordering::SeqCst), 0);

        analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |a| a.extras_slot.is_pending()).await;
        agent.send(Ok(agent_reply("AAPL", "Strong balance sheet."))).unwrap();
        task.await.unwrap();

        let mut app = app.lock().await;
        assert_eq!(settled_content(&mut app).as_deref(), Some("AAPL"));
        assert_eq!(
            app.extras.summary,
            SectionState::Ready("Strong balance sheet.".to_string())
        );
        match &app.extras.prediction {
            SectionState::Ready(p) => assert_eq!(p.signal, Signal::Buy),
            other => panic!("unexpected prediction state: {other:?}"),
        }
        let requests = api.agent_requests.lock().unwrap();
        assert_eq!(requests[0].query, "AAPL");
        assert!(requests[0].include_news);
    }

    #[tokio::test]
    async fn no_extras_requested_means_no_agent_call() {
        let (app, api) = setup("msft");
        {
            let mut app = app.lock().await;
            app.preferences.prediction = false;
            app.preferences.summary = false;
            app.preferences.news = false;
        }
        let analyse = api.next_analyse();
        let task = spawn_analysis(app.clone(), api.clone());
        analyse.send(Ok(analysis("MSFT"))).unwrap();
        task.await.unwrap();

        assert_eq!(api.agent_calls.load(Ordering::SeqCst), 0);
        let app = app.lock().await;
        assert_eq!(app.extras.summary, SectionState::NotRequested);
        assert!(app.agent_raw.is_none());
    }

    #[tokio::test]
    async fn primary_failure_keeps_previous_display() {
        let (app, api) = setup("aapl");
        let analyse = api.next_analyse();
        let agent = api.next_agent();
        let task = spawn_analysis(app.clone(), api.clone());
        analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |a| a.extras_slot.is_pending()).await;
        agent.send(Ok(agent_reply("AAPL", "First."))).unwrap();
        task.await.unwrap();

        app.lock().await.ticker_input = "zzzz".into();
        let analyse = api.next_analyse();
        let task = spawn_analysis(app.clone(), api.clone());
        analyse
            .send(Err(ClientError::Http {
                status: 500,
                body: "boom".into(),
            }))
            .unwrap();
        task.await.unwrap();

        let mut app = app.lock().await;
        assert_eq!(api.agent_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.notice.as_ref().unwrap().kind, NoticeKind::Error);
        assert!(app.analysis.failure().unwrap().contains("HTTP error 500"));
        assert_eq!(settled_content(&mut app).as_deref(), Some("AAPL"));
        assert_eq!(app.extras.summary, SectionState::Ready("First.".to_string()));
    }

    #[tokio::test]
    async fn newer_extras_request_wins() {
        let (app, api) = setup("aapl");
        let first_analyse = api.next_analyse();
        let first_agent = api.next_agent();
        let second_analyse = api.next_analyse();
        let second_agent = api.next_agent();

        let first = spawn_analysis(app.clone(), api.clone());
        first_analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |a| a.extras_slot.is_pending()).await;

        let second = spawn_analysis(app.clone(), api.clone());
        second_analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |_| api.agent_calls.load(Ordering::SeqCst) == 2).await;

        // The first extras call was cancelled when the second was issued; a
        // late reply on its gate must be ignored.
        let _ = first_agent.send(Ok(agent_reply("AAPL", "stale")));
        second_agent
            .send(Ok(agent_reply("AAPL", "fresh")))
            .unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let app = app.lock().await;
        assert_eq!(app.extras.summary, SectionState::Ready("fresh".to_string()));
        assert!(app.notice.is_none());
        assert!(!app.extras_slot.is_pending());
    }

    #[tokio::test]
    async fn extras_timeout_marks_each_section_unavailable() {
        let (app, api) = setup("aapl");
        let analyse = api.next_analyse();
        let agent = api.next_agent();
        let task = spawn_analysis(app.clone(), api.clone());
        analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |a| a.extras_slot.is_pending()).await;
        agent
            .send(Err(ClientError::Timeout(Duration::from_secs(25))))
            .unwrap();
        task.await.unwrap();

        let mut app = app.lock().await;
        assert!(matches!(app.extras.prediction, SectionState::Unavailable(_)));
        assert!(matches!(app.extras.summary, SectionState::Unavailable(_)));
        assert!(matches!(app.extras.news, SectionState::Unavailable(_)));
        assert_eq!(settled_content(&mut app).as_deref(), Some("AAPL"));
        assert!(app.notice.is_none());
    }

    #[tokio::test]
    async fn toggling_off_hides_section_whatever_arrives() {
        let (app, api) = setup("aapl");
        let analyse = api.next_analyse();
        let agent = api.next_agent();
        let task = spawn_analysis(app.clone(), api.clone());
        analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |a| a.extras_slot.is_pending()).await;

        app.lock().await.preferences.news = false;
        agent.send(Ok(agent_reply("AAPL", "Done."))).unwrap();
        task.await.unwrap();

        let app = app.lock().await;
        assert!(matches!(app.extras.news, SectionState::Ready(_)));
        let views = render_extras(&app.extras, &app.preferences, app.language);
        assert!(views
            .iter()
            .all(|(section, _)| *section != crate::models::ExtraSection::News));
    }

    #[tokio::test]
    async fn forced_prediction_survives_late_agent_reply() {
        let (app, api) = setup("aapl");
        let analyse = api.next_analyse();
        let agent = api.next_agent();
        let predict = api.next_predict();
        let task = spawn_analysis(app.clone(), api.clone());
        analyse.send(Ok(analysis("AAPL"))).unwrap();
        until(&app, |a| a.extras_slot.is_pending()).await;

        let forced = spawn_force_predict(app.clone(), api.clone());
        until(&app, |a| a.predict_slot.is_pending()).await;
        agent.send(Ok(agent_reply("AAPL", "Done."))).unwrap();
        task.await.unwrap();
        predict
            .send(Ok(json!({"symbol": "AAPL", "signal": "SELL"})))
            .unwrap();
        forced.await.unwrap();

        let app = app.lock().await;
        match &app.extras.prediction {
            SectionState::Ready(p) => assert_eq!(p.signal, Signal::Sell),
            other => panic!("unexpected prediction state: {other:?}"),
        }
        assert_eq!(app.extras.summary, SectionState::Ready("Done.".to_string()));
    }

    #[tokio::test]
    async fn health_check_records_status() {
        let (app, api) = setup("");
        run_health_check(app.clone(), api).await;
        let app = app.lock().await;
        assert!(matches!(&app.health, crate::app::HealthState::Online(h) if h.is_ok()));
    }
}
