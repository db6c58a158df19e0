use crate::api::error::{ClientError, ClientResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
    /// Sent after the default `Accept: application/json`, replacing it if
    /// the caller sets its own.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn cancellable(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// JSON-over-HTTP with an enforced timeout and optional external cancellation.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    default_timeout: Duration,
}

impl HttpClient {
    pub fn new(base_url: &str, default_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T>(&self, path: &str, options: RequestOptions) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        self.send_json::<(), T>(Method::GET, path, None, options).await
    }

    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, Some(body), options).await
    }

    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json")
            .headers(options.headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| ClientError::from_reqwest(e, timeout))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| ClientError::from_reqwest(e, timeout))?;
            if !status.is_success() {
                return Err(ClientError::Http {
                    status: status.as_u16(),
                    body: preview(&text),
                });
            }
            serde_json::from_str::<T>(&text)
                .map_err(|e| ClientError::Malformed(format!("{} (body: {})", e, preview(&text))))
        };
        let timed = async {
            tokio::time::timeout(timeout, exchange)
                .await
                .unwrap_or(Err(ClientError::Timeout(timeout)))
        };

        let result = match options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ClientError::Cancelled),
                    outcome = timed => outcome,
                }
            }
            None => timed.await,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(%method, %url, elapsed_ms, "request completed"),
            Err(ClientError::Cancelled) => debug!(%method, %url, elapsed_ms, "request cancelled"),
            Err(e) => warn!(%method, %url, elapsed_ms, error = %e, "request failed"),
        }
        result
    }
}

fn preview(text: &str) -> String {
    text.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned HTTP response on loopback. `None` accepts the
    /// connection and never answers.
    async fn serve_once(response: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            match response {
                Some(response) => {
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
                None => tokio::time::sleep(Duration::from_secs(30)).await,
            }
        });
        format!("http://{}", addr)
    }

    /// Like `serve_once`, but also hands back the raw request head.
    async fn serve_capturing(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn caller_headers_are_sent() {
        let (base, request) = serve_capturing(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        )
        .await;
        let client = HttpClient::new(&base, Duration::from_secs(5));
        let options = RequestOptions::default().header(
            HeaderName::from_static("accept-language"),
            HeaderValue::from_static("ko"),
        );
        let _: Value = client
            .post_json("/analyse", &serde_json::json!({"query": "AAPL"}), options)
            .await
            .unwrap();

        let head = request.await.unwrap().to_ascii_lowercase();
        assert!(head.contains("accept-language: ko"));
        assert!(head.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn parses_json_body() {
        let base = serve_once(Some(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 15\r\nConnection: close\r\n\r\n{\"status\":\"ok\"}",
        ))
        .await;
        let client = HttpClient::new(&base, Duration::from_secs(5));
        let body: Value = client
            .get_json("/health", RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn non_success_status_is_http_error() {
        let base = serve_once(Some(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
        ))
        .await;
        let client = HttpClient::new(&base, Duration::from_secs(5));
        let err = client
            .get_json::<Value>("/analyse", RequestOptions::default())
            .await
            .unwrap_err();
        match err {
            ClientError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_malformed() {
        let base = serve_once(Some(
            "HTTP/1.1 200 OK\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
        ))
        .await;
        let client = HttpClient::new(&base, Duration::from_secs(5));
        let err = client
            .get_json::<Value>("/health", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Malformed(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let base = serve_once(None).await;
        let client = HttpClient::new(&base, Duration::from_secs(5));
        let err = client
            .get_json::<Value>(
                "/agent",
                RequestOptions::with_timeout(Duration::from_millis(100)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }

    #[tokio::test]
    async fn external_token_cancels_in_flight_request() {
        let base = serve_once(None).await;
        let client = HttpClient::new(&base, Duration::from_secs(5));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });
        let err = client
            .post_json::<_, Value>(
                "/agent",
                &serde_json::json!({"query": "AAPL"}),
                RequestOptions::default().cancellable(token),
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
