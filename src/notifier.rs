//! Chat webhook notifier
//!
//! Posts the rendered report as `{"text": ...}` to an incoming-webhook URL.
//! Delivery happens after the report has been built; a failed delivery is
//! logged and never changes the report outcome.

use async_trait::async_trait;
use cloudcost_core::collaborator::Notifier;
use cloudcost_core::error::{CloudcostError, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the webhook URL
pub const WEBHOOK_ENV: &str = "CLOUDCOST_WEBHOOK_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Notifier posting to a chat incoming webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl WebhookNotifier {
    /// Create a notifier for `url`
    ///
    /// The URL must parse, use http or https, and name a host.
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let raw = url.as_ref();
        let url = reqwest::Url::parse(raw).map_err(|e| {
            CloudcostError::Config(format!("invalid webhook URL '{raw}': {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CloudcostError::Config(format!(
                "webhook URL must be http(s), got '{raw}'"
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(CloudcostError::Config(format!(
                "webhook URL has no host: '{raw}'"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookMessage { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CloudcostError::Notify(format!("webhook returned {status}: {body}")));
        }
        Ok(())
    }
}

/// Send `text`, logging instead of propagating a failure
///
/// Returns whether the message was delivered.
pub async fn deliver(notifier: &dyn Notifier, text: &str) -> bool {
    match notifier.notify(text).await {
        Ok(()) => {
            info!("Report delivered to chat channel");
            true
        }
        Err(e) => {
            warn!("Failed to deliver report: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one request, answering with `status_line`, and return the body
    async fn serve_once(listener: TcpListener, status_line: &'static str) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }

        let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        let text = String::from_utf8_lossy(&buf).to_string();
        text.split_once("\r\n\r\n")
            .map(|(_, body)| body.to_string())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_posts_text_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "200 OK"));

        let notifier = WebhookNotifier::new(url).unwrap();
        notifier.notify("weekly digest").await.unwrap();

        let body = server.await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["text"], "weekly digest");
    }

    #[tokio::test]
    async fn test_non_success_status_is_notify_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_once(listener, "500 Internal Server Error"));

        let notifier = WebhookNotifier::new(url).unwrap();
        let result = notifier.notify("digest").await;
        assert!(matches!(result, Err(CloudcostError::Notify(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_deliver_swallows_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        drop(listener);

        let notifier = WebhookNotifier::new(url).unwrap();
        assert!(!deliver(&notifier, "digest").await);
    }

    #[test]
    fn test_rejects_non_http_url() {
        for url in [
            "ftp://example.com",
            "http://",
            "https://exa mple.com/hook",
            "http://:::",
            "not a url",
            "mailto:ops@example.com",
        ] {
            assert!(
                matches!(WebhookNotifier::new(url), Err(CloudcostError::Config(_))),
                "accepted {url}"
            );
        }
    }

    #[test]
    fn test_accepts_webhook_url() {
        let notifier = WebhookNotifier::new("https://hooks.example.com/T000").unwrap();
        assert_eq!(notifier.url.host_str(), Some("hooks.example.com"));
    }
}
