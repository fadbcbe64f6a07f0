//! Notification delivery.
//!
//! The pipeline talks to a [`Notifier`]; the concrete sink is either the log
//! or a webhook. [`GatedNotifier`] applies the one-time permission check.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{NotifierConfig, WatcherConfig};
use crate::utils::http::create_async_client;

/// A sink for title/body notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Ask whether notifications may be shown. Called once at startup.
    async fn request_permission(&self) -> bool {
        true
    }

    /// Deliver one notification.
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        log::info!("🔔 {}\n{}", title, body);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
    priority: &'a str,
}

/// Posts notifications as JSON to a webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    priority: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            priority: priority.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn request_permission(&self) -> bool {
        url::Url::parse(&self.url).is_ok()
    }

    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        let payload = WebhookPayload {
            title,
            body,
            priority: &self.priority,
        };
        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(AppError::notify(format!(
                "webhook {} answered {}",
                self.url,
                response.status()
            )));
        }
        Ok(())
    }
}

/// Suppresses notifications unless permission was granted at startup.
pub struct GatedNotifier {
    inner: Arc<dyn Notifier>,
    granted: AtomicBool,
}

impl GatedNotifier {
    /// Wrap `inner` and ask it for permission once.
    pub async fn initialize(inner: Arc<dyn Notifier>) -> Self {
        let granted = inner.request_permission().await;
        if !granted {
            log::warn!("Notification permission not granted; notifications will be suppressed");
        }
        Self {
            inner,
            granted: AtomicBool::new(granted),
        }
    }

    pub fn is_granted(&self) -> bool {
        self.granted.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Notifier for GatedNotifier {
    async fn request_permission(&self) -> bool {
        self.is_granted()
    }

    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        if !self.is_granted() {
            log::debug!("Notification suppressed: {}", title);
            return Ok(());
        }
        self.inner.notify(title, body).await
    }
}

/// Build the configured sink behind the permission gate.
pub async fn build_notifier(
    config: &NotifierConfig,
    watcher: &WatcherConfig,
) -> Result<Arc<dyn Notifier>> {
    let inner: Arc<dyn Notifier> = match &config.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            create_async_client(watcher)?,
            url.clone(),
            config.priority.clone(),
        )),
        None => Arc::new(LogNotifier),
    };
    Ok(Arc::new(GatedNotifier::initialize(inner).await))
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording {
        allow: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn request_permission(&self) -> bool {
            self.allow
        }

        async fn notify(&self, title: &str, body: &str) -> Result<()> {
            self.sent.lock().push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_gate_passes_through_when_granted() {
        let inner = Arc::new(Recording {
            allow: true,
            ..Default::default()
        });
        let gate = GatedNotifier::initialize(inner.clone()).await;

        assert!(gate.is_granted());
        gate.notify("Keyword Found!", "[tag] title").await.unwrap();
        assert_eq!(
            *inner.sent.lock(),
            vec![("Keyword Found!".to_string(), "[tag] title".to_string())]
        );
    }

    #[tokio::test]
    async fn test_gate_suppresses_when_denied() {
        let inner = Arc::new(Recording::default());
        let gate = GatedNotifier::initialize(inner.clone()).await;

        assert!(!gate.is_granted());
        assert!(gate.notify("Keyword Found!", "body").await.is_ok());
        assert!(inner.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_permission_requires_valid_url() {
        let client = Client::new();
        assert!(
            WebhookNotifier::new(client.clone(), "https://hooks.example.com/x", "high")
                .request_permission()
                .await
        );
        assert!(
            !WebhookNotifier::new(client, "nope", "high")
                .request_permission()
                .await
        );
    }

    #[tokio::test]
    async fn test_build_defaults_to_log_notifier() {
        let notifier = build_notifier(&NotifierConfig::default(), &WatcherConfig::default())
            .await
            .unwrap();
        assert!(notifier.request_permission().await);
        assert!(notifier.notify("title", "body").await.is_ok());
    }
}
