use std::time::Duration;

use async_trait::async_trait;
use cff_core::ApiConfig;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use url::Url;

use super::{join_endpoint, stop_requested, NotificationSource, SourceEvent};
use crate::error::{NotificationError, NotificationResult};
use crate::types::{parse_notifications_response, Notification};

/// Fetches the full notification list every `interval`, starting immediately.
#[derive(Debug, Clone)]
pub struct PollingSource {
    client: reqwest::Client,
    endpoint: Url,
    interval: Duration,
}

impl PollingSource {
    pub fn new(api: &ApiConfig, interval: Duration) -> NotificationResult<Self> {
        let endpoint = join_endpoint(&api.base_url, &api.notifications_path)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            interval,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One `GET` of the notifications endpoint.
    pub async fn fetch_once(&self) -> NotificationResult<Vec<Notification>> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::polling(format!(
                "GET {} returned HTTP {}",
                self.endpoint, status
            )));
        }
        let body = response.text().await?;
        parse_notifications_response(&body)
    }
}

#[async_trait]
impl NotificationSource for PollingSource {
    fn name(&self) -> &'static str {
        "polling"
    }

    async fn run(&self, events: mpsc::Sender<SourceEvent>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = stop_requested(&mut shutdown) => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = stop_requested(&mut shutdown) => break,
                result = self.fetch_once() => result,
            };

            match result {
                Ok(notifications) => {
                    debug!(count = notifications.len(), "Fetched notifications");
                    if events.send(SourceEvent::Snapshot(notifications)).await.is_err() {
                        debug!("Snapshot receiver dropped; stopping poller");
                        break;
                    }
                }
                Err(e) => warn!(endpoint = %self.endpoint, error = %e, "Notification fetch failed"),
            }
        }
    }
}
