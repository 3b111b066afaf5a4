//! Where notifications come from.
//!
//! A [`NotificationSource`] runs as a background task and reports what it
//! learns as [`SourceEvent`]s. Two strategies exist: [`PollingSource`] fetches
//! the full list periodically, [`PushSource`] listens on a WebSocket for
//! single new-order events. The bell does not care which one feeds it.

pub mod polling;
pub mod push;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cff_core::{CoreConfig, TransportKind};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{NotificationError, NotificationResult};
use crate::types::Notification;

pub use polling::PollingSource;
pub use push::{Backoff, PushSource};

/// What a source delivers to the bell.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// The complete current list, newest first.
    Snapshot(Vec<Notification>),
    /// One newly placed order.
    Pushed(Notification),
}

#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Runs until `shutdown` turns `true` (or its sender is dropped) or the
    /// receiving end of `events` goes away. Transport failures are logged and
    /// retried; they never end the loop.
    async fn run(&self, events: mpsc::Sender<SourceEvent>, shutdown: watch::Receiver<bool>);
}

/// Owns a running source task.
///
/// [`SourceHandle::shutdown`] stops it gracefully; dropping the handle aborts
/// the task so no timer or socket outlives its owner.
pub struct SourceHandle {
    name: &'static str,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SourceHandle {
    pub fn spawn(source: Arc<dyn NotificationSource>, events: mpsc::Sender<SourceEvent>) -> Self {
        let name = source.name();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            source.run(events, shutdown_rx).await;
            debug!(source = name, "Notification source task finished");
        });
        info!(source = name, "Notification source started");
        Self {
            name,
            shutdown_tx,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Signals the task to stop and waits for it.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(source = self.name, error = %e, "Notification source task failed");
                }
            }
        }
        info!(source = self.name, "Notification source stopped");
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Builds the source selected by `notifications.transport`.
pub fn build_source(config: &CoreConfig) -> NotificationResult<Arc<dyn NotificationSource>> {
    let source: Arc<dyn NotificationSource> = match config.notifications.transport {
        TransportKind::Polling => Arc::new(PollingSource::new(
            &config.api,
            Duration::from_millis(config.notifications.poll_interval_ms),
        )?),
        TransportKind::Push => Arc::new(PushSource::from_config(config)?),
    };
    Ok(source)
}

/// Appends `path` to `base_url` the way string concatenation would, keeping
/// any path prefix of the base.
pub fn join_endpoint(base_url: &str, path: &str) -> NotificationResult<Url> {
    let base = base_url.trim_end_matches('/');
    let joined = if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    };
    Url::parse(&joined).map_err(|e| NotificationError::InvalidEndpoint {
        endpoint: joined.clone(),
        reason: e.to_string(),
    })
}

/// Resolves once `shutdown` asks the task to stop. Source implementations
/// race their waits against it.
pub async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        let stop = *shutdown.borrow();
        if stop {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_endpoint_keeps_prefix() {
        assert_eq!(
            join_endpoint("http://localhost:5000", "/api/notifications").unwrap().as_str(),
            "http://localhost:5000/api/notifications"
        );
        assert_eq!(
            join_endpoint("https://example.com/backend/", "api/notifications").unwrap().as_str(),
            "https://example.com/backend/api/notifications"
        );
    }

    #[test]
    fn test_join_endpoint_rejects_garbage() {
        assert!(matches!(
            join_endpoint("not a url", "/api"),
            Err(NotificationError::InvalidEndpoint { .. })
        ));
    }

    struct Idle;

    #[async_trait]
    impl NotificationSource for Idle {
        fn name(&self) -> &'static str {
            "idle"
        }

        async fn run(&self, _events: mpsc::Sender<SourceEvent>, mut shutdown: watch::Receiver<bool>) {
            stop_requested(&mut shutdown).await;
        }
    }

    #[tokio::test]
    async fn test_handle_shutdown_joins_task() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = SourceHandle::spawn(Arc::new(Idle), tx);
        assert_eq!(handle.name(), "idle");
        assert!(!handle.is_finished());
        tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
            .await
            .expect("shutdown should complete");
    }

    #[tokio::test]
    async fn test_build_source_by_transport() {
        let mut config = CoreConfig::default();
        assert_eq!(build_source(&config).unwrap().name(), "polling");
        config.notifications.transport = TransportKind::Push;
        assert_eq!(build_source(&config).unwrap().name(), "push");
    }
}
