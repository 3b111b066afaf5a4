use std::time::Duration;

use async_trait::async_trait;
use cff_core::CoreConfig;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use super::{join_endpoint, stop_requested, NotificationSource, SourceEvent};
use crate::error::{NotificationError, NotificationResult};
use crate::types::Notification;

/// Event name of a new-order frame.
pub const NEW_NOTIFICATION_EVENT: &str = "new_notification";

/// Exponential reconnect delay, reset after every successful connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Returns the delay to wait now and doubles the next one, up to the ceiling.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[derive(Debug, Deserialize)]
struct PushFrame {
    event: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Decodes one text frame. Frames for other events yield `Ok(None)`.
pub fn parse_push_frame(text: &str) -> NotificationResult<Option<Notification>> {
    let frame: PushFrame = serde_json::from_str(text)?;
    if frame.event != NEW_NOTIFICATION_EVENT {
        debug!(event = %frame.event, "Ignoring push event");
        return Ok(None);
    }
    let data = frame.data.ok_or_else(|| {
        NotificationError::InvalidPayload(format!("'{}' frame without data", NEW_NOTIFICATION_EVENT))
    })?;
    Notification::deserialize(data)
        .map(Some)
        .map_err(|e| NotificationError::InvalidPayload(format!("invalid notification in push frame: {}", e)))
}

/// Derives the WebSocket address from the REST base URL.
///
/// `http` maps to `ws` and `https` to `wss`; `secure_origin` forces `wss`.
pub fn socket_url(base_url: &str, socket_path: &str, secure_origin: bool) -> NotificationResult<Url> {
    let mut url = join_endpoint(base_url, socket_path)?;
    let scheme = match (url.scheme(), secure_origin) {
        ("http", false) | ("ws", false) => "ws",
        ("http", true) | ("https", _) | ("ws", true) | ("wss", _) => "wss",
        (other, _) => {
            return Err(NotificationError::InvalidEndpoint {
                endpoint: url.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            })
        }
    };
    url.set_scheme(scheme).map_err(|_| NotificationError::InvalidEndpoint {
        endpoint: url.to_string(),
        reason: format!("cannot switch scheme to '{}'", scheme),
    })?;
    Ok(url)
}

enum SessionEnd {
    Stopped,
    Disconnected(String),
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Listens on the backend's WebSocket for new-order events.
#[derive(Debug, Clone)]
pub struct PushSource {
    url: Url,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl PushSource {
    pub fn new(url: Url, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            url,
            initial_backoff,
            max_backoff,
        }
    }

    pub fn from_config(config: &CoreConfig) -> NotificationResult<Self> {
        let url = socket_url(
            &config.api.base_url,
            &config.api.socket_path,
            config.notifications.secure_origin,
        )?;
        Ok(Self::new(
            url,
            Duration::from_millis(config.notifications.reconnect_initial_ms),
            Duration::from_millis(config.notifications.reconnect_max_ms),
        ))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn session(
        &self,
        mut socket: Socket,
        events: &mpsc::Sender<SourceEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        loop {
            let message = tokio::select! {
                _ = stop_requested(shutdown) => {
                    if let Err(e) = socket.close(None).await {
                        debug!(error = %e, "Error while closing notification socket");
                    }
                    return SessionEnd::Stopped;
                }
                message = socket.next() => message,
            };

            match message {
                Some(Ok(Message::Text(text))) => match parse_push_frame(&text) {
                    Ok(Some(notification)) => {
                        debug!(order_id = notification.order_id, "Pushed notification received");
                        if events.send(SourceEvent::Pushed(notification)).await.is_err() {
                            debug!("Push receiver dropped; stopping listener");
                            return SessionEnd::Stopped;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Dropping malformed push frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("closed by server ({}): {}", u16::from(f.code), f.reason))
                        .unwrap_or_else(|| "closed by server".to_string());
                    return SessionEnd::Disconnected(reason);
                }
                Some(Ok(other)) => debug!(kind = message_kind(&other), "Ignoring non-text frame"),
                Some(Err(e)) => return SessionEnd::Disconnected(e.to_string()),
                None => return SessionEnd::Disconnected("stream ended".to_string()),
            }
        }
    }
}

fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}

#[async_trait]
impl NotificationSource for PushSource {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn run(&self, events: mpsc::Sender<SourceEvent>, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = Backoff::new(self.initial_backoff, self.max_backoff);

        loop {
            let connected = tokio::select! {
                _ = stop_requested(&mut shutdown) => return,
                connected = connect_async(self.url.as_str()) => connected,
            };

            match connected {
                Ok((socket, _response)) => {
                    info!(url = %self.url, "Notification socket connected");
                    backoff.reset();
                    match self.session(socket, &events, &mut shutdown).await {
                        SessionEnd::Stopped => return,
                        SessionEnd::Disconnected(reason) => {
                            warn!(url = %self.url, %reason, "Notification socket disconnected")
                        }
                    }
                }
                Err(e) => warn!(url = %self.url, error = %e, "Notification socket connection failed"),
            }

            let delay = backoff.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "Reconnecting notification socket");
            tokio::select! {
                _ = stop_requested(&mut shutdown) => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_socket_url_scheme_mapping() {
        let cases = [
            ("http://localhost:5000", false, "ws://localhost:5000/ws"),
            ("https://api.example.com", false, "wss://api.example.com/ws"),
            ("http://localhost:5000", true, "wss://localhost:5000/ws"),
        ];
        for (base, secure, expected) in cases {
            assert_eq!(socket_url(base, "/ws", secure).unwrap().as_str(), expected);
        }
    }

    #[test]
    fn test_socket_url_rejects_other_schemes() {
        assert!(matches!(
            socket_url("ftp://files.example.com", "/ws", false),
            Err(NotificationError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_backoff_doubles_to_ceiling_and_resets() {
        let mut backoff = Backoff::new(Duration::from_millis(1000), Duration::from_millis(5000));
        let delays: Vec<u128> = (0..5).map(|_| backoff.next_delay().as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000]);
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_parse_push_frame() {
        let frame = r#"{"event":"new_notification","data":{"order_id":42,"user_id":3,"total_price":"99.50","order_date":"2026-10-16T10:00:00Z"}}"#;
        let notification = parse_push_frame(frame).unwrap().unwrap();
        assert_eq!(notification.order_id, 42);
        assert_eq!(notification.total_price.to_string(), "99.50");

        assert_eq!(parse_push_frame(r#"{"event":"order_updated","data":{}}"#).unwrap(), None);
        assert!(parse_push_frame(r#"{"event":"new_notification"}"#).is_err());
        assert!(parse_push_frame(r#"{"event":"new_notification","data":{"order_id":1}}"#).is_err());
        assert!(parse_push_frame("ping").is_err());
    }
}
