use chrono::{DateTime, Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::error::{NotificationError, NotificationResult};

/// Identifier of an order, and therefore of the notification announcing it.
pub type OrderId = i64;

/// A "new order placed" notification as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub order_id: OrderId,
    pub user_id: i64,
    /// Order total. Accepts a JSON number or a numeric string; a string keeps
    /// the scale it was sent with (`"120.00"` stays `120.00`).
    #[serde(deserialize_with = "deserialize_decimal")]
    pub total_price: Decimal,
    /// Placement timestamp, kept verbatim.
    pub order_date: String,
}

impl Notification {
    pub fn new(order_id: OrderId, user_id: i64, total_price: Decimal, order_date: impl Into<String>) -> Self {
        Self {
            order_id,
            user_id,
            total_price,
            order_date: order_date.into(),
        }
    }

    /// `order_date` in local time, or the raw string when it cannot be parsed.
    pub fn display_date(&self) -> String {
        format_order_date(&self.order_date)
    }
}

/// Formats an order timestamp for display.
///
/// RFC 3339 timestamps are converted to local time; naive timestamps are shown
/// as-is. Anything else is returned unchanged.
pub fn format_order_date(raw: &str) -> String {
    const DISPLAY: &str = "%d/%m/%Y, %-I:%M:%S %p";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format(DISPLAY).to_string();
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.format(DISPLAY).to_string();
        }
    }
    raw.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Integer(i64),
    Float(f64),
    Text(String),
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Integer(n) => Ok(Decimal::from(n)),
        NumberOrText::Float(n) => Decimal::try_from(n)
            .map_err(|e| serde::de::Error::custom(format!("invalid decimal {}: {}", n, e))),
        NumberOrText::Text(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| serde::de::Error::custom(format!("invalid decimal '{}': {}", s, e))),
    }
}

/// Parses the body of `GET /api/notifications`.
///
/// The body must be a JSON object. A missing or `null` `notifications` field is
/// an empty list; entries that do not match [`Notification`] are skipped with a
/// warning. The result is de-duplicated by `order_id`, keeping the first (newest)
/// occurrence.
pub fn parse_notifications_response(body: &str) -> NotificationResult<Vec<Notification>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let object = value
        .as_object()
        .ok_or_else(|| NotificationError::InvalidPayload("expected a JSON object".to_string()))?;

    let entries = match object.get("notifications") {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(entries)) => entries,
        Some(other) => {
            return Err(NotificationError::InvalidPayload(format!(
                "'notifications' must be an array, got {}",
                json_kind(other)
            )))
        }
    };

    let mut parsed = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match Notification::deserialize(entry) {
            Ok(notification) => parsed.push(notification),
            Err(e) => warn!(index, error = %e, "Skipping malformed notification entry"),
        }
    }
    Ok(dedupe_by_order_id(parsed))
}

/// Removes repeated `order_id`s, keeping the first occurrence of each.
pub fn dedupe_by_order_id(notifications: Vec<Notification>) -> Vec<Notification> {
    let mut seen = HashSet::with_capacity(notifications.len());
    notifications
        .into_iter()
        .filter(|n| seen.insert(n.order_id))
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
