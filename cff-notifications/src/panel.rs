//! The dropdown listing recent notifications.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{format_order_date, Notification, OrderId};

/// Message shown when the panel has nothing to list.
pub const EMPTY_PANEL_MESSAGE: &str = "No notifications found.";

/// One row of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelEntry {
    pub order_id: OrderId,
    pub user_id: i64,
    pub total_price: Decimal,
    pub order_date: String,
    /// Link target: the assignment screen with this order highlighted.
    pub href: String,
    /// Clicked during this session; rendered dimmed.
    pub read: bool,
}

impl fmt::Display for PanelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order #{} · User ID: {} · Total: ₹{} · Date: {}",
            self.order_id,
            self.user_id,
            self.total_price,
            format_order_date(&self.order_date)
        )
    }
}

pub fn entry_href(assign_path: &str, order_id: OrderId) -> String {
    format!("{}?highlight={}", assign_path, order_id)
}

/// Renders entries one per line; unread entries carry a bullet.
pub fn render_entries(entries: &[PanelEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_PANEL_MESSAGE.to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let marker = if entry.read { " " } else { "•" };
            format!("{} {}", marker, entry)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Open/closed state and the session's read set.
#[derive(Debug)]
pub struct NotificationPanel {
    open: bool,
    read: HashSet<OrderId>,
    limit: usize,
    assign_path: String,
}

impl NotificationPanel {
    pub fn new(limit: usize, assign_path: impl Into<String>) -> Self {
        Self {
            open: false,
            read: HashSet::new(),
            limit,
            assign_path: assign_path.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_read(&self, order_id: OrderId) -> bool {
        self.read.contains(&order_id)
    }

    pub fn mark_read(&mut self, order_id: OrderId) {
        self.read.insert(order_id);
    }

    pub fn clear_read(&mut self) {
        self.read.clear();
    }

    pub fn href(&self, order_id: OrderId) -> String {
        entry_href(&self.assign_path, order_id)
    }

    /// Whether `order_id` is among the entries the panel shows for `notifications`.
    pub fn lists(&self, notifications: &[Notification], order_id: OrderId) -> bool {
        notifications
            .iter()
            .take(self.limit)
            .any(|n| n.order_id == order_id)
    }

    /// Up to `limit` entries built from `notifications` (newest first).
    pub fn entries(&self, notifications: &[Notification]) -> Vec<PanelEntry> {
        notifications
            .iter()
            .take(self.limit)
            .map(|n| PanelEntry {
                order_id: n.order_id,
                user_id: n.user_id,
                total_price: n.total_price,
                order_date: n.order_date.clone(),
                href: self.href(n.order_id),
                read: self.is_read(n.order_id),
            })
            .collect()
    }
}
