// Shared helpers for the integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use cff_notifications::{Alerter, Notification, NotificationResult, OrderId, SoundPlayer, Toaster};
use rust_decimal::Decimal;

/// Toaster that keeps every message it was asked to show.
#[derive(Clone, Default)]
pub struct RecordingToaster {
    pub shown: Arc<Mutex<Vec<String>>>,
}

impl Toaster for RecordingToaster {
    fn show(&mut self, message: &str) {
        self.shown.lock().unwrap().push(message.to_string());
    }
}

/// Sound player that counts how often it played.
#[derive(Clone, Default)]
pub struct CountingSound {
    pub plays: Arc<Mutex<usize>>,
}

impl SoundPlayer for CountingSound {
    fn play(&mut self) -> NotificationResult<()> {
        *self.plays.lock().unwrap() += 1;
        Ok(())
    }
}

pub fn recording_alerter() -> (Alerter, RecordingToaster, CountingSound) {
    let toaster = RecordingToaster::default();
    let sound = CountingSound::default();
    let alerter = Alerter::new(Box::new(toaster.clone()), Box::new(sound.clone()), true);
    (alerter, toaster, sound)
}

pub fn notification(order_id: OrderId) -> Notification {
    Notification::new(order_id, 10 + order_id % 7, Decimal::from(250), "2026-10-16T08:15:00Z")
}

pub fn notifications(ids: &[OrderId]) -> Vec<Notification> {
    ids.iter().copied().map(notification).collect()
}

pub fn ids_of(list: &[Notification]) -> Vec<OrderId> {
    list.iter().map(|n| n.order_id).collect()
}

pub fn notifications_body(ids: &[OrderId]) -> String {
    serde_json::json!({ "notifications": notifications(ids) }).to_string()
}
