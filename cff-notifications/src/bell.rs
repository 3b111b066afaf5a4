//! The notification bell: everything the operator sees, in one owner.
//!
//! [`NotificationBell`] combines the cleared set, the held notification list,
//! the unseen badge, the panel and the alerter. Source events are fed in with
//! [`NotificationBell::apply_snapshot`] / [`NotificationBell::apply_pushed`];
//! operator actions map to the remaining methods. Every state change is
//! queued as a [`BellEvent`] that the owner drains with
//! [`NotificationBell::drain_events`].

use cff_core::NotificationsConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alerting::{AlertOutcome, Alerter};
use crate::badge::{BadgeState, UnseenBadge};
use crate::cleared::{ClearedSet, ClearedSetStore};
use crate::panel::{NotificationPanel, PanelEntry};
use crate::storage::KeyValueStore;
use crate::types::{dedupe_by_order_id, Notification, OrderId};

/// The part of [`NotificationsConfig`] the bell itself needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BellSettings {
    pub panel_limit: usize,
    pub assign_path: String,
}

impl Default for BellSettings {
    fn default() -> Self {
        Self::from(&NotificationsConfig::default())
    }
}

impl From<&NotificationsConfig> for BellSettings {
    fn from(config: &NotificationsConfig) -> Self {
        Self {
            panel_limit: config.panel_limit,
            assign_path: config.assign_path.clone(),
        }
    }
}

/// A state change observable by a frontend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BellEvent {
    Alerted { order_id: OrderId, sound_played: bool },
    BadgeChanged { state: BadgeState },
    ListChanged { count: usize },
    PanelOpened,
    PanelClosed,
    Navigate { order_id: OrderId, href: String },
    Cleared { added: usize, total: usize },
}

pub struct NotificationBell {
    cleared_store: ClearedSetStore<Box<dyn KeyValueStore>>,
    cleared: ClearedSet,
    notifications: Vec<Notification>,
    newest_id: Option<OrderId>,
    suspended: bool,
    badge: UnseenBadge,
    panel: NotificationPanel,
    alerter: Alerter,
    events: Vec<BellEvent>,
}

impl NotificationBell {
    /// Creates the bell and rehydrates the cleared set from `store`.
    pub fn mount(store: Box<dyn KeyValueStore>, alerter: Alerter, settings: BellSettings) -> Self {
        let cleared_store = ClearedSetStore::new(store);
        let cleared = cleared_store.load();
        info!(cleared = cleared.len(), "Notification bell mounted");
        Self {
            cleared_store,
            cleared,
            notifications: Vec::new(),
            newest_id: None,
            suspended: false,
            badge: UnseenBadge::new(),
            panel: NotificationPanel::new(settings.panel_limit, settings.assign_path),
            alerter,
            events: Vec::new(),
        }
    }

    /// Applies a full newest-first list as returned by a poll.
    ///
    /// Cleared ids are dropped first. While suspended after "clear all" the
    /// snapshot is ignored entirely. Otherwise the held list is replaced, and
    /// if the head differs from the previously seen newest id a single alert
    /// fires for the new head. The first snapshot after mount never alerts.
    pub fn apply_snapshot(&mut self, notifications: Vec<Notification>) {
        if self.suspended {
            debug!(received = notifications.len(), "Snapshot ignored: list was cleared and panel not reopened");
            return;
        }

        let filtered = self.filter_cleared(notifications);
        let latest = filtered.first().map(|n| n.order_id);

        if filtered != self.notifications {
            self.notifications = filtered;
            self.events.push(BellEvent::ListChanged {
                count: self.notifications.len(),
            });
        }

        match (self.newest_id, latest) {
            (Some(previous), Some(latest)) if previous != latest => {
                debug!(previous, latest, "Snapshot head changed");
                self.alert(latest);
            }
            _ => {}
        }

        if latest.is_some() {
            self.newest_id = latest;
        }
    }

    /// Applies a single notification delivered by the push channel.
    ///
    /// Cleared or already-held ids are discarded. Anything else is prepended
    /// and alerted.
    pub fn apply_pushed(&mut self, notification: Notification) {
        let order_id = notification.order_id;
        if self.cleared.contains(&order_id) {
            debug!(order_id, "Pushed notification discarded: cleared");
            return;
        }
        if self.notifications.iter().any(|n| n.order_id == order_id) {
            debug!(order_id, "Pushed notification discarded: already held");
            return;
        }

        self.notifications.insert(0, notification);
        self.events.push(BellEvent::ListChanged {
            count: self.notifications.len(),
        });
        self.alert(order_id);
        self.newest_id = Some(order_id);
    }

    /// Records the first operator interaction, unlocking audio.
    pub fn unlock_interaction(&mut self) -> bool {
        self.alerter.unlock_interaction()
    }

    /// Opens the panel, clears the badge and lifts the clear-all suspension.
    pub fn open_panel(&mut self) {
        if self.badge.mark_seen() {
            self.events.push(BellEvent::BadgeChanged {
                state: self.badge.state(),
            });
        }
        if self.suspended {
            debug!("Clear-all suspension lifted");
            self.suspended = false;
        }
        if !self.panel.is_open() {
            self.panel.open();
            self.events.push(BellEvent::PanelOpened);
        }
    }

    pub fn close_panel(&mut self) {
        if self.panel.is_open() {
            self.panel.close();
            self.events.push(BellEvent::PanelClosed);
        }
    }

    /// Marks a listed entry as read, closes the panel and returns the link
    /// target. Ignored while the panel is closed or when the id is not among
    /// the listed entries.
    pub fn click_entry(&mut self, order_id: OrderId) -> Option<String> {
        if !self.panel.is_open() {
            debug!(order_id, "Click ignored, panel is closed");
            return None;
        }
        if !self.panel.lists(&self.notifications, order_id) {
            debug!(order_id, "Click on unlisted notification ignored");
            return None;
        }
        self.panel.mark_read(order_id);
        self.close_panel();
        let href = self.panel.href(order_id);
        self.events.push(BellEvent::Navigate {
            order_id,
            href: href.clone(),
        });
        Some(href)
    }

    /// Dismisses every held notification for good and returns how many ids
    /// were newly added to the cleared set.
    ///
    /// The cleared set is persisted; a failure to do so is logged and the
    /// in-memory state still changes. Polled snapshots are ignored until the
    /// panel is opened again.
    pub fn clear_all(&mut self) -> usize {
        let before = self.cleared.len();
        self.cleared.extend(self.notifications.iter().map(|n| n.order_id));
        let added = self.cleared.len() - before;

        if let Err(e) = self.cleared_store.persist(&self.cleared) {
            warn!(error = %e, "Failed to persist cleared notifications; they will reappear after restart");
        }

        if !self.notifications.is_empty() {
            self.notifications.clear();
            self.events.push(BellEvent::ListChanged { count: 0 });
        }
        self.panel.clear_read();
        self.suspended = true;

        info!(added, total = self.cleared.len(), "Notifications cleared");
        self.events.push(BellEvent::Cleared {
            added,
            total: self.cleared.len(),
        });
        added
    }

    pub fn badge(&self) -> BadgeState {
        self.badge.state()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn panel_entries(&self) -> Vec<PanelEntry> {
        self.panel.entries(&self.notifications)
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel.is_open()
    }

    pub fn cleared_ids(&self) -> &ClearedSet {
        &self.cleared
    }

    pub fn newest_id(&self) -> Option<OrderId> {
        self.newest_id
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_interaction_unlocked(&self) -> bool {
        self.alerter.is_interaction_unlocked()
    }

    /// Takes the events queued since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<BellEvent> {
        std::mem::take(&mut self.events)
    }

    fn filter_cleared(&self, notifications: Vec<Notification>) -> Vec<Notification> {
        let visible = notifications
            .into_iter()
            .filter(|n| !self.cleared.contains(&n.order_id))
            .collect();
        dedupe_by_order_id(visible)
    }

    fn alert(&mut self, order_id: OrderId) {
        let AlertOutcome { sound_played, .. } = self.alerter.notify(order_id);
        self.events.push(BellEvent::Alerted { order_id, sound_played });
        if self.badge.mark_unseen() {
            self.events.push(BellEvent::BadgeChanged {
                state: self.badge.state(),
            });
        }
    }
}

impl std::fmt::Debug for NotificationBell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBell")
            .field("notifications", &self.notifications.len())
            .field("cleared", &self.cleared.len())
            .field("newest_id", &self.newest_id)
            .field("suspended", &self.suspended)
            .field("badge", &self.badge.state())
            .field("panel_open", &self.panel.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::{MockSoundPlayer, MockToaster};
    use crate::cleared::CLEARED_KEY;
    use crate::storage::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn n(id: OrderId) -> Notification {
        Notification::new(id, 1, Decimal::from(99), "2026-10-16 09:00:00")
    }

    fn list(ids: &[OrderId]) -> Vec<Notification> {
        ids.iter().copied().map(n).collect()
    }

    fn bell_with(store: Arc<MemoryKeyValueStore>) -> NotificationBell {
        NotificationBell::mount(Box::new(store), Alerter::silent(), BellSettings::default())
    }

    fn bell() -> NotificationBell {
        bell_with(Arc::new(MemoryKeyValueStore::new()))
    }

    fn alerts(events: &[BellEvent]) -> Vec<OrderId> {
        events
            .iter()
            .filter_map(|e| match e {
                BellEvent::Alerted { order_id, .. } => Some(*order_id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_snapshot_does_not_alert() {
        let mut bell = bell();
        bell.apply_snapshot(list(&[101, 100]));
        let events = bell.drain_events();
        assert_eq!(events, vec![BellEvent::ListChanged { count: 2 }]);
        assert_eq!(bell.newest_id(), Some(101));
        assert_eq!(bell.badge(), BadgeState::Clean);
    }

    #[test]
    fn test_new_head_alerts_once() {
        let mut bell = bell();
        bell.apply_snapshot(list(&[101]));
        bell.drain_events();

        bell.apply_snapshot(list(&[105, 104, 101]));
        let events = bell.drain_events();
        assert_eq!(alerts(&events), vec![105]);
        assert!(events.contains(&BellEvent::BadgeChanged { state: BadgeState::Unseen }));
        assert_eq!(bell.newest_id(), Some(105));
    }

    #[test]
    fn test_unchanged_head_is_quiet() {
        let mut bell = bell();
        bell.apply_snapshot(list(&[101, 100]));
        bell.drain_events();
        bell.apply_snapshot(list(&[101, 100]));
        assert!(bell.drain_events().is_empty());
        assert_eq!(bell.badge(), BadgeState::Clean);
    }

    #[test]
    fn test_empty_snapshot_keeps_newest_and_does_not_alert() {
        let mut bell = bell();
        bell.apply_snapshot(list(&[101]));
        bell.apply_snapshot(Vec::new());
        assert!(alerts(&bell.drain_events()).is_empty());
        assert_eq!(bell.newest_id(), Some(101));
        assert!(bell.notifications().is_empty());
    }

    #[test]
    fn test_snapshot_filters_cleared_and_duplicates() {
        let store = Arc::new(MemoryKeyValueStore::with_entry(CLEARED_KEY, "[102]"));
        let mut bell = bell_with(store);
        bell.apply_snapshot(list(&[103, 102, 103, 101]));
        let ids: Vec<OrderId> = bell.notifications().iter().map(|n| n.order_id).collect();
        assert_eq!(ids, vec![103, 101]);
    }

    #[test]
    fn test_pushed_prepends_and_alerts() {
        let mut bell = bell();
        bell.apply_pushed(n(7));
        bell.apply_pushed(n(8));
        bell.apply_pushed(n(7));
        let ids: Vec<OrderId> = bell.notifications().iter().map(|n| n.order_id).collect();
        assert_eq!(ids, vec![8, 7]);
        assert_eq!(alerts(&bell.drain_events()), vec![7, 8]);
        assert_eq!(bell.newest_id(), Some(8));
    }

    #[test]
    fn test_pushed_cleared_id_is_discarded() {
        let store = Arc::new(MemoryKeyValueStore::with_entry(CLEARED_KEY, "[5]"));
        let mut bell = bell_with(store);
        bell.apply_pushed(n(5));
        assert!(bell.notifications().is_empty());
        assert!(bell.drain_events().is_empty());
    }

    #[test]
    fn test_open_panel_clears_badge() {
        let mut bell = bell();
        bell.apply_pushed(n(1));
        assert_eq!(bell.badge(), BadgeState::Unseen);
        bell.drain_events();

        bell.open_panel();
        assert_eq!(
            bell.drain_events(),
            vec![
                BellEvent::BadgeChanged { state: BadgeState::Clean },
                BellEvent::PanelOpened
            ]
        );
        assert!(bell.is_panel_open());
    }

    #[test]
    fn test_click_entry_marks_read_and_closes() {
        let mut bell = bell();
        bell.apply_snapshot(list(&[2, 1]));
        bell.open_panel();
        bell.drain_events();

        assert_eq!(bell.click_entry(1).as_deref(), Some("/assign?highlight=1"));
        assert!(!bell.is_panel_open());
        let entries = bell.panel_entries();
        assert!(!entries[0].read);
        assert!(entries[1].read);
        assert!(bell.cleared_ids().is_empty());

        assert_eq!(bell.click_entry(999), None);
    }

    #[test]
    fn test_click_entry_requires_open_panel() {
        let mut bell = bell();
        bell.apply_snapshot(list(&[2, 1]));
        bell.drain_events();

        assert_eq!(bell.click_entry(2), None);
        assert!(bell.drain_events().is_empty());
        assert!(bell.panel_entries().iter().all(|e| !e.read));
    }

    #[test]
    fn test_clear_all_persists_and_suspends() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut bell = bell_with(store.clone());
        bell.apply_snapshot(list(&[103, 102, 101]));
        bell.open_panel();
        bell.click_entry(102);

        assert_eq!(bell.clear_all(), 3);
        assert!(bell.notifications().is_empty());
        assert!(bell.is_suspended());
        assert_eq!(
            store.get(CLEARED_KEY).unwrap().as_deref(),
            Some("[101,102,103]")
        );

        bell.apply_snapshot(list(&[104, 103]));
        assert!(bell.notifications().is_empty(), "suspended bell must ignore snapshots");

        bell.open_panel();
        bell.apply_snapshot(list(&[104, 103, 101]));
        let ids: Vec<OrderId> = bell.notifications().iter().map(|n| n.order_id).collect();
        assert_eq!(ids, vec![104]);
        assert!(bell.panel_entries().iter().all(|e| !e.read));
    }

    #[test]
    fn test_clear_all_survives_persist_failure() {
        let mut toaster = MockToaster::new();
        toaster.expect_show().return_const(());
        let alerter = Alerter::new(Box::new(toaster), Box::new(MockSoundPlayer::new()), false);

        struct ReadOnly;
        impl KeyValueStore for ReadOnly {
            fn get(&self, _key: &str) -> crate::NotificationResult<Option<String>> {
                Ok(None)
            }
            fn set(&self, _key: &str, _value: &str) -> crate::NotificationResult<()> {
                Err(crate::NotificationError::persistence_error_no_source("set", "read-only"))
            }
        }

        let mut bell = NotificationBell::mount(Box::new(ReadOnly), alerter, BellSettings::default());
        bell.apply_snapshot(list(&[1]));
        assert_eq!(bell.clear_all(), 1);
        assert!(bell.cleared_ids().contains(&1));
    }
}
