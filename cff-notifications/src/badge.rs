use serde::Serialize;

/// Whether the bell shows its "new" indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeState {
    #[default]
    Clean,
    Unseen,
}

/// Two-state machine: an alert marks it unseen, opening the panel marks it
/// clean. Nothing else moves it.
#[derive(Debug, Default)]
pub struct UnseenBadge {
    state: BadgeState,
}

impl UnseenBadge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BadgeState {
        self.state
    }

    pub fn is_unseen(&self) -> bool {
        self.state == BadgeState::Unseen
    }

    /// Returns `true` if the state changed.
    pub fn mark_unseen(&mut self) -> bool {
        self.transition(BadgeState::Unseen)
    }

    /// Returns `true` if the state changed.
    pub fn mark_seen(&mut self) -> bool {
        self.transition(BadgeState::Clean)
    }

    fn transition(&mut self, next: BadgeState) -> bool {
        let changed = self.state != next;
        self.state = next;
        changed
    }
}
