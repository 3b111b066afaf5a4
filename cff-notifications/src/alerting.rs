//! Toast and sound alerts for new orders.
//!
//! A toast is shown for every alert. The sound only plays once the operator
//! has interacted with the frontend at least once, since an unattended page
//! must not start making noise on its own.

use tracing::{debug, info, warn};

use crate::error::NotificationResult;
use crate::types::OrderId;

/// Displays a transient message to the operator.
#[cfg_attr(test, mockall::automock)]
pub trait Toaster: Send {
    fn show(&mut self, message: &str);
}

/// Plays the new-order chime.
#[cfg_attr(test, mockall::automock)]
pub trait SoundPlayer: Send {
    fn play(&mut self) -> NotificationResult<()>;
}

/// Toaster that only writes the message to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingToaster;

impl Toaster for TracingToaster {
    fn show(&mut self, message: &str) {
        info!(target: "cff_notifications::toast", "{}", message);
    }
}

/// Sound player for environments without audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSoundPlayer;

impl SoundPlayer for SilentSoundPlayer {
    fn play(&mut self) -> NotificationResult<()> {
        debug!("Sound playback skipped: no audio output configured");
        Ok(())
    }
}

/// What an alert actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertOutcome {
    pub toast_shown: bool,
    pub sound_played: bool,
}

/// The message shown for a new order.
pub fn toast_message(order_id: OrderId) -> String {
    format!("🛒 New order received: #{}", order_id)
}

pub struct Alerter {
    toaster: Box<dyn Toaster>,
    sound: Box<dyn SoundPlayer>,
    sound_enabled: bool,
    interaction_unlocked: bool,
}

impl Alerter {
    pub fn new(toaster: Box<dyn Toaster>, sound: Box<dyn SoundPlayer>, sound_enabled: bool) -> Self {
        Self {
            toaster,
            sound,
            sound_enabled,
            interaction_unlocked: false,
        }
    }

    /// An alerter that logs toasts and never plays sound.
    pub fn silent() -> Self {
        Self::new(Box::new(TracingToaster), Box::new(SilentSoundPlayer), false)
    }

    pub fn is_interaction_unlocked(&self) -> bool {
        self.interaction_unlocked
    }

    /// Records the first operator interaction. Returns `true` only for the
    /// call that actually unlocked audio.
    pub fn unlock_interaction(&mut self) -> bool {
        if self.interaction_unlocked {
            return false;
        }
        self.interaction_unlocked = true;
        debug!("Operator interaction recorded; audio alerts unlocked");
        true
    }

    pub fn notify(&mut self, order_id: OrderId) -> AlertOutcome {
        info!(order_id, "New order notification");
        self.toaster.show(&toast_message(order_id));

        let sound_played = if self.interaction_unlocked && self.sound_enabled {
            match self.sound.play() {
                Ok(()) => true,
                Err(e) => {
                    warn!(order_id, error = %e, "Failed to play notification sound");
                    false
                }
            }
        } else {
            debug!(
                order_id,
                unlocked = self.interaction_unlocked,
                sound_enabled = self.sound_enabled,
                "Notification sound suppressed"
            );
            false
        };

        AlertOutcome {
            toast_shown: true,
            sound_played,
        }
    }
}

impl std::fmt::Debug for Alerter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alerter")
            .field("sound_enabled", &self.sound_enabled)
            .field("interaction_unlocked", &self.interaction_unlocked)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use mockall::predicate::eq;

    fn toaster_expecting(message: &'static str, times: usize) -> MockToaster {
        let mut toaster = MockToaster::new();
        toaster.expect_show().with(eq(message)).times(times).return_const(());
        toaster
    }

    #[test]
    fn test_toast_message_format() {
        assert_eq!(toast_message(105), "🛒 New order received: #105");
    }

    #[test]
    fn test_notify_before_interaction_is_toast_only() {
        let mut sound = MockSoundPlayer::new();
        sound.expect_play().never();
        let mut alerter = Alerter::new(
            Box::new(toaster_expecting("🛒 New order received: #7", 1)),
            Box::new(sound),
            true,
        );

        let outcome = alerter.notify(7);
        assert_eq!(outcome, AlertOutcome { toast_shown: true, sound_played: false });
    }

    #[test]
    fn test_notify_after_interaction_plays_sound() {
        let mut sound = MockSoundPlayer::new();
        sound.expect_play().times(2).returning(|| Ok(()));
        let mut alerter = Alerter::new(
            Box::new(toaster_expecting("🛒 New order received: #8", 2)),
            Box::new(sound),
            true,
        );

        assert!(alerter.unlock_interaction());
        assert!(!alerter.unlock_interaction());
        assert!(alerter.notify(8).sound_played);
        assert!(alerter.notify(8).sound_played);
    }

    #[test]
    fn test_notify_with_sound_disabled_never_plays() {
        let mut sound = MockSoundPlayer::new();
        sound.expect_play().never();
        let mut alerter = Alerter::new(
            Box::new(toaster_expecting("🛒 New order received: #9", 1)),
            Box::new(sound),
            false,
        );
        alerter.unlock_interaction();
        assert!(!alerter.notify(9).sound_played);
    }

    #[test]
    fn test_playback_failure_still_shows_toast() {
        let mut sound = MockSoundPlayer::new();
        sound
            .expect_play()
            .times(1)
            .returning(|| Err(NotificationError::Playback("device busy".into())));
        let mut alerter = Alerter::new(
            Box::new(toaster_expecting("🛒 New order received: #10", 1)),
            Box::new(sound),
            true,
        );
        alerter.unlock_interaction();
        assert_eq!(
            alerter.notify(10),
            AlertOutcome { toast_shown: true, sound_played: false }
        );
    }
}
