//! Terminal stand-ins for the browser's toast, chime and bell icon.

use std::io::{self, Write};

use cff_notifications::{
    render_entries, BadgeState, BellEvent, BellView, NotificationError, NotificationResult, SoundPlayer, Toaster,
};

/// Prints toasts on their own line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalToaster;

impl Toaster for TerminalToaster {
    fn show(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Rings the terminal bell (ASCII BEL).
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSound;

impl SoundPlayer for TerminalSound {
    fn play(&mut self) -> NotificationResult<()> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(b"\x07")
            .and_then(|_| stdout.flush())
            .map_err(|e| NotificationError::Playback(e.to_string()))
    }
}

pub fn badge_label(state: BadgeState) -> &'static str {
    match state {
        BadgeState::Clean => "🔔 Notifications",
        BadgeState::Unseen => "🔔 Notifications (new)",
    }
}

/// One status line per event worth showing; `None` for the rest.
pub fn render_event(event: &BellEvent) -> Option<String> {
    match event {
        BellEvent::BadgeChanged { state } => Some(badge_label(*state).to_string()),
        BellEvent::Navigate { href, .. } => Some(format!("→ {}", href)),
        BellEvent::Cleared { added, total } => Some(format!(
            "Cleared {} notification(s); {} dismissed in total",
            added, total
        )),
        BellEvent::PanelClosed => Some("Panel closed".to_string()),
        // Toasts are printed by the toaster; panel contents by `render_view`.
        BellEvent::Alerted { .. } | BellEvent::ListChanged { .. } | BellEvent::PanelOpened => None,
    }
}

pub fn render_view(view: &BellView) -> String {
    format!(
        "{}\n🔔 Recent Notifications\n{}",
        badge_label(view.badge),
        render_entries(&view.entries)
    )
}
