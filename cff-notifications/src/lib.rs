//! Order-notification bell for the Calcutta Fresh Foods admin dashboard.
//!
//! The bell learns about newly placed orders from the backend, either by
//! polling the notifications endpoint or over a WebSocket, hides the ones the
//! operator dismissed, alerts once per genuinely new order and keeps a panel of
//! recent notifications with an unseen badge.
//!
//! ```rust,ignore
//! use cff_notifications::{build_source, Alerter, BellRuntime, BellSettings, FileKeyValueStore, NotificationBell};
//!
//! let config = cff_core::ConfigLoader::load()?;
//! let bell = NotificationBell::mount(
//!     Box::new(FileKeyValueStore::in_app_data_dir()?),
//!     Alerter::silent(),
//!     BellSettings::from(&config.notifications),
//! );
//! let runtime = BellRuntime::mount(bell, build_source(&config)?);
//! runtime.controller().open_panel().await?;
//! let bell = runtime.unmount().await?;
//! ```

// Re-export core crate
pub use cff_core as core;

pub mod alerting;
pub mod badge;
pub mod bell;
pub mod cleared;
pub mod error;
pub mod panel;
pub mod runtime;
pub mod source;
pub mod storage;
pub mod types;

pub use alerting::{toast_message, AlertOutcome, Alerter, SilentSoundPlayer, SoundPlayer, Toaster, TracingToaster};
pub use badge::{BadgeState, UnseenBadge};
pub use bell::{BellEvent, BellSettings, NotificationBell};
pub use cleared::{ClearedSet, ClearedSetStore, CLEARED_KEY};
pub use error::{NotificationError, NotificationResult};
pub use panel::{render_entries, NotificationPanel, PanelEntry, EMPTY_PANEL_MESSAGE};
pub use runtime::{BellCommand, BellController, BellRuntime, BellView};
pub use source::{build_source, NotificationSource, PollingSource, PushSource, SourceEvent, SourceHandle};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use types::{parse_notifications_response, Notification, OrderId};
