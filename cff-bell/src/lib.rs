//! Terminal frontend for the order-notification bell.
//!
//! Mounts one [`cff_notifications::NotificationBell`], prints toasts and badge
//! changes to stdout and turns stdin lines into panel actions.

pub mod application;
pub mod cli;
pub mod commands;
pub mod terminal;
