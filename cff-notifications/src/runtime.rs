//! Runs a mounted bell: one driver task owns the [`NotificationBell`], applies
//! source events and operator commands strictly one at a time, and broadcasts
//! the resulting [`BellEvent`]s.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::badge::BadgeState;
use crate::bell::{BellEvent, NotificationBell};
use crate::error::{NotificationError, NotificationResult};
use crate::panel::PanelEntry;
use crate::source::{stop_requested, NotificationSource, SourceEvent, SourceHandle};
use crate::types::OrderId;

const COMMAND_CAPACITY: usize = 32;
const SOURCE_CAPACITY: usize = 16;
const EVENT_CAPACITY: usize = 64;

/// Operator actions.
#[derive(Debug)]
pub enum BellCommand {
    OpenPanel,
    ClosePanel,
    Click(OrderId),
    ClearAll,
    /// Any interaction with the frontend; unlocks audio on first use.
    Interact,
    View(oneshot::Sender<BellView>),
}

/// Point-in-time copy of what the operator sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BellView {
    pub badge: BadgeState,
    pub panel_open: bool,
    pub entries: Vec<PanelEntry>,
    pub cleared_count: usize,
    pub interaction_unlocked: bool,
}

impl BellView {
    pub fn of(bell: &NotificationBell) -> Self {
        Self {
            badge: bell.badge(),
            panel_open: bell.is_panel_open(),
            entries: bell.panel_entries(),
            cleared_count: bell.cleared_ids().len(),
            interaction_unlocked: bell.is_interaction_unlocked(),
        }
    }
}

/// Cloneable sender of [`BellCommand`]s.
#[derive(Debug, Clone)]
pub struct BellController {
    commands: mpsc::Sender<BellCommand>,
}

impl BellController {
    pub async fn send(&self, command: BellCommand) -> NotificationResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| NotificationError::Internal("bell runtime is not running".to_string()))
    }

    pub async fn open_panel(&self) -> NotificationResult<()> {
        self.send(BellCommand::OpenPanel).await
    }

    pub async fn close_panel(&self) -> NotificationResult<()> {
        self.send(BellCommand::ClosePanel).await
    }

    pub async fn click(&self, order_id: OrderId) -> NotificationResult<()> {
        self.send(BellCommand::Click(order_id)).await
    }

    pub async fn clear_all(&self) -> NotificationResult<()> {
        self.send(BellCommand::ClearAll).await
    }

    pub async fn interact(&self) -> NotificationResult<()> {
        self.send(BellCommand::Interact).await
    }

    pub async fn view(&self) -> NotificationResult<BellView> {
        let (tx, rx) = oneshot::channel();
        self.send(BellCommand::View(tx)).await?;
        rx.await
            .map_err(|_| NotificationError::Internal("bell runtime dropped a view request".to_string()))
    }
}

/// A bell mounted on a source.
pub struct BellRuntime {
    controller: BellController,
    events: broadcast::Sender<BellEvent>,
    source: Option<SourceHandle>,
    stop_tx: watch::Sender<bool>,
    driver: Option<JoinHandle<NotificationBell>>,
}

impl BellRuntime {
    /// Starts `source` and the driver task that owns `bell`.
    pub fn mount(bell: NotificationBell, source: Arc<dyn NotificationSource>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (source_tx, source_rx) = mpsc::channel(SOURCE_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (stop_tx, stop_rx) = watch::channel(false);

        let driver = tokio::spawn(drive(bell, command_rx, source_rx, event_tx.clone(), stop_rx));
        let source = SourceHandle::spawn(source, source_tx);
        info!(source = source.name(), "Bell runtime mounted");

        Self {
            controller: BellController { commands: command_tx },
            events: event_tx,
            source: Some(source),
            stop_tx,
            driver: Some(driver),
        }
    }

    pub fn controller(&self) -> BellController {
        self.controller.clone()
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<BellEvent> {
        self.events.subscribe()
    }

    /// Stops the source, then the driver, and hands back the bell.
    pub async fn unmount(mut self) -> NotificationResult<NotificationBell> {
        if let Some(source) = self.source.take() {
            source.shutdown().await;
        }
        let _ = self.stop_tx.send(true);
        let driver = self
            .driver
            .take()
            .ok_or_else(|| NotificationError::Internal("bell driver already taken".to_string()))?;
        let bell = driver
            .await
            .map_err(|e| NotificationError::Internal(format!("bell driver task failed: {}", e)))?;
        info!("Bell runtime unmounted");
        Ok(bell)
    }
}

impl Drop for BellRuntime {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

async fn drive(
    mut bell: NotificationBell,
    mut commands: mpsc::Receiver<BellCommand>,
    mut source_events: mpsc::Receiver<SourceEvent>,
    events: broadcast::Sender<BellEvent>,
    mut stop: watch::Receiver<bool>,
) -> NotificationBell {
    let mut source_open = true;
    loop {
        tokio::select! {
            biased;
            _ = stop_requested(&mut stop) => break,
            command = commands.recv() => match command {
                Some(command) => handle_command(&mut bell, command),
                None => break,
            },
            event = source_events.recv(), if source_open => match event {
                Some(SourceEvent::Snapshot(list)) => bell.apply_snapshot(list),
                Some(SourceEvent::Pushed(notification)) => bell.apply_pushed(notification),
                None => {
                    debug!("Source channel closed");
                    source_open = false;
                }
            },
        }

        for event in bell.drain_events() {
            // No subscribers is fine.
            let _ = events.send(event);
        }
    }
    debug!("Bell driver stopped");
    bell
}

fn handle_command(bell: &mut NotificationBell, command: BellCommand) {
    match command {
        BellCommand::OpenPanel => bell.open_panel(),
        BellCommand::ClosePanel => bell.close_panel(),
        BellCommand::Click(order_id) => {
            bell.click_entry(order_id);
        }
        BellCommand::ClearAll => {
            bell.clear_all();
        }
        BellCommand::Interact => {
            bell.unlock_interaction();
        }
        BellCommand::View(reply) => {
            let _ = reply.send(BellView::of(bell));
        }
    }
}
