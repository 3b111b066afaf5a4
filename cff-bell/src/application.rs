// cff-bell/src/application.rs
use anyhow::{Context, Result};
use cff_core::{initialize_logging, init_minimal_logging, ConfigLoader, CoreConfig, CoreError};
use cff_notifications::{
    build_source, Alerter, BellController, BellEvent, BellRuntime, BellSettings, FileKeyValueStore,
    NotificationBell,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::commands::{ShellCommand, HELP};
use crate::terminal::{render_event, render_view, TerminalSound, TerminalToaster};

/// Reads the configuration named by `cli` and applies its flag overrides.
pub fn load_config(cli: &Cli) -> Result<CoreConfig, CoreError> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => ConfigLoader::load()?,
    };
    ConfigLoader::apply_overrides(&mut config, cli.base_url.clone(), cli.transport.clone())?;
    ConfigLoader::validate_config(&mut config)?;
    Ok(config)
}

fn open_store(config: &CoreConfig) -> Result<FileKeyValueStore> {
    match &config.notifications.storage_dir {
        Some(dir) => Ok(FileKeyValueStore::new(dir)),
        None => FileKeyValueStore::in_app_data_dir().context("Failed to locate the local store"),
    }
}

/// Mounts the bell, serves stdin commands until `quit`, EOF or Ctrl-C, then unmounts.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli).context("Failed to load configuration")?;
    if let Err(e) = initialize_logging(&config.logging, false) {
        eprintln!("[WARN] Falling back to minimal logging: {}", e);
        init_minimal_logging();
    }
    info!(
        base_url = %config.api.base_url,
        transport = %config.notifications.transport,
        "Starting order-notification bell"
    );

    let store = open_store(&config)?;
    info!(dir = %store.dir().display(), "Using local store");
    let alerter = Alerter::new(
        Box::new(TerminalToaster),
        Box::new(TerminalSound),
        config.notifications.sound_enabled,
    );
    let bell = NotificationBell::mount(Box::new(store), alerter, BellSettings::from(&config.notifications));
    let source = build_source(&config).context("Failed to set up the notification source")?;

    let runtime = BellRuntime::mount(bell, source);
    let printer = tokio::spawn(print_events(runtime.subscribe()));

    let outcome = command_loop(runtime.controller()).await;

    let bell = runtime.unmount().await.context("Failed to stop the bell")?;
    printer.abort();
    info!(
        held = bell.notifications().len(),
        cleared = bell.cleared_ids().len(),
        "Order-notification bell stopped"
    );
    outcome
}

async fn command_loop(controller: BellController) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else {
            info!("Input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        // Any input counts as an interaction and unlocks audio.
        controller.interact().await?;
        match line.parse::<ShellCommand>() {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => execute(&controller, command).await?,
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}

async fn execute(controller: &BellController, command: ShellCommand) -> Result<()> {
    match command {
        ShellCommand::Open => {
            controller.open_panel().await?;
            println!("{}", render_view(&controller.view().await?));
        }
        ShellCommand::Close => controller.close_panel().await?,
        ShellCommand::Click(order_id) => controller.click(order_id).await?,
        ShellCommand::Clear => controller.clear_all().await?,
        ShellCommand::List => println!("{}", render_view(&controller.view().await?)),
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }
    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<BellEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = render_event(&event) {
                    println!("{}", line);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Terminal fell behind; some bell events were not shown")
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
