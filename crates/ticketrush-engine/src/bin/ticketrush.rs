//! ticketrush CLI.
//!
//! Drives the checkout engine against captured event streams (replay
//! files: a JSON array of `UiEvent`s) and manages the persisted target
//! selection. A live platform host would embed the engine crate directly;
//! this binary exists for profile debugging and offline runs.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use ticketrush_accessibility::{LoggingDispatcher, UiEvent};
use ticketrush_engine::{
    event_channel, run_automation_loop, AutomationController, BotProfile, GrantedProbe,
    TargetSelection,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ticketrush", about = "event-driven checkout automation", version)]
struct Cli {
    /// Bot profile JSON (defaults to the built-in profile).
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed a captured event stream through the engine and log the clicks
    /// it would dispatch.
    Replay {
        /// Replay file: JSON array of UI events.
        #[arg(long)]
        events: PathBuf,

        /// Session label override (otherwise the persisted selection).
        #[arg(long)]
        session: Option<String>,

        /// Tier label override (otherwise the persisted selection).
        #[arg(long)]
        tier: Option<String>,
    },

    /// Print the classified screen for every event in a replay file.
    Classify {
        #[arg(long)]
        events: PathBuf,
    },

    /// Show or update the persisted target selection.
    Target {
        #[arg(long)]
        session: Option<String>,

        #[arg(long)]
        tier: Option<String>,

        /// Selection file (defaults to the platform config dir).
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn load_profile(path: &Option<PathBuf>) -> Result<BotProfile> {
    match path {
        Some(p) => BotProfile::load(p),
        None => Ok(BotProfile::default()),
    }
}

fn load_events(path: &PathBuf) -> Result<Vec<UiEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read events from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid event stream in {}", path.display()))
}

fn target_path(path: Option<PathBuf>) -> Result<PathBuf> {
    match path.or_else(TargetSelection::default_path) {
        Some(p) => Ok(p),
        None => bail!("no config directory available, pass --path"),
    }
}

async fn replay(
    profile: BotProfile,
    events: Vec<UiEvent>,
    session: Option<String>,
    tier: Option<String>,
) -> Result<()> {
    let mut target = match TargetSelection::default_path() {
        Some(p) => TargetSelection::load_or_default(&p),
        None => TargetSelection::default(),
    };
    if let Some(session) = session {
        target.session = session;
    }
    if let Some(tier) = tier {
        target.tier = tier;
    }

    let mut controller = AutomationController::new(profile, target)?;
    controller.start(&GrantedProbe)?;

    let (tx, rx) = event_channel();
    for event in events {
        // Unbounded channel, the whole capture fits up front.
        let _ = tx.send(event);
    }
    drop(tx);

    let summary = run_automation_loop(
        controller,
        LoggingDispatcher,
        rx,
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    info!(
        events = summary.events,
        processed = summary.processed,
        clicks = summary.clicks,
        finished = summary.finished,
        "replay complete"
    );
    if !summary.finished {
        println!("replay ended without reaching order submission");
    } else {
        println!("order submitted after {} clicks", summary.clicks);
    }
    Ok(())
}

fn classify(profile: &BotProfile, events: &[UiEvent]) -> Result<()> {
    let map = profile.screen_map()?;
    for (i, event) in events.iter().enumerate() {
        println!(
            "{:4}  {:?}  {:?}  {}",
            i,
            event.kind,
            map.classify(&event.class_name),
            event.class_name
        );
    }
    Ok(())
}

fn target(session: Option<String>, tier: Option<String>, path: Option<PathBuf>) -> Result<()> {
    let path = target_path(path)?;
    let mut selection = TargetSelection::load_or_default(&path);

    if session.is_none() && tier.is_none() {
        println!("session: {:?}", selection.session);
        println!("tier:    {:?}", selection.tier);
        println!("file:    {}", path.display());
        return Ok(());
    }
    if let Some(session) = session {
        selection.session = session;
    }
    if let Some(tier) = tier {
        selection.tier = tier;
    }
    selection.save(&path)?;
    println!("saved target selection to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let profile = load_profile(&cli.profile)?;

    match cli.command {
        Command::Replay {
            events,
            session,
            tier,
        } => replay(profile, load_events(&events)?, session, tier).await,
        Command::Classify { events } => classify(&profile, &load_events(&events)?),
        Command::Target {
            session,
            tier,
            path,
        } => target(session, tier, path),
    }
}
