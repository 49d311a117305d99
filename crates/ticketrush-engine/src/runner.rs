//! Serial event loop.
//!
//! The platform listener pushes [`UiEvent`]s into an unbounded channel;
//! this loop drains them one at a time into the controller. Processing is
//! deliberately serial — the settle delay before each click blocks further
//! delivery, which is fine at human-interaction event cadence.

use crate::controller::AutomationController;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use ticketrush_accessibility::{ActionDispatcher, UiEvent};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub type EventSender = mpsc::UnboundedSender<UiEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Create an event channel pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// What a completed loop run processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Events drained from the channel.
    pub events: usize,
    /// Events the controller actually processed (started + not paused).
    pub processed: usize,
    /// Synthetic clicks dispatched.
    pub clicks: usize,
    /// Whether the run ended because checkout finished.
    pub finished: bool,
}

/// Drain events into the controller until checkout finishes, the channel
/// closes, or `stop_signal` is raised. Returns what happened.
pub async fn run_automation_loop(
    mut controller: AutomationController,
    mut dispatcher: impl ActionDispatcher,
    mut rx: EventReceiver,
    stop_signal: Arc<AtomicBool>,
) -> LoopSummary {
    info!(step = ?controller.step(), "event loop started");
    let mut summary = LoopSummary::default();
    let tick = Duration::from_millis(250);

    loop {
        if stop_signal.load(Ordering::Relaxed) {
            info!("stop signal raised, event loop exiting");
            controller.stop();
            break;
        }

        let event = match tokio::time::timeout(tick, rx.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("event channel closed, event loop exiting");
                controller.stop();
                break;
            }
            // Tick — just re-check the stop signal.
            Err(_) => continue,
        };

        summary.events += 1;
        if let Some(outcome) = controller.handle_event(&event, &mut dispatcher) {
            summary.processed += 1;
            summary.clicks += outcome.clicks;
            debug!(
                class_name = %event.class_name,
                clicks = outcome.clicks,
                step = ?controller.step(),
                "event processed"
            );
            if outcome.finished {
                summary.finished = true;
                info!(total_clicks = summary.clicks, "checkout finished");
                break;
            }
        }
    }

    summary
}
