//! Synthetic click dispatch.
//!
//! The engine never touches the platform directly; it hands resolved click
//! targets to an [`ActionDispatcher`]. The hosting service supplies a real
//! dispatcher (on Android, `performAction(ACTION_CLICK)`), the replay CLI
//! a logging one, tests a recording one.

use crate::tree::{NodeId, UiSnapshot};
use tracing::{debug, info};

/// Sink for synthetic click actions.
pub trait ActionDispatcher {
    /// Dispatch a click on `target`, which is guaranteed to be the
    /// clickable node resolved by [`UiSnapshot::clickable_target`].
    fn dispatch_click(&mut self, snapshot: &UiSnapshot, target: NodeId);
}

/// Click `node`, delegating to its nearest clickable ancestor when the node
/// itself is not clickable.
///
/// Returns whether a click was actually dispatched. A `false` is the
/// deliberate "no clickable ancestor, silently skip" policy — the caller
/// treats it as "not ready, try again on the next event".
pub fn click(
    snapshot: &UiSnapshot,
    node: NodeId,
    dispatcher: &mut dyn ActionDispatcher,
) -> bool {
    match snapshot.clickable_target(node) {
        Some(target) => {
            dispatcher.dispatch_click(snapshot, target);
            true
        }
        None => {
            debug!(node = node.0, "no clickable ancestor, click skipped");
            false
        }
    }
}

/// Dispatcher that only logs — used by the replay CLI.
#[derive(Debug, Default)]
pub struct LoggingDispatcher;

impl ActionDispatcher for LoggingDispatcher {
    fn dispatch_click(&mut self, snapshot: &UiSnapshot, target: NodeId) {
        let node = snapshot.get(target);
        info!(
            target_node = target.0,
            view_id = node.and_then(|n| n.view_id.as_deref()).unwrap_or(""),
            text = node.and_then(|n| n.text.as_deref()).unwrap_or(""),
            "click"
        );
    }
}

/// What a [`RecordingDispatcher`] captured about one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRecord {
    pub target: NodeId,
    pub view_id: Option<String>,
    pub text: Option<String>,
    pub class_name: Option<String>,
}

/// Dispatcher that records every click — the test double for the engine.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    pub clicks: Vec<ClickRecord>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts of all recorded clicks, in dispatch order.
    pub fn clicked_texts(&self) -> Vec<&str> {
        self.clicks
            .iter()
            .map(|c| c.text.as_deref().unwrap_or(""))
            .collect()
    }
}

impl ActionDispatcher for RecordingDispatcher {
    fn dispatch_click(&mut self, snapshot: &UiSnapshot, target: NodeId) {
        let node = snapshot.get(target);
        self.clicks.push(ClickRecord {
            target,
            view_id: node.and_then(|n| n.view_id.clone()),
            text: node.and_then(|n| n.text.clone()),
            class_name: node.and_then(|n| n.class_name.clone()),
        });
    }
}
