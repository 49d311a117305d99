//! UI event types delivered by the platform listener.
//!
//! Events serialize to compact JSON; a captured stream of them is the
//! replay file format consumed by the CLI.

use crate::tree::UiSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform event class.
///
/// Only [`WindowStateChanged`](UiEventKind::WindowStateChanged) carries a
/// screen transition; every kind still re-runs the current checkout step
/// (the machine is level-triggered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEventKind {
    WindowStateChanged,
    WindowContentChanged,
    Other,
}

/// One UI-change notification: what screen reported it, plus a queryable
/// snapshot of the node tree at that moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiEvent {
    /// UTC capture timestamp.
    pub timestamp: DateTime<Utc>,

    pub kind: UiEventKind,

    /// Opaque platform-reported class/identity of the foreground screen.
    pub class_name: String,

    /// Node tree at event time.
    pub snapshot: UiSnapshot,
}

impl UiEvent {
    /// A window-state-change event (screen switch).
    pub fn window_state(class_name: impl Into<String>, snapshot: UiSnapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: UiEventKind::WindowStateChanged,
            class_name: class_name.into(),
            snapshot,
        }
    }

    /// A content-change event within the current screen.
    pub fn content_changed(class_name: impl Into<String>, snapshot: UiSnapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: UiEventKind::WindowContentChanged,
            class_name: class_name.into(),
            snapshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{SnapshotBuilder, UiNode};

    #[test]
    fn test_event_serde_round_trip() {
        let mut b = SnapshotBuilder::new();
        let root = b.add_root(UiNode::new());
        b.add_child(root, UiNode::new().with_text("提交订单").clickable());

        let event = UiEvent::window_state("cn.damai.ultron.view.activity.DmOrderActivity", b.build());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"window_state_changed\""));

        let back: UiEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, UiEventKind::WindowStateChanged);
        assert_eq!(back.class_name, event.class_name);
        assert!(back.snapshot.find_by_text("提交订单", true).is_some());
    }

    #[test]
    fn test_content_changed_kind() {
        let event = UiEvent::content_changed("whatever", UiSnapshot::default());
        assert_eq!(event.kind, UiEventKind::WindowContentChanged);
        assert!(event.snapshot.is_empty());
    }
}
