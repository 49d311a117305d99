//! Accessibility tree model and synthetic-action plumbing for ticketrush.
//!
//! Hosting services capture [`UiEvent`]s (screen identity + node-tree
//! snapshot) and feed them to the engine crate; the engine answers with
//! synthetic clicks through an [`ActionDispatcher`].

pub mod dispatch;
pub mod events;
pub mod tree;

pub use dispatch::{click, ActionDispatcher, ClickRecord, LoggingDispatcher, RecordingDispatcher};
pub use events::{UiEvent, UiEventKind};
pub use tree::{NodeId, SnapshotBuilder, UiNode, UiSnapshot};
