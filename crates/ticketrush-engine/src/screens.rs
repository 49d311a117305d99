//! Screen classification.
//!
//! The platform reports the foreground screen as an opaque class-name
//! string. A [`ScreenMap`] is the explicit, startup-validated table from
//! those strings to the [`Screen`]s the checkout flow knows about.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The screens the checkout flow cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Event/show detail page (step 1 territory).
    LiveDetail,
    /// Session + price-tier selection page (step 2).
    TierSelection,
    /// Final order submission page (step 3).
    OrderSubmit,
    /// Anything else — keyboards, transient dialogs, unrelated activities.
    Unknown,
}

/// Invalid [`ScreenMap`] construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScreenMapError {
    #[error("empty class name in screen map")]
    EmptyClassName,

    #[error("class name {0:?} mapped twice")]
    DuplicateClassName(String),

    #[error("cannot map a class name to Screen::Unknown")]
    UnknownTarget,

    #[error("no class name mapped to {0:?}")]
    MissingScreen(Screen),
}

/// Validated class-name → screen table.
///
/// Class names not in the table classify as [`Screen::Unknown`]; the
/// machine treats those as sticky (step unchanged), so keyboard popups and
/// transient dialogs never reset checkout progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenMap {
    entries: HashMap<String, Screen>,
}

impl ScreenMap {
    /// Build and validate a map. Every one of the three known screens must
    /// be covered, class names must be non-empty and unique, and `Unknown`
    /// is not a legal target.
    pub fn new(
        entries: impl IntoIterator<Item = (String, Screen)>,
    ) -> Result<Self, ScreenMapError> {
        let mut map = HashMap::new();
        for (class_name, screen) in entries {
            if class_name.is_empty() {
                return Err(ScreenMapError::EmptyClassName);
            }
            if screen == Screen::Unknown {
                return Err(ScreenMapError::UnknownTarget);
            }
            if map.insert(class_name.clone(), screen).is_some() {
                return Err(ScreenMapError::DuplicateClassName(class_name));
            }
        }
        for required in [Screen::LiveDetail, Screen::TierSelection, Screen::OrderSubmit] {
            if !map.values().any(|s| *s == required) {
                return Err(ScreenMapError::MissingScreen(required));
            }
        }
        Ok(Self { entries: map })
    }

    pub fn classify(&self, class_name: &str) -> Screen {
        self.entries
            .get(class_name)
            .copied()
            .unwrap_or(Screen::Unknown)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
