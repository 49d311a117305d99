//! Engine configuration.
//!
//! Two layers: the [`BotProfile`] (which screens/controls/labels the target
//! app uses — ships with defaults for the app version this was written
//! against, overridable from a JSON file when the app changes its view
//! ids), and the [`TargetSelection`] (the two user-entered strings naming
//! which session and price tier to grab, persisted between runs).

use crate::screens::{Screen, ScreenMap, ScreenMapError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The user's pick: which show time and which price tier.
///
/// Both are opaque strings compared against on-screen label text. Loaded
/// at startup, updated on every edit, immutable during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelection {
    /// Session / show-time label (e.g. "周六 19:30").
    #[serde(default)]
    pub session: String,

    /// Price-tier label (e.g. "看台 580元").
    #[serde(default)]
    pub tier: String,
}

impl TargetSelection {
    pub fn new(session: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            tier: tier.into(),
        }
    }

    /// Default persistence location under the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ticketrush").join("target.json"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read target selection from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid target selection in {}", path.display()))
    }

    /// Load, falling back to empty selections when the file doesn't exist
    /// yet or doesn't parse.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Atomic save: write a sibling temp file, then rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, raw)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("failed to move target selection into {}", path.display()))?;
        Ok(())
    }
}

/// Everything the engine hardcodes about the target app, as data.
///
/// Defaults match the app build this engine was calibrated against; all of
/// it can be overridden from a JSON profile file when a new app release
/// renames activities or view ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotProfile {
    /// Activity class of the show detail page.
    pub live_detail_class: String,
    /// Activity class of the session/tier selection page.
    pub tier_selection_class: String,
    /// Activity class of the order submission page.
    pub order_submit_class: String,

    /// View id of the buy control on the detail page.
    pub buy_view_id: String,
    /// View id of the confirm-purchase control on the tier page.
    pub confirm_view_id: String,

    /// Buy-control text while the purchase window has not opened yet.
    pub about_to_start_label: String,
    /// Exact text of the final submit control.
    pub submit_order_label: String,

    /// Settle time before each synthetic click, giving the platform a
    /// moment to finish laying out freshly rendered nodes.
    pub settle_delay_ms: u64,
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            live_detail_class:
                "cn.damai.trade.newtradeorder.ui.projectdetail.ui.activity.ProjectDetailActivity"
                    .into(),
            tier_selection_class: "cn.damai.commonbusiness.seatbiz.sku.qilin.ui.NcovSkuActivity"
                .into(),
            order_submit_class: "cn.damai.ultron.view.activity.DmOrderActivity".into(),
            buy_view_id: "cn.damai:id/tv_left_main_text".into(),
            confirm_view_id: "cn.damai:id/btn_buy".into(),
            about_to_start_label: "即将开抢".into(),
            submit_order_label: "提交订单".into(),
            settle_delay_ms: 100,
        }
    }
}

impl BotProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid profile in {}", path.display()))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// The validated screen table this profile describes.
    pub fn screen_map(&self) -> Result<ScreenMap, ScreenMapError> {
        ScreenMap::new([
            (self.live_detail_class.clone(), Screen::LiveDetail),
            (self.tier_selection_class.clone(), Screen::TierSelection),
            (self.order_submit_class.clone(), Screen::OrderSubmit),
        ])
    }

    /// A profile with no settle delay — unit tests don't want to sleep.
    #[doc(hidden)]
    pub fn without_settle_delay() -> Self {
        Self {
            settle_delay_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_builds_a_screen_map() {
        let profile = BotProfile::default();
        let map = profile.screen_map().unwrap();
        assert_eq!(map.classify(&profile.order_submit_class), Screen::OrderSubmit);
        assert_eq!(profile.settle_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_profile_partial_json_fills_defaults() {
        let profile: BotProfile =
            serde_json::from_str(r#"{"settle_delay_ms": 0, "buy_view_id": "x:id/buy"}"#).unwrap();
        assert_eq!(profile.buy_view_id, "x:id/buy");
        assert_eq!(profile.settle_delay_ms, 0);
        assert_eq!(profile.submit_order_label, "提交订单");
    }

    #[test]
    fn test_duplicate_classes_fail_validation() {
        let profile = BotProfile {
            tier_selection_class: "same".into(),
            order_submit_class: "same".into(),
            ..BotProfile::default()
        };
        assert!(profile.screen_map().is_err());
    }

    #[test]
    fn test_target_selection_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("target.json");

        let target = TargetSelection::new("周六 19:30", "看台 580元");
        target.save(&path).unwrap();

        assert_eq!(TargetSelection::load(&path).unwrap(), target);
        assert_eq!(TargetSelection::load_or_default(&path), target);
    }

    #[test]
    fn test_target_selection_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(TargetSelection::load(&path).is_err());
        assert_eq!(
            TargetSelection::load_or_default(&path),
            TargetSelection::default()
        );
    }

    #[test]
    fn test_target_selection_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.json");

        TargetSelection::new("a", "b").save(&path).unwrap();
        TargetSelection::new("c", "d").save(&path).unwrap();
        assert_eq!(TargetSelection::load(&path).unwrap(), TargetSelection::new("c", "d"));
    }
}
