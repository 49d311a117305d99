//! The three-step checkout state machine.
//!
//! Level-triggered, not edge-triggered: every delivered event re-runs the
//! current step's full action. Lookups are idempotent — a control that
//! hasn't rendered yet simply yields `None` and is retried on the next
//! event, so duplicate or out-of-order platform delivery costs nothing
//! but redundant no-op attempts.

use crate::config::{BotProfile, TargetSelection};
use crate::screens::{Screen, ScreenMap};
use serde::{Deserialize, Serialize};
use ticketrush_accessibility::{click, ActionDispatcher, UiEvent, UiEventKind, UiSnapshot};
use tracing::{debug, info};

/// Where in the checkout flow the machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Step 1: on the detail page, click buy once the window opens.
    PlaceOrder,
    /// Step 2: pick session + tier, confirm purchase.
    ConfirmOrder,
    /// Step 3: hit the final submit control.
    SubmitOrder,
}

/// What one event's worth of processing did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Synthetic clicks actually dispatched.
    pub clicks: usize,
    /// The submit control was found — checkout is done, stop the run.
    pub finished: bool,
}

/// The checkout state machine.
///
/// Holds only the current step; the last observed screen identity is the
/// sole transition input, no event history is kept.
pub struct CheckoutMachine {
    step: CheckoutStep,
    profile: BotProfile,
    target: TargetSelection,
}

impl CheckoutMachine {
    pub fn new(profile: BotProfile, target: TargetSelection) -> Self {
        Self {
            step: CheckoutStep::PlaceOrder,
            profile,
            target,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn target(&self) -> &TargetSelection {
        &self.target
    }

    pub fn set_target(&mut self, target: TargetSelection) {
        self.target = target;
    }

    pub fn reset(&mut self) {
        self.step = CheckoutStep::PlaceOrder;
    }

    /// Apply a classified screen identity. Unknown screens are sticky —
    /// the step stays wherever it was.
    pub fn apply_screen(&mut self, screen: Screen) {
        let next = match screen {
            Screen::LiveDetail => CheckoutStep::PlaceOrder,
            Screen::TierSelection => CheckoutStep::ConfirmOrder,
            Screen::OrderSubmit => CheckoutStep::SubmitOrder,
            Screen::Unknown => return,
        };
        if next != self.step {
            info!(from = ?self.step, to = ?next, "checkout step transition");
            self.step = next;
        }
    }

    /// Process one UI event: maybe transition on the screen identity, then
    /// run the current step's action against the event's snapshot.
    pub fn on_event(
        &mut self,
        event: &UiEvent,
        screen_map: &ScreenMap,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> StepOutcome {
        if event.kind == UiEventKind::WindowStateChanged {
            self.apply_screen(screen_map.classify(&event.class_name));
        }
        match self.step {
            CheckoutStep::PlaceOrder => self.place_order(&event.snapshot, dispatcher),
            CheckoutStep::ConfirmOrder => self.confirm_order(&event.snapshot, dispatcher),
            CheckoutStep::SubmitOrder => self.submit_order(&event.snapshot, dispatcher),
        }
    }

    /// Step 1: the buy control shows the "about to start" label until the
    /// purchase window opens; any other text means it's live — click it.
    fn place_order(
        &self,
        snapshot: &UiSnapshot,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if let Some(buy) = snapshot.find_by_id(&self.profile.buy_view_id) {
            if snapshot.text_of(buy) != self.profile.about_to_start_label {
                self.settle();
                outcome.clicks += usize::from(click(snapshot, buy, dispatcher));
            } else {
                debug!("purchase window not open yet");
            }
        }
        outcome
    }

    /// Step 2: three independent lookups per event — session label, tier
    /// label, confirm control. Each may be absent while the page is still
    /// rendering; missing one never blocks the others.
    fn confirm_order(
        &self,
        snapshot: &UiSnapshot,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        for label in [&self.target.session, &self.target.tier] {
            if let Some(node) = snapshot.find_by_text(label, false) {
                self.settle();
                outcome.clicks += usize::from(click(snapshot, node, dispatcher));
            }
        }
        if let Some(confirm) = snapshot.find_by_id(&self.profile.confirm_view_id) {
            self.settle();
            outcome.clicks += usize::from(click(snapshot, confirm, dispatcher));
        }
        outcome
    }

    /// Step 3: exact match on the submit label; finding it ends the run
    /// whether or not the click found a clickable target.
    fn submit_order(
        &self,
        snapshot: &UiSnapshot,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if let Some(submit) = snapshot.find_by_text(&self.profile.submit_order_label, true) {
            self.settle();
            outcome.clicks += usize::from(click(snapshot, submit, dispatcher));
            outcome.finished = true;
            info!("submit control clicked, checkout finished");
        }
        outcome
    }

    /// Blocking settle pause before a click. Event processing is a single
    /// logical thread, so this intentionally delays further delivery.
    fn settle(&self) {
        let delay = self.profile.settle_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketrush_accessibility::{RecordingDispatcher, SnapshotBuilder, UiNode};

    fn machine() -> CheckoutMachine {
        CheckoutMachine::new(
            BotProfile::without_settle_delay(),
            TargetSelection::new("周六 19:30", "看台 580元"),
        )
    }

    fn screen_map() -> ScreenMap {
        BotProfile::default().screen_map().unwrap()
    }

    fn detail_snapshot(buy_text: &str) -> UiSnapshot {
        let mut b = SnapshotBuilder::new();
        let root = b.add_root(UiNode::new());
        b.add_child(
            root,
            UiNode::new()
                .with_view_id("cn.damai:id/tv_left_main_text")
                .with_text(buy_text)
                .clickable(),
        );
        b.build()
    }

    fn tier_snapshot() -> UiSnapshot {
        let mut b = SnapshotBuilder::new();
        let root = b.add_root(UiNode::new());
        b.add_child(root, UiNode::new().with_text("周六 19:30 晚场").clickable());
        b.add_child(root, UiNode::new().with_text("看台 580元*1").clickable());
        b.add_child(
            root,
            UiNode::new()
                .with_view_id("cn.damai:id/btn_buy")
                .with_text("确定")
                .clickable(),
        );
        b.build()
    }

    fn submit_snapshot(label: &str) -> UiSnapshot {
        let mut b = SnapshotBuilder::new();
        let root = b.add_root(UiNode::new());
        b.add_child(root, UiNode::new().with_text(label).clickable());
        b.build()
    }

    #[test]
    fn test_place_order_noop_while_about_to_start() {
        let mut m = machine();
        let mut rec = RecordingDispatcher::new();
        let event = UiEvent::window_state(
            &BotProfile::default().live_detail_class,
            detail_snapshot("即将开抢"),
        );
        let out = m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(out, StepOutcome::default());
        assert!(rec.clicks.is_empty());
    }

    #[test]
    fn test_place_order_clicks_once_window_open() {
        let mut m = machine();
        let mut rec = RecordingDispatcher::new();
        let event = UiEvent::window_state(
            &BotProfile::default().live_detail_class,
            detail_snapshot("立即购买"),
        );
        let out = m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(out.clicks, 1);
        assert!(!out.finished);
        assert_eq!(rec.clicked_texts(), vec!["立即购买"]);
    }

    #[test]
    fn test_place_order_missing_buy_control_is_noop() {
        let mut m = machine();
        let mut rec = RecordingDispatcher::new();
        let event = UiEvent::content_changed("whatever", UiSnapshot::default());
        let out = m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(out, StepOutcome::default());
    }

    #[test]
    fn test_confirm_order_attempts_three_independent_clicks() {
        let mut m = machine();
        m.apply_screen(Screen::TierSelection);
        let mut rec = RecordingDispatcher::new();
        let event = UiEvent::content_changed("whatever", tier_snapshot());
        let out = m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(out.clicks, 3);
        assert_eq!(
            rec.clicked_texts(),
            vec!["周六 19:30 晚场", "看台 580元*1", "确定"]
        );
    }

    #[test]
    fn test_confirm_order_partial_page_still_clicks_the_rest() {
        let mut m = machine();
        m.apply_screen(Screen::TierSelection);

        // Only the tier row has rendered; session + confirm are absent.
        let mut b = SnapshotBuilder::new();
        let root = b.add_root(UiNode::new());
        b.add_child(root, UiNode::new().with_text("看台 580元").clickable());
        let event = UiEvent::content_changed("whatever", b.build());

        let mut rec = RecordingDispatcher::new();
        let out = m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(out.clicks, 1);
        assert_eq!(rec.clicked_texts(), vec!["看台 580元"]);
    }

    #[test]
    fn test_confirm_order_skips_empty_labels() {
        let mut m = CheckoutMachine::new(
            BotProfile::without_settle_delay(),
            TargetSelection::new("", "看台 580元"),
        );
        m.apply_screen(Screen::TierSelection);
        let mut rec = RecordingDispatcher::new();
        let event = UiEvent::content_changed("whatever", tier_snapshot());
        let out = m.on_event(&event, &screen_map(), &mut rec);
        // Empty session label matches nothing; tier + confirm still go.
        assert_eq!(out.clicks, 2);
    }

    #[test]
    fn test_submit_order_requires_exact_match() {
        let mut m = machine();
        m.apply_screen(Screen::OrderSubmit);
        let mut rec = RecordingDispatcher::new();

        let near_miss = UiEvent::content_changed("whatever", submit_snapshot("提交订单中"));
        let out = m.on_event(&near_miss, &screen_map(), &mut rec);
        assert_eq!(out, StepOutcome::default());

        let hit = UiEvent::content_changed("whatever", submit_snapshot("提交订单"));
        let out = m.on_event(&hit, &screen_map(), &mut rec);
        assert_eq!(out.clicks, 1);
        assert!(out.finished);
    }

    #[test]
    fn test_unknown_screen_is_sticky() {
        let mut m = machine();
        m.apply_screen(Screen::TierSelection);
        let event = UiEvent::window_state(
            "android.inputmethodservice.SoftInputWindow",
            UiSnapshot::default(),
        );
        let mut rec = RecordingDispatcher::new();
        m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(m.step(), CheckoutStep::ConfirmOrder);
    }

    #[test]
    fn test_content_events_never_transition() {
        let mut m = machine();
        m.apply_screen(Screen::OrderSubmit);
        // A content-change event reporting the tier screen's class must not
        // move the machine back; only window-state changes classify.
        let event = UiEvent::content_changed(
            &BotProfile::default().tier_selection_class,
            UiSnapshot::default(),
        );
        let mut rec = RecordingDispatcher::new();
        m.on_event(&event, &screen_map(), &mut rec);
        assert_eq!(m.step(), CheckoutStep::SubmitOrder);
    }

    #[test]
    fn test_reset_returns_to_place_order() {
        let mut m = machine();
        m.apply_screen(Screen::OrderSubmit);
        m.reset();
        assert_eq!(m.step(), CheckoutStep::PlaceOrder);
    }
}
