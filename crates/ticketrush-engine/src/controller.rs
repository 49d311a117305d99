//! Automation lifecycle.
//!
//! An [`AutomationController`] is an owned value constructed once by the
//! hosting shell and handed to whatever delivers platform events — there
//! is no ambient singleton. It layers two flags over the checkout
//! machine: *started* (start/stop lifecycle) and *running* (the
//! pause/resume toggle the floating button flips), and stops itself when
//! the machine reports checkout finished.

use crate::checkout::{CheckoutMachine, CheckoutStep, StepOutcome};
use crate::config::{BotProfile, TargetSelection};
use crate::permissions::PermissionProbe;
use crate::screens::{ScreenMap, ScreenMapError};
use ticketrush_accessibility::{ActionDispatcher, UiEvent};
use tracing::{debug, info};

/// Why `start()` refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StartError {
    #[error("overlay permission not granted")]
    OverlayPermissionDenied,

    #[error("accessibility service not enabled")]
    AccessibilityDisabled,

    #[error("no price tier configured")]
    EmptyTierLabel,
}

pub struct AutomationController {
    machine: CheckoutMachine,
    screen_map: ScreenMap,
    started: bool,
    running: bool,
}

impl AutomationController {
    /// Build a controller. The profile's screen table is validated here,
    /// at startup, so a malformed profile fails loudly instead of
    /// classifying everything as unknown at runtime.
    pub fn new(profile: BotProfile, target: TargetSelection) -> Result<Self, ScreenMapError> {
        let screen_map = profile.screen_map()?;
        Ok(Self {
            machine: CheckoutMachine::new(profile, target),
            screen_map,
            started: false,
            running: false,
        })
    }

    /// Begin a run. Idempotent when already started. Checks the host
    /// permission probes and requires a configured tier label (a session
    /// label is optional — single-session shows don't have one).
    pub fn start(&mut self, probe: &dyn PermissionProbe) -> Result<(), StartError> {
        if self.started {
            return Ok(());
        }
        if !probe.overlay_granted() {
            return Err(StartError::OverlayPermissionDenied);
        }
        if !probe.accessibility_enabled() {
            return Err(StartError::AccessibilityDisabled);
        }
        if self.machine.target().tier.is_empty() {
            return Err(StartError::EmptyTierLabel);
        }
        self.machine.reset();
        self.started = true;
        self.running = true;
        info!(target = ?self.machine.target(), "automation started");
        Ok(())
    }

    /// End the run and reset to step 1. Idempotent when already stopped.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        self.running = false;
        self.machine.reset();
        info!("automation stopped");
    }

    /// Suspend event processing without tearing the run down — the
    /// floating-button toggle. Step is preserved across pause/resume.
    pub fn pause(&mut self) {
        if self.started && self.running {
            self.running = false;
            info!(step = ?self.machine.step(), "automation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.started && !self.running {
            self.running = true;
            info!(step = ?self.machine.step(), "automation resumed");
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether events are currently being processed.
    pub fn is_running(&self) -> bool {
        self.started && self.running
    }

    pub fn step(&self) -> CheckoutStep {
        self.machine.step()
    }

    /// Replace the target selection (the UI updates it on every edit).
    pub fn set_target(&mut self, target: TargetSelection) {
        self.machine.set_target(target);
    }

    /// Feed one platform event through the machine. Returns `None` when
    /// stopped or paused; otherwise the step outcome. A finished outcome
    /// stops the controller.
    pub fn handle_event(
        &mut self,
        event: &UiEvent,
        dispatcher: &mut dyn ActionDispatcher,
    ) -> Option<StepOutcome> {
        if !self.is_running() {
            debug!("event ignored, automation not running");
            return None;
        }
        let outcome = self.machine.on_event(event, &self.screen_map, dispatcher);
        if outcome.finished {
            self.stop();
        }
        Some(outcome)
    }
}
