//! Checkout automation engine.
//!
//! Classifies incoming UI events into known screens, drives the
//! three-step checkout state machine, and owns the start/stop/pause
//! lifecycle. Host-platform concerns (event capture, synthetic click
//! dispatch, permission settings) stay behind the traits in
//! `ticketrush-accessibility` and [`permissions`].

pub mod checkout;
pub mod config;
pub mod controller;
pub mod permissions;
pub mod runner;
pub mod screens;

pub use checkout::{CheckoutMachine, CheckoutStep, StepOutcome};
pub use config::{BotProfile, TargetSelection};
pub use controller::{AutomationController, StartError};
pub use permissions::{GrantedProbe, PermissionProbe, StaticProbe};
pub use runner::{event_channel, run_automation_loop, LoopSummary};
pub use screens::{Screen, ScreenMap, ScreenMapError};
