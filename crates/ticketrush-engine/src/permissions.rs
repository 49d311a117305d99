//! Host permission probes.
//!
//! The controller refuses to start without the two platform grants the
//! original flow depends on: drawing the floating toggle over other apps,
//! and the accessibility service being enabled. Hosts implement
//! [`PermissionProbe`] against their platform settings API; surfacing the
//! denial to the user (settings dialogs etc.) stays the host's job.

/// Boolean permission queries consulted before `start()`.
pub trait PermissionProbe {
    /// May we draw the floating run/pause toggle over other apps?
    fn overlay_granted(&self) -> bool;

    /// Is the accessibility service delivering events to us?
    fn accessibility_enabled(&self) -> bool;
}

/// Probe that always grants — for hosts without these concepts and for
/// the replay CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedProbe;

impl PermissionProbe for GrantedProbe {
    fn overlay_granted(&self) -> bool {
        true
    }

    fn accessibility_enabled(&self) -> bool {
        true
    }
}

/// Fixed-answer probe, mostly useful in tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    pub overlay: bool,
    pub accessibility: bool,
}

impl PermissionProbe for StaticProbe {
    fn overlay_granted(&self) -> bool {
        self.overlay
    }

    fn accessibility_enabled(&self) -> bool {
        self.accessibility
    }
}
