//! camprobe-detect: Is the webcam in use right now?
//!
//! No operating system offers a uniform API for this, so each platform gets
//! its own heuristic:
//!
//! | Platform | Probe | Signal |
//! |----------|-------|--------|
//! | Windows | [`CapabilityProbe`] | `LastUsedTimeStart > LastUsedTimeStop` in the consent store |
//! | macOS | [`HelperProcessProbe`] | `VDCAssistant` / `AppleCameraAssistant` running |
//! | Linux | [`DeviceHandleProbe`] | `fuser -s /dev/video*` exit status |
//!
//! The heuristics are written against small collaborator traits
//! ([`ConsentStore`], [`ProcessSource`], [`DeviceLister`], [`HandleInspector`])
//! so they can be exercised with fakes. Only the OS-backed collaborator for
//! the build target is compiled, and [`Dispatcher::native`] registers only
//! that probe.
//!
//! ## Example
//!
//! ```rust,no_run
//! use camprobe_detect::detect;
//!
//! let result = detect();
//! println!("camera: {}", result.status);
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```
//!
//! ## Errors
//!
//! [`detect`] never fails. Every OS error is absorbed inside the probe and
//! reported as `Unknown` (or `Inactive`) with an entry in
//! [`ActivityResult::warnings`].

use camprobe_core::activity::LEGACY_UNSUPPORTED_LABEL;
use camprobe_core::get_platform;
use tracing::{debug, warn};

pub use camprobe_core::{ActivityResult, ActivityStatus, Platform};

pub mod consent_store;
pub mod device_handle;
pub mod helper_process;

// Platform-specific collaborators
#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(windows)]
pub mod windows;

pub use consent_store::{CapabilityProbe, CapabilityRecord, ConsentStore};
pub use device_handle::{DeviceHandleProbe, DeviceLister, HandleInspector};
pub use helper_process::{HelperProcessProbe, ProcessSource};

// ============================================================================
// Probe Interface
// ============================================================================

/// One platform's camera-activity heuristic.
///
/// Implementations perform bounded, local, read-only OS queries and must
/// absorb every failure into the returned result.
pub trait Probe: Send + Sync {
    fn detect(&self) -> ActivityResult;
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Selects exactly one probe from the OS identity and runs it.
///
/// Selection is by identity only. There is no fallback from one probe to
/// another and no capability sniffing.
pub struct Dispatcher {
    identity: String,
    probes: Vec<(Platform, Box<dyn Probe>)>,
}

impl Dispatcher {
    /// Dispatcher for an explicit OS identity with no probes registered.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            probes: Vec::new(),
        }
    }

    /// Dispatcher for the running OS with the build target's probe registered.
    pub fn native() -> Self {
        let dispatcher = Self::new(get_platform());
        match native_probe() {
            Some((platform, probe)) => dispatcher.with_probe(platform, probe),
            None => dispatcher,
        }
    }

    /// Register `probe` for `platform`, replacing any earlier registration.
    pub fn with_probe(mut self, platform: Platform, probe: Box<dyn Probe>) -> Self {
        self.probes.retain(|(registered, _)| *registered != platform);
        self.probes.push((platform, probe));
        self
    }

    /// The identity string this dispatcher normalizes.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The platform the identity normalizes to.
    pub fn platform(&self) -> Platform {
        Platform::from_identity(&self.identity)
    }

    /// Run the probe selected by the OS identity.
    pub fn detect(&self) -> ActivityResult {
        let platform = self.platform();

        if let Platform::Unsupported(identity) = &platform {
            debug!(identity = %identity, "unsupported platform, no probe invoked");
            let mut result =
                ActivityResult::unknown(format!("platform '{identity}' is not supported"));
            result.label = Some(LEGACY_UNSUPPORTED_LABEL.to_string());
            return result;
        }

        let Some((_, probe)) = self
            .probes
            .iter()
            .find(|(registered, _)| *registered == platform)
        else {
            warn!(platform = %platform, "no probe compiled for platform");
            return ActivityResult::unknown(format!(
                "no probe for platform '{platform}' in this build"
            ));
        };

        let result = probe.detect();
        debug!(
            platform = %platform,
            status = %result.status,
            label = result.label.as_deref().unwrap_or(""),
            warnings = result.warnings.len(),
            "camera probe finished"
        );
        result
    }
}

#[cfg(windows)]
fn native_probe() -> Option<(Platform, Box<dyn Probe>)> {
    Some((Platform::Windows, Box::new(windows::webcam_probe())))
}

#[cfg(target_os = "macos")]
fn native_probe() -> Option<(Platform, Box<dyn Probe>)> {
    Some((Platform::MacOs, Box::new(macos::webcam_probe())))
}

#[cfg(target_os = "linux")]
fn native_probe() -> Option<(Platform, Box<dyn Probe>)> {
    Some((Platform::Linux, Box::new(linux::webcam_probe())))
}

#[cfg(not(any(windows, target_os = "macos", target_os = "linux")))]
fn native_probe() -> Option<(Platform, Box<dyn Probe>)> {
    None
}

// ============================================================================
// Facade
// ============================================================================

/// Point-in-time webcam activity for the running machine.
///
/// Blocks until the selected probe completes. Never panics on missing OS
/// resources and never returns an error.
pub fn detect() -> ActivityResult {
    Dispatcher::native().detect()
}

/// [`detect`] collapsed into the `(active, label)` pair.
///
/// `label` is the activity source when active, `"off"` when not, and
/// `"Not supported"` on platforms without a probe.
pub fn is_cam_active() -> (bool, String) {
    detect().as_legacy_pair()
}
