//! Process-presence probe (macOS camera helpers).
//!
//! macOS starts a dedicated assistant daemon while any client holds the
//! camera. Seeing one of them in the process table is the activity signal.
//! This is a point-in-time snapshot; a session that starts and stops between
//! two calls is missed.

use camprobe_core::{ActivityResult, CamprobeResult};
use tracing::{debug, warn};

use crate::Probe;

/// Daemons that run only while the camera is streaming.
///
/// `VDCAssistant` on Intel Macs and older releases, `AppleCameraAssistant`
/// on Apple Silicon and newer releases.
pub const CAMERA_HELPER_PROCESSES: [&str; 2] = ["VDCAssistant", "AppleCameraAssistant"];

/// Source of live process names.
pub trait ProcessSource: Send + Sync {
    /// Names of every process visible to the caller right now.
    fn process_names(&self) -> CamprobeResult<Vec<String>>;
}

pub struct HelperProcessProbe<P> {
    source: P,
}

impl<P: ProcessSource> HelperProcessProbe<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }
}

/// Exact, case-sensitive match against the helper set.
pub fn is_camera_helper(name: &str) -> bool {
    CAMERA_HELPER_PROCESSES.contains(&name)
}

impl<P: ProcessSource> Probe for HelperProcessProbe<P> {
    fn detect(&self) -> ActivityResult {
        let names = match self.source.process_names() {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "process enumeration unavailable");
                return ActivityResult::unknown(format!("process enumeration unavailable: {err}"));
            }
        };

        match names.into_iter().find(|name| is_camera_helper(name)) {
            Some(name) => {
                debug!(process = %name, "camera helper running");
                ActivityResult::active(name)
            }
            None => ActivityResult::inactive(),
        }
    }
}
