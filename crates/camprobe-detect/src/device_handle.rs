//! Device-handle probe (Linux video capture nodes).
//!
//! A V4L2 capture node is held open for as long as some process streams from
//! it. Any `/dev/video*` node with an open handle counts as activity. Which
//! process holds it is not reported.

use std::path::{Path, PathBuf};

use camprobe_core::{ActivityResult, CamprobeResult};
use tracing::{debug, warn};

use crate::Probe;

/// Lists candidate capture nodes.
pub trait DeviceLister: Send + Sync {
    fn video_nodes(&self) -> CamprobeResult<Vec<PathBuf>>;
}

/// Answers "does any process hold this path open?".
pub trait HandleInspector: Send + Sync {
    fn has_open_handle(&self, node: &Path) -> CamprobeResult<bool>;
}

pub struct DeviceHandleProbe<L, H> {
    lister: L,
    inspector: H,
}

impl<L: DeviceLister, H: HandleInspector> DeviceHandleProbe<L, H> {
    pub fn new(lister: L, inspector: H) -> Self {
        Self { lister, inspector }
    }
}

impl<L: DeviceLister, H: HandleInspector> Probe for DeviceHandleProbe<L, H> {
    fn detect(&self) -> ActivityResult {
        let nodes = match self.lister.video_nodes() {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(error = %err, "cannot list video devices");
                return ActivityResult::unknown(format!("cannot list video devices: {err}"));
            }
        };

        if nodes.is_empty() {
            debug!("no video capture nodes");
            return ActivityResult::inactive();
        }

        let mut warnings: Vec<String> = Vec::new();
        for node in &nodes {
            match self.inspector.has_open_handle(node) {
                Ok(true) => {
                    debug!(node = %node.display(), "video node held open");
                    return ActivityResult::active(node.display().to_string())
                        .with_warnings(warnings);
                }
                Ok(false) => debug!(node = %node.display(), "video node idle"),
                Err(err) => {
                    // Treated as "no open handle" for this node.
                    let warning = if err.is_absence() {
                        err.to_string()
                    } else {
                        format!("{}: {err}", node.display())
                    };
                    if !warnings.contains(&warning) {
                        warn!(node = %node.display(), error = %err, "handle inspection failed");
                        warnings.push(warning);
                    }
                }
            }
        }

        ActivityResult::inactive().with_warnings(warnings)
    }
}
