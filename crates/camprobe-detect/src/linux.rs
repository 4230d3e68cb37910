//! Linux collaborators for the device-handle probe.
//!
//! - [`DevVideoLister`] - expands `/dev/video*` by reading `/dev`
//! - [`FuserInspector`] - runs `fuser -s <node>` (psmisc) and keeps only its exit status

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use camprobe_core::{CamprobeError, CamprobeResult};

use crate::device_handle::{DeviceHandleProbe, DeviceLister, HandleInspector};

/// Directory holding the capture nodes.
pub const VIDEO_DEVICE_DIR: &str = "/dev";

/// File name prefix of capture nodes (`video0`, `video1`, ...).
pub const VIDEO_DEVICE_PREFIX: &str = "video";

/// Default handle-inspection utility.
pub const FUSER_COMMAND: &str = "fuser";

// ============================================================================
// Implementation
// ============================================================================

/// The probe wired to the real `/dev` and `fuser`.
pub fn webcam_probe() -> DeviceHandleProbe<DevVideoLister, FuserInspector> {
    DeviceHandleProbe::new(DevVideoLister::default(), FuserInspector::default())
}

/// Lists `<dir>/<prefix>*` entries, sorted by path.
#[derive(Debug, Clone)]
pub struct DevVideoLister {
    dir: PathBuf,
    prefix: String,
}

impl Default for DevVideoLister {
    fn default() -> Self {
        Self::new(VIDEO_DEVICE_DIR)
    }
}

impl DevVideoLister {
    /// Lister over `dir` using the standard `video` prefix.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: VIDEO_DEVICE_PREFIX.to_string(),
        }
    }
}

impl DeviceLister for DevVideoLister {
    fn video_nodes(&self) -> CamprobeResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // A glob over a missing directory simply matches nothing.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(CamprobeError::permission_denied(
                    self.dir.display().to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let mut nodes: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(&self.prefix)
            })
            .map(|entry| entry.path())
            .collect();
        nodes.sort();

        Ok(nodes)
    }
}

/// Runs `<program> -s <node>`; exit status 0 means some process has it open.
///
/// stdout and stderr are discarded.
#[derive(Debug, Clone)]
pub struct FuserInspector {
    program: OsString,
}

impl Default for FuserInspector {
    fn default() -> Self {
        Self::with_program(FUSER_COMMAND)
    }
}

impl FuserInspector {
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl HandleInspector for FuserInspector {
    fn has_open_handle(&self, node: &Path) -> CamprobeResult<bool> {
        let status = Command::new(&self.program)
            .arg("-s")
            .arg(node)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                let command = self.program.to_string_lossy();
                if e.kind() == io::ErrorKind::NotFound {
                    CamprobeError::not_found_command(command)
                } else if e.kind() == io::ErrorKind::PermissionDenied {
                    CamprobeError::permission_denied(command)
                } else {
                    CamprobeError::spawn_failed_io(e)
                }
            })?;

        Ok(status.success())
    }
}
