//! macOS process source using libproc
//!
//! Uses the following APIs:
//! - `proc_listpids()` - enumerate all PIDs
//! - `proc_name()` - get process name

use libc::{c_int, c_void, pid_t};
use std::ffi::CStr;
use std::mem;

use camprobe_core::{CamprobeError, CamprobeResult};

use crate::helper_process::{HelperProcessProbe, ProcessSource};

// ============================================================================
// libproc FFI Bindings
// ============================================================================

// Constants from <libproc.h>
const PROC_ALL_PIDS: u32 = 1;
const MAXPATHLEN: usize = 1024;

extern "C" {
    fn proc_listpids(type_: u32, typeinfo: u32, buffer: *mut c_void, buffersize: c_int) -> c_int;

    fn proc_name(pid: c_int, buffer: *mut c_void, buffersize: u32) -> c_int;
}

// ============================================================================
// Implementation
// ============================================================================

/// The probe wired to the live process table.
pub fn webcam_probe() -> HelperProcessProbe<LibprocProcessSource> {
    HelperProcessProbe::new(LibprocProcessSource)
}

/// Process names from libproc.
///
/// Processes whose name cannot be read (exited mid-scan, other users) are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibprocProcessSource;

impl ProcessSource for LibprocProcessSource {
    fn process_names(&self) -> CamprobeResult<Vec<String>> {
        let pids = list_all_pids()?;
        Ok(pids
            .into_iter()
            .filter(|&pid| pid > 0)
            .filter_map(get_process_name)
            .collect())
    }
}

fn list_all_pids() -> CamprobeResult<Vec<pid_t>> {
    // First call to get required buffer size
    let buffer_size = unsafe { proc_listpids(PROC_ALL_PIDS, 0, std::ptr::null_mut(), 0) };

    if buffer_size <= 0 {
        return Err(CamprobeError::unavailable(
            "libproc",
            "proc_listpids failed to get size",
        ));
    }

    let count = buffer_size as usize / mem::size_of::<pid_t>();
    let mut pids: Vec<pid_t> = vec![0; count];

    let actual = unsafe {
        proc_listpids(
            PROC_ALL_PIDS,
            0,
            pids.as_mut_ptr() as *mut c_void,
            buffer_size,
        )
    };

    if actual <= 0 {
        return Err(CamprobeError::unavailable("libproc", "proc_listpids failed"));
    }

    // Trim to actual count
    let actual_count = actual as usize / mem::size_of::<pid_t>();
    pids.truncate(actual_count);

    Ok(pids)
}

fn get_process_name(pid: pid_t) -> Option<String> {
    let mut buffer = [0u8; MAXPATHLEN];

    let result = unsafe {
        proc_name(
            pid as c_int,
            buffer.as_mut_ptr() as *mut c_void,
            MAXPATHLEN as u32,
        )
    };

    if result <= 0 {
        return None;
    }

    CStr::from_bytes_until_nul(&buffer)
        .ok()
        .map(|name| name.to_string_lossy().into_owned())
}
