//! Error types for camprobe operations.
//!
//! - [`CamprobeError`] - Canonical error type returned by probe collaborators
//!
//! ## Design Principles
//!
//! - **Structured**: Errors carry typed context (resource, command) not just messages
//! - **Absorbed**: Errors never cross the `detect()` facade; probes convert them
//!   into a tri-state answer plus a warning
//! - **Secure**: Registry paths are named, but no user data is included

use std::io;
use thiserror::Error;

// ============================================================================
// Canonical Error Type
// ============================================================================

/// Canonical error type for camprobe collaborators.
///
/// Returned by the consent store, process source, device lister and handle
/// inspector seams. Probes translate every variant into the nearest
/// [`ActivityStatus`](crate::ActivityStatus).
#[derive(Debug, Error)]
pub enum CamprobeError {
    /// An expected OS resource (registry key, device directory) does not exist.
    #[error("Resource '{resource}' not found")]
    NotFound {
        /// The resource that was missing.
        resource: String,
    },

    /// Access to an OS resource was denied.
    #[error("Permission denied for '{resource}'")]
    PermissionDenied {
        /// The resource we attempted to read.
        resource: String,
    },

    /// External command not found.
    ///
    /// The handle-inspection utility is not installed or not in PATH.
    #[error("Command '{command}' not found")]
    NotFoundCommand {
        /// The command that was not found.
        command: String,
    },

    /// Failed to spawn a child process.
    #[error("Failed to spawn process: {source}")]
    SpawnFailed {
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A required OS facility could not be used at runtime.
    ///
    /// For example, process enumeration returning no data.
    #[error("Facility '{facility}' unavailable: {reason}")]
    Unavailable {
        /// The facility that was unavailable.
        facility: String,
        /// Why it was unavailable.
        reason: String,
    },

    /// Operation not supported on the current platform.
    #[error("Operation '{feature}' not supported on {platform}")]
    NotSupported {
        /// The feature that is not supported.
        feature: String,
        /// The platform where it's not supported.
        platform: String,
    },

    /// System-level error with errno/GetLastError context.
    #[error("System error: {message} (errno: {errno})")]
    System {
        /// Description of the error.
        message: String,
        /// The errno value (Unix) or WIN32_ERROR (Windows).
        errno: i32,
    },

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl CamprobeError {
    /// Create a `NotFound` error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        CamprobeError::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a `PermissionDenied` error.
    pub fn permission_denied(resource: impl Into<String>) -> Self {
        CamprobeError::PermissionDenied {
            resource: resource.into(),
        }
    }

    /// Create a `NotFoundCommand` error.
    pub fn not_found_command(command: impl Into<String>) -> Self {
        CamprobeError::NotFoundCommand {
            command: command.into(),
        }
    }

    /// Create a `SpawnFailed` error from an IO error.
    pub fn spawn_failed_io(source: io::Error) -> Self {
        CamprobeError::SpawnFailed { source }
    }

    /// Create an `Unavailable` error.
    pub fn unavailable(facility: impl Into<String>, reason: impl Into<String>) -> Self {
        CamprobeError::Unavailable {
            facility: facility.into(),
            reason: reason.into(),
        }
    }

    /// Create a `NotSupported` error.
    pub fn not_supported(feature: impl Into<String>, platform: impl Into<String>) -> Self {
        CamprobeError::NotSupported {
            feature: feature.into(),
            platform: platform.into(),
        }
    }

    /// Create a `System` error.
    pub fn system(message: impl Into<String>, errno: i32) -> Self {
        CamprobeError::System {
            message: message.into(),
            errno,
        }
    }

    /// Create an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        CamprobeError::Internal {
            message: message.into(),
        }
    }

    /// True when the error means "the thing is not there" rather than
    /// "something went wrong reading it".
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            CamprobeError::NotFound { .. } | CamprobeError::NotFoundCommand { .. }
        )
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<io::Error> for CamprobeError {
    fn from(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => CamprobeError::NotFound {
                resource: source.to_string(),
            },
            io::ErrorKind::PermissionDenied => CamprobeError::PermissionDenied {
                resource: source.to_string(),
            },
            _ => CamprobeError::System {
                errno: source.raw_os_error().unwrap_or(0),
                message: source.to_string(),
            },
        }
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for camprobe operations.
pub type CamprobeResult<T> = Result<T, CamprobeError>;

// ============================================================================
// Tests
// ============================================================================
