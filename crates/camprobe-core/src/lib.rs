//! camprobe-core: Core types, errors, and platform identity
//!
//! This crate provides the foundational types shared by the camprobe crates:
//! - The tri-state [`ActivityResult`] and its JSON [`ActivityReport`] envelope
//! - The canonical error type [`CamprobeError`]
//! - Schema ID constants for JSON output contracts
//! - Platform identity detection and normalization
//!
//! ## Error Handling
//!
//! Collaborators return [`CamprobeResult`]. Probes absorb those errors into
//! `ActivityStatus::Unknown` or `ActivityStatus::Inactive` plus a warning, so
//! nothing in this crate is ever surfaced to a `detect()` caller as an error.

use std::env::consts::OS;

pub mod activity;
pub mod error;
pub mod schema;

pub use activity::{ActivityReport, ActivityResult, ActivityStatus};
pub use error::{CamprobeError, CamprobeResult};

// ============================================================================
// Platform Detection
// ============================================================================

/// Get the current platform identifier.
///
/// Returns one of: "linux", "macos", "windows", "freebsd", etc.
///
/// This is a pure function with no side effects.
#[inline]
pub fn get_platform() -> &'static str {
    OS
}

/// Operating system family a probe is written for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    /// Any identity outside the three probed platforms.
    Unsupported(String),
}

impl Platform {
    /// Normalize an OS identity string.
    ///
    /// Matching is case-insensitive: a `win` prefix selects Windows (covers
    /// "windows", "win32"), `darwin` or `macos` selects macOS, and `linux`
    /// selects Linux. Everything else is `Unsupported`.
    pub fn from_identity(identity: &str) -> Self {
        let normalized = identity.trim().to_ascii_lowercase();
        if normalized.starts_with("win") {
            Platform::Windows
        } else if normalized == "darwin" || normalized == "macos" {
            Platform::MacOs
        } else if normalized == "linux" {
            Platform::Linux
        } else {
            Platform::Unsupported(normalized)
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::from_identity(get_platform())
    }

    /// Canonical identifier, matching `std::env::consts::OS` for the known three.
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Unsupported(identity) => identity,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported(_))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
