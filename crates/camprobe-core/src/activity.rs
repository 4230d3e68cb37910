//! Tri-state activity result and its JSON report envelope.

use serde::Serialize;

use crate::schema::ACTIVITY_REPORT_V1;

/// Label reported by the legacy pair when the camera is not active.
pub const LEGACY_OFF_LABEL: &str = "off";

/// Label reported by the legacy pair when the platform has no probe.
pub const LEGACY_UNSUPPORTED_LABEL: &str = "Not supported";

/// Outcome of one detection attempt.
///
/// `Unknown` is never equivalent to `Inactive`: it means the platform is
/// unsupported or the probe degraded before reaching an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Active,
    Inactive,
    Unknown,
}

impl ActivityStatus {
    /// Lowercase name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Active => "active",
            ActivityStatus::Inactive => "inactive",
            ActivityStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized result of a probe.
///
/// `label` is informational only (which registry subkey, process or device
/// indicated activity). Callers must branch on `status`, never on `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityResult {
    /// Tri-state answer.
    pub status: ActivityStatus,

    /// Diagnostic label for the resource that indicated activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Warnings about degraded visibility.
    pub warnings: Vec<String>,
}

impl ActivityResult {
    /// Camera in use, as indicated by `label`.
    pub fn active(label: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Active,
            label: Some(label.into()),
            warnings: Vec::new(),
        }
    }

    /// Camera definitely not in use as far as the probe can see.
    pub fn inactive() -> Self {
        Self {
            status: ActivityStatus::Inactive,
            label: None,
            warnings: Vec::new(),
        }
    }

    /// No answer could be produced; `reason` is recorded as a warning.
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Unknown,
            label: None,
            warnings: vec![reason.into()],
        }
    }

    /// Append a warning, keeping the status.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Append several warnings, keeping the status.
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ActivityStatus::Active
    }

    /// True for `Active` and `Inactive`.
    pub fn is_known(&self) -> bool {
        self.status != ActivityStatus::Unknown
    }

    /// True when the probe had to absorb at least one failure.
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Collapse into the `(active, label)` pair used by older callers.
    ///
    /// Inactive and degraded results both report `"off"`. An unsupported
    /// platform keeps its `"Not supported"` label.
    pub fn as_legacy_pair(&self) -> (bool, String) {
        match (self.status, &self.label) {
            (ActivityStatus::Active, Some(label)) => (true, label.clone()),
            (ActivityStatus::Active, None) => (true, "active".to_string()),
            (ActivityStatus::Unknown, Some(label)) if label == LEGACY_UNSUPPORTED_LABEL => {
                (false, label.clone())
            }
            _ => (false, LEGACY_OFF_LABEL.to_string()),
        }
    }
}

/// JSON envelope for a single detection, as printed by `camprobe --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    /// Schema identifier for version detection.
    pub schema_id: &'static str,

    /// Timestamp of detection (RFC 3339).
    pub timestamp: String,

    /// Platform identifier the dispatcher resolved (e.g., "linux", "macos", "windows").
    pub platform: String,

    /// Tri-state answer.
    pub status: ActivityStatus,

    /// Diagnostic label, when one was reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Warnings about degraded visibility.
    pub warnings: Vec<String>,
}

impl ActivityReport {
    /// Wrap a result with schema, timestamp and platform metadata.
    pub fn from_result(result: ActivityResult, platform: impl Into<String>) -> Self {
        Self {
            schema_id: ACTIVITY_REPORT_V1,
            timestamp: current_timestamp(),
            platform: platform.into(),
            status: result.status,
            label: result.label,
            warnings: result.warnings,
        }
    }
}

fn current_timestamp() -> String {
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
