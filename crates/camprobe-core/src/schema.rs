//! Schema ID constants for JSON output contracts.
//!
//! Every camprobe JSON output carries a `schema_id` field referencing the
//! schema that describes it.
//!
//! ## URI Structure
//!
//! ```text
//! https://schemas.3leaps.dev/<module>/<topic>/<version>/<filename>
//! ```
//!
//! camprobe does NOT validate its output against these schemas at runtime.

/// Schema ID for the activity report emitted by `camprobe --json` (v1.0.0).
///
/// Schema location: `schemas/activity/v1.0.0/activity-report.schema.json`
pub const ACTIVITY_REPORT_V1: &str =
    "https://schemas.3leaps.dev/camprobe/activity/v1.0.0/activity-report.schema.json";
