//! Capability usage-counter probe (Windows consent store).
//!
//! Windows records, per application, when it last started and stopped using
//! a privacy-sensitive capability:
//!
//! ```text
//! HKCU\SOFTWARE\Microsoft\Windows\CurrentVersion\CapabilityAccessManager\ConsentStore\webcam
//!     Microsoft.WindowsCamera_8wekyb3d8bbwe   LastUsedTimeStart / LastUsedTimeStop
//!     NonPackaged
//!         C:#Program Files#App#app.exe        LastUsedTimeStart / LastUsedTimeStop
//! ```
//!
//! The capability is in use right now when some application's start stamp is
//! newer than its stop stamp. Both values are FILETIME (100 ns since 1601);
//! zero means never.

use camprobe_core::{ActivityResult, CamprobeResult};
use tracing::{debug, warn};

use crate::Probe;

/// Consent store root, relative to `HKEY_CURRENT_USER`.
pub const CONSENT_STORE_PATH: &str =
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\CapabilityAccessManager\ConsentStore";

pub const WEBCAM_CAPABILITY: &str = "webcam";
pub const MICROPHONE_CAPABILITY: &str = "microphone";

/// Container for desktop (non-Store) applications under a capability key.
pub const NON_PACKAGED_KEY: &str = "NonPackaged";

pub const LAST_USED_START_VALUE: &str = "LastUsedTimeStart";
pub const LAST_USED_STOP_VALUE: &str = "LastUsedTimeStop";

/// Usage timestamps of one application for one capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityRecord {
    pub last_used_start: Option<u64>,
    pub last_used_stop: Option<u64>,
}

impl CapabilityRecord {
    pub fn new(last_used_start: u64, last_used_stop: u64) -> Self {
        Self {
            last_used_start: Some(last_used_start),
            last_used_stop: Some(last_used_stop),
        }
    }

    /// Started after it last stopped. A missing value is never "in use".
    pub fn in_use(&self) -> bool {
        match (self.last_used_start, self.last_used_stop) {
            (Some(start), Some(stop)) => start > stop,
            _ => false,
        }
    }

    /// Both stamps absent or zero.
    pub fn never_used(&self) -> bool {
        self.last_used_start.unwrap_or(0) == 0 && self.last_used_stop.unwrap_or(0) == 0
    }
}

/// Read-only view of the consent store.
///
/// Paths are relative to [`CONSENT_STORE_PATH`] and use `\` separators,
/// e.g. `webcam\NonPackaged`. Implementations open and release keys per call.
pub trait ConsentStore: Send + Sync {
    /// Subkey names directly under `path`, or `None` when the key does not exist.
    fn list_apps(&self, path: &str) -> CamprobeResult<Option<Vec<String>>>;

    /// Usage stamps stored on the key at `path`. Absent values are `None`.
    fn read_record(&self, path: &str) -> CamprobeResult<CapabilityRecord>;
}

/// Scans one capability's application keys for an active usage record.
pub struct CapabilityProbe<S> {
    store: S,
    capability: String,
}

impl<S: ConsentStore> CapabilityProbe<S> {
    pub fn new(store: S, capability: impl Into<String>) -> Self {
        Self {
            store,
            capability: capability.into(),
        }
    }

    /// Probe for the `webcam` capability.
    pub fn webcam(store: S) -> Self {
        Self::new(store, WEBCAM_CAPABILITY)
    }

    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// First application under `parent` whose record is in use.
    fn first_in_use<'a>(
        &self,
        parent: &str,
        apps: impl IntoIterator<Item = &'a String>,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        for app in apps {
            let path = format!(r"{parent}\{app}");
            match self.store.read_record(&path) {
                Ok(record) if record.in_use() => {
                    debug!(app = %app, ?record, "capability in use");
                    return Some(app.clone());
                }
                Ok(_) => {}
                // Key removed between enumeration and open.
                Err(err) if err.is_absence() => {
                    debug!(path = %path, "application key vanished");
                }
                Err(err) => {
                    warn!(path = %path, error = %err, "cannot read usage record");
                    warnings.push(format!("cannot read '{path}': {err}"));
                }
            }
        }
        None
    }
}

impl<S: ConsentStore> Probe for CapabilityProbe<S> {
    fn detect(&self) -> ActivityResult {
        let root = self.capability.as_str();

        let apps = match self.store.list_apps(root) {
            Ok(Some(apps)) => apps,
            Ok(None) => {
                warn!(capability = root, "consent store key not found");
                return ActivityResult::unknown(format!(
                    "consent store key '{root}' not found"
                ));
            }
            Err(err) => {
                warn!(capability = root, error = %err, "cannot open consent store key");
                return ActivityResult::unknown(format!(
                    "cannot open consent store key '{root}': {err}"
                ));
            }
        };

        let mut warnings = Vec::new();

        let packaged = apps
            .iter()
            .filter(|app| !app.eq_ignore_ascii_case(NON_PACKAGED_KEY));
        if let Some(app) = self.first_in_use(root, packaged, &mut warnings) {
            return ActivityResult::active(app).with_warnings(warnings);
        }

        let nested = format!(r"{root}\{NON_PACKAGED_KEY}");
        match self.store.list_apps(&nested) {
            Ok(Some(apps)) => {
                if let Some(app) = self.first_in_use(&nested, &apps, &mut warnings) {
                    return ActivityResult::active(app).with_warnings(warnings);
                }
            }
            Ok(None) => debug!(path = %nested, "no non-packaged applications"),
            Err(err) => {
                warn!(path = %nested, error = %err, "cannot open non-packaged key");
                warnings.push(format!("cannot open '{nested}': {err}"));
            }
        }

        ActivityResult::inactive().with_warnings(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camprobe_core::{ActivityStatus, CamprobeError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory registry subtree keyed by store-relative path.
    #[derive(Default)]
    struct FakeStore {
        keys: HashMap<String, Vec<String>>,
        records: HashMap<String, CapabilityRecord>,
        denied: Vec<String>,
        reads: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn with_apps(mut self, path: &str, apps: &[&str]) -> Self {
            self.keys
                .insert(path.to_string(), apps.iter().map(|a| a.to_string()).collect());
            self
        }

        fn with_record(mut self, path: &str, record: CapabilityRecord) -> Self {
            self.records.insert(path.to_string(), record);
            self
        }

        fn deny(mut self, path: &str) -> Self {
            self.denied.push(path.to_string());
            self
        }

        fn reads(&self) -> Vec<String> {
            self.reads.lock().unwrap().clone()
        }
    }

    impl ConsentStore for FakeStore {
        fn list_apps(&self, path: &str) -> CamprobeResult<Option<Vec<String>>> {
            if self.denied.iter().any(|d| d == path) {
                return Err(CamprobeError::permission_denied(path));
            }
            Ok(self.keys.get(path).cloned())
        }

        fn read_record(&self, path: &str) -> CamprobeResult<CapabilityRecord> {
            self.reads.lock().unwrap().push(path.to_string());
            if self.denied.iter().any(|d| d == path) {
                return Err(CamprobeError::permission_denied(path));
            }
            Ok(self.records.get(path).copied().unwrap_or_default())
        }
    }

    #[test]
    fn record_in_use_when_start_after_stop() {
        assert!(CapabilityRecord::new(100, 50).in_use());
        assert!(!CapabilityRecord::new(50, 100).in_use());
        assert!(!CapabilityRecord::new(100, 100).in_use());
    }

    #[test]
    fn record_with_missing_value_is_not_in_use() {
        let start_only = CapabilityRecord {
            last_used_start: Some(100),
            last_used_stop: None,
        };
        assert!(!start_only.in_use());
        assert!(!CapabilityRecord::default().in_use());
    }

    #[test]
    fn record_never_used() {
        assert!(CapabilityRecord::default().never_used());
        assert!(CapabilityRecord::new(0, 0).never_used());
        assert!(!CapabilityRecord::new(0, 42).never_used());
    }

    #[test]
    fn active_subkey_reports_app_name() {
        let store = FakeStore::default()
            .with_apps("webcam", &["Microsoft.WindowsCamera"])
            .with_record(
                r"webcam\Microsoft.WindowsCamera",
                CapabilityRecord::new(100, 50),
            );

        let result = CapabilityProbe::webcam(store).detect();
        assert_eq!(result.status, ActivityStatus::Active);
        assert_eq!(result.label.as_deref(), Some("Microsoft.WindowsCamera"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn stopped_or_equal_stamps_are_inactive() {
        for (start, stop) in [(50, 100), (100, 100)] {
            let store = FakeStore::default()
                .with_apps("webcam", &["App"])
                .with_record(r"webcam\App", CapabilityRecord::new(start, stop));

            let result = CapabilityProbe::webcam(store).detect();
            assert_eq!(result.status, ActivityStatus::Inactive);
            assert!(result.label.is_none());
        }
    }

    #[test]
    fn missing_capability_key_is_unknown() {
        let result = CapabilityProbe::webcam(FakeStore::default()).detect();

        assert_eq!(result.status, ActivityStatus::Unknown);
        assert!(result.warnings[0].contains("not found"));
    }

    #[test]
    fn denied_capability_key_is_absorbed() {
        let store = FakeStore::default()
            .with_apps("webcam", &["App"])
            .deny("webcam");

        let result = CapabilityProbe::webcam(store).detect();
        assert_eq!(result.status, ActivityStatus::Unknown);
        assert!(result.warnings[0].contains("Permission denied"));
    }

    #[test]
    fn non_packaged_match_is_detected() {
        let store = FakeStore::default()
            .with_apps("webcam", &["StoreApp", "NonPackaged"])
            .with_record(r"webcam\StoreApp", CapabilityRecord::new(10, 20))
            .with_apps(r"webcam\NonPackaged", &["C:#Tools#zoom.exe"])
            .with_record(
                r"webcam\NonPackaged\C:#Tools#zoom.exe",
                CapabilityRecord::new(300, 200),
            );

        let result = CapabilityProbe::webcam(store).detect();
        assert_eq!(result.status, ActivityStatus::Active);
        assert_eq!(result.label.as_deref(), Some("C:#Tools#zoom.exe"));
    }

    #[test]
    fn direct_list_checked_before_non_packaged() {
        let store = FakeStore::default()
            .with_apps("webcam", &["StoreApp", "NonPackaged"])
            .with_record(r"webcam\StoreApp", CapabilityRecord::new(100, 50))
            .with_apps(r"webcam\NonPackaged", &["C:#Tools#zoom.exe"])
            .with_record(
                r"webcam\NonPackaged\C:#Tools#zoom.exe",
                CapabilityRecord::new(300, 200),
            );

        let probe = CapabilityProbe::webcam(store);
        let result = probe.detect();

        assert_eq!(result.label.as_deref(), Some("StoreApp"));
        assert!(
            probe.store.reads().iter().all(|p| !p.contains("NonPackaged")),
            "NonPackaged must not be descended into once a match is found"
        );
    }

    #[test]
    fn non_packaged_container_is_not_read_as_an_app() {
        let store = FakeStore::default().with_apps("webcam", &["NonPackaged"]);
        let probe = CapabilityProbe::webcam(store);

        assert_eq!(probe.detect().status, ActivityStatus::Inactive);
        assert!(!probe.store.reads().contains(&r"webcam\NonPackaged".to_string()));
    }

    #[test]
    fn missing_non_packaged_key_is_plain_inactive() {
        let store = FakeStore::default()
            .with_apps("webcam", &["App"])
            .with_record(r"webcam\App", CapabilityRecord::default());

        let result = CapabilityProbe::webcam(store).detect();
        assert_eq!(result.status, ActivityStatus::Inactive);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unreadable_subkey_is_skipped_with_warning() {
        let store = FakeStore::default()
            .with_apps("webcam", &["Locked", "Open"])
            .deny(r"webcam\Locked")
            .with_record(r"webcam\Open", CapabilityRecord::new(9, 1));

        let result = CapabilityProbe::webcam(store).detect();
        assert_eq!(result.status, ActivityStatus::Active);
        assert_eq!(result.label.as_deref(), Some("Open"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Locked"));
    }

    #[test]
    fn denied_non_packaged_key_degrades_to_inactive_with_warning() {
        let store = FakeStore::default()
            .with_apps("webcam", &["NonPackaged"])
            .with_apps(r"webcam\NonPackaged", &["C:#x.exe"])
            .deny(r"webcam\NonPackaged");

        let result = CapabilityProbe::webcam(store).detect();
        assert_eq!(result.status, ActivityStatus::Inactive);
        assert!(result.is_degraded());
    }

    #[test]
    fn capability_name_selects_subtree() {
        let store = FakeStore::default()
            .with_apps("microphone", &["Recorder"])
            .with_record(r"microphone\Recorder", CapabilityRecord::new(2, 1));

        let mic = CapabilityProbe::new(store, MICROPHONE_CAPABILITY);
        assert_eq!(mic.capability(), "microphone");
        assert!(mic.detect().is_active());
    }

    #[test]
    fn repeated_detection_is_stable() {
        let store = FakeStore::default()
            .with_apps("webcam", &["App"])
            .with_record(r"webcam\App", CapabilityRecord::new(100, 50));
        let probe = CapabilityProbe::webcam(store);

        assert_eq!(probe.detect(), probe.detect());
    }
}
