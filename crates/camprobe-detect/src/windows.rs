//! Windows consent store backed by the registry.
//!
//! Uses the following APIs:
//! - `RegOpenKeyExW` with `KEY_READ` - open a key under `HKEY_CURRENT_USER`
//! - `RegEnumKeyExW` - enumerate application subkeys
//! - `RegQueryValueExW` - read the `REG_QWORD` usage stamps
//! - `RegCloseKey` - release the key (via [`RegKey`]'s `Drop`)

use std::mem;
use std::ptr;

use camprobe_core::{CamprobeError, CamprobeResult};
use windows_sys::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS,
    ERROR_SUCCESS,
};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegEnumKeyExW, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_CURRENT_USER,
    KEY_READ, REG_QWORD, REG_VALUE_TYPE,
};

use crate::consent_store::{
    CapabilityProbe, CapabilityRecord, ConsentStore, CONSENT_STORE_PATH, LAST_USED_START_VALUE,
    LAST_USED_STOP_VALUE,
};

/// Registry key names are limited to 255 UTF-16 units.
const MAX_KEY_NAME_LEN: usize = 255;

// ============================================================================
// Implementation
// ============================================================================

/// The probe wired to the current user's consent store.
pub fn webcam_probe() -> CapabilityProbe<RegistryConsentStore> {
    CapabilityProbe::webcam(RegistryConsentStore::default())
}

/// [`ConsentStore`] reading `HKEY_CURRENT_USER\<base>`.
///
/// Read-only. Every call opens the keys it needs and closes them before returning.
#[derive(Debug, Clone)]
pub struct RegistryConsentStore {
    base: String,
}

impl Default for RegistryConsentStore {
    fn default() -> Self {
        Self::with_base(CONSENT_STORE_PATH)
    }
}

impl RegistryConsentStore {
    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn full_path(&self, path: &str) -> String {
        format!(r"{}\{}", self.base, path)
    }
}

impl ConsentStore for RegistryConsentStore {
    fn list_apps(&self, path: &str) -> CamprobeResult<Option<Vec<String>>> {
        match RegKey::open_current_user(&self.full_path(path))? {
            Some(key) => key.subkey_names().map(Some),
            None => Ok(None),
        }
    }

    fn read_record(&self, path: &str) -> CamprobeResult<CapabilityRecord> {
        let full = self.full_path(path);
        let key = RegKey::open_current_user(&full)?
            .ok_or_else(|| CamprobeError::not_found(full.clone()))?;

        Ok(CapabilityRecord {
            last_used_start: key.qword(LAST_USED_START_VALUE)?,
            last_used_stop: key.qword(LAST_USED_STOP_VALUE)?,
        })
    }
}

/// Open registry key, closed on drop.
struct RegKey {
    handle: HKEY,
    path: String,
}

impl RegKey {
    /// Open `path` under `HKEY_CURRENT_USER`; `None` when it does not exist.
    fn open_current_user(path: &str) -> CamprobeResult<Option<RegKey>> {
        let wide = to_wide(path);
        let mut handle: HKEY = 0;

        let status =
            unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, wide.as_ptr(), 0, KEY_READ, &mut handle) };

        match status {
            ERROR_SUCCESS => Ok(Some(RegKey {
                handle,
                path: path.to_string(),
            })),
            ERROR_FILE_NOT_FOUND => Ok(None),
            ERROR_ACCESS_DENIED => Err(CamprobeError::permission_denied(path)),
            code => Err(CamprobeError::system(
                format!("RegOpenKeyExW failed for '{path}'"),
                code as i32,
            )),
        }
    }

    fn subkey_names(&self) -> CamprobeResult<Vec<String>> {
        let mut names = Vec::new();
        let mut index: u32 = 0;

        loop {
            let mut buffer = [0u16; MAX_KEY_NAME_LEN + 1];
            let mut len = buffer.len() as u32;

            let status = unsafe {
                RegEnumKeyExW(
                    self.handle,
                    index,
                    buffer.as_mut_ptr(),
                    &mut len,
                    ptr::null(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                    ptr::null_mut(),
                )
            };

            match status {
                ERROR_SUCCESS => {
                    names.push(String::from_utf16_lossy(&buffer[..len as usize]));
                }
                ERROR_NO_MORE_ITEMS => return Ok(names),
                code => {
                    return Err(CamprobeError::system(
                        format!("RegEnumKeyExW failed for '{}'", self.path),
                        code as i32,
                    ));
                }
            }

            index += 1;
        }
    }

    /// Read a `REG_QWORD` value. Missing or differently typed values are `None`.
    fn qword(&self, name: &str) -> CamprobeResult<Option<u64>> {
        let wide = to_wide(name);
        let mut value_type: REG_VALUE_TYPE = 0;
        let mut data: u64 = 0;
        let mut size = mem::size_of::<u64>() as u32;

        let status = unsafe {
            RegQueryValueExW(
                self.handle,
                wide.as_ptr(),
                ptr::null(),
                &mut value_type,
                &mut data as *mut u64 as *mut u8,
                &mut size,
            )
        };

        match status {
            ERROR_SUCCESS if value_type == REG_QWORD && size as usize == mem::size_of::<u64>() => {
                Ok(Some(data))
            }
            ERROR_SUCCESS | ERROR_FILE_NOT_FOUND | ERROR_MORE_DATA => Ok(None),
            ERROR_ACCESS_DENIED => Err(CamprobeError::permission_denied(format!(
                r"{}\{name}",
                self.path
            ))),
            code => Err(CamprobeError::system(
                format!("RegQueryValueExW failed for '{}\\{name}'", self.path),
                code as i32,
            )),
        }
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        unsafe {
            RegCloseKey(self.handle);
        }
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
