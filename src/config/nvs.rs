//! NVS persistence backend with schema versioning.
//!
//! The 512-byte layout lives in RAM (`MemStore`) and is mirrored into a
//! single NVS blob. Every update that changes a byte rewrites the blob
//! before returning, which gives the write-through durability the dialer
//! relies on (a number being programmed survives a hang-up).
//!
//! # Version History
//!
//! - **v1** (current): one blob `image` holding the raw 512-byte layout
//!
//! A stored version newer than `CURRENT_SCHEMA_VERSION` is refused with
//! `StoreError::TooNew`; the caller then runs from a detached, erased image
//! so the newer data is never overwritten.

#[cfg(any(target_os = "espidf", test))]
use core::cmp::Ordering;

use super::store::{ByteStore, MemStore, StoreError};
#[cfg(target_os = "espidf")]
use super::STORE_SIZE;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;

/// Current NVS schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// NVS namespace for the dialer
pub const NVS_NAMESPACE: &str = "dialer";

#[cfg(any(target_os = "espidf", test))]
/// NVS key for schema version
const VERSION_KEY: &str = "schema_ver";

#[cfg(any(target_os = "espidf", test))]
/// NVS key for the layout image
const IMAGE_KEY: &str = "image";

/// Outcome of opening the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationResult {
    /// Nothing stored yet, running from an erased image
    FreshInstall,
    /// Schema up-to-date, image loaded
    UpToDate,
}

#[cfg(target_os = "espidf")]
impl From<EspError> for StoreError {
    fn from(e: EspError) -> Self {
        StoreError::Backend(e.code())
    }
}

#[cfg(any(target_os = "espidf", test))]
/// Decide what to do with a stored schema version.
fn check_version(stored_version: u32) -> Result<MigrationResult, StoreError> {
    match stored_version.cmp(&CURRENT_SCHEMA_VERSION) {
        Ordering::Equal => Ok(MigrationResult::UpToDate),
        // 0 = never written; there is no older layout to migrate from
        Ordering::Less => Ok(MigrationResult::FreshInstall),
        Ordering::Greater => Err(StoreError::TooNew { stored_version }),
    }
}

/// RAM image mirrored into NVS.
pub struct NvsStore {
    image: MemStore,
    #[cfg(target_os = "espidf")]
    nvs: Option<EspNvs<NvsDefault>>,
}

impl NvsStore {
    /// RAM-only store: updates are kept until power-off, never persisted.
    pub fn detached() -> Self {
        Self {
            image: MemStore::new(),
            #[cfg(target_os = "espidf")]
            nvs: None,
        }
    }

    /// Whether updates reach flash.
    pub fn is_persistent(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.nvs.is_some()
        }
        #[cfg(not(target_os = "espidf"))]
        {
            false
        }
    }

    /// Open the default NVS partition and load the stored image.
    ///
    /// # Returns
    ///
    /// - `Ok((store, FreshInstall))`: nothing stored, erased image
    /// - `Ok((store, UpToDate))`: image loaded
    /// - `Err(StoreError::TooNew)`: stored by newer firmware, left untouched
    /// - `Err(StoreError::Backend)`: NVS init or read failure
    #[cfg(target_os = "espidf")]
    pub fn open_default() -> Result<(Self, MigrationResult), StoreError> {
        let partition = EspDefaultNvsPartition::take()?;
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;

        let stored_version = nvs.get_u32(VERSION_KEY)?.unwrap_or(0);
        let result = check_version(stored_version)?;

        let mut image = MemStore::new();
        if result == MigrationResult::UpToDate {
            let mut buf = [0u8; STORE_SIZE];
            if let Some(blob) = nvs.get_blob(IMAGE_KEY, &mut buf)? {
                if blob.len() == STORE_SIZE {
                    image = MemStore::from_image(buf);
                }
            }
        }

        Ok((
            Self {
                image,
                nvs: Some(nvs),
            },
            result,
        ))
    }

    /// Stub for non-ESP platforms
    #[cfg(not(target_os = "espidf"))]
    pub fn open_default() -> Result<(Self, MigrationResult), StoreError> {
        Err(StoreError::NotAvailable)
    }

    #[cfg(target_os = "espidf")]
    fn flush(&mut self) -> Result<(), StoreError> {
        if let Some(nvs) = self.nvs.as_mut() {
            nvs.set_blob(IMAGE_KEY, self.image.image())?;
            nvs.set_u32(VERSION_KEY, CURRENT_SCHEMA_VERSION)?;
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl ByteStore for NvsStore {
    fn read_byte(&self, addr: u16) -> Result<u8, StoreError> {
        self.image.read_byte(addr)
    }

    fn update_byte(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        let before = self.image.writes();
        self.image.update_byte(addr, value)?;
        if self.image.writes() != before {
            self.flush()?;
        }
        Ok(())
    }

    fn read_block(&self, addr: u16, buf: &mut [u8]) -> Result<(), StoreError> {
        self.image.read_block(addr, buf)
    }

    /// One blob write per block, not per byte.
    fn update_block(&mut self, addr: u16, data: &[u8]) -> Result<(), StoreError> {
        let before = self.image.writes();
        self.image.update_block(addr, data)?;
        if self.image.writes() != before {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_constant() {
        assert_eq!(CURRENT_SCHEMA_VERSION, 1);
    }

    #[test]
    fn test_keys_fit_nvs_limit() {
        for key in [NVS_NAMESPACE, VERSION_KEY, IMAGE_KEY] {
            assert!(!key.is_empty() && key.len() <= 15, "{}", key);
        }
    }

    #[test]
    fn test_version_check() {
        assert_eq!(check_version(0), Ok(MigrationResult::FreshInstall));
        assert_eq!(check_version(1), Ok(MigrationResult::UpToDate));
        assert_eq!(check_version(2), Err(StoreError::TooNew { stored_version: 2 }));
    }

    #[test]
    fn test_detached_store_keeps_updates_in_ram() {
        let mut store = NvsStore::detached();
        assert!(!store.is_persistent());
        store.update_block(100, &[7, 8]).unwrap();
        assert_eq!(store.read_byte(101), Ok(8));
    }

    #[test]
    fn test_open_default_unavailable_on_host() {
        assert!(matches!(NvsStore::open_default(), Err(StoreError::NotAvailable)));
    }
}
