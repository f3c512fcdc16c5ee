//! Persistent byte store contract
//!
//! The dialer sees its non-volatile memory as a flat, byte-addressed array
//! of `STORE_SIZE` bytes with EEPROM semantics: reads are cheap, `update`
//! writes only bytes that differ and is durable once it returns.

use super::STORE_SIZE;

/// Value of a never-written byte.
pub const ERASED: u8 = 0xFF;

/// Storage error with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// S01: Address range outside the store
    OutOfBounds,
    /// S02: No backend on this platform
    NotAvailable,
    /// S03: Stored layout written by newer firmware
    TooNew { stored_version: u32 },
    /// S04: Backend driver failure (raw driver code)
    Backend(i32),
}

impl StoreError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfBounds => "S01",
            Self::NotAvailable => "S02",
            Self::TooNew { .. } => "S03",
            Self::Backend(_) => "S04",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::OutOfBounds => "address out of bounds",
            Self::NotAvailable => "storage not available",
            Self::TooNew { .. } => "schema too new",
            Self::Backend(_) => "storage backend error",
        }
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooNew { stored_version } => {
                write!(f, "{}: {} (v{})", self.code(), self.message(), stored_version)
            }
            Self::Backend(raw) => write!(f, "{}: {} ({})", self.code(), self.message(), raw),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

#[inline]
fn check_range(addr: u16, len: usize) -> Result<usize, StoreError> {
    let start = addr as usize;
    match start.checked_add(len) {
        Some(end) if end <= STORE_SIZE => Ok(start),
        _ => Err(StoreError::OutOfBounds),
    }
}

/// Byte-addressed non-volatile memory.
pub trait ByteStore {
    fn read_byte(&self, addr: u16) -> Result<u8, StoreError>;

    /// Write-through update; unchanged bytes are not rewritten.
    fn update_byte(&mut self, addr: u16, value: u8) -> Result<(), StoreError>;

    fn read_block(&self, addr: u16, buf: &mut [u8]) -> Result<(), StoreError> {
        check_range(addr, buf.len())?;
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr + offset as u16)?;
        }
        Ok(())
    }

    fn update_block(&mut self, addr: u16, data: &[u8]) -> Result<(), StoreError> {
        check_range(addr, data.len())?;
        for (offset, &byte) in data.iter().enumerate() {
            self.update_byte(addr + offset as u16, byte)?;
        }
        Ok(())
    }
}

/// RAM-backed store, starts erased.
///
/// Used by the host test suite and as the working image behind the NVS
/// backend.
#[derive(Clone)]
pub struct MemStore {
    bytes: [u8; STORE_SIZE],
    writes: u32,
}

impl MemStore {
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED; STORE_SIZE],
            writes: 0,
        }
    }

    pub const fn from_image(bytes: [u8; STORE_SIZE]) -> Self {
        Self { bytes, writes: 0 }
    }

    #[inline]
    pub fn image(&self) -> &[u8; STORE_SIZE] {
        &self.bytes
    }

    /// Bytes physically rewritten since creation.
    #[inline]
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for MemStore {
    fn read_byte(&self, addr: u16) -> Result<u8, StoreError> {
        let idx = check_range(addr, 1)?;
        Ok(self.bytes[idx])
    }

    fn update_byte(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        let idx = check_range(addr, 1)?;
        if self.bytes[idx] != value {
            self.bytes[idx] = value;
            self.writes += 1;
        }
        Ok(())
    }

    fn read_block(&self, addr: u16, buf: &mut [u8]) -> Result<(), StoreError> {
        let start = check_range(addr, buf.len())?;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_store_is_erased() {
        let store = MemStore::new();
        assert_eq!(store.read_byte(0), Ok(ERASED));
        assert_eq!(store.read_byte((STORE_SIZE - 1) as u16), Ok(ERASED));
    }

    #[test]
    fn test_bounds() {
        let mut store = MemStore::new();
        assert_eq!(store.read_byte(STORE_SIZE as u16), Err(StoreError::OutOfBounds));
        assert_eq!(
            store.update_block((STORE_SIZE - 2) as u16, &[1, 2, 3]),
            Err(StoreError::OutOfBounds)
        );
        let mut buf = [0u8; 4];
        assert_eq!(store.read_block(u16::MAX, &mut buf), Err(StoreError::OutOfBounds));
    }

    #[test]
    fn test_update_skips_unchanged_bytes() {
        let mut store = MemStore::new();
        store.update_block(10, &[1, 2, 3]).unwrap();
        assert_eq!(store.writes(), 3);
        store.update_block(10, &[1, 2, 4]).unwrap();
        assert_eq!(store.writes(), 4);

        let mut buf = [0u8; 3];
        store.read_block(10, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 4]);
    }

    #[test]
    fn test_error_display() {
        use std::string::ToString;
        assert_eq!(StoreError::OutOfBounds.to_string(), "S01: address out of bounds");
        assert_eq!(
            StoreError::TooNew { stored_version: 3 }.to_string(),
            "S03: schema too new (v3)"
        );
    }
}
