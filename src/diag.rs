//! Diagnostic counters for the dialer.
//!
//! Nothing here is fatal. The dialer has no user-visible error channel:
//! whatever goes wrong is logged, counted, and the control loop carries on
//! in DIAL. The counters exist so the log drain (or a debugger) can tell a
//! flaky dial from a failing flash.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// What went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DiagCode {
    /// No event recorded yet.
    None = 0,

    /// Pulse train outside 1..=10 (no pulses, or contact bounce piling up
    /// extra ones). Dropped without action.
    DroppedDigit = 1,

    /// A persisted config field was out of range and rewritten.
    ConfigRepaired = 2,

    /// A storage read or write failed.
    StoreFailure = 3,

    /// A slot index outside the table reached the store.
    SlotOutOfRange = 4,
}

const CODE_COUNT: usize = 5;

impl DiagCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => DiagCode::DroppedDigit,
            2 => DiagCode::ConfigRepaired,
            3 => DiagCode::StoreFailure,
            4 => DiagCode::SlotOutOfRange,
            _ => DiagCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagCode::None => "none",
            DiagCode::DroppedDigit => "dropped digit",
            DiagCode::ConfigRepaired => "config repaired",
            DiagCode::StoreFailure => "store failure",
            DiagCode::SlotOutOfRange => "slot out of range",
        }
    }
}

/// Lock-free event counters.
///
/// # Usage
///
/// ```ignore
/// static DIAG: DiagState = DiagState::new();
///
/// if store.write(slot, &digits).is_err() {
///     DIAG.record(DiagCode::StoreFailure, slot as u32);
/// }
/// ```
pub struct DiagState {
    counts: [AtomicU32; CODE_COUNT],
    last_code: AtomicU8,
    last_data: AtomicU32,
}

impl DiagState {
    pub const fn new() -> Self {
        Self {
            counts: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
            last_code: AtomicU8::new(0),
            last_data: AtomicU32::new(0),
        }
    }

    /// Count one event. `data` is free-form (pulse count, slot, address).
    #[inline]
    pub fn record(&self, code: DiagCode, data: u32) {
        if code == DiagCode::None {
            return;
        }
        self.counts[code as usize].fetch_add(1, Ordering::Relaxed);
        self.last_data.store(data, Ordering::Release);
        self.last_code.store(code as u8, Ordering::Release);
    }

    /// Events of one kind since boot.
    #[inline]
    pub fn count(&self, code: DiagCode) -> u32 {
        self.counts[code as usize].load(Ordering::Relaxed)
    }

    /// All events since boot.
    pub fn total(&self) -> u32 {
        self.counts[1..].iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    #[inline]
    pub fn last(&self) -> (DiagCode, u32) {
        (
            DiagCode::from_u8(self.last_code.load(Ordering::Acquire)),
            self.last_data.load(Ordering::Acquire),
        )
    }

    pub fn snapshot(&self) -> DiagSnapshot {
        let (last_code, last_data) = self.last();
        DiagSnapshot {
            dropped_digits: self.count(DiagCode::DroppedDigit),
            config_repairs: self.count(DiagCode::ConfigRepaired),
            store_failures: self.count(DiagCode::StoreFailure),
            slot_out_of_range: self.count(DiagCode::SlotOutOfRange),
            last_code,
            last_data,
        }
    }
}

impl Default for DiagState {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagSnapshot {
    pub dropped_digits: u32,
    pub config_repairs: u32,
    pub store_failures: u32,
    pub slot_out_of_range: u32,
    pub last_code: DiagCode,
    pub last_data: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diag_state_basic() {
        let diag = DiagState::new();
        assert_eq!(diag.total(), 0);
        assert_eq!(diag.last(), (DiagCode::None, 0));

        diag.record(DiagCode::DroppedDigit, 12);
        diag.record(DiagCode::DroppedDigit, 0);
        diag.record(DiagCode::StoreFailure, 3);

        assert_eq!(diag.count(DiagCode::DroppedDigit), 2);
        assert_eq!(diag.total(), 3);
        assert_eq!(diag.last(), (DiagCode::StoreFailure, 3));

        let snap = diag.snapshot();
        assert_eq!(snap.dropped_digits, 2);
        assert_eq!(snap.store_failures, 1);
        assert_eq!(snap.config_repairs, 0);
    }

    #[test]
    fn test_none_is_not_counted() {
        let diag = DiagState::new();
        diag.record(DiagCode::None, 1);
        assert_eq!(diag.total(), 0);
    }
}
