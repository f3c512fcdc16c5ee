//! Module: signals
//!
//! Purpose: State shared between the edge/wake interrupts and the control
//! loop. Interrupts perform only single atomic updates (count a pulse,
//! set one flag bit); every multi-field transition happens in the main loop.
//!
//! ```text
//! pulse edge ISR ──▶ pulses += 1, clear DETECT_*
//! wake timer ISR ──▶ WAKE
//! control loop   ──▶ begin_dial / end_dial / take_expiry / suspend / resume
//! ```
//!
//! Safety: RT-safe. Lock-free, no allocation.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Dial is off its rest position; pulse edges are counted.
const DIALING: u8 = 1 << 0;
/// First dwell window armed.
const DETECT_L1: u8 = 1 << 1;
/// Second dwell window armed.
const DETECT_L2: u8 = 1 << 2;
/// The one-shot wake timer fired.
const WAKE: u8 = 1 << 3;

const DETECT_MASK: u8 = DETECT_L1 | DETECT_L2;

/// Which special-function dwell window is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DwellLevel {
    First,
    Second,
}

impl DwellLevel {
    const fn bit(self) -> u8 {
        match self {
            DwellLevel::First => DETECT_L1,
            DwellLevel::Second => DETECT_L2,
        }
    }
}

/// Dwell bits saved by `suspend_dwell`, handed back to `resume_dwell`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuspendedDwell(u8);

/// Interrupt-shared flags and counters.
pub struct DialSignals {
    flags: AtomicU8,
    pulses: AtomicU8,
    last_edge_ms: AtomicU32,
    ignored_edges: AtomicU32,
    debounce_ms: AtomicU32,
}

impl DialSignals {
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            flags: AtomicU8::new(0),
            pulses: AtomicU8::new(0),
            last_edge_ms: AtomicU32::new(0),
            ignored_edges: AtomicU32::new(0),
            debounce_ms: AtomicU32::new(debounce_ms),
        }
    }

    pub fn set_debounce_ms(&self, ms: u32) {
        self.debounce_ms.store(ms, Ordering::Relaxed);
    }

    // ========================================
    // Interrupt side
    // ========================================

    /// Pulse line edge. Counts only while dialing; any counted pulse cancels
    /// dwell detection.
    ///
    /// ISR only.
    #[inline]
    pub fn on_pulse_edge(&self, now_ms: u32) {
        if self.flags.load(Ordering::Acquire) & DIALING == 0 {
            return;
        }

        let debounce = self.debounce_ms.load(Ordering::Relaxed);
        if debounce > 0 && self.pulses.load(Ordering::Relaxed) > 0 {
            let since = now_ms.wrapping_sub(self.last_edge_ms.load(Ordering::Relaxed));
            if since < debounce {
                self.ignored_edges.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        self.last_edge_ms.store(now_ms, Ordering::Relaxed);

        // Saturate: 255+ pulses must never wrap back into the valid range.
        let _ = self
            .pulses
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_add(1));

        // Count before clearing, see `resume_dwell`.
        self.flags.fetch_and(!DETECT_MASK, Ordering::AcqRel);
    }

    /// One-shot wake timer expiry.
    ///
    /// ISR only.
    #[inline]
    pub fn on_wake(&self) {
        self.flags.fetch_or(WAKE, Ordering::AcqRel);
    }

    // ========================================
    // Control loop side
    // ========================================

    /// Dial left its rest position: zero the count, arm counting and the
    /// first dwell window.
    pub fn begin_dial(&self) {
        self.pulses.store(0, Ordering::Release);
        self.flags.store(DIALING | DETECT_L1, Ordering::Release);
    }

    /// Dial returned to rest: disarm everything and return the raw count.
    pub fn end_dial(&self) -> u8 {
        self.flags.store(0, Ordering::Release);
        self.pulses.load(Ordering::Acquire)
    }

    /// The armed dwell window, if any.
    pub fn dwell(&self) -> Option<DwellLevel> {
        let flags = self.flags.load(Ordering::Acquire);
        if flags & DETECT_L1 != 0 {
            Some(DwellLevel::First)
        } else if flags & DETECT_L2 != 0 {
            Some(DwellLevel::Second)
        } else {
            None
        }
    }

    /// Forget a stale wake before arming the timer.
    pub fn clear_wake(&self) {
        self.flags.fetch_and(!WAKE, Ordering::AcqRel);
    }

    /// Whether the wake timer has fired since the last `clear_wake`.
    pub fn woke(&self) -> bool {
        self.flags.load(Ordering::Acquire) & WAKE != 0
    }

    /// Consume a wake that ended the `level` window.
    ///
    /// On success the first window hands over to the second; the second
    /// simply ends. Returns false when the timer did not fire or a pulse
    /// cancelled the window first. The wake flag is consumed either way.
    pub fn take_expiry(&self, level: DwellLevel) -> bool {
        let mut expired = false;
        let _ = self
            .flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |flags| {
                expired = flags & WAKE != 0 && flags & level.bit() != 0;
                let mut next = flags & !WAKE;
                if expired {
                    next &= !level.bit();
                    if level == DwellLevel::First {
                        next |= DETECT_L2;
                    }
                }
                Some(next)
            });
        expired
    }

    /// Disarm dwell detection while a tone is playing.
    pub fn suspend_dwell(&self) -> SuspendedDwell {
        SuspendedDwell(self.flags.fetch_and(!DETECT_MASK, Ordering::AcqRel) & DETECT_MASK)
    }

    /// Re-arm what `suspend_dwell` took, unless a pulse arrived meanwhile.
    ///
    /// The pulse ISR bumps the count before it clears the dwell bits, so an
    /// edge racing this update either shows up in the count or clears the
    /// bits after they are restored.
    pub fn resume_dwell(&self, saved: SuspendedDwell) {
        if saved.0 == 0 {
            return;
        }
        let _ = self
            .flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |flags| {
                let idle = flags & DIALING != 0 && self.pulses.load(Ordering::Acquire) == 0;
                if idle {
                    Some(flags | saved.0)
                } else {
                    None
                }
            });
    }

    #[inline]
    pub fn is_dialing(&self) -> bool {
        self.flags.load(Ordering::Acquire) & DIALING != 0
    }

    #[inline]
    pub fn pulses(&self) -> u8 {
        self.pulses.load(Ordering::Acquire)
    }

    /// Edges rejected by the debounce window since boot.
    #[inline]
    pub fn ignored_edges(&self) -> u32 {
        self.ignored_edges.load(Ordering::Relaxed)
    }
}

impl Default for DialSignals {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_ignored_at_rest() {
        let signals = DialSignals::new(0);
        signals.on_pulse_edge(10);
        assert_eq!(signals.pulses(), 0);
    }

    #[test]
    fn test_pulse_cancels_dwell() {
        let signals = DialSignals::new(0);
        signals.begin_dial();
        assert_eq!(signals.dwell(), Some(DwellLevel::First));
        signals.on_pulse_edge(0);
        assert_eq!(signals.dwell(), None);
        assert_eq!(signals.end_dial(), 1);
        assert!(!signals.is_dialing());
    }

    #[test]
    fn test_debounce_rejects_close_edges() {
        let signals = DialSignals::new(20);
        signals.begin_dial();
        signals.on_pulse_edge(100);
        signals.on_pulse_edge(105);
        signals.on_pulse_edge(200);
        assert_eq!(signals.pulses(), 2);
        assert_eq!(signals.ignored_edges(), 1);
    }

    #[test]
    fn test_count_saturates() {
        let signals = DialSignals::new(0);
        signals.begin_dial();
        for t in 0..300 {
            signals.on_pulse_edge(t);
        }
        assert_eq!(signals.end_dial(), u8::MAX);
    }

    #[test]
    fn test_expiry_hands_over_to_second_window() {
        let signals = DialSignals::new(0);
        signals.begin_dial();
        assert!(!signals.take_expiry(DwellLevel::First));

        signals.on_wake();
        assert!(signals.take_expiry(DwellLevel::First));
        assert_eq!(signals.dwell(), Some(DwellLevel::Second));
        assert!(!signals.woke());

        signals.on_wake();
        assert!(signals.take_expiry(DwellLevel::Second));
        assert_eq!(signals.dwell(), None);
        assert!(signals.is_dialing());
    }

    #[test]
    fn test_resume_skipped_after_pulse() {
        let signals = DialSignals::new(0);
        signals.begin_dial();
        let saved = signals.suspend_dwell();
        assert_eq!(signals.dwell(), None);
        signals.resume_dwell(saved);
        assert_eq!(signals.dwell(), Some(DwellLevel::First));

        let saved = signals.suspend_dwell();
        signals.on_pulse_edge(0);
        signals.resume_dwell(saved);
        assert_eq!(signals.dwell(), None);
    }
}
