//! Module: timing
//!
//! Purpose: Time bases for the dialer.
//!
//! - `TickClock`: free-running counter advanced by the sample tick interrupt.
//!   Fine-grained waits (tone durations, inter-digit gaps) are `Countdown`s
//!   measured against it.
//! - `WakeInterval`: the discrete one-shot durations of the coarse wake timer
//!   used for contact settling and dwell detection.
//!
//! Safety: RT-safe. The counter is a single atomic written only by the tick ISR.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::audio::tones::SAMPLE_RATE_HZ;
use crate::hal::LowPower;

/// Convert milliseconds to sample ticks.
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    ((ms as u64 * SAMPLE_RATE_HZ as u64) / 1000) as u32
}

/// Convert sample ticks to milliseconds (truncating).
#[inline]
pub const fn ticks_to_ms(ticks: u32) -> u32 {
    ((ticks as u64 * 1000) / SAMPLE_RATE_HZ as u64) as u32
}

/// Free-running sample tick counter.
pub struct TickClock {
    ticks: AtomicU32,
}

impl TickClock {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
        }
    }

    /// Advance by one sample tick (tick ISR only).
    #[inline]
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Current tick count (wraps).
    #[inline]
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Start a wait of `ticks` sample ticks from now.
    #[inline]
    pub fn countdown(&self, ticks: u32) -> Countdown<'_> {
        Countdown {
            clock: self,
            start: self.now(),
            ticks,
        }
    }

    /// Start a wait of `ms` milliseconds from now.
    #[inline]
    pub fn countdown_ms(&self, ms: u32) -> Countdown<'_> {
        self.countdown(ms_to_ticks(ms))
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

/// A pending wait against the tick clock.
///
/// Wrapping-safe: elapsed time is measured as `now - start`, so the counter
/// may roll over during a wait.
pub struct Countdown<'a> {
    clock: &'a TickClock,
    start: u32,
    ticks: u32,
}

impl<'a> Countdown<'a> {
    /// Ticks elapsed since the countdown started.
    #[inline]
    pub fn elapsed(&self) -> u32 {
        self.clock.now().wrapping_sub(self.start)
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.elapsed() >= self.ticks
    }

    /// Ticks left before expiry.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.ticks.saturating_sub(self.elapsed())
    }

    /// Block in low-power idle until the countdown expires.
    ///
    /// Every interrupt wakes the caller; the loop goes back to idle until the
    /// tick counter has advanced far enough.
    pub fn wait<W: LowPower + ?Sized>(&self, sleeper: &mut W) {
        while !self.expired() {
            sleeper.idle();
        }
    }
}

/// Discrete one-shot durations of the coarse wake timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeInterval {
    Ms64,
    Ms128,
    Ms500,
    Ms1024,
    Ms2048,
}

impl WakeInterval {
    pub const fn as_millis(self) -> u32 {
        match self {
            WakeInterval::Ms64 => 64,
            WakeInterval::Ms128 => 128,
            WakeInterval::Ms500 => 500,
            WakeInterval::Ms1024 => 1024,
            WakeInterval::Ms2048 => 2048,
        }
    }

    #[inline]
    pub const fn as_micros(self) -> u64 {
        self.as_millis() as u64 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TickingSleeper<'a>(&'a TickClock, u32);

    impl LowPower for TickingSleeper<'_> {
        fn idle(&mut self) {
            self.0.tick();
            self.1 += 1;
        }

        fn power_down(&mut self) {}
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(0), 0);
        assert_eq!(ms_to_ticks(1000), SAMPLE_RATE_HZ);
        assert_eq!(ms_to_ticks(100), 1562);
        assert_eq!(ticks_to_ms(SAMPLE_RATE_HZ), 1000);
        assert_eq!(ticks_to_ms(ms_to_ticks(2048)), 2048);
        assert_eq!(ticks_to_ms(ms_to_ticks(100)), 99);
    }

    #[test]
    fn test_countdown_waits_exact_ticks() {
        let clock = TickClock::new();
        let countdown = clock.countdown(100);
        let mut sleeper = TickingSleeper(&clock, 0);
        countdown.wait(&mut sleeper);
        assert_eq!(sleeper.1, 100);
        assert!(countdown.expired());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn test_countdown_survives_wraparound() {
        let clock = TickClock::new();
        clock.ticks.store(u32::MAX - 10, Ordering::Relaxed);
        let countdown = clock.countdown(50);
        let mut sleeper = TickingSleeper(&clock, 0);
        countdown.wait(&mut sleeper);
        assert_eq!(sleeper.1, 50);
    }

    #[test]
    fn test_zero_countdown_does_not_idle() {
        let clock = TickClock::new();
        let mut sleeper = TickingSleeper(&clock, 0);
        clock.countdown(0).wait(&mut sleeper);
        assert_eq!(sleeper.1, 0);
    }
}
