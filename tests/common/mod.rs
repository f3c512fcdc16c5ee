//! Simulated board for dialer integration tests
//!
//! Time is virtual. `idle` advances one sample tick (64 µs) and runs the tick
//! ISR work; `power_down` jumps straight to the next scripted line event or
//! the armed wake deadline, whichever comes first. Scripted pulse edges go
//! through `DialSignals::on_pulse_edge` exactly as the edge ISR would.

use std::collections::VecDeque;

use rotary_tone_dialer::audio::tones::{self, ToneSpec, Voice};
use rotary_tone_dialer::audio::ToneEngine;
use rotary_tone_dialer::diag::DiagState;
use rotary_tone_dialer::hal::{AudioSink, DialLine, LowPower, WakeTimer};
use rotary_tone_dialer::logging::LogStream;
use rotary_tone_dialer::timing::WakeInterval;
use rotary_tone_dialer::{DialSignals, Digit, Shared, TickClock};

/// Sample tick period.
pub const TICK_US: u64 = 64;

/// Pulse spacing of a 10 pps dial.
pub const PULSE_SPACING_MS: u64 = 100;

/// Time between the dial leaving rest and its first pulse.
pub const FIRST_PULSE_MS: u64 = 100;

/// Quiet time left after each scripted digit.
pub const DIGIT_GAP_MS: u64 = 600;

/// Virtual-time guard against a runaway control loop.
const TIME_LIMIT_US: u64 = 600_000_000;

/// Fresh interrupt-shared state for one test.
pub fn shared() -> Shared<'static> {
    Shared {
        engine: Box::leak(Box::new(ToneEngine::new())),
        clock: Box::leak(Box::new(TickClock::new())),
        signals: Box::leak(Box::new(DialSignals::new(20))),
        log: Box::leak(Box::new(LogStream::new())),
        diag: Box::leak(Box::new(DiagState::new())),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineEvent {
    DialOff,
    Pulse,
    DialRest,
}

/// One start..stop span of audio output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Burst {
    pub start_us: u64,
    pub ticks: u32,
    /// Step pairs heard, consecutive duplicates collapsed.
    pub tones: Vec<ToneSpec>,
}

impl Burst {
    /// Whether this burst is `digit` as a steady tone or its melody.
    pub fn is(&self, digit: Digit) -> bool {
        match tones::voice(digit) {
            Voice::Steady(spec) => self.tones == [spec],
            Voice::Melody(notes) => {
                self.tones.len() == notes.len()
                    && self
                        .tones
                        .iter()
                        .zip(notes)
                        .all(|(heard, note)| *heard == ToneSpec::single(note.step))
            }
            Voice::Silent => self.tones.is_empty(),
        }
    }
}

pub struct SimBoard {
    shared: Shared<'static>,
    now_us: u64,
    cursor_us: u64,
    script: VecDeque<(u64, LineEvent)>,
    dialing: bool,
    wake_at: Option<u64>,
    current: Option<Burst>,
    bursts: Vec<Burst>,
    stalled: bool,
}

impl SimBoard {
    pub fn new(shared: Shared<'static>) -> Self {
        Self {
            shared,
            now_us: 0,
            cursor_us: 0,
            script: VecDeque::new(),
            dialing: false,
            wake_at: None,
            current: None,
            bursts: Vec::new(),
            stalled: false,
        }
    }

    // ========================================
    // Script
    // ========================================

    fn schedule(&mut self, at_us: u64, event: LineEvent) {
        self.script.push_back((at_us, event));
        self.stalled = false;
    }

    fn sync_cursor(&mut self) {
        self.cursor_us = self.cursor_us.max(self.now_us);
    }

    /// Hold the dial off rest for `hold_ms` before the pulse train starts,
    /// then release it. Zero pulses is a wind that returns without pulsing.
    pub fn hold(&mut self, hold_ms: u64, pulses: u8) -> &mut Self {
        self.sync_cursor();
        let mut t = self.cursor_us;
        self.schedule(t, LineEvent::DialOff);
        t += hold_ms * 1000;
        for i in 0..pulses as u64 {
            if i > 0 {
                t += PULSE_SPACING_MS * 1000;
            }
            self.schedule(t, LineEvent::Pulse);
        }
        t += PULSE_SPACING_MS * 1000;
        self.schedule(t, LineEvent::DialRest);
        self.cursor_us = t + DIGIT_GAP_MS * 1000;
        self
    }

    /// An ordinary wind producing `pulses` pulses.
    pub fn dial(&mut self, pulses: u8) -> &mut Self {
        self.hold(FIRST_PULSE_MS, pulses)
    }

    /// Dial several digits in a row.
    pub fn dial_all(&mut self, trains: &[u8]) -> &mut Self {
        for &pulses in trains {
            self.dial(pulses);
        }
        self
    }

    /// Hold past the first dwell window, then dial `pulses`.
    pub fn special_l1(&mut self, pulses: u8) -> &mut Self {
        self.hold(2500, pulses)
    }

    /// Hold past both dwell windows, then dial `pulses`.
    pub fn special_l2(&mut self, pulses: u8) -> &mut Self {
        self.hold(4800, pulses)
    }

    fn apply_due(&mut self) {
        while let Some(&(at, event)) = self.script.front() {
            if at > self.now_us {
                break;
            }
            self.script.pop_front();
            match event {
                LineEvent::DialOff => self.dialing = true,
                LineEvent::DialRest => self.dialing = false,
                LineEvent::Pulse => self
                    .shared
                    .signals
                    .on_pulse_edge((self.now_us / 1000) as u32),
            }
        }
    }

    fn fire_wake_if_due(&mut self) {
        if let Some(at) = self.wake_at {
            if at <= self.now_us {
                self.wake_at = None;
                self.shared.signals.on_wake();
            }
        }
    }

    // ========================================
    // Inspection
    // ========================================

    /// Nothing scheduled and nothing armed: the loop would sleep forever.
    pub fn stalled(&self) -> bool {
        self.stalled
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    /// Silence between consecutive bursts, in µs.
    pub fn gaps_us(&self) -> Vec<u64> {
        self.bursts
            .windows(2)
            .map(|pair| pair[1].start_us - (pair[0].start_us + pair[0].ticks as u64 * TICK_US))
            .collect()
    }

    pub fn take_bursts(&mut self) -> Vec<Burst> {
        std::mem::take(&mut self.bursts)
    }
}

impl AudioSink for SimBoard {
    fn start(&mut self) {
        self.current = Some(Burst {
            start_us: self.now_us,
            ticks: 0,
            tones: Vec::new(),
        });
    }

    fn stop(&mut self) {
        if let Some(burst) = self.current.take() {
            self.bursts.push(burst);
        }
    }
}

impl LowPower for SimBoard {
    fn idle(&mut self) {
        assert!(self.now_us < TIME_LIMIT_US, "control loop never settled");
        self.now_us += TICK_US;

        let sample = self.shared.engine.tick();
        self.shared.clock.tick();
        if let Some(burst) = self.current.as_mut() {
            let tone = self.shared.engine.tone();
            if burst.tones.last() != Some(&tone) {
                burst.tones.push(tone);
            }
            burst.ticks += 1;
            assert!(sample <= rotary_tone_dialer::audio::dds::MAX_OUTPUT);
        }

        self.apply_due();
        self.fire_wake_if_due();
    }

    fn power_down(&mut self) {
        assert!(self.now_us < TIME_LIMIT_US, "control loop never settled");

        let next_event = self.script.front().map(|&(at, _)| at);
        let target = match (next_event, self.wake_at) {
            (Some(e), Some(w)) => e.min(w),
            (Some(e), None) => e,
            (None, Some(w)) => w,
            (None, None) => {
                self.stalled = true;
                return;
            }
        };

        self.now_us = self.now_us.max(target);
        self.apply_due();
        self.fire_wake_if_due();
    }
}

impl WakeTimer for SimBoard {
    fn arm(&mut self, interval: WakeInterval) {
        self.wake_at = Some(self.now_us + interval.as_micros());
    }

    fn disarm(&mut self) {
        self.wake_at = None;
    }
}

impl DialLine for SimBoard {
    fn is_dialing(&mut self) -> bool {
        self.dialing
    }
}
