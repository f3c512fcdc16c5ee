//! Module: dialer
//!
//! Purpose: The control loop. Turns dial events into tones, speed-dial
//! replays, programming steps and feature changes.
//!
//! ```text
//!             dwell 1                 dwell 2
//!   DIAL ───────────────▶ SPECIAL_L1 ─────────▶ SPECIAL_L2
//!    ▲  ▲                    │                     │ slot digit
//!    │  └── digit (restore) ─┘                     ▼
//!    │                                         PROGRAM_SD
//!    └──────────── menu key / other / full ────────┘
//! ```
//!
//! Dwell windows are measured while the dial is held off its rest position
//! without producing pulses. A pulse cancels the armed window and the wind
//! becomes an ordinary digit, decoded in whatever mode is current when the
//! dial returns to rest.
//!
//! Safety: Main loop only. Interrupt-shared state is reached through
//! `Shared`, every field of which is lock-free.

use crate::audio::{ToneEngine, ToneGenerator};
use crate::config::{
    self, slot_for_digit, ByteStore, DialerConfig, FeatureConfig, HotlineChange, SpeedDialSlot,
    SpeedDialStore, HOTLINE_SLOT, REDIAL_SLOT, SPEED_DIAL_SIZE,
};
use crate::decoder::{DialDecoder, DialEvent};
use crate::diag::{DiagCode, DiagState};
use crate::digit::Digit;
use crate::hal::Board;
use crate::logging::LogStream;
use crate::signals::{DialSignals, DwellLevel};
use crate::timing::{TickClock, WakeInterval};
use crate::{rt_debug, rt_error, rt_info, rt_warn};

/// Contact settling after the dial leaves rest.
const SETTLE_START: WakeInterval = WakeInterval::Ms64;
/// Settling after a valid pulse train, before acting on it.
const SETTLE_DIGIT: WakeInterval = WakeInterval::Ms128;
/// Settling after a dropped pulse train.
const SETTLE_DROPPED: WakeInterval = WakeInterval::Ms64;
/// Length of each dwell window.
const DWELL_WINDOW: WakeInterval = WakeInterval::Ms2048;

const L1_CONFIRM_MS: u16 = 200;
const L2_CONFIRM_MS: u16 = 200;
const PROGRAM_DONE_MS: u16 = 800;
const MENU_TUNE_MS: u16 = 800;
const MENU_BEEP_MS: u16 = 200;
const MENU_GAP_MS: u16 = 200;

/// Operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Dial,
    SpecialL1,
    SpecialL2,
    ProgramSpeedDial,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Dial => "DIAL",
            Mode::SpecialL1 => "SPECIAL_L1",
            Mode::SpecialL2 => "SPECIAL_L2",
            Mode::ProgramSpeedDial => "PROGRAM_SD",
        }
    }
}

/// Interrupt-shared state the dialer works against.
#[derive(Clone, Copy)]
pub struct Shared<'a> {
    pub engine: &'a ToneEngine,
    pub clock: &'a TickClock,
    pub signals: &'a DialSignals,
    pub log: &'a LogStream,
    pub diag: &'a DiagState,
}

/// Digits collected in RAM before being written to a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotBuffer<const N: usize> {
    digits: SpeedDialSlot<N>,
    len: usize,
}

impl<const N: usize> SlotBuffer<N> {
    pub const fn new() -> Self {
        Self {
            digits: SpeedDialSlot::empty(),
            len: 0,
        }
    }

    /// Append; ignored when full.
    fn push(&mut self, digit: Digit) {
        if self.is_full() {
            return;
        }
        self.digits.set(self.len, digit);
        self.len += 1;
    }

    fn clear(&mut self) {
        self.digits.clear();
        self.len = 0;
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn digits(&self) -> &SpeedDialSlot<N> {
        &self.digits
    }
}

impl<const N: usize> Default for SlotBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// State owned by the control loop.
#[derive(Clone, Copy, Debug)]
pub struct RunState<const N: usize> {
    mode: Mode,
    /// Mode to restore after a SPECIAL_L1 digit.
    prior: Mode,
    /// This session's dialed digits, mirrored into the redial slot.
    session: SlotBuffer<N>,
    /// Digits being programmed.
    program: SlotBuffer<N>,
    program_slot: u8,
    /// Played as the next action once back in the restored mode.
    pending: Option<Digit>,
}

impl<const N: usize> RunState<N> {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Dial,
            prior: Mode::Dial,
            session: SlotBuffer::new(),
            program: SlotBuffer::new(),
            program_slot: 0,
            pending: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn prior(&self) -> Mode {
        self.prior
    }

    #[inline]
    pub fn pending(&self) -> Option<Digit> {
        self.pending
    }

    #[inline]
    pub fn session(&self) -> &SlotBuffer<N> {
        &self.session
    }

    #[inline]
    pub fn program(&self) -> &SlotBuffer<N> {
        &self.program
    }

    #[inline]
    pub fn program_slot(&self) -> u8 {
        self.program_slot
    }
}

impl<const N: usize> Default for RunState<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The dialer: board, storage and state machine.
pub struct Dialer<'a, B, S, const N: usize = SPEED_DIAL_SIZE>
where
    B: Board,
    S: ByteStore,
{
    board: B,
    store: SpeedDialStore<S, N>,
    features: FeatureConfig,
    decoder: DialDecoder<'a>,
    generator: ToneGenerator<'a>,
    shared: Shared<'a>,
    state: RunState<N>,
}

impl<'a, B, S, const N: usize> Dialer<'a, B, S, N>
where
    B: Board,
    S: ByteStore,
{
    pub fn new(board: B, store: S, config: DialerConfig, shared: Shared<'a>) -> Self {
        shared.signals.set_debounce_ms(config.pulse_debounce_ms);
        Self {
            board,
            store: SpeedDialStore::new(store),
            features: FeatureConfig::default(),
            decoder: DialDecoder::new(shared.signals, config.mapping),
            generator: ToneGenerator::new(shared.engine, shared.clock),
            shared,
            state: RunState::new(),
        }
    }

    /// Power-on sequence: synthesizer init, config load and repair, then the
    /// hotline auto-dial when enabled.
    pub fn boot(&mut self) {
        self.shared.engine.reset();
        self.state = RunState::new();

        match FeatureConfig::load(self.store.backend_mut()) {
            Ok((features, repairs)) => {
                self.features = features;
                if repairs.any() {
                    self.shared.diag.record(DiagCode::ConfigRepaired, repairs.count());
                    rt_warn!(
                        self.shared.log,
                        self.shared.clock.now(),
                        "config repaired: flags={} delay={} unit={}",
                        repairs.features,
                        repairs.hotline_delay,
                        repairs.tone_unit
                    );
                }
            }
            Err(e) => {
                self.features = FeatureConfig::default();
                self.shared.diag.record(DiagCode::StoreFailure, 0);
                rt_error!(self.shared.log, self.shared.clock.now(), "config load: {}", e);
            }
        }

        rt_info!(
            self.shared.log,
            self.shared.clock.now(),
            "boot: hotline={} delay={}s tone={}ms map={}",
            self.features.hotline,
            self.features.hotline_delay_s,
            self.features.tone_ms(),
            self.decoder.mapping().as_str()
        );

        if self.features.hotline {
            self.generator
                .silence(&mut self.board, self.features.hotline_delay_ms());
            rt_info!(self.shared.log, self.shared.clock.now(), "hotline: dialing slot {}", HOTLINE_SLOT);
            self.replay(HOTLINE_SLOT);
        }
    }

    /// One pass of the control loop. Returns after the next low-power wait.
    pub fn step(&mut self) {
        let dialing = self.board.is_dialing();
        match self.decoder.observe(dialing) {
            Some(DialEvent::Started) => {
                self.nap(SETTLE_START);
            }
            Some(DialEvent::Finished { pulses, digit: Digit::Off }) => {
                self.shared.diag.record(DiagCode::DroppedDigit, pulses as u32);
                rt_warn!(self.shared.log, self.shared.clock.now(), "dropped {} pulses", pulses);
                self.nap(SETTLE_DROPPED);
            }
            Some(DialEvent::Finished { pulses, digit }) => {
                rt_debug!(self.shared.log, self.shared.clock.now(), "digit {} ({} pulses)", digit, pulses);
                self.nap(SETTLE_DIGIT);
                self.handle_digit(digit);
            }
            None => {}
        }

        if let Some(digit) = self.state.pending.take() {
            self.handle_digit(digit);
        }

        match self.shared.signals.dwell() {
            Some(level) => self.wait_dwell(level),
            None => self.board.power_down(),
        }
    }

    /// Run forever, calling `between` after every loop pass.
    pub fn run<F: FnMut(&mut Self)>(&mut self, mut between: F) -> ! {
        loop {
            self.step();
            between(self);
        }
    }

    /// Act on a decoded digit in the current mode.
    pub fn handle_digit(&mut self, digit: Digit) {
        match self.state.mode {
            Mode::Dial => self.dial(digit),
            Mode::SpecialL1 => self.special_l1(digit),
            Mode::SpecialL2 => self.special_l2(digit),
            Mode::ProgramSpeedDial => self.program(digit),
        }
    }

    fn dial(&mut self, digit: Digit) {
        self.generator
            .generate_tone(&mut self.board, digit, self.features.tone_ms());

        if !self.state.session.is_full() {
            self.state.session.push(digit);
            let digits = *self.state.session.digits();
            self.persist(REDIAL_SLOT, &digits);
        }
    }

    fn special_l1(&mut self, digit: Digit) {
        if digit == config::KEY_STAR {
            self.state.pending = Some(Digit::Star);
        } else if digit == config::KEY_POUND {
            self.state.pending = Some(Digit::Pound);
        } else if digit == config::KEY_REDIAL {
            self.replay(REDIAL_SLOT);
        } else if let Some(slot) = slot_for_digit(digit) {
            self.replay(slot);
        }
        self.set_mode(self.state.prior);
    }

    fn special_l2(&mut self, digit: Digit) {
        if let Some(slot) = slot_for_digit(digit) {
            self.state.program.clear();
            self.state.program_slot = slot;
            rt_info!(self.shared.log, self.shared.clock.now(), "programming slot {}", slot);
            self.set_mode(Mode::ProgramSpeedDial);
            return;
        }

        if digit == config::KEY_HOTLINE {
            self.toggle_hotline();
        } else if digit == config::KEY_TONE_DURATION {
            self.advance_tone_duration();
        }
        self.set_mode(Mode::Dial);
    }

    fn program(&mut self, digit: Digit) {
        if self.state.program.is_full() {
            self.set_mode(Mode::Dial);
            self.generator
                .generate_tone(&mut self.board, Digit::TuneDesc, PROGRAM_DONE_MS);
            return;
        }

        self.state.program.push(digit);
        // Write-through so a hang-up keeps what was entered so far.
        let slot = self.state.program_slot;
        let digits = *self.state.program.digits();
        self.persist(slot, &digits);
        self.generator
            .generate_tone(&mut self.board, Digit::BeepLow, self.features.tone_ms());
    }

    fn toggle_hotline(&mut self) {
        let change = self.features.toggle_hotline();
        match change {
            HotlineChange::Enabled { delay_s } => {
                self.generator
                    .generate_tone(&mut self.board, Digit::TuneAsc2, MENU_TUNE_MS);
                self.generator.silence(&mut self.board, MENU_GAP_MS);
                self.beep_count(Digit::BeepLow, delay_s);
            }
            HotlineChange::Delay { delay_s } => {
                self.beep_count(Digit::BeepLow, delay_s);
            }
            HotlineChange::Disabled => {
                self.generator
                    .generate_tone(&mut self.board, Digit::TuneDesc2, MENU_TUNE_MS);
            }
        }
        rt_info!(
            self.shared.log,
            self.shared.clock.now(),
            "hotline: {:?}",
            change
        );

        if let Err(e) = self.features.save_hotline(self.store.backend_mut()) {
            self.shared.diag.record(DiagCode::StoreFailure, config::FEATURE_ADDR as u32);
            rt_error!(self.shared.log, self.shared.clock.now(), "save hotline: {}", e);
        }
    }

    fn advance_tone_duration(&mut self) {
        let unit = self.features.advance_tone_unit();
        self.beep_count(Digit::Beep, unit);
        rt_info!(
            self.shared.log,
            self.shared.clock.now(),
            "tone duration: {}ms",
            self.features.tone_ms()
        );

        if let Err(e) = self.features.save_tone_unit(self.store.backend_mut()) {
            self.shared.diag.record(DiagCode::StoreFailure, config::TONE_UNIT_ADDR as u32);
            rt_error!(self.shared.log, self.shared.clock.now(), "save tone unit: {}", e);
        }
    }

    /// Beep out a small number.
    fn beep_count(&mut self, beep: Digit, count: u8) {
        for _ in 0..count {
            self.generator.generate_tone(&mut self.board, beep, MENU_BEEP_MS);
            self.generator.silence(&mut self.board, MENU_GAP_MS);
        }
    }

    fn replay(&mut self, slot: u8) {
        match self
            .store
            .replay(slot, &self.generator, &mut self.board, self.features.tone_ms())
        {
            Ok(dialed) => {
                rt_debug!(self.shared.log, self.shared.clock.now(), "slot {}: {} digits", slot, dialed);
            }
            Err(e) => {
                self.shared.diag.record(DiagCode::StoreFailure, slot as u32);
                rt_error!(self.shared.log, self.shared.clock.now(), "replay slot {}: {}", slot, e);
            }
        }
    }

    fn persist(&mut self, slot: u8, digits: &SpeedDialSlot<N>) {
        match self.store.write(slot, digits) {
            Ok(true) => {}
            Ok(false) => {
                self.shared.diag.record(DiagCode::SlotOutOfRange, slot as u32);
                rt_warn!(self.shared.log, self.shared.clock.now(), "slot {} out of range", slot);
            }
            Err(e) => {
                self.shared.diag.record(DiagCode::StoreFailure, slot as u32);
                rt_error!(self.shared.log, self.shared.clock.now(), "write slot {}: {}", slot, e);
            }
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.state.mode != mode {
            rt_info!(
                self.shared.log,
                self.shared.clock.now(),
                "mode {} -> {}",
                self.state.mode.as_str(),
                mode.as_str()
            );
            self.state.mode = mode;
        }
    }

    /// Bounded nap on the wake timer; any interrupt ends it early.
    fn nap(&mut self, interval: WakeInterval) {
        self.shared.signals.clear_wake();
        self.board.arm(interval);
        self.board.power_down();
        self.board.disarm();
        self.shared.signals.clear_wake();
    }

    /// Sleep through one dwell window and enter the next special mode if it
    /// expired undisturbed.
    fn wait_dwell(&mut self, level: DwellLevel) {
        self.shared.signals.clear_wake();
        self.board.arm(DWELL_WINDOW);
        self.board.power_down();
        self.board.disarm();

        if !self.shared.signals.take_expiry(level) {
            return;
        }

        match level {
            DwellLevel::First => {
                if matches!(self.state.mode, Mode::Dial | Mode::ProgramSpeedDial) {
                    self.state.prior = self.state.mode;
                }
                self.set_mode(Mode::SpecialL1);
                self.confirm(Digit::BeepLow, L1_CONFIRM_MS);
            }
            DwellLevel::Second => {
                self.set_mode(Mode::SpecialL2);
                self.confirm(Digit::TuneAsc, L2_CONFIRM_MS);
            }
        }
    }

    /// Acknowledgement tone with dwell detection held off.
    fn confirm(&mut self, digit: Digit, duration_ms: u16) {
        let saved = self.shared.signals.suspend_dwell();
        self.generator.generate_tone(&mut self.board, digit, duration_ms);
        self.shared.signals.resume_dwell(saved);
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    #[inline]
    pub fn state(&self) -> &RunState<N> {
        &self.state
    }

    #[inline]
    pub fn features(&self) -> &FeatureConfig {
        &self.features
    }

    #[inline]
    pub fn store(&self) -> &SpeedDialStore<S, N> {
        &self.store
    }

    #[inline]
    pub fn board(&self) -> &B {
        &self.board
    }

    #[inline]
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }
}
