//! Hardware Abstraction Layer for the rotary dialer.
//!
//! The core only talks to hardware through these traits.
//! Business logic stays in core modules, HAL is just I/O.
//! ESP-IDF implementations live in the submodules and are compiled
//! only for `target_os = "espidf"`.

use crate::timing::WakeInterval;

#[cfg(target_os = "espidf")]
pub mod board;
#[cfg(target_os = "espidf")]
pub mod gpio;
#[cfg(target_os = "espidf")]
pub mod pwm;
#[cfg(target_os = "espidf")]
pub mod timer;

/// Duty-cycle audio output.
///
/// The sample tick writes one amplitude byte per tick while the sink is
/// started; a stopped sink holds its pin low.
pub trait AudioSink {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Low-power waits. Both return after any interrupt.
pub trait LowPower {
    /// Light idle: the sample tick keeps running and wakes the caller.
    fn idle(&mut self);
    /// Deep sleep: only line edges and the wake timer resume execution.
    fn power_down(&mut self);
}

/// Coarse one-shot wake timer. Expiry raises `DialSignals::on_wake`.
pub trait WakeTimer {
    fn arm(&mut self, interval: WakeInterval);
    fn disarm(&mut self);
}

/// Level of the dial-active line.
pub trait DialLine {
    /// True while the dial is off its rest position.
    fn is_dialing(&mut self) -> bool;
}

/// Everything the control loop needs from the board.
pub trait Board: AudioSink + LowPower + WakeTimer + DialLine {}

impl<T: AudioSink + LowPower + WakeTimer + DialLine> Board for T {}
