//! Dial-active and pulse inputs.
//!
//! Both lines idle high on internal pull-ups; the dial contacts pull them
//! to ground. Dial-active is low while the dial is off its rest position.
//! A pulse is counted on each falling edge of the pulse line.
//!
//! esp-idf-hal disables a pin interrupt after it fires, so the control loop
//! calls `rearm()` before every wait.

extern crate alloc;

use alloc::sync::Arc;
use core::num::NonZeroU32;

use esp_idf_svc::hal::gpio::{Input, InputPin, InterruptType, OutputPin, PinDriver, Pull};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::task::notification::Notifier;
use esp_idf_svc::sys::{self, EspError};

use crate::globals::SIGNALS;

/// Milliseconds since boot, usable from interrupt context.
#[inline]
fn now_ms() -> u32 {
    // SAFETY: esp_timer_get_time is ISR-safe
    (unsafe { sys::esp_timer_get_time() } / 1000) as u32
}

/// The two dial lines with their edge handlers installed.
pub struct DialInputs<'d, D: InputPin + OutputPin, P: InputPin + OutputPin> {
    dial: PinDriver<'d, D, Input>,
    pulse: PinDriver<'d, P, Input>,
}

impl<'d, D: InputPin + OutputPin, P: InputPin + OutputPin> DialInputs<'d, D, P> {
    /// Configure both pins and wire their edges to `SIGNALS` and `notifier`.
    pub fn new(
        dial: impl Peripheral<P = D> + 'd,
        pulse: impl Peripheral<P = P> + 'd,
        notifier: Arc<Notifier>,
    ) -> Result<Self, EspError> {
        let mut dial = PinDriver::input(dial)?;
        dial.set_pull(Pull::Up)?;
        dial.set_interrupt_type(InterruptType::AnyEdge)?;

        let mut pulse = PinDriver::input(pulse)?;
        pulse.set_pull(Pull::Up)?;
        pulse.set_interrupt_type(InterruptType::NegEdge)?;

        let dial_notifier = notifier.clone();
        // SAFETY: The callbacks only touch atomics and the task notifier.
        unsafe {
            dial.subscribe(move || {
                let _ = dial_notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
            pulse.subscribe(move || {
                SIGNALS.on_pulse_edge(now_ms());
                let _ = notifier.notify_and_yield(NonZeroU32::MIN);
            })?;
        }

        let mut inputs = Self { dial, pulse };
        inputs.rearm()?;
        Ok(inputs)
    }

    /// Re-enable both edge interrupts.
    pub fn rearm(&mut self) -> Result<(), EspError> {
        self.dial.enable_interrupt()?;
        self.pulse.enable_interrupt()
    }

    #[inline]
    pub fn is_dialing(&self) -> bool {
        self.dial.is_low()
    }
}
