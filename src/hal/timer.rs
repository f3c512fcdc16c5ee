//! Sample tick and one-shot wake timer.
//!
//! - `SampleTimer`: hardware timer with an ISR every 64 µs. Each tick
//!   advances the DDS, writes the sample to PWM and bumps the tick clock.
//!   It is paused during power-down.
//! - `WakeAlarm`: esp_timer one-shot for contact settling and dwell
//!   windows. Expiry raises `SIGNALS.on_wake()` and wakes the control loop.

extern crate alloc;

use alloc::sync::Arc;
use core::num::NonZeroU32;
use core::time::Duration;

use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::task::notification::Notifier;
use esp_idf_svc::hal::timer::config::Config as TimerConfig;
use esp_idf_svc::hal::timer::{Timer, TimerDriver};
use esp_idf_svc::sys::EspError;
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};

use super::pwm;
use crate::audio::tones::SAMPLE_RATE_HZ;
use crate::globals::{CLOCK, ENGINE, SIGNALS};
use crate::timing::WakeInterval;

/// Periodic sample tick driving the synthesizer.
pub struct SampleTimer<'d> {
    driver: TimerDriver<'d>,
    running: bool,
}

impl<'d> SampleTimer<'d> {
    pub fn new<T: Timer>(timer: impl Peripheral<P = T> + 'd) -> Result<Self, EspError> {
        let mut driver = TimerDriver::new(timer, &TimerConfig::new().auto_reload(true))?;
        let period = driver.tick_hz() / SAMPLE_RATE_HZ as u64;
        driver.set_alarm(period)?;

        // SAFETY: The callback only touches atomics and the LEDC duty
        // register.
        unsafe {
            driver.subscribe(|| {
                pwm::write_sample(ENGINE.tick());
                CLOCK.tick();
            })?;
        }
        driver.enable_interrupt()?;
        driver.enable_alarm(true)?;

        let mut timer = Self {
            driver,
            running: false,
        };
        timer.resume()?;
        Ok(timer)
    }

    pub fn pause(&mut self) -> Result<(), EspError> {
        if self.running {
            self.driver.enable(false)?;
            self.running = false;
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EspError> {
        if !self.running {
            self.driver.enable(true)?;
            self.running = true;
        }
        Ok(())
    }
}

/// Coarse one-shot wake timer.
pub struct WakeAlarm {
    timer: EspTimer<'static>,
}

impl WakeAlarm {
    pub fn new(notifier: Arc<Notifier>) -> Result<Self, EspError> {
        let service = EspTaskTimerService::new()?;
        let timer = service.timer(move || {
            SIGNALS.on_wake();
            // SAFETY: Notifier is safe to use from the timer task.
            unsafe {
                let _ = notifier.notify_and_yield(NonZeroU32::MIN);
            }
        })?;
        Ok(Self { timer })
    }

    pub fn arm(&mut self, interval: WakeInterval) -> Result<(), EspError> {
        self.timer.after(Duration::from_micros(interval.as_micros()))
    }

    pub fn disarm(&mut self) -> Result<(), EspError> {
        self.timer.cancel().map(|_| ())
    }
}
