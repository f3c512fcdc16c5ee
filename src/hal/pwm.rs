//! PWM audio output on LEDC.
//!
//! The LEDC channel runs at 10× the sample rate with 8-bit resolution
//! (0..=255 covers the 0..=223 mixer range without scaling). The sample
//! tick ISR writes one duty value per tick through the raw driver calls;
//! the control loop only toggles `OUTPUT_ENABLED`.
//!
//! ```text
//! GPIO ──[R]──┬──▶ line / earpiece
//!            [C]
//!             ┴
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::ledc::config::TimerConfig;
use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, CHANNEL0, TIMER0};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::{self, EspError};

use crate::audio::tones::SAMPLE_RATE_HZ;

/// PWM carrier frequency.
pub const PWM_FREQ_HZ: u32 = SAMPLE_RATE_HZ * 10;

/// Set while a tone is playing; the tick ISR writes duty only then.
static OUTPUT_ENABLED: AtomicBool = AtomicBool::new(false);

/// Write one sample to the duty register.
///
/// ISR only. Does nothing while the output is stopped.
#[inline]
pub fn write_sample(sample: u8) {
    if !OUTPUT_ENABLED.load(Ordering::Acquire) {
        return;
    }
    // SAFETY: Channel 0 is configured by `PwmOut::new` before the sample
    // timer is started; the ISR is the only duty writer while enabled.
    unsafe {
        sys::ledc_set_duty(
            sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
            sys::ledc_channel_t_LEDC_CHANNEL_0,
            sample as u32,
        );
        sys::ledc_update_duty(
            sys::ledc_mode_t_LEDC_LOW_SPEED_MODE,
            sys::ledc_channel_t_LEDC_CHANNEL_0,
        );
    }
}

/// Owner of the LEDC timer and channel.
pub struct PwmOut<'d> {
    _timer: LedcTimerDriver<'d>,
    channel: LedcDriver<'d>,
}

impl<'d> PwmOut<'d> {
    pub fn new(
        timer: impl Peripheral<P = TIMER0> + 'd,
        channel: impl Peripheral<P = CHANNEL0> + 'd,
        pin: impl Peripheral<P = impl OutputPin> + 'd,
    ) -> Result<Self, EspError> {
        let timer = LedcTimerDriver::new(
            timer,
            &TimerConfig::default()
                .frequency(Hertz(PWM_FREQ_HZ))
                .resolution(Resolution::Bits8),
        )?;
        let mut channel = LedcDriver::new(channel, &timer, pin)?;
        channel.set_duty(0)?;
        Ok(Self {
            _timer: timer,
            channel,
        })
    }

    pub fn start(&mut self) {
        OUTPUT_ENABLED.store(true, Ordering::Release);
    }

    /// Stop writing samples and park the pin low.
    pub fn stop(&mut self) {
        OUTPUT_ENABLED.store(false, Ordering::Release);
        let _ = self.channel.set_duty(0);
    }
}
