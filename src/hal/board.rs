//! ESP32 board: pin map and the `Board` trait implementation.
//!
//! | Signal       | ESP32-S3 | ESP32-C3 |
//! |--------------|----------|----------|
//! | dial active  | GPIO4    | GPIO2    |
//! | pulse        | GPIO5    | GPIO3    |
//! | audio (PWM)  | GPIO6    | GPIO4    |
//! | log UART TX  | GPIO17   | GPIO21   |
//!
//! The control loop blocks on a FreeRTOS task notification. Edge and wake
//! callbacks notify it; short waits (`idle`) also time out after one RTOS
//! tick so tone countdowns keep being re-checked against the sample clock.

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::task::notification::Notification;
use esp_idf_svc::hal::uart::{self, UartTxDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use super::gpio::DialInputs;
use super::pwm::PwmOut;
use super::timer::{SampleTimer, WakeAlarm};
use super::{AudioSink, DialLine, LowPower, WakeTimer};
use crate::timing::WakeInterval;

#[cfg(not(feature = "esp32c3"))]
type DialPin = esp_idf_svc::hal::gpio::Gpio4;
#[cfg(not(feature = "esp32c3"))]
type PulsePin = esp_idf_svc::hal::gpio::Gpio5;

#[cfg(feature = "esp32c3")]
type DialPin = esp_idf_svc::hal::gpio::Gpio2;
#[cfg(feature = "esp32c3")]
type PulsePin = esp_idf_svc::hal::gpio::Gpio3;

/// Log UART baud rate.
pub const LOG_BAUD: u32 = 115_200;

/// All dialer peripherals.
pub struct EspBoard {
    log_tx: UartTxDriver<'static>,
    notification: Notification,
    inputs: DialInputs<'static, DialPin, PulsePin>,
    pwm: PwmOut<'static>,
    sample_timer: SampleTimer<'static>,
    wake: WakeAlarm,
}

impl EspBoard {
    pub fn take(peripherals: Peripherals) -> Result<Self, EspError> {
        let notification = Notification::new();
        let pins = peripherals.pins;

        #[cfg(not(feature = "esp32c3"))]
        let (dial, pulse, audio, log_pin) = (pins.gpio4, pins.gpio5, pins.gpio6, pins.gpio17);
        #[cfg(feature = "esp32c3")]
        let (dial, pulse, audio, log_pin) = (pins.gpio2, pins.gpio3, pins.gpio4, pins.gpio21);

        let log_tx = UartTxDriver::new(
            peripherals.uart1,
            log_pin,
            Option::<AnyIOPin>::None, // CTS
            Option::<AnyIOPin>::None, // RTS
            &uart::config::Config::default().baudrate(Hertz(LOG_BAUD)),
        )?;

        let pwm = PwmOut::new(peripherals.ledc.timer0, peripherals.ledc.channel0, audio)?;
        let inputs = DialInputs::new(dial, pulse, notification.notifier())?;
        let wake = WakeAlarm::new(notification.notifier())?;
        let sample_timer = SampleTimer::new(peripherals.timer00)?;

        Ok(Self {
            log_tx,
            notification,
            inputs,
            pwm,
            sample_timer,
            wake,
        })
    }

    /// Write one formatted log line; blocks until queued in the UART FIFO.
    pub fn write_log(&mut self, line: &[u8]) {
        let _ = self.log_tx.write(line);
    }
}

impl AudioSink for EspBoard {
    fn start(&mut self) {
        self.pwm.start();
    }

    fn stop(&mut self) {
        self.pwm.stop();
    }
}

impl LowPower for EspBoard {
    fn idle(&mut self) {
        let _ = self.inputs.rearm();
        self.notification.wait(1);
    }

    fn power_down(&mut self) {
        let _ = self.inputs.rearm();
        let _ = self.sample_timer.pause();
        self.notification.wait(BLOCK);
        let _ = self.sample_timer.resume();
    }
}

impl WakeTimer for EspBoard {
    fn arm(&mut self, interval: WakeInterval) {
        let _ = self.wake.arm(interval);
    }

    fn disarm(&mut self) {
        let _ = self.wake.disarm();
    }
}

impl DialLine for EspBoard {
    fn is_dialing(&mut self) -> bool {
        self.inputs.is_dialing()
    }
}
