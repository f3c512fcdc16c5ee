//! RotaryToneDialer - Main entry point
//!
//! Firmware flow:
//! 1. Take peripherals, build the board (PWM, dial inputs, timers, log UART)
//! 2. Open NVS; fall back to a RAM-only image if it is unusable
//! 3. Boot the dialer (config repair, hotline auto-dial)
//! 4. Run the control loop, draining the log ring between passes
//!
//! On a non-ESP host this binary only points at the test suite.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::sys::{self as esp_idf_sys, EspError};

    use rotary_tone_dialer::config::nvs::NvsStore;
    use rotary_tone_dialer::config::DialerConfig;
    use rotary_tone_dialer::globals::{self, CLOCK, DIAG, LOG_STREAM};
    use rotary_tone_dialer::hal::board::EspBoard;
    use rotary_tone_dialer::log_drain::{drain_into, format_diag, LINE_BUF_LEN};
    use rotary_tone_dialer::{rt_error, rt_info, Dialer};

    fn open_store() -> NvsStore {
        match NvsStore::open_default() {
            Ok((store, result)) => {
                rt_info!(LOG_STREAM, CLOCK.now(), "nvs: {:?}", result);
                store
            }
            Err(e) => {
                rt_error!(LOG_STREAM, CLOCK.now(), "nvs: {}, running from RAM", e);
                NvsStore::detached()
            }
        }
    }

    pub fn run() -> Result<(), EspError> {
        let peripherals = Peripherals::take()?;
        let mut board = EspBoard::take(peripherals)?;
        let banner = concat!(env!("VERSION_STRING"), " (", env!("GIT_HASH"), ")\n");
        board.write_log(banner.as_bytes());

        let store = open_store();
        let mut dialer: Dialer<'static, EspBoard, NvsStore> =
            Dialer::new(board, store, DialerConfig::default(), globals::shared());
        dialer.boot();

        let mut reported = 0u32;
        dialer.run(|dialer| {
            let board = dialer.board_mut();
            drain_into(&LOG_STREAM, |line| board.write_log(line));

            let total = DIAG.total();
            if total != reported {
                let mut line = [0u8; LINE_BUF_LEN];
                let len = format_diag(&DIAG.snapshot(), &mut line);
                board.write_log(&line[..len]);
                reported = total;
            }
        })
    }

    #[no_mangle]
    fn main() {
        esp_idf_sys::link_patches();

        if run().is_err() {
            // Peripherals unusable: nothing can be signalled, retry from reset
            unsafe {
                esp_idf_sys::vTaskDelay(1000);
                esp_idf_sys::esp_restart();
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!(
        "{} ({}) is ESP-IDF firmware; run `cargo test` for the host suite.",
        env!("VERSION_STRING"),
        env!("GIT_HASH")
    );
}
