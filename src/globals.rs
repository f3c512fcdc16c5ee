//! Interrupt-shared global instances.
//!
//! Everything an interrupt handler touches lives here as a `static` built
//! from atomics, so handlers need no locks and no `static mut`.
//!
//! | Static       | Written by                 | Read by            |
//! |--------------|----------------------------|--------------------|
//! | `ENGINE`     | tick ISR (phases), loop    | tick ISR           |
//! | `CLOCK`      | tick ISR                   | loop               |
//! | `SIGNALS`    | edge/wake ISRs, loop       | loop               |
//! | `DIAG`       | loop                       | log drain          |
//! | `LOG_STREAM` | loop                       | log drain          |

use crate::audio::ToneEngine;
use crate::config::DialerConfig;
use crate::diag::DiagState;
use crate::dialer::Shared;
use crate::logging::LogStream;
use crate::signals::DialSignals;
use crate::timing::TickClock;

pub static ENGINE: ToneEngine = ToneEngine::new();

pub static CLOCK: TickClock = TickClock::new();

pub static SIGNALS: DialSignals = DialSignals::new(DialerConfig::DEFAULT_DEBOUNCE_MS);

pub static DIAG: DiagState = DiagState::new();

/// Control loop log stream, drained between dial events.
pub static LOG_STREAM: LogStream = LogStream::new();

/// The globals bundled for `Dialer::new`.
pub fn shared() -> Shared<'static> {
    Shared {
        engine: &ENGINE,
        clock: &CLOCK,
        signals: &SIGNALS,
        log: &LOG_STREAM,
        diag: &DIAG,
    }
}
