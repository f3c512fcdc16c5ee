//! # RotaryToneDialer
//!
//! Rotary dial pulse to DTMF/MF tone converter with speed-dial memory.
//!
//! ## Architecture
//!
//! ```text
//! dial/pulse edges ──▶ DialSignals ──▶ DialDecoder ──▶ Dialer ──▶ ToneGenerator
//!   (edge ISR)          (atomics)                    (state     (blocks on the
//!                                                     machine)   tick clock)
//! sample tick ISR ──▶ ToneEngine::tick ──▶ PWM duty      │
//!                 └─▶ TickClock::tick                    ▼
//!                                                  SpeedDialStore / FeatureConfig
//!                                                       (ByteStore)
//! ```
//!
//! Interrupts only perform single atomic updates; every multi-field
//! transition happens in the control loop. The library is `no_std` and
//! hardware-free; ESP-IDF bindings live in `hal` and `config::nvs` and are
//! compiled only for `target_os = "espidf"`.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod config;
pub mod decoder;
pub mod diag;
pub mod dialer;
pub mod digit;
pub mod globals;
pub mod hal;
pub mod log_drain;
pub mod logging;
pub mod signals;
pub mod timing;

pub use audio::{ToneEngine, ToneGenerator};
pub use config::{DialerConfig, FeatureConfig};
pub use decoder::{decode_pulses, DialDecoder, DialMapping};
pub use diag::{DiagCode, DiagState};
pub use dialer::{Dialer, Mode, Shared};
pub use digit::Digit;
pub use signals::DialSignals;
pub use timing::TickClock;
