//! # usbpd-sink
//!
//! A portable, `no_std` USB Power Delivery sink (UFP) protocol engine.
//!
//! This crate implements the parts of a USB-PD sink needed to negotiate a
//! fixed or PPS contract over CC without a full USB-PD stack:
//! - BMC (Biphase Mark Coding) line modulation with 4b5b symbol coding
//! - SOP*/Hard Reset/Cable Reset framing
//! - the GoodCRC acknowledgment protocol with mod-8 message IDs
//! - CRC-32 framing, PDO parsing, and VDM header decomposition
//! - a small sink policy state machine that selects and requests a PDO
//!
//! ## Crate features
//! | Feature                | Description |
//! |-------------------------|-------------|
//! | `std`                  | Disables `#![no_std]` and enables `std`-backed error/logging support |
//! | `timer-isr` (default)  | `critical_section`-guarded globals for sharing a [`engine::SinkEngine`] with an ISR |
//! | `defmt-0-3`             | Uses `defmt` logging |
//! | `log`                   | Uses `log` logging |
//!
//! ## Usage
//!
//! ```rust
//! use usbpd_sink::engine::SinkEngine;
//! use usbpd_sink::config::Config;
//!
//! let mut engine = SinkEngine::new(Config::default());
//! // Feed captured pulse durations (tenths of a microsecond) as they arrive:
//! engine.on_pulse(16);
//! engine.on_pulse(33);
//! // Drain any frame the RX framer finished assembling:
//! let _ = engine.poll_protocol();
//! ```
//!
//! Sharing one [`engine::SinkEngine`] between a pulse-capture ISR and task
//! code uses the `timer` module's `critical_section::Mutex<RefCell<_>>`
//! singleton, set up with [`init_sink_engine!`]/[`setup_sink_engine!`].
//!
//! ## Status
//!
//! This crate is in early development. Contributions welcome!
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

#[cfg(all(feature = "timer-isr", not(feature = "std")))]
pub use heapless;

pub mod buffer;
pub mod config;
pub mod consts;
pub(crate) mod crc;
pub mod engine;
pub mod error;
pub mod goodcrc;
pub mod io;
pub mod line_code;
pub mod logging;
pub mod message;
pub mod policy;
pub mod port;
pub mod rx;
pub mod sop;
pub mod timer;
pub mod tx;
pub mod vdm;

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::engine::SinkEngine;

    #[test]
    fn engine_accepts_pulses_and_stays_idle_without_a_frame() {
        let mut engine = SinkEngine::new(Config::default());
        for _ in 0..8 {
            engine.on_pulse(16);
        }
        assert!(!engine.port_state().connected);
        assert!(engine.poll_protocol().is_none());
    }

    #[cfg(feature = "timer-isr")]
    mod macros {
        use crate::config::Config;

        #[test]
        fn setup_and_pulse_macros_drive_a_shared_engine() {
            use crate::{init_sink_engine, setup_sink_engine, sink_engine_on_pulse};
            init_sink_engine!();
            setup_sink_engine!(Config::default());
            sink_engine_on_pulse!(16);
            critical_section::with(|cs| {
                assert!(SINK_ENGINE.borrow(cs).borrow().is_some());
            });
        }
    }
}
