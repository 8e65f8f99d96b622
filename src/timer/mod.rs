//! `critical_section` glue binding a [`crate::engine::SinkEngine`] to
//! interrupt-context callers.
//!
//! The reference firmware drives its protocol state machine from an RMT
//! peripheral ISR; this module provides a `Mutex<RefCell<_>>` singleton
//! pattern so a [`crate::engine::SinkEngine`] can be shared between that
//! ISR and task code without an allocator or a scheduler. Everything here
//! requires the `timer-isr` feature.

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
