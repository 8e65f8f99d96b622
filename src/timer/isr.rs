use core::cell::RefCell;
use critical_section::Mutex;

use crate::config::Config;
use crate::engine::SinkEngine;

/// Creates the empty ref-cell a global static `SinkEngine` singleton wraps.
///
/// # Example
/// ```rust
/// use usbpd_sink::engine::SinkEngine;
/// use core::cell::RefCell;
/// use critical_section::Mutex;
/// use usbpd_sink::timer::global_engine_init;
///
/// static ENGINE: Mutex<RefCell<Option<SinkEngine>>> = global_engine_init();
/// ```
pub const fn global_engine_init() -> Mutex<RefCell<Option<SinkEngine>>> {
    Mutex::new(RefCell::new(None))
}

/// Installs a freshly built [`SinkEngine`] into the global singleton,
/// replacing whatever was there (a reconnect or Hard Reset).
///
/// # Example
/// ```rust
/// use usbpd_sink::config::Config;
/// use usbpd_sink::engine::SinkEngine;
/// use core::cell::RefCell;
/// use critical_section::Mutex;
/// use usbpd_sink::timer::{global_engine_init, global_engine_setup};
///
/// static ENGINE: Mutex<RefCell<Option<SinkEngine>>> = global_engine_init();
///
/// fn main() {
///     global_engine_setup(&ENGINE, Config::default());
/// }
/// ```
pub fn global_engine_setup(global: &'static Mutex<RefCell<Option<SinkEngine>>>, config: Config) {
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(SinkEngine::new(config)));
    });
}

/// Feeds one captured pulse duration (tenths of a microsecond) to the
/// global engine. Call from the pulse-capture ISR.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn RMT() {
///     global_engine_on_pulse(&ENGINE, read_pulse_duration());
/// }
/// ```
pub fn global_engine_on_pulse(global: &'static Mutex<RefCell<Option<SinkEngine>>>, duration_tenth_us: u32) {
    critical_section::with(|cs| {
        if let Some(engine) = global.borrow(cs).borrow_mut().as_mut() {
            engine.on_pulse(duration_tenth_us);
        }
    });
}

/// Drains one finished frame from the global engine's protocol queue, if
/// one is ready, applying its effect on the negotiated contract and
/// returning the buffer slot to the pool.
///
/// # Example
/// ```rust
/// use usbpd_sink::config::Config;
/// use usbpd_sink::engine::SinkEngine;
/// use core::cell::RefCell;
/// use critical_section::Mutex;
/// use usbpd_sink::timer::{global_engine_init, global_engine_setup, poll_global_engine};
///
/// static ENGINE: Mutex<RefCell<Option<SinkEngine>>> = global_engine_init();
///
/// fn main() {
///     global_engine_setup(&ENGINE, Config::default());
///     let _ = poll_global_engine(&ENGINE);
/// }
/// ```
pub fn poll_global_engine(global: &'static Mutex<RefCell<Option<SinkEngine>>>) -> Option<usize> {
    critical_section::with(|cs| {
        let mut guard = global.borrow(cs).borrow_mut();
        guard.as_mut()?.poll_protocol()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_installs_a_fresh_engine() {
        static ENGINE: Mutex<RefCell<Option<SinkEngine>>> = global_engine_init();
        global_engine_setup(&ENGINE, Config::default());
        critical_section::with(|cs| {
            assert!(ENGINE.borrow(cs).borrow().is_some());
        });
    }

    #[test]
    fn on_pulse_is_a_no_op_before_setup() {
        static ENGINE: Mutex<RefCell<Option<SinkEngine>>> = global_engine_init();
        global_engine_on_pulse(&ENGINE, 16);
        critical_section::with(|cs| {
            assert!(ENGINE.borrow(cs).borrow().is_none());
        });
    }

    #[test]
    fn poll_returns_none_when_idle() {
        static ENGINE: Mutex<RefCell<Option<SinkEngine>>> = global_engine_init();
        global_engine_setup(&ENGINE, Config::default());
        assert!(poll_global_engine(&ENGINE).is_none());
    }
}
