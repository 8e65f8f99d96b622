/// Declares a `static ENGINE` singleton suitable for sharing a
/// [`crate::engine::SinkEngine`] between a pulse-capture ISR and task code.
///
/// # Example
/// ```rust
/// usbpd_sink::init_sink_engine!();
/// ```
#[macro_export]
macro_rules! init_sink_engine {
    () => {
        pub static SINK_ENGINE: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::engine::SinkEngine>>,
        > = $crate::timer::global_engine_init();
    };
}

/// Installs a fresh [`crate::engine::SinkEngine`] into the `SINK_ENGINE`
/// singleton declared by [`init_sink_engine!`].
///
/// # Example
/// ```rust
/// usbpd_sink::init_sink_engine!();
/// usbpd_sink::setup_sink_engine!(usbpd_sink::config::Config::default());
/// ```
#[macro_export]
macro_rules! setup_sink_engine {
    ( $config:expr ) => {
        $crate::timer::global_engine_setup(&SINK_ENGINE, $config)
    };
}

/// Feeds one pulse duration to the `SINK_ENGINE` singleton from interrupt
/// context.
///
/// # Example
/// ```rust
/// usbpd_sink::init_sink_engine!();
/// usbpd_sink::setup_sink_engine!(usbpd_sink::config::Config::default());
/// usbpd_sink::sink_engine_on_pulse!(16);
/// ```
#[macro_export]
macro_rules! sink_engine_on_pulse {
    ( $duration:expr ) => {
        $crate::timer::global_engine_on_pulse(&SINK_ENGINE, $duration)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_wire_up_a_working_singleton() {
        use crate::config::Config;
        init_sink_engine!();
        setup_sink_engine!(Config::default());
        sink_engine_on_pulse!(16);
        critical_section::with(|cs| {
            assert!(SINK_ENGINE.borrow(cs).borrow().is_some());
        });
    }
}
