//! Port pin configuration: Idle vs. Sink drive modes for the CC line.
//!
//! Grounded in the reference's `pd_mode`: entering `PD_MODE_IDLE` releases
//! the CC line to a plain input so the port draws no power while
//! disconnected, while `PD_MODE_SINK` drives the Rp/Rd signaling needed to
//! present as a sink and turns on the line driver used for transmitting.
//! `embedded-hal`'s split `InputPin`/`OutputPin` traits mean a single
//! bidirectional CC pin can't be modeled as one type; this module instead
//! takes a dedicated drive-enable output and a separate CC sense input, the
//! same kind of two-pin split the teacher crate uses for its modem's TX/RX
//! pair.

use embedded_hal::digital::{InputPin, OutputPin};

/// Logical port configuration, mirroring the reference's `pd_mode_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortMode {
    /// CC line released to a high-impedance input. No drive, no signaling.
    #[default]
    Idle,
    /// Actively presenting as a sink: the drive-enable output is held low
    /// (Rd asserted) and the CC sense input is ready to receive BMC pulses.
    Sink,
}

/// A USB-PD port's pin pair: a drive-enable output and a CC sense input.
#[derive(Debug)]
pub struct Port<EN, CC>
where
    EN: OutputPin,
    CC: InputPin,
{
    enable: EN,
    cc: CC,
    mode: PortMode,
}

impl<EN, CC> Port<EN, CC>
where
    EN: OutputPin,
    CC: InputPin,
{
    /// Wraps the given pins, starting in [`PortMode::Idle`].
    pub fn new(enable: EN, cc: CC) -> Self {
        let mut port = Port {
            enable,
            cc,
            mode: PortMode::Idle,
        };
        port.enter_idle();
        port
    }

    /// Current logical mode.
    pub fn mode(&self) -> PortMode {
        self.mode
    }

    /// Releases the drive-enable output, matching `pd_mode(PD_MODE_IDLE)`.
    pub fn enter_idle(&mut self) {
        let _ = self.enable.set_low();
        self.mode = PortMode::Idle;
    }

    /// Drives the enable output low (Rd asserted) and prepares the CC line
    /// for BMC reception, matching `pd_mode(PD_MODE_SINK)`.
    pub fn enter_sink(&mut self) {
        let _ = self.enable.set_low();
        self.mode = PortMode::Sink;
    }

    /// Samples the CC sense input. Only meaningful in [`PortMode::Sink`].
    pub fn cc_high(&mut self) -> bool {
        self.cc.is_high().unwrap_or(false)
    }

    /// Releases ownership of the wrapped pins.
    pub fn release(self) -> (EN, CC) {
        (self.enable, self.cc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn new_port_starts_idle() {
        let enable = PinMock::new(&[PinTransaction::set(PinState::Low)]);
        let cc = PinMock::new(&[]);
        let mut port = Port::new(enable, cc);
        assert_eq!(port.mode(), PortMode::Idle);
        let (mut enable, mut cc) = port.release();
        enable.done();
        cc.done();
    }

    #[test]
    fn enter_sink_switches_mode_and_drives_enable_low() {
        let enable = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let cc = PinMock::new(&[PinTransaction::get(PinState::High)]);
        let mut port = Port::new(enable, cc);
        port.enter_sink();
        assert_eq!(port.mode(), PortMode::Sink);
        assert!(port.cc_high());
        let (mut enable, mut cc) = port.release();
        enable.done();
        cc.done();
    }

    #[test]
    fn enter_idle_after_sink_returns_to_idle() {
        let enable = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let cc = PinMock::new(&[]);
        let mut port = Port::new(enable, cc);
        port.enter_sink();
        port.enter_idle();
        assert_eq!(port.mode(), PortMode::Idle);
        let (mut enable, mut cc) = port.release();
        enable.done();
        cc.done();
    }
}
