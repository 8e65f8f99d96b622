//! Sink policy: tracks the negotiated contract and decides what to
//! request from the source's advertised capabilities.
//!
//! This is the Rust counterpart of the reference's `pd_state_t` plus the
//! data-message half of `pd_protocol_task` (`pd_refresh_request`,
//! `pd_request`, `pd_request_pps`, `pd_request_timer`, `pd_state_reset`).
//! Control-message handling (Accept/Reject/PS_RDY/Soft Reset) lives here
//! too since it all operates on the same state.

use crate::config::Config;
use crate::message::{
    build_fixed_request, build_pps_request, ControlMessageType, MessageHeader, Pdo,
};

/// Negotiated sink contract state, reset to defaults on connect or Hard
/// Reset (mirroring `pd_state_reset`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortState {
    /// Whether a source is currently attached.
    pub connected: bool,
    /// Next outgoing message ID (mod 8, incremented per transmitted message).
    pub message_id: u8,
    /// 1-based index into the last Source Capabilities message selected as
    /// the best match, or 0 if none has been selected yet.
    pub requested_object: u8,
    /// 1-based index of the object the source has Accepted, or 0.
    pub accepted_object: u8,
    /// Whether `requested_object` refers to a PPS APDO rather than a Fixed PDO.
    pub requested_pps: bool,
    /// Requested voltage, in millivolts.
    pub request_voltage_mv: u32,
    /// Requested current, in milliamps.
    pub request_current_ma: u32,
    /// Timestamp (arbitrary monotonic units) of the last Request sent,
    /// used by [`PortState::request_due`] to pace the refresh interval.
    pub request_last_timestamp: u64,
}

impl PortState {
    /// Resets to the post-(re)connect defaults from `config`, matching
    /// `pd_state_reset`.
    pub fn reset(config: &Config) -> PortState {
        PortState {
            connected: false,
            message_id: 0,
            requested_object: 0,
            accepted_object: 0,
            requested_pps: false,
            request_voltage_mv: config.default_request_voltage_mv,
            request_current_ma: config.default_request_current_ma,
            request_last_timestamp: 0,
        }
    }

    /// Scans a Source Capabilities message's PDOs and selects the best
    /// match for the currently requested voltage/current, mirroring the
    /// source-capabilities arm of `pd_protocol_task`. A Fixed PDO at the
    /// exact requested voltage wins; otherwise the first PPS APDO whose
    /// range covers the requested voltage is used. Falls back to object 1
    /// if nothing matches.
    pub fn select_request_object(&mut self, pdos: impl Iterator<Item = Pdo>) {
        self.requested_object = 0;
        for (index, pdo) in pdos.enumerate() {
            if self.requested_object != 0 {
                break;
            }
            match pdo {
                Pdo::Fixed {
                    voltage_50mv,
                    max_current_10ma,
                    ..
                } => {
                    let voltage_mv = voltage_50mv as u32 * 50;
                    let current_ma = max_current_10ma as u32 * 10;
                    if voltage_mv == self.request_voltage_mv && current_ma >= self.request_current_ma {
                        self.requested_object = (index + 1) as u8;
                        self.requested_pps = false;
                    }
                }
                Pdo::ProgrammablePowerSupply {
                    max_voltage_100mv,
                    min_voltage_100mv,
                    max_current_50ma,
                } => {
                    let max_mv = max_voltage_100mv as u32 * 100;
                    let min_mv = min_voltage_100mv as u32 * 100;
                    let max_ma = max_current_50ma as u32 * 50;
                    if min_mv <= self.request_voltage_mv && max_mv >= self.request_voltage_mv && max_ma >= self.request_current_ma {
                        self.requested_object = (index + 1) as u8;
                        self.requested_pps = true;
                    }
                }
                _ => {}
            }
        }
        if self.requested_object == 0 {
            self.requested_object = 1;
        }
    }

    /// Builds the Request PDO for the currently selected object, per
    /// `pd_refresh_request`.
    pub fn build_request_pdo(&self) -> u32 {
        if self.requested_pps {
            let voltage_20mv = (self.request_voltage_mv / 20) as u16;
            let current_50ma = (self.request_current_ma / 50) as u8;
            build_pps_request(self.requested_object, voltage_20mv, current_50ma)
        } else {
            let current_10ma = (self.request_current_ma / 10) as u16;
            build_fixed_request(self.requested_object, current_10ma, current_10ma)
        }
    }

    /// Whether a periodic Request refresh is due, per `pd_request_timer`:
    /// only once an object has been both requested and accepted, and the
    /// refresh interval has elapsed.
    pub fn request_due(&self, now: u64, refresh_interval_us: u64) -> bool {
        self.requested_object != 0
            && self.accepted_object != 0
            && self.requested_object == self.accepted_object
            && now.saturating_sub(self.request_last_timestamp) > refresh_interval_us
    }

    /// Applies a received control message's effect on the negotiated
    /// contract (Accept/Reject/soft reset handling), per the control-message
    /// arm of `pd_protocol_task`.
    pub fn apply_control_message(&mut self, header: MessageHeader) {
        match ControlMessageType::from_code(header.message_type) {
            Some(ControlMessageType::Accept) => {
                if self.requested_object != 0 {
                    self.accepted_object = self.requested_object;
                }
            }
            Some(ControlMessageType::Reject) => {
                if self.requested_object != 0 {
                    self.accepted_object = 0;
                    self.requested_object = 0;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_uses_config_defaults() {
        let config = Config::default();
        let state = PortState::reset(&config);
        assert!(!state.connected);
        assert_eq!(state.request_voltage_mv, config.default_request_voltage_mv);
        assert_eq!(state.request_current_ma, config.default_request_current_ma);
    }

    #[test]
    fn selects_fixed_pdo_matching_requested_voltage() {
        let config = Config::default();
        let mut state = PortState::reset(&config);
        state.request_voltage_mv = 12_000;
        state.request_current_ma = 1_000;
        let pdos = [
            Pdo::Fixed {
                usb_comms_capable: false,
                voltage_50mv: 100, // 5V
                max_current_10ma: 300,
            },
            Pdo::Fixed {
                usb_comms_capable: false,
                voltage_50mv: 240, // 12V
                max_current_10ma: 300,
            },
        ];
        state.select_request_object(pdos.into_iter());
        assert_eq!(state.requested_object, 2);
        assert!(!state.requested_pps);
    }

    #[test]
    fn falls_back_to_object_one_when_nothing_matches() {
        let config = Config::default();
        let mut state = PortState::reset(&config);
        state.request_voltage_mv = 9_000;
        let pdos = [Pdo::Fixed {
            usb_comms_capable: false,
            voltage_50mv: 100,
            max_current_10ma: 300,
        }];
        state.select_request_object(pdos.into_iter());
        assert_eq!(state.requested_object, 1);
    }

    #[test]
    fn selects_pps_apdo_within_voltage_range() {
        let config = Config::default();
        let mut state = PortState::reset(&config);
        state.request_voltage_mv = 9_000;
        state.request_current_ma = 2_000;
        let pdos = [Pdo::ProgrammablePowerSupply {
            max_voltage_100mv: 110,
            min_voltage_100mv: 33,
            max_current_50ma: 60,
        }];
        state.select_request_object(pdos.into_iter());
        assert_eq!(state.requested_object, 1);
        assert!(state.requested_pps);
    }

    #[test]
    fn accept_locks_in_the_requested_object() {
        let config = Config::default();
        let mut state = PortState::reset(&config);
        state.requested_object = 2;
        let header = MessageHeader {
            extended: false,
            num_data_objects: 0,
            message_id: 0,
            power_role: false,
            spec_revision: 2,
            data_role: false,
            message_type: ControlMessageType::Accept.code(),
        };
        state.apply_control_message(header);
        assert_eq!(state.accepted_object, 2);
    }

    #[test]
    fn reject_clears_both_requested_and_accepted() {
        let config = Config::default();
        let mut state = PortState::reset(&config);
        state.requested_object = 2;
        state.accepted_object = 2;
        let header = MessageHeader {
            extended: false,
            num_data_objects: 0,
            message_id: 0,
            power_role: false,
            spec_revision: 2,
            data_role: false,
            message_type: ControlMessageType::Reject.code(),
        };
        state.apply_control_message(header);
        assert_eq!(state.accepted_object, 0);
        assert_eq!(state.requested_object, 0);
    }

    #[test]
    fn request_refresh_waits_for_matching_accept_and_interval() {
        let config = Config::default();
        let mut state = PortState::reset(&config);
        state.requested_object = 1;
        state.accepted_object = 1;
        state.request_last_timestamp = 1_000;
        assert!(!state.request_due(1_500, 2_000));
        assert!(state.request_due(4_000, 2_000));
    }
}
