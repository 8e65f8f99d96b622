//! Build-time/runtime configuration for the sink engine.
//!
//! The reference firmware expressed these as `#ifdef`s (`PD_TEST_EMARKER_CABLE`,
//! `PD_LOG_TX_PACKETS`) or hardcoded literals (retry count, default request
//! voltage, GoodCRC spec revision). This crate collects them into a single
//! `Config` value instead, so none of it leaks into `cfg(feature = ...)`
//! branches in the protocol logic itself.

/// Tunable options for the sink policy and wire engine.
///
/// See `Config::default()` for the values this crate ships with, each of
/// which mirrors a concrete behavior observed in the reference firmware
/// rather than a guessed alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Acknowledge SOP'/SOP'' frames and answer Discover Identity on SOP'
    /// with a canned cable-emarker response.
    pub emarker_emulation: bool,
    /// Tee a copy of every TX attempt to the logging task.
    pub log_tx_packets: bool,
    /// Maximum number of TX attempts before giving up on a GoodCRC.
    pub max_tx_retries: u8,
    /// Requested voltage after reset, in millivolts.
    pub default_request_voltage_mv: u32,
    /// Requested current after reset, in milliamps.
    pub default_request_current_ma: u32,
    /// `spec_revision` field the GoodCRC responder echoes.
    pub goodcrc_spec_revision: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            emarker_emulation: false,
            log_tx_packets: false,
            max_tx_retries: 1,
            default_request_voltage_mv: 12_345,
            default_request_current_ma: 1_000,
            goodcrc_spec_revision: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_firmware_behavior() {
        let cfg = Config::default();
        assert!(!cfg.emarker_emulation);
        assert!(!cfg.log_tx_packets);
        assert_eq!(cfg.max_tx_retries, 1);
        assert_eq!(cfg.default_request_voltage_mv, 12_345);
        assert_eq!(cfg.default_request_current_ma, 1_000);
        assert_eq!(cfg.goodcrc_spec_revision, 2);
    }
}
