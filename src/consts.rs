//! Constants used across the USB-PD sink protocol engine.
//!
//! This module defines protocol-wide constants for buffer sizing, wire
//! timing, queue depths, and bit-field layout, mirroring the fixed values
//! in the USB Power Delivery Specification that this engine targets
//! (Standard Power Range, UFP/sink role only).

/// Number of 32-bit PDOs a single message may carry (USB-PD caps this at 7).
pub const MAX_PDOS: usize = 7;

/// Maximum number of 5b line symbols buffered per frame: 4 SOP symbols plus
/// up to `(2 + 7*4 + 4) * 2` data symbols plus one EOP symbol.
pub const MAX_SYMBOLS: usize = 256;

/// Maximum size (in bytes) of a decoded payload (header + PDOs + CRC-32).
pub const MAX_PAYLOAD_LEN: usize = 2 + (MAX_PDOS * 4) + 4;

/// Number of pre-allocated receive buffers in the slab (matches the
/// reference firmware's buffer pool size).
pub const BUFFER_POOL_SIZE: usize = 64;

/// Depth of the short queue feeding the GoodCRC responder.
pub const GOODCRC_QUEUE_DEPTH: usize = 8;

/// Depth of the queue feeding the protocol task.
pub const RX_QUEUE_DEPTH: usize = 16;

/// Depth of the queue feeding the logging task.
pub const LOG_QUEUE_DEPTH: usize = 16;

/// Depth of the queue feeding the TX engine.
pub const TX_QUEUE_DEPTH: usize = 8;

/// Nominal BMC unit interval, in tenths of a microsecond (3.3 us).
pub const UNIT_INTERVAL_TENTH_US: u32 = 33;

/// Nominal short-pulse (half unit interval) duration, in tenths of a
/// microsecond (1.6 us, matching the reference TX encoder).
pub const SHORT_PULSE_TENTH_US: u32 = 16;

/// Threshold above which a pulse is classified "long" (1.5x the short
/// pulse width), in tenths of a microsecond.
pub const HIGH_THRESHOLD_TENTH_US: u32 = (SHORT_PULSE_TENTH_US * 3) / 2;

/// Number of alternating preamble bits sent before the SOP sync symbols.
pub const PREAMBLE_BITS: usize = 64;

/// Protocol-task idle wakeup timeout, in milliseconds.
pub const PROTOCOL_IDLE_TIMEOUT_MS: u32 = 100;

/// Interval at which an accepted Request is reissued to keep the contract
/// alive, in milliseconds.
pub const REQUEST_REFRESH_MS: u32 = 2000;

/// Worst-case wait for a GoodCRC reply to a single TX attempt, in
/// milliseconds.
pub const GOODCRC_WAIT_MS: u32 = 10;

/// PDO type code: Fixed Supply.
pub const PDO_TYPE_FIXED: u8 = 0;
/// PDO type code: Battery.
pub const PDO_TYPE_BATTERY: u8 = 1;
/// PDO type code: Variable Supply.
pub const PDO_TYPE_VARIABLE: u8 = 2;
/// PDO type code: Augmented (SPR PPS or AVS, disambiguated by subtype).
pub const PDO_TYPE_AUGMENTED: u8 = 3;
/// Augmented-PDO subtype code: SPR Programmable Power Supply.
pub const APDO_SUBTYPE_PPS: u8 = 0;

/// `sop_product_type` value denoting a passive cable (ID Header VDO).
pub const PRODUCT_TYPE_PASSIVE_CABLE: u8 = 3;
/// `sop_product_type` value denoting an active cable (ID Header VDO).
pub const PRODUCT_TYPE_ACTIVE_CABLE: u8 = 4;
