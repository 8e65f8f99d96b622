//! Error types for the USB-PD sink protocol engine.
//!
//! Each fallible layer gets its own `thiserror`-derived enum, following the
//! module-scoped error convention of the rest of this crate. [`PdError`]
//! unifies them for callers that want a single `Result` type at the public
//! API boundary.

use thiserror::Error;

/// Errors raised while decoding the BMC/4b5b line signal or framing a packet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A pulse duration did not fit either the short or long classification.
    #[error("pulse duration {0} out of range")]
    InvalidPulse(u32),
    /// A 5-bit line code did not map to a valid symbol.
    #[error("invalid 5b line code {0:#07b}")]
    InvalidSymbol(u8),
    /// The four SOP symbols did not match any known SOP* tuple.
    #[error("unrecognized SOP* symbol tuple")]
    UnknownSopTuple,
}

/// Errors raised while validating a fully framed packet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than 5 symbols were captured before the line went idle.
    #[error("frame too short: {0} symbols")]
    TooShort(usize),
    /// The trailing CRC-32 did not match the computed value.
    #[error("CRC mismatch: expected {expected:#010x}, computed {actual:#010x}")]
    CrcMismatch {
        /// CRC-32 carried on the wire.
        expected: u32,
        /// CRC-32 computed over the received payload.
        actual: u32,
    },
}

/// Errors raised by the transmit engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    /// No GoodCRC arrived within the retry budget.
    #[error("no GoodCRC received after {0} attempt(s)")]
    NoAck(u8),
    /// The message carries more PDOs than the wire format allows.
    #[error("too many data objects: {0}")]
    TooManyObjects(usize),
}

/// Errors raised by the fixed-size buffer pool.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every slab slot is currently owned by some stage of the pipeline.
    #[error("buffer pool exhausted")]
    Exhausted,
}

/// Errors raised while parsing or building message/VDM structures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoError {
    /// A data message declared more PDOs than fit in the fixed PDO array.
    #[error("num_data_objects {0} exceeds MAX_PDOS")]
    TooManyDataObjects(u8),
    /// A message type code fell outside both the control and data catalogs.
    #[error("unrecognized message type {0:#04x}")]
    UnknownMessageType(u8),
}

/// Umbrella error for callers that do not care which layer failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdError {
    /// See [`DecodeError`].
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// See [`FrameError`].
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// See [`TxError`].
    #[error(transparent)]
    Tx(#[from] TxError),
    /// See [`PoolError`].
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// See [`ProtoError`].
    #[error(transparent)]
    Proto(#[from] ProtoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_displays() {
        assert_eq!(
            DecodeError::InvalidPulse(42).to_string(),
            "pulse duration 42 out of range"
        );
        assert_eq!(
            DecodeError::InvalidSymbol(0b11111).to_string(),
            "invalid 5b line code 0b11111"
        );
        assert_eq!(
            DecodeError::UnknownSopTuple.to_string(),
            "unrecognized SOP* symbol tuple"
        );
    }

    #[test]
    fn frame_error_displays() {
        assert_eq!(FrameError::TooShort(3).to_string(), "frame too short: 3 symbols");
        let e = FrameError::CrcMismatch {
            expected: 0x1234_5678,
            actual: 0x0000_0000,
        };
        assert_eq!(
            e.to_string(),
            "CRC mismatch: expected 0x12345678, computed 0x00000000"
        );
    }

    #[test]
    fn tx_and_pool_and_proto_errors_display() {
        assert_eq!(TxError::NoAck(1).to_string(), "no GoodCRC received after 1 attempt(s)");
        assert_eq!(TxError::TooManyObjects(8).to_string(), "too many data objects: 8");
        assert_eq!(PoolError::Exhausted.to_string(), "buffer pool exhausted");
        assert_eq!(
            ProtoError::TooManyDataObjects(9).to_string(),
            "num_data_objects 9 exceeds MAX_PDOS"
        );
        assert_eq!(
            ProtoError::UnknownMessageType(0x1f).to_string(),
            "unrecognized message type 0x1f"
        );
    }

    #[test]
    fn pd_error_wraps_each_variant() {
        let e: PdError = DecodeError::UnknownSopTuple.into();
        assert_eq!(e.to_string(), "unrecognized SOP* symbol tuple");
        let e: PdError = PoolError::Exhausted.into();
        assert_eq!(e.to_string(), "buffer pool exhausted");
    }
}
