//! Best-effort diagnostic logging for received frames.
//!
//! Grounded in the reference's `pd_log_task`/`pd_dump_msg_header`/
//! `pd_dump_vdm`: a human-readable dump of whatever the RX framer
//! produced, gated entirely on the `log`/`defmt` cargo features so the
//! protocol state machines stay independent of any particular logging
//! backend. Every call here is diagnostic only — nothing in this module
//! feeds back into the protocol state.

use crate::buffer::{BufferType, RxBuffer};
use crate::message::{ControlMessageType, DataMessageType, Message, MessageHeader};
use crate::sop::SopTarget;

#[cfg(feature = "log")]
macro_rules! pd_log {
    (info, $($arg:tt)*) => { log::info!($($arg)*) };
    (warn, $($arg:tt)*) => { log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { log::error!($($arg)*) };
}

#[cfg(all(feature = "defmt-0-3", not(feature = "log")))]
macro_rules! pd_log {
    (info, $($arg:tt)*) => { defmt::info!($($arg)*) };
    (warn, $($arg:tt)*) => { defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { defmt::error!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
macro_rules! pd_log {
    ($level:ident, $($arg:tt)*) => {
        let _ = ($($arg)*,);
    };
}

fn target_name(target: SopTarget) -> &'static str {
    match target {
        SopTarget::Sop => "SOP",
        SopTarget::SopPrime => "SOP'",
        SopTarget::SopDoublePrime => "SOP''",
        SopTarget::SopPrimeDebug => "SOP' Debug",
        SopTarget::SopDoublePrimeDebug => "SOP'' Debug",
        SopTarget::HardReset => "Hard Reset",
        SopTarget::CableReset => "Cable Reset",
    }
}

/// Logs one finished receive buffer at `info`/`warn`/`error` level
/// depending on its classification, matching the reference's dispatch on
/// `rx_data->type`.
pub fn log_rx_buffer(buf: &RxBuffer) {
    match buf.buf_type {
        BufferType::Data => log_data_frame(buf),
        BufferType::Symbols => log_symbols_frame(buf),
    }
}

fn log_data_frame(buf: &RxBuffer) {
    let target = buf.target.map(target_name).unwrap_or("Unknown");
    pd_log!(info, "rx target: {}", target);

    if buf.length < 2 {
        return;
    }
    let raw = u16::from_le_bytes([buf.payload[0], buf.payload[1]]);
    let header = MessageHeader::parse(raw);
    pd_log!(
        info,
        "header: do={} id={} pr={} rev={} dr={} type={:#04x}",
        header.num_data_objects,
        header.message_id,
        header.power_role,
        header.spec_revision,
        header.data_role,
        header.message_type
    );

    if header.num_data_objects == 0 {
        if let Some(ctrl) = ControlMessageType::from_code(header.message_type) {
            pd_log!(info, "control: {:?}", ctrl);
        } else {
            pd_log!(warn, "control: unrecognized type {:#04x}", header.message_type);
        }
        return;
    }

    match Message::parse(raw, &buf.payload[2..buf.length]) {
        Ok(msg) => match DataMessageType::from_code(header.message_type) {
            Some(DataMessageType::SourceCapabilities) => {
                for (index, pdo) in msg.pdos().enumerate() {
                    pd_log!(info, "  pdo[{}] = {:?}", index, pdo);
                }
            }
            Some(kind) => pd_log!(info, "data message: {:?}", kind),
            None => pd_log!(warn, "data message: unrecognized type {:#04x}", header.message_type),
        },
        Err(e) => pd_log!(error, "failed to parse data objects: {}", e),
    }
}

fn log_symbols_frame(buf: &RxBuffer) {
    match buf.target {
        Some(SopTarget::HardReset) => pd_log!(warn, "reset: hard reset"),
        Some(SopTarget::CableReset) => pd_log!(warn, "reset: cable reset"),
        _ => pd_log!(error, "failed packet: {} symbols captured", buf.symbol_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_a_symbols_frame_does_not_panic() {
        let mut buf = RxBuffer::default();
        buf.buf_type = BufferType::Symbols;
        buf.target = Some(SopTarget::HardReset);
        log_rx_buffer(&buf);
    }

    #[test]
    fn logging_a_data_frame_does_not_panic() {
        let mut buf = RxBuffer::default();
        buf.buf_type = BufferType::Data;
        buf.target = Some(SopTarget::Sop);
        let header = MessageHeader {
            extended: false,
            num_data_objects: 0,
            message_id: 1,
            power_role: false,
            spec_revision: 2,
            data_role: false,
            message_type: ControlMessageType::GoodCrc.code(),
        };
        let raw = header.build().to_le_bytes();
        buf.payload[0] = raw[0];
        buf.payload[1] = raw[1];
        buf.length = 2;
        log_rx_buffer(&buf);
    }
}
