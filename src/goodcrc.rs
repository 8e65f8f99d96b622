//! GoodCRC auto-responder.
//!
//! Every packet accepted by the RX framer for a target this engine
//! acknowledges must be answered with a GoodCRC control message echoing the
//! received `message_id`, within the protocol's tight reply window. This
//! module builds that fixed-shape response; [`crate::tx`] is responsible
//! for actually getting it on the wire in time.

use heapless::Vec;

use crate::consts::MAX_PAYLOAD_LEN;
use crate::crc::Crc32Builder;
use crate::message::{ControlMessageType, MessageHeader};
use crate::sop::SopTarget;

/// Builds the byte payload (header + CRC-32, no data objects) for a
/// GoodCRC reply to `message_id`, addressed back to `target`.
///
/// The returned bytes are ready to hand to the TX engine: two header bytes
/// followed by four little-endian CRC bytes.
pub fn build_good_crc(target: SopTarget, message_id: u8, spec_revision: u8) -> Vec<u8, MAX_PAYLOAD_LEN> {
    let header = MessageHeader {
        extended: false,
        num_data_objects: 0,
        message_id,
        power_role: false,
        spec_revision,
        data_role: false,
        message_type: ControlMessageType::GoodCrc.code(),
    };
    let raw = header.build();
    let header_bytes = raw.to_le_bytes();

    let mut crc = Crc32Builder::new();
    crc.update_slice(&header_bytes);
    let checksum = crc.finish();

    let mut out = Vec::new();
    let _ = out.extend_from_slice(&header_bytes);
    let _ = out.extend_from_slice(&checksum.to_le_bytes());
    let _ = target;
    out
}

/// Whether this engine should auto-acknowledge frames addressed to
/// `target`, per the sink's fixed acknowledgment policy (always SOP; SOP'
/// and SOP'' only with cable-emarker emulation enabled).
pub fn should_acknowledge(target: SopTarget, emarker_emulation: bool) -> bool {
    match target {
        SopTarget::Sop => true,
        SopTarget::SopPrime | SopTarget::SopDoublePrime => emarker_emulation,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_crc_payload_has_expected_length() {
        let payload = build_good_crc(SopTarget::Sop, 3, 2);
        assert_eq!(payload.len(), 6);
    }

    #[test]
    fn good_crc_header_echoes_message_id_and_type() {
        let payload = build_good_crc(SopTarget::Sop, 5, 2);
        let raw = u16::from_le_bytes([payload[0], payload[1]]);
        let header = MessageHeader::parse(raw);
        assert_eq!(header.message_id, 5);
        assert_eq!(header.message_type, ControlMessageType::GoodCrc.code());
        assert_eq!(header.num_data_objects, 0);
    }

    #[test]
    fn only_sop_is_acknowledged_by_default() {
        assert!(should_acknowledge(SopTarget::Sop, false));
        assert!(!should_acknowledge(SopTarget::SopPrime, false));
        assert!(!should_acknowledge(SopTarget::SopDoublePrime, false));
    }

    #[test]
    fn emarker_emulation_extends_acknowledgment_to_cable_sops() {
        assert!(should_acknowledge(SopTarget::SopPrime, true));
        assert!(should_acknowledge(SopTarget::SopDoublePrime, true));
        assert!(!should_acknowledge(SopTarget::HardReset, true));
    }
}
