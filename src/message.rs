//! Message header, control/data message types, and Power Data Objects.
//!
//! The 16-bit message header layout and the message type catalog here are
//! taken directly from the USB-PD wire format; control and data message
//! types share one 5-bit `message_type` field, distinguished by whether
//! `num_data_objects` is zero.

use crate::consts::{
    APDO_SUBTYPE_PPS, MAX_PDOS, PDO_TYPE_AUGMENTED, PDO_TYPE_BATTERY, PDO_TYPE_FIXED,
    PDO_TYPE_VARIABLE,
};
use crate::error::ProtoError;

const EXTENDED_SHIFT: u16 = 15;
const NUM_DATA_OBJ_SHIFT: u16 = 12;
const NUM_DATA_OBJ_MASK: u16 = 0x07;
const MESSAGE_ID_SHIFT: u16 = 9;
const MESSAGE_ID_MASK: u16 = 0x07;
const POWER_ROLE_SHIFT: u16 = 8;
const SPEC_REVISION_SHIFT: u16 = 6;
const SPEC_REVISION_MASK: u16 = 0x03;
const DATA_ROLE_SHIFT: u16 = 5;
const MESSAGE_TYPE_MASK: u16 = 0x1F;

/// Decoded 16-bit USB-PD message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Set for Extended Messages (chunked transport); not emitted by this engine.
    pub extended: bool,
    /// Number of 32-bit data objects following the header.
    pub num_data_objects: u8,
    /// Rolling counter mod 8, matched against the GoodCRC reply.
    pub message_id: u8,
    /// Port's current power role (`false` = Sink, `true` = Source).
    pub power_role: bool,
    /// Negotiated spec revision (0 = 1.0, 1 = 2.0, 2 = 3.0).
    pub spec_revision: u8,
    /// Port's current data role (`false` = UFP, `true` = DFP).
    pub data_role: bool,
    /// 5-bit control or data message type code.
    pub message_type: u8,
}

impl MessageHeader {
    /// Parses a raw 16-bit header.
    pub fn parse(raw: u16) -> MessageHeader {
        MessageHeader {
            extended: (raw >> EXTENDED_SHIFT) & 1 != 0,
            num_data_objects: ((raw >> NUM_DATA_OBJ_SHIFT) & NUM_DATA_OBJ_MASK) as u8,
            message_id: ((raw >> MESSAGE_ID_SHIFT) & MESSAGE_ID_MASK) as u8,
            power_role: (raw >> POWER_ROLE_SHIFT) & 1 != 0,
            spec_revision: ((raw >> SPEC_REVISION_SHIFT) & SPEC_REVISION_MASK) as u8,
            data_role: (raw >> DATA_ROLE_SHIFT) & 1 != 0,
            message_type: (raw & MESSAGE_TYPE_MASK) as u8,
        }
    }

    /// Packs this header back into its 16-bit wire representation.
    pub fn build(self) -> u16 {
        ((self.extended as u16) << EXTENDED_SHIFT)
            | (((self.num_data_objects as u16) & NUM_DATA_OBJ_MASK) << NUM_DATA_OBJ_SHIFT)
            | (((self.message_id as u16) & MESSAGE_ID_MASK) << MESSAGE_ID_SHIFT)
            | ((self.power_role as u16) << POWER_ROLE_SHIFT)
            | (((self.spec_revision as u16) & SPEC_REVISION_MASK) << SPEC_REVISION_SHIFT)
            | ((self.data_role as u16) << DATA_ROLE_SHIFT)
            | (self.message_type as u16 & MESSAGE_TYPE_MASK)
    }

    /// A header carries a payload iff `num_data_objects` is nonzero.
    pub fn is_data_message(self) -> bool {
        self.num_data_objects > 0
    }
}

/// Control message type codes (no accompanying data objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControlMessageType {
    GoodCrc = 0x01,
    GotoMin = 0x02,
    Accept = 0x03,
    Reject = 0x04,
    Ping = 0x05,
    PsRdy = 0x06,
    GetSourceCap = 0x07,
    GetSinkCap = 0x08,
    DrSwap = 0x09,
    PrSwap = 0x0A,
    VconnSwap = 0x0B,
    Wait = 0x0C,
    SoftReset = 0x0D,
    DataReset = 0x0E,
    DataResetComplete = 0x0F,
    NotSupported = 0x10,
    GetSourceCapExtended = 0x11,
    GetStatus = 0x12,
    FrSwap = 0x13,
    GetPpsStatus = 0x14,
    GetCountryCodes = 0x15,
    GetSinkCapExtended = 0x16,
    GetSourceInfo = 0x17,
    GetRevision = 0x18,
}

impl ControlMessageType {
    /// Maps a raw 5-bit message type to a control message, if recognized.
    pub fn from_code(code: u8) -> Option<ControlMessageType> {
        use ControlMessageType::*;
        Some(match code {
            0x01 => GoodCrc,
            0x02 => GotoMin,
            0x03 => Accept,
            0x04 => Reject,
            0x05 => Ping,
            0x06 => PsRdy,
            0x07 => GetSourceCap,
            0x08 => GetSinkCap,
            0x09 => DrSwap,
            0x0A => PrSwap,
            0x0B => VconnSwap,
            0x0C => Wait,
            0x0D => SoftReset,
            0x0E => DataReset,
            0x0F => DataResetComplete,
            0x10 => NotSupported,
            0x11 => GetSourceCapExtended,
            0x12 => GetStatus,
            0x13 => FrSwap,
            0x14 => GetPpsStatus,
            0x15 => GetCountryCodes,
            0x16 => GetSinkCapExtended,
            0x17 => GetSourceInfo,
            0x18 => GetRevision,
            _ => return None,
        })
    }

    /// The raw 5-bit message type code for this control message.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Data message type codes (carry one or more data objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataMessageType {
    SourceCapabilities = 0x01,
    Request = 0x02,
    Bist = 0x03,
    SinkCapabilities = 0x04,
    BatteryStatus = 0x05,
    Alert = 0x06,
    GetCountryInfo = 0x07,
    EnterUsb = 0x08,
    EprRequest = 0x09,
    EprMode = 0x0A,
    SourceInfo = 0x0B,
    Revision = 0x0C,
    VendorDefined = 0x0F,
}

impl DataMessageType {
    /// Maps a raw 5-bit message type to a data message, if recognized.
    pub fn from_code(code: u8) -> Option<DataMessageType> {
        use DataMessageType::*;
        Some(match code {
            0x01 => SourceCapabilities,
            0x02 => Request,
            0x03 => Bist,
            0x04 => SinkCapabilities,
            0x05 => BatteryStatus,
            0x06 => Alert,
            0x07 => GetCountryInfo,
            0x08 => EnterUsb,
            0x09 => EprRequest,
            0x0A => EprMode,
            0x0B => SourceInfo,
            0x0C => Revision,
            0x0F => VendorDefined,
            _ => return None,
        })
    }

    /// The raw 5-bit message type code for this data message.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A parsed Power Data Object, disambiguated by its top two bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pdo {
    /// Fixed Supply PDO: fixed voltage and current ceiling.
    Fixed {
        /// Supports USB communication (the "USB Communications Capable" bit).
        usb_comms_capable: bool,
        /// Output voltage, in 50 mV units.
        voltage_50mv: u16,
        /// Maximum current, in 10 mA units.
        max_current_10ma: u16,
    },
    /// Battery Supply PDO.
    Battery {
        /// Maximum voltage, in 50 mV units.
        max_voltage_50mv: u16,
        /// Minimum voltage, in 50 mV units.
        min_voltage_50mv: u16,
        /// Maximum power, in 250 mW units.
        max_power_250mw: u16,
    },
    /// Variable Supply PDO.
    Variable {
        /// Maximum voltage, in 50 mV units.
        max_voltage_50mv: u16,
        /// Minimum voltage, in 50 mV units.
        min_voltage_50mv: u16,
        /// Maximum current, in 10 mA units.
        max_current_10ma: u16,
    },
    /// Augmented PDO: SPR Programmable Power Supply (AVS is not modeled).
    ProgrammablePowerSupply {
        /// Maximum voltage, in 100 mV units.
        max_voltage_100mv: u16,
        /// Minimum voltage, in 100 mV units.
        min_voltage_100mv: u16,
        /// Maximum current, in 50 mA units.
        max_current_50ma: u8,
    },
    /// Any PDO this engine does not interpret further (stored raw).
    Unknown(u32),
}

impl Pdo {
    /// Parses one 32-bit PDO word.
    pub fn parse(raw: u32) -> Pdo {
        let pdo_type = ((raw >> 30) & 0x3) as u8;
        match pdo_type {
            t if t == PDO_TYPE_FIXED => Pdo::Fixed {
                usb_comms_capable: (raw >> 26) & 1 != 0,
                voltage_50mv: ((raw >> 10) & 0x3FF) as u16,
                max_current_10ma: (raw & 0x3FF) as u16,
            },
            t if t == PDO_TYPE_BATTERY => Pdo::Battery {
                max_voltage_50mv: ((raw >> 20) & 0x3FF) as u16,
                min_voltage_50mv: ((raw >> 10) & 0x3FF) as u16,
                max_power_250mw: (raw & 0x3FF) as u16,
            },
            t if t == PDO_TYPE_VARIABLE => Pdo::Variable {
                max_voltage_50mv: ((raw >> 20) & 0x3FF) as u16,
                min_voltage_50mv: ((raw >> 10) & 0x3FF) as u16,
                max_current_10ma: (raw & 0x3FF) as u16,
            },
            t if t == PDO_TYPE_AUGMENTED => {
                let subtype = ((raw >> 28) & 0x3) as u8;
                if subtype == APDO_SUBTYPE_PPS {
                    Pdo::ProgrammablePowerSupply {
                        max_voltage_100mv: ((raw >> 17) & 0xFF) as u16,
                        min_voltage_100mv: ((raw >> 8) & 0xFF) as u16,
                        max_current_50ma: (raw & 0x7F) as u8,
                    }
                } else {
                    Pdo::Unknown(raw)
                }
            }
            _ => Pdo::Unknown(raw),
        }
    }

    /// Packs this PDO back into its 32-bit wire representation. `Unknown`
    /// round-trips its stored raw value unchanged.
    pub fn build(self) -> u32 {
        match self {
            Pdo::Fixed {
                usb_comms_capable,
                voltage_50mv,
                max_current_10ma,
            } => {
                ((PDO_TYPE_FIXED as u32) << 30)
                    | ((usb_comms_capable as u32) << 26)
                    | (((voltage_50mv as u32) & 0x3FF) << 10)
                    | (max_current_10ma as u32 & 0x3FF)
            }
            Pdo::Battery {
                max_voltage_50mv,
                min_voltage_50mv,
                max_power_250mw,
            } => {
                ((PDO_TYPE_BATTERY as u32) << 30)
                    | (((max_voltage_50mv as u32) & 0x3FF) << 20)
                    | (((min_voltage_50mv as u32) & 0x3FF) << 10)
                    | (max_power_250mw as u32 & 0x3FF)
            }
            Pdo::Variable {
                max_voltage_50mv,
                min_voltage_50mv,
                max_current_10ma,
            } => {
                ((PDO_TYPE_VARIABLE as u32) << 30)
                    | (((max_voltage_50mv as u32) & 0x3FF) << 20)
                    | (((min_voltage_50mv as u32) & 0x3FF) << 10)
                    | (max_current_10ma as u32 & 0x3FF)
            }
            Pdo::ProgrammablePowerSupply {
                max_voltage_100mv,
                min_voltage_100mv,
                max_current_50ma,
            } => {
                ((PDO_TYPE_AUGMENTED as u32) << 30)
                    | ((APDO_SUBTYPE_PPS as u32) << 28)
                    | (((max_voltage_100mv as u32) & 0xFF) << 17)
                    | (((min_voltage_100mv as u32) & 0xFF) << 8)
                    | (max_current_50ma as u32 & 0x7F)
            }
            Pdo::Unknown(raw) => raw,
        }
    }
}

/// Builds a Fixed-Supply Request PDO, selecting `object_position` (1-based,
/// matching the source capability message's object index) and encoding the
/// requested current and the source's advertised max current as an
/// operating-current/max-operating-current pair.
pub fn build_fixed_request(object_position: u8, operating_current_10ma: u16, max_operating_current_10ma: u16) -> u32 {
    ((object_position as u32 & 0x7) << 28)
        | ((max_operating_current_10ma as u32 & 0x3FF) << 10)
        | (operating_current_10ma as u32 & 0x3FF)
}

/// Builds a PPS Request PDO: `object_position` selects the PPS APDO,
/// `output_voltage_20mv` and `operating_current_50ma` carry the requested
/// operating point per the Augmented Request Data Object layout.
pub fn build_pps_request(object_position: u8, output_voltage_20mv: u16, operating_current_50ma: u8) -> u32 {
    ((object_position as u32 & 0x7) << 28)
        | (((output_voltage_20mv as u32) & 0x7FF) << 9)
        | (operating_current_50ma as u32 & 0x7F)
}

/// A full parsed message: header plus up to [`MAX_PDOS`] data objects.
#[derive(Debug, Clone, Copy)]
pub struct Message {
    /// Parsed header.
    pub header: MessageHeader,
    /// Data objects, valid up to `header.num_data_objects`.
    pub objects: [u32; MAX_PDOS],
}

impl Message {
    /// Parses a header plus a byte slice of little-endian 32-bit data
    /// objects (as captured off the wire, header already stripped).
    pub fn parse(header_raw: u16, object_bytes: &[u8]) -> Result<Message, ProtoError> {
        let header = MessageHeader::parse(header_raw);
        if header.num_data_objects as usize > MAX_PDOS {
            return Err(ProtoError::TooManyDataObjects(header.num_data_objects));
        }
        let mut objects = [0u32; MAX_PDOS];
        for i in 0..header.num_data_objects as usize {
            let off = i * 4;
            if off + 4 > object_bytes.len() {
                break;
            }
            objects[i] = u32::from_le_bytes([
                object_bytes[off],
                object_bytes[off + 1],
                object_bytes[off + 2],
                object_bytes[off + 3],
            ]);
        }
        Ok(Message { header, objects })
    }

    /// PDOs in this message, parsed, truncated to `header.num_data_objects`.
    pub fn pdos(&self) -> impl Iterator<Item = Pdo> + '_ {
        self.objects[..self.header.num_data_objects as usize]
            .iter()
            .map(|&raw| Pdo::parse(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = MessageHeader {
            extended: false,
            num_data_objects: 3,
            message_id: 5,
            power_role: false,
            spec_revision: 2,
            data_role: false,
            message_type: DataMessageType::Request.code(),
        };
        let raw = header.build();
        assert_eq!(MessageHeader::parse(raw), header);
    }

    #[test]
    fn good_crc_header_is_zero_data_objects() {
        let raw = MessageHeader {
            extended: false,
            num_data_objects: 0,
            message_id: 1,
            power_role: false,
            spec_revision: 2,
            data_role: false,
            message_type: ControlMessageType::GoodCrc.code(),
        }
        .build();
        let header = MessageHeader::parse(raw);
        assert!(!header.is_data_message());
        assert_eq!(ControlMessageType::from_code(header.message_type), Some(ControlMessageType::GoodCrc));
    }

    #[test]
    fn fixed_pdo_round_trips() {
        let pdo = Pdo::Fixed {
            usb_comms_capable: true,
            voltage_50mv: 240,
            max_current_10ma: 300,
        };
        assert_eq!(Pdo::parse(pdo.build()), pdo);
    }

    #[test]
    fn pps_pdo_round_trips() {
        let pdo = Pdo::ProgrammablePowerSupply {
            max_voltage_100mv: 110,
            min_voltage_100mv: 33,
            max_current_50ma: 60,
        };
        assert_eq!(Pdo::parse(pdo.build()), pdo);
    }

    #[test]
    fn fixed_request_for_12v_3a_at_object_3_matches_reference_bit_pattern() {
        // 12V at 50mV units = 240, 3A at 10mA units = 300.
        let req = build_fixed_request(3, 300, 300);
        assert_eq!(req, 0x3004_B12C);
    }

    #[test]
    fn message_parses_full_seven_pdo_payload() {
        let header = MessageHeader {
            extended: false,
            num_data_objects: 7,
            message_id: 0,
            power_role: false,
            spec_revision: 2,
            data_role: false,
            message_type: DataMessageType::SourceCapabilities.code(),
        }
        .build();
        let objects = [0u8; MAX_PDOS * 4];
        let msg = Message::parse(header, &objects).unwrap();
        assert_eq!(msg.header.num_data_objects, 7);
        assert_eq!(msg.pdos().count(), 7);
    }
}
