//! Vendor Defined Message parsing: the Structured VDM header and the
//! Discover Identity response VDOs (ID Header, Cert Stat, Product, and the
//! two Cable VDOs).
//!
//! Layouts are taken from the USB-PD VDM wire format. `Cert Stat`, `Product`,
//! and `Cable VDO1/VDO2` are only meaningful on an ACK response whose
//! product type is a passive or active cable; [`DiscoverIdentityAck::parse`]
//! applies that conditional-population rule itself so callers never read a
//! VDO the source did not actually send.

use crate::consts::{PRODUCT_TYPE_ACTIVE_CABLE, PRODUCT_TYPE_PASSIVE_CABLE};

/// `cmd_type` field of a Structured VDM header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdmCommandType {
    Req,
    Ack,
    Nak,
    Busy,
}

impl VdmCommandType {
    fn from_bits(bits: u32) -> VdmCommandType {
        match bits & 0x3 {
            0 => VdmCommandType::Req,
            1 => VdmCommandType::Ack,
            2 => VdmCommandType::Nak,
            _ => VdmCommandType::Busy,
        }
    }

    fn bits(self) -> u32 {
        match self {
            VdmCommandType::Req => 0,
            VdmCommandType::Ack => 1,
            VdmCommandType::Nak => 2,
            VdmCommandType::Busy => 3,
        }
    }
}

/// VDM command codes this engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum VdmCommand {
    DiscoverIdentity,
    DiscoverSvids,
    DiscoverModes,
    EnterMode,
    ExitMode,
    Attention,
    Other(u8),
}

impl VdmCommand {
    fn from_bits(bits: u32) -> VdmCommand {
        match bits & 0x1F {
            1 => VdmCommand::DiscoverIdentity,
            2 => VdmCommand::DiscoverSvids,
            3 => VdmCommand::DiscoverModes,
            4 => VdmCommand::EnterMode,
            5 => VdmCommand::ExitMode,
            6 => VdmCommand::Attention,
            other => VdmCommand::Other(other as u8),
        }
    }

    fn bits(self) -> u32 {
        match self {
            VdmCommand::DiscoverIdentity => 1,
            VdmCommand::DiscoverSvids => 2,
            VdmCommand::DiscoverModes => 3,
            VdmCommand::EnterMode => 4,
            VdmCommand::ExitMode => 5,
            VdmCommand::Attention => 6,
            VdmCommand::Other(code) => code as u32,
        }
    }
}

/// Parsed Structured VDM header (the first 32-bit object of a VDM message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VdmHeader {
    pub svid: u16,
    pub vdm_type_structured: bool,
    pub vdm_version: u8,
    pub object_position: u8,
    pub command_type: VdmCommandType,
    pub command: VdmCommand,
}

impl VdmHeader {
    /// Parses a raw Structured VDM header word.
    pub fn parse(raw: u32) -> VdmHeader {
        VdmHeader {
            svid: (raw >> 16) as u16,
            vdm_type_structured: (raw >> 15) & 1 != 0,
            vdm_version: ((raw >> 13) & 0x3) as u8,
            object_position: ((raw >> 8) & 0x7) as u8,
            command_type: VdmCommandType::from_bits(raw >> 6),
            command: VdmCommand::from_bits(raw),
        }
    }

    /// Packs this header back into its 32-bit wire representation.
    pub fn build(self) -> u32 {
        ((self.svid as u32) << 16)
            | ((self.vdm_type_structured as u32) << 15)
            | (((self.vdm_version as u32) & 0x3) << 13)
            | (((self.object_position as u32) & 0x7) << 8)
            | ((self.command_type.bits() & 0x3) << 6)
            | (self.command.bits() & 0x1F)
    }
}

/// ID Header VDO: the first object of a Discover Identity ACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdHeaderVdo {
    pub usb_host: bool,
    pub usb_device: bool,
    pub product_type: u8,
    pub modal_operation_supported: bool,
    pub usb_vendor_id: u16,
}

impl IdHeaderVdo {
    pub fn parse(raw: u32) -> IdHeaderVdo {
        IdHeaderVdo {
            usb_host: (raw >> 31) & 1 != 0,
            usb_device: (raw >> 30) & 1 != 0,
            product_type: ((raw >> 27) & 0x7) as u8,
            modal_operation_supported: (raw >> 26) & 1 != 0,
            usb_vendor_id: raw as u16,
        }
    }

    pub fn build(self) -> u32 {
        ((self.usb_host as u32) << 31)
            | ((self.usb_device as u32) << 30)
            | (((self.product_type as u32) & 0x7) << 27)
            | ((self.modal_operation_supported as u32) << 26)
            | self.usb_vendor_id as u32
    }

    /// Whether the ID Header's product type means the following Cable VDOs
    /// were sent at all.
    pub fn is_cable(self) -> bool {
        self.product_type == PRODUCT_TYPE_PASSIVE_CABLE || self.product_type == PRODUCT_TYPE_ACTIVE_CABLE
    }

    /// Whether the product type is specifically an active cable, which
    /// additionally sends Cable VDO2.
    pub fn is_active_cable(self) -> bool {
        self.product_type == PRODUCT_TYPE_ACTIVE_CABLE
    }
}

/// Product VDO: USB Product ID and bcdDevice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductVdo {
    pub usb_product_id: u16,
    pub bcd_device: u16,
}

impl ProductVdo {
    pub fn parse(raw: u32) -> ProductVdo {
        ProductVdo {
            usb_product_id: (raw >> 16) as u16,
            bcd_device: raw as u16,
        }
    }

    pub fn build(self) -> u32 {
        ((self.usb_product_id as u32) << 16) | self.bcd_device as u32
    }
}

/// Cable VDO1: passive/active cable plug properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CableVdo1 {
    pub hw_version: u8,
    pub fw_version: u8,
    pub vdo_version: u8,
    pub plug_type: u8,
    pub epr_capable: bool,
    pub cable_latency: u8,
    pub cable_termination: u8,
    pub max_vbus_voltage: u8,
    pub sbu_supported: bool,
    pub sbu_type: bool,
    pub vbus_current: u8,
    pub vbus_through: bool,
    pub sop_controller: bool,
    pub usb_speed: u8,
}

impl CableVdo1 {
    pub fn parse(raw: u32) -> CableVdo1 {
        CableVdo1 {
            hw_version: ((raw >> 28) & 0xF) as u8,
            fw_version: ((raw >> 24) & 0xF) as u8,
            vdo_version: ((raw >> 21) & 0x7) as u8,
            plug_type: ((raw >> 18) & 0x3) as u8,
            epr_capable: (raw >> 17) & 1 != 0,
            cable_latency: ((raw >> 13) & 0xF) as u8,
            cable_termination: ((raw >> 11) & 0x3) as u8,
            max_vbus_voltage: ((raw >> 9) & 0x3) as u8,
            sbu_supported: (raw >> 8) & 1 != 0,
            sbu_type: (raw >> 7) & 1 != 0,
            vbus_current: ((raw >> 5) & 0x3) as u8,
            vbus_through: (raw >> 4) & 1 != 0,
            sop_controller: (raw >> 3) & 1 != 0,
            usb_speed: (raw & 0x7) as u8,
        }
    }

    pub fn build(self) -> u32 {
        (((self.hw_version as u32) & 0xF) << 28)
            | (((self.fw_version as u32) & 0xF) << 24)
            | (((self.vdo_version as u32) & 0x7) << 21)
            | (((self.plug_type as u32) & 0x3) << 18)
            | ((self.epr_capable as u32) << 17)
            | (((self.cable_latency as u32) & 0xF) << 13)
            | (((self.cable_termination as u32) & 0x3) << 11)
            | (((self.max_vbus_voltage as u32) & 0x3) << 9)
            | ((self.sbu_supported as u32) << 8)
            | ((self.sbu_type as u32) << 7)
            | (((self.vbus_current as u32) & 0x3) << 5)
            | ((self.vbus_through as u32) << 4)
            | ((self.sop_controller as u32) << 3)
            | (self.usb_speed as u32 & 0x7)
    }
}

/// Cable VDO2: active cable element properties (active cables only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CableVdo2 {
    pub max_operating_temp: u8,
    pub shutdown_temp: u8,
    pub u3_cld_power: u8,
    pub u3_to_u0_transition: bool,
    pub physical_connection: bool,
    pub active_element: bool,
    pub usb4_supported: bool,
    pub usb2_hub_hops: u8,
    pub usb2_supported: bool,
    pub usb3_2_supported: bool,
    pub usb_lanes_supported: bool,
    pub optically_isolated: bool,
    pub usb4_asymmetric: bool,
    pub usb_gen: bool,
}

impl CableVdo2 {
    pub fn parse(raw: u32) -> CableVdo2 {
        CableVdo2 {
            max_operating_temp: ((raw >> 24) & 0xFF) as u8,
            shutdown_temp: ((raw >> 16) & 0xFF) as u8,
            u3_cld_power: ((raw >> 12) & 0x7) as u8,
            u3_to_u0_transition: (raw >> 11) & 1 != 0,
            physical_connection: (raw >> 10) & 1 != 0,
            active_element: (raw >> 9) & 1 != 0,
            usb4_supported: (raw >> 8) & 1 != 0,
            usb2_hub_hops: ((raw >> 6) & 0x3) as u8,
            usb2_supported: (raw >> 5) & 1 != 0,
            usb3_2_supported: (raw >> 4) & 1 != 0,
            usb_lanes_supported: (raw >> 3) & 1 != 0,
            optically_isolated: (raw >> 2) & 1 != 0,
            usb4_asymmetric: (raw >> 1) & 1 != 0,
            usb_gen: raw & 1 != 0,
        }
    }

    pub fn build(self) -> u32 {
        (((self.max_operating_temp as u32) & 0xFF) << 24)
            | (((self.shutdown_temp as u32) & 0xFF) << 16)
            | (((self.u3_cld_power as u32) & 0x7) << 12)
            | ((self.u3_to_u0_transition as u32) << 11)
            | ((self.physical_connection as u32) << 10)
            | ((self.active_element as u32) << 9)
            | ((self.usb4_supported as u32) << 8)
            | (((self.usb2_hub_hops as u32) & 0x3) << 6)
            | ((self.usb2_supported as u32) << 5)
            | ((self.usb3_2_supported as u32) << 4)
            | ((self.usb_lanes_supported as u32) << 3)
            | ((self.optically_isolated as u32) << 2)
            | ((self.usb4_asymmetric as u32) << 1)
            | (self.usb_gen as u32)
    }
}

/// A fully decoded Discover Identity ACK: the VDM header plus however many
/// of the four Identity VDOs the product type says were actually sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverIdentityAck {
    pub header: VdmHeader,
    pub id_header: IdHeaderVdo,
    pub cert_stat: u32,
    pub product: ProductVdo,
    pub cable_vdo1: Option<CableVdo1>,
    pub cable_vdo2: Option<CableVdo2>,
}

impl DiscoverIdentityAck {
    /// Parses a Discover Identity ACK from its raw VDM object words. `objs`
    /// must start with the VDM header, following the ACK + Discover
    /// Identity convention; fewer objects than the product type implies is
    /// treated as the trailing VDOs simply absent.
    pub fn parse(objs: &[u32]) -> Option<DiscoverIdentityAck> {
        if objs.len() < 3 || objs.first().is_none() {
            return None;
        }
        let header = VdmHeader::parse(objs[0]);
        if header.command_type != VdmCommandType::Ack || header.command != VdmCommand::DiscoverIdentity {
            return None;
        }
        let id_header = IdHeaderVdo::parse(objs[1]);
        let cert_stat = objs[2];
        let product = objs.get(3).copied().map(ProductVdo::parse).unwrap_or(ProductVdo {
            usb_product_id: 0,
            bcd_device: 0,
        });
        let cable_vdo1 = if id_header.is_cable() {
            objs.get(4).copied().map(CableVdo1::parse)
        } else {
            None
        };
        let cable_vdo2 = if id_header.is_active_cable() {
            objs.get(5).copied().map(CableVdo2::parse)
        } else {
            None
        };
        Some(DiscoverIdentityAck {
            header,
            id_header,
            cert_stat,
            product,
            cable_vdo1,
            cable_vdo2,
        })
    }
}

/// Builds the VDM header for a Discover Identity request targeted at
/// `target_sop` via `object_position` (always 0 for Discover Identity).
pub fn build_discover_identity_request(svid: u16) -> u32 {
    VdmHeader {
        svid,
        vdm_type_structured: true,
        vdm_version: 1,
        object_position: 0,
        command_type: VdmCommandType::Req,
        command: VdmCommand::DiscoverIdentity,
    }
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vdm_header_round_trips() {
        let header = VdmHeader {
            svid: 0xFF00,
            vdm_type_structured: true,
            vdm_version: 1,
            object_position: 0,
            command_type: VdmCommandType::Ack,
            command: VdmCommand::DiscoverIdentity,
        };
        assert_eq!(VdmHeader::parse(header.build()), header);
    }

    #[test]
    fn discover_identity_request_uses_standard_svid() {
        let raw = build_discover_identity_request(0xFF00);
        let header = VdmHeader::parse(raw);
        assert_eq!(header.svid, 0xFF00);
        assert_eq!(header.command, VdmCommand::DiscoverIdentity);
        assert_eq!(header.command_type, VdmCommandType::Req);
    }

    #[test]
    fn id_header_detects_passive_and_active_cable() {
        let passive = IdHeaderVdo {
            usb_host: false,
            usb_device: false,
            product_type: PRODUCT_TYPE_PASSIVE_CABLE,
            modal_operation_supported: false,
            usb_vendor_id: 0x1234,
        };
        assert!(passive.is_cable());
        assert!(!passive.is_active_cable());

        let active = IdHeaderVdo {
            product_type: PRODUCT_TYPE_ACTIVE_CABLE,
            ..passive
        };
        assert!(active.is_cable());
        assert!(active.is_active_cable());
    }

    #[test]
    fn discover_identity_ack_omits_cable_vdos_for_non_cable_product() {
        let header = VdmHeader {
            svid: 0xFF00,
            vdm_type_structured: true,
            vdm_version: 1,
            object_position: 0,
            command_type: VdmCommandType::Ack,
            command: VdmCommand::DiscoverIdentity,
        }
        .build();
        let id_header = IdHeaderVdo {
            usb_host: true,
            usb_device: false,
            product_type: 0,
            modal_operation_supported: false,
            usb_vendor_id: 0x1234,
        }
        .build();
        let objs = [header, id_header, 0, 0];
        let ack = DiscoverIdentityAck::parse(&objs).unwrap();
        assert!(ack.cable_vdo1.is_none());
        assert!(ack.cable_vdo2.is_none());
    }

    #[test]
    fn discover_identity_ack_includes_both_cable_vdos_for_active_cable() {
        let header = VdmHeader {
            svid: 0xFF00,
            vdm_type_structured: true,
            vdm_version: 1,
            object_position: 0,
            command_type: VdmCommandType::Ack,
            command: VdmCommand::DiscoverIdentity,
        }
        .build();
        let id_header = IdHeaderVdo {
            usb_host: false,
            usb_device: true,
            product_type: PRODUCT_TYPE_ACTIVE_CABLE,
            modal_operation_supported: false,
            usb_vendor_id: 0x1234,
        }
        .build();
        let cable_vdo1 = CableVdo1 {
            hw_version: 1,
            fw_version: 1,
            vdo_version: 0,
            plug_type: 2,
            epr_capable: false,
            cable_latency: 1,
            cable_termination: 0,
            max_vbus_voltage: 0,
            sbu_supported: true,
            sbu_type: false,
            vbus_current: 2,
            vbus_through: false,
            sop_controller: true,
            usb_speed: 3,
        }
        .build();
        let objs = [header, id_header, 0, 0, cable_vdo1, 0];
        let ack = DiscoverIdentityAck::parse(&objs).unwrap();
        assert!(ack.cable_vdo1.is_some());
        assert!(ack.cable_vdo2.is_some());
    }
}
