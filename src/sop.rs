//! Start-of-Packet target identification.
//!
//! USB-PD distinguishes the addressee of a packet (the port partner, a
//! cable plug, or a reset condition) by the specific sequence of four
//! line symbols that opens the frame, rather than by a field inside the
//! packet. [`SopTarget::tuple`] gives that sequence for each target;
//! [`SopTarget::from_tuple`] is its inverse, used by the RX framer once it
//! has captured four symbols after the preamble.

use crate::line_code::LineSymbol;

/// Who a packet is addressed to, identified by its leading symbol tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SopTarget {
    /// The port partner.
    Sop,
    /// The cable plug on the port's own side.
    SopPrime,
    /// The cable plug on the far side (e-marked cables only).
    SopDoublePrime,
    /// Debug accessory variant of SOP'.
    SopPrimeDebug,
    /// Debug accessory variant of SOP''.
    SopDoublePrimeDebug,
    /// Hard Reset signaling, not a data packet.
    HardReset,
    /// Cable Reset signaling, addressed to a cable plug.
    CableReset,
}

impl SopTarget {
    /// The four-symbol sequence that opens a frame addressed to this target.
    pub fn tuple(self) -> [LineSymbol; 4] {
        use LineSymbol::*;
        match self {
            SopTarget::Sop => [Sync1, Sync1, Sync1, Sync2],
            SopTarget::SopPrime => [Sync1, Sync1, Sync3, Sync3],
            SopTarget::SopDoublePrime => [Sync1, Sync3, Sync1, Sync3],
            SopTarget::SopPrimeDebug => [Sync1, Rst2, Rst2, Sync3],
            SopTarget::SopDoublePrimeDebug => [Sync1, Rst2, Sync3, Sync2],
            SopTarget::HardReset => [Rst1, Rst1, Rst1, Rst2],
            SopTarget::CableReset => [Rst1, Sync1, Rst1, Sync3],
        }
    }

    /// Identifies the target from a captured four-symbol tuple, if it
    /// matches one of the known sequences.
    pub fn from_tuple(symbols: [LineSymbol; 4]) -> Option<SopTarget> {
        for target in [
            SopTarget::Sop,
            SopTarget::SopPrime,
            SopTarget::SopDoublePrime,
            SopTarget::SopPrimeDebug,
            SopTarget::SopDoublePrimeDebug,
            SopTarget::HardReset,
            SopTarget::CableReset,
        ] {
            if target.tuple() == symbols {
                return Some(target);
            }
        }
        None
    }

    /// True for targets addressed at a cable plug rather than the port
    /// partner (SOP', SOP'', their debug variants, and Cable Reset).
    pub fn is_cable_directed(self) -> bool {
        matches!(
            self,
            SopTarget::SopPrime
                | SopTarget::SopDoublePrime
                | SopTarget::SopPrimeDebug
                | SopTarget::SopDoublePrimeDebug
                | SopTarget::CableReset
        )
    }

    /// True if this target carries no data payload at all (Hard Reset).
    pub fn is_reset_signal(self) -> bool {
        matches!(self, SopTarget::HardReset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_target_round_trips_through_its_tuple() {
        for target in [
            SopTarget::Sop,
            SopTarget::SopPrime,
            SopTarget::SopDoublePrime,
            SopTarget::SopPrimeDebug,
            SopTarget::SopDoublePrimeDebug,
            SopTarget::HardReset,
            SopTarget::CableReset,
        ] {
            assert_eq!(SopTarget::from_tuple(target.tuple()), Some(target));
        }
    }

    #[test]
    fn sop_tuple_is_three_sync1_then_sync2() {
        assert_eq!(
            SopTarget::Sop.tuple(),
            [LineSymbol::Sync1, LineSymbol::Sync1, LineSymbol::Sync1, LineSymbol::Sync2]
        );
    }

    #[test]
    fn unrecognized_tuple_returns_none() {
        let junk = [LineSymbol::Hex(0), LineSymbol::Hex(1), LineSymbol::Hex(2), LineSymbol::Hex(3)];
        assert_eq!(SopTarget::from_tuple(junk), None);
    }

    #[test]
    fn cable_directed_classification() {
        assert!(!SopTarget::Sop.is_cable_directed());
        assert!(SopTarget::SopPrime.is_cable_directed());
        assert!(SopTarget::SopDoublePrime.is_cable_directed());
        assert!(SopTarget::CableReset.is_cable_directed());
    }
}
