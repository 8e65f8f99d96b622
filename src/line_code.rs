//! 4b/5b symbol codec and Biphase Mark Coding (BMC) helpers.
//!
//! The 4b/5b table maps each hex nibble plus six framing symbols
//! (`SYNC_1..3`, `RST_1..2`, `EOP`) onto a 5-bit line code. The tables below
//! are transcribed bit-for-bit from the USB-PD 4b5b line code and MUST NOT
//! be reordered; the decode table in particular depends on the position of
//! every one of its 32 entries.
//!
//! BMC is layered on top: a logical 0-bit is one long pulse, a logical
//! 1-bit is two short pulses at alternating level. [`BmcEncoder`] turns a
//! bit into pulse pairs the same way the reference TX encoder's `add_bit`
//! does; the BMC *decode* side (pulse-to-bit, with drift correction) lives
//! in [`crate::rx`] since it is stateful across a whole frame, not a pure
//! function of one input.

use core::fmt;

/// A single 4b/5b line symbol: a hex nibble, or one of the framing symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSymbol {
    /// Data nibble `0x0..=0xF`.
    Hex(u8),
    /// First Sync symbol, used in the preamble and most SOP tuples.
    Sync1,
    /// Second Sync symbol, used to terminate the plain SOP tuple.
    Sync2,
    /// Third Sync symbol, used in cable-addressed SOP tuples.
    Sync3,
    /// First Hard/Cable Reset symbol.
    Rst1,
    /// Second Hard/Cable Reset symbol.
    Rst2,
    /// End of Packet symbol.
    Eop,
    /// A 5-bit pattern with no assigned meaning.
    Error,
}

impl fmt::Display for LineSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSymbol::Hex(n) => write!(f, "{n:x}"),
            LineSymbol::Sync1 => write!(f, "SYNC_1"),
            LineSymbol::Sync2 => write!(f, "SYNC_2"),
            LineSymbol::Sync3 => write!(f, "SYNC_3"),
            LineSymbol::Rst1 => write!(f, "RST_1"),
            LineSymbol::Rst2 => write!(f, "RST_2"),
            LineSymbol::Eop => write!(f, "EOP"),
            LineSymbol::Error => write!(f, "ERROR"),
        }
    }
}

/// 5-bit line codes for `Hex_0..Hex_F, SYNC_1, SYNC_2, RST_1, RST_2, EOP, SYNC_3`,
/// in that order. Index with [`LineSymbol::encode_index`].
pub static ENCODE_TABLE: [u8; 21] = [
    0b11110, 0b01001, 0b10100, 0b10101, 0b01010, 0b01011, 0b01110, 0b01111, 0b10010, 0b10011,
    0b10110, 0b10111, 0b11010, 0b11011, 0b11100, 0b11101, 0b11000, 0b10001, 0b00111, 0b11001,
    0b01101, 0b00110,
];

/// 5-bit line code to [`LineSymbol`] lookup. Every one of the 32 entries is
/// significant; unlisted patterns are `Error` per the USB-PD spec.
pub static DECODE_TABLE: [LineSymbol; 32] = [
    LineSymbol::Error,                     // 00000
    LineSymbol::Error,                     // 00001
    LineSymbol::Error,                     // 00010
    LineSymbol::Error,                     // 00011
    LineSymbol::Error,                     // 00100
    LineSymbol::Error,                     // 00101
    LineSymbol::Sync3,                     // 00110
    LineSymbol::Rst1,                      // 00111
    LineSymbol::Error,                     // 01000
    LineSymbol::Hex(0x1),                  // 01001
    LineSymbol::Hex(0x4),                  // 01010
    LineSymbol::Hex(0x5),                  // 01011
    LineSymbol::Error,                     // 01100
    LineSymbol::Eop,                       // 01101
    LineSymbol::Hex(0x6),                  // 01110
    LineSymbol::Hex(0x7),                  // 01111
    LineSymbol::Error,                     // 10000
    LineSymbol::Sync2,                     // 10001
    LineSymbol::Hex(0x8),                  // 10010
    LineSymbol::Hex(0x9),                  // 10011
    LineSymbol::Hex(0x2),                  // 10100
    LineSymbol::Hex(0x3),                  // 10101
    LineSymbol::Hex(0xA),                  // 10110
    LineSymbol::Hex(0xB),                  // 10111
    LineSymbol::Sync1,                     // 11000
    LineSymbol::Rst2,                      // 11001
    LineSymbol::Hex(0xC),                  // 11010
    LineSymbol::Hex(0xD),                  // 11011
    LineSymbol::Hex(0xE),                  // 11100
    LineSymbol::Hex(0xF),                  // 11101
    LineSymbol::Hex(0x0),                  // 11110
    LineSymbol::Error,                     // 11111
];

impl LineSymbol {
    /// Index into [`ENCODE_TABLE`] for this symbol, or `None` for `Error`
    /// (which has no wire representation).
    pub fn encode_index(self) -> Option<usize> {
        match self {
            LineSymbol::Hex(n) if n <= 0xF => Some(n as usize),
            LineSymbol::Sync1 => Some(16),
            LineSymbol::Sync2 => Some(17),
            LineSymbol::Rst1 => Some(18),
            LineSymbol::Rst2 => Some(19),
            LineSymbol::Eop => Some(20),
            LineSymbol::Sync3 => Some(21),
            _ => None,
        }
    }

    /// Encodes this symbol to its 5-bit line code.
    pub fn encode(self) -> Option<u8> {
        self.encode_index().map(|i| ENCODE_TABLE[i])
    }

    /// Decodes a 5-bit line code (only the low 5 bits are consulted).
    pub fn decode(code: u8) -> LineSymbol {
        DECODE_TABLE[(code & 0x1F) as usize]
    }
}

/// Produces BMC pulse durations for a bit stream, mirroring the reference
/// TX encoder's `add_bit`/`add_half`. A 0-bit is one continuous pulse
/// double the unit width (no level transition mid-bit); a 1-bit is two
/// pulses of the unit width with a transition in between. The receiver
/// only observes these edge durations, not levels, so that is all this
/// encoder emits.
#[derive(Debug, Clone, Copy)]
pub struct BmcEncoder {
    level: bool,
}

impl Default for BmcEncoder {
    fn default() -> Self {
        BmcEncoder { level: true }
    }
}

impl BmcEncoder {
    /// Starts a fresh encoder with the line idle-high, matching the
    /// reference's `pd_tx_ctx_t` reset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes one bit into one or two pulse durations, appended to `out`.
    pub fn add_bit(&mut self, bit: bool, short_duration: u32, out: &mut heapless::Vec<u32, 2>) {
        if bit {
            let _ = out.push(short_duration);
            let _ = out.push(short_duration);
        } else {
            self.level = !self.level;
            let _ = out.push(2 * short_duration);
        }
    }

    /// Encodes a 5-bit line code low-bit-first into pulse durations,
    /// mirroring `add_half`.
    pub fn add_half(&mut self, half: u8, short_duration: u32, out: &mut heapless::Vec<u32, 10>) {
        let mut half = half;
        for _ in 0..5 {
            let mut pulses: heapless::Vec<u32, 2> = heapless::Vec::new();
            self.add_bit(half & 1 != 0, short_duration, &mut pulses);
            for p in pulses {
                let _ = out.push(p);
            }
            half >>= 1;
        }
    }
}
