//! BMC pulse-to-frame receive state machine.
//!
//! [`BmcReceiver::handle_pulse`] is the direct Rust counterpart of the
//! reference decoder's `pd_rc_bmc_handle_pulse`: fed one pulse duration at
//! a time (in tenths of a microsecond), it reconstructs 5-bit line codes,
//! locks onto the preamble, captures the four-symbol SOP tuple, and then
//! captures payload symbols until an EOP, at which point the caller can
//! pull a finished [`RxBuffer`] out with [`BmcReceiver::take_finished`].
//!
//! A duration of `0` signals line idle (end of this reception attempt),
//! matching the reference's use of a zero-length pulse as an out-of-band
//! reset signal from the RMT ISR.

use crate::buffer::{BufferPool, BufferType, RxBuffer};
use crate::consts::{HIGH_THRESHOLD_TENTH_US, MAX_PAYLOAD_LEN, MAX_SYMBOLS, SHORT_PULSE_TENTH_US};
use crate::crc::crc32;
use crate::line_code::LineSymbol;
use crate::sop::SopTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Init,
    Preamble,
    Sop,
    Payload,
    Finished,
}

/// Streaming BMC pulse decoder, owning one in-progress [`RxBuffer`] at a
/// time borrowed from a [`BufferPool`].
#[derive(Debug)]
pub struct BmcReceiver {
    state: RxState,
    current: Option<usize>,
    short_pulse: bool,
    last_shortened: i32,
    bit_data: u8,
    bit_count: u8,
}

impl Default for BmcReceiver {
    fn default() -> Self {
        BmcReceiver {
            state: RxState::Init,
            current: None,
            short_pulse: false,
            last_shortened: 0,
            bit_data: 0,
            bit_count: 0,
        }
    }
}

impl BmcReceiver {
    /// Starts a fresh receiver with no frame in progress.
    pub fn new() -> Self {
        Self::default()
    }

    fn reset_bit_tracking(&mut self) {
        self.short_pulse = false;
        self.last_shortened = 0;
        self.bit_data = 0;
        self.bit_count = 0;
    }

    /// Feeds one pulse duration (tenths of a microsecond) into the
    /// decoder. Returns `true` if a complete frame is now available via
    /// [`BmcReceiver::take_finished`].
    pub fn handle_pulse(&mut self, pool: &mut BufferPool, duration: u32) -> bool {
        if self.current.is_none() {
            match pool.acquire() {
                Ok(idx) => {
                    self.current = Some(idx);
                    self.state = RxState::Init;
                }
                Err(_) => return false,
            }
        }

        if duration == 0 {
            self.state = RxState::Init;
            return false;
        }

        if self.state == RxState::Init {
            if let Some(idx) = self.current {
                pool.get_mut(idx).reset();
            }
            self.reset_bit_tracking();
            self.state = RxState::Preamble;
        }

        let long_pulse = duration as i32 > HIGH_THRESHOLD_TENTH_US as i32 + self.last_shortened;
        if !long_pulse && duration > SHORT_PULSE_TENTH_US {
            self.last_shortened = SHORT_PULSE_TENTH_US as i32 - duration as i32;
        } else {
            self.last_shortened = 0;
        }

        if self.short_pulse {
            self.short_pulse = false;
            if long_pulse {
                self.state = RxState::Init;
            } else {
                self.bit_data = (self.bit_data >> 1) | 0x10;
                self.bit_count += 1;
            }
        } else if long_pulse {
            self.bit_data >>= 1;
            self.bit_count += 1;
        } else {
            self.short_pulse = true;
        }

        if self.state == RxState::Preamble {
            let symbol = LineSymbol::decode(self.bit_data);
            if symbol == LineSymbol::Sync1 || symbol == LineSymbol::Rst1 {
                self.state = RxState::Sop;
                self.bit_count = 5;
            }
        }

        if self.state == RxState::Sop && self.bit_count == 5 {
            self.bit_count %= 5;
            let symbol = LineSymbol::decode(self.bit_data);
            if let Some(idx) = self.current {
                let buf = pool.get_mut(idx);
                if buf.symbol_count < MAX_SYMBOLS {
                    buf.symbols[buf.symbol_count] = symbol;
                    buf.symbol_count += 1;
                }
                if buf.symbol_count >= 4 {
                    let tuple = [buf.symbols[0], buf.symbols[1], buf.symbols[2], buf.symbols[3]];
                    match SopTarget::from_tuple(tuple) {
                        Some(target) => {
                            buf.target = Some(target);
                            self.state = RxState::Payload;
                        }
                        None => self.state = RxState::Init,
                    }
                }
            }
        }

        if self.state == RxState::Payload && self.bit_count == 5 {
            self.bit_count %= 5;
            let symbol = LineSymbol::decode(self.bit_data);
            if let Some(idx) = self.current {
                let buf = pool.get_mut(idx);
                if buf.symbol_count < MAX_SYMBOLS {
                    buf.symbols[buf.symbol_count] = symbol;
                    buf.symbol_count += 1;
                }
                if symbol == LineSymbol::Eop {
                    self.state = RxState::Finished;
                }
            }
        }

        if self.state == RxState::Finished {
            if let Some(idx) = self.current {
                finish_frame(pool.get_mut(idx));
            }
            return true;
        }

        false
    }

    /// Takes ownership of the just-finished buffer's index, if one is
    /// ready, leaving the receiver ready to start a new frame.
    pub fn take_finished(&mut self) -> Option<usize> {
        if self.state == RxState::Finished {
            self.state = RxState::Init;
            self.current.take()
        } else {
            None
        }
    }
}

/// Converts captured symbols into a payload and CRC-validates it,
/// mirroring the bottom half of `pd_rc_bmc_handle_pulse`.
fn finish_frame(buf: &mut RxBuffer) {
    buf.buf_type = BufferType::Symbols;
    if buf.symbol_count < 5 {
        return;
    }
    let length = core::cmp::min(MAX_PAYLOAD_LEN, (buf.symbol_count - 5) / 2);
    for pos in 0..length {
        let lo = symbol_nibble(buf.symbols[4 + 2 * pos]);
        let hi = symbol_nibble(buf.symbols[4 + 2 * pos + 1]);
        buf.payload[pos] = lo | (hi << 4);
    }
    buf.length = length;

    if length > 4 {
        let crc_calc = crc32(&buf.payload[..length - 4]);
        let crc_pkt = u32::from_le_bytes([
            buf.payload[length - 4],
            buf.payload[length - 3],
            buf.payload[length - 2],
            buf.payload[length - 1],
        ]);
        if crc_calc == crc_pkt {
            buf.buf_type = BufferType::Data;
        }
    }
}

fn symbol_nibble(symbol: LineSymbol) -> u8 {
    match symbol {
        LineSymbol::Hex(n) => n,
        _ => 0,
    }
}
