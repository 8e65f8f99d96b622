//! Transmit engine: streaming BMC encoder plus the GoodCRC retry loop.
//!
//! [`TxEncoder`] is the direct counterpart of the reference's
//! `pd_tx_enc_cbr`: a `Pattern -> Sync -> Data -> Eop -> Done` state
//! machine that emits pulse durations a few at a time so it can be driven
//! from an interrupt without ever blocking. [`TxEngine`] wraps it with the
//! retry-until-GoodCRC bookkeeping that the reference splits across
//! `pd_tx_enqueue`/`pd_tx_ack_received`, polled the same non-blocking way
//! as the rest of this crate's state machines: [`TxEngine::drive`] returns
//! an [`nb::Result`] — `Err(WouldBlock)` while the attempt is still being
//! streamed or is awaiting a GoodCRC, `Ok(())` once acknowledged, and
//! `Err(Other(TxError::NoAck))` once the retry budget is exhausted.

use heapless::Vec;

use crate::consts::{GOODCRC_WAIT_MS, MAX_PAYLOAD_LEN, PREAMBLE_BITS, SHORT_PULSE_TENTH_US};
use crate::error::TxError;
use crate::io::PulseSink;
use crate::line_code::{BmcEncoder, LineSymbol};
use crate::sop::SopTarget;

/// [`GOODCRC_WAIT_MS`] expressed in the same microsecond units as the
/// `now` timestamps passed to [`TxEngine::drive`].
const GOODCRC_WAIT_US: u64 = GOODCRC_WAIT_MS as u64 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Pattern,
    Sync,
    Data,
    Eop,
    Done,
}

/// Streaming pulse encoder for one outgoing frame.
#[derive(Debug)]
pub struct TxEncoder {
    bmc: BmcEncoder,
    state: TxState,
    sync_bits: usize,
    sync_symbols: usize,
    data_pos: usize,
    tuple: [LineSymbol; 4],
    pending: Vec<u32, 10>,
}

impl TxEncoder {
    /// Starts a new encoder for a frame addressed to `target`.
    pub fn new(target: SopTarget) -> Self {
        TxEncoder {
            bmc: BmcEncoder::new(),
            state: TxState::Pattern,
            sync_bits: 0,
            sync_symbols: 0,
            data_pos: 0,
            tuple: target.tuple(),
            pending: Vec::new(),
        }
    }

    fn refill(&mut self, data: &[u8]) {
        while self.pending.is_empty() && self.state != TxState::Done {
            match self.state {
                TxState::Pattern => {
                    if self.sync_bits >= PREAMBLE_BITS {
                        self.state = TxState::Sync;
                        continue;
                    }
                    self.bmc.add_bit(self.sync_bits & 1 != 0, SHORT_PULSE_TENTH_US, &mut self.pending);
                    self.sync_bits += 1;
                }
                TxState::Sync => {
                    if self.sync_symbols >= 4 {
                        self.state = TxState::Data;
                        continue;
                    }
                    let symbol = self.tuple[self.sync_symbols];
                    let code = symbol.encode().unwrap_or(0);
                    self.bmc.add_half(code, SHORT_PULSE_TENTH_US, &mut self.pending);
                    self.sync_symbols += 1;
                }
                TxState::Data => {
                    if self.data_pos >= data.len() {
                        self.state = TxState::Eop;
                        continue;
                    }
                    let byte = data[self.data_pos];
                    let lower = LineSymbol::Hex(byte & 0x0F).encode().unwrap_or(0);
                    let upper = LineSymbol::Hex(byte >> 4).encode().unwrap_or(0);
                    self.bmc.add_half(lower, SHORT_PULSE_TENTH_US, &mut self.pending);
                    self.bmc.add_half(upper, SHORT_PULSE_TENTH_US, &mut self.pending);
                    self.data_pos += 1;
                }
                TxState::Eop => {
                    let code = LineSymbol::Eop.encode().unwrap_or(0);
                    self.bmc.add_half(code, SHORT_PULSE_TENTH_US, &mut self.pending);
                    self.bmc.add_bit(false, 2 * SHORT_PULSE_TENTH_US, &mut self.pending);
                    self.state = TxState::Done;
                }
                TxState::Done => break,
            }
        }
    }

    /// Drains as many ready pulses as `sink` will accept, refilling its
    /// internal scratch buffer from `data` as needed.
    ///
    /// Returns `true` once every pulse for this frame has been handed to
    /// `sink`.
    pub fn drive(&mut self, data: &[u8], sink: &mut impl PulseSink) -> bool {
        loop {
            if self.pending.is_empty() {
                self.refill(data);
            }
            if self.pending.is_empty() {
                return self.state == TxState::Done;
            }
            let next = self.pending[0];
            if !sink.push_pulse(next) {
                return false;
            }
            self.pending.remove(0);
        }
    }
}

/// Drives the GoodCRC retry loop for one outgoing message.
#[derive(Debug)]
pub struct TxEngine {
    encoder: Option<TxEncoder>,
    target: SopTarget,
    message_id: u8,
    attempts: u8,
    max_retries: u8,
    acked: bool,
    /// Timestamp (microseconds) the in-flight attempt finished streaming
    /// and started waiting for a GoodCRC, or `None` while still streaming.
    sent_at: Option<u64>,
}

impl TxEngine {
    /// Starts a new send attempt for `message_id` addressed to `target`.
    /// `max_retries` is the number of additional attempts after the first.
    pub fn new(target: SopTarget, message_id: u8, max_retries: u8) -> Self {
        TxEngine {
            encoder: Some(TxEncoder::new(target)),
            target,
            message_id,
            attempts: 0,
            max_retries,
            acked: false,
            sent_at: None,
        }
    }

    /// Drives the current attempt: streams pulses while the encoder still
    /// has data, waits for a GoodCRC once streaming finishes, and starts a
    /// fresh attempt after [`crate::consts::GOODCRC_WAIT_MS`] elapses with
    /// none received. `now` is a monotonic microsecond timestamp, the same
    /// clock [`crate::policy::PortState::request_due`] uses.
    ///
    /// Returns `Err(WouldBlock)` while still in progress, `Ok(())` once
    /// [`Self::on_good_crc`] has matched this attempt's message ID, and
    /// `Err(Other(TxError::NoAck))` once the retry budget is exhausted.
    pub fn drive(&mut self, data: &[u8], sink: &mut impl PulseSink, now: u64) -> nb::Result<(), TxError> {
        if self.acked {
            return Ok(());
        }
        if let Some(encoder) = self.encoder.as_mut() {
            if encoder.drive(data, sink) {
                self.attempts += 1;
                self.encoder = None;
                self.sent_at = Some(now);
            }
            return Err(nb::Error::WouldBlock);
        }
        let elapsed = self.sent_at.map(|sent| now.saturating_sub(sent)).unwrap_or(0);
        if elapsed < GOODCRC_WAIT_US {
            return Err(nb::Error::WouldBlock);
        }
        if self.retries_exhausted() {
            return Err(nb::Error::Other(TxError::NoAck(self.attempts)));
        }
        self.encoder = Some(TxEncoder::new(self.target));
        self.sent_at = None;
        Err(nb::Error::WouldBlock)
    }

    /// Call when a GoodCRC arrives; returns whether it acknowledged this
    /// attempt's message ID.
    pub fn on_good_crc(&mut self, acked_message_id: u8) -> bool {
        if acked_message_id == self.message_id {
            self.acked = true;
        }
        self.acked
    }

    /// Whether the retry budget has been exhausted.
    pub fn retries_exhausted(&self) -> bool {
        self.attempts > self.max_retries
    }
}

/// Serializes a header plus PDO objects into a byte buffer with a
/// trailing CRC-32, ready for [`TxEncoder::drive`].
pub fn frame_payload(header_raw: u16, objects: &[u32]) -> Result<Vec<u8, MAX_PAYLOAD_LEN>, TxError> {
    if objects.len() > crate::consts::MAX_PDOS {
        return Err(TxError::TooManyObjects(objects.len()));
    }
    let mut buf: Vec<u8, MAX_PAYLOAD_LEN> = Vec::new();
    let _ = buf.extend_from_slice(&header_raw.to_le_bytes());
    for obj in objects {
        let _ = buf.extend_from_slice(&obj.to_le_bytes());
    }
    let crc = crate::crc::crc32(&buf);
    let _ = buf.extend_from_slice(&crc.to_le_bytes());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Deque;

    struct CollectingSink {
        pulses: Deque<u32, 512>,
    }

    impl PulseSink for CollectingSink {
        fn push_pulse(&mut self, duration_tenth_us: u32) -> bool {
            self.pulses.push_back(duration_tenth_us).is_ok()
        }

        fn is_idle(&self) -> bool {
            self.pulses.is_empty()
        }
    }

    #[test]
    fn encoder_finishes_and_emits_pulses_for_empty_payload() {
        let mut encoder = TxEncoder::new(SopTarget::Sop);
        let mut sink = CollectingSink { pulses: Deque::new() };
        let done = encoder.drive(&[], &mut sink);
        assert!(done);
        assert!(!sink.pulses.is_empty());
    }

    #[test]
    fn frame_payload_rejects_too_many_objects() {
        let objects = [0u32; 8];
        assert_eq!(frame_payload(0, &objects), Err(TxError::TooManyObjects(8)));
    }

    #[test]
    fn frame_payload_appends_valid_crc() {
        let header = 0x1234u16;
        let objects = [0xDEAD_BEEFu32];
        let framed = frame_payload(header, &objects).unwrap();
        assert_eq!(framed.len(), 2 + 4 + 4);
        let crc_in_frame = u32::from_le_bytes([
            framed[framed.len() - 4],
            framed[framed.len() - 3],
            framed[framed.len() - 2],
            framed[framed.len() - 1],
        ]);
        assert_eq!(crate::crc::crc32(&framed[..framed.len() - 4]), crc_in_frame);
    }

    #[test]
    fn engine_tracks_good_crc_match_by_message_id() {
        let mut engine = TxEngine::new(SopTarget::Sop, 4, 1);
        assert!(!engine.on_good_crc(5));
        assert!(engine.on_good_crc(4));
    }

    fn drain_encoder(engine: &mut TxEngine, sink: &mut CollectingSink, now: u64) {
        loop {
            match engine.drive(&[], sink, now) {
                Err(nb::Error::WouldBlock) if engine.encoder.is_some() => continue,
                _ => break,
            }
        }
    }

    #[test]
    fn drive_blocks_until_goodcrc_then_resolves_ok() {
        let mut engine = TxEngine::new(SopTarget::Sop, 0, 1);
        let mut sink = CollectingSink { pulses: Deque::new() };
        drain_encoder(&mut engine, &mut sink, 0);
        assert_eq!(engine.drive(&[], &mut sink, 0), Err(nb::Error::WouldBlock));
        engine.on_good_crc(0);
        assert_eq!(engine.drive(&[], &mut sink, 0), Ok(()));
    }

    #[test]
    fn drive_retries_after_wait_then_fails_once_budget_exhausted() {
        let mut engine = TxEngine::new(SopTarget::Sop, 0, 0);
        let mut sink = CollectingSink { pulses: Deque::new() };
        drain_encoder(&mut engine, &mut sink, 0);
        assert_eq!(engine.drive(&[], &mut sink, 0), Err(nb::Error::WouldBlock));
        assert_eq!(engine.attempts, 1);
        let timeout_us = GOODCRC_WAIT_US;
        assert_eq!(
            engine.drive(&[], &mut sink, timeout_us),
            Err(nb::Error::Other(TxError::NoAck(1)))
        );
    }
}
