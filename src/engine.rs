//! Ties the line codec, RX framer, GoodCRC responder, TX engine and sink
//! policy into the one record an interrupt handler and cooperating tasks
//! share, following the teacher's split between its modem driver (the
//! protocol state) and `timer::isr` (the `critical_section` glue that
//! exposes it to an ISR). [`SinkEngine`] plays the modem driver's role
//! here: a single `tick`-like entry point (`on_pulse`) callable from
//! interrupt context, plus task-side methods for the protocol and TX work
//! that must not run on the interrupt stack.

use heapless::Deque;

use crate::config::Config;
use crate::consts::{GOODCRC_QUEUE_DEPTH, MAX_PAYLOAD_LEN, MAX_PDOS, REQUEST_REFRESH_MS};
use crate::error::{PdError, TxError};
use crate::goodcrc::{build_good_crc, should_acknowledge};
use crate::io::PulseSink;
use crate::message::{ControlMessageType, DataMessageType, Message, MessageHeader};
use crate::policy::PortState;
use crate::rx::BmcReceiver;
use crate::sop::SopTarget;
use crate::tx::{frame_payload, TxEngine};

/// A GoodCRC reply queued by the pulse handler for the TX task to drain.
///
/// Kept tiny and `Copy` so it can be pushed from interrupt context without
/// touching the buffer pool: the handler only needs to remember who to
/// reply to and with which message ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAck {
    /// Target to address the GoodCRC reply to.
    pub target: SopTarget,
    /// Message ID being acknowledged.
    pub message_id: u8,
}

/// The protocol engine for one USB-PD sink port.
///
/// `EN`/`CC` are left as type parameters on [`crate::port::Port`] rather
/// than duplicated here; callers own their `Port` and pass pulse samples
/// and drive requests through it independently, the same separation of
/// concerns the reference keeps between `pd_rx.c`/`pd_tx.c` (protocol) and
/// `pd.c`'s `pd_mode` (pins).
#[derive(Debug)]
pub struct SinkEngine {
    receiver: BmcReceiver,
    pool: crate::buffer::BufferPool,
    state: PortState,
    config: Config,
    tx: Option<TxEngine>,
    acks: Deque<PendingAck, GOODCRC_QUEUE_DEPTH>,
}

impl SinkEngine {
    /// Builds a fresh engine with a reset policy state and an empty buffer pool.
    pub fn new(config: Config) -> Self {
        SinkEngine {
            receiver: BmcReceiver::new(),
            pool: crate::buffer::BufferPool::new(),
            state: PortState::reset(&config),
            config,
            tx: None,
            acks: Deque::new(),
        }
    }

    /// Current negotiated contract state.
    pub fn port_state(&self) -> &PortState {
        &self.state
    }

    /// Feeds one captured pulse duration to the RX framer. Call from
    /// interrupt context, matching the reference's pulse-event callback.
    ///
    /// When a frame finishes, queues a GoodCRC reply (if this port
    /// acknowledges the frame's target) so the TX task can send it without
    /// revisiting the decoder.
    pub fn on_pulse(&mut self, duration_tenth_us: u32) {
        if self.receiver.handle_pulse(&mut self.pool, duration_tenth_us) {
            if let Some(idx) = self.receiver.take_finished() {
                self.queue_ack_if_needed(idx);
            }
        }
    }

    /// Decides whether a just-finished frame is eligible for a GoodCRC
    /// reply, mirroring the reference's ack gate ("do not respond to our
    /// packets or to GoodCRC", `data_role == PD_DATA_ROLE_DFP && (is_data
    /// || message_type != PD_CONTROL_GOOD_CRC)`): the target must be one
    /// this port acknowledges, the sender must be presenting as DFP, and
    /// the frame must not itself be a GoodCRC (acking a GoodCRC would just
    /// echo our own outbound message back at the source).
    fn queue_ack_if_needed(&mut self, idx: usize) {
        let buf = self.pool.get(idx);
        let Some(target) = buf.target else { return };
        if buf.length < 2 {
            return;
        }
        if !should_acknowledge(target, self.config.emarker_emulation) {
            return;
        }
        let raw = u16::from_le_bytes([buf.payload[0], buf.payload[1]]);
        let header = MessageHeader::parse(raw);
        if !header.data_role {
            return;
        }
        let is_good_crc = header.num_data_objects == 0
            && ControlMessageType::from_code(header.message_type) == Some(ControlMessageType::GoodCrc);
        if is_good_crc {
            return;
        }
        let _ = self.acks.push_back(PendingAck {
            target,
            message_id: header.message_id,
        });
    }

    /// Drains and processes any frame the RX framer has finished decoding,
    /// applying its effect to the negotiated policy state. Mirrors the
    /// message-dispatch half of `pd_protocol_task`.
    ///
    /// Returns the buffer index to the pool once consumed.
    pub fn poll_protocol(&mut self) -> Option<usize> {
        let idx = self.receiver.take_finished()?;
        let buf = self.pool.get(idx);
        if buf.length >= 2 {
            let raw = u16::from_le_bytes([buf.payload[0], buf.payload[1]]);
            let header = MessageHeader::parse(raw);
            if header.num_data_objects == 0 {
                self.state.apply_control_message(header);
            } else if DataMessageType::from_code(header.message_type)
                == Some(DataMessageType::SourceCapabilities)
            {
                if let Ok(msg) = Message::parse(raw, &buf.payload[2..buf.length]) {
                    self.state.select_request_object(msg.pdos());
                }
            }
        }
        self.pool.release(idx);
        Some(idx)
    }

    /// Pops the next queued GoodCRC reply, if any, building its wire payload.
    pub fn next_ack_payload(&mut self) -> Option<(SopTarget, heapless::Vec<u8, MAX_PAYLOAD_LEN>)> {
        let ack = self.acks.pop_front()?;
        Some((ack.target, build_good_crc(ack.target, ack.message_id, self.config.goodcrc_spec_revision)))
    }

    /// Starts sending a Request for the currently selected capability object,
    /// per `pd_refresh_request`. No-ops if a send is already in progress.
    pub fn begin_request(&mut self, now: u64) -> Result<(), PdError> {
        if self.tx.is_some() {
            return Ok(());
        }
        if !self.state.request_due(now, REQUEST_REFRESH_MS as u64 * 1000) {
            return Ok(());
        }
        self.state.message_id = self.state.message_id.wrapping_add(1) % 8;
        let header = MessageHeader {
            extended: false,
            num_data_objects: 1,
            message_id: self.state.message_id,
            power_role: false,
            spec_revision: self.config.goodcrc_spec_revision,
            data_role: false,
            message_type: DataMessageType::Request.code(),
        };
        let pdo = self.state.build_request_pdo();
        let _ = frame_payload(header.build(), &[pdo]).map_err(PdError::from)?;
        self.tx = Some(TxEngine::new(SopTarget::Sop, self.state.message_id, self.config.max_tx_retries));
        self.state.request_last_timestamp = now;
        Ok(())
    }

    /// Drives the in-flight TX attempt (a Request built by
    /// [`Self::begin_request`]), retrying on a [`crate::consts::GOODCRC_WAIT_MS`]
    /// timeout and surfacing the outcome once it stops being in-flight.
    /// `now` is the same monotonic microsecond clock passed to
    /// [`Self::begin_request`].
    ///
    /// Returns `None` while there is nothing to drive, or once the attempt
    /// is still streaming or awaiting a GoodCRC. Returns `Some(Ok(()))` once
    /// acknowledged, or `Some(Err(_))` once the retry budget is exhausted —
    /// either way the in-flight attempt is cleared so a new one can start.
    pub fn drive_tx(&mut self, now: u64, data: &[u8], sink: &mut impl PulseSink) -> Option<Result<(), TxError>> {
        let engine = self.tx.as_mut()?;
        match engine.drive(data, sink, now) {
            Ok(()) => {
                self.tx = None;
                Some(Ok(()))
            }
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(err)) => {
                self.tx = None;
                Some(Err(err))
            }
        }
    }

    /// Call when a GoodCRC arrives acknowledging our outbound message.
    pub fn on_good_crc(&mut self, message_id: u8) {
        if let Some(engine) = self.tx.as_mut() {
            if engine.on_good_crc(message_id) {
                self.tx = None;
            }
        }
    }

    /// Resets the entire engine to its post-(re)connect defaults, mirroring
    /// `pd_state_reset` on a Hard Reset.
    pub fn reset(&mut self) {
        self.receiver = BmcReceiver::new();
        self.state = PortState::reset(&self.config);
        self.tx = None;
        self.acks.clear();
    }
}

const _: () = assert!(MAX_PDOS >= 1);
