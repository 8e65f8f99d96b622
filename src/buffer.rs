//! Fixed-size receive buffer slab.
//!
//! The RX framer, the GoodCRC responder, the protocol task, and the
//! logging task all pass the same record around by ownership rather than
//! by copy: whichever stage holds an index is the only one allowed to
//! touch it. [`BufferPool`] hands out and reclaims those indices from a
//! fixed-capacity free list, mirroring the reference firmware's
//! `pd_queue_empty` queue of pre-allocated `pd_rx_buf_t` pointers.

use heapless::Vec;

use crate::consts::{BUFFER_POOL_SIZE, MAX_PAYLOAD_LEN, MAX_SYMBOLS};
use crate::error::PoolError;
use crate::line_code::LineSymbol;
use crate::sop::SopTarget;

/// Classification assigned to a buffer once reception finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    /// Reception ended before a usable frame formed (line noise, Hard Reset).
    Symbols,
    /// A full frame with a valid CRC-32.
    Data,
}

/// One receive record: decoder scratch state plus the captured frame.
#[derive(Debug, Clone, Copy)]
pub struct RxBuffer {
    /// Line symbols captured for this frame, SOP tuple included.
    pub symbols: [LineSymbol; MAX_SYMBOLS],
    /// Number of valid entries in `symbols`.
    pub symbol_count: usize,
    /// Decoded payload bytes (header + objects + CRC), once framed.
    pub payload: [u8; MAX_PAYLOAD_LEN],
    /// Number of valid bytes in `payload`.
    pub length: usize,
    /// SOP* target this frame was addressed to.
    pub target: Option<SopTarget>,
    /// Classification assigned once reception finishes.
    pub buf_type: BufferType,
}

impl Default for RxBuffer {
    fn default() -> Self {
        RxBuffer {
            symbols: [LineSymbol::Error; MAX_SYMBOLS],
            symbol_count: 0,
            payload: [0u8; MAX_PAYLOAD_LEN],
            length: 0,
            target: None,
            buf_type: BufferType::Symbols,
        }
    }
}

impl RxBuffer {
    /// Resets this buffer to a pristine state for reuse, matching the
    /// reference decoder's `memset` on buffer acquisition.
    pub fn reset(&mut self) {
        *self = RxBuffer::default();
    }
}

/// Fixed-capacity pool of [`RxBuffer`] slots, handed out by index.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Vec<RxBuffer, BUFFER_POOL_SIZE>,
    free: Vec<usize, BUFFER_POOL_SIZE>,
}

impl Default for BufferPool {
    fn default() -> Self {
        let mut buffers = Vec::new();
        let mut free = Vec::new();
        for i in 0..BUFFER_POOL_SIZE {
            let _ = buffers.push(RxBuffer::default());
            let _ = free.push(BUFFER_POOL_SIZE - 1 - i);
        }
        BufferPool { buffers, free }
    }
}

impl BufferPool {
    /// Builds a pool with every slot free.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a free slot, returning its index. The slot is reset before
    /// being handed back.
    pub fn acquire(&mut self) -> Result<usize, PoolError> {
        let idx = self.free.pop().ok_or(PoolError::Exhausted)?;
        self.buffers[idx].reset();
        Ok(idx)
    }

    /// Returns a slot to the free list.
    pub fn release(&mut self, idx: usize) {
        if self.free.push(idx).is_err() {
            // Pool corruption (double release past capacity): drop silently,
            // matching the reference's unchecked `xQueueSendFromISR`.
        }
    }

    /// Borrows a slot by index.
    pub fn get(&self, idx: usize) -> &RxBuffer {
        &self.buffers[idx]
    }

    /// Mutably borrows a slot by index.
    pub fn get_mut(&mut self, idx: usize) -> &mut RxBuffer {
        &mut self.buffers[idx]
    }

    /// Number of slots currently free.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_starts_fully_free() {
        let pool = BufferPool::new();
        assert_eq!(pool.free_count(), BUFFER_POOL_SIZE);
    }

    #[test]
    fn acquire_drains_and_release_restores() {
        let mut pool = BufferPool::new();
        let idx = pool.acquire().unwrap();
        assert_eq!(pool.free_count(), BUFFER_POOL_SIZE - 1);
        pool.release(idx);
        assert_eq!(pool.free_count(), BUFFER_POOL_SIZE);
    }

    #[test]
    fn exhausting_pool_returns_error() {
        let mut pool = BufferPool::new();
        let mut held = Vec::<usize, BUFFER_POOL_SIZE>::new();
        for _ in 0..BUFFER_POOL_SIZE {
            let _ = held.push(pool.acquire().unwrap());
        }
        assert_eq!(pool.acquire(), Err(PoolError::Exhausted));
    }

    #[test]
    fn acquired_buffer_is_reset() {
        let mut pool = BufferPool::new();
        let idx = pool.acquire().unwrap();
        pool.get_mut(idx).symbol_count = 12;
        pool.release(idx);
        let idx2 = pool.acquire().unwrap();
        assert_eq!(pool.get(idx2).symbol_count, 0);
    }
}
