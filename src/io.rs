//! Pulse-stream I/O traits bridging this engine to a concrete peripheral.
//!
//! The reference firmware drives an RMT (Remote Control Transceiver)
//! peripheral: RX captures alternating pulse durations off a CC line, TX
//! emits them back out. This crate has no hardware dependency of its own,
//! so [`PulseSource`] and [`PulseSink`] stand in for that peripheral;
//! platform crates implement them against their own RMT, PIO, or bit-banged
//! timer driver.

/// A source of captured pulse durations, in tenths of a microsecond. A
/// duration of `0` signals line idle, the same out-of-band "reception
/// ended" marker the reference ISR uses.
pub trait PulseSource {
    /// Non-blocking read of the next pulse duration, if one is ready.
    fn poll_pulse(&mut self) -> Option<u32>;
}

/// A sink that emits pulse durations (tenths of a microsecond) onto the
/// line, alternating level on every call as BMC requires.
pub trait PulseSink {
    /// Queues one pulse of the given duration for transmission.
    ///
    /// Returns `false` if the sink's internal buffer is full and the pulse
    /// was not accepted; the caller should retry after the sink has made
    /// progress.
    fn push_pulse(&mut self, duration_tenth_us: u32) -> bool;

    /// Whether a previously queued burst of pulses has finished draining.
    fn is_idle(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Deque;

    struct TestSink {
        queue: Deque<u32, 16>,
    }

    impl PulseSink for TestSink {
        fn push_pulse(&mut self, duration_tenth_us: u32) -> bool {
            self.queue.push_back(duration_tenth_us).is_ok()
        }

        fn is_idle(&self) -> bool {
            self.queue.is_empty()
        }
    }

    #[test]
    fn sink_reports_idle_once_drained() {
        let mut sink = TestSink { queue: Deque::new() };
        assert!(sink.is_idle());
        assert!(sink.push_pulse(16));
        assert!(!sink.is_idle());
    }
}
