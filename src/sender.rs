//! Outbound half of the connection: stream in, segments out.
//!
//! [`TcpSender`] drains its input [`ByteStream`] into
//! [`TcpSenderMessage`]s, respecting the peer's advertised flow-control
//! window, and guarantees delivery by keeping every emitted segment in an
//! `outstanding` FIFO until the peer's cumulative acknowledgement covers
//! it.
//!
//! # Sequence-number layout
//!
//! ```text
//!    ackno            next_seqno
//!      │                  │
//!  ────┼──────────────────┼──────────────────▶ absolute seq space
//!      │ ◀── in flight ──▶│ ◀── sendable ───▶
//! ```
//!
//! A single retransmission timer covers the oldest in-flight segment.  On
//! expiry that segment is retransmitted and the RTO doubles (exponential
//! back-off), unless the peer advertised a zero window, in which case the
//! in-flight byte is a window probe and the timeout must not escalate.
//!
//! All I/O is the caller's: `push` and `tick` borrow a `transmit` function
//! and invoke it exactly once per emitted or retransmitted segment.

use std::collections::VecDeque;

use crate::byte_stream::{ByteStream, StreamError};
use crate::message::{TcpReceiverMessage, TcpSenderMessage, MAX_PAYLOAD_SIZE};
use crate::state::SendState;
use crate::timer::{RetransmitTimer, TimerConfig};
use crate::wrap32::Wrap32;

/// Send-side state for one connection.
#[derive(Debug)]
pub struct TcpSender {
    /// Outbound application bytes, not yet segmented.
    input: ByteStream,

    /// Initial sequence number; the connection's zero point.
    isn: Wrap32,

    /// Lifecycle: which of SYN/FIN have been sent and acknowledged.
    state: SendState,

    /// Next absolute sequence number to emit.
    next_seqno: u64,

    /// Highest absolute sequence number the peer has acknowledged.
    ackno: u64,

    /// Sequence numbers emitted but not yet acknowledged.
    in_flight: u64,

    /// The peer's last advertised receive window.
    window_size: u16,

    /// Consecutive retransmissions at a non-zero window.
    consecutive_retx: u64,

    /// Timer for the oldest in-flight segment.
    timer: RetransmitTimer,

    /// Emitted-but-unacknowledged segments, oldest first.
    outstanding: VecDeque<TcpSenderMessage>,
}

impl TcpSender {
    /// Construct a sender draining `input`, with the given ISN and initial
    /// retransmission timeout in milliseconds.
    pub fn new(input: ByteStream, isn: Wrap32, initial_rto_ms: u64) -> Self {
        Self {
            input,
            isn,
            state: SendState::default(),
            next_seqno: 0,
            ackno: 0,
            in_flight: 0,
            // Until the peer says otherwise, assume room for the SYN.
            window_size: 1,
            consecutive_retx: 0,
            timer: RetransmitTimer::new(TimerConfig::new(initial_rto_ms)),
            outstanding: VecDeque::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Outbound path
    // -----------------------------------------------------------------------

    /// Emit as many segments as the peer's window currently permits.
    ///
    /// Each new segment carries SYN if the stream has not started, up to
    /// [`MAX_PAYLOAD_SIZE`] payload bytes, and FIN once the input stream is
    /// finished and the window has room for it.  A zero advertised window
    /// is treated as one sequence number of budget so a probe keeps the
    /// conversation alive.
    pub fn push(&mut self, mut transmit: impl FnMut(&TcpSenderMessage)) {
        if self.input.has_error() {
            if self.state != SendState::Reset {
                self.state = SendState::Reset;
                log::warn!("[sender] input stream errored — emitting RST");
            }
            let rst = self.make_empty_message();
            transmit(&rst);
            return;
        }

        loop {
            if self.state.fin_sent() {
                return;
            }
            let effective_window = u64::from(self.window_size).max(1);
            let budget = effective_window.saturating_sub(self.in_flight);
            if budget == 0 {
                return;
            }

            let mut msg = TcpSenderMessage {
                seqno: Wrap32::wrap(self.next_seqno, self.isn),
                syn: !self.state.syn_sent(),
                ..TcpSenderMessage::default()
            };

            let header = u64::from(msg.syn);
            let take = (budget - header)
                .min(MAX_PAYLOAD_SIZE as u64)
                .min(self.input.bytes_buffered() as u64) as usize;
            let mut payload = Vec::with_capacity(take);
            while payload.len() < take {
                let n = {
                    let chunk = self.input.peek();
                    let n = chunk.len().min(take - payload.len());
                    payload.extend_from_slice(&chunk[..n]);
                    n
                };
                self.input.pop(n);
            }
            msg.payload = payload;

            // FIN rides along once the stream is done, if the window still
            // has a sequence number to spare for it.
            if self.input.is_finished() && header + (msg.payload.len() as u64) < budget {
                msg.fin = true;
            }

            if msg.sequence_length() == 0 {
                return;
            }

            self.state = match (msg.syn, msg.fin, self.state) {
                (_, true, _) => SendState::FinSent,
                (true, false, _) => SendState::SynSent,
                (false, false, state) => state,
            };
            self.next_seqno += msg.sequence_length();
            self.in_flight += msg.sequence_length();
            self.timer.start();
            log::debug!(
                "[sender] → seq={} syn={} len={} fin={} in_flight={}",
                msg.seqno,
                msg.syn,
                msg.payload.len(),
                msg.fin,
                self.in_flight
            );
            self.outstanding.push_back(msg.clone());
            transmit(&msg);
        }
    }

    /// A zero-length segment at the current sequence number.
    ///
    /// Carries RST when the input stream has errored.  Used by the
    /// embedding adapter to acknowledge or reset without sending data;
    /// never enters the retransmission queue.
    pub fn make_empty_message(&self) -> TcpSenderMessage {
        TcpSenderMessage {
            seqno: Wrap32::wrap(self.next_seqno, self.isn),
            rst: self.input.has_error(),
            ..TcpSenderMessage::default()
        }
    }

    // -----------------------------------------------------------------------
    // Inbound feedback
    // -----------------------------------------------------------------------

    /// Process the peer receiver's acknowledgement and window update.
    pub fn receive(&mut self, msg: &TcpReceiverMessage) {
        self.window_size = msg.window_size;

        if msg.rst {
            self.input.set_error(StreamError::Reset);
            self.state = SendState::Reset;
            log::warn!("[sender] ← RST");
            return;
        }

        let Some(ackno) = msg.ackno else {
            return;
        };
        let abs_ackno = ackno.unwrap(self.isn, self.next_seqno);
        if abs_ackno > self.next_seqno {
            // Acknowledges sequence numbers never sent; ignore.
            return;
        }
        if abs_ackno <= self.ackno {
            return;
        }
        self.ackno = abs_ackno;

        // Pop every segment the cumulative ack wholly covers.  A partially
        // covered segment stays queued and is retransmitted whole.
        while let Some(front) = self.outstanding.front() {
            let front_start = front.seqno.unwrap(self.isn, self.ackno);
            if front_start + front.sequence_length() > abs_ackno {
                break;
            }
            self.in_flight -= front.sequence_length();
            self.outstanding.pop_front();
        }

        self.timer.reset();
        self.consecutive_retx = 0;
        if self.outstanding.is_empty() {
            self.timer.stop();
        } else {
            // The oldest unacked segment changed; time it afresh.
            self.timer.restart();
        }

        self.state = match self.state {
            SendState::SynSent => SendState::Established,
            SendState::FinSent if abs_ackno == self.next_seqno => SendState::Done,
            state => state,
        };
        log::debug!("[sender] ← ack={} in_flight={}", abs_ackno, self.in_flight);
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Report `ms` milliseconds of elapsed time; retransmit on expiry.
    ///
    /// Only the oldest outstanding segment is ever retransmitted.  The RTO
    /// doubles per expiry at a non-zero window; at a zero window the
    /// retransmission is a probe and the timeout is left alone.
    pub fn tick(&mut self, ms: u64, mut transmit: impl FnMut(&TcpSenderMessage)) {
        if !self.timer.tick(ms) {
            return;
        }
        let Some(oldest) = self.outstanding.front() else {
            self.timer.stop();
            return;
        };
        log::debug!(
            "[sender] timeout — retransmitting seq={} (retx #{})",
            oldest.seqno,
            self.consecutive_retx + 1
        );
        transmit(oldest);
        if self.window_size > 0 {
            self.consecutive_retx += 1;
            self.timer.back_off();
        }
        self.timer.restart();
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Sequence numbers emitted but not yet acknowledged.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.in_flight
    }

    /// Consecutive retransmissions since the last acknowledged progress.
    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retx
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SendState {
        self.state
    }

    /// The outbound stream the application writes into.
    pub fn input(&self) -> &ByteStream {
        &self.input
    }

    /// Mutable outbound stream, for the application to push and close.
    pub fn input_mut(&mut self) -> &mut ByteStream {
        &mut self.input
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
