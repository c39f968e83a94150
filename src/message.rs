//! Logical segment values exchanged between the two transport halves.
//!
//! These are the in-memory shapes of the two directions of TCP traffic:
//! [`TcpSenderMessage`] carries sequence space (SYN, payload, FIN) from a
//! sender to the peer's receiver, and [`TcpReceiverMessage`] carries the
//! acknowledgement and advertised window back.  Wire encoding is the
//! embedding adapter's concern; nothing here touches bytes-on-the-wire.

use crate::wrap32::Wrap32;

/// Most payload bytes a single segment may carry.
pub const MAX_PAYLOAD_SIZE: usize = 1000;

// ---------------------------------------------------------------------------
// TcpSenderMessage
// ---------------------------------------------------------------------------

/// One segment of outbound sequence space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcpSenderMessage {
    /// Sequence number of the first sequence-space item in this segment
    /// (the SYN if present, otherwise the first payload byte).
    pub seqno: Wrap32,
    /// Synchronise: this segment begins the stream and consumes one
    /// sequence number.
    pub syn: bool,
    /// Application bytes, at most [`MAX_PAYLOAD_SIZE`].
    pub payload: Vec<u8>,
    /// Finish: the stream ends here; consumes one sequence number.
    pub fin: bool,
    /// Reset: the connection is dead.  Carries no sequence space.
    pub rst: bool,
}

impl TcpSenderMessage {
    /// How many sequence numbers this segment occupies.
    pub fn sequence_length(&self) -> u64 {
        u64::from(self.syn) + self.payload.len() as u64 + u64::from(self.fin)
    }
}

// ---------------------------------------------------------------------------
// TcpReceiverMessage
// ---------------------------------------------------------------------------

/// The receiver's feedback to the peer's sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpReceiverMessage {
    /// Next sequence number the receiver expects; absent until a SYN has
    /// been seen.
    pub ackno: Option<Wrap32>,
    /// How many more bytes the receiver is willing to buffer.
    pub window_size: u16,
    /// Reset: the receiving stream has errored.
    pub rst: bool,
}
