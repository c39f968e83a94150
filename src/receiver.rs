//! Inbound half of the connection: segments in, acknowledgements out.
//!
//! [`TcpReceiver`] translates wire-level [`TcpSenderMessage`]s into stream
//! operations on its [`Reassembler`]:
//!
//! - The first SYN pins the connection's zero point; every later seqno is
//!   unwrapped against it (using the bytes already assembled as the
//!   checkpoint) to recover the 0-based stream index of the payload.
//! - Segments arriving before the SYN, or claiming the SYN's own sequence
//!   slot, are ignored.
//! - RST poisons the output stream and latches: nothing after it is
//!   processed.
//!
//! [`send`](TcpReceiver::send) reports the mirror image back to the peer:
//! the next expected sequence number (counting SYN, assembled bytes, and
//! FIN once the stream closed) and how much buffer space remains.

use crate::byte_stream::{ByteStream, StreamError};
use crate::message::{TcpReceiverMessage, TcpSenderMessage};
use crate::reassembler::Reassembler;
use crate::wrap32::Wrap32;

/// Receive-side state for one connection.
#[derive(Debug)]
pub struct TcpReceiver {
    /// Reassembly buffer feeding the application-visible output stream.
    reassembler: Reassembler,

    /// The peer's ISN; `None` until the first SYN arrives.
    zero_point: Option<Wrap32>,

    /// Latched once an RST is seen; later segments are dropped.
    rst: bool,
}

impl TcpReceiver {
    /// Construct a receiver feeding the given reassembler.
    pub fn new(reassembler: Reassembler) -> Self {
        Self {
            reassembler,
            zero_point: None,
            rst: false,
        }
    }

    /// Process one inbound segment.
    pub fn receive(&mut self, msg: TcpSenderMessage) {
        if msg.rst {
            self.reassembler.output_mut().set_error(StreamError::Reset);
            self.rst = true;
            log::debug!("[receiver] ← RST");
            return;
        }
        if self.rst {
            return;
        }

        if msg.syn && self.zero_point.is_none() {
            self.zero_point = Some(msg.seqno);
            log::debug!("[receiver] ← SYN isn={}", msg.seqno);
        }
        let Some(zero_point) = self.zero_point else {
            return; // nothing before the SYN means anything
        };

        // The SYN occupies one sequence number; payload starts after it.
        let seqno = if msg.syn { msg.seqno + 1 } else { msg.seqno };
        let checkpoint = self.reassembler.output().bytes_pushed() + 1;
        let abs_seqno = seqno.unwrap(zero_point, checkpoint);
        if abs_seqno == 0 {
            return; // a non-SYN segment claiming the ISN slot
        }
        self.reassembler.insert(abs_seqno - 1, &msg.payload, msg.fin);
    }

    /// Build the acknowledgement to send back to the peer.
    pub fn send(&self) -> TcpReceiverMessage {
        let output = self.reassembler.output();
        let ackno = self.zero_point.map(|zero_point| {
            // SYN, then every assembled byte, then FIN once the stream closed.
            let next = 1 + output.bytes_pushed() + u64::from(output.is_closed());
            Wrap32::wrap(next, zero_point)
        });
        TcpReceiverMessage {
            ackno,
            window_size: output.available_capacity().min(u16::MAX as usize) as u16,
            rst: output.has_error(),
        }
    }

    /// The reassembler (for `bytes_pending` and output observers).
    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// The assembled output stream.
    pub fn output(&self) -> &ByteStream {
        self.reassembler.output()
    }

    /// Mutable output stream, for the application to pop assembled bytes.
    pub fn output_mut(&mut self) -> &mut ByteStream {
        self.reassembler.output_mut()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
