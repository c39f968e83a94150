//! Bounded byte pipe between a writer and a reader.
//!
//! [`ByteStream`] is the foundation both halves of the engine are built on:
//! the sender drains one as its outbound source, and the reassembler fills
//! one as its in-order output.  It is a finite-capacity FIFO of octets with
//! end-of-stream and error signalling:
//!
//! - The writer `push`es bytes (bounded by `available_capacity`; excess is
//!   silently discarded) and eventually `close`s its side.
//! - The reader `peek`s at the contiguous front of the buffer and `pop`s
//!   consumed bytes, freeing capacity for the writer.
//! - Either side can poison the stream with a sticky [`StreamError`].
//!
//! The stream is single-producer / single-consumer: interleaving two
//! concurrent pushers or two concurrent poppers is undefined.

use std::collections::VecDeque;

use thiserror::Error;

// ---------------------------------------------------------------------------
// StreamError
// ---------------------------------------------------------------------------

/// Why a stream was poisoned.
///
/// The error is sticky: the first kind latched wins and later calls to
/// [`ByteStream::set_error`] are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The peer reset the connection (RST received).
    #[error("stream reset by peer")]
    Reset,
    /// The local application abandoned the stream.
    #[error("stream aborted locally")]
    Aborted,
}

// ---------------------------------------------------------------------------
// ByteStream
// ---------------------------------------------------------------------------

/// A bounded, in-order byte buffer with EOF and error flags.
#[derive(Debug)]
pub struct ByteStream {
    /// Maximum number of bytes the stream will buffer at once.
    capacity: usize,

    /// Bytes pushed but not yet popped, oldest at the front.
    buffer: VecDeque<u8>,

    /// Cumulative bytes ever accepted by `push`.
    pushed: u64,

    /// Cumulative bytes ever removed by `pop`.
    popped: u64,

    /// Writer has signalled end of stream; no further pushes are accepted.
    closed: bool,

    /// Sticky error, if any.
    error: Option<StreamError>,
}

impl ByteStream {
    /// Create a stream that buffers at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            pushed: 0,
            popped: 0,
            closed: false,
            error: None,
        }
    }

    // -----------------------------------------------------------------------
    // Writer side
    // -----------------------------------------------------------------------

    /// Append as much of `data` as fits in the remaining capacity.
    ///
    /// Returns the number of bytes accepted.  Excess bytes are silently
    /// discarded; a closed or errored stream accepts nothing.
    pub fn push(&mut self, data: &[u8]) -> usize {
        if self.closed || self.error.is_some() {
            return 0;
        }
        let n = data.len().min(self.available_capacity());
        self.buffer.extend(&data[..n]);
        self.pushed += n as u64;
        n
    }

    /// Signal that no further bytes will be pushed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Latch a sticky error on the stream.
    ///
    /// Does not close the stream; the first kind latched wins.
    pub fn set_error(&mut self, error: StreamError) {
        self.error.get_or_insert(error);
    }

    // -----------------------------------------------------------------------
    // Reader side
    // -----------------------------------------------------------------------

    /// View the contiguous front of the buffered bytes without consuming them.
    ///
    /// The view is non-empty whenever `bytes_buffered() > 0` but may be
    /// shorter than `bytes_buffered()`; callers loop `peek`/`pop` to drain.
    /// It is valid until the next mutating operation.
    pub fn peek(&self) -> &[u8] {
        self.buffer.as_slices().0
    }

    /// Remove up to `n` bytes from the front of the buffer.
    pub fn pop(&mut self, n: usize) {
        let n = n.min(self.buffer.len());
        self.buffer.drain(..n);
        self.popped += n as u64;
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Cumulative bytes accepted by `push`.
    pub fn bytes_pushed(&self) -> u64 {
        self.pushed
    }

    /// Cumulative bytes removed by `pop`.
    pub fn bytes_popped(&self) -> u64 {
        self.popped
    }

    /// Bytes currently buffered (pushed but not yet popped).
    pub fn bytes_buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Room left for the writer right now.
    pub fn available_capacity(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    /// Has the writer closed its side?
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closed *and* fully drained: the reader has seen every byte.
    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    /// Has an error been latched?
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<StreamError> {
        self.error
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
