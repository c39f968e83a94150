//! Out-of-order substring reassembly.
//!
//! [`Reassembler`] sits between the receiver and its output [`ByteStream`].
//! Fragments arrive as `(first_index, data, is_last)` tuples, possibly out
//! of order, duplicated, or overlapping, and must come out the far side as
//! one contiguous, in-order stream:
//!
//! - A fragment starting at the next expected index is written through to
//!   the output immediately.
//! - A fragment starting further ahead is buffered until the gap before it
//!   closes, as long as it fits inside the acceptance window
//!   `[next_index, next_index + available_capacity)`.
//! - Bytes past the acceptance window are discarded for good; the peer will
//!   retransmit them once the window advances.
//!
//! Buffered fragments are keyed by start index in a `BTreeMap`, so the
//! neighbors of any insertion are a couple of `O(log n)` lookups away.
//! Overlap is repaired by trimming the tail of the earlier-starting
//! fragment of each overlapping pair; fragments stay contiguous, which
//! keeps the write-through path a plain map walk once a gap closes.

use std::collections::BTreeMap;

use crate::byte_stream::ByteStream;

/// Reassembles indexed substrings into an in-order byte stream.
#[derive(Debug)]
pub struct Reassembler {
    /// Destination stream for in-order bytes.
    output: ByteStream,

    /// Fragments that cannot be written yet, keyed by start index.
    /// Pairwise disjoint, never empty, every key `> next_index`.
    pending: BTreeMap<u64, Vec<u8>>,

    /// Total bytes held in `pending`.
    bytes_pending: u64,

    /// Length of the whole stream, once the last fragment has been seen.
    total_len: Option<u64>,
}

impl Reassembler {
    /// Construct a reassembler writing into `output`.
    pub fn new(output: ByteStream) -> Self {
        Self {
            output,
            pending: BTreeMap::new(),
            bytes_pending: 0,
            total_len: None,
        }
    }

    /// Accept one fragment of the stream.
    ///
    /// `first_index` is the 0-based position of `data`'s first byte in the
    /// overall stream; `is_last` marks the fragment that ends the stream.
    /// Duplicated or overlapping deliveries are welcome; every byte
    /// position is written exactly once.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        if is_last {
            // Set-once; a later conflicting length is a peer bug and is ignored.
            self.total_len.get_or_insert(first_index + data.len() as u64);
        }
        self.dispatch(first_index, data);
        self.drain_pending();
        if self.total_len == Some(self.output.bytes_pushed()) {
            self.output.close();
        }
    }

    /// Bytes buffered inside the reassembler, not yet written to the output.
    pub fn bytes_pending(&self) -> u64 {
        self.bytes_pending
    }

    /// The output stream (read side: peek/pop/observers).
    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    /// Mutable access to the output stream, for popping consumed bytes and
    /// error signalling.  Pushing belongs to the reassembler alone.
    pub fn output_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Next stream index the output expects.
    fn next_index(&self) -> u64 {
        self.output.bytes_pushed()
    }

    /// Classify one fragment: write it through, buffer it, or drop it.
    fn dispatch(&mut self, mut first_index: u64, mut data: &[u8]) {
        let next_index = self.next_index();

        // Clip the prefix that has already been delivered.
        if first_index < next_index {
            let consumed = next_index - first_index;
            if consumed >= data.len() as u64 {
                return;
            }
            data = &data[consumed as usize..];
            first_index = next_index;
        }

        if first_index == next_index {
            // Write through; the stream clips anything past its capacity,
            // which is exactly the acceptance-window bound.
            self.output.push(data);
        } else {
            self.store(first_index, data);
        }
    }

    /// Buffer a fragment that starts beyond `next_index`, clipped to the
    /// acceptance window and merged against its neighbors.
    fn store(&mut self, first_index: u64, data: &[u8]) {
        let window = self.output.available_capacity() as u64;
        let offset = first_index - self.next_index();
        if offset >= window {
            log::trace!("[reassembler] drop fragment at {first_index}: past acceptance window");
            return;
        }
        let keep = ((window - offset) as usize).min(data.len());
        let data = &data[..keep];
        if data.is_empty() {
            return;
        }
        let end = first_index + data.len() as u64 - 1;

        // Fragments are disjoint, so only the nearest earlier-starting one
        // can already cover the newcomer.
        if let Some((&start, frag)) = self.pending.range(..=first_index).next_back() {
            if start + frag.len() as u64 - 1 >= end {
                return;
            }
        }

        // Existing fragments wholly inside the newcomer become redundant.
        let covered: Vec<u64> = self
            .pending
            .range(first_index..=end)
            .filter(|&(&start, frag)| start + frag.len() as u64 - 1 <= end)
            .map(|(&start, _)| start)
            .collect();
        for start in covered {
            let frag = self.pending.remove(&start).expect("key collected above");
            self.bytes_pending -= frag.len() as u64;
        }

        self.bytes_pending += data.len() as u64;
        self.pending.insert(first_index, data.to_vec());

        // Repair partial overlap around the insertion point: for each
        // adjacent pair that overlaps, trim the earlier fragment's tail.
        let from = self
            .pending
            .range(..first_index)
            .next_back()
            .map_or(first_index, |(&start, _)| start);
        let keys: Vec<u64> = self.pending.range(from..=end).map(|(&start, _)| start).collect();
        for pair in keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let a_end = a + self.pending[&a].len() as u64 - 1;
            if a_end >= b {
                let overlap = (a_end - b + 1) as usize;
                let frag = self.pending.get_mut(&a).expect("key collected above");
                frag.truncate(frag.len() - overlap);
                self.bytes_pending -= overlap as u64;
            }
        }
    }

    /// Write out every buffered fragment that has become reachable.
    ///
    /// Each pass removes the smallest key; a removed fragment can only be
    /// written (never re-buffered, its key is `<= next_index`), so the map
    /// strictly shrinks and the loop terminates.
    fn drain_pending(&mut self) {
        loop {
            let Some((&start, _)) = self.pending.first_key_value() else {
                break;
            };
            if start > self.next_index() {
                break;
            }
            let frag = self.pending.remove(&start).expect("first key exists");
            self.bytes_pending -= frag.len() as u64;
            self.dispatch(start, &frag);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
