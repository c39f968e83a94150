//! `tcp-transport` — the transport core of a user-space TCP.
//!
//! # Architecture
//!
//! ```text
//!  Application                                        Application
//!      │ push/close                                        ▲ peek/pop
//!      ▼                                                   │
//!  ┌───────────┐                                     ┌───────────┐
//!  │ ByteStream│ (outbound)              (inbound)   │ ByteStream│
//!  └────┬──────┘                                     └─────▲─────┘
//!       │                                                  │
//!  ┌────▼──────┐  TcpSenderMessage   ┌─────────────┐ ┌─────┴───────┐
//!  │ TcpSender │────────────────────▶│ TcpReceiver │─│ Reassembler │
//!  └────▲──────┘     (via wire)      └──────┬──────┘ └─────────────┘
//!       │                                   │
//!       └────────────TcpReceiverMessage─────┘
//!              (ackno + window, via wire)
//! ```
//!
//! Each module has a single responsibility:
//! - [`byte_stream`] — bounded in-order byte pipe with EOF and error flags
//! - [`wrap32`]      — 32-bit wrapping sequence-number arithmetic
//! - [`message`]     — segment value types exchanged between the halves
//! - [`reassembler`] — out-of-order substring reassembly
//! - [`receiver`]    — inbound segments → stream; acknowledgement source
//! - [`state`]       — send-side lifecycle state machine
//! - [`timer`]       — tick-driven retransmission timing
//! - [`sender`]      — windowed segmentation and reliable delivery
//!
//! The engine is sans-I/O and single-threaded: no sockets, no wire codec,
//! no clock.  The embedding adapter moves [`message::TcpSenderMessage`] /
//! [`message::TcpReceiverMessage`] values between peers, hands a
//! `transmit` closure to [`sender::TcpSender::push`] and
//! [`sender::TcpSender::tick`], and reports elapsed milliseconds through
//! `tick`.

pub mod byte_stream;
pub mod message;
pub mod reassembler;
pub mod receiver;
pub mod sender;
pub mod state;
pub mod timer;
pub mod wrap32;

pub use byte_stream::{ByteStream, StreamError};
pub use message::{TcpReceiverMessage, TcpSenderMessage, MAX_PAYLOAD_SIZE};
pub use reassembler::Reassembler;
pub use receiver::TcpReceiver;
pub use sender::TcpSender;
pub use state::SendState;
pub use timer::{RetransmitTimer, TimerConfig};
pub use wrap32::Wrap32;
