//! Sender lifecycle finite-state machine.
//!
//! The send side of a connection moves through a short, one-way life:
//!
//! ```text
//!  Closed ──SYN sent──▶ SynSent ──SYN acked──▶ Established
//!                          │                        │
//!                          └────────FIN sent────────┤
//!                                                   ▼
//!                        Done ◀──FIN acked──── FinSent
//! ```
//!
//! `Reset` is an orthogonal absorbing state, entered from anywhere when an
//! RST is received or emitted; once there, no data flows again.
//!
//! Modelling this as an enum instead of `syn_sent`/`fin_sent` booleans
//! keeps the impossible combinations unrepresentable and gives the
//! transitions one place to live.

/// All possible states of the send side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    /// No sequence number consumed yet; the SYN is still owed.
    Closed,
    /// SYN is in flight, not yet acknowledged.
    SynSent,
    /// SYN acknowledged; stream bytes are flowing.
    Established,
    /// FIN emitted; waiting for it to be acknowledged.
    FinSent,
    /// FIN acknowledged; every sequence number sent has been accepted.
    Done,
    /// RST seen or emitted.  Absorbing: no further data is ever sent.
    Reset,
}

impl SendState {
    /// Has the SYN been emitted (in any state past `Closed`)?
    pub fn syn_sent(self) -> bool {
        !matches!(self, SendState::Closed)
    }

    /// Has the FIN been emitted?
    pub fn fin_sent(self) -> bool {
        matches!(self, SendState::FinSent | SendState::Done)
    }
}

impl Default for SendState {
    fn default() -> Self {
        Self::Closed
    }
}

impl std::fmt::Display for SendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_track_lifecycle() {
        assert!(!SendState::Closed.syn_sent());
        assert!(SendState::SynSent.syn_sent());
        assert!(!SendState::Established.fin_sent());
        assert!(SendState::FinSent.fin_sent());
        assert!(SendState::Done.fin_sent());
    }

    #[test]
    fn default_is_closed() {
        assert_eq!(SendState::default(), SendState::Closed);
    }
}
