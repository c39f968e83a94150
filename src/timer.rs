//! Retransmission timing for the sender.
//!
//! The engine has no wall clock: the caller reports elapsed time through
//! `tick(ms)`.  [`RetransmitTimer`] keeps the RTO bookkeeping for the one
//! logical timer TCP needs: armed for the *oldest* unacknowledged
//! segment, doubled on each expiry (exponential back-off, RFC 6298 §5.5),
//! and restored to the initial RTO whenever an acknowledgement makes
//! progress.

/// Adjustable timeout parameters, in milliseconds.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// RTO before any back-off has happened.
    pub initial_rto: u64,
    /// Ceiling for the exponentially backed-off RTO.
    pub max_rto: u64,
}

impl TimerConfig {
    /// Default back-off ceiling, as a multiple of the initial RTO.
    const MAX_BACKOFF_FACTOR: u64 = 1 << 16;

    /// Config with the given initial RTO and the default ceiling.
    pub fn new(initial_rto: u64) -> Self {
        Self {
            initial_rto,
            max_rto: initial_rto.saturating_mul(Self::MAX_BACKOFF_FACTOR),
        }
    }
}

/// The single logical timer covering the oldest unacknowledged segment.
///
/// The timer does not restart itself on expiry: `tick` keeps reporting the
/// expiry until the owner retransmits and calls [`restart`](Self::restart).
#[derive(Debug)]
pub struct RetransmitTimer {
    config: TimerConfig,

    /// Current RTO; grows by doubling, capped at `config.max_rto`.
    rto: u64,

    /// Milliseconds accumulated since the timer was last (re)started.
    /// `None` while the timer is stopped.
    elapsed: Option<u64>,
}

impl RetransmitTimer {
    pub fn new(config: TimerConfig) -> Self {
        let rto = config.initial_rto;
        Self {
            config,
            rto,
            elapsed: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Current retransmission timeout in milliseconds.
    pub fn rto(&self) -> u64 {
        self.rto
    }

    /// Arm the timer if it is not already running.
    pub fn start(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(0);
        }
    }

    /// Re-arm from zero with the current RTO.
    pub fn restart(&mut self) {
        self.elapsed = Some(0);
    }

    pub fn stop(&mut self) {
        self.elapsed = None;
    }

    /// Advance the clock; returns `true` when the timeout has fired.
    pub fn tick(&mut self, ms: u64) -> bool {
        match self.elapsed.as_mut() {
            Some(elapsed) => {
                *elapsed = elapsed.saturating_add(ms);
                *elapsed >= self.rto
            }
            None => false,
        }
    }

    /// Double the RTO after an expiry, up to the configured ceiling.
    pub fn back_off(&mut self) {
        self.rto = self.rto.saturating_mul(2).min(self.config.max_rto);
    }

    /// Restore the initial RTO after forward progress.
    pub fn reset(&mut self) {
        self.rto = self.config.initial_rto;
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
