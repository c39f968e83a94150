//! 32-bit wrapping sequence numbers.
//!
//! On the wire every sequence number is 32 bits and wraps modulo `2^32`,
//! starting from a per-connection zero point (the ISN).  Internally the
//! engine works with 64-bit *absolute* sequence numbers that never wrap.
//! [`Wrap32`] converts between the two: `wrap` projects an absolute number
//! onto the wire, and `unwrap` recovers the absolute number closest to a
//! 64-bit checkpoint, which is always unambiguous as long as the two are
//! within `2^31` of each other.

use std::fmt;
use std::ops::Add;

/// A 32-bit sequence number relative to a connection's zero point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Wrap32(u32);

impl Wrap32 {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw on-wire representation.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Project an absolute sequence number onto the wire:
    /// `(zero_point + n) mod 2^32`.
    pub fn wrap(n: u64, zero_point: Wrap32) -> Wrap32 {
        Wrap32(zero_point.0.wrapping_add(n as u32))
    }

    /// Recover the absolute sequence number that wraps to `self` and lies
    /// closest to `checkpoint`.
    ///
    /// A tie (the two candidates equidistant from the checkpoint) resolves
    /// toward the smaller candidate; when the smaller candidate would be
    /// negative, the non-negative one is returned.
    pub fn unwrap(self, zero_point: Wrap32, checkpoint: u64) -> u64 {
        const HALF: u64 = 1 << 31;
        const FULL: u64 = 1 << 32;

        let offset = u64::from(self.0.wrapping_sub(Self::wrap(checkpoint, zero_point).0));
        let ahead = checkpoint + offset;
        if offset >= HALF && ahead >= FULL {
            ahead - FULL
        } else {
            ahead
        }
    }
}

impl Add<u32> for Wrap32 {
    type Output = Wrap32;

    fn add(self, rhs: u32) -> Wrap32 {
        Wrap32(self.0.wrapping_add(rhs))
    }
}

impl fmt::Display for Wrap32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_from_zero_point() {
        let zero = Wrap32::new(3 << 28);
        assert_eq!(Wrap32::wrap(0, zero), zero);
        assert_eq!(Wrap32::wrap(17, zero), zero + 17);
        // Far past one wrap of the 32-bit space.
        assert_eq!(Wrap32::wrap(1 << 32, zero), zero);
        assert_eq!(Wrap32::wrap((1 << 32) + 5, zero), zero + 5);
    }

    #[test]
    fn wrap_overflows_modularly() {
        let zero = Wrap32::new(u32::MAX - 1);
        assert_eq!(Wrap32::wrap(3, zero).raw(), 1);
    }

    #[test]
    fn unwrap_near_checkpoint() {
        let zero = Wrap32::new(0);
        assert_eq!(Wrap32::new(10).unwrap(zero, 0), 10);
        // Checkpoint far along the stream selects the nearby wrap cycle.
        let checkpoint = (1u64 << 32) + 100;
        assert_eq!(Wrap32::new(10).unwrap(zero, checkpoint), (1 << 32) + 10);
    }

    #[test]
    fn unwrap_selects_cycle_behind_checkpoint() {
        let zero = Wrap32::new(0);
        // Sequence number just behind the checkpoint's projection.
        let checkpoint = (1u64 << 33) + 5;
        assert_eq!(Wrap32::new(u32::MAX).unwrap(zero, checkpoint), (1 << 33) - 1);
    }

    #[test]
    fn unwrap_wrapped_seqno_near_zero_checkpoint() {
        // ISN close to the top of the space: the first few payload bytes
        // already wrap, and the absolute value must stay small, not jump a
        // full cycle.
        let zero = Wrap32::new(u32::MAX - 1);
        assert_eq!(Wrap32::new(0).unwrap(zero, 0), 2);
    }

    #[test]
    fn round_trip_identity() {
        for &(n, z) in &[
            (0u64, 0u32),
            (1, u32::MAX),
            (u32::MAX as u64, 5),
            ((1 << 40) + 12_345, 0xdead_beef),
        ] {
            let zero = Wrap32::new(z);
            assert_eq!(Wrap32::wrap(n, zero).unwrap(zero, n), n, "n={n} z={z}");
        }
    }

    #[test]
    fn round_trip_randomized() {
        use rand::Rng;
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let zero = Wrap32::new(rng.random());
            let n: u64 = rng.random_range(0..1 << 50);
            // Checkpoint anywhere within the unambiguous half-cycle.
            let slack = rng.random_range(0..1u64 << 31);
            let checkpoint = if rng.random() {
                n + slack
            } else {
                n.saturating_sub(slack)
            };
            assert_eq!(Wrap32::wrap(n, zero).unwrap(zero, checkpoint), n);
        }
    }

    #[test]
    fn unwrap_stays_within_half_cycle_of_checkpoint() {
        use rand::Rng;
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let zero = Wrap32::new(rng.random());
            let seq = Wrap32::new(rng.random());
            let checkpoint: u64 = rng.random_range(0..1 << 50);
            let n = seq.unwrap(zero, checkpoint);
            assert!(n.abs_diff(checkpoint) <= 1 << 31, "n={n} checkpoint={checkpoint}");
        }
    }

    #[test]
    fn tie_breaks_toward_smaller_candidate() {
        let zero = Wrap32::new(0);
        // Both 0 and 2^32 wrap to 0 and are 2^31 away from the checkpoint.
        assert_eq!(Wrap32::new(0).unwrap(zero, 1 << 31), 0);
        // One cycle later, the tie again resolves to the smaller value.
        assert_eq!(Wrap32::new(0).unwrap(zero, 3 << 31), 1 << 32);
    }

    #[test]
    fn offset_addition() {
        assert_eq!(Wrap32::new(5) + 1, Wrap32::new(6));
        assert_eq!(Wrap32::new(u32::MAX) + 1, Wrap32::new(0));
    }
}
