//! Double-hashing probe sequence.
//!
//! Two derived hash values drive the walk: `h1` picks the home slot and
//! `h2` the stride between candidates. Both are masked to 30 bits so the
//! derivation behaves identically regardless of how wide the hasher's
//! output is; the stride gets a constant offset so it is never zero.
//!
//! The sequence is bounded: at most [`MAX_PROBES`] candidates are visited
//! per operation. A bounded walk can fail to find a key or a free slot even
//! in a table with room left; callers decide what that means (grow-and-retry
//! for insertion, hard failure for lookup).

/// Maximum number of slots visited per probe walk.
pub const MAX_PROBES: usize = 10;

#[inline]
fn h1(hash: u64) -> usize {
    (hash & 0x3FFF_FFFF) as usize
}

#[inline]
fn h2(hash: u64) -> usize {
    ((hash >> 16) & 0x3FFF_FFFF) as usize + 7
}

/// Iterator over the candidate slot indices for one key.
///
/// Yields at most `MAX_PROBES` indices in `[0, capacity)`. The stride is
/// not reduced to be coprime with the capacity, so the walk may revisit
/// slots when `h2 % capacity` shares a factor with the capacity; the bound
/// keeps that cheap and the caller's retry policy makes it harmless.
pub(crate) struct ProbeSeq {
    ix: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl ProbeSeq {
    pub(crate) fn new(hash: u64, capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            ix: h1(hash) % capacity,
            step: h2(hash),
            capacity,
            remaining: MAX_PROBES,
        }
    }
}

impl Iterator for ProbeSeq {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let ix = self.ix;
        self.ix = (self.ix + self.step) % self.capacity;
        Some(ix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_exactly_max_probes_in_range() {
        let cap = 21;
        let seq: Vec<usize> = ProbeSeq::new(0xDEAD_BEEF_CAFE_F00D, cap).collect();
        assert_eq!(seq.len(), MAX_PROBES);
        assert!(seq.iter().all(|&ix| ix < cap));
    }

    #[test]
    fn stride_is_constant_and_nonzero() {
        let cap = 101;
        let seq: Vec<usize> = ProbeSeq::new(42, cap).collect();
        let step = (cap + seq[1] - seq[0]) % cap;
        assert_ne!(step, 0, "stride of zero would probe one slot forever");
        for w in seq.windows(2) {
            assert_eq!((cap + w[1] - w[0]) % cap, step);
        }
    }

    #[test]
    fn zero_hash_has_minimum_stride() {
        // h1(0) = 0, h2(0) = 7: the walk starts at the home slot and
        // advances by the constant offset.
        let seq: Vec<usize> = ProbeSeq::new(0, 10).collect();
        assert_eq!(seq, vec![0, 7, 4, 1, 8, 5, 2, 9, 6, 3]);
    }

    #[test]
    fn deterministic_per_hash() {
        let a: Vec<usize> = ProbeSeq::new(0x1234_5678, 43).collect();
        let b: Vec<usize> = ProbeSeq::new(0x1234_5678, 43).collect();
        assert_eq!(a, b);
    }
}
