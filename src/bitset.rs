//! A dense bitset over 64-bit words.
//!
//! Spec.md §9 asks for "a dense bitset supporting set/reset/test, find_first, find_next, and
//! in-place bitwise union and shift", suggesting either an off-the-shelf bitset or the minimum
//! hand-rolled version using trailing-zero-count over `u64` words. No crate in this pack's
//! retrieval set reaches for a bitset crate anywhere, so the hand-rolled version is the
//! pack-consistent choice here (see `DESIGN.md`).

/// A growable dense bitset, indexed from 0.
#[derive(Clone, Debug, Default)]
pub struct DynamicBitset {
    words: Vec<u64>,
    len: usize,
}

const BITS: usize = u64::BITS as usize;

impl DynamicBitset {
    /// Create a new bitset with `len` bits, all clear.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(BITS)],
            len,
        }
    }

    /// Number of bits in this set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this set has zero bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether no bit is set (a zero-length set counts as empty).
    pub fn none_set(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Set bit `i`. Out-of-range indices are ignored (spectrum-level callers routinely compute
    /// offsets that land outside `[0, len)` and are expected to skip them silently).
    pub fn set(&mut self, i: usize) {
        if i < self.len {
            self.words[i / BITS] |= 1u64 << (i % BITS);
        }
    }

    /// Clear bit `i`.
    pub fn reset(&mut self, i: usize) {
        if i < self.len {
            self.words[i / BITS] &= !(1u64 << (i % BITS));
        }
    }

    /// Test bit `i`. Out-of-range indices read as unset.
    pub fn test(&self, i: usize) -> bool {
        i < self.len && (self.words[i / BITS] >> (i % BITS)) & 1 == 1
    }

    /// Clear every bit.
    pub fn clear(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    /// Index of the first set bit, if any.
    pub fn find_first(&self) -> Option<usize> {
        self.find_next_from(0)
    }

    /// Index of the next set bit strictly after `from`, if any.
    pub fn find_next(&self, from: usize) -> Option<usize> {
        self.find_next_from(from + 1)
    }

    fn find_next_from(&self, start: usize) -> Option<usize> {
        if start >= self.len {
            return None;
        }
        let mut word_idx = start / BITS;
        let bit_idx = start % BITS;
        if word_idx >= self.words.len() {
            return None;
        }
        let mut word = self.words[word_idx] & (!0u64 << bit_idx);
        loop {
            if word != 0 {
                let bit = word_idx * BITS + word.trailing_zeros() as usize;
                return (bit < self.len).then_some(bit);
            }
            word_idx += 1;
            if word_idx >= self.words.len() {
                return None;
            }
            word = self.words[word_idx];
        }
    }

    /// Iterate over all set-bit indices in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        let mut next = self.find_first();
        std::iter::from_fn(move || {
            let cur = next?;
            next = self.find_next(cur);
            Some(cur)
        })
    }

    /// In-place bitwise union: `self |= other`. Bits beyond `self.len()` are ignored.
    pub fn union_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= *b;
        }
    }

    /// Set bit `i - shift` for every set bit `i` in `source`, clamped to `[0, len)`.
    ///
    /// Used by the scan-linker to re-project a previous spectrum's mass bins onto the current
    /// spectrum's bin axis (spec.md §4.8: `massBins[i - shift]`).
    pub fn set_shifted(&mut self, source: impl IntoIterator<Item = usize>, shift: i64) {
        for i in source {
            let j = i as i64 - shift;
            if j >= 0 && (j as usize) < self.len {
                self.set(j as usize);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn set_test_reset() {
        let mut b = DynamicBitset::new(130);
        assert!(!b.test(64));
        b.set(64);
        assert!(b.test(64));
        b.reset(64);
        assert!(!b.test(64));
    }

    #[test]
    fn find_first_and_next_cross_word_boundary() {
        let mut b = DynamicBitset::new(200);
        b.set(5);
        b.set(63);
        b.set(64);
        b.set(150);
        assert_eq!(b.find_first(), Some(5));
        assert_eq!(b.find_next(5), Some(63));
        assert_eq!(b.find_next(63), Some(64));
        assert_eq!(b.find_next(64), Some(150));
        assert_eq!(b.find_next(150), None);
    }

    #[test]
    fn out_of_range_is_noop() {
        let mut b = DynamicBitset::new(10);
        b.set(100);
        assert!(!b.test(100));
    }

    #[test]
    fn iter_ones_collects_all_set_bits() {
        let mut b = DynamicBitset::new(70);
        for i in [0, 1, 63, 64, 69] {
            b.set(i);
        }
        assert_eq!(b.iter_ones().collect::<Vec<_>>(), vec![0, 1, 63, 64, 69]);
    }

    #[test]
    fn union_with_merges_bits() {
        let mut a = DynamicBitset::new(70);
        a.set(3);
        let mut b = DynamicBitset::new(70);
        b.set(65);
        a.union_with(&b);
        assert!(a.test(3));
        assert!(a.test(65));
    }

    #[test]
    fn set_shifted_clamps_out_of_range() {
        let mut b = DynamicBitset::new(10);
        b.set_shifted([2, 5, 20], 3);
        assert!(!b.test(-1i64 as usize));
        assert!(b.test(2));
        assert!(!b.test(3)); // bit 5 -> 2, already set above; 20-3=17 out of range
    }
}
