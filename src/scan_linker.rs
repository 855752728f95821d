//! Stitches consecutive MS1 scans together by carrying recent mass bins forward (§4.8).
//!
//! Fragmentation (MS2+) spectra never participate: each is deconvoluted independently of MS1
//! history, so the engine only touches this FIFO for MS1 spectra.

use std::collections::VecDeque;

use crate::bitset::DynamicBitset;

/// A bounded FIFO of recent MS1 spectra's own mass-bin selections.
///
/// Owns no reference to a particular [`crate::Engine`]; callers processing multiple streams in
/// parallel give each stream its own linker (or serialise access to a shared one), since MS1
/// continuity is inherently an ordered, single-stream concept.
#[derive(Clone, Debug)]
pub struct ScanLinker {
    entries: VecDeque<(Vec<usize>, f64)>,
    capacity: usize,
}

impl ScanLinker {
    /// A linker retaining at most `capacity` prior MS1 spectra's mass bins.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Whether no prior MS1 spectrum has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-project every retained entry's mass-bin indices onto a mass axis with the given minimum
    /// value and bin width, producing the carried-forward candidate bitset for the current
    /// spectrum.
    pub fn carried_forward(&self, mass_bin_count: usize, mass_bin_min_value: f64, bin_width: f64) -> DynamicBitset {
        let mut bits = DynamicBitset::new(mass_bin_count);
        for (indices, old_min_value) in &self.entries {
            let shift = ((mass_bin_min_value - old_min_value) * bin_width).round() as i64;
            bits.set_shifted(indices.iter().copied(), shift);
        }
        bits
    }

    /// Record the mass-bin indices selected by this spectrum's own evidence, dropping the oldest
    /// entry first if the FIFO is already at capacity.
    pub fn push(&mut self, indices: Vec<usize>, mass_bin_min_value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((indices, mass_bin_min_value));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn a_fresh_linker_carries_nothing_forward() {
        let linker = ScanLinker::new(3);
        let bits = linker.carried_forward(10, 0.0, 1.0);
        assert!(bits.none_set());
    }

    #[test]
    fn pushed_bins_reappear_shifted_by_the_new_axis_origin() {
        let mut linker = ScanLinker::new(3);
        linker.push(vec![5, 7], 0.0);
        // the new spectrum's mass axis starts one bin-width higher, so indices shift down by 1
        let bits = linker.carried_forward(20, 1.0, 1.0);
        assert!(bits.test(4));
        assert!(bits.test(6));
    }

    #[test]
    fn capacity_is_respected_fifo_style() {
        let mut linker = ScanLinker::new(1);
        linker.push(vec![1], 0.0);
        linker.push(vec![2], 0.0);
        let bits = linker.carried_forward(10, 0.0, 1.0);
        assert!(!bits.test(1));
        assert!(bits.test(2));
    }

    #[test]
    fn zero_capacity_never_retains_anything() {
        let mut linker = ScanLinker::new(0);
        linker.push(vec![1], 0.0);
        assert!(linker.is_empty());
    }
}
