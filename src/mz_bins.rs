//! The m/z axis: a bitset of occupied bins plus per-bin summed intensity.
//!
//! Every log-m/z peak votes for its nearest bin and, depending on which side of the bin centre
//! it falls, smears a second vote onto the adjacent bin. This softens the quantisation boundary
//! so a peak landing just shy of a bin edge still contributes to the neighbour a slightly
//! different tolerance would have rounded it into.

use crate::bins::{bin_index, bin_value};
use crate::bitset::DynamicBitset;
use crate::log_mz::LogMzPeak;

/// The occupied m/z bins for one spectrum, with summed intensity per bin.
#[derive(Clone, Debug)]
pub struct MzBins {
    pub bins: DynamicBitset,
    pub intensities: Vec<f64>,
    pub min_value: f64,
    pub width: f64,
}

impl MzBins {
    /// Build the m/z bin state for a set of log-m/z peaks.
    ///
    /// `min_value`/`bin_count` are supplied by the caller (derived from the spectrum's own
    /// min/max log-m/z, per the engine's orchestration) rather than recomputed here, since
    /// several axes in the kernel share the same derivation pattern and the engine is the
    /// natural place to keep them consistent.
    pub fn new(peaks: &[LogMzPeak], min_value: f64, bin_count: usize, width: f64) -> Self {
        let mut bins = DynamicBitset::new(bin_count);
        let mut intensities = vec![0.0; bin_count];

        for peak in peaks {
            let bi = bin_index(peak.log_mz, min_value, width);
            if bi >= bin_count {
                continue;
            }
            bins.set(bi);
            intensities[bi] += peak.intensity;

            let delta = peak.log_mz - bin_value(bi, min_value, width);
            if delta > 0.0 && bi + 1 < bin_count {
                bins.set(bi + 1);
                intensities[bi + 1] += peak.intensity;
            } else if delta < 0.0 && bi > 0 {
                bins.set(bi - 1);
                intensities[bi - 1] += peak.intensity;
            }
        }

        Self {
            bins,
            intensities,
            min_value,
            width,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn peak(log_mz: f64, intensity: f64) -> LogMzPeak {
        LogMzPeak {
            mz: log_mz.exp() + crate::log_mz::PROTON_MASS,
            intensity,
            log_mz,
        }
    }

    #[test]
    fn a_peak_sets_its_own_bin_and_intensity() {
        let width = 100_000.0;
        let peaks = [peak(5.0, 42.0)];
        let idx = bin_index(5.0, 0.0, width);
        let mz = MzBins::new(&peaks, 0.0, idx + 2, width);
        assert!(mz.bins.test(idx));
        assert!((mz.intensities[idx] - 42.0).abs() < 1e-9);
    }

    #[test]
    fn a_peak_above_its_bin_centre_smears_into_the_next_bin() {
        let width = 100_000.0;
        let min_value = 0.0;
        let idx = 5usize;
        let centre = bin_value(idx, min_value, width);
        let peaks = [peak(centre + 0.3 / width, 10.0)];
        let mz = MzBins::new(&peaks, min_value, idx + 2, width);
        assert!(mz.bins.test(idx));
        assert!(mz.bins.test(idx + 1));
        assert!(mz.intensities[idx + 1] > 0.0);
    }

    #[test]
    fn out_of_range_peaks_are_skipped_without_panicking() {
        let peaks = [peak(1000.0, 10.0)];
        let mz = MzBins::new(&peaks, 0.0, 4, 1.0);
        assert!(mz.bins.none_set());
    }
}
