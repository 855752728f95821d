//! The log-m/z transform: the first step applied to every spectrum.
//!
//! A peak's mass under a trial charge `c` is `(mz - proton_mass) * c`; working in
//! `log(mz - proton_mass)` turns that per-charge multiplication into an addition
//! (`log(mass) = log(mz - proton_mass) + log(c)`), which is what lets `filters.rs` precompute one
//! additive offset per charge instead of a multiplication per peak per charge.

/// The mass of a proton, in daltons.
pub const PROTON_MASS: f64 = 1.007_276_466_8;

/// One observed peak transformed into log-m/z space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogMzPeak {
    /// The original, untransformed m/z.
    pub mz: f64,
    /// The peak's intensity.
    pub intensity: f64,
    /// `ln(mz - PROTON_MASS)`.
    pub log_mz: f64,
}

impl LogMzPeak {
    fn new(mz: f64, intensity: f64) -> Option<Self> {
        let shifted = mz - PROTON_MASS;
        if shifted <= 0.0 {
            return None;
        }
        Some(Self {
            mz,
            intensity,
            log_mz: shifted.ln(),
        })
    }
}

/// Transform a spectrum's peaks (assumed sorted ascending by m/z) into log-m/z space, dropping
/// peaks at or below the intensity threshold and peaks whose m/z does not exceed a single proton
/// mass (for which the log transform is undefined).
pub fn transform<'a>(
    peaks: impl IntoIterator<Item = (f64, f64)> + 'a,
    intensity_threshold: f64,
) -> Vec<LogMzPeak> {
    peaks
        .into_iter()
        .filter(|&(_, intensity)| intensity > intensity_threshold)
        .filter_map(|(mz, intensity)| LogMzPeak::new(mz, intensity))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn drops_peaks_at_or_below_the_intensity_threshold() {
        let peaks = transform([(500.0, 50.0), (600.0, 150.0)], 100.0);
        assert_eq!(peaks.len(), 1);
        assert!((peaks[0].mz - 600.0).abs() < 1e-9);
    }

    #[test]
    fn drops_peaks_at_or_below_one_proton_mass() {
        let peaks = transform([(1.0, 200.0), (600.0, 200.0)], 100.0);
        assert_eq!(peaks.len(), 1);
    }

    #[test]
    fn log_mz_matches_ln_of_shifted_mz() {
        let peaks = transform([(600.0, 200.0)], 100.0);
        let expected = (600.0 - PROTON_MASS).ln();
        assert!((peaks[0].log_mz - expected).abs() < 1e-12);
    }
}
