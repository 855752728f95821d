//! The kernel's parameter set, and construction-time validation.

use crate::error::ConfigError;
use crate::system::{f64::da, Mass, MassOverCharge};
use crate::tolerance::Tolerance;

/// The immutable configuration an [`crate::Engine`] is built from.
///
/// Field names and default values follow the original FLASHDeconv tool's command-line option
/// defaults (`minC`/`maxC`/`minM`/`maxM`/`tol`/`minInt`/`minCCC`/`minCC`/`minIC`/`maxIC`/`maxMC`/
/// `minIsoScore`/`minCDScore`), with one ambient addition (`harmonic_charges`) that the original
/// hardcodes rather than exposing.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    /// Minimum charge state considered, inclusive.
    pub min_charge: i32,
    /// Maximum charge state considered, inclusive.
    pub max_charge: i32,
    /// Minimum neutral mass considered.
    pub min_mass: Mass,
    /// Maximum neutral mass considered.
    pub max_mass: Mass,
    /// Per-MS-level m/z tolerance, index 0 = MS1, index 1 = MS2, etc. A spectrum whose MS level
    /// exceeds the length of this vector reuses the last entry.
    pub tol: Vec<Tolerance<MassOverCharge>>,
    /// Minimum number of peaks at continuous charge states required to keep a mass bin.
    pub min_continuous_charge_peak_count: usize,
    /// Minimum number of continuous isotope peaks required to keep a peak group.
    pub min_continuous_isotope_count: usize,
    /// Minimum number of distinct charge states required to keep a mass bin.
    pub min_charge_count: usize,
    /// Maximum number of isotope peaks considered per peak group.
    pub max_isotope_count: usize,
    /// Maximum number of peak groups retained per spectrum, by intensity. `None` means
    /// unlimited (the original tool's `maxMC = -1` sentinel).
    pub max_mass_count: Option<usize>,
    /// Minimum isotope-cosine score (0.0-1.0) required to keep a peak group.
    pub isotope_cosine_threshold: f64,
    /// Minimum charge-distribution score required to keep a peak group.
    pub charge_distribution_score_threshold: i32,
    /// Minimum peak intensity considered during the log-m/z transform.
    pub intensity_threshold: f64,
    /// Number of previous MS1 spectra whose mass bins are carried forward by the scan-linker.
    pub overlapped_ms1_count: usize,
    /// Charges whose harmonic filters are checked for noise during mass-bin voting.
    pub harmonic_charges: Vec<u32>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            min_charge: 2,
            max_charge: 35,
            min_mass: da(500.0),
            max_mass: da(50_000.0),
            tol: vec![Tolerance::new_ppm(5.0)],
            min_continuous_charge_peak_count: 3,
            min_continuous_isotope_count: 3,
            min_charge_count: 7,
            max_isotope_count: 50,
            max_mass_count: None,
            isotope_cosine_threshold: 0.7,
            charge_distribution_score_threshold: 0,
            intensity_threshold: 100.0,
            overlapped_ms1_count: 20,
            harmonic_charges: vec![2, 3, 5],
        }
    }
}

impl Parameters {
    /// The inclusive `[min_charge, max_charge]` range.
    pub fn charge_range(&self) -> std::ops::RangeInclusive<i32> {
        self.min_charge..=self.max_charge
    }

    /// Number of distinct charge states considered.
    pub fn charge_count(&self) -> usize {
        (self.max_charge - self.min_charge + 1).max(0) as usize
    }

    /// The m/z tolerance for a given (1-based) MS level.
    pub fn tolerance_for_level(&self, ms_level: usize) -> &Tolerance<MassOverCharge> {
        let idx = ms_level.saturating_sub(1).min(self.tol.len() - 1);
        &self.tol[idx]
    }

    /// Validate this parameter set, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_charge < 1 || self.max_charge < self.min_charge {
            return Err(ConfigError::new(
                "invalid charge range",
                format!(
                    "min_charge ({}) must be >= 1 and <= max_charge ({})",
                    self.min_charge, self.max_charge
                ),
            ));
        }
        if self.min_mass.value <= 0.0 || self.max_mass.value <= self.min_mass.value {
            return Err(ConfigError::new(
                "invalid mass range",
                format!(
                    "min_mass ({}) must be positive and less than max_mass ({})",
                    self.min_mass.value, self.max_mass.value
                ),
            ));
        }
        if self.tol.is_empty() {
            return Err(ConfigError::new(
                "empty tolerance list",
                "at least one per-MS-level tolerance is required",
            ));
        }
        for (level, t) in self.tol.iter().enumerate() {
            match t.as_ppm() {
                Some(ppm) if ppm > 0.0 => {}
                Some(ppm) => {
                    return Err(ConfigError::new(
                        "non-positive ppm tolerance",
                        format!("tol[{level}] = {ppm} ppm must be > 0"),
                    ))
                }
                None => {
                    return Err(ConfigError::new(
                        "absolute tolerance not supported",
                        format!(
                            "tol[{level}] is an absolute tolerance; only ppm tolerances are \
                             meaningful for this kernel's bin-width derivation"
                        ),
                    ))
                }
            }
        }
        if self.max_isotope_count == 0 {
            return Err(ConfigError::new(
                "zero max_isotope_count",
                "max_isotope_count must allow at least one isotope peak",
            ));
        }
        Ok(())
    }
}
