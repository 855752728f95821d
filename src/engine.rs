//! The kernel orchestrator: sequences transform → m/z bins → candidate mass bins → finalisation
//! → peak-group assembly → scoring → scan-linker update, once per spectrum.
//!
//! Grounded on `SpectrumDeconvolution::getPeakGroupsFromSpectrum`, which computes the per-spectrum
//! mass/m/z axis extents from the observed log-m/z range before handing off to each stage below.

use crate::averagine::AveragineTable;
use crate::bins::{bin_index, bin_width};
use crate::bitset::DynamicBitset;
use crate::error::ConfigError;
use crate::filters::FilterBank;
use crate::log_mz;
use crate::mass_bins;
use crate::params::Parameters;
use crate::peak_group;
use crate::scan_linker::ScanLinker;
use crate::scoring::{self, ScoredPeakGroup};
use crate::spectrum::{DeconvolutionStats, PeakGroup, ScoredPeak, Spectrum};
use crate::system::f64::{da, mz};

/// An immutable, constructed-once deconvolution kernel: a parameter set plus the averagine table
/// and charge-filter bank derived from it.
#[derive(Clone, Debug)]
pub struct Engine {
    params: Parameters,
    averagine: AveragineTable,
    filters: FilterBank,
}

fn to_public_peak_group(scored: ScoredPeakGroup) -> PeakGroup {
    PeakGroup {
        mono_mass: da(scored.mono_mass),
        intensity: scored.intensity,
        charge_distribution_score: scored.charge_distribution_score,
        isotope_cosine_score: scored.isotope_cosine_score,
        peaks: scored
            .peaks
            .into_iter()
            .map(|p| ScoredPeak {
                mz: mz(p.mz),
                charge: p.charge,
                isotope_index: p.isotope_index,
                intensity: p.intensity,
            })
            .collect(),
        min_charge: scored.min_charge,
        max_charge: scored.max_charge,
    }
}

impl Engine {
    /// Build an engine from a parameter set, validating it first.
    pub fn new(params: Parameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let averagine = AveragineTable::new(params.min_mass, params.max_mass);
        let filters = FilterBank::new(&params);
        Ok(Self {
            params,
            averagine,
            filters,
        })
    }

    /// The parameter set this engine was built from.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Deconvolute one spectrum, discarding the per-spectrum statistics.
    pub fn deconvolute(&self, spectrum: &Spectrum, linker: &mut ScanLinker) -> Vec<PeakGroup> {
        self.deconvolute_with_stats(spectrum, linker).0
    }

    /// Deconvolute one spectrum, returning both the emitted peak groups and counters describing
    /// how much of the search space was explored.
    pub fn deconvolute_with_stats(&self, spectrum: &Spectrum, linker: &mut ScanLinker) -> (Vec<PeakGroup>, DeconvolutionStats) {
        let empty_stats = DeconvolutionStats::default();

        let tol = self.params.tolerance_for_level(spectrum.ms_level);
        let width = bin_width(tol);
        let tol_fraction = tol.as_ppm().expect("validated Parameters carry only ppm tolerances") / 1e6;

        let raw_peaks: Vec<(f64, f64)> = spectrum.peaks.iter().map(|p| (p.mz.value, p.intensity)).collect();
        let log_peaks = log_mz::transform(raw_peaks, self.params.intensity_threshold);
        if log_peaks.is_empty() {
            return (Vec::new(), empty_stats);
        }

        let min_charge = self.params.min_charge;
        let charge_count = self.params.charge_count();
        let min_cc_peak_count = self.params.min_continuous_charge_peak_count;

        let tmp_max = charge_count.saturating_sub(min_cc_peak_count).min(charge_count - 1);
        let tmp_min = min_cc_peak_count.saturating_sub(1).min(charge_count - 1);

        let mass_bin_max_value = (log_peaks.last().unwrap().log_mz - self.filters.filter[tmp_max]).min(self.params.max_mass.value.ln());
        let mass_bin_min_value = log_peaks.first().unwrap().log_mz - self.filters.filter[tmp_min];
        let mass_bin_count = bin_index(mass_bin_max_value, mass_bin_min_value, width) + 1;

        let mz_bin_min_value = log_peaks.first().unwrap().log_mz;
        let mz_bin_max_value = log_peaks.last().unwrap().log_mz;
        let mz_bin_count = bin_index(mz_bin_max_value, mz_bin_min_value, width) + 1;

        let mz_bins = crate::mz_bins::MzBins::new(&log_peaks, mz_bin_min_value, mz_bin_count, width);

        let offsets = mass_bins::charge_offsets(&self.filters, mz_bin_min_value, mass_bin_min_value, width);
        let h_offsets = mass_bins::harmonic_offsets(&self.filters, mz_bin_min_value, mass_bin_min_value, width);

        let carried_forward = if spectrum.ms_level == 1 {
            linker.carried_forward(mass_bin_count, mass_bin_min_value, width)
        } else {
            DynamicBitset::new(mass_bin_count)
        };

        let candidates = mass_bins::select_candidates(
            &mz_bins,
            mass_bin_count,
            mass_bin_min_value,
            width,
            min_charge,
            &offsets,
            &h_offsets,
            min_cc_peak_count,
        );

        let min_bin = bin_index(self.params.min_mass.value.ln(), mass_bin_min_value, width);
        let max_bin = bin_index(self.params.max_mass.value.ln(), mass_bin_min_value, width);

        let (finals, bins_for_this_spectrum) = mass_bins::finalise(
            &mz_bins,
            &candidates,
            &carried_forward,
            mass_bin_count,
            min_bin,
            max_bin,
            min_charge,
            &offsets,
        );

        let peak_bins: Vec<usize> = log_peaks.iter().map(|p| bin_index(p.log_mz, mz_bin_min_value, width)).collect();

        let candidate_groups: Vec<_> = finals
            .iter()
            .filter_map(|fb| {
                peak_group::assemble(
                    fb,
                    &candidates.mass_intensity,
                    mass_bin_min_value,
                    width,
                    &log_peaks,
                    &peak_bins,
                    &offsets,
                    min_charge,
                    &self.averagine,
                    tol_fraction,
                    spectrum.ms_level,
                )
            })
            .collect();
        let peak_groups_before_filtering = candidate_groups.len();

        let mut scored: Vec<ScoredPeakGroup> = candidate_groups
            .into_iter()
            .filter_map(|g| scoring::score_group(g, min_charge, charge_count, &self.averagine, &self.params))
            .collect();
        scored = scoring::filter_by_intensity(scored, self.params.max_mass_count);

        if spectrum.ms_level == 1 {
            let mb: Vec<usize> = scored
                .iter()
                .filter(|g| bins_for_this_spectrum.test(g.mass_bin_index))
                .map(|g| g.mass_bin_index)
                .collect();
            linker.push(mb, mass_bin_min_value);
        }

        let stats = DeconvolutionStats {
            candidate_mass_bins: candidates.candidates.iter_ones().count(),
            finalised_mass_bins: finals.len(),
            peak_groups_before_filtering,
            peak_groups_after_filtering: scored.len(),
        };

        let groups = scored.into_iter().map(to_public_peak_group).collect();
        (groups, stats)
    }
}
