//! The public input (`Spectrum`, `Peak`) and output (`PeakGroup`, `DeconvolutionStats`) types.
//!
//! Modelled on the teacher's `RawSpectrum`/`PeakSpectrum` shape: a spectrum is an ordered sequence
//! of peaks plus a small amount of scan metadata, with no parsing concerns of its own — reading a
//! raw file and constructing one of these is an external collaborator's job.

use serde::{Deserialize, Serialize};

use crate::system::{Mass, MassOverCharge, Time};

/// One centroid peak as presented to the deconvolution kernel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: MassOverCharge,
    pub intensity: f64,
}

/// One spectrum to deconvolute: retention time, MS level, and its peaks ordered ascending by m/z.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub retention_time: Time,
    pub ms_level: usize,
    pub peaks: Vec<Peak>,
}

/// One peak assigned to an emitted [`PeakGroup`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredPeak {
    pub mz: MassOverCharge,
    pub charge: i32,
    pub isotope_index: i32,
    pub intensity: f64,
}

/// One deconvolved proteoform mass, with the peaks that witnessed it and its scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakGroup {
    pub mono_mass: Mass,
    pub intensity: f64,
    pub charge_distribution_score: i32,
    pub isotope_cosine_score: f64,
    pub peaks: Vec<ScoredPeak>,
    pub min_charge: i32,
    pub max_charge: i32,
}

/// Per-spectrum counters exposing the visibility the original tool printed to stdout, as data
/// instead of log lines (this crate carries no logging dependency — see `DESIGN.md`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeconvolutionStats {
    pub candidate_mass_bins: usize,
    pub finalised_mass_bins: usize,
    pub peak_groups_before_filtering: usize,
    pub peak_groups_after_filtering: usize,
}
