//! Peak-group assembly: turning a finalised mass bin into an isotope envelope.
//!
//! For each surviving mass bin, every charge that voted for it contributes an "anchor" peak (the
//! brightest peak at the m/z position that charge predicts), and the envelope walks outward from
//! that anchor isotope by isotope until the averagine-derived bound is reached or two consecutive
//! isotopes are missing. Isotope indices are first assigned per-charge in m/z space (scaled by
//! `1/charge`) and then re-derived once more in mass space against the single brightest peak
//! across all charges, which is what lets peaks observed under different charges line up on a
//! shared isotope axis.

use itertools::Itertools;

use crate::averagine::AveragineTable;
use crate::bins::bin_value;
use crate::log_mz::{LogMzPeak, PROTON_MASS};
use crate::mass_bins::{FinalMassBin, DELTA_ISO};
use crate::system::f64::da;

const MAX_MISSING_ISOTOPE: i32 = 2;

/// One peak assigned to a peak group, with the charge and isotope index it was assigned under.
#[derive(Clone, Copy, Debug)]
pub struct AssignedPeak {
    pub mz: f64,
    pub intensity: f64,
    pub charge: i32,
    pub isotope_index: i32,
}

/// An assembled, not-yet-scored envelope.
#[derive(Clone, Debug)]
pub struct CandidatePeakGroup {
    pub mass_bin_index: usize,
    pub peaks: Vec<AssignedPeak>,
    pub min_charge: i32,
    pub max_charge: i32,
    /// The uncharged mass of the single brightest peak in the group, pre-isotope-offset — the
    /// seed `scoring.rs`'s isotope-cosine search refines into the group's final monoisotopic mass.
    pub brightest_peak_mass: f64,
}

/// Index of the first peak whose m/z bin equals `bin`, and one past the last such peak, given
/// `peak_bins[i]` is non-decreasing (peaks are processed in ascending log-m/z order).
fn bin_range(peak_bins: &[usize], bin: usize) -> (usize, usize) {
    let lo = peak_bins.partition_point(|&b| b < bin);
    let hi = peak_bins.partition_point(|&b| b <= bin);
    (lo, hi)
}

/// Find the brightest peak at the predicted anchor m/z bin for one charge.
fn find_anchor(peaks: &[LogMzPeak], peak_bins: &[usize], bin: usize) -> Option<usize> {
    let (lo, hi) = bin_range(peak_bins, bin);
    (lo..hi).max_by(|&a, &b| peaks[a].intensity.total_cmp(&peaks[b].intensity))
}

/// Walk from `start_idx` in direction `step` (+1 or -1), assigning isotope peaks relative to
/// `anchor_mz`. The forward walk starts at the anchor itself (isotope index 0); the backward walk
/// starts one peak before it.
#[allow(clippy::too_many_arguments)]
fn walk(
    peaks: &[LogMzPeak],
    start_idx: isize,
    anchor_mz: f64,
    step: i32,
    charge: i32,
    isotope_spacing: f64,
    mz_delta: f64,
    bound: i32,
    out: &mut Vec<AssignedPeak>,
) {
    let mut last_assigned = 0i32;
    let mut idx = start_idx;
    while idx >= 0 && (idx as usize) < peaks.len() {
        let peak = peaks[idx as usize];
        let di = f64::from(step) * (peak.mz - anchor_mz);
        let i = (di / isotope_spacing).round() as i32;
        if i > bound {
            break;
        }
        if i - last_assigned > MAX_MISSING_ISOTOPE {
            break;
        }
        if (di - f64::from(i) * isotope_spacing).abs() < mz_delta {
            out.push(AssignedPeak {
                mz: peak.mz,
                intensity: peak.intensity,
                charge,
                isotope_index: step * i,
            });
            last_assigned = i;
        }
        idx += step as isize;
    }
}

/// Assemble a candidate peak group for one finalised mass bin, or `None` if monotone suppression
/// rejects it or no peak was ever assigned.
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    mass_bin: &FinalMassBin,
    mass_intensity: &[f64],
    mass_min_value: f64,
    mass_width: f64,
    peaks: &[LogMzPeak],
    peak_bins: &[usize],
    offsets: &[i64],
    min_charge: i32,
    averagine: &AveragineTable,
    tol_fraction: f64,
    ms_level: usize,
) -> Option<CandidatePeakGroup> {
    let b_m = mass_bin.bin;
    let log_m = bin_value(b_m, mass_min_value, mass_width);
    let mass = log_m.exp();

    if ms_level == 1 {
        let diff = DELTA_ISO / mass;
        let b_minus = crate::bins::bin_index(log_m - diff, mass_min_value, mass_width);
        let b_plus = crate::bins::bin_index(log_m + diff, mass_min_value, mass_width);
        let i_minus = if b_minus > 0 && b_minus < b_m {
            mass_intensity.get(b_minus).copied().unwrap_or(0.0)
        } else {
            0.0
        };
        let i_plus = if b_plus < mass_intensity.len() && b_plus > b_m {
            mass_intensity[b_plus]
        } else {
            0.0
        };
        if mass_intensity[b_m] < i_minus || mass_intensity[b_m] < i_plus {
            return None;
        }
        if i_minus == 0.0 && i_plus == 0.0 {
            return None;
        }
    }

    let entry = averagine.get(da(mass));
    let right_index = entry.right_index as i32;
    let left_index = entry.left_index as i32;

    let mut assigned = Vec::new();
    for j in (mass_bin.min_charge - min_charge)..=(mass_bin.max_charge - min_charge) {
        let j = j as usize;
        if j >= offsets.len() {
            continue;
        }
        let bi_signed = b_m as i64 - offsets[j];
        if bi_signed < 0 {
            continue;
        }
        let bi = bi_signed as usize;
        let charge = j as i32 + min_charge;

        let Some(anchor) = find_anchor(peaks, peak_bins, bi) else {
            continue;
        };
        let anchor_mz = peaks[anchor].mz;
        let isof = DELTA_ISO / f64::from(charge);
        let mz_delta = tol_fraction * anchor_mz;

        walk(peaks, anchor as isize, anchor_mz, 1, charge, isof, mz_delta, right_index, &mut assigned);
        walk(peaks, anchor as isize - 1, anchor_mz, -1, charge, isof, mz_delta, left_index, &mut assigned);
    }

    if assigned.is_empty() {
        return None;
    }

    let brightest = assigned
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.intensity.total_cmp(&b.1.intensity))
        .map(|(i, _)| i)
        .expect("assigned is non-empty");
    let max_mass = (assigned[brightest].mz - PROTON_MASS) * f64::from(assigned[brightest].charge);
    let iso_delta = tol_fraction * max_mass;

    let mut min_off = i32::MAX;
    let mut kept = Vec::with_capacity(assigned.len());
    for peak in &assigned {
        let uncharged = (peak.mz - PROTON_MASS) * f64::from(peak.charge);
        let isotope_index = ((uncharged - max_mass) / DELTA_ISO).round() as i32;
        if (max_mass - uncharged + DELTA_ISO * f64::from(isotope_index)).abs() > iso_delta {
            continue;
        }
        min_off = min_off.min(isotope_index);
        kept.push(AssignedPeak {
            isotope_index,
            ..*peak
        });
    }
    if kept.is_empty() {
        return None;
    }
    for peak in &mut kept {
        peak.isotope_index -= min_off;
    }

    let distinct_isotopes = kept.iter().map(|p| p.isotope_index).unique().count();
    if distinct_isotopes < 2 {
        return None;
    }

    Some(CandidatePeakGroup {
        mass_bin_index: b_m,
        peaks: kept,
        min_charge: mass_bin.min_charge,
        max_charge: mass_bin.max_charge,
        brightest_peak_mass: max_mass,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bin_range_finds_a_contiguous_run() {
        let bins = [1usize, 1, 2, 2, 2, 5];
        assert_eq!(bin_range(&bins, 2), (2, 5));
        assert_eq!(bin_range(&bins, 3), (5, 5));
    }

    #[test]
    fn find_anchor_picks_the_brightest_peak_in_the_bin() {
        let peaks = [
            LogMzPeak { mz: 500.0, intensity: 10.0, log_mz: 0.0 },
            LogMzPeak { mz: 500.001, intensity: 99.0, log_mz: 0.0 },
            LogMzPeak { mz: 600.0, intensity: 50.0, log_mz: 0.0 },
        ];
        let bins = [3usize, 3, 7];
        let anchor = find_anchor(&peaks, &bins, 3).unwrap();
        assert_eq!(anchor, 1);
    }
}
