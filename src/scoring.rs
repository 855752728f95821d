//! Per-group scoring: charge/isotope qualification, charge-distribution score, isotope cosine,
//! and top-N intensity filtering.

use itertools::Itertools;

use crate::averagine::AveragineTable;
use crate::log_mz::PROTON_MASS;
use crate::mass_bins::DELTA_ISO;
use crate::params::Parameters;
use crate::peak_group::{AssignedPeak, CandidatePeakGroup};
use crate::system::f64::da;

/// A peak group that has survived every rejection test, with its final scores.
#[derive(Clone, Debug)]
pub struct ScoredPeakGroup {
    pub mass_bin_index: usize,
    pub peaks: Vec<AssignedPeak>,
    pub mono_mass: f64,
    pub intensity: f64,
    pub charge_distribution_score: i32,
    pub isotope_cosine_score: f64,
    pub min_charge: i32,
    pub max_charge: i32,
}

fn longest_positive_run(values: &[f64]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for &v in values {
        if v > 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn per_charge_intensity(group: &CandidatePeakGroup, min_charge: i32, charge_count: usize) -> Vec<f64> {
    let mut out = vec![0.0; charge_count];
    for peak in &group.peaks {
        let idx = (peak.charge - min_charge) as usize;
        if idx < out.len() {
            out[idx] += peak.intensity;
        }
    }
    out
}

fn per_isotope_intensity(group: &CandidatePeakGroup, max_isotope_count: usize) -> Vec<f64> {
    let mut out = vec![0.0; max_isotope_count];
    for peak in &group.peaks {
        if peak.isotope_index >= 0 && (peak.isotope_index as usize) < max_isotope_count {
            out[peak.isotope_index as usize] += peak.intensity;
        }
    }
    out
}

fn charge_distribution_score(per_charge: &[f64]) -> i32 {
    let max_index = per_charge
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i);

    let mut score = 0;
    for k in 1..per_charge.len() {
        let (d1, d2) = if k <= max_index { (0i64, -1i64) } else { (-1, 0) };
        let i1 = (k as i64 + d1) as usize;
        let i2 = (k as i64 + d2) as usize;
        let int2 = per_charge[i2];
        if int2 <= 0.0 {
            continue;
        }
        score += if per_charge[i1] >= int2 { 1 } else { -1 };
    }
    score
}

fn cosine(a: &[f64], b: &[f64], offset: i32) -> f64 {
    let mut n = 0.0;
    let mut d1 = 0.0;
    let mut d2 = 0.0;
    for (i, &b_int) in b.iter().enumerate() {
        d2 += b_int * b_int;
        let j = i as i32 + offset;
        if j < 0 || j as usize >= a.len() {
            continue;
        }
        let a_val = a[j as usize];
        n += a_val * b_int;
        d1 += a_val * a_val;
    }
    let d = (d1 * d2).sqrt();
    if d <= 0.0 {
        0.0
    } else {
        n / d
    }
}

/// Find the isotope-cosine offset that best aligns `per_isotope` with the averagine pattern,
/// returning `(cosine, offset)`.
fn best_isotope_offset(per_isotope: &[f64], pattern: &[f64], apex_index: usize, min_isotope_index: i32, max_isotope_index: i32) -> (f64, i32) {
    let iso_size = pattern.len() as i32;
    let mut best = (-1.0f64, 0i32);
    for f in (-(apex_index as i32) + 1)..=3 {
        if min_isotope_index < f {
            continue;
        }
        if max_isotope_index - f > iso_size {
            continue;
        }
        let c = cosine(per_isotope, pattern, f);
        if c > best.0 {
            best = (c, f);
        }
    }
    best
}

/// Score and filter one candidate peak group, per the kernel's rejection cascade.
pub fn score_group(
    candidate: CandidatePeakGroup,
    min_charge: i32,
    charge_count: usize,
    averagine: &AveragineTable,
    params: &Parameters,
) -> Option<ScoredPeakGroup> {
    let per_charge = per_charge_intensity(&candidate, min_charge, charge_count);
    let per_isotope = per_isotope_intensity(&candidate, params.max_isotope_count);

    if longest_positive_run(&per_charge) < params.min_charge_count {
        return None;
    }
    if longest_positive_run(&per_isotope) <= params.min_continuous_isotope_count {
        return None;
    }

    let cd_score = charge_distribution_score(&per_charge);
    if cd_score < params.charge_distribution_score_threshold {
        return None;
    }

    let entry = averagine.get(da(candidate.brightest_peak_mass));
    let min_isotope_index = candidate.peaks.iter().map(|p| p.isotope_index).min().unwrap_or(0);
    let max_isotope_index = candidate.peaks.iter().map(|p| p.isotope_index).max().unwrap_or(0);

    let (cosine_score, offset) = best_isotope_offset(
        &per_isotope,
        &entry.distribution,
        entry.apex_index,
        min_isotope_index,
        max_isotope_index,
    );
    if cosine_score <= params.isotope_cosine_threshold {
        return None;
    }

    let mono_mass = candidate
        .peaks
        .iter()
        .filter(|p| p.isotope_index == 0)
        .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
        .map(|p| (p.mz - PROTON_MASS) * f64::from(p.charge))
        .unwrap_or(candidate.brightest_peak_mass)
        + f64::from(offset) * DELTA_ISO;

    let peaks = candidate
        .peaks
        .into_iter()
        .map(|p| AssignedPeak {
            isotope_index: p.isotope_index - offset,
            ..p
        })
        .collect();

    Some(ScoredPeakGroup {
        mass_bin_index: candidate.mass_bin_index,
        peaks,
        mono_mass,
        intensity: per_charge.iter().sum(),
        charge_distribution_score: cd_score,
        isotope_cosine_score: cosine_score,
        min_charge: candidate.min_charge,
        max_charge: candidate.max_charge,
    })
}

/// Keep only the top `max_mass_count` groups by intensity, if a limit was configured.
pub fn filter_by_intensity(mut groups: Vec<ScoredPeakGroup>, max_mass_count: Option<usize>) -> Vec<ScoredPeakGroup> {
    let Some(mc) = max_mass_count else {
        return groups;
    };
    if groups.len() <= mc {
        return groups;
    }
    let intensities: Vec<f64> = groups.iter().map(|g| g.intensity).sorted_by(f64::total_cmp).collect();
    let threshold = intensities[intensities.len() - mc];

    let mut i = 0;
    while groups.len() > mc && i < groups.len() {
        if groups[i].intensity < threshold {
            groups.remove(i);
        } else {
            i += 1;
        }
    }
    groups
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn longest_positive_run_finds_the_longest_contiguous_stretch() {
        assert_eq!(longest_positive_run(&[1.0, 0.0, 1.0, 1.0, 1.0, 0.0]), 3);
        assert_eq!(longest_positive_run(&[0.0, 0.0]), 0);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [1.0, 0.5, 0.2];
        assert!((cosine(&v, &v, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn filter_by_intensity_keeps_the_brightest_groups() {
        let mk = |intensity: f64| ScoredPeakGroup {
            mass_bin_index: 0,
            peaks: vec![],
            mono_mass: 1000.0,
            intensity,
            charge_distribution_score: 0,
            isotope_cosine_score: 0.9,
            min_charge: 1,
            max_charge: 1,
        };
        let groups = vec![mk(1.0), mk(5.0), mk(3.0)];
        let kept = filter_by_intensity(groups, Some(2));
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|g| g.intensity >= 3.0));
    }

    #[test]
    fn filter_by_intensity_is_a_no_op_when_unbounded() {
        let mk = |intensity: f64| ScoredPeakGroup {
            mass_bin_index: 0,
            peaks: vec![],
            mono_mass: 1000.0,
            intensity,
            charge_distribution_score: 0,
            isotope_cosine_score: 0.9,
            min_charge: 1,
            max_charge: 1,
        };
        let groups = vec![mk(1.0), mk(5.0)];
        assert_eq!(filter_by_intensity(groups, None).len(), 2);
    }
}
