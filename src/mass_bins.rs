//! Candidate mass-bin voting and finalisation.
//!
//! Every m/z bin votes, once per active charge, into the mass bin its charge filter offset
//! points at. A bin becomes a real candidate once enough *continuous* charges agree on it either
//! directly (the next isotope peak is also present and brighter than the candidate bin's own
//! intensity) or indirectly (plain charge-ladder support once harmonic and noise checks pass).
//! Harmonic artifacts — peaks that mimic a half- or third-charge pattern of a real mass — are
//! detected by checking each vote against the harmonic filter bank and, when found, diverted into
//! a noise accumulator instead of the mass bin's real intensity.

use crate::bins::{bin_index, bin_value};
use crate::bitset::DynamicBitset;
use crate::filters::FilterBank;
use crate::mz_bins::MzBins;

/// The Δ_iso spacing (C13/C12-like) used throughout isotope-index arithmetic.
pub const DELTA_ISO: f64 = 1.00235;

/// The intensity-ratio tolerance between adjacent charges / harmonic candidates.
const NOISE_FACTOR: f64 = 4.0;

/// The result of the candidate mass-bin sweep (§4.4) over one spectrum's m/z bins.
pub struct CandidateMassBins {
    pub candidates: DynamicBitset,
    pub mass_intensity: Vec<f64>,
}

/// Per-charge offsets mapping an m/z bin to the mass bin its charge filter predicts.
pub fn charge_offsets(filters: &FilterBank, mz_min: f64, mass_min: f64, width: f64) -> Vec<i64> {
    filters
        .filter
        .iter()
        .map(|&f| ((mz_min - f - mass_min) * width).round() as i64)
        .collect()
}

/// Per-harmonic, per-charge offsets used to look up a candidate vote's harmonic shadow.
pub fn harmonic_offsets(filters: &FilterBank, mz_min: f64, mass_min: f64, width: f64) -> Vec<Vec<i64>> {
    filters
        .harmonic
        .iter()
        .map(|row| {
            row.iter()
                .map(|&f| ((mz_min - f - mass_min) * width).round() as i64)
                .collect()
        })
        .collect()
}

/// Run the candidate mass-bin vote (§4.4) for one spectrum.
#[allow(clippy::too_many_arguments)]
pub fn select_candidates(
    mz_bins: &MzBins,
    mass_bin_count: usize,
    mass_min_value: f64,
    bin_width: f64,
    min_charge: i32,
    offsets: &[i64],
    harmonic_offsets: &[Vec<i64>],
    min_continuous_charge_peak_count: usize,
) -> CandidateMassBins {
    let charge_count = offsets.len();
    let harmonic_count = harmonic_offsets.len();

    let mut candidates = DynamicBitset::new(mass_bin_count);
    let mut mass_intensity = vec![0.0f64; mass_bin_count];
    let mut continuous_pairs = vec![0u32; mass_bin_count];
    let mut prev_charge = vec![i64::MIN; mass_bin_count];
    let mut prev_intensity = vec![1.0f64; mass_bin_count];
    // noise[harmonic_count] is the baseline ("not a harmonic, just noisy overlap") bucket.
    let mut noise = vec![vec![0.0f64; mass_bin_count]; harmonic_count + 1];

    for b_mz in mz_bins.bins.iter_ones() {
        let intensity = mz_bins.intensities[b_mz];
        let log_mz = bin_value(b_mz, mz_bins.min_value, mz_bins.width);
        let mz = log_mz.exp();

        for (j, &offset) in offsets.iter().enumerate() {
            let b_m_signed = b_mz as i64 + offset;
            if b_m_signed < 0 || b_m_signed as usize >= mass_bin_count {
                continue;
            }
            let b_m = b_m_signed as usize;
            let charge = j as i32 + min_charge;

            let min_int = intensity.min(prev_intensity[b_m]);
            let max_int = intensity.max(prev_intensity[b_m]);
            let id = max_int / min_int;
            let out = prev_charge[b_m] - j as i64 != 1;

            let diff = DELTA_ISO / (f64::from(charge) * mz);
            let next_iso_bin = bin_index(log_mz + diff, mz_bins.min_value, mz_bins.width);
            if next_iso_bin < mz_bins.intensities.len()
                && mz_bins.bins.test(next_iso_bin)
                && intensity > mz_bins.intensities[next_iso_bin]
            {
                continuous_pairs[b_m] += 1;
                mass_intensity[b_m] += mz_bins.intensities[next_iso_bin];
                if continuous_pairs[b_m] as usize >= min_continuous_charge_peak_count {
                    candidates.set(b_m);
                }
            }

            if out && id < NOISE_FACTOR {
                noise[harmonic_count][b_m] += min_int;
            }

            if out || id > NOISE_FACTOR {
                continuous_pairs[b_m] = 0;
            } else {
                let mut max_h_charge = None;
                let mut max_h_intensity = 0.0f64;
                for (k, row) in harmonic_offsets.iter().enumerate() {
                    let h_b_mz_signed = b_m as i64 - row[j];
                    if h_b_mz_signed <= 0 || h_b_mz_signed as usize >= mz_bins.intensities.len() {
                        continue;
                    }
                    let h_b_mz = h_b_mz_signed as usize;
                    if !mz_bins.bins.test(h_b_mz) {
                        continue;
                    }
                    let h_intensity = mz_bins.intensities[h_b_mz];
                    if h_intensity > min_int && h_intensity < NOISE_FACTOR * max_int && h_intensity >= max_h_intensity {
                        max_h_intensity = h_intensity;
                        max_h_charge = Some(k);
                    }
                }

                if let Some(k) = max_h_charge {
                    noise[k][b_m] += max_h_intensity;
                    continuous_pairs[b_m] = 0;
                } else {
                    mass_intensity[b_m] += intensity;
                    if !candidates.test(b_m) {
                        continuous_pairs[b_m] += 1;
                        if continuous_pairs[b_m] as usize >= min_continuous_charge_peak_count {
                            candidates.set(b_m);
                        }
                    }
                }
            }

            prev_intensity[b_m] = intensity;
            prev_charge[b_m] = j as i64;
        }
    }

    for b_m in candidates.iter_ones() {
        let max_noise = noise.iter().map(|row| row[b_m]).fold(0.0f64, f64::max);
        mass_intensity[b_m] -= max_noise;
    }

    let _ = mass_min_value; // kept for symmetry with bin_value call sites in callers

    CandidateMassBins {
        candidates,
        mass_intensity,
    }
}

/// A finalised mass bin: the charge range that voted for it and whether this spectrum itself
/// supplied the evidence (as opposed to a carried-forward vote from the scan-linker).
#[derive(Clone, Debug)]
pub struct FinalMassBin {
    pub bin: usize,
    pub min_charge: i32,
    pub max_charge: i32,
    pub from_this_spectrum: bool,
}

/// Mass-bin finalisation (§4.5): pick, for each set m/z bin, the charge offset whose candidate
/// mass bin has the highest accumulated intensity, restricted to `[min_bin, max_bin]` and unioned
/// with any bins already carried forward by the scan-linker.
#[allow(clippy::too_many_arguments)]
pub fn finalise(
    mz_bins: &MzBins,
    candidates: &CandidateMassBins,
    carried_forward: &DynamicBitset,
    mass_bin_count: usize,
    min_bin: usize,
    max_bin: usize,
    min_charge: i32,
    offsets: &[i64],
) -> (Vec<FinalMassBin>, DynamicBitset) {
    let mut own_min_charge = vec![i32::MAX; mass_bin_count];
    let mut own_max_charge = vec![i32::MIN; mass_bin_count];
    let mut bins_for_this_spectrum = DynamicBitset::new(mass_bin_count);

    for b_mz in mz_bins.bins.iter_ones() {
        let mut best: Option<(usize, f64)> = None;
        for (j, &offset) in offsets.iter().enumerate() {
            let b_m_signed = b_mz as i64 + offset;
            if b_m_signed < 0 || b_m_signed as usize >= mass_bin_count {
                continue;
            }
            let b_m = b_m_signed as usize;
            if b_m < min_bin || b_m > max_bin || !candidates.candidates.test(b_m) {
                continue;
            }
            let mi = candidates.mass_intensity[b_m];
            let better = match best {
                Some((_, best_mi)) => mi > best_mi,
                None => true,
            };
            if better {
                best = Some((b_m, mi));
            }
        }
        if let Some((b_m, _)) = best {
            let j = offsets
                .iter()
                .position(|&offset| b_mz as i64 + offset == b_m as i64)
                .unwrap();
            let charge = j as i32 + min_charge;
            own_min_charge[b_m] = own_min_charge[b_m].min(charge);
            own_max_charge[b_m] = own_max_charge[b_m].max(charge);
            bins_for_this_spectrum.set(b_m);
        }
    }

    let mut selected = DynamicBitset::new(mass_bin_count);
    selected.union_with(&bins_for_this_spectrum);
    selected.union_with(carried_forward);

    let mut finals = Vec::new();
    for b_m in selected.iter_ones() {
        if b_m < min_bin || b_m > max_bin {
            continue;
        }
        let from_this_spectrum = bins_for_this_spectrum.test(b_m);
        let (lo, hi) = if from_this_spectrum {
            (own_min_charge[b_m], own_max_charge[b_m])
        } else {
            (min_charge, min_charge + offsets.len() as i32 - 1)
        };
        finals.push(FinalMassBin {
            bin: b_m,
            min_charge: lo,
            max_charge: hi,
            from_this_spectrum,
        });
    }

    (finals, bins_for_this_spectrum)
}
