//! Averagine isotope-envelope table.
//!
//! The "averagine" model approximates the elemental composition of an average amino-acid
//! residue as C4.9384 H7.7583 N1.3577 O1.4773 S0.0417 per 111.1254 Da, scaled to an arbitrary
//! mass. Scaling this composition and convolving each element's natural isotope distribution
//! gives the expected relative intensities of the isotope envelope a species of that mass would
//! produce, which is the reference pattern `scoring.rs` compares observed envelopes against.
//!
//! The per-element binomial convolution here follows the approach in the teacher's
//! `isotopes.rs` (`MolecularFormula::isotopic_distribution`), which convolves one element's
//! minor-isotope binomial distribution into a running polynomial at a time. That file builds the
//! running polynomial on `ndarray::Array1`; `ndarray` is not part of this crate's dependency
//! table, so the convolution here is done with plain `Vec<f64>` instead — same algorithm, no
//! extra crate.

use probability::distribution::{Binomial, Discrete};

use crate::system::Mass;

const AVERAGINE_UNIT_MASS: f64 = 111.1254;
const AVERAGINE_C: f64 = 4.938_4;
const AVERAGINE_H: f64 = 7.758_3;
const AVERAGINE_N: f64 = 1.357_7;
const AVERAGINE_O: f64 = 1.477_3;
const AVERAGINE_S: f64 = 0.041_7;

/// `(nominal mass-unit offset, natural abundance)` for each minor isotope of an element.
/// Offsets and abundances are CIAAW natural-abundance values.
struct Element {
    amount: usize,
    minor_isotopes: &'static [(usize, f64)],
}

const H_ISOTOPES: [(usize, f64); 1] = [(1, 0.000_115)]; // deuterium
const C_ISOTOPES: [(usize, f64); 1] = [(1, 0.0107)]; // 13C
const N_ISOTOPES: [(usize, f64); 1] = [(1, 0.003_64)]; // 15N
const O_ISOTOPES: [(usize, f64); 2] = [(1, 0.000_381), (2, 0.00205)]; // 17O, 18O
const S_ISOTOPES: [(usize, f64); 2] = [(1, 0.0075), (2, 0.0425)]; // 33S, 34S

const ISOTOPE_THRESHOLD: f64 = 1e-6;

/// Convolve one element's minor-isotope binomial distribution into `result`.
fn convolve_element(result: Vec<f64>, element: &Element) -> Vec<f64> {
    let mut result = result;
    for &(offset, abundance) in element.minor_isotopes {
        if element.amount == 0 || abundance <= 0.0 {
            continue;
        }
        let binomial = Binomial::new(element.amount, abundance);
        let distribution: Vec<f64> = (0..=element.amount)
            .map(|t| binomial.mass(t))
            .flat_map(|p| std::iter::once(p).chain(std::iter::repeat(0.0)).take(offset))
            .collect();

        let out_len = result.len() + distribution.len();
        let mut new = vec![0.0; out_len];
        for (i, a) in distribution.iter().enumerate() {
            if *a < ISOTOPE_THRESHOLD {
                continue;
            }
            for (j, r) in result.iter().enumerate() {
                new[i + j] += a * r;
            }
        }
        new.truncate(
            new.iter()
                .rposition(|v| *v > ISOTOPE_THRESHOLD)
                .map_or(1, |i| i + 1)
                .max(1),
        );
        result = new;
    }
    result
}

/// The isotope pattern (relative intensities, index 0 = monoisotopic) of a scaled averagine
/// composition.
fn averagine_isotope_pattern(mass: f64) -> Vec<f64> {
    let ratio = mass / AVERAGINE_UNIT_MASS;
    let elements = [
        Element {
            amount: (AVERAGINE_C * ratio).round() as usize,
            minor_isotopes: &C_ISOTOPES,
        },
        Element {
            amount: (AVERAGINE_H * ratio).round() as usize,
            minor_isotopes: &H_ISOTOPES,
        },
        Element {
            amount: (AVERAGINE_N * ratio).round() as usize,
            minor_isotopes: &N_ISOTOPES,
        },
        Element {
            amount: (AVERAGINE_O * ratio).round() as usize,
            minor_isotopes: &O_ISOTOPES,
        },
        Element {
            amount: (AVERAGINE_S * ratio).round() as usize,
            minor_isotopes: &S_ISOTOPES,
        },
    ];

    elements
        .iter()
        .fold(vec![1.0], |acc, element| convolve_element(acc, element))
}

/// One entry in an [`AveragineTable`]: the isotope pattern expected for a species near `mass`.
#[derive(Clone, Debug)]
pub struct AveragineEntry {
    /// The mass grid point this entry was computed for.
    pub mass: f64,
    /// Relative isotope intensities, index 0 = monoisotopic, trimmed to the range kept at or
    /// above 1% of the most abundant entry.
    pub distribution: Vec<f64>,
    /// Index of the most abundant isotope within `distribution`.
    pub apex_index: usize,
    /// Number of isotope slots below the apex retained after trimming.
    pub left_index: usize,
    /// Number of isotope slots above the apex retained after trimming.
    pub right_index: usize,
}

impl AveragineEntry {
    fn new(mass: f64) -> Self {
        let full = averagine_isotope_pattern(mass);
        let apex_index = full
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i);
        let apex_value = full[apex_index];
        let cutoff = apex_value * 0.01;

        let left_bound = full[..=apex_index]
            .iter()
            .rposition(|v| *v < cutoff)
            .map_or(0, |i| i + 1);
        let right_bound = full[apex_index..]
            .iter()
            .position(|v| *v < cutoff)
            .map_or(full.len() - 1, |i| apex_index + i - 1);

        let distribution = full[left_bound..=right_bound].to_vec();
        Self {
            mass,
            distribution,
            apex_index: apex_index - left_bound,
            left_index: apex_index - left_bound,
            right_index: right_bound - apex_index,
        }
    }
}

/// A precomputed grid of [`AveragineEntry`] values spanning a mass range.
///
/// Grid step is `max(10.0, (max_mass - min_mass) / 100.0)` Da, per the deconvolution kernel's
/// parameter note, with construction clamping to at least 3 grid points so a narrow mass window
/// still yields a usable table instead of a single degenerate entry.
#[derive(Clone, Debug)]
pub struct AveragineTable {
    entries: Vec<AveragineEntry>,
    min_mass: f64,
    step: f64,
}

impl AveragineTable {
    /// Build a table spanning `[min_mass, max_mass]`.
    pub fn new(min_mass: Mass, max_mass: Mass) -> Self {
        let min_mass = min_mass.value;
        let max_mass = max_mass.value;
        let span = (max_mass - min_mass).max(0.0);
        let raw_step = (span / 100.0).max(10.0);
        let n_points = ((span / raw_step).floor() as usize + 1).max(3);
        let step = if n_points > 1 {
            span / (n_points - 1) as f64
        } else {
            1.0
        };

        let entries = (0..n_points)
            .map(|i| AveragineEntry::new(min_mass + i as f64 * step))
            .collect();

        Self {
            entries,
            min_mass,
            step,
        }
    }

    /// The entry for the grid point nearest `mass`.
    pub fn get(&self, mass: Mass) -> &AveragineEntry {
        let idx = (((mass.value - self.min_mass) / self.step).round() as i64)
            .clamp(0, self.entries.len() as i64 - 1) as usize;
        &self.entries[idx]
    }

    /// Number of grid points in this table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this table has no grid points (never true after [`AveragineTable::new`]).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::system::f64::da;

    #[test]
    fn pattern_sums_close_to_one_and_is_unimodal_near_apex() {
        let pattern = averagine_isotope_pattern(10_000.0);
        let sum: f64 = pattern.iter().sum();
        assert!((sum - 1.0).abs() < 0.05, "sum = {sum}");
        let apex = pattern
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        assert!(apex > 0, "a 10 kDa species should not be monoisotope-apex");
    }

    #[test]
    fn heavier_species_have_a_later_apex() {
        let light = averagine_isotope_pattern(1_000.0);
        let heavy = averagine_isotope_pattern(50_000.0);
        let apex = |p: &[f64]| p.iter().enumerate().max_by(|a, b| a.1.total_cmp(b.1)).unwrap().0;
        assert!(apex(&heavy) > apex(&light));
    }

    #[test]
    fn table_has_at_least_three_grid_points_even_for_a_narrow_span() {
        let table = AveragineTable::new(da(10_000.0), da(10_005.0));
        assert!(table.len() >= 3);
    }

    #[test]
    fn get_returns_the_nearest_grid_point() {
        let table = AveragineTable::new(da(1_000.0), da(100_000.0));
        let entry = table.get(da(1_000.0));
        assert!((entry.mass - 1_000.0).abs() < table.step + 1.0);
    }

    #[test]
    fn entries_are_trimmed_around_the_apex() {
        let table = AveragineTable::new(da(1_000.0), da(100_000.0));
        let entry = table.get(da(50_000.0));
        assert!(entry.distribution[entry.apex_index] > 0.0);
        assert!(entry.left_index + entry.right_index + 1 == entry.distribution.len());
    }
}
