//! The charge filter bank and its harmonic shadows.
//!
//! A peak observed at m/z `p` and charge `c` implies a neutral mass of `(p - proton) * c`. In
//! log space, `log(mass) = log(p) + log(c)` (up to the proton-mass correction handled in
//! `log_mz.rs`), so per-charge offsets are precomputed once per spectrum as
//! `filter[i] = log(1 / (i + min_charge))` for `i` in `0..charge_count`, and added to a peak's
//! log-m/z to land directly on the mass axis. Harmonic filters shift this by a fractional charge
//! `n / hc` (with `n = hc / 2`) to land on the position a same-index peak from a harmonic overtone
//! would occupy, which `mass_bins.rs` uses to discount noise.

use crate::params::Parameters;

/// Precomputed per-charge log-space offsets for one spectrum, plus one harmonic shadow bank per
/// configured harmonic charge.
#[derive(Clone, Debug)]
pub struct FilterBank {
    /// `filter[i] = log(1 / (i + min_charge))`, for `i` in `0..charge_count`.
    pub filter: Vec<f64>,
    /// `harmonic[k][i] = log(1 / (i + (hc/2)/hc + min_charge))`, one row per harmonic charge.
    pub harmonic: Vec<Vec<f64>>,
}

impl FilterBank {
    /// Build the filter bank for a parameter set.
    pub fn new(params: &Parameters) -> Self {
        let charge_count = params.charge_count();
        let min_charge = f64::from(params.min_charge);

        let filter = (0..charge_count)
            .map(|i| (1.0 / (i as f64 + min_charge)).ln())
            .collect();

        let harmonic = params
            .harmonic_charges
            .iter()
            .map(|&hc| {
                let hc = f64::from(hc);
                let n = (hc / 2.0).floor();
                (0..charge_count)
                    .map(|i| (1.0 / (i as f64 + n / hc + min_charge)).ln())
                    .collect()
            })
            .collect();

        Self { filter, harmonic }
    }

    /// Number of charge states this bank covers.
    pub fn charge_count(&self) -> usize {
        self.filter.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn filter_values_are_descending_and_negative() {
        let bank = FilterBank::new(&Parameters::default());
        assert!(bank.filter.iter().all(|v| *v < 0.0));
        assert!(bank.filter.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn harmonic_bank_has_one_row_per_harmonic_charge() {
        let params = Parameters::default();
        let bank = FilterBank::new(&params);
        assert_eq!(bank.harmonic.len(), params.harmonic_charges.len());
        for row in &bank.harmonic {
            assert_eq!(row.len(), bank.charge_count());
        }
    }
}
