//! Search tolerances, expressed either as parts-per-million or as an absolute offset.

use std::fmt::Display;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::system::{Mass, MassOverCharge};

/// A tolerance around a given value for search/bin-width purposes.
///
/// Only the `Ppm` variant carries real meaning for this kernel's bin-width derivation
/// (`bins.rs` divides by the ppm fraction); `Abs` exists because callers may reasonably want to
/// express a final-mass tolerance in daltons, and because the teacher crate's own tolerance type
/// carries both variants symmetrically.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Tolerance<T> {
    /// A relative tolerance in parts per million.
    Ppm(OrderedFloat<f64>),
    /// An absolute tolerance, in the same unit as `T`.
    Abs(T),
}

impl<T> Tolerance<T> {
    /// Create a new ppm tolerance.
    pub fn new_ppm(value: f64) -> Self {
        Self::Ppm(value.into())
    }

    /// Create a new absolute tolerance.
    pub fn new_absolute(value: T) -> Self {
        Self::Abs(value)
    }

    /// The ppm value, if this is a `Ppm` tolerance.
    pub fn as_ppm(&self) -> Option<f64> {
        match self {
            Self::Ppm(p) => Some(p.into_inner()),
            Self::Abs(_) => None,
        }
    }
}

impl Tolerance<MassOverCharge> {
    /// Find the `(low, high)` bounds around a given m/z for this tolerance.
    pub fn bounds(&self, mz: MassOverCharge) -> (MassOverCharge, MassOverCharge) {
        match self {
            Self::Ppm(ppm) => {
                let delta = mz.value * ppm.into_inner() / 1e6;
                (crate::system::f64::mz(mz.value - delta), crate::system::f64::mz(mz.value + delta))
            }
            Self::Abs(tol) => (mz - *tol, mz + *tol),
        }
    }

    /// Whether `a` and `b` fall within this tolerance of each other.
    pub fn within(&self, a: MassOverCharge, b: MassOverCharge) -> bool {
        match self {
            Self::Ppm(ppm) => a.ppm(b).value * 1e6 <= ppm.into_inner(),
            Self::Abs(tol) => (a - b).value.abs() <= tol.value,
        }
    }
}

impl Tolerance<Mass> {
    /// Find the `(low, high)` bounds around a given mass for this tolerance.
    pub fn bounds(&self, mass: Mass) -> (Mass, Mass) {
        match self {
            Self::Ppm(ppm) => (
                crate::system::f64::da(mass.value * (1.0 - ppm.into_inner() / 1e6)),
                crate::system::f64::da(mass.value * (1.0 + ppm.into_inner() / 1e6)),
            ),
            Self::Abs(tol) => (mass - *tol, mass + *tol),
        }
    }

    /// Whether `a` and `b` fall within this tolerance of each other.
    pub fn within(&self, a: Mass, b: Mass) -> bool {
        match self {
            Self::Ppm(ppm) => a.ppm(b).value * 1e6 <= ppm.into_inner(),
            Self::Abs(tol) => (a - b).value.abs() <= tol.value,
        }
    }
}

impl<T: Display> Display for Tolerance<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Abs(v) => write!(f, "{v}"),
            Self::Ppm(ppm) => write!(f, "{ppm} ppm"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::system::f64::mz;

    #[test]
    fn ppm_bounds_are_symmetric_around_the_centre() {
        let tol = Tolerance::<MassOverCharge>::new_ppm(10.0);
        let (lo, hi) = tol.bounds(mz(1000.0));
        assert!((lo.value - 999.99).abs() < 1e-6);
        assert!((hi.value - 1000.01).abs() < 1e-6);
    }

    #[test]
    fn within_respects_ppm_tolerance() {
        let tol = Tolerance::<MassOverCharge>::new_ppm(10.0);
        assert!(tol.within(mz(1000.0), mz(1000.005)));
        assert!(!tol.within(mz(1000.0), mz(1000.5)));
    }
}
