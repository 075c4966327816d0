//! Validation tolerances for HMM construction.
//!
//! Purpose
//! -------
//! Provide a small, validated container for the normalization tolerances used
//! when checking that transition-matrix rows and the initial distribution sum
//! to one.
//!
//! Key behaviors
//! -------------
//! - [`HMMOptions::default`] applies the same relative tolerance (`5e-2`) to
//!   transition rows and the initial distribution.
//! - [`HMMOptions::exact_initial`] keeps the transition tolerance but demands
//!   that the initial distribution sums to exactly `1.0`.
//! - [`HMMOptions::new`] rejects negative or non-finite tolerances.
//!
//! Conventions
//! -----------
//! - A sum `s` is accepted when `|1 − s| ≤ 1e-8 + rtol · |s|`, the same rule
//!   as `numpy.isclose(1, s, rtol=rtol)`.
//! - `initial_rtol == 0.0` switches the initial check to exact equality.
use crate::annotation::errors::{HMMError, HMMResult};

/// Default relative tolerance for row and initial-distribution sums.
pub const DEFAULT_SUM_RTOL: f64 = 5e-2;

/// Absolute slack added to every relative tolerance check.
pub const SUM_ATOL: f64 = 1e-8;

/// HMMOptions — normalization tolerances applied at construction.
///
/// Fields
/// ------
/// - `transition_rtol`: `f64`
///   Relative tolerance for each transition-matrix row sum.
/// - `initial_rtol`: `f64`
///   Relative tolerance for the initial-distribution sum; `0.0` means exact.
///
/// Invariants
/// ----------
/// - Both tolerances are finite and `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HMMOptions {
    transition_rtol: f64,
    initial_rtol: f64,
}

impl HMMOptions {
    /// Construct options with explicit tolerances.
    ///
    /// # Errors
    /// Returns [`HMMError::InvalidTolerance`] if either tolerance is negative
    /// or non-finite.
    pub fn new(transition_rtol: f64, initial_rtol: f64) -> HMMResult<Self> {
        for value in [transition_rtol, initial_rtol] {
            if !value.is_finite() || value < 0.0 {
                return Err(HMMError::InvalidTolerance { value });
            }
        }
        Ok(HMMOptions { transition_rtol, initial_rtol })
    }

    /// Default transition tolerance with an exact initial-sum check.
    pub const fn exact_initial() -> Self {
        HMMOptions { transition_rtol: DEFAULT_SUM_RTOL, initial_rtol: 0.0 }
    }

    pub fn transition_rtol(&self) -> f64 {
        self.transition_rtol
    }

    /// Relative tolerance of the initial-sum check; `0.0` means exact.
    pub fn initial_rtol(&self) -> f64 {
        self.initial_rtol
    }

    /// Whether `sum` is accepted as a transition-row total.
    pub fn transition_sum_ok(&self, sum: f64) -> bool {
        sums_to_one(sum, self.transition_rtol)
    }

    /// Whether `sum` is accepted as an initial-distribution total.
    pub fn initial_sum_ok(&self, sum: f64) -> bool {
        if self.initial_rtol == 0.0 { sum == 1.0 } else { sums_to_one(sum, self.initial_rtol) }
    }
}

impl Default for HMMOptions {
    fn default() -> Self {
        HMMOptions { transition_rtol: DEFAULT_SUM_RTOL, initial_rtol: DEFAULT_SUM_RTOL }
    }
}

fn sums_to_one(sum: f64, rtol: f64) -> bool {
    (1.0 - sum).abs() <= SUM_ATOL + rtol * sum.abs()
}
