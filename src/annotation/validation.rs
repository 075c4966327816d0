//! annotation::validation — construction-time guards for HMM parameters.
//!
//! Purpose
//! -------
//! Reject inconsistent or malformed HMM parameters before any decode is
//! attempted. All checks run once, when an [`HMM`](crate::annotation::HMM)
//! or [`ViterbiDecoder`](crate::annotation::ViterbiDecoder) is built.
//!
//! Key behaviors
//! -------------
//! - Check, in order: transition shape, state-count consistency, probability
//!   ranges, transition row sums, initial-distribution sum.
//! - Map every violation into a structured [`HMMError`] carrying the
//!   offending value.
//!
//! Invariants & assumptions
//! ------------------------
//! - `Array2` already guarantees two dimensions; the shape check only has to
//!   enforce squareness here. Adapters that accept dynamically shaped input
//!   (the Python bindings) call [`validate_transition_shape`] themselves.
//! - When no initial distribution is supplied, its implied length is the
//!   number of emission functions.
//!
//! Conventions
//! -----------
//! - Pure functions with no side effects; `Ok(())` carries no information.
//! - Tolerances come from [`HMMOptions`].
//!
//! Testing notes
//! -------------
//! - Unit tests exercise each error branch of [`validate_params`] and the
//!   check ordering (shape before counts before sums).
use crate::annotation::{
    errors::{HMMError, HMMResult},
    options::HMMOptions,
};
use ndarray::{ArrayView1, ArrayView2};

/// Validate the full set of HMM parameters.
///
/// Parameters
/// ----------
/// - `n_emissions`: `usize`
///   Number of emission functions (one per hidden state).
/// - `transition`: `ArrayView2<f64>`
///   Candidate transition matrix; entry `(i, j)` is P(state j | state i).
/// - `initial`: `Option<ArrayView1<f64>>`
///   Optional initial distribution over hidden states.
/// - `opts`: `&HMMOptions`
///   Normalization tolerances.
///
/// Returns
/// -------
/// `HMMResult<()>`
///   `Ok(())` when every check passes.
///
/// Errors
/// ------
/// - `HMMError::Shape` if `transition` is not square.
/// - `HMMError::DimensionMismatch` if the emission count, transition size,
///   and initial length (or implied length) differ.
/// - `HMMError::NoStates` if all three counts are zero.
/// - `HMMError::InvalidProbability` if any probability is non-finite or
///   outside `[0, 1]`.
/// - `HMMError::RowNormalization` if a transition row does not sum to 1.
/// - `HMMError::InitialNormalization` if the initial distribution does not
///   sum to 1.
///
/// Examples
/// --------
/// ```rust
/// # use rust_annotators::annotation::{validation::validate_params, HMMError, HMMOptions};
/// # use ndarray::array;
/// let transition = array![[0.25, 0.75], [0.666, 0.333]];
/// assert!(validate_params(2, transition.view(), None, &HMMOptions::default()).is_ok());
///
/// let half = array![[0.25, 0.25], [0.5, 0.5]];
/// match validate_params(2, half.view(), None, &HMMOptions::default()) {
///     Err(HMMError::RowNormalization { row: 0, .. }) => (),
///     other => panic!("expected RowNormalization, got {other:?}"),
/// }
/// ```
pub fn validate_params(
    n_emissions: usize, transition: ArrayView2<f64>, initial: Option<ArrayView1<f64>>,
    opts: &HMMOptions,
) -> HMMResult<()> {
    validate_transition_shape(transition.shape())?;
    let n_transition = transition.nrows();
    let n_initial = initial.as_ref().map_or(n_emissions, |p| p.len());
    validate_state_counts(n_emissions, n_transition, n_initial)?;
    if n_transition == 0 {
        return Err(HMMError::NoStates);
    }

    validate_probabilities("transition matrix", transition.iter())?;
    if let Some(initial) = initial.as_ref() {
        validate_probabilities("initial probabilities", initial.iter())?;
    }

    for (row, values) in transition.rows().into_iter().enumerate() {
        let sum = values.sum();
        if !opts.transition_sum_ok(sum) {
            return Err(HMMError::RowNormalization { row, sum });
        }
    }

    if let Some(initial) = initial {
        // Left-to-right accumulation; the exact check depends on rounding order.
        let sum = initial.iter().fold(0.0, |acc, &p| acc + p);
        if !opts.initial_sum_ok(sum) {
            return Err(HMMError::InitialNormalization { sum });
        }
    }

    Ok(())
}

/// Require a two-dimensional, square shape.
pub fn validate_transition_shape(shape: &[usize]) -> HMMResult<()> {
    match shape {
        [rows, cols] if rows == cols => Ok(()),
        _ => Err(HMMError::Shape { shape: shape.to_vec() }),
    }
}

/// Require that all three state counts agree.
pub fn validate_state_counts(emissions: usize, transition: usize, initial: usize) -> HMMResult<()> {
    if emissions == transition && transition == initial {
        Ok(())
    } else {
        Err(HMMError::DimensionMismatch { emissions, transition, initial })
    }
}

fn validate_probabilities<'a, I>(source: &'static str, values: I) -> HMMResult<()>
where
    I: Iterator<Item = &'a f64>,
{
    for (index, &value) in values.enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(HMMError::InvalidProbability { source, index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The success path for the reference two-state parameters.
    // - Each error branch of `validate_params`, and the order in which the
    //   checks are applied.
    // -------------------------------------------------------------------------

    fn reference_transition() -> Array2<f64> {
        array![[0.25, 0.75], [0.666, 0.333]]
    }

    #[test]
    // Purpose
    // -------
    // The reference parameters pass, with and without an initial vector.
    fn validate_params_reference_parameters_succeed() {
        // Arrange
        let transition = reference_transition();
        let initial = array![0.2, 0.8];
        let opts = HMMOptions::default();

        // Act / Assert
        assert!(validate_params(2, transition.view(), None, &opts).is_ok());
        assert!(validate_params(2, transition.view(), Some(initial.view()), &opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // A non-square transition matrix is a shape error even when the row
    // count matches the emission count.
    //
    // Given
    // -----
    // - A 2×3 transition matrix and 2 emissions.
    //
    // Expect
    // ------
    // - `HMMError::Shape { shape: [2, 3] }`.
    fn validate_params_non_square_returns_shape_error() {
        let transition = array![[0.2, 0.3, 0.5], [0.1, 0.1, 0.8]];

        let result = validate_params(2, transition.view(), None, &HMMOptions::default());

        assert_eq!(result, Err(HMMError::Shape { shape: vec![2, 3] }));
    }

    #[test]
    // Purpose
    // -------
    // One-dimensional and three-dimensional shapes are rejected.
    fn validate_transition_shape_rejects_wrong_rank() {
        assert!(matches!(validate_transition_shape(&[4]), Err(HMMError::Shape { .. })));
        assert!(matches!(validate_transition_shape(&[2, 2, 2]), Err(HMMError::Shape { .. })));
        assert!(validate_transition_shape(&[3, 3]).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Emission count differing from the transition size is a dimension
    // mismatch; the implied initial length equals the emission count.
    //
    // Given
    // -----
    // - 3 emissions, a 2×2 transition matrix, no initial vector.
    //
    // Expect
    // ------
    // - `DimensionMismatch { emissions: 3, transition: 2, initial: 3 }`.
    fn validate_params_emission_count_mismatch() {
        let transition = reference_transition();

        let result = validate_params(3, transition.view(), None, &HMMOptions::default());

        assert_eq!(
            result,
            Err(HMMError::DimensionMismatch { emissions: 3, transition: 2, initial: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // An initial vector of the wrong length is a dimension mismatch.
    fn validate_params_initial_length_mismatch() {
        let transition = reference_transition();
        let initial = array![0.2, 0.3, 0.5];

        let result =
            validate_params(2, transition.view(), Some(initial.view()), &HMMOptions::default());

        assert_eq!(
            result,
            Err(HMMError::DimensionMismatch { emissions: 2, transition: 2, initial: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // A row summing to 0.5 fails normalization and reports the row index.
    fn validate_params_row_sum_half_returns_row_normalization() {
        let transition = array![[0.5, 0.5], [0.25, 0.25]];

        let result = validate_params(2, transition.view(), None, &HMMOptions::default());

        match result {
            Err(HMMError::RowNormalization { row, sum }) => {
                assert_eq!(row, 1);
                assert_eq!(sum, 0.5);
            }
            other => panic!("expected RowNormalization, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A model without hidden states is rejected.
    fn validate_params_zero_states_returns_no_states() {
        let transition = Array2::<f64>::zeros((0, 0));

        let result = validate_params(0, transition.view(), None, &HMMOptions::default());

        assert_eq!(result, Err(HMMError::NoStates));
    }

    #[test]
    // Purpose
    // -------
    // Negative and NaN entries are rejected before the row sums are checked.
    fn validate_params_out_of_range_entries() {
        let negative = array![[1.2, -0.2], [0.5, 0.5]];
        let nan = array![[f64::NAN, 1.0], [0.5, 0.5]];
        let opts = HMMOptions::default();

        match validate_params(2, negative.view(), None, &opts) {
            Err(HMMError::InvalidProbability { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected InvalidProbability, got {other:?}"),
        }
        assert!(matches!(
            validate_params(2, nan.view(), None, &opts),
            Err(HMMError::InvalidProbability { index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range initial entries are rejected by the range check even when
    // the vector sums to exactly 1.
    //
    // Given
    // -----
    // - Initial [1.5, -0.5] with the reference transition matrix.
    //
    // Expect
    // ------
    // - `InvalidProbability` sourced from the initial probabilities, pointing
    //   at the first offending entry (index 0, value 1.5).
    fn validate_params_out_of_range_initial_entries() {
        let transition = reference_transition();
        let initial = array![1.5, -0.5];

        let result =
            validate_params(2, transition.view(), Some(initial.view()), &HMMOptions::default());

        assert_eq!(
            result,
            Err(HMMError::InvalidProbability {
                source: "initial probabilities",
                index: 0,
                value: 1.5,
            })
        );
    }

    #[test]
    // Purpose
    // -------
    // The exact initial-sum check accumulates left to right, so ten entries
    // of 0.1 (which accumulate to 0.9999999999999999) are rejected.
    //
    // Given
    // -----
    // - A 10-state uniform transition matrix and initial [0.1; 10].
    //
    // Expect
    // ------
    // - `InitialNormalization` under `exact_initial`; accepted by default.
    fn validate_params_exact_initial_sums_left_to_right() {
        let transition = Array2::from_elem((10, 10), 0.1);
        let initial = ndarray::Array1::from_elem(10, 0.1);

        let exact = validate_params(
            10,
            transition.view(),
            Some(initial.view()),
            &HMMOptions::exact_initial(),
        );
        let tolerant =
            validate_params(10, transition.view(), Some(initial.view()), &HMMOptions::default());

        match exact {
            Err(HMMError::InitialNormalization { sum }) => assert!(sum < 1.0),
            other => panic!("expected InitialNormalization, got {other:?}"),
        }
        assert!(tolerant.is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The initial-sum check follows the configured tolerance: 0.99 passes
    // by default and fails in exact mode; 0.5 fails in both.
    fn validate_params_initial_sum_respects_options() {
        let transition = reference_transition();
        let near = array![0.5, 0.49];
        let far = array![0.25, 0.25];

        assert!(
            validate_params(2, transition.view(), Some(near.view()), &HMMOptions::default())
                .is_ok()
        );
        assert!(matches!(
            validate_params(2, transition.view(), Some(near.view()), &HMMOptions::exact_initial()),
            Err(HMMError::InitialNormalization { .. })
        ));
        assert!(matches!(
            validate_params(2, transition.view(), Some(far.view()), &HMMOptions::default()),
            Err(HMMError::InitialNormalization { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Shape is checked before counts, and counts before sums.
    //
    // Given
    // -----
    // - A non-square, non-normalized matrix with a mismatched emission count.
    //
    // Expect
    // ------
    // - `Shape` wins; with a square but mismatched matrix, `DimensionMismatch`
    //   wins over `RowNormalization`.
    fn validate_params_check_ordering() {
        let opts = HMMOptions::default();
        let non_square = array![[0.1, 0.1, 0.1], [0.1, 0.1, 0.1]];
        let square_bad_rows = array![[0.1, 0.1], [0.1, 0.1]];

        assert!(matches!(
            validate_params(5, non_square.view(), None, &opts),
            Err(HMMError::Shape { .. })
        ));
        assert!(matches!(
            validate_params(5, square_bad_rows.view(), None, &opts),
            Err(HMMError::DimensionMismatch { .. })
        ));
    }
}
