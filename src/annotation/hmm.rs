//! annotation::hmm — HMM segmentation estimator.
//!
//! Purpose
//! -------
//! Tie emission densities and a [`ViterbiDecoder`] into the estimator that
//! labels an observation sequence with its most likely hidden states.
//!
//! Key behaviors
//! -------------
//! - [`HMM::new`] / [`HMM::with_options`] validate every parameter once;
//!   no partially constructed model is ever observable.
//! - [`HMM::fit`] is intentionally empty: emission and transition
//!   parameters are supplied by the caller, never learned from data.
//! - [`HMM::predict`] returns the label sequence; [`HMM::decode`] returns the
//!   full [`ViterbiOutcome`] (trellis, path log-probability, warnings).
//!
//! Invariants & assumptions
//! ------------------------
//! - Observations are univariate and equally spaced.
//! - The model is immutable after construction and `Send + Sync`; decodes on
//!   distinct inputs may run concurrently as long as custom densities are pure.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use ndarray::array;
//! use rust_annotators::annotation::{Emission, HMM};
//!
//! let hmm = HMM::new(
//!     vec![Emission::normal(3.5, 0.25), Emission::normal(-5.0, 0.25)],
//!     array![[0.25, 0.75], [0.666, 0.333]],
//!     None,
//! )?;
//! let obs = [3.7, 3.2, 3.4, 3.6, -5.1, -5.2, -4.9];
//! let labels = hmm.fit(&obs).predict(&obs)?;
//! assert_eq!(labels.to_vec(), vec![0, 0, 0, 0, 1, 1, 1]);
//! # Ok::<(), rust_annotators::annotation::HMMError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests cover the reference segmentation example, equivalence of the
//!   implied and explicit uniform initial distribution, construction errors,
//!   and the degenerate-parameter path. Property tests live in
//!   `tests/hmm_properties.rs`.
use crate::annotation::{
    emission::{Emission, EmissionModel},
    errors::{HMMError, HMMResult},
    options::HMMOptions,
    validation::validate_params,
    viterbi::{ViterbiDecoder, ViterbiOutcome},
};
use ndarray::{Array1, Array2};

/// HMM — univariate hidden Markov model annotator.
///
/// Purpose
/// -------
/// Assign to each observation the hidden state of the single most probable
/// state path (Viterbi MAP decoding).
///
/// Parameters
/// ----------
/// Constructed via [`HMM::new`] or [`HMM::with_options`]:
/// - `emissions`: `Vec<Emission>`
///   One emission specification per hidden state.
/// - `transition`: `Array2<f64>`
///   Square matrix; entry `(i, j)` is the probability of moving from state
///   `i` to state `j`. Rows sum to 1.
/// - `initial`: `Option<Array1<f64>>`
///   Prior over the first hidden state; uniform when `None`.
///
/// Fields
/// ------
/// - `emissions`: [`EmissionModel`]
///   Normalized per-state densities.
/// - `decoder`: [`ViterbiDecoder`]
///   Validated transition structure and label table.
///
/// Notes
/// -----
/// - There is no training logic anywhere in this type.
#[derive(Debug, Clone)]
pub struct HMM {
    emissions: EmissionModel,
    decoder: ViterbiDecoder,
}

impl HMM {
    /// Build an HMM with default validation tolerances.
    ///
    /// # Errors
    /// See [`HMM::with_options`].
    pub fn new(
        emissions: Vec<Emission>, transition: Array2<f64>, initial: Option<Array1<f64>>,
    ) -> HMMResult<Self> {
        Self::with_options(emissions, transition, initial, HMMOptions::default())
    }

    /// Build an HMM with explicit validation tolerances.
    ///
    /// Parameters
    /// ----------
    /// - `emissions`, `transition`, `initial`: as on [`HMM`].
    /// - `opts`: [`HMMOptions`]
    ///   Row-sum and initial-sum tolerances.
    ///
    /// Returns
    /// -------
    /// `HMMResult<HMM>`
    ///   A fully validated, immutable model.
    ///
    /// Errors
    /// ------
    /// - Every error of
    ///   [`validate_params`](crate::annotation::validation::validate_params)
    ///   (`Shape`, `DimensionMismatch`, `NoStates`, `InvalidProbability`,
    ///   `RowNormalization`, `InitialNormalization`).
    /// - `HMMError::InvalidEmission` if a parametric emission rejects its
    ///   parameters. Structural checks run first.
    pub fn with_options(
        emissions: Vec<Emission>, transition: Array2<f64>, initial: Option<Array1<f64>>,
        opts: HMMOptions,
    ) -> HMMResult<Self> {
        validate_params(
            emissions.len(),
            transition.view(),
            initial.as_ref().map(|p| p.view()),
            &opts,
        )?;
        let emissions = EmissionModel::new(emissions)?;
        let decoder = ViterbiDecoder::from_validated(transition, initial);
        Ok(HMM { emissions, decoder })
    }

    /// Replace the identity state labels used in the output.
    ///
    /// # Errors
    /// [`HMMError::InvalidStateLabels`] on a wrong length or duplicate label.
    pub fn with_state_labels(self, labels: Vec<usize>) -> HMMResult<Self> {
        let decoder = self.decoder.with_state_labels(labels)?;
        Ok(HMM { emissions: self.emissions, decoder })
    }

    /// No-op: parameters are supplied at construction, not learned.
    ///
    /// Returns `self` unchanged so calls can be chained with [`HMM::predict`].
    pub fn fit(&self, _observations: &[f64]) -> &Self {
        self
    }

    /// Most likely hidden-state label for every observation.
    ///
    /// # Errors
    /// See [`HMM::decode`].
    pub fn predict(&self, observations: &[f64]) -> HMMResult<Array1<usize>> {
        Ok(self.decode(observations)?.into_labels())
    }

    /// Run emission evaluation, the Viterbi forward pass, and the backtrace.
    ///
    /// Parameters
    /// ----------
    /// - `observations`: `&[f64]`
    ///   Non-empty, equally spaced univariate series. Not modified.
    ///
    /// Returns
    /// -------
    /// `HMMResult<ViterbiOutcome>`
    ///   Labels of length `observations.len()`, the path log-probability,
    ///   the trellis, and any non-fatal warnings.
    ///
    /// Errors
    /// ------
    /// - `HMMError::EmptySeries` if `observations` is empty.
    /// - `HMMError::InvalidEmissionProb` if a density evaluates to a
    ///   negative, NaN, or infinite value (e.g. a NaN observation).
    ///
    /// Notes
    /// -----
    /// - When every path has zero probability the outcome carries
    ///   [`HMMWarning::DegenerateParameters`](crate::annotation::HMMWarning)
    ///   and the labels are deterministic but uninformative.
    pub fn decode(&self, observations: &[f64]) -> HMMResult<ViterbiOutcome> {
        if observations.is_empty() {
            return Err(HMMError::EmptySeries);
        }
        let emission_probs = self.emissions.emission_probs(observations);
        self.decoder.decode(emission_probs.view())
    }

    pub fn n_states(&self) -> usize {
        self.decoder.n_states()
    }

    pub fn emissions(&self) -> &EmissionModel {
        &self.emissions
    }

    pub fn decoder(&self) -> &ViterbiDecoder {
        &self.decoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::errors::HMMWarning;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The separable two-state segmentation example.
    // - Implied vs explicit uniform initial distribution.
    // - Construction-time errors surfacing through `HMM::new`.
    // - Degenerate decoding and empty input.
    // -------------------------------------------------------------------------

    fn separable_hmm(initial: Option<Array1<f64>>) -> HMM {
        HMM::new(
            vec![Emission::normal(3.5, 0.25), Emission::normal(-5.0, 0.25)],
            array![[0.25, 0.75], [0.666, 0.333]],
            initial,
        )
        .expect("reference parameters are valid")
    }

    #[test]
    // Purpose
    // -------
    // Well-separated emission centres segment the sequence by proximity.
    //
    // Given
    // -----
    // - Normal emissions at 3.5 and −5 with σ = 0.25.
    // - Transition [[0.25, 0.75], [0.666, 0.333]].
    // - Observations [3.7, 3.2, 3.4, 3.6, −5.1, −5.2, −4.9].
    //
    // Expect
    // ------
    // - Labels [0, 0, 0, 0, 1, 1, 1] and no warnings.
    fn predict_separable_sequence() {
        // Arrange
        let hmm = separable_hmm(None);
        let obs = [3.7, 3.2, 3.4, 3.6, -5.1, -5.2, -4.9];

        // Act
        let outcome = hmm.fit(&obs).decode(&obs).expect("valid observations");

        // Assert
        assert_eq!(outcome.labels().to_vec(), vec![0, 0, 0, 0, 1, 1, 1]);
        assert!(outcome.warnings().is_empty());
        assert!(outcome.log_prob().is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Omitting the initial distribution equals passing a uniform one.
    fn implied_initial_matches_explicit_uniform() {
        let implied = separable_hmm(None);
        let explicit = separable_hmm(Some(array![0.5, 0.5]));
        let obs = [0.0, 3.3, -4.0, 10.0, -1.0, 3.5];

        let a = implied.decode(&obs).expect("valid observations");
        let b = explicit.decode(&obs).expect("valid observations");

        assert_eq!(a, b);
    }

    #[test]
    // Purpose
    // -------
    // Construction errors surface from `HMM::new` in the documented order.
    fn new_reports_construction_errors() {
        let two = vec![Emission::normal(0.0, 1.0), Emission::normal(1.0, 1.0)];

        assert!(matches!(
            HMM::new(two.clone(), Array2::from_elem((2, 3), 1.0 / 3.0), None),
            Err(HMMError::Shape { .. })
        ));
        assert!(matches!(
            HMM::new(
                vec![Emission::normal(0.0, 1.0)],
                array![[0.5, 0.5], [0.5, 0.5]],
                None
            ),
            Err(HMMError::DimensionMismatch { emissions: 1, transition: 2, initial: 1 })
        ));
        assert!(matches!(
            HMM::new(two.clone(), array![[0.25, 0.25], [0.5, 0.5]], None),
            Err(HMMError::RowNormalization { row: 0, .. })
        ));
        assert!(matches!(
            HMM::new(
                vec![Emission::normal(0.0, 1.0), Emission::normal(1.0, 0.0)],
                array![[0.5, 0.5], [0.5, 0.5]],
                None
            ),
            Err(HMMError::InvalidEmission { state: 1, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // An observation outside the support of every state yields a degenerate
    // but complete decode.
    //
    // Given
    // -----
    // - Uniform emissions on [0, 1] and [0, 2]; the observation 5.0 has zero
    //   density under both.
    //
    // Expect
    // ------
    // - `DegenerateParameters` warning, labels of full length, no error.
    fn decode_outside_support_is_degenerate() {
        let hmm = HMM::new(
            vec![Emission::Uniform { min: 0.0, max: 1.0 }, Emission::Uniform { min: 0.0, max: 2.0 }],
            array![[0.5, 0.5], [0.5, 0.5]],
            None,
        )
        .expect("valid uniform model");
        let obs = [0.5, 5.0, 0.5];

        let outcome = hmm.decode(&obs).expect("zero densities are not errors");

        assert_eq!(outcome.warnings(), &[HMMWarning::DegenerateParameters]);
        assert_eq!(outcome.labels().len(), obs.len());
    }

    #[test]
    // Purpose
    // -------
    // Empty input and NaN observations are rejected at decode time.
    fn decode_rejects_empty_and_nan_input() {
        let hmm = separable_hmm(None);

        assert_eq!(hmm.predict(&[]), Err(HMMError::EmptySeries));
        assert!(matches!(
            hmm.predict(&[1.0, f64::NAN]),
            Err(HMMError::InvalidEmissionProb { index: 1, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Relabeled states appear in the output.
    fn with_state_labels_relabels_predictions() {
        let hmm = separable_hmm(None).with_state_labels(vec![10, 20]).expect("distinct labels");

        let labels = hmm.predict(&[3.5, -5.0]).expect("valid observations");

        assert_eq!(labels.to_vec(), vec![10, 20]);
    }
}
