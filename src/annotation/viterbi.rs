//! annotation::viterbi — log-domain Viterbi decoding.
//!
//! Purpose
//! -------
//! Compute the single most probable hidden-state path for an observation
//! sequence, given per-observation emission densities, a transition matrix,
//! and an initial distribution. The computation runs in the log domain so
//! that long sequences do not underflow.
//!
//! Key behaviors
//! -------------
//! - [`ViterbiDecoder`] stores the validated transition matrix and initial
//!   distribution (uniform `1/n` when none is supplied, never the stationary
//!   distribution) together with their logarithms.
//! - [`ViterbiDecoder::decode`] fills a [`Trellis`] of best log-probabilities
//!   and backpointers, then backtraces from the best final state.
//! - A final trellis column that is entirely `−∞` is reported as
//!   [`HMMWarning::DegenerateParameters`] on the outcome and logged through
//!   `tracing`; decoding still completes.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ties are broken towards the lowest state index, both for backpointers
//!   and for the final state, so results are reproducible bit for bit.
//! - Backpointers in column 0 are 0; they are never followed.
//! - The decoder is immutable and `Send + Sync`; each decode allocates and
//!   returns its own trellis.
//!
//! Conventions
//! -----------
//! - Trellis matrices are `(n_states × n_obs)`: rows are hidden states,
//!   columns are observation indices.
//! - Emission matrices follow the same layout (see
//!   [`EmissionModel::emission_probs`](crate::annotation::EmissionModel::emission_probs)).
//!
//! Performance
//! -----------
//! - O(n_states² · n_obs) time and O(n_states · n_obs) space; a single
//!   left-to-right pass followed by a right-to-left backtrace.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the recursion on hand-computed two-state examples,
//!   lowest-index tie-breaking, degenerate trellises, emission-matrix input
//!   checks, and state relabeling.
use crate::annotation::{
    errors::{HMMError, HMMResult, HMMWarning},
    options::HMMOptions,
    validation::validate_params,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Trellis — dynamic-programming tables of one decode.
///
/// Fields
/// ------
/// - `log_prob`: `Array2<f64>`
///   `log_prob[(n, t)]` is the best log-probability of any path that is in
///   state `n` at observation `t`.
/// - `backpointer`: `Array2<usize>`
///   `backpointer[(n, t)]` is the predecessor state (at `t − 1`) on that best
///   path.
#[derive(Debug, Clone, PartialEq)]
pub struct Trellis {
    pub log_prob: Array2<f64>,
    pub backpointer: Array2<usize>,
}

/// ViterbiOutcome — result of a single decode.
///
/// Fields
/// ------
/// - `labels`: most likely hidden-state label per observation.
/// - `log_prob`: log-probability of the decoded path (`−∞` when degenerate).
/// - `trellis`: the filled DP tables.
/// - `warnings`: non-fatal diagnostics raised during decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiOutcome {
    labels: Array1<usize>,
    log_prob: f64,
    trellis: Trellis,
    warnings: Vec<HMMWarning>,
}

impl ViterbiOutcome {
    /// Decoded label per observation.
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    /// Consume the outcome and keep only the labels.
    pub fn into_labels(self) -> Array1<usize> {
        self.labels
    }

    /// Log-probability of the decoded path.
    pub fn log_prob(&self) -> f64 {
        self.log_prob
    }

    pub fn trellis(&self) -> &Trellis {
        &self.trellis
    }

    pub fn warnings(&self) -> &[HMMWarning] {
        &self.warnings
    }

    /// Whether every path had zero probability under the parameters.
    pub fn is_degenerate(&self) -> bool {
        self.warnings.contains(&HMMWarning::DegenerateParameters)
    }
}

/// ViterbiDecoder — validated transition structure of an HMM.
///
/// Purpose
/// -------
/// Hold the transition matrix, the initial distribution, and the state label
/// table, and decode emission matrices into label sequences.
///
/// Parameters
/// ----------
/// Constructed via [`ViterbiDecoder::new`]:
/// - `transition`: `Array2<f64>`
///   Square matrix; row `i` is the distribution of the next state given
///   state `i`.
/// - `initial`: `Option<Array1<f64>>`
///   Prior over the first hidden state; `None` means uniform.
/// - `opts`: `&HMMOptions`
///   Normalization tolerances.
///
/// Invariants
/// ----------
/// - `transition` is square, entries in `[0, 1]`, rows sum to 1 within
///   tolerance; `initial` has one entry per state and sums to 1.
/// - `states` holds one distinct label per state (identity by default).
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiDecoder {
    transition: Array2<f64>,
    initial: Array1<f64>,
    log_transition: Array2<f64>,
    log_initial: Array1<f64>,
    states: Vec<usize>,
}

impl ViterbiDecoder {
    /// Validate parameters and build a decoder.
    ///
    /// # Errors
    /// Any error of [`validate_params`], with the transition size standing
    /// in for the emission count.
    ///
    /// # Examples
    /// ```rust
    /// use ndarray::array;
    /// use rust_annotators::annotation::{HMMOptions, ViterbiDecoder};
    ///
    /// let decoder =
    ///     ViterbiDecoder::new(array![[0.9, 0.1], [0.1, 0.9]], None, &HMMOptions::default())
    ///         .unwrap();
    /// let emission = array![[0.9, 0.8, 0.05], [0.1, 0.2, 0.95]];
    /// let outcome = decoder.decode(emission.view()).unwrap();
    /// assert_eq!(outcome.labels().to_vec(), vec![0, 0, 1]);
    /// ```
    pub fn new(
        transition: Array2<f64>, initial: Option<Array1<f64>>, opts: &HMMOptions,
    ) -> HMMResult<Self> {
        validate_params(
            transition.nrows(),
            transition.view(),
            initial.as_ref().map(|p| p.view()),
            opts,
        )?;
        Ok(Self::from_validated(transition, initial))
    }

    /// Build a decoder from parameters that already passed [`validate_params`].
    pub(crate) fn from_validated(transition: Array2<f64>, initial: Option<Array1<f64>>) -> Self {
        let n_states = transition.nrows();
        let initial =
            initial.unwrap_or_else(|| Array1::from_elem(n_states, 1.0 / n_states as f64));
        let log_transition = transition.mapv(f64::ln);
        let log_initial = initial.mapv(f64::ln);
        ViterbiDecoder {
            transition,
            initial,
            log_transition,
            log_initial,
            states: (0..n_states).collect(),
        }
    }

    /// Replace the identity label table with `labels`.
    ///
    /// # Errors
    /// [`HMMError::InvalidStateLabels`] if `labels` does not have one entry
    /// per state or repeats a label.
    pub fn with_state_labels(mut self, labels: Vec<usize>) -> HMMResult<Self> {
        if labels.len() != self.n_states() {
            return Err(HMMError::InvalidStateLabels {
                reason: "expected exactly one label per hidden state",
            });
        }
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(HMMError::InvalidStateLabels { reason: "labels must be distinct" });
        }
        self.states = labels;
        Ok(self)
    }

    pub fn n_states(&self) -> usize {
        self.transition.nrows()
    }

    pub fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    /// Effective initial distribution (uniform if none was supplied).
    pub fn initial(&self) -> &Array1<f64> {
        &self.initial
    }

    pub fn states(&self) -> &[usize] {
        &self.states
    }

    /// Decode a precomputed `(n_states × n_obs)` emission-probability matrix.
    ///
    /// Parameters
    /// ----------
    /// - `emission_probs`: `ArrayView2<f64>`
    ///   Entry `(state, t)` is the density of observation `t` under `state`.
    ///   Zero densities are allowed.
    ///
    /// Returns
    /// -------
    /// `HMMResult<ViterbiOutcome>`
    ///   Labels, path log-probability, trellis, and warnings.
    ///
    /// Errors
    /// ------
    /// - `HMMError::EmissionShapeMismatch` if the row count differs from
    ///   `n_states`.
    /// - `HMMError::EmptySeries` if there are no columns.
    /// - `HMMError::InvalidEmissionProb` for negative, NaN, or infinite
    ///   densities.
    ///
    /// Notes
    /// -----
    /// - A degenerate trellis (final column all `−∞`) is not an error: the
    ///   outcome carries [`HMMWarning::DegenerateParameters`] and the labels
    ///   are still deterministic.
    pub fn decode(&self, emission_probs: ArrayView2<f64>) -> HMMResult<ViterbiOutcome> {
        let (n_rows, n_obs) = emission_probs.dim();
        if n_rows != self.n_states() {
            return Err(HMMError::EmissionShapeMismatch {
                expected: self.n_states(),
                actual: n_rows,
            });
        }
        if n_obs == 0 {
            return Err(HMMError::EmptySeries);
        }
        for ((state, index), &value) in emission_probs.indexed_iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(HMMError::InvalidEmissionProb { state, index, value });
            }
        }

        let _span = tracing::trace_span!("viterbi_decode", n_states = n_rows, n_obs).entered();
        let log_emission = emission_probs.mapv(f64::ln);
        let trellis = forward_pass(
            self.log_initial.view(),
            self.log_transition.view(),
            log_emission.view(),
        );

        let mut warnings = Vec::new();
        let last = trellis.log_prob.column(n_obs - 1);
        if last.iter().all(|&v| v == f64::NEG_INFINITY) {
            tracing::warn!(
                n_states = n_rows,
                n_obs,
                "every hidden-state path has zero probability; parameters are degenerate"
            );
            warnings.push(HMMWarning::DegenerateParameters);
        }

        let (best_state, log_prob) = argmax_first(last);
        let labels = backtrace(&trellis, best_state, &self.states);
        tracing::debug!(n_states = n_rows, n_obs, log_prob, "viterbi decode finished");

        Ok(ViterbiOutcome { labels, log_prob, trellis, warnings })
    }
}

//
// ---------- Private helpers ----------
//

/// Fill the Viterbi trellis.
///
/// `log_prob[(n, 0)] = log_initial[n] + log_emission[(n, 0)]`; for `t ≥ 1`,
/// `log_prob[(j, t)] = max_i (log_prob[(i, t−1)] + log_transition[(i, j)]) +
/// log_emission[(j, t)]`, with the lowest maximizing `i` stored as the
/// backpointer.
fn forward_pass(
    log_initial: ArrayView1<f64>, log_transition: ArrayView2<f64>, log_emission: ArrayView2<f64>,
) -> Trellis {
    let (n_states, n_obs) = log_emission.dim();
    let mut log_prob = Array2::from_elem((n_states, n_obs), f64::NEG_INFINITY);
    let mut backpointer = Array2::<usize>::zeros((n_states, n_obs));

    for n in 0..n_states {
        log_prob[(n, 0)] = log_initial[n] + log_emission[(n, 0)];
    }

    for t in 1..n_obs {
        for j in 0..n_states {
            let emit = log_emission[(j, t)];
            let (arg, best) = argmax_first(
                (0..n_states).map(|i| log_prob[(i, t - 1)] + log_transition[(i, j)] + emit),
            );
            log_prob[(j, t)] = best;
            backpointer[(j, t)] = arg;
        }
    }

    Trellis { log_prob, backpointer }
}

/// Follow backpointers from `last_state` at the final column and map each
/// state index through `states`.
fn backtrace(trellis: &Trellis, last_state: usize, states: &[usize]) -> Array1<usize> {
    let n_obs = trellis.backpointer.ncols();
    let mut path = vec![0usize; n_obs];
    path[n_obs - 1] = last_state;
    for t in (1..n_obs).rev() {
        path[t - 1] = trellis.backpointer[(path[t], t)];
    }
    path.into_iter().map(|s| states[s]).collect()
}

/// Index and value of the maximum; the first maximizer wins ties.
///
/// An all-`−∞` input yields `(0, −∞)`.
fn argmax_first<I>(values: I) -> (usize, f64)
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<f64>,
{
    use std::borrow::Borrow;

    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return (0, f64::NEG_INFINITY);
    };
    let mut best = (0, *first.borrow());
    for (i, v) in values.enumerate() {
        let v = *v.borrow();
        if v > best.1 {
            best = (i + 1, v);
        }
    }
    best
}
