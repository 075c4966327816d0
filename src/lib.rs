//! rust_annotators — hidden Markov model time-series annotation with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the HMM annotator to Python via the `_rust_annotators` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing `HMM` class and the `annotation` submodule used by the
//! `rust_annotators` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust module (`annotation`) as the public crate
//!   surface.
//! - Define the `#[pyclass]` wrapper and the `#[pymodule]` initializer for the
//!   `_rust_annotators` Python extension.
//! - Create and register the `annotation` submodule under `rust_annotators`
//!   so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work (validation, log-domain Viterbi) is implemented in
//!   [`annotation`]; this file performs only FFI glue and error mapping.
//! - Python emission functions are arbitrary callables, so the Python-facing
//!   `HMM` evaluates them itself into an emission matrix and hands that to
//!   [`ViterbiDecoder::decode`].
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_annotators.<submodule>`.
//! - Errors from core Rust code are propagated as [`HMMError`] internally and
//!   converted to `ValueError` at the PyO3 boundary; degenerate decodes are
//!   surfaced as Python `RuntimeWarning`s.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`annotation`] directly and can ignore
//!   the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_annotators` and re-exports
//!   `HMM` from `rust_annotators.annotation`.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in `annotation` and by the
//!   integration and property tests under `tests/`.
//! - The PyO3 layer is exercised from Python by `python/tests/`.

pub mod annotation;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::ffi::CString;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyRuntimeWarning, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    annotation::{
        HMMError, HMMOptions, ViterbiDecoder, ViterbiOutcome, validation::validate_params,
    },
    utils::{
        PyEmission, emission_probs_from_python, extract_emission_funcs, extract_f64_values,
        extract_transition_matrix,
    },
};

/// HMM — Python-facing wrapper for the Viterbi HMM annotator.
///
/// Purpose
/// -------
/// Segment a univariate series into hidden states from Python, with emission
/// densities supplied as Python callables.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `HMM(emission_funcs, transition_prob_mat, initial_probs=None)`:
/// - `emission_funcs`: list of callables `f(x) -> float`, or of
///   `(f, kwargs)` pairs evaluated as `f(x, **kwargs)`.
/// - `transition_prob_mat`: square array-like with rows summing to 1.
/// - `initial_probs`: optional 1-D array-like summing to 1; uniform when
///   omitted.
///
/// Fields
/// ------
/// - `emission_funcs`: one [`PyEmission`] per hidden state.
/// - `decoder`: validated [`ViterbiDecoder`].
/// - `last_outcome`: outcome of the most recent `predict`, backing the
///   `num_obs` / `trans_prob` / `trans_id` getters.
///
/// Invariants
/// ----------
/// - Parameters passed [`validate_params`] at construction; `predict` never
///   raises a parameter error.
///
/// Notes
/// -----
/// - Rust callers should use [`annotation::HMM`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_annotators.annotation", name = "HMM")]
pub struct PyHMM {
    emission_funcs: Vec<PyEmission>,
    decoder: ViterbiDecoder,
    last_outcome: Option<ViterbiOutcome>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyHMM {
    #[new]
    #[pyo3(
        signature = (emission_funcs, transition_prob_mat, initial_probs = None),
        text_signature = "(emission_funcs, transition_prob_mat, /, initial_probs=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, emission_funcs: &Bound<'py, PyAny>,
        transition_prob_mat: &Bound<'py, PyAny>, initial_probs: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Self> {
        let emission_funcs = extract_emission_funcs(emission_funcs)?;
        let transition = extract_transition_matrix(py, transition_prob_mat)?;
        let initial = initial_probs
            .map(|raw| extract_f64_values(py, raw, "initial_probs").map(Array1::from))
            .transpose()?;

        validate_params(
            emission_funcs.len(),
            transition.view(),
            initial.as_ref().map(|p| p.view()),
            &HMMOptions::default(),
        )?;
        let decoder = ViterbiDecoder::from_validated(transition, initial);

        Ok(PyHMM { emission_funcs, decoder, last_outcome: None })
    }

    /// No-op: all parameters are supplied at construction. Returns `self`.
    #[pyo3(signature = (X, Y = None), text_signature = "(self, X, /, Y=None)")]
    #[allow(non_snake_case)]
    pub fn fit<'py>(
        slf: PyRef<'py, Self>, X: &Bound<'py, PyAny>, Y: Option<&Bound<'py, PyAny>>,
    ) -> PyRef<'py, Self> {
        let _ = (X, Y);
        slf
    }

    /// Most likely hidden-state label for every observation in `X`.
    ///
    /// Emission callables run while `self` is only shared-borrowed, so they
    /// may read the getters; the outcome is stored afterwards.
    #[pyo3(signature = (X), text_signature = "(self, X, /)")]
    #[allow(non_snake_case)]
    pub fn predict<'py>(
        slf: &Bound<'py, Self>, X: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<usize>>> {
        let py = slf.py();
        let observations = extract_f64_values(py, X, "X")?;
        if observations.is_empty() {
            return Err(HMMError::EmptySeries.into());
        }

        let outcome = {
            let this = slf.borrow();
            let emission_probs =
                emission_probs_from_python(py, &this.emission_funcs, &observations)?;
            this.decoder.decode(emission_probs.view())?
        };
        for warning in outcome.warnings() {
            let message = CString::new(warning.to_string())?;
            PyErr::warn(py, &py.get_type::<PyRuntimeWarning>(), &message, 1)?;
        }

        let labels = outcome.labels().to_vec();
        slf.borrow_mut().last_outcome = Some(outcome);
        Ok(labels.into_pyarray(py))
    }

    #[getter]
    pub fn num_states(&self) -> usize {
        self.decoder.n_states()
    }

    #[getter]
    pub fn states(&self) -> Vec<usize> {
        self.decoder.states().to_vec()
    }

    #[getter]
    pub fn transition_prob_mat(&self) -> Vec<Vec<f64>> {
        self.decoder.transition().rows().into_iter().map(|row| row.to_vec()).collect()
    }

    #[getter]
    pub fn initial_probs(&self) -> Vec<f64> {
        self.decoder.initial().to_vec()
    }

    /// Length of the series decoded by the last `predict`, `None` before the first.
    #[getter]
    pub fn num_obs(&self) -> Option<usize> {
        self.last_outcome.as_ref().map(|outcome| outcome.labels().len())
    }

    /// Log-probability trellis of the last `predict`, `None` before the first.
    #[getter]
    pub fn trans_prob(&self) -> Option<Vec<Vec<f64>>> {
        self.last_outcome.as_ref().map(|outcome| {
            outcome.trellis().log_prob.rows().into_iter().map(|row| row.to_vec()).collect()
        })
    }

    /// Backpointer table of the last `predict`, `None` before the first.
    #[getter]
    pub fn trans_id(&self) -> Option<Vec<Vec<usize>>> {
        self.last_outcome.as_ref().map(|outcome| {
            outcome.trellis().backpointer.rows().into_iter().map(|row| row.to_vec()).collect()
        })
    }
}

/// _rust_annotators — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `annotation` submodule and attach it to `_rust_annotators`.
/// - Register it in `sys.modules` so `rust_annotators.annotation` imports
///   resolve.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_annotators<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let annotation_mod = PyModule::new(_py, "annotation")?;
    annotation_module(_py, m, &annotation_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_annotators.annotation", annotation_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn annotation_module<'py>(
    _py: Python, rust_annotators: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyHMM>()?;
    rust_annotators.add_submodule(m)?;
    Ok(())
}
