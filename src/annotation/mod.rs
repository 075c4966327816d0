//! annotation — time-series annotation estimators.
//!
//! Purpose
//! -------
//! Collect annotation estimators that assign a discrete label to every
//! observation of a time series, together with their shared validation,
//! configuration, and error handling. This subtree currently implements a
//! univariate hidden Markov model (HMM) segmenter decoded with the Viterbi
//! algorithm.
//!
//! Key behaviors
//! -------------
//! - Expose the [`HMM`] estimator: validate parameters at construction,
//!   no-op `fit`, and `predict`/`decode` via log-domain Viterbi decoding.
//! - Expose [`ViterbiDecoder`] on its own for callers that already hold an
//!   emission-probability matrix (e.g. the Python bindings, whose emission
//!   functions are Python callables).
//! - Provide [`Emission`] / [`EmissionModel`] for per-state densities, with
//!   `statrs`-backed parametric families and custom closures.
//! - Provide [`HMMError`], [`HMMResult`], and [`HMMWarning`], plus a
//!   conversion to Python exceptions when `python-bindings` is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Emission and transition parameters are known; nothing is learned from
//!   data.
//! - All parameter errors are raised at construction time; decode-time
//!   numerical degeneracy is a warning, never an error.
//!
//! Conventions
//! -----------
//! - Matrices are `ndarray` arrays laid out `(n_states × n_obs)` or
//!   `(n_states × n_states)`; indices are 0-based.
//! - Logging goes through `tracing`; the crate installs no subscriber.
//!
//! Downstream usage
//! ----------------
//! - Typical Rust code imports the main surface as:
//!
//!   ```rust
//!   use rust_annotators::annotation::prelude::*;
//!   ```
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; `tests/` holds end-to-end and
//!   property-based tests of the public surface.

pub mod emission;
pub mod errors;
pub mod hmm;
pub mod options;
pub mod validation;
pub mod viterbi;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::emission::{Density, Emission, EmissionModel};
pub use self::errors::{HMMError, HMMResult, HMMWarning};
pub use self::hmm::HMM;
pub use self::options::HMMOptions;
pub use self::validation::validate_params;
pub use self::viterbi::{Trellis, ViterbiDecoder, ViterbiOutcome};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_annotators::annotation::prelude::*;
//
// to import the main annotation surface in a single line.

pub mod prelude {
    pub use super::emission::{Emission, EmissionModel};
    pub use super::errors::{HMMError, HMMResult, HMMWarning};
    pub use super::hmm::HMM;
    pub use super::options::HMMOptions;
    pub use super::viterbi::{ViterbiDecoder, ViterbiOutcome};
}
