//! Emission densities for univariate HMMs.
//!
//! This module defines [`Emission`], the per-state specification of an
//! observation density, and [`EmissionModel`], the ordered list of densities
//! used by an HMM. Every specification is normalized at construction into a
//! single-argument [`Density`] closure, so evaluating emissions never
//! branches on how a state was specified.
//!
//! ## Supported specifications
//! - [`Emission::Normal`], [`Emission::Laplace`], [`Emission::StudentsT`],
//!   [`Emission::Uniform`]: parametric families backed by `statrs`.
//! - [`Emission::Custom`]: any pure `Fn(f64) -> f64` density.
//! - [`Emission::with_params`]: a two-argument density with bound auxiliary
//!   parameters (e.g. location/scale), evaluated as `f(x, &params)`.
//!
//! ## Numerics
//! - Densities may be exactly zero; the decoder maps them to `−∞` in log
//!   space.
//! - Parameter checks are delegated to the `statrs` constructors; failures
//!   surface as [`HMMError::InvalidEmission`].
use crate::annotation::errors::{HMMError, HMMResult};
use ndarray::Array2;
use statrs::distribution::{Continuous, Laplace, Normal, StudentsT, Uniform};
use std::{fmt, sync::Arc};

/// A normalized single-argument density.
pub type Density = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Per-state emission specification.
#[derive(Clone)]
pub enum Emission {
    /// Gaussian with mean `mean` and standard deviation `std_dev > 0`.
    Normal { mean: f64, std_dev: f64 },
    /// Laplace with location `location` and scale `scale > 0`.
    Laplace { location: f64, scale: f64 },
    /// Location-scale Student's t with `freedom > 0` degrees of freedom.
    StudentsT { location: f64, scale: f64, freedom: f64 },
    /// Continuous uniform on `[min, max]`.
    Uniform { min: f64, max: f64 },
    /// User-supplied density.
    Custom(Density),
}

impl Emission {
    /// Gaussian emission.
    pub const fn normal(mean: f64, std_dev: f64) -> Self {
        Emission::Normal { mean, std_dev }
    }

    /// Wrap a bare unary density.
    pub fn custom<F>(density: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Emission::Custom(Arc::new(density))
    }

    /// Bind auxiliary parameters to a two-argument density.
    ///
    /// The resulting emission evaluates `density(x, &params)`.
    ///
    /// # Examples
    /// ```rust
    /// use rust_annotators::annotation::Emission;
    ///
    /// struct Shifted { shift: f64 }
    /// fn bump(x: f64, p: &Shifted) -> f64 { (-(x - p.shift).powi(2)).exp() }
    ///
    /// let emission = Emission::with_params(bump, Shifted { shift: 2.0 });
    /// # let _ = emission;
    /// ```
    pub fn with_params<P, F>(density: F, params: P) -> Self
    where
        P: Send + Sync + 'static,
        F: Fn(f64, &P) -> f64 + Send + Sync + 'static,
    {
        Emission::Custom(Arc::new(move |x| density(x, &params)))
    }

    /// Normalize this specification into a [`Density`] for hidden state `state`.
    ///
    /// # Errors
    /// Returns [`HMMError::InvalidEmission`] if the `statrs` constructor
    /// rejects the parameters.
    pub fn into_density(self, state: usize) -> HMMResult<Density> {
        let density: Density = match self {
            Emission::Normal { mean, std_dev } => {
                let dist =
                    Normal::new(mean, std_dev).map_err(|e| HMMError::from_statrs(state, e))?;
                Arc::new(move |x| dist.pdf(x))
            }
            Emission::Laplace { location, scale } => {
                let dist =
                    Laplace::new(location, scale).map_err(|e| HMMError::from_statrs(state, e))?;
                Arc::new(move |x| dist.pdf(x))
            }
            Emission::StudentsT { location, scale, freedom } => {
                let dist = StudentsT::new(location, scale, freedom)
                    .map_err(|e| HMMError::from_statrs(state, e))?;
                Arc::new(move |x| dist.pdf(x))
            }
            Emission::Uniform { min, max } => {
                let dist = Uniform::new(min, max).map_err(|e| HMMError::from_statrs(state, e))?;
                Arc::new(move |x| dist.pdf(x))
            }
            Emission::Custom(density) => density,
        };
        Ok(density)
    }
}

impl fmt::Debug for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emission::Normal { mean, std_dev } => {
                f.debug_struct("Normal").field("mean", mean).field("std_dev", std_dev).finish()
            }
            Emission::Laplace { location, scale } => f
                .debug_struct("Laplace")
                .field("location", location)
                .field("scale", scale)
                .finish(),
            Emission::StudentsT { location, scale, freedom } => f
                .debug_struct("StudentsT")
                .field("location", location)
                .field("scale", scale)
                .field("freedom", freedom)
                .finish(),
            Emission::Uniform { min, max } => {
                f.debug_struct("Uniform").field("min", min).field("max", max).finish()
            }
            Emission::Custom(_) => f.write_str("Custom(<density>)"),
        }
    }
}

/// EmissionModel — ordered per-state densities of an HMM.
///
/// Invariants
/// ----------
/// - One density per hidden state; `len()` is the number of states.
/// - Immutable after construction.
#[derive(Clone)]
pub struct EmissionModel {
    densities: Vec<Density>,
}

impl EmissionModel {
    /// Normalize every specification into a density.
    ///
    /// # Errors
    /// Propagates the first [`HMMError::InvalidEmission`] encountered.
    pub fn new(emissions: Vec<Emission>) -> HMMResult<Self> {
        let densities = emissions
            .into_iter()
            .enumerate()
            .map(|(state, emission)| emission.into_density(state))
            .collect::<HMMResult<Vec<_>>>()?;
        Ok(EmissionModel { densities })
    }

    /// Number of hidden states.
    pub fn len(&self) -> usize {
        self.densities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.densities.is_empty()
    }

    /// Density of `x` under hidden state `state`.
    ///
    /// # Panics
    /// Panics if `state >= self.len()`.
    pub fn density(&self, state: usize, x: f64) -> f64 {
        (self.densities[state])(x)
    }

    /// Build the `(n_states × n_obs)` emission-probability matrix.
    ///
    /// Entry `(state, t)` is the density of `observations[t]` under `state`.
    /// Pure function of the model and the observations.
    pub fn emission_probs(&self, observations: &[f64]) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), observations.len()), |(state, t)| {
            (self.densities[state])(observations[t])
        })
    }
}

impl fmt::Debug for EmissionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmissionModel").field("n_states", &self.len()).finish()
    }
}
