//! Python-input extraction helpers for the PyO3 bindings.
//!
//! Everything here converts loosely typed Python objects (NumPy arrays,
//! pandas objects, nested lists, callables) into the Rust types consumed by
//! [`crate::annotation`], mapping failures to Python exceptions.
#[cfg(feature = "python-bindings")]
use ndarray::{Array2, Ix2};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{IntoPyDict, PyAny, PyDict, PyTuple},
};

#[cfg(feature = "python-bindings")]
use crate::annotation::validation::validate_transition_shape;

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArrayDyn,
    PyUntypedArrayMethods, // .shape()
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D float64 input into an owned buffer.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_values<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Convert any array-like into a square float64 matrix.
///
/// Non-2-D or non-square inputs raise `ValueError` carrying the
/// `HMMError::Shape` message.
#[cfg(feature = "python-bindings")]
pub fn extract_transition_matrix<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>,
) -> PyResult<Array2<f64>> {
    let kwargs = [("dtype", "float64")].into_py_dict(py)?;
    let obj = py.import("numpy")?.call_method("asarray", (raw,), Some(&kwargs))?;
    let arr: PyReadonlyArrayDyn<f64> = obj.extract().map_err(|_| {
        PyTypeError::new_err("transition_prob_mat must be convertible to a float64 numpy array")
    })?;
    validate_transition_shape(arr.shape())?;
    arr.as_array()
        .to_owned()
        .into_dimensionality::<Ix2>()
        .map_err(|e| PyValueError::new_err(format!("transition_prob_mat: {e}")))
}

/// One emission function supplied from Python: a callable and optional
/// keyword arguments bound to it.
#[cfg(feature = "python-bindings")]
pub struct PyEmission {
    func: Py<PyAny>,
    kwargs: Option<Py<PyDict>>,
}

#[cfg(feature = "python-bindings")]
impl PyEmission {
    /// Evaluate `func(x, **kwargs)` and read the result as `f64`.
    pub fn density(&self, py: Python<'_>, x: f64) -> PyResult<f64> {
        let kwargs = self.kwargs.as_ref().map(|k| k.bind(py));
        self.func.bind(py).call((x,), kwargs)?.extract()
    }
}

/// Normalize a Python list of emission specifications.
///
/// Each item is either a callable `f(x) -> float` or a pair
/// `(f, kwargs_dict)` evaluated as `f(x, **kwargs_dict)`.
#[cfg(feature = "python-bindings")]
pub fn extract_emission_funcs(raw: &Bound<'_, PyAny>) -> PyResult<Vec<PyEmission>> {
    let mut out = Vec::new();
    for (state, item) in raw.try_iter()?.enumerate() {
        let item = item?;
        let (func, kwargs) = match item.downcast::<PyTuple>() {
            Ok(pair) => {
                if pair.len() != 2 {
                    return Err(PyTypeError::new_err(format!(
                        "emission_funcs[{state}] must be a callable or a (callable, kwargs) pair"
                    )));
                }
                let kwargs = pair.get_item(1)?.downcast::<PyDict>()?.clone().unbind();
                (pair.get_item(0)?, Some(kwargs))
            }
            Err(_) => (item, None),
        };
        if !func.is_callable() {
            return Err(PyTypeError::new_err(format!("emission_funcs[{state}] is not callable")));
        }
        out.push(PyEmission { func: func.unbind(), kwargs });
    }
    Ok(out)
}

/// Evaluate every Python emission function on every observation.
///
/// Returns the `(n_states × n_obs)` emission-probability matrix; the first
/// Python exception raised by an emission function is propagated.
#[cfg(feature = "python-bindings")]
pub fn emission_probs_from_python(
    py: Python<'_>, emissions: &[PyEmission], observations: &[f64],
) -> PyResult<Array2<f64>> {
    let mut probs = Array2::zeros((emissions.len(), observations.len()));
    for (state, emission) in emissions.iter().enumerate() {
        for (t, &x) in observations.iter().enumerate() {
            probs[(state, t)] = emission.density(py, x)?;
        }
    }
    Ok(probs)
}
