use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::core::{Particle, RuleSet, Species, Universe, Vec2};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn rules_for(model: &str) -> PyResult<RuleSet> {
    match model {
        "classic" => Ok(RuleSet::classic()),
        "carrier" => Ok(RuleSet::carrier()),
        other => Err(py_err(format!(
            "unknown model '{other}', expected 'classic' or 'carrier'"
        ))),
    }
}

fn parse_species(names: &[String]) -> PyResult<Vec<Species>> {
    names
        .iter()
        .map(|s| s.parse::<Species>().map_err(py_err))
        .collect()
}

/// Python-facing wrapper around the Rust `Universe`.
///
/// API:
/// - __new__(width, height, model="classic")
/// - add_particle(species, x, y, vx, vy, payload=None)
/// - populate(n, species, seed=None)
/// - step(step=1) -> number of reactions
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2), dtype=int64
/// - get_species() -> list[str]
/// - get_payloads() -> list[tuple[int, int] | None]
#[pyclass(name = "Universe")]
pub struct PyUniverse {
    universe: Universe,
}

#[pymethods]
impl PyUniverse {
    /// Create an empty universe on a `width` x `height` torus.
    ///
    /// Errors: raises ValueError on non-positive dimensions or an unknown model.
    #[new]
    #[pyo3(signature = (width, height, model="classic"))]
    fn new(width: i64, height: i64, model: &str) -> PyResult<Self> {
        let universe = Universe::with_rules(width, height, rules_for(model)?).map_err(py_err)?;
        Ok(Self { universe })
    }

    /// Append one particle. `payload` is required for carriers ("C") and rejected otherwise.
    #[pyo3(signature = (species, x, y, vx, vy, payload=None))]
    fn add_particle(
        &mut self,
        species: &str,
        x: i64,
        y: i64,
        vx: i64,
        vy: i64,
        payload: Option<(i64, i64)>,
    ) -> PyResult<()> {
        let species = species.parse::<Species>().map_err(py_err)?;
        let p = Particle::new(
            species,
            Vec2::new(x, y),
            Vec2::new(vx, vy),
            payload.map(Vec2::from),
        )
        .map_err(py_err)?;
        self.universe.add(p).map_err(py_err)
    }

    /// Append `n` random particles with species drawn from `species`.
    #[pyo3(signature = (n, species, seed=None))]
    fn populate(&mut self, n: usize, species: Vec<String>, seed: Option<u64>) -> PyResult<()> {
        let pool = parse_species(&species)?;
        self.universe.populate(n, &pool, seed).map_err(py_err)
    }

    /// Step the universe (releases the GIL during computation). Returns the number of reactions.
    #[pyo3(signature = (step=1))]
    fn step(&mut self, py: Python<'_>, step: i64) -> usize {
        let universe = &mut self.universe;
        py.detach(|| universe.step(step)).reactions.len()
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=int64.
    fn get_positions(&self, py: Python<'_>) -> Py<PyArray2<i64>> {
        self.columns(py, |p| p.position)
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=int64.
    fn get_velocities(&self, py: Python<'_>) -> Py<PyArray2<i64>> {
        self.columns(py, |p| p.velocity)
    }

    /// Species letter of every particle, in sequence order.
    fn get_species(&self) -> Vec<String> {
        self.universe
            .particles()
            .iter()
            .map(|p| p.species.to_string())
            .collect()
    }

    /// Payload of every particle as an (x, y) tuple, or None for particles without one.
    fn get_payloads(&self) -> Vec<Option<(i64, i64)>> {
        self.universe
            .particles()
            .iter()
            .map(|p| p.payload.map(|v| (v.x, v.y)))
            .collect()
    }

    /// Signed sum of all steps taken.
    fn time(&self) -> i128 {
        self.universe.time()
    }

    fn __len__(&self) -> usize {
        self.universe.len()
    }

    fn __str__(&self) -> String {
        self.universe.to_string()
    }
}

impl PyUniverse {
    fn columns(&self, py: Python<'_>, field: impl Fn(&Particle) -> Vec2) -> Py<PyArray2<i64>> {
        let ps = self.universe.particles();
        let mut arr = Array2::<i64>::zeros((ps.len(), 2));
        for (i, p) in ps.iter().enumerate() {
            let v = field(p);
            arr[[i, 0]] = v.x;
            arr[[i, 1]] = v.y;
        }
        arr.into_pyarray(py).unbind()
    }
}

/// The arrow_of_time Python module entry point.
#[pymodule]
fn arrow_of_time(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyUniverse>()?;
    Ok(())
}
