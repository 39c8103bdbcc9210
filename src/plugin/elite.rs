use crate::plugin::{PluginError, SolverPlugin};
use crate::solver::SolverState;

use decorum::R64;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub const DEFAULT_FACTOR: f64 = 1.0;

/// Reinforces the best-known tour by depositing `q * factor` pheromone on
/// every one of its edges each iteration, on top of whatever the solver's
/// own update did. The deposit rate `q` is read from the solver state at
/// call time, so mid-run configuration changes take effect immediately.
pub struct EliteTracer {
    factor: f64,
}

impl EliteTracer {
    pub fn new(factor: f64) -> Self {
        EliteTracer { factor }
    }
}

impl Default for EliteTracer {
    fn default() -> Self {
        EliteTracer::new(DEFAULT_FACTOR)
    }
}

impl<IndexType> SolverPlugin<IndexType> for EliteTracer
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    fn name(&self) -> &str {
        "elite-tracer"
    }

    fn on_iteration(
        &mut self,
        state: &mut SolverState<'_, IndexType>,
        _is_new_best: bool,
    ) -> Result<(), PluginError> {
        let best = match state.best {
            Some(best) => best,
            None => return Err(PluginError::NoBestSolution),
        };

        let amount = R64::from_inner(state.params.q * self.factor);
        best.trace(state.graph, amount)
            .map_err(|e| PluginError::Graph(e.to_string()))
    }
}
