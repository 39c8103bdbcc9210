use crate::plugin::{PluginError, SolverPlugin};
use crate::rng::{gauss, os_random_seed, rng64};
use crate::solver::{SolverParams, SolverState};

use oorandom::Rand64;

pub const DEFAULT_SIGMA: f64 = 0.1;

/// Applies evolutionary pressure to the population's heuristic weighting.
///
/// At the start of a run the plugin records the population's mean `alpha`
/// and `beta`. Every iteration it targets the midpoint between those means
/// and the best solution's own parameters, then resamples every ant's
/// `alpha` and `beta` from a normal distribution around that target. The
/// spread `sigma` keeps the exploration going; resampled values are not
/// clamped.
pub struct Darwin {
    sigma: f64,
    alpha: f64,
    beta: f64,
    rng: Rand64,
}

impl Darwin {
    /// Creates a new controller with the given spread. The perturbation is
    /// driven by its own generator, so a fixed seed makes a run
    /// reproducible.
    pub fn new(sigma: f64, seed: Option<u128>) -> Self {
        Darwin {
            sigma,
            alpha: 0.0,
            beta: 0.0,
            rng: rng64(seed.unwrap_or_else(os_random_seed)),
        }
    }
}

impl Default for Darwin {
    fn default() -> Self {
        Darwin::new(DEFAULT_SIGMA, None)
    }
}

impl<IndexType: Clone> SolverPlugin<IndexType> for Darwin {
    fn name(&self) -> &str {
        "darwin"
    }

    fn on_start(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        if state.solutions.is_empty() {
            return Err(PluginError::EmptyPopulation);
        }

        let size = state.solutions.len() as f64;
        self.alpha = state.solutions.iter().map(|ant| ant.alpha).sum::<f64>() / size;
        self.beta = state.solutions.iter().map(|ant| ant.beta).sum::<f64>() / size;
        Ok(())
    }

    fn on_iteration(
        &mut self,
        state: &mut SolverState<'_, IndexType>,
        _is_new_best: bool,
    ) -> Result<(), PluginError> {
        let (best_alpha, best_beta) = match state.best {
            Some(best) => (best.alpha, best.beta),
            None => return Err(PluginError::NoBestSolution),
        };

        let alpha = (self.alpha + best_alpha) / 2.0;
        let beta = (self.beta + best_beta) / 2.0;
        for ant in state.solutions.iter_mut() {
            ant.alpha = gauss(&mut self.rng, alpha, self.sigma);
            ant.beta = gauss(&mut self.rng, beta, self.sigma);
        }
        Ok(())
    }
}
