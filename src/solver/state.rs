use crate::graph::MatrixGraph;
use crate::rng::os_random_seed;
use crate::solver::Solution;

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Solver-level configuration. Plugins read it through [`SolverState`] at
/// call time, so mid-run changes take effect immediately.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct SolverParams {
    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    pub q: f64,
    pub limit: usize,
    pub colony_size: usize,
    pub seed: u128,
}

impl SolverParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        alpha: f64,
        beta: f64,
        rho: f64,
        q: f64,
        limit: usize,
        colony_size: usize,
        seed: Option<u128>,
    ) -> Self {
        SolverParams {
            alpha,
            beta,
            rho,
            q,
            limit,
            colony_size,
            seed: seed.unwrap_or_else(os_random_seed),
        }
    }
}

/// View of one point in the solving loop, handed to every plugin hook.
///
/// Plugins may write edge pheromone through `graph` and the population's
/// `alpha`/`beta` fields in place. The population itself and `best` stay
/// owned by the solver: the slice cannot be resized and the best solution
/// cannot be reassigned from here.
pub struct SolverState<'a, IndexType: Clone> {
    pub graph: &'a RefCell<MatrixGraph<IndexType>>,
    pub solutions: &'a mut [Solution<IndexType>],
    pub best: Option<&'a Solution<IndexType>>,
    pub params: &'a SolverParams,
    pub iteration: usize,
}
