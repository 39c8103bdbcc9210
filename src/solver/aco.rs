use crate::graph::MatrixGraph;
use crate::plugin::PluginChain;
use crate::rng::rng64;
use crate::solver::{Solution, SolverError, SolverParams, SolverState};

use decorum::R64;
use num_traits::identities::Zero;
use oorandom::Rand64;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Ant System solver over a complete weighted graph, instrumented with a
/// plugin chain.
///
/// Each iteration every colony slot constructs a tour using the slot's
/// current `alpha`/`beta`, the trail evaporates by `rho`, every tour
/// deposits `q / weight` on its edges, and the plugin chain fires with the
/// fresh state. Parameter mutations made by plugins are picked up by the
/// next iteration's construction.
pub struct Solver<IndexType: Clone> {
    params: SolverParams,
    plugins: PluginChain<IndexType>,
    rng: Rand64,
}

impl<IndexType> Solver<IndexType>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    pub fn new(params: SolverParams, plugins: PluginChain<IndexType>) -> Self {
        let rng = rng64(params.seed);
        Solver {
            params,
            plugins,
            rng,
        }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn solve(
        &mut self,
        graph: &RefCell<MatrixGraph<IndexType>>,
    ) -> Result<Solution<IndexType>, SolverError<IndexType>> {
        if graph.borrow().is_empty() {
            return Err(SolverError::EmptyGraph);
        }

        self.plugins.bind_all(&self.params)?;

        let mut population: Vec<Solution<IndexType>> = (0..self.params.colony_size)
            .map(|_| Solution::seed(self.params.alpha, self.params.beta))
            .collect();

        {
            let mut state = SolverState {
                graph,
                solutions: &mut population,
                best: None,
                params: &self.params,
                iteration: 0,
            };
            self.plugins.fire_start(&mut state)?;
        }

        let mut best: Option<Solution<IndexType>> = None;

        for iteration in 0..self.params.limit {
            for slot in population.iter_mut() {
                let (alpha, beta) = (slot.alpha, slot.beta);
                *slot = construct_tour(graph, alpha, beta, &mut self.rng)?;
            }

            evaporate(graph, self.params.rho)?;
            for solution in population.iter() {
                if solution.weight > R64::zero() {
                    solution.trace(graph, R64::from_inner(self.params.q) / solution.weight)?;
                }
            }

            let mut is_new_best = false;
            if let Some(round_best) = population.iter().min_by_key(|s| s.weight) {
                let improved = match best.as_ref() {
                    Some(current) => round_best.weight < current.weight,
                    None => true,
                };
                if improved {
                    best = Some(round_best.clone());
                    is_new_best = true;
                }
            }

            let mut state = SolverState {
                graph,
                solutions: &mut population,
                best: best.as_ref(),
                params: &self.params,
                iteration,
            };
            self.plugins.fire_iteration(&mut state, is_new_best)?;
        }

        self.plugins.fire_finish()?;

        best.ok_or(SolverError::NoSolution)
    }
}

/// Builds one closed tour starting and ending at the graph's first node,
/// choosing each step by roulette wheel over
/// `pheromone^alpha * (1/weight)^beta`.
fn construct_tour<IndexType>(
    graph: &RefCell<MatrixGraph<IndexType>>,
    alpha: f64,
    beta: f64,
    rng: &mut Rand64,
) -> Result<Solution<IndexType>, SolverError<IndexType>>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    let graph = graph.borrow();
    let nodes = graph.node_ids();
    let start = match nodes.first() {
        Some(node) => *node,
        None => return Err(SolverError::EmptyGraph),
    };

    let mut tour = Vec::with_capacity(nodes.len() + 1);
    tour.push(start);
    let mut visited: HashSet<IndexType> = HashSet::with_capacity(nodes.len());
    visited.insert(start);
    let mut current = start;
    let mut weight = R64::zero();

    while tour.len() < nodes.len() {
        let mut scored = Vec::with_capacity(nodes.len() - tour.len());
        for node in nodes.iter().copied() {
            if visited.contains(&node) {
                continue;
            }
            let edge = (current, node);
            let state = graph
                .edge_state(edge)
                .map_err(|_| SolverError::Disconnected(edge))?;
            let edge_weight = state.weight.into_inner();
            let desirability = if edge_weight > 0.0 {
                1.0 / edge_weight
            } else {
                1e6
            };
            let score = state.pheromone.into_inner().powf(alpha) * desirability.powf(beta);
            scored.push((node, score));
        }

        let next = roulette(&scored, rng);
        weight += graph.edge_weight((current, next))?;
        visited.insert(next);
        tour.push(next);
        current = next;
    }

    if nodes.len() > 1 {
        let closing = (current, start);
        weight += graph
            .edge_weight(closing)
            .map_err(|_| SolverError::Disconnected(closing))?;
        tour.push(start);
    }

    Ok(Solution::from_nodes(tour, weight, alpha, beta))
}

fn roulette<IndexType: Copy>(scored: &[(IndexType, f64)], rng: &mut Rand64) -> IndexType {
    let total: f64 = scored.iter().map(|(_, score)| score).sum();
    if total <= 0.0 || !total.is_finite() {
        let index = (rng.rand_float() * scored.len() as f64) as usize;
        return scored[index.min(scored.len() - 1)].0;
    }

    let mut target = rng.rand_float() * total;
    for (node, score) in scored.iter() {
        target -= score;
        if target <= 0.0 {
            return *node;
        }
    }
    scored[scored.len() - 1].0
}

/// Decays every edge's trail by the evaporation rate. Levels are clamped to
/// the smallest positive value so repeated decay can never underflow into
/// an invalid zero level.
fn evaporate<IndexType>(
    graph: &RefCell<MatrixGraph<IndexType>>,
    rho: f64,
) -> Result<(), SolverError<IndexType>>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    let mut graph = graph.borrow_mut();
    for edge in graph.edge_ids() {
        let level = graph.pheromone(edge)?.into_inner();
        let decayed = (level * (1.0 - rho)).max(f64::MIN_POSITIVE);
        graph.set_pheromone(edge, decayed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PluginError, SolverPlugin};
    use std::rc::Rc;

    fn test_graph() -> RefCell<MatrixGraph<usize>> {
        let nodes = vec![0, 1, 2, 3, 4];
        let mut edges = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                // asymmetric weights so there is something to optimize
                edges.push(((i, j), (1 + (i * 7 + j * 3) % 10) as f64));
            }
        }
        RefCell::new(MatrixGraph::new(nodes, edges).unwrap())
    }

    fn test_params(limit: usize) -> SolverParams {
        SolverParams::new(1.0, 3.0, 0.1, 1.0, limit, 4, Some(42))
    }

    #[test]
    fn solve_returns_a_closed_tour_over_all_nodes() {
        let graph = test_graph();
        let mut solver = Solver::new(test_params(20), PluginChain::new());

        let best = solver.solve(&graph).unwrap();
        let nodes = best.nodes();

        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes.first(), nodes.last());
        let mut inner = nodes[..5].to_vec();
        inner.sort_unstable();
        assert_eq!(inner, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn solve_is_deterministic_for_a_fixed_seed() {
        let first = Solver::new(test_params(15), PluginChain::new())
            .solve(&test_graph())
            .unwrap();
        let second = Solver::new(test_params(15), PluginChain::new())
            .solve(&test_graph())
            .unwrap();

        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.weight, second.weight);
    }

    #[test]
    fn solve_errors_on_empty_graph() {
        let graph = RefCell::new(MatrixGraph::new(vec![], vec![]).unwrap());
        let mut solver: Solver<usize> = Solver::new(test_params(5), PluginChain::new());

        assert!(matches!(
            solver.solve(&graph),
            Err(SolverError::EmptyGraph)
        ));
    }

    #[test]
    fn solve_errors_on_incomplete_graph() {
        let graph = RefCell::new(
            MatrixGraph::new(vec![0, 1, 2], vec![((0, 1), 1.0), ((1, 2), 1.0)]).unwrap(),
        );
        let mut solver = Solver::new(test_params(5), PluginChain::new());

        assert!(matches!(
            solver.solve(&graph),
            Err(SolverError::Disconnected(_))
        ));
    }

    /// Tracks the best weight across iterations and checks monotonicity,
    /// and verifies that parameter mutations reach the next construction.
    struct Watcher {
        weights: Rc<RefCell<Vec<f64>>>,
        alphas: Rc<RefCell<Vec<f64>>>,
    }

    impl SolverPlugin<usize> for Watcher {
        fn name(&self) -> &str {
            "watcher"
        }

        fn on_iteration(
            &mut self,
            state: &mut SolverState<'_, usize>,
            _is_new_best: bool,
        ) -> Result<(), PluginError> {
            if let Some(best) = state.best {
                self.weights.borrow_mut().push(best.weight.into_inner());
            }
            self.alphas.borrow_mut().push(state.solutions[0].alpha);
            // every constructed solution from the next round should carry this
            state.solutions[0].alpha = 9.5;
            Ok(())
        }
    }

    #[test]
    fn best_weight_never_worsens_and_mutated_parameters_are_used() {
        let weights = Rc::new(RefCell::new(Vec::new()));
        let alphas = Rc::new(RefCell::new(Vec::new()));
        let mut chain = PluginChain::new();
        chain.register(Watcher {
            weights: Rc::clone(&weights),
            alphas: Rc::clone(&alphas),
        });

        Solver::new(test_params(10), chain)
            .solve(&test_graph())
            .unwrap();

        let weights = weights.borrow();
        assert_eq!(weights.len(), 10);
        for pair in weights.windows(2) {
            assert!(pair[1] <= pair[0]);
        }

        let alphas = alphas.borrow();
        // iteration 0 uses the configured alpha, all later ones the mutated value
        assert!((alphas[0] - 1.0).abs() < f64::EPSILON);
        for alpha in alphas.iter().skip(1) {
            assert!((alpha - 9.5).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn full_plugin_chain_runs_end_to_end() {
        use crate::plugin::{CsvBackend, Darwin, EliteTracer, Periodic, StatRecorder, Timer};

        let mut chain = PluginChain::new();
        chain.register(Timer::new());
        chain.register(StatRecorder::new(CsvBackend::from_writer(Vec::new())));
        chain.register(EliteTracer::new(2.0));
        chain.register(Periodic::reset(5).unwrap());
        chain.register(Periodic::flip(4).unwrap());
        chain.register(Darwin::new(0.1, Some(3)));

        let best = Solver::new(test_params(12), chain)
            .solve(&test_graph())
            .unwrap();

        assert!(best.weight > R64::zero());
        assert_eq!(best.nodes().len(), 6);
    }

    #[test]
    fn plugin_errors_abort_the_run() {
        struct Failing;

        impl SolverPlugin<usize> for Failing {
            fn name(&self) -> &str {
                "failing"
            }

            fn on_start(
                &mut self,
                _state: &mut SolverState<'_, usize>,
            ) -> Result<(), PluginError> {
                Err(PluginError::EmptyPopulation)
            }
        }

        let mut chain = PluginChain::new();
        chain.register(Failing);
        let mut solver = Solver::new(test_params(5), chain);

        assert!(matches!(
            solver.solve(&test_graph()),
            Err(SolverError::Plugin(PluginError::EmptyPopulation))
        ));
    }
}
