mod chain;
mod darwin;
mod elite;
mod periodic;
mod printout;
mod stats;
mod timer;

pub use chain::PluginChain;
pub use darwin::{Darwin, DEFAULT_SIGMA};
pub use elite::{EliteTracer, DEFAULT_FACTOR};
pub use periodic::{
    Periodic, PeriodicAction, PheromoneFlip, PheromoneReset, DEFAULT_PERIOD, PHEROMONE_BASELINE,
};
pub use printout::Printout;
pub use stats::{
    ChartBackend, CsvBackend, SeriesMap, StatRecorder, StatValue, Table, EDGE_PHEROMONE,
    PHEROMONE_LEVELS, SOLUTIONS, TOTAL_PHEROMONE, UNIQUE_SOLUTIONS,
};
pub use timer::Timer;

use crate::solver::{SolverParams, SolverState};

use std::error::Error;
use std::fmt;

/// Lifecycle hooks a plugin may implement. Every hook has a no-op default,
/// so a plugin only defines the lifecycle points it cares about and is
/// skipped everywhere else.
///
/// A plugin is bound to exactly one solver per run: `initialize` fires once,
/// before any other hook, and is where per-run state (counters,
/// accumulators) gets allocated. All hooks run synchronously on the
/// solver's thread, in registration order.
pub trait SolverPlugin<IndexType: Clone> {
    /// Short name used in reports and error messages.
    fn name(&self) -> &str;

    /// Called once per run, before `on_start`, in registration order.
    fn initialize(&mut self, _params: &SolverParams) {}

    /// Called once, after the colony has been set up but before the first
    /// iteration.
    fn on_start(&mut self, _state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called after every iteration of the solving loop.
    fn on_iteration(
        &mut self,
        _state: &mut SolverState<'_, IndexType>,
        _is_new_best: bool,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once after the loop has ended.
    fn on_finish(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum PluginError {
    EmptyPopulation,
    EmptyGraph,
    NoBestSolution,
    InvalidPeriod(usize),
    AlreadyBound,
    UnknownMetric(String),
    Graph(String),
    Backend(String),
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "The population is empty."),
            Self::EmptyGraph => write!(f, "The graph has no edges."),
            Self::NoBestSolution => write!(f, "No best solution has been recorded yet."),
            Self::InvalidPeriod(period) => {
                write!(f, "Period must be a positive integer, got {}.", period)
            }
            Self::AlreadyBound => write!(f, "The plugins are already bound to a solver."),
            Self::UnknownMetric(name) => write!(f, "No series recorded for metric '{}'.", name),
            Self::Graph(msg) => write!(f, "{}", msg),
            Self::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for PluginError {}
