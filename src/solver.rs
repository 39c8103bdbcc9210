mod aco;
mod solution;
mod state;

pub use aco::Solver;
pub use solution::Solution;
pub use state::{SolverParams, SolverState};

use crate::graph::{Edge, GraphError};
use crate::plugin::PluginError;

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SolverError<IndexType> {
    EmptyGraph,
    NoSolution,
    Disconnected(Edge<IndexType>),
    Graph(GraphError<IndexType>),
    Plugin(PluginError),
}

impl<IndexType: fmt::Display> fmt::Display for SolverError<IndexType> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "The graph has no nodes to tour."),
            Self::NoSolution => write!(f, "The run produced no solution."),
            Self::Disconnected((from, to)) => write!(
                f,
                "No edge between {} and {}, the graph must be complete.",
                from, to
            ),
            Self::Graph(error) => write!(f, "{}", error),
            Self::Plugin(error) => write!(f, "{}", error),
        }
    }
}

impl<IndexType: fmt::Display + fmt::Debug> Error for SolverError<IndexType> {}

impl<IndexType> From<GraphError<IndexType>> for SolverError<IndexType> {
    fn from(error: GraphError<IndexType>) -> Self {
        SolverError::Graph(error)
    }
}

impl<IndexType> From<PluginError> for SolverError<IndexType> {
    fn from(error: PluginError) -> Self {
        SolverError::Plugin(error)
    }
}
