use std::error::Error;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum GraphError<IndexType> {
    MissingNode(IndexType),
    DuplicateNode(IndexType),
    MissingEdge((IndexType, IndexType)),
    DuplicateEdge((IndexType, IndexType)),
    NonPositivePheromone(f64),
}

impl<IndexType: fmt::Display> fmt::Display for GraphError<IndexType> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode(id) => write!(f, "Node {} is not in the graph.", id),
            Self::DuplicateNode(id) => write!(f, "Node {} is already in the graph.", id),
            Self::MissingEdge((from, to)) => {
                write!(f, "Edge ({}, {}) is not in the graph.", from, to)
            }
            Self::DuplicateEdge((from, to)) => {
                write!(f, "Edge ({}, {}) is already in the graph.", from, to)
            }
            Self::NonPositivePheromone(level) => {
                write!(f, "Pheromone level must be positive, got {}.", level)
            }
        }
    }
}

impl<IndexType: fmt::Display + fmt::Debug> Error for GraphError<IndexType> {}
