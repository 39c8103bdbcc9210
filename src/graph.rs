mod error;
pub mod generate;
mod matrix_graph;

pub use error::GraphError;
pub use matrix_graph::{Edge, EdgeState, MatrixGraph, INITIAL_PHEROMONE};
