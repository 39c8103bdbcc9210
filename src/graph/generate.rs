use crate::graph::{GraphError, MatrixGraph};

use oorandom::Rand64;

/// Generates a complete graph with the given number of nodes and edge
/// weights drawn uniformly from the given range.
pub struct Complete<'a> {
    size: usize,
    weight_range: (f64, f64),
    rng: &'a mut Rand64,
}

impl<'a> Complete<'a> {
    pub fn new(size: usize, weight_range: (f64, f64), rng: &'a mut Rand64) -> Complete<'a> {
        Complete {
            size,
            weight_range,
            rng,
        }
    }

    pub fn generate(&mut self) -> Result<MatrixGraph<usize>, GraphError<usize>> {
        let delta = self.weight_range.1 - self.weight_range.0;
        let mut edges = Vec::with_capacity(self.size * (self.size.max(1) - 1) / 2);
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let weight = self.rng.rand_float() * delta + self.weight_range.0;
                edges.push(((i, j), weight));
            }
        }

        MatrixGraph::new((0..self.size).collect(), edges)
    }
}
