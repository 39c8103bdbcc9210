use crate::graph::{Edge, GraphError, MatrixGraph};

use decorum::R64;
use num_traits::identities::Zero;
use std::cell::RefCell;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// One completed ant tour: the ordered node sequence, its total weight and
/// the heuristic-weighting parameters it was constructed with. A tour that
/// returns to its starting node carries that node at both ends of the
/// sequence; edges are the consecutive pairs.
///
/// Identity for dedup purposes is the raw node sequence. Rotations and
/// reflections of the same cycle count as distinct solutions.
#[derive(Debug, Clone)]
pub struct Solution<IndexType> {
    node_list: Vec<IndexType>,
    pub weight: R64,
    pub alpha: f64,
    pub beta: f64,
}

impl<IndexType> Solution<IndexType>
where
    IndexType: PartialEq + Copy,
{
    /// Creates an empty placeholder carrying only construction parameters.
    /// The solver populates its colony with these before the first tour.
    pub fn seed(alpha: f64, beta: f64) -> Self {
        Solution {
            node_list: Vec::new(),
            weight: R64::zero(),
            alpha,
            beta,
        }
    }

    pub fn from_nodes(nodes: Vec<IndexType>, weight: R64, alpha: f64, beta: f64) -> Self {
        Solution {
            node_list: nodes,
            weight,
            alpha,
            beta,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_list.is_empty()
    }

    pub fn nodes(&self) -> Vec<IndexType> {
        self.node_list.clone()
    }

    pub fn iter_nodes(&self) -> Box<dyn Iterator<Item = &IndexType> + '_> {
        Box::new(self.node_list.iter())
    }

    /// Iterates the tour's edges as consecutive node pairs.
    pub fn iter_edges(&self) -> Box<dyn Iterator<Item = Edge<IndexType>> + '_> {
        Box::new(
            self.node_list
                .iter()
                .zip(self.node_list.iter().skip(1))
                .map(|(from, to)| (*from, *to)),
        )
    }

    pub fn edges(&self) -> Vec<Edge<IndexType>> {
        self.iter_edges().collect()
    }
}

impl<IndexType> Solution<IndexType>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    /// Deposits the given amount of pheromone onto every edge of this tour.
    /// Mutates only the graph, never the solution.
    pub fn trace(
        &self,
        graph: &RefCell<MatrixGraph<IndexType>>,
        amount: R64,
    ) -> Result<(), GraphError<IndexType>> {
        let mut graph = graph.borrow_mut();
        for edge in self.iter_edges() {
            let level = graph.pheromone(edge)?;
            graph.set_pheromone(edge, (level + amount).into_inner())?;
        }
        Ok(())
    }
}

impl<IndexType: PartialEq> PartialEq for Solution<IndexType> {
    fn eq(&self, other: &Self) -> bool {
        self.node_list == other.node_list
    }
}

impl<IndexType: Eq> Eq for Solution<IndexType> {}

impl<IndexType: Hash> Hash for Solution<IndexType> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_list.hash(state);
    }
}

impl<IndexType: Display> Display for Solution<IndexType> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.node_list
                .iter()
                .map(|x| format!("{}", x))
                .collect::<Vec<String>>()
                .join(" -> ")
        )
    }
}
