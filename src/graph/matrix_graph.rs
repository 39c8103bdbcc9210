use crate::graph::GraphError;

use decorum::R64;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub type Edge<IndexType> = (IndexType, IndexType);

/// Pheromone level every edge starts out with.
pub const INITIAL_PHEROMONE: f64 = 1.0;

/// Mutable trail state attached to an edge. The weight is fixed at
/// construction time, the pheromone level changes over the run and is
/// always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeState {
    pub weight: R64,
    pub pheromone: R64,
}

/// Implements an undirected weighted graph with per-edge pheromone trails,
/// using an adjacency matrix as datastructure.
///
/// Node ids are mapped to consecutive matrix offsets on construction, so
/// lookups stay O(1) for arbitrary id types. Edges are stored once, under
/// the offset-normalized pair, and can be queried in either direction.
#[derive(Debug, Clone)]
pub struct MatrixGraph<IndexType: Clone> {
    adjacency_matrix: Vec<Vec<Option<EdgeState>>>,
    order: usize,
    size: usize,
    node_map: HashMap<IndexType, usize>,
    inv_node_map: HashMap<usize, IndexType>,
}

impl<IndexType> MatrixGraph<IndexType>
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    /// Creates a new graph from the given nodes and weighted edges.
    /// Every edge starts at [`INITIAL_PHEROMONE`].
    pub fn new(
        nodes: Vec<IndexType>,
        edges: Vec<(Edge<IndexType>, f64)>,
    ) -> Result<Self, GraphError<IndexType>> {
        let node_amount = nodes.len();
        let mut node_map = HashMap::new();
        let mut inv_node_map = HashMap::new();
        for (i, id) in nodes.into_iter().enumerate() {
            if node_map.insert(id, i).is_some() {
                return Err(GraphError::DuplicateNode(id));
            }
            inv_node_map.insert(i, id);
        }

        let mut graph = MatrixGraph {
            adjacency_matrix: (0..node_amount).map(|_| vec![None; node_amount]).collect(),
            order: node_amount,
            size: 0,
            node_map,
            inv_node_map,
        };

        for (edge, weight) in edges.into_iter() {
            graph.insert_edge(edge, weight)?;
        }

        Ok(graph)
    }

    fn insert_edge(
        &mut self,
        edge: Edge<IndexType>,
        weight: f64,
    ) -> Result<(), GraphError<IndexType>> {
        let (lo, hi) = self.offsets(edge)?;
        if self.adjacency_matrix[lo][hi].is_some() {
            return Err(GraphError::DuplicateEdge(edge));
        }

        self.adjacency_matrix[lo][hi] = Some(EdgeState {
            weight: R64::from_inner(weight),
            pheromone: R64::from_inner(INITIAL_PHEROMONE),
        });
        self.size += 1;
        Ok(())
    }

    /// Maps an edge to its normalized matrix offsets. A self-loop or an edge
    /// touching an unknown node is an error.
    fn offsets(&self, edge: Edge<IndexType>) -> Result<(usize, usize), GraphError<IndexType>> {
        let from = *self
            .node_map
            .get(&edge.0)
            .ok_or(GraphError::MissingNode(edge.0))?;
        let to = *self
            .node_map
            .get(&edge.1)
            .ok_or(GraphError::MissingNode(edge.1))?;
        if from == to {
            return Err(GraphError::MissingEdge(edge));
        }

        if from < to {
            Ok((from, to))
        } else {
            Ok((to, from))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order == 0
    }

    /// Returns the number of nodes in this graph.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the number of edges in this graph.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the node ids in construction order.
    pub fn node_ids(&self) -> Vec<IndexType> {
        (0..self.order).map(|i| self.inv_node_map[&i]).collect()
    }

    /// Returns all edge ids in a fixed deterministic order (row-major over
    /// the upper triangle of the matrix, i.e. node construction order).
    pub fn edge_ids(&self) -> Vec<Edge<IndexType>> {
        let mut edges = Vec::with_capacity(self.size);
        for lo in 0..self.order {
            for hi in (lo + 1)..self.order {
                if self.adjacency_matrix[lo][hi].is_some() {
                    edges.push((self.inv_node_map[&lo], self.inv_node_map[&hi]));
                }
            }
        }
        edges
    }

    pub fn has_node(&self, id: IndexType) -> bool {
        self.node_map.contains_key(&id)
    }

    pub fn has_edge(&self, edge: Edge<IndexType>) -> bool {
        match self.offsets(edge) {
            Ok((lo, hi)) => self.adjacency_matrix[lo][hi].is_some(),
            Err(_) => false,
        }
    }

    pub fn edge_state(&self, edge: Edge<IndexType>) -> Result<&EdgeState, GraphError<IndexType>> {
        let (lo, hi) = self.offsets(edge)?;
        self.adjacency_matrix[lo][hi]
            .as_ref()
            .ok_or(GraphError::MissingEdge(edge))
    }

    /// Returns the fixed weight of an edge.
    pub fn edge_weight(&self, edge: Edge<IndexType>) -> Result<R64, GraphError<IndexType>> {
        Ok(self.edge_state(edge)?.weight)
    }

    /// Returns the current pheromone level of an edge.
    pub fn pheromone(&self, edge: Edge<IndexType>) -> Result<R64, GraphError<IndexType>> {
        Ok(self.edge_state(edge)?.pheromone)
    }

    /// Sets the pheromone level of an edge. Zero or negative levels are an
    /// invalid trail state and get rejected.
    pub fn set_pheromone(
        &mut self,
        edge: Edge<IndexType>,
        level: f64,
    ) -> Result<(), GraphError<IndexType>> {
        if level <= 0.0 {
            return Err(GraphError::NonPositivePheromone(level));
        }

        let (lo, hi) = self.offsets(edge)?;
        match self.adjacency_matrix[lo][hi].as_mut() {
            Some(state) => {
                state.pheromone = R64::from_inner(level);
                Ok(())
            }
            None => Err(GraphError::MissingEdge(edge)),
        }
    }

    /// Sets every edge back to the given baseline level, discarding all
    /// accumulated trail.
    pub fn reset_pheromone(&mut self, baseline: f64) -> Result<(), GraphError<IndexType>> {
        if baseline <= 0.0 {
            return Err(GraphError::NonPositivePheromone(baseline));
        }

        let level = R64::from_inner(baseline);
        for row in self.adjacency_matrix.iter_mut() {
            for state in row.iter_mut().flatten() {
                state.pheromone = level;
            }
        }
        Ok(())
    }
}
