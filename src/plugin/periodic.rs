use crate::plugin::{PluginError, SolverPlugin};
use crate::solver::{SolverParams, SolverState};

use decorum::R64;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub const DEFAULT_PERIOD: usize = 50;

/// Trail level every edge is set back to by [`PheromoneReset`].
pub const PHEROMONE_BASELINE: f64 = 1.0;

/// A behavior fired every `period` iterations by the [`Periodic`] wrapper.
pub trait PeriodicAction<IndexType: Clone> {
    fn name(&self) -> &str;

    fn act(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError>;
}

/// Generalizes "do X every N iterations" into a reusable plugin. The
/// counter starts at zero when the plugin is bound and the action fires on
/// every wrap, so a period of 3 first fires on the third iteration.
#[derive(Debug)]
pub struct Periodic<A> {
    period: usize,
    index: usize,
    action: A,
}

impl<A> Periodic<A> {
    pub fn new(action: A, period: usize) -> Result<Self, PluginError> {
        if period == 0 {
            return Err(PluginError::InvalidPeriod(period));
        }

        Ok(Periodic {
            period,
            index: 0,
            action,
        })
    }
}

impl Periodic<PheromoneReset> {
    pub fn reset(period: usize) -> Result<Self, PluginError> {
        Periodic::new(PheromoneReset, period)
    }
}

impl Default for Periodic<PheromoneReset> {
    fn default() -> Self {
        Periodic {
            period: DEFAULT_PERIOD,
            index: 0,
            action: PheromoneReset,
        }
    }
}

impl Periodic<PheromoneFlip> {
    pub fn flip(period: usize) -> Result<Self, PluginError> {
        Periodic::new(PheromoneFlip, period)
    }
}

impl Default for Periodic<PheromoneFlip> {
    fn default() -> Self {
        Periodic {
            period: DEFAULT_PERIOD,
            index: 0,
            action: PheromoneFlip,
        }
    }
}

impl<IndexType, A> SolverPlugin<IndexType> for Periodic<A>
where
    IndexType: Clone,
    A: PeriodicAction<IndexType>,
{
    fn name(&self) -> &str {
        self.action.name()
    }

    fn initialize(&mut self, _params: &SolverParams) {
        self.index = 0;
    }

    fn on_iteration(
        &mut self,
        state: &mut SolverState<'_, IndexType>,
        _is_new_best: bool,
    ) -> Result<(), PluginError> {
        self.index = (self.index + 1) % self.period;
        if self.index == 0 {
            self.action.act(state)
        } else {
            Ok(())
        }
    }
}

/// Sets every edge back to the baseline trail level, discarding everything
/// the colony has accumulated so far.
#[derive(Debug)]
pub struct PheromoneReset;

impl<IndexType> PeriodicAction<IndexType> for PheromoneReset
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    fn name(&self) -> &str {
        "pheromone-reset"
    }

    fn act(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        state
            .graph
            .borrow_mut()
            .reset_pheromone(PHEROMONE_BASELINE)
            .map_err(|e| PluginError::Graph(e.to_string()))
    }
}

/// Inverts the trail landscape: the multiset of levels is kept, but the
/// highest level moves to the edge that previously held the lowest and so
/// on. Ties keep their original edge order, so the reassignment is
/// deterministic.
pub struct PheromoneFlip;

impl<IndexType> PeriodicAction<IndexType> for PheromoneFlip
where
    IndexType: Hash + Copy + Eq + Display + Debug + Ord,
{
    fn name(&self) -> &str {
        "pheromone-flip"
    }

    fn act(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        let mut graph = state.graph.borrow_mut();

        let mut ranked = Vec::with_capacity(graph.size());
        for edge in graph.edge_ids() {
            let level = graph
                .pheromone(edge)
                .map_err(|e| PluginError::Graph(e.to_string()))?;
            ranked.push((edge, level));
        }
        ranked.sort_by_key(|&(_, level)| level);

        let levels: Vec<R64> = ranked.iter().map(|&(_, level)| level).collect();
        for (&(edge, _), &level) in ranked.iter().zip(levels.iter().rev()) {
            graph
                .set_pheromone(edge, level.into_inner())
                .map_err(|e| PluginError::Graph(e.to_string()))?;
        }
        Ok(())
    }
}
