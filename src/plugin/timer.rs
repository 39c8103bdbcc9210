use crate::plugin::{PluginError, SolverPlugin};
use crate::solver::{SolverParams, SolverState};

use std::time::{Duration, Instant};

/// Measures wall-clock time from `on_start` to `on_finish` and reports the
/// elapsed duration once the run is over.
pub struct Timer {
    start: Option<Instant>,
    duration: Option<Duration>,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            start: None,
            duration: None,
        }
    }

    /// Elapsed run time, available after `on_finish` has fired.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

impl<IndexType: Clone> SolverPlugin<IndexType> for Timer {
    fn name(&self) -> &str {
        "timer"
    }

    fn initialize(&mut self, _params: &SolverParams) {
        self.start = None;
        self.duration = None;
    }

    fn on_start(&mut self, _state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        self.start = Some(Instant::now());
        Ok(())
    }

    fn on_finish(&mut self) -> Result<(), PluginError> {
        if let Some(start) = self.start {
            let duration = start.elapsed();
            self.duration = Some(duration);
            println!("Total time: {:?}", duration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MatrixGraph;
    use crate::solver::Solution;
    use std::cell::RefCell;

    #[test]
    fn duration_is_recorded_between_start_and_finish() {
        let graph = RefCell::new(MatrixGraph::new(vec![0, 1], vec![((0, 1), 1.0)]).unwrap());
        let params = SolverParams::new(1.0, 3.0, 0.03, 1.0, 10, 1, Some(1));
        let mut population: Vec<Solution<usize>> = Vec::new();
        let mut timer = Timer::new();

        SolverPlugin::<usize>::initialize(&mut timer, &params);
        assert!(timer.duration().is_none());

        let mut state = SolverState {
            graph: &graph,
            solutions: &mut population,
            best: None,
            params: &params,
            iteration: 0,
        };
        timer.on_start(&mut state).unwrap();
        SolverPlugin::<usize>::on_finish(&mut timer).unwrap();

        assert!(timer.duration().is_some());
    }
}
