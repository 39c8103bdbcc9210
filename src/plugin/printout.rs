use crate::plugin::{PluginError, SolverPlugin};
use crate::solver::{SolverParams, SolverState};

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;

/// Reports solving progress on the terminal: one in-place updated line per
/// iteration and a retained line for every new best solution.
pub struct Printout {
    bar: Option<ProgressBar>,
    iteration: usize,
    best_count: usize,
}

impl Printout {
    pub fn new() -> Self {
        Printout {
            bar: None,
            iteration: 0,
            best_count: 0,
        }
    }

    pub fn best_count(&self) -> usize {
        self.best_count
    }
}

impl Default for Printout {
    fn default() -> Self {
        Printout::new()
    }
}

impl<IndexType> SolverPlugin<IndexType> for Printout
where
    IndexType: Clone + Display,
{
    fn name(&self) -> &str {
        "printout"
    }

    fn initialize(&mut self, _params: &SolverParams) {
        self.bar = None;
        self.iteration = 0;
        self.best_count = 0;
    }

    fn on_start(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        let bar = ProgressBar::new(state.params.limit as u64);
        bar.set_style(
            ProgressStyle::default_bar().template("{pos:>7}/{len:7} {bar:40.cyan/blue} {msg}"),
        );
        self.bar = Some(bar);
        Ok(())
    }

    fn on_iteration(
        &mut self,
        state: &mut SolverState<'_, IndexType>,
        is_new_best: bool,
    ) -> Result<(), PluginError> {
        self.iteration += 1;
        if is_new_best {
            self.best_count += 1;
        }

        if let Some(bar) = &self.bar {
            bar.inc(1);
            if is_new_best {
                if let Some(best) = state.best {
                    bar.println(format!(
                        "{:>4} {:>4} \t{} ({})",
                        self.iteration, self.best_count, best.weight, best
                    ));
                }
            }
        }
        Ok(())
    }

    fn on_finish(&mut self) -> Result<(), PluginError> {
        if let Some(bar) = &self.bar {
            bar.finish_with_message("Done");
        }
        Ok(())
    }
}
