use crate::plugin::{PluginError, SolverPlugin};
use crate::solver::{SolverParams, SolverState};

/// Ordered list of plugins bound to one solver run.
///
/// Registration order is the dispatch order for every hook, and it is part
/// of the contract: a plugin that mutates shared state is observed by every
/// plugin registered after it within the same call. A failing hook aborts
/// the current fan-out immediately and propagates; later plugins are not
/// invoked for that call.
pub struct PluginChain<IndexType: Clone> {
    plugins: Vec<Box<dyn SolverPlugin<IndexType>>>,
    bound: bool,
}

impl<IndexType: Clone> Default for PluginChain<IndexType> {
    fn default() -> Self {
        PluginChain::new()
    }
}

impl<IndexType: Clone> PluginChain<IndexType> {
    pub fn new() -> Self {
        PluginChain {
            plugins: Vec::new(),
            bound: false,
        }
    }

    pub fn register<P>(&mut self, plugin: P)
    where
        P: SolverPlugin<IndexType> + 'static,
    {
        self.plugins.push(Box::new(plugin));
    }

    pub fn register_boxed(&mut self, plugin: Box<dyn SolverPlugin<IndexType>>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Binds every plugin to the run by calling its `initialize` exactly
    /// once, in registration order. A second bind is an error.
    pub fn bind_all(&mut self, params: &SolverParams) -> Result<(), PluginError> {
        if self.bound {
            return Err(PluginError::AlreadyBound);
        }

        for plugin in self.plugins.iter_mut() {
            plugin.initialize(params);
        }
        self.bound = true;
        Ok(())
    }

    pub fn fire_start(&mut self, state: &mut SolverState<'_, IndexType>) -> Result<(), PluginError> {
        for plugin in self.plugins.iter_mut() {
            plugin.on_start(state)?;
        }
        Ok(())
    }

    pub fn fire_iteration(
        &mut self,
        state: &mut SolverState<'_, IndexType>,
        is_new_best: bool,
    ) -> Result<(), PluginError> {
        for plugin in self.plugins.iter_mut() {
            plugin.on_iteration(state, is_new_best)?;
        }
        Ok(())
    }

    pub fn fire_finish(&mut self) -> Result<(), PluginError> {
        for plugin in self.plugins.iter_mut() {
            plugin.on_finish()?;
        }
        Ok(())
    }
}
