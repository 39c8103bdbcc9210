use crate::plugin::{
    CsvBackend, Darwin, EliteTracer, Periodic, PluginChain, Printout, StatRecorder, Timer,
};
use crate::run_config::RunConfigError;

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::fs::File;
use std::hash::Hash;

/// Optional plugin knobs for one run. Progress printout and timing are
/// always attached; everything else only when its option is set.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PluginsConfig {
    /// Elite reinforcement factor.
    pub elite: Option<f64>,
    /// Reset the trail every this many iterations.
    pub reset: Option<usize>,
    /// Flip the trail every this many iterations.
    pub flip: Option<usize>,
    /// Perturbation spread for the adaptive parameter controller.
    pub darwin: Option<f64>,
    pub darwin_seed: Option<u128>,
    /// Path the statistics csv gets written to.
    pub stats: Option<String>,
}

impl PluginsConfig {
    /// Assembles the plugin chain in the fixed registration order:
    /// printout, timer, stats, elite, reset, flip, darwin. Order matters,
    /// mutating plugins run after the observers that should see the
    /// unmutated state.
    pub fn build_chain<IndexType>(&self) -> Result<PluginChain<IndexType>, RunConfigError>
    where
        IndexType: Hash + Copy + Eq + Display + Debug + Ord + 'static,
    {
        let mut chain = PluginChain::new();
        chain.register(Printout::new());
        chain.register(Timer::new());

        if let Some(path) = &self.stats {
            let file = File::create(path).map_err(RunConfigError::Io)?;
            chain.register(StatRecorder::<IndexType, _>::new(CsvBackend::from_writer(
                file,
            )));
        }
        if let Some(factor) = self.elite {
            chain.register(EliteTracer::new(factor));
        }
        if let Some(period) = self.reset {
            let plugin = Periodic::reset(period)
                .map_err(|e| RunConfigError::InvalidPluginConfig(e.to_string()))?;
            chain.register(plugin);
        }
        if let Some(period) = self.flip {
            let plugin = Periodic::flip(period)
                .map_err(|e| RunConfigError::InvalidPluginConfig(e.to_string()))?;
            chain.register(plugin);
        }
        if let Some(sigma) = self.darwin {
            if sigma < 0.0 {
                return Err(RunConfigError::InvalidPluginConfig(format!(
                    "Darwin sigma must be non-negative, got {}.",
                    sigma
                )));
            }
            chain.register(Darwin::new(sigma, self.darwin_seed));
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_has_printout_and_timer() {
        let config = PluginsConfig::default();
        let chain = config.build_chain::<usize>().unwrap();

        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn configured_plugins_are_registered() {
        let config = PluginsConfig {
            elite: Some(2.0),
            reset: Some(100),
            flip: None,
            darwin: Some(0.1),
            darwin_seed: Some(1),
            stats: None,
        };
        let chain = config.build_chain::<usize>().unwrap();

        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn zero_reset_period_is_rejected() {
        let config = PluginsConfig {
            reset: Some(0),
            ..PluginsConfig::default()
        };

        assert!(matches!(
            config.build_chain::<usize>(),
            Err(RunConfigError::InvalidPluginConfig(_))
        ));
    }

    #[test]
    fn negative_sigma_is_rejected() {
        let config = PluginsConfig {
            darwin: Some(-0.5),
            ..PluginsConfig::default()
        };

        assert!(matches!(
            config.build_chain::<usize>(),
            Err(RunConfigError::InvalidPluginConfig(_))
        ));
    }

    #[test]
    fn parses_from_ron() {
        let ron = "(elite: Some(1.5), reset: Some(50), flip: None, darwin: None, darwin_seed: None, stats: None)";
        let config: PluginsConfig = ron::de::from_str(ron).unwrap();

        assert_eq!(config.reset, Some(50));
        assert_eq!(config.elite, Some(1.5));
    }
}
