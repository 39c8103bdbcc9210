use crate::rng::os_random_seed;
use crate::run_config::Fix;
use crate::solver::SolverParams;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
#[serde(untagged)]
pub enum SolverRunConfig {
    Full(FullSolverConfig),
    Unseeded(UnseededSolverConfig),
}

impl SolverRunConfig {
    pub fn cfg(&self) -> FullSolverConfig {
        match self {
            Self::Full(cfg) => *cfg,
            Self::Unseeded(cfg) => cfg.to_fixed(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct FullSolverConfig {
    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    pub q: f64,
    pub limit: usize,
    pub colony_size: usize,
    pub seed: u128,
}

impl Default for FullSolverConfig {
    fn default() -> Self {
        FullSolverConfig {
            alpha: 1.0,
            beta: 3.0,
            rho: 0.03,
            q: 1.0,
            limit: 2000,
            colony_size: 60,
            seed: os_random_seed(),
        }
    }
}

impl Default for SolverRunConfig {
    fn default() -> Self {
        SolverRunConfig::Full(FullSolverConfig::default())
    }
}

impl FullSolverConfig {
    pub fn params(&self) -> SolverParams {
        SolverParams::new(
            self.alpha,
            self.beta,
            self.rho,
            self.q,
            self.limit,
            self.colony_size,
            Some(self.seed),
        )
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UnseededSolverConfig {
    pub alpha: f64,
    pub beta: f64,
    pub rho: f64,
    pub q: f64,
    pub limit: usize,
    pub colony_size: usize,
}

impl Fix<FullSolverConfig> for UnseededSolverConfig {
    fn to_fixed(&self) -> FullSolverConfig {
        FullSolverConfig {
            alpha: self.alpha,
            beta: self.beta,
            rho: self.rho,
            q: self.q,
            limit: self.limit,
            colony_size: self.colony_size,
            seed: os_random_seed(),
        }
    }
}
