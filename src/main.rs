use std::cell::RefCell;
use std::path::Path;
use std::process::exit;

use aco_with_plugins::graph::generate::Complete;
use aco_with_plugins::rng::rng64;
use aco_with_plugins::run_config::RunConfig;
use aco_with_plugins::solver::Solver;

const CONFIG_FILE: &str = "run.yaml";
const WORLD_SIZE: usize = 33;
const WORLD_SEED: u128 = 90;

fn main() {
    let config = if Path::new(CONFIG_FILE).exists() {
        match RunConfig::from_file(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(error) => {
                eprintln!("Could not load {}: {}", CONFIG_FILE, error);
                exit(1);
            }
        }
    } else {
        RunConfig::default()
    };

    let mut world_rng = rng64(WORLD_SEED);
    let graph = match Complete::new(WORLD_SIZE, (1.0, 50.0), &mut world_rng).generate() {
        Ok(graph) => RefCell::new(graph),
        Err(error) => {
            eprintln!("Could not generate the demo world: {}", error);
            exit(1);
        }
    };

    let chain = match config.plugins.build_chain() {
        Ok(chain) => chain,
        Err(error) => {
            eprintln!("Invalid plugin config: {}", error);
            exit(1);
        }
    };

    let mut solver = Solver::new(config.solver.cfg().params(), chain);
    match solver.solve(&graph) {
        Ok(best) => println!("Best tour ({}): {}", best.weight, best),
        Err(error) => {
            eprintln!("Run aborted: {}", error);
            exit(1);
        }
    }
}
