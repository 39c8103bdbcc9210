use getrandom::getrandom;
use oorandom::Rand64;

pub fn preseeded_rng64() -> Rand64 {
    Rand64::new(os_random_seed())
}

pub fn rng64(seed: u128) -> Rand64 {
    Rand64::new(seed)
}

pub fn os_random_seed() -> u128 {
    let mut buf = [0; 16];
    let _res = getrandom(&mut buf);
    u128::from_le_bytes(buf)
}

/// Draws from a normal distribution with the given mean and standard deviation
/// using the Box-Muller transform on two uniform samples.
pub fn gauss(rng: &mut Rand64, mean: f64, sigma: f64) -> f64 {
    let u1 = rng.rand_float().max(f64::MIN_POSITIVE);
    let u2 = rng.rand_float();
    let mag = (-2.0 * u1.ln()).sqrt();
    mean + sigma * mag * (2.0 * std::f64::consts::PI * u2).cos()
}
