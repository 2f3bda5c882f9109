/// Random variates for the checkout simulation
///
/// Every random quantity in a run comes from one uniform stream owned by the
/// engine: the customer count (Poisson), arrival timestamps (uniform) and
/// service times (negative exponential). The stream's seed fully determines
/// the run.
use rand::distributions::Open01;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A stream of uniform draws on the open interval (0, 1)
///
/// Zero is never produced, so `ln(u)` is always finite.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

/// Seeded ChaCha stream, the source used for real runs
#[derive(Debug, Clone)]
pub struct SeededUniforms {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededUniforms {
    pub fn new(seed: u64) -> Self {
        SeededUniforms {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pick a seed from system entropy. The chosen seed is kept so an
    /// interesting run can be replayed later.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl UniformSource for SeededUniforms {
    fn next_uniform(&mut self) -> f64 {
        self.rng.sample(Open01)
    }
}

/// Replays a fixed list of uniforms, wrapping around at the end
///
/// Useful for checking generator outputs against hand-computed values and for
/// driving the engine through a known scenario.
#[derive(Debug, Clone)]
pub struct ScriptedUniforms {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedUniforms {
    /// # Panics
    /// Panics if `values` is empty or any value lies outside (0, 1)
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "scripted uniforms need at least one value");
        assert!(
            values.iter().all(|u| *u > 0.0 && *u < 1.0),
            "scripted uniforms must lie in (0, 1)"
        );
        ScriptedUniforms { values, cursor: 0 }
    }

    /// How many draws have been taken so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for ScriptedUniforms {
    fn next_uniform(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Turns uniform draws into the distributions the simulation needs
#[derive(Debug, Clone)]
pub struct RandomVariates<U = SeededUniforms> {
    source: U,
}

impl<U: UniformSource> RandomVariates<U> {
    pub fn new(source: U) -> Self {
        RandomVariates { source }
    }

    pub fn source(&self) -> &U {
        &self.source
    }

    /// Poisson-distributed count with mean `expected_value`
    ///
    /// Sums logs of successive uniforms until the sum drops below
    /// `-expected_value`; the number of draws before the terminating one is
    /// the count. Only meaningful for `expected_value > 0`.
    pub fn poisson(&mut self, expected_value: f64) -> u32 {
        debug_assert!(
            expected_value > 0.0,
            "poisson mean must be positive, got {}",
            expected_value
        );
        let limit = -expected_value;
        let mut sum = self.source.next_uniform().ln();
        let mut count = 0;
        while sum > limit {
            sum += self.source.next_uniform().ln();
            count += 1;
        }
        count
    }

    /// Negative-exponential duration with mean `expected_value`
    pub fn negative_exponential(&mut self, expected_value: f64) -> f64 {
        -expected_value * self.source.next_uniform().ln()
    }

    /// Integer uniformly drawn from `[0, bound)`; zero when `bound` is zero
    pub fn uniform_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        let scaled = (self.source.next_uniform() * bound as f64) as u64;
        scaled.min(bound - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_exponential_known_value() {
        let mut variates = RandomVariates::new(ScriptedUniforms::new(vec![0.5]));
        let value = variates.negative_exponential(10.0);
        assert!((value - 10.0 * 2f64.ln()).abs() < 1e-12);
        assert!((value - 6.931).abs() < 1e-3);
    }

    #[test]
    fn test_poisson_counts_draws_before_limit() {
        // ln(0.5) = -0.693: first sum above -1, second (-1.386) below it
        let mut variates = RandomVariates::new(ScriptedUniforms::new(vec![0.5]));
        assert_eq!(variates.poisson(1.0), 1);
        assert_eq!(variates.source().draws(), 2);

        // A single draw already under the limit yields zero
        let mut variates = RandomVariates::new(ScriptedUniforms::new(vec![0.1]));
        assert_eq!(variates.poisson(1.0), 0);
        assert_eq!(variates.source().draws(), 1);

        // ln(0.9) = -0.105 each; needs 29 draws to pass -3.0
        let mut variates = RandomVariates::new(ScriptedUniforms::new(vec![0.9]));
        assert_eq!(variates.poisson(3.0), 28);
    }

    #[test]
    fn test_uniform_below_stays_in_range() {
        let mut variates = RandomVariates::new(ScriptedUniforms::new(vec![0.999_999_999, 0.25]));
        assert_eq!(variates.uniform_below(3600), 3599);
        assert_eq!(variates.uniform_below(3600), 900);
        assert_eq!(variates.uniform_below(0), 0);
    }

    #[test]
    fn test_seeded_stream_is_deterministic() {
        let mut first = RandomVariates::new(SeededUniforms::new(42));
        let mut second = RandomVariates::new(SeededUniforms::new(42));
        for _ in 0..200 {
            assert_eq!(
                first.negative_exponential(315.0),
                second.negative_exponential(315.0)
            );
        }
        assert_eq!(first.poisson(600.0), second.poisson(600.0));
    }

    #[test]
    fn test_seeded_uniforms_are_open_interval() {
        let mut source = SeededUniforms::new(7);
        for _ in 0..10_000 {
            let u = source.next_uniform();
            assert!(u > 0.0 && u < 1.0, "draw {} outside (0, 1)", u);
        }
    }

    #[test]
    fn test_sample_means_are_close() {
        let mut variates = RandomVariates::new(SeededUniforms::new(2015));
        let samples = 20_000;

        let exp_mean: f64 = (0..samples)
            .map(|_| variates.negative_exponential(100.0))
            .sum::<f64>()
            / samples as f64;
        assert!((exp_mean - 100.0).abs() < 5.0, "exponential mean {}", exp_mean);

        let poisson_mean: f64 = (0..samples)
            .map(|_| variates.poisson(4.0) as f64)
            .sum::<f64>()
            / samples as f64;
        assert!((poisson_mean - 4.0).abs() < 0.1, "poisson mean {}", poisson_mean);
    }

    #[test]
    fn test_entropy_seed_is_recorded() {
        let source = SeededUniforms::from_entropy();
        let mut replay = SeededUniforms::new(source.seed());
        let mut original = source.clone();
        assert_eq!(original.next_uniform(), replay.next_uniform());
    }

    #[test]
    #[should_panic(expected = "scripted uniforms must lie in (0, 1)")]
    fn test_scripted_rejects_zero() {
        ScriptedUniforms::new(vec![0.0]);
    }
}
