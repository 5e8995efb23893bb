use peakdetect::Signal;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution, Normal};

#[derive(Clone, Debug)]
pub struct NoiseConfig {
    pub seed: u64,
    pub additive: Option<AdditiveNoiseConfig>,
    pub impulse: Option<ImpulseNoiseConfig>,
}

/// White Gaussian noise
#[derive(Clone, Debug)]
pub struct AdditiveNoiseConfig {
    pub std_dev: f64,
}

/// Isolated single-sample spikes of fixed magnitude and random sign
#[derive(Clone, Debug)]
pub struct ImpulseNoiseConfig {
    pub probability: f64,
    pub amplitude: f64,
}

impl NoiseConfig {
    pub fn gaussian(seed: u64, std_dev: f64) -> Self {
        Self {
            seed,
            additive: Some(AdditiveNoiseConfig { std_dev }),
            impulse: None,
        }
    }
}

fn apply_additive_noise(samples: &mut [f64], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let normal = Normal::new(0.0, config.std_dev).unwrap();
    for sample in samples.iter_mut() {
        *sample += normal.sample(rng);
    }
}

fn apply_impulse_noise(samples: &mut [f64], config: &ImpulseNoiseConfig, rng: &mut ChaCha8Rng) {
    let hit = Bernoulli::new(config.probability).unwrap();
    let coin = Bernoulli::new(0.5).unwrap();
    for sample in samples.iter_mut() {
        if hit.sample(rng) {
            let sign = if coin.sample(rng) { 1.0 } else { -1.0 };
            *sample += sign * config.amplitude;
        }
    }
}

/// Copy of `clean` with the configured noise added; reproducible per seed
pub fn apply_noise(clean: &Signal, config: &NoiseConfig) -> Signal {
    let mut amplitudes = clean.amplitudes().to_vec();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    if let Some(ref additive) = config.additive {
        apply_additive_noise(&mut amplitudes, additive, &mut rng);
    }
    if let Some(ref impulse) = config.impulse {
        apply_impulse_noise(&mut amplitudes, impulse, &mut rng);
    }

    Signal::new(clean.positions().to_vec(), amplitudes).unwrap()
}
