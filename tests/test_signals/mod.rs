// Each test binary uses a different subset of the fixtures
#![allow(dead_code)]

pub mod noise;
pub mod waveforms;

#[allow(unused_imports)]
pub use noise::{AdditiveNoiseConfig, ImpulseNoiseConfig, NoiseConfig, apply_noise};
#[allow(unused_imports)]
pub use waveforms::{
    ExpectedPeaks, FREQUENCY_HZ, PEAK_AMPLITUDE, acv1, acv2, acv3, acv5, acv6, expected_acv3,
    expected_symmetric, sample,
};
