//! Analytic AC voltage waveforms with known extrema
//!
//! All waveforms share a 50 Hz fundamental with a peak of 1000·√2 and are
//! sampled on 10000 evenly spaced points over 0.1 s (five periods).

use std::f64::consts::{PI, SQRT_2};

use peakdetect::Signal;
use peakdetect::signal_processing::linspace;

pub const FREQUENCY_HZ: f64 = 50.0;
pub const PEAK_AMPLITUDE: f64 = 1000.0 * SQRT_2;

const DURATION_SECS: f64 = 0.1;
const SAMPLES: usize = 10_000;

fn theta(t: f64) -> f64 {
    2.0 * PI * FREQUENCY_HZ * t
}

/// Pure sine
pub fn acv1(t: f64) -> f64 {
    PEAK_AMPLITUDE * theta(t).sin()
}

/// Pure sine with a DC offset of 500
pub fn acv2(t: f64) -> f64 {
    acv1(t) + 500.0
}

/// Fundamental plus a phase-shifted 4th harmonic; extrema are asymmetric
pub fn acv3(t: f64) -> f64 {
    let th = theta(t);
    PEAK_AMPLITUDE * (th.sin() + 0.05 * (4.0 * th + 2.0 * PI / 3.0).sin())
}

/// Odd harmonics in phase with the peaks; extrema stay at the fundamental's
pub fn acv5(t: f64) -> f64 {
    let th = theta(t);
    PEAK_AMPLITUDE
        * (th.sin()
            + 0.05 * (3.0 * th - PI).sin()
            + 0.05 * (5.0 * th).sin()
            + 0.02 * (7.0 * th - PI).sin()
            + 0.01 * (9.0 * th).sin())
}

/// Same harmonic structure as [`acv5`] with different weights
pub fn acv6(t: f64) -> f64 {
    let th = theta(t);
    PEAK_AMPLITUDE
        * (th.sin()
            + 0.02 * (3.0 * th - PI).sin()
            + 0.02 * (5.0 * th).sin()
            + 0.0015 * (7.0 * th - PI).sin()
            + 0.009 * (9.0 * th).sin())
}

/// Sample a waveform on the standard time axis
pub fn sample(waveform: fn(f64) -> f64) -> Signal {
    let positions = linspace(0.0, DURATION_SECS, SAMPLES);
    let amplitudes = positions.iter().map(|&t| waveform(t)).collect();
    Signal::new(positions, amplitudes).expect("valid test signal")
}

/// Analytic `(time, amplitude)` extrema of a waveform
#[derive(Debug, Clone)]
pub struct ExpectedPeaks {
    pub maxima: Vec<(f64, f64)>,
    pub minima: Vec<(f64, f64)>,
}

/// Maxima at 5, 25, .. 85 ms and minima at 15, 35, .. 95 ms
pub fn expected_symmetric(maximum: f64, minimum: f64) -> ExpectedPeaks {
    let period = 1.0 / FREQUENCY_HZ;
    ExpectedPeaks {
        maxima: (0..5)
            .map(|k| (0.005 + period * k as f64, maximum))
            .collect(),
        minima: (0..5)
            .map(|k| (0.015 + period * k as f64, minimum))
            .collect(),
    }
}

pub fn expected_acv3() -> ExpectedPeaks {
    let period = 1.0 / FREQUENCY_HZ;
    let scale = 1.0 / (50.0 * PI);
    let t_max = 0.756_531_552_412_764_3 * scale;
    let t_min = -0.688_460_265_792_668_8 * scale;

    let maxima = (0..5).map(|k| t_max + period * k as f64);
    let minima = (1..6).map(|k| t_min + period * k as f64);
    ExpectedPeaks {
        maxima: maxima.map(|t| (t, acv3(t))).collect(),
        minima: minima.map(|t| (t, acv3(t))).collect(),
    }
}
