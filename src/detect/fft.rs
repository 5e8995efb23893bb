//! Peak detection on a band-limited upsampled copy of the signal.
//!
//! The signal is transformed, its spectrum is zero-padded in the middle
//! (i.e. at the highest frequencies) and transformed back, which yields the
//! band-limited interpolation of the original samples on a denser grid. The
//! lookahead scan then runs on the dense signal.
//!
//! The spectrum assumes the segment repeats periodically, so the segment is
//! trimmed to whole periods between zero crossings when possible. Peaks near
//! the ends of the segment may still be distorted by spectral leakage.

use num_complex::Complex64;
use rustfft::FftPlanner;

use super::lookahead::peakdetect;
use crate::config::{FftConfig, LookaheadConfig};
use crate::error::{PeakError, Result};
use crate::signal::{PeakSet, Signal};
use crate::signal_processing::{WindowKind, center_pad, interpolate_index, zero_crossings};

/// Find peaks on an FFT-upsampled copy of the signal
///
/// Positions of the upsampled samples are interpolated from the original
/// position axis, so reported peaks are in the caller's units.
///
/// # Errors
/// `InvalidArgument` for an invalid configuration or when the upsampled
/// segment is too short for the scaled lookahead.
pub fn peakdetect_fft(signal: &Signal, config: &FftConfig) -> Result<PeakSet> {
    config.validate()?;

    let amplitudes = signal.amplitudes();
    let (start, end) = whole_period_span(amplitudes, config.crossing_window)?;
    let segment = &amplitudes[start..end];
    if segment.len() < 2 {
        return Err(PeakError::InsufficientData {
            what: "samples",
            needed: 2,
            available: segment.len(),
        });
    }

    let upsampled = upsample(segment, config.pad_multiplier)?;
    let factor = upsampled.len() as f64 / segment.len() as f64;
    let positions: Vec<f64> = (0..upsampled.len())
        .map(|j| interpolate_index(signal.positions(), start as f64 + j as f64 / factor))
        .collect();

    let scan = LookaheadConfig {
        lookahead: (config.lookahead as f64 * factor).ceil() as usize,
        delta: 2.0 * max_step(amplitudes),
    };
    log::debug!(
        "fft: segment {}..{} upsampled x{:.3} to {} samples, lookahead {}, delta {:.6}",
        start,
        end,
        factor,
        upsampled.len(),
        scan.lookahead,
        scan.delta
    );

    peakdetect(&Signal::new(positions, upsampled)?, &scan)
}

/// Band-limited interpolation of `segment` to a power-of-two length
///
/// The output length is `2^next_pow2_exponent(len * multiplier)`; output
/// sample `j` lies at fractional input index `j * len / output_len`.
pub fn upsample(segment: &[f64], multiplier: usize) -> Result<Vec<f64>> {
    let mut planner = FftPlanner::<f64>::new();

    let mut spectrum: Vec<Complex64> = segment.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    planner.plan_fft_forward(spectrum.len()).process(&mut spectrum);

    let mut padded = center_pad(&spectrum, multiplier)?;
    planner.plan_fft_inverse(padded.len()).process(&mut padded);

    // rustfft does not normalize; the original length sets the amplitude
    let scale = 1.0 / segment.len() as f64;
    Ok(padded.iter().map(|c| c.re * scale).collect())
}

/// Sample range covering whole periods between zero crossings
///
/// Uses an odd number of crossings so the range spans whole periods. Falls
/// back to the full signal when there are too few crossings.
fn whole_period_span(amplitudes: &[f64], window: usize) -> Result<(usize, usize)> {
    let full = (0, amplitudes.len());
    if amplitudes.len() < window {
        return Ok(full);
    }

    let crossings = zero_crossings(amplitudes, window, WindowKind::Flat)?;
    let usable = if crossings.len() % 2 == 1 {
        crossings.len()
    } else {
        crossings.len().saturating_sub(1)
    };
    if usable < 3 {
        log::debug!(
            "fft: {} zero crossings, transforming the whole signal",
            crossings.len()
        );
        return Ok(full);
    }

    Ok((crossings[0] + 1, crossings[usable - 1] + 1))
}

fn max_step(amplitudes: &[f64]) -> f64 {
    amplitudes
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max)
}
