//! Sine-model refinement
//!
//! Each candidate window is fitted with
//!
//! ```text
//! y(x) = A * cos(2 * pi * f * (x - tau)) + c
//! ```
//!
//! using the Levenberg-Marquardt solver. The free variant fits all four
//! parameters; the locked variant holds `f` fixed, which is more robust when
//! the oscillation frequency is known. The refined peak is the model extremum
//! `tau + k / (2f)` nearest the candidate whose kind matches it.

use std::f64::consts::PI;

use super::{LevenbergMarquardt, Refinement, Refiner, fit_window, refine_candidates};
use crate::config::{LookaheadConfig, SineConfig, odd_points};
use crate::detect::find_candidates;
use crate::error::{PeakError, Result};
use crate::signal::{Candidate, Extremum, Peak, PeakSet, Signal, candidates_from_peaks};

// Parameter layout: [A, tau, c, f]
const AMPLITUDE: usize = 0;
const PHASE: usize = 1;
const OFFSET: usize = 2;
const FREQUENCY: usize = 3;

fn model(x: f64, p: &[f64], gradient: &mut [f64]) -> f64 {
    let omega = 2.0 * PI * p[FREQUENCY];
    let arg = omega * (x - p[PHASE]);
    let (sin, cos) = arg.sin_cos();
    gradient[AMPLITUDE] = cos;
    gradient[PHASE] = p[AMPLITUDE] * sin * omega;
    gradient[OFFSET] = 1.0;
    gradient[FREQUENCY] = -p[AMPLITUDE] * sin * 2.0 * PI * (x - p[PHASE]);
    p[AMPLITUDE] * cos + p[OFFSET]
}

/// Sine fit around each candidate
#[derive(Debug, Clone, Copy)]
pub struct SineRefiner {
    points: usize,
    frequency: f64,
    offset: f64,
    locked: bool,
    solver: LevenbergMarquardt,
}

impl SineRefiner {
    /// Create a refiner for the given candidates
    ///
    /// The candidate set provides the initial offset (midway between the mean
    /// maximum and mean minimum) and, unless configured, the frequency (from
    /// the mean spacing of same-kind candidates).
    ///
    /// # Errors
    /// `InsufficientData` if no frequency is configured and fewer than two
    /// candidates of one kind are available to estimate it.
    pub fn new(config: &SineConfig, candidates: &[Candidate], locked: bool) -> Result<Self> {
        config.validate()?;

        let frequency = match config.frequency {
            Some(frequency) => frequency,
            None => estimate_frequency(candidates).ok_or(PeakError::InsufficientData {
                what: "same-kind peaks to estimate the frequency",
                needed: 2,
                available: candidates.len(),
            })?,
        };
        let offset = estimate_offset(candidates);
        log::debug!(
            "sine{}: frequency {:.6}, offset {:.6}, {} points",
            if locked { " (locked)" } else { "" },
            frequency,
            offset,
            odd_points(config.points)
        );

        Ok(Self {
            points: odd_points(config.points),
            frequency,
            offset,
            locked,
            solver: LevenbergMarquardt {
                max_iterations: config.max_iterations,
                tolerance: config.tolerance,
            },
        })
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }
}

impl Refiner for SineRefiner {
    fn name(&self) -> &'static str {
        if self.locked { "sine-locked" } else { "sine" }
    }

    fn refine(&self, signal: &Signal, candidate: &Candidate) -> Result<Peak> {
        let window = fit_window(signal.len(), candidate.index, self.points);
        let origin = candidate.peak.position;
        let xs: Vec<f64> = signal.positions()[window.clone()]
            .iter()
            .map(|&x| x - origin)
            .collect();
        let ys = &signal.amplitudes()[window];

        let mut amplitude = candidate.peak.amplitude - self.offset;
        if amplitude == 0.0 {
            amplitude = candidate.kind.sign();
        }
        let initial = [amplitude, 0.0, self.offset, self.frequency];
        let free = [true, true, true, !self.locked];

        let fit = self.solver.minimize(model, &xs, ys, &initial, &free)?;
        let p = &fit.parameters;
        if !p.iter().all(|v| v.is_finite()) || !(p[FREQUENCY] > 0.0) {
            return Err(PeakError::FitDidNotConverge {
                iterations: fit.iterations,
            });
        }

        let local = nearest_extremum(p[AMPLITUDE], p[PHASE], p[FREQUENCY], candidate.kind);
        let mut scratch = [0.0; 4];
        Ok(Peak::new(origin + local, model(local, p, &mut scratch)))
    }
}

/// Offset from the origin of the model extremum of `kind` closest to it
///
/// Extrema lie at `tau + k / (2f)`; even `k` are maxima when `A > 0`.
fn nearest_extremum(amplitude: f64, phase: f64, frequency: f64, kind: Extremum) -> f64 {
    let half_period = 0.5 / frequency;
    let mut k = (-phase / half_period).round();
    let parity = if k.rem_euclid(2.0) == 0.0 { 1.0 } else { -1.0 };
    if parity * amplitude.signum() != kind.sign() {
        // Wrong kind; step to the neighbour closer to the origin
        let here = phase + k * half_period;
        k += if here > 0.0 { -1.0 } else { 1.0 };
    }
    phase + k * half_period
}

/// Frequency from the mean spacing of same-kind candidates
fn estimate_frequency(candidates: &[Candidate]) -> Option<f64> {
    let spacings: Vec<f64> = [Extremum::Maximum, Extremum::Minimum]
        .into_iter()
        .filter_map(|kind| {
            let positions: Vec<f64> = candidates
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.peak.position)
                .collect();
            (positions.len() >= 2).then(|| {
                (positions[positions.len() - 1] - positions[0]) / (positions.len() - 1) as f64
            })
        })
        .collect();
    if spacings.is_empty() {
        return None;
    }

    let period = spacings.iter().sum::<f64>() / spacings.len() as f64;
    (period > 0.0).then(|| 1.0 / period)
}

/// Midpoint between the mean maximum and mean minimum amplitude
fn estimate_offset(candidates: &[Candidate]) -> f64 {
    let means: Vec<f64> = [Extremum::Maximum, Extremum::Minimum]
        .into_iter()
        .filter_map(|kind| {
            let values: Vec<f64> = candidates
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.peak.amplitude)
                .collect();
            (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
        })
        .collect();
    match means.as_slice() {
        [max, min] => (max + min) / 2.0,
        _ => 0.0,
    }
}

fn refine_with_sine(
    signal: &Signal,
    candidates: &[Candidate],
    config: &SineConfig,
    locked: bool,
) -> Result<Refinement> {
    let refiner = SineRefiner::new(config, candidates, locked)?;
    Ok(refine_candidates(&refiner, signal, candidates))
}

/// Lookahead scan followed by a free sine fit of every candidate
pub fn peakdetect_sine(
    signal: &Signal,
    lookahead: &LookaheadConfig,
    config: &SineConfig,
) -> Result<Refinement> {
    let candidates = find_candidates(signal, lookahead)?;
    refine_with_sine(signal, &candidates, config, false)
}

/// Lookahead scan followed by a sine fit at a fixed frequency
///
/// Uses `config.frequency` when set, otherwise the estimate from the
/// candidate spacing.
pub fn peakdetect_sine_locked(
    signal: &Signal,
    lookahead: &LookaheadConfig,
    config: &SineConfig,
) -> Result<Refinement> {
    let candidates = find_candidates(signal, lookahead)?;
    refine_with_sine(signal, &candidates, config, true)
}

/// Refine rough peaks obtained elsewhere
pub fn refine_sine(
    signal: &Signal,
    rough: &PeakSet,
    config: &SineConfig,
    locked: bool,
) -> Result<Refinement> {
    let candidates = candidates_from_peaks(signal, rough);
    refine_with_sine(signal, &candidates, config, locked)
}
