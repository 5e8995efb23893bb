use nalgebra::{DMatrix, DVector};

use super::{Refiner, fit_window, refine_candidates};
use crate::config::{LookaheadConfig, ParabolaConfig, odd_points};
use crate::constants::{CURVATURE_EPSILON, MIN_FIT_SAMPLES, SINGULAR_VALUE_EPSILON};
use crate::detect::find_candidates;
use crate::error::Result;
use crate::signal::{Candidate, Extremum, Peak, PeakSet, Signal, candidates_from_peaks};

/// Least-squares parabola through the samples around each candidate
///
/// The refined peak is the vertex `(x0 - b / 2a, c - b^2 / 4a)` of the fit.
/// When the fit is degenerate, curves the wrong way, or puts the vertex
/// outside the window, the candidate is returned unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ParabolaRefiner {
    points: usize,
}

impl ParabolaRefiner {
    pub fn new(config: &ParabolaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            points: odd_points(config.points),
        })
    }
}

impl Refiner for ParabolaRefiner {
    fn name(&self) -> &'static str {
        "parabola"
    }

    fn refine(&self, signal: &Signal, candidate: &Candidate) -> Result<Peak> {
        let window = fit_window(signal.len(), candidate.index, self.points);
        let xs = &signal.positions()[window.clone()];
        let ys = &signal.amplitudes()[window];

        Ok(fit_vertex(xs, ys, candidate.peak.position, candidate.kind).unwrap_or_else(|| {
            log::debug!(
                "parabola: keeping rough {} at {}",
                candidate.kind.as_str(),
                candidate.peak.position
            );
            candidate.peak
        }))
    }
}

/// Vertex of the least-squares parabola, if it is a usable extremum of `kind`
fn fit_vertex(xs: &[f64], ys: &[f64], origin: f64, kind: Extremum) -> Option<Peak> {
    if xs.len() < MIN_FIT_SAMPLES {
        return None;
    }

    // Local coordinates in [-1, 1] keep the design matrix well conditioned
    let scale = xs.iter().map(|&x| (x - origin).abs()).fold(0.0, f64::max);
    if !(scale > 0.0) {
        return None;
    }
    let design = DMatrix::from_fn(xs.len(), 3, |row, col| {
        ((xs[row] - origin) / scale).powi(col as i32)
    });
    let target = DVector::from_column_slice(ys);

    let coefficients = design
        .svd(true, true)
        .solve(&target, SINGULAR_VALUE_EPSILON)
        .ok()?;
    let (c, b, a) = (coefficients[0], coefficients[1], coefficients[2]);

    let magnitude = ys.iter().map(|y| y.abs()).fold(0.0, f64::max);
    if !(a.abs() > CURVATURE_EPSILON * magnitude) || !(a * kind.sign() < 0.0) {
        return None;
    }
    let vertex = -b / (2.0 * a);
    if !(vertex.abs() <= 1.0) {
        return None;
    }

    Some(Peak::new(origin + vertex * scale, c - b * b / (4.0 * a)))
}

/// Lookahead scan followed by parabola refinement of every candidate
pub fn peakdetect_parabola(
    signal: &Signal,
    lookahead: &LookaheadConfig,
    config: &ParabolaConfig,
) -> Result<PeakSet> {
    let refiner = ParabolaRefiner::new(config)?;
    let candidates = find_candidates(signal, lookahead)?;
    Ok(refine_candidates(&refiner, signal, &candidates).peaks)
}

/// Refine rough peaks obtained elsewhere
pub fn refine_parabola(signal: &Signal, rough: &PeakSet, config: &ParabolaConfig) -> Result<PeakSet> {
    let refiner = ParabolaRefiner::new(config)?;
    let candidates = candidates_from_peaks(signal, rough);
    Ok(refine_candidates(&refiner, signal, &candidates).peaks)
}
