use super::{Refiner, fit_window, refine_candidates};
use crate::config::{LookaheadConfig, SplineConfig, odd_points};
use crate::detect::peakdetect;
use crate::error::{PeakError, Result, invalid};
use crate::signal::{Candidate, Extremum, Peak, PeakSet, Signal, candidates_from_peaks};
use crate::signal_processing::linspace;

/// Natural cubic spline through a set of knots
///
/// Segment `j` is `y_j + b_j t + c_j t^2 + d_j t^3` with `t = x - x_j`; the
/// second derivative is zero at both end knots. Outside the knot range the
/// end segments are extended.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline {
    /// Fit a natural spline; `xs` must be strictly increasing
    pub fn natural(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(invalid(format!(
                "knot positions ({}) and values ({}) must have the same length",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(PeakError::InsufficientData {
                what: "spline knots",
                needed: 2,
                available: xs.len(),
            });
        }
        if let Some(i) = xs.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(invalid(format!(
                "spline knots must be strictly increasing (index {} >= index {})",
                i,
                i + 1
            )));
        }

        let m = xs.len();
        let k = m - 1;
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

        // Tridiagonal system for the quadratic coefficients, solved forward
        // then back (Thomas algorithm)
        let mut mu = vec![0.0; m];
        let mut z = vec![0.0; m];
        for i in 1..k {
            let alpha = 3.0 / h[i] * (ys[i + 1] - ys[i]) - 3.0 / h[i - 1] * (ys[i] - ys[i - 1]);
            let l = 2.0 * (xs[i + 1] - xs[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l;
            z[i] = (alpha - h[i - 1] * z[i - 1]) / l;
        }

        let mut c = vec![0.0; m];
        let mut b = vec![0.0; k];
        let mut d = vec![0.0; k];
        for j in (0..k).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (ys[j + 1] - ys[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }
        c.truncate(k);

        Ok(Self {
            knots: xs.to_vec(),
            values: ys.to_vec(),
            b,
            c,
            d,
        })
    }

    fn segments(&self) -> usize {
        self.b.len()
    }

    fn segment_at(&self, x: f64) -> usize {
        self.knots
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(self.segments() - 1)
    }

    fn evaluate_segment(&self, j: usize, x: f64) -> f64 {
        let t = x - self.knots[j];
        self.values[j] + t * (self.b[j] + t * (self.c[j] + t * self.d[j]))
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.evaluate_segment(self.segment_at(x), x)
    }

    /// Evaluate at many ascending positions in one pass
    pub fn evaluate_sorted(&self, xs: &[f64]) -> Vec<f64> {
        let last = self.segments() - 1;
        let mut j = 0;
        xs.iter()
            .map(|&x| {
                while j < last && x >= self.knots[j + 1] {
                    j += 1;
                }
                self.evaluate_segment(j, x)
            })
            .collect()
    }

    /// Every local extremum of the spline, ordered by position
    ///
    /// Found analytically as roots of the derivative in each segment.
    /// Inflection points with a double root are skipped.
    pub fn extrema(&self) -> Vec<(Extremum, Peak)> {
        let mut found = Vec::new();
        for j in 0..self.segments() {
            let width = self.knots[j + 1] - self.knots[j];
            let mut roots = derivative_roots(3.0 * self.d[j], 2.0 * self.c[j], self.b[j]);
            roots.sort_by(f64::total_cmp);

            for t in roots {
                if !(0.0..width).contains(&t) {
                    continue;
                }
                let curvature = 2.0 * self.c[j] + 6.0 * self.d[j] * t;
                let kind = if curvature < 0.0 {
                    Extremum::Maximum
                } else if curvature > 0.0 {
                    Extremum::Minimum
                } else {
                    continue;
                };
                let x = self.knots[j] + t;
                found.push((kind, Peak::new(x, self.evaluate_segment(j, x))));
            }
        }
        found
    }
}

/// Real roots of `a t^2 + b t + c`, stable against cancellation
fn derivative_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let mut roots = Vec::with_capacity(2);
    if a != 0.0 {
        roots.push(q / a);
    }
    if q != 0.0 {
        roots.push(c / q);
    }
    roots.retain(|t| t.is_finite());
    roots
}

/// Local natural spline through the samples around each candidate
///
/// The refined peak is the spline extremum of the candidate's kind closest
/// to it; without one the candidate is returned unchanged.
#[derive(Debug, Clone, Copy)]
pub struct SplineRefiner {
    points: usize,
}

impl SplineRefiner {
    pub fn new(config: &SplineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            points: odd_points(config.points),
        })
    }
}

impl Refiner for SplineRefiner {
    fn name(&self) -> &'static str {
        "spline"
    }

    fn refine(&self, signal: &Signal, candidate: &Candidate) -> Result<Peak> {
        let window = fit_window(signal.len(), candidate.index, self.points);
        let spline = CubicSpline::natural(
            &signal.positions()[window.clone()],
            &signal.amplitudes()[window],
        )?;

        let origin = candidate.peak.position;
        Ok(spline
            .extrema()
            .into_iter()
            .filter(|(kind, _)| *kind == candidate.kind)
            .map(|(_, peak)| peak)
            .min_by(|a, b| (a.position - origin).abs().total_cmp(&(b.position - origin).abs()))
            .unwrap_or(candidate.peak))
    }
}

fn require_strictly_increasing(signal: &Signal) -> Result<()> {
    if signal.is_strictly_increasing() {
        Ok(())
    } else {
        Err(invalid("spline fitting needs strictly increasing positions"))
    }
}

/// Lookahead scan on a dense resampling of a natural spline through the signal
///
/// The spline is evaluated at `len * (upsample + 1)` evenly spaced positions
/// and the lookahead is scaled by the same factor.
pub fn peakdetect_spline(
    signal: &Signal,
    lookahead: &LookaheadConfig,
    config: &SplineConfig,
) -> Result<PeakSet> {
    config.validate()?;
    lookahead.validate()?;
    require_strictly_increasing(signal)?;

    let spline = CubicSpline::natural(signal.positions(), signal.amplitudes())?;
    let factor = config.upsample + 1;
    let positions = signal.positions();
    let dense_x = linspace(positions[0], positions[positions.len() - 1], signal.len() * factor);
    let dense_y = spline.evaluate_sorted(&dense_x);

    let scan = LookaheadConfig {
        lookahead: lookahead.lookahead * factor,
        delta: lookahead.delta,
    };
    log::debug!(
        "spline: resampled {} -> {} samples, lookahead {}",
        signal.len(),
        dense_x.len(),
        scan.lookahead
    );

    peakdetect(&Signal::new(dense_x, dense_y)?, &scan)
}

/// Refine rough peaks with a local spline around each
pub fn refine_spline(signal: &Signal, rough: &PeakSet, config: &SplineConfig) -> Result<PeakSet> {
    require_strictly_increasing(signal)?;
    let refiner = SplineRefiner::new(config)?;
    let candidates = candidates_from_peaks(signal, rough);
    Ok(refine_candidates(&refiner, signal, &candidates).peaks)
}
