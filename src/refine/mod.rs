//! Sub-sample peak refinement
//!
//! Refiners take rough candidates from the lookahead scan and fit a local
//! model around each one. The refined peak is the extremum of the model.
//!
//! The fit window holds `points` samples centered on the candidate sample.
//! Near the ends of the signal it is clipped, so refinement of peaks close
//! to the boundaries is less accurate.

mod least_squares;
pub mod parabola;
pub mod sine;
pub mod spline;

pub use least_squares::{FitResult, LevenbergMarquardt};
pub use parabola::{ParabolaRefiner, peakdetect_parabola, refine_parabola};
pub use sine::{SineRefiner, peakdetect_sine, peakdetect_sine_locked, refine_sine};
pub use spline::{CubicSpline, SplineRefiner, peakdetect_spline, refine_spline};

use std::ops::Range;

use crate::error::{PeakError, Result};
use crate::signal::{Candidate, Peak, PeakSet, Signal};

/// Local model fit around one candidate
pub trait Refiner {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Refine a single candidate into an exact peak
    fn refine(&self, signal: &Signal, candidate: &Candidate) -> Result<Peak>;
}

/// A candidate the refiner gave up on
#[derive(Debug)]
pub struct RefineFailure {
    pub candidate: Candidate,
    pub error: PeakError,
}

/// Refined peaks plus the candidates that could not be refined
#[derive(Debug, Default)]
pub struct Refinement {
    pub peaks: PeakSet,
    pub failures: Vec<RefineFailure>,
}

impl Refinement {
    /// Whether every candidate was refined
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Peaks, or the first failure if any candidate could not be refined
    pub fn into_peaks(self) -> Result<PeakSet> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.peaks),
        }
    }
}

/// Refine every candidate independently
///
/// Failures are collected rather than aborting the run, so one bad window
/// does not lose the other peaks.
pub fn refine_candidates<R: Refiner + ?Sized>(
    refiner: &R,
    signal: &Signal,
    candidates: &[Candidate],
) -> Refinement {
    let mut refinement = Refinement::default();

    for candidate in candidates {
        match refiner.refine(signal, candidate) {
            Ok(peak) => {
                log::trace!(
                    "{}: {} at {} -> {:.9} ({:.6})",
                    refiner.name(),
                    candidate.kind.as_str(),
                    candidate.peak.position,
                    peak.position,
                    peak.amplitude
                );
                refinement.peaks.push(candidate.kind, peak);
            }
            Err(error) => {
                log::warn!(
                    "{}: could not refine {} at {}: {}",
                    refiner.name(),
                    candidate.kind.as_str(),
                    candidate.peak.position,
                    error
                );
                refinement.failures.push(RefineFailure {
                    candidate: *candidate,
                    error,
                });
            }
        }
    }

    refinement.peaks.sort_by_position();
    refinement
}

/// Sample range of `points` samples centered on `index`, clipped to the signal
pub(crate) fn fit_window(len: usize, index: usize, points: usize) -> Range<usize> {
    let half = points / 2;
    index.saturating_sub(half)..(index + half + 1).min(len)
}
