use serde::Serialize;

use crate::error::{Result, invalid};

/// A sampled one-dimensional signal
///
/// Holds amplitudes together with the position (time, distance, ...) of
/// each sample. Positions must be non-decreasing; detectors read the signal
/// but never modify it.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    positions: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl Signal {
    /// Create a signal from explicit positions and amplitudes
    ///
    /// # Arguments
    /// * `positions` - Sample positions, non-decreasing
    /// * `amplitudes` - Sample amplitudes, same length as `positions`
    pub fn new(positions: Vec<f64>, amplitudes: Vec<f64>) -> Result<Self> {
        if positions.len() != amplitudes.len() {
            return Err(invalid(format!(
                "positions ({}) and amplitudes ({}) must have the same length",
                positions.len(),
                amplitudes.len()
            )));
        }
        if let Some(i) = amplitudes.iter().position(|a| !a.is_finite()) {
            return Err(invalid(format!("amplitude at index {} is not finite", i)));
        }
        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(invalid(format!("position at index {} is not finite", i)));
        }
        if let Some(i) = positions.windows(2).position(|w| w[1] < w[0]) {
            return Err(invalid(format!(
                "positions must be non-decreasing (index {} > index {})",
                i,
                i + 1
            )));
        }

        Ok(Self {
            positions,
            amplitudes,
        })
    }

    /// Create a signal whose positions are the sample indices `0..N-1`
    pub fn from_amplitudes(amplitudes: Vec<f64>) -> Result<Self> {
        let positions = (0..amplitudes.len()).map(|i| i as f64).collect();
        Self::new(positions, amplitudes)
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Sample at `index` as a peak value
    pub fn peak_at(&self, index: usize) -> Peak {
        Peak::new(self.positions[index], self.amplitudes[index])
    }

    /// Whether positions strictly increase (required for spline fitting)
    pub fn is_strictly_increasing(&self) -> bool {
        self.positions.windows(2).all(|w| w[1] > w[0])
    }

    /// Index of the sample whose position is closest to `position`
    pub fn nearest_index(&self, position: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let upper = self.positions.partition_point(|&p| p < position);
        if upper == 0 {
            return Some(0);
        }
        if upper == self.len() {
            return Some(self.len() - 1);
        }
        let below = position - self.positions[upper - 1];
        let above = self.positions[upper] - position;
        Some(if below <= above { upper - 1 } else { upper })
    }
}

/// A detected local extremum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub position: f64,
    pub amplitude: f64,
}

impl Peak {
    pub fn new(position: f64, amplitude: f64) -> Self {
        Self {
            position,
            amplitude,
        }
    }
}

/// Whether a peak is a local maximum or a local minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extremum {
    Maximum,
    Minimum,
}

impl Extremum {
    /// +1 for maxima, -1 for minima
    pub fn sign(self) -> f64 {
        match self {
            Self::Maximum => 1.0,
            Self::Minimum => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Maximum => "max",
            Self::Minimum => "min",
        }
    }
}

/// Result of a detection call: maxima and minima ordered by position
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeakSet {
    pub maxima: Vec<Peak>,
    pub minima: Vec<Peak>,
}

impl PeakSet {
    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty() && self.minima.is_empty()
    }

    pub fn len(&self) -> usize {
        self.maxima.len() + self.minima.len()
    }

    /// Peaks of the given kind
    pub fn of_kind(&self, kind: Extremum) -> &[Peak] {
        match kind {
            Extremum::Maximum => &self.maxima,
            Extremum::Minimum => &self.minima,
        }
    }

    pub(crate) fn push(&mut self, kind: Extremum, peak: Peak) {
        match kind {
            Extremum::Maximum => self.maxima.push(peak),
            Extremum::Minimum => self.minima.push(peak),
        }
    }

    pub(crate) fn sort_by_position(&mut self) {
        self.maxima.sort_by(|a, b| a.position.total_cmp(&b.position));
        self.minima.sort_by(|a, b| a.position.total_cmp(&b.position));
    }
}

/// A rough peak together with the sample it was taken from
///
/// Refiners use the index to select their fit window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub index: usize,
    pub kind: Extremum,
    pub peak: Peak,
}

impl Candidate {
    pub fn new(index: usize, kind: Extremum, peak: Peak) -> Self {
        Self { index, kind, peak }
    }
}

/// Collect candidates into a position-ordered peak set
pub(crate) fn candidates_to_peaks(candidates: &[Candidate]) -> PeakSet {
    let mut peaks = PeakSet::default();
    for candidate in candidates {
        peaks.push(candidate.kind, candidate.peak);
    }
    peaks
}

/// Recover sample-indexed candidates from a peak set measured on `signal`
///
/// Each peak is mapped to the nearest sample by position.
pub fn candidates_from_peaks(signal: &Signal, peaks: &PeakSet) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = [Extremum::Maximum, Extremum::Minimum]
        .into_iter()
        .flat_map(|kind| {
            peaks.of_kind(kind).iter().filter_map(move |peak| {
                signal
                    .nearest_index(peak.position)
                    .map(|index| Candidate::new(index, kind, *peak))
            })
        })
        .collect();
    candidates.sort_by_key(|c| c.index);
    candidates
}
