//! Peak detectors built on the lookahead scan
//!
//! Every detector reports maxima and minima as separate position-ordered
//! lists. [`detect`] selects one from a [`DetectorConfig`].

pub mod fft;
pub mod lookahead;
pub mod zero_crossing;

pub use fft::{peakdetect_fft, upsample};
pub use lookahead::{find_candidates, peakdetect};
pub use zero_crossing::{estimate_period, peakdetect_zero_crossing};

use crate::config::{DetectorConfig, Method};
use crate::error::Result;
use crate::refine::{
    RefineFailure, Refinement, peakdetect_parabola, peakdetect_sine, peakdetect_sine_locked,
    peakdetect_spline,
};
use crate::signal::{PeakSet, Signal};

/// Result of a detection run
///
/// `failures` is only populated by detectors that can give up on individual
/// candidates (the sine fits); the other detectors always leave it empty.
#[derive(Debug, Default)]
pub struct Detection {
    pub peaks: PeakSet,
    pub failures: Vec<RefineFailure>,
}

impl From<PeakSet> for Detection {
    fn from(peaks: PeakSet) -> Self {
        Self {
            peaks,
            failures: Vec::new(),
        }
    }
}

impl From<Refinement> for Detection {
    fn from(refinement: Refinement) -> Self {
        Self {
            peaks: refinement.peaks,
            failures: refinement.failures,
        }
    }
}

/// Run the detector selected by `config.method`
pub fn detect(signal: &Signal, config: &DetectorConfig) -> Result<Detection> {
    log::debug!("detecting peaks in {} samples with {:?}", signal.len(), config.method);

    let detection = match config.method {
        Method::Lookahead => peakdetect(signal, &config.lookahead)?.into(),
        Method::Fft => peakdetect_fft(signal, &config.fft)?.into(),
        Method::Parabola => peakdetect_parabola(signal, &config.lookahead, &config.parabola)?.into(),
        Method::Sine => peakdetect_sine(signal, &config.lookahead, &config.sine)?.into(),
        Method::SineLocked => {
            peakdetect_sine_locked(signal, &config.lookahead, &config.sine)?.into()
        }
        Method::Spline => peakdetect_spline(signal, &config.lookahead, &config.spline)?.into(),
        Method::ZeroCrossing => peakdetect_zero_crossing(signal, &config.zero_crossing)?.into(),
    };
    Ok(detection)
}
