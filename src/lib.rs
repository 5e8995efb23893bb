//! Peak detection for sampled one-dimensional signals.
//!
//! The [`detect::peakdetect`] lookahead scan finds alternating local maxima
//! and minima. The other detectors build on it, either by scanning an
//! upsampled copy of the signal (FFT, spline) or by fitting a local model
//! around each rough candidate (parabola, sine).
//!
//! ```
//! use peakdetect::{LookaheadConfig, Signal, peakdetect};
//!
//! let samples: Vec<f64> = (0..1000)
//!     .map(|i| (i as f64 * std::f64::consts::TAU / 100.0).sin())
//!     .collect();
//! let signal = Signal::from_amplitudes(samples).unwrap();
//! let config = LookaheadConfig { lookahead: 20, delta: 0.0 };
//!
//! let peaks = peakdetect(&signal, &config).unwrap();
//! assert_eq!(peaks.maxima.len(), 10);
//! assert_eq!(peaks.maxima[0].position, 25.0);
//! ```

pub mod config;
pub mod constants;
pub mod detect;
pub mod error;
pub mod refine;
pub mod signal;
pub mod signal_processing;

pub use config::{
    DetectorConfig, FftConfig, Frequency, LookaheadConfig, Method, ParabolaConfig, SineConfig,
    SplineConfig, ZeroCrossingConfig,
};
pub use detect::{
    Detection, detect, peakdetect, peakdetect_fft, peakdetect_zero_crossing,
};
pub use error::{PeakError, Result};
pub use refine::{
    Refinement, peakdetect_parabola, peakdetect_sine, peakdetect_sine_locked, peakdetect_spline,
    refine_parabola, refine_sine, refine_spline,
};
pub use signal::{Candidate, Extremum, Peak, PeakSet, Signal};
pub use signal_processing::{center_pad, next_pow2_exponent, zero_crossings};
