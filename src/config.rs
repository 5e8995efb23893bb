//! Configuration for the peak detectors.
//!
//! Every detector has its own parameter struct with documented defaults.
//! `DetectorConfig` aggregates them and can be loaded from TOML, where any
//! subset of fields may be given:
//!
//! ```
//! use peakdetect::config::{DetectorConfig, Method};
//!
//! let config = DetectorConfig::from_toml_str(
//!     r#"
//!     method = "parabola"
//!     [lookahead]
//!     lookahead = 100
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.method, Method::Parabola);
//! assert_eq!(config.lookahead.lookahead, 100);
//! assert_eq!(config.parabola.points, 31);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PeakError, Result, invalid};
use crate::signal_processing::WindowKind;

/// Oscillation frequency specification
///
/// Can be specified as either a frequency or a period. Frequencies are in
/// cycles per position unit, so `50hz` means 50 cycles per second when
/// positions are seconds.
///
/// # Parsing formats
/// - `50` or `50hz` - frequency (no suffix or explicit)
/// - `0.02s`, `20ms`, `20000us` or `20000μs` - period
///
/// # Example
/// ```
/// use peakdetect::config::Frequency;
///
/// let freq: Frequency = "20ms".parse().unwrap();
/// assert!((freq.as_hz() - 50.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency(f64);

impl Frequency {
    /// Create from frequency in Hz
    pub fn from_hz(hz: f64) -> Self {
        Self(hz)
    }

    /// Create from period in seconds
    pub fn from_period_secs(secs: f64) -> Self {
        Self(1.0 / secs)
    }

    /// Get frequency in Hz
    pub fn as_hz(&self) -> f64 {
        self.0
    }

    /// Get period in seconds
    pub fn as_period_secs(&self) -> f64 {
        1.0 / self.0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}hz", self.0)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        // Period suffixes, longest first so "ms" is not read as "s"
        for (suffix, scale) in [("ms", 1e-3), ("us", 1e-6), ("μs", 1e-6), ("s", 1.0)] {
            if let Some(num) = s.strip_suffix(suffix) {
                let period: f64 = num
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid period: {}", s))?;
                if !(period > 0.0) {
                    return Err("period must be positive".to_string());
                }
                return Ok(Self::from_period_secs(period * scale));
            }
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid frequency: {}", s))?;
        if !(hz > 0.0) || !hz.is_finite() {
            return Err("frequency must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Detection algorithm
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Lookahead/threshold scan on the raw samples
    #[default]
    Lookahead,
    /// Band-limited upsampling followed by the lookahead scan
    Fft,
    /// Lookahead scan refined by a local parabola fit
    Parabola,
    /// Lookahead scan refined by a local sine fit with free frequency
    Sine,
    /// Lookahead scan refined by a local sine fit with fixed frequency
    SineLocked,
    /// Cubic-spline upsampling followed by the lookahead scan
    Spline,
    /// Lookahead scan with the window derived from the zero-crossing period
    ZeroCrossing,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Self::Lookahead => "lookahead",
            Self::Fft => "fft",
            Self::Parabola => "parabola",
            Self::Sine => "sine",
            Self::SineLocked => "sine-locked",
            Self::Spline => "spline",
            Self::ZeroCrossing => "zero-crossing",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// System-wide detector configuration
///
/// Use `DetectorConfig::default()` for sensible defaults.
///
/// # Example
/// ```
/// use peakdetect::config::DetectorConfig;
///
/// let mut config = DetectorConfig::default();
/// config.lookahead.delta = 0.5;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Algorithm used by [`crate::detect::detect`]
    pub method: Method,
    /// Primary scan parameters (also used to find rough candidates)
    pub lookahead: LookaheadConfig,
    /// FFT upsampling parameters
    pub fft: FftConfig,
    /// Parabola refiner parameters
    pub parabola: ParabolaConfig,
    /// Sine refiner parameters
    pub sine: SineConfig,
    /// Spline parameters
    pub spline: SplineConfig,
    /// Zero-crossing period detector parameters
    pub zero_crossing: ZeroCrossingConfig,
}

/// Primary scan configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookaheadConfig {
    /// Samples after a candidate that must stay below (above) it before it
    /// is confirmed as a maximum (minimum)
    pub lookahead: usize,
    /// Minimum drop (rise) after a candidate before it can be confirmed.
    /// Raise above 0 for noisy signals.
    pub delta: f64,
}

/// FFT upsampling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FftConfig {
    /// Minimum ratio of upsampled to original length (>= 1)
    pub pad_multiplier: usize,
    /// Lookahead in original-sample units; scaled by the upsampling factor
    pub lookahead: usize,
    /// Smoothing window for the zero crossings used to trim to whole periods
    pub crossing_window: usize,
}

/// Parabola refiner configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParabolaConfig {
    /// Samples in each fit window (even values are rounded up to odd)
    pub points: usize,
}

/// Sine refiner configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SineConfig {
    /// Samples in each fit window (even values are rounded up to odd)
    pub points: usize,
    /// Fixed frequency for the locked variant, in cycles per position unit.
    /// When unset the frequency is estimated from the rough peak spacing.
    pub frequency: Option<f64>,
    /// Solver iteration budget per candidate
    pub max_iterations: usize,
    /// Relative cost improvement below which the solver stops
    pub tolerance: f64,
}

/// Spline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SplineConfig {
    /// Extra interpolated points per original sample for dense resampling
    pub upsample: usize,
    /// Samples in each local refinement window
    pub points: usize,
}

/// Zero-crossing period detector configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZeroCrossingConfig {
    /// Smoothing window length (odd, >= 3)
    pub window: usize,
    /// Smoothing window shape
    pub window_kind: WindowKind,
    /// Delta passed on to the primary scan
    pub delta: f64,
    /// Lookahead as a fraction of the estimated period, in (0, 0.5]
    pub lookahead_fraction: f64,
}

impl DetectorConfig {
    /// Parse a configuration from TOML; missing fields keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| PeakError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text).map_err(|e| match e {
            PeakError::Config(msg) => {
                PeakError::Config(format!("{}: {}", path.as_ref().display(), msg))
            }
            other => other,
        })
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.lookahead.validate()?;
        self.fft.validate()?;
        self.parabola.validate()?;
        self.sine.validate()?;
        self.spline.validate()?;
        self.zero_crossing.validate()
    }
}

impl LookaheadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lookahead < 1 {
            return Err(invalid("lookahead must be at least 1"));
        }
        if !(self.delta >= 0.0) || !self.delta.is_finite() {
            return Err(invalid(format!(
                "delta must be a non-negative number, got {}",
                self.delta
            )));
        }
        Ok(())
    }
}

impl FftConfig {
    pub fn validate(&self) -> Result<()> {
        if self.pad_multiplier < 1 {
            return Err(invalid("padding multiplier must be at least 1"));
        }
        if self.lookahead < 1 {
            return Err(invalid("FFT lookahead must be at least 1"));
        }
        validate_window(self.crossing_window)
    }
}

impl ParabolaConfig {
    pub fn validate(&self) -> Result<()> {
        validate_points(self.points)
    }
}

impl SineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_points(self.points)?;
        if let Some(frequency) = self.frequency {
            if !(frequency > 0.0) || !frequency.is_finite() {
                return Err(invalid(format!(
                    "locked frequency must be positive, got {}",
                    frequency
                )));
            }
        }
        if self.max_iterations < 1 {
            return Err(invalid("max_iterations must be at least 1"));
        }
        if !(self.tolerance > 0.0) {
            return Err(invalid("tolerance must be positive"));
        }
        Ok(())
    }
}

impl SplineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.upsample < 1 {
            return Err(invalid("spline upsample must be at least 1"));
        }
        validate_points(self.points)
    }
}

impl ZeroCrossingConfig {
    pub fn validate(&self) -> Result<()> {
        validate_window(self.window)?;
        if !(self.delta >= 0.0) || !self.delta.is_finite() {
            return Err(invalid(format!(
                "delta must be a non-negative number, got {}",
                self.delta
            )));
        }
        if !(self.lookahead_fraction > 0.0 && self.lookahead_fraction <= 0.5) {
            return Err(invalid(format!(
                "lookahead_fraction must be in (0, 0.5], got {}",
                self.lookahead_fraction
            )));
        }
        Ok(())
    }
}

fn validate_points(points: usize) -> Result<()> {
    if points < 3 {
        return Err(invalid(format!(
            "fit window must contain at least 3 points, got {}",
            points
        )));
    }
    Ok(())
}

fn validate_window(window: usize) -> Result<()> {
    if window < 3 || window % 2 == 0 {
        return Err(invalid(format!(
            "smoothing window must be odd and at least 3, got {}",
            window
        )));
    }
    Ok(())
}

/// Round an even fit window up to the next odd size
pub(crate) fn odd_points(points: usize) -> usize {
    points + 1 - points % 2
}

impl Default for LookaheadConfig {
    fn default() -> Self {
        Self {
            lookahead: 200,
            delta: 0.0,
        }
    }
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            pad_multiplier: 20,
            lookahead: 25,
            crossing_window: 11,
        }
    }
}

impl Default for ParabolaConfig {
    fn default() -> Self {
        Self { points: 31 }
    }
}

impl Default for SineConfig {
    fn default() -> Self {
        Self {
            points: 31,
            frequency: None,
            max_iterations: 200,
            tolerance: 1e-12,
        }
    }
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            upsample: 20,
            points: 31,
        }
    }
}

impl Default for ZeroCrossingConfig {
    fn default() -> Self {
        Self {
            window: 11,
            window_kind: WindowKind::Flat,
            delta: 0.0,
            lookahead_fraction: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_from_hz() {
        let freq: Frequency = "50".parse().unwrap();
        assert!((freq.as_hz() - 50.0).abs() < 1e-12);

        let freq: Frequency = "50Hz".parse().unwrap();
        assert!((freq.as_hz() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_from_period() {
        let freq: Frequency = "20ms".parse().unwrap();
        assert!((freq.as_hz() - 50.0).abs() < 1e-9);

        let freq: Frequency = "0.02s".parse().unwrap();
        assert!((freq.as_hz() - 50.0).abs() < 1e-9);

        let freq: Frequency = "20000μs".parse().unwrap();
        assert!((freq.as_period_secs() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_frequency_invalid() {
        assert!("abc".parse::<Frequency>().is_err());
        assert!("-50hz".parse::<Frequency>().is_err());
        assert!("0ms".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_overrides() {
        let config = DetectorConfig::from_toml_str(
            r#"
            method = "sine-locked"
            [sine]
            frequency = 50.0
            [zero_crossing]
            window_kind = "hanning"
            "#,
        )
        .unwrap();
        assert_eq!(config.method, Method::SineLocked);
        assert_eq!(config.sine.frequency, Some(50.0));
        assert_eq!(config.sine.points, 31);
        assert_eq!(config.zero_crossing.window_kind, WindowKind::Hanning);
        assert_eq!(config.lookahead.lookahead, 200);
    }

    #[test]
    fn test_toml_rejects_invalid_values() {
        let result = DetectorConfig::from_toml_str("[lookahead]\nlookahead = 0\n");
        assert!(matches!(result, Err(PeakError::InvalidArgument(_))));

        let result = DetectorConfig::from_toml_str("method = \"bogus\"\n");
        assert!(matches!(result, Err(PeakError::Config(_))));
    }

    #[test]
    fn test_odd_points() {
        assert_eq!(odd_points(31), 31);
        assert_eq!(odd_points(30), 31);
        assert_eq!(odd_points(3), 3);
    }
}
