use super::lookahead::peakdetect;
use crate::config::{LookaheadConfig, ZeroCrossingConfig};
use crate::error::{PeakError, Result};
use crate::signal::{PeakSet, Signal};
use crate::signal_processing::{median, zero_crossings};

/// Find peaks with a lookahead derived from the zero-crossing period
///
/// The dominant period is estimated from the smoothed zero crossings and the
/// primary scan runs with `lookahead = max(1, round(period * fraction))`.
///
/// # Errors
/// `InsufficientData` when the signal has fewer than two zero crossings.
pub fn peakdetect_zero_crossing(signal: &Signal, config: &ZeroCrossingConfig) -> Result<PeakSet> {
    config.validate()?;

    let period = estimate_period(signal.amplitudes(), config)?;
    let scan = LookaheadConfig {
        lookahead: ((period * config.lookahead_fraction).round() as usize).max(1),
        delta: config.delta,
    };
    log::debug!(
        "zero-crossing period {:.3} samples, lookahead {}",
        period,
        scan.lookahead
    );

    peakdetect(signal, &scan)
}

/// Dominant period in samples
///
/// Twice the median spacing between consecutive zero crossings. The median
/// keeps the estimate stable when noise adds or removes a few crossings.
pub fn estimate_period(amplitudes: &[f64], config: &ZeroCrossingConfig) -> Result<f64> {
    let crossings = zero_crossings(amplitudes, config.window, config.window_kind)?;
    let insufficient = || PeakError::InsufficientData {
        what: "zero crossings",
        needed: 2,
        available: crossings.len(),
    };
    if crossings.len() < 2 {
        return Err(insufficient());
    }

    let spacings: Vec<f64> = crossings.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    median(&spacings)
        .map(|half_period| 2.0 * half_period)
        .ok_or_else(insufficient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(len: usize, period: f64) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * i as f64 / period).sin())
            .collect()
    }

    #[test]
    fn test_period_estimate() {
        let period = estimate_period(&sine(1000, 100.0), &ZeroCrossingConfig::default()).unwrap();
        assert!((period - 100.0).abs() <= 2.0, "period {}", period);
    }

    #[test]
    fn test_period_ignores_odd_spacing() {
        // One glitch adds a pair of extra crossings
        let mut amplitudes = sine(2000, 100.0);
        for v in &mut amplitudes[620..640] {
            *v = -v.abs() - 0.5;
        }
        let period = estimate_period(&amplitudes, &ZeroCrossingConfig::default()).unwrap();
        assert!((period - 100.0).abs() <= 2.0, "period {}", period);
    }

    #[test]
    fn test_sine_peaks() {
        let signal = Signal::from_amplitudes(sine(1000, 100.0)).unwrap();
        let peaks = peakdetect_zero_crossing(&signal, &ZeroCrossingConfig::default()).unwrap();

        assert_eq!(peaks.maxima.len(), 10);
        assert_eq!(peaks.minima.len(), 10);
        for (k, peak) in peaks.maxima.iter().enumerate() {
            assert_eq!(peak.position, (25 + 100 * k) as f64);
        }
    }

    #[test]
    fn test_no_crossings() {
        let amplitudes: Vec<f64> = sine(500, 100.0).iter().map(|v| v + 2.0).collect();
        let signal = Signal::from_amplitudes(amplitudes).unwrap();
        assert!(matches!(
            peakdetect_zero_crossing(&signal, &ZeroCrossingConfig::default()),
            Err(PeakError::InsufficientData { available: 0, .. })
        ));
    }
}
