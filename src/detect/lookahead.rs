use crate::config::LookaheadConfig;
use crate::error::{Result, invalid};
use crate::signal::{Candidate, Extremum, PeakSet, Signal, candidates_to_peaks};

/// Which extremum the scan is currently trying to confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Nothing confirmed yet; track both a maximum and a minimum
    Seeding,
    SeekingMax,
    SeekingMin,
}

impl ScanState {
    fn tracks(self, kind: Extremum) -> bool {
        match (self, kind) {
            (Self::Seeding, _) => true,
            (Self::SeekingMax, Extremum::Maximum) => true,
            (Self::SeekingMin, Extremum::Minimum) => true,
            _ => false,
        }
    }
}

/// Running extremum candidate
#[derive(Debug, Clone, Copy)]
struct Running {
    index: usize,
    value: f64,
}

impl Running {
    fn unset(value: f64) -> Self {
        Self { index: 0, value }
    }
}

/// Find local extrema with the lookahead/threshold scan
///
/// Returns maxima and minima ordered by position. See [`find_candidates`].
pub fn peakdetect(signal: &Signal, config: &LookaheadConfig) -> Result<PeakSet> {
    let candidates = find_candidates(signal, config)?;
    let peaks = candidates_to_peaks(&candidates);
    log::debug!(
        "lookahead scan ({} samples, lookahead {}): {} maxima, {} minima",
        signal.len(),
        config.lookahead,
        peaks.maxima.len(),
        peaks.minima.len()
    );
    Ok(peaks)
}

/// Find local extrema, keeping the sample index of each one
///
/// A single forward pass tracks a running maximum and minimum. A running
/// maximum is confirmed once the current sample has dropped more than
/// `delta` below it and none of the next `lookahead` samples (starting at
/// the current one) reaches it; the scan then only looks for a minimum, and
/// vice versa, so maxima and minima strictly alternate.
///
/// Extrema found within the first `lookahead` samples only seed the scan and
/// are not reported. Candidates still unconfirmed when fewer than
/// `lookahead` samples remain are dropped.
///
/// # Errors
/// `InvalidArgument` if `lookahead < 1`, `delta` is negative, or the signal
/// has at most `2 * lookahead` samples.
pub fn find_candidates(signal: &Signal, config: &LookaheadConfig) -> Result<Vec<Candidate>> {
    config.validate()?;
    let found = scan(signal.amplitudes(), config.lookahead, config.delta)?;
    Ok(found
        .into_iter()
        .map(|(index, kind)| Candidate::new(index, kind, signal.peak_at(index)))
        .collect())
}

fn scan(amplitudes: &[f64], lookahead: usize, delta: f64) -> Result<Vec<(usize, Extremum)>> {
    let length = amplitudes.len();
    if length <= 2 * lookahead {
        return Err(invalid(format!(
            "signal of {} samples is too short for lookahead {} (need more than {})",
            length,
            lookahead,
            2 * lookahead
        )));
    }

    let mut state = ScanState::Seeding;
    let mut max = Running::unset(f64::NEG_INFINITY);
    let mut min = Running::unset(f64::INFINITY);
    let mut found = Vec::new();

    for index in 0..length - lookahead {
        let y = amplitudes[index];
        let window = &amplitudes[index..index + lookahead];

        if state.tracks(Extremum::Maximum) && y > max.value {
            max = Running { index, value: y };
        }
        if state.tracks(Extremum::Minimum) && y < min.value {
            min = Running { index, value: y };
        }

        if state.tracks(Extremum::Maximum)
            && y < max.value - delta
            && window.iter().all(|&v| v < max.value)
        {
            found.push((max.index, Extremum::Maximum));
            state = ScanState::SeekingMin;
            min = Running { index, value: y };
            continue;
        }

        if state.tracks(Extremum::Minimum)
            && y > min.value + delta
            && window.iter().all(|&v| v > min.value)
        {
            found.push((min.index, Extremum::Minimum));
            state = ScanState::SeekingMax;
            max = Running { index, value: y };
        }
    }

    // Extrema inside the first window are artefacts of where the scan started
    found.retain(|&(index, _)| index >= lookahead);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn config(lookahead: usize, delta: f64) -> LookaheadConfig {
        LookaheadConfig { lookahead, delta }
    }

    fn sine(len: usize, period: f64) -> Signal {
        Signal::from_amplitudes((0..len).map(|i| (2.0 * PI * i as f64 / period).sin()).collect())
            .unwrap()
    }

    #[test]
    fn test_sine_peaks() {
        let signal = sine(1000, 100.0);
        let peaks = peakdetect(&signal, &config(20, 0.0)).unwrap();

        assert_eq!(peaks.maxima.len(), 10);
        assert_eq!(peaks.minima.len(), 10);
        for (k, peak) in peaks.maxima.iter().enumerate() {
            assert_eq!(peak.position, (25 + 100 * k) as f64);
            assert!((peak.amplitude - 1.0).abs() < 1e-12);
        }
        for (k, peak) in peaks.minima.iter().enumerate() {
            assert_eq!(peak.position, (75 + 100 * k) as f64);
            assert!((peak.amplitude + 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_maxima_and_minima_alternate() {
        let amplitudes: Vec<f64> = (0..2000)
            .map(|i| {
                let t = i as f64;
                (t / 37.0).sin() + 0.6 * (t / 11.0).cos() + 0.2 * (t / 5.0).sin()
            })
            .collect();
        let signal = Signal::from_amplitudes(amplitudes).unwrap();
        let candidates = find_candidates(&signal, &config(4, 0.0)).unwrap();

        assert!(candidates.len() > 10);
        for pair in candidates.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind, "same-sign neighbours: {:?}", pair);
            assert!(pair[0].index < pair[1].index);
        }
    }

    #[test]
    fn test_rejects_short_signal() {
        let signal = sine(40, 10.0);
        assert!(matches!(
            peakdetect(&signal, &config(20, 0.0)),
            Err(crate::PeakError::InvalidArgument(_))
        ));

        let signal = sine(41, 10.0);
        assert!(peakdetect(&signal, &config(20, 0.0)).is_ok());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let signal = sine(100, 10.0);
        assert!(peakdetect(&signal, &config(0, 0.0)).is_err());
        assert!(peakdetect(&signal, &config(5, -1.0)).is_err());
    }

    #[test]
    fn test_delta_suppresses_ripple() {
        let amplitudes: Vec<f64> = (0..1000)
            .map(|i| {
                let t = i as f64;
                (2.0 * PI * t / 100.0).sin() + 0.1 * (2.0 * PI * t / 8.0).sin()
            })
            .collect();
        let signal = Signal::from_amplitudes(amplitudes).unwrap();

        let noisy = peakdetect(&signal, &config(2, 0.0)).unwrap();
        assert!(noisy.maxima.len() > 10, "ripple should produce extra maxima");

        let clean = peakdetect(&signal, &config(20, 0.3)).unwrap();
        assert_eq!(clean.maxima.len(), 10);
        for (k, peak) in clean.maxima.iter().enumerate() {
            let expected = (25 + 100 * k) as f64;
            assert!(
                (peak.position - expected).abs() <= 8.0,
                "maximum {} at {}, expected near {}",
                k,
                peak.position,
                expected
            );
        }
    }

    #[test]
    fn test_seed_extremum_not_reported() {
        // A cosine starts on a maximum; it only seeds the scan
        let amplitudes: Vec<f64> = (0..1000)
            .map(|i| (2.0 * PI * i as f64 / 100.0).cos())
            .collect();
        let signal = Signal::from_amplitudes(amplitudes).unwrap();
        let peaks = peakdetect(&signal, &config(20, 0.0)).unwrap();

        assert_eq!(peaks.maxima[0].position, 100.0);
        assert_eq!(peaks.minima[0].position, 50.0);
    }

    #[test]
    fn test_trailing_candidate_dropped() {
        // Rising ramp at the end never gets confirmed as a maximum
        let mut amplitudes: Vec<f64> = (0..300)
            .map(|i| (2.0 * PI * i as f64 / 100.0).sin())
            .collect();
        amplitudes.extend((0..50).map(|i| i as f64 * 0.1));
        let signal = Signal::from_amplitudes(amplitudes).unwrap();
        let peaks = peakdetect(&signal, &config(20, 0.0)).unwrap();

        assert!(peaks.maxima.iter().all(|p| p.position < 300.0));
    }

    #[test]
    fn test_flat_signal_has_no_peaks() {
        let signal = Signal::from_amplitudes(vec![1.0; 100]).unwrap();
        let peaks = peakdetect(&signal, &config(10, 0.0)).unwrap();
        assert!(peaks.is_empty());
    }
}
