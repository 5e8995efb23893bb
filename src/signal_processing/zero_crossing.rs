use super::smoothing::{WindowKind, smooth};
use crate::error::{Result, invalid};

/// Zero-crossing counter with pre-smoothing
///
/// Smooths the signal with a centered moving average and reports every
/// index `i` where the smoothed signal changes sign between `i` and `i + 1`.
///
/// A smoothed value of exactly zero takes the sign of the sample after it,
/// so a signal touching zero without crossing produces no crossing.
#[derive(Debug, Clone, Copy)]
pub struct ZeroCrossingCounter {
    window: usize,
    kind: WindowKind,
}

impl ZeroCrossingCounter {
    /// Create a new zero-crossing counter
    ///
    /// # Arguments
    /// * `window` - Smoothing window length (odd, >= 3)
    /// * `kind` - Smoothing window shape
    pub fn new(window: usize, kind: WindowKind) -> Result<Self> {
        if window < 3 || window % 2 == 0 {
            return Err(invalid(format!(
                "zero-crossing window must be odd and at least 3, got {}",
                window
            )));
        }
        Ok(Self { window, kind })
    }

    /// Find all sign changes of the smoothed signal
    ///
    /// Returns the ordered indices of the last sample before each crossing.
    pub fn find_all_crossings(&self, amplitudes: &[f64]) -> Result<Vec<usize>> {
        let smoothed = smooth(amplitudes, self.window, self.kind)?;

        // Resolve zeros to the sign of the following sample; a trailing run
        // of zeros counts as positive.
        let mut positive = vec![true; smoothed.len()];
        let mut next = true;
        for (i, &value) in smoothed.iter().enumerate().rev() {
            if value != 0.0 {
                next = value > 0.0;
            }
            positive[i] = next;
        }

        Ok(positive
            .windows(2)
            .enumerate()
            .filter_map(|(i, w)| (w[0] != w[1]).then_some(i))
            .collect())
    }
}

/// Indices where the smoothed signal changes sign
///
/// Convenience wrapper around [`ZeroCrossingCounter`].
pub fn zero_crossings(amplitudes: &[f64], window: usize, kind: WindowKind) -> Result<Vec<usize>> {
    ZeroCrossingCounter::new(window, kind)?.find_all_crossings(amplitudes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_crossing_detection() {
        // 0..20 radians is about 3.2 periods, so 6 sign changes
        let signal: Vec<f64> = (0..200).map(|i| (i as f64 * 0.1 + 0.05).sin()).collect();

        let crossings = zero_crossings(&signal, 3, WindowKind::Flat).unwrap();

        assert_eq!(crossings.len(), 6, "crossings: {:?}", crossings);
        for (n, &index) in crossings.iter().enumerate() {
            let expected = (n + 1) as f64 * PI / 0.1 - 0.5;
            assert!(
                (index as f64 - expected).abs() <= 1.0,
                "crossing {} at {}, expected near {}",
                n,
                index,
                expected
            );
        }
    }

    #[test]
    fn test_zero_is_assigned_following_sign() {
        // Touching zero and bouncing back is not a crossing
        let counter = ZeroCrossingCounter::new(3, WindowKind::Flat).unwrap();
        let crossings = counter
            .find_all_crossings(&[3.0, 3.0, 3.0, 0.0, 0.0, 0.0, 3.0, 3.0, 3.0])
            .unwrap();
        assert!(crossings.is_empty(), "crossings: {:?}", crossings);

        // A zero between opposite signs produces exactly one crossing
        let crossings = counter
            .find_all_crossings(&[3.0, 3.0, 3.0, 0.0, 0.0, 0.0, -3.0, -3.0, -3.0])
            .unwrap();
        assert_eq!(crossings.len(), 1);
    }

    #[test]
    fn test_noise_is_smoothed_away() {
        // Small alternating ripple around a positive level never crosses
        let signal: Vec<f64> = (0..50)
            .map(|i| 0.2 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        assert!(signal.iter().any(|&v| v < 0.0));

        let crossings = zero_crossings(&signal, 5, WindowKind::Flat).unwrap();
        assert!(crossings.is_empty());
    }

    #[test]
    fn test_window_validation() {
        assert!(ZeroCrossingCounter::new(0, WindowKind::Flat).is_err());
        assert!(ZeroCrossingCounter::new(4, WindowKind::Flat).is_err());
        assert!(zero_crossings(&[1.0, -1.0], 5, WindowKind::Flat).is_err());
    }
}
