use crate::error::{PeakError, Result, invalid};

/// Smallest exponent `k` such that `2^k >= n`
///
/// `n = 0` is treated like `n = 1` and yields 0.
pub fn next_pow2_exponent(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

/// Zero-pad a sequence in its middle up to a power-of-two length
///
/// The target length is `2^next_pow2_exponent(len * multiplier)`. The pad
/// block is inserted between `data[..len / 2]` and `data[len / 2..]`, which
/// for a spectrum places the new bins at the highest frequencies.
///
/// # Arguments
/// * `data` - Sequence to pad
/// * `multiplier` - Minimum growth factor (>= 1)
pub fn center_pad<T: Clone + Default>(data: &[T], multiplier: usize) -> Result<Vec<T>> {
    if multiplier < 1 {
        return Err(invalid("padding multiplier must be at least 1"));
    }
    if data.is_empty() {
        return Err(PeakError::InsufficientData {
            what: "samples to pad",
            needed: 1,
            available: 0,
        });
    }

    let scaled = data
        .len()
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("padded length overflows"))?;
    let exponent = next_pow2_exponent(scaled);
    if exponent >= usize::BITS {
        return Err(invalid("padded length overflows"));
    }
    let target = 1usize << exponent;

    let half = data.len() / 2;
    let mut padded = Vec::with_capacity(target);
    padded.extend_from_slice(&data[..half]);
    padded.resize(half + target - data.len(), T::default());
    padded.extend_from_slice(&data[half..]);
    Ok(padded)
}

/// Median of a set of values (mean of the two middle values for even counts)
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Look up a position at a fractional sample index
///
/// Interpolates linearly between neighbouring positions and extrapolates
/// with the first/last spacing outside the sampled range.
pub fn interpolate_index(positions: &[f64], fractional_index: f64) -> f64 {
    match positions.len() {
        0 => fractional_index,
        1 => positions[0] + fractional_index,
        n => {
            let base = (fractional_index.floor().max(0.0) as usize).min(n - 2);
            let fraction = fractional_index - base as f64;
            positions[base] + fraction * (positions[base + 1] - positions[base])
        }
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_pow2_exponent() {
        assert_eq!(1 << next_pow2_exponent(1000), 1024);
        assert_eq!(next_pow2_exponent(1), 0);
        assert_eq!(next_pow2_exponent(2), 1);
        assert_eq!(next_pow2_exponent(1024), 10);
        assert_eq!(next_pow2_exponent(1025), 11);
    }

    #[test]
    fn test_next_pow2_exponent_bounds() {
        for n in 1..5000usize {
            let k = next_pow2_exponent(n);
            assert!(1usize << k >= n, "2^{} < {}", k, n);
            if k > 0 {
                assert!(1usize << (k - 1) < n, "2^{} >= {}", k - 1, n);
            }
        }
    }

    #[test]
    fn test_center_pad() {
        let data = [1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1];
        let padded = center_pad(&data, 2).unwrap();

        // 11 * 2 = 22 -> 32 samples, 21 zeros inserted after the first 5
        let mut expected = vec![1, 2, 3, 4, 5];
        expected.extend(std::iter::repeat_n(0, 21));
        expected.extend([6, 5, 4, 3, 2, 1]);
        assert_eq!(padded, expected);
    }

    #[test]
    fn test_center_pad_preserves_halves() {
        for len in 1..100usize {
            let data: Vec<f64> = (1..=len).map(|v| v as f64).collect();
            let padded = center_pad(&data, 3).unwrap();
            assert_eq!(padded.len(), 1 << next_pow2_exponent(len * 3));

            let half = len / 2;
            let tail = len - half;
            assert_eq!(&padded[..half], &data[..half]);
            assert_eq!(&padded[padded.len() - tail..], &data[half..]);
            assert!(
                padded[half..padded.len() - tail].iter().all(|&v| v == 0.0),
                "pad block must be zero"
            );
        }
    }

    #[test]
    fn test_center_pad_rejects_zero_multiplier() {
        assert!(matches!(
            center_pad(&[1.0, 2.0], 0),
            Err(PeakError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_interpolate_index() {
        let positions = [0.0, 1.0, 3.0];
        assert!((interpolate_index(&positions, 0.5) - 0.5).abs() < 1e-12);
        assert!((interpolate_index(&positions, 1.5) - 2.0).abs() < 1e-12);
        // Extrapolates with the last spacing
        assert!((interpolate_index(&positions, 2.5) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_linspace() {
        let values = linspace(0.0, 1.0, 5);
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
