use std::f64::consts::PI;

use serde::Deserialize;

use crate::error::{Result, invalid};

/// Window shape used for the smoothing average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Plain moving average (all weights equal)
    #[default]
    Flat,
    Hanning,
    Hamming,
    Bartlett,
    Blackman,
}

impl WindowKind {
    /// Window weights of length `len`, normalized to sum to one
    pub fn weights(self, len: usize) -> Vec<f64> {
        let span = (len.max(2) - 1) as f64;
        let mut weights: Vec<f64> = (0..len)
            .map(|n| {
                let n = n as f64;
                match self {
                    Self::Flat => 1.0,
                    Self::Hanning => 0.5 - 0.5 * (2.0 * PI * n / span).cos(),
                    Self::Hamming => 0.54 - 0.46 * (2.0 * PI * n / span).cos(),
                    Self::Bartlett => 1.0 - (2.0 * n / span - 1.0).abs(),
                    Self::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * n / span).cos()
                            + 0.08 * (4.0 * PI * n / span).cos()
                    }
                }
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        for w in weights.iter_mut() {
            *w /= sum;
        }
        weights
    }
}

/// Centered windowed moving average
///
/// Each output sample is the weighted mean of the `window` samples centered
/// on it. Samples beyond the edges are mirrored about the first/last sample,
/// so the output has the same length as the input and is not shifted.
///
/// # Arguments
/// * `data` - Samples to smooth
/// * `window` - Window length (odd, >= 3, <= data length)
/// * `kind` - Window shape
pub fn smooth(data: &[f64], window: usize, kind: WindowKind) -> Result<Vec<f64>> {
    if window < 3 || window % 2 == 0 {
        return Err(invalid(format!(
            "smoothing window must be odd and at least 3, got {}",
            window
        )));
    }
    if window > data.len() {
        return Err(invalid(format!(
            "smoothing window ({}) exceeds signal length ({})",
            window,
            data.len()
        )));
    }

    let weights = kind.weights(window);
    let half = (window / 2) as isize;
    let last = data.len() as isize - 1;
    let mirrored = |k: isize| -> f64 {
        let k = if k < 0 {
            -k
        } else if k > last {
            2 * last - k
        } else {
            k
        };
        data[k as usize]
    };

    Ok((0..data.len() as isize)
        .map(|i| {
            weights
                .iter()
                .enumerate()
                .map(|(j, w)| w * mirrored(i + j as isize - half))
                .sum()
        })
        .collect())
}
