//! Numeric constants for fitting stability
//!
//! These constants define thresholds and damping values used by the
//! refiners to solve and reject degenerate fits.

/// Absolute cutoff for singular values of the (rescaled) parabola design
/// matrix. Smaller singular values are treated as zero.
pub const SINGULAR_VALUE_EPSILON: f64 = 1e-12;

/// Parabola curvature (over the rescaled window) below this fraction of the
/// largest sample magnitude is rounding noise; the fit is treated as flat.
pub const CURVATURE_EPSILON: f64 = 1e-10;

/// Damping schedule for the Levenberg-Marquardt solver.
pub const LM_LAMBDA_INITIAL: f64 = 1e-3;
pub const LM_LAMBDA_UP: f64 = 10.0;
pub const LM_LAMBDA_DOWN: f64 = 0.1;
pub const LM_LAMBDA_MIN: f64 = 1e-12;
/// Damping beyond which no downhill step exists; the fit has stalled at
/// a minimum.
pub const LM_LAMBDA_MAX: f64 = 1e16;

/// Cost below this fraction of the data energy counts as an exact fit.
pub const EXACT_FIT_RATIO: f64 = 1e-24;

/// Minimum number of samples needed to fit a three-parameter model.
pub const MIN_FIT_SAMPLES: usize = 3;
