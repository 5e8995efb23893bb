pub mod math;
pub mod smoothing;
pub mod zero_crossing;

pub use math::{center_pad, interpolate_index, linspace, median, next_pow2_exponent};
pub use smoothing::{WindowKind, smooth};
pub use zero_crossing::{ZeroCrossingCounter, zero_crossings};
