//! Grid reconstruction for rectified breadboard views.
//!
//! Algorithm:
//! 1. Grayscale blur, inverted adaptive binarization, morphological opening.
//! 2. Row/column foreground-count projections.
//! 3. Gaussian-weighted smoothing of each projection.
//! 4. Peak detection with a height floor and a minimum separation.
//! 5. Expected-count fallback: too few peaks and the lines are synthesized
//!    evenly spaced instead.
//! 6. Horizontal × vertical line intersections become the per-frame grid
//!    point table.

mod intersections;
mod preprocess;
mod projection;
mod reconstructor;

pub use intersections::IntersectionGrid;
pub use preprocess::{adaptive_threshold_inv, preprocess, PreprocessParams, Preprocessed};
pub use projection::{
    column_projection, detect_peaks, enforce_expected_count, row_projection, smooth,
};
pub use reconstructor::{GridLines, GridParams, GridReconstructor};
