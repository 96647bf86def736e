//! Breadboard locator: per-frame color/contour segmentation that finds the
//! board's bounding quadrilateral in the raw camera frame.
//!
//! Pipeline per frame:
//! 1. Threshold low-saturation / high-value ("white-ish") pixels in HSV.
//! 2. Gaussian blur and re-threshold to suppress speckle.
//! 3. Morphological close (merge regions) then erode (clean edges).
//! 4. External contours; keep the one with maximum enclosed area.
//! 5. Approximate as a polygon with ε = 2% of the perimeter; exactly four
//!    vertices is a usable quadrilateral, anything else degrades to a
//!    rotated-rectangle indicator for this frame.

mod mask;
mod outline;

pub use mask::board_mask;
pub use outline::{extract_outline, BoardOutline};

use boardsight_core::RgbView;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Segmentation and approximation tuning.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LocatorParams {
    /// Maximum HSV saturation (0..=255) for a pixel to count as white-ish.
    pub saturation_max: u8,
    /// Minimum HSV value (0..=255) for a pixel to count as white-ish.
    pub value_min: u8,
    /// Sigma of the noise-suppression blur on the binary mask.
    pub blur_sigma: f32,
    /// Re-threshold applied to the blurred mask.
    pub mask_threshold: u8,
    /// Half-width of the square closing kernel (7 ≙ 15×15).
    pub close_radius: u8,
    /// Half-width of the square erosion (3 ≙ three 3×3 passes).
    pub erode_radius: u8,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_epsilon_frac: f64,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            saturation_max: 50,
            value_min: 200,
            blur_sigma: 1.5,
            mask_threshold: 128,
            close_radius: 7,
            erode_radius: 3,
            approx_epsilon_frac: 0.02,
        }
    }
}

/// Per-frame breadboard locator.
#[derive(Clone, Copy, Debug, Default)]
pub struct BreadboardLocator {
    pub params: LocatorParams,
}

impl BreadboardLocator {
    pub fn new(params: LocatorParams) -> Self {
        Self { params }
    }

    /// Find the board silhouette in a color frame. `None` means no
    /// candidate region at all this frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn locate(&self, frame: &RgbView<'_>) -> Option<BoardOutline> {
        let mask = board_mask(frame, &self.params);
        extract_outline(&mask, self.params.approx_epsilon_frac)
    }
}
