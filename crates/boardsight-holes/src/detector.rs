//! Hole detection on rectified views, with occupancy classification.

use boardsight_core::GrayImage as CoreGray;
use boardsight_grid::{preprocess, PreprocessParams};
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::hough::detect_circles;
use crate::CircleParams;

/// A hole is occupied when its center pixel is darker than this.
const OCCUPIED_BRIGHTNESS_MAX: u8 = 100;

/// A detected hole. Identity is frame-local: no correspondence or tracking
/// across frames is performed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hole {
    pub center: Point2<f32>,
    pub radius: f32,
    pub occupied: bool,
}

/// Hole detector tuning: its own preprocessing chain plus circle params.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct HoleParams {
    pub preprocess: PreprocessParams,
    pub circles: CircleParams,
}

/// Detects circular holes and classifies each as occupied/empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoleDetector {
    pub params: HoleParams,
}

impl HoleDetector {
    pub fn new(params: HoleParams) -> Self {
        Self { params }
    }

    /// Detect holes in a rectified grayscale view. Circle detection runs on
    /// the blurred grayscale; occupancy samples the unblurred view at the
    /// (bounds-clamped) circle center.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, rect_gray), fields(width = rect_gray.width, height = rect_gray.height))
    )]
    pub fn detect(&self, rect_gray: &CoreGray) -> Vec<Hole> {
        let pre = preprocess(rect_gray, &self.params.preprocess);
        let circles = detect_circles(&pre.blurred, &self.params.circles);

        let holes: Vec<Hole> = circles
            .into_iter()
            .map(|c| {
                let x = (c.center.x.round() as i64).clamp(0, rect_gray.width as i64 - 1) as usize;
                let y = (c.center.y.round() as i64).clamp(0, rect_gray.height as i64 - 1) as usize;
                let brightness = rect_gray.get(x, y);
                Hole {
                    center: c.center,
                    radius: c.radius,
                    occupied: brightness < OCCUPIED_BRIGHTNESS_MAX,
                }
            })
            .collect();

        debug!(
            "holes: {} detected, {} occupied",
            holes.len(),
            holes.iter().filter(|h| h.occupied).count()
        );
        holes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectified_with_disc(fill: u8) -> CoreGray {
        let mut img = CoreGray::new(80, 60);
        for v in img.data.iter_mut() {
            *v = 230;
        }
        for y in 0..60usize {
            for x in 0..80usize {
                let d = ((x as f32 - 40.0).powi(2) + (y as f32 - 30.0).powi(2)).sqrt();
                if d <= 7.0 {
                    img.set(x, y, fill);
                }
            }
        }
        img
    }

    fn test_detector() -> HoleDetector {
        HoleDetector::new(HoleParams {
            preprocess: PreprocessParams::default(),
            circles: CircleParams {
                min_dist: 10.0,
                edge_threshold: 40.0,
                accumulator_threshold: 15,
                min_radius: 4,
                max_radius: 10,
            },
        })
    }

    #[test]
    fn dark_disc_is_occupied() {
        let holes = test_detector().detect(&rectified_with_disc(20));
        assert!(!holes.is_empty());
        let h = holes
            .iter()
            .find(|h| (h.center.x - 40.0).abs() <= 3.0 && (h.center.y - 30.0).abs() <= 3.0)
            .expect("hole near disc center");
        assert!(h.occupied);
    }

    #[test]
    fn bright_disc_is_empty() {
        let holes = test_detector().detect(&rectified_with_disc(160));
        assert!(!holes.is_empty());
        let h = holes
            .iter()
            .find(|h| (h.center.x - 40.0).abs() <= 3.0 && (h.center.y - 30.0).abs() <= 3.0)
            .expect("hole near disc center");
        assert!(!h.occupied);
    }

    #[test]
    fn blank_view_has_no_holes() {
        let mut img = CoreGray::new(60, 60);
        for v in img.data.iter_mut() {
            *v = 200;
        }
        assert!(test_detector().detect(&img).is_empty());
    }
}
