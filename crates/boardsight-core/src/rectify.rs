//! Perspective rectification of the located board region into a fixed-size
//! top-down view.

use crate::geometry::sort_corners;
use crate::homography::{homography_from_4pt, warp_perspective_rgb, Homography};
use crate::image::{GrayImage, RgbBuffer, RgbView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Destination size of the rectified view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RectifyMode {
    /// 600×400, the full-board layout.
    Landscape,
    /// 600×300, the compact layout.
    Compact,
}

impl RectifyMode {
    pub fn size(&self) -> (usize, usize) {
        match self {
            RectifyMode::Landscape => (600, 400),
            RectifyMode::Compact => (600, 300),
        }
    }
}

impl Default for RectifyMode {
    fn default() -> Self {
        RectifyMode::Landscape
    }
}

/// One frame's rectification: the warped views plus both transforms.
///
/// `rect_from_img` maps frame coordinates into the rectified space;
/// `img_from_rect` maps back for overlay drawing. Both are recomputed every
/// frame a board is located and discarded with the frame.
#[derive(Clone, Debug)]
pub struct Rectification {
    pub rgb: RgbBuffer,
    pub gray: GrayImage,
    pub rect_from_img: Homography,
    pub img_from_rect: Homography,
    pub width: usize,
    pub height: usize,
}

/// Computes rectifications at a fixed destination size.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rectifier {
    pub mode: RectifyMode,
}

impl Rectifier {
    pub fn new(mode: RectifyMode) -> Self {
        Self { mode }
    }

    /// Destination rectangle corners in TL,TR,BR,BL order.
    fn dst_corners(&self) -> [Point2<f32>; 4] {
        let (w, h) = self.mode.size();
        let (w, h) = (w as f32, h as f32);
        [
            Point2::new(0.0, 0.0),
            Point2::new(w - 1.0, 0.0),
            Point2::new(w - 1.0, h - 1.0),
            Point2::new(0.0, h - 1.0),
        ]
    }

    /// Rectify the quadrilateral region of `src` given by `corners`
    /// (unordered). Returns `None` when the corner set is degenerate and no
    /// stable transform exists for this frame.
    pub fn rectify(&self, src: &RgbView<'_>, corners: [Point2<f32>; 4]) -> Option<Rectification> {
        let sorted = sort_corners(corners);
        let dst = self.dst_corners();

        let rect_from_img = homography_from_4pt(&sorted, &dst)?;
        let img_from_rect = rect_from_img.inverse()?;

        let (w, h) = self.mode.size();
        let rgb = warp_perspective_rgb(src, img_from_rect, w, h);
        let gray = rgb.to_gray();

        Some(Rectification {
            rgb,
            gray,
            rect_from_img,
            img_from_rect,
            width: w,
            height: h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RgbBuffer;

    fn frame_with_white_quad() -> RgbBuffer {
        let mut f = RgbBuffer::new(320, 240);
        for y in 40..200 {
            for x in 60..260 {
                f.set_pixel(x, y, [255, 255, 255]);
            }
        }
        f
    }

    #[test]
    fn corner_round_trip_law() {
        let rectifier = Rectifier::new(RectifyMode::Landscape);
        let frame = frame_with_white_quad();
        let corners = [
            Point2::new(60.0f32, 40.0),
            Point2::new(259.0f32, 40.0),
            Point2::new(259.0f32, 199.0),
            Point2::new(60.0f32, 199.0),
        ];
        let r = rectifier.rectify(&frame.view(), corners).expect("rectify");

        // forward(corner_i) lands on the destination rectangle corner and
        // inverse(forward(corner_i)) comes back.
        let dst = [
            Point2::new(0.0f32, 0.0),
            Point2::new(599.0f32, 0.0),
            Point2::new(599.0f32, 399.0),
            Point2::new(0.0f32, 399.0),
        ];
        for (c, d) in corners.iter().zip(dst.iter()) {
            let fwd = r.rect_from_img.apply(*c);
            assert!((fwd.x - d.x).abs() < 1e-2 && (fwd.y - d.y).abs() < 1e-2);
            let back = r.img_from_rect.apply(fwd);
            assert!((back.x - c.x).abs() < 1e-2 && (back.y - c.y).abs() < 1e-2);
        }
    }

    #[test]
    fn rectified_interior_is_white() {
        let rectifier = Rectifier::new(RectifyMode::Landscape);
        let frame = frame_with_white_quad();
        let corners = [
            Point2::new(259.0f32, 199.0),
            Point2::new(60.0f32, 40.0),
            Point2::new(60.0f32, 199.0),
            Point2::new(259.0f32, 40.0),
        ];
        let r = rectifier.rectify(&frame.view(), corners).expect("rectify");
        assert_eq!(r.width, 600);
        assert_eq!(r.height, 400);
        assert!(r.gray.get(300, 200) > 250);
    }

    #[test]
    fn degenerate_corners_yield_none() {
        let rectifier = Rectifier::default();
        let frame = frame_with_white_quad();
        let corners = [
            Point2::new(0.0f32, 0.0),
            Point2::new(1.0f32, 1.0),
            Point2::new(2.0f32, 2.0),
            Point2::new(3.0f32, 3.0),
        ];
        assert!(rectifier.rectify(&frame.view(), corners).is_none());
    }
}
