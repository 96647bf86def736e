//! Overlay rendering into camera frames and rectified previews.

use boardsight_core::{Homography, RgbBuffer};
use boardsight_grid::{GridLines, IntersectionGrid};
use boardsight_guide::HighlightSet;
use boardsight_holes::Hole;
use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;
use nalgebra::Point2;

pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Fraction of the frame covered by the rectified preview inset.
const PREVIEW_SCALE: f32 = 0.3;

pub(crate) fn to_rgb_image(buf: &RgbBuffer) -> RgbImage {
    RgbImage::from_fn(buf.width as u32, buf.height as u32, |x, y| {
        Rgb(buf.view().pixel(x as usize, y as usize))
    })
}

/// A line segment fattened to roughly 3 px so it stays visible on a full
/// resolution camera frame.
fn thick_segment(canvas: &mut RgbImage, a: Point2<f32>, b: Point2<f32>, color: Rgb<u8>) {
    for (ox, oy) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)] {
        draw_line_segment_mut(
            canvas,
            (a.x + ox, a.y + oy),
            (b.x + ox, b.y + oy),
            color,
        );
    }
}

/// Closed polygon outline between consecutive corners.
pub fn polygon_outline(canvas: &mut RgbImage, corners: &[Point2<f32>; 4], color: Rgb<u8>) {
    for i in 0..4 {
        thick_segment(canvas, corners[i], corners[(i + 1) % 4], color);
    }
}

/// Grid lines on the rectified preview: horizontal blue, vertical green.
pub fn grid_lines(canvas: &mut RgbImage, lines: &GridLines) {
    for l in &lines.horizontal {
        draw_line_segment_mut(canvas, (l.start.x, l.start.y), (l.end.x, l.end.y), BLUE);
    }
    for l in &lines.vertical {
        draw_line_segment_mut(canvas, (l.start.x, l.start.y), (l.end.x, l.end.y), GREEN);
    }
}

/// Hole markers on the rectified preview: red occupied, green empty.
pub fn holes(canvas: &mut RgbImage, detected: &[Hole]) {
    for h in detected {
        let color = if h.occupied { RED } else { GREEN };
        let center = (h.center.x.round() as i32, h.center.y.round() as i32);
        draw_hollow_circle_mut(canvas, center, h.radius.round() as i32, color);
        draw_filled_circle_mut(canvas, center, 1, color);
    }
}

/// Back-map each highlighted grid point through `img_from_rect` and draw it
/// into the camera frame; points whose grid entry is absent, or whose
/// mapping is not finite, are skipped for this frame only. The remembered
/// path is joined with connective segments.
pub fn highlights(
    canvas: &mut RgbImage,
    set: &HighlightSet,
    grid: &IntersectionGrid,
    img_from_rect: &Homography,
) {
    let map = |row: usize, col: usize| -> Option<Point2<f32>> {
        let p = grid.point(row, col)?;
        img_from_rect.apply_checked(p)
    };

    for h in set.items() {
        let Some(p) = map(h.row, h.col) else {
            continue;
        };
        draw_filled_circle_mut(
            canvas,
            (p.x.round() as i32, p.y.round() as i32),
            6,
            Rgb(h.color),
        );
    }

    let path: Vec<Point2<f32>> = set
        .path()
        .iter()
        .filter_map(|&(row, col)| map(row, col))
        .collect();
    for pair in path.windows(2) {
        thick_segment(canvas, pair[0], pair[1], WHITE);
    }
}

/// Down-scale the rectified overlay and paste it into the top-right corner
/// of the frame, with a white border.
pub fn blit_preview(frame: &mut RgbImage, rect_overlay: &RgbImage) {
    let pw = ((frame.width() as f32 * PREVIEW_SCALE) as u32).max(1);
    let ph = ((frame.height() as f32 * PREVIEW_SCALE) as u32).max(1);
    let preview = imageops::resize(rect_overlay, pw, ph, imageops::FilterType::Nearest);

    let x0 = frame.width().saturating_sub(pw);
    imageops::overlay(frame, &preview, x0 as i64, 0);
    draw_hollow_rect_mut(
        frame,
        Rect::at(x0 as i32, 0).of_size(pw, ph),
        WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsight_core::GridLine;

    #[test]
    fn preview_lands_in_top_right_corner() {
        let mut frame = RgbImage::new(200, 100);
        let overlay = RgbImage::from_pixel(60, 40, Rgb([9, 9, 9]));
        blit_preview(&mut frame, &overlay);
        // Inside the preview area.
        assert_ne!(*frame.get_pixel(180, 10), Rgb([0, 0, 0]));
        // Bottom-left untouched.
        assert_eq!(*frame.get_pixel(5, 95), Rgb([0, 0, 0]));
    }

    #[test]
    fn highlight_without_transform_target_is_skipped() {
        let h = vec![GridLine::horizontal(10.0, 100.0)];
        let v = vec![GridLine::horizontal(20.0, 100.0)]; // parallel: no point
        let grid = IntersectionGrid::build(&h, &v, 100.0, 100.0);
        let mut set = HighlightSet::new();
        set.highlight_point(&grid, 0, 0);

        let mut frame = RgbImage::new(100, 100);
        let identity = Homography::new(nalgebra::Matrix3::identity());
        highlights(&mut frame, &set, &grid, &identity);
        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn grid_lines_draw_in_their_colors() {
        let lines = GridLines {
            horizontal: vec![GridLine::horizontal(5.0, 50.0)],
            vertical: vec![GridLine::vertical(7.0, 50.0)],
        };
        let mut canvas = RgbImage::new(50, 50);
        grid_lines(&mut canvas, &lines);
        assert_eq!(*canvas.get_pixel(20, 5), BLUE);
        assert_eq!(*canvas.get_pixel(7, 20), GREEN);
    }
}
