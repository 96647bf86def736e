//! Contour selection and polygon approximation on the board mask.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::{approximate_polygon_dp, arc_length, min_area_rect};
use imageproc::point::Point as IPoint;
use log::debug;
use nalgebra::Point2;

/// The board silhouette found in one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum BoardOutline {
    /// The contour approximated to exactly four vertices: a usable
    /// quadrilateral, unordered.
    Quad([Point2<f32>; 4]),
    /// The approximation had a different vertex count; the minimum-area
    /// rotated rectangle is a visual indicator only and no grid
    /// reconstruction happens this frame.
    RotatedRect([Point2<f32>; 4]),
}

/// Signed shoelace area of a closed pixel contour.
fn contour_area(points: &[IPoint<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (acc as f64 / 2.0).abs()
}

fn to_point2(p: IPoint<i32>) -> Point2<f32> {
    Point2::new(p.x as f32, p.y as f32)
}

/// Pick the largest external contour of `mask` and approximate it.
///
/// Ties between equal-area contours resolve to the first one encountered in
/// contour discovery order. Returns `None` when the mask has no external
/// contour at all.
pub fn extract_outline(mask: &GrayImage, epsilon_frac: f64) -> Option<BoardOutline> {
    let contours: Vec<Contour<i32>> = find_contours(mask);

    let best = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| (contour_area(&c.points), c))
        .fold(None::<(f64, &Contour<i32>)>, |acc, (area, c)| match acc {
            Some((best_area, _)) if best_area >= area => acc,
            _ => Some((area, c)),
        });

    let (area, contour) = best?;
    if contour.points.len() < 3 {
        return None;
    }

    let perimeter = arc_length(&contour.points, true);
    let approx = approximate_polygon_dp(&contour.points, epsilon_frac * perimeter, true);
    debug!(
        "board contour: area={:.0} perimeter={:.0} approx_vertices={}",
        area,
        perimeter,
        approx.len()
    );

    if approx.len() == 4 {
        let quad = [
            to_point2(approx[0]),
            to_point2(approx[1]),
            to_point2(approx[2]),
            to_point2(approx[3]),
        ];
        Some(BoardOutline::Quad(quad))
    } else {
        let rect = min_area_rect(&contour.points);
        Some(BoardOutline::RotatedRect([
            to_point2(rect[0]),
            to_point2(rect[1]),
            to_point2(rect[2]),
            to_point2(rect[3]),
        ]))
    }
}
