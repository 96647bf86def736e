//! Corner ordering and 2D line primitives.

use nalgebra::Point2;

/// Intersection determinant below this is treated as parallel.
const PARALLEL_EPS: f64 = 1e-9;

/// Order four quadrilateral corners as `[top-left, top-right, bottom-right,
/// bottom-left]` by classifying each against the centroid.
///
/// A point exactly on a centroid axis falls into the bottom-left slot. For a
/// convex quadrilateral the four quadrants are distinct and traversing the
/// result traces a simple polygon; degenerate inputs can land two points in
/// one slot, which callers detect through the rectification failing.
pub fn sort_corners(points: [Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;

    let mut sorted = [Point2::new(0.0f32, 0.0); 4];
    for p in points {
        let slot = if p.x < cx && p.y < cy {
            0 // top-left
        } else if p.x > cx && p.y < cy {
            1 // top-right
        } else if p.x > cx && p.y > cy {
            2 // bottom-right
        } else {
            3 // bottom-left, including on-axis ties
        };
        sorted[slot] = p;
    }
    sorted
}

/// Axis of a grid line in the rectified view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineOrientation {
    Horizontal,
    Vertical,
}

/// A grid line: its 1D position plus the endpoints spanning the rectified
/// view. `position` is y for horizontal lines and x for vertical ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    pub orientation: LineOrientation,
    pub position: f32,
    pub start: Point2<f32>,
    pub end: Point2<f32>,
}

impl GridLine {
    pub fn horizontal(y: f32, width: f32) -> Self {
        Self {
            orientation: LineOrientation::Horizontal,
            position: y,
            start: Point2::new(0.0, y),
            end: Point2::new(width, y),
        }
    }

    pub fn vertical(x: f32, height: f32) -> Self {
        Self {
            orientation: LineOrientation::Vertical,
            position: x,
            start: Point2::new(x, 0.0),
            end: Point2::new(x, height),
        }
    }

    /// Implicit form `a*x + b*y + c = 0` from the two endpoints.
    pub fn implicit(&self) -> (f64, f64, f64) {
        let (x1, y1) = (self.start.x as f64, self.start.y as f64);
        let (x2, y2) = (self.end.x as f64, self.end.y as f64);
        let a = y2 - y1;
        let b = x1 - x2;
        let c = x2 * y1 - x1 * y2;
        (a, b, c)
    }
}

/// Intersection of two lines in implicit form, `None` when parallel within
/// tolerance.
pub fn line_intersection(l1: &GridLine, l2: &GridLine) -> Option<Point2<f32>> {
    let (a1, b1, c1) = l1.implicit();
    let (a2, b2, c2) = l2.implicit();

    let det = a1 * b2 - a2 * b1;
    if det.abs() < PARALLEL_EPS {
        return None;
    }

    let x = (b1 * c2 - b2 * c1) / det;
    let y = (a2 * c1 - a1 * c2) / det;
    Some(Point2::new(x as f32, y as f32))
}
