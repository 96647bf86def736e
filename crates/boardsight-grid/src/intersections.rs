//! The per-frame intersection table: (row, col) → rectified-space point.

use boardsight_core::{line_intersection, GridLine};
use nalgebra::Point2;

/// Dense table of grid-point coordinates, rebuilt whole every frame.
///
/// An entry is `None` when the corresponding line pair is near-parallel or
/// the intersection falls outside the rectified view. Indices are only
/// meaningful within the frame that produced the table; callers re-validate
/// bounds each frame because the shape follows detection quality.
#[derive(Clone, Debug, Default)]
pub struct IntersectionGrid {
    rows: usize,
    cols: usize,
    points: Vec<Option<Point2<f32>>>,
}

impl IntersectionGrid {
    /// Build the table from horizontal × vertical line sets, bounding
    /// intersections to `width` × `height`.
    pub fn build(
        horizontal: &[GridLine],
        vertical: &[GridLine],
        width: f32,
        height: f32,
    ) -> Self {
        let rows = horizontal.len();
        let cols = vertical.len();
        let mut points = Vec::with_capacity(rows * cols);
        for h in horizontal {
            for v in vertical {
                let p = line_intersection(h, v).filter(|p| {
                    p.x >= 0.0 && p.x <= width && p.y >= 0.0 && p.y <= height
                });
                points.push(p);
            }
        }
        Self { rows, cols, points }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// The grid point at (row, col), `None` when out of bounds or when the
    /// underlying line pair had no valid intersection.
    pub fn point(&self, row: usize, col: usize) -> Option<Point2<f32>> {
        if !self.contains(row, col) {
            return None;
        }
        self.points[row * self.cols + col]
    }

    /// Whether a row belongs to the power/ground rail band (first two or
    /// last two rows of the table). Informational only; it never gates pin
    /// validity.
    pub fn is_power_rail_row(&self, row: usize) -> bool {
        row < self.rows && (row < 2 || row + 2 >= self.rows)
    }
}
