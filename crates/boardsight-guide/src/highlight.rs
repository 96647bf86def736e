//! The per-session highlight set: grid points flagged for overlay drawing.

use boardsight_grid::IntersectionGrid;
use log::warn;

/// Overlay color, RGB.
pub type Color = [u8; 3];

pub const DEFAULT_HIGHLIGHT_COLOR: Color = [255, 200, 0];

/// One highlighted grid point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    pub row: usize,
    pub col: usize,
    pub color: Color,
}

/// Mutable collection of highlighted grid points, plus an optional ordered
/// path for connective line drawing.
///
/// Validation is against the *current* intersection table only; because the
/// table is rebuilt every frame, entries can refer to indices the next
/// frame's table no longer has, and the renderer re-validates at draw time.
#[derive(Clone, Debug, Default)]
pub struct HighlightSet {
    items: Vec<Highlight>,
    path: Vec<(usize, usize)>,
}

impl HighlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn items(&self) -> &[Highlight] {
        &self.items
    }

    /// Ordered path from the last `highlight_path` call, empty otherwise.
    #[inline]
    pub fn path(&self) -> &[(usize, usize)] {
        &self.path
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate against the current table and append on success. On failure
    /// the set is left unchanged and `false` is returned.
    pub fn highlight_point(&mut self, grid: &IntersectionGrid, row: usize, col: usize) -> bool {
        if !grid.contains(row, col) {
            warn!(
                "highlight ({row}, {col}) outside current grid {}x{}",
                grid.rows(),
                grid.cols()
            );
            return false;
        }
        self.items.push(Highlight {
            row,
            col,
            color: DEFAULT_HIGHLIGHT_COLOR,
        });
        true
    }

    /// Replace the entire set with the valid subset of `points`; returns how
    /// many were accepted. `colors` pairs up with `points` by index, falling
    /// back to the default color when absent or shorter.
    pub fn highlight_many(
        &mut self,
        grid: &IntersectionGrid,
        points: &[(usize, usize)],
        colors: Option<&[Color]>,
    ) -> usize {
        self.items.clear();
        self.path.clear();
        for (i, &(row, col)) in points.iter().enumerate() {
            if !grid.contains(row, col) {
                warn!(
                    "highlight ({row}, {col}) outside current grid {}x{}",
                    grid.rows(),
                    grid.cols()
                );
                continue;
            }
            let color = colors
                .and_then(|c| c.get(i).copied())
                .unwrap_or(DEFAULT_HIGHLIGHT_COLOR);
            self.items.push(Highlight { row, col, color });
        }
        self.items.len()
    }

    /// Like [`highlight_many`](Self::highlight_many), but also remembers the
    /// accepted points in order so the renderer can join them with lines.
    pub fn highlight_path(
        &mut self,
        grid: &IntersectionGrid,
        points: &[(usize, usize)],
        colors: Option<&[Color]>,
    ) -> usize {
        let accepted = self.highlight_many(grid, points, colors);
        self.path = self.items.iter().map(|h| (h.row, h.col)).collect();
        accepted
    }

    /// Empty the set (and any remembered path) unconditionally.
    pub fn clear(&mut self) {
        self.items.clear();
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardsight_core::GridLine;

    fn grid(rows: usize, cols: usize) -> IntersectionGrid {
        let h: Vec<GridLine> = (0..rows)
            .map(|r| GridLine::horizontal(r as f32 * 10.0, 600.0))
            .collect();
        let v: Vec<GridLine> = (0..cols)
            .map(|c| GridLine::vertical(c as f32 * 10.0, 400.0))
            .collect();
        IntersectionGrid::build(&h, &v, 600.0, 400.0)
    }

    #[test]
    fn point_in_bounds_appends() {
        let g = grid(5, 5);
        let mut set = HighlightSet::new();
        assert!(set.highlight_point(&g, 2, 3));
        assert_eq!(set.items().len(), 1);
        assert_eq!(set.items()[0].row, 2);
        assert_eq!(set.items()[0].col, 3);
    }

    #[test]
    fn point_out_of_bounds_leaves_set_unchanged() {
        let g = grid(5, 5);
        let mut set = HighlightSet::new();
        set.highlight_point(&g, 1, 1);
        assert!(!set.highlight_point(&g, 5, 0));
        assert!(!set.highlight_point(&g, 0, 5));
        assert_eq!(set.items().len(), 1);
    }

    #[test]
    fn many_replaces_instead_of_appending() {
        let g = grid(6, 6);
        let mut set = HighlightSet::new();
        set.highlight_point(&g, 0, 0);
        let accepted = set.highlight_many(&g, &[(1, 1), (2, 2), (9, 9)], None);
        assert_eq!(accepted, 2);
        assert_eq!(set.items().len(), 2);
        assert!(set.items().iter().all(|h| h.row != 0));
    }

    #[test]
    fn many_applies_paired_colors() {
        let g = grid(6, 6);
        let mut set = HighlightSet::new();
        let colors = [[255, 0, 0], [0, 255, 0]];
        set.highlight_many(&g, &[(1, 1), (2, 2), (3, 3)], Some(&colors));
        assert_eq!(set.items()[0].color, [255, 0, 0]);
        assert_eq!(set.items()[1].color, [0, 255, 0]);
        assert_eq!(set.items()[2].color, DEFAULT_HIGHLIGHT_COLOR);
    }

    #[test]
    fn path_remembers_accepted_order() {
        let g = grid(6, 6);
        let mut set = HighlightSet::new();
        set.highlight_path(&g, &[(3, 3), (9, 9), (1, 2)], None);
        assert_eq!(set.path(), &[(3, 3), (1, 2)]);
    }

    #[test]
    fn clear_empties_everything() {
        let g = grid(6, 6);
        let mut set = HighlightSet::new();
        set.highlight_path(&g, &[(1, 1)], None);
        set.clear();
        assert!(set.is_empty());
        assert!(set.path().is_empty());
    }
}
