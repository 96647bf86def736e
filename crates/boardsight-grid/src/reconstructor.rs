//! Row/column grid line inference from a rectified view.

use boardsight_core::{GrayImage as CoreGray, GridLine};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::preprocess::{preprocess, PreprocessParams};
use crate::projection::{
    column_projection, detect_peaks, enforce_expected_count, row_projection, smooth,
};

/// Grid reconstruction tuning. Expected counts describe the physical board
/// layout; swap them when the board is held in the other orientation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GridParams {
    /// Expected number of contact rows (horizontal lines).
    pub expected_rows: usize,
    /// Expected number of contact columns (vertical lines).
    pub expected_cols: usize,
    pub preprocess: PreprocessParams,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            expected_rows: 30,
            expected_cols: 10,
            preprocess: PreprocessParams::default(),
        }
    }
}

/// Grid lines inferred from one rectified view, each list ordered by
/// ascending position. Counts are heuristic and need not equal the physical
/// row/column counts.
#[derive(Clone, Debug, Default)]
pub struct GridLines {
    pub horizontal: Vec<GridLine>,
    pub vertical: Vec<GridLine>,
}

/// Histogram-based grid line reconstructor.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridReconstructor {
    pub params: GridParams,
}

impl GridReconstructor {
    pub fn new(params: GridParams) -> Self {
        Self { params }
    }

    /// Infer row and column lines from the rectified grayscale view.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, rect_gray), fields(width = rect_gray.width, height = rect_gray.height))
    )]
    pub fn reconstruct(&self, rect_gray: &CoreGray) -> GridLines {
        let width = rect_gray.width;
        let height = rect_gray.height;

        let pre = preprocess(rect_gray, &self.params.preprocess);

        let rows = smooth(&row_projection(&pre.binary));
        let cols = smooth(&column_projection(&pre.binary));

        let row_peaks = detect_peaks(&rows, height);
        let col_peaks = detect_peaks(&cols, width);
        debug!(
            "projection peaks: {} rows, {} cols (expected {}x{})",
            row_peaks.len(),
            col_peaks.len(),
            self.params.expected_rows,
            self.params.expected_cols
        );

        let row_positions = enforce_expected_count(row_peaks, height, self.params.expected_rows);
        let col_positions = enforce_expected_count(col_peaks, width, self.params.expected_cols);

        GridLines {
            horizontal: row_positions
                .into_iter()
                .map(|y| GridLine::horizontal(y as f32, width as f32))
                .collect(),
            vertical: col_positions
                .into_iter()
                .map(|x| GridLine::vertical(x as f32, height as f32))
                .collect(),
        }
    }
}
