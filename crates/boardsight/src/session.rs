//! The per-camera-session frame pipeline.
//!
//! All mutable per-session state (current rectification, intersection grid,
//! highlight set, sequencer position) lives in [`Session`] and is confined
//! to the single frame-processing context: frames arrive one at a time and
//! the whole pipeline runs synchronously inside `process_frame`. Each frame
//! is an independent detection attempt; nothing is retried across frames.

use std::panic::{catch_unwind, AssertUnwindSafe};

use boardsight_core::{Rectification, Rectifier, RectifyMode, RgbView};
use boardsight_grid::{GridParams, GridReconstructor, IntersectionGrid};
use boardsight_guide::{
    Color, ComponentPlacement, HighlightSet, PinSequencer, SequencerMode, TickEvent,
    DEFAULT_ADVANCE_DELAY_MS,
};
use boardsight_holes::{Hole, HoleDetector, HoleParams};
use boardsight_locate::{BoardOutline, BreadboardLocator, LocatorParams};
use image::RgbImage;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::draw;

/// Everything tunable about a session.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SessionParams {
    pub locator: LocatorParams,
    pub rectify_mode: RectifyMode,
    pub grid: GridParams,
    pub holes: HoleParams,
    /// Sequencer advance period, milliseconds.
    pub advance_delay_ms: u64,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            locator: LocatorParams::default(),
            rectify_mode: RectifyMode::default(),
            grid: GridParams::default(),
            holes: HoleParams::default(),
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
        }
    }
}

/// What kind of silhouette this frame produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutlineKind {
    /// Four clean corners; the full pipeline ran.
    Quad,
    /// Fallback rotated rectangle; grid and hole processing skipped.
    RotatedRect,
}

/// Summary of one processed frame.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    pub outline: Option<OutlineKind>,
    pub rectified: bool,
    pub grid_rows: usize,
    pub grid_cols: usize,
    pub hole_count: usize,
    pub occupied_count: usize,
    pub tick: Option<TickEvent>,
    /// The frame pipeline panicked and the frame was returned unmodified.
    pub recovered_from_panic: bool,
}

/// One camera session's frame-processing context.
pub struct Session {
    params: SessionParams,
    locator: BreadboardLocator,
    rectifier: Rectifier,
    reconstructor: GridReconstructor,
    hole_detector: HoleDetector,
    sequencer: PinSequencer,
    highlights: HighlightSet,
    rectification: Option<Rectification>,
    grid: IntersectionGrid,
    holes: Vec<Hole>,
}

impl Session {
    pub fn new(params: SessionParams, placements: Vec<ComponentPlacement>) -> Self {
        Self {
            params,
            locator: BreadboardLocator::new(params.locator),
            rectifier: Rectifier::new(params.rectify_mode),
            reconstructor: GridReconstructor::new(params.grid),
            hole_detector: HoleDetector::new(params.holes),
            sequencer: PinSequencer::new(placements).with_advance_delay(params.advance_delay_ms),
            highlights: HighlightSet::new(),
            rectification: None,
            grid: IntersectionGrid::default(),
            holes: Vec::new(),
        }
    }

    /// Release retained buffers and return to the session-start state. Used
    /// when the camera stops, so nothing leaks into a future session.
    pub fn reset(&mut self) {
        let placements = self.sequencer.placements().to_vec();
        self.sequencer =
            PinSequencer::new(placements).with_advance_delay(self.params.advance_delay_ms);
        self.highlights.clear();
        self.rectification = None;
        self.grid = IntersectionGrid::default();
        self.holes.clear();
    }

    #[inline]
    pub fn grid(&self) -> &IntersectionGrid {
        &self.grid
    }

    #[inline]
    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    #[inline]
    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    #[inline]
    pub fn sequencer_mode(&self) -> SequencerMode {
        self.sequencer.mode()
    }

    // Highlight control API, validated against the current frame's grid.

    pub fn highlight_point(&mut self, row: usize, col: usize) -> bool {
        self.highlights.highlight_point(&self.grid, row, col)
    }

    pub fn highlight_many(&mut self, points: &[(usize, usize)], colors: Option<&[Color]>) -> usize {
        self.highlights.highlight_many(&self.grid, points, colors)
    }

    pub fn highlight_path(&mut self, points: &[(usize, usize)], colors: Option<&[Color]>) -> usize {
        self.highlights.highlight_path(&self.grid, points, colors)
    }

    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    // Sequencer control API.

    pub fn toggle_active(&mut self, now_ms: u64) {
        self.sequencer.toggle_active(now_ms, &mut self.highlights);
    }

    pub fn toggle_pause(&mut self) {
        self.sequencer.toggle_pause();
    }

    pub fn jump_next_component(&mut self, now_ms: u64) {
        self.sequencer
            .jump_next_component(now_ms, &mut self.highlights);
    }

    /// Process one camera frame in place.
    ///
    /// Any unexpected panic inside the pipeline is caught here, logged, and
    /// the frame handed back unmodified so the preview keeps running; the
    /// per-frame detection state is cleared so the failure cannot leak into
    /// the next frame.
    pub fn process_frame(&mut self, frame: &mut RgbImage, now_ms: u64) -> FrameReport {
        let mut working = frame.clone();
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.process_inner(&mut working, now_ms)
        }));
        match result {
            Ok(report) => {
                *frame = working;
                report
            }
            Err(_) => {
                error!("frame pipeline panicked; returning the frame unmodified");
                self.rectification = None;
                self.grid = IntersectionGrid::default();
                self.holes.clear();
                FrameReport {
                    recovered_from_panic: true,
                    ..FrameReport::default()
                }
            }
        }
    }

    fn process_inner(&mut self, frame: &mut RgbImage, now_ms: u64) -> FrameReport {
        // The previous frame's transform is invalid the moment a new frame
        // arrives.
        self.rectification = None;

        let located = {
            let view = RgbView {
                width: frame.width() as usize,
                height: frame.height() as usize,
                data: frame.as_raw().as_slice(),
            };
            let located = self.locator.locate(&view);
            if let Some(BoardOutline::Quad(corners)) = &located {
                self.rectification = self.rectifier.rectify(&view, *corners);
            }
            located
        };

        let mut report = FrameReport::default();

        match located {
            None => return report,
            Some(BoardOutline::RotatedRect(corners)) => {
                report.outline = Some(OutlineKind::RotatedRect);
                draw::polygon_outline(frame, &corners, draw::RED);
                return report;
            }
            Some(BoardOutline::Quad(corners)) => {
                report.outline = Some(OutlineKind::Quad);
                draw::polygon_outline(frame, &corners, draw::GREEN);
            }
        }

        let Some(rect) = &self.rectification else {
            // Degenerate corner set: no valid rectification this frame.
            return report;
        };
        report.rectified = true;

        let lines = self.reconstructor.reconstruct(&rect.gray);
        self.grid = IntersectionGrid::build(
            &lines.horizontal,
            &lines.vertical,
            rect.width as f32,
            rect.height as f32,
        );
        self.holes = self.hole_detector.detect(&rect.gray);

        report.grid_rows = self.grid.rows();
        report.grid_cols = self.grid.cols();
        report.hole_count = self.holes.len();
        report.occupied_count = self.holes.iter().filter(|h| h.occupied).count();

        report.tick = self.sequencer.tick(now_ms, &self.grid, &mut self.highlights);

        let mut rect_overlay = draw::to_rgb_image(&rect.rgb);
        draw::grid_lines(&mut rect_overlay, &lines);
        draw::holes(&mut rect_overlay, &self.holes);
        draw::blit_preview(frame, &rect_overlay);
        draw::highlights(frame, &self.highlights, &self.grid, &rect.img_from_rect);

        debug!(
            "frame: grid {}x{}, {} holes ({} occupied)",
            report.grid_rows, report.grid_cols, report.hole_count, report.occupied_count
        );

        report
    }
}
