//! High-level facade crate for the `boardsight-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) the per-frame [`Session`] pipeline that turns camera
//!   frames into overlaid guidance, plus a CLI for running it on stills.
//!
//! ## Quickstart
//!
//! ```no_run
//! use boardsight::{Session, SessionParams};
//! use boardsight::guide::load_placements;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut frame = ImageReader::open("frame.png")?.decode()?.to_rgb8();
//! let placements = load_placements(r#"[{"ref":"R1","positions":[[4,1],[4,5]]}]"#)?;
//!
//! let mut session = Session::new(SessionParams::default(), placements);
//! session.toggle_active(0);
//! let report = session.process_frame(&mut frame, 1000);
//! println!("grid: {}x{}", report.grid_rows, report.grid_cols);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `boardsight::core`: image buffers, homographies, rectification, lines.
//! - `boardsight::locate`: board silhouette detection in color frames.
//! - `boardsight::grid`: projection histograms, grid lines, intersections.
//! - `boardsight::holes`: circular hole detection and occupancy.
//! - `boardsight::guide`: placements, highlights, the pin sequencer.
//! - `boardsight::Session` (feature `image`): the per-frame pipeline.

pub use boardsight_core as core;
pub use boardsight_grid as grid;
pub use boardsight_guide as guide;
pub use boardsight_holes as holes;
pub use boardsight_locate as locate;

pub use boardsight_core::{GridLine, Homography, RectifyMode};
pub use boardsight_grid::{GridParams, IntersectionGrid};
pub use boardsight_guide::{ComponentPlacement, HighlightSet, PinSequencer, SequencerMode};
pub use boardsight_holes::{CircleParams, Hole};
pub use boardsight_locate::{BoardOutline, LocatorParams};

#[cfg(feature = "image")]
mod draw;
#[cfg(feature = "image")]
mod session;

#[cfg(feature = "image")]
pub use session::{FrameReport, OutlineKind, Session, SessionParams};
