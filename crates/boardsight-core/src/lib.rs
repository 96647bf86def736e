//! Core image and geometry types for breadboard grid reconstruction.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any camera, codec, or UI library.

mod geometry;
mod homography;
mod image;
mod logger;
mod rectify;

pub use geometry::{line_intersection, sort_corners, GridLine, LineOrientation};
pub use homography::{
    homography_from_4pt, warp_perspective_gray, warp_perspective_rgb, Homography,
};
pub use image::{
    sample_bilinear, sample_bilinear_rgb, sample_bilinear_u8, GrayImage, GrayImageView, RgbBuffer,
    RgbView,
};
pub use rectify::{Rectification, Rectifier, RectifyMode};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
