//! Core types and utilities for the cone-track steering pipeline.
//!
//! This crate is intentionally small: it owns the frame/image primitives, the
//! rectangle and candidate types shared by the detector and the estimator, and
//! the region selector that restricts a frame to the part of the image likely
//! to contain track cones. It does *not* know about color bands or steering.

mod frame;
mod image;
mod logger;
mod region;

pub use frame::{Frame, MarkerCandidate, Rect};
pub use image::{draw_rect_outline, gaussian_blur, BlurParams, RgbImage, RgbImageView};
pub use region::{RegionError, RegionSelector, RegionTemplate};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
