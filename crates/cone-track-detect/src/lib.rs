//! Color-band cone detection.
//!
//! Per frame and per configured [`ColorBand`]: convert the region to HSV
//! (done once, shared by both bands), build a binary in-range mask, extract
//! 8-connected regions, and keep the bounding boxes whose area passes the
//! noise gate. An empty result is a normal state, not an error.

mod color;
mod components;
mod detect;

pub use color::{to_hsv, ColorBand, HsvImage};
pub use components::connected_regions;
pub use detect::{annotate, detect_markers, DetectParams};
