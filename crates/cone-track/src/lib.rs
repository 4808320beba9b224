//! High-level facade crate for the `cone-track-*` workspace.
//!
//! Per video frame the pipeline restricts the image to the region that can
//! contain track cones, extracts color-matched candidates for the two
//! configured bands, and derives one bounded steering angle with a single
//! frame of cross-frame state.
//!
//! ## Quickstart
//!
//! ```no_run
//! use cone_track::{Pipeline, PipelineParams};
//! use cone_track::core::{Frame, RgbImage};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = Pipeline::new(PipelineParams::default())?;
//! let frame = Frame::new(RgbImage::new(640, 480), 0);
//! let out = pipeline.process(&frame)?;
//! println!("steering angle: {}", out.angle);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `cone_track::core`: frames, rectangles, regions, blur, logging setup.
//! - `cone_track::detect`: HSV color bands and candidate extraction.
//! - `cone_track::steer`: the stateful steering estimator and the off-line
//!   performance scorer.
//! - `cone_track::pipeline`: the per-frame driver tying the stages together.
//! - `cone_track::io` (feature `image`): conversions from `image` buffers,
//!   used by the examples.

pub use cone_track_core as core;
pub use cone_track_detect as detect;
pub use cone_track_steer as steer;

pub use cone_track_core::{Frame, MarkerCandidate, Rect, RegionTemplate};
pub use cone_track_detect::ColorBand;
pub use cone_track_steer::{SideLatch, SteerParams, SteeringEstimator};

pub mod pipeline;

pub use pipeline::{FrameOutput, Pipeline, PipelineError, PipelineParams};

#[cfg(feature = "image")]
pub mod io;
