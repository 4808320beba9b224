//! Steering estimation from detected cone candidates.
//!
//! The [`SteeringEstimator`] is the only stateful piece of the pipeline: it
//! remembers, per color, the previous frame's nearest accepted cone, plus a
//! one-time side latch assigning each color to the left or right track
//! boundary. Every frame it turns the current candidate lists into one bounded
//! steering angle.

mod estimator;
mod score;

pub use estimator::{ConeColor, SideLatch, SteerConfigError, SteerParams, SteeringEstimator};
pub use score::PerformanceScorer;
