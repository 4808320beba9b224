use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::image::RgbImage;

/// Axis-aligned bounding rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// One detected cone candidate: a connected color region that survived the
/// area gate. Rebuilt from scratch every frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerCandidate {
    pub rect: Rect,
    pub center: Point2<f32>,
}

impl MarkerCandidate {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            rect,
            center: rect.center(),
        }
    }
}

/// One decoded color image with its capture instant.
///
/// The pipeline borrows a frame for exactly one invocation and never keeps a
/// reference to it afterwards.
#[derive(Clone, Debug)]
pub struct Frame {
    pub image: RgbImage,
    /// Monotonic capture timestamp, microseconds.
    pub timestamp_us: i64,
}

impl Frame {
    pub fn new(image: RgbImage, timestamp_us: i64) -> Self {
        Self {
            image,
            timestamp_us,
        }
    }
}
