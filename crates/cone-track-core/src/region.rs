//! Region selection: restrict a frame to the part of the image that can
//! contain track cones.
//!
//! Templates are validated once, at startup, against the declared frame
//! dimensions. A mismatch is a configuration error and no frames are
//! processed; `apply` itself has no failure path.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, Rect};
use crate::image::RgbImage;

/// Geometric template describing the region of interest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RegionTemplate {
    /// Keep only the pixels inside the rectangle (the output frame shrinks).
    Crop(Rect),
    /// Keep the frame size but zero every pixel outside the polygon.
    Polygon(Vec<Point2<f32>>),
}

#[derive(thiserror::Error, Debug)]
pub enum RegionError {
    #[error("crop ({x}, {y}, {width}x{height}) does not fit a {frame_width}x{frame_height} frame")]
    CropOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        frame_width: usize,
        frame_height: usize,
    },

    #[error("crop must have positive extent, got {width}x{height}")]
    EmptyCrop { width: i32, height: i32 },

    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("polygon vertex ({x}, {y}) lies outside a {frame_width}x{frame_height} frame")]
    VertexOutOfBounds {
        x: f32,
        y: f32,
        frame_width: usize,
        frame_height: usize,
    },
}

/// Validated region selector bound to one frame geometry.
#[derive(Clone, Debug)]
pub struct RegionSelector {
    template: RegionTemplate,
    frame_width: usize,
    frame_height: usize,
    /// Precomputed inside/outside mask for polygon templates.
    mask: Option<Vec<bool>>,
}

impl RegionSelector {
    pub fn new(
        template: RegionTemplate,
        frame_width: usize,
        frame_height: usize,
    ) -> Result<Self, RegionError> {
        let mask = match &template {
            RegionTemplate::Crop(rect) => {
                if rect.width <= 0 || rect.height <= 0 {
                    return Err(RegionError::EmptyCrop {
                        width: rect.width,
                        height: rect.height,
                    });
                }
                if rect.x < 0
                    || rect.y < 0
                    || (rect.x + rect.width) as usize > frame_width
                    || (rect.y + rect.height) as usize > frame_height
                {
                    return Err(RegionError::CropOutOfBounds {
                        x: rect.x,
                        y: rect.y,
                        width: rect.width,
                        height: rect.height,
                        frame_width,
                        frame_height,
                    });
                }
                None
            }
            RegionTemplate::Polygon(vertices) => {
                if vertices.len() < 3 {
                    return Err(RegionError::DegeneratePolygon(vertices.len()));
                }
                for v in vertices {
                    if v.x < 0.0
                        || v.y < 0.0
                        || v.x > frame_width as f32
                        || v.y > frame_height as f32
                    {
                        return Err(RegionError::VertexOutOfBounds {
                            x: v.x,
                            y: v.y,
                            frame_width,
                            frame_height,
                        });
                    }
                }
                Some(polygon_mask(vertices, frame_width, frame_height))
            }
        };

        Ok(Self {
            template,
            frame_width,
            frame_height,
            mask,
        })
    }

    pub fn template(&self) -> &RegionTemplate {
        &self.template
    }

    /// Dimensions of the frames produced by [`apply`](Self::apply).
    pub fn output_size(&self) -> (usize, usize) {
        match &self.template {
            RegionTemplate::Crop(rect) => (rect.width as usize, rect.height as usize),
            RegionTemplate::Polygon(_) => (self.frame_width, self.frame_height),
        }
    }

    /// Copy the selected region out of `frame`. The input is not mutated and
    /// the timestamp is carried over.
    pub fn apply(&self, frame: &Frame) -> Frame {
        let image = match &self.template {
            RegionTemplate::Crop(rect) => {
                let (rw, rh) = (rect.width as usize, rect.height as usize);
                let mut out = RgbImage::new(rw, rh);
                for y in 0..rh {
                    for x in 0..rw {
                        out.set_pixel(
                            x,
                            y,
                            frame.image.pixel(rect.x as usize + x, rect.y as usize + y),
                        );
                    }
                }
                out
            }
            RegionTemplate::Polygon(_) => {
                let mut out = frame.image.clone();
                // validated in new(), so the mask is always present here
                if let Some(mask) = &self.mask {
                    for y in 0..self.frame_height {
                        for x in 0..self.frame_width {
                            if !mask[y * self.frame_width + x] {
                                out.set_pixel(x, y, [0, 0, 0]);
                            }
                        }
                    }
                }
                out
            }
        };
        Frame::new(image, frame.timestamp_us)
    }
}

/// Even-odd point-in-polygon test, sampled at pixel centers.
fn polygon_mask(vertices: &[Point2<f32>], width: usize, height: usize) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    for y in 0..height {
        let py = y as f32 + 0.5;
        for x in 0..width {
            let px = x as f32 + 0.5;
            mask[y * width + x] = point_in_polygon(vertices, px, py);
        }
    }
    mask
}

fn point_in_polygon(vertices: &[Point2<f32>], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
