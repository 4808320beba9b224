use serde::{Deserialize, Serialize};

use crate::frame::Rect;

/// Borrowed RGB8 image, row-major, `data.len() == width * height * 3`.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Owned RGB8 image, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    /// Zero-filled (black) image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    /// Wrap a raw interleaved RGB8 buffer. Returns `None` when the buffer
    /// length does not match `width * height * 3`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        if data.len() != width * height * 3 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn as_view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }
}

/// Gaussian pre-blur settings. The defaults match the 7x7, sigma 1.0 kernel
/// the deployed pipeline runs before color thresholding.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BlurParams {
    pub kernel: usize,
    pub sigma: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel: 7,
            sigma: 1.0,
        }
    }
}

fn gaussian_weights(kernel: usize, sigma: f32) -> Vec<f32> {
    let n = kernel.max(1) | 1; // force odd
    let half = (n / 2) as i32;
    let mut w: Vec<f32> = (-half..=half)
        .map(|i| (-(i * i) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = w.iter().sum();
    for v in &mut w {
        *v /= sum;
    }
    w
}

#[inline]
fn clamp_index(i: i32, len: usize) -> usize {
    i.clamp(0, len as i32 - 1) as usize
}

/// Separable Gaussian blur with edge replication.
pub fn gaussian_blur(src: &RgbImage, params: &BlurParams) -> RgbImage {
    let w = src.width();
    let h = src.height();
    if w == 0 || h == 0 || params.sigma <= 0.0 {
        return src.clone();
    }
    let weights = gaussian_weights(params.kernel, params.sigma);
    let half = (weights.len() / 2) as i32;

    // horizontal pass into f32 to avoid double rounding
    let mut tmp = vec![0f32; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0f32; 3];
            for (k, wt) in weights.iter().enumerate() {
                let sx = clamp_index(x as i32 + k as i32 - half, w);
                let p = src.pixel(sx, y);
                for c in 0..3 {
                    acc[c] += *wt * p[c] as f32;
                }
            }
            let i = (y * w + x) * 3;
            tmp[i..i + 3].copy_from_slice(&acc);
        }
    }

    let mut out = RgbImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0f32; 3];
            for (k, wt) in weights.iter().enumerate() {
                let sy = clamp_index(y as i32 + k as i32 - half, h);
                let i = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += *wt * tmp[i + c];
                }
            }
            out.set_pixel(
                x,
                y,
                [
                    acc[0].round().clamp(0.0, 255.0) as u8,
                    acc[1].round().clamp(0.0, 255.0) as u8,
                    acc[2].round().clamp(0.0, 255.0) as u8,
                ],
            );
        }
    }
    out
}

/// Draw the outline of `rect` onto `img`, clipped to the image bounds.
///
/// Display-only helper; the decision path never reads annotated pixels.
pub fn draw_rect_outline(img: &mut RgbImage, rect: &Rect, rgb: [u8; 3], thickness: u32) {
    let t = thickness.max(1) as i32;
    let (w, h) = (img.width() as i32, img.height() as i32);
    let x0 = rect.x;
    let y0 = rect.y;
    let x1 = rect.x + rect.width;
    let y1 = rect.y + rect.height;

    let mut fill = |fx0: i32, fy0: i32, fx1: i32, fy1: i32| {
        for y in clip_range(fy0, fy1, h) {
            for x in clip_range(fx0, fx1, w) {
                img.set_pixel(x, y, rgb);
            }
        }
    };

    fill(x0 - t, y0 - t, x1 + t, y0); // top
    fill(x0 - t, y1, x1 + t, y1 + t); // bottom
    fill(x0 - t, y0, x0, y1); // left
    fill(x1, y0, x1 + t, y1); // right
}

fn clip_range(a: i32, b: i32, limit: i32) -> std::ops::Range<usize> {
    let lo = a.clamp(0, limit) as usize;
    let hi = b.clamp(0, limit) as usize;
    lo..hi
}
