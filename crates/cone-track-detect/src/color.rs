use serde::{Deserialize, Serialize};

use cone_track_core::RgbImage;

/// Inclusive HSV bounds identifying one cone color class.
///
/// Channels follow the OpenCV 8-bit convention: hue in `0..=180` (degrees
/// halved), saturation and value in `0..=255`, so thresholds tuned against
/// OpenCV tooling carry over unchanged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ColorBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBand {
    /// Blue track-boundary cones as seen by the deployed camera.
    pub const BLUE_CONES: ColorBand = ColorBand {
        lower: [100, 50, 30],
        upper: [120, 255, 255],
    };

    /// Yellow track-boundary cones as seen by the deployed camera.
    pub const YELLOW_CONES: ColorBand = ColorBand {
        lower: [17, 60, 70],
        upper: [40, 200, 200],
    };

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

/// HSV image with the same geometry as the RGB region it came from.
#[derive(Clone, Debug)]
pub struct HsvImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl HsvImage {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Convert a whole region once; both color bands threshold the same result.
pub fn to_hsv(img: &RgbImage) -> HsvImage {
    let (w, h) = (img.width(), img.height());
    let mut data = vec![0u8; w * h * 3];
    for y in 0..h {
        for x in 0..w {
            let hsv = rgb_to_hsv(img.pixel(x, y));
            let i = (y * w + x) * 3;
            data[i..i + 3].copy_from_slice(&hsv);
        }
    }
    HsvImage {
        width: w,
        height: h,
        data,
    }
}

/// 8-bit RGB to OpenCV-convention HSV.
#[inline]
pub(crate) fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let v = max;
    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / max as f32).round() as u8
    };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g as f32 - b as f32) / delta
    } else if max == g {
        120.0 + 60.0 * (b as f32 - r as f32) / delta
    } else {
        240.0 + 60.0 * (r as f32 - g as f32) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [(h / 2.0).round() as u8, s, v]
}
