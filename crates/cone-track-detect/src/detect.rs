use serde::{Deserialize, Serialize};

use cone_track_core::{draw_rect_outline, MarkerCandidate, RgbImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::color::{ColorBand, HsvImage};
use crate::components::connected_regions;

/// Noise gate for candidate bounding boxes. Area bounds are exclusive:
/// a box survives iff `min_area < w * h < max_area`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DetectParams {
    pub min_area: i64,
    pub max_area: i64,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            min_area: 200,
            max_area: 1500,
        }
    }
}

/// Find cone candidates of one color band in an HSV region.
///
/// The area gate is the only noise filter; no shape or fill-ratio refinement
/// happens here. Zero candidates is a legal result meaning "no cone of this
/// color in this frame".
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(hsv, band, params), fields(width = hsv.width(), height = hsv.height()))
)]
pub fn detect_markers(
    hsv: &HsvImage,
    band: &ColorBand,
    params: &DetectParams,
) -> Vec<MarkerCandidate> {
    let (w, h) = (hsv.width(), hsv.height());
    let mut mask = vec![false; w * h];
    for y in 0..h {
        for x in 0..w {
            mask[y * w + x] = band.contains(hsv.pixel(x, y));
        }
    }

    let candidates: Vec<MarkerCandidate> = connected_regions(&mask, w, h)
        .into_iter()
        .filter(|r| {
            let a = r.area();
            a > params.min_area && a < params.max_area
        })
        .map(MarkerCandidate::from_rect)
        .collect();

    log::trace!(
        "{} candidate(s) in band {:?}..{:?}",
        candidates.len(),
        band.lower,
        band.upper
    );
    candidates
}

/// Draw the surviving boxes onto a display copy of the frame.
///
/// Cosmetic output only; nothing in the steering decision reads these pixels.
pub fn annotate(img: &mut RgbImage, candidates: &[MarkerCandidate], rgb: [u8; 3]) {
    for cand in candidates {
        draw_rect_outline(img, &cand.rect, rgb, 3);
    }
}
