//! The per-frame driver: region selection, detection per color band, and
//! steering estimation, in that order, strictly sequential.

use serde::{Deserialize, Serialize};

use cone_track_core::{
    gaussian_blur, BlurParams, Frame, MarkerCandidate, Rect, RegionError, RegionSelector,
    RegionTemplate, RgbImage,
};
use cone_track_detect::{annotate, detect_markers, to_hsv, ColorBand, DetectParams};
use cone_track_steer::{SteerConfigError, SteerParams, SteeringEstimator};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors surfaced by the pipeline.
///
/// Every variant is a startup-time configuration problem or caller misuse;
/// frame content itself (no cones, empty masks, unresolved latch) never
/// produces an error.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Steer(#[from] SteerConfigError),

    #[error("frame is {got_width}x{got_height}, pipeline configured for {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        got_width: usize,
        got_height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidFrameBuffer { expected: usize, got: usize },
}

/// Full pipeline configuration. The defaults reproduce the deployed setup:
/// a 640x480 camera, the dead space above the track cropped away, blue cones
/// versus yellow cones, and a 7x7 pre-blur.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub frame_width: usize,
    pub frame_height: usize,
    pub region: RegionTemplate,
    pub blue_band: ColorBand,
    pub yellow_band: ColorBand,
    pub detect: DetectParams,
    pub steer: SteerParams,
    /// Gaussian pre-blur of the selected region; `None` disables it.
    pub blur: Option<BlurParams>,
    /// Produce an annotated copy of each region for display.
    pub annotate: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            region: RegionTemplate::Crop(Rect::new(0, 240, 640, 100)),
            blue_band: ColorBand::BLUE_CONES,
            yellow_band: ColorBand::YELLOW_CONES,
            detect: DetectParams::default(),
            steer: SteerParams::default(),
            blur: Some(BlurParams::default()),
            annotate: false,
        }
    }
}

/// Everything one frame produces.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub timestamp_us: i64,
    /// Commanded steering angle, always within the configured deflection bound.
    pub angle: f32,
    pub blue: Vec<MarkerCandidate>,
    pub yellow: Vec<MarkerCandidate>,
    /// Region copy with candidate boxes drawn in, when annotation is enabled.
    pub annotated: Option<RgbImage>,
}

/// Startup-validated frame pipeline. Owns the steering state; feed frames in
/// capture order, one call per frame.
#[derive(Clone, Debug)]
pub struct Pipeline {
    params: PipelineParams,
    selector: RegionSelector,
    estimator: SteeringEstimator,
}

const ANNOTATION_RGB: [u8; 3] = [0, 255, 0];

impl Pipeline {
    /// Validate the configuration and build the pipeline. All fatal
    /// conditions (region template not fitting the declared frame geometry,
    /// malformed steering constants) are rejected here, before any frame is
    /// processed.
    pub fn new(params: PipelineParams) -> Result<Self, PipelineError> {
        let selector = RegionSelector::new(
            params.region.clone(),
            params.frame_width,
            params.frame_height,
        )?;
        let estimator = SteeringEstimator::new(params.steer)?;
        Ok(Self {
            params,
            selector,
            estimator,
        })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    pub fn estimator(&self) -> &SteeringEstimator {
        &self.estimator
    }

    /// Process one frame: select the region, optionally blur it, detect both
    /// cone colors, estimate the steering angle, update the cross-frame
    /// memory. The frame is only borrowed for this call.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(timestamp_us = frame.timestamp_us))
    )]
    pub fn process(&mut self, frame: &Frame) -> Result<FrameOutput, PipelineError> {
        if frame.image.width() != self.params.frame_width
            || frame.image.height() != self.params.frame_height
        {
            return Err(PipelineError::FrameSizeMismatch {
                got_width: frame.image.width(),
                got_height: frame.image.height(),
                expected_width: self.params.frame_width,
                expected_height: self.params.frame_height,
            });
        }

        let mut region = self.selector.apply(frame);
        if let Some(blur) = &self.params.blur {
            region.image = gaussian_blur(&region.image, blur);
        }

        let hsv = to_hsv(&region.image);
        let blue = detect_markers(&hsv, &self.params.blue_band, &self.params.detect);
        let yellow = detect_markers(&hsv, &self.params.yellow_band, &self.params.detect);

        let annotated = self.params.annotate.then(|| {
            let mut display = region.image.clone();
            annotate(&mut display, &blue, ANNOTATION_RGB);
            annotate(&mut display, &yellow, ANNOTATION_RGB);
            display
        });

        let angle = self.estimator.estimate(&blue, &yellow);
        log::debug!("frame {}; angle {angle:.4}", frame.timestamp_us);

        Ok(FrameOutput {
            timestamp_us: frame.timestamp_us,
            angle,
            blue,
            yellow,
            annotated,
        })
    }
}
