use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use cone_track_core::MarkerCandidate;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// The two configured cone color classes. The names match the deployed
/// track (blue and yellow boundary cones); the actual HSV bands live in the
/// detector configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConeColor {
    Blue,
    Yellow,
}

impl ConeColor {
    #[inline]
    fn idx(self) -> usize {
        match self {
            ConeColor::Blue => 0,
            ConeColor::Yellow => 1,
        }
    }
}

/// Which color sits on the car's left. Latches at most once per run, on the
/// first frame where a color's nearest cone lies left of the ego reference,
/// and never re-evaluates afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SideLatch {
    Unresolved,
    BlueLeft,
    YellowLeft,
}

/// Which boundary the single visible cone belongs to, after the latch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

/// Steering tunables. The defaults are the constants of the deployed track
/// configuration; every value is dimensionless except `ego_x` (pixels).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SteerParams {
    /// Fixed horizontal pixel coordinate of the car's forward axis.
    pub ego_x: f32,
    /// "Track is centered" output, also the magnitude of the fixed correction.
    pub straight: f32,
    /// Offsets below this magnitude snap to the fixed correction.
    pub deadband: f32,
    /// Offsets above this magnitude snap to the fixed correction.
    pub saturation: f32,
    /// Gain of the turn-magnitude function.
    pub gain: f32,
    /// Output bound; every returned angle lies within +- this value.
    pub max_deflection: f32,
    /// Safety ceiling applied to the carried-over angle inside the turn
    /// computation, distinct from the output bound.
    pub carry_ceiling: f32,
}

impl Default for SteerParams {
    fn default() -> Self {
        Self {
            ego_x: 320.0,
            straight: 0.049,
            deadband: 0.08,
            saturation: 0.9,
            gain: 0.09,
            max_deflection: 0.145540,
            carry_ceiling: 0.49,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SteerConfigError {
    #[error("ego reference x must be positive and finite, got {0}")]
    InvalidEgoX(f32),

    #[error("deadband {0} must be below saturation {1}")]
    InvertedOffsetBounds(f32, f32),
}

/// Per-frame steering policy with one frame of memory per cone color.
///
/// All cross-frame state lives in this value; construct one per camera stream
/// and feed it every frame in order.
#[derive(Clone, Debug)]
pub struct SteeringEstimator {
    params: SteerParams,
    latch: SideLatch,
    /// Previous frame's nearest accepted center per color, `None` = unseen.
    memory: [Option<Point2<f32>>; 2],
    /// Previous frame's commanded angle.
    angle: f32,
}

impl SteeringEstimator {
    pub fn new(params: SteerParams) -> Result<Self, SteerConfigError> {
        if !(params.ego_x.is_finite() && params.ego_x > 0.0) {
            return Err(SteerConfigError::InvalidEgoX(params.ego_x));
        }
        if params.deadband >= params.saturation {
            return Err(SteerConfigError::InvertedOffsetBounds(
                params.deadband,
                params.saturation,
            ));
        }
        Ok(Self {
            params,
            latch: SideLatch::Unresolved,
            memory: [None, None],
            angle: 0.0,
        })
    }

    pub fn params(&self) -> &SteerParams {
        &self.params
    }

    pub fn latch(&self) -> SideLatch {
        self.latch
    }

    /// The angle commanded by the most recent [`estimate`](Self::estimate).
    pub fn last_angle(&self) -> f32 {
        self.angle
    }

    /// Turn this frame's candidate lists into one bounded steering angle.
    ///
    /// Call exactly once per frame; the per-color memory is overwritten with
    /// this frame's nearest candidates as the final step. Empty candidate
    /// lists are normal inputs, not errors.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, blue, yellow), fields(blue = blue.len(), yellow = yellow.len()))
    )]
    pub fn estimate(&mut self, blue: &[MarkerCandidate], yellow: &[MarkerCandidate]) -> f32 {
        let nearest_blue = nearest(blue);
        let nearest_yellow = nearest(yellow);

        // One-time side assignment; blue gets first claim, matching the
        // deployed configuration where blue cones open the lap.
        if self.latch == SideLatch::Unresolved {
            if nearest_blue.is_some_and(|c| c.x < self.params.ego_x) {
                self.latch = SideLatch::BlueLeft;
                log::info!("side latch: blue cones on the left");
            } else if nearest_yellow.is_some_and(|c| c.x < self.params.ego_x) {
                self.latch = SideLatch::YellowLeft;
                log::info!("side latch: yellow cones on the left");
            }
        }

        let out = match (self.latch, nearest_blue, nearest_yellow) {
            // Both boundaries visible: the track is centered, go straight-ish.
            (_, Some(_), Some(_)) => self.params.straight,
            // No side resolved yet: nothing to correct against.
            (SideLatch::Unresolved, _, _) => self.params.straight,
            (SideLatch::BlueLeft, Some(c), None) => self.single_sided(ConeColor::Blue, Side::Left, c),
            (SideLatch::BlueLeft, None, Some(c)) => {
                self.single_sided(ConeColor::Yellow, Side::Right, c)
            }
            (SideLatch::YellowLeft, None, Some(c)) => {
                self.single_sided(ConeColor::Yellow, Side::Left, c)
            }
            (SideLatch::YellowLeft, Some(c), None) => {
                self.single_sided(ConeColor::Blue, Side::Right, c)
            }
            // Side known but no cone in sight: hold the previous command.
            (_, None, None) => self.angle,
        };

        self.memory[ConeColor::Blue.idx()] = nearest_blue;
        self.memory[ConeColor::Yellow.idx()] = nearest_yellow;
        self.angle = out;
        out
    }

    /// Decision branch for a frame where exactly one color is visible.
    fn single_sided(&mut self, color: ConeColor, side: Side, center: Point2<f32>) -> f32 {
        let offset = match side {
            Side::Left => center.x / self.params.ego_x,
            // reciprocal for the far-side marker; cx = 0 gives inf, which the
            // saturation bound catches
            Side::Right => self.params.ego_x / center.x,
        };
        if offset.abs() < self.params.deadband || offset.abs() > self.params.saturation {
            return self.correction(side);
        }

        // Continuation check: trust the track only when the cone kept sliding
        // toward the ego axis on its own side since the previous frame. Both
        // sides compare on x; an implausible jump or a fresh sighting takes
        // the fixed correction instead.
        let continued = match self.memory[color.idx()] {
            Some(prev) => match side {
                Side::Left => center.x > prev.x,
                Side::Right => center.x < prev.x,
            },
            None => false,
        };

        if continued {
            self.turn(side, offset)
        } else {
            self.correction(side)
        }
    }

    /// Fixed correction steering away from the visible boundary.
    fn correction(&self, side: Side) -> f32 {
        match side {
            Side::Left => -self.params.straight,
            Side::Right => self.params.straight,
        }
    }

    /// Turn-magnitude function: follow the boundary the car is tracking.
    ///
    /// A left-side cone commands a positive (left) turn, a right-side cone a
    /// negative (right) one.
    fn turn(&mut self, side: Side, offset: f32) -> f32 {
        let ceiling = self.params.carry_ceiling;
        self.angle = self.angle.clamp(-ceiling, ceiling);

        let sign = match side {
            Side::Left => 1.0,
            Side::Right => -1.0,
        };
        let angle = self.params.gain * (1.0 + offset) * sign;
        angle.clamp(-self.params.max_deflection, self.params.max_deflection)
    }
}

/// Nearest cone = lowest in the frame (largest center y, ties toward larger
/// x). Deterministic replacement for "last contour wins".
fn nearest(candidates: &[MarkerCandidate]) -> Option<Point2<f32>> {
    candidates
        .iter()
        .max_by(|a, b| {
            (a.center.y, a.center.x)
                .partial_cmp(&(b.center.y, b.center.x))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cone_track_core::Rect;

    fn cand(x: i32, y: i32) -> MarkerCandidate {
        MarkerCandidate::from_rect(Rect::new(x - 10, y - 10, 20, 20))
    }

    fn estimator() -> SteeringEstimator {
        SteeringEstimator::new(SteerParams::default()).unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        let params = SteerParams {
            ego_x: 0.0,
            ..SteerParams::default()
        };
        assert!(matches!(
            SteeringEstimator::new(params),
            Err(SteerConfigError::InvalidEgoX(_))
        ));

        let params = SteerParams {
            deadband: 0.9,
            saturation: 0.08,
            ..SteerParams::default()
        };
        assert!(matches!(
            SteeringEstimator::new(params),
            Err(SteerConfigError::InvertedOffsetBounds(..))
        ));
    }

    #[test]
    fn both_colors_always_mean_straight() {
        let mut est = estimator();
        for x in [50, 100, 200, 310] {
            let angle = est.estimate(&[cand(x, 80)], &[cand(640 - x, 80)]);
            assert_relative_eq!(angle, 0.049);
        }
    }

    #[test]
    fn no_cones_and_no_latch_mean_straight() {
        let mut est = estimator();
        assert_relative_eq!(est.estimate(&[], &[]), 0.049);
        assert_eq!(est.latch(), SideLatch::Unresolved);
    }

    #[test]
    fn right_side_cone_alone_does_not_latch() {
        let mut est = estimator();
        let angle = est.estimate(&[cand(400, 80)], &[]);
        assert_eq!(est.latch(), SideLatch::Unresolved);
        assert_relative_eq!(angle, 0.049);
    }

    #[test]
    fn tracked_left_cone_scenario() {
        let mut est = estimator();

        // first sighting: latch, no memory to compare against => correction
        let a1 = est.estimate(&[cand(100, 80)], &[]);
        assert_eq!(est.latch(), SideLatch::BlueLeft);
        assert_relative_eq!(a1, -0.049);

        // cone slides toward the ego axis: computed turn, below the bound
        let a2 = est.estimate(&[cand(150, 80)], &[]);
        assert_relative_eq!(a2, 0.09 * (1.0 + 150.0 / 320.0), epsilon = 1e-6);
        assert_relative_eq!(a2, 0.132_187_5, epsilon = 1e-6);

        // cone jumps back: continuation veto, correction again
        let a3 = est.estimate(&[cand(130, 80)], &[]);
        assert_relative_eq!(a3, -0.049);
    }

    #[test]
    fn latch_is_sticky() {
        let mut est = estimator();
        est.estimate(&[cand(100, 80)], &[]);
        assert_eq!(est.latch(), SideLatch::BlueLeft);

        // yellow showing up left of the ego axis must not steal the latch
        for _ in 0..5 {
            est.estimate(&[], &[cand(90, 80)]);
            assert_eq!(est.latch(), SideLatch::BlueLeft);
        }
    }

    #[test]
    fn right_side_turn_is_negative_and_clamped() {
        let mut est = estimator();
        est.estimate(&[cand(100, 80)], &[]); // latch blue left

        // only yellow (right boundary) visible, fresh sighting => +correction
        let a1 = est.estimate(&[], &[cand(400, 80)]);
        assert_relative_eq!(a1, 0.049);

        // moving toward the ego axis: turn right, clamped at the bound
        let a2 = est.estimate(&[], &[cand(390, 80)]);
        assert_relative_eq!(a2, -0.145_540, epsilon = 1e-6);
    }

    #[test]
    fn deadband_and_saturation_snap_to_correction() {
        let mut est = estimator();
        est.estimate(&[cand(100, 80)], &[]); // latch blue left

        // offset 20/320 = 0.0625 < deadband
        let a = est.estimate(&[cand(20, 80)], &[]);
        assert_relative_eq!(a, -0.049);

        // offset 300/320 = 0.9375 > saturation
        let a = est.estimate(&[cand(300, 80)], &[]);
        assert_relative_eq!(a, -0.049);
    }

    #[test]
    fn unchanged_candidates_take_the_correction_branch() {
        let mut est = estimator();
        est.estimate(&[cand(150, 80)], &[]);
        let repeat = est.estimate(&[cand(150, 80)], &[]);
        assert_relative_eq!(repeat, -0.049);
    }

    #[test]
    fn no_cones_while_latched_holds_previous_output() {
        let mut est = estimator();
        est.estimate(&[cand(100, 80)], &[]);
        let turning = est.estimate(&[cand(150, 80)], &[]);
        let held = est.estimate(&[], &[]);
        assert_relative_eq!(held, turning);
    }

    #[test]
    fn nearest_is_the_lowest_cone() {
        let mut est = estimator();
        // the lower (larger y) cone at x=150 must drive the decision
        est.estimate(&[cand(100, 90), cand(40, 20)], &[]);
        let a = est.estimate(&[cand(150, 90), cand(35, 20)], &[]);
        assert_relative_eq!(a, 0.09 * (1.0 + 150.0 / 320.0), epsilon = 1e-6);
    }

    #[test]
    fn output_never_exceeds_the_deflection_bound() {
        let mut est = estimator();
        let bound = est.params().max_deflection + 1e-6;
        for step in 0..200 {
            let x = (step * 7) % 640;
            let blue = if step % 3 == 0 {
                vec![cand(x, 80)]
            } else {
                Vec::new()
            };
            let yellow = if step % 4 == 0 {
                vec![cand(639 - x, 60)]
            } else {
                Vec::new()
            };
            let angle = est.estimate(&blue, &yellow);
            assert!(angle.abs() <= bound, "angle {angle} out of bounds");
        }
    }
}
