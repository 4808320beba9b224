use std::sync::Mutex;

#[derive(Clone, Copy, Debug, Default)]
struct ScoreState {
    reference: f32,
    hits: u64,
    frames: u64,
}

/// Off-line scoring of commanded angles against an externally received
/// ground-steering reference.
///
/// The reference arrives on a notification path while `record` runs on the
/// frame-processing path, so the shared state sits behind a mutex that is
/// held only for the read or write itself, never across I/O. The reference is
/// never used as a control input.
#[derive(Debug, Default)]
pub struct PerformanceScorer {
    state: Mutex<ScoreState>,
}

impl PerformanceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the most recently received ground-steering value.
    pub fn set_reference(&self, reference: f32) {
        if let Ok(mut state) = self.state.lock() {
            state.reference = reference;
        }
    }

    /// Score one frame's commanded angle against the current reference.
    ///
    /// A hit is: within +-0.05 of zero when the reference is zero, otherwise
    /// within [0.5, 1.5] times the reference on the reference's own side.
    pub fn record(&self, commanded: f32) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let reference = state.reference;
        let hit = if reference == 0.0 {
            commanded.abs() < 0.05
        } else if reference > 0.0 {
            reference * 0.5 < commanded && commanded < reference * 1.5
        } else {
            reference * 0.5 > commanded && commanded > reference * 1.5
        };
        state.frames += 1;
        if hit {
            state.hits += 1;
        }
        hit
    }

    /// `(hits, frames)` recorded so far.
    pub fn totals(&self) -> (u64, u64) {
        self.state
            .lock()
            .map(|s| (s.hits, s.frames))
            .unwrap_or((0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_reference_scores_a_tolerance_band() {
        let scorer = PerformanceScorer::new();
        assert!(scorer.record(0.049));
        assert!(scorer.record(-0.049));
        assert!(!scorer.record(0.051));
        assert_eq!(scorer.totals(), (2, 3));
    }

    #[test]
    fn positive_reference_scores_a_relative_band() {
        let scorer = PerformanceScorer::new();
        scorer.set_reference(0.1);
        assert!(scorer.record(0.08));
        assert!(!scorer.record(0.04)); // below 50%
        assert!(!scorer.record(0.16)); // above 150%
        assert!(!scorer.record(-0.08)); // wrong side
    }

    #[test]
    fn negative_reference_mirrors_the_band() {
        let scorer = PerformanceScorer::new();
        scorer.set_reference(-0.1);
        assert!(scorer.record(-0.08));
        assert!(!scorer.record(-0.04));
        assert!(!scorer.record(-0.16));
        assert!(!scorer.record(0.08));
    }

    #[test]
    fn reference_updates_apply_to_later_frames() {
        let scorer = PerformanceScorer::new();
        assert!(scorer.record(0.0));
        scorer.set_reference(0.2);
        assert!(!scorer.record(0.0));
        assert!(scorer.record(0.2));
        assert_eq!(scorer.totals(), (2, 3));
    }
}
