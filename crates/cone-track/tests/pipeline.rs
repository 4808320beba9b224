//! End-to-end pipeline behavior on synthetic camera frames.

use approx::assert_relative_eq;

use cone_track::core::{Frame, RgbImage};
use cone_track::steer::{PerformanceScorer, SideLatch};
use cone_track::{Pipeline, PipelineParams};

const BLUE: [u8; 3] = [0, 0, 255];
const YELLOW: [u8; 3] = [180, 180, 60];

const REGION_TOP: usize = 240;
const CONE_W: usize = 24;
const CONE_H: usize = 12;

/// A 640x480 frame with 24x12 cone blocks centered at the given
/// region-relative coordinates (the region is the 640x100 crop at y = 240).
fn synthetic_frame(cones: &[(usize, usize, [u8; 3])], timestamp_us: i64) -> Frame {
    let mut img = RgbImage::new(640, 480);
    for &(cx, cy, rgb) in cones {
        let x0 = cx - CONE_W / 2;
        let y0 = REGION_TOP + cy - CONE_H / 2;
        for y in y0..y0 + CONE_H {
            for x in x0..x0 + CONE_W {
                img.set_pixel(x, y, rgb);
            }
        }
    }
    Frame::new(img, timestamp_us)
}

fn exact_params() -> PipelineParams {
    PipelineParams {
        blur: None,
        ..PipelineParams::default()
    }
}

#[test]
fn tracked_blue_cone_drives_the_documented_angles() {
    let mut pipeline = Pipeline::new(exact_params()).unwrap();

    let out = pipeline
        .process(&synthetic_frame(&[(100, 86, BLUE)], 1))
        .unwrap();
    assert_eq!(out.blue.len(), 1);
    assert!(out.yellow.is_empty());
    assert_eq!(pipeline.estimator().latch(), SideLatch::BlueLeft);
    assert_relative_eq!(out.angle, -0.049);

    let out = pipeline
        .process(&synthetic_frame(&[(150, 86, BLUE)], 2))
        .unwrap();
    assert_relative_eq!(out.angle, 0.09 * (1.0 + 150.0 / 320.0), epsilon = 1e-6);

    let out = pipeline
        .process(&synthetic_frame(&[(130, 86, BLUE)], 3))
        .unwrap();
    assert_relative_eq!(out.angle, -0.049);
}

#[test]
fn both_boundaries_visible_means_straight_every_frame() {
    let mut pipeline = Pipeline::new(exact_params()).unwrap();
    for ts in 0..5 {
        let frame = synthetic_frame(&[(100 + ts as usize, 86, BLUE), (500, 86, YELLOW)], ts);
        let out = pipeline.process(&frame).unwrap();
        assert_eq!(out.blue.len(), 1, "frame {ts}");
        assert_eq!(out.yellow.len(), 1, "frame {ts}");
        assert_relative_eq!(out.angle, 0.049);
    }
}

#[test]
fn cones_outside_the_region_are_invisible() {
    let mut pipeline = Pipeline::new(exact_params()).unwrap();
    // paint directly in global coordinates, above the crop
    let mut img = RgbImage::new(640, 480);
    for y in 100..112 {
        for x in 100..124 {
            img.set_pixel(x, y, BLUE);
        }
    }
    let out = pipeline.process(&Frame::new(img, 0)).unwrap();
    assert!(out.blue.is_empty());
    assert_eq!(pipeline.estimator().latch(), SideLatch::Unresolved);
    assert_relative_eq!(out.angle, 0.049);
}

#[test]
fn pre_blur_keeps_the_detection_centered() {
    // default params include the 7x7 blur
    let mut pipeline = Pipeline::new(PipelineParams::default()).unwrap();
    let out = pipeline
        .process(&synthetic_frame(&[(100, 50, BLUE)], 0))
        .unwrap();
    assert_eq!(out.blue.len(), 1);
    let center = out.blue[0].center;
    assert!((center.x - 100.0).abs() <= 1.0, "center.x = {}", center.x);
    assert!((center.y - 50.0).abs() <= 1.0, "center.y = {}", center.y);
}

#[test]
fn annotation_is_produced_on_request_and_stays_cosmetic() {
    let mut params = exact_params();
    params.annotate = true;
    let mut pipeline = Pipeline::new(params).unwrap();

    let out = pipeline
        .process(&synthetic_frame(&[(100, 86, BLUE)], 0))
        .unwrap();
    let display = out.annotated.expect("annotation requested");
    // region geometry, not full-frame geometry
    assert_eq!(display.width(), 640);
    assert_eq!(display.height(), 100);
    // outline just above the detected box
    let rect = out.blue[0].rect;
    assert_eq!(
        display.pixel(rect.x as usize + 2, rect.y as usize - 1),
        [0, 255, 0]
    );
}

#[test]
fn angles_score_against_a_ground_reference() {
    let mut pipeline = Pipeline::new(exact_params()).unwrap();
    let scorer = PerformanceScorer::new();

    // centered track, reference agrees the car should go straight
    scorer.set_reference(0.0);
    let out = pipeline
        .process(&synthetic_frame(&[(100, 86, BLUE), (500, 86, YELLOW)], 0))
        .unwrap();
    assert!(scorer.record(out.angle));

    scorer.set_reference(0.3);
    let out = pipeline
        .process(&synthetic_frame(&[(100, 86, BLUE), (500, 86, YELLOW)], 1))
        .unwrap();
    assert!(!scorer.record(out.angle)); // 0.049 is far below 0.15

    assert_eq!(scorer.totals(), (1, 2));
}
