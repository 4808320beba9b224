//! Run the steering pipeline over a directory of PNG frames.
//!
//! ```sh
//! cargo run --example track_sequence -- config.json
//! ```
//!
//! with a config like:
//!
//! ```json
//! {
//!     "frames_dir": "recordings/lap1",
//!     "annotated_dir": "out/annotated",
//!     "pipeline": { "annotate": true }
//! }
//! ```

use std::str::FromStr;
use std::{env, fs, path::PathBuf};

use log::{info, LevelFilter};
use serde::Deserialize;

use cone_track::core::init_with_level;
use cone_track::io::{annotated_to_rgb8, frame_from_rgb8};
use cone_track::{Pipeline, PipelineParams};

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    frames_dir: String,
    #[serde(default)]
    annotated_dir: Option<String>,
    #[serde(default)]
    pipeline: PipelineParams,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| LevelFilter::from_str(&v).ok())
        .unwrap_or(LevelFilter::Info);
    init_with_level(log_level)?;

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "track_sequence.json".to_string());
    let cfg: ExampleConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)?;

    let mut frames: Vec<PathBuf> = fs::read_dir(&cfg.frames_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .collect();
    frames.sort();
    info!("{} frame(s) in {}", frames.len(), cfg.frames_dir);

    if let Some(dir) = &cfg.annotated_dir {
        fs::create_dir_all(dir)?;
    }

    let mut pipeline = Pipeline::new(cfg.pipeline)?;
    for (index, path) in frames.iter().enumerate() {
        let decoded = image::ImageReader::open(path)?.decode()?.to_rgb8();
        // synthesize timestamps at 30 fps; a live deployment would carry the
        // capture instant from the camera
        let frame = frame_from_rgb8(&decoded, index as i64 * 33_333)?;
        let out = pipeline.process(&frame)?;

        info!(
            "{}; {}; angle {:+.4}; blue {}; yellow {}",
            path.display(),
            out.timestamp_us,
            out.angle,
            out.blue.len(),
            out.yellow.len()
        );

        if let (Some(dir), Some(annotated)) = (&cfg.annotated_dir, &out.annotated) {
            let file = PathBuf::from(dir).join(format!("frame_{index:05}.png"));
            annotated_to_rgb8(annotated)?.save(&file)?;
        }
    }

    info!("final latch: {:?}", pipeline.estimator().latch());
    Ok(())
}
