use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;

use facetrack_core::detection::infrastructure::onnx_model::OnnxModel;
use facetrack_core::detection::infrastructure::tiny_face_detector::TinyFaceDetector;
use facetrack_core::estimation::domain::expression_estimator::ExpressionWeights;
use facetrack_core::estimation::domain::orientation::Orientation;
use facetrack_core::landmarks::infrastructure::landmark_net68::LandmarkNet68;
use facetrack_core::rig::domain::avatar_rig::{AvatarRig, RigPose};
use facetrack_core::shared::bounding_box::ScoredBox;
use facetrack_core::shared::config::TrackerConfig;
use facetrack_core::shared::constants::{DETECTOR_MODEL_NAME, LANDMARK_MODEL_NAME};
use facetrack_core::shared::error::TrackingError;
use facetrack_core::shared::frame::Frame;
use facetrack_core::shared::model_resolver;
use facetrack_core::tracking::domain::tracking_result::LastKnownOutput;
use facetrack_core::tracking::domain::tracking_scheduler::TrackingScheduler;
use facetrack_core::tracking::infrastructure::threaded_tracker::ThreadedTracker;
use facetrack_core::video::domain::frame_source::FrameSource;
use facetrack_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Track a face across image frames and print per-frame signals as JSON lines.
#[derive(Parser)]
#[command(name = "facetrack")]
struct Cli {
    /// Input image files, played back in the given order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Face detector model: a path, or a file name looked up in --model-dir
    /// and the model cache.
    #[arg(long, default_value = DETECTOR_MODEL_NAME)]
    detector_model: String,

    /// 68-point landmark model: a path or a file name, as for --detector-model.
    #[arg(long, default_value = LANDMARK_MODEL_NAME)]
    landmark_model: String,

    /// Directory searched for model files given by name.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// JSON file with tracker settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Detector input size in pixels (multiple of 32).
    #[arg(long)]
    input_size: Option<u32>,

    /// Face detection score threshold (0.0-1.0).
    #[arg(long)]
    score_threshold: Option<f64>,

    /// Milliseconds before a cached face box is re-detected.
    #[arg(long)]
    detect_interval_ms: Option<u64>,

    /// Presentation interval per frame in milliseconds.
    #[arg(long, default_value = "33")]
    frame_interval_ms: u64,
}

/// One output line.
#[derive(Serialize)]
struct FrameReport<'a> {
    frame: usize,
    /// Whether the tracker took this frame (false while it was busy).
    submitted: bool,
    face: Option<&'a ScoredBox>,
    orientation: Orientation,
    expressions: ExpressionWeights,
    rig: RigPose,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = load_config(&cli)?;

    let scheduler = build_scheduler(&cli, &config)?;
    let tracker = ThreadedTracker::spawn(scheduler);
    let mut source = ImageSequenceReader::new(cli.inputs.clone());

    log::info!(
        "Tracking {} frame(s) at {} ms per frame",
        source.len_hint().unwrap_or(0),
        cli.frame_interval_ms
    );

    let stats = track_frames(
        tracker,
        source.frames(),
        Duration::from_millis(cli.frame_interval_ms),
        &mut io::stdout().lock(),
    )?;
    log::info!(
        "Submitted {} frame(s), tracked a face in {}",
        stats.submitted,
        stats.tracked
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct RunStats {
    submitted: usize,
    tracked: usize,
}

/// Present each frame for `interval`, writing one report line per frame.
///
/// The last frame waits for the tracker to finish whatever is in flight, so
/// its report reflects every submitted frame.
fn track_frames<I, W>(
    mut tracker: ThreadedTracker,
    frames: I,
    interval: Duration,
    out: &mut W,
) -> Result<RunStats, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = Result<Frame, TrackingError>>,
    W: Write,
{
    let mut frames = frames.into_iter().peekable();
    let mut output = LastKnownOutput::new();
    let mut rig = AvatarRig::new();
    let mut stats = RunStats::default();

    while let Some(frame) = frames.next() {
        let tick = Instant::now();
        let frame = frame?;
        let index = frame.index();

        let submitted = tracker.submit(frame);
        if submitted {
            stats.submitted += 1;
        }

        if frames.peek().is_some() {
            let elapsed = tick.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        } else {
            tracker.shutdown();
        }

        for tracked in tracker.poll() {
            if tracked.result.is_some() {
                stats.tracked += 1;
            }
            output.record(tracked.result);
        }

        let orientation = output.orientation();
        let expressions = output.expressions();
        let report = FrameReport {
            frame: index,
            submitted,
            face: output.face(),
            orientation,
            expressions,
            rig: rig.update(&orientation, &expressions),
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    }

    Ok(stats)
}

fn build_scheduler(
    cli: &Cli,
    config: &TrackerConfig,
) -> Result<TrackingScheduler, Box<dyn std::error::Error>> {
    let model_dir = cli.model_dir.as_deref();

    log::info!("Resolving model: {}", cli.detector_model);
    let detector_path = model_resolver::resolve(&cli.detector_model, model_dir)?;
    log::info!("Resolving model: {}", cli.landmark_model);
    let landmark_path = model_resolver::resolve(&cli.landmark_model, model_dir)?;

    let detector = TinyFaceDetector::new(Box::new(OnnxModel::load(&detector_path)?), config);
    let landmarker = LandmarkNet68::new(Box::new(OnnxModel::load(&landmark_path)?));
    Ok(TrackingScheduler::new(
        Box::new(detector),
        Box::new(landmarker),
        config,
    ))
}

fn load_config(cli: &Cli) -> Result<TrackerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_json_file(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(size) = cli.input_size {
        config.detector_input_size = size;
    }
    if let Some(threshold) = cli.score_threshold {
        config.score_threshold = threshold;
    }
    if let Some(ms) = cli.detect_interval_ms {
        config.redetect_interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(missing) = cli.inputs.iter().find(|p| !p.exists()) {
        return Err(format!("Input file not found: {}", missing.display()).into());
    }
    if cli.frame_interval_ms == 0 {
        return Err("Frame interval must be at least 1 ms".into());
    }
    Ok(())
}
