use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colorseek::annotate::{draw_detection, tint_mask};
use colorseek::detect::io::{DetectConfig, DetectReport, IoError};
use colorseek::frame::{Encoding, RawFrame};
use colorseek::stream::{
    run, DetectionSink, FrameSource, ImageFileSource, JsonLinesSink, QueueSource, ReportSink,
    RunSummary, Tee,
};
use colorseek::detect::DetectionTrace;
use colorseek::{DetectionResult, Error, Frame};
use image::Rgb;
use log::LevelFilter;

const MASK_TINT: Rgb<u8> = Rgb([255, 0, 255]);

#[derive(Parser, Debug)]
#[command(
    name = "colorseek",
    version,
    about = "Find one colored object per camera frame and report its box"
)]
struct Cli {
    /// Log level for the stderr logger.
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    /// Use the tracing subscriber (span timings) instead of the plain logger.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run detection on PNG/JPEG files or directories of them.
    Detect {
        /// Image files or directories.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Run detection on a raw pixel dump (one captured camera frame).
    Raw {
        input: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// rgb8, bgr8, rgba8, bgra8 or mono8.
        #[arg(long, default_value = "bgr8")]
        encoding: Encoding,
        /// Row stride in bytes; defaults to tightly packed rows.
        #[arg(long)]
        step: Option<usize>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Print the default configuration as JSON.
    DefaultConfig,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// JSON detector configuration; defaults apply for missing fields.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Where to write the JSON report (overrides `output_path` from the config).
    #[arg(long)]
    report: Option<PathBuf>,
    /// Stream one JSON line per frame to stdout instead of the text summary.
    #[arg(long)]
    json_lines: bool,
    /// Save each frame with the search mask tinted and the box drawn.
    #[arg(long)]
    annotate_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> Result<(), Error> {
    match command {
        Command::Detect { inputs, out } => {
            let mut source = collect_inputs(&inputs)?;
            detect_stream(&mut source, &out)?;
        }
        Command::Raw {
            input,
            width,
            height,
            encoding,
            step,
            out,
        } => {
            let mut raw = RawFrame::packed(width, height, encoding, fs::read(&input)?);
            if let Some(step) = step {
                raw.step = step;
            }
            let mut source = QueueSource::default();
            source.push(input.display().to_string(), raw);
            detect_stream(&mut source, &out)?;
        }
        Command::DefaultConfig => {
            let json = serde_json::to_string_pretty(&default_config()).map_err(IoError::from)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    if cli.trace {
        colorseek::init_tracing(false);
        return;
    }
    let _ = colorseek::core::init_with_level(cli.log_level);
}

/// Every field spelled out, so the printed file is a complete template.
fn default_config() -> DetectConfig {
    let params = DetectConfig::default().build_params();
    DetectConfig {
        color_band: Some(params.color_band),
        pre_search: Some(params.pre_search),
        post_search: Some(params.post_search),
        selection: Some(params.selection),
        blur_sigma: params.blur_sigma,
        output_path: None,
    }
}

fn collect_inputs(inputs: &[PathBuf]) -> io::Result<ImageFileSource> {
    let mut source = ImageFileSource::new(Vec::new());
    for input in inputs {
        if input.is_dir() {
            let mut dir = ImageFileSource::from_dir(input)?;
            log::info!("{}: {} image(s)", input.display(), dir.remaining());
            source.append(&mut dir);
        } else {
            source.push(input.clone());
        }
    }
    Ok(source)
}

fn detect_stream(source: &mut dyn FrameSource, out: &OutputArgs) -> Result<(), Error> {
    let cfg = match &out.config {
        Some(path) => DetectConfig::load_json(path)?,
        None => DetectConfig::default(),
    };
    let detector = cfg.build_detector()?;
    log::debug!("detector params: {:?}", detector.params());

    if let Some(dir) = &out.annotate_dir {
        fs::create_dir_all(dir)?;
    }
    let mut reports = ReportSink::default();
    let mut annotate = AnnotateSink {
        dir: out.annotate_dir.as_deref(),
    };

    let summary: RunSummary = if out.json_lines {
        let mut lines = JsonLinesSink::new(io::stdout().lock());
        let summary = run(
            &detector,
            source,
            &mut Tee(&mut reports, Tee(&mut annotate, &mut lines)),
        );
        let _stdout = lines.finish()?;
        summary
    } else {
        run(&detector, source, &mut Tee(&mut reports, &mut annotate))
    };

    let mut report = DetectReport::new(detector.params().clone(), out.config.as_deref());
    report.frames = reports.frames;
    let report_path = out.report.clone().unwrap_or_else(|| cfg.output_path());
    report.write_json(&report_path)?;

    if !out.json_lines {
        for frame in &report.frames {
            match (&frame.detection, &frame.error) {
                (Some(det), _) => println!("{}: {}", frame.frame, describe(det)),
                (None, Some(err)) => println!("{}: skipped ({err})", frame.frame),
                (None, None) => {}
            }
        }
    }
    log::info!(
        "{} detected, {} acquired; report written to {}",
        summary.detected,
        summary.acquired,
        report_path.display()
    );
    Ok(())
}

fn describe(det: &DetectionResult) -> String {
    match det.bbox {
        Some(b) => format!(
            "bbox=({}, {}, {}, {}) acquired={}",
            b.x, b.y, b.width, b.height, det.acquired
        ),
        None => format!("no detection acquired={}", det.acquired),
    }
}

/// Saves each frame with the search mask tinted and the box drawn, when a
/// directory is set.
struct AnnotateSink<'a> {
    dir: Option<&'a Path>,
}

impl DetectionSink for AnnotateSink<'_> {
    fn emit(&mut self, _label: &str, _frame: &Frame, _result: &DetectionResult) {}

    fn wants_trace(&self) -> bool {
        self.dir.is_some()
    }

    fn emit_trace(&mut self, label: &str, frame: &Frame, trace: &DetectionTrace) {
        let Some(dir) = self.dir else {
            return;
        };
        let mut canvas = frame.clone();
        tint_mask(&mut canvas, &trace.search_mask, MASK_TINT);
        draw_detection(&mut canvas, &trace.result);

        let stem = Path::new(label)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        let path = dir.join(format!("{stem}_annotated.png"));
        if let Err(err) = canvas.save(&path) {
            log::error!("cannot write {}: {err}", path.display());
        }
    }
}
