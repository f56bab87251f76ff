//! CLI application for facial width-to-height ratio measurement.
//!
//! Usage:
//!   fwhr measure <image>                      # Human-readable output
//!   fwhr measure <image> --json               # JSON output
//!   fwhr measure <image> --annotate box.jpg   # Also save the image with the box drawn
//!   fwhr bulk <folder> --sort ratio           # CSV report for a folder
//!
//! Without the `detect` feature landmarks are read from `<image>.landmarks.json`
//! (or `--landmarks FILE`).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fwhr::annotate::save_annotated;
use fwhr::bulk::{run_bulk, save_csv, SortBy, REPORT_FILENAME};
use fwhr::{
    measure_image, Config, FwhrOptions, HeightMethod, LandmarkSource, Measurement, SidecarSource,
    TopLine,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fwhr")]
#[command(author, version, about = "Facial width-to-height ratio measurement", long_about = None)]
struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure one face in one image
    Measure {
        /// Input image file
        image: PathBuf,

        /// Landmark JSON file (default: <image>.landmarks.json)
        #[arg(long)]
        landmarks: Option<PathBuf>,

        /// Face to measure, in detection order (1-based)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        face: u32,

        /// Save a copy of the image with the fWHR box drawn
        #[arg(long)]
        annotate: Option<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        opts: MeasureOpts,
    },
    /// Measure every .jpg/.png in a folder and write a CSV report
    Bulk {
        /// Folder containing the images
        folder: PathBuf,

        /// Sort the report by filename or ratio
        #[arg(long, default_value = "filename")]
        sort: SortBy,

        /// Report file (default: <folder>/fwhr_ratios.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        opts: MeasureOpts,
    },
}

#[derive(Args, Debug)]
struct MeasureOpts {
    /// Top line of the box: eyelid or eyebrow [env: FWHR_TOP]
    #[arg(long)]
    top: Option<TopLine>,

    /// Height from the left side, right side or their average [env: FWHR_METHOD]
    #[arg(long)]
    method: Option<HeightMethod>,

    /// Measure even if the face is not looking straight at the camera
    #[arg(long)]
    skip_pose_check: bool,

    /// Face detector model [env: FWHR_DETECTOR_MODEL]
    #[cfg(feature = "detect")]
    #[arg(long)]
    detector: Option<PathBuf>,

    /// dlib 68-point landmark model [env: FWHR_PREDICTOR_MODEL]
    #[cfg(feature = "detect")]
    #[arg(long)]
    predictor: Option<PathBuf>,

    /// Minimum face size for detection [env: FWHR_MIN_FACE_SIZE]
    #[cfg(feature = "detect")]
    #[arg(long)]
    min_face_size: Option<u32>,
}

impl MeasureOpts {
    fn fwhr_options(&self, config: &Config) -> FwhrOptions {
        FwhrOptions {
            top: self.top.unwrap_or(config.top),
            method: self.method.unwrap_or(config.method),
            pose_check: config.pose_check && !self.skip_pose_check,
        }
    }

    #[cfg_attr(not(feature = "detect"), allow(unused_variables))]
    fn landmark_source(
        &self,
        config: &Config,
        sidecar: Option<&Path>,
    ) -> anyhow::Result<Box<dyn LandmarkSource>> {
        if let Some(path) = sidecar {
            return Ok(Box::new(SidecarSource::with_path(path)));
        }

        #[cfg(feature = "detect")]
        let source: Box<dyn LandmarkSource> = {
            let detector = self.detector.as_ref().unwrap_or(&config.detector_model);
            let predictor = self.predictor.as_ref().unwrap_or(&config.predictor_model);
            let min_face_size = self.min_face_size.unwrap_or(config.min_face_size);
            Box::new(
                fwhr::dlib::DlibSource::open(detector, predictor, min_face_size)
                    .context("failed to load detection models")?,
            )
        };

        #[cfg(not(feature = "detect"))]
        let source: Box<dyn LandmarkSource> = Box::new(SidecarSource::new());

        Ok(source)
    }
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct MeasureOutput {
    image: String,
    /// Face index (1-based)
    face: u32,
    #[serde(flatten)]
    measurement: Measurement,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> anyhow::Result<()> {
    let config = Config::from_env();
    tracing::debug!(?config, "configuration");

    match command {
        Command::Measure {
            image,
            landmarks,
            face,
            annotate,
            json,
            output,
            opts,
        } => {
            let options = opts.fwhr_options(&config);
            let mut source = opts.landmark_source(&config, landmarks.as_deref())?;

            let measurement = measure_image(source.as_mut(), &image, face as usize - 1, &options)
                .with_context(|| format!("failed to measure {}", image.display()))?;

            if let Some(ref path) = annotate {
                save_annotated(&image, path, &measurement.fwhr_box)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }

            let result = MeasureOutput {
                image: image.display().to_string(),
                face,
                measurement,
            };
            let output_str = if json {
                serde_json::to_string_pretty(&result)?
            } else {
                format_human_readable(&result)
            };

            if let Some(ref path) = output {
                std::fs::write(path, &output_str)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(output = %path.display(), "output written");
            } else {
                println!("{output_str}");
            }
        }
        Command::Bulk {
            folder,
            sort,
            output,
            opts,
        } => {
            let options = opts.fwhr_options(&config);
            let mut source = opts.landmark_source(&config, None)?;

            let rows = run_bulk(source.as_mut(), &folder, &options, sort)
                .with_context(|| format!("failed to scan {}", folder.display()))?;

            let report = output.unwrap_or_else(|| folder.join(REPORT_FILENAME));
            save_csv(&report, &rows)
                .with_context(|| format!("failed to write {}", report.display()))?;

            let measured = rows.iter().filter(|r| r.ratio.is_some()).count();
            println!(
                "Measured {measured}/{} images, report written to {}",
                rows.len(),
                report.display()
            );
        }
    }

    Ok(())
}

fn format_human_readable(output: &MeasureOutput) -> String {
    let m = &output.measurement;
    let mut s = String::new();

    s.push_str(&format!("Image: {} (face {})\n", output.image, output.face));
    s.push_str(&format!(
        "The facial width-to-height ratio is: {:.4}\n",
        m.ratio
    ));
    s.push_str(&format!(
        "  Width:  {:.1}px\n  Height: {:.1}px ({} to upper lip, {})\n",
        m.width, m.height, m.options.top, m.options.method
    ));

    if let Some(pose) = m.pose {
        let verdict = if pose.is_frontal() { "frontal" } else { "not frontal" };
        s.push_str(&format!("  Pose:   {verdict} ({pose})\n"));
    }

    s
}
