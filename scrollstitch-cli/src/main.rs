use clap::Parser;
use scrollstitch::batch::{BatchJob, BatchReport, BatchRunner};
use scrollstitch::{
    EstimatorConfig, FrameReport, FrameSource, ImageFileSink, ImageSequenceSource, ProgressEvent,
    ProgressSink, ScrollEstimator, StitchError, StitchParams, Stitcher,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Scroll-recording stitcher (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Write the effective configuration (defaults filled in) to FILE and exit.
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct StitchConfigJson {
    template_height: usize,
    quality_threshold: f32,
    min_scroll: usize,
    duplicate_threshold: f32,
    parallel: bool,
}

impl Default for StitchConfigJson {
    fn default() -> Self {
        let params = StitchParams::default();
        Self {
            template_height: params.template_height,
            quality_threshold: params.quality_threshold,
            min_scroll: params.min_scroll,
            duplicate_threshold: params.duplicate_threshold,
            parallel: false,
        }
    }
}

impl From<&StitchConfigJson> for StitchParams {
    fn from(value: &StitchConfigJson) -> Self {
        StitchParams {
            template_height: value.template_height,
            quality_threshold: value.quality_threshold,
            min_scroll: value.min_scroll,
            duplicate_threshold: value.duplicate_threshold,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct JobJson {
    source_dir: String,
    output_path: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
struct Config {
    source_dir: String,
    output_path: String,
    capture_rate: f64,
    stitch: StitchConfigJson,
    jobs: Vec<JobJson>,
    max_workers: usize,
    timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: String::new(),
            output_path: "panorama.png".to_string(),
            capture_rate: 30.0,
            stitch: StitchConfigJson::default(),
            jobs: Vec::new(),
            max_workers: 3,
            timeout_secs: 300,
        }
    }
}

/// Prints frame reports and progress lines to stdout, where supervisors read them.
struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn on_frame(&mut self, report: &FrameReport) {
        println!("{report}");
    }

    fn on_progress(&mut self, event: &ProgressEvent) {
        println!("{event}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            let code = err
                .downcast_ref::<StitchError>()
                .map_or(1, StitchError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("scrollstitch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(ExitCode::SUCCESS);
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(ExitCode::SUCCESS);
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let params = StitchParams::from(&config.stitch);
    params.validate()?;

    if let Some(path) = cli.save_config {
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        println!("Saved configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if config.jobs.is_empty() {
        run_single(&config, params)?;
        Ok(ExitCode::SUCCESS)
    } else {
        let report = run_batch(&config, params)?;
        Ok(if report.failed() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

fn run_single(config: &Config, params: StitchParams) -> Result<(), Box<dyn std::error::Error>> {
    if config.source_dir.is_empty() {
        return Err("source_dir must be set in the config (or list jobs)".into());
    }
    let source = ImageSequenceSource::open(&config.source_dir, config.capture_rate)?;
    println!(
        "Source: {} ({} frames, {} px wide, {:.1} fps)",
        config.source_dir,
        source.frame_count(),
        source.width(),
        source.capture_rate()
    );
    tracing::info!(source = %config.source_dir, "starting single run");

    let estimator = ScrollEstimator::new().with_config(EstimatorConfig {
        parallel: config.stitch.parallel,
        ..EstimatorConfig::default()
    });
    let mut stitcher = Stitcher::new(source, params)?.with_estimator(estimator);
    if config.timeout_secs > 0 {
        stitcher = stitcher.with_deadline(Duration::from_secs(config.timeout_secs));
    }

    let mut sink = ImageFileSink::new(&config.output_path);
    let summary = stitcher.run_into(&mut ConsoleProgress, &mut sink)?;
    println!("{summary}");
    println!("Saved panorama to {}", config.output_path);
    Ok(())
}

fn run_batch(
    config: &Config,
    params: StitchParams,
) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let mut runner = BatchRunner::new(params, config.max_workers)?;
    if config.timeout_secs > 0 {
        runner = runner.with_timeout(Duration::from_secs(config.timeout_secs));
    }

    let capture_rate = config.capture_rate;
    let jobs = config
        .jobs
        .iter()
        .map(|job| {
            let dir = PathBuf::from(&job.source_dir);
            let name = job_name(&dir);
            BatchJob::new(
                name,
                move || {
                    ImageSequenceSource::open(&dir, capture_rate)
                        .map(|source| Box::new(source) as Box<dyn FrameSource>)
                },
                ImageFileSink::new(&job.output_path),
            )
        })
        .collect::<Vec<_>>();

    tracing::info!(jobs = jobs.len(), workers = config.max_workers, "starting batch");
    let report = runner.run(jobs, |name, event| println!("[{name}] {event}"))?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(summary) => println!(
                "{}: {}x{} pixels, {} duplicates skipped, {:.1}s",
                outcome.name,
                summary.final_width,
                summary.final_height,
                summary.duplicates_skipped,
                outcome.elapsed.as_secs_f64()
            ),
            Err(err) => println!("{}: failed: {err}", outcome.name),
        }
    }
    println!(
        "Completed {}/{} videos in {:.1}s",
        report.succeeded(),
        report.outcomes.len(),
        report.total_elapsed.as_secs_f64()
    );
    if let Some(average) = report.average_job_secs() {
        println!("Average time per video: {average:.1}s");
    }
    Ok(report)
}

fn job_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
