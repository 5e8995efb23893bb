use std::path::{Path, PathBuf};

use clap::Parser;

mod input;
mod output;

use output::{OutputFormat, PeakReport};
use peakdetect::config::{DetectorConfig, Frequency, Method};
use peakdetect::detect::detect;

#[derive(Parser, Debug)]
#[command(name = "peakdetect")]
#[command(about = "Find and refine peaks in sampled signals", long_about = None)]
struct Args {
    /// Input files: WAV, or text with one `[position] amplitude` per line
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Detection method (default: lookahead, or the config file's method)
    #[arg(short = 'm', long, value_enum)]
    method: Option<Method>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Lookahead in samples for the primary scan
    #[arg(long)]
    lookahead: Option<usize>,

    /// Minimum drop/rise before a peak is confirmed
    #[arg(long)]
    delta: Option<f64>,

    /// Fit window size for the parabola, sine and spline refiners
    #[arg(long)]
    points: Option<usize>,

    /// Oscillation frequency for the sine fits (e.g. "50", "20ms")
    #[arg(long)]
    frequency: Option<Frequency>,

    /// WAV channel to analyze
    #[arg(long, default_value = "0")]
    channel: u16,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    let formatter = output::create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut failed = 0;
    for path in &args.files {
        match analyze_file(path, &config, args.channel) {
            Ok(report) => println!("{}", formatter.format(&report)),
            Err(e) => {
                log::error!("{}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed", failed, args.files.len());
    }
    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };

    if let Some(method) = args.method {
        config.method = method;
    }
    if let Some(lookahead) = args.lookahead {
        config.lookahead.lookahead = lookahead;
    }
    if let Some(delta) = args.delta {
        config.lookahead.delta = delta;
        config.zero_crossing.delta = delta;
    }
    if let Some(points) = args.points {
        config.parabola.points = points;
        config.sine.points = points;
        config.spline.points = points;
    }
    if let Some(frequency) = args.frequency {
        config.sine.frequency = Some(frequency.as_hz());
    }

    config.validate()?;
    log::debug!("configuration: {:?}", config);
    Ok(config)
}

fn analyze_file(path: &Path, config: &DetectorConfig, channel: u16) -> anyhow::Result<PeakReport> {
    let source = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let signal = input::load_signal(path, channel)?;
    let detection = detect(&signal, config)?;
    log::info!(
        "{}: {} maxima, {} minima, {} refinement failure(s)",
        source,
        detection.peaks.maxima.len(),
        detection.peaks.minima.len(),
        detection.failures.len()
    );

    Ok(PeakReport {
        source,
        method: config.method,
        samples: signal.len(),
        detection,
    })
}
