mod config;
mod core;
mod input;
mod output;
mod playback;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::PlaybackSettings;
use input::{open_source, RecordSource};
use output::{KmlFileSink, MemorySink, ViewStateSink};
use playback::{CancelToken, PlaybackConfig, PlaybackEngine, PlaybackSummary};

/// Replay a POS or SBET trajectory as live overview and pilot-perspective KML
/// cameras, writing one record every tick.
#[derive(Parser, Debug)]
#[command(name = "pos2kml", version, about)]
struct Args {
    /// POS or SBET file (or a CSV export of one)
    #[arg(value_name = "POS_OR_SBET_FILE_NAME")]
    file: PathBuf,

    /// Start at the requested record number
    #[arg(short = 'n', value_name = "START_RECORD_NUMBER", allow_hyphen_values = true)]
    start_record: Option<String>,

    /// Only report the start and end times
    #[arg(short = 't')]
    time_only: bool,

    /// Records to skip per tick
    #[arg(long)]
    stride: Option<u64>,

    /// Milliseconds between ticks
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Directory for overview.kml and perspective.kml
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// GPS week of the recording, for SBET time-of-week stamps
    #[arg(long, value_name = "WEEK")]
    gps_week: Option<u32>,

    /// Label of the overview ground marker
    #[arg(long, value_name = "NAME")]
    marker: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Store the effective settings in the settings file
    #[arg(long)]
    save_config: bool,

    /// Play back without writing any documents
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    /// Settings file values with command line overrides applied
    fn settings(&self) -> PlaybackSettings {
        let mut settings = PlaybackSettings::load(self.config.as_deref());

        if let Some(stride) = self.stride {
            settings.stride = stride;
        }
        if let Some(interval_ms) = self.interval_ms {
            settings.interval_ms = interval_ms;
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(week) = self.gps_week {
            settings.gps_week = week;
        }
        if let Some(marker) = &self.marker {
            settings.marker_name = marker.clone();
        }
        settings
    }

    fn start_index(&self) -> Option<u64> {
        let text = self.start_record.as_deref()?;
        let index = parse_start_record(text);
        if index.is_none() {
            debug!("Ignoring start record {:?}, starting at the first record", text);
        }
        index
    }
}

/// Lenient record number parsing: leading integer, anything after it ignored
///
/// Negative or unparsable numbers mean "start of stream".
fn parse_start_record(text: &str) -> Option<u64> {
    let text = text.trim_start();
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let number: i64 = text[..digits_end].parse().ok()?;
    u64::try_from(number).ok()
}

/// Prepare the sink, then play the source into it
async fn play(
    source: &mut dyn RecordSource,
    sink: &mut dyn ViewStateSink,
    config: &PlaybackConfig,
    cancel: CancelToken,
) -> Result<PlaybackSummary> {
    sink.prepare().await?;
    let summary = PlaybackEngine::new(source, sink, config, cancel).run().await?;
    Ok(summary)
}

async fn run(args: Args) -> Result<()> {
    let settings = args.settings();

    if args.save_config {
        let path = args
            .config
            .clone()
            .or_else(PlaybackSettings::config_path)
            .context("No settings location available")?;
        settings
            .save(&path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        info!("Saved settings to {}", path.display());
    }

    let mut source = open_source(&args.file, settings.gps_week)?;

    let span = source.time_span();
    for line in span.to_string().lines() {
        info!("{}", line);
    }
    info!("{} records over {:.3} s", source.len(), span.duration());
    if source.is_empty() {
        warn!("{} holds no records, nothing to play", source.name());
    }

    if args.time_only {
        println!("{}", span);
        return Ok(());
    }

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping playback");
            on_signal.cancel();
        }
    });

    let config = settings.playback_config(args.start_index());

    if args.dry_run {
        let mut sink = MemorySink::new(&settings.marker_name);
        play(source.as_mut(), &mut sink, &config, cancel).await?;
        if let Some(view) = sink.last_view() {
            info!("Dry run emitted {} view-states, last {:?}", sink.emits(), view);
        }
        if let (Some(overview), Some(perspective)) = (sink.overview(), sink.perspective()) {
            debug!("Last overview document:\n{}", overview);
            debug!("Last perspective document:\n{}", perspective);
        }
    } else {
        let mut sink = KmlFileSink::new(
            settings.overview_path(),
            settings.perspective_path(),
            &settings.marker_name,
        );
        play(source.as_mut(), &mut sink, &config, cancel).await?;
    }

    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("pos2kml {}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create Tokio runtime: {}", e);
            eprintln!("Failed to create Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
