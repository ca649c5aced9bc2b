//! Terminal consumer: prints the dominant harmonic of the live input
//!
//! Press Enter to stop.

use anyhow::{Context, Result};
use clap::Parser;
use harmonic_scope::audio::{list_input_devices, ToneSource};
use harmonic_scope::engine::{
    AnalysisLoop, AnalysisOutput, HarmonicMonitor, Mailbox, ShutdownSignal,
};
use harmonic_scope::{load_config, AnalysisConfig, WindowType};
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "harmonic-monitor", about = "Live dominant-frequency monitor")]
struct Cli {
    /// TOML file with analysis settings (flags override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Samples per analysis frame (power of 2)
    #[arg(long)]
    frame_size: Option<usize>,

    /// Lowest frequency considered for the peak (Hz)
    #[arg(long)]
    min_frequency: Option<f64>,

    /// Upper search bound as a fraction of the sample rate
    #[arg(long)]
    max_fraction: Option<f64>,

    /// Analysis window: hann, hamming, blackman, rectangular
    #[arg(long)]
    window: Option<WindowType>,

    /// Input device name (default input when omitted)
    #[arg(short, long)]
    device: Option<String>,

    /// Analyze a synthetic tone at this frequency instead of the microphone
    #[arg(long)]
    tone: Option<f64>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Display refresh interval in milliseconds
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(v) = self.sample_rate {
            config.sample_rate = v;
        }
        if let Some(v) = self.frame_size {
            config.frame_size = v;
        }
        if let Some(v) = self.min_frequency {
            config.min_frequency_hz = v;
        }
        if let Some(v) = self.max_fraction {
            config.max_frequency_fraction = v;
        }
        if let Some(v) = self.window {
            config.window = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        let devices = list_input_devices().context("Failed to list input devices")?;
        println!("Input devices:");
        for d in &devices {
            println!("  {} ({} Hz, {} ch)", d.name, d.sample_rate, d.channels);
        }
        return Ok(());
    }

    let config = cli.analysis_config()?;
    let shutdown = ShutdownSignal::new();
    watch_stdin(shutdown.clone());

    let interval = Duration::from_millis(cli.interval_ms.max(1));

    match cli.tone {
        Some(freq) => run_tone(&cli, config, freq, shutdown, interval),
        None => run_device(&cli, config, shutdown, interval),
    }
}

fn run_tone(
    cli: &Cli,
    config: AnalysisConfig,
    freq: f64,
    shutdown: ShutdownSignal,
    interval: Duration,
) -> Result<()> {
    let source = ToneSource::sine(config.sample_rate, freq, 0.8).with_realtime_pacing(true);
    let mailbox = Mailbox::new();

    let mut analysis_loop = AnalysisLoop::new(source, config, mailbox.clone(), shutdown.clone())?;
    if let Some(frames) = cli.frames {
        analysis_loop = analysis_loop.with_max_frames(frames);
    }

    let handle = std::thread::spawn(move || analysis_loop.run());
    display_until(&mailbox, &shutdown, interval, || handle.is_finished(), None)?;

    shutdown.trigger();
    let report = handle
        .join()
        .map_err(|_| anyhow::anyhow!("analysis thread panicked"))??;
    log::info!("Processed {} frame(s)", report.frames_processed);
    Ok(())
}

fn run_device(
    cli: &Cli,
    config: AnalysisConfig,
    shutdown: ShutdownSignal,
    interval: Duration,
) -> Result<()> {
    let mut monitor = match &cli.device {
        Some(name) => HarmonicMonitor::new(config).with_device(name.clone()),
        None => HarmonicMonitor::new(config),
    };

    let info = monitor.start().context("Failed to start audio capture")?;
    println!("Listening on '{}' at {} Hz - press Enter to stop", info.name, info.sample_rate);

    let mailbox = monitor.results();
    let limit = cli.frames;
    let done = || !monitor.is_running();
    display_until(&mailbox, &shutdown, interval, done, limit)?;

    if let Some(outcome) = monitor.stop() {
        let report = outcome?;
        log::info!(
            "Processed {} frame(s), {} timeout(s)",
            report.frames_processed,
            report.timeouts
        );
    }
    Ok(())
}

/// Print the newest estimate every `interval` until shutdown or the producer ends
fn display_until(
    mailbox: &Mailbox<AnalysisOutput>,
    shutdown: &ShutdownSignal,
    interval: Duration,
    done: impl Fn() -> bool,
    frame_limit: Option<u64>,
) -> Result<()> {
    let mut out = stdout();

    while !shutdown.is_triggered() {
        let finished = done();

        if let Some(output) = mailbox.take() {
            write!(
                out,
                "\rPrimary harmonic: {:>9.2} Hz  (peak {:.3}, frame {})   ",
                output.harmonic_hz, output.peak_magnitude, output.sequence
            )?;
            out.flush()?;

            if frame_limit.map_or(false, |limit| output.sequence + 1 >= limit) {
                break;
            }
        }

        if finished {
            break;
        }
        std::thread::sleep(interval);
    }

    writeln!(out)?;
    Ok(())
}

/// Trigger shutdown when a line (Enter) arrives on stdin
fn watch_stdin(shutdown: ShutdownSignal) {
    std::thread::spawn(move || {
        let mut line = String::new();
        if let Ok(n) = std::io::stdin().read_line(&mut line) {
            if n > 0 {
                shutdown.trigger();
            }
        }
    });
}
