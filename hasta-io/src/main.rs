//! HastaIO - Teleoperate a robotic hand from tracked hand poses
//!
//! Tracker frames arrive as JSON lines. A recorded file is replayed one
//! cycle per frame. Live input on stdin is read on its own thread and the
//! control cycle runs at the pace of the hand's replies, always using the
//! most recent pose.

use clap::Parser;
use hasta_io::config::AppConfig;
use hasta_io::control::{
    spawn_tracker_thread, ControlCycle, CycleStats, JsonLinesSource, LogSink, PoseSlot, SlotSource,
};
use hasta_io::error::{Error, Result};
use hasta_io::transport::{SerialTransport, Transport};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hasta-io")]
#[command(about = "Drive a six-actuator robotic hand from tracked hand poses")]
struct Args {
    /// Configuration file (defaults apply if it does not exist)
    #[arg(short, long, default_value = "hasta.toml")]
    config: PathBuf,

    /// Serial port, overriding the configuration
    #[arg(long)]
    port: Option<String>,

    /// Tracker JSON-lines input ("-" or absent for stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Stop after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if path.exists() {
        Ok((AppConfig::from_file(path)?, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}

/// Replay a recorded file: one cycle per frame, nothing dropped
fn run_replay(
    cycle: &mut ControlCycle<SerialTransport>,
    path: &Path,
    sink: &mut LogSink,
    running: &AtomicBool,
    max_cycles: Option<u64>,
) -> Result<CycleStats> {
    let file = File::open(path)?;
    log::info!("Replaying tracker frames from {}", path.display());
    let mut source = JsonLinesSource::new(BufReader::new(file));
    cycle.run(&mut source, sink, running, max_cycles)
}

/// Live input on stdin: a reader thread keeps only the newest frame
fn run_live(
    cycle: &mut ControlCycle<SerialTransport>,
    sink: &mut LogSink,
    running: &Arc<AtomicBool>,
    max_cycles: Option<u64>,
) -> Result<CycleStats> {
    log::info!("Reading live tracker frames from stdin");
    let source = JsonLinesSource::new(BufReader::new(io::stdin()));
    let slot = Arc::new(PoseSlot::new());
    let tracker = spawn_tracker_thread(source, Arc::clone(&slot), Arc::clone(running))?;

    let mut poses = SlotSource::new(Arc::clone(&slot));
    let result = cycle.run(&mut poses, sink, running, max_cycles);
    running.store(false, Ordering::Relaxed);

    // A reader blocked on stdin cannot observe the flag; leave it detached
    if slot.is_closed() {
        tracker.join().map_err(|_| Error::ThreadPanic)?;
    }
    if slot.dropped() > 0 {
        log::info!("{} stale tracker frames dropped", slot.dropped());
    }
    result
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        AppConfig::default().to_file(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let (mut config, from_file) = load_config(&args.config)?;
    if let Some(port) = args.port.clone() {
        config.hardware.port = port;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("HastaIO v{} starting...", env!("CARGO_PKG_VERSION"));
    if from_file {
        log::info!("Using config: {}", args.config.display());
    } else {
        log::warn!("Config {} not found, using defaults", args.config.display());
    }
    config.validate()?;

    let mut transport = SerialTransport::open(
        &config.hardware.port,
        config.hardware.baud_rate,
        config.read_timeout(),
    )?;
    let flushed = transport.clear_input()?;
    if flushed > 0 {
        log::info!("Flushed {} stale bytes", flushed);
    }

    let mut cycle = ControlCycle::from_config(transport, &config)?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut sink = LogSink::new();
    let result = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => {
            run_replay(&mut cycle, path, &mut sink, &running, args.max_cycles)
        }
        _ => run_live(&mut cycle, &mut sink, &running, args.max_cycles),
    };

    match cycle.release() {
        Ok(reply) if reply.is_no_reply() => log::warn!("No reply to idle command"),
        Ok(_) => {}
        Err(e) => log::warn!("Failed to send idle command: {}", e),
    }

    let stats = result?;
    log::info!(
        "Stopped after {} cycles: {} replies, {} without reply, {} samples",
        stats.cycles,
        stats.replies,
        stats.no_replies,
        sink.samples()
    );
    Ok(())
}
