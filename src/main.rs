//! # Motion Bridge
//!
//! Turn game-controller motion sensors into pointer movement and a tilt axis.
//!
//! Reads motion frames from the configured source, moves the pointer from
//! gyro rotation, and reports orientation and the wheel axis value.

use anyhow::{Context, Result};
use std::env;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use motion_bridge::bridge::{FrameReport, MotionBridge};
use motion_bridge::config::{Config, LoggingConfig, PointerConfig};
use motion_bridge::device::replay::ReplaySource;
use motion_bridge::device::MotionSource;
use motion_bridge::output::uinput::UinputPointer;
use motion_bridge::output::{NullPointer, PointerBackend, PointerSink};
use motion_bridge::telemetry::logger::JsonlLogger;
use motion_bridge::telemetry::TelemetryRecord;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for daily-rotated diagnostic logs
const LOG_FILE_PREFIX: &str = "motion-bridge.log";

/// Main entry point for Motion Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber
///    - Open the motion source and the pointer sink
///
/// 2. **Main Loop** (one tick per nominal frame)
///    - Process every connected device: pointer motion, orientation, axis
///    - Print orientation and axis every `display_interval_ms`
///    - Write telemetry every `log_interval_ms` when enabled
///    - Stop on Ctrl+C or when the recording ends
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded
/// - The motion source cannot be opened or fails while running
/// - The uinput pointer cannot be created
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging)?;

    info!("Motion Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    let mut source = ReplaySource::open(&config.source.replay_path, config.source.loop_replay)
        .with_context(|| format!("Failed to open recording {}", config.source.replay_path))?;
    let mut pointer = create_pointer(&config.pointer)?;

    let mut telemetry = if config.telemetry.enabled {
        Some(JsonlLogger::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )?)
    } else {
        None
    };

    let mut bridge = MotionBridge::from_config(&config);

    let mut frame_interval = interval(config.motion.poll_period());
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let display_every = Duration::from_millis(config.telemetry.display_interval_ms);
    let log_every = Duration::from_millis(config.telemetry.log_interval_ms);
    let mut last_display: Option<Instant> = None;
    let mut last_log: Option<Instant> = None;
    let mut frame_count: u64 = 0;

    info!("Polling motion at {}Hz", config.motion.frame_rate_hz);
    info!("Press Ctrl+C to exit");

    // Main loop
    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                if !source.begin_frame()? {
                    info!("End of recording reached");
                    break;
                }

                let reports = bridge.process_frame(&mut source, &mut pointer)?;
                frame_count += 1;

                let now = Instant::now();
                if is_due(last_display, now, display_every) {
                    reports.iter().for_each(display_report);
                    last_display = Some(now);
                }

                if let Some(logger) = telemetry.as_mut() {
                    if is_due(last_log, now, log_every) {
                        for report in &reports {
                            if let Err(e) = logger.write(&TelemetryRecord::from_report(report)) {
                                warn!("Failed to write telemetry: {}", e);
                            }
                        }
                        last_log = Some(now);
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    if let Some(logger) = telemetry.as_mut() {
        logger.flush()?;
    }
    info!("Total frames processed: {}", frame_count);

    Ok(())
}

/// Set up the tracing subscriber
///
/// Logs to stdout, or to a daily-rotated file when `dir` is set. The returned
/// guard must be kept alive until exit so buffered lines are written.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = config.level.parse()?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if config.dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}

/// Create the configured pointer sink
fn create_pointer(config: &PointerConfig) -> Result<Box<dyn PointerSink>> {
    match config.backend {
        PointerBackend::Uinput => Ok(Box::new(UinputPointer::create(&config.device_name)?)),
        PointerBackend::None => {
            info!("Pointer output disabled (dry run)");
            Ok(Box::new(NullPointer))
        }
    }
}

/// True when `every` has elapsed since `last`, or nothing was emitted yet
fn is_due(last: Option<Instant>, now: Instant, every: Duration) -> bool {
    last.map_or(true, |last| now.duration_since(last) >= every)
}

fn display_report(report: &FrameReport) {
    let (yaw, pitch, roll) = report.euler.to_degrees();
    info!(
        "Device {}: wheel {:.1}%  Yaw = {:.2}, Pitch = {:.2}, Roll = {:.2}",
        report.device,
        report.axis_percent(),
        yaw,
        pitch,
        roll
    );
}
