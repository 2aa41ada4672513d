//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! All values are read once at startup; nothing is reloaded while running.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::device::{DeviceSettings, GyroSpace};
use crate::error::{MotionBridgeError, Result};
use crate::motion::axis::{AxisMapper, GravityComponent, DEFAULT_MAX_ANGLE_DEG};
use crate::motion::orientation::AxisOrder;
use crate::motion::pointer::SensitivityConfig;
use crate::output::PointerBackend;

/// Upper bound on device handles queried per frame.
pub const MAX_DEVICES: usize = 16;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub motion: MotionConfig,
    pub axis: AxisConfig,
    pub device: DeviceConfig,
    pub pointer: PointerConfig,
    pub source: SourceConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// Gyro-to-pointer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MotionConfig {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    #[serde(default = "default_tightening")]
    pub tightening: f32,

    /// Nominal polling rate; one frame lasts `1 / frame_rate_hz` seconds.
    #[serde(default = "default_frame_rate_hz")]
    pub frame_rate_hz: f32,

    #[serde(default)]
    pub axis_order: AxisOrder,
}

/// Tilt axis configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AxisConfig {
    #[serde(default = "default_max_angle_deg")]
    pub max_angle_deg: f32,

    #[serde(default)]
    pub offset_deg: f32,

    #[serde(default = "default_component_a")]
    pub component_a: GravityComponent,

    #[serde(default = "default_component_b")]
    pub component_b: GravityComponent,
}

/// Settings applied to each device when it connects
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_max_devices")]
    pub max_devices: usize,

    #[serde(default)]
    pub gyro_space: GyroSpace,

    #[serde(default = "default_auto_calibration")]
    pub auto_calibration: bool,
}

/// Pointer output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PointerConfig {
    #[serde(default)]
    pub backend: PointerBackend,

    #[serde(default = "default_pointer_device_name")]
    pub device_name: String,
}

/// Motion sample source configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_replay_path")]
    pub replay_path: String,

    #[serde(default)]
    pub loop_replay: bool,
}

/// Telemetry and display configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_display_interval_ms")]
    pub display_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rotated log files. Empty logs to stdout only.
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_sensitivity() -> f32 { 0.5 }
fn default_tightening() -> f32 { 2.0 }
fn default_frame_rate_hz() -> f32 { 60.0 }

fn default_max_angle_deg() -> f32 { DEFAULT_MAX_ANGLE_DEG }
fn default_component_a() -> GravityComponent { GravityComponent::X }
fn default_component_b() -> GravityComponent { GravityComponent::Z }

fn default_max_devices() -> usize { MAX_DEVICES }
fn default_auto_calibration() -> bool { true }

fn default_pointer_device_name() -> String { "Motion Bridge Pointer".to_string() }

fn default_replay_path() -> String { "recordings/sample.jsonl".to_string() }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }
fn default_display_interval_ms() -> u64 { 500 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl MotionConfig {
    /// Sensitivity and tightening for the pointer path.
    #[must_use]
    pub fn sensitivity_config(&self) -> SensitivityConfig {
        SensitivityConfig::new(self.sensitivity, self.tightening)
    }

    /// Nominal frame length in seconds.
    #[must_use]
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate_hz
    }

    /// Polling period for the main loop timer.
    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs_f32(self.frame_duration())
    }
}

impl AxisConfig {
    /// Builds the gravity-to-axis mapper.
    #[must_use]
    pub fn axis_mapper(&self) -> AxisMapper {
        AxisMapper::new(
            self.component_a,
            self.component_b,
            self.max_angle_deg,
            self.offset_deg.to_radians(),
        )
    }
}

impl DeviceConfig {
    /// Settings handed to the motion source for each new device.
    #[must_use]
    pub fn device_settings(&self) -> DeviceSettings {
        DeviceSettings {
            gyro_space: self.gyro_space,
            auto_calibration: self.auto_calibration,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> MotionBridgeError {
    MotionBridgeError::Config(toml::de::Error::custom(message))
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(invalid(format!("{} must be between {} and {}", name, min, max)));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use motion_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Motion
        check_range("sensitivity", self.motion.sensitivity, 0.0, 100.0)?;
        check_range("tightening", self.motion.tightening, 0.0, 100.0)?;
        check_range("frame_rate_hz", self.motion.frame_rate_hz, 1.0, 1000.0)?;

        // Axis; a tiny max angle would blow up the normalization
        check_range("max_angle_deg", self.axis.max_angle_deg, 1.0, 180.0)?;
        check_range("offset_deg", self.axis.offset_deg, -180.0, 180.0)?;

        if self.axis.component_a == self.axis.component_b {
            return Err(invalid("component_a and component_b must be different axes"));
        }

        // Devices
        if self.device.max_devices == 0 || self.device.max_devices > MAX_DEVICES {
            return Err(invalid(format!("max_devices must be between 1 and {}", MAX_DEVICES)));
        }

        // Pointer
        if self.pointer.backend == PointerBackend::Uinput && self.pointer.device_name.trim().is_empty() {
            return Err(invalid("pointer device_name cannot be empty for the uinput backend"));
        }

        // Source
        if self.source.replay_path.is_empty() {
            return Err(invalid("replay_path cannot be empty"));
        }

        // Telemetry
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(invalid("log_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.display_interval_ms == 0 || self.telemetry.display_interval_ms > 60000 {
            return Err(invalid("display_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        // Logging
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}
