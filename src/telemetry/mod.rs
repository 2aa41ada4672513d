//! # Telemetry Module
//!
//! Records per-frame motion results to JSONL files with rotation.
//!
//! This module handles:
//! - Converting frame results into serializable records
//! - Writing them as JSON Lines
//! - Rotating files after N records and retaining only the last M files

pub mod logger;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::bridge::FrameReport;

/// One telemetry line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    /// Device handle.
    pub device: u32,
    /// Orientation quaternion `[w, x, y, z]` as read (before axis reordering).
    pub quaternion: [f64; 4],
    /// Yaw in degrees.
    pub yaw_deg: f64,
    /// Pitch in degrees.
    pub pitch_deg: f64,
    /// Roll in degrees.
    pub roll_deg: f64,
    /// Wheel axis as a percentage of the maximum swing.
    pub axis_percent: f32,
    /// Horizontal pixels emitted this frame.
    pub dx: i32,
    /// Vertical pixels emitted this frame.
    pub dy: i32,
}

impl TelemetryRecord {
    /// Builds a record for `report`, timestamped now.
    #[must_use]
    pub fn from_report(report: &FrameReport) -> Self {
        let (yaw_deg, pitch_deg, roll_deg) = report.euler.to_degrees();
        let q = report.quaternion;

        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            device: report.device.0,
            quaternion: [q.w, q.x, q.y, q.z],
            yaw_deg,
            pitch_deg,
            roll_deg,
            axis_percent: report.axis_percent(),
            dx: report.delta.dx,
            dy: report.delta.dy,
        }
    }
}
