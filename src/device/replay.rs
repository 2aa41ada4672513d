//! # Replay Source
//!
//! Plays back motion frames recorded as JSON Lines.
//!
//! ## Format
//!
//! One frame per line. Each frame lists the devices connected during it:
//!
//! ```text
//! {"devices":[{"device":0,"quaternion":{"w":1.0,"x":0.0,"y":0.0,"z":0.0},"gyro":{"x":0.0,"y":-3.5,"z":0.0},"gravity":{"x":0.0,"y":0.0,"z":-1.0}}]}
//! {"devices":[]}
//! ```
//!
//! Missing `quaternion`, `gyro` or `gravity` fields default to identity/zero.
//! Blank lines are skipped.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{DeviceId, DeviceSettings, MotionSample, MotionSource};
use crate::error::{MotionBridgeError, Result};
use crate::motion::pointer::AngularVelocity;

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ReplayFrame {
    /// Devices connected during this frame.
    #[serde(default)]
    pub devices: Vec<ReplayDevice>,
}

/// One device's sample within a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReplayDevice {
    /// Device handle.
    pub device: DeviceId,
    /// Motion data.
    #[serde(flatten)]
    pub sample: MotionSample,
}

/// [`MotionSource`] backed by a recorded JSONL file.
#[derive(Debug)]
pub struct ReplaySource {
    frames: Vec<ReplayFrame>,
    /// Index of the current frame; `None` before the first `begin_frame`.
    cursor: Option<usize>,
    looping: bool,
    /// Devices whose gyro was already read in the current frame.
    flushed: HashSet<DeviceId>,
    settings: HashMap<DeviceId, DeviceSettings>,
}

impl ReplaySource {
    /// Opens a recording file.
    ///
    /// # Arguments
    ///
    /// * `path` - JSONL recording
    /// * `looping` - Restart from the first frame after the last one
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, a line is not a valid frame,
    /// or the recording has no frames.
    pub fn open<P: AsRef<Path>>(path: P, looping: bool) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let source = Self::parse(&contents, looping)?;
        info!(
            "Loaded {} motion frames from {}",
            source.frames.len(),
            path.display()
        );
        Ok(source)
    }

    /// Parses a recording from JSONL text.
    ///
    /// # Examples
    ///
    /// ```
    /// use motion_bridge::device::replay::ReplaySource;
    ///
    /// let source = ReplaySource::parse(r#"{"devices":[{"device":3}]}"#, false)?;
    /// assert_eq!(source.frame_count(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(contents: &str, looping: bool) -> Result<Self> {
        let mut frames = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let frame: ReplayFrame = serde_json::from_str(line).map_err(|e| {
                MotionBridgeError::Replay(format!("line {}: {}", index + 1, e))
            })?;

            let mut seen = HashSet::new();
            for entry in &frame.devices {
                if !seen.insert(entry.device) {
                    return Err(MotionBridgeError::Replay(format!(
                        "line {}: device {} listed twice",
                        index + 1,
                        entry.device
                    )));
                }
            }

            frames.push(frame);
        }

        Self::from_frames(frames, looping)
    }

    /// Builds a source from already decoded frames.
    ///
    /// # Errors
    ///
    /// Returns error if `frames` is empty.
    pub fn from_frames(frames: Vec<ReplayFrame>, looping: bool) -> Result<Self> {
        if frames.is_empty() {
            return Err(MotionBridgeError::Replay(
                "recording contains no frames".to_string(),
            ));
        }

        Ok(Self {
            frames,
            cursor: None,
            looping,
            flushed: HashSet::new(),
            settings: HashMap::new(),
        })
    }

    /// Number of frames in the recording.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Settings most recently applied to `device`, if any.
    #[must_use]
    pub fn settings_for(&self, device: DeviceId) -> Option<&DeviceSettings> {
        self.settings.get(&device)
    }

    fn current(&self) -> Option<&ReplayFrame> {
        self.cursor.and_then(|i| self.frames.get(i))
    }
}

impl MotionSource for ReplaySource {
    fn begin_frame(&mut self) -> Result<bool> {
        let next = match self.cursor {
            None => 0,
            Some(i) => i + 1,
        };

        let next = if next >= self.frames.len() {
            if !self.looping {
                self.cursor = Some(self.frames.len());
                return Ok(false);
            }
            debug!("Replay reached end of recording, restarting");
            0
        } else {
            next
        };

        self.cursor = Some(next);
        self.flushed.clear();
        Ok(true)
    }

    fn connected_devices(&mut self) -> Result<Vec<DeviceId>> {
        Ok(self
            .current()
            .map(|frame| frame.devices.iter().map(|d| d.device).collect())
            .unwrap_or_default())
    }

    fn configure(&mut self, device: DeviceId, settings: &DeviceSettings) -> Result<()> {
        debug!(
            "Device {}: gyro space {:?}, auto calibration {}",
            device, settings.gyro_space, settings.auto_calibration
        );
        self.settings.insert(device, *settings);
        Ok(())
    }

    fn read_motion(&mut self, device: DeviceId) -> Result<Option<MotionSample>> {
        let Some(mut sample) = self
            .current()
            .and_then(|frame| frame.devices.iter().find(|d| d.device == device))
            .map(|d| d.sample)
        else {
            return Ok(None);
        };

        if !self.flushed.insert(device) {
            sample.gyro = AngularVelocity::default();
        }

        Ok(Some(sample))
    }
}
