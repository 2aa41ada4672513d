//! # Device Module
//!
//! Boundary to the device-access collaborator.
//!
//! Discovering and talking to controllers is not done here. A
//! [`MotionSource`] hands out, per frame and per device, the orientation
//! quaternion, the gyro rotation accumulated since the previous read, and the
//! gravity vector. [`replay::ReplaySource`] plays those frames back from a
//! JSONL recording.

pub mod replay;

use serde::Deserialize;
use std::fmt;

use crate::error::Result;
use crate::motion::axis::GravityVector;
use crate::motion::orientation::Quaternion;
use crate::motion::pointer::AngularVelocity;

/// Handle of a connected device, as assigned by the motion source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference frame the device reports gyro rotation in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GyroSpace {
    /// Raw controller axes.
    Local,
    /// Yaw about the world's vertical axis.
    World,
    /// Yaw about the player's vertical axis, leaning with the controller.
    #[default]
    Player,
}

/// Settings applied to a device once, when it first appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSettings {
    /// Frame for reported gyro rotation.
    pub gyro_space: GyroSpace,
    /// Let the device continuously recalibrate its gyro bias.
    pub auto_calibration: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            gyro_space: GyroSpace::Player,
            auto_calibration: true,
        }
    }
}

/// One frame of motion data from one device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct MotionSample {
    /// Orientation relative to the device's reference frame.
    #[serde(default)]
    pub quaternion: Quaternion,
    /// Gyro rotation accumulated and flushed since the previous read.
    #[serde(default)]
    pub gyro: AngularVelocity,
    /// Gravity direction in device-local coordinates.
    #[serde(default)]
    pub gravity: GravityVector,
}

/// Per-frame access to controller motion data.
///
/// Called from a single thread once per polling tick, in this order:
/// [`begin_frame`](MotionSource::begin_frame), then
/// [`connected_devices`](MotionSource::connected_devices), then
/// [`configure`](MotionSource::configure) for new handles and
/// [`read_motion`](MotionSource::read_motion) for every handle.
#[cfg_attr(test, mockall::automock)]
pub trait MotionSource {
    /// Prepares the next frame. Returns `false` when no more frames will come.
    fn begin_frame(&mut self) -> Result<bool>;

    /// Handles of devices connected in the current frame.
    fn connected_devices(&mut self) -> Result<Vec<DeviceId>>;

    /// Applies connect-time settings to a newly seen device.
    fn configure(&mut self, device: DeviceId, settings: &DeviceSettings) -> Result<()>;

    /// Reads the device's sample for this frame.
    ///
    /// The gyro part is flushed by the read: a second read in the same frame
    /// must not report the same rotation again.
    fn read_motion(&mut self, device: DeviceId) -> Result<Option<MotionSample>>;
}
