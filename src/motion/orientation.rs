//! # Orientation Module
//!
//! Converts the controller's orientation quaternion into yaw/pitch/roll
//! Euler angles (aerospace Z-Y-X convention).
//!
//! ## Formulas
//!
//! | Angle | Formula |
//! |-------|---------|
//! | Roll  | `atan2(2(wx + yz), 1 - 2(x² + y²))` |
//! | Pitch | `asin(2(wy - zx))`, clamped to ±90° when the argument leaves [-1, 1] |
//! | Yaw   | `atan2(2(wz + xy), 1 - 2(y² + z²))` |
//!
//! ## Gimbal Lock
//!
//! When pitch reaches ±90° yaw and roll describe the same rotation and can no
//! longer be separated. The conversion still returns a value (pitch is clamped
//! with the sign of its sine), but converting those angles back to a
//! quaternion and again to Euler angles may redistribute yaw and roll.
//!
//! ## Axis Order
//!
//! Controllers do not agree on which quaternion component belongs to which
//! physical axis. [`AxisOrder`] makes the mapping explicit instead of
//! shuffling arguments at the call site.
//!
//! ## Usage
//!
//! ```
//! use motion_bridge::motion::orientation::{quaternion_to_euler, rad_to_deg, Quaternion};
//!
//! let euler = quaternion_to_euler(Quaternion::new(0.7071, 0.7071, 0.0, 0.0));
//! assert!((rad_to_deg(euler.roll) - 90.0).abs() < 0.01);
//! ```

use serde::Deserialize;
use std::f64::consts::FRAC_PI_2;

/// Orientation quaternion as reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Quaternion {
    /// Scalar component.
    pub w: f64,
    /// X (i) component.
    pub x: f64,
    /// Y (j) component.
    pub y: f64,
    /// Z (k) component.
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The "no rotation" quaternion.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a quaternion from its components.
    #[must_use]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Builds a quaternion from yaw/pitch/roll (radians) using the same
    /// convention as [`quaternion_to_euler`].
    ///
    /// # Examples
    ///
    /// ```
    /// use motion_bridge::motion::orientation::{quaternion_to_euler, Quaternion};
    ///
    /// let q = Quaternion::from_euler(0.3, -0.2, 1.1);
    /// let euler = quaternion_to_euler(q);
    /// assert!((euler.yaw - 0.3).abs() < 1e-9);
    /// assert!((euler.pitch + 0.2).abs() < 1e-9);
    /// assert!((euler.roll - 1.1).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn from_euler(yaw: f64, pitch: f64, roll: f64) -> Self {
        let (sy, cy) = (yaw * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sr, cr) = (roll * 0.5).sin_cos();

        Self {
            w: cr * cp * cy + sr * sp * sy,
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
        }
    }

    /// Euclidean norm of the four components.
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Yaw/pitch/roll in radians, valid only for the sample it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    /// Rotation about the vertical axis, (-π, π].
    pub yaw: f64,
    /// Rotation about the lateral axis, [-π/2, π/2].
    pub pitch: f64,
    /// Rotation about the longitudinal axis, (-π, π].
    pub roll: f64,
}

impl EulerAngles {
    /// Returns `(yaw, pitch, roll)` converted to degrees for display.
    #[must_use]
    pub fn to_degrees(&self) -> (f64, f64, f64) {
        (rad_to_deg(self.yaw), rad_to_deg(self.pitch), rad_to_deg(self.roll))
    }
}

/// Which sensor component feeds which quaternion slot.
///
/// The converter always reads slots as `(w, x, y, z)`; the order names the
/// sensor components placed into those slots.
///
/// | Order | Roll driven by | Pitch driven by | Yaw driven by |
/// |-------|----------------|-----------------|---------------|
/// | `wxyz` | sensor X | sensor Y | sensor Z |
/// | `wzxy` | sensor Z | sensor X | sensor Y |
///
/// `wzxy` suits controllers held sideways like a steering wheel, where the
/// sensor's Z axis points along the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrder {
    /// Canonical order, components passed through unchanged.
    #[default]
    Wxyz,
    /// Wheel order: slots receive `(w, z, x, y)`.
    Wzxy,
}

impl AxisOrder {
    /// Reorders the sensor quaternion into converter slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use motion_bridge::motion::orientation::{AxisOrder, Quaternion};
    ///
    /// let q = Quaternion::new(1.0, 2.0, 3.0, 4.0);
    /// assert_eq!(AxisOrder::Wxyz.apply(q), q);
    /// assert_eq!(AxisOrder::Wzxy.apply(q), Quaternion::new(1.0, 4.0, 2.0, 3.0));
    /// ```
    #[must_use]
    pub fn apply(self, q: Quaternion) -> Quaternion {
        match self {
            AxisOrder::Wxyz => q,
            AxisOrder::Wzxy => Quaternion::new(q.w, q.z, q.x, q.y),
        }
    }
}

/// Converts a quaternion into Euler angles.
///
/// Total over all inputs: non-normalized quaternions still produce angles,
/// and a pitch sine outside [-1, 1] is clamped to ±π/2 instead of producing NaN.
///
/// # Arguments
///
/// * `q` - Orientation quaternion, already in converter slot order
///
/// # Returns
///
/// Euler angles in radians
#[must_use]
pub fn quaternion_to_euler(q: Quaternion) -> EulerAngles {
    let sin_roll = 2.0 * (q.w * q.x + q.y * q.z);
    let cos_roll = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
    let roll = sin_roll.atan2(cos_roll);

    let sin_pitch = 2.0 * (q.w * q.y - q.z * q.x);
    let pitch = if sin_pitch.abs() >= 1.0 {
        FRAC_PI_2.copysign(sin_pitch)
    } else {
        sin_pitch.asin()
    };

    let sin_yaw = 2.0 * (q.w * q.z + q.x * q.y);
    let cos_yaw = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    let yaw = sin_yaw.atan2(cos_yaw);

    EulerAngles { yaw, pitch, roll }
}

/// Converts radians to degrees.
#[inline]
#[must_use]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad.to_degrees()
}
