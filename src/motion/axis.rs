//! # Tilt Axis Module
//!
//! Derives a single wheel/stick axis from the gravity vector.
//!
//! The tilt angle is `atan2(a, b)` for two gravity components spanning the
//! plane of interest. The angle is measured against a reference offset using
//! the shortest angular difference, then divided by the configured maximum
//! swing and clamped to [-1, 1].
//!
//! ```
//! use motion_bridge::motion::axis::compute_axis_value;
//!
//! // Tilted 75° of a 150° swing: half deflection
//! let a = 75f32.to_radians().sin();
//! let b = 75f32.to_radians().cos();
//! let value = compute_axis_value(a, b, 150.0, 0.0);
//! assert!((value - 0.5).abs() < 1e-4);
//! ```

use serde::Deserialize;
use std::f32::consts::{PI, TAU};

/// Default full-scale swing of the wheel axis, in degrees.
pub const DEFAULT_MAX_ANGLE_DEG: f32 = 150.0;

/// Gravity direction in device-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct GravityVector {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl GravityVector {
    /// Creates a gravity vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Returns the requested component.
    #[must_use]
    pub fn component(&self, which: GravityComponent) -> f32 {
        match which {
            GravityComponent::X => self.x,
            GravityComponent::Y => self.y,
            GravityComponent::Z => self.z,
        }
    }
}

/// Selects one gravity component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityComponent {
    /// Sensor X axis.
    X,
    /// Sensor Y axis.
    Y,
    /// Sensor Z axis.
    Z,
}

/// Wraps an angle difference into (-π, π] with a single 2π step.
///
/// Inputs more than one full turn outside the range are not corrected.
///
/// # Examples
///
/// ```
/// use motion_bridge::motion::axis::wrap_angle;
/// use std::f32::consts::PI;
///
/// assert!((wrap_angle(2.0 * PI - 0.02) + 0.02).abs() < 1e-5);
/// assert_eq!(wrap_angle(-PI), PI);
/// ```
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    if angle <= -PI {
        angle + TAU
    } else if angle > PI {
        angle - TAU
    } else {
        angle
    }
}

/// Shortest signed difference `angle - reference`, in (-π, π].
#[must_use]
pub fn angle_difference(angle: f32, reference: f32) -> f32 {
    wrap_angle(angle - reference)
}

/// Scales `angle` by `max_angle` and clamps the result to [-1, 1].
///
/// NaN maps to 0. `max_angle` must be non-zero; callers validate it up front.
#[must_use]
pub fn normalize_to_stick(angle: f32, max_angle: f32) -> f32 {
    let value = angle / max_angle;
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Computes the normalized wheel axis value from two gravity components.
///
/// # Arguments
///
/// * `component_a` - Gravity component used as the `atan2` numerator
/// * `component_b` - Gravity component used as the `atan2` denominator
/// * `max_angle_deg` - Tilt (degrees) that maps to full deflection
/// * `offset_rad` - Reference angle treated as center, in radians
///
/// # Returns
///
/// Fraction of the maximum swing, in [-1, 1]
#[must_use]
pub fn compute_axis_value(
    component_a: f32,
    component_b: f32,
    max_angle_deg: f32,
    offset_rad: f32,
) -> f32 {
    let raw = component_a.atan2(component_b);
    let diff = angle_difference(raw, offset_rad);
    normalize_to_stick(diff, max_angle_deg.to_radians())
}

/// Gravity-to-axis mapping with its plane and range fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMapper {
    component_a: GravityComponent,
    component_b: GravityComponent,
    max_angle_deg: f32,
    offset_rad: f32,
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self::new(GravityComponent::X, GravityComponent::Z, DEFAULT_MAX_ANGLE_DEG, 0.0)
    }
}

impl AxisMapper {
    /// Creates an axis mapper for the plane spanned by `component_a`/`component_b`.
    #[must_use]
    pub fn new(
        component_a: GravityComponent,
        component_b: GravityComponent,
        max_angle_deg: f32,
        offset_rad: f32,
    ) -> Self {
        Self {
            component_a,
            component_b,
            max_angle_deg,
            offset_rad,
        }
    }

    /// Maximum swing in degrees.
    #[must_use]
    pub fn max_angle_deg(&self) -> f32 {
        self.max_angle_deg
    }

    /// Axis value for one gravity sample.
    #[must_use]
    pub fn map(&self, gravity: GravityVector) -> f32 {
        compute_axis_value(
            gravity.component(self.component_a),
            gravity.component(self.component_b),
            self.max_angle_deg,
            self.offset_rad,
        )
    }
}
