//! # Pointer Motion Module
//!
//! Turns per-frame gyro rotation into relative pointer movement.
//!
//! ## Pipeline
//!
//! 1. Measure the rotation magnitude (Euclidean norm of the gyro delta).
//! 2. Scale sensitivity by [`GYRO_TO_PIXEL_SCALE`].
//! 3. **Tightening**: below the tightening threshold, sensitivity is scaled
//!    down by `magnitude / tightening`. Small involuntary movement is reduced,
//!    not discarded as a hard deadzone would.
//! 4. Map axes: pointer X follows `-gyro.y`, pointer Y follows `-gyro.x`.
//! 5. Accumulate into a [`PointerAccumulator`] and emit only whole pixels.
//!
//! ## Usage
//!
//! ```
//! use motion_bridge::motion::pointer::{
//!     compute_pointer_delta, AngularVelocity, PointerAccumulator, SensitivityConfig,
//! };
//!
//! let config = SensitivityConfig::new(0.5, 2.0);
//! let mut acc = PointerAccumulator::new();
//!
//! let delta = compute_pointer_delta(
//!     AngularVelocity::new(0.0, -30.0, 0.0),
//!     &config,
//!     1.0 / 60.0,
//!     &mut acc,
//! );
//! assert_eq!(delta.dx, 12); // 30 * 25 / 60 = 12.5, half a pixel kept
//! assert_eq!(delta.dy, 0);
//! ```

use serde::Deserialize;

/// Converts gyro units (degrees per frame delta) into pointer pixels.
pub const GYRO_TO_PIXEL_SCALE: f32 = 50.0;

/// Gyro rotation accumulated by the device since the previous poll.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct AngularVelocity {
    /// Rotation about the sensor X axis.
    pub x: f32,
    /// Rotation about the sensor Y axis.
    pub y: f32,
    /// Rotation about the sensor Z axis.
    pub z: f32,
}

impl AngularVelocity {
    /// Creates a new angular velocity sample.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the three components.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Gyro-to-pointer tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityConfig {
    /// Base sensitivity, multiplied by [`GYRO_TO_PIXEL_SCALE`].
    pub sensitivity: f32,
    /// Magnitude below which sensitivity is attenuated. `<= 0` disables it.
    pub tightening: f32,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            tightening: 2.0,
        }
    }
}

impl SensitivityConfig {
    /// Creates a sensitivity configuration.
    #[must_use]
    pub const fn new(sensitivity: f32, tightening: f32) -> Self {
        Self {
            sensitivity,
            tightening,
        }
    }

    /// Sensitivity applied to a rotation of the given magnitude.
    ///
    /// # Examples
    ///
    /// ```
    /// use motion_bridge::motion::pointer::SensitivityConfig;
    ///
    /// let config = SensitivityConfig::new(0.5, 2.0);
    /// assert_eq!(config.effective_sensitivity(4.0), 25.0);  // above threshold
    /// assert_eq!(config.effective_sensitivity(1.0), 12.5);  // halfway below
    /// assert_eq!(config.effective_sensitivity(0.0), 0.0);
    /// ```
    #[must_use]
    pub fn effective_sensitivity(&self, magnitude: f32) -> f32 {
        let base = self.sensitivity * GYRO_TO_PIXEL_SCALE;
        if self.tightening > 0.0 && magnitude < self.tightening {
            base * (magnitude / self.tightening)
        } else {
            base
        }
    }
}

/// Whole-pixel pointer displacement for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerDelta {
    /// Horizontal pixels, positive to the right.
    pub dx: i32,
    /// Vertical pixels, positive downwards.
    pub dy: i32,
}

impl PointerDelta {
    /// Creates a pointer delta.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// True when the delta moves the pointer nowhere.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Sub-pixel remainder carried between frames.
///
/// After every [`PointerAccumulator::accumulate`] call both components are
/// strictly inside (-1, 1).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerAccumulator {
    x: f32,
    y: f32,
}

impl PointerAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fractional remainder `(x, y)`.
    #[must_use]
    pub fn remainder(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Adds fractional motion and takes out the whole-pixel part.
    ///
    /// Truncates toward zero, so the remainder keeps the sign of the motion.
    /// Non-finite motion is ignored.
    pub fn accumulate(&mut self, x: f32, y: f32) -> PointerDelta {
        if !x.is_finite() || !y.is_finite() {
            return PointerDelta::default();
        }

        self.x += x;
        self.y += y;

        let dx = self.x.trunc();
        let dy = self.y.trunc();

        self.x -= dx;
        self.y -= dy;

        PointerDelta::new(dx as i32, dy as i32)
    }
}

/// Computes the pointer movement for one frame of gyro rotation.
///
/// # Arguments
///
/// * `velocity` - Gyro rotation accumulated since the previous frame
/// * `config` - Sensitivity and tightening
/// * `frame_duration` - Nominal frame length in seconds
/// * `accumulator` - Per-device sub-pixel remainder, updated in place
///
/// # Returns
///
/// Whole pixels to move the pointer this frame (possibly zero)
pub fn compute_pointer_delta(
    velocity: AngularVelocity,
    config: &SensitivityConfig,
    frame_duration: f32,
    accumulator: &mut PointerAccumulator,
) -> PointerDelta {
    let sensitivity = config.effective_sensitivity(velocity.magnitude());
    let scale = sensitivity * frame_duration;

    accumulator.accumulate(-velocity.y * scale, -velocity.x * scale)
}
