//! # Motion Bridge Library
//!
//! Turn game-controller motion sensors into pointer movement and a tilt axis.
//!
//! This library provides the per-frame motion math (quaternion to Euler
//! angles, gyro to pointer deltas, gravity tilt to a wheel axis) and the
//! plumbing around it: configuration, motion sources, pointer output and
//! telemetry logging.

pub mod bridge;
pub mod config;
pub mod device;
pub mod error;
pub mod motion;
pub mod output;
pub mod telemetry;
