//! # Motion Module
//!
//! Pure per-frame motion math.
//!
//! This module handles:
//! - Quaternion to yaw/pitch/roll conversion with gimbal-lock clamping
//! - Gyro rotation to relative pointer motion with tightening and
//!   sub-pixel accumulation
//! - Gravity tilt to a normalized wheel/stick axis

pub mod axis;
pub mod orientation;
pub mod pointer;
