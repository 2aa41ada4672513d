//! # Motion Bridge
//!
//! Per-frame orchestration: reads every connected device from a
//! [`MotionSource`], runs the motion math, and moves the pointer.
//!
//! Each connected device gets a [`DeviceRecord`] owning its own
//! [`PointerAccumulator`], so sub-pixel remainders of different controllers
//! never mix. Records are dropped when their device disappears.
//!
//! ## Usage
//!
//! ```
//! use motion_bridge::bridge::MotionBridge;
//! use motion_bridge::device::replay::ReplaySource;
//! use motion_bridge::device::MotionSource;
//! use motion_bridge::output::NullPointer;
//!
//! let mut source = ReplaySource::parse(
//!     r#"{"devices":[{"device":0,"gyro":{"x":0.0,"y":-60.0,"z":0.0}}]}"#,
//!     false,
//! )?;
//! let mut bridge = MotionBridge::default();
//! let mut pointer = NullPointer;
//!
//! assert!(source.begin_frame()?);
//! let reports = bridge.process_frame(&mut source, &mut pointer)?;
//! assert_eq!(reports[0].delta.dx, 25);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::{debug, info, warn};

use crate::config::{Config, MAX_DEVICES};
use crate::device::{DeviceId, DeviceSettings, MotionSample, MotionSource};
use crate::error::Result;
use crate::motion::axis::AxisMapper;
use crate::motion::orientation::{quaternion_to_euler, AxisOrder, EulerAngles, Quaternion};
use crate::motion::pointer::{compute_pointer_delta, PointerAccumulator, PointerDelta, SensitivityConfig};
use crate::output::PointerSink;

/// Result of processing one device for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Device the sample came from.
    pub device: DeviceId,
    /// Quaternion as read from the device.
    pub quaternion: Quaternion,
    /// Orientation after applying the configured axis order.
    pub euler: EulerAngles,
    /// Wheel axis value in [-1, 1].
    pub axis: f32,
    /// Whole pixels emitted to the pointer.
    pub delta: PointerDelta,
}

impl FrameReport {
    /// Wheel axis as a percentage of the maximum swing.
    #[must_use]
    pub fn axis_percent(&self) -> f32 {
        self.axis * 100.0
    }
}

/// State kept for one connected device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// Device handle.
    pub id: DeviceId,
    /// Sub-pixel pointer remainder for this device.
    pub accumulator: PointerAccumulator,
}

impl DeviceRecord {
    fn new(id: DeviceId) -> Self {
        Self {
            id,
            accumulator: PointerAccumulator::new(),
        }
    }
}

/// Frame processor holding startup configuration and per-device state.
#[derive(Debug)]
pub struct MotionBridge {
    sensitivity: SensitivityConfig,
    frame_duration: f32,
    axis_mapper: AxisMapper,
    axis_order: AxisOrder,
    device_settings: DeviceSettings,
    max_devices: usize,
    devices: Vec<DeviceRecord>,
    had_devices: Option<bool>,
}

impl Default for MotionBridge {
    fn default() -> Self {
        Self::new(
            SensitivityConfig::default(),
            1.0 / 60.0,
            AxisMapper::default(),
            AxisOrder::default(),
            DeviceSettings::default(),
            MAX_DEVICES,
        )
    }
}

impl MotionBridge {
    /// Creates a bridge from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `sensitivity` - Gyro-to-pointer tuning
    /// * `frame_duration` - Nominal frame length in seconds
    /// * `axis_mapper` - Gravity-to-axis mapping
    /// * `axis_order` - Quaternion component order for orientation output
    /// * `device_settings` - Applied to each device when it connects
    /// * `max_devices` - Devices beyond this count are ignored each frame
    #[must_use]
    pub fn new(
        sensitivity: SensitivityConfig,
        frame_duration: f32,
        axis_mapper: AxisMapper,
        axis_order: AxisOrder,
        device_settings: DeviceSettings,
        max_devices: usize,
    ) -> Self {
        Self {
            sensitivity,
            frame_duration,
            axis_mapper,
            axis_order,
            device_settings,
            max_devices: max_devices.clamp(1, MAX_DEVICES),
            devices: Vec::new(),
            had_devices: None,
        }
    }

    /// Creates a bridge from validated configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.motion.sensitivity_config(),
            config.motion.frame_duration(),
            config.axis.axis_mapper(),
            config.motion.axis_order,
            config.device.device_settings(),
            config.device.max_devices,
        )
    }

    /// Records of currently connected devices, in connection order.
    #[must_use]
    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    /// Processes one frame for every connected device.
    ///
    /// Call after [`MotionSource::begin_frame`] returned `true`. Pointer
    /// injection failures are logged and do not abort the frame.
    ///
    /// # Errors
    ///
    /// Returns error if the motion source fails.
    pub fn process_frame<S, P>(&mut self, source: &mut S, pointer: &mut P) -> Result<Vec<FrameReport>>
    where
        S: MotionSource + ?Sized,
        P: PointerSink + ?Sized,
    {
        let mut connected = source.connected_devices()?;
        if connected.len() > self.max_devices {
            debug!(
                "{} devices connected, using the first {}",
                connected.len(),
                self.max_devices
            );
            connected.truncate(self.max_devices);
        }

        self.sync_devices(source, &connected)?;

        let mut reports = Vec::with_capacity(self.devices.len());
        for index in 0..self.devices.len() {
            let id = self.devices[index].id;
            let Some(sample) = source.read_motion(id)? else {
                continue;
            };

            let report = self.process_sample(index, sample);
            if !report.delta.is_zero() {
                if let Err(e) = pointer.move_relative(report.delta) {
                    warn!("Device {}: failed to move pointer: {}", id, e);
                }
            }
            reports.push(report);
        }

        Ok(reports)
    }

    fn process_sample(&mut self, index: usize, sample: MotionSample) -> FrameReport {
        let record = &mut self.devices[index];

        let delta = compute_pointer_delta(
            sample.gyro,
            &self.sensitivity,
            self.frame_duration,
            &mut record.accumulator,
        );
        let euler = quaternion_to_euler(self.axis_order.apply(sample.quaternion));
        let axis = self.axis_mapper.map(sample.gravity);

        FrameReport {
            device: record.id,
            quaternion: sample.quaternion,
            euler,
            axis,
            delta,
        }
    }

    /// Adds records for new devices and drops records for vanished ones.
    fn sync_devices<S>(&mut self, source: &mut S, connected: &[DeviceId]) -> Result<()>
    where
        S: MotionSource + ?Sized,
    {
        self.devices.retain(|record| {
            let keep = connected.contains(&record.id);
            if !keep {
                info!("Device {} disconnected", record.id);
            }
            keep
        });

        for &id in connected {
            if self.devices.iter().any(|record| record.id == id) {
                continue;
            }
            source.configure(id, &self.device_settings)?;
            info!("Device {} connected", id);
            self.devices.push(DeviceRecord::new(id));
        }

        let has_devices = !self.devices.is_empty();
        if self.had_devices != Some(has_devices) {
            if !has_devices {
                warn!("No devices connected");
            }
            self.had_devices = Some(has_devices);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::replay::ReplaySource;
    use crate::device::{GyroSpace, MockMotionSource};
    use crate::error::MotionBridgeError;
    use crate::motion::axis::GravityVector;
    use crate::motion::pointer::AngularVelocity;
    use crate::output::mocks::MockPointer;
    use mockall::predicate::eq;

    fn sample(gyro: AngularVelocity) -> MotionSample {
        MotionSample {
            gyro,
            ..MotionSample::default()
        }
    }

    #[test]
    fn test_new_device_is_configured_once() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .times(3)
            .returning(|| Ok(vec![DeviceId(7)]));
        source
            .expect_configure()
            .with(eq(DeviceId(7)), eq(DeviceSettings::default()))
            .times(1)
            .returning(|_, _| Ok(()));
        source
            .expect_read_motion()
            .times(3)
            .returning(|_| Ok(Some(MotionSample::default())));

        let mut bridge = MotionBridge::default();
        let mut pointer = MockPointer::new();
        for _ in 0..3 {
            let reports = bridge.process_frame(&mut source, &mut pointer).unwrap();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].device, DeviceId(7));
        }
        assert_eq!(bridge.devices().len(), 1);
    }

    #[test]
    fn test_custom_settings_are_applied() {
        let settings = DeviceSettings {
            gyro_space: GyroSpace::World,
            auto_calibration: false,
        };
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok(vec![DeviceId(1)]));
        source
            .expect_configure()
            .with(eq(DeviceId(1)), eq(settings))
            .times(1)
            .returning(|_, _| Ok(()));
        source.expect_read_motion().returning(|_| Ok(None));

        let mut bridge = MotionBridge::new(
            SensitivityConfig::default(),
            1.0 / 60.0,
            AxisMapper::default(),
            AxisOrder::Wxyz,
            settings,
            4,
        );
        let reports = bridge.process_frame(&mut source, &mut MockPointer::new()).unwrap();
        assert!(reports.is_empty(), "no sample means no report");
    }

    #[test]
    fn test_pointer_moves_only_on_whole_pixels() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok(vec![DeviceId(0)]));
        source.expect_configure().returning(|_, _| Ok(()));
        source
            .expect_read_motion()
            .returning(|_| Ok(Some(sample(AngularVelocity::new(0.0, -2.4, 0.0)))));

        let mut bridge = MotionBridge::default();
        let pointer = MockPointer::new();
        let mut sink = pointer.clone();

        for _ in 0..4 {
            bridge.process_frame(&mut source, &mut sink).unwrap();
        }

        // 2.4 * 25 / 60 = 1.0 px per frame
        let moved: i32 = pointer.get_moves().iter().map(|d| d.dx).sum();
        assert!((3..=4).contains(&moved), "moved {}", moved);
        assert!(pointer.get_moves().iter().all(|d| d.dy == 0));
    }

    #[test]
    fn test_accumulators_are_per_device() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok(vec![DeviceId(0), DeviceId(1)]));
        source.expect_configure().returning(|_, _| Ok(()));
        source.expect_read_motion().returning(|id| {
            if id == DeviceId(0) {
                // 0.6 px per frame to the right
                Ok(Some(sample(AngularVelocity::new(0.0, -1.44, 0.0))))
            } else {
                Ok(Some(MotionSample::default()))
            }
        });

        let mut bridge = MotionBridge::new(
            SensitivityConfig::new(0.5, 0.0),
            1.0 / 60.0,
            AxisMapper::default(),
            AxisOrder::Wxyz,
            DeviceSettings::default(),
            MAX_DEVICES,
        );
        let mut pointer = MockPointer::new();

        let first = bridge.process_frame(&mut source, &mut pointer).unwrap();
        assert!(first.iter().all(|r| r.delta.is_zero()));

        let (x0, _) = bridge.devices()[0].accumulator.remainder();
        let (x1, _) = bridge.devices()[1].accumulator.remainder();
        assert!((x0 - 0.6).abs() < 1e-4);
        assert_eq!(x1, 0.0);

        let second = bridge.process_frame(&mut source, &mut pointer).unwrap();
        assert_eq!(second[0].delta, PointerDelta::new(1, 0));
        assert!(second[1].delta.is_zero());
    }

    #[test]
    fn test_disconnect_drops_record() {
        let mut source = ReplaySource::parse(
            concat!(
                r#"{"devices":[{"device":0,"gyro":{"x":0.0,"y":-1.44,"z":0.0}}]}"#,
                "\n",
                r#"{"devices":[]}"#,
                "\n",
                r#"{"devices":[{"device":0}]}"#,
            ),
            false,
        )
        .unwrap();

        let mut bridge = MotionBridge::default();
        let mut pointer = MockPointer::new();

        source.begin_frame().unwrap();
        bridge.process_frame(&mut source, &mut pointer).unwrap();
        assert_ne!(bridge.devices()[0].accumulator, PointerAccumulator::new());

        source.begin_frame().unwrap();
        let reports = bridge.process_frame(&mut source, &mut pointer).unwrap();
        assert!(reports.is_empty());
        assert!(bridge.devices().is_empty());

        source.begin_frame().unwrap();
        bridge.process_frame(&mut source, &mut pointer).unwrap();
        assert_eq!(bridge.devices()[0].accumulator, PointerAccumulator::new());
        assert!(source.settings_for(DeviceId(0)).is_some());
    }

    #[test]
    fn test_device_limit() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok((0..5).map(DeviceId).collect()));
        source.expect_configure().times(2).returning(|_, _| Ok(()));
        source
            .expect_read_motion()
            .returning(|_| Ok(Some(MotionSample::default())));

        let mut bridge = MotionBridge::new(
            SensitivityConfig::default(),
            1.0 / 60.0,
            AxisMapper::default(),
            AxisOrder::Wxyz,
            DeviceSettings::default(),
            2,
        );
        let reports = bridge.process_frame(&mut source, &mut MockPointer::new()).unwrap();
        let ids: Vec<DeviceId> = reports.iter().map(|r| r.device).collect();
        assert_eq!(ids, vec![DeviceId(0), DeviceId(1)]);
    }

    #[test]
    fn test_pointer_failure_does_not_abort_frame() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok(vec![DeviceId(0), DeviceId(1)]));
        source.expect_configure().returning(|_, _| Ok(()));
        source
            .expect_read_motion()
            .returning(|_| Ok(Some(sample(AngularVelocity::new(0.0, -120.0, 0.0)))));

        let mut bridge = MotionBridge::default();
        let mut pointer = MockPointer::new();
        pointer.set_fail(true);

        let reports = bridge.process_frame(&mut source, &mut pointer).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].delta, PointerDelta::new(50, 0));
    }

    #[test]
    fn test_source_error_propagates() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Err(MotionBridgeError::Device("unplugged".to_string())));

        let mut bridge = MotionBridge::default();
        let result = bridge.process_frame(&mut source, &mut MockPointer::new());
        assert!(matches!(result, Err(MotionBridgeError::Device(_))));
    }

    #[test]
    fn test_report_orientation_and_axis() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok(vec![DeviceId(3)]));
        source.expect_configure().returning(|_, _| Ok(()));
        source.expect_read_motion().returning(|_| {
            let tilt = 75f32.to_radians();
            Ok(Some(MotionSample {
                quaternion: Quaternion::new(0.7071, 0.7071, 0.0, 0.0),
                gyro: AngularVelocity::default(),
                gravity: GravityVector::new(tilt.sin(), 0.0, tilt.cos()),
            }))
        });

        let mut bridge = MotionBridge::default();
        let reports = bridge.process_frame(&mut source, &mut MockPointer::new()).unwrap();
        let report = reports[0];

        let (yaw, pitch, roll) = report.euler.to_degrees();
        assert!((roll - 90.0).abs() < 0.01);
        assert!(pitch.abs() < 0.01);
        assert!(yaw.abs() < 0.01);
        assert!((report.axis - 0.5).abs() < 1e-4);
        assert!((report.axis_percent() - 50.0).abs() < 1e-2);
        assert!(report.delta.is_zero());
    }

    #[test]
    fn test_axis_order_changes_orientation_only() {
        let mut source = MockMotionSource::new();
        source
            .expect_connected_devices()
            .returning(|| Ok(vec![DeviceId(0)]));
        source.expect_configure().returning(|_, _| Ok(()));
        source.expect_read_motion().returning(|_| {
            let half = 0.25_f64;
            Ok(Some(MotionSample {
                quaternion: Quaternion::new(half.cos(), 0.0, 0.0, half.sin()),
                ..MotionSample::default()
            }))
        });

        let mut bridge = MotionBridge::new(
            SensitivityConfig::default(),
            1.0 / 60.0,
            AxisMapper::default(),
            AxisOrder::Wzxy,
            DeviceSettings::default(),
            MAX_DEVICES,
        );
        let report = bridge.process_frame(&mut source, &mut MockPointer::new()).unwrap()[0];
        assert!((report.euler.roll - 0.5).abs() < 1e-9);
        assert!(report.euler.yaw.abs() < 1e-9);
        assert_eq!(report.quaternion.z, 0.25_f64.sin());
    }
}
