//! # uinput Pointer
//!
//! Injects relative pointer motion through a Linux uinput virtual mouse.
//!
//! The virtual device exposes `REL_X`/`REL_Y` plus a left button so desktop
//! environments classify it as a mouse. Creating it needs write access to
//! `/dev/uinput` (root, or a udev rule granting the `input` group).

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
use tracing::{debug, info};

use super::PointerSink;
use crate::error::{MotionBridgeError, Result};
use crate::motion::pointer::PointerDelta;

/// Virtual relative mouse backed by uinput
pub struct UinputPointer {
    device: VirtualDevice,
    name: String,
}

impl std::fmt::Debug for UinputPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputPointer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl UinputPointer {
    /// Create the virtual mouse
    ///
    /// # Arguments
    ///
    /// * `name` - Device name shown to the input subsystem
    ///
    /// # Errors
    ///
    /// Returns `Pointer` error if `/dev/uinput` cannot be opened or the
    /// device cannot be registered
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use motion_bridge::output::uinput::UinputPointer;
    ///
    /// let pointer = UinputPointer::create("Motion Bridge Pointer")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(name: &str) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        keys.insert(Key::BTN_LEFT);

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_X);
        axes.insert(RelativeAxisType::REL_Y);

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(name).with_keys(&keys))
            .and_then(|builder| builder.with_relative_axes(&axes))
            .and_then(|builder| builder.build())
            .map_err(|e| {
                MotionBridgeError::Pointer(format!("Failed to create uinput device: {}", e))
            })?;

        info!("Created uinput pointer device '{}'", name);

        Ok(Self {
            device,
            name: name.to_string(),
        })
    }

    /// Name the virtual device was registered with
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builds the relative-motion events for one delta, skipping zero axes.
fn motion_events(delta: PointerDelta) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(2);
    if delta.dx != 0 {
        events.push(InputEvent::new(
            EventType::RELATIVE,
            RelativeAxisType::REL_X.0,
            delta.dx,
        ));
    }
    if delta.dy != 0 {
        events.push(InputEvent::new(
            EventType::RELATIVE,
            RelativeAxisType::REL_Y.0,
            delta.dy,
        ));
    }
    events
}

impl PointerSink for UinputPointer {
    fn move_relative(&mut self, delta: PointerDelta) -> Result<()> {
        let events = motion_events(delta);
        if events.is_empty() {
            return Ok(());
        }

        // emit() terminates the batch with SYN_REPORT
        self.device
            .emit(&events)
            .map_err(|e| MotionBridgeError::Pointer(format!("Failed to emit motion: {}", e)))?;

        debug!("Pointer moved ({}, {})", delta.dx, delta.dy);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delta_has_no_events() {
        assert!(motion_events(PointerDelta::default()).is_empty());
    }

    #[test]
    fn test_both_axes() {
        let events = motion_events(PointerDelta::new(3, -7));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), EventType::RELATIVE);
        assert_eq!(events[0].code(), RelativeAxisType::REL_X.0);
        assert_eq!(events[0].value(), 3);
        assert_eq!(events[1].code(), RelativeAxisType::REL_Y.0);
        assert_eq!(events[1].value(), -7);
    }

    #[test]
    fn test_single_axis() {
        let events = motion_events(PointerDelta::new(0, 4));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].code(), RelativeAxisType::REL_Y.0);
    }
}
