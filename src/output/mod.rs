//! # Pointer Output Module
//!
//! Boundary to the pointer-injection collaborator.
//!
//! This module handles:
//! - The [`PointerSink`] trait the frame loop moves the pointer through
//! - A uinput virtual mouse ([`uinput::UinputPointer`])
//! - A dry-run sink that only logs ([`NullPointer`])

pub mod uinput;

use serde::Deserialize;
use tracing::trace;

use crate::error::Result;
use crate::motion::pointer::PointerDelta;

/// Which pointer sink the application creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerBackend {
    /// Linux uinput virtual mouse.
    #[default]
    Uinput,
    /// Discard movement (dry run).
    None,
}

/// Receives relative pointer movement.
pub trait PointerSink {
    /// Moves the pointer by `delta` pixels relative to its current position.
    fn move_relative(&mut self, delta: PointerDelta) -> Result<()>;
}

impl<T: PointerSink + ?Sized> PointerSink for Box<T> {
    fn move_relative(&mut self, delta: PointerDelta) -> Result<()> {
        (**self).move_relative(delta)
    }
}

/// Pointer sink that drops every movement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPointer;

impl PointerSink for NullPointer {
    fn move_relative(&mut self, delta: PointerDelta) -> Result<()> {
        trace!("Pointer move ({}, {}) discarded", delta.dx, delta.dy);
        Ok(())
    }
}
