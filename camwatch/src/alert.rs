//! # Alert sequence
//!
//! A positive detection opens the alert window: a short flash, then a timed live preview. The
//! window blocks the monitor loop until both sinks return, so a continuously moving scene yields
//! back to back alert windows rather than a queue of pending alerts.

use crate::config::{AlertPosition, AlertSettings};
use crate::source::FrameSource;
use crate::timer::Timer;
use anyhow::Result;
use log::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// RGB colour structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
}

impl Default for Rgb {
    fn default() -> Self {
        Self::RED
    }
}

/// Visual alarm raised on motion.
pub trait AlertSink {
    /// Show the highlight for `duration`, then remove it.
    ///
    /// Must not return before the highlight is gone.
    fn flash(&mut self, color: Rgb, duration: Duration) -> Result<()>;
}

/// Timed live view shown after the flash.
pub trait PreviewSink {
    /// Display frames pulled from `source` at `position` for `duration`.
    ///
    /// # Arguments
    ///
    /// * `source` - camera to read preview frames from.
    /// * `position` - screen coordinate of the preview window.
    /// * `duration` - how long the preview stays up.
    /// * `fps` - target rate of frame reads.
    fn show_preview(
        &mut self,
        source: &mut dyn FrameSource,
        position: AlertPosition,
        duration: Duration,
        fps: u32,
    ) -> Result<()>;
}

/// Runs the flash and preview sinks in order.
pub struct AlertCoordinator {
    settings: AlertSettings,
    alert: Box<dyn AlertSink + Send>,
    preview: Box<dyn PreviewSink + Send>,
}

impl AlertCoordinator {
    pub fn new(
        settings: AlertSettings,
        alert: Box<dyn AlertSink + Send>,
        preview: Box<dyn PreviewSink + Send>,
    ) -> Self {
        Self {
            settings,
            alert,
            preview,
        }
    }

    /// Coordinator that only logs.
    pub fn headless(settings: AlertSettings) -> Self {
        Self::new(settings, Box::new(LogAlertSink), Box::new(LogPreviewSink))
    }

    /// Run the alert window.
    ///
    /// Blocks for the flash duration plus, if enabled, the preview duration. Sink failures are
    /// logged and otherwise ignored.
    pub fn on_motion_detected(&mut self, source: &mut dyn FrameSource, position: AlertPosition) {
        if let Err(e) = self
            .alert
            .flash(self.settings.color, self.settings.flash_duration())
        {
            warn!("Alert flash failed: {}", e);
        }

        if !self.settings.preview {
            return;
        }

        if let Err(e) = self.preview.show_preview(
            source,
            position,
            self.settings.preview_duration(),
            self.settings.preview_fps,
        ) {
            warn!("Preview failed: {}", e);
        }
    }
}

/// Alert sink for headless runs.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn flash(&mut self, color: Rgb, duration: Duration) -> Result<()> {
        info!("Motion alert ({:?}, {:?})", color, duration);
        std::thread::sleep(duration);
        Ok(())
    }
}

/// Preview sink for headless runs.
///
/// Still reads frames at the requested rate for the whole window, so the camera behaves the same
/// as with a real preview.
pub struct LogPreviewSink;

impl PreviewSink for LogPreviewSink {
    fn show_preview(
        &mut self,
        source: &mut dyn FrameSource,
        position: AlertPosition,
        duration: Duration,
        fps: u32,
    ) -> Result<()> {
        let step = Timer::step_for_fps(fps);
        let mut timer = Timer::default();
        let mut frames = 0usize;

        while timer.elapsed() < duration {
            if source.read_frame().is_ok() {
                frames += 1;
            }
            timer.add(step);
            timer.sleep();
        }

        debug!(
            "Preview at ({}, {}) drained {} frames",
            position.x, position.y, frames
        );

        Ok(())
    }
}
