//! # Monitor loop
//!
//! Drives capture, preprocessing, detection and alerting on a single thread. There is never more
//! than one frame or one evaluation in flight.

use crate::alert::AlertCoordinator;
use crate::config::MonitorConfig;
use crate::detection::{Detector, MotionDetector};
use crate::error::MonitorError;
use crate::preprocess::Preprocess;
use crate::source::FrameSource;
use crate::state::MonitorHandle;
use anyhow::Result;
use log::*;
use std::time::Duration;

/// Lifecycle of the monitor loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorStatus {
    /// Camera not opened yet.
    Idle,
    Monitoring,
    /// Frames are read, but not evaluated.
    Paused,
    /// Inside the alert window.
    Alerting,
    Stopped,
}

/// What a single cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The capture was empty or unusable.
    Skipped,
    Paused,
    /// The frame became the first reference.
    Seeded,
    Quiet { score: u64 },
    Alerted { score: u64 },
    /// The frame could not be compared and replaced the reference.
    Reset,
}

pub struct MonitorLoop<D = MotionDetector> {
    device_index: usize,
    cadence: Duration,
    preprocessor: Box<dyn Preprocess + Send>,
    detector: D,
    coordinator: AlertCoordinator,
    handle: MonitorHandle,
    status: MonitorStatus,
    seeded: bool,
}

impl<D: Detector> MonitorLoop<D> {
    /// Assemble the loop from its stages.
    ///
    /// # Arguments
    ///
    /// * `config` - validated before anything else.
    /// * `preprocessor` - turns captures into gray frames for `detector`.
    /// * `detector` - decides on motion.
    /// * `coordinator` - runs the alert sequence.
    /// * `handle` - shared pause, running and position state.
    pub fn new(
        config: &MonitorConfig,
        preprocessor: Box<dyn Preprocess + Send>,
        detector: D,
        coordinator: AlertCoordinator,
        handle: MonitorHandle,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            device_index: config.device_index,
            cadence: config.cadence(),
            preprocessor,
            detector,
            coordinator,
            handle,
            status: MonitorStatus::Idle,
            seeded: false,
        })
    }

    pub fn status(&self) -> MonitorStatus {
        self.status
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn handle(&self) -> &MonitorHandle {
        &self.handle
    }

    /// Open the camera and cycle until stopped.
    ///
    /// Returns `Ok` when the shared `running` flag is cleared, or the fatal error that ended
    /// monitoring. The source is dropped before returning in either case.
    ///
    /// # Arguments
    ///
    /// * `open` - opens the camera at the given device index.
    pub fn run<S: FrameSource>(
        &mut self,
        open: impl FnOnce(usize) -> Result<S, MonitorError>,
    ) -> Result<(), MonitorError> {
        let mut source = match open(self.device_index) {
            Ok(source) => source,
            Err(e) => {
                self.status = MonitorStatus::Stopped;
                return Err(e);
            }
        };

        self.status = MonitorStatus::Monitoring;
        info!("Monitoring for motion...");

        while self.handle.is_running() {
            if let Err(e) = self.cycle(&mut source) {
                error!("Monitoring stopped: {}", e);
                return Err(e);
            }

            std::thread::sleep(self.cadence);
        }

        self.status = MonitorStatus::Stopped;
        info!("Monitoring stopped");

        Ok(())
    }

    /// Run a single capture cycle.
    ///
    /// Only fatal capture errors are returned. They leave the loop in
    /// [`MonitorStatus::Stopped`].
    pub fn cycle(&mut self, source: &mut dyn FrameSource) -> Result<CycleOutcome, MonitorError> {
        // Holding a source means the device is open.
        if self.status == MonitorStatus::Idle {
            self.status = MonitorStatus::Monitoring;
        }

        self.sync_pause();

        let raw = match source.read_frame() {
            Ok(frame) => frame,
            Err(MonitorError::CaptureEmpty) => {
                trace!("Empty capture, skipping cycle");
                return Ok(CycleOutcome::Skipped);
            }
            Err(e) if e.is_fatal() => {
                self.status = MonitorStatus::Stopped;
                return Err(e);
            }
            Err(e) => {
                warn!("Capture failed: {}", e);
                return Ok(CycleOutcome::Skipped);
            }
        };

        if self.status == MonitorStatus::Paused {
            return Ok(CycleOutcome::Paused);
        }

        let gray = match self.preprocessor.process(raw) {
            Ok(gray) => gray,
            Err(e) => {
                warn!("Preprocessing failed: {}", e);
                return Ok(CycleOutcome::Skipped);
            }
        };

        let detection = match self.detector.evaluate(gray) {
            Ok(detection) => detection,
            Err(e) => {
                warn!("Resetting reference: {}", e);
                return Ok(CycleOutcome::Reset);
            }
        };

        if !std::mem::replace(&mut self.seeded, true) {
            return Ok(CycleOutcome::Seeded);
        }

        trace!("Motion score {}", detection.score);

        if !detection.motion {
            return Ok(CycleOutcome::Quiet {
                score: detection.score,
            });
        }

        info!("Motion detected! Flashing screen...");
        debug!("Motion score {}", detection.score);

        self.status = MonitorStatus::Alerting;
        self.coordinator
            .on_motion_detected(source, self.handle.position());
        self.status = MonitorStatus::Monitoring;

        Ok(CycleOutcome::Alerted {
            score: detection.score,
        })
    }

    fn sync_pause(&mut self) {
        match (self.status, self.handle.is_paused()) {
            (MonitorStatus::Monitoring, true) => {
                info!("Monitoring paused");
                self.detector.reset();
                self.seeded = false;
                self.status = MonitorStatus::Paused;
            }
            (MonitorStatus::Paused, false) => {
                info!("Monitoring resumed");
                self.status = MonitorStatus::Monitoring;
            }
            _ => {}
        }
    }
}
