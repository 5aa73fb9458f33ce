use anyhow::{anyhow, Result};
use camwatch::prelude::v1::{Detector, FrameSource, MonitorError, MonitorHandle, MonitorLoop};
use std::thread::{spawn, JoinHandle};

/// Monitor loop running on its own thread.
///
/// Dropping the worker stops the loop and waits for it, so the camera and any open windows are
/// released whatever state the loop was in.
pub struct MonitorWorker {
    handle: MonitorHandle,
    thread: Option<JoinHandle<Result<(), MonitorError>>>,
}

impl MonitorWorker {
    /// Start the loop.
    ///
    /// # Arguments
    ///
    /// * `monitor` - loop to run.
    /// * `open` - opens the camera on the worker thread.
    pub fn spawn<D, S>(
        mut monitor: MonitorLoop<D>,
        open: impl FnOnce(usize) -> Result<S, MonitorError> + Send + 'static,
    ) -> Self
    where
        D: Detector + Send + 'static,
        S: FrameSource,
    {
        let handle = monitor.handle().clone();
        let thread = Some(spawn(move || monitor.run(open)));

        Self { handle, thread }
    }

    pub fn is_finished(&self) -> bool {
        self.thread
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Ask the loop to stop after its current cycle.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Wait for the loop to end and return its result.
    pub fn join(mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| anyhow!("monitor thread panicked"))?
                .map_err(Into::into),
            None => Ok(()),
        }
    }
}

impl Drop for MonitorWorker {
    fn drop(&mut self) {
        self.handle.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camwatch::prelude::v1::*;
    use std::time::Duration;

    struct EndlessSource;

    impl FrameSource for EndlessSource {
        fn read_frame(&mut self) -> std::result::Result<Frame, MonitorError> {
            Ok(Frame::filled(16, 16, PixelFormat::Gray8, 0))
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn monitor(handle: MonitorHandle) -> MonitorLoop {
        let config = MonitorConfig {
            cadence_ms: 1,
            ..Default::default()
        };
        MonitorLoop::new(
            &config,
            Box::new(Preprocessor::try_new(config.detection.blur_kernel).unwrap()),
            MotionDetector::new(&config.detection),
            AlertCoordinator::headless(config.alert),
            handle,
        )
        .unwrap()
    }

    #[test]
    fn stop_ends_loop() {
        let handle = MonitorHandle::default();
        let worker = MonitorWorker::spawn(monitor(handle.clone()), |_| Ok(EndlessSource));

        std::thread::sleep(Duration::from_millis(20));
        assert!(!worker.is_finished());

        worker.stop();
        worker.join().unwrap();
        assert!(!handle.is_running());
    }

    #[test]
    fn reports_missing_device() {
        let worker = MonitorWorker::spawn(monitor(MonitorHandle::default()), |index| {
            Err::<EndlessSource, _>(MonitorError::DeviceUnavailable { index })
        });

        let err = worker.join().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MonitorError>(),
            Some(MonitorError::DeviceUnavailable { index: 1 })
        ));
    }

    #[test]
    fn drop_stops_loop() {
        let handle = MonitorHandle::default();
        drop(MonitorWorker::spawn(
            monitor(handle.clone()),
            |_| Ok(EndlessSource),
        ));
        assert!(!handle.is_running());
    }
}
