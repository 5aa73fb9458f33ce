//! # Camera Motion Monitor
//!
//! This library watches a single camera feed and decides, frame over frame, whether anything in
//! view has moved. Positive decisions drive a short, blocking alert sequence through pluggable
//! sinks.
//!
//! The easiest way to use the library is to import its prelude:
//!
//! ```
//! use camwatch::prelude::v1::*;
//! ```
//!
//! Rendering and capture backends live outside this crate, behind the [`source::FrameSource`],
//! [`preprocess::Preprocess`], [`alert::AlertSink`] and [`alert::PreviewSink`] traits.

pub mod alert;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod monitor;
pub mod preprocess;
pub mod source;
pub mod state;
pub mod timer;

pub mod prelude {
    pub mod v1 {
        pub use crate::{
            alert::{
                AlertCoordinator, AlertSink, LogAlertSink, LogPreviewSink, PreviewSink, Rgb,
            },
            config::{
                AlertPosition, AlertSettings, DetectionSettings, DisplaySettings, FlashStyle,
                MonitorConfig, PositionStore,
            },
            detection::{Detection, Detector, MotionDetector},
            error::MonitorError,
            frame::{Frame, PixelFormat},
            monitor::{CycleOutcome, MonitorLoop, MonitorStatus},
            preprocess::{Preprocess, Preprocessor},
            source::FrameSource,
            state::MonitorHandle,
            timer::Timer,
        };
        pub use anyhow::{anyhow, Error, Result};
    }
}
