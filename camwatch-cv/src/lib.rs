//! OpenCV backend for camwatch.
//!
//! Provides camera capture through `videoio`, gray conversion and smoothing through `imgproc`,
//! and the alert flash and live preview sinks through `highgui` windows.

mod flash;
mod preprocess;
mod preview;
mod source;
mod window;

pub use flash::CvBorderFlash;
pub use preprocess::CvPreprocessor;
pub use preview::CvPreview;
pub use source::CvFrameSource;
