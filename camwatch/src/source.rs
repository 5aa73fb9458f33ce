//! # Camera frame acquisition

use crate::error::MonitorError;
use crate::frame::Frame;

/// Live camera device.
///
/// Implementations are opened by their own constructors, which fail with
/// [`MonitorError::DeviceUnavailable`]. Dropping the source releases the device.
pub trait FrameSource {
    /// Read the next frame from the device.
    ///
    /// This blocks for as long as the driver takes to deliver a frame. A read that yields no data
    /// returns [`MonitorError::CaptureEmpty`], which callers should treat as "skip this cycle".
    /// Any error for which [`MonitorError::is_fatal`] holds means the device is gone.
    ///
    /// Raw frames are expected in [`PixelFormat::Bgr8`](crate::frame::PixelFormat::Bgr8) or
    /// [`PixelFormat::Gray8`](crate::frame::PixelFormat::Gray8).
    fn read_frame(&mut self) -> Result<Frame, MonitorError>;

    /// Check whether the device is still open.
    fn is_available(&self) -> bool;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> Result<Frame, MonitorError> {
        (**self).read_frame()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
