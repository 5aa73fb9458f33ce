use crate::window::mat_to_frame;
use camwatch::prelude::v1::{Result, *};
use log::*;
use opencv::core::{CV_8UC1, CV_8UC3, CV_8UC4};
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::*;

/// Camera opened through OpenCV's `VideoCapture`.
///
/// The device is released when the source is dropped.
pub struct CvFrameSource {
    capture: VideoCapture,
    index: usize,
    frame: Mat,
    bgr: Mat,
}

impl CvFrameSource {
    /// Open the camera at `index` with whatever backend OpenCV prefers.
    pub fn open(index: usize) -> std::result::Result<Self, MonitorError> {
        let capture = VideoCapture::new(index as i32, CAP_ANY)
            .map_err(|e| {
                debug!("VideoCapture::new({}) failed: {}", index, e);
                MonitorError::DeviceUnavailable { index }
            })?;

        if !capture.is_opened().unwrap_or(false) {
            return Err(MonitorError::DeviceUnavailable { index });
        }

        let width = capture.get(CAP_PROP_FRAME_WIDTH).unwrap_or_default();
        let height = capture.get(CAP_PROP_FRAME_HEIGHT).unwrap_or_default();
        info!("Opened camera {} at {}x{}", index, width, height);

        Ok(Self {
            capture,
            index,
            frame: Default::default(),
            bgr: Default::default(),
        })
    }
}

/// Hand a capture on as a BGR frame.
///
/// Gray and BGRA captures are converted through `bgr`.
fn capture_to_frame(capture: &Mat, bgr: &mut Mat) -> Result<Frame> {
    let code = match capture.typ() {
        t if t == CV_8UC3 => return mat_to_frame(capture),
        t if t == CV_8UC1 => imgproc::COLOR_GRAY2BGR,
        t if t == CV_8UC4 => imgproc::COLOR_BGRA2BGR,
        t => return Err(anyhow!("unsupported capture type {}", t)),
    };

    imgproc::cvt_color(capture, bgr, code, 0)?;

    mat_to_frame(bgr)
}

impl FrameSource for CvFrameSource {
    fn read_frame(&mut self) -> std::result::Result<Frame, MonitorError> {
        let grabbed = self
            .capture
            .read(&mut self.frame)
            .map_err(|e| MonitorError::DeviceLost(e.to_string()))?;

        if !grabbed || self.frame.rows() == 0 || self.frame.cols() == 0 {
            if !self.is_available() {
                return Err(MonitorError::DeviceLost(format!(
                    "camera {} closed",
                    self.index
                )));
            }
            return Err(MonitorError::CaptureEmpty);
        }

        capture_to_frame(&self.frame, &mut self.bgr)
            .map_err(|e| MonitorError::InvalidFrame(e.to_string()))
    }

    fn is_available(&self) -> bool {
        self.capture.is_opened().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_32FC1};

    fn mat(typ: i32, value: Scalar) -> Mat {
        Mat::new_rows_cols_with_default(2, 3, typ, value).unwrap()
    }

    #[test]
    fn gray_capture_becomes_bgr() {
        let frame = capture_to_frame(&mat(CV_8UC1, Scalar::all(9.0)), &mut Mat::default()).unwrap();

        assert_eq!(frame, Frame::filled(3, 2, PixelFormat::Bgr8, 9));
    }

    #[test]
    fn bgra_capture_drops_alpha() {
        let frame = capture_to_frame(
            &mat(CV_8UC4, Scalar::new(1.0, 2.0, 3.0, 4.0)),
            &mut Mat::default(),
        )
        .unwrap();

        assert_eq!(frame.format(), PixelFormat::Bgr8);
        assert_eq!(frame.as_slice(), &[1u8, 2, 3].repeat(6)[..]);
    }

    #[test]
    fn bgr_capture_passes_through() {
        let frame = capture_to_frame(
            &mat(CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0)),
            &mut Mat::default(),
        )
        .unwrap();

        assert_eq!(frame.dim(), (3, 2));
        assert_eq!(frame.as_slice(), &[10u8, 20, 30].repeat(6)[..]);
    }

    #[test]
    fn float_capture_is_rejected() {
        assert!(capture_to_frame(&mat(CV_32FC1, Scalar::all(0.0)), &mut Mat::default()).is_err());
    }
}
