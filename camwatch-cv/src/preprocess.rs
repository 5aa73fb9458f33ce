use crate::window::{frame_to_mat, mat_to_frame};
use camwatch::prelude::v1::{Result, *};
use opencv::core::{Mat, Size, BORDER_DEFAULT};
use opencv::imgproc;

/// Gray conversion and Gaussian blur through `imgproc`.
pub struct CvPreprocessor {
    ksize: i32,
}

impl CvPreprocessor {
    /// Create a preprocessor with a square `kernel_size` x `kernel_size` Gaussian.
    ///
    /// `kernel_size` must be odd. A size of 1 disables smoothing.
    pub fn try_new(kernel_size: usize) -> Result<Self> {
        if kernel_size % 2 == 0 {
            return Err(anyhow!(
                "blur kernel size must be odd, got {}",
                kernel_size
            ));
        }

        Ok(Self {
            ksize: i32::try_from(kernel_size)?,
        })
    }

    fn gray(&self, raw: &Frame) -> Result<Frame> {
        let mat = frame_to_mat(raw)?;

        let gray = match raw.format() {
            PixelFormat::Gray8 => mat,
            PixelFormat::Bgr8 => {
                let mut gray = Mat::default();
                imgproc::cvt_color(&mat, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
                gray
            }
        };

        if self.ksize == 1 {
            return mat_to_frame(&gray);
        }

        let mut blurred = Mat::default();
        imgproc::gaussian_blur(
            &gray,
            &mut blurred,
            Size::new(self.ksize, self.ksize),
            0.0,
            0.0,
            BORDER_DEFAULT,
        )?;

        mat_to_frame(&blurred)
    }
}

impl Preprocess for CvPreprocessor {
    fn process(&self, raw: Frame) -> std::result::Result<Frame, MonitorError> {
        self.gray(&raw)
            .map_err(|e| MonitorError::InvalidFrame(e.to_string()))
    }
}
