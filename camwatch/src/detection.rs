//! Motion detection module

use crate::config::DetectionSettings;
use crate::error::MonitorError;
use crate::frame::{Frame, PixelFormat};
use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::map::map_colors2;

/// Result of comparing one frame against the reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Detection {
    pub motion: bool,
    /// Sum of binarized per pixel differences.
    pub score: u64,
}

/// Generic frame motion detector.
pub trait Detector {
    /// Compare a preprocessed frame with the previous one.
    ///
    /// Detectors are stateful, thus this function expects sequential frames. The frame is
    /// consumed and kept as the next reference.
    fn evaluate(&mut self, frame: Frame) -> Result<Detection, MonitorError>;

    /// Forget the reference, so that the next frame seeds a new one.
    fn reset(&mut self);
}

/// Frame over frame differencing detector.
///
/// Every pixel whose intensity changed by more than `binarize_delta` contributes 255 to the
/// score. The reference is always the last frame seen, so sustained motion keeps reporting while
/// a single step change is only measured once.
pub struct MotionDetector {
    threshold: u64,
    binarize_delta: u8,
    reference: Option<GrayImage>,
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new(&DetectionSettings::default())
    }
}

impl MotionDetector {
    pub fn new(settings: &DetectionSettings) -> Self {
        Self {
            threshold: settings.threshold,
            binarize_delta: settings.binarize_delta,
            reference: None,
        }
    }

    /// Current reference image, if any.
    pub fn reference(&self) -> Option<&GrayImage> {
        self.reference.as_ref()
    }

    /// Absolute difference, binarized at `binarize_delta` to 0 or 255, then summed.
    fn score(&self, reference: &GrayImage, frame: &GrayImage) -> u64 {
        let diff = map_colors2(reference, frame, |a: Luma<u8>, b: Luma<u8>| {
            Luma([a[0].abs_diff(b[0])])
        });

        threshold(&diff, self.binarize_delta, ThresholdType::Binary)
            .pixels()
            .map(|p| u64::from(p[0]))
            .sum()
    }
}

fn dim(image: &GrayImage) -> (usize, usize) {
    (image.width() as usize, image.height() as usize)
}

impl Detector for MotionDetector {
    fn evaluate(&mut self, frame: Frame) -> Result<Detection, MonitorError> {
        if frame.format() != PixelFormat::Gray8 {
            return Err(MonitorError::InvalidFrame(format!(
                "detector expects gray frames, got {:?}",
                frame.format()
            )));
        }

        let (w, h) = frame.dim();
        let frame = GrayImage::from_raw(w as u32, h as u32, frame.into_vec()).ok_or_else(|| {
            MonitorError::InvalidFrame(format!("{}x{} gray frame does not fit an image", w, h))
        })?;

        let reference = match self.reference.take() {
            Some(reference) => reference,
            None => {
                self.reference = Some(frame);
                return Ok(Detection::default());
            }
        };

        let ret = if reference.dimensions() != frame.dimensions() {
            Err(MonitorError::ResolutionMismatch {
                expected: dim(&reference),
                found: dim(&frame),
            })
        } else {
            let score = self.score(&reference, &frame);
            Ok(Detection {
                motion: score > self.threshold,
                score,
            })
        };

        // The new frame becomes the reference whatever the outcome.
        self.reference = Some(frame);

        ret
    }

    fn reset(&mut self) {
        self.reference = None;
    }
}
