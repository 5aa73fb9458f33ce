//! # Frame preprocessing
//!
//! Raw captures are reduced to a single smoothed intensity channel before differencing, so that
//! sensor noise and minor flicker do not show up as motion.

use crate::error::MonitorError;
use crate::frame::{Frame, PixelFormat};
use anyhow::{anyhow, Result};
use image::imageops::grayscale;
use image::{GrayImage, RgbImage};
use imageproc::filter::gaussian_blur_f32;

/// Turns raw captures into the gray frames detectors compare.
pub trait Preprocess {
    /// Convert a raw frame to its smoothed grayscale representation.
    ///
    /// The output keeps the dimensions of the input.
    fn process(&self, raw: Frame) -> Result<Frame, MonitorError>;
}

impl<T: Preprocess + ?Sized> Preprocess for Box<T> {
    fn process(&self, raw: Frame) -> Result<Frame, MonitorError> {
        (**self).process(raw)
    }
}

/// Grayscale conversion followed by a Gaussian blur, in pure Rust.
///
/// The pipeline order is fixed. The only knob is the blur kernel size, chosen at construction.
#[derive(Clone, Debug)]
pub struct Preprocessor {
    sigma: Option<f32>,
}

impl Preprocessor {
    /// Create a preprocessor for a square `kernel_size` x `kernel_size` Gaussian.
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
            sigma: (kernel_size > 1).then(|| kernel_sigma(kernel_size)),
        })
    }
}

impl Preprocess for Preprocessor {
    fn process(&self, raw: Frame) -> Result<Frame, MonitorError> {
        let (w, h) = raw.dim();
        let format = raw.format();

        let gray = match format {
            PixelFormat::Gray8 => GrayImage::from_raw(w as u32, h as u32, raw.into_vec()),
            PixelFormat::Bgr8 => {
                RgbImage::from_raw(w as u32, h as u32, raw.into_vec()).map(|mut bgr| {
                    bgr.pixels_mut().for_each(|p| p.0.swap(0, 2));
                    grayscale(&bgr)
                })
            }
        }
        .ok_or_else(|| {
            MonitorError::InvalidFrame(format!("{}x{} {:?} does not fit an image", w, h, format))
        })?;

        let gray = match self.sigma {
            Some(sigma) => gaussian_blur_f32(&gray, sigma),
            None => gray,
        };

        Frame::new(w, h, PixelFormat::Gray8, gray.into_raw())
    }
}

/// Gaussian sigma for an odd kernel size, derived the way vision libraries do when none is given.
pub fn kernel_sigma(size: usize) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn gray(pre: &Preprocessor, raw: Frame) -> Frame {
        pre.process(raw).unwrap()
    }

    #[test]
    fn rejects_even_kernel() {
        assert!(Preprocessor::try_new(8).is_err());
        assert!(Preprocessor::try_new(0).is_err());
    }

    #[test]
    fn sigma_follows_kernel_size() {
        assert_approx_eq!(kernel_sigma(3), 0.8, 1e-6);
        assert_approx_eq!(kernel_sigma(21), 3.5, 1e-5);
        assert!(Preprocessor::try_new(1).unwrap().sigma.is_none());
    }

    #[test]
    fn luma_of_primaries() {
        let pre = Preprocessor::try_new(1).unwrap();
        let raw = Frame::new(
            5,
            1,
            PixelFormat::Bgr8,
            vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255, 0, 0, 0],
        )
        .unwrap();

        let out = gray(&pre, raw);
        let luma = out.as_slice();

        assert_eq!(out.format(), PixelFormat::Gray8);
        assert_eq!(out.dim(), (5, 1));
        // Green dominates perceived brightness, blue contributes least.
        assert!(luma[1] > luma[2] && luma[2] > luma[0] && luma[0] > 0);
        assert_eq!(luma[3], 255);
        assert_eq!(luma[4], 0);
    }

    #[test]
    fn gray_input_is_not_recoloured() {
        let pre = Preprocessor::try_new(1).unwrap();
        let raw = Frame::new(3, 1, PixelFormat::Gray8, vec![1, 128, 250]).unwrap();

        assert_eq!(gray(&pre, raw.clone()), raw);
    }

    #[test]
    fn uniform_frame_survives_blur() {
        let pre = Preprocessor::try_new(21).unwrap();
        let out = gray(&pre, Frame::filled(32, 24, PixelFormat::Bgr8, 200));

        assert_eq!(out.dim(), (32, 24));
        assert!(out.as_slice().iter().all(|&v| v.abs_diff(200) <= 1));
    }

    #[test]
    fn blur_spreads_point_symmetrically() {
        let pre = Preprocessor::try_new(9).unwrap();

        let mut raw = Frame::filled(31, 31, PixelFormat::Gray8, 0);
        raw.as_mut_slice()[15 * 31 + 15] = 255;

        let out = gray(&pre, raw);
        let at = |x: usize, y: usize| out.as_slice()[y * 31 + x];

        assert!(at(15, 15) > 0 && at(15, 15) < 255);
        assert!(at(15, 15) >= at(16, 15));
        assert!(at(14, 15).abs_diff(at(16, 15)) <= 1);
        assert!(at(15, 14).abs_diff(at(15, 16)) <= 1);
        assert_eq!(at(0, 0), 0);
    }

    #[test]
    fn blur_handles_frames_smaller_than_kernel() {
        let pre = Preprocessor::try_new(21).unwrap();
        let out = gray(&pre, Frame::filled(3, 2, PixelFormat::Gray8, 7));

        assert_eq!(out.dim(), (3, 2));
        assert!(out.as_slice().iter().all(|&v| v.abs_diff(7) <= 1));
    }

    #[test]
    fn processing_is_deterministic() {
        let pre = Preprocessor::try_new(9).unwrap();
        let raw = Frame::new(
            8,
            8,
            PixelFormat::Bgr8,
            (0..8 * 8 * 3).map(|i| (i * 37 % 256) as u8).collect(),
        )
        .unwrap();

        assert_eq!(gray(&pre, raw.clone()), gray(&pre, raw));
    }

    #[test]
    fn boxed_preprocessor_forwards() {
        let pre: Box<dyn Preprocess> = Box::new(Preprocessor::try_new(3).unwrap());
        let out = pre
            .process(Frame::filled(4, 4, PixelFormat::Bgr8, 0))
            .unwrap();

        assert_eq!(out, Frame::filled(4, 4, PixelFormat::Gray8, 0));
    }
}
