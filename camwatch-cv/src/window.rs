use camwatch::prelude::v1::{Result, *};
use log::*;
use opencv::core::{Scalar, CV_8UC1, CV_8UC3};
use opencv::highgui;
use opencv::prelude::*;
use std::time::Duration;

/// Set of HighGUI windows destroyed on drop.
///
/// Windows go away even when rendering bails out half way.
#[derive(Default)]
pub struct Windows {
    names: Vec<String>,
}

impl Windows {
    /// Create a borderless window at the given screen rectangle.
    pub fn open(&mut self, name: &str, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        highgui::named_window(name, highgui::WINDOW_NORMAL)?;
        self.names.push(name.to_string());
        highgui::resize_window(name, width, height)?;
        highgui::move_window(name, x, y)?;
        Ok(())
    }
}

impl Drop for Windows {
    fn drop(&mut self) {
        for name in self.names.drain(..) {
            if let Err(e) = highgui::destroy_window(&name) {
                debug!("Failed to destroy window {}: {}", name, e);
            }
        }

        // HighGUI only processes the close on the next event pump.
        let _ = highgui::wait_key(1);
    }
}

/// Solid colour image.
pub fn solid(width: i32, height: i32, color: Rgb) -> Result<Mat> {
    Ok(Mat::new_rows_cols_with_default(
        height,
        width,
        CV_8UC3,
        Scalar::new(color.b as f64, color.g as f64, color.r as f64, 0.0),
    )?)
}

/// Copy a frame into a new `Mat`.
pub fn frame_to_mat(frame: &Frame) -> Result<Mat> {
    let typ = match frame.format() {
        PixelFormat::Bgr8 => CV_8UC3,
        PixelFormat::Gray8 => CV_8UC1,
    };

    let mut mat = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        typ,
        Scalar::all(0.0),
    )?;

    mat.data_bytes_mut()?.copy_from_slice(frame.as_slice());

    Ok(mat)
}

/// Copy a packed 8-bit `Mat` into a frame.
pub fn mat_to_frame(mat: &Mat) -> Result<Frame> {
    let format = match mat.typ() {
        t if t == CV_8UC3 => PixelFormat::Bgr8,
        t if t == CV_8UC1 => PixelFormat::Gray8,
        t => return Err(anyhow!("unsupported mat type {}", t)),
    };

    Ok(Frame::new(
        mat.cols() as usize,
        mat.rows() as usize,
        format,
        mat.data_bytes()?.to_vec(),
    )?)
}

/// `wait_key` delay covering `duration`, at least 1 ms so that events get pumped.
pub fn wait_ms(duration: Duration) -> i32 {
    std::cmp::max(i32::try_from(duration.as_millis()).unwrap_or(i32::MAX), 1)
}
