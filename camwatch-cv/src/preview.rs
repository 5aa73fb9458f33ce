use crate::window::{frame_to_mat, Windows};
use camwatch::prelude::v1::{Result, *};
use log::*;
use opencv::core::Size;
use opencv::highgui;
use opencv::imgproc;
use opencv::prelude::*;
use std::time::Duration;

const WINDOW_NAME: &str = "camwatch-preview";

/// Live camera thumbnail in a HighGUI window.
pub struct CvPreview {
    width: u32,
}

impl CvPreview {
    pub fn new(display: &DisplaySettings) -> Self {
        Self {
            width: display.preview_width,
        }
    }

    fn thumbnail(&self, frame: &Frame) -> Result<Mat> {
        let mat = frame_to_mat(frame)?;

        let (fw, fh) = frame.dim();
        let width = self.width as i32;
        let height = std::cmp::max((fh * self.width as usize / fw.max(1)) as i32, 1);

        let mut thumb = Mat::default();
        imgproc::resize(
            &mat,
            &mut thumb,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_AREA,
        )?;

        Ok(thumb)
    }
}

impl PreviewSink for CvPreview {
    fn show_preview(
        &mut self,
        source: &mut dyn FrameSource,
        position: AlertPosition,
        duration: Duration,
        fps: u32,
    ) -> Result<()> {
        let mut windows = Windows::default();
        let mut opened = false;

        let step = Timer::step_for_fps(fps);
        let mut timer = Timer::default();

        while timer.elapsed() < duration {
            match source.read_frame() {
                Ok(frame) => {
                    let thumb = self.thumbnail(&frame)?;

                    if !opened {
                        windows.open(
                            WINDOW_NAME,
                            position.x,
                            position.y,
                            thumb.cols(),
                            thumb.rows(),
                        )?;
                        opened = true;
                    }

                    highgui::imshow(WINDOW_NAME, &thumb)?;
                }
                Err(MonitorError::CaptureEmpty) => trace!("Empty preview frame"),
                Err(e) => return Err(e.into()),
            }

            highgui::wait_key(1)?;
            timer.add(step);
            timer.sleep();
        }

        Ok(())
    }
}
