use crate::window::{solid, wait_ms, Windows};
use camwatch::prelude::v1::{Result, *};
use opencv::highgui;
use std::time::Duration;

const WINDOW_PREFIX: &str = "camwatch-flash";

/// Screen edge highlight drawn with HighGUI windows.
pub struct CvBorderFlash {
    display: DisplaySettings,
}

impl CvBorderFlash {
    pub fn new(display: DisplaySettings) -> Self {
        Self { display }
    }

    /// Screen rectangles `(x, y, width, height)` to cover.
    fn rects(&self) -> Vec<(i32, i32, i32, i32)> {
        let sw = self.display.screen_width as i32;
        let sh = self.display.screen_height as i32;
        let bw = std::cmp::min(self.display.border_width as i32, std::cmp::min(sw, sh));

        match self.display.flash_style {
            FlashStyle::FullScreen => vec![(0, 0, sw, sh)],
            FlashStyle::Borders => vec![
                (0, 0, sw, bw),
                (0, sh - bw, sw, bw),
                (0, 0, bw, sh),
                (sw - bw, 0, bw, sh),
            ],
        }
    }
}

impl AlertSink for CvBorderFlash {
    fn flash(&mut self, color: Rgb, duration: Duration) -> Result<()> {
        let mut windows = Windows::default();

        for (i, (x, y, w, h)) in self.rects().into_iter().enumerate() {
            let name = format!("{}-{}", WINDOW_PREFIX, i);
            windows.open(&name, x, y, w, h)?;
            highgui::imshow(&name, &solid(w, h, color)?)?;
        }

        // Waiting on a key pumps the GUI events, so the windows actually show.
        highgui::wait_key(wait_ms(duration))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flash(style: FlashStyle) -> CvBorderFlash {
        CvBorderFlash::new(DisplaySettings {
            screen_width: 800,
            screen_height: 600,
            border_width: 40,
            flash_style: style,
            ..Default::default()
        })
    }

    #[test]
    fn borders_hug_screen_edges() {
        assert_eq!(
            flash(FlashStyle::Borders).rects(),
            vec![
                (0, 0, 800, 40),
                (0, 560, 800, 40),
                (0, 0, 40, 600),
                (760, 0, 40, 600),
            ]
        );
    }

    #[test]
    fn full_screen_is_one_window() {
        assert_eq!(
            flash(FlashStyle::FullScreen).rects(),
            vec![(0, 0, 800, 600)]
        );
    }
}
