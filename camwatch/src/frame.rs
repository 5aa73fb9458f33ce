//! # Frame model

use crate::error::MonitorError;

/// Layout of samples within a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 interleaved channels in blue, green, red order, as delivered by most capture drivers.
    Bgr8,
    /// Single intensity channel.
    Gray8,
}

impl PixelFormat {
    /// Number of samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Bgr8 => 3,
            Self::Gray8 => 1,
        }
    }
}

/// Row-major, tightly packed 8-bit image.
///
/// Frames move between pipeline stages by value. Whoever holds a frame owns its buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a raw sample buffer.
    ///
    /// # Arguments
    ///
    /// * `width` - number of pixels per row.
    /// * `height` - number of rows.
    /// * `format` - sample layout of `data`.
    /// * `data` - samples, exactly `width * height * format.channels()` of them.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, MonitorError> {
        let expected = width * height * format.channels();

        if data.len() != expected {
            return Err(MonitorError::InvalidFrame(format!(
                "{}x{} {:?} needs {} samples, got {}",
                width,
                height,
                format,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Create a frame with every sample set to `value`.
    pub fn filled(width: usize, height: usize, format: PixelFormat, value: u8) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![value; width * height * format.channels()],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Get width and height of the frame.
    pub fn dim(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take the sample buffer out of the frame.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffer() {
        let err = Frame::new(4, 4, PixelFormat::Bgr8, vec![0; 4 * 4]).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidFrame(_)));
    }

    #[test]
    fn buffer_moves_out_intact() {
        let frame = Frame::new(3, 2, PixelFormat::Gray8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.dim(), (3, 2));
        assert_eq!(frame.into_vec(), vec![1, 2, 3, 4, 5, 6]);
    }
}
