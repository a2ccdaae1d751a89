use ndarray::ArrayView3;

use super::error::TrackingError;

/// A single camera/image frame: contiguous RGB bytes in row-major order.
///
/// Decoding happens at the frame source; everything downstream reads pixels
/// through [`Frame::as_ndarray`].
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Rejects frames the preprocessing steps cannot sample from.
    pub fn ensure_rgb(&self) -> Result<(), TrackingError> {
        if self.width == 0 || self.height == 0 {
            return Err(TrackingError::InvalidFrame(format!(
                "frame {} has zero size ({}x{})",
                self.index, self.width, self.height
            )));
        }
        if self.channels < 3 {
            return Err(TrackingError::InvalidFrame(format!(
                "frame {} has {} channel(s), expected at least 3",
                self.index, self.channels
            )));
        }
        let (h, w, c) = self.shape();
        if self.data.len() != h * w * c {
            return Err(TrackingError::InvalidFrame(format!(
                "frame {} holds {} bytes, expected {}",
                self.index,
                self.data.len(),
                h * w * c
            )));
        }
        Ok(())
    }

    /// `(height, width, channels)` view. Panics on a length mismatch, which
    /// [`Frame::ensure_rgb`] reports as an error instead.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
