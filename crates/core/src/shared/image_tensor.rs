//! Builds the normalized NHWC tiles fed to the models.
//!
//! A rectangular region of the frame is padded to a square with zeros,
//! resized bilinearly to the model's input size, then normalized per channel
//! as `(value - mean) / divisor`.

use ndarray::Array4;

use super::error::TrackingError;
use super::frame::Frame;

/// Where the source region sits inside its padded square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadPlacement {
    /// Padding only on the right/bottom.
    TopLeft,
    /// Padding split evenly on both sides (odd remainders go right/bottom).
    Centered,
}

/// Integer pixel rectangle inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn full_frame(frame: &Frame) -> Self {
        Self {
            x: 0,
            y: 0,
            width: frame.width(),
            height: frame.height(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TileSpec {
    pub size: u32,
    pub mean: [f32; 3],
    pub divisor: f32,
}

/// Pad `rect` to a square, resize to `spec.size` and normalize.
///
/// Resampling follows the non-aligned-corner convention: output pixel `i`
/// samples source position `i * side / size`.
pub fn letterbox_tile(
    frame: &Frame,
    rect: PixelRect,
    placement: PadPlacement,
    spec: &TileSpec,
) -> Result<Array4<f32>, TrackingError> {
    frame.ensure_rgb()?;
    if rect.width == 0 || rect.height == 0 {
        return Err(TrackingError::InvalidFrame(format!(
            "empty region {}x{}",
            rect.width, rect.height
        )));
    }
    if rect.x + rect.width > frame.width() || rect.y + rect.height > frame.height() {
        return Err(TrackingError::InvalidFrame(format!(
            "region {rect:?} exceeds frame {}x{}",
            frame.width(),
            frame.height()
        )));
    }

    let src = frame.as_ndarray();
    let w = rect.width as i64;
    let h = rect.height as i64;
    let side = w.max(h);
    let (off_x, off_y) = match placement {
        PadPlacement::TopLeft => (0, 0),
        PadPlacement::Centered => ((side - w) / 2, (side - h) / 2),
    };

    // Pixel of the padded square; zero outside the source region.
    let sample = |sy: i64, sx: i64, c: usize| -> f32 {
        let ry = sy - off_y;
        let rx = sx - off_x;
        if ry < 0 || rx < 0 || ry >= h || rx >= w {
            return 0.0;
        }
        let py = rect.y as usize + ry as usize;
        let px = rect.x as usize + rx as usize;
        src[[py, px, c]] as f32
    };

    let size = spec.size as usize;
    let ratio = side as f32 / size as f32;
    let mut tile = Array4::<f32>::zeros((1, size, size, 3));

    for oy in 0..size {
        let fy = oy as f32 * ratio;
        let y0 = fy.floor() as i64;
        let y1 = (y0 + 1).min(side - 1);
        let wy = fy - y0 as f32;
        for ox in 0..size {
            let fx = ox as f32 * ratio;
            let x0 = fx.floor() as i64;
            let x1 = (x0 + 1).min(side - 1);
            let wx = fx - x0 as f32;
            for c in 0..3 {
                let top = sample(y0, x0, c) + (sample(y0, x1, c) - sample(y0, x0, c)) * wx;
                let bottom = sample(y1, x0, c) + (sample(y1, x1, c) - sample(y1, x0, c)) * wx;
                let value = top + (bottom - top) * wy;
                tile[[0, oy, ox, c]] = (value - spec.mean[c]) / spec.divisor;
            }
        }
    }

    Ok(tile)
}
