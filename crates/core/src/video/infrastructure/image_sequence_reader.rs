use std::path::{Path, PathBuf};

use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

/// Treats an ordered list of image files as a video, one frame per file.
///
/// Decoding is lazy: each file is read when its frame is requested.
pub struct ImageSequenceReader {
    paths: Vec<PathBuf>,
}

impl ImageSequenceReader {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageSequenceReader {
    fn len_hint(&self) -> Option<usize> {
        Some(self.paths.len())
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, TrackingError>> + '_> {
        let mut first_size: Option<(u32, u32)> = None;
        Box::new(self.paths.iter().enumerate().map(move |(index, path)| {
            let frame = decode_rgb(path, index)?;
            let size = (frame.width(), frame.height());
            match first_size {
                None => first_size = Some(size),
                Some(expected) if expected != size => log::warn!(
                    "{} is {}x{}, sequence started at {}x{}",
                    path.display(),
                    size.0,
                    size.1,
                    expected.0,
                    expected.1
                ),
                Some(_) => {}
            }
            Ok(frame)
        }))
    }
}

fn decode_rgb(path: &Path, index: usize) -> Result<Frame, TrackingError> {
    let img = image::open(path)
        .map_err(|source| TrackingError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(img.into_raw(), width, height, 3, index))
}
