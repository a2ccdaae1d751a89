use crate::shared::error::TrackingError;
use crate::shared::frame::Frame;

/// Supplies frames in presentation order.
///
/// Implementations own decoding; consumers only see RGB [`Frame`]s with
/// increasing indices.
pub trait FrameSource: Send {
    /// Number of frames, when known up front.
    fn len_hint(&self) -> Option<usize>;

    fn frames(&mut self) -> Box<dyn Iterator<Item = Result<Frame, TrackingError>> + '_>;
}
