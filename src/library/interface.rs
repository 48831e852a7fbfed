use crate::item::ImageSource;
use futures::stream::BoxStream;

/// Source of the thumbnail shown on the photo library button
pub trait LatestPhotoProvider: Send + Sync {
    /// The newest library photo now, then again whenever it changes.
    ///
    /// `None` means the library is empty or cannot be read. The stream ends
    /// when the library goes away; dropping it stops the observation.
    fn observe_latest_photo(&self) -> BoxStream<'static, Option<ImageSource>>;
}
