use super::interface::LatestPhotoProvider;
use crate::item::ImageSource;
use futures::stream::BoxStream;
use tokio::sync::watch;
use tracing::debug;

/// In-memory photo library whose newest photo is set by hand
pub struct MockPhotoLibrary {
    latest: watch::Sender<Option<ImageSource>>,
}

impl MockPhotoLibrary {
    /// Empty library
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self { latest }
    }

    pub fn with_latest(self, image: ImageSource) -> Self {
        self.set_latest(Some(image));
        self
    }

    /// Replace the newest photo, as when one is saved or deleted
    pub fn set_latest(&self, image: Option<ImageSource>) {
        debug!("Mock library latest photo: {:?}", image);
        self.latest.send_replace(image);
    }

    pub fn observer_count(&self) -> usize {
        self.latest.receiver_count()
    }
}

impl Default for MockPhotoLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestPhotoProvider for MockPhotoLibrary {
    fn observe_latest_photo(&self) -> BoxStream<'static, Option<ImageSource>> {
        let mut receiver = self.latest.subscribe();
        Box::pin(async_stream::stream! {
            let current = receiver.borrow_and_update().clone();
            yield current;
            while receiver.changed().await.is_ok() {
                let latest = receiver.borrow_and_update().clone();
                yield latest;
            }
        })
    }
}
