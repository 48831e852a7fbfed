use crate::item::MediaItem;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Pixel size of the crop canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for CanvasSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CropOutcome {
    /// The edited item; its key is ignored in favour of the requested one
    Cropped(MediaItem),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryOutcome {
    Picked(Vec<MediaItem>),
    Cancelled,
}

/// Opens the crop and photo-library sub-flows.
///
/// Each call resolves at most once. Dropping the returned future abandons the
/// sub-flow; the picker does this on teardown.
#[async_trait]
pub trait Router: Send + Sync {
    async fn open_crop(&self, item: MediaItem, canvas: CanvasSize) -> CropOutcome;

    /// `max_count` is `None` when the picker has no item limit
    async fn open_library(
        &self,
        preselected: Vec<MediaItem>,
        max_count: Option<usize>,
    ) -> LibraryOutcome;
}
