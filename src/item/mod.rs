mod collection;
mod types;
#[cfg(test)]
mod tests;

pub use collection::{InsertPosition, ItemCollection, Removal};
pub use types::{CropRect, ExifOrientation, ImageSource, ItemKey, ItemOrigin, MediaItem};
