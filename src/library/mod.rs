mod interface;
mod mock;

pub use interface::LatestPhotoProvider;
pub use mock::MockPhotoLibrary;
