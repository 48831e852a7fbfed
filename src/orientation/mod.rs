mod tracker;
mod types;

pub use tracker::{OrientationSubscription, OrientationTracker};
pub use types::{DeviceIdiom, DeviceOrientation, OverlayTransform};
