mod interface;
mod mock;
#[cfg(test)]
mod tests;

pub use interface::{CameraCapabilities, CameraController, CameraPosition, OutputParameters};
pub use mock::MockCameraController;
