use crate::item::{ExifOrientation, MediaItem};
use crate::orientation::OrientationSubscription;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Frame geometry needed to size a preview surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputParameters {
    pub width: u32,
    pub height: u32,
    pub orientation: ExifOrientation,
}

/// Which lens is feeding the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraPosition {
    #[default]
    Back,
    Front,
}

impl CameraPosition {
    pub fn toggled(&self) -> Self {
        match self {
            CameraPosition::Back => CameraPosition::Front,
            CameraPosition::Front => CameraPosition::Back,
        }
    }
}

/// Live camera session.
///
/// Every async method resolves exactly once and never blocks the caller's
/// thread. Failures are reported through the return value (`None`/`false`),
/// never as errors: hardware may be busy or access may have been revoked at
/// any time.
#[async_trait]
pub trait CameraController: Send + Sync {
    /// Output geometry, or `None` when camera access is denied
    async fn output_parameters(&self) -> Option<OutputParameters>;

    /// Start or stop feeding frames; enabling output starts the session
    fn set_output_needed(&self, needed: bool);

    async fn is_flash_available(&self) -> bool;

    async fn is_flash_enabled(&self) -> bool;

    /// Returns whether the change took effect
    async fn set_flash_enabled(&self, enabled: bool) -> bool;

    async fn can_toggle_camera(&self) -> bool;

    /// Switch front/back lens and return the new output orientation
    async fn toggle_camera(&self) -> ExifOrientation;

    /// Take a photo; `None` on any failure
    async fn capture_photo(&self) -> Option<MediaItem>;

    /// Persistent orientation subscription, released when dropped
    fn observe_orientation(&self) -> OrientationSubscription;
}

/// One fresh reading of the camera's capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraCapabilities {
    pub flash_available: bool,
    pub flash_enabled: bool,
    pub can_toggle: bool,
}

impl CameraCapabilities {
    /// Query the controller; nothing here is cached
    pub async fn query(camera: &dyn CameraController) -> Self {
        let flash_available = camera.is_flash_available().await;
        let flash_enabled = flash_available && camera.is_flash_enabled().await;
        let can_toggle = camera.can_toggle_camera().await;

        let capabilities = Self {
            flash_available,
            flash_enabled,
            can_toggle,
        };
        trace!("Camera capabilities: {:?}", capabilities);
        capabilities
    }
}
