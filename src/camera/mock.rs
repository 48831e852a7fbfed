use super::interface::{CameraController, CameraPosition, OutputParameters};
use crate::item::{ExifOrientation, ImageSource, MediaItem};
use crate::orientation::{OrientationSubscription, OrientationTracker};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct MockCameraState {
    access_granted: bool,
    back_flash: bool,
    has_front_camera: bool,
    position: CameraPosition,
    flash_enabled: bool,
    flash_busy: bool,
    capture_fails: bool,
    output_needed: bool,
    captures: u64,
    resolution: (u32, u32),
}

/// In-memory camera for tests and the demo binary
pub struct MockCameraController {
    state: Mutex<MockCameraState>,
    tracker: OrientationTracker,
    latency: Duration,
}

impl MockCameraController {
    /// Back camera with flash, front camera present, access granted
    pub fn new(tracker: OrientationTracker) -> Self {
        Self {
            state: Mutex::new(MockCameraState {
                access_granted: true,
                back_flash: true,
                has_front_camera: true,
                position: CameraPosition::Back,
                flash_enabled: false,
                flash_busy: false,
                capture_fails: false,
                output_needed: false,
                captures: 0,
                resolution: (1920, 1440),
            }),
            tracker,
            latency: Duration::ZERO,
        }
    }

    pub fn with_access(self, granted: bool) -> Self {
        self.state.lock().access_granted = granted;
        self
    }

    pub fn with_flash(self, available: bool) -> Self {
        self.state.lock().back_flash = available;
        self
    }

    pub fn with_front_camera(self, present: bool) -> Self {
        self.state.lock().has_front_camera = present;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_access_granted(&self, granted: bool) {
        info!("Mock camera access {}", if granted { "granted" } else { "revoked" });
        self.state.lock().access_granted = granted;
    }

    /// Make flash changes report failure, as when the hardware is busy
    pub fn set_flash_busy(&self, busy: bool) {
        self.state.lock().flash_busy = busy;
    }

    pub fn set_capture_fails(&self, fails: bool) {
        self.state.lock().capture_fails = fails;
    }

    pub fn flash_enabled_now(&self) -> bool {
        self.state.lock().flash_enabled
    }

    pub fn position(&self) -> CameraPosition {
        self.state.lock().position
    }

    pub fn capture_count(&self) -> u64 {
        self.state.lock().captures
    }

    pub fn is_session_running(&self) -> bool {
        let state = self.state.lock();
        state.output_needed && state.access_granted
    }

    pub fn orientation_tracker(&self) -> &OrientationTracker {
        &self.tracker
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn flash_available_locked(state: &MockCameraState) -> bool {
        state.access_granted && state.position == CameraPosition::Back && state.back_flash
    }

    fn output_orientation(position: CameraPosition) -> ExifOrientation {
        match position {
            CameraPosition::Back => ExifOrientation::Left,
            CameraPosition::Front => ExifOrientation::LeftMirrored,
        }
    }
}

#[async_trait]
impl CameraController for MockCameraController {
    async fn output_parameters(&self) -> Option<OutputParameters> {
        self.simulate_latency().await;
        let state = self.state.lock();
        if !state.access_granted {
            debug!("Mock camera: access denied");
            return None;
        }

        Some(OutputParameters {
            width: state.resolution.0,
            height: state.resolution.1,
            orientation: Self::output_orientation(state.position),
        })
    }

    fn set_output_needed(&self, needed: bool) {
        let mut state = self.state.lock();
        if state.output_needed != needed {
            debug!("Mock camera output {}", if needed { "started" } else { "stopped" });
        }
        state.output_needed = needed;
    }

    async fn is_flash_available(&self) -> bool {
        self.simulate_latency().await;
        Self::flash_available_locked(&self.state.lock())
    }

    async fn is_flash_enabled(&self) -> bool {
        self.simulate_latency().await;
        self.state.lock().flash_enabled
    }

    async fn set_flash_enabled(&self, enabled: bool) -> bool {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        if !Self::flash_available_locked(&state) || state.flash_busy {
            warn!("Mock camera: flash change to {} rejected", enabled);
            return false;
        }
        state.flash_enabled = enabled;
        true
    }

    async fn can_toggle_camera(&self) -> bool {
        self.simulate_latency().await;
        let state = self.state.lock();
        state.access_granted && state.has_front_camera
    }

    async fn toggle_camera(&self) -> ExifOrientation {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        if state.has_front_camera {
            state.position = state.position.toggled();
            if state.position == CameraPosition::Front {
                state.flash_enabled = false;
            }
            debug!("Mock camera switched to {:?}", state.position);
        }
        Self::output_orientation(state.position)
    }

    async fn capture_photo(&self) -> Option<MediaItem> {
        self.simulate_latency().await;
        let mut state = self.state.lock();
        if !state.access_granted || state.capture_fails {
            warn!("Mock camera: capture failed");
            return None;
        }

        state.captures += 1;
        let reference = format!(
            "camera://{}/{}",
            match state.position {
                CameraPosition::Back => "back",
                CameraPosition::Front => "front",
            },
            state.captures
        );
        Some(MediaItem::captured(
            ImageSource::new(reference),
            Self::output_orientation(state.position),
        ))
    }

    fn observe_orientation(&self) -> OrientationSubscription {
        self.tracker.subscribe()
    }
}
