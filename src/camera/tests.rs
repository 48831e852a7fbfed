use super::*;
use crate::item::{ExifOrientation, ItemOrigin};
use crate::orientation::{DeviceOrientation, OrientationTracker};
use tokio::time::{timeout, Duration};

fn create_test_camera() -> MockCameraController {
    MockCameraController::new(OrientationTracker::default())
}

#[tokio::test]
async fn test_output_parameters_when_granted() {
    let camera = create_test_camera();
    let parameters = camera.output_parameters().await.unwrap();
    assert_eq!((parameters.width, parameters.height), (1920, 1440));
    assert_eq!(parameters.orientation, ExifOrientation::Left);
}

#[tokio::test]
async fn test_access_denied_reports_none() {
    let camera = create_test_camera().with_access(false);
    assert!(camera.output_parameters().await.is_none());
    assert!(camera.capture_photo().await.is_none());
    assert!(!camera.is_flash_available().await);
    assert_eq!(camera.capture_count(), 0);

    camera.set_access_granted(true);
    assert!(camera.output_parameters().await.is_some());
}

#[tokio::test]
async fn test_flash_unavailable_leaves_state_unchanged() {
    let camera = create_test_camera().with_flash(false);
    assert!(!camera.is_flash_available().await);

    let success = camera.set_flash_enabled(true).await;
    assert!(!success);
    assert!(!camera.is_flash_enabled().await);
}

#[tokio::test]
async fn test_flash_busy_reports_failure() {
    let camera = create_test_camera();
    assert!(camera.set_flash_enabled(true).await);
    assert!(camera.flash_enabled_now());

    camera.set_flash_busy(true);
    assert!(!camera.set_flash_enabled(false).await);
    assert!(camera.flash_enabled_now());
}

#[tokio::test]
async fn test_toggle_switches_lens_and_orientation() {
    let camera = create_test_camera();
    assert!(camera.can_toggle_camera().await);
    camera.set_flash_enabled(true).await;

    let orientation = camera.toggle_camera().await;
    assert_eq!(orientation, ExifOrientation::LeftMirrored);
    assert_eq!(camera.position(), CameraPosition::Front);
    // Front lens has no flash
    assert!(!camera.is_flash_available().await);
    assert!(!camera.flash_enabled_now());

    let orientation = camera.toggle_camera().await;
    assert_eq!(orientation, ExifOrientation::Left);
    assert_eq!(camera.position(), CameraPosition::Back);
}

#[tokio::test]
async fn test_toggle_without_front_camera() {
    let camera = create_test_camera().with_front_camera(false);
    assert!(!camera.can_toggle_camera().await);
    camera.toggle_camera().await;
    assert_eq!(camera.position(), CameraPosition::Back);
}

#[tokio::test]
async fn test_capture_produces_unique_items() {
    let camera = create_test_camera();
    let first = camera.capture_photo().await.unwrap();
    let second = camera.capture_photo().await.unwrap();

    assert_ne!(first.key(), second.key());
    assert_eq!(first.origin, ItemOrigin::Captured);
    assert_eq!(first.image.reference(), "camera://back/1");
    assert_eq!(camera.capture_count(), 2);

    camera.set_capture_fails(true);
    assert!(camera.capture_photo().await.is_none());
    assert_eq!(camera.capture_count(), 2);
}

#[tokio::test]
async fn test_output_needed_starts_session() {
    let camera = create_test_camera();
    assert!(!camera.is_session_running());
    camera.set_output_needed(true);
    assert!(camera.is_session_running());
    camera.set_output_needed(false);
    assert!(!camera.is_session_running());
}

#[tokio::test]
async fn test_capabilities_query() {
    let camera = create_test_camera();
    let capabilities = CameraCapabilities::query(&camera).await;
    assert!(capabilities.flash_available);
    assert!(!capabilities.flash_enabled);
    assert!(capabilities.can_toggle);

    let denied = create_test_camera().with_access(false);
    assert_eq!(
        CameraCapabilities::query(&denied).await,
        CameraCapabilities::default()
    );
}

#[tokio::test]
async fn test_observe_orientation() {
    let camera = create_test_camera();
    let mut subscription = camera.observe_orientation();
    assert_eq!(camera.orientation_tracker().subscriber_count(), 1);

    camera
        .orientation_tracker()
        .report(DeviceOrientation::LandscapeLeft);
    let next = timeout(Duration::from_millis(100), subscription.changed())
        .await
        .unwrap();
    assert_eq!(next, Some(DeviceOrientation::LandscapeLeft));

    drop(subscription);
    assert_eq!(camera.orientation_tracker().subscriber_count(), 0);
}

#[tokio::test]
async fn test_latency_is_simulated() {
    let camera = create_test_camera().with_latency(Duration::from_millis(20));
    let started = tokio::time::Instant::now();
    camera.capture_photo().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(20));
}
