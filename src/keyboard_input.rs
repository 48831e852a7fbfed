use crate::error::{PickerError, Result};
use crate::item::MediaItem;
use crate::orientation::OrientationTracker;
use crate::presenter::{PickerHandle, PresenterSnapshot, UserIntent};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a key press asks the picker to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Intent(UserIntent),
    ToggleFlash,
    NextItem,
    PreviousItem,
    RotateDevice,
    Finish,
    Cancel,
}

/// How an interactive session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Finished(Vec<MediaItem>),
    Cancelled,
}

/// Key bindings of the demo session
pub fn action_for(code: KeyCode) -> Option<KeyAction> {
    let action = match code {
        KeyCode::Char(' ') => KeyAction::Intent(UserIntent::ShutterTapped),
        KeyCode::Char('l') => KeyAction::Intent(UserIntent::LibraryTapped),
        KeyCode::Char('c') => KeyAction::Intent(UserIntent::CropTapped),
        KeyCode::Char('x') => KeyAction::Intent(UserIntent::RemoveTapped),
        KeyCode::Char('t') => KeyAction::Intent(UserIntent::CameraToggleTapped),
        KeyCode::Char('h') => KeyAction::Intent(UserIntent::CameraThumbnailTapped),
        KeyCode::Char('s') => KeyAction::Intent(UserIntent::AccessSettingsTapped),
        KeyCode::Char('f') => KeyAction::ToggleFlash,
        KeyCode::Right => KeyAction::NextItem,
        KeyCode::Left => KeyAction::PreviousItem,
        KeyCode::Char('r') => KeyAction::RotateDevice,
        KeyCode::Enter => KeyAction::Finish,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Cancel,
        _ => return None,
    };
    Some(action)
}

/// Swipe intent for moving one slot along the ribbon; the camera slot sits
/// after the last item
pub fn swipe_target(snapshot: &PresenterSnapshot, forward: bool) -> UserIntent {
    let camera_slot = snapshot.items.len();
    let current = snapshot
        .mode
        .previewed()
        .and_then(|key| snapshot.items.iter().position(|item| item.key() == key))
        .unwrap_or(camera_slot);

    let target = if forward {
        (current + 1).min(camera_slot)
    } else {
        current.saturating_sub(1)
    };

    match snapshot.items.get(target) {
        Some(item) => UserIntent::SwipedToItem(item.key()),
        None => UserIntent::SwipedToCamera,
    }
}

/// Keyboard driver for an interactive picker session
pub struct KeyboardInputHandler {
    picker: PickerHandle,
    tracker: OrientationTracker,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(picker: PickerHandle, tracker: OrientationTracker) -> Self {
        Self {
            picker,
            tracker,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start reading keys; the returned task resolves when the session ends
    pub fn start(&self) -> JoinHandle<Result<SessionOutcome>> {
        info!(
            "Starting keyboard input - SPACE shutter, L library, C crop, X remove, \
             ENTER finish, Q quit"
        );

        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || read_keys(actions_tx, cancellation_token));

        let picker = self.picker.clone();
        let tracker = self.tracker.clone();
        let cancellation_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            let outcome = dispatch_actions(&picker, &tracker, actions_rx).await;
            cancellation_token.cancel();
            outcome
        })
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Give the reader a moment to leave raw mode itself
        tokio::time::sleep(Duration::from_millis(200)).await;
        let _ = disable_raw_mode();

        Ok(())
    }
}

fn read_keys(actions: mpsc::UnboundedSender<KeyAction>, cancellation_token: CancellationToken) {
    if let Err(e) = enable_raw_mode() {
        error!("Failed to enable raw mode for keyboard input: {}", e);
        return;
    }
    debug!("Raw mode enabled - keyboard handler active");

    while !cancellation_token.is_cancelled() {
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => {
                let Ok(Event::Key(key_event)) = event::read() else {
                    continue;
                };
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                match action_for(key_event.code) {
                    Some(action) => {
                        let ends_session = matches!(action, KeyAction::Finish | KeyAction::Cancel);
                        if actions.send(action).is_err() || ends_session {
                            break;
                        }
                    }
                    None => debug!("Key pressed: {:?}", key_event.code),
                }
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Error polling for keyboard events: {}", e);
            }
        }
    }

    if let Err(e) = disable_raw_mode() {
        error!("Failed to disable raw mode: {}", e);
    } else {
        debug!("Raw mode disabled");
    }
}

async fn dispatch_actions(
    picker: &PickerHandle,
    tracker: &OrientationTracker,
    mut actions: mpsc::UnboundedReceiver<KeyAction>,
) -> Result<SessionOutcome> {
    while let Some(action) = actions.recv().await {
        debug!("Key action: {:?}", action);
        match action {
            KeyAction::Intent(intent) => picker.send_intent(intent).await?,
            KeyAction::ToggleFlash => {
                let snapshot = picker.snapshot().await?;
                picker
                    .send_intent(UserIntent::FlashToggled(!snapshot.camera.flash_enabled))
                    .await?;
            }
            KeyAction::NextItem | KeyAction::PreviousItem => {
                let snapshot = picker.snapshot().await?;
                let intent = swipe_target(&snapshot, action == KeyAction::NextItem);
                picker.send_intent(intent).await?;
            }
            KeyAction::RotateDevice => {
                let next = tracker.current().rotated_clockwise();
                info!("Device rotated to {:?}", next);
                tracker.report(next);
            }
            KeyAction::Finish => return Ok(SessionOutcome::Finished(picker.finish().await?)),
            KeyAction::Cancel => {
                picker.cancel().await?;
                return Ok(SessionOutcome::Cancelled);
            }
        }
    }
    Err(PickerError::component("keyboard", "input closed before the session ended"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ImageSource, ItemKey};
    use crate::orientation::{DeviceOrientation, OverlayTransform};
    use crate::presenter::{AccessState, CameraUiState, CaptureMode};

    fn snapshot(count: usize, previewed: Option<usize>) -> (PresenterSnapshot, Vec<ItemKey>) {
        let items: Vec<MediaItem> = (0..count)
            .map(|n| MediaItem::from_library(ImageSource::new(format!("library://{}", n))))
            .collect();
        let keys: Vec<ItemKey> = items.iter().map(MediaItem::key).collect();
        let mode = previewed.map_or(CaptureMode::Capturing, |index| {
            CaptureMode::Previewing(keys[index])
        });
        let snapshot = PresenterSnapshot {
            mode,
            items,
            selected: mode.previewed(),
            camera: CameraUiState {
                access: AccessState::Unknown,
                ..Default::default()
            },
            device_orientation: DeviceOrientation::Portrait,
            overlay_orientation: DeviceOrientation::Portrait,
            overlay: OverlayTransform::identity(),
            photo_title: None,
            latest_library_image: None,
            crop_pending: false,
            library_pending: false,
        };
        (snapshot, keys)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            action_for(KeyCode::Char(' ')),
            Some(KeyAction::Intent(UserIntent::ShutterTapped))
        );
        assert_eq!(action_for(KeyCode::Enter), Some(KeyAction::Finish));
        assert_eq!(action_for(KeyCode::Esc), Some(KeyAction::Cancel));
        assert_eq!(action_for(KeyCode::Right), Some(KeyAction::NextItem));
        assert_eq!(action_for(KeyCode::Char('z')), None);
    }

    #[test]
    fn test_swipe_target_walks_the_ribbon() {
        let (from_camera, keys) = snapshot(2, None);
        assert_eq!(
            swipe_target(&from_camera, false),
            UserIntent::SwipedToItem(keys[1])
        );
        assert_eq!(swipe_target(&from_camera, true), UserIntent::SwipedToCamera);

        let (first, keys) = snapshot(2, Some(0));
        assert_eq!(swipe_target(&first, true), UserIntent::SwipedToItem(keys[1]));
        assert_eq!(swipe_target(&first, false), UserIntent::SwipedToItem(keys[0]));

        let (last, _) = snapshot(2, Some(1));
        assert_eq!(swipe_target(&last, true), UserIntent::SwipedToCamera);

        let (empty, _) = snapshot(0, None);
        assert_eq!(swipe_target(&empty, false), UserIntent::SwipedToCamera);
    }

    #[tokio::test]
    async fn test_keyboard_handler_stop() {
        use crate::assembly::PickerAssembly;
        use crate::camera::MockCameraController;
        use crate::config::PickerConfig;
        use crate::library::MockPhotoLibrary;
        use crate::presenter::ModuleSeed;
        use crate::router::MockRouter;
        use crate::view::RecordingView;
        use std::sync::Arc;

        let tracker = OrientationTracker::default();
        let module = PickerAssembly::module(
            PickerConfig::default(),
            ModuleSeed::default(),
            Arc::new(MockCameraController::new(tracker.clone())),
            Arc::new(MockRouter::new()),
            Arc::new(MockPhotoLibrary::new()),
            Arc::new(RecordingView::new()),
            |_| {},
        )
        .unwrap();

        let handler = KeyboardInputHandler::new(module.handle().clone(), tracker);
        handler.stop().await.unwrap();
        assert!(handler.cancellation_token.is_cancelled());

        module.shutdown().await.unwrap();
    }
}
