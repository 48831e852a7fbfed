use crate::camera::OutputParameters;
use crate::item::{ExifOrientation, ImageSource, ItemKey, MediaItem};
use crate::orientation::{DeviceOrientation, OverlayTransform};
use serde::{Deserialize, Serialize};

/// What the main area of the screen shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewMode {
    Camera,
    PhotoPreview(MediaItem),
}

/// One-way declarative update pushed to the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViewUpdate {
    SetMode(ViewMode),
    AddItems(Vec<MediaItem>),
    UpdateItem(MediaItem),
    RemoveItem(ItemKey),
    MoveItem { from: usize, to: usize },
    SelectItem(ItemKey),
    SelectCamera,
    SetFlashButtonVisible(bool),
    SetFlashButtonOn(bool),
    SetCameraControlsEnabled(bool),
    SetAccessDeniedViewVisible(bool),
    AdjustForDeviceOrientation {
        orientation: DeviceOrientation,
        transform: OverlayTransform,
    },
    SetCameraOutputParameters(OutputParameters),
    SetCameraOutputOrientation(ExifOrientation),
    SetCameraToggleButtonVisible(bool),
    SetCropButtonVisible(bool),
    SetShutterButtonEnabled(bool),
    SetPhotoLibraryButtonEnabled(bool),
    /// The camera slot of the ribbon; hidden once no more items fit
    SetCameraButtonVisible(bool),
    /// Title over the previewed photo; `None` while the camera is shown
    SetPhotoTitle(Option<String>),
    /// Thumbnail on the photo library button
    SetLatestLibraryImage(Option<ImageSource>),
    AnimateFlash,
}

impl ViewUpdate {
    /// Short name used for logging and test filtering
    pub fn name(&self) -> &'static str {
        match self {
            ViewUpdate::SetMode(_) => "set_mode",
            ViewUpdate::AddItems(_) => "add_items",
            ViewUpdate::UpdateItem(_) => "update_item",
            ViewUpdate::RemoveItem(_) => "remove_item",
            ViewUpdate::MoveItem { .. } => "move_item",
            ViewUpdate::SelectItem(_) => "select_item",
            ViewUpdate::SelectCamera => "select_camera",
            ViewUpdate::SetFlashButtonVisible(_) => "set_flash_button_visible",
            ViewUpdate::SetFlashButtonOn(_) => "set_flash_button_on",
            ViewUpdate::SetCameraControlsEnabled(_) => "set_camera_controls_enabled",
            ViewUpdate::SetAccessDeniedViewVisible(_) => "set_access_denied_view_visible",
            ViewUpdate::AdjustForDeviceOrientation { .. } => "adjust_for_device_orientation",
            ViewUpdate::SetCameraOutputParameters(_) => "set_camera_output_parameters",
            ViewUpdate::SetCameraOutputOrientation(_) => "set_camera_output_orientation",
            ViewUpdate::SetCameraToggleButtonVisible(_) => "set_camera_toggle_button_visible",
            ViewUpdate::SetCropButtonVisible(_) => "set_crop_button_visible",
            ViewUpdate::SetShutterButtonEnabled(_) => "set_shutter_button_enabled",
            ViewUpdate::SetPhotoLibraryButtonEnabled(_) => "set_photo_library_button_enabled",
            ViewUpdate::SetCameraButtonVisible(_) => "set_camera_button_visible",
            ViewUpdate::SetPhotoTitle(_) => "set_photo_title",
            ViewUpdate::SetLatestLibraryImage(_) => "set_latest_library_image",
            ViewUpdate::AnimateFlash => "animate_flash",
        }
    }
}

/// Receiver of view updates. The picker never reads anything back.
pub trait ViewSurface: Send + Sync {
    fn apply(&self, update: ViewUpdate);
}
