use crate::camera::{CameraCapabilities, OutputParameters};
use crate::error::Result;
use crate::item::{ExifOrientation, ImageSource, ItemKey, MediaItem};
use crate::orientation::{DeviceOrientation, OverlayTransform};
use crate::router::{CanvasSize, CropOutcome, LibraryOutcome};
use crate::events::PickerEvent;
use crate::view::ViewUpdate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;

/// Principal presenter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CaptureMode {
    #[default]
    Capturing,
    Previewing(ItemKey),
}

impl CaptureMode {
    pub fn previewed(&self) -> Option<ItemKey> {
        match self {
            CaptureMode::Capturing => None,
            CaptureMode::Previewing(key) => Some(*key),
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, CaptureMode::Capturing)
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Capturing => write!(f, "capturing"),
            CaptureMode::Previewing(key) => write!(f, "previewing {}", key),
        }
    }
}

/// Gestures and taps forwarded by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserIntent {
    ShutterTapped,
    ThumbnailTapped(ItemKey),
    CameraThumbnailTapped,
    SwipedToCamera,
    SwipedToItem(ItemKey),
    RemoveTapped,
    CropTapped,
    LibraryTapped,
    CameraToggleTapped,
    FlashToggled(bool),
    ItemDragged { from: usize, to: usize },
    AccessSettingsTapped,
}

/// Initial items supplied by the host
#[derive(Debug, Clone, Default)]
pub struct ModuleSeed {
    pub items: Vec<MediaItem>,
    /// Shown in preview at start when it is one of `items`
    pub selected: Option<ItemKey>,
}

impl ModuleSeed {
    pub fn new(items: Vec<MediaItem>, selected: Option<ItemKey>) -> Self {
        Self { items, selected }
    }
}

/// Last answer about camera access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccessState {
    #[default]
    Unknown,
    Granted(OutputParameters),
    Denied,
}

impl AccessState {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessState::Granted(_))
    }
}

/// UI reflection of the camera's last reported state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CameraUiState {
    pub access: AccessState,
    pub flash_available: bool,
    pub flash_enabled: bool,
    pub can_toggle: bool,
    pub output_orientation: Option<ExifOrientation>,
}

impl CameraUiState {
    pub(crate) fn apply_capabilities(&mut self, capabilities: CameraCapabilities) {
        self.flash_available = capabilities.flash_available;
        self.flash_enabled = capabilities.flash_enabled;
        self.can_toggle = capabilities.can_toggle;
    }
}

/// Point-in-time copy of the presenter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenterSnapshot {
    pub mode: CaptureMode,
    pub items: Vec<MediaItem>,
    pub selected: Option<ItemKey>,
    pub camera: CameraUiState,
    pub device_orientation: DeviceOrientation,
    pub overlay_orientation: DeviceOrientation,
    pub overlay: OverlayTransform,
    pub photo_title: Option<String>,
    pub latest_library_image: Option<ImageSource>,
    pub crop_pending: bool,
    pub library_pending: bool,
}

/// Requests executed on the camera lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CameraRequest {
    OutputParameters,
    Capabilities,
    SetFlash(bool),
    Toggle,
    Capture,
}

/// Results posted back to the presenter
#[derive(Debug)]
pub(crate) enum Completion {
    OutputParameters(Option<OutputParameters>),
    Capabilities(CameraCapabilities),
    FlashSet {
        requested: bool,
        available: bool,
        success: bool,
    },
    Toggled {
        orientation: Option<ExifOrientation>,
        capabilities: CameraCapabilities,
    },
    Captured(Option<MediaItem>),
    CropFinished {
        generation: u64,
        key: ItemKey,
        outcome: CropOutcome,
    },
    LibraryFinished {
        generation: u64,
        outcome: LibraryOutcome,
    },
}

/// Side effects produced by a state transition
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    View(ViewUpdate),
    Camera(CameraRequest),
    SetOutputNeeded(bool),
    OpenCrop {
        generation: u64,
        item: MediaItem,
        canvas: CanvasSize,
    },
    OpenLibrary {
        generation: u64,
        preselected: Vec<MediaItem>,
        max_count: Option<usize>,
    },
    Emit(PickerEvent),
}

/// Messages from the handle to the presenter task
#[derive(Debug)]
pub(crate) enum Command {
    Intent(UserIntent),
    AddItems {
        items: Vec<MediaItem>,
        reply: oneshot::Sender<Result<Vec<ItemKey>>>,
    },
    RemoveItem {
        key: ItemKey,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot(oneshot::Sender<PresenterSnapshot>),
    Finish(oneshot::Sender<Vec<MediaItem>>),
    Cancel(oneshot::Sender<()>),
}
