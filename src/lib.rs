pub mod assembly;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod item;
pub mod library;
pub mod orientation;
pub mod presenter;
pub mod router;
pub mod view;

#[cfg(feature = "keyboard")]
pub mod keyboard_input;

pub use assembly::{PickerAssembly, PickerModule};
pub use camera::{CameraCapabilities, CameraController, CameraPosition, MockCameraController, OutputParameters};
pub use config::{DeviceConfig, PickerConfig, PickerSection, RuntimeConfig};
pub use error::{ErrorKind, EventBusError, PickerError, Result};
pub use events::{EventBus, EventFilter, EventReceiver, PickerEvent};
pub use item::{
    CropRect, ExifOrientation, ImageSource, InsertPosition, ItemCollection, ItemKey, ItemOrigin,
    MediaItem, Removal,
};
pub use library::{LatestPhotoProvider, MockPhotoLibrary};
pub use orientation::{
    DeviceIdiom, DeviceOrientation, OrientationSubscription, OrientationTracker, OverlayTransform,
};
pub use presenter::{
    AccessState, CameraUiState, CaptureMode, ModuleSeed, PickerHandle, PresenterSnapshot,
    UserIntent,
};
pub use router::{CanvasSize, CropOutcome, CropScript, LibraryOutcome, LibraryScript, MockRouter, Router};
pub use view::{LoggingView, RecordingView, ViewMode, ViewSurface, ViewUpdate};
