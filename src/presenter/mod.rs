mod handle;
mod lanes;
mod runtime;
mod state;
mod types;

pub use handle::PickerHandle;
pub use types::{
    AccessState, CameraUiState, CaptureMode, ModuleSeed, PresenterSnapshot, UserIntent,
};

pub(crate) use runtime::PresenterRuntime;
pub(crate) use state::PresenterState;
