mod recording;
mod types;

pub use recording::{LoggingView, RecordingView};
pub use types::{ViewMode, ViewSurface, ViewUpdate};
