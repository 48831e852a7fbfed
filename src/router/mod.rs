mod interface;
mod mock;

pub use interface::{CanvasSize, CropOutcome, LibraryOutcome, Router};
pub use mock::{CropScript, LibraryRequest, LibraryScript, MockRouter};
