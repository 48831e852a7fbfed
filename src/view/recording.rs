use super::types::{ViewSurface, ViewUpdate};
use parking_lot::Mutex;
use tracing::{debug, info};

/// View that keeps every update it receives, for tests and diagnostics
#[derive(Default)]
pub struct RecordingView {
    updates: Mutex<Vec<ViewUpdate>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates.lock().clone()
    }

    /// Updates with the given name, oldest first
    pub fn updates_named(&self, name: &str) -> Vec<ViewUpdate> {
        self.updates
            .lock()
            .iter()
            .filter(|update| update.name() == name)
            .cloned()
            .collect()
    }

    /// Most recent update with the given name
    pub fn last_named(&self, name: &str) -> Option<ViewUpdate> {
        self.updates
            .lock()
            .iter()
            .rev()
            .find(|update| update.name() == name)
            .cloned()
    }

    pub fn clear(&self) {
        self.updates.lock().clear();
    }
}

impl ViewSurface for RecordingView {
    fn apply(&self, update: ViewUpdate) {
        debug!("View update: {}", update.name());
        self.updates.lock().push(update);
    }
}

/// View that writes a one-line summary of each update to the log
#[derive(Default)]
pub struct LoggingView;

impl ViewSurface for LoggingView {
    fn apply(&self, update: ViewUpdate) {
        match &update {
            ViewUpdate::SetMode(mode) => info!("view: mode -> {:?}", mode),
            ViewUpdate::AddItems(items) => info!("view: {} item(s) added", items.len()),
            ViewUpdate::RemoveItem(key) => info!("view: item {} removed", key),
            ViewUpdate::SelectItem(key) => info!("view: item {} selected", key),
            ViewUpdate::SetPhotoTitle(Some(title)) => info!("view: title '{}'", title),
            ViewUpdate::SetAccessDeniedViewVisible(true) => {
                info!("view: camera access denied, showing settings prompt")
            }
            other => debug!("view: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_view_filters_by_name() {
        let view = RecordingView::new();
        view.apply(ViewUpdate::SetFlashButtonOn(false));
        view.apply(ViewUpdate::SelectCamera);
        view.apply(ViewUpdate::SetFlashButtonOn(true));

        assert_eq!(view.updates().len(), 3);
        assert_eq!(view.updates_named("set_flash_button_on").len(), 2);
        assert_eq!(
            view.last_named("set_flash_button_on"),
            Some(ViewUpdate::SetFlashButtonOn(true))
        );

        view.clear();
        assert!(view.updates().is_empty());
    }
}
