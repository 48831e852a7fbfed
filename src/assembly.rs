use crate::camera::CameraController;
use crate::config::PickerConfig;
use crate::error::{PickerError, Result};
use crate::events::EventBus;
use crate::library::LatestPhotoProvider;
use crate::presenter::{ModuleSeed, PickerHandle, PresenterRuntime, PresenterState};
use crate::router::Router;
use crate::view::ViewSurface;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A running media picker: the host handle plus the presenter task
pub struct PickerModule {
    handle: PickerHandle,
    task: JoinHandle<()>,
}

impl PickerModule {
    pub fn handle(&self) -> &PickerHandle {
        &self.handle
    }

    /// Wait for the presenter to stop on its own (finish, cancel or teardown)
    pub async fn join(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| PickerError::component("presenter".to_string(), e.to_string()))
    }

    /// Tear the module down and wait until its tasks have stopped
    pub async fn shutdown(self) -> Result<()> {
        self.handle.teardown();
        self.join().await
    }
}

/// Builds media picker modules
pub struct PickerAssembly;

impl PickerAssembly {
    /// Wire a presenter to its collaborators and start it.
    ///
    /// `configure` runs once with the handle before the presenter processes
    /// anything, so the host can subscribe to events without missing any.
    /// Must be called from within a tokio runtime.
    pub fn module<F>(
        config: PickerConfig,
        seed: ModuleSeed,
        camera: Arc<dyn CameraController>,
        router: Arc<dyn Router>,
        library: Arc<dyn LatestPhotoProvider>,
        view: Arc<dyn ViewSurface>,
        configure: F,
    ) -> Result<PickerModule>
    where
        F: FnOnce(&PickerHandle),
    {
        config.validate()?;
        let state = PresenterState::new(&config, seed)?;

        let events = if config.runtime.debug_events {
            EventBus::with_debug_logging(config.runtime.event_bus_capacity)
        } else {
            EventBus::new(config.runtime.event_bus_capacity)
        };
        let (commands_tx, commands_rx) = mpsc::channel(config.runtime.command_queue_capacity);
        let items = Arc::new(RwLock::new(state.items().to_vec()));
        let cancel = CancellationToken::new();

        let handle = PickerHandle::new(
            commands_tx,
            Arc::clone(&items),
            events.clone(),
            cancel.clone(),
        );
        configure(&handle);

        let runtime = PresenterRuntime::new(
            state,
            camera,
            router,
            library,
            view,
            events,
            commands_rx,
            items,
            cancel,
        );
        let task = tokio::spawn(runtime.run());

        info!(
            "Media picker module assembled (max items: {:?}, crop: {}, selfie: {})",
            config.picker.max_items_count, config.picker.crop_enabled, config.picker.selfie_enabled
        );

        Ok(PickerModule { handle, task })
    }
}
