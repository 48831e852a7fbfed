use super::types::{Command, PresenterSnapshot, UserIntent};
use crate::error::{PickerError, Result};
use crate::events::{EventBus, EventFilter, EventReceiver, PickerEvent};
use crate::item::{ItemKey, MediaItem};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Host-side handle on a running media picker.
///
/// Cloning is cheap; every clone talks to the same presenter task. Once the
/// module has finished, been cancelled or torn down, calls fail with
/// [`PickerError::ModuleClosed`].
#[derive(Clone)]
pub struct PickerHandle {
    commands: mpsc::Sender<Command>,
    items: Arc<RwLock<Vec<MediaItem>>>,
    events: EventBus,
    cancel: CancellationToken,
}

impl PickerHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        items: Arc<RwLock<Vec<MediaItem>>>,
        events: EventBus,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            commands,
            items,
            events,
            cancel,
        }
    }

    /// Forward a view gesture to the presenter
    pub async fn send_intent(&self, intent: UserIntent) -> Result<()> {
        self.send(Command::Intent(intent)).await
    }

    /// Items as of the last processed event
    pub fn items(&self) -> Vec<MediaItem> {
        self.items.read().clone()
    }

    pub async fn snapshot(&self) -> Result<PresenterSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        response.await.map_err(|_| PickerError::ModuleClosed)
    }

    /// Append items; the whole batch is rejected if it would exceed the limit
    pub async fn add_items(&self, items: Vec<MediaItem>) -> Result<Vec<ItemKey>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::AddItems { items, reply }).await?;
        response.await.map_err(|_| PickerError::ModuleClosed)?
    }

    pub async fn remove_item(&self, key: ItemKey) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::RemoveItem { key, reply }).await?;
        response.await.map_err(|_| PickerError::ModuleClosed)?
    }

    /// Open the crop sub-flow for the previewed item
    pub async fn crop_selected(&self) -> Result<()> {
        self.send_intent(UserIntent::CropTapped).await
    }

    /// Close the module and return the final ordered items
    pub async fn finish(&self) -> Result<Vec<MediaItem>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Finish(reply)).await?;
        response.await.map_err(|_| PickerError::ModuleClosed)
    }

    /// Dismiss the module without a result
    pub async fn cancel(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Cancel(reply)).await?;
        response.await.map_err(|_| PickerError::ModuleClosed)
    }

    /// Stop the presenter immediately; in-flight results are dropped
    pub fn teardown(&self) {
        debug!("Media picker teardown requested");
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.commands.is_closed()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PickerEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_filtered(&self, filter: EventFilter, name: &str) -> EventReceiver {
        EventReceiver::new(self.events.subscribe(), filter, name.to_string())
    }

    async fn send(&self, command: Command) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PickerError::ModuleClosed);
        }
        self.commands
            .send(command)
            .await
            .map_err(|_| PickerError::ModuleClosed)
    }
}
