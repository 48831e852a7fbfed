use super::lanes::CameraLanes;
use super::state::PresenterState;
use super::types::{Command, Completion, Effect};
use crate::camera::CameraController;
use crate::events::EventBus;
use crate::item::MediaItem;
use crate::library::LatestPhotoProvider;
use crate::router::{CanvasSize, Router};
use crate::view::ViewSurface;
use futures::StreamExt;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Whether the presenter keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Actor task that owns the presenter state.
///
/// Host commands, camera and router completions and orientation changes are
/// processed one at a time, so no transition is ever interleaved with another.
pub(crate) struct PresenterRuntime {
    state: PresenterState,
    camera: Arc<dyn CameraController>,
    router: Arc<dyn Router>,
    library: Arc<dyn LatestPhotoProvider>,
    view: Arc<dyn ViewSurface>,
    events: EventBus,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    items_mirror: Arc<RwLock<Vec<MediaItem>>>,
    cancel: CancellationToken,
}

impl PresenterRuntime {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: PresenterState,
        camera: Arc<dyn CameraController>,
        router: Arc<dyn Router>,
        library: Arc<dyn LatestPhotoProvider>,
        view: Arc<dyn ViewSurface>,
        events: EventBus,
        commands: mpsc::Receiver<Command>,
        items_mirror: Arc<RwLock<Vec<MediaItem>>>,
        cancel: CancellationToken,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state,
            camera,
            router,
            library,
            view,
            events,
            commands,
            completions_tx,
            completions_rx,
            items_mirror,
            cancel,
        }
    }

    pub async fn run(mut self) {
        let lanes = CameraLanes::spawn(
            Arc::clone(&self.camera),
            self.completions_tx.clone(),
            self.cancel.clone(),
        );

        let subscription = self.camera.observe_orientation();
        let initial_orientation = subscription.current();
        let mut orientation = Box::pin(subscription.into_stream());
        let mut latest_photo = self.library.observe_latest_photo();

        info!("Media picker presenter started in {}", self.state.mode());
        let effects = self.state.start(initial_orientation);
        self.apply(effects, &lanes).await;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Presenter cancelled");
                    break;
                }

                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("All picker handles dropped");
                        break;
                    };
                    if self.handle_command(command, &lanes).await == Flow::Stop {
                        break;
                    }
                }

                Some(completion) = self.completions_rx.recv() => {
                    trace!("Completion: {:?}", completion);
                    let effects = self.state.on_completion(completion);
                    self.apply(effects, &lanes).await;
                }

                Some(device_orientation) = orientation.next() => {
                    let effects = self.state.on_orientation(device_orientation);
                    self.apply(effects, &lanes).await;
                }

                Some(image) = latest_photo.next() => {
                    let effects = self.state.on_latest_library_photo(image);
                    self.apply(effects, &lanes).await;
                }
            }
        }

        // Dropping the streams releases both subscriptions
        drop(orientation);
        drop(latest_photo);
        self.cancel.cancel();
        self.camera.set_output_needed(false);
        lanes.join().await;
        info!("Media picker presenter stopped");
    }

    async fn handle_command(&mut self, command: Command, lanes: &CameraLanes) -> Flow {
        match command {
            Command::Intent(intent) => {
                let effects = self.state.on_intent(intent);
                self.apply(effects, lanes).await;
            }
            Command::AddItems { items, reply } => {
                let (result, effects) = self.state.add_items(items);
                self.apply(effects, lanes).await;
                let _ = reply.send(result);
            }
            Command::RemoveItem { key, reply } => {
                let (result, effects) = self.state.remove_item(key);
                self.apply(effects, lanes).await;
                let _ = reply.send(result);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot());
            }
            Command::Finish(reply) => {
                let (items, effects) = self.state.finish();
                self.apply(effects, lanes).await;
                let _ = reply.send(items);
                return Flow::Stop;
            }
            Command::Cancel(reply) => {
                let effects = self.state.cancel();
                self.apply(effects, lanes).await;
                let _ = reply.send(());
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    async fn apply(&mut self, effects: Vec<Effect>, lanes: &CameraLanes) {
        *self.items_mirror.write() = self.state.items().to_vec();

        for effect in effects {
            match effect {
                Effect::View(update) => self.view.apply(update),
                Effect::Camera(request) => lanes.submit(request),
                Effect::SetOutputNeeded(needed) => self.camera.set_output_needed(needed),
                Effect::OpenCrop {
                    generation,
                    item,
                    canvas,
                } => self.spawn_crop(generation, item, canvas),
                Effect::OpenLibrary {
                    generation,
                    preselected,
                    max_count,
                } => self.spawn_library(generation, preselected, max_count),
                Effect::Emit(event) => {
                    if let Err(e) = self.events.publish(event).await {
                        trace!("Event not delivered: {}", e);
                    }
                }
            }
        }
    }

    fn spawn_crop(&self, generation: u64, item: MediaItem, canvas: CanvasSize) {
        let router = Arc::clone(&self.router);
        let completions = self.completions_tx.clone();
        let cancel = self.cancel.clone();
        let key = item.key();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Crop for {} abandoned", key);
                }
                outcome = router.open_crop(item, canvas) => {
                    let _ = completions.send(Completion::CropFinished {
                        generation,
                        key,
                        outcome,
                    });
                }
            }
        });
    }

    fn spawn_library(
        &self,
        generation: u64,
        preselected: Vec<MediaItem>,
        max_count: Option<usize>,
    ) {
        let router = Arc::clone(&self.router);
        let completions = self.completions_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Library pick abandoned");
                }
                outcome = router.open_library(preselected, max_count) => {
                    let _ = completions.send(Completion::LibraryFinished {
                        generation,
                        outcome,
                    });
                }
            }
        });
    }
}
