use super::types::{
    AccessState, CameraRequest, CameraUiState, CaptureMode, Completion, Effect, ModuleSeed,
    PresenterSnapshot, UserIntent,
};
use crate::camera::OutputParameters;
use crate::config::PickerConfig;
use crate::error::{PickerError, Result};
use crate::events::PickerEvent;
use crate::item::{ImageSource, InsertPosition, ItemCollection, ItemKey, ItemOrigin, MediaItem};
use crate::orientation::{DeviceIdiom, DeviceOrientation, OverlayTransform};
use crate::router::{CanvasSize, CropOutcome, LibraryOutcome};
use crate::view::{ViewMode, ViewUpdate};
use std::collections::HashSet;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCrop {
    generation: u64,
    key: ItemKey,
}

/// Control states derived from the rest of the presenter state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DerivedUi {
    output_needed: bool,
    shutter_enabled: bool,
    library_enabled: bool,
    crop_visible: bool,
    toggle_visible: bool,
    flash_visible: bool,
    flash_on: bool,
    controls_enabled: bool,
    access_denied_visible: bool,
    camera_button_visible: bool,
}

/// Presenter state machine.
///
/// Every transition is synchronous and returns the effects the runtime has to
/// carry out. Completions for camera and router requests come back through
/// [`PresenterState::on_completion`].
pub(crate) struct PresenterState {
    mode: CaptureMode,
    items: ItemCollection,
    camera: CameraUiState,
    device_orientation: DeviceOrientation,
    idiom: DeviceIdiom,
    crop_enabled: bool,
    selfie_enabled: bool,
    crop_canvas: CanvasSize,
    pending_crop: Option<PendingCrop>,
    pending_library: Option<u64>,
    next_generation: u64,
    latest_library_image: Option<ImageSource>,
    pushed_ui: Option<DerivedUi>,
    pushed_title: Option<Option<String>>,
    pushed_latest_image: bool,
    pushed_overlay: Option<(DeviceOrientation, OverlayTransform)>,
}

impl PresenterState {
    pub fn new(config: &PickerConfig, seed: ModuleSeed) -> Result<Self> {
        let mut items = ItemCollection::with_items(seed.items, config.picker.max_items_count)?;

        let mode = match seed.selected {
            Some(key) if items.contains(key) => {
                items.select(key)?;
                CaptureMode::Previewing(key)
            }
            Some(key) => {
                warn!("Seeded selection {} is not among the seeded items", key);
                CaptureMode::Capturing
            }
            None => CaptureMode::Capturing,
        };

        Ok(Self {
            mode,
            items,
            camera: CameraUiState::default(),
            device_orientation: DeviceOrientation::default(),
            idiom: config.device.idiom,
            crop_enabled: config.picker.crop_enabled,
            selfie_enabled: config.picker.selfie_enabled,
            crop_canvas: config.crop_canvas(),
            pending_crop: None,
            pending_library: None,
            next_generation: 0,
            latest_library_image: None,
            pushed_ui: None,
            pushed_title: None,
            pushed_latest_image: false,
            pushed_overlay: None,
        })
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    pub fn camera(&self) -> &CameraUiState {
        &self.camera
    }

    /// Initial view content and the first round of camera queries
    pub fn start(&mut self, orientation: DeviceOrientation) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.device_orientation = orientation;

        if !self.items.is_empty() {
            effects.push(Effect::View(ViewUpdate::AddItems(self.items.to_vec())));
        }
        self.push_mode(&mut effects);

        effects.push(Effect::Camera(CameraRequest::OutputParameters));
        effects.push(Effect::Camera(CameraRequest::Capabilities));

        self.push_overlay(&mut effects, true);
        self.reconcile(&mut effects);
        effects
    }

    pub fn on_intent(&mut self, intent: UserIntent) -> Vec<Effect> {
        let mut effects = Vec::new();
        trace!("Intent: {:?} in {}", intent, self.mode);

        match intent {
            UserIntent::ShutterTapped => self.shutter(&mut effects),
            UserIntent::ThumbnailTapped(key) | UserIntent::SwipedToItem(key) => {
                if self.items.contains(key) {
                    self.set_mode(CaptureMode::Previewing(key), &mut effects);
                } else {
                    debug!("Ignoring selection of unknown item {}", key);
                }
            }
            UserIntent::CameraThumbnailTapped => {
                self.set_mode(CaptureMode::Capturing, &mut effects);
            }
            UserIntent::SwipedToCamera => {
                if !self.mode.is_capturing() {
                    self.set_mode(CaptureMode::Capturing, &mut effects);
                }
            }
            UserIntent::RemoveTapped => {
                if let Some(key) = self.mode.previewed() {
                    if let Err(e) = self.remove(key, &mut effects) {
                        warn!("Remove of previewed item failed: {}", e);
                    }
                }
            }
            UserIntent::CropTapped => self.open_crop(&mut effects),
            UserIntent::LibraryTapped => self.open_library(&mut effects),
            UserIntent::CameraToggleTapped => {
                if self.selfie_enabled {
                    effects.push(Effect::Camera(CameraRequest::Toggle));
                } else {
                    debug!("Camera toggle ignored: selfie disabled");
                }
            }
            UserIntent::FlashToggled(enabled) => {
                effects.push(Effect::Camera(CameraRequest::SetFlash(enabled)));
            }
            UserIntent::ItemDragged { from, to } => match self.items.move_item(from, to) {
                Ok(()) if from != to => {
                    effects.push(Effect::View(ViewUpdate::MoveItem { from, to }));
                    effects.push(Effect::Emit(PickerEvent::ItemMoved { from, to }));
                }
                Ok(()) => {}
                Err(e) => warn!("Drag rejected: {}", e),
            },
            UserIntent::AccessSettingsTapped => {
                if !self.camera.access.is_granted() {
                    effects.push(Effect::Camera(CameraRequest::OutputParameters));
                }
            }
        }

        self.reconcile(&mut effects);
        effects
    }

    pub fn on_completion(&mut self, completion: Completion) -> Vec<Effect> {
        let mut effects = Vec::new();

        match completion {
            Completion::OutputParameters(parameters) => {
                self.output_parameters_resolved(parameters, &mut effects)
            }
            Completion::Capabilities(capabilities) => {
                self.camera.apply_capabilities(capabilities);
            }
            Completion::FlashSet {
                requested,
                available,
                success,
            } => {
                self.camera.flash_available = available;
                if success {
                    self.camera.flash_enabled = requested;
                } else {
                    debug!("Flash change to {} did not take effect", requested);
                    // The button may have flipped locally; restore it
                    effects.push(Effect::View(ViewUpdate::SetFlashButtonOn(
                        self.camera.flash_enabled,
                    )));
                    effects.push(Effect::Emit(PickerEvent::CameraOperationFailed {
                        operation: "set_flash_enabled".to_string(),
                    }));
                }
            }
            Completion::Toggled {
                orientation,
                capabilities,
            } => {
                self.camera.apply_capabilities(capabilities);
                match orientation {
                    Some(orientation) => {
                        self.camera.output_orientation = Some(orientation);
                        effects.push(Effect::View(ViewUpdate::SetCameraOutputOrientation(
                            orientation,
                        )));
                        self.push_overlay(&mut effects, true);
                    }
                    None => {
                        effects.push(Effect::Emit(PickerEvent::CameraOperationFailed {
                            operation: "toggle_camera".to_string(),
                        }));
                        // Access may have been revoked under us
                        effects.push(Effect::Camera(CameraRequest::OutputParameters));
                    }
                }
            }
            Completion::Captured(Some(item)) => self.captured(item, &mut effects),
            Completion::Captured(None) => {
                warn!("Photo capture failed");
                effects.push(Effect::Emit(PickerEvent::CameraOperationFailed {
                    operation: "capture_photo".to_string(),
                }));
                // Access may have been revoked under us
                effects.push(Effect::Camera(CameraRequest::OutputParameters));
            }
            Completion::CropFinished {
                generation,
                key,
                outcome,
            } => self.crop_finished(generation, key, outcome, &mut effects),
            Completion::LibraryFinished {
                generation,
                outcome,
            } => self.library_finished(generation, outcome, &mut effects),
        }

        self.reconcile(&mut effects);
        effects
    }

    pub fn on_orientation(&mut self, orientation: DeviceOrientation) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.device_orientation = orientation;
        self.push_overlay(&mut effects, false);
        effects
    }

    /// Newest library photo changed; only the library button thumbnail follows
    pub fn on_latest_library_photo(&mut self, image: Option<ImageSource>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.pushed_latest_image && self.latest_library_image == image {
            return effects;
        }
        trace!("Latest library photo: {:?}", image);
        self.latest_library_image = image.clone();
        self.pushed_latest_image = true;
        effects.push(Effect::View(ViewUpdate::SetLatestLibraryImage(image)));
        effects
    }

    /// Host-initiated add; items go to the end and the mode is kept
    pub fn add_items(&mut self, items: Vec<MediaItem>) -> (Result<Vec<ItemKey>>, Vec<Effect>) {
        let mut effects = Vec::new();
        let added = items.clone();

        let result = match self.items.add(items, InsertPosition::End) {
            Ok(keys) => {
                effects.push(Effect::View(ViewUpdate::AddItems(added)));
                effects.push(Effect::Emit(PickerEvent::ItemsAdded { keys: keys.clone() }));
                Ok(keys)
            }
            Err(e) => {
                if let PickerError::Capacity {
                    limit, requested, ..
                } = &e
                {
                    effects.push(Effect::Emit(PickerEvent::CapacityExceeded {
                        limit: *limit,
                        rejected: *requested,
                    }));
                }
                Err(e)
            }
        };

        self.reconcile(&mut effects);
        (result, effects)
    }

    /// Host-initiated remove
    pub fn remove_item(&mut self, key: ItemKey) -> (Result<()>, Vec<Effect>) {
        let mut effects = Vec::new();
        let result = self.remove(key, &mut effects);
        self.reconcile(&mut effects);
        (result, effects)
    }

    pub fn finish(&mut self) -> (Vec<MediaItem>, Vec<Effect>) {
        let items = self.items.to_vec();
        info!("Finishing with {} item(s)", items.len());
        let effects = vec![Effect::Emit(PickerEvent::Finished {
            items: items.clone(),
        })];
        self.pending_crop = None;
        self.pending_library = None;
        (items, effects)
    }

    pub fn cancel(&mut self) -> Vec<Effect> {
        info!("Media picker cancelled");
        self.pending_crop = None;
        self.pending_library = None;
        vec![Effect::Emit(PickerEvent::Cancelled)]
    }

    pub fn snapshot(&self) -> PresenterSnapshot {
        let overlay_orientation = self.overlay_orientation();
        PresenterSnapshot {
            mode: self.mode,
            items: self.items.to_vec(),
            selected: self.items.selected_key(),
            camera: self.camera,
            device_orientation: self.device_orientation,
            overlay_orientation,
            overlay: OverlayTransform::for_orientation(overlay_orientation),
            photo_title: self.photo_title(),
            latest_library_image: self.latest_library_image.clone(),
            crop_pending: self.pending_crop.is_some(),
            library_pending: self.pending_library.is_some(),
        }
    }

    fn shutter(&mut self, effects: &mut Vec<Effect>) {
        if !self.camera.access.is_granted() {
            debug!("Shutter tapped without camera access; re-checking");
            effects.push(Effect::Camera(CameraRequest::OutputParameters));
            return;
        }
        if !self.mode.is_capturing() {
            debug!("Shutter ignored while {}", self.mode);
            return;
        }
        if self.items.is_full() {
            debug!("Shutter ignored: collection is full");
            return;
        }

        effects.push(Effect::View(ViewUpdate::AnimateFlash));
        effects.push(Effect::Camera(CameraRequest::Capture));
    }

    fn captured(&mut self, item: MediaItem, effects: &mut Vec<Effect>) {
        let key = item.key();
        match self.items.add(vec![item.clone()], InsertPosition::End) {
            Ok(keys) => {
                effects.push(Effect::View(ViewUpdate::AddItems(vec![item])));
                effects.push(Effect::Emit(PickerEvent::ItemsAdded { keys }));
                self.set_mode(CaptureMode::Previewing(key), effects);
            }
            Err(PickerError::Capacity { limit, .. }) => {
                warn!("Captured photo dropped: collection is full");
                effects.push(Effect::Emit(PickerEvent::CapacityExceeded { limit, rejected: 1 }));
            }
            Err(e) => warn!("Captured photo could not be added: {}", e),
        }
    }

    fn remove(&mut self, key: ItemKey, effects: &mut Vec<Effect>) -> Result<()> {
        let removal = self.items.remove(key)?;
        effects.push(Effect::View(ViewUpdate::RemoveItem(key)));
        effects.push(Effect::Emit(PickerEvent::ItemRemoved { key }));

        if self.mode == CaptureMode::Previewing(key) {
            let next = match self.items.neighbor_after_removal(removal.index) {
                Some(neighbor) => CaptureMode::Previewing(neighbor),
                None => CaptureMode::Capturing,
            };
            self.set_mode(next, effects);
        }
        Ok(())
    }

    fn open_crop(&mut self, effects: &mut Vec<Effect>) {
        if !self.crop_enabled {
            debug!("Crop ignored: disabled");
            return;
        }
        let Some(key) = self.mode.previewed() else {
            debug!("Crop ignored while capturing");
            return;
        };
        let Some(item) = self.items.get(key).cloned() else {
            return;
        };

        let generation = self.next_generation();
        self.pending_crop = Some(PendingCrop { generation, key });
        debug!("Opening crop for {} (generation {})", key, generation);
        effects.push(Effect::OpenCrop {
            generation,
            item,
            canvas: self.crop_canvas,
        });
    }

    fn crop_finished(
        &mut self,
        generation: u64,
        key: ItemKey,
        outcome: CropOutcome,
        effects: &mut Vec<Effect>,
    ) {
        if self.pending_crop != Some(PendingCrop { generation, key }) {
            self.discard_stale("crop", Some(key), effects);
            return;
        }
        self.pending_crop = None;

        let edited = match outcome {
            CropOutcome::Cancelled => {
                debug!("Crop of {} cancelled", key);
                return;
            }
            CropOutcome::Cropped(edited) => edited,
        };

        let updated = self.items.update(key, |item| item.apply_edits(&edited)).cloned();
        let updated = match updated {
            Ok(updated) => updated,
            Err(_) => {
                self.discard_stale("crop", Some(key), effects);
                return;
            }
        };

        effects.push(Effect::View(ViewUpdate::UpdateItem(updated.clone())));
        effects.push(Effect::Emit(PickerEvent::ItemUpdated { key }));
        if self.mode == CaptureMode::Previewing(key) {
            effects.push(Effect::View(ViewUpdate::SetMode(ViewMode::PhotoPreview(
                updated,
            ))));
        }
    }

    fn open_library(&mut self, effects: &mut Vec<Effect>) {
        if self.items.is_full() {
            debug!("Library ignored: collection is full");
            return;
        }

        let generation = self.next_generation();
        self.pending_library = Some(generation);

        // The library limit covers the whole selection, preselected included
        let preselected: Vec<MediaItem> = self
            .items
            .iter()
            .filter(|item| item.origin == ItemOrigin::FromLibrary)
            .cloned()
            .collect();
        let max_count = self
            .items
            .remaining_capacity()
            .map(|remaining| remaining + preselected.len());
        debug!(
            "Opening photo library (generation {}, {} preselected, max {:?})",
            generation,
            preselected.len(),
            max_count
        );
        effects.push(Effect::OpenLibrary {
            generation,
            preselected,
            max_count,
        });
    }

    fn library_finished(
        &mut self,
        generation: u64,
        outcome: LibraryOutcome,
        effects: &mut Vec<Effect>,
    ) {
        if self.pending_library != Some(generation) {
            self.discard_stale("library", None, effects);
            return;
        }
        self.pending_library = None;

        let picked = match outcome {
            LibraryOutcome::Cancelled => {
                debug!("Library pick cancelled");
                return;
            }
            LibraryOutcome::Picked(picked) => picked,
        };

        let mut seen: HashSet<ItemKey> = self.items.keys().into_iter().collect();
        let mut fresh: Vec<MediaItem> = picked
            .into_iter()
            .filter(|item| seen.insert(item.key()))
            .collect();

        if let (Some(limit), Some(remaining)) =
            (self.items.max_items(), self.items.remaining_capacity())
        {
            if fresh.len() > remaining {
                let rejected = fresh.len() - remaining;
                warn!("Ignoring {} picked item(s) over the limit of {}", rejected, limit);
                fresh.truncate(remaining);
                effects.push(Effect::Emit(PickerEvent::CapacityExceeded { limit, rejected }));
            }
        }

        let Some(first) = fresh.first().map(MediaItem::key) else {
            return;
        };

        match self.items.add(fresh.clone(), InsertPosition::End) {
            Ok(keys) => {
                effects.push(Effect::View(ViewUpdate::AddItems(fresh)));
                effects.push(Effect::Emit(PickerEvent::ItemsAdded { keys }));
                self.set_mode(CaptureMode::Previewing(first), effects);
            }
            Err(e) => warn!("Picked items could not be added: {}", e),
        }
    }

    fn output_parameters_resolved(
        &mut self,
        parameters: Option<OutputParameters>,
        effects: &mut Vec<Effect>,
    ) {
        let was_granted = self.camera.access.is_granted();
        match parameters {
            Some(parameters) => {
                self.camera.access = AccessState::Granted(parameters);
                self.camera.output_orientation = Some(parameters.orientation);
                effects.push(Effect::View(ViewUpdate::SetCameraOutputParameters(parameters)));
                if !was_granted {
                    info!("Camera access granted");
                    effects.push(Effect::Emit(PickerEvent::CameraAccessChanged { granted: true }));
                    effects.push(Effect::Camera(CameraRequest::Capabilities));
                }
            }
            None => {
                let was_denied = self.camera.access == AccessState::Denied;
                self.camera.access = AccessState::Denied;
                if !was_denied {
                    effects.push(Effect::Emit(PickerEvent::CameraAccessChanged {
                        granted: false,
                    }));
                }
            }
        }
    }

    fn set_mode(&mut self, mode: CaptureMode, effects: &mut Vec<Effect>) {
        if self.mode == mode {
            return;
        }
        debug!("Mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.push_mode(effects);
        effects.push(Effect::Emit(PickerEvent::ModeChanged { mode }));

        if mode.is_capturing() && self.camera.access == AccessState::Denied {
            effects.push(Effect::Camera(CameraRequest::OutputParameters));
        }
        self.push_overlay(effects, false);
    }

    /// Push the current mode and mirror it into the selection
    fn push_mode(&mut self, effects: &mut Vec<Effect>) {
        match self.mode {
            CaptureMode::Capturing => {
                self.items.clear_selection();
                effects.push(Effect::View(ViewUpdate::SetMode(ViewMode::Camera)));
                effects.push(Effect::View(ViewUpdate::SelectCamera));
            }
            CaptureMode::Previewing(key) => {
                let Some(item) = self.items.get(key).cloned() else {
                    // reconcile falls back to capturing
                    return;
                };
                if self.items.select(key).is_ok() {
                    effects.push(Effect::View(ViewUpdate::SetMode(ViewMode::PhotoPreview(item))));
                    effects.push(Effect::View(ViewUpdate::SelectItem(key)));
                }
            }
        }
    }

    fn overlay_orientation(&self) -> DeviceOrientation {
        if self.idiom == DeviceIdiom::Handset && !self.mode.is_capturing() {
            DeviceOrientation::Portrait
        } else {
            self.device_orientation
        }
    }

    fn push_overlay(&mut self, effects: &mut Vec<Effect>, force: bool) {
        let orientation = self.overlay_orientation();
        let transform = OverlayTransform::for_orientation(orientation);
        if !force && self.pushed_overlay == Some((orientation, transform)) {
            return;
        }
        self.pushed_overlay = Some((orientation, transform));
        effects.push(Effect::View(ViewUpdate::AdjustForDeviceOrientation {
            orientation,
            transform,
        }));
    }

    fn discard_stale(&self, operation: &str, key: Option<ItemKey>, effects: &mut Vec<Effect>) {
        debug!("Discarding stale {} result for {:?}", operation, key);
        effects.push(Effect::Emit(PickerEvent::StaleResultDiscarded {
            operation: operation.to_string(),
            key,
        }));
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Title of the previewed photo, by its position in the ribbon
    fn photo_title(&self) -> Option<String> {
        let key = self.mode.previewed()?;
        let index = self.items.index_of(key)?;
        Some(format!("Photo {}", index + 1))
    }

    fn derived_ui(&self) -> DerivedUi {
        let granted = self.camera.access.is_granted();
        DerivedUi {
            output_needed: self.mode.is_capturing(),
            shutter_enabled: granted && !self.items.is_full(),
            library_enabled: !self.items.is_full(),
            crop_visible: self.crop_enabled && !self.mode.is_capturing(),
            toggle_visible: self.selfie_enabled && granted && self.camera.can_toggle,
            flash_visible: granted && self.camera.flash_available,
            flash_on: self.camera.flash_enabled,
            controls_enabled: granted,
            access_denied_visible: self.camera.access == AccessState::Denied,
            camera_button_visible: !self.items.is_full(),
        }
    }

    /// Restore invariants after a transition and push derived control state
    fn reconcile(&mut self, effects: &mut Vec<Effect>) {
        if self.items.prune_selection() {
            debug!("Cleared selection of a removed item");
        }
        if let Some(key) = self.mode.previewed() {
            if !self.items.contains(key) {
                self.set_mode(CaptureMode::Capturing, effects);
            }
        }

        let ui = self.derived_ui();
        let previous = self.pushed_ui;
        let changed = |field: fn(&DerivedUi) -> bool| match previous {
            Some(previous) => field(&previous) != field(&ui),
            None => true,
        };

        if changed(|ui| ui.output_needed) {
            effects.push(Effect::SetOutputNeeded(ui.output_needed));
        }
        if changed(|ui| ui.shutter_enabled) {
            effects.push(Effect::View(ViewUpdate::SetShutterButtonEnabled(
                ui.shutter_enabled,
            )));
        }
        if changed(|ui| ui.library_enabled) {
            effects.push(Effect::View(ViewUpdate::SetPhotoLibraryButtonEnabled(
                ui.library_enabled,
            )));
        }
        if changed(|ui| ui.crop_visible) {
            effects.push(Effect::View(ViewUpdate::SetCropButtonVisible(ui.crop_visible)));
        }
        if changed(|ui| ui.toggle_visible) {
            effects.push(Effect::View(ViewUpdate::SetCameraToggleButtonVisible(
                ui.toggle_visible,
            )));
        }
        if changed(|ui| ui.flash_visible) {
            effects.push(Effect::View(ViewUpdate::SetFlashButtonVisible(ui.flash_visible)));
        }
        if changed(|ui| ui.flash_on) {
            effects.push(Effect::View(ViewUpdate::SetFlashButtonOn(ui.flash_on)));
        }
        if changed(|ui| ui.controls_enabled) {
            effects.push(Effect::View(ViewUpdate::SetCameraControlsEnabled(
                ui.controls_enabled,
            )));
        }
        if changed(|ui| ui.access_denied_visible) {
            effects.push(Effect::View(ViewUpdate::SetAccessDeniedViewVisible(
                ui.access_denied_visible,
            )));
        }

        if changed(|ui| ui.camera_button_visible) {
            effects.push(Effect::View(ViewUpdate::SetCameraButtonVisible(
                ui.camera_button_visible,
            )));
        }
        self.pushed_ui = Some(ui);

        let title = self.photo_title();
        if self.pushed_title.as_ref() != Some(&title) {
            effects.push(Effect::View(ViewUpdate::SetPhotoTitle(title.clone())));
            self.pushed_title = Some(title);
        }
    }
}
