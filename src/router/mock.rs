use super::interface::{CanvasSize, CropOutcome, LibraryOutcome, Router};
use crate::item::{CropRect, ImageSource, MediaItem};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::debug;

/// Scripted answer for the next crop sub-flow
#[derive(Debug, Clone)]
pub enum CropScript {
    Apply(CropRect),
    Cancel,
}

/// Scripted answer for the next library sub-flow
#[derive(Debug, Clone)]
pub enum LibraryScript {
    /// Keep the preselection and pick this many fresh photos, the whole
    /// selection capped by the requested maximum
    Pick(usize),
    /// Return exactly these items
    Items(Vec<MediaItem>),
    Cancel,
}

/// Arguments of the last library request
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryRequest {
    pub preselected: usize,
    pub max_count: Option<usize>,
}

/// Router double that answers from scripts, optionally held behind a gate
pub struct MockRouter {
    crop_script: Mutex<VecDeque<CropScript>>,
    library_script: Mutex<VecDeque<LibraryScript>>,
    crop_gate: Mutex<Option<Arc<Notify>>>,
    library_gate: Mutex<Option<Arc<Notify>>>,
    crops_opened: AtomicU64,
    libraries_opened: AtomicU64,
    last_library_request: Mutex<Option<LibraryRequest>>,
    library_counter: AtomicU64,
}

impl MockRouter {
    pub fn new() -> Self {
        Self {
            crop_script: Mutex::new(VecDeque::new()),
            library_script: Mutex::new(VecDeque::new()),
            crop_gate: Mutex::new(None),
            library_gate: Mutex::new(None),
            crops_opened: AtomicU64::new(0),
            libraries_opened: AtomicU64::new(0),
            last_library_request: Mutex::new(None),
            library_counter: AtomicU64::new(0),
        }
    }

    pub fn script_crop(&self, script: CropScript) {
        self.crop_script.lock().push_back(script);
    }

    pub fn script_library(&self, script: LibraryScript) {
        self.library_script.lock().push_back(script);
    }

    /// Hold every crop until the returned gate is notified once per crop
    pub fn hold_crops(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.crop_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold every library pick until the returned gate is notified
    pub fn hold_library(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.library_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn crops_opened(&self) -> u64 {
        self.crops_opened.load(Ordering::SeqCst)
    }

    pub fn libraries_opened(&self) -> u64 {
        self.libraries_opened.load(Ordering::SeqCst)
    }

    pub fn last_library_request(&self) -> Option<LibraryRequest> {
        self.last_library_request.lock().clone()
    }

    fn fresh_library_items(&self, count: usize) -> Vec<MediaItem> {
        (0..count)
            .map(|_| {
                let n = self.library_counter.fetch_add(1, Ordering::SeqCst) + 1;
                MediaItem::from_library(ImageSource::new(format!("library://photo/{}", n)))
            })
            .collect()
    }

    fn selection(
        &self,
        mut preselected: Vec<MediaItem>,
        count: usize,
        max_count: Option<usize>,
    ) -> Vec<MediaItem> {
        let count = max_count.map_or(count, |max| {
            count.min(max.saturating_sub(preselected.len()))
        });
        preselected.extend(self.fresh_library_items(count));
        preselected
    }
}

impl Default for MockRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Router for MockRouter {
    async fn open_crop(&self, item: MediaItem, canvas: CanvasSize) -> CropOutcome {
        self.crops_opened.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Mock crop opened for {} on {}x{} canvas",
            item.key(),
            canvas.width,
            canvas.height
        );

        let gate = self.crop_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let script = self.crop_script.lock().pop_front();
        match script {
            Some(CropScript::Cancel) => CropOutcome::Cancelled,
            Some(CropScript::Apply(rect)) => {
                let mut cropped = item;
                cropped.crop = Some(rect);
                CropOutcome::Cropped(cropped)
            }
            None => {
                let mut cropped = item;
                cropped.crop = CropRect::new(0.1, 0.1, 0.8, 0.8);
                CropOutcome::Cropped(cropped)
            }
        }
    }

    async fn open_library(
        &self,
        preselected: Vec<MediaItem>,
        max_count: Option<usize>,
    ) -> LibraryOutcome {
        self.libraries_opened.fetch_add(1, Ordering::SeqCst);
        *self.last_library_request.lock() = Some(LibraryRequest {
            preselected: preselected.len(),
            max_count,
        });
        debug!(
            "Mock library opened ({} preselected, max {:?})",
            preselected.len(),
            max_count
        );

        let gate = self.library_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let script = self.library_script.lock().pop_front();
        match script {
            Some(LibraryScript::Cancel) => LibraryOutcome::Cancelled,
            Some(LibraryScript::Items(items)) => LibraryOutcome::Picked(items),
            Some(LibraryScript::Pick(count)) => {
                LibraryOutcome::Picked(self.selection(preselected, count, max_count))
            }
            None => LibraryOutcome::Picked(self.selection(preselected, 2, max_count)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    fn canvas() -> CanvasSize {
        CanvasSize {
            width: 1000,
            height: 1000,
        }
    }

    #[tokio::test]
    async fn test_crop_keeps_identity_and_applies_rect() {
        let router = MockRouter::new();
        let item = MediaItem::from_library(ImageSource::new("library://a"));
        let rect = CropRect::new(0.0, 0.0, 0.5, 0.5).unwrap();
        router.script_crop(CropScript::Apply(rect));

        match router.open_crop(item.clone(), canvas()).await {
            CropOutcome::Cropped(cropped) => {
                assert_eq!(cropped.key(), item.key());
                assert_eq!(cropped.crop, Some(rect));
            }
            CropOutcome::Cancelled => panic!("Expected a cropped item"),
        }
        assert_eq!(router.crops_opened(), 1);
    }

    #[tokio::test]
    async fn test_scripted_cancellations() {
        let router = MockRouter::new();
        router.script_crop(CropScript::Cancel);
        router.script_library(LibraryScript::Cancel);

        let item = MediaItem::from_library(ImageSource::new("library://a"));
        assert_eq!(router.open_crop(item, canvas()).await, CropOutcome::Cancelled);
        assert_eq!(
            router.open_library(Vec::new(), None).await,
            LibraryOutcome::Cancelled
        );
    }

    #[tokio::test]
    async fn test_library_respects_max_count() {
        let router = MockRouter::new();
        router.script_library(LibraryScript::Pick(5));

        match router.open_library(Vec::new(), Some(3)).await {
            LibraryOutcome::Picked(items) => assert_eq!(items.len(), 3),
            LibraryOutcome::Cancelled => panic!("Expected picked items"),
        }
        assert_eq!(
            router.last_library_request(),
            Some(LibraryRequest {
                preselected: 0,
                max_count: Some(3),
            })
        );
    }

    #[tokio::test]
    async fn test_library_keeps_preselection() {
        let router = MockRouter::new();
        router.script_library(LibraryScript::Pick(5));
        let preselected = vec![MediaItem::from_library(ImageSource::new("library://a"))];

        match router.open_library(preselected.clone(), Some(3)).await {
            LibraryOutcome::Picked(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], preselected[0]);
            }
            LibraryOutcome::Cancelled => panic!("Expected picked items"),
        }
        assert_eq!(router.last_library_request().unwrap().preselected, 1);
    }

    #[tokio::test]
    async fn test_gate_holds_crop_until_notified() {
        let router = Arc::new(MockRouter::new());
        let gate = router.hold_crops();
        let item = MediaItem::from_library(ImageSource::new("library://a"));

        let router_clone = Arc::clone(&router);
        let pending = tokio::spawn(async move { router_clone.open_crop(item, canvas()).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        gate.notify_one();
        let outcome = timeout(Duration::from_millis(100), pending)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome, CropOutcome::Cropped(_)));
    }
}
