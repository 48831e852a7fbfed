use super::types::{CameraRequest, Completion};
use crate::camera::{CameraCapabilities, CameraController};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Camera operation kinds; requests of one kind complete in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaneKind {
    OutputParameters,
    Flash,
    Toggle,
    Capture,
}

impl LaneKind {
    pub fn for_request(request: CameraRequest) -> Self {
        match request {
            CameraRequest::OutputParameters => LaneKind::OutputParameters,
            // capability refresh reads flash state
            CameraRequest::Capabilities | CameraRequest::SetFlash(_) => LaneKind::Flash,
            CameraRequest::Toggle => LaneKind::Toggle,
            CameraRequest::Capture => LaneKind::Capture,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LaneKind::OutputParameters => "output_parameters",
            LaneKind::Flash => "flash",
            LaneKind::Toggle => "toggle",
            LaneKind::Capture => "capture",
        }
    }
}

/// One FIFO worker per camera operation kind
pub(crate) struct CameraLanes {
    output_parameters: mpsc::UnboundedSender<CameraRequest>,
    flash: mpsc::UnboundedSender<CameraRequest>,
    toggle: mpsc::UnboundedSender<CameraRequest>,
    capture: mpsc::UnboundedSender<CameraRequest>,
    handles: Vec<JoinHandle<()>>,
}

impl CameraLanes {
    pub fn spawn(
        camera: Arc<dyn CameraController>,
        completions: mpsc::UnboundedSender<Completion>,
        cancel: CancellationToken,
    ) -> Self {
        let mut handles = Vec::with_capacity(4);
        let mut lane = |kind: LaneKind| {
            let (sender, receiver) = mpsc::unbounded_channel();
            handles.push(tokio::spawn(run_lane(
                kind,
                Arc::clone(&camera),
                receiver,
                completions.clone(),
                cancel.clone(),
            )));
            sender
        };

        let output_parameters = lane(LaneKind::OutputParameters);
        let flash = lane(LaneKind::Flash);
        let toggle = lane(LaneKind::Toggle);
        let capture = lane(LaneKind::Capture);

        Self {
            output_parameters,
            flash,
            toggle,
            capture,
            handles,
        }
    }

    pub fn submit(&self, request: CameraRequest) {
        let kind = LaneKind::for_request(request);
        let sender = match kind {
            LaneKind::OutputParameters => &self.output_parameters,
            LaneKind::Flash => &self.flash,
            LaneKind::Toggle => &self.toggle,
            LaneKind::Capture => &self.capture,
        };
        if sender.send(request).is_err() {
            debug!("Camera lane '{}' is closed; dropping {:?}", kind.name(), request);
        }
    }

    /// Wait for every lane task to exit after cancellation
    pub async fn join(self) {
        let Self { handles, .. } = self;
        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn run_lane(
    kind: LaneKind,
    camera: Arc<dyn CameraController>,
    mut requests: mpsc::UnboundedReceiver<CameraRequest>,
    completions: mpsc::UnboundedSender<Completion>,
    cancel: CancellationToken,
) {
    trace!("Camera lane '{}' started", kind.name());
    loop {
        let request = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
        };

        let completion = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            completion = execute(camera.as_ref(), request) => completion,
        };

        if completions.send(completion).is_err() {
            break;
        }
    }
    trace!("Camera lane '{}' stopped", kind.name());
}

/// Run one request; precondition checks are fetched fresh here
async fn execute(camera: &dyn CameraController, request: CameraRequest) -> Completion {
    match request {
        CameraRequest::OutputParameters => {
            Completion::OutputParameters(camera.output_parameters().await)
        }
        CameraRequest::Capabilities => {
            Completion::Capabilities(CameraCapabilities::query(camera).await)
        }
        CameraRequest::SetFlash(requested) => {
            let available = camera.is_flash_available().await;
            let success = available && camera.set_flash_enabled(requested).await;
            Completion::FlashSet {
                requested,
                available,
                success,
            }
        }
        CameraRequest::Toggle => {
            let orientation = if camera.can_toggle_camera().await {
                Some(camera.toggle_camera().await)
            } else {
                debug!("Camera toggle not available");
                None
            };
            // flash availability differs between lenses
            let capabilities = CameraCapabilities::query(camera).await;
            Completion::Toggled {
                orientation,
                capabilities,
            }
        }
        CameraRequest::Capture => Completion::Captured(camera.capture_photo().await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MockCameraController;
    use crate::item::ExifOrientation;
    use crate::orientation::OrientationTracker;
    use tokio::time::{timeout, Duration};

    fn spawn_lanes(
        camera: MockCameraController,
    ) -> (
        CameraLanes,
        mpsc::UnboundedReceiver<Completion>,
        CancellationToken,
    ) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let lanes = CameraLanes::spawn(Arc::new(camera), sender, cancel.clone());
        (lanes, receiver, cancel)
    }

    async fn next(receiver: &mut mpsc::UnboundedReceiver<Completion>) -> Completion {
        timeout(Duration::from_millis(500), receiver.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_request_routing() {
        assert_eq!(
            LaneKind::for_request(CameraRequest::Capabilities),
            LaneKind::Flash
        );
        assert_eq!(
            LaneKind::for_request(CameraRequest::SetFlash(true)),
            LaneKind::Flash
        );
        assert_eq!(
            LaneKind::for_request(CameraRequest::Capture),
            LaneKind::Capture
        );
    }

    #[tokio::test]
    async fn test_same_kind_completes_in_order() {
        let camera = MockCameraController::new(OrientationTracker::default())
            .with_latency(Duration::from_millis(5));
        let (lanes, mut completions, _cancel) = spawn_lanes(camera);

        lanes.submit(CameraRequest::Capture);
        lanes.submit(CameraRequest::Capture);
        lanes.submit(CameraRequest::Capture);

        let mut references = Vec::new();
        for _ in 0..3 {
            match next(&mut completions).await {
                Completion::Captured(Some(item)) => {
                    references.push(item.image.reference().to_string())
                }
                other => panic!("Unexpected completion: {:?}", other),
            }
        }
        assert_eq!(
            references,
            vec!["camera://back/1", "camera://back/2", "camera://back/3"]
        );
    }

    #[tokio::test]
    async fn test_flash_checks_availability_first() {
        let camera = MockCameraController::new(OrientationTracker::default()).with_flash(false);
        let (lanes, mut completions, _cancel) = spawn_lanes(camera);

        lanes.submit(CameraRequest::SetFlash(true));
        match next(&mut completions).await {
            Completion::FlashSet {
                requested,
                available,
                success,
            } => {
                assert!(requested);
                assert!(!available);
                assert!(!success);
            }
            other => panic!("Unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_toggle_reports_new_orientation_and_capabilities() {
        let camera = MockCameraController::new(OrientationTracker::default());
        let (lanes, mut completions, _cancel) = spawn_lanes(camera);

        lanes.submit(CameraRequest::Toggle);
        match next(&mut completions).await {
            Completion::Toggled {
                orientation,
                capabilities,
            } => {
                assert_eq!(orientation, Some(ExifOrientation::LeftMirrored));
                assert!(!capabilities.flash_available);
            }
            other => panic!("Unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_lanes() {
        let camera = MockCameraController::new(OrientationTracker::default())
            .with_latency(Duration::from_secs(5));
        let (lanes, mut completions, cancel) = spawn_lanes(camera);

        lanes.submit(CameraRequest::Capture);
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        timeout(Duration::from_millis(500), lanes.join())
            .await
            .unwrap();
        assert!(completions.try_recv().is_err());
    }
}
