use crate::error::{ErrorKind, EventBusError};
use crate::item::{ItemKey, MediaItem};
use crate::presenter::CaptureMode;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Module output events observed by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickerEvent {
    /// The presenter switched between camera and preview
    ModeChanged { mode: CaptureMode },
    /// Items were captured, picked from the library or added by the host
    ItemsAdded { keys: Vec<ItemKey> },
    /// An item was edited in place (crop)
    ItemUpdated { key: ItemKey },
    /// An item left the collection
    ItemRemoved { key: ItemKey },
    /// The user dragged an item to a new position
    ItemMoved { from: usize, to: usize },
    /// Items were dropped because the collection is full
    CapacityExceeded { limit: usize, rejected: usize },
    /// Camera access was granted or denied
    CameraAccessChanged { granted: bool },
    /// A camera operation reported failure
    CameraOperationFailed { operation: String },
    /// A completion arrived for state that no longer exists
    StaleResultDiscarded {
        operation: String,
        key: Option<ItemKey>,
    },
    /// The host finished the module; final ordered items
    Finished { items: Vec<MediaItem> },
    /// The module was dismissed without a result
    Cancelled,
}

impl PickerEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            PickerEvent::ModeChanged { mode } => format!("Mode changed to {}", mode),
            PickerEvent::ItemsAdded { keys } => format!("{} item(s) added", keys.len()),
            PickerEvent::ItemUpdated { key } => format!("Item {} updated", key),
            PickerEvent::ItemRemoved { key } => format!("Item {} removed", key),
            PickerEvent::ItemMoved { from, to } => format!("Item moved from {} to {}", from, to),
            PickerEvent::CapacityExceeded { limit, rejected } => {
                format!("{} item(s) rejected, limit is {}", rejected, limit)
            }
            PickerEvent::CameraAccessChanged { granted } => format!(
                "Camera access {}",
                if *granted { "granted" } else { "denied" }
            ),
            PickerEvent::CameraOperationFailed { operation } => {
                format!("Camera operation '{}' failed", operation)
            }
            PickerEvent::StaleResultDiscarded { operation, key } => match key {
                Some(key) => format!("Stale {} result for {} discarded", operation, key),
                None => format!("Stale {} result discarded", operation),
            },
            PickerEvent::Finished { items } => format!("Finished with {} item(s)", items.len()),
            PickerEvent::Cancelled => "Cancelled".to_string(),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            PickerEvent::ModeChanged { .. } => "mode_changed",
            PickerEvent::ItemsAdded { .. } => "items_added",
            PickerEvent::ItemUpdated { .. } => "item_updated",
            PickerEvent::ItemRemoved { .. } => "item_removed",
            PickerEvent::ItemMoved { .. } => "item_moved",
            PickerEvent::CapacityExceeded { .. } => "capacity_exceeded",
            PickerEvent::CameraAccessChanged { .. } => "camera_access_changed",
            PickerEvent::CameraOperationFailed { .. } => "camera_operation_failed",
            PickerEvent::StaleResultDiscarded { .. } => "stale_result_discarded",
            PickerEvent::Finished { .. } => "finished",
            PickerEvent::Cancelled => "cancelled",
        }
    }

    /// Failure category for events that report a degraded outcome
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            PickerEvent::CameraAccessChanged { granted: false } => Some(ErrorKind::Permission),
            PickerEvent::CameraOperationFailed { .. } => Some(ErrorKind::Hardware),
            PickerEvent::CapacityExceeded { .. } => Some(ErrorKind::Capacity),
            PickerEvent::StaleResultDiscarded { .. } => Some(ErrorKind::Stale),
            _ => None,
        }
    }

    /// Item the event is about, if any
    pub fn item_key(&self) -> Option<ItemKey> {
        match self {
            PickerEvent::ItemUpdated { key } | PickerEvent::ItemRemoved { key } => Some(*key),
            PickerEvent::StaleResultDiscarded { key, .. } => *key,
            PickerEvent::ModeChanged {
                mode: CaptureMode::Previewing(key),
            } => Some(*key),
            _ => None,
        }
    }
}

/// Async event bus for module output using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<PickerEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<PickerEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub async fn publish(&self, event: PickerEvent) -> Result<usize, EventBusError> {
        if self.debug_logging {
            debug!("Publishing event: {}", event.description());
        }

        match &event {
            PickerEvent::Finished { items } => {
                info!("Media picker finished with {} item(s)", items.len());
            }
            PickerEvent::CameraAccessChanged { granted: false } => {
                warn!("Camera access denied");
            }
            PickerEvent::CapacityExceeded { limit, rejected } => {
                warn!("{} item(s) rejected, limit is {}", rejected, limit);
            }
            _ => {}
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            debug_logging: self.debug_logging,
        }
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Accept events about specific items
    Items(Vec<ItemKey>),
    /// Custom filter function
    Custom(fn(&PickerEvent) -> bool),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &PickerEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Items(keys) => match event {
                PickerEvent::ItemsAdded { keys: added } => {
                    added.iter().any(|key| keys.contains(key))
                }
                _ => event.item_key().is_some_and(|key| keys.contains(&key)),
            },
            EventFilter::Custom(filter_fn) => filter_fn(event),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<PickerEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(
        receiver: broadcast::Receiver<PickerEvent>,
        filter: EventFilter,
        name: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<PickerEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<PickerEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => {
                    return Ok(None);
                }
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Receiver '{}' lagged behind by {} events", self.name, n);
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ImageSource;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();
        let key = ItemKey::new();

        let subscriber_count = event_bus
            .publish(PickerEvent::ItemRemoved { key })
            .await
            .unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            PickerEvent::ItemRemoved { key: received } => assert_eq!(received, key),
            _ => panic!("Unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let event_bus = EventBus::new(10);
        assert!(!event_bus.has_subscribers());
        let result = event_bus.publish(PickerEvent::Cancelled).await;
        assert!(matches!(result, Err(EventBusError::PublishFailed { .. })));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();
        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish(PickerEvent::Cancelled).await.unwrap();

        let _ = timeout(Duration::from_millis(100), receiver1.recv())
            .await
            .unwrap()
            .unwrap();
        let _ = timeout(Duration::from_millis(100), receiver2.recv())
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_event_filter() {
        let filter = EventFilter::EventTypes(vec!["items_added", "item_removed"]);
        let key = ItemKey::new();

        assert!(filter.matches(&PickerEvent::ItemsAdded { keys: vec![key] }));
        assert!(filter.matches(&PickerEvent::ItemRemoved { key }));
        assert!(!filter.matches(&PickerEvent::ItemMoved { from: 0, to: 1 }));
    }

    #[test]
    fn test_item_filter() {
        let watched = ItemKey::new();
        let other = ItemKey::new();
        let filter = EventFilter::Items(vec![watched]);

        assert!(filter.matches(&PickerEvent::ItemsAdded {
            keys: vec![other, watched]
        }));
        assert!(filter.matches(&PickerEvent::ItemUpdated { key: watched }));
        assert!(filter.matches(&PickerEvent::ModeChanged {
            mode: CaptureMode::Previewing(watched)
        }));
        assert!(!filter.matches(&PickerEvent::ItemRemoved { key: other }));
        assert!(!filter.matches(&PickerEvent::Cancelled));
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let event_bus = EventBus::new(10);
        let receiver = event_bus.subscribe();
        let filter = EventFilter::EventTypes(vec!["finished"]);
        let mut filtered_receiver = EventReceiver::new(receiver, filter, "test".to_string());

        event_bus
            .publish(PickerEvent::ItemMoved { from: 0, to: 1 })
            .await
            .unwrap();
        let item = MediaItem::from_library(ImageSource::new("library://a"));
        event_bus
            .publish(PickerEvent::Finished { items: vec![item] })
            .await
            .unwrap();

        let received = timeout(Duration::from_millis(100), filtered_receiver.recv())
            .await
            .unwrap()
            .unwrap();
        match received {
            PickerEvent::Finished { items } => assert_eq!(items.len(), 1),
            _ => panic!("Unexpected event type"),
        }
        assert!(filtered_receiver.try_recv().unwrap().is_none());
    }

    #[test]
    fn test_event_properties() {
        let event = PickerEvent::CapacityExceeded {
            limit: 3,
            rejected: 2,
        };
        assert_eq!(event.event_type(), "capacity_exceeded");
        assert!(event.description().contains("limit is 3"));

        let event = PickerEvent::ModeChanged {
            mode: CaptureMode::Capturing,
        };
        assert_eq!(event.description(), "Mode changed to capturing");
        assert_eq!(event.failure_kind(), None);
    }

    #[test]
    fn test_failure_kinds() {
        let denied = PickerEvent::CameraAccessChanged { granted: false };
        assert_eq!(denied.failure_kind(), Some(ErrorKind::Permission));
        assert!(denied.failure_kind().is_some_and(|kind| kind.is_retryable()));
        assert_eq!(
            PickerEvent::CameraAccessChanged { granted: true }.failure_kind(),
            None
        );
        assert_eq!(
            PickerEvent::CameraOperationFailed {
                operation: "capture_photo".to_string()
            }
            .failure_kind(),
            Some(ErrorKind::Hardware)
        );
        assert_eq!(
            PickerEvent::StaleResultDiscarded {
                operation: "crop".to_string(),
                key: None
            }
            .failure_kind(),
            Some(ErrorKind::Stale)
        );
        assert_eq!(
            PickerEvent::CapacityExceeded {
                limit: 3,
                rejected: 1
            }
            .failure_kind(),
            Some(ErrorKind::Capacity)
        );
    }
}
