use crate::item::ItemKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("Capacity exceeded: {current} items held, {requested} requested, limit is {limit}")]
    Capacity {
        limit: usize,
        current: usize,
        requested: usize,
    },

    #[error("Item {0} is not in the collection")]
    UnknownItem(ItemKey),

    #[error("Item {0} is already in the collection")]
    DuplicateKey(ItemKey),

    #[error("Index {index} is out of bounds for {len} items")]
    InvalidIndex { index: usize, len: usize },

    #[error("Media picker module is closed")]
    ModuleClosed,

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

/// Failure categories the presenter reacts to differently.
///
/// Permission, hardware and stale failures never reach the host as errors;
/// they are reported through [`crate::events::PickerEvent::failure_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Camera or library access denied; shown as an affordance, re-checked later
    Permission,
    /// Flash, toggle or capture failed; free to retry
    Hardware,
    /// Add would exceed the item limit; excess must be dropped
    Capacity,
    /// A completion arrived for state that no longer exists
    Stale,
    /// Caller passed a key or index that does not match the collection
    Usage,
    /// Configuration, IO and channel failures
    Internal,
}

impl ErrorKind {
    /// Whether the same request may succeed later without host action
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Permission | ErrorKind::Hardware)
    }
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Receiver lagged behind by {0} events")]
    Lagged(u64),

    #[error("Event channel closed")]
    ChannelClosed,
}

impl PickerError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PickerError::Capacity { .. } => ErrorKind::Capacity,
            PickerError::UnknownItem(_)
            | PickerError::DuplicateKey(_)
            | PickerError::InvalidIndex { .. } => ErrorKind::Usage,
            PickerError::Config(_)
            | PickerError::Io(_)
            | PickerError::Serialization(_)
            | PickerError::EventBus(_)
            | PickerError::ModuleClosed
            | PickerError::System { .. }
            | PickerError::Component { .. } => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, PickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let capacity = PickerError::Capacity {
            limit: 3,
            current: 3,
            requested: 1,
        };
        assert_eq!(capacity.kind(), ErrorKind::Capacity);
        assert!(!capacity.kind().is_retryable());

        assert_eq!(
            PickerError::InvalidIndex { index: 1, len: 0 }.kind(),
            ErrorKind::Usage
        );
        assert_eq!(PickerError::ModuleClosed.kind(), ErrorKind::Internal);
        assert_eq!(PickerError::system("boom").kind(), ErrorKind::Internal);

        assert!(ErrorKind::Permission.is_retryable());
        assert!(ErrorKind::Hardware.is_retryable());
        assert!(!ErrorKind::Stale.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = PickerError::InvalidIndex { index: 4, len: 2 };
        assert_eq!(err.to_string(), "Index 4 is out of bounds for 2 items");

        let err = PickerError::component("camera", "session interrupted");
        assert!(err.to_string().contains("camera"));
        assert!(err.to_string().contains("session interrupted"));
    }
}
