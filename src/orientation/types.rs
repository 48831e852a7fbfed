use serde::{Deserialize, Serialize};

/// Physical orientation of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl DeviceOrientation {
    /// Next orientation when the device is turned a quarter clockwise
    pub fn rotated_clockwise(&self) -> Self {
        match self {
            DeviceOrientation::Portrait => DeviceOrientation::LandscapeLeft,
            DeviceOrientation::LandscapeLeft => DeviceOrientation::PortraitUpsideDown,
            DeviceOrientation::PortraitUpsideDown => DeviceOrientation::LandscapeRight,
            DeviceOrientation::LandscapeRight => DeviceOrientation::Portrait,
        }
    }

    pub fn is_landscape(&self) -> bool {
        matches!(
            self,
            DeviceOrientation::LandscapeLeft | DeviceOrientation::LandscapeRight
        )
    }
}

/// Device class; handsets pin photo preview to portrait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceIdiom {
    #[default]
    Handset,
    Tablet,
}

/// Rotation applied to overlay controls so they stay upright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverlayTransform {
    pub rotation_degrees: i16,
}

impl OverlayTransform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn for_orientation(orientation: DeviceOrientation) -> Self {
        let rotation_degrees = match orientation {
            DeviceOrientation::Portrait => 0,
            DeviceOrientation::LandscapeLeft => 90,
            DeviceOrientation::PortraitUpsideDown => 180,
            DeviceOrientation::LandscapeRight => -90,
        };
        Self { rotation_degrees }
    }

    pub fn is_identity(&self) -> bool {
        self.rotation_degrees == 0
    }
}
