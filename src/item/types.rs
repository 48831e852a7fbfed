use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey(Uuid);

impl ItemKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ItemKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemKey {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to image data owned outside the picker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSource(String);

impl ImageSource {
    pub fn new<S: Into<String>>(reference: S) -> Self {
        Self(reference.into())
    }

    pub fn reference(&self) -> &str {
        &self.0
    }
}

/// Where an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOrigin {
    Captured,
    FromLibrary,
}

/// Crop rectangle in normalized image coordinates (0.0..=1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Build a crop rectangle, rejecting anything outside the unit square
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        let valid = in_unit(x)
            && in_unit(y)
            && width > 0.0
            && height > 0.0
            && x + width <= 1.0 + f64::EPSILON
            && y + height <= 1.0 + f64::EPSILON;

        valid.then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// EXIF orientation tag (values 1 through 8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExifOrientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Left,
    RightMirrored,
    Right,
}

impl ExifOrientation {
    pub fn exif_value(&self) -> u8 {
        match self {
            ExifOrientation::Up => 1,
            ExifOrientation::UpMirrored => 2,
            ExifOrientation::Down => 3,
            ExifOrientation::DownMirrored => 4,
            ExifOrientation::LeftMirrored => 5,
            ExifOrientation::Left => 6,
            ExifOrientation::RightMirrored => 7,
            ExifOrientation::Right => 8,
        }
    }

    pub fn from_exif_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(ExifOrientation::Up),
            2 => Some(ExifOrientation::UpMirrored),
            3 => Some(ExifOrientation::Down),
            4 => Some(ExifOrientation::DownMirrored),
            5 => Some(ExifOrientation::LeftMirrored),
            6 => Some(ExifOrientation::Left),
            7 => Some(ExifOrientation::RightMirrored),
            8 => Some(ExifOrientation::Right),
            _ => None,
        }
    }

    pub fn is_mirrored(&self) -> bool {
        matches!(
            self,
            ExifOrientation::UpMirrored
                | ExifOrientation::DownMirrored
                | ExifOrientation::LeftMirrored
                | ExifOrientation::RightMirrored
        )
    }
}

/// A single photo tracked by the picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub(super) key: ItemKey,
    pub image: ImageSource,
    pub origin: ItemOrigin,
    pub crop: Option<CropRect>,
    pub orientation: ExifOrientation,
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    /// Create an item with a fresh key
    pub fn new(image: ImageSource, origin: ItemOrigin) -> Self {
        Self::with_key(ItemKey::new(), image, origin)
    }

    pub fn with_key(key: ItemKey, image: ImageSource, origin: ItemOrigin) -> Self {
        Self {
            key,
            image,
            origin,
            crop: None,
            orientation: ExifOrientation::Up,
            created_at: Utc::now(),
        }
    }

    pub fn captured(image: ImageSource, orientation: ExifOrientation) -> Self {
        let mut item = Self::new(image, ItemOrigin::Captured);
        item.orientation = orientation;
        item
    }

    pub fn from_library(image: ImageSource) -> Self {
        Self::new(image, ItemOrigin::FromLibrary)
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn is_cropped(&self) -> bool {
        self.crop.is_some()
    }

    /// Take over the editable fields of another item, keeping identity
    pub fn apply_edits(&mut self, edited: &MediaItem) {
        self.image = edited.image.clone();
        self.crop = edited.crop;
        self.orientation = edited.orientation;
    }
}
