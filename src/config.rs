use crate::orientation::DeviceIdiom;
use crate::router::CanvasSize;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PickerConfig {
    pub picker: PickerSection,
    pub device: DeviceConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PickerSection {
    /// Maximum number of items; unset means unlimited
    #[serde(default)]
    pub max_items_count: Option<usize>,

    /// Show the crop control in photo preview
    #[serde(default = "default_crop_enabled")]
    pub crop_enabled: bool,

    /// Allow switching to the front camera
    #[serde(default = "default_selfie_enabled")]
    pub selfie_enabled: bool,

    /// Canvas size handed to the crop sub-flow (width, height)
    #[serde(default = "default_crop_canvas_size")]
    pub crop_canvas_size: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeviceConfig {
    /// Handsets pin photo preview to portrait
    #[serde(default)]
    pub idiom: DeviceIdiom,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Capacity of the presenter's command queue
    #[serde(default = "default_command_queue_capacity")]
    pub command_queue_capacity: usize,

    /// Capacity of the module event bus
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// Log every published module event at debug level
    #[serde(default = "default_debug_events")]
    pub debug_events: bool,
}

impl PickerConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("mediapicker.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("picker.crop_enabled", default_crop_enabled())?
            .set_default("picker.selfie_enabled", default_selfie_enabled())?
            .set_default(
                "picker.crop_canvas_size",
                vec![default_crop_canvas_size().0, default_crop_canvas_size().1],
            )?
            .set_default("device.idiom", "Handset")?
            .set_default(
                "runtime.command_queue_capacity",
                default_command_queue_capacity() as i64,
            )?
            .set_default(
                "runtime.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .set_default("runtime.debug_events", default_debug_events())?
            .add_source(File::with_name(&path_str).required(false))
            // MEDIAPICKER__PICKER__MAX_ITEMS_COUNT=5
            .add_source(
                Environment::with_prefix("MEDIAPICKER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: PickerConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.picker.max_items_count == Some(0) {
            return Err(ConfigError::Message(
                "max_items_count must be greater than 0 when set".to_string(),
            ));
        }

        if self.picker.crop_canvas_size.0 == 0 || self.picker.crop_canvas_size.1 == 0 {
            return Err(ConfigError::Message(
                "Crop canvas size must be greater than 0".to_string(),
            ));
        }

        if self.runtime.command_queue_capacity == 0 {
            return Err(ConfigError::Message(
                "Command queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.runtime.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn crop_canvas(&self) -> CanvasSize {
        CanvasSize::from(self.picker.crop_canvas_size)
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            picker: PickerSection {
                max_items_count: None,
                crop_enabled: default_crop_enabled(),
                selfie_enabled: default_selfie_enabled(),
                crop_canvas_size: default_crop_canvas_size(),
            },
            device: DeviceConfig {
                idiom: DeviceIdiom::default(),
            },
            runtime: RuntimeConfig {
                command_queue_capacity: default_command_queue_capacity(),
                event_bus_capacity: default_event_bus_capacity(),
                debug_events: default_debug_events(),
            },
        }
    }
}

// Default value functions
fn default_crop_enabled() -> bool {
    true
}
fn default_selfie_enabled() -> bool {
    true
}
fn default_crop_canvas_size() -> (u32, u32) {
    (1000, 1000)
}

fn default_command_queue_capacity() -> usize {
    64
}
fn default_event_bus_capacity() -> usize {
    100
}
fn default_debug_events() -> bool {
    false
}
