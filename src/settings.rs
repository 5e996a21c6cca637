//! Sandbox settings and presets
//!
//! Persisted as JSON in LocalStorage on web; read from the file named by
//! `TILT_SANDBOX_SETTINGS` on native.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SandboxError};
use crate::sim::{GravitySource, SandboxConfig};

/// Ready-made sandbox configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SandboxPreset {
    /// Constant downward gravity, synchronous reset
    #[default]
    Plain,
    /// Accelerometer-driven gravity
    Accelerometer,
    /// Gyroscope-driven gravity, perfectly bouncy boxes
    Gyroscope,
    /// Reset re-seeds the scene after a short delay
    Snapshot,
    /// Constant gravity, perfectly bouncy boxes
    Bouncy,
}

impl SandboxPreset {
    pub const ALL: [SandboxPreset; 5] = [
        SandboxPreset::Plain,
        SandboxPreset::Accelerometer,
        SandboxPreset::Gyroscope,
        SandboxPreset::Snapshot,
        SandboxPreset::Bouncy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SandboxPreset::Plain => "Plain",
            SandboxPreset::Accelerometer => "Accelerometer",
            SandboxPreset::Gyroscope => "Gyroscope",
            SandboxPreset::Snapshot => "Snapshot",
            SandboxPreset::Bouncy => "Bouncy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "fixed" => Some(SandboxPreset::Plain),
            "accelerometer" | "accel" => Some(SandboxPreset::Accelerometer),
            "gyroscope" | "gyro" => Some(SandboxPreset::Gyroscope),
            "snapshot" => Some(SandboxPreset::Snapshot),
            "bouncy" => Some(SandboxPreset::Bouncy),
            _ => None,
        }
    }

    /// Simulation parameters for this preset
    pub fn config(&self) -> SandboxConfig {
        let base = SandboxConfig::default();
        match self {
            SandboxPreset::Plain => base,
            SandboxPreset::Accelerometer => SandboxConfig {
                gravity_source: GravitySource::Accelerometer,
                ..base
            },
            SandboxPreset::Gyroscope => SandboxConfig {
                gravity_source: GravitySource::Gyroscope,
                spawn_restitution: BOUNCY_RESTITUTION,
                ..base
            },
            SandboxPreset::Snapshot => SandboxConfig {
                reset_delay: SNAPSHOT_RESET_DELAY,
                ..base
            },
            SandboxPreset::Bouncy => SandboxConfig {
                spawn_restitution: BOUNCY_RESTITUTION,
                ..base
            },
        }
    }
}

/// Sandbox settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Preset the physics block was derived from (informational)
    pub preset: SandboxPreset,
    /// Simulation parameters
    pub physics: SandboxConfig,
    /// Subscribe to the sensor as soon as the sandbox starts
    pub sensor_on_start: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
    /// Show entity count
    pub show_entity_count: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(SandboxPreset::default())
    }
}

impl Settings {
    /// Create settings from a preset
    pub fn from_preset(preset: SandboxPreset) -> Self {
        Self {
            preset,
            physics: preset.config(),
            sensor_on_start: false,
            show_fps: true,
            show_entity_count: true,
        }
    }

    /// Settings for a preset given by name
    pub fn from_preset_name(name: &str) -> Result<Self> {
        SandboxPreset::from_str(name)
            .map(Self::from_preset)
            .ok_or_else(|| SandboxError::UnknownPreset(name.to_string()))
    }

    /// Apply a preset (replaces the physics block, keeps HUD choices)
    pub fn apply_preset(&mut self, preset: SandboxPreset) {
        self.preset = preset;
        self.physics = preset.config();
    }

    /// Switch to a preset chosen by name and persist the result.
    /// Sensor sources start with the sensor on.
    pub fn select_preset(&mut self, name: &str) -> Result<SandboxPreset> {
        let preset = SandboxPreset::from_str(name)
            .ok_or_else(|| SandboxError::UnknownPreset(name.to_string()))?;
        self.apply_preset(preset);
        self.sensor_on_start = self.physics.gravity_source.uses_sensor();
        self.save();
        Ok(preset)
    }

    /// Parse settings JSON; missing fields take default values and
    /// out-of-range physics values are repaired
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.physics = settings.physics.sanitized();
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "tilt_sandbox_settings";

    /// Environment variable naming a settings file (native)
    pub const ENV_PATH: &'static str = "TILT_SANDBOX_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Discarding stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Settings not saved: {}", e),
            }
        }
    }

    /// Load settings from the file named by `TILT_SANDBOX_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::env::var(Self::ENV_PATH) {
            Ok(path) => match Self::load_file(&path) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("{}; using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SandboxError::SettingsIo {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
