//! Game settings
//!
//! Data-driven configuration for a session. Read-only: on the web it may be
//! supplied through LocalStorage, but the game never writes it back.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{Motion, Variant};

/// Invalid or unreadable settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Element count must be at least 1")]
    NoElements,

    #[error("Movement step must be positive, got {0}")]
    InvalidStep(f32),

    #[error("Spin step must be finite and under half a turn per frame, got {0}")]
    InvalidSpin(f32),

    #[error("Timer period for {variant} elements must be finite and at least {min}s, got {period}")]
    InvalidPeriod {
        variant: &'static str,
        period: f64,
        min: f64,
    },

    #[error("Movement bounds must be finite with min <= max, got {min}..{max}")]
    InvertedBounds { min: Vec3, max: Vec3 },

    #[error("Spawn half extents must be finite and non-negative, got {0}")]
    InvalidSpawnVolume(Vec3),

    #[error("Camera field of view must be within (0, 180) degrees, got {0}")]
    InvalidFov(f32),
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Elements spawned per session
    pub element_count: usize,

    // === Motion ===
    /// Distance travelled per frame
    pub step: f32,
    /// Change-element rotation per frame (radians)
    pub spin_step: f32,
    /// Movement bounding box
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    /// Spawn volume half extents (centered on origin)
    pub spawn_half_extents: Vec3,

    // === Timers (seconds) ===
    pub collect_period: f64,
    pub avoid_period: f64,
    pub change_period: f64,

    // === Camera ===
    pub camera_fov_deg: f32,

    // === Driver ===
    /// Fixed RNG seed (None = seed from the clock)
    pub seed: Option<u64>,
    /// Seconds between autoplay clicks in the native demo
    pub autoplay_click_interval: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            element_count: DEFAULT_ELEMENT_COUNT,

            step: ELEMENT_STEP,
            spin_step: SPIN_STEP,
            bounds_min: BOUNDS_MIN,
            bounds_max: BOUNDS_MAX,
            spawn_half_extents: SPAWN_HALF_EXTENTS,

            collect_period: COLLECT_PERIOD,
            avoid_period: AVOID_PERIOD,
            change_period: CHANGE_PERIOD,

            camera_fov_deg: CAMERA_FOV_DEG,

            seed: None,
            autoplay_click_interval: 0.5,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "shape_hunt_settings";

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.element_count == 0 {
            return Err(SettingsError::NoElements);
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(SettingsError::InvalidStep(self.step));
        }
        if !self.spin_step.is_finite() || self.spin_step.abs() >= std::f32::consts::PI {
            return Err(SettingsError::InvalidSpin(self.spin_step));
        }
        for variant in Variant::ALL {
            let period = self.period(variant);
            if !period.is_finite() || period < MIN_TIMER_PERIOD {
                return Err(SettingsError::InvalidPeriod {
                    variant: variant.as_str(),
                    period,
                    min: MIN_TIMER_PERIOD,
                });
            }
        }
        if !self.bounds_min.is_finite()
            || !self.bounds_max.is_finite()
            || self.bounds_min.cmpgt(self.bounds_max).any()
        {
            return Err(SettingsError::InvertedBounds {
                min: self.bounds_min,
                max: self.bounds_max,
            });
        }
        let half = self.spawn_half_extents;
        if !half.is_finite() || half.cmplt(Vec3::ZERO).any() {
            return Err(SettingsError::InvalidSpawnVolume(half));
        }
        let fov = self.camera_fov_deg;
        if fov.is_nan() || fov <= 0.0 || fov >= 180.0 {
            return Err(SettingsError::InvalidFov(self.camera_fov_deg));
        }
        Ok(())
    }

    /// Timer period for a variant
    pub fn period(&self, variant: Variant) -> f64 {
        match variant {
            Variant::Collect => self.collect_period,
            Variant::Avoid => self.avoid_period,
            Variant::Change => self.change_period,
        }
    }

    /// Per-frame motion parameters
    pub fn motion(&self) -> Motion {
        Motion {
            step: self.step,
            spin_step: self.spin_step,
            min: self.bounds_min,
            max: self.bounds_max,
        }
    }

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
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
