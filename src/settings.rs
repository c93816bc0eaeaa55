//! Engine settings
//!
//! Loaded from a JSON file next to the host; missing fields fall back to
//! the defaults in `consts`.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Continue price progressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PricingPreset {
    Gentle,
    #[default]
    Standard,
    Steep,
}

impl PricingPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingPreset::Gentle => "Gentle",
            PricingPreset::Standard => "Standard",
            PricingPreset::Steep => "Steep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gentle" => Some(PricingPreset::Gentle),
            "standard" | "std" => Some(PricingPreset::Standard),
            "steep" => Some(PricingPreset::Steep),
            _ => None,
        }
    }

    /// Multipliers of the base cost for the 1st, 2nd, 3rd... continue
    pub fn multipliers(&self) -> &'static [u64] {
        match self {
            PricingPreset::Gentle => &[1, 2, 3],
            PricingPreset::Standard => &[2, 3, 5],
            PricingPreset::Steep => &[3, 5, 8],
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Motion ===
    /// Travel bound of the moving block
    pub move_amount: f32,
    /// Leftover span that still counts as a perfect placement
    pub snap_threshold: f32,
    /// Minimum gap between two accepted actions
    pub action_debounce_ms: u64,

    // === Geometry ===
    pub block_height: f32,
    pub foundation_width: f32,
    pub foundation_depth: f32,

    // === Economy ===
    pub entry_fee: u64,
    pub continue_base_cost: u64,
    pub pricing: PricingPreset,

    // === Reset animation ===
    pub reset_base_ms: u64,
    pub reset_per_block_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            move_amount: MOVE_AMOUNT,
            snap_threshold: SNAP_THRESHOLD,
            action_debounce_ms: ACTION_DEBOUNCE_MS,

            block_height: BLOCK_HEIGHT,
            foundation_width: FOUNDATION_WIDTH,
            foundation_depth: FOUNDATION_DEPTH,

            entry_fee: ENTRY_FEE,
            continue_base_cost: CONTINUE_BASE_COST,
            pricing: PricingPreset::Standard,

            reset_base_ms: RESET_BASE_MS,
            reset_per_block_ms: RESET_PER_BLOCK_MS,
        }
    }
}

impl Settings {
    /// Default settings with a different continue progression
    pub fn from_preset(preset: PricingPreset) -> Self {
        Self {
            pricing: preset,
            ..Self::default()
        }
    }

    /// Foundation extent (x = width, y = height, z = depth)
    pub fn foundation_dimension(&self) -> Vec3 {
        Vec3::new(self.foundation_width, self.block_height, self.foundation_depth)
    }

    /// How long the removal animation runs for `removed` blocks
    pub fn reset_duration_ms(&self, removed: usize) -> u64 {
        self.reset_base_ms + removed as u64 * self.reset_per_block_ms
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings ({}: {})", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
