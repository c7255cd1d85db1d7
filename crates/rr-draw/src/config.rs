//! Draw engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DrawError, Result};
use crate::pool::DEFAULT_TARGET_COUNT;
use crate::rarity::WeightTable;
use crate::reel::ReelConfig;
use crate::timing::{ReelTiming, TimingProfile};

/// Complete draw engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Display pool length
    pub target_count: usize,
    /// Reel geometry
    pub reel: ReelConfig,
    /// Reel timing
    pub timing: ReelTiming,
    /// Tier weights and modifier multipliers
    pub weights: WeightTable,
    /// Fixed RNG seed for reproducible draws (None = OS entropy)
    pub seed: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            reel: ReelConfig::default(),
            timing: ReelTiming::default(),
            weights: WeightTable::default(),
            seed: None,
        }
    }
}

impl DrawConfig {
    /// Headless config: instant timing, fixed seed
    pub fn headless(seed: u64) -> Self {
        Self {
            timing: ReelTiming::instant(),
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Builder: set timing profile
    pub fn with_profile(mut self, profile: TimingProfile) -> Self {
        self.timing = ReelTiming::from_profile(profile);
        self
    }

    /// Builder: set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, YAML for `.yaml`/`.yml`, JSON otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        if self.target_count == 0 {
            return Err(DrawError::InvalidConfig("target_count must be > 0".into()));
        }
        if self.reel.visible_count == 0 {
            return Err(DrawError::InvalidConfig("reel.visible_count must be > 0".into()));
        }
        let timing = &self.timing;
        if !timing.total_duration_ms.is_finite() || timing.total_duration_ms < 0.0 {
            return Err(DrawError::InvalidConfig(format!(
                "timing.total_duration_ms out of range: {}",
                timing.total_duration_ms
            )));
        }
        if !timing.settle_interval_ms.is_finite() || timing.settle_interval_ms < 0.0 {
            return Err(DrawError::InvalidConfig(format!(
                "timing.settle_interval_ms out of range: {}",
                timing.settle_interval_ms
            )));
        }
        self.weights.validate()
    }
}
