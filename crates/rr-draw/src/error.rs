//! Error types for the draw engine

use thiserror::Error;

use crate::rarity::{Modifier, RarityTier};

/// Draw engine error types
#[derive(Error, Debug)]
pub enum DrawError {
    /// Base weight missing for a tier
    #[error("Missing base weight for tier {0}")]
    MissingTier(RarityTier),

    /// Base weight is zero, negative or not finite
    #[error("Invalid base weight for {tier}: {value}")]
    InvalidWeight { tier: RarityTier, value: f64 },

    /// Modifier multiplier is negative or not finite
    #[error("Invalid multiplier for {modifier}/{tier}: {value}")]
    InvalidMultiplier {
        modifier: Modifier,
        tier: RarityTier,
        value: f64,
    },

    /// Configuration value out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// No candidates to draw from
    #[error("Cannot draw from an empty item list")]
    EmptyCandidates,

    /// Candidates exist but every adjusted weight is zero
    #[error("Total adjusted weight is {0}, nothing can win")]
    ZeroTotalWeight(f64),

    /// Display pool has no slots
    #[error("Display pool is empty")]
    EmptyPool,

    /// Operation not allowed while the reel is animating
    #[error("Reel is spinning")]
    Spinning,

    /// Unknown modifier name
    #[error("Unknown modifier: {0}")]
    UnknownModifier(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

pub type Result<T> = std::result::Result<T, DrawError>;
