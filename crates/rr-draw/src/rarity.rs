//! Rarity tiers, base weights and modifier multipliers

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DrawError, Result};

/// Reward rarity tier, in ascending scarcity.
///
/// Declaration order is the tier ordinal. Anything that needs a stable
/// order (remainder tie-breaks, reports) iterates [`RarityTier::ALL`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RarityTier {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

impl RarityTier {
    /// Every tier, lowest ordinal first
    pub const ALL: [RarityTier; 5] = [
        RarityTier::Common,
        RarityTier::Uncommon,
        RarityTier::Rare,
        RarityTier::Epic,
        RarityTier::Legendary,
    ];

    /// Number of tiers
    pub const COUNT: usize = Self::ALL.len();

    /// Fixed position in [`RarityTier::ALL`]
    #[inline]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            RarityTier::Common => "Common",
            RarityTier::Uncommon => "Uncommon",
            RarityTier::Rare => "Rare",
            RarityTier::Epic => "Epic",
            RarityTier::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base scarcity weight for every tier.
///
/// Always total: one entry per tier, each finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<RarityTier, f64>",
    into = "BTreeMap<RarityTier, f64>"
)]
pub struct BaseWeights([f64; RarityTier::COUNT]);

impl BaseWeights {
    /// Create from per-tier weights in tier order
    pub fn new(common: f64, uncommon: f64, rare: f64, epic: f64, legendary: f64) -> Result<Self> {
        let weights = Self([common, uncommon, rare, epic, legendary]);
        weights.validate()?;
        Ok(weights)
    }

    /// Weight for a tier
    #[inline]
    pub fn get(&self, tier: RarityTier) -> f64 {
        self.0[tier.ordinal()]
    }

    /// Sum of all tier weights
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Iterate `(tier, weight)` in tier order
    pub fn iter(&self) -> impl Iterator<Item = (RarityTier, f64)> + '_ {
        RarityTier::ALL.iter().map(move |&tier| (tier, self.get(tier)))
    }

    /// Check every weight is finite and positive
    pub fn validate(&self) -> Result<()> {
        for (tier, value) in self.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(DrawError::InvalidWeight { tier, value });
            }
        }
        Ok(())
    }
}

impl Default for BaseWeights {
    fn default() -> Self {
        Self([50.0, 30.0, 15.0, 4.0, 1.0])
    }
}

impl TryFrom<BTreeMap<RarityTier, f64>> for BaseWeights {
    type Error = DrawError;

    fn try_from(map: BTreeMap<RarityTier, f64>) -> Result<Self> {
        let mut weights = [0.0; RarityTier::COUNT];
        for tier in RarityTier::ALL {
            weights[tier.ordinal()] = *map.get(&tier).ok_or(DrawError::MissingTier(tier))?;
        }
        let weights = Self(weights);
        weights.validate()?;
        Ok(weights)
    }
}

impl From<BaseWeights> for BTreeMap<RarityTier, f64> {
    fn from(weights: BaseWeights) -> Self {
        weights.iter().collect()
    }
}

/// Draw context that biases tier odds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    #[default]
    Normal,
    Event,
    PremiumLootbox,
    RareLootbox,
    LegendaryLootbox,
}

impl Modifier {
    pub const ALL: [Modifier; 5] = [
        Modifier::Normal,
        Modifier::Event,
        Modifier::PremiumLootbox,
        Modifier::RareLootbox,
        Modifier::LegendaryLootbox,
    ];

    /// Wire name, as used in config files and settlement requests
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Normal => "normal",
            Modifier::Event => "event",
            Modifier::PremiumLootbox => "premium_lootbox",
            Modifier::RareLootbox => "rare_lootbox",
            Modifier::LegendaryLootbox => "legendary_lootbox",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = DrawError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Modifier::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| DrawError::UnknownModifier(s.to_string()))
    }
}

/// Partial tier → multiplier override for one modifier
pub type TierMultipliers = BTreeMap<RarityTier, f64>;

/// Base weights plus per-modifier multiplier overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightTable {
    /// Base scarcity weight per tier
    pub base: BaseWeights,
    /// Multiplier overrides; absent modifier or tier means 1.0
    pub modifiers: BTreeMap<Modifier, TierMultipliers>,
}

impl WeightTable {
    /// Table with the given base weights and no overrides
    pub fn new(base: BaseWeights) -> Self {
        Self {
            base,
            modifiers: BTreeMap::new(),
        }
    }

    /// Builder: override one multiplier
    pub fn with_multiplier(mut self, modifier: Modifier, tier: RarityTier, value: f64) -> Self {
        self.modifiers.entry(modifier).or_default().insert(tier, value);
        self
    }

    /// Multiplier for a tier under a modifier
    pub fn multiplier(&self, modifier: Modifier, tier: RarityTier) -> f64 {
        self.modifiers
            .get(&modifier)
            .and_then(|overrides| overrides.get(&tier))
            .copied()
            .unwrap_or(1.0)
    }

    /// Base weight × modifier multiplier
    #[inline]
    pub fn adjusted_weight(&self, modifier: Modifier, tier: RarityTier) -> f64 {
        self.base.get(tier) * self.multiplier(modifier, tier)
    }

    /// Check base weights and every override
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        for (&modifier, overrides) in &self.modifiers {
            for (&tier, &value) in overrides {
                if !value.is_finite() || value < 0.0 {
                    return Err(DrawError::InvalidMultiplier {
                        modifier,
                        tier,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        use Modifier::*;
        use RarityTier::*;

        Self::new(BaseWeights::default())
            .with_multiplier(Event, Rare, 1.5)
            .with_multiplier(Event, Epic, 2.0)
            .with_multiplier(Event, Legendary, 2.0)
            .with_multiplier(PremiumLootbox, Common, 0.5)
            .with_multiplier(PremiumLootbox, Rare, 2.0)
            .with_multiplier(PremiumLootbox, Epic, 2.5)
            .with_multiplier(PremiumLootbox, Legendary, 3.0)
            .with_multiplier(RareLootbox, Common, 0.25)
            .with_multiplier(RareLootbox, Uncommon, 0.5)
            .with_multiplier(RareLootbox, Rare, 3.0)
            .with_multiplier(LegendaryLootbox, Common, 0.1)
            .with_multiplier(LegendaryLootbox, Uncommon, 0.25)
            .with_multiplier(LegendaryLootbox, Rare, 0.5)
            .with_multiplier(LegendaryLootbox, Epic, 2.0)
            .with_multiplier(LegendaryLootbox, Legendary, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_is_explicit() {
        let ordinals: Vec<usize> = RarityTier::ALL.iter().map(|t| t.ordinal()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4]);
        assert!(RarityTier::Common < RarityTier::Legendary);
    }

    #[test]
    fn test_base_weights_reject_non_positive() {
        assert!(BaseWeights::new(50.0, 30.0, 15.0, 4.0, 0.0).is_err());
        assert!(BaseWeights::new(50.0, -1.0, 15.0, 4.0, 1.0).is_err());
        assert!(BaseWeights::new(50.0, 30.0, f64::NAN, 4.0, 1.0).is_err());
        assert!(BaseWeights::new(50.0, 30.0, 15.0, 4.0, 1.0).is_ok());
    }

    #[test]
    fn test_base_weights_require_every_tier() {
        let json = r#"{"common": 50, "uncommon": 30, "rare": 15, "epic": 4}"#;
        let err = serde_json::from_str::<BaseWeights>(json).unwrap_err();
        assert!(err.to_string().contains("Legendary"));

        let json = r#"{"common": 5, "uncommon": 4, "rare": 3, "epic": 2, "legendary": 1}"#;
        let weights: BaseWeights = serde_json::from_str(json).unwrap();
        assert_eq!(weights.get(RarityTier::Rare), 3.0);
        assert_eq!(weights.total(), 15.0);
    }

    #[test]
    fn test_multiplier_defaults_to_one() {
        let table = WeightTable::default();
        assert_eq!(table.multiplier(Modifier::Normal, RarityTier::Legendary), 1.0);
        assert_eq!(table.multiplier(Modifier::Event, RarityTier::Common), 1.0);
        assert_eq!(table.multiplier(Modifier::Event, RarityTier::Epic), 2.0);
        assert_eq!(table.adjusted_weight(Modifier::Event, RarityTier::Epic), 8.0);
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let table = WeightTable::default().with_multiplier(Modifier::Event, RarityTier::Rare, -2.0);
        assert!(matches!(
            table.validate(),
            Err(DrawError::InvalidMultiplier { .. })
        ));
    }

    #[test]
    fn test_modifier_parse() {
        assert_eq!("premium-lootbox".parse::<Modifier>().unwrap(), Modifier::PremiumLootbox);
        assert_eq!("EVENT".parse::<Modifier>().unwrap(), Modifier::Event);
        assert!("mythic".parse::<Modifier>().is_err());
    }
}
