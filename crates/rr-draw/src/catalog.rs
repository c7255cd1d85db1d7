//! Reward catalog input

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rarity::RarityTier;

/// A reward item supplied by the external catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Catalog identity
    pub id: String,
    /// Display name
    pub name: String,
    /// Rarity tier
    pub tier: RarityTier,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: RarityTier) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tier,
        }
    }
}

/// Snapshot of the catalog, immutable for the duration of a draw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    /// Parse a JSON array of items
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a YAML sequence of items
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load from file, YAML for `.yaml`/`.yml`, JSON otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let catalog = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml(&text)?,
            _ => Self::from_json(&text)?,
        };
        log::debug!("Loaded {} catalog items from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// All items in catalog order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items of one tier, in catalog order
    pub fn by_tier(&self, tier: RarityTier) -> Vec<&CatalogItem> {
        self.items.iter().filter(|item| item.tier == tier).collect()
    }

    /// Item count per tier, indexed by ordinal
    pub fn tier_counts(&self) -> [usize; RarityTier::COUNT] {
        let mut counts = [0; RarityTier::COUNT];
        for item in &self.items {
            counts[item.tier.ordinal()] += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<CatalogItem>> for Catalog {
    fn from(items: Vec<CatalogItem>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_catalog() {
        let json = r#"[
            {"id": "hat-1", "name": "Straw Hat", "tier": "common"},
            {"id": "cape-9", "name": "Star Cape", "tier": "legendary"}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.by_tier(RarityTier::Legendary)[0].name, "Star Cape");
        assert_eq!(catalog.tier_counts(), [1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_parse_yaml_catalog() {
        let yaml = "- id: a\n  name: Apple\n  tier: rare\n- id: b\n  name: Berry\n  tier: rare\n";
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.by_tier(RarityTier::Rare).len(), 2);
    }

    #[test]
    fn test_unknown_tier_rejected() {
        let json = r#"[{"id": "x", "name": "X", "tier": "mythic"}]"#;
        assert!(Catalog::from_json(json).is_err());
    }
}
