//! Outcome selection: the real winner, independent of the display pool
//!
//! Every entry in the candidate list counts on its own: a tier that appears
//! twice contributes its adjusted weight twice. An item's odds are therefore
//! proportional to its tier weight times the number of entries of that tier
//! in the list, not to the tier weight alone.

use rand::Rng;

use crate::catalog::CatalogItem;
use crate::error::{DrawError, Result};
use crate::rarity::{Modifier, RarityTier, WeightTable};

/// Sum of adjusted weights over every entry in `items`
pub fn total_weight(items: &[CatalogItem], modifier: Modifier, table: &WeightTable) -> f64 {
    items
        .iter()
        .map(|item| table.adjusted_weight(modifier, item.tier))
        .sum()
}

/// Pick the winner for a given roll `r` in `[0, total)`.
///
/// Walks `items` in order subtracting each adjusted weight; the first
/// entry that takes the running value below zero wins. If rounding lets the
/// walk run off the end, the last entry wins.
pub fn pick_winner_with_roll<'a>(
    items: &'a [CatalogItem],
    modifier: Modifier,
    table: &WeightTable,
    roll: f64,
) -> Result<&'a CatalogItem> {
    let last = items.last().ok_or(DrawError::EmptyCandidates)?;

    let mut remaining = roll;
    for item in items {
        remaining -= table.adjusted_weight(modifier, item.tier);
        if remaining < 0.0 {
            return Ok(item);
        }
    }
    Ok(last)
}

/// Weighted random pick over `items` under `modifier`
pub fn pick_winner<'a, R: Rng + ?Sized>(
    items: &'a [CatalogItem],
    modifier: Modifier,
    table: &WeightTable,
    rng: &mut R,
) -> Result<&'a CatalogItem> {
    if items.is_empty() {
        return Err(DrawError::EmptyCandidates);
    }
    let total = total_weight(items, modifier, table);
    if !total.is_finite() || total <= 0.0 {
        return Err(DrawError::ZeroTotalWeight(total));
    }

    let roll = rng.random::<f64>() * total;
    pick_winner_with_roll(items, modifier, table, roll)
}

/// Probability of each tier winning for this candidate list
pub fn tier_odds(
    items: &[CatalogItem],
    modifier: Modifier,
    table: &WeightTable,
) -> [f64; RarityTier::COUNT] {
    let mut odds = [0.0; RarityTier::COUNT];
    for item in items {
        odds[item.tier.ordinal()] += table.adjusted_weight(modifier, item.tier);
    }
    let total: f64 = odds.iter().sum();
    if total > 0.0 {
        for p in odds.iter_mut() {
            *p /= total;
        }
    }
    odds
}
