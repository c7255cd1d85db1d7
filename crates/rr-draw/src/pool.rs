//! Display pool construction
//!
//! The display pool is what the reel renders. It is cosmetic: the real
//! outcome is resolved separately by [`crate::outcome`].
//!
//! Per-tier slot counts come from a largest-remainder apportionment of the
//! *static* base weights. A tier with no backing catalog items keeps its
//! share on paper but contributes nothing; the shortfall is padded with
//! placeholders rather than redistributed.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogItem};
use crate::rarity::{BaseWeights, RarityTier};

/// Default display pool length
pub const DEFAULT_TARGET_COUNT: usize = 20;

/// Per-tier slot counts, indexed by tier ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts([usize; RarityTier::COUNT]);

impl TierCounts {
    pub fn new(counts: [usize; RarityTier::COUNT]) -> Self {
        Self(counts)
    }

    #[inline]
    pub fn get(&self, tier: RarityTier) -> usize {
        self.0[tier.ordinal()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Iterate `(tier, count)` in tier order
    pub fn iter(&self) -> impl Iterator<Item = (RarityTier, usize)> + '_ {
        RarityTier::ALL.iter().map(move |&tier| (tier, self.get(tier)))
    }

    pub fn as_array(&self) -> [usize; RarityTier::COUNT] {
        self.0
    }
}

/// Remainders closer than this fraction of a slot are treated as tied
const REMAINDER_RESOLUTION: f64 = 1e9;

/// Apportion `target_count` slots across tiers by largest remainder.
///
/// Each tier gets the floor of `weight / total * target_count`; leftover
/// slots go one at a time to the largest fractional remainders, ties to
/// the lowest tier ordinal.
///
/// Remainders are taken as `weight * n - floor * total` rather than from
/// the divided share, then quantized, so equal remainders compare equal
/// and the ordinal tie-break decides.
pub fn distribute(weights: &BaseWeights, target_count: usize) -> TierCounts {
    let total = weights.total();
    let mut counts = [0usize; RarityTier::COUNT];
    if target_count == 0 || total <= 0.0 {
        return TierCounts(counts);
    }

    let n = target_count as f64;
    let mut remainders: Vec<(RarityTier, u64)> = Vec::with_capacity(RarityTier::COUNT);
    for (tier, weight) in weights.iter() {
        let product = weight * n;
        let mut floor = (product / total).floor();
        let mut remainder = product - floor * total;
        if remainder < 0.0 {
            floor -= 1.0;
            remainder += total;
        } else if remainder >= total {
            floor += 1.0;
            remainder -= total;
        }
        counts[tier.ordinal()] = floor as usize;
        let key = (remainder / total * REMAINDER_RESOLUTION).round() as u64;
        remainders.push((tier, key));
    }

    remainders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let assigned: usize = counts.iter().sum();
    let leftover = target_count.saturating_sub(assigned);
    for &(tier, _) in remainders.iter().cycle().take(leftover) {
        counts[tier.ordinal()] += 1;
    }

    TierCounts(counts)
}

/// One rendered position on the reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplaySlot {
    /// A real catalog item
    Item(CatalogItem),
    /// Filler for a pool that came up short; never redeemable
    Placeholder,
}

impl DisplaySlot {
    /// Tier shown for this slot (placeholders render as Common)
    pub fn tier(&self) -> RarityTier {
        match self {
            DisplaySlot::Item(item) => item.tier,
            DisplaySlot::Placeholder => RarityTier::Common,
        }
    }

    pub fn item(&self) -> Option<&CatalogItem> {
        match self {
            DisplaySlot::Item(item) => Some(item),
            DisplaySlot::Placeholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, DisplaySlot::Placeholder)
    }

    /// Short label for logs and terminal output
    pub fn label(&self) -> &str {
        match self {
            DisplaySlot::Item(item) => &item.name,
            DisplaySlot::Placeholder => "?",
        }
    }
}

/// Fixed-length, shuffled sequence rendered by the reel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPool {
    slots: Vec<DisplaySlot>,
}

impl DisplayPool {
    pub fn new(slots: Vec<DisplaySlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[DisplaySlot] {
        &self.slots
    }

    /// Slot at a position (wraps around)
    pub fn slot_at(&self, position: usize) -> Option<&DisplaySlot> {
        if self.slots.is_empty() {
            return None;
        }
        self.slots.get(position % self.slots.len())
    }

    /// `count` consecutive slots starting at `start`, wrapping
    pub fn window(&self, start: usize, count: usize) -> Vec<&DisplaySlot> {
        if self.slots.is_empty() {
            return Vec::new();
        }
        let len = self.slots.len();
        (0..count).map(|i| &self.slots[(start + i) % len]).collect()
    }

    /// First position reached moving forward from `from` (exclusive, so a
    /// match at `from` itself is reached after a full lap) that satisfies
    /// `predicate`.
    pub fn next_position(
        &self,
        from: usize,
        predicate: impl Fn(&DisplaySlot) -> bool,
    ) -> Option<usize> {
        let len = self.slots.len();
        (1..=len)
            .map(|offset| (from + offset) % len)
            .find(|&idx| predicate(&self.slots[idx]))
    }

    pub fn placeholder_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_placeholder()).count()
    }

    /// Slot count per displayed tier (placeholders excluded)
    pub fn tier_counts(&self) -> TierCounts {
        let mut counts = [0; RarityTier::COUNT];
        for item in self.slots.iter().filter_map(DisplaySlot::item) {
            counts[item.tier.ordinal()] += 1;
        }
        TierCounts(counts)
    }
}

/// Fill each tier's allotment from the catalog, shuffle, then pad.
///
/// A tier's items are repeated (each repetition freshly shuffled) when the
/// catalog has fewer items than the tier's count. Tiers with no items are
/// skipped and the result is padded with placeholders up to `target_count`.
pub fn build_pool<R: Rng + ?Sized>(
    counts: &TierCounts,
    catalog: &Catalog,
    target_count: usize,
    rng: &mut R,
) -> DisplayPool {
    let mut slots: Vec<DisplaySlot> = Vec::with_capacity(target_count);

    for (tier, count) in counts.iter() {
        if count == 0 {
            continue;
        }
        let items = catalog.by_tier(tier);
        if items.is_empty() {
            log::debug!("No catalog items for {tier}, omitting {count} slots");
            continue;
        }

        let mut picks: Vec<&CatalogItem> = Vec::with_capacity(count + items.len());
        while picks.len() < count {
            let mut batch = items.clone();
            batch.shuffle(rng);
            picks.extend(batch);
        }
        picks.truncate(count);
        slots.extend(picks.into_iter().cloned().map(DisplaySlot::Item));
    }

    slots.shuffle(rng);

    if slots.len() < target_count {
        log::debug!(
            "Display pool short by {}, padding with placeholders",
            target_count - slots.len()
        );
        slots.resize(target_count, DisplaySlot::Placeholder);
    }

    DisplayPool::new(slots)
}

/// Builds display pools from a fixed weight table and length
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    weights: BaseWeights,
    target_count: usize,
}

impl PoolBuilder {
    pub fn new(weights: BaseWeights, target_count: usize) -> Self {
        Self {
            weights,
            target_count,
        }
    }

    /// Per-tier counts for this builder's weights
    pub fn counts(&self) -> TierCounts {
        distribute(&self.weights, self.target_count)
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn build<R: Rng + ?Sized>(&self, catalog: &Catalog, rng: &mut R) -> DisplayPool {
        build_pool(&self.counts(), catalog, self.target_count, rng)
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new(BaseWeights::default(), DEFAULT_TARGET_COUNT)
    }
}
