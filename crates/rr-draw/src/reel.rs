//! Reel Engine: circular cursor that lands on a predetermined winner
//!
//! ```text
//! Idle ──spin()──► Sliding(1) ─► Settling(1) ─► Sliding(2) ─► … ─► Sliding(n) ─► Idle
//! ```
//!
//! Each step slides the strip by one slot over that step's duration, then
//! advances the cursor, drops the visual offset back to zero and waits the
//! settle interval. The engine never sleeps: time is fed in through
//! [`ReelEngine::advance`], usually by a [`crate::scheduler::StepTimer`].
//! There is no cancel path; a spin always runs to its last step.
//!
//! The display pool itself is never modified. When the outcome has no slot
//! of its own, it is shown on top of the landing slot until the next spin.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::cue::{self, CuePlayer, SilentCue};
use crate::error::{DrawError, Result};
use crate::pool::{DisplayPool, DisplaySlot};
use crate::rarity::Modifier;
use crate::settlement::{SettlementClient, SettlementError, SettlementReceipt, SettlementRequest};
use crate::timing::ReelTiming;

/// Default number of simultaneously visible slots
pub const DEFAULT_VISIBLE_COUNT: usize = 5;

/// Default number of cosmetic full laps before landing
pub const DEFAULT_EXTRA_ROTATIONS: usize = 3;

/// Reel geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Visible slots; the middle one (`visible_count / 2`) is the payline
    pub visible_count: usize,
    /// Full laps added before the landing lap
    pub extra_rotations: usize,
}

impl ReelConfig {
    /// Offset of the payline from the cursor
    #[inline]
    pub fn center_offset(&self) -> usize {
        self.visible_count / 2
    }
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            visible_count: DEFAULT_VISIBLE_COUNT,
            extra_rotations: DEFAULT_EXTRA_ROTATIONS,
        }
    }
}

/// How the outcome was mapped onto a display slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinnerMapping {
    /// The outcome itself is in the pool
    Exact,
    /// Not in the pool; landed on a slot of the same tier
    SameTier,
    /// Nothing of that tier either; landed on a placeholder or a full lap
    Neutral,
}

/// Where and how far a spin goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinPlan {
    /// Cursor when the spin started
    pub start_cursor: usize,
    /// Payline position when the spin started
    pub center: usize,
    /// Slot the payline stops on
    pub winner_index: usize,
    pub mapping: WinnerMapping,
    /// Always in `1..=pool_len`
    pub steps_to_winner: usize,
    /// `extra_rotations * pool_len + steps_to_winner`
    pub total_steps: usize,
}

/// Work out the landing slot and step count for `outcome`.
///
/// The landing slot is the first matching position reached moving forward
/// from the payline, trying in turn: the outcome's own id, any item of the
/// outcome's tier, any placeholder. A match on the payline itself counts as
/// a full lap. If nothing matches, the reel does a full lap back to the
/// payline.
pub fn plan_spin(
    pool: &DisplayPool,
    cursor: usize,
    config: &ReelConfig,
    outcome: &CatalogItem,
) -> Result<SpinPlan> {
    let len = pool.len();
    if len == 0 {
        return Err(DrawError::EmptyPool);
    }

    let start_cursor = cursor % len;
    let center = (start_cursor + config.center_offset()) % len;

    let (winner_index, mapping) = pool
        .next_position(center, |s| s.item().is_some_and(|i| i.id == outcome.id))
        .map(|idx| (idx, WinnerMapping::Exact))
        .or_else(|| {
            pool.next_position(center, |s| s.item().is_some_and(|i| i.tier == outcome.tier))
                .map(|idx| (idx, WinnerMapping::SameTier))
        })
        .or_else(|| {
            pool.next_position(center, DisplaySlot::is_placeholder)
                .map(|idx| (idx, WinnerMapping::Neutral))
        })
        .unwrap_or((center, WinnerMapping::Neutral));

    let steps_to_winner = match (winner_index + len - center) % len {
        0 => len,
        steps => steps,
    };
    let total_steps = config.extra_rotations * len + steps_to_winner;

    Ok(SpinPlan {
        start_cursor,
        center,
        winner_index,
        mapping,
        steps_to_winner,
        total_steps,
    })
}

/// A draw to animate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinRequest {
    /// The already-resolved winner
    pub outcome: CatalogItem,
    pub modifier: Modifier,
    pub draw_context_id: Option<String>,
}

/// Result of a spin request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinStart {
    Started(SpinPlan),
    /// A spin is in progress; the request was ignored
    AlreadySpinning,
}

/// Emitted by [`ReelEngine::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReelEvent {
    /// Cursor moved one slot
    StepAdvanced { step: usize, cursor: usize },
    /// Last step finished; the winner is on the payline
    Landed {
        outcome: CatalogItem,
        winner_index: usize,
        cursor: usize,
    },
    /// Ledger accepted the draw
    Settled { receipt: SettlementReceipt },
    /// Ledger call failed after the reveal
    SettlementFailed {
        request: SettlementRequest,
        error: SettlementError,
    },
}

/// Read-only snapshot of the reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelState {
    pub cursor: usize,
    pub animating: bool,
    /// Visible slots starting at the cursor
    pub visible_window: Vec<DisplaySlot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Sliding toward the next slot; `step` is 1-based
    Sliding { step: usize, elapsed_ms: f64 },
    /// Offset reset committed, waiting before `step + 1`
    Settling { step: usize, elapsed_ms: f64 },
}

struct ActiveSpin {
    request: SpinRequest,
    plan: SpinPlan,
    durations: Vec<f64>,
}

/// Circular reel over a display pool
pub struct ReelEngine {
    pool: DisplayPool,
    cursor: usize,
    phase: Phase,
    active: Option<ActiveSpin>,
    /// Outcome rendered over a pool slot: `(position, slot)`
    landing_override: Option<(usize, DisplaySlot)>,
    config: ReelConfig,
    timing: ReelTiming,
    cue: Box<dyn CuePlayer>,
    settlement: Box<dyn SettlementClient>,
}

impl ReelEngine {
    /// Create an idle reel at cursor 0 with default geometry and timing
    pub fn new(pool: DisplayPool, settlement: Box<dyn SettlementClient>) -> Self {
        Self {
            pool,
            cursor: 0,
            phase: Phase::Idle,
            active: None,
            landing_override: None,
            config: ReelConfig::default(),
            timing: ReelTiming::default(),
            cue: Box::new(SilentCue),
            settlement,
        }
    }

    /// Builder: set geometry
    pub fn with_config(mut self, config: ReelConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: set timing
    pub fn with_timing(mut self, timing: ReelTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Builder: set the step cue player
    pub fn with_cue(mut self, cue: Box<dyn CuePlayer>) -> Self {
        self.cue = cue;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// The display pool as built, without any landing override
    pub fn pool(&self) -> &DisplayPool {
        &self.pool
    }

    /// Slot rendered at `position` (wraps), landing override included
    pub fn rendered_slot(&self, position: usize) -> Option<&DisplaySlot> {
        let len = self.pool.len();
        if len == 0 {
            return None;
        }
        match &self.landing_override {
            Some((index, slot)) if *index == position % len => Some(slot),
            _ => self.pool.slot_at(position),
        }
    }

    pub fn config(&self) -> &ReelConfig {
        &self.config
    }

    pub fn timing(&self) -> &ReelTiming {
        &self.timing
    }

    /// Plan of the spin in progress
    pub fn active_plan(&self) -> Option<&SpinPlan> {
        self.active.as_ref().map(|a| &a.plan)
    }

    /// `(current step, total steps)` while spinning
    pub fn progress(&self) -> Option<(usize, usize)> {
        let total = self.active.as_ref()?.plan.total_steps;
        match self.phase {
            Phase::Sliding { step, .. } => Some((step - 1, total)),
            Phase::Settling { step, .. } => Some((step, total)),
            Phase::Idle => None,
        }
    }

    /// Slots currently in view, starting at the cursor
    pub fn visible_window(&self) -> Vec<&DisplaySlot> {
        self.rendered_window(self.config.visible_count)
    }

    /// Visible slots plus the one sliding in
    pub fn buffered_window(&self) -> Vec<&DisplaySlot> {
        self.rendered_window(self.config.visible_count + 1)
    }

    fn rendered_window(&self, count: usize) -> Vec<&DisplaySlot> {
        (0..count)
            .filter_map(|i| self.rendered_slot(self.cursor + i))
            .collect()
    }

    /// Slot on the payline
    pub fn center_slot(&self) -> Option<&DisplaySlot> {
        self.rendered_slot(self.cursor + self.config.center_offset())
    }

    /// Fraction of a slot width the strip has slid in the current step
    pub fn visual_offset(&self) -> f64 {
        match self.phase {
            Phase::Sliding { step, elapsed_ms } => {
                let duration = self.step_duration(step);
                if duration > 0.0 {
                    (elapsed_ms / duration).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            _ => 0.0,
        }
    }

    pub fn state(&self) -> ReelState {
        ReelState {
            cursor: self.cursor,
            animating: self.is_animating(),
            visible_window: self.visible_window().into_iter().cloned().collect(),
        }
    }

    /// Time until the current phase ends, `None` when idle
    pub fn next_wakeup_ms(&self) -> Option<f64> {
        match self.phase {
            Phase::Idle => None,
            Phase::Sliding { step, elapsed_ms } => {
                Some((self.step_duration(step) - elapsed_ms).max(0.0))
            }
            Phase::Settling { elapsed_ms, .. } => {
                Some((self.timing.settle_interval_ms - elapsed_ms).max(0.0))
            }
        }
    }

    /// Swap in a rebuilt display pool; refused mid-spin
    pub fn replace_pool(&mut self, pool: DisplayPool) -> Result<()> {
        if self.is_animating() {
            return Err(DrawError::Spinning);
        }
        self.cursor = if pool.is_empty() {
            0
        } else {
            self.cursor % pool.len()
        };
        self.landing_override = None;
        self.pool = pool;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start animating toward `request.outcome`.
    ///
    /// Ignored while a spin is running. When the outcome is not itself in
    /// the pool, it is rendered over the landing slot so the reel stops on
    /// it; the pool is left untouched.
    pub fn spin(&mut self, request: SpinRequest) -> Result<SpinStart> {
        if self.is_animating() {
            log::debug!("Spin request ignored, reel is animating");
            return Ok(SpinStart::AlreadySpinning);
        }

        let plan = plan_spin(&self.pool, self.cursor, &self.config, &request.outcome)?;
        self.landing_override = if plan.mapping == WinnerMapping::Exact {
            None
        } else {
            log::debug!(
                "Outcome {} not in display pool, landing on slot {} ({:?})",
                request.outcome.id,
                plan.winner_index,
                plan.mapping
            );
            Some((plan.winner_index, DisplaySlot::Item(request.outcome.clone())))
        };

        log::info!(
            "Spin started: {} steps toward {} ({})",
            plan.total_steps,
            request.outcome.id,
            request.modifier
        );

        self.active = Some(ActiveSpin {
            durations: self.timing.schedule(plan.total_steps),
            plan: plan.clone(),
            request,
        });
        self.phase = Phase::Sliding {
            step: 1,
            elapsed_ms: 0.0,
        };

        Ok(SpinStart::Started(plan))
    }

    /// Feed `dt_ms` of elapsed time, running every phase it covers
    pub fn advance(&mut self, dt_ms: f64) -> Vec<ReelEvent> {
        let mut events = Vec::new();
        let mut budget = dt_ms.max(0.0);

        loop {
            match self.phase {
                Phase::Idle => break,
                Phase::Sliding { step, elapsed_ms } => {
                    let remaining = self.step_duration(step) - elapsed_ms;
                    if budget < remaining {
                        self.phase = Phase::Sliding {
                            step,
                            elapsed_ms: elapsed_ms + budget,
                        };
                        break;
                    }
                    budget -= remaining.max(0.0);
                    self.complete_step(step, &mut events);
                }
                Phase::Settling { step, elapsed_ms } => {
                    let remaining = self.timing.settle_interval_ms - elapsed_ms;
                    if budget < remaining {
                        self.phase = Phase::Settling {
                            step,
                            elapsed_ms: elapsed_ms + budget,
                        };
                        break;
                    }
                    budget -= remaining.max(0.0);
                    self.phase = Phase::Sliding {
                        step: step + 1,
                        elapsed_ms: 0.0,
                    };
                }
            }
        }

        events
    }

    fn step_duration(&self, step: usize) -> f64 {
        self.active
            .as_ref()
            .and_then(|a| a.durations.get(step - 1))
            .copied()
            .unwrap_or(0.0)
    }

    fn complete_step(&mut self, step: usize, events: &mut Vec<ReelEvent>) {
        let len = self.pool.len();
        self.cursor = (self.cursor + 1) % len;
        cue::trigger(self.cue.as_mut());
        events.push(ReelEvent::StepAdvanced {
            step,
            cursor: self.cursor,
        });

        let total_steps = self
            .active
            .as_ref()
            .map_or(step, |a| a.plan.total_steps);
        if step >= total_steps {
            self.finish(events);
        } else {
            self.phase = Phase::Settling {
                step,
                elapsed_ms: 0.0,
            };
        }
    }

    fn finish(&mut self, events: &mut Vec<ReelEvent>) {
        self.phase = Phase::Idle;
        let Some(ActiveSpin { request, plan, .. }) = self.active.take() else {
            return;
        };

        let len = self.pool.len();
        let offset = self.config.center_offset() % len;
        let landing_cursor = (plan.winner_index + len - offset) % len;
        if self.cursor != landing_cursor {
            log::warn!(
                "Reel stopped at cursor {} but slot {} needs cursor {}, correcting",
                self.cursor,
                plan.winner_index,
                landing_cursor
            );
            self.cursor = landing_cursor;
        }

        log::info!(
            "Reel landed on {} at slot {}",
            request.outcome.id,
            plan.winner_index
        );
        events.push(ReelEvent::Landed {
            outcome: request.outcome.clone(),
            winner_index: plan.winner_index,
            cursor: self.cursor,
        });

        let settlement = SettlementRequest {
            modifier: request.modifier,
            winning_item_id: request.outcome.id,
            draw_context_id: request.draw_context_id,
        };
        match self.settlement.settle(&settlement) {
            Ok(receipt) => events.push(ReelEvent::Settled { receipt }),
            Err(error) => {
                log::warn!(
                    "Settlement failed for {} after reveal: {}",
                    settlement.winning_item_id,
                    error
                );
                events.push(ReelEvent::SettlementFailed {
                    request: settlement,
                    error,
                });
            }
        }
    }
}
