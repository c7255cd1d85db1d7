//! Settlement contract: committing a finished draw to the reward ledger
//!
//! Settlement happens once per draw, after the reel has already revealed
//! the winner. A failure is reported but never retracts the reveal and is
//! not retried; reconciling consumed keys is left to the ledger.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rarity::Modifier;

/// Outbound commit for one completed draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub modifier: Modifier,
    pub winning_item_id: String,
    pub draw_context_id: Option<String>,
}

/// Ledger acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// Ledger entry id
    pub entry_id: u64,
    /// Keys left after this draw
    pub keys_remaining: u32,
}

/// Settlement errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// Ledger refused the commit
    #[error("Settlement rejected: {reason}")]
    Rejected { reason: String },

    /// Ledger could not be reached
    #[error("Settlement unavailable: {0}")]
    Unavailable(String),
}

/// Backend that persists draw outcomes
pub trait SettlementClient {
    fn settle(
        &mut self,
        request: &SettlementRequest,
    ) -> std::result::Result<SettlementReceipt, SettlementError>;
}

/// One committed draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub request: SettlementRequest,
}

#[derive(Debug, Default)]
struct LedgerState {
    keys: u32,
    entries: Vec<LedgerEntry>,
    next_id: u64,
    outage: Option<String>,
}

/// In-process ledger with a key balance.
///
/// Cloning gives another handle to the same ledger, so a caller can keep
/// one while the reel engine owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Ledger holding `keys` draw keys
    pub fn with_keys(keys: u32) -> Self {
        let ledger = Self::default();
        ledger.state.lock().keys = keys;
        ledger
    }

    pub fn keys(&self) -> u32 {
        self.state.lock().keys
    }

    pub fn grant_keys(&self, keys: u32) {
        let mut state = self.state.lock();
        state.keys = state.keys.saturating_add(keys);
    }

    /// Committed entries, oldest first
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().entries.clone()
    }

    /// Make the next settle call fail as unreachable
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state.lock().outage = Some(reason.into());
    }
}

impl SettlementClient for InMemoryLedger {
    fn settle(
        &mut self,
        request: &SettlementRequest,
    ) -> std::result::Result<SettlementReceipt, SettlementError> {
        let mut state = self.state.lock();

        if let Some(reason) = state.outage.take() {
            return Err(SettlementError::Unavailable(reason));
        }
        if state.keys == 0 {
            return Err(SettlementError::Rejected {
                reason: "no keys remaining".into(),
            });
        }

        state.keys -= 1;
        state.next_id += 1;
        let id = state.next_id;
        state.entries.push(LedgerEntry {
            id,
            request: request.clone(),
        });

        Ok(SettlementReceipt {
            entry_id: id,
            keys_remaining: state.keys,
        })
    }
}
