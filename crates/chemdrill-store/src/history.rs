//! Per-scope score history with top-N retention.
//!
//! Each `(mode, range)` scope keeps its best five scores, sorted
//! descending. Only the truncated list is persisted; displaced entries are
//! discarded. Durable write failures degrade to a no-op write, never an
//! error, so losing one history write cannot abort a session.

use std::sync::Arc;

use chemdrill_core::model::{HistoryScope, ScoreHistoryEntry};

use crate::durable::DurableStore;

/// How many entries each scope retains.
pub const HISTORY_CAP: usize = 5;

const KEY_PREFIX: &str = "chemdrill_history";

/// Ranked score lists keyed by `(mode, rangeKey)`.
pub struct HistoryStore {
    durable: Arc<dyn DurableStore>,
}

impl HistoryStore {
    pub fn new(durable: Arc<dyn DurableStore>) -> Self {
        Self { durable }
    }

    fn key(scope: &HistoryScope) -> String {
        format!("{KEY_PREFIX}_{scope}")
    }

    fn load(&self, scope: &HistoryScope) -> Vec<ScoreHistoryEntry> {
        let Some(raw) = self.durable.get(&Self::key(scope)) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(scope = %scope, error = %e, "history list is corrupt, starting over");
                Vec::new()
            }
        }
    }

    /// Whether `score` would beat the scope's current best.
    ///
    /// Must be asked **before** [`record`](Self::record): once the entry is
    /// persisted it is indistinguishable from the prior best.
    pub fn is_new_record(&self, scope: &HistoryScope, score: u32) -> bool {
        match self.load(scope).first() {
            Some(best) => score > best.score,
            None => true,
        }
    }

    /// Append an entry, re-rank the scope, and persist the top
    /// [`HISTORY_CAP`] entries.
    pub fn record(&self, scope: &HistoryScope, entry: ScoreHistoryEntry) {
        let mut entries = self.load(scope);
        entries.push(entry);
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(HISTORY_CAP);

        match serde_json::to_string(&entries) {
            Ok(json) => {
                if let Err(e) = self.durable.set(&Self::key(scope), &json) {
                    tracing::warn!(scope = %scope, error = %e, "history write failed, score not persisted");
                }
            }
            Err(e) => {
                tracing::warn!(scope = %scope, error = %e, "history serialization failed");
            }
        }
    }

    /// The scope's best entries, highest score first, at most `n` and never
    /// more than the retained size.
    pub fn top_n(&self, scope: &HistoryScope, n: usize) -> Vec<ScoreHistoryEntry> {
        let mut entries = self.load(scope);
        entries.truncate(n.min(HISTORY_CAP));
        entries
    }
}
