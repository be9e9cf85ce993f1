//! Studied-state tracking and legacy-key migration.
//!
//! The progress map is a flat id → `true` dictionary: presence means studied,
//! absence means not studied, and explicit `false` entries are never kept.
//! Over the tool's history the keys have gone through four generations
//! (positional index, audio filename, legacy-simple hash, current hash);
//! `migrate` re-keys an old map onto current ids without dropping a mark.

use crate::deck::Card;
use crate::identity::derive_id_legacy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted studied-state, keyed by card id. Serializes as a flat JSON
/// object of id → `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressMap(BTreeMap<String, bool>);

impl ProgressMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_studied(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    /// Mark an id as studied. Returns false when the entry was already set.
    pub fn mark(&mut self, id: &str) -> bool {
        self.0.insert(id.to_string(), true) != Some(true)
    }

    /// Remove a studied mark. Returns false when the id was absent.
    pub fn unmark(&mut self, id: &str) -> bool {
        self.0.remove(id).is_some()
    }

    /// Drop every mark. Destructive; the caller gates this behind explicit
    /// confirmation.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of studied entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop explicit `false` entries left behind by older writers. The
    /// in-memory invariant is presence-only.
    pub fn retain_studied(&mut self) {
        self.0.retain(|_, studied| *studied);
    }
}

/// Re-key a progress map onto current card ids.
///
/// For each card, the first matching source wins, in this fixed order:
/// current id, legacy-simple hash, audio filename, positional index. The
/// order is historical behavior and must not be reordered, since it decides
/// which mark survives for ambiguous records. The output holds only current
/// ids; stray keys with no matching card do not survive.
///
/// Pure: callers persist the result only when it differs from `progress`,
/// which keeps a per-load migration pass from rewriting an already-migrated
/// map.
pub fn migrate(cards: &[Card], progress: &ProgressMap) -> ProgressMap {
    let mut rewritten = ProgressMap::new();
    for (idx, card) in cards.iter().enumerate() {
        let studied = progress.is_studied(&card.id)
            || progress.is_studied(&derive_id_legacy(&card.korean, &card.english))
            || (!card.audio.is_empty() && progress.is_studied(&card.audio))
            || progress.is_studied(&idx.to_string());
        if studied {
            rewritten.mark(&card.id);
        }
    }
    rewritten
}
