//! Study session over a loaded deck.
//!
//! The session is the host around the pure core: it runs the one
//! load → migrate → persist cycle, filters and pages the card table, and
//! persists progress after each mutation. Migration happens exactly once per
//! load, before any user interaction, and writes back only when the re-keyed
//! map actually differs from what was on disk.

use crate::config::AppConfig;
use crate::deck::{self, Card};
use crate::progress::{self, ProgressMap};
use crate::store;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug)]
pub struct StudySession {
    deck_path: PathBuf,
    cards: Vec<Card>,
    progress: ProgressMap,
    show_studied: bool,
    page_size: usize,
}

impl StudySession {
    /// Load the deck and its persisted progress, migrating legacy keys to
    /// current ids before anything else touches the map.
    pub fn load(deck_path: PathBuf, config: &AppConfig) -> Result<Self> {
        let cards = deck::load_deck(&deck_path)?;
        let loaded = store::load_progress(&deck_path);
        let migrated = progress::migrate(&cards, &loaded);
        if migrated != loaded {
            info!(
                before = loaded.len(),
                after = migrated.len(),
                "Rewrote progress map to current identifiers"
            );
            store::save_progress(&deck_path, &migrated);
        }
        let show_studied = store::load_show_studied(&deck_path).unwrap_or(config.show_studied);

        Ok(StudySession {
            deck_path,
            cards,
            progress: migrated,
            show_studied,
            page_size: config.page_size.max(1),
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn is_studied(&self, id: &str) -> bool {
        self.progress.is_studied(id)
    }

    pub fn studied_count(&self) -> usize {
        self.progress.len()
    }

    pub fn show_studied(&self) -> bool {
        self.show_studied
    }

    /// Cards visible in the table: everything, or only the unstudied ones
    /// when the studied rows are hidden.
    pub fn visible_cards(&self) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|card| self.show_studied || !self.progress.is_studied(&card.id))
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.visible_cards().len().div_ceil(self.page_size).max(1)
    }

    /// One page of visible cards; out-of-range pages clamp to the last one.
    pub fn page(&self, page: usize) -> Vec<&Card> {
        let visible = self.visible_cards();
        let page = page.min(self.page_count().saturating_sub(1));
        visible
            .into_iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    /// Case-insensitive substring search over both text fields.
    pub fn search(&self, query: &str) -> Vec<&Card> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.visible_cards()
            .into_iter()
            .filter(|card| {
                card.korean.to_lowercase().contains(&query)
                    || card.english.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Mark a card studied and persist. Unknown ids are rejected so the
    /// stored map never picks up stray keys.
    pub fn mark(&mut self, id: &str) -> bool {
        if !self.cards.iter().any(|card| card.id == id) {
            warn!(id, "Refusing to mark unknown card id");
            return false;
        }
        if self.progress.mark(id) {
            store::save_progress(&self.deck_path, &self.progress);
            return true;
        }
        false
    }

    /// Remove a studied mark and persist. No-op when the id is absent.
    pub fn unmark(&mut self, id: &str) -> bool {
        if self.progress.unmark(id) {
            store::save_progress(&self.deck_path, &self.progress);
            return true;
        }
        false
    }

    /// Drop all studied marks and persist the empty map. The confirmation
    /// prompt lives at the CLI boundary, not here.
    pub fn clear_all(&mut self) {
        self.progress.clear();
        store::save_progress(&self.deck_path, &self.progress);
    }

    pub fn set_show_studied(&mut self, show_studied: bool) {
        self.show_studied = show_studied;
        store::save_show_studied(&self.deck_path, show_studied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn build_test_session(rows: &[(&str, &str, &str)]) -> StudySession {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();
        StudySession {
            deck_path: std::env::temp_dir().join(format!("vocab-session-{nonce}.csv")),
            cards: rows
                .iter()
                .map(|(korean, english, audio)| Card::new(*korean, *english, *audio))
                .collect(),
            progress: ProgressMap::new(),
            show_studied: true,
            page_size: 2,
        }
    }

    fn cleanup(session: &StudySession) {
        let _ = fs::remove_dir_all(store::hash_dir(&session.deck_path));
    }

    #[test]
    fn pagination_clamps_out_of_range_pages() {
        let session = build_test_session(&[
            ("하나", "one", ""),
            ("둘", "two", ""),
            ("셋", "three", ""),
        ]);
        assert_eq!(session.page_count(), 2);
        assert_eq!(session.page(0).len(), 2);
        assert_eq!(session.page(1).len(), 1);
        assert_eq!(session.page(99).len(), 1);
        cleanup(&session);
    }

    #[test]
    fn hiding_studied_rows_filters_the_table() {
        let mut session = build_test_session(&[("하나", "one", ""), ("둘", "two", "")]);
        let first_id = session.cards[0].id.clone();
        assert!(session.mark(&first_id));

        session.show_studied = false;
        let visible = session.visible_cards();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].english, "two");
        cleanup(&session);
    }

    #[test]
    fn search_matches_either_text_field_case_insensitively() {
        let session = build_test_session(&[
            ("안녕하세요", "Hello", ""),
            ("감사합니다", "Thank you", ""),
        ]);
        assert_eq!(session.search("HELLO").len(), 1);
        assert_eq!(session.search("감사").len(), 1);
        assert_eq!(session.search("  ").len(), 0);
        assert_eq!(session.search("nothing").len(), 0);
        cleanup(&session);
    }

    #[test]
    fn mark_rejects_unknown_ids() {
        let mut session = build_test_session(&[("하나", "one", "")]);
        assert!(!session.mark("not-a-card"));
        assert_eq!(session.studied_count(), 0);
        cleanup(&session);
    }

    #[test]
    fn mark_and_unmark_persist_across_reload() {
        let mut session = build_test_session(&[("하나", "one", ""), ("둘", "two", "")]);
        let id = session.cards[0].id.clone();
        assert!(session.mark(&id));
        assert!(!session.mark(&id));

        let reloaded = store::load_progress(&session.deck_path);
        assert!(reloaded.is_studied(&id));

        assert!(session.unmark(&id));
        assert!(!session.unmark(&id));
        let reloaded = store::load_progress(&session.deck_path);
        assert!(reloaded.is_empty());
        cleanup(&session);
    }

    #[test]
    fn clear_all_empties_persisted_state() {
        let mut session = build_test_session(&[("하나", "one", "")]);
        let id = session.cards[0].id.clone();
        session.mark(&id);
        session.clear_all();

        assert_eq!(session.studied_count(), 0);
        assert!(store::load_progress(&session.deck_path).is_empty());
        cleanup(&session);
    }

    #[test]
    fn load_migrates_legacy_keys_once() {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();
        let deck_path = std::env::temp_dir().join(format!("vocab-load-{nonce}.csv"));
        fs::write(&deck_path, "안녕하세요,Hello,a.mp3\n감사합니다,Thank you,\n")
            .expect("write deck");

        // Index-generation key for the first card.
        let mut legacy = ProgressMap::new();
        legacy.mark("0");
        store::save_progress(&deck_path, &legacy);

        let session =
            StudySession::load(deck_path.clone(), &AppConfig::default()).expect("load session");
        let first_id = session.cards()[0].id.clone();
        assert!(session.is_studied(&first_id));
        assert_eq!(session.studied_count(), 1);

        // The rewritten map is what's on disk now; a second load is a no-op.
        let on_disk = store::load_progress(&deck_path);
        assert!(on_disk.is_studied(&first_id));
        assert_eq!(progress::migrate(session.cards(), &on_disk), on_disk);

        let _ = fs::remove_dir_all(store::hash_dir(&deck_path));
        let _ = fs::remove_file(&deck_path);
    }
}
