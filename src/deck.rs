//! Deck loading.
//!
//! A deck is a CSV file of `korean,english,audio` rows. Cards are rebuilt from
//! the raw text on every load; only the source file and the progress map are
//! persisted. Rows missing either text field never reach the id deriver.

use crate::identity::derive_id;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// A single vocabulary entry. The id is derived from the normalized text
/// fields and is never settable independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub korean: String,
    pub english: String,
    pub audio: String,
}

impl Card {
    pub fn new(
        korean: impl Into<String>,
        english: impl Into<String>,
        audio: impl Into<String>,
    ) -> Self {
        let korean = korean.into();
        let english = english.into();
        let id = derive_id(&korean, &english);
        Card {
            id,
            korean,
            english,
            audio: audio.into(),
        }
    }
}

/// Load a deck from disk and parse it into cards.
pub fn load_deck(path: &Path) -> Result<Vec<Card>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read deck at {}", path.display()))?;
    let cards = parse_deck(&data);
    info!(path = %path.display(), cards = cards.len(), "Loaded deck");
    Ok(cards)
}

/// Parse CSV text into cards, skipping a header row and any row with an empty
/// korean or english field. Never fails: unreadable rows are dropped with a
/// warning so one bad line cannot take the whole deck down.
pub fn parse_deck(data: &str) -> Vec<Card> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut cards = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(row = idx + 1, "Skipping unparseable CSV row: {err}");
                continue;
            }
        };

        let korean = row.get(0).unwrap_or("").trim();
        let english = row.get(1).unwrap_or("").trim();
        let audio = row.get(2).unwrap_or("").trim();

        if idx == 0 && is_header(korean, english) {
            continue;
        }
        if korean.is_empty() || english.is_empty() {
            warn!(row = idx + 1, "Skipping row with a missing text field");
            continue;
        }

        cards.push(Card::new(korean, english, audio));
    }
    cards
}

fn is_header(first: &str, second: &str) -> bool {
    first.eq_ignore_ascii_case("korean") && second.eq_ignore_ascii_case("english")
}
