//! Stable card identifiers.
//!
//! A card's id is a 32-bit FNV-1a hash of its normalized text fields, rendered
//! in base-36. The exact procedure is a durable contract: every persisted
//! progress map is keyed by these values, so the hash must produce the same
//! id on any platform, forever. In particular the hash runs over UTF-16 code
//! units, not bytes, to stay key-compatible with progress maps written by
//! earlier deployments of this tool.

use crate::normalizer::normalize;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// Derive the current-scheme identifier for a card's text fields.
pub fn derive_id(korean: &str, english: &str) -> String {
    let key = format!("{}|{}", normalize(korean), normalize(english));
    to_base36(fnv1a_32(&key))
}

/// Derive the obsolete "simple" identifier: trim + lowercase only, no NFKC,
/// no punctuation stripping. Used exclusively for migration lookups.
pub fn derive_id_legacy(korean: &str, english: &str) -> String {
    let key = format!(
        "{}|{}",
        korean.trim().to_lowercase(),
        english.trim().to_lowercase()
    );
    to_base36(fnv1a_32(&key))
}

fn fnv1a_32(key: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for unit in key.encode_utf16() {
        hash ^= u32::from(unit);
        // FNV prime multiply via the shift-and-add identity, truncated to u32
        // at every step. All shifts read the pre-update accumulator.
        hash = hash
            .wrapping_add(hash << 1)
            .wrapping_add(hash << 4)
            .wrapping_add(hash << 7)
            .wrapping_add(hash << 8)
            .wrapping_add(hash << 24);
    }
    hash
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    buf.iter().rev().collect()
}
