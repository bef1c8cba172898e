//! Placeholder token normalization and hashed key derivation.
//!
//! Description templates reference effect values through tokens such as
//! `@Damage@`, `@ModifiedHeal@` or `@Chance*100@`. Before lookup a token is
//! reduced to a lowercase key and an optional amplifier:
//!
//! - `@Damage@` -> name `damage`, no amplifier
//! - `@ModifiedHeal@` -> name `modifiedheal`, base key `heal`
//! - `@Chance*100@` -> name `chance`, amplifier `100`
//!
//! Some effect tables only publish hashed variable names (`{e40c292c}`), so
//! [`hashed_key`] derives the same form from a plain key.

/// FNV-1a 32-bit offset basis
pub const FNV1A_OFFSET_BASIS: u32 = 0x811c9dc5;

/// FNV-1a 32-bit prime
pub const FNV1A_PRIME: u32 = 0x01000193;

/// Words that decorate a variable name in templates but not in effect tables.
const DECORATIONS: [&str; 3] = ["modified", "total", "scaled"];

/// A placeholder token reduced to its lookup parts.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedKey {
    /// Lowercased name with delimiters and amplifier removed.
    pub name: String,
    /// `name` with decoration words removed. Equal to `name` when there are none.
    pub base_key: String,
    /// Multiplier applied to numeric values before formatting.
    pub amplifier: Option<f64>,
}

impl NormalizedKey {
    /// Candidate keys in lookup order, without duplicates.
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        let base = (self.base_key != self.name).then_some(self.base_key.as_str());
        std::iter::once(self.name.as_str()).chain(base)
    }
}

/// Normalize a raw placeholder token (`@NAME@` or `@NAME*AMPLIFIER@`).
///
/// Malformed tokens still produce a key; it just won't be found in any table.
pub fn normalize(raw_token: &str) -> NormalizedKey {
    let inner = raw_token.trim_matches('@');

    let (name, amplifier) = match inner.split_once('*') {
        Some((name, amp)) => (name, amp.trim().parse::<f64>().ok()),
        None => (inner, None),
    };

    let name = name.trim().to_lowercase();
    let base_key = strip_decorations(&name);

    NormalizedKey {
        name,
        base_key,
        amplifier,
    }
}

/// Remove leading decoration words (`modifiedtotaldamage` -> `damage`).
/// Decorations inside a word (`subtotal`) are part of the name.
fn strip_decorations(name: &str) -> String {
    let mut stripped = name;
    loop {
        let current = stripped;
        match DECORATIONS.iter().find_map(|word| current.strip_prefix(*word)) {
            Some(rest) => stripped = rest,
            None => break,
        }
    }

    if stripped.is_empty() {
        name.to_string()
    } else {
        stripped.to_string()
    }
}

/// Compute the FNV-1a 32-bit hash of a byte slice
pub fn fnv1a32(data: &[u8]) -> u32 {
    let mut hash = FNV1A_OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV1A_PRIME);
    }
    hash
}

/// Hashed form of a key as published by the detail feed: `{xxxxxxxx}`.
pub fn hashed_key(key: &str) -> String {
    format!("{{{:08x}}}", fnv1a32(key.to_lowercase().as_bytes()))
}
