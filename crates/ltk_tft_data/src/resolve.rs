//! Placeholder resolution against effect tables.
//!
//! # Algorithm
//!
//! A template is scanned left to right for non-overlapping `@…@` pairs that do
//! not span a line break. Each token is resolved on its own (occurrences are
//! never cached) through the following chain, stopping at the first hit:
//!
//! 1. Normalize the token into a key and optional amplifier ([`normalize`]).
//! 2. Look the key up in a case-folded view of the effect table.
//! 3. Try the vendor prefixes `base<key>` and `flat<key>`.
//! 4. Try the hashed key `{xxxxxxxx}`.
//! 5. If override rules were supplied, map the raw token to a substitute key
//!    and retry step 2 with it.
//! 6. Fall back to [`UNKNOWN`].
//!
//! Steps 2-4 run for the plain name first and then for the name with its
//! decoration words removed, when that differs.
//!
//! A found sequence is amplified and formatted elementwise, then collapsed to a
//! single value when every element renders the same, or joined with `" / "`.
//! Elements that are not scalars render as [`UNKNOWN`]; a sequence without any
//! scalar counts as unresolved.

use crate::effects::EffectTable;
use crate::format::format_number;
use crate::key::{hashed_key, normalize, NormalizedKey};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Text substituted for a token no lookup could satisfy.
pub const UNKNOWN: &str = "?";

/// Prefixes the detail feed uses for base and bonus stat variants.
const KEY_PREFIXES: [&str; 2] = ["base", "flat"];

static TOKEN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"@.*?@").expect("token pattern is valid"));

/// Outcome of resolving one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    /// The template with every token replaced.
    pub text: String,
    /// Raw tokens that resolved to [`UNKNOWN`], in order of appearance.
    pub unresolved: Vec<String>,
}

impl Resolved {
    fn unchanged(template: &str) -> Self {
        Self {
            text: template.to_string(),
            unresolved: Vec::new(),
        }
    }
}

/// Per-champion mapping from a raw token to the effect key that should be used.
///
/// Loaded from hand-maintained JSON objects such as
/// `{ "@ModifiedDamage@": "TotalDamage" }`. Token matching ignores case and
/// the `@` delimiters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct OverrideRules {
    rules: HashMap<String, String>,
}

impl OverrideRules {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Substitute key for a raw token, if one was declared.
    pub fn substitute(&self, raw_token: &str) -> Option<&str> {
        self.rules.get(&rule_key(raw_token)).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for OverrideRules {
    fn from(map: HashMap<String, String>) -> Self {
        let rules = map
            .into_iter()
            .map(|(token, key)| (rule_key(&token), key))
            .collect();
        Self { rules }
    }
}

fn rule_key(token: &str) -> String {
    token.trim().trim_matches('@').to_lowercase()
}

/// Case-folded view of an effect table. Later names win when two fold together.
struct FoldedTable<'a> {
    values: HashMap<String, &'a Value>,
}

impl<'a> FoldedTable<'a> {
    fn new(table: &'a EffectTable) -> Self {
        let mut values = HashMap::with_capacity(table.len());
        for (name, value) in table.iter() {
            values.insert(name.to_lowercase(), value);
        }
        Self { values }
    }

    /// Look up a lowercase key. Nulls and empty sequences count as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.values.get(key).copied().filter(|value| match value {
            Value::Null => false,
            Value::Array(items) => !items.is_empty(),
            _ => true,
        })
    }

    fn find(&self, key: &NormalizedKey) -> Option<&'a Value> {
        key.candidates().find_map(|candidate| {
            self.get(candidate)
                .or_else(|| {
                    KEY_PREFIXES
                        .iter()
                        .find_map(|prefix| self.get(&format!("{prefix}{candidate}")))
                })
                .or_else(|| self.get(&hashed_key(candidate)))
        })
    }
}

/// Resolve every placeholder in `template`.
///
/// Returns the template unchanged when `table` is `None`.
pub fn resolve(
    template: &str,
    table: Option<&EffectTable>,
    rules: Option<&OverrideRules>,
) -> Resolved {
    let Some(table) = table else {
        return Resolved::unchanged(template);
    };

    let folded = FoldedTable::new(table);
    let mut resolved = Resolved {
        text: String::with_capacity(template.len()),
        unresolved: Vec::new(),
    };

    let mut cursor = 0;
    for token in TOKEN.find_iter(template) {
        resolved.text.push_str(&template[cursor..token.start()]);
        cursor = token.end();

        match resolve_token(token.as_str(), &folded, rules) {
            Some(value) => resolved.text.push_str(&value),
            None => {
                resolved.text.push_str(UNKNOWN);
                resolved.unresolved.push(token.as_str().to_string());
            }
        }
    }
    resolved.text.push_str(&template[cursor..]);

    resolved
}

fn resolve_token(
    raw: &str,
    table: &FoldedTable<'_>,
    rules: Option<&OverrideRules>,
) -> Option<String> {
    let key = normalize(raw);

    let value = table.find(&key).or_else(|| {
        rules
            .and_then(|rules| rules.substitute(raw))
            .and_then(|substitute| table.get(&substitute.to_lowercase()))
    })?;

    render(value, key.amplifier)
}

fn render(value: &Value, amplifier: Option<f64>) -> Option<String> {
    match value {
        Value::Array(items) => {
            let rendered: Vec<Option<String>> = items
                .iter()
                .map(|item| render_scalar(item, amplifier))
                .collect();
            if rendered.iter().all(Option::is_none) {
                return None;
            }

            let rendered: Vec<String> = rendered
                .into_iter()
                .map(|item| item.unwrap_or_else(|| UNKNOWN.to_string()))
                .collect();
            let first = rendered.first()?;
            if rendered.iter().all(|item| item == first) {
                Some(first.clone())
            } else {
                Some(rendered.join(" / "))
            }
        }
        scalar => render_scalar(scalar, amplifier),
    }
}

fn render_scalar(value: &Value, amplifier: Option<f64>) -> Option<String> {
    match value {
        Value::Number(number) => {
            let number = number.as_f64()?;
            Some(format_number(number * amplifier.unwrap_or(1.0)))
        }
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
