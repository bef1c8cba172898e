//! Multi-tier row expansion for trait descriptions.
//!
//! Trait descriptions describe every tier with one row of markup:
//!
//! ```text
//! Allies gain Armor.<expandrow>(@MinUnits@) @Armor@ Armor</expandrow>
//! ```
//!
//! The first `<expandrow>` block is duplicated once per tier (renamed to
//! `<row>`, copies joined with `<br>`). Every `<row>` segment, in document
//! order, is then resolved against the tier with the same index. Whatever
//! placeholders remain outside of rows are resolved against the first tier.

use crate::effects::EffectTable;
use crate::resolve::{resolve, Resolved};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Separator placed between expanded rows.
pub const ROW_SEPARATOR: &str = "<br>";

static EXPAND_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<expandrow>(.*?)</expandrow>").expect("expandrow pattern is valid")
});

static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<row>.*?</row>").expect("row pattern is valid"));

/// Expand row markup and resolve the template against per-tier effect tables.
pub fn expand_rows(template: &str, tiers: &[EffectTable]) -> Resolved {
    let expanded = replicate_expandrow(template, tiers.len());

    let empty = EffectTable::new();
    let mut unresolved = Vec::new();
    let mut row_index = 0;

    let rows_resolved = ROW.replace_all(&expanded, |row: &Captures<'_>| {
        let table = tiers.get(row_index).unwrap_or(&empty);
        row_index += 1;

        let resolved = resolve(&row[0], Some(table), None);
        unresolved.extend(resolved.unresolved);
        resolved.text
    });

    let mut resolved = resolve(&rows_resolved, Some(tiers.first().unwrap_or(&empty)), None);
    unresolved.append(&mut resolved.unresolved);
    resolved.unresolved = unresolved;
    resolved
}

/// Replace the first `<expandrow>` block with `count` `<row>` copies.
fn replicate_expandrow(template: &str, count: usize) -> String {
    let Some(block) = EXPAND_ROW.captures(template) else {
        return template.to_string();
    };

    let row = format!("<row>{}</row>", &block[1]);
    let rows = vec![row; count].join(ROW_SEPARATOR);

    let range = block.get(0).map(|m| m.range()).unwrap_or_default();
    let mut expanded = String::with_capacity(template.len() + rows.len());
    expanded.push_str(&template[..range.start]);
    expanded.push_str(&rows);
    expanded.push_str(&template[range.end..]);
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn tiers(values: Vec<Value>) -> Vec<EffectTable> {
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap())
            .collect()
    }

    #[test]
    fn test_expandrow_per_tier() {
        let tiers = tiers(vec![
            json!({ "minUnits": 2, "Armor": 20 }),
            json!({ "minUnits": 4, "Armor": 45 }),
            json!({ "minUnits": 6, "Armor": 80 }),
        ]);

        let resolved = expand_rows(
            "Allies gain Armor.<br><expandrow>(@MinUnits@) @Armor@ Armor</expandrow>",
            &tiers,
        );

        assert_eq!(
            resolved.text,
            "Allies gain Armor.<br><row>(2) 20 Armor</row><br><row>(4) 45 Armor</row><br><row>(6) 80 Armor</row>"
        );
        assert_eq!(resolved.text.matches("<row>").count(), 3);
        assert!(resolved.unresolved.is_empty());
    }

    #[test]
    fn test_only_first_expandrow_replicated() {
        let tiers = tiers(vec![json!({ "A": 1 }), json!({ "A": 2 })]);
        let resolved = expand_rows(
            "<expandrow>@A@</expandrow><expandrow>x</expandrow>",
            &tiers,
        );
        assert_eq!(
            resolved.text,
            "<row>1</row><br><row>2</row><expandrow>x</expandrow>"
        );
    }

    #[test]
    fn test_explicit_rows_beyond_tiers() {
        let tiers = tiers(vec![json!({ "Bonus": 10 })]);
        let resolved = expand_rows("<row>@Bonus@</row><row>@Bonus@</row>", &tiers);
        assert_eq!(resolved.text, "<row>10</row><row>?</row>");
        assert_eq!(resolved.unresolved, ["@Bonus@"]);
    }

    #[test]
    fn test_top_level_uses_first_tier() {
        let tiers = tiers(vec![json!({ "Duration": 4, "Heal": 100 }), json!({ "Heal": 200 })]);
        let resolved = expand_rows(
            "For @Duration@ seconds:<row>@Heal@</row><row>@Heal@</row>",
            &tiers,
        );
        assert_eq!(
            resolved.text,
            "For 4 seconds:<row>100</row><row>200</row>"
        );
    }

    #[test]
    fn test_plain_template() {
        let tiers = tiers(vec![json!({ "Damage": 0.5 })]);
        let resolved = expand_rows("Gain @Damage*100@% damage", &tiers);
        assert_eq!(resolved.text, "Gain 50% damage");
    }

    #[test]
    fn test_no_tiers() {
        let resolved = expand_rows("Text <expandrow>@A@</expandrow> @B@", &[]);
        assert_eq!(resolved.text, "Text  ?");
        assert_eq!(resolved.unresolved, ["@B@"]);
    }

    #[test]
    fn test_uppercase_tags() {
        let tiers = tiers(vec![json!({ "A": 1 }), json!({ "A": 2 })]);
        let resolved = expand_rows("<EXPANDROW>@A@</EXPANDROW>", &tiers);
        assert_eq!(resolved.text, "<row>1</row><br><row>2</row>");
    }
}
