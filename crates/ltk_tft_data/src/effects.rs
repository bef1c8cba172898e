//! Effect table flattening.
//!
//! Every entity kind stores its numeric effects differently in the detail feed:
//!
//! - items and augments carry a flat `effects` object
//! - traits carry one effect entry per tier, each with scalar fields
//!   (`minUnits`, `maxUnits`, `style`) and a nested `variables` object
//! - champion abilities carry a list of `{ name, value: [..] }` variables with
//!   one value per star level
//!
//! The functions here reduce each shape to an [`EffectTable`], the single form
//! the placeholder resolver understands.

use crate::catalog::{AbilityVariable, TraitTier};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Star levels shown in ability tooltips (levels 2 through 4 of the value list).
const ABILITY_LEVELS: std::ops::Range<usize> = 1..4;

/// Flat mapping from symbolic name to a scalar or a sequence of values.
///
/// Names keep the case they were declared with; lookups fold case at resolve
/// time. Inserting an existing name replaces its value (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectTable(Map<String, Value>);

impl EffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Merge every entry of `other` into this table, overriding collisions.
    pub fn extend_from(&mut self, other: &Map<String, Value>) {
        for (name, value) in other {
            self.0.insert(name.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for EffectTable {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for EffectTable {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

/// Flatten an item or augment `effects` object.
pub fn flatten_effects(effects: &Map<String, Value>) -> EffectTable {
    let mut table = EffectTable::new();
    table.extend_from(effects);
    table
}

/// Flatten trait tiers into one table per tier, index-aligned with `tiers`.
///
/// Within a tier, `variables` entries win over same-named scalar fields.
pub fn flatten_tiers(tiers: &[TraitTier]) -> Vec<EffectTable> {
    tiers
        .iter()
        .map(|tier| {
            let mut table = EffectTable::new();
            table.extend_from(&tier.fields);
            if let Some(variables) = &tier.variables {
                table.extend_from(variables);
            }
            table
        })
        .collect()
}

/// Flatten champion ability variables, keeping only the displayed star levels.
pub fn flatten_ability(variables: &[AbilityVariable]) -> EffectTable {
    variables
        .iter()
        .map(|variable| (variable.name.clone(), displayed_levels(variable.value.as_ref())))
        .collect()
}

fn displayed_levels(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(levels)) => {
            let start = ABILITY_LEVELS.start.min(levels.len());
            let end = ABILITY_LEVELS.end.min(levels.len());
            Value::Array(levels[start..end].to_vec())
        }
        Some(Value::Null) | None => Value::Array(Vec::new()),
        Some(scalar) => scalar.clone(),
    }
}
