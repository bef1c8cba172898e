//! Source feeds: the release allowlist and the verbose detail catalog.
//!
//! # Allowlist
//!
//! The release manifest (Data Dragon) publishes one feed per kind. Only the
//! keys of each feed's `data` object matter; the key's last `/` segment is
//! the entity ID:
//!
//! ```json
//! { "data": { "Maps/Shipping/Map22/Sets/TFTSet9/Shop/TFT9_Ahri": { … } } }
//! ```
//!
//! # Catalog
//!
//! The detail feed (Community Dragon) is one document per language. Items and
//! augments share the top-level `items` list; champions and traits live in the
//! `setData` entry whose `mutator` matches the active set:
//!
//! ```json
//! {
//!   "items": [{ "apiName": "TFT_Item_BFSword", … }],
//!   "setData": [{ "mutator": "TFTSet9", "champions": […], "traits": […] }]
//! }
//! ```

use crate::entity::EntityKind;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

/// Treat an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Item or augment record from the detail feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub api_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub effects: Map<String, Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub associated_traits: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub incompatible_traits: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub composition: Vec<String>,
    #[serde(default)]
    pub from: Option<Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub unique: bool,
}

/// Trait record from the detail feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitRecord {
    pub api_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub effects: Vec<TraitTier>,
}

/// One tier of a trait (e.g. the 2/4/6 unit breakpoints).
#[derive(Debug, Clone, Deserialize)]
pub struct TraitTier {
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
    /// Scalar tier fields such as `minUnits`, `maxUnits` and `style`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Champion record from the detail feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionRecord {
    pub api_name: String,
    #[serde(default)]
    pub character_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub square_icon: Option<String>,
    #[serde(default)]
    pub tile_icon: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub stats: Value,
    /// Trait display names, resolved to trait IDs during fusion.
    #[serde(default, deserialize_with = "nullable")]
    pub traits: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ability: AbilityRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbilityRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub variables: Vec<AbilityVariable>,
}

/// A named ability value, one entry per star level.
#[derive(Debug, Clone, Deserialize)]
pub struct AbilityVariable {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Entity IDs sanctioned for a release, per kind, in manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allowlist {
    augments: Vec<String>,
    items: Vec<String>,
    traits: Vec<String>,
    champions: Vec<String>,
}

impl Allowlist {
    /// Build an allowlist from the four release manifest feeds.
    pub fn from_manifests(
        augments: &Value,
        items: &Value,
        traits: &Value,
        champions: &Value,
    ) -> Result<Self> {
        Ok(Self {
            augments: manifest_ids("tft-augments", augments)?,
            items: manifest_ids("tft-item", items)?,
            traits: manifest_ids("tft-trait", traits)?,
            champions: manifest_ids("tft-champion", champions)?,
        })
    }

    /// Replace the IDs of one kind. Duplicates are dropped, first one wins.
    pub fn with_ids<I, S>(mut self, kind: EntityKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.ids_mut(kind) = dedup(ids.into_iter().map(Into::into));
        self
    }

    pub fn ids(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Augment => &self.augments,
            EntityKind::Item => &self.items,
            EntityKind::Trait => &self.traits,
            EntityKind::Champion => &self.champions,
        }
    }

    fn ids_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Augment => &mut self.augments,
            EntityKind::Item => &mut self.items,
            EntityKind::Trait => &mut self.traits,
            EntityKind::Champion => &mut self.champions,
        }
    }
}

fn manifest_ids(feed: &str, manifest: &Value) -> Result<Vec<String>> {
    let data = manifest
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed(feed, "expected a `data` object"))?;

    Ok(dedup(data.keys().map(|key| {
        key.rsplit('/').next().unwrap_or(key.as_str()).to_string()
    })))
}

fn dedup(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

/// Raw catalog records of one kind, keyed by `apiName`.
///
/// Records stay as JSON until [`Records::get`] decodes one, so historical
/// entries the allowlist never reaches are not validated. When an `apiName`
/// repeats, the first record wins.
#[derive(Debug, Clone)]
pub struct Records<R> {
    kind: EntityKind,
    values: HashMap<String, Value>,
    _record: PhantomData<fn() -> R>,
}

impl<R: DeserializeOwned> Records<R> {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: HashMap::new(),
            _record: PhantomData,
        }
    }

    fn from_values(kind: EntityKind, values: &[Value]) -> Self {
        let mut records = Self::new(kind);
        for value in values {
            records.insert(value.clone());
        }
        records
    }

    /// Add a raw record. Entries without an `apiName` can never be
    /// allowlisted and are skipped.
    pub fn insert(&mut self, value: Value) {
        let Some(id) = value.get("apiName").and_then(Value::as_str) else {
            tracing::debug!("Skipping {} record without apiName", self.kind);
            return;
        };

        match self.values.entry(id.to_string()) {
            Entry::Occupied(_) => {
                tracing::debug!("Ignoring duplicate {} record '{}'", self.kind, id);
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }

    /// Decode the record for `id`, `None` when the catalog has no such record.
    pub fn get(&self, id: &str) -> Option<Result<R>> {
        let value = self.values.get(id)?;
        Some(
            R::deserialize(value).map_err(|source| Error::MalformedRecord {
                kind: self.kind,
                id: id.to_string(),
                source,
            }),
        )
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Detail records for one language.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub augments: Records<ItemRecord>,
    pub items: Records<ItemRecord>,
    pub traits: Records<TraitRecord>,
    pub champions: Records<ChampionRecord>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            augments: Records::new(EntityKind::Augment),
            items: Records::new(EntityKind::Item),
            traits: Records::new(EntityKind::Trait),
            champions: Records::new(EntityKind::Champion),
        }
    }
}

impl Catalog {
    /// Parse a detail feed document, selecting champions and traits of `set_mutator`.
    ///
    /// Only the document shape is checked here. Records are decoded during
    /// fusion, and only for allowlisted IDs.
    pub fn from_json(document: &Value, set_mutator: &str) -> Result<Self> {
        let items = array_field(document, "items", "catalog")?;

        let set = array_field(document, "setData", "catalog")?
            .iter()
            .find(|set| set.get("mutator").and_then(Value::as_str) == Some(set_mutator))
            .ok_or_else(|| {
                Error::malformed("catalog", format!("set '{set_mutator}' not found in setData"))
            })?;

        let champions = array_field(set, "champions", set_mutator)?;
        let traits = array_field(set, "traits", set_mutator)?;

        Ok(Self {
            augments: Records::from_values(EntityKind::Augment, items),
            items: Records::from_values(EntityKind::Item, items),
            traits: Records::from_values(EntityKind::Trait, traits),
            champions: Records::from_values(EntityKind::Champion, champions),
        })
    }

    pub fn with_augment(mut self, record: Value) -> Self {
        self.augments.insert(record);
        self
    }

    pub fn with_item(mut self, record: Value) -> Self {
        self.items.insert(record);
        self
    }

    pub fn with_trait(mut self, record: Value) -> Self {
        self.traits.insert(record);
        self
    }

    pub fn with_champion(mut self, record: Value) -> Self {
        self.champions.insert(record);
        self
    }
}

fn array_field<'a>(value: &'a Value, field: &str, source_name: &str) -> Result<&'a Vec<Value>> {
    value
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed(source_name, format!("expected `{field}` to be a list")))
}
