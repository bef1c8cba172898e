//! Fused output entities and the ordered collection that holds them.

use crate::effects::EffectTable;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The four entity kinds, in fusion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Augment,
    Item,
    Trait,
    Champion,
}

impl EntityKind {
    /// Every kind, in the order a pass fuses them. Champions come after traits
    /// because they reference traits by name.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Augment,
        EntityKind::Item,
        EntityKind::Trait,
        EntityKind::Champion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Augment => "augment",
            EntityKind::Item => "item",
            EntityKind::Trait => "trait",
            EntityKind::Champion => "champion",
        }
    }

    /// Plural name, used for output file stems.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Augment => "augments",
            EntityKind::Item => "items",
            EntityKind::Trait => "traits",
            EntityKind::Champion => "champions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behavior of fused entities.
pub trait Entity: Clone {
    fn id(&self) -> &str;

    /// Every raw icon path carried by the entity, for URL formatting.
    fn icons_mut(&mut self) -> Vec<&mut String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Augment {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub associated_traits: Vec<String>,
    pub incompatible_traits: Vec<String>,
    pub composition: Vec<String>,
    pub from: Option<Value>,
    pub unique: bool,
    pub effects: EffectTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub associated_traits: Vec<String>,
    pub incompatible_traits: Vec<String>,
    pub composition: Vec<String>,
    pub from: Option<Value>,
    pub unique: bool,
    pub effects: EffectTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trait {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Member champion IDs, filled in by [`link`](crate::link::link).
    pub champions: Vec<String>,
    /// One flattened effect table per tier.
    pub effects: Vec<EffectTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Champion {
    pub id: String,
    pub character_name: Option<String>,
    pub name: String,
    pub cost: Option<i64>,
    pub icon: Option<String>,
    pub role: Option<String>,
    pub stats: Value,
    pub trait_ids: Vec<String>,
    pub ability: Ability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ability {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Ability variables restricted to the displayed star levels.
    pub effects: EffectTable,
}

impl Entity for Augment {
    fn id(&self) -> &str {
        &self.id
    }

    fn icons_mut(&mut self) -> Vec<&mut String> {
        self.icon.iter_mut().collect()
    }
}

impl Entity for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn icons_mut(&mut self) -> Vec<&mut String> {
        self.icon.iter_mut().collect()
    }
}

impl Entity for Trait {
    fn id(&self) -> &str {
        &self.id
    }

    fn icons_mut(&mut self) -> Vec<&mut String> {
        self.icon.iter_mut().collect()
    }
}

impl Entity for Champion {
    fn id(&self) -> &str {
        &self.id
    }

    fn icons_mut(&mut self) -> Vec<&mut String> {
        self.icon.iter_mut().chain(self.ability.icon.iter_mut()).collect()
    }
}

/// Entities of one kind keyed by ID, iterated in insertion (allowlist) order.
///
/// Serializes as a JSON object `{ id: entity, … }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<E> {
    entries: Vec<E>,
    index: HashMap<String, usize>,
}

impl<E> Default for Collection<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<E: Entity> Collection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity, replacing any entity with the same ID in place.
    pub fn insert(&mut self, entity: E) {
        if let Some(&position) = self.index.get(entity.id()) {
            self.entries[position] = entity;
            return;
        }

        self.index.insert(entity.id().to_string(), self.entries.len());
        self.entries.push(entity);
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Entity::id)
    }

    /// Rewrite every icon path in place.
    pub fn rewrite_icons(&mut self, mut rewrite: impl FnMut(&str) -> String) {
        for entity in &mut self.entries {
            for icon in entity.icons_mut() {
                *icon = rewrite(icon);
            }
        }
    }
}

impl<E: Entity> FromIterator<E> for Collection<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut collection = Self::new();
        for entity in iter {
            collection.insert(entity);
        }
        collection
    }
}

impl<E: Entity + Serialize> Serialize for Collection<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entity in &self.entries {
            map.serialize_entry(entity.id(), entity)?;
        }
        map.end()
    }
}
