//! Catalog fusion: allowlist intersection and per-kind entity construction.
//!
//! # Pass Algorithm
//!
//! [`fuse_all`] runs one (release, language) pass:
//!
//! 1. Fuse augments, then items. Both are built from the catalog's `items`
//!    list, restricted by their own allowlist.
//! 2. Fuse traits. Each trait's tiers are flattened and its description is
//!    row-expanded against them.
//! 3. Fuse champions. Declared trait names are resolved to IDs against the
//!    fused traits, so this has to run after step 2. An unknown name aborts
//!    the pass with [`Error::TraitLookup`].
//! 4. Link traits to their member champions ([`link`]).
//!
//! Each step walks its allowlist in order and skips IDs the catalog doesn't
//! know. Builders can also exclude a record (debug items, unnamed entries);
//! exclusions and unresolved placeholders are tallied in the
//! [`FusionReport`] rather than treated as failures.

use crate::catalog::{Allowlist, Catalog, ChampionRecord, ItemRecord, Records, TraitRecord};
use crate::effects::{flatten_ability, flatten_effects, flatten_tiers};
use crate::entity::{Ability, Augment, Champion, Collection, Entity, EntityKind, Item, Trait};
use crate::error::{Error, Result};
use crate::link::link;
use crate::overrides::OverrideSource;
use crate::resolve::{resolve, OverrideRules, Resolved};
use crate::rows::expand_rows;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Item IDs that name debug, placeholder or retired content.
static EXCLUDED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)debug|TFT_Item_UnusableSlot|tft3.*emblem").expect("item filter is valid")
});

/// Everything one fusion pass reads.
///
/// The context only borrows; callers running several passes concurrently give
/// each pass its own catalog.
pub struct FusionContext<'a> {
    /// Release identifier, e.g. the Data Dragon version `14.1.1`.
    pub release: &'a str,
    /// Language tag of the catalog, e.g. `en_us`.
    pub language: &'a str,
    pub allowlist: &'a Allowlist,
    pub catalog: &'a Catalog,
    pub overrides: Option<&'a dyn OverrideSource>,
}

impl<'a> FusionContext<'a> {
    pub fn new(
        release: &'a str,
        language: &'a str,
        allowlist: &'a Allowlist,
        catalog: &'a Catalog,
    ) -> Self {
        Self {
            release,
            language,
            allowlist,
            catalog,
            overrides: None,
        }
    }

    pub fn with_overrides(mut self, overrides: &'a dyn OverrideSource) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Override rules for a champion. A source that fails to load is logged
    /// and treated as having no rules.
    fn override_rules(&self, champion_id: &str) -> Option<OverrideRules> {
        let source = self.overrides?;
        match source.load(self.release, champion_id) {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(
                    "Ignoring override rules for champion={} release={}: {}",
                    champion_id,
                    self.release,
                    e
                );
                None
            }
        }
    }
}

/// Per-kind counters of a fusion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KindStats {
    /// Entities written to the collection.
    pub built: usize,
    /// Records dropped by an exclusion filter.
    pub excluded: usize,
    /// Allowlisted IDs the catalog has no record for.
    pub missing: usize,
}

/// A placeholder that resolved to the unknown sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedPlaceholder {
    pub kind: EntityKind,
    pub id: String,
    pub token: String,
}

/// Data-quality summary of a fusion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FusionReport {
    pub kinds: BTreeMap<EntityKind, KindStats>,
    pub unresolved: Vec<UnresolvedPlaceholder>,
}

impl FusionReport {
    pub fn stats(&self, kind: EntityKind) -> KindStats {
        self.kinds.get(&kind).cloned().unwrap_or_default()
    }

    fn stats_mut(&mut self, kind: EntityKind) -> &mut KindStats {
        self.kinds.entry(kind).or_default()
    }

    /// Record the unresolved tokens of a resolution and return its text.
    fn take_text(&mut self, kind: EntityKind, id: &str, resolved: Resolved) -> String {
        for token in resolved.unresolved {
            tracing::debug!("Unresolved placeholder {} in {} '{}'", token, kind, id);
            self.unresolved.push(UnresolvedPlaceholder {
                kind,
                id: id.to_string(),
                token,
            });
        }
        resolved.text
    }
}

/// The four collections produced by one pass, plus its report.
#[derive(Debug, Clone, Serialize)]
pub struct FusedDataset {
    pub release: String,
    pub language: String,
    pub augments: Collection<Augment>,
    pub items: Collection<Item>,
    pub traits: Collection<Trait>,
    pub champions: Collection<Champion>,
    #[serde(skip)]
    pub report: FusionReport,
}

impl FusedDataset {
    /// Rewrite the icon paths of every collection.
    pub fn rewrite_icons(&mut self, rewrite: impl Fn(&str) -> String) {
        self.augments.rewrite_icons(&rewrite);
        self.items.rewrite_icons(&rewrite);
        self.traits.rewrite_icons(&rewrite);
        self.champions.rewrite_icons(&rewrite);
    }
}

/// Fuse the allowlisted records of one kind.
///
/// `build` returns `Ok(None)` to exclude a record. IDs without a record are
/// skipped; they name content that was dropped from the detail feed. Only
/// allowlisted records are decoded, so a malformed one fails the pass with
/// [`Error::MalformedRecord`].
pub fn fuse<R, E, F>(
    kind: EntityKind,
    ids: &[String],
    records: &Records<R>,
    report: &mut FusionReport,
    mut build: F,
) -> Result<Collection<E>>
where
    R: DeserializeOwned,
    E: Entity,
    F: FnMut(&R, &mut FusionReport) -> Result<Option<E>>,
{
    let mut collection = Collection::new();

    for id in ids {
        let Some(record) = records.get(id) else {
            tracing::debug!("Allowlisted {} '{}' has no catalog record, skipping", kind, id);
            report.stats_mut(kind).missing += 1;
            continue;
        };

        match build(&record?, report)? {
            Some(entity) => {
                collection.insert(entity);
                report.stats_mut(kind).built += 1;
            }
            None => {
                tracing::debug!("Excluded {} '{}'", kind, id);
                report.stats_mut(kind).excluded += 1;
            }
        }
    }

    tracing::info!(
        "Fused {} {}(s) from {} allowlisted",
        collection.len(),
        kind,
        ids.len()
    );

    Ok(collection)
}

/// Run a complete fusion pass. See module-level docs for the algorithm.
pub fn fuse_all(ctx: &FusionContext<'_>) -> Result<FusedDataset> {
    tracing::info!(
        "Fusing release={} language={}",
        ctx.release,
        ctx.language
    );

    let allowlist = ctx.allowlist;
    let catalog = ctx.catalog;
    let mut report = FusionReport::default();

    let augments = fuse(
        EntityKind::Augment,
        allowlist.ids(EntityKind::Augment),
        &catalog.augments,
        &mut report,
        build_augment,
    )?;

    let items = fuse(
        EntityKind::Item,
        allowlist.ids(EntityKind::Item),
        &catalog.items,
        &mut report,
        build_item,
    )?;

    let traits = fuse(
        EntityKind::Trait,
        allowlist.ids(EntityKind::Trait),
        &catalog.traits,
        &mut report,
        build_trait,
    )?;

    let champions = fuse(
        EntityKind::Champion,
        allowlist.ids(EntityKind::Champion),
        &catalog.champions,
        &mut report,
        |record, report| build_champion(ctx, record, &traits, report),
    )?;

    let traits = link(&champions, &traits);

    tracing::info!(
        "Fused release={} language={}: {} augments, {} items, {} traits, {} champions, {} unresolved placeholder(s)",
        ctx.release,
        ctx.language,
        augments.len(),
        items.len(),
        traits.len(),
        champions.len(),
        report.unresolved.len()
    );

    Ok(FusedDataset {
        release: ctx.release.to_string(),
        language: ctx.language.to_string(),
        augments,
        items,
        traits,
        champions,
        report,
    })
}

pub fn build_augment(record: &ItemRecord, report: &mut FusionReport) -> Result<Option<Augment>> {
    let effects = flatten_effects(&record.effects);
    let description = record.desc.as_deref().map(|desc| {
        let resolved = resolve(desc, Some(&effects), None);
        report.take_text(EntityKind::Augment, &record.api_name, resolved)
    });

    Ok(Some(Augment {
        id: record.api_name.clone(),
        name: record.name.clone(),
        description,
        icon: record.icon.clone(),
        associated_traits: record.associated_traits.clone(),
        incompatible_traits: record.incompatible_traits.clone(),
        composition: record.composition.clone(),
        from: record.from.clone(),
        unique: record.unique,
        effects,
    }))
}

/// Build an item, excluding debug and placeholder entries.
pub fn build_item(record: &ItemRecord, report: &mut FusionReport) -> Result<Option<Item>> {
    if EXCLUDED_ITEM.is_match(&record.api_name) {
        return Ok(None);
    }

    let (Some(name), Some(desc)) = (record.name.as_deref(), record.desc.as_deref()) else {
        return Ok(None);
    };
    if name.is_empty() || name == desc {
        return Ok(None);
    }

    let effects = flatten_effects(&record.effects);
    let id = record.api_name.as_str();
    let description = report.take_text(EntityKind::Item, id, resolve(desc, Some(&effects), None));
    let name = report.take_text(EntityKind::Item, id, resolve(name, Some(&effects), None));

    Ok(Some(Item {
        id: id.to_string(),
        name,
        description,
        icon: record.icon.clone(),
        associated_traits: record.associated_traits.clone(),
        incompatible_traits: record.incompatible_traits.clone(),
        composition: record.composition.clone(),
        from: record.from.clone(),
        unique: record.unique,
        effects,
    }))
}

pub fn build_trait(record: &TraitRecord, report: &mut FusionReport) -> Result<Option<Trait>> {
    let effects = flatten_tiers(&record.effects);
    let description = record.desc.as_deref().map(|desc| {
        let resolved = expand_rows(desc, &effects);
        report.take_text(EntityKind::Trait, &record.api_name, resolved)
    });

    Ok(Some(Trait {
        id: record.api_name.clone(),
        name: record.name.clone(),
        description,
        icon: record.icon.clone(),
        champions: Vec::new(),
        effects,
    }))
}

/// Build a champion, resolving its trait names against the fused `traits`.
pub fn build_champion(
    ctx: &FusionContext<'_>,
    record: &ChampionRecord,
    traits: &Collection<Trait>,
    report: &mut FusionReport,
) -> Result<Option<Champion>> {
    let trait_ids = record
        .traits
        .iter()
        .map(|trait_name| {
            traits
                .iter()
                .find(|candidate| &candidate.name == trait_name)
                .map(|found| found.id.clone())
                .ok_or_else(|| Error::TraitLookup {
                    champion: record.api_name.clone(),
                    trait_name: trait_name.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let ability = &record.ability;
    let effects = flatten_ability(&ability.variables);
    let rules = ctx.override_rules(&record.api_name);
    let description = ability.desc.as_deref().map(|desc| {
        let resolved = resolve(desc, Some(&effects), rules.as_ref());
        report.take_text(EntityKind::Champion, &record.api_name, resolved)
    });

    Ok(Some(Champion {
        id: record.api_name.clone(),
        character_name: record.character_name.clone(),
        name: record.name.clone(),
        cost: record.cost,
        icon: record.tile_icon.clone().or_else(|| record.icon.clone()),
        role: record.role.clone(),
        stats: record.stats.clone(),
        trait_ids,
        ability: Ability {
            name: ability.name.clone(),
            description,
            icon: ability.icon.clone(),
            effects,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn item(value: Value) -> ItemRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_item_exclusions() {
        let mut report = FusionReport::default();
        let excluded = [
            json!({ "apiName": "TFT_Item_Debug_Sword", "name": "Sword", "desc": "x" }),
            json!({ "apiName": "TFT_Item_UnusableSlot", "name": "Slot", "desc": "x" }),
            json!({ "apiName": "TFT3_Item_StarGuardianEmblem", "name": "Emblem", "desc": "x" }),
            json!({ "apiName": "TFT_Item_Empty", "name": "", "desc": "x" }),
            json!({ "apiName": "TFT_Item_NoDesc", "name": "Thing", "desc": null }),
            json!({ "apiName": "TFT_Item_Same", "name": "Same", "desc": "Same" }),
        ];

        for record in excluded {
            assert!(build_item(&item(record), &mut report).unwrap().is_none());
        }
    }

    #[test]
    fn test_item_name_and_description_resolved() {
        let mut report = FusionReport::default();
        let record = item(json!({
            "apiName": "TFT_Item_Bow",
            "name": "Bow (@Stacks@)",
            "desc": "+@AS*100@% Attack Speed, @Missing@",
            "effects": { "AS": 0.1, "Stacks": 5 }
        }));

        let built = build_item(&record, &mut report).unwrap().unwrap();
        assert_eq!(built.name, "Bow (5)");
        assert_eq!(built.description, "+10% Attack Speed, ?");
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(report.unresolved[0].id, "TFT_Item_Bow");
        assert_eq!(report.unresolved[0].token, "@Missing@");
    }

    #[test]
    fn test_fuse_skips_missing_and_counts() {
        let mut report = FusionReport::default();
        let mut records = Records::new(EntityKind::Item);
        records.insert(json!({ "apiName": "A", "name": "A", "desc": "a" }));
        records.insert(json!({ "apiName": "B", "name": "B", "desc": "B" }));
        records.insert(json!({ "apiName": "C", "name": "C", "desc": "c" }));

        let ids = vec!["A".to_string(), "B".to_string(), "Z".to_string()];
        let items = fuse(EntityKind::Item, &ids, &records, &mut report, build_item).unwrap();

        assert_eq!(items.ids().collect::<Vec<_>>(), ["A"]);
        assert_eq!(
            report.stats(EntityKind::Item),
            KindStats {
                built: 1,
                excluded: 1,
                missing: 1
            }
        );
    }

    #[test]
    fn test_fuse_decodes_only_allowlisted() {
        let mut report = FusionReport::default();
        let mut records = Records::new(EntityKind::Item);
        records.insert(json!({ "apiName": "A", "name": "A", "desc": "a" }));
        records.insert(json!({ "apiName": "Old", "composition": [1, 2] }));

        let items = fuse(
            EntityKind::Item,
            &["A".to_string()],
            &records,
            &mut report,
            build_item,
        )
        .unwrap();
        assert_eq!(items.len(), 1);

        let err = fuse(
            EntityKind::Item,
            &["Old".to_string()],
            &records,
            &mut report,
            build_item,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { ref id, .. } if id == "Old"));
    }

    #[test]
    fn test_fuse_propagates_builder_error() {
        let mut report = FusionReport::default();
        let mut records: Records<TraitRecord> = Records::new(EntityKind::Trait);
        records.insert(json!({ "apiName": "A", "name": "A" }));

        let result: Result<Collection<Trait>> = fuse(
            EntityKind::Trait,
            &["A".to_string()],
            &records,
            &mut report,
            |_, _| {
                Err(Error::TraitLookup {
                    champion: "A".to_string(),
                    trait_name: "x".to_string(),
                })
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_augment_keeps_raw_icon() {
        let mut report = FusionReport::default();
        let record = item(json!({
            "apiName": "TFT9_Augment_Jeweled",
            "name": "Jeweled Lotus",
            "desc": "Crit @CritChance*100@%",
            "icon": "ASSETS/Maps/TFT/Icons/Augments/Hexcore/Jeweled-Lotus-II.TFT_Set9.tex",
            "effects": { "CritChance": 0.15 }
        }));

        let built = build_augment(&record, &mut report).unwrap().unwrap();
        assert_eq!(built.description.as_deref(), Some("Crit 15%"));
        assert_eq!(
            built.icon.as_deref(),
            Some("ASSETS/Maps/TFT/Icons/Augments/Hexcore/Jeweled-Lotus-II.TFT_Set9.tex")
        );
    }

    #[test]
    fn test_augment_without_description() {
        let mut report = FusionReport::default();
        let record = item(json!({ "apiName": "TFT9_Augment_X", "name": "X" }));
        let built = build_augment(&record, &mut report).unwrap().unwrap();
        assert!(built.description.is_none());
    }
}
