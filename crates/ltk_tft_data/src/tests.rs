use crate::catalog::{Allowlist, Catalog};
use crate::entity::EntityKind;
use crate::error::Error;
use crate::fusion::{fuse_all, FusionContext};
use crate::link::link;
use crate::resolve::{resolve, OverrideRules};
use crate::EffectTable;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;

fn set10_document() -> Value {
    json!({
        "items": [
            {
                "apiName": "TFT_Item_BFSword",
                "name": "B.F. Sword",
                "desc": "+@AD@ Attack Damage",
                "icon": "ASSETS/Maps/Particles/TFT/Item_Icons/Standard/BF_Sword.TFT_Set13.tex",
                "effects": { "AD": 10 },
                "composition": [],
                "unique": false
            },
            {
                "apiName": "TFT_Item_Deathblade",
                "name": "Deathblade",
                "desc": "Gain @BaseDmg*100@% bonus damage",
                "effects": { "{6e2f5a1c}": 0.66, "BaseDmg": 0.66 },
                "composition": ["TFT_Item_BFSword", "TFT_Item_BFSword"]
            },
            {
                "apiName": "TFT_Item_Debug_Hammer",
                "name": "Hammer",
                "desc": "debug only"
            },
            {
                "apiName": "TFT2_Item_Ancient",
                "name": "Ancient Relic",
                "composition": [1, 2],
                "effects": "retired"
            },
            {
                "apiName": "TFT4_Item_OldRelic",
                "name": "Relic",
                "desc": "From an older set"
            },
            {
                "apiName": "TFT10_Augment_Headliner",
                "name": "Headliner",
                "desc": "Gain @Gold@ gold",
                "effects": { "Gold": 3 },
                "associatedTraits": ["TFT10_Pentakill"]
            }
        ],
        "setData": [
            {
                "mutator": "TFTSet10",
                "traits": [
                    {
                        "apiName": "TFT10_Pentakill",
                        "name": "Pentakill",
                        "desc": "Pentakill champions gain damage.<br><expandrow>(@MinUnits@) @Damage*100@% damage</expandrow>",
                        "icon": "ASSETS/UX/TraitIcons/Trait_Icon_10_Pentakill.TFT_Set10.tex",
                        "effects": [
                            { "minUnits": 3, "maxUnits": 4, "style": 1, "variables": { "Damage": 0.1 } },
                            { "minUnits": 5, "maxUnits": 6, "style": 3, "variables": { "Damage": 0.25 } },
                            { "minUnits": 7, "maxUnits": 25000, "style": 5, "variables": { "Damage": 0.6 } }
                        ]
                    },
                    {
                        "apiName": "TFT10_Edgelord",
                        "name": "Edgelord",
                        "desc": "Edgelords dash. (@MinUnits@)",
                        "effects": [{ "minUnits": 2, "variables": {} }]
                    }
                ],
                "champions": [
                    {
                        "apiName": "TFT10_Yorick",
                        "characterName": "TFT10_Yorick",
                        "name": "Yorick",
                        "cost": 3,
                        "tileIcon": "ASSETS/Characters/TFT10_Yorick/Skins/Base/Images/TFT10_Yorick.TFT_Set10.tex",
                        "traits": ["Pentakill"],
                        "ability": {
                            "name": "Graveyard Shift",
                            "desc": "Deal @ModifiedDamage@ damage and summon @NumGhouls@ ghouls",
                            "icon": "ASSETS/Characters/TFT10_Yorick/HUD/Icons2D/Yorick_R.TFT_Set10.tex",
                            "variables": [
                                { "name": "Damage", "value": [0, 200, 300, 450, 0, 0, 0] },
                                { "name": "Ghouls", "value": [0, 3, 3, 3, 0, 0, 0] }
                            ]
                        }
                    },
                    {
                        "apiName": "TFT10_Yone",
                        "name": "Yone",
                        "cost": 4,
                        "traits": ["Edgelord", "Pentakill"],
                        "ability": { "desc": "Slash for @Damage@", "variables": [{ "name": "Damage", "value": [0, 1, 2, 3] }] }
                    },
                    {
                        "apiName": "TFT9_Ahri",
                        "name": "Ahri",
                        "traits": ["Sorcerer"],
                        "ability": { "variables": [] }
                    }
                ]
            }
        ]
    })
}

fn set10_allowlist() -> Allowlist {
    Allowlist::default()
        .with_ids(EntityKind::Augment, ["TFT10_Augment_Headliner"])
        .with_ids(
            EntityKind::Item,
            [
                "TFT_Item_BFSword",
                "TFT_Item_Deathblade",
                "TFT_Item_Debug_Hammer",
                "TFT_Item_Unlisted",
            ],
        )
        .with_ids(EntityKind::Trait, ["TFT10_Pentakill", "TFT10_Edgelord"])
        .with_ids(EntityKind::Champion, ["TFT10_Yone", "TFT10_Yorick"])
}

#[test]
fn test_end_to_end_item_truncation() {
    let catalog = Catalog::default().with_item(
        json!({
            "apiName": "ITEM_A",
            "name": "Item A",
            "desc": "Deals @DMG@ damage",
            "effects": { "dmg": 12.5 }
        }),
    );
    let allowlist = Allowlist::default().with_ids(EntityKind::Item, ["ITEM_A"]);

    let dataset = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap();

    assert_eq!(
        dataset.items.get("ITEM_A").unwrap().description,
        "Deals 12 damage"
    );
}

#[test]
fn test_full_pass() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist();
    let mut overrides = HashMap::new();
    overrides.insert(
        "TFT10_Yorick".to_string(),
        serde_json::from_value::<OverrideRules>(json!({ "@NumGhouls@": "Ghouls" })).unwrap(),
    );

    let ctx = FusionContext::new("14.1.1", "en_us", &allowlist, &catalog).with_overrides(&overrides);
    let dataset = fuse_all(&ctx).unwrap();

    // Allowlist restriction
    for kind in EntityKind::ALL {
        let ids = allowlist.ids(kind);
        let fused: Vec<&str> = match kind {
            EntityKind::Augment => dataset.augments.ids().collect(),
            EntityKind::Item => dataset.items.ids().collect(),
            EntityKind::Trait => dataset.traits.ids().collect(),
            EntityKind::Champion => dataset.champions.ids().collect(),
        };
        assert!(fused
            .iter()
            .all(|id| ids.iter().any(|allowed| allowed.as_str() == *id)));
    }
    assert!(!dataset.items.contains("TFT4_Item_OldRelic"));
    assert!(!dataset.champions.contains("TFT9_Ahri"));

    // Items
    assert_eq!(
        dataset.items.ids().collect::<Vec<_>>(),
        ["TFT_Item_BFSword", "TFT_Item_Deathblade"]
    );
    assert_eq!(
        dataset.items.get("TFT_Item_BFSword").unwrap().description,
        "+10 Attack Damage"
    );
    assert_eq!(
        dataset.items.get("TFT_Item_Deathblade").unwrap().description,
        "Gain 66% bonus damage"
    );
    assert_eq!(
        dataset.items.get("TFT_Item_BFSword").unwrap().icon.as_deref(),
        Some("ASSETS/Maps/Particles/TFT/Item_Icons/Standard/BF_Sword.TFT_Set13.tex")
    );

    // Augments
    assert_eq!(
        dataset
            .augments
            .get("TFT10_Augment_Headliner")
            .unwrap()
            .description
            .as_deref(),
        Some("Gain 3 gold")
    );

    // Traits, row-expanded and linked
    let pentakill = dataset.traits.get("TFT10_Pentakill").unwrap();
    assert_eq!(
        pentakill.description.as_deref(),
        Some("Pentakill champions gain damage.<br><row>(3) 10% damage</row><br><row>(5) 25% damage</row><br><row>(7) 60% damage</row>")
    );
    assert_eq!(pentakill.champions, ["TFT10_Yone", "TFT10_Yorick"]);
    assert_eq!(
        dataset.traits.get("TFT10_Edgelord").unwrap().champions,
        ["TFT10_Yone"]
    );

    // Champions
    let yorick = dataset.champions.get("TFT10_Yorick").unwrap();
    assert_eq!(yorick.trait_ids, ["TFT10_Pentakill"]);
    assert_eq!(
        yorick.ability.description.as_deref(),
        Some("Deal 200 / 300 / 450 damage and summon 3 ghouls")
    );
    assert_eq!(
        yorick.icon.as_deref(),
        Some("ASSETS/Characters/TFT10_Yorick/Skins/Base/Images/TFT10_Yorick.TFT_Set10.tex")
    );
    let yone = dataset.champions.get("TFT10_Yone").unwrap();
    assert_eq!(yone.trait_ids, ["TFT10_Edgelord", "TFT10_Pentakill"]);
    assert_eq!(yone.ability.description.as_deref(), Some("Slash for 1 / 2 / 3"));

    // Report
    let items = dataset.report.stats(EntityKind::Item);
    assert_eq!(items.built, 2);
    assert_eq!(items.excluded, 1);
    assert_eq!(items.missing, 1);
    assert!(dataset.report.unresolved.is_empty());
}

#[test]
fn test_unresolved_without_override_rules() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist();

    let dataset = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap();

    let yorick = dataset.champions.get("TFT10_Yorick").unwrap();
    assert_eq!(
        yorick.ability.description.as_deref(),
        Some("Deal 200 / 300 / 450 damage and summon ? ghouls")
    );
    assert_eq!(dataset.report.unresolved.len(), 1);
    assert_eq!(dataset.report.unresolved[0].kind, EntityKind::Champion);
    assert_eq!(dataset.report.unresolved[0].token, "@NumGhouls@");
}

#[test]
fn test_unknown_trait_aborts_pass() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist().with_ids(EntityKind::Champion, ["TFT10_Yorick", "TFT9_Ahri"]);

    let err = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap_err();
    match err {
        Error::TraitLookup {
            champion,
            trait_name,
        } => {
            assert_eq!(champion, "TFT9_Ahri");
            assert_eq!(trait_name, "Sorcerer");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_trait_outside_allowlist_is_not_resolvable() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist().with_ids(EntityKind::Trait, ["TFT10_Pentakill"]);

    let err = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap_err();
    assert!(err.to_string().contains("Edgelord"));
}

#[test]
fn test_relink_fused_dataset() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist();
    let dataset = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap();

    let relinked = link(&dataset.champions, &dataset.traits);
    assert_eq!(relinked, dataset.traits);
}

#[test]
fn test_resolution_totality() {
    let effects: EffectTable = serde_json::from_value(json!({
        "A": 1, "B": [1, 2], "C": null, "D": "text", "baseE": 0.5
    }))
    .unwrap();
    let templates = [
        "@A@ @B@ @C@ @D@ @E@ @F@",
        "@@ @A*@ @*100@",
        "no tokens at all",
        "@A@@B@@C@",
        "trailing @A",
    ];

    let token = Regex::new(r"@[^@\n]+@").unwrap();
    for template in templates {
        let resolved = resolve(template, Some(&effects), None);
        assert!(
            !token.is_match(&resolved.text),
            "unresolved token left in {:?}",
            resolved.text
        );
    }
}

#[test]
fn test_serialized_dataset_shape() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist();
    let dataset = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap();

    let json = serde_json::to_value(&dataset.champions).unwrap();
    assert_eq!(json["TFT10_Yorick"]["trait_ids"], json!(["TFT10_Pentakill"]));
    assert_eq!(json["TFT10_Yorick"]["ability"]["effects"]["Damage"], json!([200, 300, 450]));
}

#[test]
fn test_stale_record_outside_allowlist_is_ignored() {
    let catalog = Catalog::from_json(&set10_document(), "TFTSet10").unwrap();
    let allowlist = set10_allowlist();

    let dataset = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap();
    assert!(dataset.items.get("TFT2_Item_Ancient").is_none());

    let allowlist = allowlist.with_ids(EntityKind::Item, ["TFT2_Item_Ancient"]);
    let err = fuse_all(&FusionContext::new("14.1.1", "en_us", &allowlist, &catalog)).unwrap_err();
    match err {
        Error::MalformedRecord { kind, id, .. } => {
            assert_eq!(kind, EntityKind::Item);
            assert_eq!(id, "TFT2_Item_Ancient");
        }
        other => panic!("unexpected error: {other}"),
    }
}
