//! Reverse relationship derivation between fused collections.

use crate::entity::{Champion, Collection, Trait};

/// Derive each trait's member list from the champions that declare it.
///
/// Members are listed in champion collection order. Any member list already on
/// a trait is replaced, so linking an already linked collection is a no-op.
pub fn link(champions: &Collection<Champion>, traits: &Collection<Trait>) -> Collection<Trait> {
    traits
        .iter()
        .map(|trait_entity| {
            let members = champions
                .iter()
                .filter(|champion| champion.trait_ids.contains(&trait_entity.id))
                .map(|champion| champion.id.clone())
                .collect();

            Trait {
                champions: members,
                ..trait_entity.clone()
            }
        })
        .collect()
}
