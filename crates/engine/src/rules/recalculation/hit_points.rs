//! Maximum hit points and limited-use resource pools.

use std::collections::BTreeMap;

use sheetsmith_domain::{Ability, AbilityScores, AncestryDef, CatalogEntry, ClassDef, FeatEffect};

/// Ancestry HP + (class HP + CON modifier) x level + bonus HP from held
/// entries. Dual-class characters use the better class HP. Without a class
/// only the ancestry and bonuses count.
pub fn max_hit_points<'a>(
    level: u8,
    ancestry: Option<&AncestryDef>,
    classes: &[&ClassDef],
    scores: &AbilityScores,
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
) -> i32 {
    let level = i32::from(level);
    let ancestry_hp = ancestry.map(|a| a.hit_points).unwrap_or(0);
    let per_level = classes
        .iter()
        .map(|class| class.hit_points)
        .max()
        .map(|class_hp| class_hp + scores.modifier(Ability::Constitution))
        .unwrap_or(0);

    let bonus: i32 = entries
        .into_iter()
        .flat_map(|entry| entry.effects.iter())
        .map(|effect| match effect {
            FeatEffect::BonusHitPoints { fixed, per_level } => fixed + per_level * level,
            _ => 0,
        })
        .sum();

    ancestry_hp + per_level * level + bonus
}

/// Resource pools granted by held entries. The larger pool wins when two
/// entries grant the same resource.
pub fn resources<'a>(
    level: u8,
    scores: &AbilityScores,
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
) -> BTreeMap<String, u32> {
    let mut pools: BTreeMap<String, u32> = BTreeMap::new();
    for effect in entries.into_iter().flat_map(|entry| entry.effects.iter()) {
        if let FeatEffect::Resource { name, uses } = effect {
            let uses = uses.evaluate(level, |ability| scores.modifier(ability));
            let pool = pools.entry(name.clone()).or_default();
            *pool = (*pool).max(uses);
        }
    }
    pools
}
