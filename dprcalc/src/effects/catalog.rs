//! The built-in effect catalog.
//!
//! Catalog order is the order [`select`] returns effects in, and therefore the
//! order a kit build applies them.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::{
    effects::pipeline::{Effect, EffectContext, EffectTag},
    rules::{
        abilities::{Ability, proficiency_bonus},
        damage::DamageComponent,
        dice::{DiceTerm, Die},
        profile::AttackProfile,
    },
};

fn rage_bonus(level: Option<u32>) -> i32 {
    match level {
        Some(16..) => 4,
        Some(9..) => 3,
        _ => 2,
    }
}

fn context_proficiency(ctx: &EffectContext) -> i32 {
    proficiency_bonus(ctx.level.unwrap_or(1))
}

fn with_attack_bonus(profile: &AttackProfile, delta: i32) -> AttackProfile {
    AttackProfile {
        attack_bonus: profile.attack_bonus.saturating_add(delta),
        ..profile.clone()
    }
}

pub const ARCHERY: Effect = Effect {
    id: "archery",
    label: "Archery Fighting Style",
    tags: &[EffectTag::ToHitBonus],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("ranged")),
    apply: |profile, _| with_attack_bonus(profile, 2),
};

pub const RAGE: Effect = Effect {
    id: "rage",
    label: "Rage",
    tags: &[EffectTag::DamageBonus],
    requires_simulation: false,
    applies: None,
    apply: |profile, ctx| {
        profile
            .clone()
            .with_damage(DamageComponent::flat(rage_bonus(ctx.level)))
    },
};

pub const HEX: Effect = Effect {
    id: "hex",
    label: "Hex",
    tags: &[EffectTag::DamageDice],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("spell")),
    apply: |profile, _| {
        profile
            .clone()
            .with_damage(DamageComponent::dice(vec![DiceTerm::single(Die::D6)]))
    },
};

pub const HUNTERS_MARK: Effect = Effect {
    id: "hunters-mark",
    label: "Hunter's Mark",
    tags: &[EffectTag::DamageDice],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("spell")),
    apply: |profile, _| {
        profile
            .clone()
            .with_damage(DamageComponent::dice(vec![DiceTerm::single(Die::D6)]))
    },
};

pub const SHADOW_ARTS_DARKNESS: Effect = Effect {
    id: "shadow-arts-darkness",
    label: "Shadow Arts Darkness",
    tags: &[EffectTag::Advantage],
    requires_simulation: false,
    applies: None,
    apply: |profile, _| profile.clone().with_advantage(true),
};

/// Heavy weapon hits deal extra damage equal to the proficiency bonus.
pub const GREAT_WEAPON_MASTER: Effect = Effect {
    id: "gwm",
    label: "Great Weapon Master",
    tags: &[EffectTag::DamageBonus],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("heavy")),
    apply: |profile, ctx| {
        profile
            .clone()
            .with_damage(DamageComponent::flat(context_proficiency(ctx)))
    },
};

pub const CHAMPION_CRIT: Effect = Effect {
    id: "champion-crit",
    label: "Improved Critical",
    tags: &[EffectTag::CritRange],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("weapon")),
    apply: |profile, _| {
        let crit_range = profile.crit_range.min(19);
        profile.clone().with_crit_range(crit_range)
    },
};

pub const DUELING: Effect = Effect {
    id: "dueling",
    label: "Dueling Fighting Style",
    tags: &[EffectTag::DamageBonus],
    requires_simulation: false,
    applies: Some(|profile, _| {
        profile.has_tag("melee") && profile.has_tag("weapon") && !profile.has_tag("two-handed")
    }),
    apply: |profile, _| profile.clone().with_damage(DamageComponent::flat(2)),
};

/// Adds the Charisma modifier to spell damage. Without ability scores in the
/// context, the modifier is taken as attack bonus minus proficiency.
pub const AGONIZING_BLAST: Effect = Effect {
    id: "agonizing-blast",
    label: "Agonizing Blast",
    tags: &[EffectTag::DamageBonus],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("spell")),
    apply: |profile, ctx| {
        let modifier = ctx
            .modifier(Ability::Charisma)
            .unwrap_or_else(|| {
                profile
                    .attack_bonus
                    .saturating_sub(context_proficiency(ctx))
                    .max(0)
            });
        profile
            .clone()
            .with_damage(DamageComponent::flat(modifier))
    },
};

pub const INNATE_SORCERY_ATTACK: Effect = Effect {
    id: "innate-sorcery-attack",
    label: "Innate Sorcery",
    tags: &[EffectTag::Advantage],
    requires_simulation: false,
    applies: Some(|profile, _| profile.has_tag("spell-attack")),
    apply: |profile, _| profile.clone().with_advantage(true),
};

static CATALOG: [Effect; 10] = [
    ARCHERY,
    RAGE,
    HEX,
    HUNTERS_MARK,
    SHADOW_ARTS_DARKNESS,
    GREAT_WEAPON_MASTER,
    CHAMPION_CRIT,
    DUELING,
    AGONIZING_BLAST,
    INNATE_SORCERY_ATTACK,
];

static BY_ID: LazyLock<FxHashMap<&'static str, &'static Effect>> =
    LazyLock::new(|| CATALOG.iter().map(|effect| (effect.id, effect)).collect());

/// Every registered effect, in catalog order.
pub fn all() -> &'static [Effect] {
    &CATALOG
}

pub fn get(id: &str) -> Option<&'static Effect> {
    BY_ID.get(id).copied()
}

/// The catalog effects whose ids appear in `ids`, in catalog order.
/// Unknown ids are ignored.
pub fn select<S: AsRef<str>>(ids: &[S]) -> Vec<&'static Effect> {
    for id in ids {
        if get(id.as_ref()).is_none() {
            log::debug!("Ignoring unknown effect id {:?}", id.as_ref());
        }
    }
    CATALOG
        .iter()
        .filter(|effect| ids.iter().any(|id| id.as_ref() == effect.id))
        .collect()
}
