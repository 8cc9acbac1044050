//! Preset attack profiles and effect lists for character archetypes.

use std::{num::NonZeroU32, sync::LazyLock};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::rules::{
    damage::DamageComponent,
    dice::{DiceTerm, Die},
    profile::AttackProfile,
};

pub mod resolver;

pub use resolver::{KitBuild, build_from_kit};

pub const DEFAULT_TARGET_AC: i32 = 15;

const TWO: NonZeroU32 = NonZeroU32::MIN.saturating_add(1);

/// A named base attack belonging to a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOption {
    pub id: String,
    pub label: String,
    pub profile: AttackProfile,
}

impl AttackOption {
    fn new(id: &str, label: &str, profile: AttackProfile) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            profile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassKit {
    pub id: String,
    pub label: String,
    pub default_level: u32,
    /// Ordered; the first entry is the kit's default attack.
    pub attacks: Vec<AttackOption>,
    pub available_effects: Vec<String>,
}

impl ClassKit {
    fn new(id: &str, label: &str, attacks: Vec<AttackOption>, effects: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            default_level: 5,
            attacks,
            available_effects: effects.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn default_attack(&self) -> Option<&AttackOption> {
        self.attacks.first()
    }
}

fn weapon(attack_bonus: i32, dice: DiceTerm, bonus: i32, tags: &[&str]) -> AttackProfile {
    AttackProfile::new(
        attack_bonus,
        DEFAULT_TARGET_AC,
        vec![DamageComponent::new(vec![dice], Some(bonus))],
    )
    .with_tags(tags.iter().copied())
}

fn spell(attack_bonus: i32, dice: DiceTerm, tags: &[&str]) -> AttackProfile {
    AttackProfile::new(
        attack_bonus,
        DEFAULT_TARGET_AC,
        vec![DamageComponent::dice(vec![dice])],
    )
    .with_tags(tags.iter().copied())
}

fn fighter() -> ClassKit {
    ClassKit::new(
        "fighter",
        "Fighter",
        vec![
            AttackOption::new(
                "fighter-greatsword",
                "Greatsword Attack",
                weapon(
                    7,
                    DiceTerm::dice(TWO, Die::D6),
                    4,
                    &["heavy", "two-handed", "melee", "martial", "slashing", "weapon"],
                ),
            ),
            AttackOption::new(
                "fighter-longbow",
                "Longbow Attack",
                weapon(
                    6,
                    DiceTerm::single(Die::D8),
                    3,
                    &["heavy", "two-handed", "ranged", "martial", "piercing", "weapon"],
                ),
            ),
        ],
        &["gwm", "champion-crit", "archery"],
    )
}

fn monk() -> ClassKit {
    ClassKit::new(
        "monk",
        "Monk",
        vec![AttackOption::new(
            "monk-martial-arts",
            "Monk Martial Arts Attack",
            weapon(
                7,
                DiceTerm::single(Die::D8),
                4,
                &["simple", "finesse", "melee", "bludgeoning", "weapon"],
            ),
        )],
        &["shadow-arts-darkness"],
    )
}

fn paladin() -> ClassKit {
    ClassKit::new(
        "paladin",
        "Paladin",
        vec![AttackOption::new(
            "longsword-attack",
            "Paladin Longsword Attack",
            weapon(
                7,
                DiceTerm::single(Die::D8),
                4,
                &["weapon", "martial", "slashing", "melee", "versatile"],
            ),
        )],
        &["dueling"],
    )
}

fn sorcerer() -> ClassKit {
    ClassKit::new(
        "sorcerer",
        "Sorcerer",
        vec![AttackOption::new(
            "firebolt-attack",
            "Firebolt Attack",
            spell(7, DiceTerm::dice(TWO, Die::D10), &["spell-attack", "spell", "fire"]),
        )],
        &["innate-sorcery-attack"],
    )
}

fn warlock() -> ClassKit {
    ClassKit::new(
        "warlock",
        "Warlock",
        vec![AttackOption::new(
            "eldritch-blast-attack",
            "Eldritch Blast Attack",
            spell(7, DiceTerm::dice(TWO, Die::D10), &["spell-attack", "spell", "force"]),
        )],
        &["hex", "agonizing-blast"],
    )
}

static KITS: LazyLock<Vec<ClassKit>> =
    LazyLock::new(|| vec![fighter(), monk(), paladin(), sorcerer(), warlock()]);

static KITS_BY_ID: LazyLock<FxHashMap<&'static str, &'static ClassKit>> =
    LazyLock::new(|| KITS.iter().map(|kit| (kit.id.as_str(), kit)).collect());

/// Every registered kit, in registration order.
pub fn all_kits() -> &'static [ClassKit] {
    &KITS
}

pub fn find_kit(id: &str) -> Option<&'static ClassKit> {
    KITS_BY_ID.get(id).copied()
}
