use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::rules::{
    abilities::{Ability, AbilityScores},
    profile::AttackProfile,
};

/// Extra state an effect may read while transforming a profile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectContext {
    pub level: Option<u32>,
    pub ability_scores: Option<AbilityScores>,
}

impl EffectContext {
    pub fn at_level(level: u32) -> Self {
        Self {
            level: Some(level),
            ability_scores: None,
        }
    }

    pub fn with_ability_scores(mut self, scores: AbilityScores) -> Self {
        self.ability_scores = Some(scores);
        self
    }

    pub fn modifier(&self, ability: Ability) -> Option<i32> {
        self.ability_scores.map(|scores| scores.modifier(ability))
    }
}

/// What part of an attack an effect changes.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectTag {
    #[display("to-hit-bonus")]
    ToHitBonus,
    #[display("to-hit-dice")]
    ToHitDice,
    #[display("damage-bonus")]
    DamageBonus,
    #[display("damage-dice")]
    DamageDice,
    #[display("crit-range")]
    CritRange,
    #[display("advantage")]
    Advantage,
    #[display("reroll")]
    Reroll,
    #[display("other")]
    Other,
}

pub type AppliesFn = fn(&AttackProfile, &EffectContext) -> bool;
pub type ApplyFn = fn(&AttackProfile, &EffectContext) -> AttackProfile;

/// A rule that conditionally rewrites an attack profile.
///
/// Effects are plain data: a predicate deciding whether the rule is relevant
/// to the profile in front of it, and a pure transform returning a new
/// profile. Neither may keep state between calls.
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub id: &'static str,
    pub label: &'static str,
    pub tags: &'static [EffectTag],
    /// Set when the analytic model cannot capture the rule exactly.
    pub requires_simulation: bool,
    /// `None` means the effect always applies.
    pub applies: Option<AppliesFn>,
    pub apply: ApplyFn,
}

impl Effect {
    pub fn applies_to(&self, profile: &AttackProfile, ctx: &EffectContext) -> bool {
        self.applies.is_none_or(|applies| applies(profile, ctx))
    }

    pub fn info(&self) -> EffectInfo {
        EffectInfo {
            id: self.id.to_string(),
            label: self.label.to_string(),
            tags: self.tags.to_vec(),
            requires_simulation: self.requires_simulation,
        }
    }
}

/// Display summary of an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectInfo {
    pub id: String,
    pub label: String,
    pub tags: Vec<EffectTag>,
    pub requires_simulation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectOutcome {
    pub profile: AttackProfile,
    pub requires_simulation: bool,
}

/// Folds `effects` over `base` in the order given.
///
/// Each effect's predicate sees the profile as left by the effects before it,
/// so the result depends on ordering. A skipped effect contributes nothing,
/// including its simulation flag. `base` itself is never modified.
pub fn apply_effects<'a>(
    base: &AttackProfile,
    effects: impl IntoIterator<Item = &'a Effect>,
    ctx: &EffectContext,
) -> EffectOutcome {
    let (profile, requires_simulation) =
        effects
            .into_iter()
            .fold((base.clone(), false), |(profile, requires_simulation), effect| {
                if !effect.applies_to(&profile, ctx) {
                    log::trace!("Skipping effect {}", effect.id);
                    return (profile, requires_simulation);
                }
                log::trace!("Applying effect {}", effect.id);
                let next = (effect.apply)(&profile, ctx);
                (next, requires_simulation || effect.requires_simulation)
            });

    EffectOutcome {
        profile,
        requires_simulation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::damage::DamageComponent;

    fn base() -> AttackProfile {
        AttackProfile::new(5, 15, vec![DamageComponent::flat(4)]).with_tags(["melee"])
    }

    const PLUS_ONE: Effect = Effect {
        id: "plus-one",
        label: "+1 to hit",
        tags: &[EffectTag::ToHitBonus],
        requires_simulation: false,
        applies: None,
        apply: |profile, _| AttackProfile {
            attack_bonus: profile.attack_bonus + 1,
            ..profile.clone()
        },
    };

    const RANGED_ONLY: Effect = Effect {
        id: "ranged-only",
        label: "Needs a ranged attack",
        tags: &[EffectTag::Other],
        requires_simulation: true,
        applies: Some(|profile, _| profile.has_tag("ranged")),
        apply: |profile, _| profile.clone().with_advantage(true),
    };

    const MAKE_RANGED: Effect = Effect {
        id: "make-ranged",
        label: "Switch to a ranged attack",
        tags: &[EffectTag::Other],
        requires_simulation: false,
        applies: None,
        apply: |profile, _| {
            let mut next = profile.clone();
            next.tags.insert("ranged");
            next
        },
    };

    const NEEDS_HIGH_BONUS: Effect = Effect {
        id: "needs-high-bonus",
        label: "Needs +6",
        tags: &[EffectTag::DamageBonus],
        requires_simulation: false,
        applies: Some(|profile, _| profile.attack_bonus >= 6),
        apply: |profile, _| profile.clone().with_damage(DamageComponent::flat(1)),
    };

    const LEVEL_SCALED: Effect = Effect {
        id: "level-scaled",
        label: "Bonus equal to level",
        tags: &[EffectTag::DamageBonus],
        requires_simulation: false,
        applies: None,
        apply: |profile, ctx| {
            profile
                .clone()
                .with_damage(DamageComponent::flat(ctx.level.unwrap_or(1) as i32))
        },
    };

    #[test]
    fn test_empty_list_returns_base() {
        let none: [&Effect; 0] = [];
        let outcome = apply_effects(&base(), none, &EffectContext::default());
        assert_eq!(outcome.profile, base());
        assert!(!outcome.requires_simulation);
    }

    #[test]
    fn test_skipped_effect_changes_nothing() {
        let outcome = apply_effects(&base(), [&RANGED_ONLY], &EffectContext::default());
        assert_eq!(outcome.profile, base());
        assert!(!outcome.requires_simulation);
    }

    #[test]
    fn test_applied_effect_sets_simulation_flag() {
        let outcome = apply_effects(
            &base(),
            [&MAKE_RANGED, &RANGED_ONLY],
            &EffectContext::default(),
        );
        assert!(outcome.profile.advantage);
        assert!(outcome.requires_simulation);
    }

    #[test]
    fn test_order_matters() {
        let ctx = EffectContext::default();

        let before = apply_effects(&base(), [&RANGED_ONLY, &MAKE_RANGED], &ctx);
        assert!(!before.profile.advantage);
        assert!(!before.requires_simulation);

        let after = apply_effects(&base(), [&MAKE_RANGED, &RANGED_ONLY], &ctx);
        assert!(after.profile.advantage);

        let late = apply_effects(&base(), [&NEEDS_HIGH_BONUS, &PLUS_ONE], &ctx);
        assert_eq!(late.profile.damage.len(), 1);
        let early = apply_effects(&base(), [&PLUS_ONE, &NEEDS_HIGH_BONUS], &ctx);
        assert_eq!(early.profile.damage.len(), 2);
    }

    #[test]
    fn test_base_not_mutated() {
        let base = base();
        let snapshot = base.clone();
        let outcome = apply_effects(&base, [&PLUS_ONE, &PLUS_ONE], &EffectContext::default());
        assert_eq!(base, snapshot);
        assert_eq!(outcome.profile.attack_bonus, 7);
    }

    #[test]
    fn test_context_is_passed_through() {
        let outcome = apply_effects(&base(), [&LEVEL_SCALED], &EffectContext::at_level(11));
        assert_eq!(outcome.profile.damage.last().unwrap().bonus, Some(11));
    }

    #[test]
    fn test_context_deserialize_checks_scores() {
        let ctx: EffectContext =
            serde_json::from_str(r#"{"level": 5, "abilityScores": {"cha": 20}}"#).unwrap();
        assert_eq!(ctx.modifier(Ability::Charisma), Some(5));

        for cha in [0, 99] {
            let json = format!(r#"{{"level": 5, "abilityScores": {{"cha": {cha}}}}}"#);
            assert!(serde_json::from_str::<EffectContext>(&json).is_err());
        }
    }

    #[test]
    fn test_effect_info() {
        let info = RANGED_ONLY.info();
        assert_eq!(info.id, "ranged-only");
        assert!(info.requires_simulation);
        assert_eq!(EffectTag::ToHitBonus.to_string(), "to-hit-bonus");
        assert_eq!(
            serde_json::to_value(EffectTag::CritRange).unwrap(),
            serde_json::json!("crit-range")
        );
    }
}
