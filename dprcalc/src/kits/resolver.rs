use serde::Serialize;

use crate::{
    effects::{EffectContext, apply_effects, catalog},
    error::{DprError, Result},
    kits::find_kit,
    rules::profile::AttackProfile,
    statistics::expected::{CalcResult, calculate_profile},
};

pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = 20;

/// The outcome of resolving a kit: the aggregate numbers and the exact profile
/// they were computed from, ready to hand to the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitBuild {
    pub result: CalcResult,
    pub profile: AttackProfile,
    pub requires_simulation: bool,
}

/// Resolves `kit_id`'s default attack against `target_ac` with the selected
/// effects applied at `level`.
///
/// Effects run in catalog order regardless of the order of `effect_ids`.
/// Ids missing from the catalog are ignored, and so are ids the kit does not
/// list itself as long as the catalog knows them.
pub fn build_from_kit<S: AsRef<str>>(
    kit_id: &str,
    level: i64,
    effect_ids: &[S],
    target_ac: i64,
) -> Result<KitBuild> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(DprError::InvalidLevel(level));
    }
    let target_ac = i32::try_from(target_ac)
        .ok()
        .filter(|ac| *ac >= 1)
        .ok_or(DprError::InvalidTargetAC(target_ac))?;
    let kit = find_kit(kit_id).ok_or_else(|| DprError::KitNotFound(kit_id.to_string()))?;
    let attack = kit
        .default_attack()
        .ok_or_else(|| DprError::KitNotFound(kit_id.to_string()))?;

    let base = attack.profile.clone().with_target_ac(target_ac);
    let effects = catalog::select(effect_ids);
    log::debug!(
        "Resolving kit {} ({}) at level {} with {} effect(s)",
        kit.id,
        attack.id,
        level,
        effects.len()
    );

    let ctx = EffectContext::at_level(level as u32);
    let outcome = apply_effects(&base, effects, &ctx);
    let result = calculate_profile(&outcome.profile)?;

    Ok(KitBuild {
        result,
        profile: outcome.profile,
        requires_simulation: outcome.requires_simulation,
    })
}
