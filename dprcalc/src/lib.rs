pub mod effects;
pub mod error;
pub mod kits;
pub mod roll_parser;
pub mod rules;
pub mod simulation;
pub mod statistics;

pub mod prelude {
    pub use crate::{
        effects::{Effect, EffectContext, EffectInfo, EffectOutcome, EffectTag, apply_effects, catalog},
        error::{DprError, Result},
        kits::{ClassKit, KitBuild, all_kits, build_from_kit, find_kit},
        roll_parser::parse_dice_expr,
        rules::{
            abilities::{Ability, AbilityScores, ability_modifier, proficiency_bonus, to_hit},
            damage::{DamageComponent, average_damage},
            dice::{DiceTerm, Die},
            profile::AttackProfile,
        },
        simulation::monte_carlo::{SimResult, clamp_trials, simulate, simulate_dpr, simulate_profile},
        statistics::{
            expected::{
                CalcInput, CalcResult, DprPoint, calculate, calculate_profile, dpr_vs_ac,
                expected_damage, expected_damage_from_profile,
            },
            probability::{Advantage, crit_probability, hit_probability},
            roller::Roller,
        },
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_demo() -> Result<()> {
        let warlock = find_kit("warlock").ok_or(DprError::KitNotFound("warlock".into()))?;
        let blast = warlock.attacks[0].profile.clone();
        println!("{} {}: {}", warlock.label, warlock.attacks[0].label, blast.damage[0]);

        let ctx = EffectContext::at_level(5).with_ability_scores(
            AbilityScores::default().with_score(Ability::Charisma, 18)?,
        );
        let outcome = apply_effects(&blast, catalog::select(&warlock.available_effects), &ctx);
        let profile = outcome.profile;

        let analytic = calculate_profile(&profile)?;
        println!(
            "Hit {:.2}%, crit {:.2}%, DPR {:.3}",
            analytic.hit_chance * 100.0,
            analytic.crit_chance * 100.0,
            analytic.expected_damage
        );

        let mut roller = Roller::test_rng();
        let sim = simulate_profile(clamp_trials(50_000), &profile, &mut roller)?;
        println!("Simulated DPR {:.3} [{:.3}, {:.3}]", sim.mean, sim.ci_low, sim.ci_high);
        assert!((sim.mean - analytic.expected_damage).abs() < 0.05 * analytic.expected_damage);

        let kit = build_from_kit("warlock", 5, &warlock.available_effects, 15)?;
        for point in dpr_vs_ac(&kit.profile)? {
            println!(
                "AC {:>2}: {:>6.3} / {:>6.3} / {:>6.3}",
                point.ac, point.dpr_normal, point.dpr_advantage, point.dpr_disadvantage
            );
        }

        Ok(())
    }
}
