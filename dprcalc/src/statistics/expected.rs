use serde::{Deserialize, Serialize};

use crate::{
    error::{DprError, Result},
    rules::{
        damage::{average_damage, validate_components},
        profile::{AttackProfile, DEFAULT_CRIT_RANGE},
    },
    statistics::probability::{Advantage, crit_probability, hit_probability},
};

/// Expected damage of one attack from its outcome probabilities and the
/// average damage of each outcome.
///
/// `hit_chance` includes crits. The non-crit share is floored at zero so a
/// crit chance above the hit chance is never counted twice.
pub fn expected_damage(hit_chance: f64, crit_chance: f64, avg_on_hit: f64, avg_on_crit: f64) -> f64 {
    let non_crit = (hit_chance - crit_chance).max(0.0);
    non_crit * avg_on_hit + crit_chance * avg_on_crit
}

/// Expected damage per round of a fully described attack.
pub fn expected_damage_from_profile(profile: &AttackProfile) -> Result<f64> {
    let input = calc_input_from_profile(profile)?;
    Ok(calculate_unchecked(&input).expected_damage)
}

/// Scalar description of an attack, with damage already averaged. This is
/// both the quick-calculation input and the simulator's parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcInput {
    pub attack_bonus: i32,
    #[serde(rename = "targetAC")]
    pub target_ac: i32,
    #[serde(default = "default_crit_range")]
    pub crit_range: i32,
    pub avg_on_hit: f64,
    pub avg_on_crit: f64,
    #[serde(default)]
    pub advantage: bool,
    #[serde(default)]
    pub disadvantage: bool,
}

fn default_crit_range() -> i32 {
    DEFAULT_CRIT_RANGE
}

impl CalcInput {
    pub fn new(attack_bonus: i32, target_ac: i32, avg_on_hit: f64, avg_on_crit: f64) -> Self {
        Self {
            attack_bonus,
            target_ac,
            crit_range: DEFAULT_CRIT_RANGE,
            avg_on_hit,
            avg_on_crit,
            advantage: false,
            disadvantage: false,
        }
    }

    pub fn with_crit_range(mut self, crit_range: i32) -> Self {
        self.crit_range = crit_range;
        self
    }

    pub fn with_advantage(mut self, advantage: bool) -> Self {
        self.advantage = advantage;
        self
    }

    pub fn with_disadvantage(mut self, disadvantage: bool) -> Self {
        self.disadvantage = disadvantage;
        self
    }

    pub fn roll_mode(&self) -> Advantage {
        Advantage::from_flags(self.advantage, self.disadvantage)
    }

    /// Rejects non-finite or negative damage averages and a target AC below 1.
    pub fn validate(&self) -> Result<()> {
        if !self.avg_on_hit.is_finite() || !self.avg_on_crit.is_finite() {
            return Err(DprError::InvalidSimulationInput(format!(
                "average damage must be finite (on hit {}, on crit {})",
                self.avg_on_hit, self.avg_on_crit
            )));
        }
        if self.avg_on_hit < 0.0 || self.avg_on_crit < 0.0 {
            return Err(DprError::InvalidSimulationInput(format!(
                "average damage must be non-negative (on hit {}, on crit {})",
                self.avg_on_hit, self.avg_on_crit
            )));
        }
        if self.target_ac < 1 {
            return Err(DprError::InvalidSimulationInput(format!(
                "target's AC must be at least 1 (received {})",
                self.target_ac
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcResult {
    pub hit_chance: f64,
    pub crit_chance: f64,
    pub expected_damage: f64,
}

/// Validates a profile's damage and reduces it to a [`CalcInput`].
pub fn calc_input_from_profile(profile: &AttackProfile) -> Result<CalcInput> {
    validate_components(&profile.damage)?;
    Ok(CalcInput {
        attack_bonus: profile.attack_bonus,
        target_ac: profile.target_ac,
        crit_range: profile.crit_range,
        avg_on_hit: average_damage(&profile.damage, false),
        avg_on_crit: average_damage(&profile.damage, true),
        advantage: profile.advantage,
        disadvantage: profile.disadvantage,
    })
}

/// Hit chance, crit chance and expected damage for already-averaged damage.
pub fn calculate(input: &CalcInput) -> Result<CalcResult> {
    input.validate()?;
    Ok(calculate_unchecked(input))
}

/// Hit chance, crit chance and expected damage for a profile.
pub fn calculate_profile(profile: &AttackProfile) -> Result<CalcResult> {
    let input = calc_input_from_profile(profile)?;
    Ok(calculate_unchecked(&input))
}

fn calculate_unchecked(input: &CalcInput) -> CalcResult {
    let mode = input.roll_mode();
    let hit_chance = hit_probability(input.attack_bonus, input.target_ac, mode);
    let crit_chance = crit_probability(input.crit_range, mode);
    CalcResult {
        hit_chance,
        crit_chance,
        expected_damage: expected_damage(
            hit_chance,
            crit_chance,
            input.avg_on_hit,
            input.avg_on_crit,
        ),
    }
}

pub const SWEEP_POINTS: i32 = 11;
pub const SWEEP_OFFSET: i32 = 3;

/// Expected DPR at one target AC under each roll mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DprPoint {
    pub ac: i32,
    pub dpr_normal: f64,
    pub dpr_advantage: f64,
    pub dpr_disadvantage: f64,
}

/// Expected DPR across [`SWEEP_POINTS`] consecutive target ACs, starting
/// [`SWEEP_OFFSET`] below the profile's own AC (or at it, for ACs below 4).
/// Near `i32::MAX` the window is shifted down so it ends at `i32::MAX`.
/// The profile's advantage flags are ignored; every mode is reported.
pub fn dpr_vs_ac(profile: &AttackProfile) -> Result<Vec<DprPoint>> {
    let base = calc_input_from_profile(profile)?;
    let start = if base.target_ac > SWEEP_OFFSET {
        base.target_ac - SWEEP_OFFSET
    } else {
        base.target_ac
    };
    // keep the last point representable
    let start = start.min(i32::MAX - (SWEEP_POINTS - 1));

    let dpr_at = |ac: i32, advantage: bool, disadvantage: bool| {
        let input = CalcInput {
            target_ac: ac,
            advantage,
            disadvantage,
            ..base
        };
        calculate_unchecked(&input).expected_damage
    };

    let points = (0..SWEEP_POINTS)
        .map(|i| start + i)
        .map(|ac| DprPoint {
            ac,
            dpr_normal: dpr_at(ac, false, false),
            dpr_advantage: dpr_at(ac, true, false),
            dpr_disadvantage: dpr_at(ac, false, true),
        })
        .collect();
    Ok(points)
}

#[cfg(test)]
mod tests {
    use statrs::assert_almost_eq;

    use super::*;
    use crate::rules::{damage::DamageComponent, dice::DiceTerm};

    fn two_d6_plus_three(attack_bonus: i32, target_ac: i32) -> AttackProfile {
        AttackProfile::new(
            attack_bonus,
            target_ac,
            vec![DamageComponent::new(vec![DiceTerm::new(2, 6, 0).unwrap()], Some(3))],
        )
    }

    #[test]
    fn test_expected_damage() {
        assert_almost_eq!(expected_damage(0.65, 0.05, 10.0, 20.0), 7.0, 1e-12);
        assert_almost_eq!(expected_damage(0.8775, 0.05, 10.0, 20.0), 9.275, 1e-12);
        assert_almost_eq!(expected_damage(0.4225, 0.05, 10.0, 20.0), 4.725, 1e-12);
    }

    #[test]
    fn test_expected_damage_equal_hit_and_crit_damage() {
        assert_almost_eq!(expected_damage(0.65, 0.05, 10.0, 10.0), 6.5, 1e-12);
    }

    #[test]
    fn test_expected_damage_crit_above_hit_not_double_counted() {
        assert_almost_eq!(expected_damage(0.05, 0.1, 10.0, 20.0), 2.0, 1e-12);
    }

    #[test]
    fn test_expected_damage_from_profile() {
        let profile = two_d6_plus_three(7, 15);
        assert_almost_eq!(expected_damage_from_profile(&profile).unwrap(), 6.85, 1e-9);

        let advantage = profile.clone().with_advantage(true);
        assert_almost_eq!(
            expected_damage_from_profile(&advantage).unwrap(),
            9.4575,
            1e-9
        );

        let disadvantage = profile.clone().with_disadvantage(true);
        assert_almost_eq!(
            expected_damage_from_profile(&disadvantage).unwrap(),
            4.2425,
            1e-9
        );

        let both = profile.with_advantage(true).with_disadvantage(true);
        assert_almost_eq!(expected_damage_from_profile(&both).unwrap(), 6.85, 1e-9);
    }

    #[test]
    fn test_expected_damage_from_profile_validates_damage() {
        let empty = AttackProfile::new(7, 15, vec![]);
        assert_eq!(
            expected_damage_from_profile(&empty),
            Err(DprError::EmptyDamageList)
        );

        let hollow = AttackProfile::new(7, 15, vec![DamageComponent::new(vec![], None)]);
        assert_eq!(
            expected_damage_from_profile(&hollow),
            Err(DprError::InvalidDamageComponent { component: 0 })
        );
    }

    #[test]
    fn test_crit_doubling_raises_expected_damage() {
        let doubling = two_d6_plus_three(7, 15);
        let mut flat = doubling.clone();
        flat.damage[0].crit_doubles_dice = false;
        assert!(
            expected_damage_from_profile(&doubling).unwrap()
                > expected_damage_from_profile(&flat).unwrap()
        );
    }

    #[test]
    fn test_calculate_matches_profile() {
        let input = CalcInput::new(7, 15, 10.0, 17.0);
        let scalar = calculate(&input).unwrap();
        let profile = calculate_profile(&two_d6_plus_three(7, 15)).unwrap();
        assert_almost_eq!(scalar.expected_damage, profile.expected_damage, 1e-12);
        assert_almost_eq!(scalar.crit_chance, 0.05, 1e-12);
        assert_almost_eq!(scalar.hit_chance, 0.65, 1e-12);
    }

    #[test]
    fn test_calculate_rejects_bad_input() {
        for input in [
            CalcInput::new(7, 0, 10.0, 17.0),
            CalcInput::new(7, 15, -1.0, 17.0),
            CalcInput::new(7, 15, 10.0, f64::NAN),
            CalcInput::new(7, 15, f64::INFINITY, 17.0),
        ] {
            assert!(matches!(
                calculate(&input),
                Err(DprError::InvalidSimulationInput(_))
            ));
        }
    }

    #[test]
    fn test_calc_input_from_profile() {
        let input = calc_input_from_profile(&two_d6_plus_three(7, 15).with_crit_range(19)).unwrap();
        assert_eq!(input.avg_on_hit, 10.0);
        assert_eq!(input.avg_on_crit, 17.0);
        assert_eq!(input.crit_range, 19);
    }

    #[test]
    fn test_dpr_vs_ac() {
        let points = dpr_vs_ac(&two_d6_plus_three(7, 15)).unwrap();
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].ac, 12);
        assert_eq!(points[10].ac, 22);

        let at_15 = points.iter().find(|p| p.ac == 15).unwrap();
        assert_almost_eq!(at_15.dpr_normal, 6.85, 1e-9);
        assert_almost_eq!(at_15.dpr_advantage, 9.4575, 1e-9);
        assert_almost_eq!(at_15.dpr_disadvantage, 4.2425, 1e-9);

        for pair in points.windows(2) {
            assert!(pair[1].dpr_normal <= pair[0].dpr_normal);
        }
        for point in &points {
            assert!(point.dpr_advantage >= point.dpr_normal);
            assert!(point.dpr_normal >= point.dpr_disadvantage);
        }
    }

    #[test]
    fn test_dpr_vs_ac_extreme_ac() {
        let profile = AttackProfile::new(7, i32::MAX, vec![DamageComponent::flat(3)]);
        let points = dpr_vs_ac(&profile).unwrap();
        assert_eq!(points.len(), 11);
        assert_eq!(points[10].ac, i32::MAX);
        for point in &points {
            assert_almost_eq!(point.dpr_normal, 0.15, 1e-12);
        }

        let points = dpr_vs_ac(&profile.with_target_ac(i32::MIN)).unwrap();
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].ac, i32::MIN);
    }

    #[test]
    fn test_dpr_vs_ac_low_ac_starts_at_profile_ac() {
        let points = dpr_vs_ac(&two_d6_plus_three(7, 3)).unwrap();
        assert_eq!(points[0].ac, 3);
    }
}
