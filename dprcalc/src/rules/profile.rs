use std::collections::BTreeSet;

use derive_more::{From, IntoIterator};
use serde::{Deserialize, Serialize};

use crate::{
    error::{DprError, Result},
    rules::{
        damage::{DamageComponent, DamageComponentInput, components_from_input},
        whole_number,
    },
    statistics::probability::Advantage,
};

pub const DEFAULT_CRIT_RANGE: i32 = 20;

/// Free-form labels on a profile ("melee", "heavy", "spell", ...) that effects
/// use to decide whether they apply.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, From, IntoIterator, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        self.0.insert(tag.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Everything needed to evaluate one attack against one target.
///
/// Profiles are plain values. Nothing in this crate mutates a profile it was
/// handed; transformations return a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AttackProfileInput")]
pub struct AttackProfile {
    pub attack_bonus: i32,
    #[serde(rename = "targetAC")]
    pub target_ac: i32,
    /// Lowest d20 face that crits. Clamped to `[2, 20]` when probabilities
    /// are computed, stored as given.
    pub crit_range: i32,
    pub damage: Vec<DamageComponent>,
    pub advantage: bool,
    pub disadvantage: bool,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

impl AttackProfile {
    pub fn new(attack_bonus: i32, target_ac: i32, damage: Vec<DamageComponent>) -> Self {
        Self {
            attack_bonus,
            target_ac,
            crit_range: DEFAULT_CRIT_RANGE,
            damage,
            advantage: false,
            disadvantage: false,
            tags: Tags::default(),
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

    pub fn with_target_ac(mut self, target_ac: i32) -> Self {
        self.target_ac = target_ac;
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_damage(mut self, component: DamageComponent) -> Self {
        self.damage.push(component);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Resolves the two flags into a single roll mode; both set cancel out.
    pub fn roll_mode(&self) -> Advantage {
        Advantage::from_flags(self.advantage, self.disadvantage)
    }
}

/// Loosely typed attack profile as it arrives from a transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackProfileInput {
    pub attack_bonus: f64,
    #[serde(rename = "targetAC")]
    pub target_ac: f64,
    #[serde(default)]
    pub crit_range: Option<f64>,
    #[serde(default)]
    pub damage: Vec<DamageComponentInput>,
    #[serde(default)]
    pub advantage: Option<bool>,
    #[serde(default)]
    pub disadvantage: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn integer_field(field: &'static str, value: f64) -> Result<i32> {
    whole_number(value)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(DprError::InvalidProfile { field, value })
}

impl TryFrom<AttackProfileInput> for AttackProfile {
    type Error = DprError;

    fn try_from(input: AttackProfileInput) -> Result<Self> {
        let attack_bonus = integer_field("attackBonus", input.attack_bonus)?;
        let target_ac = integer_field("targetAC", input.target_ac)?;
        let crit_range = match input.crit_range {
            Some(crit_range) => integer_field("critRange", crit_range)?,
            None => DEFAULT_CRIT_RANGE,
        };
        let damage = components_from_input(input.damage)?;

        Ok(Self {
            attack_bonus,
            target_ac,
            crit_range,
            damage,
            advantage: input.advantage.unwrap_or(false),
            disadvantage: input.disadvantage.unwrap_or(false),
            tags: input.tags.unwrap_or_default().into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::dice::DiceTerm;

    #[test]
    fn test_deserialize_defaults() {
        let profile: AttackProfile = serde_json::from_str(
            r#"{
                "attackBonus": 7,
                "targetAC": 15,
                "damage": [{"expr": [{"count": 2, "sides": 6}], "bonus": 3}]
            }"#,
        )
        .unwrap();

        let expected = AttackProfile::new(
            7,
            15,
            vec![DamageComponent::new(vec![DiceTerm::new(2, 6, 0).unwrap()], Some(3))],
        );
        assert_eq!(profile, expected);
        assert_eq!(profile.roll_mode(), Advantage::Normal);
    }

    #[test]
    fn test_non_integer_fields_rejected() {
        let result = serde_json::from_str::<AttackProfileInput>(
            r#"{"attackBonus": 7.5, "targetAC": 15, "damage": [{"bonus": 3}]}"#,
        )
        .map(AttackProfile::try_from)
        .unwrap();
        assert_eq!(
            result,
            Err(DprError::InvalidProfile {
                field: "attackBonus",
                value: 7.5
            })
        );

        let result = serde_json::from_str::<AttackProfileInput>(
            r#"{"attackBonus": 7, "targetAC": 14.2, "damage": [{"bonus": 3}]}"#,
        )
        .map(AttackProfile::try_from)
        .unwrap();
        assert!(matches!(
            result,
            Err(DprError::InvalidProfile {
                field: "targetAC",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_damage_rejected() {
        let result = serde_json::from_str::<AttackProfile>(
            r#"{"attackBonus": 7, "targetAC": 15, "damage": []}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_roll_mode_cancels() {
        let profile = AttackProfile::new(5, 15, vec![DamageComponent::flat(1)])
            .with_advantage(true)
            .with_disadvantage(true);
        assert_eq!(profile.roll_mode(), Advantage::Normal);
        assert_eq!(
            profile.clone().with_disadvantage(false).roll_mode(),
            Advantage::Advantage
        );
        assert_eq!(
            profile.with_advantage(false).roll_mode(),
            Advantage::Disadvantage
        );
    }

    #[test]
    fn test_serialize_round_trip_keeps_tags() {
        let profile = AttackProfile::new(6, 15, vec![DamageComponent::flat(3)])
            .with_tags(["ranged", "weapon"]);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains(r#""targetAC":15"#));
        let back: AttackProfile = serde_json::from_str(&json).unwrap();
        assert!(back.has_tag("ranged"));
        assert_eq!(back, profile);
    }
}
