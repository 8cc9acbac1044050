use serde::{Deserialize, Serialize};

use crate::error::{DprError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "str")]
    Strength,
    #[serde(rename = "dex")]
    Dexterity,
    #[serde(rename = "con")]
    Constitution,
    #[serde(rename = "int")]
    Intelligence,
    #[serde(rename = "wis")]
    Wisdom,
    #[serde(rename = "cha")]
    Charisma,
}

impl Ability {
    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }
}

impl std::str::FromStr for Ability {
    type Err = DprError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Ability::all()
            .into_iter()
            .find(|ability| ability.short_name() == key)
            .ok_or_else(|| DprError::InvalidAbility(s.to_string()))
    }
}

pub const MIN_ABILITY_SCORE: u32 = 3;
pub const MAX_ABILITY_SCORE: u32 = 25;

/// The six ability scores, each within `3..=25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AbilityScoresInput")]
pub struct AbilityScores {
    str: u32,
    dex: u32,
    con: u32,
    int: u32,
    wis: u32,
    cha: u32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            str: 10,
            dex: 10,
            con: 10,
            int: 10,
            wis: 10,
            cha: 10,
        }
    }
}

impl AbilityScores {
    pub fn with_score(mut self, ability: Ability, score: u32) -> Result<Self> {
        self.set(ability, score)?;
        Ok(self)
    }

    pub fn get(&self, ability: Ability) -> u32 {
        match ability {
            Ability::Strength => self.str,
            Ability::Dexterity => self.dex,
            Ability::Constitution => self.con,
            Ability::Intelligence => self.int,
            Ability::Wisdom => self.wis,
            Ability::Charisma => self.cha,
        }
    }

    fn get_mut(&mut self, ability: Ability) -> &mut u32 {
        match ability {
            Ability::Strength => &mut self.str,
            Ability::Dexterity => &mut self.dex,
            Ability::Constitution => &mut self.con,
            Ability::Intelligence => &mut self.int,
            Ability::Wisdom => &mut self.wis,
            Ability::Charisma => &mut self.cha,
        }
    }

    pub fn set(&mut self, ability: Ability, score: u32) -> Result<()> {
        if !(MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE).contains(&score) {
            return Err(DprError::InvalidAbilityScore {
                ability: ability.short_name(),
                score: score as i64,
            });
        }
        *self.get_mut(ability) = score;
        Ok(())
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }
}

/// Unchecked ability scores as they arrive from a transport layer. Missing
/// scores default to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AbilityScoresInput {
    pub str: i64,
    pub dex: i64,
    pub con: i64,
    pub int: i64,
    pub wis: i64,
    pub cha: i64,
}

impl Default for AbilityScoresInput {
    fn default() -> Self {
        Self {
            str: 10,
            dex: 10,
            con: 10,
            int: 10,
            wis: 10,
            cha: 10,
        }
    }
}

impl TryFrom<AbilityScoresInput> for AbilityScores {
    type Error = DprError;

    fn try_from(input: AbilityScoresInput) -> Result<Self> {
        let raw = [
            (Ability::Strength, input.str),
            (Ability::Dexterity, input.dex),
            (Ability::Constitution, input.con),
            (Ability::Intelligence, input.int),
            (Ability::Wisdom, input.wis),
            (Ability::Charisma, input.cha),
        ];
        let mut scores = AbilityScores::default();
        for (ability, score) in raw {
            let checked = u32::try_from(score).map_err(|_| DprError::InvalidAbilityScore {
                ability: ability.short_name(),
                score,
            })?;
            scores.set(ability, checked)?;
        }
        Ok(scores)
    }
}

/// `floor((score - 10) / 2)`.
pub fn ability_modifier(score: u32) -> i32 {
    (score as i32 - 10).div_euclid(2)
}

/// Proficiency bonus by character level: +2 at 1, rising by one every four
/// levels to +6 at 17.
pub fn proficiency_bonus(level: u32) -> i32 {
    match level {
        17.. => 6,
        13.. => 5,
        9.. => 4,
        5.. => 3,
        _ => 2,
    }
}

/// Attack bonus from an ability modifier plus proficiency, if proficient.
pub fn to_hit(scores: &AbilityScores, level: u32, using: Ability, proficient: bool) -> i32 {
    let proficiency = if proficient {
        proficiency_bonus(level)
    } else {
        0
    };
    scores.modifier(using) + proficiency
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_default() {
        let scores = AbilityScores::default();
        for ability in Ability::all() {
            assert_eq!(scores.get(ability), 10);
            assert_eq!(scores.modifier(ability), 0);
        }
    }

    #[test]
    fn test_modifier() {
        assert_eq!(ability_modifier(3), -4);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(16), 3);
        assert_eq!(ability_modifier(18), 4);
        assert_eq!(ability_modifier(25), 7);
    }

    #[test]
    fn test_score_bounds() {
        let scores = AbilityScores::default();
        assert!(scores.with_score(Ability::Strength, 2).is_err());
        assert!(scores.with_score(Ability::Strength, 26).is_err());
        let scores = scores.with_score(Ability::Charisma, 18).unwrap();
        assert_eq!(scores.modifier(Ability::Charisma), 4);
    }

    #[test]
    fn test_deserialize_validates_scores() {
        let scores: AbilityScores = serde_json::from_str(r#"{"cha": 18}"#).unwrap();
        assert_eq!(scores.modifier(Ability::Charisma), 4);
        assert_eq!(scores.get(Ability::Strength), 10);

        for score in [0, 99, -4] {
            let input = AbilityScoresInput {
                cha: score,
                ..Default::default()
            };
            assert_eq!(
                AbilityScores::try_from(input),
                Err(DprError::InvalidAbilityScore {
                    ability: "cha",
                    score
                })
            );
            let json = format!(r#"{{"cha": {score}}}"#);
            assert!(serde_json::from_str::<AbilityScores>(&json).is_err());
        }
    }

    #[test]
    fn test_proficiency_bonus() {
        let expected = [
            (1, 2),
            (4, 2),
            (5, 3),
            (8, 3),
            (9, 4),
            (13, 5),
            (16, 5),
            (17, 6),
            (20, 6),
        ];
        for (level, bonus) in expected {
            assert_eq!(proficiency_bonus(level), bonus, "level {level}");
        }
    }

    #[test]
    fn test_parse_ability() {
        assert_eq!(" STR ".parse::<Ability>().unwrap(), Ability::Strength);
        assert_eq!("cha".parse::<Ability>().unwrap(), Ability::Charisma);
        assert!(matches!(
            "luck".parse::<Ability>(),
            Err(DprError::InvalidAbility(_))
        ));
    }

    #[test]
    fn test_to_hit() {
        let scores = AbilityScores::default()
            .with_score(Ability::Strength, 18)
            .unwrap();
        assert_eq!(to_hit(&scores, 5, Ability::Strength, true), 7);
        assert_eq!(to_hit(&scores, 5, Ability::Strength, false), 4);
    }
}
