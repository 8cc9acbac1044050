use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::{
    error::{DprError, Result},
    rules::whole_number,
};

/// The polyhedral dice a damage expression may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Die {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl Die {
    pub fn all() -> [Die; 6] {
        [Die::D4, Die::D6, Die::D8, Die::D10, Die::D12, Die::D20]
    }

    pub fn sides(self) -> u32 {
        match self {
            Die::D4 => 4,
            Die::D6 => 6,
            Die::D8 => 8,
            Die::D10 => 10,
            Die::D12 => 12,
            Die::D20 => 20,
        }
    }

    /// Mean face value, `(sides + 1) / 2`.
    pub fn average(self) -> f64 {
        (self.sides() as f64 + 1.0) / 2.0
    }
}

impl TryFrom<u32> for Die {
    type Error = DprError;

    fn try_from(sides: u32) -> Result<Self> {
        Die::all()
            .into_iter()
            .find(|die| die.sides() == sides)
            .ok_or_else(|| {
                DprError::InvalidDice(format!(
                    "dice must have 4, 6, 8, 10, 12 or 20 sides (received {sides})"
                ))
            })
    }
}

impl From<Die> for u32 {
    fn from(die: Die) -> Self {
        die.sides()
    }
}

/// `count` dice of one size plus a non-negative flat amount, e.g. `2d6+3`.
///
/// Fields are private so that a `DiceTerm` can only exist in a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DiceTermInput")]
pub struct DiceTerm {
    count: u32,
    sides: Die,
    #[serde(skip_serializing_if = "is_zero")]
    plus: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl DiceTerm {
    pub fn new(count: u32, sides: u32, plus: u32) -> Result<Self> {
        if count == 0 {
            return Err(DprError::InvalidDice(
                "there must be at least one whole number die rolled".to_string(),
            ));
        }
        Ok(Self {
            count,
            sides: Die::try_from(sides)?,
            plus,
        })
    }

    /// `count` dice of one size with no flat modifier.
    pub const fn dice(count: NonZeroU32, die: Die) -> Self {
        Self {
            count: count.get(),
            sides: die,
            plus: 0,
        }
    }

    /// A single die, e.g. `1d6`.
    pub const fn single(die: Die) -> Self {
        Self::dice(NonZeroU32::MIN, die)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn die(&self) -> Die {
        self.sides
    }

    pub fn plus(&self) -> u32 {
        self.plus
    }

    pub fn with_plus(mut self, plus: u32) -> Self {
        self.plus = plus;
        self
    }

    pub fn average(&self) -> f64 {
        self.count as f64 * self.sides.average() + self.plus as f64
    }
}

impl std::fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides.sides())?;
        if self.plus > 0 {
            write!(f, "+{}", self.plus)?;
        }
        Ok(())
    }
}

/// Loosely typed dice term as it arrives from a transport layer, where every
/// number is a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiceTermInput {
    pub count: f64,
    pub sides: f64,
    #[serde(default)]
    pub plus: Option<f64>,
}

impl TryFrom<DiceTermInput> for DiceTerm {
    type Error = DprError;

    fn try_from(input: DiceTermInput) -> Result<Self> {
        let count = whole_number(input.count)
            .filter(|&count| count >= 1)
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| {
                DprError::InvalidDice(format!(
                    "there must be at least one whole number die rolled (received {})",
                    input.count
                ))
            })?;

        let sides = whole_number(input.sides)
            .and_then(|sides| u32::try_from(sides).ok())
            .ok_or_else(|| {
                DprError::InvalidDice(format!(
                    "dice must have 4, 6, 8, 10, 12 or 20 sides (received {})",
                    input.sides
                ))
            })?;

        let plus = match input.plus {
            None => 0,
            Some(plus) => whole_number(plus)
                .filter(|&plus| plus >= 0)
                .and_then(|plus| u32::try_from(plus).ok())
                .ok_or_else(|| {
                    DprError::InvalidDice(format!(
                        "flat modifiers must be non-negative integers (received {plus})"
                    ))
                })?,
        };

        DiceTerm::new(count, sides, plus)
    }
}

impl From<DiceTerm> for DiceTermInput {
    fn from(term: DiceTerm) -> Self {
        Self {
            count: term.count as f64,
            sides: term.sides.sides() as f64,
            plus: Some(term.plus as f64),
        }
    }
}

/// Average value of a dice expression; an empty expression averages to zero.
pub fn average(expr: &[DiceTerm]) -> f64 {
    expr.iter().map(DiceTerm::average).sum()
}
