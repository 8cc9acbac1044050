use serde::{Deserialize, Serialize};

use crate::{
    error::{DprError, Result},
    rules::{
        dice::{self, DiceTerm, DiceTermInput},
        whole_number,
    },
};

/// One source of damage on an attack: some dice, an optional flat bonus, and
/// whether a critical hit doubles the dice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DamageComponentInput")]
pub struct DamageComponent {
    pub expr: Vec<DiceTerm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<i32>,
    pub crit_doubles_dice: bool,
}

impl DamageComponent {
    pub fn new(expr: Vec<DiceTerm>, bonus: Option<i32>) -> Self {
        Self {
            expr,
            bonus,
            crit_doubles_dice: true,
        }
    }

    /// Dice-only damage that doubles on a crit.
    pub fn dice(expr: Vec<DiceTerm>) -> Self {
        Self::new(expr, None)
    }

    /// A flat amount with no dice, e.g. a rage bonus.
    pub fn flat(bonus: i32) -> Self {
        Self {
            expr: Vec::new(),
            bonus: Some(bonus),
            crit_doubles_dice: false,
        }
    }

    pub fn crit_doubles_dice(mut self, doubles: bool) -> Self {
        self.crit_doubles_dice = doubles;
        self
    }

    /// Average of this component alone.
    pub fn average(&self, is_crit: bool) -> f64 {
        let dice_avg = dice::average(&self.expr);
        let dice_total = if is_crit && self.crit_doubles_dice {
            dice_avg * 2.0
        } else {
            dice_avg
        };
        dice_total + self.bonus.unwrap_or(0) as f64
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty() && self.bonus.is_none()
    }
}

impl std::fmt::Display for DamageComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, term) in self.expr.iter().enumerate() {
            if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{term}")?;
        }
        match self.bonus {
            Some(bonus) if self.expr.is_empty() => write!(f, "{bonus}")?,
            Some(bonus) if bonus >= 0 => write!(f, "+{bonus}")?,
            Some(bonus) => write!(f, "{bonus}")?,
            None => {}
        }
        if !self.crit_doubles_dice && !self.expr.is_empty() {
            write!(f, " (no crit doubling)")?;
        }
        Ok(())
    }
}

/// Sum of component averages, with crit doubling applied where allowed.
/// An empty list averages to zero.
pub fn average_damage(components: &[DamageComponent], is_crit: bool) -> f64 {
    components.iter().map(|c| c.average(is_crit)).sum()
}

/// Checks the structure of a damage list: it must be non-empty and every
/// component needs at least one dice term or a bonus.
///
/// Individual dice terms are validated when they are constructed.
pub fn validate_components(components: &[DamageComponent]) -> Result<()> {
    if components.is_empty() {
        return Err(DprError::EmptyDamageList);
    }
    for (component, c) in components.iter().enumerate() {
        if c.is_empty() {
            return Err(DprError::InvalidDamageComponent { component });
        }
    }
    Ok(())
}

/// Loosely typed damage component as it arrives from a transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageComponentInput {
    #[serde(default)]
    pub expr: Vec<DiceTermInput>,
    #[serde(default)]
    pub bonus: Option<f64>,
    #[serde(default)]
    pub crit_doubles_dice: Option<bool>,
}

impl DamageComponentInput {
    /// Converts to a [`DamageComponent`], reporting `component` as the
    /// position of this entry in its damage list.
    pub fn into_component(self, component: usize) -> Result<DamageComponent> {
        let bonus = match self.bonus {
            None => None,
            Some(bonus) => Some(
                whole_number(bonus)
                    .and_then(|b| i32::try_from(b).ok())
                    .ok_or(DprError::InvalidDamageBonus { component, bonus })?,
            ),
        };

        let expr = self
            .expr
            .into_iter()
            .enumerate()
            .map(|(term, input)| {
                DiceTerm::try_from(input).map_err(|e| DprError::InvalidDiceTerm {
                    component,
                    term,
                    reason: match e {
                        DprError::InvalidDice(reason) => reason,
                        other => other.to_string(),
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DamageComponent {
            expr,
            bonus,
            crit_doubles_dice: self.crit_doubles_dice.unwrap_or(true),
        })
    }
}

/// A component on its own is reported as component 0. Inside a profile the
/// list conversion in [`components_from_input`] reports real positions.
impl TryFrom<DamageComponentInput> for DamageComponent {
    type Error = DprError;

    fn try_from(input: DamageComponentInput) -> Result<Self> {
        let component = input.into_component(0)?;
        if component.is_empty() {
            return Err(DprError::InvalidDamageComponent { component: 0 });
        }
        Ok(component)
    }
}

/// Converts a whole damage list, reporting component and term positions.
pub fn components_from_input(inputs: Vec<DamageComponentInput>) -> Result<Vec<DamageComponent>> {
    if inputs.is_empty() {
        return Err(DprError::EmptyDamageList);
    }
    let components = inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| input.into_component(i))
        .collect::<Result<Vec<_>>>()?;
    validate_components(&components)?;
    Ok(components)
}
