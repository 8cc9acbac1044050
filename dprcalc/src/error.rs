use thiserror::Error;

/// Result type alias using [`DprError`].
pub type Result<T> = std::result::Result<T, DprError>;

/// Every way a calculation can refuse to produce a result.
///
/// Failures are raised immediately and never recovered from inside the crate;
/// presenting them is up to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DprError {
    /// A dice term has a bad count, side count or flat modifier.
    #[error("Invalid dice: {0}")]
    InvalidDice(String),

    /// A dice term inside a damage list is malformed.
    #[error("Invalid dice term {term} in damage component {component}: {reason}")]
    InvalidDiceTerm {
        component: usize,
        term: usize,
        reason: String,
    },

    /// A damage component has neither dice nor a flat bonus.
    #[error("Damage component {component} must have at least one dice term or a bonus")]
    InvalidDamageComponent { component: usize },

    /// A damage bonus is not an integer.
    #[error("Damage bonus must be an integer (component {component}, received {bonus})")]
    InvalidDamageBonus { component: usize, bonus: f64 },

    #[error("Damage list must not be empty")]
    EmptyDamageList,

    /// `attackBonus` or `targetAC` is not an integer.
    #[error("{field} must be an integer (received {value})")]
    InvalidProfile { field: &'static str, value: f64 },

    #[error("Invalid simulation input: {0}")]
    InvalidSimulationInput(String),

    #[error("Character level must be between 1 and 20 (received {0})")]
    InvalidLevel(i64),

    #[error("Target's AC must be an integer greater than 0 (received {0})")]
    InvalidTargetAC(i64),

    #[error("Class kit not found: {0}")]
    KitNotFound(String),

    #[error("Invalid ability {0:?}, use one of str, dex, con, int, wis, cha")]
    InvalidAbility(String),

    #[error("Ability score {ability} must be an integer in range 3 - 25 (received {score})")]
    InvalidAbilityScore { ability: &'static str, score: i64 },

    #[error("Failed to parse dice expression {0:?}")]
    InvalidDiceExpression(String),
}
