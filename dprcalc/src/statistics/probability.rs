use serde::{Deserialize, Serialize};

/// How a d20 check is rolled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Advantage and disadvantage together cancel to a normal roll.
    pub fn from_flags(advantage: bool, disadvantage: bool) -> Self {
        match (advantage, disadvantage) {
            (true, false) => Advantage::Advantage,
            (false, true) => Advantage::Disadvantage,
            _ => Advantage::Normal,
        }
    }

    /// Lifts a single-roll success probability to this roll mode, treating the
    /// two rolls as independent checks.
    pub fn combine(self, p: f64) -> f64 {
        match self {
            Advantage::Normal => p,
            Advantage::Advantage => 1.0 - (1.0 - p).powi(2),
            Advantage::Disadvantage => p.powi(2),
        }
    }
}

pub const MIN_CRIT_RANGE: i32 = 2;
pub const MAX_CRIT_RANGE: i32 = 20;

/// Whether a single d20 face hits. A natural 20 always hits and a natural 1
/// always misses.
pub fn face_hits(face: i32, attack_bonus: i32, target_ac: i32) -> bool {
    match face {
        20 => true,
        1 => false,
        _ => face as i64 + attack_bonus as i64 >= target_ac as i64,
    }
}

/// Probability of hitting `target_ac` with `attack_bonus`. Always strictly
/// between 0 and 1.
pub fn hit_probability(attack_bonus: i32, target_ac: i32, advantage: Advantage) -> f64 {
    let hits = (1..=20)
        .filter(|&face| face_hits(face, attack_bonus, target_ac))
        .count();
    advantage.combine(hits as f64 / 20.0)
}

pub fn clamp_crit_range(crit_range: i32) -> i32 {
    crit_range.clamp(MIN_CRIT_RANGE, MAX_CRIT_RANGE)
}

/// Probability of a critical hit when faces `crit_range..=20` crit.
/// `crit_range` is clamped to `[2, 20]`, so a normal roll lands in `[0.05, 0.95]`.
pub fn crit_probability(crit_range: i32, advantage: Advantage) -> f64 {
    let crit_range = clamp_crit_range(crit_range);
    let p = (21 - crit_range) as f64 / 20.0;
    advantage.combine(p)
}

/// Exact hit probability from all 400 ordered pairs of d20 faces, keeping the
/// higher face on advantage and the lower one on disadvantage.
pub fn two_dice_hit_probability(attack_bonus: i32, target_ac: i32, advantage: Advantage) -> f64 {
    two_dice_probability(advantage, |face| face_hits(face, attack_bonus, target_ac))
}

/// Exact crit probability from all 400 ordered pairs of d20 faces.
pub fn two_dice_crit_probability(crit_range: i32, advantage: Advantage) -> f64 {
    let crit_range = clamp_crit_range(crit_range);
    two_dice_probability(advantage, |face| face >= crit_range)
}

fn two_dice_probability(advantage: Advantage, succeeds: impl Fn(i32) -> bool) -> f64 {
    let mut successes = 0u32;
    for first in 1..=20 {
        for second in 1..=20 {
            let kept = match advantage {
                Advantage::Normal => first,
                Advantage::Advantage => first.max(second),
                Advantage::Disadvantage => first.min(second),
            };
            if succeeds(kept) {
                successes += 1;
            }
        }
    }
    successes as f64 / 400.0
}
