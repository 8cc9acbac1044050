pub mod catalog;
pub mod pipeline;

pub use pipeline::{Effect, EffectContext, EffectInfo, EffectOutcome, EffectTag, apply_effects};
