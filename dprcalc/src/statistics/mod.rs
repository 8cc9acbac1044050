pub mod expected;
pub mod probability;
pub mod roller;
