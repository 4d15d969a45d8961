//! Controller layer: terminal events and command orchestration.

pub mod events;
pub mod orchestration;
