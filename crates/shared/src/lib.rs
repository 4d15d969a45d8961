pub mod domain;
pub mod error;
pub mod protocol;

pub use domain::{DispatchId, HistoryEntry, InteractionMode, UnknownMode};
