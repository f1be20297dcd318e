// Pipelines: one reshare coordinator, two ways to feed it.

pub mod locks;
pub mod poll;
pub mod reshare;
pub mod stream;

pub use reshare::{HandleOutcome, ReshareCoordinator, ReshareOutcome, TickSummary};
