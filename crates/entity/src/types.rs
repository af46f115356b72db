//! Typed columns shared by several entities.

mod expert_tier;
mod format;
mod metric;

pub use expert_tier::*;
pub use format::*;
pub use metric::*;
