//! The database models of the Maplist.

mod entities;
pub use entities::*;

pub mod types;
