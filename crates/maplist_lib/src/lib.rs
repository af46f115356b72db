//! The core crate of the Maplist.
//!
//! It contains the four parts every service of the Maplist relies on: the permission model,
//! the placement ledger of the maps, the scoring engine, and the achievement role synchronizer.
//! It also contains the environment setup functions, and the operations writing the completions
//! and the tuning constants.
//!
//! No function of this crate holds a global connection: every store-backed operation takes
//! the connection, or the transaction, it must run on.

#![warn(missing_docs)]

mod env;

pub mod achievements;
pub mod completion;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod map;
pub mod must;
pub mod permissions;
pub mod pool;
pub mod scoring;
pub mod txn;

use std::future::Future;

pub use env::*;
pub use pool::Database;

/// Asserts that the type of the provided future is Send, and returns an opaque type from it.
///
/// This helps the compiler to correctly type the values of some await points, and helps
/// to trace the root of weird errors.
#[inline(always)]
pub fn assert_future_send<T, R>(t: T) -> impl Future<Output = R> + Send
where
    T: Future<Output = R> + Send,
{
    t
}
