//! A module containing the [`MaplistError`] enum, which contains every error of the core.

use entity::types::{Format, Metric};
use sea_orm::TransactionError;

/// An input rejected before touching anything. The caller can always recover by correcting it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[rustfmt::skip]
pub enum ValidationError {
    /// The requested rank is outside the accepted range of the axis.
    #[error("rank {requested} is out of range for format {format}, expected between 1 and {max}")]
    RankOutOfRange {
        /// The axis.
        format: Format,
        /// The requested rank.
        requested: i32,
        /// The highest rank accepted on this axis right now.
        max: i32,
    },
    /// The requested expert tier doesn't exist.
    #[error("invalid expert tier `{0}`, expected a value between 0 and 4")]
    InvalidTier(i32),
    /// The provided format ID doesn't exist.
    #[error("unknown format `{0}`")]
    UnknownFormat(String),
    /// The provided leaderboard metric doesn't exist.
    #[error("unknown leaderboard metric `{0}`")]
    UnknownMetric(String),
    /// The provided tuning constant key doesn't exist.
    #[error("unknown tuning constant `{0}`")]
    UnknownConstant(String),
    /// The value of a tuning constant is invalid.
    #[error("invalid value {value} for tuning constant `{key}`: {reason}")]
    InvalidConstantValue {
        /// The key of the constant.
        key: String,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// A map already uses this code. Codes are never reused.
    #[error("a map with code `{0}` already exists")]
    DuplicateMapCode(String),
    /// No map has this code.
    #[error("map with code `{0}` not found")]
    MapNotFound(String),
    /// The map was deleted from every axis.
    #[error("map with code `{0}` is deleted")]
    MapDeleted(String),
    /// No completion has this ID.
    #[error("completion with ID {0} not found")]
    CompletionNotFound(i32),
    /// No player has this ID.
    #[error("player with ID {0} not found")]
    PlayerNotFound(i64),
    /// The completion was already accepted.
    #[error("completion with ID {0} is already accepted")]
    AlreadyAccepted(i32),
    /// Only pending completions can be rejected.
    #[error("completion with ID {0} was accepted and can't be rejected, delete it instead")]
    CannotRejectAccepted(i32),
    /// A completion must credit at least one player.
    #[error("a completion must credit at least one player")]
    NoPlayers,
    /// A map deletion must name at least one axis.
    #[error("no axis was requested")]
    NoAxes,
    /// The leftover of a least-cost completion can't be negative.
    #[error("invalid leftover {0}, it can't be negative")]
    NegativeLeftover(i64),
    /// Two achievement roles of the same group share a threshold.
    #[error("duplicate threshold {threshold} for the {metric} achievement roles of format {format}")]
    DuplicateThreshold {
        /// The format of the group.
        format: Format,
        /// The metric of the group.
        metric: Metric,
        /// The repeated threshold.
        threshold: i32,
    },
    /// More than one achievement role of the same group is reserved to the first place.
    #[error("more than one first-place role for the {metric} achievement roles of format {format}")]
    SeveralFirstPlaceRoles {
        /// The format of the group.
        format: Format,
        /// The metric of the group.
        metric: Metric,
    },
    /// The achievement role doesn't belong to the group it is written with.
    #[error("achievement role `{0}` doesn't belong to the edited group")]
    ForeignRole(String),
    /// The requested leaderboard page doesn't exist.
    #[error("page {0} is out of range, pages start at 1")]
    PageOutOfRange(u64),
}

impl From<entity::types::InvalidTier> for ValidationError {
    fn from(value: entity::types::InvalidTier) -> Self {
        Self::InvalidTier(value.0)
    }
}

impl From<entity::types::UnknownFormat> for ValidationError {
    fn from(value: entity::types::UnknownFormat) -> Self {
        Self::UnknownFormat(value.0)
    }
}

impl From<entity::types::UnknownMetric> for ValidationError {
    fn from(value: entity::types::UnknownMetric) -> Self {
        Self::UnknownMetric(value.0)
    }
}

/// Represents any type of error that could happen when using this crate.
#[derive(thiserror::Error, Debug)]
#[rustfmt::skip]
pub enum MaplistError {
    // --------
    // --- Caller errors
    // --------

    /// The input of the operation is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The caller lacks a capability.
    #[error("missing the `{permission}` permission{}", in_format(.format))]
    PermissionDenied {
        /// The name of the missing capability.
        permission: &'static str,
        /// The format the capability was required in, `None` for any format.
        format: Option<Format>,
    },

    // --------
    // --- Defects and infrastructure
    // --------

    /// An invariant of the stored data doesn't hold. This is a defect, never a user error.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),
    /// The database failed.
    #[error(transparent)]
    StoreUnavailable(#[from] sea_orm::DbErr),
    /// Another writer modified the same data concurrently. The operation can be retried.
    #[error("concurrent modification of {0}")]
    Conflict(String),
}

fn in_format(format: &Option<Format>) -> String {
    match format {
        Some(f) => format!(" in format {f}"),
        None => String::new(),
    }
}

/// The category of a [`MaplistError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`MaplistError::Validation`].
    Validation,
    /// See [`MaplistError::PermissionDenied`].
    PermissionDenied,
    /// See [`MaplistError::InconsistentState`].
    InconsistentState,
    /// See [`MaplistError::StoreUnavailable`].
    StoreUnavailable,
    /// See [`MaplistError::Conflict`].
    Conflict,
}

impl MaplistError {
    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MaplistError::Validation(_) => ErrorKind::Validation,
            MaplistError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            MaplistError::InconsistentState(_) => ErrorKind::InconsistentState,
            MaplistError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            MaplistError::Conflict(_) => ErrorKind::Conflict,
        }
    }

    /// Returns whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict | ErrorKind::StoreUnavailable)
    }

    #[doc(hidden)]
    pub fn __inconsistent(msg: String) -> Self {
        tracing::error!(%msg, "inconsistent state detected, aborting the operation");
        Self::InconsistentState(msg)
    }
}

/// Shortcut for creating an inconsistent state error, by formatting a message.
///
/// The error is logged when created. See [`MaplistError::InconsistentState`].
#[macro_export]
macro_rules! inconsistent {
    ($($t:tt)*) => {{
        $crate::error::MaplistError::__inconsistent($crate::error::__private::format!($($t)*))
    }};
}

#[doc(hidden)]
pub mod __private {
    pub use std::format;
}

impl<E> From<TransactionError<E>> for MaplistError
where
    MaplistError: From<E>,
{
    fn from(value: TransactionError<E>) -> Self {
        match value {
            TransactionError::Connection(db_err) => From::from(db_err),
            TransactionError::Transaction(e) => From::from(e),
        }
    }
}

/// Represents the result of a computation that could return a [`MaplistError`].
pub type MaplistResult<T = ()> = Result<T, MaplistError>;
