use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;

/// A format partition of the list.
///
/// Each format owns exactly one ordering axis of the maps: a dense rank for both list formats,
/// and a difficulty tier for the expert list.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(try_from = "i32", into = "i32")]
pub enum Format {
    /// The list restricted to the current game version.
    #[sea_orm(num_value = 1)]
    Current,
    /// The list accepting completions from every game version.
    #[sea_orm(num_value = 2)]
    AllVersions,
    /// The expert list, ordered by difficulty tier.
    #[sea_orm(num_value = 51)]
    Expert,
}

impl Format {
    /// Every format, in ascending ID order.
    pub const ALL: [Format; 3] = [Format::Current, Format::AllVersions, Format::Expert];

    /// The two formats ordered by a dense rank.
    pub const LISTS: [Format; 2] = [Format::Current, Format::AllVersions];

    /// Returns the ID of the format.
    pub const fn id(self) -> i32 {
        match self {
            Format::Current => 1,
            Format::AllVersions => 2,
            Format::Expert => 51,
        }
    }

    /// Returns the format with the provided ID.
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Format::Current),
            2 => Some(Format::AllVersions),
            51 => Some(Format::Expert),
            _ => None,
        }
    }

    /// Returns whether this format orders its maps by a dense rank, rather than by tier.
    pub const fn is_ranked(self) -> bool {
        !matches!(self, Format::Expert)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Current => "current",
            Format::AllVersions => "all-versions",
            Format::Expert => "expert",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown format `{0}`")]
pub struct UnknownFormat(pub String);

impl TryFrom<i32> for Format {
    type Error = UnknownFormat;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_id(value).ok_or_else(|| UnknownFormat(value.to_string()))
    }
}

impl From<Format> for i32 {
    fn from(value: Format) -> Self {
        value.id()
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "current" => Ok(Format::Current),
            "2" | "all-versions" => Ok(Format::AllVersions),
            "51" | "expert" => Ok(Format::Expert),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}
