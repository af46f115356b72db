use std::fmt;

use sea_orm::entity::prelude::*;

/// The difficulty tier of a map on the expert list.
///
/// Many maps share the same tier: the tier is a key, not a position.
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
pub enum ExpertTier {
    #[sea_orm(num_value = 0)]
    Casual,
    #[sea_orm(num_value = 1)]
    Medium,
    #[sea_orm(num_value = 2)]
    High,
    #[sea_orm(num_value = 3)]
    True,
    #[sea_orm(num_value = 4)]
    Extreme,
}

impl ExpertTier {
    /// Every tier, from the easiest to the hardest.
    pub const ALL: [ExpertTier; 5] = [
        ExpertTier::Casual,
        ExpertTier::Medium,
        ExpertTier::High,
        ExpertTier::True,
        ExpertTier::Extreme,
    ];

    /// Returns the index of the tier, between 0 and 4.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase name of the tier, as used in the tuning constant keys.
    pub const fn name(self) -> &'static str {
        match self {
            ExpertTier::Casual => "casual",
            ExpertTier::Medium => "medium",
            ExpertTier::High => "high",
            ExpertTier::True => "true",
            ExpertTier::Extreme => "extreme",
        }
    }
}

impl fmt::Display for ExpertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid expert tier `{0}`, expected a value between 0 and 4")]
pub struct InvalidTier(pub i32);

impl TryFrom<i32> for ExpertTier {
    type Error = InvalidTier;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(InvalidTier(value))
    }
}

impl From<ExpertTier> for i32 {
    fn from(value: ExpertTier) -> Self {
        value as i32
    }
}
