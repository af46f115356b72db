use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;

/// A value players are ranked by on a format leaderboard.
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
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// The point total.
    #[sea_orm(num_value = 1)]
    Points,
    /// The amount of maps on which the player holds the current least-cost completion.
    #[sea_orm(num_value = 2)]
    Lccs,
    /// The amount of maps beaten without the optimal hero.
    #[sea_orm(num_value = 3)]
    NoOptimalHero,
    /// The amount of maps beaten black-border.
    #[sea_orm(num_value = 4)]
    BlackBorder,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Points,
        Metric::Lccs,
        Metric::NoOptimalHero,
        Metric::BlackBorder,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Metric::Points => "points",
            Metric::Lccs => "lccs",
            Metric::NoOptimalHero => "no_optimal_hero",
            Metric::BlackBorder => "black_border",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown leaderboard metric `{0}`")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| UnknownMetric(s.to_owned()))
    }
}
