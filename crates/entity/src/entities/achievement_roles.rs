use sea_orm::entity::prelude::*;

use crate::types::{Format, Metric};

/// A threshold-based achievement role, in a given version of its (format, metric) group.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "achievement_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The version of the (format, metric) group this row belongs to.
    pub version: i32,
    pub format: Format,
    pub metric: Metric,
    /// The minimum leaderboard score to hold the role.
    pub threshold: i32,
    /// Whether the role is only held by the first place of the leaderboard.
    pub for_first: bool,
    pub name: String,
    pub tooltip: Option<String>,
    /// The border color of the badge, as `0xRRGGBB`.
    pub clr_border: i32,
    /// The inner color of the badge, as `0xRRGGBB`.
    pub clr_inner: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::achievement_role_badges::Entity")]
    AchievementRoleBadges,
}

impl Related<super::achievement_role_badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AchievementRoleBadges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
