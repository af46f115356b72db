use sea_orm::entity::prelude::*;

use crate::types::{Format, Metric};

/// The latest version of a (format, metric) group of achievement roles.
///
/// A group can be emptied, so its version can't be derived from its roles.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "achievement_role_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub format: Format,
    pub metric: Metric,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
