use sea_orm::entity::prelude::*;

use crate::types::Format;

/// The optimistic lock of an ordering axis.
///
/// Every cascade on an axis bumps its version, so two concurrent writers can't both claim
/// the same rank.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "axis_versions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub format: Format,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
