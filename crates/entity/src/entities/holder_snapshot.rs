use sea_orm::entity::prelude::*;

use crate::types::{Format, Metric};

/// A player holding an achievement role, as last acknowledged by the role issuer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "holder_snapshot")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub player_id: i64,
    pub format: Format,
    pub metric: Metric,
    pub threshold: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
