use sea_orm::entity::prelude::*;

use crate::types::ExpertTier;

/// A map of the list in the database.
///
/// The three positional columns are independent: a map can be ranked on a list axis while
/// having no tier on the expert list, and the other way around.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "maps")]
pub struct Model {
    /// The map ID.
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The external code of the map. Codes are never reused, even after deletion.
    #[sea_orm(unique)]
    pub code: String,
    /// The name of the map.
    pub name: String,
    /// The rank of the map on the current-version list.
    pub rank_current: Option<i32>,
    /// The rank of the map on the all-versions list.
    pub rank_allversions: Option<i32>,
    /// The difficulty tier of the map on the expert list.
    pub difficulty: Option<ExpertTier>,
    /// The optional catalog entry this map is a remake of.
    pub remake_of: Option<i32>,
    pub created_on: DateTime,
    /// Set once the map holds no value on any axis.
    pub deleted_on: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::remakes::Entity",
        from = "Column::RemakeOf",
        to = "super::remakes::Column::Id",
        on_update = "Restrict",
        on_delete = "SetNull"
    )]
    Remakes,
    #[sea_orm(has_many = "super::completions::Entity")]
    Completions,
}

impl Related<super::remakes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Remakes.def()
    }
}

impl Related<super::completions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
