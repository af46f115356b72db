use sea_orm::entity::prelude::*;

/// A version of the tuning constants.
///
/// Versions are immutable: an edit writes a complete new set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tuning_constant_sets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub version: i32,
    pub created_on: DateTime,
    /// The player who wrote this version, if it wasn't seeded.
    pub created_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tuning_constants::Entity")]
    TuningConstants,
}

impl Related<super::tuning_constants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TuningConstants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
