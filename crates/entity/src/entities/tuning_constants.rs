use sea_orm::entity::prelude::*;

/// A single value of a tuning constant set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tuning_constants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub version: i32,
    /// The key of the constant, like `points_top_map`.
    pub name: String,
    pub value: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tuning_constant_sets::Entity",
        from = "Column::Version",
        to = "super::tuning_constant_sets::Column::Version",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    TuningConstantSets,
}

impl Related<super::tuning_constant_sets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TuningConstantSets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
