use sea_orm::entity::prelude::*;

/// The least-cost data attached to a single completion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "lcc_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The amount of resources left over at the end of the run. Higher is better.
    pub leftover: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::completions::Entity")]
    Completions,
}

impl Related<super::completions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
