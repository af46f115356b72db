use sea_orm::entity::prelude::*;

/// An entry of the catalog of remakes a map can be linked to.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "remakes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The name of the remade map.
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::maps::Entity")]
    Maps,
}

impl Related<super::maps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
