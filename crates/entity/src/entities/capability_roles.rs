use sea_orm::entity::prelude::*;

/// A named group of capability grants, like "Maplist Moderator".
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "capability_roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::capability_grants::Entity")]
    CapabilityGrants,
    #[sea_orm(has_many = "super::player_capability_roles::Entity")]
    PlayerCapabilityRoles,
}

impl Related<super::capability_grants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CapabilityGrants.def()
    }
}

impl Related<super::player_capability_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerCapabilityRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
