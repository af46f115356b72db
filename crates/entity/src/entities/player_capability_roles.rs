use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "player_capability_roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Players,
    #[sea_orm(
        belongs_to = "super::capability_roles::Entity",
        from = "Column::RoleId",
        to = "super::capability_roles::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    CapabilityRoles,
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Players.def()
    }
}

impl Related<super::capability_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CapabilityRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
