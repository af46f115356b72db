use sea_orm::entity::prelude::*;

/// A player in the database.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "players")]
pub struct Model {
    /// The external account ID of the player.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// The display name of the player.
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::completion_players::Entity")]
    CompletionPlayers,
    #[sea_orm(has_many = "super::player_capability_roles::Entity")]
    PlayerCapabilityRoles,
}

impl Related<super::completion_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompletionPlayers.def()
    }
}

impl Related<super::player_capability_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerCapabilityRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
