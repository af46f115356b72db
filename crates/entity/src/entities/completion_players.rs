use sea_orm::entity::prelude::*;

/// The credit of a player on a completion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "completion_players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub completion_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::completions::Entity",
        from = "Column::CompletionId",
        to = "super::completions::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Completions,
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Players,
}

impl Related<super::completions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Players.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
