use sea_orm::entity::prelude::*;

use crate::types::Format;

/// A completion (a "run") of a map.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "completions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The code of the completed map. It stays valid after the map's deletion.
    pub map_code: String,
    /// The format the completion is scored against.
    pub format: Format,
    pub black_border: bool,
    pub no_optimal_hero: bool,
    /// The optional least-cost record owned by this completion.
    #[sea_orm(unique)]
    pub lcc_id: Option<i32>,
    /// The ID of the moderator who accepted the completion. `None` means pending.
    pub accepted_by: Option<i64>,
    pub created_on: DateTime,
    pub deleted_on: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maps::Entity",
        from = "Column::MapCode",
        to = "super::maps::Column::Code",
        on_update = "Restrict",
        on_delete = "Restrict"
    )]
    Maps,
    #[sea_orm(
        belongs_to = "super::lcc_records::Entity",
        from = "Column::LccId",
        to = "super::lcc_records::Column::Id",
        on_update = "Restrict",
        on_delete = "SetNull"
    )]
    LccRecords,
    #[sea_orm(has_many = "super::completion_players::Entity")]
    CompletionPlayers,
}

impl Related<super::maps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maps.def()
    }
}

impl Related<super::lcc_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LccRecords.def()
    }
}

impl Related<super::completion_players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompletionPlayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
