use sea_orm::entity::prelude::*;

/// An external badge (a role on a chat server) issued along an achievement role.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "achievement_role_badges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub achievement_role_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub badge_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::achievement_roles::Entity",
        from = "Column::AchievementRoleId",
        to = "super::achievement_roles::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    AchievementRoles,
}

impl Related<super::achievement_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AchievementRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
