use sea_orm::entity::prelude::*;

use crate::types::Format;

/// A capability granted by a role, either in a single format or globally.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "capability_grants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub role_id: i32,
    /// The format the grant is scoped to. `None` means every format.
    pub format: Option<Format>,
    /// The name of the capability, like `edit:map`.
    pub permission: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::capability_roles::Entity",
        from = "Column::RoleId",
        to = "super::capability_roles::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    CapabilityRoles,
}

impl Related<super::capability_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CapabilityRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
