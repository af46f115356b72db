use entity::{
    achievement_role_badges, achievement_role_groups, achievement_roles, axis_versions,
    capability_grants, capability_roles, completion_players, completions, holder_snapshot,
    holder_snapshot_meta, lcc_records, maps, player_capability_roles, players, remakes,
    tuning_constant_sets, tuning_constants,
};
use sea_orm::EntityTrait;
use sea_orm_migration::{prelude::*, sea_orm::Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_database_backend();
        let schema = Schema::new(db);

        create_entity_table(manager, &schema, players::Entity).await?;
        create_entity_table(manager, &schema, remakes::Entity).await?;
        create_entity_table(manager, &schema, maps::Entity).await?;
        create_entity_table(manager, &schema, lcc_records::Entity).await?;
        create_entity_table(manager, &schema, completions::Entity).await?;
        create_entity_table(manager, &schema, completion_players::Entity).await?;

        create_entity_table(manager, &schema, tuning_constant_sets::Entity).await?;
        create_entity_table(manager, &schema, tuning_constants::Entity).await?;

        create_entity_table(manager, &schema, capability_roles::Entity).await?;
        create_entity_table(manager, &schema, capability_grants::Entity).await?;
        create_entity_table(manager, &schema, player_capability_roles::Entity).await?;

        create_entity_table(manager, &schema, achievement_role_groups::Entity).await?;
        create_entity_table(manager, &schema, achievement_roles::Entity).await?;
        create_entity_table(manager, &schema, achievement_role_badges::Entity).await?;
        create_entity_table(manager, &schema, holder_snapshot_meta::Entity).await?;
        create_entity_table(manager, &schema, holder_snapshot::Entity).await?;

        create_entity_table(manager, &schema, axis_versions::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_completions_map_format")
                    .table(completions::Entity)
                    .col(completions::Column::MapCode)
                    .col(completions::Column::Format)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_achievement_roles_group")
                    .table(achievement_roles::Entity)
                    .col(achievement_roles::Column::Format)
                    .col(achievement_roles::Column::Metric)
                    .col(achievement_roles::Column::Version)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_achievement_role_groups_key")
                    .table(achievement_role_groups::Entity)
                    .col(achievement_role_groups::Column::Format)
                    .col(achievement_role_groups::Column::Metric)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, axis_versions::Entity).await?;

        drop_entity_table(manager, holder_snapshot::Entity).await?;
        drop_entity_table(manager, holder_snapshot_meta::Entity).await?;
        drop_entity_table(manager, achievement_role_badges::Entity).await?;
        drop_entity_table(manager, achievement_roles::Entity).await?;
        drop_entity_table(manager, achievement_role_groups::Entity).await?;

        drop_entity_table(manager, player_capability_roles::Entity).await?;
        drop_entity_table(manager, capability_grants::Entity).await?;
        drop_entity_table(manager, capability_roles::Entity).await?;

        drop_entity_table(manager, tuning_constants::Entity).await?;
        drop_entity_table(manager, tuning_constant_sets::Entity).await?;

        drop_entity_table(manager, completion_players::Entity).await?;
        drop_entity_table(manager, completions::Entity).await?;
        drop_entity_table(manager, lcc_records::Entity).await?;
        drop_entity_table(manager, maps::Entity).await?;
        drop_entity_table(manager, remakes::Entity).await?;
        drop_entity_table(manager, players::Entity).await?;

        Ok(())
    }
}

async fn create_entity_table<'a, E: EntityTrait>(
    manager: &'a SchemaManager<'a>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity))
        .await
}

async fn drop_entity_table<'a, E: EntityTrait>(
    manager: &'a SchemaManager<'a>,
    entity: E,
) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(entity).to_owned()).await
}
