use chrono::Utc;
use entity::{
    axis_versions, holder_snapshot_meta, tuning_constant_sets, tuning_constants, types::Format,
};
use sea_orm::{ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, EntityTrait, QueryFilter as _};
use sea_orm_migration::prelude::*;

/// The first tuning constant set.
const DEFAULT_CONSTANTS: &[(&str, f64)] = &[
    ("map_count", 50.),
    ("decimal_digits", 0.),
    ("points_top_map", 100.),
    ("points_bottom_map", 5.),
    ("formula_slope", 0.88),
    ("points_extra_lcc", 20.),
    ("points_multi_opt_hero", 2.),
    ("points_multi_bb", 3.),
    ("exp_points_casual", 1.),
    ("exp_points_medium", 2.),
    ("exp_points_high", 3.),
    ("exp_points_true", 4.),
    ("exp_points_extreme", 5.),
    ("exp_no_opt_hero_points_casual", 1.),
    ("exp_no_opt_hero_points_medium", 1.),
    ("exp_no_opt_hero_points_high", 2.),
    ("exp_no_opt_hero_points_true", 2.),
    ("exp_no_opt_hero_points_extreme", 3.),
    ("exp_bb_multi", 2.),
    ("exp_lcc_extra", 1.),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        axis_versions::Entity::insert_many(Format::ALL.map(|format| {
            axis_versions::ActiveModel {
                format: Set(format),
                version: Set(0),
                ..Default::default()
            }
        }))
        .exec(conn)
        .await?;

        holder_snapshot_meta::ActiveModel {
            id: Set(1),
            version: Set(0),
            committed_on: Set(None),
        }
        .insert(conn)
        .await?;

        tuning_constant_sets::ActiveModel {
            version: Set(1),
            created_on: Set(Utc::now().naive_utc()),
            created_by: Set(None),
        }
        .insert(conn)
        .await?;

        tuning_constants::Entity::insert_many(DEFAULT_CONSTANTS.iter().map(|(name, value)| {
            tuning_constants::ActiveModel {
                version: Set(1),
                name: Set((*name).to_owned()),
                value: Set(*value),
                ..Default::default()
            }
        }))
        .exec(conn)
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        tuning_constants::Entity::delete_many()
            .filter(tuning_constants::Column::Version.eq(1))
            .exec(conn)
            .await?;

        tuning_constant_sets::Entity::delete_by_id(1).exec(conn).await?;
        holder_snapshot_meta::Entity::delete_by_id(1).exec(conn).await?;
        axis_versions::Entity::delete_many().exec(conn).await?;

        Ok(())
    }
}
