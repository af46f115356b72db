use std::time::Duration;

use entity::types::Format;
use maplist_lib::{
    constants::{self, ConstantsCache, TuningConstants},
    error::{MaplistError, ValidationError},
    permissions::{self, FormatScope, Permissions, perms},
    scoring,
};

mod base;

#[tokio::test]
async fn seeded_set_is_the_default() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let latest = constants::load_latest(&db.sql_conn).await?;
        assert_eq!(latest, TuningConstants::default());
        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn update_writes_a_new_version() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let updated = constants::update(
            &db.sql_conn,
            &base::admin(),
            Some(base::MODERATOR_ID),
            [("points_top_map", 200.), ("exp_points_extreme", 8.)],
            None,
        )
        .await?;

        assert_eq!(updated.version, 2);
        assert_eq!(updated.points_top_map, 200.);
        assert_eq!(updated.exp_points[4], 8.);
        // The other keys are carried over
        assert_eq!(updated.points_bottom_map, 5.);

        assert_eq!(constants::load_latest(&db.sql_conn).await?, updated);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn update_is_scoped_by_format() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let expert_config =
            Permissions::none().with(FormatScope::Partition(Format::Expert), perms::EDIT_CONFIG);

        let err = constants::update(
            &db.sql_conn,
            &expert_config,
            None,
            [("exp_bb_multi", 3.), ("points_top_map", 150.)],
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::PermissionDenied {
                permission: perms::EDIT_CONFIG,
                ..
            }
        ));
        assert_eq!(constants::load_latest(&db.sql_conn).await?.version, 1);

        let updated =
            constants::update(&db.sql_conn, &expert_config, None, [("exp_bb_multi", 3.)], None)
                .await?;
        assert_eq!(updated.exp_bb_multi, 3.);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn invalid_values_are_rejected() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let admin = base::admin();

        let err = constants::update(&db.sql_conn, &admin, None, [("points_multi_bb", 0.5)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::InvalidConstantValue { .. })
        ));

        let err = constants::update(&db.sql_conn, &admin, None, [("points_top_map", 1.)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::InvalidConstantValue { .. })
        ));

        let err = constants::update(&db.sql_conn, &admin, None, [("not_a_key", 1.)], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::UnknownConstant(_))
        ));

        assert_eq!(constants::load_latest(&db.sql_conn).await?.version, 1);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn cache_is_refreshed_by_updates() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let cache = ConstantsCache::new(Duration::from_secs(3600));
        assert_eq!(cache.get(&db.sql_conn).await?.version, 1);

        // An update through another path leaves the cache stale until it expires
        constants::update(&db.sql_conn, &base::admin(), None, [("map_count", 40.)], None).await?;
        assert_eq!(cache.get(&db.sql_conn).await?.version, 1);
        cache.invalidate().await;
        assert_eq!(cache.get(&db.sql_conn).await?.version, 2);

        constants::update(
            &db.sql_conn,
            &base::admin(),
            None,
            [("map_count", 30.)],
            Some(&cache),
        )
        .await?;
        let cached = cache.get(&db.sql_conn).await?;
        assert_eq!(cached.version, 3);
        assert_eq!(cached.map_count, 30);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn totals_are_stable_after_an_update() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;
        base::add_completion(&db, "AAA", Format::Current, &[10], true, false, None).await?;

        let cache = ConstantsCache::new(Duration::from_secs(3600));
        let before =
            scoring::compute_user_totals(&db.sql_conn, Some(&cache), 10, &[Format::Current])
                .await?;
        assert_eq!(before.per_format[0].points, 300.);

        constants::update(
            &db.sql_conn,
            &base::admin(),
            None,
            [("points_top_map", 200.)],
            Some(&cache),
        )
        .await?;

        let first =
            scoring::compute_user_totals(&db.sql_conn, Some(&cache), 10, &[Format::Current])
                .await?;
        let second =
            scoring::compute_user_totals(&db.sql_conn, Some(&cache), 10, &[Format::Current])
                .await?;
        assert_eq!(first.per_format[0].points, 600.);
        assert_eq!(first, second);

        let uncached =
            scoring::compute_user_totals(&db.sql_conn, None, 10, &[Format::Current]).await?;
        assert_eq!(uncached, first);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn permissions_from_roles() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10, 11]).await?;
        base::give_role(
            &db.sql_conn,
            10,
            "Expert Moderator",
            &[
                (Some(Format::Expert), perms::EDIT_MAP),
                (None, perms::CREATE_COMPLETION_SUBMISSION),
            ],
        )
        .await?;

        let p = permissions::load_for_player(&db.sql_conn, 10).await?;
        assert!(p.has(perms::EDIT_MAP, Some(Format::Expert)));
        assert!(!p.has(perms::EDIT_MAP, Some(Format::Current)));
        assert!(p.has(perms::CREATE_COMPLETION_SUBMISSION, Some(Format::Current)));

        assert_eq!(
            permissions::load_for_player(&db.sql_conn, 11).await?,
            Permissions::none()
        );

        anyhow::Ok(())
    })
    .await
}
