use entity::types::{Format, Metric};
use maplist_lib::{
    achievements::{self, Badge, RoleAction, RoleDefinition, RoleKey},
    error::{ErrorKind, MaplistError},
    permissions::{FormatScope, Permissions, perms},
};

mod base;

fn role(threshold: i32, for_first: bool) -> RoleDefinition {
    RoleDefinition {
        format: Format::Current,
        metric: Metric::Points,
        threshold,
        for_first,
        name: if for_first {
            "Top player".to_owned()
        } else {
            format!("{threshold}+ points")
        },
        tooltip: None,
        clr_border: 0x222222,
        clr_inner: 0xaaaaaa,
        badges: vec![Badge {
            guild_id: 1,
            badge_id: 100 + threshold as i64,
        }],
    }
}

fn key(threshold: i32) -> RoleKey {
    RoleKey {
        format: Format::Current,
        metric: Metric::Points,
        threshold,
    }
}

#[tokio::test]
async fn replace_group_versions() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let v = achievements::replace_group(
            &db.sql_conn,
            &base::admin(),
            Format::Current,
            Metric::Points,
            vec![role(50, false), role(100, false)],
        )
        .await?;
        assert_eq!(v, 1);

        let v = achievements::replace_group(
            &db.sql_conn,
            &base::admin(),
            Format::Current,
            Metric::Points,
            vec![role(0, true), role(150, false)],
        )
        .await?;
        assert_eq!(v, 2);

        let defs = achievements::load_definitions(&db.sql_conn).await?;
        assert_eq!(
            defs.iter().map(|d| d.threshold).collect::<Vec<_>>(),
            vec![0, 150]
        );

        // Another group is versioned on its own
        let v = achievements::replace_group(
            &db.sql_conn,
            &base::admin(),
            Format::Current,
            Metric::Lccs,
            Vec::new(),
        )
        .await?;
        assert_eq!(v, 1);

        let expert_roles = Permissions::none().with(
            FormatScope::Partition(Format::Expert),
            perms::EDIT_ACHIEVEMENT_ROLES,
        );
        let err = achievements::replace_group(
            &db.sql_conn,
            &expert_roles,
            Format::Current,
            Metric::Points,
            Vec::new(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        // Emptying the group removes its roles
        achievements::replace_group(
            &db.sql_conn,
            &base::admin(),
            Format::Current,
            Metric::Points,
            Vec::new(),
        )
        .await?;
        assert!(achievements::load_definitions(&db.sql_conn).await?.is_empty());

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn feed_is_stable_until_committed() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10, 11, 12]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;
        base::add_map(&db, "BBB", Some(2), None).await?;
        base::add_completion(&db, "AAA", Format::Current, &[10], false, false, None).await?;
        base::add_completion(&db, "BBB", Format::Current, &[11], false, false, None).await?;

        achievements::replace_group(
            &db.sql_conn,
            &base::admin(),
            Format::Current,
            Metric::Points,
            vec![role(0, true), role(5, false), role(50, false)],
        )
        .await?;

        let feed = achievements::pending_updates(&db.sql_conn, None).await?;
        assert_eq!(feed.snapshot_version, 0);
        assert_eq!(
            feed.events
                .iter()
                .map(|e| (e.player_id, e.key, e.action))
                .collect::<Vec<_>>(),
            vec![
                (10, key(0), RoleAction::Grant),
                (11, key(5), RoleAction::Grant),
            ]
        );
        assert_eq!(
            feed.events[1].badges,
            vec![Badge {
                guild_id: 1,
                badge_id: 105
            }]
        );

        // Reading twice gives the same feed
        assert_eq!(achievements::pending_updates(&db.sql_conn, None).await?, feed);

        let version = achievements::commit_snapshot(&db.sql_conn, &feed).await?;
        assert_eq!(version, 1);

        let (committed, holders) = achievements::load_snapshot(&db.sql_conn).await?;
        assert_eq!(committed, 1);
        let expected = feed
            .holders
            .into_iter()
            .filter(|(_, players)| !players.is_empty())
            .collect::<achievements::HolderSets>();
        assert_eq!(holders, expected);

        let next = achievements::pending_updates(&db.sql_conn, None).await?;
        assert_eq!(next.snapshot_version, 1);
        assert!(next.events.is_empty());

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn stale_feed_is_a_conflict() -> anyhow::Result<()> {
    base::with_db(async |db| {
        let feed = achievements::pending_updates(&db.sql_conn, None).await?;
        achievements::commit_snapshot(&db.sql_conn, &feed).await?;

        let err = achievements::commit_snapshot(&db.sql_conn, &feed)
            .await
            .unwrap_err();
        assert!(matches!(err, MaplistError::Conflict(_)));
        assert!(err.is_retryable());

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn crossing_a_threshold() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10, 11]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;
        base::add_map(&db, "BBB", Some(2), None).await?;
        base::add_completion(&db, "AAA", Format::Current, &[10], false, false, None).await?;
        base::add_completion(&db, "BBB", Format::Current, &[11], false, false, None).await?;

        achievements::replace_group(
            &db.sql_conn,
            &base::admin(),
            Format::Current,
            Metric::Points,
            vec![role(5, false), role(50, false)],
        )
        .await?;

        let feed = achievements::pending_updates(&db.sql_conn, None).await?;
        achievements::commit_snapshot(&db.sql_conn, &feed).await?;

        // Player 11 now also beats map AAA
        base::add_completion(&db, "AAA", Format::Current, &[11], false, false, None).await?;

        let feed = achievements::pending_updates(&db.sql_conn, None).await?;
        assert_eq!(
            feed.events
                .iter()
                .map(|e| (e.player_id, e.key, e.action))
                .collect::<Vec<_>>(),
            vec![
                (11, key(5), RoleAction::Revoke),
                (11, key(50), RoleAction::Grant),
            ]
        );

        anyhow::Ok(())
    })
    .await
}
