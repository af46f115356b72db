use entity::types::{Format, Metric};
use maplist_lib::{
    completion::{self, CompletionEdit, NewCompletion},
    error::{MaplistError, ValidationError},
    map,
    permissions::{FormatScope, Permissions, perms},
    scoring,
};

mod base;

fn new_completion(map_code: &str, players: Vec<i64>) -> NewCompletion {
    NewCompletion {
        map_code: map_code.to_owned(),
        format: Format::Current,
        black_border: false,
        no_optimal_hero: false,
        lcc: None,
        players,
    }
}

async fn points(db: &maplist_lib::Database, player_id: i64, format: Format) -> anyhow::Result<f64> {
    let totals = scoring::compute_user_totals(&db.sql_conn, None, player_id, &[format]).await?;
    Ok(totals.per_format[0].points)
}

#[tokio::test]
async fn pending_completions_are_not_scored() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;

        let submitter = Permissions::none().with(
            FormatScope::Partition(Format::Current),
            perms::CREATE_COMPLETION_SUBMISSION,
        );
        let pending =
            completion::submit(&db.sql_conn, &submitter, new_completion("AAA", vec![10, 10]))
                .await?;
        assert!(pending.accepted_by.is_none());
        assert_eq!(points(&db, 10, Format::Current).await?, 0.);

        let details = completion::details(&db.sql_conn, pending.id).await?;
        assert_eq!(details.players, vec![10]);

        completion::accept(&db.sql_conn, &base::admin(), base::MODERATOR_ID, pending.id).await?;
        assert_eq!(points(&db, 10, Format::Current).await?, 100.);

        let err = completion::accept(&db.sql_conn, &base::admin(), base::MODERATOR_ID, pending.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::AlreadyAccepted(_))
        ));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn submission_checks() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;

        let err = completion::submit(&db.sql_conn, &base::admin(), new_completion("AAA", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::NoPlayers)
        ));

        let err = completion::submit(&db.sql_conn, &base::admin(), new_completion("AAA", vec![99]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::PlayerNotFound(99))
        ));

        let err = completion::submit(&db.sql_conn, &base::admin(), new_completion("ZZZ", vec![10]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::MapNotFound(_))
        ));

        map::soft_delete(&db.sql_conn, &base::admin(), "AAA", &Format::ALL).await?;
        let err = completion::submit(&db.sql_conn, &base::admin(), new_completion("AAA", vec![10]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::MapDeleted(_))
        ));

        let err = completion::submit(
            &db.sql_conn,
            &base::moderator_of(Format::Expert),
            new_completion("AAA", vec![10]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MaplistError::PermissionDenied { .. }));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn reject_only_pending() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;

        let accepted =
            base::add_completion(&db, "AAA", Format::Current, &[10], false, false, Some(3)).await?;
        let err = completion::reject(&db.sql_conn, &base::admin(), accepted)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::CannotRejectAccepted(_))
        ));

        let mut pending = new_completion("AAA", vec![10]);
        pending.lcc = Some(1);
        let pending = completion::submit(&db.sql_conn, &base::admin(), pending).await?;
        completion::reject(&db.sql_conn, &base::admin(), pending.id).await?;

        let err = completion::details(&db.sql_conn, pending.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::CompletionNotFound(_))
        ));

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn deleted_completions_stop_counting() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;
        let id = base::add_completion(&db, "AAA", Format::Current, &[10], false, false, None).await?;
        assert_eq!(points(&db, 10, Format::Current).await?, 100.);

        let deleted = completion::soft_delete(&db.sql_conn, &base::admin(), id).await?;
        assert!(deleted.deleted_on.is_some());
        assert_eq!(points(&db, 10, Format::Current).await?, 0.);

        let again = completion::soft_delete(&db.sql_conn, &base::admin(), id).await?;
        assert_eq!(again.deleted_on, deleted.deleted_on);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn least_cost_and_bonuses() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10, 11, 12]).await?;
        base::add_map(&db, "AAA", Some(1), None).await?;

        let first =
            base::add_completion(&db, "AAA", Format::Current, &[10], false, false, Some(5)).await?;
        let better =
            base::add_completion(&db, "AAA", Format::Current, &[11], true, false, Some(8)).await?;
        // Same leftover, the earliest one is kept
        base::add_completion(&db, "AAA", Format::Current, &[12], false, false, Some(8)).await?;

        assert_eq!(
            scoring::current_lcc(&db.sql_conn, "AAA", Format::Current).await?,
            Some(better)
        );
        assert_eq!(
            scoring::current_lcc(&db.sql_conn, "AAA", Format::AllVersions).await?,
            None
        );

        // Black border multiplies, the least-cost bonus adds
        assert_eq!(points(&db, 11, Format::Current).await?, 320.);
        assert_eq!(points(&db, 10, Format::Current).await?, 100.);
        assert_eq!(points(&db, 12, Format::Current).await?, 100.);

        // Raising the leftover of the first completion moves the bonus
        let details = completion::edit(
            &db.sql_conn,
            &base::admin(),
            first,
            CompletionEdit {
                lcc: Some(Some(12)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(details.leftover, Some(12));
        assert_eq!(
            scoring::current_lcc(&db.sql_conn, "AAA", Format::Current).await?,
            Some(first)
        );
        assert_eq!(points(&db, 10, Format::Current).await?, 120.);
        assert_eq!(points(&db, 11, Format::Current).await?, 300.);

        // A completion only counts in its own format
        completion::edit(
            &db.sql_conn,
            &base::admin(),
            first,
            CompletionEdit {
                format: Some(Format::AllVersions),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(points(&db, 10, Format::Current).await?, 0.);
        assert_eq!(points(&db, 10, Format::AllVersions).await?, 0.);

        anyhow::Ok(())
    })
    .await
}

#[tokio::test]
async fn expert_and_leaderboards() -> anyhow::Result<()> {
    base::with_db(async |db| {
        base::insert_players(&db.sql_conn, &[10, 11, 12]).await?;
        base::add_map(&db, "AAA", Some(1), Some(4)).await?;
        base::add_map(&db, "BBB", Some(2), Some(0)).await?;

        base::add_completion(&db, "AAA", Format::Expert, &[10], false, false, None).await?;
        base::add_completion(&db, "BBB", Format::Expert, &[11], false, false, None).await?;
        base::add_completion(&db, "AAA", Format::Current, &[11, 12], false, false, None).await?;
        base::add_completion(&db, "BBB", Format::Current, &[12], false, false, None).await?;

        assert_eq!(points(&db, 10, Format::Expert).await?, 5.);
        assert_eq!(points(&db, 11, Format::Expert).await?, 1.);

        let board = scoring::compute_full_leaderboard(
            &db.sql_conn,
            None,
            Format::Current,
            Metric::Points,
        )
        .await?;
        let board = board
            .into_iter()
            .map(|e| (e.player_id, e.score, e.placement))
            .collect::<Vec<_>>();
        assert_eq!(board, vec![(12, 105., 1), (11, 100., 2)]);

        let page = scoring::compute_leaderboard(
            &db.sql_conn,
            None,
            Format::Current,
            Metric::Points,
            2,
        )
        .await?;
        assert_eq!(page.total, 2);
        assert_eq!(page.pages, 1);
        assert!(page.entries.is_empty());

        let err = scoring::compute_leaderboard(
            &db.sql_conn,
            None,
            Format::Current,
            Metric::Points,
            0,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            MaplistError::Validation(ValidationError::PageOutOfRange(0))
        ));

        // A map removed from an axis stops counting there only
        map::soft_delete(&db.sql_conn, &base::admin(), "AAA", &[Format::Current]).await?;
        assert_eq!(points(&db, 11, Format::Current).await?, 0.);
        assert_eq!(points(&db, 12, Format::Current).await?, 100.);
        assert_eq!(points(&db, 10, Format::Expert).await?, 5.);

        anyhow::Ok(())
    })
    .await
}
