//! The committed holder snapshot, and the pending role feed.

use entity::{holder_snapshot, holder_snapshot_meta};
use sea_orm::{
    ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _,
    TransactionTrait, sea_query::Expr,
};

use super::{HolderSets, RoleEvent, RoleKey, diff, load_definitions, resolve};
use crate::{
    constants::ConstantsCache,
    error::{MaplistError, MaplistResult},
    inconsistent, txn,
};

/// The ID of the single row of the `holder_snapshot_meta` table.
const META_ID: i32 = 1;

/// The role updates not yet acknowledged by the role issuer.
///
/// Reading the feed twice without committing it returns the same feed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RoleFeed {
    /// The version of the snapshot the feed was computed against.
    pub snapshot_version: i64,
    /// The resolved holders of every role.
    pub holders: HolderSets,
    /// The differences between the resolved holders and the snapshot.
    pub events: Vec<RoleEvent>,
}

/// Returns the version and the holders of the committed snapshot.
pub async fn load_snapshot<C: ConnectionTrait>(conn: &C) -> MaplistResult<(i64, HolderSets)> {
    let meta = holder_snapshot_meta::Entity::find_by_id(META_ID)
        .one(conn)
        .await?
        .ok_or_else(|| inconsistent!("missing the holder snapshot version row"))?;

    let mut holders = HolderSets::new();
    for row in holder_snapshot::Entity::find().all(conn).await? {
        holders
            .entry(RoleKey {
                format: row.format,
                metric: row.metric,
                threshold: row.threshold,
            })
            .or_default()
            .insert(row.player_id);
    }

    Ok((meta.version, holders))
}

/// Computes the pending role updates, in a single consistent read.
///
/// The constants come from the cache if one is provided.
#[tracing::instrument(skip(conn, cache))]
pub async fn pending_updates<C: TransactionTrait>(
    conn: &C,
    cache: Option<&ConstantsCache>,
) -> MaplistResult<RoleFeed> {
    let feed = txn::read_snapshot(conn, async |txn| {
        let (snapshot_version, snapshot) = load_snapshot(txn).await?;
        let definitions = load_definitions(txn).await?;

        let constants = match cache {
            Some(cache) => cache.get(txn).await?,
            None => crate::constants::load_latest(txn).await?,
        };
        let engine = crate::scoring::ScoringEngine::new(
            crate::scoring::load_input(txn, constants).await?,
        );

        let holders = resolve(&definitions, &engine.leaderboards());
        let events = diff(&definitions, &holders, &snapshot);

        MaplistResult::Ok(RoleFeed {
            snapshot_version,
            holders,
            events,
        })
    })
    .await?;

    tracing::debug!(
        version = feed.snapshot_version,
        events = feed.events.len(),
        "computed pending role updates"
    );

    Ok(feed)
}

/// Commits the holders of the feed as the new snapshot, and returns its version.
///
/// Returns a conflict error if another snapshot was committed since the feed was computed.
#[tracing::instrument(skip(conn, feed), fields(version = feed.snapshot_version))]
pub async fn commit_snapshot<C: TransactionTrait>(conn: &C, feed: &RoleFeed) -> MaplistResult<i64> {
    let version = txn::transaction(conn, async |txn| {
        let version = feed.snapshot_version + 1;

        let res = holder_snapshot_meta::Entity::update_many()
            .col_expr(holder_snapshot_meta::Column::Version, Expr::value(version))
            .col_expr(
                holder_snapshot_meta::Column::CommittedOn,
                Expr::value(Some(chrono::Utc::now().naive_utc())),
            )
            .filter(holder_snapshot_meta::Column::Id.eq(META_ID))
            .filter(holder_snapshot_meta::Column::Version.eq(feed.snapshot_version))
            .exec(txn)
            .await?;

        if res.rows_affected == 0 {
            return Err(MaplistError::Conflict("the holder snapshot".to_owned()));
        }

        holder_snapshot::Entity::delete_many().exec(txn).await?;

        let rows = feed
            .holders
            .iter()
            .flat_map(|(key, players)| {
                players.iter().map(|player_id| holder_snapshot::ActiveModel {
                    player_id: Set(*player_id),
                    format: Set(key.format),
                    metric: Set(key.metric),
                    threshold: Set(key.threshold),
                    ..Default::default()
                })
            })
            .collect::<Vec<_>>();

        if !rows.is_empty() {
            holder_snapshot::Entity::insert_many(rows).exec(txn).await?;
        }

        MaplistResult::Ok(version)
    })
    .await?;

    tracing::info!(version, "committed holder snapshot");

    Ok(version)
}
