//! The scoring engine, and its store-backed entry points.
//!
//! The entry points load the whole input of the [`ScoringEngine`] in a single read-only
//! transaction, so the completions, the placements and the tuning constants are observed in
//! the same version.

pub mod engine;
pub mod formula;
pub mod leaderboard;

use std::collections::BTreeMap;

use entity::{
    completion_players, completions, lcc_records, maps,
    types::{Format, Metric},
};
use itertools::Itertools as _;
use sea_orm::{ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _, TransactionTrait};

use crate::{
    constants::{self, ConstantsCache, TuningConstants},
    error::MaplistResult,
    ledger::Placement,
    must, txn,
};

pub use engine::{
    FormatTotals, Medals, ScoringCompletion, ScoringEngine, ScoringInput, ScoringMap, UserTotals,
};
pub use leaderboard::{LeaderboardEntry, LeaderboardPage};

/// The default amount of entries in a leaderboard page.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Loads the maps and the qualifying completions, and pairs them with the provided constants.
pub async fn load_input<C: ConnectionTrait>(
    conn: &C,
    constants: TuningConstants,
) -> MaplistResult<ScoringInput> {
    let maps = maps::Entity::find()
        .filter(maps::Column::DeletedOn.is_null())
        .all(conn)
        .await?
        .into_iter()
        .map(|map| ScoringMap {
            placement: Placement::of(&map),
            code: map.code,
            deleted: false,
        })
        .collect();

    let rows = completions::Entity::find()
        .filter(completions::Column::AcceptedBy.is_not_null())
        .filter(completions::Column::DeletedOn.is_null())
        .find_also_related(lcc_records::Entity)
        .all(conn)
        .await?;

    let mut players = completion_players::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|row| (row.completion_id, row.player_id))
        .into_group_map();

    let completions = rows
        .into_iter()
        .map(|(completion, lcc)| ScoringCompletion {
            id: completion.id,
            players: players.remove(&completion.id).unwrap_or_default(),
            map_code: completion.map_code,
            format: completion.format,
            black_border: completion.black_border,
            no_optimal_hero: completion.no_optimal_hero,
            leftover: lcc.map(|lcc| lcc.leftover),
            accepted: completion.accepted_by.is_some(),
            deleted: completion.deleted_on.is_some(),
        })
        .collect();

    Ok(ScoringInput {
        maps,
        completions,
        constants,
    })
}

/// Builds the scoring engine over the current version of the data.
///
/// The constants come from the cache if one is provided.
pub async fn snapshot_engine<C: TransactionTrait>(
    conn: &C,
    cache: Option<&ConstantsCache>,
) -> MaplistResult<ScoringEngine> {
    txn::read_snapshot(conn, async |txn| {
        let constants = match cache {
            Some(cache) => cache.get(txn).await?,
            None => constants::load_latest(txn).await?,
        };
        let input = load_input(txn, constants).await?;
        MaplistResult::Ok(ScoringEngine::new(input))
    })
    .await
}

/// Returns the points and medals of the player over the provided formats.
#[tracing::instrument(skip(conn, cache))]
pub async fn compute_user_totals<C: TransactionTrait>(
    conn: &C,
    cache: Option<&ConstantsCache>,
    player_id: i64,
    formats: &[Format],
) -> MaplistResult<UserTotals> {
    let engine = snapshot_engine(conn, cache).await?;
    Ok(engine.user_totals(player_id, formats))
}

/// Returns a page of the leaderboard of the format for the metric, with the page size of the
/// library environment.
#[tracing::instrument(skip(conn, cache))]
pub async fn compute_leaderboard<C: TransactionTrait>(
    conn: &C,
    cache: Option<&ConstantsCache>,
    format: Format,
    metric: Metric,
    page: u64,
) -> MaplistResult<LeaderboardPage> {
    let engine = snapshot_engine(conn, cache).await?;
    Ok(engine.leaderboard_page(format, metric, page, crate::leaderboard_page_size())?)
}

/// Returns the full leaderboard of the format for the metric.
#[tracing::instrument(skip(conn, cache))]
pub async fn compute_full_leaderboard<C: TransactionTrait>(
    conn: &C,
    cache: Option<&ConstantsCache>,
    format: Format,
    metric: Metric,
) -> MaplistResult<Vec<LeaderboardEntry>> {
    let engine = snapshot_engine(conn, cache).await?;
    Ok(engine.leaderboard(format, metric))
}

/// Returns the ID of the current least-cost completion of the map in the format.
///
/// A fully deleted map has none.
#[tracing::instrument(skip(conn))]
pub async fn current_lcc<C: ConnectionTrait>(
    conn: &C,
    map_code: &str,
    format: Format,
) -> MaplistResult<Option<i32>> {
    let map = must::have_map(conn, map_code).await?;
    if map.deleted_on.is_some() {
        return Ok(None);
    }

    let candidates = completions::Entity::find()
        .filter(completions::Column::MapCode.eq(map_code))
        .filter(completions::Column::Format.eq(format))
        .filter(completions::Column::AcceptedBy.is_not_null())
        .filter(completions::Column::DeletedOn.is_null())
        .find_also_related(lcc_records::Entity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(completion, lcc)| lcc.map(|lcc| (completion.id, lcc.leftover)));

    Ok(engine::pick_current_lcc(candidates).map(|(id, _)| id))
}

/// Returns the leaderboards of every format for every metric, over the current version of
/// the data.
pub async fn compute_leaderboards<C: TransactionTrait>(
    conn: &C,
    cache: Option<&ConstantsCache>,
) -> MaplistResult<BTreeMap<(Format, Metric), Vec<LeaderboardEntry>>> {
    let engine = snapshot_engine(conn, cache).await?;
    Ok(engine.leaderboards())
}
