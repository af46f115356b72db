//! The write paths of the completions.
//!
//! Each operation is gated on the capability of the caller in the format of the completion.

use std::collections::BTreeSet;

use entity::{completion_players, completions, lcc_records, types::Format};
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    IntoActiveModel as _, QueryFilter as _, QuerySelect as _, TransactionTrait,
};

use crate::{
    error::{MaplistResult, ValidationError},
    must,
    permissions::{Permissions, perms},
    txn,
};

/// A completion submitted for review.
#[derive(Debug, Clone)]
pub struct NewCompletion {
    /// The code of the completed map.
    pub map_code: String,
    /// The format the completion is scored against.
    pub format: Format,
    /// Whether the completion is black-border.
    pub black_border: bool,
    /// Whether the completion was done without the optimal hero.
    pub no_optimal_hero: bool,
    /// The leftover of the completion, if it is a least-cost attempt.
    pub lcc: Option<i64>,
    /// The players credited on the completion.
    pub players: Vec<i64>,
}

/// An edit of a completion. `None` leaves the attribute unchanged.
#[derive(Debug, Clone, Default)]
pub struct CompletionEdit {
    /// The new format.
    pub format: Option<Format>,
    /// The new black-border flag.
    pub black_border: Option<bool>,
    /// The new no-optimal-hero flag.
    pub no_optimal_hero: Option<bool>,
    /// The new leftover. `Some(None)` removes the least-cost record.
    pub lcc: Option<Option<i64>>,
    /// The new credited players.
    pub players: Option<Vec<i64>>,
}

/// A completion with its credited players and its least-cost record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDetails {
    /// The completion.
    pub completion: completions::Model,
    /// The credited players, sorted.
    pub players: Vec<i64>,
    /// The leftover of the least-cost record.
    pub leftover: Option<i64>,
}

fn check_players(players: &[i64]) -> Result<BTreeSet<i64>, ValidationError> {
    let players = players.iter().copied().collect::<BTreeSet<_>>();
    if players.is_empty() {
        return Err(ValidationError::NoPlayers);
    }
    Ok(players)
}

fn check_leftover(leftover: Option<i64>) -> Result<(), ValidationError> {
    match leftover {
        Some(l) if l < 0 => Err(ValidationError::NegativeLeftover(l)),
        _ => Ok(()),
    }
}

async fn set_players<C: ConnectionTrait>(
    conn: &C,
    completion_id: i32,
    players: &BTreeSet<i64>,
) -> MaplistResult<()> {
    for player in players {
        must::have_player(conn, *player).await?;
    }

    completion_players::Entity::delete_many()
        .filter(completion_players::Column::CompletionId.eq(completion_id))
        .exec(conn)
        .await?;

    completion_players::Entity::insert_many(players.iter().map(|player_id| {
        completion_players::ActiveModel {
            completion_id: Set(completion_id),
            player_id: Set(*player_id),
        }
    }))
    .exec(conn)
    .await?;

    Ok(())
}

/// Returns the completion with its credited players and its least-cost record.
pub async fn details<C: ConnectionTrait>(
    conn: &C,
    completion_id: i32,
) -> MaplistResult<CompletionDetails> {
    let completion = must::have_completion(conn, completion_id).await?;

    let mut players: Vec<i64> = completion_players::Entity::find()
        .filter(completion_players::Column::CompletionId.eq(completion_id))
        .select_only()
        .column(completion_players::Column::PlayerId)
        .into_tuple()
        .all(conn)
        .await?;
    players.sort_unstable();

    let leftover = match completion.lcc_id {
        Some(lcc_id) => lcc_records::Entity::find_by_id(lcc_id)
            .one(conn)
            .await?
            .map(|lcc| lcc.leftover),
        None => None,
    };

    Ok(CompletionDetails {
        completion,
        players,
        leftover,
    })
}

/// Submits a completion. It is pending until a moderator accepts it.
#[tracing::instrument(skip(conn, permissions, new), fields(map = %new.map_code, format = %new.format))]
pub async fn submit<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    new: NewCompletion,
) -> MaplistResult<completions::Model> {
    permissions.require(perms::CREATE_COMPLETION_SUBMISSION, new.format)?;
    let players = check_players(&new.players)?;
    check_leftover(new.lcc)?;

    let completion = txn::transaction(conn, async |txn| {
        must::have_live_map(txn, &new.map_code).await?;

        let lcc_id = match new.lcc {
            Some(leftover) => Some(
                lcc_records::ActiveModel {
                    leftover: Set(leftover),
                    ..Default::default()
                }
                .insert(txn)
                .await?
                .id,
            ),
            None => None,
        };

        let completion = completions::ActiveModel {
            map_code: Set(new.map_code.clone()),
            format: Set(new.format),
            black_border: Set(new.black_border),
            no_optimal_hero: Set(new.no_optimal_hero),
            lcc_id: Set(lcc_id),
            accepted_by: Set(None),
            created_on: Set(chrono::Utc::now().naive_utc()),
            deleted_on: Set(None),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        set_players(txn, completion.id, &players).await?;

        MaplistResult::Ok(completion)
    })
    .await?;

    tracing::info!(id = completion.id, "submitted completion");

    Ok(completion)
}

/// Accepts a pending completion. It counts in the scoring from now on.
#[tracing::instrument(skip(conn, permissions))]
pub async fn accept<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    moderator_id: i64,
    completion_id: i32,
) -> MaplistResult<completions::Model> {
    let completion = txn::transaction(conn, async |txn| {
        let completion = must::have_completion(txn, completion_id).await?;
        permissions.require(perms::EDIT_COMPLETION, completion.format)?;

        if completion.accepted_by.is_some() {
            return Err(ValidationError::AlreadyAccepted(completion_id).into());
        }

        let mut active = completion.into_active_model();
        active.accepted_by = Set(Some(moderator_id));
        MaplistResult::Ok(active.update(txn).await?)
    })
    .await?;

    tracing::info!("accepted completion");

    Ok(completion)
}

/// Edits a completion.
///
/// The caller needs the `edit:completion` permission in the format of the completion, and in
/// the new one if it is moved.
#[tracing::instrument(skip(conn, permissions, edit))]
pub async fn edit<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    completion_id: i32,
    edit: CompletionEdit,
) -> MaplistResult<CompletionDetails> {
    let players = edit.players.as_deref().map(check_players).transpose()?;
    check_leftover(edit.lcc.flatten())?;

    let out = txn::transaction(conn, async |txn| {
        let completion = must::have_completion(txn, completion_id).await?;
        permissions.require(perms::EDIT_COMPLETION, completion.format)?;
        if let Some(format) = edit.format {
            permissions.require(perms::EDIT_COMPLETION, format)?;
        }

        let old_lcc = completion.lcc_id;
        let mut active = completion.into_active_model();

        if let Some(format) = edit.format {
            active.format = Set(format);
        }
        if let Some(black_border) = edit.black_border {
            active.black_border = Set(black_border);
        }
        if let Some(no_optimal_hero) = edit.no_optimal_hero {
            active.no_optimal_hero = Set(no_optimal_hero);
        }

        let mut orphan_lcc = None;
        match (edit.lcc, old_lcc) {
            (Some(Some(leftover)), Some(lcc_id)) => {
                lcc_records::ActiveModel {
                    id: Set(lcc_id),
                    leftover: Set(leftover),
                }
                .update(txn)
                .await?;
            }
            (Some(Some(leftover)), None) => {
                let lcc = lcc_records::ActiveModel {
                    leftover: Set(leftover),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                active.lcc_id = Set(Some(lcc.id));
            }
            (Some(None), Some(lcc_id)) => {
                active.lcc_id = Set(None);
                orphan_lcc = Some(lcc_id);
            }
            (Some(None), None) | (None, _) => {}
        }

        if active.is_changed() {
            active.update(txn).await?;
        }

        if let Some(lcc_id) = orphan_lcc {
            lcc_records::Entity::delete_by_id(lcc_id).exec(txn).await?;
        }
        if let Some(players) = &players {
            set_players(txn, completion_id, players).await?;
        }

        details(txn, completion_id).await
    })
    .await?;

    tracing::info!("edited completion");

    Ok(out)
}

/// Deletes a completion. It stays in the database, but stops counting in the scoring.
///
/// Deleting a completion twice does nothing.
#[tracing::instrument(skip(conn, permissions))]
pub async fn soft_delete<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    completion_id: i32,
) -> MaplistResult<completions::Model> {
    txn::transaction(conn, async |txn| {
        let completion = must::have_completion(txn, completion_id).await?;
        permissions.require(perms::DELETE_COMPLETION, completion.format)?;

        if completion.deleted_on.is_some() {
            return Ok(completion);
        }

        let mut active = completion.into_active_model();
        active.deleted_on = Set(Some(chrono::Utc::now().naive_utc()));
        let completion = active.update(txn).await?;

        tracing::info!("deleted completion");

        MaplistResult::Ok(completion)
    })
    .await
}

/// Rejects a pending completion. Unlike [`soft_delete`], the completion is erased, with its
/// credits and its least-cost record.
#[tracing::instrument(skip(conn, permissions))]
pub async fn reject<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    completion_id: i32,
) -> MaplistResult<()> {
    txn::transaction(conn, async |txn| {
        let completion = must::have_completion(txn, completion_id).await?;
        permissions.require(perms::DELETE_COMPLETION, completion.format)?;

        if completion.accepted_by.is_some() {
            return Err(ValidationError::CannotRejectAccepted(completion_id).into());
        }

        completion_players::Entity::delete_many()
            .filter(completion_players::Column::CompletionId.eq(completion_id))
            .exec(txn)
            .await?;
        completions::Entity::delete_by_id(completion_id)
            .exec(txn)
            .await?;
        if let Some(lcc_id) = completion.lcc_id {
            lcc_records::Entity::delete_by_id(lcc_id).exec(txn).await?;
        }

        tracing::info!("rejected completion");

        MaplistResult::Ok(())
    })
    .await
}
