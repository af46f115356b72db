//! This module contains utility functions used to retrieve some objects from the database,
//! that must exist. This is why it is called `must`.
//!
//! Unlike the Rust conventions, when such an object doesn't exist, the returned value isn't
//! `Option::None` but the corresponding validation error (for example,
//! [`ValidationError::MapNotFound`]).

use entity::{completions, maps, players};
use sea_orm::{ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _};

use crate::error::{MaplistResult, ValidationError};

/// Returns the map in the database bound to the provided code, deleted or not.
pub async fn have_map<C: ConnectionTrait>(conn: &C, code: &str) -> MaplistResult<maps::Model> {
    maps::Entity::find()
        .filter(maps::Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or_else(|| ValidationError::MapNotFound(code.to_owned()).into())
}

/// Returns the map in the database bound to the provided code, if it isn't fully deleted.
pub async fn have_live_map<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> MaplistResult<maps::Model> {
    let map = have_map(conn, code).await?;
    if map.deleted_on.is_some() {
        return Err(ValidationError::MapDeleted(map.code).into());
    }
    Ok(map)
}

/// Returns the completion in the database bound to the provided ID.
pub async fn have_completion<C: ConnectionTrait>(
    conn: &C,
    completion_id: i32,
) -> MaplistResult<completions::Model> {
    completions::Entity::find_by_id(completion_id)
        .one(conn)
        .await?
        .ok_or_else(|| ValidationError::CompletionNotFound(completion_id).into())
}

/// Returns the player in the database bound to the provided ID.
pub async fn have_player<C: ConnectionTrait>(
    conn: &C,
    player_id: i64,
) -> MaplistResult<players::Model> {
    players::Entity::find_by_id(player_id)
        .one(conn)
        .await?
        .ok_or_else(|| ValidationError::PlayerNotFound(player_id).into())
}
