#![allow(dead_code)]

use entity::{
    capability_grants, capability_roles, player_capability_roles, players, types::Format,
};
use maplist_lib::{
    Database,
    completion::{self, NewCompletion},
    map::{self, AxisRequest, NewMap},
    permissions::{FormatScope, Permissions, perms},
};
use sea_orm::{ActiveModelTrait as _, ActiveValue::Set, ConnectionTrait};
use test_env::IntoResult;

pub const ALL_PERMS: [&str; 8] = [
    perms::CREATE_MAP,
    perms::EDIT_MAP,
    perms::DELETE_MAP,
    perms::CREATE_COMPLETION_SUBMISSION,
    perms::EDIT_COMPLETION,
    perms::DELETE_COMPLETION,
    perms::EDIT_CONFIG,
    perms::EDIT_ACHIEVEMENT_ROLES,
];

pub const MODERATOR_ID: i64 = 1;

pub async fn with_db<F, R>(test: F) -> anyhow::Result<<R as IntoResult>::Out>
where
    F: AsyncFnOnce(Database) -> R,
    R: IntoResult,
{
    test_env::wrap(async |db| test(db).await.into_result()).await
}

/// Returns a subject holding every capability globally.
pub fn admin() -> Permissions {
    ALL_PERMS
        .into_iter()
        .fold(Permissions::none(), |p, name| p.with(FormatScope::Global, name))
}

/// Returns a subject holding every capability in the provided format only.
pub fn moderator_of(format: Format) -> Permissions {
    ALL_PERMS.into_iter().fold(Permissions::none(), |p, name| {
        p.with(FormatScope::Partition(format), name)
    })
}

pub async fn insert_players<C: ConnectionTrait>(conn: &C, ids: &[i64]) -> anyhow::Result<()> {
    for id in ids {
        players::ActiveModel {
            id: Set(*id),
            name: Set(format!("player_{id}")),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Gives the player a new capability role made of the provided grants.
pub async fn give_role<C: ConnectionTrait>(
    conn: &C,
    player_id: i64,
    name: &str,
    grants: &[(Option<Format>, &str)],
) -> anyhow::Result<()> {
    let role = capability_roles::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    for (format, permission) in grants {
        capability_grants::ActiveModel {
            role_id: Set(role.id),
            format: Set(*format),
            permission: Set((*permission).to_owned()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    player_capability_roles::ActiveModel {
        player_id: Set(player_id),
        role_id: Set(role.id),
    }
    .insert(conn)
    .await?;

    Ok(())
}

pub async fn add_map(
    db: &Database,
    code: &str,
    rank_current: Option<i32>,
    difficulty: Option<i32>,
) -> anyhow::Result<entity::maps::Model> {
    let map = map::add(
        &db.sql_conn,
        &admin(),
        NewMap {
            code: code.to_owned(),
            name: format!("Map {code}"),
            placement: AxisRequest {
                rank_current,
                rank_allversions: None,
                difficulty,
            },
            remake_of: None,
        },
    )
    .await?;
    Ok(map)
}

/// Submits then accepts a completion.
pub async fn add_completion(
    db: &Database,
    map_code: &str,
    format: Format,
    players: &[i64],
    black_border: bool,
    no_optimal_hero: bool,
    lcc: Option<i64>,
) -> anyhow::Result<i32> {
    let submitted = completion::submit(
        &db.sql_conn,
        &admin(),
        NewCompletion {
            map_code: map_code.to_owned(),
            format,
            black_border,
            no_optimal_hero,
            lcc,
            players: players.to_vec(),
        },
    )
    .await?;
    completion::accept(&db.sql_conn, &admin(), MODERATOR_ID, submitted.id).await?;
    Ok(submitted.id)
}
