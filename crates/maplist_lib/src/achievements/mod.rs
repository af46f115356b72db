//! The achievement role synchronizer.
//!
//! Achievement roles are threshold-based badges, defined per format and leaderboard metric. The
//! synchronizer resolves who should hold each role from the leaderboards, and diffs it against
//! the snapshot last committed by the role issuer. See [`pending_updates`] and
//! [`commit_snapshot`].

pub mod resolve;
pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use entity::{
    achievement_role_badges, achievement_role_groups, achievement_roles,
    types::{Format, Metric},
};
use itertools::Itertools as _;
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    IntoActiveModel as _, QueryFilter as _, QueryOrder as _, TransactionTrait,
};

use crate::{
    error::{MaplistResult, ValidationError},
    permissions::{Permissions, perms},
    txn,
};

pub use resolve::{HolderSets, RoleAction, RoleEvent, diff, resolve};
pub use snapshot::{RoleFeed, commit_snapshot, load_snapshot, pending_updates};

/// The identity of an achievement role. It stays the same across the versions of its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct RoleKey {
    /// The format of the leaderboard.
    pub format: Format,
    /// The metric of the leaderboard.
    pub metric: Metric,
    /// The threshold of the role.
    pub threshold: i32,
}

/// An external badge issued along an achievement role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Badge {
    /// The ID of the chat server.
    pub guild_id: i64,
    /// The ID of the role on this server.
    pub badge_id: i64,
}

/// The definition of an achievement role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// The format of the leaderboard.
    pub format: Format,
    /// The metric of the leaderboard.
    pub metric: Metric,
    /// The minimum score to hold the role.
    pub threshold: i32,
    /// Whether the role is only held by the first place.
    pub for_first: bool,
    /// The display name.
    pub name: String,
    /// The display tooltip.
    pub tooltip: Option<String>,
    /// The border color, as `0xRRGGBB`.
    pub clr_border: i32,
    /// The inner color, as `0xRRGGBB`.
    pub clr_inner: i32,
    /// The external badges of the role.
    pub badges: Vec<Badge>,
}

impl RoleDefinition {
    /// Returns the key of the role.
    pub fn key(&self) -> RoleKey {
        RoleKey {
            format: self.format,
            metric: self.metric,
            threshold: self.threshold,
        }
    }
}

/// Checks the definitions of a `(format, metric)` group.
pub fn validate_group(
    format: Format,
    metric: Metric,
    roles: &[RoleDefinition],
) -> Result<(), ValidationError> {
    if let Some(foreign) = roles
        .iter()
        .find(|r| r.format != format || r.metric != metric)
    {
        return Err(ValidationError::ForeignRole(foreign.name.clone()));
    }

    let mut thresholds = BTreeSet::new();
    for role in roles {
        if !thresholds.insert(role.threshold) {
            return Err(ValidationError::DuplicateThreshold {
                format,
                metric,
                threshold: role.threshold,
            });
        }
    }

    if roles.iter().filter(|r| r.for_first).count() > 1 {
        return Err(ValidationError::SeveralFirstPlaceRoles { format, metric });
    }

    Ok(())
}

/// Returns the latest version number of every `(format, metric)` group.
async fn latest_versions<C: ConnectionTrait>(
    conn: &C,
) -> MaplistResult<BTreeMap<(Format, Metric), i32>> {
    Ok(achievement_role_groups::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|g| ((g.format, g.metric), g.version))
        .collect())
}

/// Loads the definitions of the latest version of every group, with their badges.
pub async fn load_definitions<C: ConnectionTrait>(conn: &C) -> MaplistResult<Vec<RoleDefinition>> {
    let versions = latest_versions(conn).await?;

    let rows = achievement_roles::Entity::find()
        .order_by_asc(achievement_roles::Column::Format)
        .order_by_asc(achievement_roles::Column::Metric)
        .order_by_asc(achievement_roles::Column::Threshold)
        .all(conn)
        .await?
        .into_iter()
        .filter(|r| versions.get(&(r.format, r.metric)) == Some(&r.version))
        .collect::<Vec<_>>();

    let mut badges = achievement_role_badges::Entity::find()
        .filter(achievement_role_badges::Column::AchievementRoleId.is_in(rows.iter().map(|r| r.id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|b| {
            (
                b.achievement_role_id,
                Badge {
                    guild_id: b.guild_id,
                    badge_id: b.badge_id,
                },
            )
        })
        .into_group_map();

    Ok(rows
        .into_iter()
        .map(|r| {
            let mut role_badges = badges.remove(&r.id).unwrap_or_default();
            role_badges.sort_unstable();
            RoleDefinition {
                format: r.format,
                metric: r.metric,
                threshold: r.threshold,
                for_first: r.for_first,
                name: r.name,
                tooltip: r.tooltip,
                clr_border: r.clr_border,
                clr_inner: r.clr_inner,
                badges: role_badges,
            }
        })
        .collect())
}

/// Replaces the definitions of a `(format, metric)` group, by writing a new version of it.
///
/// The caller needs the `edit:achievement_roles` permission in the format of the group.
/// An empty list of roles removes every role of the group. Returns the new version number.
#[tracing::instrument(skip(conn, permissions, roles), fields(roles = roles.len()))]
pub async fn replace_group<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    format: Format,
    metric: Metric,
    roles: Vec<RoleDefinition>,
) -> MaplistResult<i32> {
    permissions.require(perms::EDIT_ACHIEVEMENT_ROLES, format)?;
    validate_group(format, metric, &roles)?;

    let version = txn::transaction(conn, async |txn| {
        let group = achievement_role_groups::Entity::find()
            .filter(achievement_role_groups::Column::Format.eq(format))
            .filter(achievement_role_groups::Column::Metric.eq(metric))
            .one(txn)
            .await?;

        let version = match group {
            Some(group) => {
                let version = group.version + 1;
                let mut group = group.into_active_model();
                group.version = Set(version);
                group.update(txn).await?;
                version
            }
            None => {
                achievement_role_groups::ActiveModel {
                    format: Set(format),
                    metric: Set(metric),
                    version: Set(1),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                1
            }
        };

        for role in &roles {
            let row = achievement_roles::Entity::insert(achievement_roles::ActiveModel {
                version: Set(version),
                format: Set(format),
                metric: Set(metric),
                threshold: Set(role.threshold),
                for_first: Set(role.for_first),
                name: Set(role.name.clone()),
                tooltip: Set(role.tooltip.clone()),
                clr_border: Set(role.clr_border),
                clr_inner: Set(role.clr_inner),
                ..Default::default()
            })
            .exec(txn)
            .await?;

            if role.badges.is_empty() {
                continue;
            }

            achievement_role_badges::Entity::insert_many(role.badges.iter().unique().map(|b| {
                achievement_role_badges::ActiveModel {
                    achievement_role_id: Set(row.last_insert_id),
                    guild_id: Set(b.guild_id),
                    badge_id: Set(b.badge_id),
                }
            }))
            .exec(txn)
            .await?;
        }

        MaplistResult::Ok(version)
    })
    .await?;

    tracing::info!(version, "replaced achievement roles");

    Ok(version)
}

#[cfg(test)]
mod tests {
    use entity::types::{Format, Metric};

    use super::{RoleDefinition, validate_group};
    use crate::error::ValidationError;

    fn role(threshold: i32, for_first: bool) -> RoleDefinition {
        RoleDefinition {
            format: Format::Expert,
            metric: Metric::Lccs,
            threshold,
            for_first,
            name: format!("LCC {threshold}"),
            tooltip: None,
            clr_border: 0xffffff,
            clr_inner: 0x000000,
            badges: Vec::new(),
        }
    }

    #[test]
    fn group_invariants() {
        let valid = [role(0, true), role(5, false), role(10, false)];
        assert_eq!(validate_group(Format::Expert, Metric::Lccs, &valid), Ok(()));
        assert_eq!(validate_group(Format::Expert, Metric::Lccs, &[]), Ok(()));

        assert_eq!(
            validate_group(Format::Expert, Metric::Lccs, &[role(5, false), role(5, false)]),
            Err(ValidationError::DuplicateThreshold {
                format: Format::Expert,
                metric: Metric::Lccs,
                threshold: 5
            })
        );
        assert_eq!(
            validate_group(Format::Expert, Metric::Lccs, &[role(1, true), role(2, true)]),
            Err(ValidationError::SeveralFirstPlaceRoles {
                format: Format::Expert,
                metric: Metric::Lccs
            })
        );
        assert_eq!(
            validate_group(Format::Current, Metric::Lccs, &valid),
            Err(ValidationError::ForeignRole("LCC 0".to_owned()))
        );
    }
}
