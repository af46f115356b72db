//! The permission model.
//!
//! A subject holds named capabilities, each one either globally or scoped to a format. A global
//! grant satisfies a query for any format. Every mutating operation of this crate checks the
//! [`Permissions`] of its caller before touching anything.

use std::collections::{BTreeMap, BTreeSet};

use entity::{capability_grants, player_capability_roles, types::Format};
use sea_orm::{ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _, QuerySelect as _};

use crate::error::{MaplistError, MaplistResult};

/// The names of the capabilities checked by this crate.
pub mod perms {
    /// Adding a map to an axis.
    pub const CREATE_MAP: &str = "create:map";
    /// Moving a map on an axis, or editing its metadata.
    pub const EDIT_MAP: &str = "edit:map";
    /// Removing a map from an axis.
    pub const DELETE_MAP: &str = "delete:map";
    /// Submitting a completion for review.
    pub const CREATE_COMPLETION_SUBMISSION: &str = "create:completion_submission";
    /// Accepting or editing a completion.
    pub const EDIT_COMPLETION: &str = "edit:completion";
    /// Deleting or rejecting a completion.
    pub const DELETE_COMPLETION: &str = "delete:completion";
    /// Editing the tuning constants.
    pub const EDIT_CONFIG: &str = "edit:config";
    /// Editing the achievement role definitions.
    pub const EDIT_ACHIEVEMENT_ROLES: &str = "edit:achievement_roles";
}

/// The scope of a capability grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormatScope {
    /// The grant applies to every format.
    Global,
    /// The grant applies to a single format.
    Partition(Format),
}

impl From<Option<Format>> for FormatScope {
    fn from(value: Option<Format>) -> Self {
        value.map(Self::Partition).unwrap_or(Self::Global)
    }
}

/// The resolved capabilities of a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions {
    grants: BTreeMap<FormatScope, BTreeSet<String>>,
}

impl Permissions {
    /// Returns a subject without any capability.
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a grant of the capability in the provided scope.
    pub fn grant(&mut self, scope: FormatScope, name: impl Into<String>) -> &mut Self {
        self.grants.entry(scope).or_default().insert(name.into());
        self
    }

    /// Builder version of [`grant`](Self::grant).
    pub fn with(mut self, scope: FormatScope, name: impl Into<String>) -> Self {
        self.grant(scope, name);
        self
    }

    fn scope_has(&self, scope: FormatScope, name: &str) -> bool {
        self.grants
            .get(&scope)
            .is_some_and(|names| names.contains(name))
    }

    /// Returns whether the subject holds the capability in the provided format.
    ///
    /// A global grant satisfies any format. If `format` is `None`, only global grants
    /// are considered.
    pub fn has(&self, name: &str, format: Option<Format>) -> bool {
        self.scope_has(FormatScope::Global, name)
            || format.is_some_and(|f| self.scope_has(FormatScope::Partition(f), name))
    }

    /// Returns whether the subject holds the capability globally or in at least one format.
    pub fn has_in_any_format(&self, name: &str) -> bool {
        self.grants.values().any(|names| names.contains(name))
    }

    /// Returns every scope the subject holds the capability in.
    ///
    /// A global grant is reported as [`FormatScope::Global`], it isn't expanded to every format.
    pub fn formats_where(&self, name: &str) -> BTreeSet<FormatScope> {
        self.grants
            .iter()
            .filter(|(_, names)| names.contains(name))
            .map(|(scope, _)| *scope)
            .collect()
    }

    /// Returns an error if the subject doesn't hold the capability in the provided format.
    pub fn require(&self, name: &'static str, format: Format) -> MaplistResult<()> {
        if self.has(name, Some(format)) {
            Ok(())
        } else {
            Err(MaplistError::PermissionDenied {
                permission: name,
                format: Some(format),
            })
        }
    }

    /// Returns an error if the subject doesn't hold the capability in any format.
    pub fn require_any(&self, name: &'static str) -> MaplistResult<()> {
        if self.has_in_any_format(name) {
            Ok(())
        } else {
            Err(MaplistError::PermissionDenied {
                permission: name,
                format: None,
            })
        }
    }
}

/// Resolves the capabilities of a player through the roles they were given.
#[tracing::instrument(skip(conn))]
pub async fn load_for_player<C: ConnectionTrait>(
    conn: &C,
    player_id: i64,
) -> MaplistResult<Permissions> {
    let role_ids: Vec<i32> = player_capability_roles::Entity::find()
        .filter(player_capability_roles::Column::PlayerId.eq(player_id))
        .select_only()
        .column(player_capability_roles::Column::RoleId)
        .into_tuple()
        .all(conn)
        .await?;

    if role_ids.is_empty() {
        return Ok(Permissions::none());
    }

    let grants = capability_grants::Entity::find()
        .filter(capability_grants::Column::RoleId.is_in(role_ids))
        .all(conn)
        .await?;

    let mut permissions = Permissions::none();
    for grant in grants {
        permissions.grant(grant.format.into(), grant.permission);
    }

    Ok(permissions)
}

#[cfg(test)]
mod tests {
    use entity::types::Format;

    use super::{FormatScope, Permissions, perms};

    fn moderator_of(format: Format) -> Permissions {
        Permissions::none()
            .with(FormatScope::Partition(format), perms::EDIT_MAP)
            .with(FormatScope::Partition(format), perms::DELETE_MAP)
    }

    #[test]
    fn scoped_grant_only_applies_to_its_format() {
        let p = moderator_of(Format::Current);
        assert!(p.has(perms::EDIT_MAP, Some(Format::Current)));
        assert!(!p.has(perms::EDIT_MAP, Some(Format::Expert)));
        assert!(!p.has(perms::EDIT_MAP, None));
        assert!(p.has_in_any_format(perms::EDIT_MAP));
        assert!(!p.has_in_any_format(perms::EDIT_CONFIG));
    }

    #[test]
    fn global_grant_satisfies_every_format() {
        let p = Permissions::none().with(FormatScope::Global, perms::EDIT_CONFIG);
        assert!(p.has(perms::EDIT_CONFIG, None));
        for format in Format::ALL {
            assert!(p.has(perms::EDIT_CONFIG, Some(format)));
        }
    }

    #[test]
    fn formats_where_reports_global_as_wildcard() {
        let p = moderator_of(Format::Expert)
            .with(FormatScope::Partition(Format::AllVersions), perms::DELETE_MAP)
            .with(FormatScope::Global, perms::EDIT_MAP);

        assert_eq!(
            p.formats_where(perms::DELETE_MAP).into_iter().collect::<Vec<_>>(),
            vec![
                FormatScope::Partition(Format::AllVersions),
                FormatScope::Partition(Format::Expert),
            ]
        );
        assert_eq!(
            p.formats_where(perms::EDIT_MAP).into_iter().collect::<Vec<_>>(),
            vec![FormatScope::Global, FormatScope::Partition(Format::Expert)]
        );
        assert!(p.formats_where(perms::EDIT_CONFIG).is_empty());
    }

    #[test]
    fn require_reports_the_missing_capability() {
        let p = moderator_of(Format::Current);
        assert!(p.require(perms::EDIT_MAP, Format::Current).is_ok());
        let err = p.require(perms::EDIT_MAP, Format::AllVersions).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::PermissionDenied);
    }
}
