//! The moderation operations on the maps.
//!
//! Every touched axis is gated on the capability of the caller in the format of this axis.
//! Untouched axes need no capability and trigger no cascade.

use entity::{
    maps,
    types::{ExpertTier, Format},
};
use sea_orm::{
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _,
    IntoActiveModel as _, QueryFilter as _, TransactionTrait,
};

use crate::{
    constants,
    error::{MaplistError, MaplistResult, ValidationError},
    ledger::{self, Placement},
    must,
    permissions::{Permissions, perms},
    txn,
};

/// The value requested on each axis. For the expert axis, it is the index of the tier.
///
/// On a list axis, a rank above the capacity of the axis leaves the map off it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisRequest {
    /// The requested rank on the current-version list.
    pub rank_current: Option<i32>,
    /// The requested rank on the all-versions list.
    pub rank_allversions: Option<i32>,
    /// The requested tier on the expert list.
    pub difficulty: Option<i32>,
}

impl AxisRequest {
    fn get(&self, format: Format) -> Option<i32> {
        match format {
            Format::Current => self.rank_current,
            Format::AllVersions => self.rank_allversions,
            Format::Expert => self.difficulty,
        }
    }
}

/// A map to add to the list.
#[derive(Debug, Clone)]
pub struct NewMap {
    /// The code of the map. It can't be already used, even by a deleted map.
    pub code: String,
    /// The name of the map.
    pub name: String,
    /// Where to place the map.
    pub placement: AxisRequest,
    /// The remake catalog entry of the map.
    pub remake_of: Option<i32>,
}

/// An edit of a map. `None` leaves the attribute unchanged.
///
/// For the axes, `Some(None)` removes the map from the axis.
#[derive(Debug, Clone, Default)]
pub struct MapEdit {
    /// The new name.
    pub name: Option<String>,
    /// The new remake catalog entry.
    pub remake_of: Option<Option<i32>>,
    /// The new rank on the current-version list.
    pub rank_current: Option<Option<i32>>,
    /// The new rank on the all-versions list.
    pub rank_allversions: Option<Option<i32>>,
    /// The new tier on the expert list.
    pub difficulty: Option<Option<i32>>,
}

impl MapEdit {
    fn axis(&self, format: Format) -> Option<Option<i32>> {
        match format {
            Format::Current => self.rank_current,
            Format::AllVersions => self.rank_allversions,
            Format::Expert => self.difficulty,
        }
    }
}

/// The outcome of [`soft_delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeleteOutcome {
    /// The map after the deletion.
    pub map: maps::Model,
    /// The axes the map was removed from by this call.
    pub cleared: Vec<Format>,
    /// Whether the map is now fully deleted.
    pub fully_deleted: bool,
}

fn current_value(placement: &Placement, format: Format) -> Option<i32> {
    match format {
        Format::Expert => placement.difficulty.map(i32::from),
        _ => placement.rank(format),
    }
}

fn check_tier(value: Option<i32>) -> Result<(), ValidationError> {
    value.map(ExpertTier::try_from).transpose()?;
    Ok(())
}

/// Resolves the requested value of a map on an axis, loading the axis if needed.
async fn resolve_axis_value<C: ConnectionTrait>(
    conn: &C,
    map_id: i32,
    format: Format,
    requested: Option<i32>,
    capacity: Option<i32>,
) -> MaplistResult<Option<i32>> {
    match (format, requested) {
        (Format::Expert, value) | (_, value @ None) => Ok(value),
        (_, Some(rank)) => {
            let axis = ledger::load_axis(conn, format, capacity).await?;
            Ok(axis.resolve_rank(map_id, rank)?)
        }
    }
}

/// Adds a map to the list, and places it on the requested axes.
///
/// The caller needs the `create:map` permission in the format of every requested axis,
/// or in any format if no axis is requested.
#[tracing::instrument(skip(conn, permissions), fields(code = %new.code))]
pub async fn add<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    new: NewMap,
) -> MaplistResult<maps::Model> {
    let requested = Format::ALL
        .into_iter()
        .filter(|f| new.placement.get(*f).is_some())
        .collect::<Vec<_>>();

    if requested.is_empty() {
        permissions.require_any(perms::CREATE_MAP)?;
    }
    for format in &requested {
        permissions.require(perms::CREATE_MAP, *format)?;
    }
    check_tier(new.placement.difficulty)?;

    let map = txn::transaction(conn, async |txn| {
        if maps::Entity::find()
            .filter(maps::Column::Code.eq(&new.code))
            .one(txn)
            .await?
            .is_some()
        {
            return Err(MaplistError::from(ValidationError::DuplicateMapCode(
                new.code.clone(),
            )));
        }

        let constants = constants::load_latest(txn).await?;
        let capacity = constants.list_capacity();

        let map = maps::ActiveModel {
            code: Set(new.code.clone()),
            name: Set(new.name.clone()),
            rank_current: Set(None),
            rank_allversions: Set(None),
            difficulty: Set(None),
            remake_of: Set(new.remake_of),
            created_on: Set(chrono::Utc::now().naive_utc()),
            deleted_on: Set(None),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        for format in &requested {
            let value =
                resolve_axis_value(txn, map.id, *format, new.placement.get(*format), capacity)
                    .await?;
            if value.is_some() {
                ledger::set_axis(txn, map.id, *format, value, capacity).await?;
            }
        }

        must::have_map(txn, &new.code).await
    })
    .await?;

    tracing::info!(id = map.id, placement = ?Placement::of(&map), "added map");

    Ok(map)
}

/// Edits a map.
///
/// Every changed axis needs the `edit:map` permission in its format, and a rename or a change
/// of the remake entry needs it in any format. A fully deleted map regaining a value on any
/// axis is restored.
#[tracing::instrument(skip(conn, permissions, edit))]
pub async fn edit<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    code: &str,
    edit: MapEdit,
) -> MaplistResult<maps::Model> {
    let map = txn::transaction(conn, async |txn| {
        let map = must::have_map(txn, code).await?;
        let before = Placement::of(&map);

        let changed_axes = Format::ALL
            .into_iter()
            .filter_map(|f| {
                edit.axis(f)
                    .filter(|value| *value != current_value(&before, f))
                    .map(|value| (f, value))
            })
            .collect::<Vec<_>>();

        let metadata_changed = edit.name.as_ref().is_some_and(|n| *n != map.name)
            || edit.remake_of.is_some_and(|r| r != map.remake_of);

        if metadata_changed {
            permissions.require_any(perms::EDIT_MAP)?;
        }
        for (format, value) in &changed_axes {
            permissions.require(perms::EDIT_MAP, *format)?;
            if *format == Format::Expert {
                check_tier(*value)?;
            }
        }

        if !changed_axes.is_empty() {
            let capacity = constants::load_latest(txn).await?.list_capacity();
            for (format, value) in changed_axes {
                let value = resolve_axis_value(txn, map.id, format, value, capacity).await?;
                ledger::set_axis(txn, map.id, format, value, capacity).await?;
            }
        }

        let reloaded = must::have_map(txn, code).await?;
        let restored = reloaded.deleted_on.is_some() && !Placement::of(&reloaded).is_unset();

        if !metadata_changed && !restored {
            return Ok(reloaded);
        }

        let mut active = reloaded.into_active_model();
        if let Some(name) = &edit.name {
            active.name = Set(name.clone());
        }
        if let Some(remake_of) = edit.remake_of {
            active.remake_of = Set(remake_of);
        }
        if restored {
            active.deleted_on = Set(None);
        }

        MaplistResult::Ok(active.update(txn).await?)
    })
    .await?;

    tracing::info!(id = map.id, placement = ?Placement::of(&map), "edited map");

    Ok(map)
}

/// Removes a map from the requested axes.
///
/// An axis is only touched if the caller holds the `delete:map` permission in its format. The
/// map is fully deleted once it holds no value on any axis. Deleting an axis twice does nothing.
///
/// Returns a validation error if no axis is requested, and a permission error if the caller
/// can't delete the map from any requested axis.
#[tracing::instrument(skip(conn, permissions))]
pub async fn soft_delete<C: TransactionTrait>(
    conn: &C,
    permissions: &Permissions,
    code: &str,
    axes: &[Format],
) -> MaplistResult<SoftDeleteOutcome> {
    if axes.is_empty() {
        return Err(ValidationError::NoAxes.into());
    }

    let allowed = axes
        .iter()
        .copied()
        .filter(|f| permissions.has(perms::DELETE_MAP, Some(*f)))
        .collect::<Vec<_>>();

    if allowed.is_empty() {
        return Err(MaplistError::PermissionDenied {
            permission: perms::DELETE_MAP,
            format: axes.first().copied(),
        });
    }

    let outcome = txn::transaction(conn, async |txn| {
        let map = must::have_map(txn, code).await?;
        let before = Placement::of(&map);

        let mut cleared = Vec::new();
        for format in Format::ALL {
            if allowed.contains(&format) && before.is_placed(format) {
                ledger::set_axis(txn, map.id, format, None, None).await?;
                cleared.push(format);
            }
        }

        let map = must::have_map(txn, code).await?;
        let fully_deleted = Placement::of(&map).is_unset();

        let map = if fully_deleted && map.deleted_on.is_none() {
            let mut active = map.into_active_model();
            active.deleted_on = Set(Some(chrono::Utc::now().naive_utc()));
            active.update(txn).await?
        } else {
            map
        };

        MaplistResult::Ok(SoftDeleteOutcome {
            map,
            cleared,
            fully_deleted,
        })
    })
    .await?;

    tracing::info!(
        id = outcome.map.id,
        cleared = ?outcome.cleared,
        fully_deleted = outcome.fully_deleted,
        "soft-deleted map"
    );

    Ok(outcome)
}
