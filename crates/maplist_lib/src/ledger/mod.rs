//! The placement ledger of the maps.
//!
//! Each map participates in three independent orderings: a dense rank on both list axes, and a
//! difficulty tier on the expert axis. The [`axis`] module holds the in-memory cascade, and this
//! module applies it to the store.
//!
//! Every function of this module must run inside the write transaction of its caller. A cascade
//! bumps the version of its axis with a compare-and-swap, so two concurrent writers can't both
//! claim the same rank: the second one gets a [`MaplistError::Conflict`] and its transaction is
//! rolled back.

pub mod axis;

use entity::{
    axis_versions, maps,
    types::{ExpertTier, Format},
};
use sea_orm::{
    ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _, QuerySelect as _,
    sea_query::Expr,
};

use crate::{
    error::{MaplistError, MaplistResult},
    inconsistent,
};

pub use axis::{AxisLedger, RankChange};

/// The three positional attributes of a map. Each one is independent from the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    /// The rank of the map on the current-version list.
    pub rank_current: Option<i32>,
    /// The rank of the map on the all-versions list.
    pub rank_allversions: Option<i32>,
    /// The tier of the map on the expert list.
    pub difficulty: Option<ExpertTier>,
}

impl Placement {
    /// Returns the placement of the provided map.
    pub fn of(map: &maps::Model) -> Self {
        Self {
            rank_current: map.rank_current,
            rank_allversions: map.rank_allversions,
            difficulty: map.difficulty,
        }
    }

    /// Returns the rank of the map on the provided list axis. Always `None` for the expert axis.
    pub fn rank(&self, format: Format) -> Option<i32> {
        match format {
            Format::Current => self.rank_current,
            Format::AllVersions => self.rank_allversions,
            Format::Expert => None,
        }
    }

    /// Returns whether the map holds a value on the axis of the provided format.
    pub fn is_placed(&self, format: Format) -> bool {
        match format {
            Format::Expert => self.difficulty.is_some(),
            _ => self.rank(format).is_some(),
        }
    }

    /// Returns whether the map holds no value on any axis.
    pub fn is_unset(&self) -> bool {
        Format::ALL.iter().all(|f| !self.is_placed(*f))
    }
}

/// Returns the column of the `maps` table holding the rank of the provided list axis.
fn rank_column(format: Format) -> MaplistResult<maps::Column> {
    match format {
        Format::Current => Ok(maps::Column::RankCurrent),
        Format::AllVersions => Ok(maps::Column::RankAllversions),
        Format::Expert => Err(inconsistent!("the expert axis has no rank column")),
    }
}

/// Returns the version of the axis of the provided format.
pub async fn axis_version<C: ConnectionTrait>(conn: &C, format: Format) -> MaplistResult<i64> {
    axis_versions::Entity::find()
        .filter(axis_versions::Column::Format.eq(format))
        .select_only()
        .column(axis_versions::Column::Version)
        .into_tuple()
        .one(conn)
        .await?
        .ok_or_else(|| inconsistent!("missing version row of the {format} axis"))
}

/// Bumps the version of the axis, if it still is the provided one.
///
/// Returns a conflict error if another writer bumped it since `version` was read.
pub async fn bump_axis_version<C: ConnectionTrait>(
    conn: &C,
    format: Format,
    version: i64,
) -> MaplistResult<()> {
    let res = axis_versions::Entity::update_many()
        .col_expr(axis_versions::Column::Version, Expr::value(version + 1))
        .filter(axis_versions::Column::Format.eq(format))
        .filter(axis_versions::Column::Version.eq(version))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        return Err(MaplistError::Conflict(format!("the {format} axis")));
    }

    Ok(())
}

/// Loads the ledger of the provided list axis.
pub async fn load_axis<C: ConnectionTrait>(
    conn: &C,
    format: Format,
    capacity: Option<i32>,
) -> MaplistResult<AxisLedger> {
    let column = rank_column(format)?;

    let ranks: Vec<(i32, i32)> = maps::Entity::find()
        .filter(column.is_not_null())
        .select_only()
        .column(maps::Column::Id)
        .column(column)
        .into_tuple()
        .all(conn)
        .await?;

    AxisLedger::from_ranks(format, capacity, ranks)
}

/// Writes the ranks moved by a cascade.
async fn write_changes<C: ConnectionTrait>(
    conn: &C,
    format: Format,
    changes: &[RankChange],
) -> MaplistResult<()> {
    let column = rank_column(format)?;

    for change in changes {
        maps::Entity::update_many()
            .col_expr(column, Expr::value(change.after))
            .filter(maps::Column::Id.eq(change.map_id))
            .exec(conn)
            .await?;
    }

    Ok(())
}

async fn apply_cascade<C, F>(
    conn: &C,
    format: Format,
    capacity: Option<i32>,
    f: F,
) -> MaplistResult<Vec<RankChange>>
where
    C: ConnectionTrait,
    F: FnOnce(&mut AxisLedger),
{
    let version = axis_version(conn, format).await?;
    let mut ledger = load_axis(conn, format, capacity).await?;

    f(&mut ledger);

    let changes = ledger.changes();
    write_changes(conn, format, &changes).await?;
    bump_axis_version(conn, format, version).await?;

    tracing::debug!(%format, moved = changes.len(), "applied cascade");

    Ok(changes)
}

/// Inserts the map at the provided rank of a list axis, or moves it there.
///
/// The rank must be already resolved with [`AxisLedger::resolve_rank`]. Returns every map
/// moved by the cascade, including the maps pushed off the axis.
#[tracing::instrument(skip(conn))]
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    map_id: i32,
    format: Format,
    rank: i32,
    capacity: Option<i32>,
) -> MaplistResult<Vec<RankChange>> {
    apply_cascade(conn, format, capacity, |ledger| {
        ledger.insert(map_id, rank);
    })
    .await
}

/// Removes the map from a list axis.
///
/// Returns every map moved by the cascade. It is empty if the map wasn't on the axis.
#[tracing::instrument(skip(conn))]
pub async fn remove<C: ConnectionTrait>(
    conn: &C,
    map_id: i32,
    format: Format,
) -> MaplistResult<Vec<RankChange>> {
    apply_cascade(conn, format, None, |ledger| {
        ledger.remove(map_id);
    })
    .await
}

/// Sets the tier of the map on the expert axis. Tiers are keys, so nothing cascades.
#[tracing::instrument(skip(conn))]
pub async fn set_tier<C: ConnectionTrait>(
    conn: &C,
    map_id: i32,
    tier: Option<ExpertTier>,
) -> MaplistResult<()> {
    let version = axis_version(conn, Format::Expert).await?;

    maps::Entity::update_many()
        .col_expr(maps::Column::Difficulty, Expr::value(tier.map(i32::from)))
        .filter(maps::Column::Id.eq(map_id))
        .exec(conn)
        .await?;

    bump_axis_version(conn, Format::Expert, version).await
}

/// Sets the value of the map on the axis of the provided format, `None` removing it.
///
/// For list axes, `value` is a rank resolved with [`AxisLedger::resolve_rank`]. For the expert
/// axis, it is the index of the tier.
pub async fn set_axis<C: ConnectionTrait>(
    conn: &C,
    map_id: i32,
    format: Format,
    value: Option<i32>,
    capacity: Option<i32>,
) -> MaplistResult<Vec<RankChange>> {
    match (format, value) {
        (Format::Expert, tier) => {
            let tier = tier
                .map(ExpertTier::try_from)
                .transpose()
                .map_err(crate::error::ValidationError::from)?;
            set_tier(conn, map_id, tier).await?;
            Ok(Vec::new())
        }
        (_, Some(rank)) => insert(conn, map_id, format, rank, capacity).await,
        (_, None) => remove(conn, map_id, format).await,
    }
}

#[cfg(test)]
mod tests {
    use entity::types::{ExpertTier, Format};

    use super::Placement;

    #[test]
    fn placement_axes_are_independent() {
        let p = Placement {
            rank_current: None,
            rank_allversions: Some(3),
            difficulty: Some(ExpertTier::Casual),
        };
        assert!(!p.is_placed(Format::Current));
        assert!(p.is_placed(Format::AllVersions));
        assert!(p.is_placed(Format::Expert));
        assert_eq!(p.rank(Format::Expert), None);
        assert!(!p.is_unset());
        assert!(Placement::default().is_unset());
    }
}
