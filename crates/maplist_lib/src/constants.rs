//! The versioned tuning constants of the scoring.
//!
//! The constants are stored as key/value sets, one per version. An edit never mutates a set,
//! it writes a complete new one, so a reader always observes a single consistent version.

use std::{
    collections::BTreeMap,
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use entity::{
    tuning_constant_sets, tuning_constants,
    types::{ExpertTier, Format},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _,
    QueryOrder as _, SqlErr, TransactionTrait,
};
use tokio::sync::RwLock;

use crate::{
    error::{MaplistError, MaplistResult, ValidationError},
    inconsistent,
    permissions::{Permissions, perms},
    txn,
};

/// The default time-to-live of a [`ConstantsCache`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// The key of a tuning constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstantKey {
    /// The capacity of both list axes.
    MapCount,
    /// The amount of decimal digits of the point totals.
    DecimalDigits,
    /// The points of the first map of a list.
    PointsTopMap,
    /// The points of the last map of a list.
    PointsBottomMap,
    /// The slope of the list formula.
    FormulaSlope,
    /// The flat bonus of the current least-cost completion on a list map.
    PointsExtraLcc,
    /// The multiplier of a no-optimal-hero completion on a list map.
    PointsMultiOptHero,
    /// The multiplier of a black-border completion on a list map.
    PointsMultiBb,
    /// The points of an expert map of the tier.
    ExpPoints(ExpertTier),
    /// The no-optimal-hero bonus of an expert map of the tier.
    ExpNoOptHeroPoints(ExpertTier),
    /// The multiplier of a black-border completion on an expert map.
    ExpBbMulti,
    /// The flat bonus of the current least-cost completion on an expert map.
    ExpLccExtra,
}

impl ConstantKey {
    /// Returns every key, in a stable order.
    pub fn all() -> impl Iterator<Item = ConstantKey> {
        [
            ConstantKey::MapCount,
            ConstantKey::DecimalDigits,
            ConstantKey::PointsTopMap,
            ConstantKey::PointsBottomMap,
            ConstantKey::FormulaSlope,
            ConstantKey::PointsExtraLcc,
            ConstantKey::PointsMultiOptHero,
            ConstantKey::PointsMultiBb,
        ]
        .into_iter()
        .chain(ExpertTier::ALL.map(ConstantKey::ExpPoints))
        .chain(ExpertTier::ALL.map(ConstantKey::ExpNoOptHeroPoints))
        .chain([ConstantKey::ExpBbMulti, ConstantKey::ExpLccExtra])
    }

    /// Returns the formats whose scoring depends on this key.
    pub fn formats(self) -> &'static [Format] {
        match self {
            ConstantKey::DecimalDigits => &Format::ALL,
            ConstantKey::MapCount
            | ConstantKey::PointsTopMap
            | ConstantKey::PointsBottomMap
            | ConstantKey::FormulaSlope
            | ConstantKey::PointsExtraLcc
            | ConstantKey::PointsMultiOptHero
            | ConstantKey::PointsMultiBb => &Format::LISTS,
            ConstantKey::ExpPoints(_)
            | ConstantKey::ExpNoOptHeroPoints(_)
            | ConstantKey::ExpBbMulti
            | ConstantKey::ExpLccExtra => &[Format::Expert],
        }
    }

    /// Checks the value of this key on its own.
    fn check(self, value: f64) -> Result<(), &'static str> {
        if !value.is_finite() {
            return Err("the value must be a finite number");
        }

        match self {
            ConstantKey::MapCount if value.fract() != 0. || value < 1. => {
                Err("the value must be an integer of at least 1")
            }
            ConstantKey::DecimalDigits if value.fract() != 0. || !(0. ..=10.).contains(&value) => {
                Err("the value must be an integer between 0 and 10")
            }
            ConstantKey::PointsTopMap | ConstantKey::PointsBottomMap | ConstantKey::FormulaSlope
                if value <= 0. =>
            {
                Err("the value must be positive")
            }
            ConstantKey::PointsMultiOptHero | ConstantKey::PointsMultiBb | ConstantKey::ExpBbMulti
                if value < 1. =>
            {
                Err("a multiplier can't be lower than 1")
            }
            ConstantKey::PointsExtraLcc
            | ConstantKey::ExpPoints(_)
            | ConstantKey::ExpNoOptHeroPoints(_)
            | ConstantKey::ExpLccExtra
                if value < 0. =>
            {
                Err("the value can't be negative")
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ConstantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantKey::MapCount => f.write_str("map_count"),
            ConstantKey::DecimalDigits => f.write_str("decimal_digits"),
            ConstantKey::PointsTopMap => f.write_str("points_top_map"),
            ConstantKey::PointsBottomMap => f.write_str("points_bottom_map"),
            ConstantKey::FormulaSlope => f.write_str("formula_slope"),
            ConstantKey::PointsExtraLcc => f.write_str("points_extra_lcc"),
            ConstantKey::PointsMultiOptHero => f.write_str("points_multi_opt_hero"),
            ConstantKey::PointsMultiBb => f.write_str("points_multi_bb"),
            ConstantKey::ExpPoints(tier) => write!(f, "exp_points_{tier}"),
            ConstantKey::ExpNoOptHeroPoints(tier) => write!(f, "exp_no_opt_hero_points_{tier}"),
            ConstantKey::ExpBbMulti => f.write_str("exp_bb_multi"),
            ConstantKey::ExpLccExtra => f.write_str("exp_lcc_extra"),
        }
    }
}

impl FromStr for ConstantKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|key| key.to_string() == s)
            .ok_or_else(|| ValidationError::UnknownConstant(s.to_owned()))
    }
}

/// A complete version of the tuning constants.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningConstants {
    /// The version of the set.
    pub version: i32,
    /// See [`ConstantKey::MapCount`].
    pub map_count: i32,
    /// See [`ConstantKey::DecimalDigits`].
    pub decimal_digits: u32,
    /// See [`ConstantKey::PointsTopMap`].
    pub points_top_map: f64,
    /// See [`ConstantKey::PointsBottomMap`].
    pub points_bottom_map: f64,
    /// See [`ConstantKey::FormulaSlope`].
    pub formula_slope: f64,
    /// See [`ConstantKey::PointsExtraLcc`].
    pub points_extra_lcc: f64,
    /// See [`ConstantKey::PointsMultiOptHero`].
    pub points_multi_opt_hero: f64,
    /// See [`ConstantKey::PointsMultiBb`].
    pub points_multi_bb: f64,
    /// See [`ConstantKey::ExpPoints`], indexed by tier.
    pub exp_points: [f64; 5],
    /// See [`ConstantKey::ExpNoOptHeroPoints`], indexed by tier.
    pub exp_no_opt_hero_points: [f64; 5],
    /// See [`ConstantKey::ExpBbMulti`].
    pub exp_bb_multi: f64,
    /// See [`ConstantKey::ExpLccExtra`].
    pub exp_lcc_extra: f64,
}

impl Default for TuningConstants {
    /// Returns the set seeded by the first migration.
    fn default() -> Self {
        Self {
            version: 1,
            map_count: 50,
            decimal_digits: 0,
            points_top_map: 100.,
            points_bottom_map: 5.,
            formula_slope: 0.88,
            points_extra_lcc: 20.,
            points_multi_opt_hero: 2.,
            points_multi_bb: 3.,
            exp_points: [1., 2., 3., 4., 5.],
            exp_no_opt_hero_points: [1., 1., 2., 2., 3.],
            exp_bb_multi: 2.,
            exp_lcc_extra: 1.,
        }
    }
}

impl TuningConstants {
    /// Returns the value of the provided key.
    pub fn get(&self, key: ConstantKey) -> f64 {
        match key {
            ConstantKey::MapCount => self.map_count as f64,
            ConstantKey::DecimalDigits => self.decimal_digits as f64,
            ConstantKey::PointsTopMap => self.points_top_map,
            ConstantKey::PointsBottomMap => self.points_bottom_map,
            ConstantKey::FormulaSlope => self.formula_slope,
            ConstantKey::PointsExtraLcc => self.points_extra_lcc,
            ConstantKey::PointsMultiOptHero => self.points_multi_opt_hero,
            ConstantKey::PointsMultiBb => self.points_multi_bb,
            ConstantKey::ExpPoints(tier) => self.exp_points[tier.index()],
            ConstantKey::ExpNoOptHeroPoints(tier) => self.exp_no_opt_hero_points[tier.index()],
            ConstantKey::ExpBbMulti => self.exp_bb_multi,
            ConstantKey::ExpLccExtra => self.exp_lcc_extra,
        }
    }

    /// Sets the value of the provided key, after checking it.
    pub fn set(&mut self, key: ConstantKey, value: f64) -> Result<(), ValidationError> {
        key.check(value)
            .map_err(|reason| ValidationError::InvalidConstantValue {
                key: key.to_string(),
                value,
                reason,
            })?;

        match key {
            ConstantKey::MapCount => self.map_count = value as i32,
            ConstantKey::DecimalDigits => self.decimal_digits = value as u32,
            ConstantKey::PointsTopMap => self.points_top_map = value,
            ConstantKey::PointsBottomMap => self.points_bottom_map = value,
            ConstantKey::FormulaSlope => self.formula_slope = value,
            ConstantKey::PointsExtraLcc => self.points_extra_lcc = value,
            ConstantKey::PointsMultiOptHero => self.points_multi_opt_hero = value,
            ConstantKey::PointsMultiBb => self.points_multi_bb = value,
            ConstantKey::ExpPoints(tier) => self.exp_points[tier.index()] = value,
            ConstantKey::ExpNoOptHeroPoints(tier) => {
                self.exp_no_opt_hero_points[tier.index()] = value
            }
            ConstantKey::ExpBbMulti => self.exp_bb_multi = value,
            ConstantKey::ExpLccExtra => self.exp_lcc_extra = value,
        }

        Ok(())
    }

    /// Checks the constraints involving several keys.
    fn check_set(&self) -> Result<(), ValidationError> {
        if self.points_top_map < self.points_bottom_map {
            return Err(ValidationError::InvalidConstantValue {
                key: ConstantKey::PointsTopMap.to_string(),
                value: self.points_top_map,
                reason: "the top map can't be worth less than the bottom map",
            });
        }
        Ok(())
    }

    /// Returns every `(key, value)` pair of the set.
    pub fn values(&self) -> impl Iterator<Item = (ConstantKey, f64)> + '_ {
        ConstantKey::all().map(|key| (key, self.get(key)))
    }

    /// Returns the capacity of the list axes.
    pub fn list_capacity(&self) -> Option<i32> {
        Some(self.map_count)
    }

    fn from_rows(version: i32, rows: Vec<tuning_constants::Model>) -> MaplistResult<Self> {
        let mut values = BTreeMap::new();
        for row in rows {
            match row.name.parse::<ConstantKey>() {
                Ok(key) => {
                    values.insert(key, row.value);
                }
                Err(_) => {
                    tracing::warn!(name = %row.name, version, "ignoring unknown tuning constant");
                }
            }
        }

        let mut out = Self {
            version,
            ..Default::default()
        };
        for key in ConstantKey::all() {
            let value = values
                .get(&key)
                .copied()
                .ok_or_else(|| inconsistent!("tuning constant `{key}` missing in version {version}"))?;
            out.set(key, value)
                .map_err(|e| inconsistent!("stored tuning constant of version {version}: {e}"))?;
        }

        Ok(out)
    }
}

/// Returns the latest version of the tuning constants.
pub async fn load_latest<C: ConnectionTrait>(conn: &C) -> MaplistResult<TuningConstants> {
    let set = tuning_constant_sets::Entity::find()
        .order_by_desc(tuning_constant_sets::Column::Version)
        .one(conn)
        .await?
        .ok_or_else(|| inconsistent!("no tuning constant set in the database"))?;

    let rows = tuning_constants::Entity::find()
        .filter(tuning_constants::Column::Version.eq(set.version))
        .all(conn)
        .await?;

    TuningConstants::from_rows(set.version, rows)
}

/// Writes a new version of the tuning constants, overlaying the patch on the latest one.
///
/// The caller needs the `edit:config` permission in at least one format of every key it changes.
/// If a cache is provided, it is refreshed with the new version once it is committed.
#[tracing::instrument(skip(conn, permissions, patch, cache))]
pub async fn update<C, I, S>(
    conn: &C,
    permissions: &Permissions,
    author: Option<i64>,
    patch: I,
    cache: Option<&ConstantsCache>,
) -> MaplistResult<TuningConstants>
where
    C: TransactionTrait,
    I: IntoIterator<Item = (S, f64)>,
    S: AsRef<str>,
{
    let patch = patch
        .into_iter()
        .map(|(key, value)| Ok((key.as_ref().parse::<ConstantKey>()?, value)))
        .collect::<Result<Vec<_>, ValidationError>>()?;

    for (key, _) in &patch {
        if !key
            .formats()
            .iter()
            .any(|f| permissions.has(perms::EDIT_CONFIG, Some(*f)))
        {
            return Err(MaplistError::PermissionDenied {
                permission: perms::EDIT_CONFIG,
                format: key.formats().first().copied(),
            });
        }
    }

    let constants = txn::transaction(conn, async |txn| {
        let mut constants = load_latest(txn).await?;
        for (key, value) in &patch {
            constants.set(*key, *value)?;
        }
        constants.check_set()?;
        constants.version += 1;

        let inserted = tuning_constant_sets::Entity::insert(tuning_constant_sets::ActiveModel {
            version: Set(constants.version),
            created_on: Set(chrono::Utc::now().naive_utc()),
            created_by: Set(author),
        })
        .exec(txn)
        .await;

        match inserted {
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(MaplistError::Conflict(format!(
                    "version {} of the tuning constants",
                    constants.version
                )));
            }
            other => {
                other?;
            }
        }

        tuning_constants::Entity::insert_many(constants.values().map(|(key, value)| {
            tuning_constants::ActiveModel {
                version: Set(constants.version),
                name: Set(key.to_string()),
                value: Set(value),
                ..Default::default()
            }
        }))
        .exec(txn)
        .await?;

        MaplistResult::Ok(constants)
    })
    .await?;

    tracing::info!(version = constants.version, ?author, "wrote new tuning constants");

    if let Some(cache) = cache {
        cache.store(constants.clone()).await;
    }

    Ok(constants)
}

/// A short-lived memo of the latest tuning constants.
///
/// It is only used by the read-only scoring entry points. The write paths always read the
/// constants inside their own transaction.
#[derive(Debug)]
pub struct ConstantsCache {
    ttl: Duration,
    inner: RwLock<Option<(Instant, TuningConstants)>>,
}

impl ConstantsCache {
    /// Returns an empty cache with the provided time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Returns an empty cache with the time-to-live of the library environment.
    pub fn from_env() -> Self {
        Self::new(crate::constants_cache_ttl())
    }

    /// Returns the memoized constants, or loads them from the provided connection if they
    /// expired.
    pub async fn get<C: ConnectionTrait>(&self, conn: &C) -> MaplistResult<TuningConstants> {
        if let Some((at, constants)) = &*self.inner.read().await {
            if at.elapsed() < self.ttl {
                return Ok(constants.clone());
            }
        }

        let constants = load_latest(conn).await?;
        self.store(constants.clone()).await;
        Ok(constants)
    }

    /// Replaces the memoized constants.
    pub async fn store(&self, constants: TuningConstants) {
        *self.inner.write().await = Some((Instant::now(), constants));
    }

    /// Forgets the memoized constants.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}

impl Default for ConstantsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use entity::types::ExpertTier;

    use super::{ConstantKey, TuningConstants};
    use crate::error::ValidationError;

    #[test]
    fn key_names_round_trip() {
        assert_eq!(ConstantKey::all().count(), 20);
        for key in ConstantKey::all() {
            assert_eq!(key.to_string().parse::<ConstantKey>(), Ok(key));
        }
        assert_eq!(
            "exp_points_true".parse::<ConstantKey>(),
            Ok(ConstantKey::ExpPoints(ExpertTier::True))
        );
        assert_eq!(
            "points_top".parse::<ConstantKey>(),
            Err(ValidationError::UnknownConstant("points_top".to_owned()))
        );
    }

    #[test]
    fn rejects_invalid_values() {
        let mut c = TuningConstants::default();
        assert!(c.set(ConstantKey::MapCount, 2.5).is_err());
        assert!(c.set(ConstantKey::MapCount, 0.).is_err());
        assert!(c.set(ConstantKey::DecimalDigits, 11.).is_err());
        assert!(c.set(ConstantKey::PointsMultiBb, 0.5).is_err());
        assert!(c.set(ConstantKey::ExpPoints(ExpertTier::High), -1.).is_err());
        assert!(c.set(ConstantKey::FormulaSlope, f64::NAN).is_err());
        assert_eq!(c, TuningConstants::default());

        assert!(c.set(ConstantKey::MapCount, 75.).is_ok());
        assert_eq!(c.map_count, 75);
    }

    #[test]
    fn top_map_must_outweigh_bottom_map() {
        let mut c = TuningConstants::default();
        c.set(ConstantKey::PointsBottomMap, 150.).unwrap();
        assert!(c.check_set().is_err());
        c.set(ConstantKey::PointsTopMap, 150.).unwrap();
        assert!(c.check_set().is_ok());
    }
}
