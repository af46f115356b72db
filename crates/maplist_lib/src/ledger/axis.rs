//! The in-memory model of a ranked axis.

use std::collections::BTreeMap;

use entity::types::Format;

use crate::{
    error::{MaplistResult, ValidationError},
    inconsistent,
};

/// The rank of a map that moved during a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    /// The ID of the map.
    pub map_id: i32,
    /// The rank of the map before the cascade. `None` means it wasn't on the axis.
    pub before: Option<i32>,
    /// The rank of the map after the cascade. `None` means it left the axis.
    pub after: Option<i32>,
}

impl RankChange {
    /// Returns whether the map was pushed off, or removed from the axis.
    pub fn left_axis(&self) -> bool {
        self.before.is_some() && self.after.is_none()
    }
}

/// A gapless ordering of the maps ranked on a list axis.
///
/// The map at index `i` of the ordering holds the rank `i + 1`. The ledger remembers the ranks
/// it was built from, so [`changes`](Self::changes) reports what the cascades moved.
#[derive(Debug, Clone)]
pub struct AxisLedger {
    format: Format,
    capacity: Option<i32>,
    order: Vec<i32>,
    initial: BTreeMap<i32, i32>,
}

impl AxisLedger {
    /// Builds the ledger of an axis from the `(map_id, rank)` pairs of its maps.
    ///
    /// Returns an inconsistent state error if the ranks aren't exactly `1..=N`.
    pub fn from_ranks<I>(format: Format, capacity: Option<i32>, ranks: I) -> MaplistResult<Self>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut rows = ranks.into_iter().collect::<Vec<_>>();
        rows.sort_unstable_by_key(|(map_id, rank)| (*rank, *map_id));

        for (expected, (map_id, rank)) in (1..).zip(&rows) {
            if *rank != expected {
                return Err(inconsistent!(
                    "rank sequence of the {format} axis is broken: map {map_id} holds rank {rank}, expected {expected}"
                ));
            }
        }

        Ok(Self {
            format,
            capacity,
            order: rows.iter().map(|(map_id, _)| *map_id).collect(),
            initial: rows.into_iter().collect(),
        })
    }

    /// Returns the format of the axis.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the amount of maps ranked on the axis.
    pub fn count(&self) -> i32 {
        self.order.len() as i32
    }

    /// Returns the current rank of the map, if it is on the axis.
    pub fn rank_of(&self, map_id: i32) -> Option<i32> {
        self.order
            .iter()
            .position(|id| *id == map_id)
            .map(|i| i as i32 + 1)
    }

    /// Returns the `(map_id, rank)` pairs of the axis, from the best rank.
    pub fn ranks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.order.iter().copied().zip(1..)
    }

    /// Resolves a rank requested by a caller for the provided map.
    ///
    /// A rank above the capacity of the axis is an explicit request to leave the map off
    /// the axis, and resolves to `None`. Any other rank must be between 1 and the amount of
    /// other maps on the axis plus one.
    pub fn resolve_rank(&self, map_id: i32, requested: i32) -> Result<Option<i32>, ValidationError> {
        let others = self.count() - self.rank_of(map_id).map(|_| 1).unwrap_or(0);
        let max = others + 1;

        match self.capacity {
            _ if requested < 1 => Err(ValidationError::RankOutOfRange {
                format: self.format,
                requested,
                max,
            }),
            Some(capacity) if requested > capacity => Ok(None),
            _ if requested <= max => Ok(Some(requested)),
            _ => Err(ValidationError::RankOutOfRange {
                format: self.format,
                requested,
                max,
            }),
        }
    }

    /// Inserts the map at the provided rank, and returns its effective rank.
    ///
    /// The rank is clamped to `[1, count + 1]`. Every map at or after this rank is shifted by one.
    /// If the axis has a capacity, the maps shifted past it are pushed off the axis.
    ///
    /// If the map is already on the axis, it is moved.
    pub fn insert(&mut self, map_id: i32, rank: i32) -> Option<i32> {
        self.remove(map_id);

        let rank = rank.clamp(1, self.count() + 1);
        self.order.insert(rank as usize - 1, map_id);

        if let Some(capacity) = self.capacity {
            let capacity = capacity.max(0) as usize;
            if self.order.len() > capacity {
                let pushed = self.order.split_off(capacity);
                tracing::debug!(format = %self.format, ?pushed, "maps pushed off the axis");
            }
        }

        self.rank_of(map_id)
    }

    /// Removes the map from the axis, and shifts every map after it by one.
    ///
    /// Returns whether the map was on the axis.
    pub fn remove(&mut self, map_id: i32) -> bool {
        match self.order.iter().position(|id| *id == map_id) {
            Some(i) => {
                self.order.remove(i);
                true
            }
            None => false,
        }
    }

    /// Returns every map whose rank differs from the one the ledger was built with, by map ID.
    pub fn changes(&self) -> Vec<RankChange> {
        let current = self.ranks().collect::<BTreeMap<_, _>>();

        let mut out = self
            .initial
            .iter()
            .filter_map(|(map_id, before)| {
                let after = current.get(map_id).copied();
                (after != Some(*before)).then_some(RankChange {
                    map_id: *map_id,
                    before: Some(*before),
                    after,
                })
            })
            .chain(
                current
                    .iter()
                    .filter(|(map_id, _)| !self.initial.contains_key(map_id))
                    .map(|(map_id, after)| RankChange {
                        map_id: *map_id,
                        before: None,
                        after: Some(*after),
                    }),
            )
            .collect::<Vec<_>>();

        out.sort_unstable_by_key(|c| c.map_id);
        out
    }
}

#[cfg(test)]
mod tests {
    use entity::types::Format;

    use super::{AxisLedger, RankChange};
    use crate::error::{ErrorKind, ValidationError};

    fn ledger(count: i32, capacity: Option<i32>) -> AxisLedger {
        // Map `100 + r` holds the rank `r`
        AxisLedger::from_ranks(Format::Current, capacity, (1..=count).map(|r| (100 + r, r)))
            .unwrap()
    }

    fn assert_gapless(l: &AxisLedger) {
        let mut ranks = l.ranks().map(|(_, r)| r).collect::<Vec<_>>();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=l.count()).collect::<Vec<_>>());
    }

    #[test]
    fn rejects_broken_sequences() {
        let gap = AxisLedger::from_ranks(Format::Current, None, [(1, 1), (2, 3)]);
        assert_eq!(gap.unwrap_err().kind(), ErrorKind::InconsistentState);

        let dup = AxisLedger::from_ranks(Format::AllVersions, None, [(1, 1), (2, 1)]);
        assert_eq!(dup.unwrap_err().kind(), ErrorKind::InconsistentState);

        let zero = AxisLedger::from_ranks(Format::AllVersions, None, [(1, 0)]);
        assert_eq!(zero.unwrap_err().kind(), ErrorKind::InconsistentState);

        assert!(AxisLedger::from_ranks(Format::Current, None, [(7, 2), (3, 1)]).is_ok());
    }

    #[test]
    fn insert_shifts_following_ranks() {
        let mut l = ledger(4, None);
        assert_eq!(l.insert(1, 2), Some(2));
        assert_gapless(&l);

        assert_eq!(
            l.ranks().collect::<Vec<_>>(),
            vec![(101, 1), (1, 2), (102, 3), (103, 4), (104, 5)]
        );
        assert_eq!(
            l.changes(),
            vec![
                RankChange { map_id: 1, before: None, after: Some(2) },
                RankChange { map_id: 102, before: Some(2), after: Some(3) },
                RankChange { map_id: 103, before: Some(3), after: Some(4) },
                RankChange { map_id: 104, before: Some(4), after: Some(5) },
            ]
        );
    }

    #[test]
    fn insert_clamps_the_rank() {
        let mut l = ledger(3, None);
        assert_eq!(l.insert(1, 40), Some(4));
        assert_eq!(l.insert(2, -3), Some(1));
        assert_gapless(&l);
    }

    #[test]
    fn insert_pushes_off_past_capacity() {
        let mut l = ledger(3, Some(3));
        assert_eq!(l.insert(1, 1), Some(1));
        assert_gapless(&l);
        assert_eq!(l.count(), 3);
        assert_eq!(l.rank_of(103), None);

        let pushed = l.changes().into_iter().filter(RankChange::left_axis).collect::<Vec<_>>();
        assert_eq!(
            pushed,
            vec![RankChange { map_id: 103, before: Some(3), after: None }]
        );
    }

    #[test]
    fn remove_shifts_back() {
        let mut l = ledger(5, None);
        assert!(l.remove(102));
        assert!(!l.remove(102));
        assert_gapless(&l);
        assert_eq!(l.rank_of(105), Some(4));
        assert_eq!(l.rank_of(101), Some(1));
    }

    #[test]
    fn insert_then_remove_restores_the_ranking() {
        for k in 1..=6 {
            let mut l = ledger(5, Some(10));
            l.insert(1, k);
            assert_gapless(&l);
            l.remove(1);
            assert!(l.changes().is_empty(), "rank {k} didn't restore the axis");
        }
    }

    #[test]
    fn moving_a_map() {
        let mut l = ledger(4, None);
        assert_eq!(l.insert(104, 1), Some(1));
        assert_gapless(&l);
        assert_eq!(
            l.ranks().map(|(id, _)| id).collect::<Vec<_>>(),
            vec![104, 101, 102, 103]
        );
    }

    #[test]
    fn resolve_requested_ranks() {
        let l = ledger(3, Some(50));
        assert_eq!(l.resolve_rank(1, 4), Ok(Some(4)));
        assert_eq!(l.resolve_rank(1, 1), Ok(Some(1)));
        assert_eq!(l.resolve_rank(1, 51), Ok(None));
        assert_eq!(
            l.resolve_rank(1, 0),
            Err(ValidationError::RankOutOfRange { format: Format::Current, requested: 0, max: 4 })
        );
        assert_eq!(
            l.resolve_rank(1, 5),
            Err(ValidationError::RankOutOfRange { format: Format::Current, requested: 5, max: 4 })
        );
        // A map already on the axis doesn't count itself
        assert_eq!(
            l.resolve_rank(103, 4),
            Err(ValidationError::RankOutOfRange { format: Format::Current, requested: 4, max: 3 })
        );
    }
}
