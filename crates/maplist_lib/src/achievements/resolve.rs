//! The resolution of the achievement role holders, and the diff against the committed snapshot.

use std::collections::{BTreeMap, BTreeSet};

use entity::types::{Format, Metric};

use super::{Badge, RoleDefinition, RoleKey};
use crate::scoring::LeaderboardEntry;

/// The players holding each achievement role.
pub type HolderSets = BTreeMap<RoleKey, BTreeSet<i64>>;

/// What happens to a player for an achievement role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleAction {
    /// The player must lose the role.
    Revoke,
    /// The player must receive the role.
    Grant,
}

/// A change of an achievement role holder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoleEvent {
    /// The ID of the player.
    pub player_id: i64,
    /// The role.
    pub key: RoleKey,
    /// What happens to the player.
    pub action: RoleAction,
    /// The external badges of the role. Empty if its definition doesn't exist anymore.
    pub badges: Vec<Badge>,
}

/// Resolves the holders of every achievement role against the leaderboards.
///
/// The first place role of a group goes to every player placed first with a positive score,
/// and these players are left out of the threshold roles of the group. Any other player gets
/// the role of the highest threshold they meet, if any.
pub fn resolve(
    definitions: &[RoleDefinition],
    leaderboards: &BTreeMap<(Format, Metric), Vec<LeaderboardEntry>>,
) -> HolderSets {
    let mut groups = BTreeMap::<_, Vec<_>>::new();
    for def in definitions {
        groups.entry((def.format, def.metric)).or_default().push(def);
    }

    let mut out = HolderSets::new();

    for ((format, metric), defs) in groups {
        let entries = leaderboards
            .get(&(format, metric))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let first_role = defs.iter().find(|d| d.for_first);
        let mut thresholds = defs
            .iter()
            .filter(|d| !d.for_first)
            .map(|d| d.threshold)
            .collect::<Vec<_>>();
        thresholds.sort_unstable_by(|a, b| b.cmp(a));

        for def in &defs {
            out.entry(def.key()).or_default();
        }

        for entry in entries {
            if let Some(first) = first_role.filter(|_| entry.placement == 1 && entry.score > 0.) {
                out.entry(first.key()).or_default().insert(entry.player_id);
                continue;
            }

            if let Some(threshold) = thresholds
                .iter()
                .find(|t| entry.score >= **t as f64)
            {
                out.entry(RoleKey {
                    format,
                    metric,
                    threshold: *threshold,
                })
                .or_default()
                .insert(entry.player_id);
            }
        }
    }

    out
}

/// Diffs the resolved holders against the committed snapshot.
///
/// The events are sorted by player, then by role, then revocations first.
pub fn diff(
    definitions: &[RoleDefinition],
    holders: &HolderSets,
    snapshot: &HolderSets,
) -> Vec<RoleEvent> {
    let badges = &definitions
        .iter()
        .map(|d| (d.key(), d.badges.clone()))
        .collect::<BTreeMap<_, _>>();
    let empty = &BTreeSet::new();

    let keys = holders.keys().chain(snapshot.keys()).collect::<BTreeSet<_>>();

    let mut events = keys
        .into_iter()
        .flat_map(move |key| {
            let new = holders.get(key).unwrap_or(empty);
            let old = snapshot.get(key).unwrap_or(empty);
            let grants = new.difference(old).map(|p| (*p, RoleAction::Grant));
            let revokes = old.difference(new).map(|p| (*p, RoleAction::Revoke));
            grants.chain(revokes).map(move |(player_id, action)| RoleEvent {
                player_id,
                key: *key,
                action,
                badges: badges.get(key).cloned().unwrap_or_default(),
            })
        })
        .collect::<Vec<_>>();

    events.sort_by_key(|e| (e.player_id, e.key, e.action));
    events
}
