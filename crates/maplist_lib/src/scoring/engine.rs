//! The pure scoring engine.
//!
//! The engine indexes a consistent snapshot of the maps, the completions and the tuning
//! constants, and derives everything else from it. Nothing is patched incrementally: a change
//! of any input means building a new engine.

use std::collections::{BTreeMap, BTreeSet};

use entity::types::{Format, Metric};

use crate::{
    constants::TuningConstants,
    error::ValidationError,
    ledger::Placement,
};

use super::{
    formula::{self, GroupFlags},
    leaderboard::{LeaderboardEntry, LeaderboardPage, rank_entries},
};

/// A map, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringMap {
    /// The code of the map.
    pub code: String,
    /// The placement of the map.
    pub placement: Placement,
    /// Whether the map is fully deleted.
    pub deleted: bool,
}

/// A completion, as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringCompletion {
    /// The ID of the completion.
    pub id: i32,
    /// The code of the completed map.
    pub map_code: String,
    /// The format the completion is scored against.
    pub format: Format,
    /// Whether the completion is black-border.
    pub black_border: bool,
    /// Whether the completion was done without the optimal hero.
    pub no_optimal_hero: bool,
    /// The leftover of the least-cost record of the completion.
    pub leftover: Option<i64>,
    /// Whether the completion was accepted.
    pub accepted: bool,
    /// Whether the completion was deleted.
    pub deleted: bool,
    /// The credited players.
    pub players: Vec<i64>,
}

impl ScoringCompletion {
    fn qualifies(&self) -> bool {
        self.accepted && !self.deleted
    }
}

/// The input of the [`ScoringEngine`].
#[derive(Debug, Clone)]
pub struct ScoringInput {
    /// The maps.
    pub maps: Vec<ScoringMap>,
    /// The completions.
    pub completions: Vec<ScoringCompletion>,
    /// The tuning constants.
    pub constants: TuningConstants,
}

/// The amount of distinct maps a player holds a medal on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Medals {
    /// Maps beaten.
    pub wins: u32,
    /// Maps beaten black-border.
    pub black_border: u32,
    /// Maps beaten without the optimal hero.
    pub no_optimal_hero: u32,
    /// Maps on which the player holds the current least-cost completion.
    pub lccs: u32,
}

impl Medals {
    fn from_flags<I: IntoIterator<Item = GroupFlags>>(flags: I) -> Self {
        flags.into_iter().fold(Self::default(), |mut medals, f| {
            medals.wins += 1;
            medals.black_border += f.black_border as u32;
            medals.no_optimal_hero += f.no_optimal_hero as u32;
            medals.lccs += f.current_lcc as u32;
            medals
        })
    }
}

/// The totals of a player in a format.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FormatTotals {
    /// The format.
    pub format: Format,
    /// The point total, rounded to the configured precision.
    pub points: f64,
    /// The medals.
    pub medals: Medals,
}

/// The totals of a player over a set of formats.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UserTotals {
    /// The ID of the player.
    pub player_id: i64,
    /// The totals in each format of the set, in ascending format order.
    pub per_format: Vec<FormatTotals>,
    /// The medals over the union of the formats. A map counts once, whatever the amount of
    /// formats it is beaten in.
    pub medals: Medals,
}

/// Computes the points, medals and leaderboards of the players.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    constants: TuningConstants,
    maps: BTreeMap<String, Placement>,
    counts: BTreeMap<Format, i32>,
    lccs: BTreeMap<(String, Format), (i32, i64)>,
    groups: BTreeMap<(Format, i64), BTreeMap<String, GroupFlags>>,
}

/// Returns the ID of the current least-cost completion among the `(id, leftover)` pairs.
///
/// The highest leftover wins, then the lowest ID.
pub fn pick_current_lcc<I>(candidates: I) -> Option<(i32, i64)>
where
    I: IntoIterator<Item = (i32, i64)>,
{
    candidates
        .into_iter()
        .max_by(|(a_id, a), (b_id, b)| a.cmp(b).then(b_id.cmp(a_id)))
}

impl ScoringEngine {
    /// Indexes the provided input.
    pub fn new(input: ScoringInput) -> Self {
        let maps = input
            .maps
            .into_iter()
            .filter(|m| !m.deleted)
            .map(|m| (m.code, m.placement))
            .collect::<BTreeMap<_, _>>();

        let counts = Format::LISTS
            .into_iter()
            .map(|f| {
                let count = maps.values().filter(|p| p.rank(f).is_some()).count() as i32;
                (f, count)
            })
            .collect();

        let qualifying = input
            .completions
            .into_iter()
            .filter(|c| c.qualifies() && maps.contains_key(&c.map_code))
            .collect::<Vec<_>>();

        let mut candidates = BTreeMap::<_, Vec<_>>::new();
        for c in &qualifying {
            if let Some(leftover) = c.leftover {
                candidates
                    .entry((c.map_code.clone(), c.format))
                    .or_default()
                    .push((c.id, leftover));
            }
        }
        let lccs = candidates
            .into_iter()
            .filter_map(|(key, candidates)| pick_current_lcc(candidates).map(|lcc| (key, lcc)))
            .collect::<BTreeMap<_, _>>();

        let mut groups = BTreeMap::<_, BTreeMap<_, GroupFlags>>::new();
        for c in &qualifying {
            let is_lcc = lccs
                .get(&(c.map_code.clone(), c.format))
                .is_some_and(|(id, _)| *id == c.id);

            for player in c.players.iter().collect::<BTreeSet<_>>() {
                groups
                    .entry((c.format, *player))
                    .or_default()
                    .entry(c.map_code.clone())
                    .or_default()
                    .observe(c.black_border, c.no_optimal_hero, is_lcc);
            }
        }

        tracing::debug!(
            maps = maps.len(),
            completions = qualifying.len(),
            version = input.constants.version,
            "indexed scoring input"
        );

        Self {
            constants: input.constants,
            maps,
            counts,
            lccs,
            groups,
        }
    }

    /// Returns the tuning constants the engine was built with.
    pub fn constants(&self) -> &TuningConstants {
        &self.constants
    }

    /// Returns the ID of the current least-cost completion of the map in the format.
    pub fn current_lcc(&self, map_code: &str, format: Format) -> Option<i32> {
        self.lccs
            .get(&(map_code.to_owned(), format))
            .map(|(id, _)| *id)
    }

    /// Returns the amount of maps ranked on the provided list axis.
    pub fn ranked_count(&self, format: Format) -> i32 {
        self.counts.get(&format).copied().unwrap_or(0)
    }

    /// Returns the base points of the map in the format, without any bonus.
    ///
    /// Returns `None` if the map doesn't exist, is deleted, or holds no value on the axis.
    pub fn map_points(&self, map_code: &str, format: Format) -> Option<f64> {
        let placement = self.maps.get(map_code)?;
        let points = match format {
            Format::Expert => formula::expert_points(placement.difficulty?, &self.constants),
            _ => formula::list_points(
                placement.rank(format)?,
                self.ranked_count(format),
                &self.constants,
            ),
        };
        Some(formula::round_to(points, self.constants.decimal_digits))
    }

    /// Returns whether the map holds a value on the axis of the format.
    fn is_placed(&self, map_code: &str, format: Format) -> bool {
        self.maps
            .get(map_code)
            .is_some_and(|p| p.is_placed(format))
    }

    /// Returns the points of a group on a map. The base points are rounded before the bonuses
    /// apply.
    fn group_points(&self, map_code: &str, format: Format, flags: GroupFlags) -> f64 {
        let Some(placement) = self.maps.get(map_code) else {
            return 0.;
        };

        match format {
            Format::Expert => placement
                .difficulty
                .map(|tier| formula::expert_group_points(tier, flags, &self.constants)),
            _ => placement.rank(format).map(|rank| {
                let raw = formula::round_to(
                    formula::list_points(rank, self.ranked_count(format), &self.constants),
                    self.constants.decimal_digits,
                );
                formula::list_group_points(raw, flags, &self.constants)
            }),
        }
        .unwrap_or(0.)
    }

    /// Returns the groups of the player in the format, restricted to the placed maps,
    /// in map code order.
    fn placed_groups(
        &self,
        player_id: i64,
        format: Format,
    ) -> impl Iterator<Item = (&str, GroupFlags)> + '_ {
        self.groups
            .get(&(format, player_id))
            .into_iter()
            .flatten()
            .filter(move |(code, _)| self.is_placed(code, format))
            .map(|(code, flags)| (code.as_str(), *flags))
    }

    /// Returns the totals of the player in the format.
    pub fn format_totals(&self, player_id: i64, format: Format) -> FormatTotals {
        let points = self
            .placed_groups(player_id, format)
            .map(|(code, flags)| self.group_points(code, format, flags))
            .sum::<f64>();

        FormatTotals {
            format,
            points: formula::round_to(points, self.constants.decimal_digits),
            medals: Medals::from_flags(self.placed_groups(player_id, format).map(|(_, f)| f)),
        }
    }

    /// Returns the totals of the player over the provided formats.
    pub fn user_totals(&self, player_id: i64, formats: &[Format]) -> UserTotals {
        let formats = formats.iter().copied().collect::<BTreeSet<_>>();

        let mut union = BTreeMap::<&str, GroupFlags>::new();
        for format in &formats {
            for (code, flags) in self.placed_groups(player_id, *format) {
                let merged = union.entry(code).or_default();
                merged.black_border |= flags.black_border;
                merged.no_optimal_hero |= flags.no_optimal_hero;
                merged.current_lcc |= flags.current_lcc;
            }
        }

        UserTotals {
            player_id,
            per_format: formats
                .iter()
                .map(|f| self.format_totals(player_id, *f))
                .collect(),
            medals: Medals::from_flags(union.into_values()),
        }
    }

    /// Returns the score of the player for the metric, in the format.
    pub fn score(&self, player_id: i64, format: Format, metric: Metric) -> f64 {
        let totals = self.format_totals(player_id, format);
        match metric {
            Metric::Points => totals.points,
            Metric::Lccs => totals.medals.lccs as f64,
            Metric::NoOptimalHero => totals.medals.no_optimal_hero as f64,
            Metric::BlackBorder => totals.medals.black_border as f64,
        }
    }

    /// Returns the full leaderboard of the format for the metric.
    pub fn leaderboard(&self, format: Format, metric: Metric) -> Vec<LeaderboardEntry> {
        let players = self
            .groups
            .keys()
            .filter(|(f, _)| *f == format)
            .map(|(_, player_id)| *player_id);

        rank_entries(players.map(|p| (p, self.score(p, format, metric))))
    }

    /// Returns a page of the leaderboard of the format for the metric. Pages start at 1.
    ///
    /// A page past the end of the leaderboard is empty.
    pub fn leaderboard_page(
        &self,
        format: Format,
        metric: Metric,
        page: u64,
        page_size: u64,
    ) -> Result<LeaderboardPage, ValidationError> {
        if page == 0 {
            return Err(ValidationError::PageOutOfRange(page));
        }
        let page_size = page_size.max(1);

        let entries = self.leaderboard(format, metric);
        let total = entries.len() as u64;

        Ok(LeaderboardPage {
            format,
            metric,
            page,
            pages: total.div_ceil(page_size),
            total,
            entries: entries
                .into_iter()
                .skip(((page - 1) * page_size) as usize)
                .take(page_size as usize)
                .collect(),
        })
    }

    /// Returns the leaderboard of every format, for every metric.
    pub fn leaderboards(&self) -> BTreeMap<(Format, Metric), Vec<LeaderboardEntry>> {
        Format::ALL
            .into_iter()
            .flat_map(|f| Metric::ALL.map(|m| (f, m)))
            .map(|(f, m)| ((f, m), self.leaderboard(f, m)))
            .collect()
    }
}
