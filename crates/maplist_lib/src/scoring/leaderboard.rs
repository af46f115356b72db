//! The leaderboard types, and the competition ranking of their entries.

use entity::types::{Format, Metric};

/// An entry of a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct LeaderboardEntry {
    /// The ID of the player.
    pub player_id: i64,
    /// The score of the player for the metric of the leaderboard.
    pub score: f64,
    /// The placement of the player. Tied players share it.
    pub placement: u32,
}

/// Ranks the `(player_id, score)` pairs into leaderboard entries.
///
/// Null and negative scores are left out. The entries are sorted by score, then by player ID.
pub fn rank_entries<I>(scores: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = (i64, f64)>,
{
    let mut scores = scores
        .into_iter()
        .filter(|(_, score)| *score > 0.)
        .collect::<Vec<_>>();
    scores.sort_by(|(a_id, a), (b_id, b)| b.total_cmp(a).then(a_id.cmp(b_id)));

    let mut entries = Vec::<LeaderboardEntry>::with_capacity(scores.len());
    for (i, (player_id, score)) in scores.into_iter().enumerate() {
        // 1, 1, 3: a tie keeps the placement of the first tied player
        let placement = match entries.last() {
            Some(previous) if previous.score.to_bits() == score.to_bits() => previous.placement,
            _ => i as u32 + 1,
        };
        entries.push(LeaderboardEntry {
            player_id,
            score,
            placement,
        });
    }

    entries
}

/// A page of a leaderboard.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LeaderboardPage {
    /// The format of the leaderboard.
    pub format: Format,
    /// The metric of the leaderboard.
    pub metric: Metric,
    /// The page number, starting at 1.
    pub page: u64,
    /// The amount of pages.
    pub pages: u64,
    /// The amount of entries in the whole leaderboard.
    pub total: u64,
    /// The entries of the page.
    pub entries: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::{LeaderboardEntry, rank_entries};

    #[test]
    fn ties_share_the_placement() {
        let entries = rank_entries([(4, 10.), (1, 30.), (3, 30.), (2, 0.), (5, 12.5)]);
        assert_eq!(
            entries,
            vec![
                LeaderboardEntry { player_id: 1, score: 30., placement: 1 },
                LeaderboardEntry { player_id: 3, score: 30., placement: 1 },
                LeaderboardEntry { player_id: 5, score: 12.5, placement: 3 },
                LeaderboardEntry { player_id: 4, score: 10., placement: 4 },
            ]
        );
    }

    #[test]
    fn empty() {
        assert!(rank_entries([]).is_empty());
        assert!(rank_entries([(1, 0.)]).is_empty());
    }
}
