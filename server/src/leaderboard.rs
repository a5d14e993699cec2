//! Shared leaderboard: per-user game counts plus a ranked list of won games.
//!
//! Scores are ordered by completion time, slowest first unless configured
//! otherwise. Equal times are broken by experience: the player with fewer
//! recorded wins ranks above a player with more. The tie-break reads each
//! owner's *current* win count, so insertion position depends on the stats
//! at the moment the score is recorded, not on a static sort key.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedLeaderboard = Arc<RwLock<Leaderboard>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStat {
    pub username: String,
    pub games_played: u32,
    pub games_won: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub username: String,
    pub time_taken: u64,
}

/// One displayable leaderboard line: a score joined with its owner's stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub username: String,
    pub time_taken: u64,
    pub games_won: u32,
    pub games_played: u32,
}

/// Which completion times rank nearer the head of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RankOrder {
    #[default]
    SlowestFirst,
    FastestFirst,
}

impl RankOrder {
    fn ranks_above(self, time: u64, other: u64) -> bool {
        match self {
            RankOrder::SlowestFirst => time > other,
            RankOrder::FastestFirst => time < other,
        }
    }
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    users: HashMap<String, UserStat>,
    scores: Vec<ScoreEntry>,
    order: RankOrder,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: RankOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn shared(order: RankOrder) -> SharedLeaderboard {
        Arc::new(RwLock::new(Self::with_order(order)))
    }

    /// Counts a finished game for `username`, creating their stats on first sight.
    pub fn record_game(&mut self, username: &str, won: bool) {
        let stat = self
            .users
            .entry(username.to_string())
            .or_insert_with(|| UserStat {
                username: username.to_string(),
                games_played: 0,
                games_won: 0,
            });

        stat.games_played += 1;
        if won {
            stat.games_won += 1;
        }
    }

    /// Inserts a won game's time at its ranked position.
    ///
    /// Scanning from the head, the entry goes before the first score it
    /// outranks on time, or before the first equal-time score whose owner has
    /// strictly more wins. Otherwise it goes after every tied or better score.
    pub fn record_score(&mut self, username: &str, time_taken: u64) {
        // Unknown owners compare as `None`, below any known win count.
        let wins = self.games_won(username);

        let position = self
            .scores
            .iter()
            .position(|entry| {
                self.order.ranks_above(time_taken, entry.time_taken)
                    || (entry.time_taken == time_taken && self.games_won(&entry.username) > wins)
            })
            .unwrap_or(self.scores.len());

        self.scores.insert(
            position,
            ScoreEntry {
                username: username.to_string(),
                time_taken,
            },
        );
    }

    /// Records a completed game in one step: the game count always, the
    /// score only when the game was won.
    pub fn record_result(&mut self, username: &str, won: bool, time_taken: u64) {
        self.record_game(username, won);
        if won {
            self.record_score(username, time_taken);
        }
    }

    pub fn stats(&self, username: &str) -> Option<&UserStat> {
        self.users.get(username)
    }

    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn score_count(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Ranked scores joined with the current stats of their owners.
    pub fn rows(&self) -> Vec<LeaderboardRow> {
        self.scores
            .iter()
            .map(|entry| {
                let (games_won, games_played) = self
                    .stats(&entry.username)
                    .map_or((0, 0), |stat| (stat.games_won, stat.games_played));

                LeaderboardRow {
                    username: entry.username.clone(),
                    time_taken: entry.time_taken,
                    games_won,
                    games_played,
                }
            })
            .collect()
    }

    fn games_won(&self, username: &str) -> Option<u32> {
        self.users.get(username).map(|stat| stat.games_won)
    }
}
