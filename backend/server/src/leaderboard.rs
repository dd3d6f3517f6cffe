//! # Leaderboard
//!
//! Ranking engine over a [`RankedStore`].
//!
//! ## Semantics
//!
//! - Scores rank descending, ties go to the earliest submission
//! - Ranks are 1-based positions over every entry, not score values
//! - A player keeps every submitted score, up to the board cap
//! - The cap is enforced on the write path, before `add_score` returns
//!
//! ## Failures
//!
//! Backend faults stop here. Writes report
//! [`LeaderboardError::BackendUnavailable`], reads degrade to empty results.
use tracing::{debug, warn};

use crate::{
    config::Config,
    entry::{ANONYMOUS, Entry, MAX_PLAYER_LEN, MAX_SCORE, Standing, standings},
    error::{LeaderboardError, StoreError},
    store::RankedStore,
};

pub struct Leaderboard<S> {
    store: S,
    max_size: usize,
    default_limit: usize,
}

impl<S: RankedStore> Leaderboard<S> {
    pub fn new(store: S, max_size: usize, default_limit: usize) -> Self {
        Self {
            store,
            max_size: max_size.max(1),
            default_limit: default_limit.max(1),
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, config.max_size, config.default_limit)
    }

    pub async fn add_score(&self, player: &str, score: i64) -> Result<Entry, LeaderboardError> {
        let score = u64::try_from(score)
            .map_err(|_| LeaderboardError::Validation("Score must not be negative"))?;
        if score > MAX_SCORE {
            return Err(LeaderboardError::Validation("Score is too large"));
        }
        let player = normalize_player(player)?;

        let seq = self.store.next_seq().await.map_err(unavailable)?;
        let entry = Entry::new(player, score, seq);

        let evicted = self
            .store
            .insert_bounded(entry.clone(), self.max_size)
            .await
            .map_err(unavailable)?;

        if evicted > 0 {
            debug!("Score from {} evicted {evicted} entries", entry.player);
        }

        Ok(entry)
    }

    pub async fn top_scores(&self, limit: i64) -> Vec<Standing> {
        let limit = self.clamp_limit(limit);

        match self.store.range_descending(0, limit).await {
            Ok(entries) => standings(entries, 0),
            Err(e) => {
                warn!("Failed to read leaderboard: {e}");
                Vec::new()
            }
        }
    }

    /// Rank of the player's best entry. `None` when they have no entry or the
    /// backend cannot answer.
    pub async fn player_rank(&self, player: &str) -> Option<usize> {
        match self.best_position(player).await {
            Ok(position) => position.map(|position| position + 1),
            Err(e) => {
                warn!("Failed to rank {player}: {e}");
                None
            }
        }
    }

    async fn best_position(&self, player: &str) -> Result<Option<usize>, StoreError> {
        let Some(best) = self.store.best_of(player).await? else {
            return Ok(None);
        };

        self.store.rank(&best).await
    }

    pub async fn total_scores(&self) -> usize {
        self.store.size().await.unwrap_or_else(|e| {
            warn!("Failed to count leaderboard: {e}");
            0
        })
    }

    pub async fn clear(&self) -> bool {
        match self.store.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to clear leaderboard: {e}");
                false
            }
        }
    }

    fn clamp_limit(&self, limit: i64) -> usize {
        match usize::try_from(limit) {
            Ok(0) | Err(_) => self.default_limit,
            Ok(limit) => limit.min(self.max_size),
        }
    }
}

fn unavailable(e: StoreError) -> LeaderboardError {
    warn!("Leaderboard backend unavailable: {e}");
    LeaderboardError::BackendUnavailable
}

fn normalize_player(player: &str) -> Result<String, LeaderboardError> {
    let player = player.trim();

    if player.is_empty() {
        return Ok(ANONYMOUS.to_string());
    }

    if player.len() > MAX_PLAYER_LEN {
        return Err(LeaderboardError::Validation("Player name is too long"));
    }

    Ok(player.to_string())
}
