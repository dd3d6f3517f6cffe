//! # Entries
//!
//! One entry per score submission. A player may own any number of entries at
//! once, the board never deduplicates.
//!
//! ## Ordering
//!
//! - Primary: score, descending
//! - Tie-break: sequence, ascending, so the earliest submission ranks higher
//!
//! ## Redis member layout
//!
//! `{inverted seq}:{submitted millis}:{score}:{player}`
//!
//! - Inverted seq is `u64::MAX - seq`, zero padded to 20 digits
//! - Redis breaks score ties by member bytes and `ZREVRANGE` walks them
//!   backwards, so the inverted prefix puts older entries first
//! - Player goes last so names containing `:` survive the split
use std::cmp::Reverse;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::StoreError;

pub const ANONYMOUS: &str = "Anonymous";
pub const MAX_PLAYER_LEN: usize = 255;

/// Redis keeps sorted set scores as f64, integers past 2^53 lose precision.
pub const MAX_SCORE: u64 = 1 << 53;

const SEQ_WIDTH: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub player: String,
    pub score: u64,
    pub submitted_at: DateTime<Utc>,
    pub seq: u64,
}

/// Position of an entry in the ranked structure. Ascending `Key` order is
/// descending leaderboard order.
pub type Key = (Reverse<u64>, u64);

impl Entry {
    pub fn new(player: String, score: u64, seq: u64) -> Self {
        Self {
            player,
            score,
            submitted_at: Utc::now(),
            seq,
        }
    }

    pub fn key(&self) -> Key {
        (Reverse(self.score), self.seq)
    }

    pub fn to_member(&self) -> String {
        format!(
            "{:0width$}:{}:{}:{}",
            u64::MAX - self.seq,
            self.submitted_at.timestamp_millis(),
            self.score,
            self.player,
            width = SEQ_WIDTH,
        )
    }

    pub fn from_member(member: &str) -> Result<Self, StoreError> {
        let corrupt = || StoreError::CorruptMember(member.to_string());

        let mut parts = member.splitn(4, ':');
        let (Some(seq), Some(millis), Some(score), Some(player)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(corrupt());
        };

        let inverted: u64 = seq.parse().map_err(|_| corrupt())?;
        let millis: i64 = millis.parse().map_err(|_| corrupt())?;
        let score: u64 = score.parse().map_err(|_| corrupt())?;
        let submitted_at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(corrupt)?;

        Ok(Self {
            player: player.to_string(),
            score,
            submitted_at,
            seq: u64::MAX - inverted,
        })
    }
}

/// A row of the public leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub player: String,
    pub score: u64,
}

pub fn standings(entries: Vec<Entry>, offset: usize) -> Vec<Standing> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| Standing {
            rank: offset + index + 1,
            player: entry.player,
            score: entry.score,
        })
        .collect()
}
