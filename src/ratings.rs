use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{DEFAULT_RATING, Side, clamp_rating};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRating {
    pub home: u8,
    pub away: u8,
}

impl Default for TeamRating {
    fn default() -> Self {
        Self {
            home: DEFAULT_RATING,
            away: DEFAULT_RATING,
        }
    }
}

impl TeamRating {
    pub fn new(home: i64, away: i64) -> Self {
        Self {
            home: clamp_rating(home),
            away: clamp_rating(away),
        }
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    fn set(&mut self, side: Side, value: u8) {
        match side {
            Side::Home => self.home = value,
            Side::Away => self.away = value,
        }
    }
}

/// Per-team home/away difficulty overrides. Teams without an entry rate as (3, 3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingStore {
    ratings: HashMap<u32, TeamRating>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, team_id: u32, side: Side) -> u8 {
        self.rating(team_id).get(side)
    }

    pub fn rating(&self, team_id: u32) -> TeamRating {
        self.ratings.get(&team_id).copied().unwrap_or_default()
    }

    /// Stores `clamp(value, 1, 7)` and returns what was stored.
    pub fn set(&mut self, team_id: u32, side: Side, value: i64) -> u8 {
        let clamped = clamp_rating(value);
        self.ratings
            .entry(team_id)
            .or_default()
            .set(side, clamped);
        clamped
    }

    pub fn insert(&mut self, team_id: u32, rating: TeamRating) {
        let rating = TeamRating::new(rating.home as i64, rating.away as i64);
        self.ratings.insert(team_id, rating);
    }

    /// Creates the default entry for a team seen for the first time.
    pub fn ensure(&mut self, team_id: u32) -> bool {
        if self.ratings.contains_key(&team_id) {
            return false;
        }
        self.ratings.insert(team_id, TeamRating::default());
        true
    }

    pub fn clear(&mut self) {
        self.ratings.clear();
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn entries(&self) -> &HashMap<u32, TeamRating> {
        &self.ratings
    }
}
