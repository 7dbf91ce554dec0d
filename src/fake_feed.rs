use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::model::{Event, Fixture, MAX_GAMEWEEK, SeasonData, Team};
use crate::source::SeasonSource;

const CLUB_NAMES: &[&str] = &[
    "Ashford", "Bramley", "Calder", "Dunmore", "Eastwick", "Fernhill", "Glenrock", "Harwood",
    "Ironbridge", "Jarrow", "Kingsmere", "Longford", "Marlow", "Northam", "Oakridge", "Penrose",
    "Queensbury", "Redcliff", "Stanmore", "Thornbury",
];

const POSTPONED_CHANCE: f64 = 0.02;
const MISSING_KICKOFF_CHANCE: f64 = 0.03;

/// Deterministic synthetic season: a double round robin, one round per gameweek.
#[derive(Debug, Clone)]
pub struct FakeSource {
    seed: u64,
    team_count: u32,
}

impl FakeSource {
    pub fn new(seed: u64, team_count: u32) -> Self {
        Self {
            seed,
            team_count: team_count.max(2),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fake_seed, config.fake_teams)
    }
}

impl SeasonSource for FakeSource {
    fn fetch(&self) -> Result<SeasonData> {
        Ok(fake_season(self.seed, self.team_count))
    }
}

/// Team counts below two are raised to two.
pub fn fake_season(seed: u64, team_count: u32) -> SeasonData {
    let team_count = team_count.max(2);
    let mut rng = StdRng::seed_from_u64(seed);
    let teams: Vec<Team> = (1..=team_count).map(fake_team).collect();

    let current_gw = rng.gen_range(1..=10u32);
    let events = (1..=MAX_GAMEWEEK)
        .map(|id| Event {
            id,
            finished: id < current_gw,
        })
        .collect();

    let season_start = Utc
        .with_ymd_and_hms(2025, 8, 15, 19, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);

    let mut fixtures = Vec::new();
    let mut next_id = 1u32;
    for (round, pairs) in round_robin(team_count).into_iter().enumerate() {
        let gameweek = round as u32 + 1;
        for (home, away) in pairs {
            let scheduled = gameweek <= MAX_GAMEWEEK && !rng.gen_bool(POSTPONED_CHANCE);
            let kickoff = if rng.gen_bool(MISSING_KICKOFF_CHANCE) {
                None
            } else {
                Some(fake_kickoff(season_start, round as i64, &mut rng))
            };
            fixtures.push(Fixture {
                id: next_id,
                gameweek: scheduled.then_some(gameweek),
                home_team_id: home,
                away_team_id: away,
                kickoff_time: kickoff,
            });
            next_id += 1;
        }
    }

    SeasonData {
        teams,
        events,
        fixtures,
    }
}

fn fake_team(id: u32) -> Team {
    let name = CLUB_NAMES
        .get(id as usize - 1)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Club {id}"));
    let short_name = if (id as usize) <= CLUB_NAMES.len() {
        name.chars().take(3).collect::<String>().to_uppercase()
    } else {
        format!("C{id:02}")
    };
    Team {
        id,
        name,
        short_name,
        code: 100 + id,
    }
}

fn fake_kickoff(season_start: DateTime<Utc>, round: i64, rng: &mut StdRng) -> String {
    let day_offset = rng.gen_range(0..=3i64);
    let hour_offset = rng.gen_range(0..=5i64) * 2;
    let at = season_start
        + ChronoDuration::days(round * 7 + day_offset)
        + ChronoDuration::hours(hour_offset - 4);
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Circle-method pairings for both halves of the season. Odd counts get a bye.
fn round_robin(team_count: u32) -> Vec<Vec<(u32, u32)>> {
    let mut slots: Vec<Option<u32>> = (1..=team_count).map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }
    let mut first_half = Vec::with_capacity(n - 1);

    for round in 0..n - 1 {
        let mut pairs = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            let (a, b) = (slots[i], slots[n - 1 - i]);
            if let (Some(a), Some(b)) = (a, b) {
                // Alternate venues so nobody is at home every week.
                if (round + i) % 2 == 0 {
                    pairs.push((a, b));
                } else {
                    pairs.push((b, a));
                }
            }
        }
        first_half.push(pairs);
        slots[1..].rotate_right(1);
    }

    let second_half: Vec<Vec<(u32, u32)>> = first_half
        .iter()
        .map(|pairs| pairs.iter().map(|(h, a)| (*a, *h)).collect())
        .collect();
    first_half.extend(second_half);
    first_half
}
