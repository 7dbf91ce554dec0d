use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::Fixture;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFixture {
    pub fixture: Fixture,
    pub kickoff: Option<DateTime<Utc>>,
}

/// Lookup from (team id, gameweek) to the fixtures that team plays in that gameweek.
///
/// Built once per raw fixture list. Each bucket is kept in kickoff order, with fixtures that
/// have no parseable kickoff at the end and fixture id as the final tie-break.
#[derive(Debug, Clone, Default)]
pub struct FixtureIndex {
    buckets: HashMap<(u32, u32), Vec<IndexedFixture>>,
    indexed: usize,
    skipped: usize,
}

impl FixtureIndex {
    pub fn build(fixtures: &[Fixture]) -> Self {
        let mut buckets: HashMap<(u32, u32), Vec<IndexedFixture>> =
            HashMap::with_capacity(fixtures.len() * 2);
        let mut indexed = 0usize;
        let mut skipped = 0usize;

        for fixture in fixtures {
            let Some(gameweek) = fixture.gameweek else {
                skipped += 1;
                continue;
            };
            let entry = IndexedFixture {
                kickoff: fixture.kickoff(),
                fixture: fixture.clone(),
            };
            if fixture.home_team_id != fixture.away_team_id {
                buckets
                    .entry((fixture.away_team_id, gameweek))
                    .or_default()
                    .push(entry.clone());
            }
            buckets
                .entry((fixture.home_team_id, gameweek))
                .or_default()
                .push(entry);
            indexed += 1;
        }

        for bucket in buckets.values_mut() {
            bucket.sort_by(compare_kickoff);
        }

        Self {
            buckets,
            indexed,
            skipped,
        }
    }

    /// Empty slice for unknown keys.
    pub fn cells_for(&self, team_id: u32, gameweek: u32) -> &[IndexedFixture] {
        self.buckets
            .get(&(team_id, gameweek))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn fixtures_for(&self, team_id: u32, gameweek: u32) -> impl Iterator<Item = &Fixture> {
        self.cells_for(team_id, gameweek).iter().map(|f| &f.fixture)
    }

    /// Fixtures that made it into the index (each counted once, not per side).
    pub fn indexed_count(&self) -> usize {
        self.indexed
    }

    /// Fixtures dropped because they have no gameweek.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn compare_kickoff(a: &IndexedFixture, b: &IndexedFixture) -> Ordering {
    let by_time = match (a.kickoff, b.kickoff) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time.then_with(|| a.fixture.id.cmp(&b.fixture.id))
}
