use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::http_client::http_client;
use crate::model::{Event, Fixture, SeasonData, Team};
use crate::source::SeasonSource;

pub const FPL_BOOTSTRAP_URL: &str = "https://fantasy.premierleague.com/api/bootstrap-static/";
pub const FPL_FIXTURES_URL: &str = "https://fantasy.premierleague.com/api/fixtures/";

/// Fantasy Premier League public API.
#[derive(Debug, Clone)]
pub struct FplSource {
    bootstrap_url: String,
    fixtures_url: String,
    timeout: Duration,
}

impl FplSource {
    pub fn new(bootstrap_url: impl Into<String>, fixtures_url: impl Into<String>) -> Self {
        Self {
            bootstrap_url: bootstrap_url.into(),
            fixtures_url: fixtures_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            bootstrap_url: config.bootstrap_url.clone(),
            fixtures_url: config.fixtures_url.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    fn get_text(&self, url: &str) -> Result<String> {
        let client = http_client(self.timeout)?;
        let resp = client.get(url).send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {status} from {url}"));
        }
        Ok(body)
    }
}

impl Default for FplSource {
    fn default() -> Self {
        Self::new(FPL_BOOTSTRAP_URL, FPL_FIXTURES_URL)
    }
}

impl SeasonSource for FplSource {
    fn fetch(&self) -> Result<SeasonData> {
        let bootstrap = self
            .get_text(&self.bootstrap_url)
            .context("bootstrap request failed")?;
        let fixtures = self
            .get_text(&self.fixtures_url)
            .context("fixtures request failed")?;
        let (teams, events) = parse_bootstrap_json(&bootstrap)?;
        let fixtures = parse_fixtures_json(&fixtures)?;
        Ok(SeasonData {
            teams,
            events,
            fixtures,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BootstrapResponse {
    teams: Vec<FplTeam>,
    #[serde(default)]
    events: Vec<FplEvent>,
}

#[derive(Debug, Deserialize)]
struct FplTeam {
    id: u32,
    name: String,
    short_name: String,
    #[serde(default)]
    code: u32,
}

#[derive(Debug, Deserialize)]
struct FplEvent {
    id: u32,
    #[serde(default)]
    finished: bool,
}

#[derive(Debug, Deserialize)]
struct FplFixture {
    id: u32,
    event: Option<u32>,
    team_h: u32,
    team_a: u32,
    #[serde(default)]
    kickoff_time: Option<String>,
}

pub fn parse_bootstrap_json(raw: &str) -> Result<(Vec<Team>, Vec<Event>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty bootstrap response"));
    }
    let data: BootstrapResponse =
        serde_json::from_str(trimmed).context("invalid bootstrap json")?;
    let teams = data
        .teams
        .into_iter()
        .map(|t| Team {
            id: t.id,
            name: t.name,
            short_name: t.short_name,
            code: t.code,
        })
        .collect();
    let events = data
        .events
        .into_iter()
        .map(|e| Event {
            id: e.id,
            finished: e.finished,
        })
        .collect();
    Ok((teams, events))
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty fixtures response"));
    }
    let rows: Vec<FplFixture> = serde_json::from_str(trimmed).context("invalid fixtures json")?;
    if rows.is_empty() {
        return Err(anyhow::anyhow!("fixtures response has no fixtures"));
    }
    Ok(rows
        .into_iter()
        .map(|f| Fixture {
            id: f.id,
            gameweek: f.event,
            home_team_id: f.team_h,
            away_team_id: f.team_a,
            kickoff_time: f.kickoff_time,
        })
        .collect())
}
