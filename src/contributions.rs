use std::{collections::BTreeMap, time::Duration};

use chrono::NaiveDate;

use crate::{
    dates::{CalendarWindow, format_date},
    error::{HeatmarkError, HeatmarkResult},
};

pub const DEFAULT_CONTRIBUTIONS_URL: &str = "https://github-contributions-api.jogruber.de/v4";

const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Commits already recorded per day, keyed by [`format_date`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ExistingContributions(BTreeMap<String, u32>);

impl ExistingContributions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> u32 {
        self.0.get(&format_date(&date)).copied().unwrap_or(0)
    }

    pub fn insert(&mut self, date: NaiveDate, count: u32) {
        self.0.insert(format_date(&date), count);
    }

    pub fn insert_key(&mut self, key: impl Into<String>, count: u32) {
        self.0.insert(key.into(), count);
    }

    /// Adds `count` on top of whatever is recorded for `date`, saturating at `u32::MAX`.
    pub fn add(&mut self, date: NaiveDate, count: u32) {
        let slot = self.0.entry(format_date(&date)).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Merges `later` into `self`. On a shared key the value from `later` wins.
    pub fn overlay(&mut self, later: ExistingContributions) {
        self.0.extend(later.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.values().map(|&c| u64::from(c)).sum()
    }
}

impl FromIterator<(String, u32)> for ExistingContributions {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub trait ContributionSource {
    fn fetch(&self, user: &str, year: i32) -> HeatmarkResult<ExistingContributions>;
}

/// Fetches every calendar year the window touches, in ascending order, overlaying
/// each later year onto the earlier ones. Any failure is returned as is.
#[tracing::instrument(skip(source))]
pub fn fetch_for_window(
    source: &dyn ContributionSource,
    user: &str,
    window: &CalendarWindow,
) -> HeatmarkResult<ExistingContributions> {
    let mut merged = ExistingContributions::new();
    for year in window.years() {
        let fetched = source.fetch(user, year)?;
        tracing::debug!(year, days = fetched.len(), total = fetched.total(), "fetched contributions");
        merged.overlay(fetched);
    }
    Ok(merged)
}

/// Reads per-day counts from a JSON contributions endpoint:
/// `GET {base_url}/{user}?y={year}` answering
/// `{"contributions": [{"date": "YYYY-MM-DD", "count": n}, ...]}`.
pub struct HttpContributionSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpContributionSource {
    pub fn new(base_url: impl Into<String>) -> HeatmarkResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("heatmark/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                HeatmarkError::source_unavailable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url_for(&self, user: &str, year: i32) -> String {
        format!("{}/{}?y={}", self.base_url, user, year)
    }
}

impl ContributionSource for HttpContributionSource {
    fn fetch(&self, user: &str, year: i32) -> HeatmarkResult<ExistingContributions> {
        let url = self.url_for(user, year);
        let response = self.client.get(&url).send().map_err(|e| {
            HeatmarkError::source_unavailable(format!("request to {url} failed: {e}"))
        })?;

        let status = response.status();
        let body = response.text().map_err(|e| e.to_string());
        let body = check_response(&url, status, body)?;
        parse_contributions(&body, year)
    }
}

/// Non-2xx statuses and unreadable bodies both mean the source is unavailable.
fn check_response(
    url: &str,
    status: reqwest::StatusCode,
    body: Result<String, String>,
) -> HeatmarkResult<String> {
    if !status.is_success() {
        let body = body.unwrap_or_else(|_| "<empty response>".to_string());
        return Err(HeatmarkError::source_unavailable(format!(
            "{url} answered {status}: {}",
            body.trim()
        )));
    }
    body.map_err(|e| {
        HeatmarkError::source_unavailable(format!("failed to read response from {url}: {e}"))
    })
}

#[derive(serde::Deserialize)]
struct ContributionsResponse {
    contributions: Vec<ContributionDay>,
}

#[derive(serde::Deserialize)]
struct ContributionDay {
    date: String,
    count: u32,
}

/// Keeps only the days of `year`; some endpoints pad the grid with neighbouring weeks.
pub fn parse_contributions(body: &str, year: i32) -> HeatmarkResult<ExistingContributions> {
    let parsed: ContributionsResponse = serde_json::from_str(body).map_err(|e| {
        HeatmarkError::source_unavailable(format!("failed to parse contributions response: {e}"))
    })?;

    let prefix = format!("{year:04}-");
    let mut out = ExistingContributions::new();
    for day in parsed.contributions {
        let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").map_err(|e| {
            HeatmarkError::source_unavailable(format!("bad contribution date {:?}: {e}", day.date))
        })?;
        let key = format_date(&date);
        if key.starts_with(&prefix) {
            out.insert_key(key, day.count);
        }
    }
    Ok(out)
}

/// Serves fixed per-year answers; years without an entry fail like an unreachable source.
#[derive(Clone, Debug, Default)]
pub struct StaticContributionSource {
    years: BTreeMap<i32, ExistingContributions>,
}

impl StaticContributionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32, contributions: ExistingContributions) -> Self {
        self.years.insert(year, contributions);
        self
    }
}

impl ContributionSource for StaticContributionSource {
    fn fetch(&self, user: &str, year: i32) -> HeatmarkResult<ExistingContributions> {
        self.years.get(&year).cloned().ok_or_else(|| {
            HeatmarkError::source_unavailable(format!("no contributions for {user} in {year}"))
        })
    }
}
