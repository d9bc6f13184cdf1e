use std::{
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use chrono::{NaiveDate, TimeDelta};

use crate::{
    dates::{at_noon, format_date},
    error::{HeatmarkError, HeatmarkResult},
    schedule::PlanEntry,
};

/// Destination of the plan. Calls arrive one at a time in date order.
pub trait CommitSink {
    /// Whether any commit is dated strictly after noon on `date`.
    fn has_commits_after(&self, date: NaiveDate) -> HeatmarkResult<bool>;

    /// Creates `count` commits dated `date`. Stops at the first failure.
    fn create_commits(&mut self, date: NaiveDate, count: u32) -> HeatmarkResult<()>;
}

pub fn is_git_on_path() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Backdated empty commits in a working tree, made with the system `git` binary.
#[derive(Clone, Debug)]
pub struct GitCommitSink {
    repo: PathBuf,
}

impl GitCommitSink {
    pub fn new(repo: impl Into<PathBuf>) -> HeatmarkResult<Self> {
        let repo = repo.into();
        if !is_git_on_path() {
            return Err(HeatmarkError::sink("git was not found on PATH"));
        }
        let sink = Self { repo };
        let out = sink.git(["rev-parse", "--is-inside-work-tree"])?;
        if !out.status.success() {
            return Err(HeatmarkError::sink(format!(
                "'{}' is not a git working tree: {}",
                sink.repo.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(sink)
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.repo).stdin(Stdio::null());
        cmd
    }

    fn git<const N: usize>(&self, args: [&str; N]) -> HeatmarkResult<Output> {
        self.command()
            .args(args)
            .output()
            .map_err(|e| HeatmarkError::sink(format!("failed to run git: {e}")))
    }

    fn has_head(&self) -> HeatmarkResult<bool> {
        let out = self.git(["rev-parse", "--verify", "--quiet", "HEAD"])?;
        Ok(out.status.success())
    }
}

impl CommitSink for GitCommitSink {
    fn has_commits_after(&self, date: NaiveDate) -> HeatmarkResult<bool> {
        if !self.has_head()? {
            return Ok(false);
        }
        // `--since` keeps commits at the given instant, so start one second later.
        let after = at_noon(date) + TimeDelta::seconds(1);
        let since = format!("--since={}", after.format("%Y-%m-%dT%H:%M:%S"));
        let out = self.git(["log", "-1", "--format=%H", since.as_str()])?;
        if !out.status.success() {
            return Err(HeatmarkError::sink(format!(
                "git log exited with status {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(!out.stdout.iter().all(u8::is_ascii_whitespace))
    }

    fn create_commits(&mut self, date: NaiveDate, count: u32) -> HeatmarkResult<()> {
        let stamp = at_noon(date).format("%Y-%m-%dT%H:%M:%S").to_string();
        let key = format_date(&date);
        for i in 1..=count {
            let out = self
                .command()
                .args(["commit", "--allow-empty", "--quiet", "-m"])
                .arg(format!("heatmark {key} ({i}/{count})"))
                .env("GIT_AUTHOR_DATE", &stamp)
                .env("GIT_COMMITTER_DATE", &stamp)
                .output()
                .map_err(|e| HeatmarkError::sink(format!("failed to run git commit: {e}")))?;
            if !out.status.success() {
                return Err(HeatmarkError::sink(format!(
                    "git commit for {key} ({i}/{count}) exited with status {}: {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                )));
            }
        }
        tracing::debug!(date = %key, count, "created commits");
        Ok(())
    }
}

/// Keeps the requests in memory. Used for dry runs.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub entries: Vec<PlanEntry>,
    /// Latest commit date reported by `has_commits_after`.
    pub newest_commit: Option<NaiveDate>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_commits(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }
}

impl CommitSink for RecordingSink {
    fn has_commits_after(&self, date: NaiveDate) -> HeatmarkResult<bool> {
        Ok(self.newest_commit.is_some_and(|newest| newest > date))
    }

    fn create_commits(&mut self, date: NaiveDate, count: u32) -> HeatmarkResult<()> {
        if count == 0 {
            return Err(HeatmarkError::sink("commit count must be positive"));
        }
        self.entries.push(PlanEntry { date, count });
        Ok(())
    }
}
