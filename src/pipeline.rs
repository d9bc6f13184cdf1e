use chrono::NaiveDate;

use crate::{
    canvas::Canvas,
    config::{InputSource, RunConfig},
    contributions::{ContributionSource, ExistingContributions, fetch_for_window},
    dates::{CalendarWindow, format_date},
    error::{HeatmarkError, HeatmarkResult},
    flatten::flatten_column_major,
    schedule::{PlanEntry, Scheduler},
    sink::CommitSink,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    pub date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub window: CalendarWindow,
    pub plan: Vec<PlanEntry>,
    /// Commits handed to the sink; zero for a dry run.
    pub commits_created: u64,
    pub dry_run: bool,
}

impl RunReport {
    pub fn planned_commits(&self) -> u64 {
        self.plan.iter().map(|e| u64::from(e.count)).sum()
    }
}

pub fn rasterize(input: &InputSource, spacing: usize) -> HeatmarkResult<Canvas> {
    match input {
        InputSource::Text(text) => Canvas::from_text(text, spacing),
        InputSource::Image(path) => Canvas::from_image(path),
    }
}

/// Schedules `canvas` over the configured window and feeds the plan to `sink`,
/// one day at a time in date order. `progress` is called once per calendar day
/// walked, including days past the end of the window.
///
/// Before anything is written the sink is asked for commits newer than the
/// window start; finding one aborts with [`HeatmarkError::HistoryConflict`].
/// A dry run skips that check and never calls the sink.
#[tracing::instrument(skip_all, fields(width = canvas.width(), dry_run = config.dry_run))]
pub fn run(
    config: &RunConfig,
    canvas: &Canvas,
    today: NaiveDate,
    source: &dyn ContributionSource,
    sink: &mut dyn CommitSink,
    progress: &mut dyn FnMut(Progress),
) -> HeatmarkResult<RunReport> {
    config.validate()?;
    let window = CalendarWindow::resolve(config.year, today)?;
    let seq = flatten_column_major(canvas);
    tracing::info!(
        start = %format_date(&window.start),
        end = %format_date(&window.end),
        days = seq.len(),
        "scheduling"
    );

    if !config.dry_run && sink.has_commits_after(window.start)? {
        return Err(HeatmarkError::HistoryConflict {
            since: format_date(&window.start),
        });
    }

    let existing = match &config.user {
        Some(user) => {
            tracing::warn!(
                user = %user,
                "subtracting existing contributions (beta): commits in other repositories count too, \
                 and days are keyed in the contribution source's timezone"
            );
            fetch_for_window(source, user, &window)?
        }
        None => ExistingContributions::new(),
    };

    let scheduler = Scheduler::new(&seq, window, config.counts, &existing)?;
    let total = scheduler.len();
    let mut plan = Vec::new();
    let mut commits_created = 0u64;
    for step in scheduler {
        if let Some(entry) = step.entry {
            if !config.dry_run {
                sink.create_commits(entry.date, entry.count)?;
                commits_created += u64::from(entry.count);
            }
            plan.push(entry);
        }
        progress(Progress {
            done: step.index + 1,
            total,
            date: step.date,
        });
    }

    tracing::info!(days = plan.len(), commits = commits_created, "done");
    Ok(RunReport {
        window,
        plan,
        commits_created,
        dry_run: config.dry_run,
    })
}
