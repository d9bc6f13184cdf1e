use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use clap::{ArgGroup, Parser};
use heatmark::{
    CommitCounts, GitCommitSink, HttpContributionSource, InputSource, MAX_CALENDAR_WEEKS,
    Progress, RecordingSink, RunConfig, RunReport, contributions::DEFAULT_CONTRIBUTIONS_URL,
    dates, format_date, glyphs,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "heatmark",
    version,
    about = "Paint text or a 7-pixel-tall image onto your contribution heatmap"
)]
#[command(group(ArgGroup::new("input").required(true).args(["text", "image_path"])))]
struct Cli {
    /// Text to render.
    #[arg(short, long)]
    text: Option<String>,

    /// Image exactly 7 pixels tall; dark opaque pixels are painted. At most 53 columns fit a year.
    #[arg(short, long = "image-path")]
    image_path: Option<PathBuf>,

    /// Commits on an empty day.
    #[arg(long = "min-commits", alias = "mc", default_value_t = heatmark::schedule::DEFAULT_MIN_COMMITS)]
    min_commits: u32,

    /// Commits on a painted day.
    #[arg(long = "max-commits", alias = "xc", default_value_t = heatmark::schedule::DEFAULT_MAX_COMMITS)]
    max_commits: u32,

    /// Paint this calendar year instead of the last 365 days.
    #[arg(short, long)]
    year: Option<i32>,

    /// Empty columns between letters (0-7).
    #[arg(
        short = 's',
        long = "space-between-letters",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=7)
    )]
    space_between_letters: u8,

    /// Account whose existing contributions are subtracted from the targets (beta).
    #[arg(short, long)]
    user: Option<String>,

    /// Preview the canvas and the plan without creating commits.
    #[arg(long)]
    dry_run: bool,

    /// Print the plan as JSON (with --dry-run).
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Working tree that receives the commits.
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Base URL of the contributions endpoint.
    #[arg(long, env = "HEATMARK_CONTRIBUTIONS_URL", default_value = DEFAULT_CONTRIBUTIONS_URL)]
    contributions_url: String,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> heatmark::HeatmarkResult<RunConfig> {
        let input = InputSource::from_options(self.text, self.image_path)?;
        let mut cfg = RunConfig::new(input);
        cfg.counts = CommitCounts {
            min: self.min_commits,
            max: self.max_commits,
        };
        cfg.spacing = usize::from(self.space_between_letters);
        cfg.year = self.year;
        cfg.user = self.user;
        cfg.dry_run = self.dry_run;
        cfg.repo = self.repo;
        cfg.contributions_url = self.contributions_url;
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    glyphs::validate_glyph_table().context("built-in font table is malformed")?;

    let json = cli.json;
    let config = cli.into_config()?;

    let canvas = heatmark::rasterize(&config.input, config.spacing)?;
    println!("{}", canvas.preview());

    let source = HttpContributionSource::new(config.contributions_url.clone())?;
    let today = dates::today_local();

    let report = if config.dry_run {
        let mut sink = RecordingSink::new();
        heatmark::run(&config, &canvas, today, &source, &mut sink, &mut |_| {})?
    } else {
        let mut sink = GitCommitSink::new(&config.repo)
            .with_context(|| format!("open repository '{}'", config.repo.display()))?;
        let mut bar = ProgressLine::new(MAX_CALENDAR_WEEKS);
        let report = heatmark::run(&config, &canvas, today, &source, &mut sink, &mut |p| {
            bar.draw(p)
        })?;
        bar.finish();
        report
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report.plan)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(report: &RunReport) {
    let window = format!(
        "{} .. {}",
        format_date(&report.window.start),
        format_date(&report.window.end)
    );
    if report.dry_run {
        println!(
            "dry run: {} commits over {} days in {window}, nothing written",
            report.planned_commits(),
            report.plan.len()
        );
        return;
    }

    println!(
        "created {} commits over {} days in {window}",
        report.commits_created,
        report.plan.len()
    );
    println!(
        "
Now push it. For an empty project:
  git branch -M main
  git remote add origin git@github.com:<user_name>/<project_name>.git
  git push -u origin main"
    );
}

/// Single-line progress bar on stderr, redrawn only when the percentage moves.
struct ProgressLine {
    width: usize,
    last_pct: Option<usize>,
}

impl ProgressLine {
    fn new(width: usize) -> Self {
        Self {
            width,
            last_pct: None,
        }
    }

    fn draw(&mut self, p: Progress) {
        if p.total == 0 {
            return;
        }
        let pct = p.done * 100 / p.total;
        if self.last_pct == Some(pct) {
            return;
        }
        self.last_pct = Some(pct);
        let filled = p.done * self.width / p.total;
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\r[{}{}] {pct:>3}% {}",
            "=".repeat(filled),
            " ".repeat(self.width - filled),
            format_date(&p.date)
        );
        let _ = err.flush();
    }

    fn finish(&self) {
        if self.last_pct.is_some() {
            eprintln!();
        }
    }
}
