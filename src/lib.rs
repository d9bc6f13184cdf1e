#![forbid(unsafe_code)]

pub mod canvas;
pub mod config;
pub mod contributions;
pub mod dates;
pub mod error;
pub mod flatten;
pub mod glyphs;
pub mod pipeline;
pub mod schedule;
pub mod sink;

pub use canvas::{CANVAS_HEIGHT, Canvas, MAX_CALENDAR_WEEKS, Pixel};
pub use config::{InputSource, RunConfig};
pub use contributions::{
    ContributionSource, ExistingContributions, HttpContributionSource, StaticContributionSource,
};
pub use dates::{CalendarWindow, first_sunday_of_year, first_sunday_on_or_before_days_ago, format_date};
pub use error::{HeatmarkError, HeatmarkResult};
pub use flatten::{PixelSequence, flatten_column_major, unflatten_column_major};
pub use pipeline::{Progress, RunReport, rasterize, run};
pub use schedule::{CommitCounts, PlanEntry, Scheduler, build_plan};
pub use sink::{CommitSink, GitCommitSink, RecordingSink};
