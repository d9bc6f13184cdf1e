use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{
    canvas::Pixel,
    contributions::ExistingContributions,
    dates::{CalendarWindow, format_date},
    error::{HeatmarkError, HeatmarkResult},
    flatten::PixelSequence,
};

pub const DEFAULT_MIN_COMMITS: u32 = 1;
pub const DEFAULT_MAX_COMMITS: u32 = 30;

/// Commits wanted on an empty (`min`) and a filled (`max`) day.
///
/// No ordering is imposed between the two: `min > max` simply paints an inverted image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommitCounts {
    pub min: u32,
    pub max: u32,
}

impl Default for CommitCounts {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_COMMITS,
            max: DEFAULT_MAX_COMMITS,
        }
    }
}

impl CommitCounts {
    pub fn target(&self, px: Pixel) -> u32 {
        match px {
            Pixel::Filled => self.max,
            Pixel::Empty => self.min,
        }
    }
}

/// Commits still to be created for one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PlanEntry {
    pub date: NaiveDate,
    pub count: u32,
}

impl PlanEntry {
    pub fn date_key(&self) -> String {
        format_date(&self.date)
    }
}

/// One day of the walk. `entry` is `None` past the end date or when the day is already satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub date: NaiveDate,
    pub entry: Option<PlanEntry>,
}

/// Walks the pixel sequence one calendar day per element, starting at the window start.
///
/// Every element yields a [`Step`], including those past the window end, so the
/// number of steps always equals the sequence length. Entries come out in strictly
/// increasing date order with at most one per day.
pub struct Scheduler<'a> {
    seq: &'a PixelSequence,
    existing: &'a ExistingContributions,
    counts: CommitCounts,
    end: NaiveDate,
    cursor: NaiveDate,
    index: usize,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        seq: &'a PixelSequence,
        window: CalendarWindow,
        counts: CommitCounts,
        existing: &'a ExistingContributions,
    ) -> HeatmarkResult<Self> {
        if window
            .start
            .checked_add_days(Days::new(seq.len() as u64))
            .is_none()
        {
            return Err(HeatmarkError::input(format!(
                "{} days after {} is past the end of the calendar",
                seq.len(),
                window.start
            )));
        }
        if window.start.weekday() != Weekday::Sun {
            tracing::warn!(start = %window.start, "schedule does not start on a Sunday; the image will be skewed");
        }
        Ok(Self {
            seq,
            existing,
            counts,
            end: window.end,
            cursor: window.start,
            index: 0,
        })
    }

    /// Only the entries, in date order.
    pub fn plan(self) -> Vec<PlanEntry> {
        self.filter_map(|step| step.entry).collect()
    }

    fn entry_for(&self, px: Pixel) -> Option<PlanEntry> {
        if self.cursor > self.end {
            return None;
        }
        let target = i64::from(self.counts.target(px));
        let already = i64::from(self.existing.get(self.cursor));
        let deficit = target - already;
        (deficit > 0).then(|| PlanEntry {
            date: self.cursor,
            count: deficit as u32,
        })
    }
}

impl Iterator for Scheduler<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let px = *self.seq.as_slice().get(self.index)?;
        let step = Step {
            index: self.index,
            date: self.cursor,
            entry: self.entry_for(px),
        };
        self.index += 1;
        // Overflow is ruled out in `new`.
        self.cursor = self.cursor + Days::new(1);
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.seq.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Scheduler<'_> {}

/// Convenience wrapper over [`Scheduler::plan`].
pub fn build_plan(
    seq: &PixelSequence,
    window: CalendarWindow,
    counts: CommitCounts,
    existing: &ExistingContributions,
) -> HeatmarkResult<Vec<PlanEntry>> {
    Ok(Scheduler::new(seq, window, counts, existing)?.plan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{canvas::Canvas, flatten::flatten_column_major};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: NaiveDate, end: NaiveDate) -> CalendarWindow {
        CalendarWindow { start, end }
    }

    fn hi_sequence() -> (Canvas, PixelSequence) {
        let c = Canvas::from_text("HI", 1).unwrap();
        let seq = flatten_column_major(&c);
        (c, seq)
    }

    #[test]
    fn hi_maps_pixels_to_min_and_max() {
        let (canvas, seq) = hi_sequence();
        let start = ymd(2024, 1, 7);
        let counts = CommitCounts { min: 1, max: 5 };
        let existing = ExistingContributions::new();

        let plan = build_plan(&seq, window(start, ymd(2024, 12, 31)), counts, &existing).unwrap();
        // Nothing exists yet, so every day gets an entry.
        assert_eq!(plan.len(), seq.len());
        for (i, entry) in plan.iter().enumerate() {
            assert_eq!(entry.date, start + Days::new(i as u64));
            let expected = if canvas.get(i % 7, i / 7).is_filled() { 5 } else { 1 };
            assert_eq!(entry.count, expected, "index {i}");
        }
        // First column of H is solid.
        assert!(plan[..7].iter().all(|e| e.count == 5));
        assert_eq!(plan[0].date.weekday(), Weekday::Sun);
    }

    #[test]
    fn uniform_counts_subtract_existing() {
        let (_, seq) = hi_sequence();
        let start = ymd(2024, 1, 7);
        let mut existing = ExistingContributions::new();
        existing.insert(ymd(2024, 1, 8), 1);
        existing.insert(ymd(2024, 1, 9), 2);
        existing.insert(ymd(2024, 1, 10), 7);

        let plan = build_plan(
            &seq,
            window(start, ymd(2024, 12, 31)),
            CommitCounts { min: 2, max: 2 },
            &existing,
        )
        .unwrap();

        assert_eq!(plan.len(), seq.len() - 2);
        for e in &plan {
            assert_eq!(e.count, 2 - existing.get(e.date));
        }
        assert!(!plan.iter().any(|e| e.date == ymd(2024, 1, 9)));
        assert!(!plan.iter().any(|e| e.date == ymd(2024, 1, 10)));
    }

    #[test]
    fn satisfied_day_emits_nothing() {
        let (_, seq) = hi_sequence();
        let start = ymd(2024, 1, 7);
        let mut existing = ExistingContributions::new();
        existing.insert(start, 10);

        let plan = build_plan(
            &seq,
            window(start, ymd(2024, 12, 31)),
            CommitCounts { min: 1, max: 5 },
            &existing,
        )
        .unwrap();
        assert_ne!(plan[0].date, start);
        assert_eq!(plan[0].date, ymd(2024, 1, 8));
    }

    #[test]
    fn entries_stop_at_end_but_walk_completes() {
        let (_, seq) = hi_sequence();
        let start = ymd(2024, 12, 22);
        let end = ymd(2024, 12, 31);
        let existing = ExistingContributions::new();

        let sched = Scheduler::new(&seq, window(start, end), CommitCounts::default(), &existing)
            .unwrap();
        let steps: Vec<Step> = sched.collect();
        assert_eq!(steps.len(), seq.len());
        assert_eq!(steps.last().unwrap().date, start + Days::new(seq.len() as u64 - 1));

        let entries: Vec<PlanEntry> = steps.iter().filter_map(|s| s.entry).collect();
        assert_eq!(entries.len(), 10);
        assert!(entries.iter().all(|e| e.date >= start && e.date <= end));
        assert!(steps.iter().filter(|s| s.date > end).all(|s| s.entry.is_none()));
    }

    #[test]
    fn dates_strictly_increase() {
        let seq = flatten_column_major(&Canvas::from_text("HELLO", 1).unwrap());
        let plan = build_plan(
            &seq,
            window(ymd(2023, 12, 31), ymd(2024, 12, 31)),
            CommitCounts { min: 0, max: 3 },
            &ExistingContributions::new(),
        )
        .unwrap();
        assert!(!plan.is_empty());
        assert!(plan.windows(2).all(|w| w[0].date < w[1].date));
        // min = 0 means empty cells never get an entry.
        assert!(plan.iter().all(|e| e.count == 3));
    }

    #[test]
    fn second_run_is_idempotent() {
        let seq = flatten_column_major(&Canvas::from_text("OK", 2).unwrap());
        let w = window(ymd(2024, 1, 7), ymd(2024, 12, 31));
        let counts = CommitCounts { min: 1, max: 4 };

        let mut history = ExistingContributions::new();
        history.insert(ymd(2024, 1, 7), 2);
        history.insert(ymd(2024, 2, 1), 9);

        let first = build_plan(&seq, w, counts, &history).unwrap();
        assert!(!first.is_empty());
        for e in &first {
            history.add(e.date, e.count);
        }
        let second = build_plan(&seq, w, counts, &history).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn inverted_counts_are_taken_literally() {
        let seq = PixelSequence::from(vec![Pixel::Filled, Pixel::Empty]);
        let start = ymd(2024, 1, 7);
        let plan = build_plan(
            &seq,
            window(start, ymd(2024, 12, 31)),
            CommitCounts { min: 9, max: 2 },
            &ExistingContributions::new(),
        )
        .unwrap();
        assert_eq!(
            plan,
            vec![
                PlanEntry { date: start, count: 2 },
                PlanEntry { date: ymd(2024, 1, 8), count: 9 },
            ]
        );
    }

    #[test]
    fn empty_sequence_yields_no_steps() {
        let seq = PixelSequence::from(Vec::new());
        let existing = ExistingContributions::new();
        let sched = Scheduler::new(
            &seq,
            window(ymd(2024, 1, 7), ymd(2024, 12, 31)),
            CommitCounts::default(),
            &existing,
        )
        .unwrap();
        assert_eq!(sched.len(), 0);
        assert_eq!(sched.count(), 0);
    }

    #[test]
    fn calendar_overflow_is_rejected() {
        let seq = PixelSequence::from(vec![Pixel::Empty; 14]);
        let existing = ExistingContributions::new();
        assert!(
            Scheduler::new(
                &seq,
                window(NaiveDate::MAX, NaiveDate::MAX),
                CommitCounts::default(),
                &existing,
            )
            .is_err()
        );
    }
}
