use chrono::{Datelike, NaiveDate, Weekday};

/// An inclusive range of calendar days walked one day at a time.
///
/// Plays the role of the simulation clock: the orchestrator ticks it once
/// per day and generates every site's record for that day.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use renewables_synth::calendar::DateRange;
///
/// let start = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let mut range = DateRange::new(start, end);
/// assert_eq!(range.num_days(), 4);
///
/// let mut days = Vec::new();
/// range.run(|d| days.push(d));
/// assert_eq!(days.len(), 4);
/// assert_eq!(days[3], end);
/// ```
#[derive(Debug, Clone)]
pub struct DateRange {
    /// Next day to hand out, `None` once the range is exhausted.
    current: Option<NaiveDate>,
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range covering `start..=end`. An `end` before `start` yields
    /// an empty range; callers validate ordering beforehand.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            current: (start <= end).then_some(start),
            start,
            end,
        }
    }

    /// Number of days in the range, both ends included.
    pub fn num_days(&self) -> usize {
        days_inclusive(self.start, self.end)
    }

    /// Returns the next day, or `None` when the range is exhausted.
    pub fn tick(&mut self) -> Option<NaiveDate> {
        let day = self.current?;
        self.current = if day < self.end { day.succ_opt() } else { None };
        Some(day)
    }

    /// Calls `f` once for each remaining day.
    pub fn run(&mut self, mut f: impl FnMut(NaiveDate)) {
        while let Some(day) = self.tick() {
            f(day);
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        self.tick()
    }
}

/// Days in `[start, end]`, or 0 when `end < start`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> usize {
    let span = (end - start).num_days();
    if span < 0 { 0 } else { span as usize + 1 }
}

/// 1-based day of the year (1..=366).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Fractional years elapsed from `origin` to `date` (365.25-day years).
pub fn years_between(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64 / 365.25
}
