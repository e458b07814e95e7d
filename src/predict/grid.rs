use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Spacing of the daily sample grid. Always divides a day evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u32", into = "u32")]
pub struct Cadence(u32);

impl Cadence {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes > 0 && MINUTES_PER_DAY % minutes == 0).then_some(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn samples_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.0) as usize
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for Cadence {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Cadence::from_minutes(minutes)
            .ok_or_else(|| format!("cadence of {minutes} minutes does not divide a day"))
    }
}

impl From<Cadence> for u32 {
    fn from(cadence: Cadence) -> Self {
        cadence.0
    }
}

/// The sample instants of one UTC day, midnight inclusive, next midnight
/// exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeGrid {
    pub date: NaiveDate,
    pub cadence: Cadence,
    pub instants: Vec<DateTime<Utc>>,
}

impl TimeGrid {
    pub fn for_date(date: NaiveDate, cadence: Cadence) -> Self {
        let midnight = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        let step = Duration::minutes(cadence.minutes() as i64);
        let instants = (0..cadence.samples_per_day())
            .map(|i| midnight + step * i as i32)
            .collect();
        Self {
            date,
            cadence,
            instants,
        }
    }

    /// Grid for the UTC date of `now`. The time of day is ignored.
    pub fn for_instant(now: DateTime<Utc>, cadence: Cadence) -> Self {
        Self::for_date(now.date_naive(), cadence)
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.instants.iter()
    }

    pub fn get(&self, index: usize) -> Option<DateTime<Utc>> {
        self.instants.get(index).copied()
    }

    /// Index of the grid instant closest to `instant`; clamps outside the day.
    pub fn nearest_index(&self, instant: DateTime<Utc>) -> usize {
        let Some(first) = self.instants.first() else {
            return 0;
        };
        let step_s = self.cadence.minutes() as i64 * 60;
        let offset_s = (instant - *first).num_seconds();
        let index = (offset_s + step_s / 2).div_euclid(step_s);
        index.clamp(0, self.instants.len() as i64 - 1) as usize
    }

    /// True when this grid is exactly the one generated for `date`/`cadence`.
    pub fn matches(&self, date: NaiveDate, cadence: Cadence) -> bool {
        *self == Self::for_date(date, cadence)
    }
}
