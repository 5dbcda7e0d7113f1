//! Trading calendar and rebalancing schedule.
//!
//! The calendar lists every weekday in a date range and marks the first weekday of
//! each period as a rebalancing date. A [`DateSchedule`] narrows the calendar to the
//! dates actually present in a price table.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::data::PriceTable;
use crate::error::ParameterError;

/// How often the strategy is consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Key shared by all dates of the same period.
    fn period_key(self, date: NaiveDate) -> (i32, u32) {
        match self {
            Frequency::Daily => (date.year(), date.ordinal()),
            Frequency::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Frequency::Monthly => (date.year(), date.month()),
            Frequency::Quarterly => (date.year(), (date.month() - 1) / 3),
            Frequency::Yearly => (date.year(), 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rebalancing frequency '{0}' (expected daily, weekly, monthly, quarterly or yearly)")]
pub struct UnknownFrequency(pub String);

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            "quarterly" | "q" => Ok(Frequency::Quarterly),
            "yearly" | "annual" | "y" => Ok(Frequency::Yearly),
            _ => Err(UnknownFrequency(s.to_string())),
        }
    }
}

/// Weekday calendar over `[start, end]` with period-start rebalancing dates.
#[derive(Debug, Clone)]
pub struct Calendar {
    frequency: Frequency,
    all_dates: Vec<NaiveDate>,
    rebalancing_dates: Vec<NaiveDate>,
}

impl Calendar {
    pub fn new(
        frequency: Frequency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ParameterError> {
        if start > end {
            return Err(ParameterError::InvertedRange { start, end });
        }

        let all_dates: Vec<NaiveDate> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();

        let rebalancing_dates = period_starts(&all_dates, frequency);

        Ok(Self {
            frequency,
            all_dates,
            rebalancing_dates,
        })
    }

    /// Calendar spanning the first to the last date of a price table.
    pub fn for_table(frequency: Frequency, table: &PriceTable) -> Option<Self> {
        let start = table.first_date()?;
        let end = table.last_date()?;
        Self::new(frequency, start, end).ok()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn all_dates(&self) -> &[NaiveDate] {
        &self.all_dates
    }

    pub fn rebalancing_dates(&self) -> &[NaiveDate] {
        &self.rebalancing_dates
    }
}

/// First date of each period, in order.
fn period_starts(dates: &[NaiveDate], frequency: Frequency) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    let mut last_key = None;
    for &date in dates {
        let key = frequency.period_key(date);
        if last_key != Some(key) {
            starts.push(date);
            last_key = Some(key);
        }
    }
    starts
}

/// Trading dates (calendar ∩ table) and the rebalancing dates the engine acts on.
#[derive(Debug, Clone, PartialEq)]
pub struct DateSchedule {
    trading_dates: Vec<NaiveDate>,
    rebalancing_dates: BTreeSet<NaiveDate>,
}

impl DateSchedule {
    /// Build a schedule from explicit dates. Trading dates are sorted and deduplicated.
    pub fn new(
        trading_dates: impl IntoIterator<Item = NaiveDate>,
        rebalancing_dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        let trading: BTreeSet<NaiveDate> = trading_dates.into_iter().collect();
        Self {
            trading_dates: trading.into_iter().collect(),
            rebalancing_dates: rebalancing_dates.into_iter().collect(),
        }
    }

    /// Intersect the calendar with the table's dates.
    ///
    /// Rebalancing dates are kept as the calendar produced them; a rebalancing date
    /// missing from the table is simply never reached.
    pub fn from_calendar(calendar: &Calendar, table: &PriceTable) -> Self {
        let trading_dates = calendar
            .all_dates()
            .iter()
            .copied()
            .filter(|d| table.row_index(*d).is_some());
        Self::new(trading_dates, calendar.rebalancing_dates().iter().copied())
    }

    /// Every table date is a trading date and a rebalancing date.
    pub fn every_date(table: &PriceTable) -> Self {
        let dates = table.dates().to_vec();
        Self::new(dates.clone(), dates)
    }

    pub fn trading_dates(&self) -> &[NaiveDate] {
        &self.trading_dates
    }

    pub fn is_rebalancing(&self, date: NaiveDate) -> bool {
        self.rebalancing_dates.contains(&date)
    }

    /// Number of trading dates on which the strategy will be consulted.
    pub fn rebalancing_count(&self) -> usize {
        self.trading_dates
            .iter()
            .filter(|d| self.rebalancing_dates.contains(d))
            .count()
    }
}
