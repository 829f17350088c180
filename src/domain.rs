use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Uk,
    England,
    Scotland,
    Wales,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Uk, Region::England, Region::Scotland, Region::Wales];

    /// Key used in the store and as the URL slug.
    pub fn key(self) -> &'static str {
        match self {
            Region::Uk => "uk",
            Region::England => "england",
            Region::Scotland => "scotland",
            Region::Wales => "wales",
        }
    }

    /// Name shown in series output; also the file name on the Met Office site.
    pub fn display_name(self) -> &'static str {
        match self {
            Region::Uk => "UK",
            Region::England => "England",
            Region::Scotland => "Scotland",
            Region::Wales => "Wales",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.key() == slug)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Region {
    type Err = MetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.key() == trimmed || region.display_name() == trimmed)
            .ok_or_else(|| MetError::invalid("region", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    MaxTemp,
    MinTemp,
    MeanTemp,
    Sunshine,
    Rainfall,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        ValueType::MaxTemp,
        ValueType::MinTemp,
        ValueType::MeanTemp,
        ValueType::Sunshine,
        ValueType::Rainfall,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ValueType::MaxTemp => "max_temp",
            ValueType::MinTemp => "min_temp",
            ValueType::MeanTemp => "mean_temp",
            ValueType::Sunshine => "sunshine",
            ValueType::Rainfall => "rainfall",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ValueType::MaxTemp => "maxtemp",
            ValueType::MinTemp => "mintemp",
            ValueType::MeanTemp => "meantemp",
            ValueType::Sunshine => "sunshine",
            ValueType::Rainfall => "rainfall",
        }
    }

    /// Dataset directory on the Met Office site.
    pub fn dataset_code(self) -> &'static str {
        match self {
            ValueType::MaxTemp => "Tmax",
            ValueType::MinTemp => "Tmin",
            ValueType::MeanTemp => "Tmean",
            ValueType::Sunshine => "Sunshine",
            ValueType::Rainfall => "Rainfall",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ValueType::MaxTemp => "Maximum Temperature",
            ValueType::MinTemp => "Minimum Temperature",
            ValueType::MeanTemp => "Mean Temperature",
            ValueType::Sunshine => "Sunshine",
            ValueType::Rainfall => "Rainfall",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|value_type| value_type.slug() == slug)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ValueType {
    type Err = MetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|value_type| value_type.key() == trimmed || value_type.slug() == trimmed)
            .ok_or_else(|| MetError::invalid("value_type", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Calendar ordinal, January is 1.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index as usize).copied())
    }

    /// Three-letter uppercase abbreviation, as used in report headers and labels.
    pub fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

impl FromStr for Month {
    type Err = MetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(number) = trimmed.parse::<u32>() {
            return Self::from_number(number).ok_or_else(|| MetError::invalid("month", value));
        }
        Self::ALL
            .into_iter()
            .find(|month| month.abbrev() == trimmed)
            .ok_or_else(|| MetError::invalid("month", value))
    }
}

impl From<Month> for u32 {
    fn from(month: Month) -> Self {
        month.number()
    }
}

impl TryFrom<u32> for Month {
    type Error = MetError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| MetError::invalid("month", number))
    }
}

/// A calendar month of a given year, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The following month, or `None` past the last representable year.
    pub fn succ(self) -> Option<Self> {
        match self.month.next() {
            Some(month) => Some(Self::new(self.year, month)),
            None => Some(Self::new(self.year.checked_add(1)?, Month::Jan)),
        }
    }

    /// Number of months from `self` up to and including `last`; zero when
    /// `last` comes first.
    pub fn months_through(self, last: YearMonth) -> u64 {
        let span = (i64::from(last.year) - i64::from(self.year)) * 12
            + i64::from(last.month.number())
            - i64::from(self.month.number())
            + 1;
        u64::try_from(span).unwrap_or(0)
    }

    pub fn label(self) -> String {
        format!("{}-{}", self.year, self.month.abbrev())
    }
}

/// One monthly measurement for a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub region: Region,
    pub year: i32,
    pub month: Month,
    pub value_type: ValueType,
    pub value: f64,
}

impl DataPoint {
    pub fn new(region: Region, year: i32, month: Month, value_type: ValueType, value: f64) -> Self {
        Self {
            region,
            year,
            month,
            value_type,
            value,
        }
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// Parses a hyphen-joined list of region slugs such as `scotland-england`.
pub fn parse_region_slugs(slugs: &str) -> Result<Vec<Region>, MetError> {
    slugs
        .split('-')
        .map(|slug| {
            Region::from_slug(slug).ok_or_else(|| MetError::NotFound(format!("region {slug}")))
        })
        .collect()
}

pub fn parse_value_type_slug(slug: &str) -> Result<ValueType, MetError> {
    ValueType::from_slug(slug).ok_or_else(|| MetError::NotFound(format!("value type {slug}")))
}
