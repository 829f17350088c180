use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Region, ValueType, YearMonth};
use crate::error::MetError;
use crate::store::{DataStore, RecordFilter};

/// Longest label axis a single series request may produce.
pub const MAX_SERIES_MONTHS: u64 = 12 * 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub value_type: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<Option<f64>>,
}

/// Builds one dense monthly series per requested region.
///
/// Labels cover every month from the earliest to the latest record found for
/// `value_type` in `regions`; months with no record are `None`. Series follow
/// the order of `regions`, with repeated regions kept only once.
pub fn assemble<S: DataStore + ?Sized>(
    value_type: ValueType,
    regions: &[Region],
    store: &S,
) -> Result<TimeSeries, MetError> {
    let regions = dedup_regions(regions);
    let records = store.query(&RecordFilter::for_series(value_type, &regions))?;

    let range = records.iter().map(|record| record.year_month()).fold(
        None,
        |range: Option<(YearMonth, YearMonth)>, current| match range {
            None => Some((current, current)),
            Some((min, max)) => Some((min.min(current), max.max(current))),
        },
    );
    let months = match range {
        Some((first, last)) => {
            let span = first.months_through(last);
            if span > MAX_SERIES_MONTHS {
                return Err(MetError::invalid(
                    "range",
                    format!("{} to {} spans {span} months", first.label(), last.label()),
                ));
            }
            month_range(first, last)
        }
        None => Vec::new(),
    };

    let values = records
        .iter()
        .map(|record| ((record.region, record.year_month()), record.value))
        .collect::<HashMap<_, _>>();

    let series = regions
        .iter()
        .map(|&region| Series {
            name: region.display_name().to_string(),
            data: months
                .iter()
                .map(|&month| values.get(&(region, month)).copied())
                .collect(),
        })
        .collect();

    Ok(TimeSeries {
        value_type: value_type.title().to_string(),
        labels: months.iter().map(|month| month.label()).collect(),
        series,
    })
}

/// Every month from `first` to `last`, both included.
pub fn month_range(first: YearMonth, last: YearMonth) -> Vec<YearMonth> {
    let mut months = Vec::new();
    let mut current = Some(first);
    while let Some(month) = current.filter(|month| *month <= last) {
        months.push(month);
        current = month.succ();
    }
    months
}

fn dedup_regions(regions: &[Region]) -> Vec<Region> {
    let mut unique = Vec::with_capacity(regions.len());
    for &region in regions {
        if !unique.contains(&region) {
            unique.push(region);
        }
    }
    unique
}
