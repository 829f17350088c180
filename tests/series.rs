use assert_matches::assert_matches;

use met_history::domain::{DataPoint, Month, Region, ValueType};
use met_history::error::MetError;
use met_history::reconcile::upsert;
use met_history::series::assemble;
use met_history::store::MemoryStore;

fn store_with(points: &[DataPoint]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for point in points {
        upsert(&mut store, point).unwrap();
    }
    store
}

#[test]
fn value_type_is_the_display_title() {
    let store = store_with(&[
        DataPoint::new(Region::Wales, 1934, Month::May, ValueType::Rainfall, 23.5),
        DataPoint::new(Region::Wales, 1934, Month::Jun, ValueType::Rainfall, 22.5),
    ]);

    let series = assemble(ValueType::Rainfall, &[Region::Wales, Region::England], &store).unwrap();
    assert_eq!(series.value_type, "Rainfall");

    let series = assemble(ValueType::MaxTemp, &[Region::Wales], &store).unwrap();
    assert_eq!(series.value_type, "Maximum Temperature");
}

#[test]
fn labels_cover_every_month_between_earliest_and_latest() {
    let store = store_with(&[
        DataPoint::new(Region::Wales, 1912, Month::May, ValueType::Rainfall, 45.5),
        DataPoint::new(Region::Wales, 1913, Month::May, ValueType::Sunshine, 45.5),
        DataPoint::new(Region::England, 1914, Month::Mar, ValueType::Sunshine, 44.5),
        DataPoint::new(Region::Scotland, 1915, Month::Jan, ValueType::Sunshine, 40.0),
    ]);

    let series = assemble(ValueType::Sunshine, &[Region::Wales, Region::England], &store).unwrap();

    assert_eq!(
        series.labels,
        vec![
            "1913-MAY", "1913-JUN", "1913-JUL", "1913-AUG", "1913-SEP", "1913-OCT", "1913-NOV",
            "1913-DEC", "1914-JAN", "1914-FEB", "1914-MAR",
        ]
    );
}

#[test]
fn only_requested_regions_are_returned() {
    let store = store_with(&[
        DataPoint::new(Region::Wales, 1950, Month::Jan, ValueType::MinTemp, 1.5),
        DataPoint::new(Region::England, 1950, Month::Feb, ValueType::MinTemp, 0.5),
    ]);

    let series = assemble(ValueType::MinTemp, &[Region::Wales, Region::Scotland], &store).unwrap();

    let names = series
        .series
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Wales", "Scotland"]);
    assert_eq!(series.labels, vec!["1950-JAN"]);
    assert_eq!(series.series[0].data, vec![Some(1.5)]);
    assert_eq!(series.series[1].data, vec![None]);
}

#[test]
fn gaps_are_filled_with_none() {
    let store = store_with(&[
        DataPoint::new(Region::Uk, 2000, Month::Nov, ValueType::MeanTemp, 7.1),
        DataPoint::new(Region::Uk, 2001, Month::Feb, ValueType::MeanTemp, 4.2),
        DataPoint::new(Region::Scotland, 2000, Month::Dec, ValueType::MeanTemp, 3.3),
    ]);

    let series = assemble(ValueType::MeanTemp, &[Region::Uk, Region::Scotland], &store).unwrap();

    assert_eq!(
        series.labels,
        vec!["2000-NOV", "2000-DEC", "2001-JAN", "2001-FEB"]
    );
    assert_eq!(series.series[0].data, vec![Some(7.1), None, None, Some(4.2)]);
    assert_eq!(series.series[1].data, vec![None, Some(3.3), None, None]);
}

#[test]
fn empty_store_gives_empty_series() {
    let store = MemoryStore::new();

    let series = assemble(ValueType::MaxTemp, &[Region::Uk, Region::Wales], &store).unwrap();

    assert!(series.labels.is_empty());
    assert_eq!(series.series.len(), 2);
    assert!(series.series.iter().all(|entry| entry.data.is_empty()));
}

#[test]
fn repeated_regions_appear_once() {
    let store = store_with(&[DataPoint::new(
        Region::Uk,
        2000,
        Month::Jan,
        ValueType::MaxTemp,
        6.0,
    )]);

    let series = assemble(ValueType::MaxTemp, &[Region::Uk, Region::Uk], &store).unwrap();
    assert_eq!(series.series.len(), 1);
}

#[test]
fn serializes_missing_months_as_null() {
    let store = store_with(&[
        DataPoint::new(Region::Uk, 2000, Month::Jan, ValueType::MaxTemp, 6.0),
        DataPoint::new(Region::Uk, 2000, Month::Mar, ValueType::MaxTemp, 9.5),
    ]);

    let series = assemble(ValueType::MaxTemp, &[Region::Uk], &store).unwrap();
    let json = serde_json::to_value(&series).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "value_type": "Maximum Temperature",
            "labels": ["2000-JAN", "2000-FEB", "2000-MAR"],
            "series": [{"name": "UK", "data": [6.0, null, 9.5]}]
        })
    );
}

#[test]
fn latest_possible_year_is_a_single_label() {
    let store = store_with(&[DataPoint::new(
        Region::Uk,
        i32::MAX,
        Month::Dec,
        ValueType::MaxTemp,
        1.0,
    )]);

    let series = assemble(ValueType::MaxTemp, &[Region::Uk], &store).unwrap();
    assert_eq!(series.labels, vec![format!("{}-DEC", i32::MAX)]);
    assert_eq!(series.series[0].data, vec![Some(1.0)]);
}

#[test]
fn oversized_range_is_rejected() {
    let store = store_with(&[
        DataPoint::new(Region::Uk, 1, Month::Jan, ValueType::MaxTemp, 1.0),
        DataPoint::new(Region::Uk, i32::MAX, Month::Dec, ValueType::MaxTemp, 2.0),
    ]);

    let err = assemble(ValueType::MaxTemp, &[Region::Uk], &store).unwrap_err();
    assert_matches!(err, MetError::InvalidArgument { argument: "range", .. });
}
