use crate::domain::{DataPoint, Month, Region, ValueType};
use crate::error::MetError;
use crate::store::{DataStore, RecordKey, UpsertOutcome};

/// Creates or updates the single record for the point's identity key.
pub fn upsert<S: DataStore + ?Sized>(
    store: &mut S,
    point: &DataPoint,
) -> Result<UpsertOutcome, MetError> {
    if point.year <= 0 {
        return Err(MetError::invalid("year", point.year));
    }
    if !point.value.is_finite() {
        return Err(MetError::invalid("value", point.value));
    }
    store.upsert(RecordKey::from(point), point.value)
}

/// String-typed entry point used by the CLI; every categorical argument is
/// checked against its enumeration before anything is written.
pub fn upsert_raw<S: DataStore + ?Sized>(
    store: &mut S,
    region: &str,
    year: i32,
    month: &str,
    value_type: &str,
    value: f64,
) -> Result<(DataPoint, UpsertOutcome), MetError> {
    let region: Region = region.parse()?;
    let month: Month = month.parse()?;
    let value_type: ValueType = value_type.parse()?;
    let point = DataPoint::new(region, year, month, value_type, value);
    let outcome = upsert(store, &point)?;
    Ok((point, outcome))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn rejects_unknown_month() {
        let mut store = MemoryStore::new();
        let err = upsert_raw(&mut store, "uk", 1910, "JANUARY", "max_temp", 5.4).unwrap_err();
        assert_matches!(err, MetError::InvalidArgument { argument: "month", .. });
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_non_positive_year() {
        let mut store = MemoryStore::new();
        let point = DataPoint::new(Region::Uk, 0, Month::Jan, ValueType::MaxTemp, 5.4);
        let err = upsert(&mut store, &point).unwrap_err();
        assert_matches!(err, MetError::InvalidArgument { argument: "year", .. });
    }

    #[test]
    fn rejects_non_finite_value() {
        let mut store = MemoryStore::new();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let point = DataPoint::new(Region::Uk, 1910, Month::Jan, ValueType::MaxTemp, value);
            let err = upsert(&mut store, &point).unwrap_err();
            assert_matches!(err, MetError::InvalidArgument { argument: "value", .. });
        }
        assert!(store.is_empty());
    }
}
