use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use met_history::domain::{Month, Region, ValueType};
use met_history::error::MetError;
use met_history::reconcile::upsert_raw;
use met_history::store::{DataStore, JsonFileStore, RecordFilter, RecordKey, UpsertOutcome};

fn store_path(temp: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("data").join("records.json")).unwrap()
}

#[test]
fn records_survive_reopen() {
    let temp = tempfile::tempdir().unwrap();
    let path = store_path(&temp);
    let key = RecordKey::new(Region::Uk, 1910, Month::Jan, ValueType::MaxTemp);

    let mut store = JsonFileStore::open(path.clone()).unwrap();
    assert_eq!(store.upsert(key, 5.4).unwrap(), UpsertOutcome::Created);
    store.flush().unwrap();

    let mut reopened = JsonFileStore::open(path.clone()).unwrap();
    assert_eq!(reopened.get(&key).unwrap().unwrap().value, 5.4);
    assert_eq!(reopened.upsert(key, 5.5).unwrap(), UpsertOutcome::Updated);

    let other = RecordKey::new(Region::Uk, 1910, Month::Feb, ValueType::MaxTemp);
    reopened.upsert(other, 7.2).unwrap();
    reopened.flush().unwrap();

    let reopened = JsonFileStore::open(path).unwrap();
    let records = reopened.query(&RecordFilter::default()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(reopened.get(&key).unwrap().unwrap().value, 5.5);
    assert_ne!(records[0].id, records[1].id);
}

#[test]
fn flush_without_changes_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let path = store_path(&temp);

    let mut store = JsonFileStore::open(path.clone()).unwrap();
    store.flush().unwrap();

    assert!(!path.as_std_path().exists());
    assert!(store.is_empty());
}

#[test]
fn unreadable_document_is_a_store_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = store_path(&temp);
    std::fs::create_dir_all(path.parent().unwrap().as_std_path()).unwrap();
    std::fs::write(path.as_std_path(), b"{ not json").unwrap();

    let err = JsonFileStore::open(path).unwrap_err();
    assert_matches!(err, MetError::Store(_));
}

#[test]
fn duplicate_keys_in_document_are_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = store_path(&temp);
    std::fs::create_dir_all(path.parent().unwrap().as_std_path()).unwrap();
    let record = r#"{"region":"uk","year":1910,"month":1,"value_type":"max_temp","value":5.4"#;
    let document = format!(
        r#"{{"next_id":3,"records":[{record},"id":1}},{record},"id":2}}]}}"#
    );
    std::fs::write(path.as_std_path(), document).unwrap();

    let err = JsonFileStore::open(path).unwrap_err();
    assert_matches!(err, MetError::Store(_));
}

#[test]
fn default_path_is_under_data_dir() {
    let path = JsonFileStore::default_path().unwrap();
    assert!(path.ends_with("met-history/records.json"));
}

#[test]
fn rejected_nan_leaves_store_readable() {
    let temp = tempfile::tempdir().unwrap();
    let path = store_path(&temp);

    let mut store = JsonFileStore::open(path.clone()).unwrap();
    upsert_raw(&mut store, "uk", 1910, "JAN", "max_temp", 5.4).unwrap();
    let err = upsert_raw(&mut store, "uk", 1910, "FEB", "max_temp", f64::NAN).unwrap_err();
    assert_matches!(err, MetError::InvalidArgument { argument: "value", .. });
    store.flush().unwrap();

    let reopened = JsonFileStore::open(path).unwrap();
    assert_eq!(reopened.len(), 1);
    let key = RecordKey::new(Region::Uk, 1910, Month::Jan, ValueType::MaxTemp);
    assert_eq!(reopened.get(&key).unwrap().unwrap().value, 5.4);
}
