use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tempfile::Builder;

use crate::domain::{DataPoint, Month, Region, ValueType, YearMonth};
use crate::error::MetError;

/// Identity of a persisted measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub region: Region,
    pub year: i32,
    pub month: Month,
    pub value_type: ValueType,
}

impl RecordKey {
    pub fn new(region: Region, year: i32, month: Month, value_type: ValueType) -> Self {
        Self {
            region,
            year,
            month,
            value_type,
        }
    }
}

impl From<&DataPoint> for RecordKey {
    fn from(point: &DataPoint) -> Self {
        Self::new(point.region, point.year, point.month, point.value_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    pub region: Region,
    pub year: i32,
    pub month: Month,
    pub value_type: ValueType,
    pub value: f64,
}

impl StoredRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.region, self.year, self.month, self.value_type)
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub value_type: Option<ValueType>,
    pub regions: Option<Vec<Region>>,
}

impl RecordFilter {
    pub fn for_series(value_type: ValueType, regions: &[Region]) -> Self {
        Self {
            value_type: Some(value_type),
            regions: Some(regions.to_vec()),
        }
    }

    pub fn matches(&self, record: &StoredRecord) -> bool {
        let value_type_ok = self
            .value_type
            .map(|value_type| value_type == record.value_type)
            .unwrap_or(true);
        let region_ok = self
            .regions
            .as_ref()
            .map(|regions| regions.contains(&record.region))
            .unwrap_or(true);
        value_type_ok && region_ok
    }
}

/// Storage boundary for measurements.
///
/// `upsert` is a single conditional write: it creates the record for `key`
/// or overwrites only its value. Exclusive access through `&mut self` keeps
/// the lookup and the write together.
pub trait DataStore {
    fn upsert(&mut self, key: RecordKey, value: f64) -> Result<UpsertOutcome, MetError>;
    fn get(&self, key: &RecordKey) -> Result<Option<StoredRecord>, MetError>;
    fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, MetError>;

    fn flush(&mut self) -> Result<(), MetError> {
        Ok(())
    }
}

impl<S: DataStore + ?Sized> DataStore for &mut S {
    fn upsert(&mut self, key: RecordKey, value: f64) -> Result<UpsertOutcome, MetError> {
        (**self).upsert(key, value)
    }

    fn get(&self, key: &RecordKey) -> Result<Option<StoredRecord>, MetError> {
        (**self).get(key)
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, MetError> {
        (**self).query(filter)
    }

    fn flush(&mut self) -> Result<(), MetError> {
        (**self).flush()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<RecordKey, StoredRecord>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn from_records(records: Vec<StoredRecord>, next_id: u64) -> Result<Self, MetError> {
        let mut map = BTreeMap::new();
        let mut max_id = 0;
        for record in records {
            max_id = max_id.max(record.id);
            let key = record.key();
            if map.insert(key, record).is_some() {
                return Err(MetError::Store(format!(
                    "duplicate record for {} {}-{} {}",
                    key.region.key(),
                    key.year,
                    key.month,
                    key.value_type
                )));
            }
        }
        Ok(Self {
            records: map,
            next_id: next_id.max(max_id + 1),
        })
    }

    fn records(&self) -> impl Iterator<Item = &StoredRecord> {
        self.records.values()
    }
}

impl DataStore for MemoryStore {
    fn upsert(&mut self, key: RecordKey, value: f64) -> Result<UpsertOutcome, MetError> {
        match self.records.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().value = value;
                Ok(UpsertOutcome::Updated)
            }
            Entry::Vacant(entry) => {
                self.next_id = self.next_id.max(1);
                entry.insert(StoredRecord {
                    id: self.next_id,
                    region: key.region,
                    year: key.year,
                    month: key.month,
                    value_type: key.value_type,
                    value,
                });
                self.next_id += 1;
                Ok(UpsertOutcome::Created)
            }
        }
    }

    fn get(&self, key: &RecordKey) -> Result<Option<StoredRecord>, MetError> {
        Ok(self.records.get(key).cloned())
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, MetError> {
        Ok(self
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    records: Vec<StoredRecord>,
}

/// Records kept in one JSON document, rewritten atomically on `flush`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
    inner: MemoryStore,
    dirty: bool,
}

impl JsonFileStore {
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, MetError> {
        let path = path.into();
        let inner = if path.as_std_path().exists() {
            let content = fs::read_to_string(path.as_std_path())
                .map_err(|err| MetError::Filesystem(format!("read {path}: {err}")))?;
            let file: StoreFile = serde_json::from_str(&content)
                .map_err(|err| MetError::Store(format!("parse {path}: {err}")))?;
            MemoryStore::from_records(file.records, file.next_id)?
        } else {
            MemoryStore::new()
        };
        Ok(Self {
            path,
            inner,
            dirty: false,
        })
    }

    pub fn default_path() -> Result<Utf8PathBuf, MetError> {
        BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.data_dir().join("met-history").join("records.json"))
                    .ok()
            })
            .ok_or_else(|| MetError::Filesystem("unable to resolve data directory".to_string()))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn write_atomic(&self) -> Result<(), MetError> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| MetError::Filesystem(err.to_string()))?;

        let file = StoreFile {
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
            next_id: self.inner.next_id,
            records: self.inner.records().cloned().collect(),
        };
        let content = serde_json::to_vec_pretty(&file)
            .map_err(|err| MetError::Store(err.to_string()))?;

        let mut temp = Builder::new()
            .prefix("met-history-store")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| MetError::Filesystem(err.to_string()))?;
        temp.write_all(&content)
            .map_err(|err| MetError::Filesystem(err.to_string()))?;
        temp.persist(self.path.as_std_path())
            .map_err(|err| MetError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

impl DataStore for JsonFileStore {
    fn upsert(&mut self, key: RecordKey, value: f64) -> Result<UpsertOutcome, MetError> {
        let outcome = self.inner.upsert(key, value)?;
        self.dirty = true;
        Ok(outcome)
    }

    fn get(&self, key: &RecordKey) -> Result<Option<StoredRecord>, MetError> {
        self.inner.get(key)
    }

    fn query(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, MetError> {
        self.inner.query(filter)
    }

    fn flush(&mut self) -> Result<(), MetError> {
        if !self.dirty {
            return Ok(());
        }
        self.write_atomic()?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_creates_then_updates() {
        let mut store = MemoryStore::new();
        let key = RecordKey::new(Region::Wales, 1910, Month::Jan, ValueType::Rainfall);

        assert_eq!(store.upsert(key, 120.5).unwrap(), UpsertOutcome::Created);
        assert_eq!(store.upsert(key, 99.0).unwrap(), UpsertOutcome::Updated);

        let record = store.get(&key).unwrap().unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.value, 99.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn filter_by_value_type_and_region() {
        let mut store = MemoryStore::new();
        store
            .upsert(RecordKey::new(Region::Uk, 1910, Month::Jan, ValueType::MaxTemp), 5.4)
            .unwrap();
        store
            .upsert(RecordKey::new(Region::Wales, 1910, Month::Jan, ValueType::MaxTemp), 6.0)
            .unwrap();
        store
            .upsert(RecordKey::new(Region::Uk, 1910, Month::Jan, ValueType::MinTemp), 0.3)
            .unwrap();

        let found = store
            .query(&RecordFilter::for_series(ValueType::MaxTemp, &[Region::Uk]))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, 5.4);
    }
}
