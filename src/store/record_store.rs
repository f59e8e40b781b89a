//! Exact-key access to a climate record store, either fully preloaded into memory or by
//! re-scanning the file on every lookup.

use crate::interpolation::Triangulation;
use crate::store::codec::RecordReader;
use crate::store::error::RecordStoreError;
use crate::types::record::Record;
use crate::types::timestamp_key::TimestampKey;
use log::{debug, info};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// How a [`RecordStore`] resolves lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LookupMode {
    /// Decode the whole store once and answer lookups from a hash map.
    /// Fast repeated queries, memory proportional to the dataset.
    #[default]
    Preloaded,
    /// Scan the file from the start on every lookup, stopping at the first match.
    /// Peak memory stays at one record; every lookup pays for (part of) a pass over the file.
    Streaming,
}

/// Read-only access to historical [`Record`]s by [`TimestampKey`].
///
/// Cloning is cheap and clones share the same underlying data, so a single store can be
/// handed to any number of concurrent queries. Both modes answer every key identically:
/// records pass through the same decoder and, when a key occurs more than once, the first
/// occurrence in file order wins.
///
/// # Examples
///
/// ```
/// use climatrend::{LookupMode, Record, RecordStore, RecordWriter, TimestampKey};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("records.bin");
/// let mut writer = RecordWriter::create(&path).unwrap();
/// writer.append(&Record::new("2018-07-04 09:00:00", vec![(0.0, 0.0)])).unwrap();
/// writer.finish().unwrap();
///
/// let store = RecordStore::open(&path, LookupMode::Streaming).unwrap();
/// let key = TimestampKey::new("2018-07-04 09:00:00");
/// assert!(store.lookup(&key).unwrap().is_some());
/// assert!(store.lookup(&TimestampKey::new("1999-01-01 00:00:00")).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
enum StoreInner {
    Preloaded {
        path: Option<PathBuf>,
        records: HashMap<TimestampKey, PreloadedEntry>,
    },
    Streaming {
        path: PathBuf,
    },
}

/// A preloaded record and the triangulation of its sample points, built on first use.
#[derive(Debug)]
struct PreloadedEntry {
    record: Arc<Record>,
    triangulation: OnceLock<Arc<Triangulation>>,
}

impl PreloadedEntry {
    fn triangulation(&self) -> Arc<Triangulation> {
        self.triangulation
            .get_or_init(|| Arc::new(Triangulation::new(&self.record.points)))
            .clone()
    }
}

impl RecordStore {
    /// Opens the store at `path`.
    ///
    /// In [`LookupMode::Preloaded`] the whole file is decoded here; malformed frames are
    /// skipped with a warning. In [`LookupMode::Streaming`] only the file's presence is
    /// checked.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::DatasetUnavailable`] if the file cannot be opened.
    pub fn open(path: &Path, mode: LookupMode) -> Result<Self, RecordStoreError> {
        let inner = match mode {
            LookupMode::Preloaded => {
                let start = Instant::now();
                let mut reader = RecordReader::open(path)?;
                let records = Self::index(reader.by_ref());
                info!(
                    "Preloaded {} climate records from {} in {:?} ({} malformed frames skipped)",
                    records.len(),
                    path.display(),
                    start.elapsed(),
                    reader.skipped()
                );
                StoreInner::Preloaded {
                    path: Some(path.to_path_buf()),
                    records,
                }
            }
            LookupMode::Streaming => {
                // Fail at open time rather than on the first query.
                RecordReader::open(path)?;
                info!("Streaming climate records from {}", path.display());
                StoreInner::Streaming {
                    path: path.to_path_buf(),
                }
            }
        };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Same as [`RecordStore::open`], run on the blocking thread pool.
    pub async fn load(path: PathBuf, mode: LookupMode) -> Result<Self, RecordStoreError> {
        tokio::task::spawn_blocking(move || Self::open(&path, mode)).await?
    }

    /// Builds a preloaded store from records already in memory.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let records = Self::index(records.into_iter().map(Record::sanitized));
        Self {
            inner: Arc::new(StoreInner::Preloaded {
                path: None,
                records,
            }),
        }
    }

    fn index(records: impl Iterator<Item = Record>) -> HashMap<TimestampKey, PreloadedEntry> {
        let mut index = HashMap::new();
        for record in records {
            match index.entry(record.key.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(PreloadedEntry {
                        record: Arc::new(record),
                        triangulation: OnceLock::new(),
                    });
                }
                Entry::Occupied(entry) => {
                    debug!("Ignoring duplicate record for {}", entry.key());
                }
            }
        }
        index
    }

    /// Returns the record stored under `key`, or `Ok(None)` when there is none.
    ///
    /// # Errors
    ///
    /// Only in streaming mode: [`RecordStoreError::DatasetUnavailable`] when the file can
    /// no longer be opened.
    pub fn lookup(&self, key: &TimestampKey) -> Result<Option<Arc<Record>>, RecordStoreError> {
        match self.inner.as_ref() {
            StoreInner::Preloaded { records, .. } => Ok(records.get(key).map(|entry| entry.record.clone())),
            StoreInner::Streaming { path } => {
                // Every scan owns its file handle, so concurrent lookups never share a cursor.
                let found = RecordReader::open(path)?.find(|record| &record.key == key);
                Ok(found.map(Arc::new))
            }
        }
    }

    /// Like [`RecordStore::lookup`], also returning the triangulation of the record's points.
    ///
    /// A preloaded store triangulates each record once and hands out the same
    /// triangulation to every later lookup. A streaming store triangulates on every call.
    pub fn lookup_triangulated(
        &self,
        key: &TimestampKey,
    ) -> Result<Option<(Arc<Record>, Arc<Triangulation>)>, RecordStoreError> {
        match self.inner.as_ref() {
            StoreInner::Preloaded { records, .. } => Ok(records
                .get(key)
                .map(|entry| (entry.record.clone(), entry.triangulation()))),
            StoreInner::Streaming { .. } => Ok(self.lookup(key)?.map(|record| {
                let triangulation = Arc::new(Triangulation::new(&record.points));
                (record, triangulation)
            })),
        }
    }

    pub fn mode(&self) -> LookupMode {
        match self.inner.as_ref() {
            StoreInner::Preloaded { .. } => LookupMode::Preloaded,
            StoreInner::Streaming { .. } => LookupMode::Streaming,
        }
    }

    /// The file backing this store, if any.
    pub fn path(&self) -> Option<&Path> {
        match self.inner.as_ref() {
            StoreInner::Preloaded { path, .. } => path.as_deref(),
            StoreInner::Streaming { path } => Some(path),
        }
    }

    /// Number of distinct keys held in memory; `None` for a streaming store.
    pub fn preloaded_len(&self) -> Option<usize> {
        match self.inner.as_ref() {
            StoreInner::Preloaded { records, .. } => Some(records.len()),
            StoreInner::Streaming { .. } => None,
        }
    }
}
