// Generic store implementation: in-memory records mirrored to one JSON file

use crate::error::{Result, StoreError};
use crate::json;
use crate::models::TaskRecord;
use crate::record::{Record, new_id};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// The store used for task items
pub type TaskStore = Store<TaskRecord>;

/// Whether an update or delete found its target.
///
/// A missing id is not an error: the call simply changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    NotFound,
}

impl WriteOutcome {
    pub fn is_applied(self) -> bool {
        self == WriteOutcome::Applied
    }
}

/// What an import (or a load-time repair) did to the collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records appended as new
    pub inserted: usize,
    /// Records that replaced an existing record with the same id
    pub updated: usize,
    /// Records dropped because the import replaced the whole collection
    pub discarded: usize,
    /// Records that arrived without an id and were given one
    pub assigned_ids: usize,
}

/// Write-through persistent store backed by a single JSON array file
///
/// Every operation, reads included, runs under one mutex that also covers the
/// file write, so callers are fully serialized. Mutations are staged on a copy
/// of the collection and only become visible once the file has been replaced.
/// A failed write therefore leaves the store exactly as it was.
///
/// Share one instance between threads with `Arc`; there is no cross-process
/// coordination, so two processes must never open the same file.
#[derive(Debug)]
pub struct Store<T: Record> {
    path: PathBuf,
    records: Mutex<Vec<T>>,
}

impl<T: Record> Store<T> {
    /// Open or create a store backed by the file at `path`
    ///
    /// Missing parent directories are created and a missing file starts out as
    /// `[]`. An unreadable or unparsable file is an error; the store never
    /// starts half loaded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create directory if it doesn't exist
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        if !path.exists() {
            info!(path = ?path, "Store file missing, creating empty store");
            json::write_atomic(&path, "[]").map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let text = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let loaded: Vec<T> = json::parse_records(&text).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;

        // Blank or duplicate ids would break lookups; fix them up front
        let mut records = Vec::with_capacity(loaded.len());
        let repair = merge_into(&mut records, loaded);

        let store = Self {
            path,
            records: Mutex::new(records),
        };

        if repair.assigned_ids > 0 || repair.updated > 0 {
            warn!(
                path = ?store.path,
                assigned_ids = repair.assigned_ids,
                duplicates = repair.updated,
                "Store file had blank or duplicate ids, rewriting"
            );
            let records = store.lock()?;
            store.persist(&records)?;
        }

        info!(
            collection = T::collection_name(),
            path = ?store.path,
            count = store.len()?,
            "Loaded records from store file"
        );

        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    // ========================================================================
    // CRUD API
    // ========================================================================

    /// All records in insertion order (owned copies)
    pub fn get_all(&self) -> Result<Vec<T>> {
        Ok(self.lock()?.clone())
    }

    /// Get a record by ID; `None` when absent
    pub fn get(&self, id: &str) -> Result<Option<T>> {
        let records = self.lock()?;
        Ok(position(&records, id).map(|i| records[i].clone()))
    }

    /// Create a new record and return the stored copy
    ///
    /// Any id on the incoming record is replaced with a freshly generated one.
    pub fn create(&self, mut record: T) -> Result<T> {
        record.validate()?;

        let mut records = self.lock()?;
        record.set_id(fresh_id(&records));

        let mut next = records.clone();
        next.push(record.clone());
        self.commit(&mut records, next)?;

        debug!(collection = T::collection_name(), id = record.id(), "create: stored record");
        Ok(record)
    }

    /// Replace the record with the same id, keeping its position
    ///
    /// An unknown id is a silent no-op reported as `WriteOutcome::NotFound`;
    /// callers that expect the record to exist must check the outcome.
    pub fn update(&self, record: T) -> Result<WriteOutcome> {
        record.validate()?;

        let mut records = self.lock()?;
        let Some(index) = position(&records, record.id()) else {
            debug!(collection = T::collection_name(), id = record.id(), "update: no such record");
            return Ok(WriteOutcome::NotFound);
        };

        let mut next = records.clone();
        next[index] = record;
        self.commit(&mut records, next)?;

        debug!(collection = T::collection_name(), index, "update: replaced record");
        Ok(WriteOutcome::Applied)
    }

    /// Delete a record; an unknown id is a silent no-op
    pub fn delete(&self, id: &str) -> Result<WriteOutcome> {
        let mut records = self.lock()?;
        let Some(index) = position(&records, id) else {
            debug!(collection = T::collection_name(), id, "delete: no such record");
            return Ok(WriteOutcome::NotFound);
        };

        let mut next = records.clone();
        next.remove(index);
        self.commit(&mut records, next)?;

        debug!(collection = T::collection_name(), id, "delete: removed record");
        Ok(WriteOutcome::Applied)
    }

    // ========================================================================
    // Bulk transfer
    // ========================================================================

    /// Pretty-printed JSON array of every record, identical to the file format
    pub fn export_json(&self) -> Result<String> {
        let records = self.lock()?;
        json::render_records(&records).map_err(StoreError::Serialize)
    }

    /// Import a JSON array of records
    ///
    /// With `replace` the collection becomes exactly the imported set.
    /// Otherwise records are merged by id: a matching id is replaced in place,
    /// anything else is appended. Records without an id get a new one in both
    /// modes. The payload is parsed completely before anything changes, and
    /// the file is written once for the whole batch.
    pub fn import_json(&self, json: &str, replace: bool) -> Result<ImportReport> {
        let imported: Vec<T> = json::parse_records(json).map_err(StoreError::Parse)?;

        let mut records = self.lock()?;
        let (next, report) = if replace {
            let mut next = Vec::with_capacity(imported.len());
            let mut report = merge_into(&mut next, imported);
            report.discarded = records.len();
            (next, report)
        } else {
            let mut next = records.clone();
            let report = merge_into(&mut next, imported);
            (next, report)
        };
        self.commit(&mut records, next)?;

        info!(
            collection = T::collection_name(),
            replace,
            inserted = report.inserted,
            updated = report.updated,
            discarded = report.discarded,
            "Imported records"
        );
        Ok(report)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn lock(&self) -> Result<MutexGuard<'_, Vec<T>>> {
        self.records.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Write `next` to disk, then make it the in-memory state
    fn commit(&self, records: &mut Vec<T>, next: Vec<T>) -> Result<()> {
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    fn persist(&self, records: &[T]) -> Result<()> {
        let text = json::render_records(records).map_err(StoreError::Serialize)?;
        json::write_atomic(&self.path, &text).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn position<T: Record>(records: &[T], id: &str) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

fn fresh_id<T: Record>(records: &[T]) -> String {
    loop {
        let id = new_id();
        if position(records, &id).is_none() {
            return id;
        }
    }
}

/// Merge `incoming` into `records` by id, assigning ids where missing
fn merge_into<T: Record>(records: &mut Vec<T>, incoming: Vec<T>) -> ImportReport {
    let mut report = ImportReport::default();

    for mut record in incoming {
        if !record.has_id() {
            record.set_id(fresh_id(records));
            report.assigned_ids += 1;
        }

        match position(records, record.id()) {
            Some(index) => {
                records[index] = record;
                report.updated += 1;
            }
            None => {
                records.push(record);
                report.inserted += 1;
            }
        }
    }

    report
}
