use tracing::{debug, warn};

use crate::api::DatasetSnapshot;
use crate::domain::AppError;
use crate::gender::{self, Gender};
use crate::records::{AbsenceRecord, DatasetStats};

/// Single owner of the in-memory dataset. Every mutation goes through
/// here; rendering and filtering only ever borrow the rows read-only,
/// so an accepted edit survives any later refilter or repagination.
#[derive(Debug, Default)]
pub struct DataStore {
    rows: Vec<AbsenceRecord>,
    stats: DatasetStats,
    original_columns: Option<Vec<String>>,
    applied_seq: u64,
}

impl DataStore {
    pub fn rows(&self) -> &[AbsenceRecord] {
        &self.rows
    }

    pub fn stats(&self) -> &DatasetStats {
        &self.stats
    }

    pub fn original_columns(&self) -> Option<&[String]> {
        self.original_columns.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_by_id(&self, id: i64) -> Option<&AbsenceRecord> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Replace the dataset with a loaded snapshot. Snapshots carry the
    /// gateway's load sequence number; anything at or below the last
    /// applied one resolved out of order and is discarded.
    pub fn apply_snapshot(&mut self, seq: u64, snapshot: DatasetSnapshot) -> bool {
        if seq <= self.applied_seq {
            warn!(
                "Discarding stale dataset #{seq}, already at #{}",
                self.applied_seq
            );
            return false;
        }
        debug!("Applying dataset #{seq} with {} rows", snapshot.rows.len());
        self.applied_seq = seq;
        self.rows = snapshot.rows;
        // Backfill missing gender from the first-name heuristic; rows the
        // backend already classified keep their value.
        for row in self.rows.iter_mut() {
            if row.gender.as_deref().unwrap_or("").is_empty() {
                match gender::classify(&row.name) {
                    Gender::Unknown => row.gender = None,
                    g => row.gender = Some(g.code().to_string()),
                }
            }
        }
        self.stats = snapshot.stats;
        self.original_columns = snapshot.original_columns;
        true
    }

    /// Patch one field of one row after the backend accepted the edit.
    pub fn patch_row(&mut self, id: i64, field: &str, value: &str) -> Result<(), AppError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::UnknownRecord(id))?;
        row.set_field(field, value)
    }

    pub fn remove_row(&mut self, id: i64) {
        self.rows.retain(|r| r.id != id);
    }

    /// Append a record the backend just created.
    pub fn push_row(&mut self, record: AbsenceRecord) {
        self.rows.push(record);
    }

    /// Swap a row for the backend's authoritative version.
    pub fn replace_row(&mut self, record: AbsenceRecord) -> Result<(), AppError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(AppError::UnknownRecord(record.id))?;
        *row = record;
        Ok(())
    }
}
