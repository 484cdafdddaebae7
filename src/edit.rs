//! Inline edit synchronization: send the partial update first, patch the
//! in-memory dataset only after the backend accepted it. A rejected edit
//! leaves the store untouched; the cell falls back to the stored value
//! once the edit buffer is dropped.

use serde_json::Value;

use crate::api::ApiError;
use crate::columns::{ColumnKind, ColumnSpec};
use crate::domain::AppError;
use crate::format;
use crate::store::DataStore;

/// One in-flight cell edit. The UI keeps at most one of these alive, so
/// edits are serialized per cell by construction.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    pub row_id: i64,
    pub column_key: String,
    /// Display value before the edit, shown again when the edit fails.
    pub original: String,
}

/// Convert an edited display string into the JSON value the backend
/// expects for this column.
pub fn wire_value(spec: &ColumnSpec, input: &str) -> Result<Value, AppError> {
    let trimmed = input.trim();
    // The absence type travels as its raw backend code.
    if spec.key == "tipo_ausencia" {
        let code: u8 = match trimmed {
            "1" | "Dias" | "dias" => 1,
            "3" | "Horas" | "horas" => 3,
            other => return Err(AppError::InvalidNumber(other.to_string())),
        };
        return Ok(Value::from(code));
    }
    match spec.kind {
        ColumnKind::Number => Ok(Value::from(format::parse_number(trimmed)?)),
        ColumnKind::Date => match format::parse_date_opt(trimmed)? {
            Some(date) => Ok(Value::from(date.format("%Y-%m-%d").to_string())),
            None => Ok(Value::Null),
        },
        ColumnKind::Text => {
            if spec.key == "cpf" {
                Ok(Value::from(format::strip_cpf(trimmed)))
            } else {
                Ok(Value::from(trimmed))
            }
        }
    }
}

/// Commit one cell edit. `send` performs the partial-update request; the
/// store is patched only when it succeeds, so a backend rejection leaves
/// the displayed and stored values exactly as they were.
pub fn commit_edit<F>(
    store: &mut DataStore,
    spec: &ColumnSpec,
    row_id: i64,
    input: &str,
    send: F,
) -> Result<(), AppError>
where
    F: FnOnce(&str, &Value) -> Result<(), ApiError>,
{
    if !spec.editable {
        return Err(AppError::ReadOnlyColumn(spec.key.clone()));
    }
    let value = wire_value(spec, input)?;
    send(&spec.key, &value)?;
    store.patch_row(row_id, &spec.key, input)
}
