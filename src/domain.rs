use std::io;

use thiserror::Error;

use crate::api::ApiError;

/// Unified application error type.
/// All modules (api, store, model, session) return AppError to keep the
/// error handling consistent and easy to manage.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column is not editable: {0}")]
    ReadOnlyColumn(String),

    #[error("Unknown record id: {0}")]
    UnknownRecord(i64),

    #[error("Session error: {0}")]
    Session(String),
}

/// Messages produced by the controller from raw terminal events and
/// consumed by Model::update. One enum for every view, the model decides
/// what a message means in the current modus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveToFirstColumn,
    MoveToLastColumn,
    NextPage,
    PrevPage,
    Enter,
    Exit,
    EditCell,
    Delete,
    Duplicate,
    Search,
    FacetFilter,
    ClearFilters,
    Uploads,
    Rollups,
    Propagate,
    Token,
    SortAscending,
    SortDescending,
    ToggleColumnState,
    ToggleExpandColumnState,
    ToggleIndex,
    CopyCell,
    CopyRow,
    Reload,
    Help,
    Resize(usize, usize),
    RawKey(ratatui::crossterm::event::KeyEvent),
}

/// Kind of pending line input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    SearchTable,
    EditCell,
    BulkUnit,
    Token,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub max_column_width: usize,
    pub api_url: String,
    pub client_id: Option<i64>,
    pub upload_id: Option<i64>,
}

pub const HELP_TEXT: &str = "\
 faltas - absenteeism dashboard

 Navigation
   arrows        move the cell cursor
   PgUp/PgDn     move by one screen
   g / G         first / last row of the page
   0 / $         first / last column
   n / p         next / previous page

 Data
   /             search all searchable fields
   f             facet filter for the current column
   F             clear all filters and the search term
   s / S         sort ascending / descending
   e             edit the current cell (editable columns)
   a             new record copied from the selected one
   d             delete the record (record view) / batch (uploads)
   r             reload the dataset / refresh the open record
   u             upload batches of the current client
   R             per-employee totals
   U             record view: apply gender and unit to the employee
                 table: set the unit for every filtered employee
   t             replace the api token

 Misc
   Enter         open record view (table) / toggle value (facet)
   Esc           leave the current view
   c / C         copy cell / row to the clipboard
   x / X         collapse / expand the current column
   i             toggle the row index
   ?             this help
   q             quit
";
