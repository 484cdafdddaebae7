use std::collections::BTreeSet;
use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace, warn};

use crate::api::{ApiClient, NewRecord, Scope};
use crate::columns::{self, ColumnSpec};
use crate::domain::{AppConfig, AppError, CMDMode, HELP_TEXT, Message};
use crate::edit::{self, PendingEdit};
use crate::filter::{self, FilterState};
use crate::format;
use crate::inputter::{InputResult, Inputter};
use crate::pager::{self, PageState, PageView};
use crate::records::{EmployeeRollup, UploadBatch};
use crate::store::DataStore;
use crate::ui::{
    CMDLINE_HEIGH, COLUMN_WIDTH_COLLAPSED_COLUMN, COLUMN_WIDTH_MARGIN, SCROLLBAR_WIDTH,
    TABLE_HEADER_HEIGHT,
};

/// View lifecycle: no client selected, loading, interactive, or a load
/// failure. A failed reload keeps any previously loaded dataset visible.
#[derive(Debug, PartialEq)]
pub enum Status {
    UNSCOPED,
    LOADING,
    READY,
    ERROR,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    RECORD,
    FACET,
    UPLOADS,
    ROLLUP,
    POPUP,
    CMDINPUT,
}

#[derive(Debug, PartialEq)]
pub enum ColumnStatus {
    NORMAL,
    EXPANDED,
    COLLAPSED,
}

/// One grid column at runtime: the static spec plus render state.
pub struct GridColumn {
    pub spec: ColumnSpec,
    pub status: ColumnStatus,
    max_width: usize,
    render_width: usize,
}

impl GridColumn {
    fn new(spec: ColumnSpec) -> Self {
        GridColumn {
            spec,
            status: ColumnStatus::NORMAL,
            max_width: 0,
            render_width: 0,
        }
    }

    fn header(&self) -> String {
        if self.spec.editable {
            format!("{} ✎", self.spec.label)
        } else {
            self.spec.label.clone()
        }
    }
}

#[derive(Clone)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

impl ColumnView {
    fn empty() -> Self {
        ColumnView {
            name: "".to_string(),
            width: 0,
            data: Vec::new(),
        }
    }
}

/// The paged grid: visible row subset (filter output, optionally sorted),
/// pagination state, cell cursor and scroll offsets.
struct GridView {
    visible_rows: Vec<usize>,
    page: PageState,
    page_view: PageView,
    visible_columns: Vec<usize>,
    visible_width: usize,
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    offset_column: usize,
    show_index: bool,
    index: ColumnView,
    data: Vec<ColumnView>,
    heigh: usize,
    width: usize,
}

impl GridView {
    fn empty(page_size: usize) -> Self {
        GridView {
            visible_rows: Vec::new(),
            page: PageState::new(page_size),
            page_view: pager::paginate(0, &PageState::new(page_size)),
            visible_columns: Vec::new(),
            visible_width: 0,
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            offset_column: 0,
            show_index: true,
            index: ColumnView::empty(),
            data: Vec::new(),
            heigh: 0,
            width: 0,
        }
    }

    /// Number of rows of the current page slice.
    fn page_len(&self) -> usize {
        self.page_view.end - self.page_view.start
    }

    /// Index into visible_rows of the focused cell's row.
    fn selected_subset_idx(&self) -> usize {
        self.page_view.start + self.offset_row + self.curser_row
    }

    /// Row numbers within the filtered subset for the rendered window.
    fn build_index(&mut self) {
        let rbegin = self.page_view.start + self.offset_row;
        let rend = std::cmp::min(rbegin + self.heigh, self.page_view.end);
        let data = (rbegin..rend)
            .map(|idx| (idx + 1).to_string())
            .collect::<Vec<String>>();
        let width = data.last().map(|s| s.len()).unwrap_or(3);
        self.index = ColumnView {
            name: "".to_string(),
            width,
            data,
        }
    }
}

/// Drill-down of one record as a header/value column pair.
struct RecordView {
    header_data: Vec<String>,
    header_width: usize,
    header_view: ColumnView,
    row_data: Vec<String>,
    row_width: usize,
    row_view: ColumnView,
    record_idx: usize, // Index into GridView.visible_rows
    curser_row: usize,
    curser_offset: usize,
    height: usize,
    width: usize,
}

impl RecordView {
    fn empty() -> Self {
        RecordView {
            header_data: Vec::new(),
            header_width: 0,
            header_view: ColumnView::empty(),
            row_data: Vec::new(),
            row_width: 0,
            row_view: ColumnView::empty(),
            record_idx: 0,
            curser_row: 0,
            curser_offset: 0,
            height: 0,
            width: 0,
        }
    }
}

/// Multi-select column filter picker: the column's distinct values with
/// counts, computed over the rows the other filter dimensions leave
/// visible, frozen while the user toggles values.
struct FacetView {
    column_idx: usize,
    values: Vec<String>,
    counts: Vec<String>,
    universe: BTreeSet<String>,
    value_view: ColumnView,
    count_view: ColumnView,
    value_width: usize,
    count_width: usize,
    curser_row: usize,
    curser_offset: usize,
    height: usize,
    width: usize,
}

impl FacetView {
    fn empty() -> Self {
        FacetView {
            column_idx: 0,
            values: Vec::new(),
            counts: Vec::new(),
            universe: BTreeSet::new(),
            value_view: ColumnView::empty(),
            count_view: ColumnView::empty(),
            value_width: 0,
            count_width: 0,
            curser_row: 0,
            curser_offset: 0,
            height: 0,
            width: 0,
        }
    }
}

/// Upload batches of the current client, as delivered by the backend.
struct BatchView {
    batches: Vec<UploadBatch>,
    curser_row: usize,
    curser_offset: usize,
    height: usize,
}

impl BatchView {
    fn empty() -> Self {
        BatchView {
            batches: Vec::new(),
            curser_row: 0,
            curser_offset: 0,
            height: 0,
        }
    }
}

/// Per-employee totals from the analysis endpoint, read-only.
struct RollupView {
    rollups: Vec<EmployeeRollup>,
    curser_row: usize,
    curser_offset: usize,
    height: usize,
}

impl RollupView {
    fn empty() -> Self {
        RollupView {
            rollups: Vec::new(),
            curser_row: 0,
            curser_offset: 0,
            height: 0,
        }
    }
}

pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub index: ColumnView,
    pub nrows: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub last_update: Instant,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
    pub page: usize,
    pub total_pages: usize,
    pub page_window: Vec<usize>,
    pub display_range: String,
    pub filter_active: bool,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            index: ColumnView::empty(),
            nrows: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            last_update: Instant::now(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            page: 1,
            total_pages: 1,
            page_window: vec![1],
            display_range: String::new(),
            filter_active: false,
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub index_width: usize,
    pub index_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_model(model: &Model, ui_width: usize, ui_height: usize) -> Self {
        let mut index_width = 0;
        if model.grid.show_index {
            index_width = model.grid.index.width;
        }
        UILayout::from_values(index_width, ui_width, ui_height)
    }

    pub fn from_values(index_width: usize, ui_width: usize, ui_height: usize) -> Self {
        let cmdline_heigth = CMDLINE_HEIGH;
        let cmdline_width = ui_width;

        let table_width = ui_width.saturating_sub(SCROLLBAR_WIDTH + index_width);
        let table_height = ui_height.saturating_sub(cmdline_heigth + TABLE_HEADER_HEIGHT);
        let index_height = table_height;

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
            index_width,
            index_height,
            statusline_width: cmdline_width,
            statusline_height: cmdline_heigth,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: AppConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    api: ApiClient,
    store: DataStore,
    cols: Vec<GridColumn>,
    n_sticky: usize,
    filter_state: FilterState,
    grid: GridView,
    record_view: RecordView,
    facet_view: FacetView,
    batch_view: BatchView,
    rollup_view: RollupView,
    pending_edit: Option<PendingEdit>,
    last_update: Instant,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(
        config: AppConfig,
        api: ApiClient,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, AppError> {
        let page_size = config.page_size;
        let mut model = Self {
            status: if config.client_id.is_some() {
                Status::LOADING
            } else {
                Status::UNSCOPED
            },
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            api,
            store: DataStore::default(),
            cols: Vec::new(),
            n_sticky: 0,
            filter_state: FilterState::default(),
            grid: GridView::empty(page_size),
            record_view: RecordView::empty(),
            facet_view: FacetView::empty(),
            batch_view: BatchView::empty(),
            rollup_view: RollupView::empty(),
            pending_edit: None,
            last_update: Instant::now(),
            uilayout: UILayout::from_values(0, ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: Clipboard::new().ok(),
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            config,
        };
        model.rebuild_columns();
        model.update_grid_data();
        if model.status == Status::UNSCOPED {
            model.set_status_message("No client selected. Start with --client-id.".to_string());
        } else {
            model.set_status_message("Loading ...".to_string());
        }
        Ok(model)
    }

    /// Load (or reload) the dataset for the configured scope. A failure
    /// keeps any previously loaded dataset on screen as a scoped error.
    pub fn reload(&mut self) {
        let Some(client_id) = self.config.client_id else {
            self.status = Status::UNSCOPED;
            self.set_status_message("No client selected. Start with --client-id.".to_string());
            return;
        };
        self.status = Status::LOADING;
        self.set_status_message("Loading ...".to_string());

        let scope = Scope {
            client_id,
            upload_id: self.config.upload_id,
        };
        let start_time = Instant::now();
        match self.api.load_dataset(scope) {
            Ok((seq, snapshot)) => {
                let nrows = snapshot.rows.len();
                if !self.store.apply_snapshot(seq, snapshot) {
                    // A newer load already resolved; keep what we have.
                    self.status = Status::READY;
                    return;
                }
                let duration = start_time.elapsed().as_millis();
                info!("Loaded {nrows} records in {duration}ms");
                self.rebuild_columns();
                self.recompute_visible(true);
                self.status = Status::READY;
                let lost_days = format::format_number(self.store.stats().total_lost_days);
                self.set_status_message(format!(
                    "Loaded {nrows} records ({lost_days} dias perdidos) in {duration}ms"
                ));
            }
            Err(e) => {
                error!("Dataset load failed: {e}");
                if self.store.is_empty() {
                    self.status = Status::ERROR;
                } else {
                    // Scoped error: the stale dataset stays usable.
                    self.status = Status::READY;
                }
                self.set_status_message(format!("Load failed: {e} (press r to retry)"));
            }
        }
    }

    fn rebuild_columns(&mut self) {
        let mut specs = columns::view_columns(self.store.original_columns());
        // Sticky columns are pinned in front so horizontal scrolling
        // never hides them.
        specs.sort_by_key(|s| !s.sticky);
        self.n_sticky = specs.iter().filter(|s| s.sticky && s.visible).count();
        self.cols = specs
            .into_iter()
            .filter(|s| s.visible)
            .map(GridColumn::new)
            .collect();
        self.grid.offset_column = self.n_sticky;
        self.grid.curser_column = 0;
    }

    /// Re-run the filter engine over the store and repaginate.
    /// Every filter change restarts at page 1.
    fn recompute_visible(&mut self, reset_page: bool) {
        self.grid.visible_rows = filter::apply(self.store.rows(), &self.filter_state);
        if reset_page {
            self.grid.page.reset();
            self.grid.offset_row = 0;
            self.grid.curser_row = 0;
        }
        self.update_grid_data();
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
        self.uidata.last_update = Instant::now();
    }

    // ------------------------- update dispatch ------------------------- //

    pub fn update(&mut self, message: Message) -> Result<(), AppError> {
        if let Message::RawKey(key) = message {
            if self.modus == Modus::CMDINPUT {
                self.raw_input(key);
            }
            self.last_update = Instant::now();
            return Ok(());
        }

        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_grid_selection_down(1),
                Message::MoveUp => self.move_grid_selection_up(1),
                Message::MoveLeft => self.move_grid_selection_left(),
                Message::MoveRight => self.move_grid_selection_right(),
                Message::MovePageUp => self.move_grid_selection_up(self.uilayout.table_height + 1),
                Message::MovePageDown => {
                    self.move_grid_selection_down(self.uilayout.table_height + 1)
                }
                Message::MoveBeginning => self.move_grid_selection_beginning(),
                Message::MoveEnd => self.move_grid_selection_end(),
                Message::MoveToFirstColumn => self.move_to_first_column(),
                Message::MoveToLastColumn => self.move_to_last_column(),
                Message::NextPage => self.next_page(),
                Message::PrevPage => self.prev_page(),
                Message::Enter => self.enter(),
                Message::Exit => self.exit(),
                Message::EditCell => self.start_cell_edit(),
                Message::Duplicate => self.duplicate_record(),
                Message::Uploads => self.open_uploads(),
                Message::Rollups => self.open_rollups(),
                Message::Propagate => self.start_bulk_unit(),
                Message::Token => self.enter_cmd_mode(CMDMode::Token),
                Message::Search => self.enter_cmd_mode(CMDMode::SearchTable),
                Message::FacetFilter => self.build_facet_view(),
                Message::ClearFilters => self.clear_filters(),
                Message::SortAscending => self.sort_current_column(true),
                Message::SortDescending => self.sort_current_column(false),
                Message::ToggleColumnState => self.toggle_column_status(false),
                Message::ToggleExpandColumnState => self.toggle_column_status(true),
                Message::ToggleIndex => self.toggle_grid_index(),
                Message::CopyCell => self.copy_grid_cell(),
                Message::CopyRow => self.copy_grid_row(),
                Message::Reload => self.reload(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::RECORD => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_record_selection_down(1),
                Message::MoveUp => self.move_record_selection_up(1),
                Message::MoveLeft => self.previous_record(),
                Message::MoveRight => self.next_record(),
                Message::MovePageUp => self.move_record_selection_up(10),
                Message::MovePageDown => self.move_record_selection_down(10),
                Message::CopyCell => self.copy_record_cell(),
                Message::Reload => self.refresh_record(),
                Message::Delete => self.delete_current_record(),
                Message::Propagate => self.propagate_employee(),
                Message::Help => self.show_help(),
                Message::Exit | Message::Enter => self.exit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::FACET => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_facet_selection_down(1),
                Message::MoveUp => self.move_facet_selection_up(1),
                Message::MovePageUp => self.move_facet_selection_up(10),
                Message::MovePageDown => self.move_facet_selection_down(10),
                Message::Enter => self.toggle_facet_value(),
                Message::ClearFilters => self.clear_current_facet(),
                Message::Exit => self.exit(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::UPLOADS => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_upload_selection_down(1),
                Message::MoveUp => self.move_upload_selection_up(1),
                Message::MovePageUp => self.move_upload_selection_up(10),
                Message::MovePageDown => self.move_upload_selection_down(10),
                Message::Delete => self.delete_current_batch(),
                Message::Exit | Message::Enter => self.exit(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::ROLLUP => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_rollup_selection_down(1),
                Message::MoveUp => self.move_rollup_selection_up(1),
                Message::MovePageUp => self.move_rollup_selection_up(10),
                Message::MovePageDown => self.move_rollup_selection_down(10),
                Message::Exit | Message::Enter => self.exit(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => self.exit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CMDINPUT => (),
        }

        self.last_update = Instant::now();
        Ok(())
    }

    // --------------------------- view updates -------------------------- //

    fn update_grid_data(&mut self) {
        self.grid.width = self.uilayout.table_width;
        self.grid.heigh = self.uilayout.table_height;

        let grid = &mut self.grid;
        grid.page_view = pager::paginate(grid.visible_rows.len(), &grid.page);
        grid.page.page = grid.page_view.page;

        // Clamp the vertical window into the current page slice.
        let page_len = grid.page_len();
        if page_len == 0 {
            grid.offset_row = 0;
            grid.curser_row = 0;
        } else {
            grid.offset_row = grid.offset_row.min(page_len.saturating_sub(1));
            let window = std::cmp::min(grid.heigh, page_len - grid.offset_row);
            grid.curser_row = grid.curser_row.min(window.saturating_sub(1));
        }

        let rbegin = grid.page_view.start + grid.offset_row;
        let rend = std::cmp::min(rbegin + grid.heigh, grid.page_view.end);

        trace!(
            "Grid: page {}/{}, Cr {}, Cc {}, Or {}, Oc {}, Rb {}, Re {}, w {}, h {}",
            grid.page_view.page,
            grid.page_view.total_pages,
            grid.curser_row,
            grid.curser_column,
            grid.offset_row,
            grid.offset_column,
            rbegin,
            rend,
            grid.width,
            grid.heigh,
        );

        // Cell texts for the rendered window, column by column.
        let rows = self.store.rows();
        let mut window_cells: Vec<Vec<String>> = Vec::with_capacity(self.cols.len());
        for col in self.cols.iter_mut() {
            let data: Vec<String> = grid.visible_rows[rbegin..rend]
                .iter()
                .map(|&ridx| columns::cell_text(&rows[ridx], &col.spec.key))
                .collect();
            let header = col.header();
            col.max_width = data
                .iter()
                .map(|s| s.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            col.render_width = Self::calculate_column_width(col, self.config.max_column_width);
            window_cells.push(data);
        }

        // Sticky columns are always visible, the rest fills the remaining
        // width starting at the horizontal offset.
        grid.offset_column = grid.offset_column.clamp(
            self.n_sticky,
            self.cols.len().saturating_sub(1).max(self.n_sticky),
        );
        grid.visible_columns = Vec::new();
        let mut visible_width = 0;
        for cidx in (0..self.n_sticky).chain(grid.offset_column..self.cols.len()) {
            let column = &mut self.cols[cidx];
            if visible_width + (column.render_width + 1) <= self.uilayout.table_width {
                grid.visible_columns.push(cidx);
                visible_width += column.render_width + 1;
            } else {
                // Add the last partial visible column
                if visible_width < self.uilayout.table_width {
                    let remaining_width = self.uilayout.table_width - visible_width;
                    grid.visible_columns.push(cidx);
                    visible_width += remaining_width;
                    column.render_width = remaining_width;
                }
                break;
            }
        }
        grid.visible_width = visible_width;

        if !grid.visible_columns.is_empty() {
            grid.curser_column = std::cmp::min(grid.curser_column, grid.visible_columns.len() - 1);
        } else {
            grid.curser_column = 0;
        }

        grid.data.clear();
        for &idx in grid.visible_columns.iter() {
            let column = &self.cols[idx];
            if column.status == ColumnStatus::COLLAPSED {
                grid.data.push(Self::get_collapsed_column(rend - rbegin));
            } else {
                let col_data = window_cells[idx]
                    .iter()
                    .map(|s| s.clone())
                    .collect::<Vec<String>>();
                let name = Self::get_visible_name(column.header(), column.render_width);
                grid.data.push(ColumnView {
                    name,
                    width: column.render_width,
                    data: col_data,
                });
            }
        }

        grid.build_index();
        let index_width = if grid.show_index { grid.index.width } else { 0 };
        if index_width != self.uilayout.index_width {
            self.uilayout =
                UILayout::from_values(index_width, self.uilayout.width, self.uilayout.height);
        }
        self.update_uidata_for_grid();
    }

    fn update_uidata_for_grid(&mut self) {
        let grid = &self.grid;
        let scope_name = match self.config.client_id {
            Some(id) => format!("client {id}"),
            None => "no client".to_string(),
        };
        self.uidata = UIData {
            name: if self.filter_state.is_active() {
                format!("F[{scope_name}]")
            } else {
                scope_name
            },
            table: grid.data.clone(),
            index: grid.index.clone(),
            nrows: grid.visible_rows.len(),
            selected_row: grid.curser_row,
            selected_column: grid.curser_column,
            abs_selected_row: grid.selected_subset_idx(),
            show_popup: false,
            popup_message: String::new(),
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            last_update: Instant::now(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            page: grid.page_view.page,
            total_pages: grid.page_view.total_pages,
            page_window: grid.page_view.window.clone(),
            display_range: grid.page_view.display_range.clone(),
            filter_active: self.filter_state.is_active(),
        };
    }

    fn get_collapsed_column(nrows: usize) -> ColumnView {
        let data = vec!["⋮".to_string(); nrows];
        ColumnView {
            name: "...".to_string(),
            width: 3,
            data,
        }
    }

    fn get_visible_name(name: String, width: usize) -> String {
        if width < 3 {
            return "".to_string();
        }
        let chars: Vec<char> = name.chars().collect();
        if chars.len() > width {
            let mut reduced: String = chars[0..width - 3].iter().collect();
            reduced.push_str("...");
            reduced
        } else {
            name
        }
    }

    fn calculate_column_width(column: &GridColumn, max_column_width: usize) -> usize {
        let width = column.max_width + COLUMN_WIDTH_MARGIN;
        match column.status {
            ColumnStatus::COLLAPSED => COLUMN_WIDTH_COLLAPSED_COLUMN,
            ColumnStatus::NORMAL => std::cmp::min(width, max_column_width),
            ColumnStatus::EXPANDED => width,
        }
    }

    // ----------------------- error/scope handling ---------------------- //

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_model(self, width, height);
        self.input.set_width(self.uilayout.statusline_width);
        match self.modus {
            Modus::TABLE => self.update_grid_data(),
            Modus::RECORD => self.update_record_data(),
            Modus::FACET => self.update_facet_view(),
            Modus::UPLOADS => self.update_upload_view(),
            Modus::ROLLUP => self.update_rollup_view(),
            Modus::POPUP => {}
            Modus::CMDINPUT => {}
        }
    }

    // ------------------------- modus switching ------------------------- //

    fn enter(&mut self) {
        if self.grid.page_len() == 0 {
            return;
        }
        let record_idx = self.grid.selected_subset_idx();
        self.build_record_view(record_idx);
        self.previous_modus = Modus::TABLE;
        self.modus = Modus::RECORD;
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {}
            Modus::RECORD => {
                self.previous_modus = Modus::RECORD;
                self.modus = Modus::TABLE;
                self.update_grid_data();
            }
            Modus::FACET => {
                self.previous_modus = Modus::FACET;
                self.modus = Modus::TABLE;
                self.recompute_visible(true);
            }
            Modus::UPLOADS | Modus::ROLLUP => {
                self.previous_modus = self.modus;
                self.modus = Modus::TABLE;
                self.update_grid_data();
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
                self.uidata.show_popup = false;
                self.uidata.last_update = Instant::now();
            }
            Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    // ----------------------------- input ------------------------------- //

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?}", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        if mode == CMDMode::SearchTable
            && let Some(term) = self.filter_state.search_term()
        {
            self.input.set(term);
        }
        self.last_input = self.input.get();
        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.cmd_mode = self.cmd_mode;
        self.uidata.last_update = Instant::now();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
            self.uidata.cmdinput = self.last_input.clone();
            self.uidata.cmd_mode = self.cmd_mode;
            self.uidata.last_update = Instant::now();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.last_update = Instant::now();

        let canceled = self.last_input.canceled;
        let cmd_input = self.last_input.input.clone();
        let mode = self.cmd_mode.take();
        match mode {
            Some(CMDMode::SearchTable) => {
                if !canceled {
                    self.filter_state.set_search(&cmd_input);
                    self.recompute_visible(true);
                    let found = self.grid.visible_rows.len();
                    if self.filter_state.search_term().is_some() {
                        self.set_status_message(format!("Found {found} matching records"));
                    } else {
                        self.set_status_message("Search cleared".to_string());
                    }
                }
            }
            Some(CMDMode::EditCell) => {
                self.finish_cell_edit(canceled, &cmd_input);
            }
            Some(CMDMode::BulkUnit) => {
                let unit = cmd_input.trim();
                if !canceled && !unit.is_empty() {
                    self.bulk_set_unit(unit.to_string());
                }
            }
            Some(CMDMode::Token) => {
                let token = cmd_input.trim();
                if !canceled && !token.is_empty() {
                    self.api.set_token(Some(token.to_string()));
                    self.set_status_message("Token replaced".to_string());
                    self.reload();
                }
            }
            None => {
                warn!("Cmd input without mode");
            }
        }
    }

    // --------------------------- inline edit --------------------------- //

    fn start_cell_edit(&mut self) {
        if self.grid.page_len() == 0 {
            return;
        }
        let Some(&cidx) = self.grid.visible_columns.get(self.grid.curser_column) else {
            return;
        };
        let spec = self.cols[cidx].spec.clone();
        if !spec.editable {
            self.set_status_message(format!("Column \"{}\" is not editable", spec.label));
            return;
        }
        let ridx = self.grid.visible_rows[self.grid.selected_subset_idx()];
        let record = &self.store.rows()[ridx];
        let row_id = record.id;
        let current = columns::cell_text(record, &spec.key);
        let prefill = if current == format::PLACEHOLDER {
            String::new()
        } else {
            current.clone()
        };

        self.pending_edit = Some(PendingEdit {
            row_id,
            column_key: spec.key.clone(),
            original: current,
        });
        self.enter_cmd_mode(CMDMode::EditCell);
        self.input.set(&prefill);
        self.last_input = self.input.get();
        self.uidata.cmdinput = self.last_input.clone();
    }

    fn finish_cell_edit(&mut self, canceled: bool, input: &str) {
        let Some(pending) = self.pending_edit.take() else {
            return;
        };
        if canceled {
            // Revert: the buffer is dropped, the cell falls back to the
            // stored value on the next redraw.
            self.set_status_message("Edit canceled".to_string());
            self.update_grid_data();
            return;
        }
        let Some(spec) = self
            .cols
            .iter()
            .map(|c| &c.spec)
            .find(|s| s.key == pending.column_key)
            .cloned()
        else {
            return;
        };
        let api = &self.api;
        let row_id = pending.row_id;
        let result = edit::commit_edit(&mut self.store, &spec, row_id, input, |field, value| {
            api.update_record_field(row_id, field, value)
        });
        match result {
            Ok(()) => {
                debug!("Edit accepted for record {row_id}, field {}", spec.key);
                self.recompute_visible(false);
                self.set_status_message(format!("Saved {}", spec.label));
            }
            Err(e) => {
                warn!("Edit rejected for record {row_id}: {e}");
                self.update_grid_data();
                self.set_status_message(format!(
                    "Edit failed ({e}), value reverted to \"{}\"",
                    pending.original
                ));
            }
        }
    }

    // -------------------------- gateway actions ------------------------ //

    /// Id of the row under the grid cursor.
    fn selected_row_id(&self) -> Option<i64> {
        if self.grid.page_len() == 0 {
            return None;
        }
        let ridx = self.grid.visible_rows[self.grid.selected_subset_idx()];
        Some(self.store.rows()[ridx].id)
    }

    /// Id of the row the record view is showing.
    fn record_view_row_id(&self) -> Option<i64> {
        let &ridx = self.grid.visible_rows.get(self.record_view.record_idx)?;
        Some(self.store.rows()[ridx].id)
    }

    /// Create a new record on the backend, seeded from the selected row.
    /// The backend assigns the id; the returned record joins the dataset.
    fn duplicate_record(&mut self) {
        let Some(client_id) = self.config.client_id else {
            return;
        };
        let Some(row_id) = self.selected_row_id() else {
            return;
        };
        let Some(record) = self.store.row_by_id(row_id).cloned() else {
            return;
        };
        let new = NewRecord {
            client_id,
            record: &record,
        };
        match self.api.create_record(&new) {
            Ok(created) => {
                let id = created.id;
                info!("Created record {id} from {row_id}");
                self.store.push_row(created);
                self.recompute_visible(false);
                self.set_status_message(format!("Created record {id} from record {row_id}"));
            }
            Err(e) => {
                warn!("Create from record {row_id} failed: {e}");
                self.set_status_message(format!("Create failed: {e}"));
            }
        }
    }

    /// Re-fetch the open record and swap in the backend's version.
    fn refresh_record(&mut self) {
        let Some(row_id) = self.record_view_row_id() else {
            return;
        };
        let fetched = self
            .api
            .get_record(row_id)
            .map_err(AppError::from)
            .and_then(|record| self.store.replace_row(record));
        match fetched {
            Ok(()) => {
                self.update_record_data();
                self.set_status_message(format!("Record {row_id} refreshed"));
            }
            Err(e) => {
                warn!("Refresh of record {row_id} failed: {e}");
                self.set_status_message(format!("Refresh failed: {e}"));
            }
        }
    }

    /// Delete the open record on the backend and drop it locally.
    fn delete_current_record(&mut self) {
        let Some(row_id) = self.record_view_row_id() else {
            return;
        };
        match self.api.delete_record(row_id) {
            Ok(()) => {
                info!("Deleted record {row_id}");
                self.store.remove_row(row_id);
                self.previous_modus = Modus::RECORD;
                self.modus = Modus::TABLE;
                self.recompute_visible(false);
                self.set_status_message(format!("Record {row_id} deleted"));
            }
            Err(e) => {
                warn!("Delete of record {row_id} failed: {e}");
                self.set_status_message(format!("Delete failed: {e}"));
            }
        }
    }

    /// Overwrite gender and unit on every record of the open record's
    /// employee with the values shown here, then reload.
    fn propagate_employee(&mut self) {
        let Some(client_id) = self.config.client_id else {
            return;
        };
        let Some(row_id) = self.record_view_row_id() else {
            return;
        };
        let Some(record) = self.store.row_by_id(row_id) else {
            return;
        };
        let name = record.name.clone();
        let gender = record.gender.clone();
        let unit = record.unit.clone();
        match self
            .api
            .update_employee(&name, client_id, gender.as_deref(), Some(&unit))
        {
            Ok(()) => {
                info!("Propagated gender/unit of record {row_id} to {name}");
                self.previous_modus = Modus::RECORD;
                self.modus = Modus::TABLE;
                self.reload();
                self.set_status_message(format!("Updated every record of {name}"));
            }
            Err(e) => {
                warn!("Employee update for {name} failed: {e}");
                self.set_status_message(format!("Employee update failed: {e}"));
            }
        }
    }

    fn start_bulk_unit(&mut self) {
        if self.config.client_id.is_none() || self.grid.visible_rows.is_empty() {
            self.set_status_message("Nothing to update".to_string());
            return;
        }
        self.enter_cmd_mode(CMDMode::BulkUnit);
    }

    /// Move every employee of the filtered subset to one unit.
    fn bulk_set_unit(&mut self, unit: String) {
        let Some(client_id) = self.config.client_id else {
            return;
        };
        let rows = self.store.rows();
        let mut names: Vec<String> = self
            .grid
            .visible_rows
            .iter()
            .map(|&ridx| rows[ridx].name.clone())
            .collect();
        names.sort();
        names.dedup();
        match self
            .api
            .update_employees_bulk(client_id, &names, None, Some(&unit))
        {
            Ok(()) => {
                let n = names.len();
                info!("Moved {n} employees to unit {unit}");
                self.reload();
                self.set_status_message(format!("Moved {n} employees to {unit}"));
            }
            Err(e) => {
                warn!("Bulk unit update failed: {e}");
                self.set_status_message(format!("Bulk update failed: {e}"));
            }
        }
    }

    // --------------------------- upload batches ------------------------ //

    fn open_uploads(&mut self) {
        let Some(client_id) = self.config.client_id else {
            self.set_status_message("No client selected. Start with --client-id.".to_string());
            return;
        };
        match self.api.list_uploads(client_id) {
            Ok(batches) => self.show_uploads(batches),
            Err(e) => {
                warn!("Upload listing failed: {e}");
                self.set_status_message(format!("Upload listing failed: {e}"));
            }
        }
    }

    fn show_uploads(&mut self, batches: Vec<UploadBatch>) {
        if batches.is_empty() {
            self.set_status_message("No upload batches for this client".to_string());
            return;
        }
        self.batch_view = BatchView {
            batches,
            curser_row: 0,
            curser_offset: 0,
            height: self.uilayout.table_height,
        };
        self.previous_modus = self.modus;
        self.modus = Modus::UPLOADS;
        self.update_upload_view();
    }

    fn update_upload_view(&mut self) {
        let view = &mut self.batch_view;
        view.height = self.uilayout.table_height;
        let len = view.batches.len();
        view.curser_offset = view.curser_offset.min(len.saturating_sub(1));
        let window = std::cmp::min(view.height, len - view.curser_offset);
        view.curser_row = view.curser_row.min(window.saturating_sub(1));

        let rbegin = view.curser_offset;
        let rend = std::cmp::min(rbegin + view.height, len);
        let slice = &view.batches[rbegin..rend];

        let files: Vec<String> = slice.iter().map(|b| b.filename.clone()).collect();
        let months: Vec<String> = slice.iter().map(|b| b.reference_month.clone()).collect();
        let counts: Vec<String> = slice.iter().map(|b| b.record_count.to_string()).collect();
        let dates: Vec<String> = slice
            .iter()
            .map(|b| match &b.uploaded_at {
                Some(d) => d.format("%d/%m/%Y %H:%M").to_string(),
                None => format::PLACEHOLDER.to_string(),
            })
            .collect();

        let table = vec![
            Self::list_column("Arquivo", files),
            Self::list_column("Mês", months),
            Self::list_column("Registros", counts),
            Self::list_column("Enviado em", dates),
        ];
        let selected_row = view.curser_row;
        let abs_selected_row = view.curser_offset + view.curser_row;

        self.uidata.name = "Uploads".to_string();
        self.uidata.table = table;
        self.uidata.index = ColumnView::empty();
        self.uidata.nrows = len;
        self.uidata.selected_row = selected_row;
        self.uidata.selected_column = 0;
        self.uidata.abs_selected_row = abs_selected_row;
        self.uidata.last_update = Instant::now();
    }

    /// Delete the selected batch; its records go with it on the backend,
    /// so the dataset reloads afterwards.
    fn delete_current_batch(&mut self) {
        let (id, filename) = {
            let view = &self.batch_view;
            if view.batches.is_empty() {
                return;
            }
            let batch = &view.batches[view.curser_offset + view.curser_row];
            (batch.id, batch.filename.clone())
        };
        match self.api.delete_upload(id) {
            Ok(()) => {
                info!("Deleted upload batch {id} ({filename})");
                self.previous_modus = Modus::UPLOADS;
                self.modus = Modus::TABLE;
                self.reload();
                self.set_status_message(format!("Upload {filename} deleted"));
            }
            Err(e) => {
                warn!("Delete of upload {id} failed: {e}");
                self.set_status_message(format!("Upload delete failed: {e}"));
            }
        }
    }

    fn move_upload_selection_up(&mut self, size: usize) {
        let view = &mut self.batch_view;
        if view.curser_row > 0 {
            view.curser_row = view.curser_row.saturating_sub(size);
        } else if view.curser_offset > 0 {
            view.curser_offset = view.curser_offset.saturating_sub(size);
        }
        self.update_upload_view();
    }

    fn move_upload_selection_down(&mut self, size: usize) {
        let view = &mut self.batch_view;
        if view.batches.is_empty() {
            return;
        }
        if view.curser_row + view.curser_offset < view.batches.len() - 1 {
            if view.curser_row < view.height.saturating_sub(1) {
                view.curser_row += size;
            } else {
                view.curser_offset += size;
            }
            // update_upload_view clamps into the window.
            self.update_upload_view();
        }
    }

    // ------------------------- employee rollups ------------------------ //

    fn open_rollups(&mut self) {
        let Some(client_id) = self.config.client_id else {
            self.set_status_message("No client selected. Start with --client-id.".to_string());
            return;
        };
        match self.api.employee_rollups(client_id, None, None) {
            Ok(rollups) => self.show_rollups(rollups),
            Err(e) => {
                warn!("Rollup load failed: {e}");
                self.set_status_message(format!("Rollup load failed: {e}"));
            }
        }
    }

    fn show_rollups(&mut self, rollups: Vec<EmployeeRollup>) {
        if rollups.is_empty() {
            self.set_status_message("No employee totals for this client".to_string());
            return;
        }
        self.rollup_view = RollupView {
            rollups,
            curser_row: 0,
            curser_offset: 0,
            height: self.uilayout.table_height,
        };
        self.previous_modus = self.modus;
        self.modus = Modus::ROLLUP;
        self.update_rollup_view();
    }

    fn update_rollup_view(&mut self) {
        let view = &mut self.rollup_view;
        view.height = self.uilayout.table_height;
        let len = view.rollups.len();
        view.curser_offset = view.curser_offset.min(len.saturating_sub(1));
        let window = std::cmp::min(view.height, len - view.curser_offset);
        view.curser_row = view.curser_row.min(window.saturating_sub(1));

        let rbegin = view.curser_offset;
        let rend = std::cmp::min(rbegin + view.height, len);
        let slice = &view.rollups[rbegin..rend];

        let names: Vec<String> = slice.iter().map(|r| r.name.clone()).collect();
        let units: Vec<String> = slice
            .iter()
            .map(|r| match &r.unit {
                Some(u) => u.clone(),
                None => format::PLACEHOLDER.to_string(),
            })
            .collect();
        let absences: Vec<String> = slice.iter().map(|r| r.absence_count.to_string()).collect();
        let days: Vec<String> = slice
            .iter()
            .map(|r| format::format_number(r.lost_days))
            .collect();
        let hours: Vec<String> = slice
            .iter()
            .map(|r| format::format_number(r.lost_hours))
            .collect();

        let table = vec![
            Self::list_column("Funcionário", names),
            Self::list_column("Setor", units),
            Self::list_column("Faltas", absences),
            Self::list_column("Dias perdidos", days),
            Self::list_column("Horas perdidas", hours),
        ];
        let selected_row = view.curser_row;
        let abs_selected_row = view.curser_offset + view.curser_row;

        self.uidata.name = "Totais por funcionário".to_string();
        self.uidata.table = table;
        self.uidata.index = ColumnView::empty();
        self.uidata.nrows = len;
        self.uidata.selected_row = selected_row;
        self.uidata.selected_column = 0;
        self.uidata.abs_selected_row = abs_selected_row;
        self.uidata.last_update = Instant::now();
    }

    fn move_rollup_selection_up(&mut self, size: usize) {
        let view = &mut self.rollup_view;
        if view.curser_row > 0 {
            view.curser_row = view.curser_row.saturating_sub(size);
        } else if view.curser_offset > 0 {
            view.curser_offset = view.curser_offset.saturating_sub(size);
        }
        self.update_rollup_view();
    }

    fn move_rollup_selection_down(&mut self, size: usize) {
        let view = &mut self.rollup_view;
        if view.rollups.is_empty() {
            return;
        }
        if view.curser_row + view.curser_offset < view.rollups.len() - 1 {
            if view.curser_row < view.height.saturating_sub(1) {
                view.curser_row += size;
            } else {
                view.curser_offset += size;
            }
            self.update_rollup_view();
        }
    }

    fn list_column(name: &str, data: Vec<String>) -> ColumnView {
        let width = data
            .iter()
            .map(|s| s.chars().count())
            .chain(std::iter::once(name.chars().count()))
            .max()
            .unwrap_or(0)
            + COLUMN_WIDTH_MARGIN;
        ColumnView {
            name: name.to_string(),
            width,
            data,
        }
    }

    // ----------------------------- filters ----------------------------- //

    fn clear_filters(&mut self) {
        self.filter_state.clear();
        self.recompute_visible(true);
        self.set_status_message("Filters cleared".to_string());
    }

    fn build_facet_view(&mut self) {
        let Some(&cidx) = self.grid.visible_columns.get(self.grid.curser_column) else {
            return;
        };
        let key = self.cols[cidx].spec.key.clone();

        // Candidate values come from the rows the OTHER dimensions leave
        // visible, so values excluded by this column's own filter can be
        // re-selected.
        let mut others = self.filter_state.clone();
        others.clear_column(&key);
        let subset = filter::apply(self.store.rows(), &others);
        let counts = filter::facet_counts(self.store.rows(), &subset, &key);
        if counts.is_empty() {
            self.set_status_message("No values to filter on".to_string());
            return;
        }

        let facet = &mut self.facet_view;
        facet.column_idx = cidx;
        facet.universe = counts.iter().map(|(v, _)| v.clone()).collect();
        let total = subset.len().max(1);
        facet.counts = counts
            .iter()
            .map(|(_, c)| format!("{:.0}% {}", *c as f64 * 100.0 / total as f64, c))
            .collect();
        facet.values = counts.into_iter().map(|(v, _)| v).collect();
        facet.curser_row = 0;
        facet.curser_offset = 0;
        facet.height = self.uilayout.table_height;
        facet.width = self.uilayout.table_width;

        self.previous_modus = self.modus;
        self.modus = Modus::FACET;
        self.update_facet_view();
    }

    fn update_facet_view(&mut self) {
        let accepted = {
            let key = &self.cols[self.facet_view.column_idx].spec.key;
            self.filter_state.accepted(key).cloned()
        };
        let facet = &mut self.facet_view;
        facet.height = self.uilayout.table_height;
        facet.width = self.uilayout.table_width;

        // Clamp the cursor into the rendered window, like the grid does.
        // Page moves near the end of the list can overshoot otherwise.
        let len = facet.values.len();
        facet.curser_offset = facet.curser_offset.min(len.saturating_sub(1));
        let window = std::cmp::min(facet.height, len - facet.curser_offset);
        facet.curser_row = facet.curser_row.min(window.saturating_sub(1));

        let rbegin = facet.curser_offset;
        let rend = std::cmp::min(rbegin + facet.height, len);

        let marked: Vec<String> = facet.values[rbegin..rend]
            .iter()
            .map(|v| {
                let selected = match &accepted {
                    Some(set) => set.contains(v),
                    None => true,
                };
                if selected {
                    format!("[x] {v}")
                } else {
                    format!("[ ] {v}")
                }
            })
            .collect();

        facet.count_width = facet
            .counts
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        facet.count_view = ColumnView {
            name: "Counts".to_string(),
            data: facet.counts[rbegin..rend].to_vec(),
            width: facet.count_width,
        };

        facet.value_width = facet.width.saturating_sub(facet.count_width);
        facet.value_view = ColumnView {
            name: "Values".to_string(),
            data: marked,
            width: facet.value_width,
        };

        self.update_uidata_for_facet();
    }

    fn update_uidata_for_facet(&mut self) {
        let facet = &self.facet_view;
        let label = self.cols[facet.column_idx].spec.label.clone();
        let uidata = &mut self.uidata;
        uidata.name = format!("Filter[{label}]");
        uidata.table = vec![facet.value_view.clone(), facet.count_view.clone()];
        uidata.selected_column = 0;
        uidata.nrows = facet.values.len();
        uidata.selected_row = facet.curser_row;
        uidata.abs_selected_row = facet.curser_row + facet.curser_offset;
        uidata.last_update = Instant::now();
    }

    fn toggle_facet_value(&mut self) {
        let (key, value, universe) = {
            let facet = &self.facet_view;
            if facet.values.is_empty() {
                return;
            }
            let key = self.cols[facet.column_idx].spec.key.clone();
            let value = facet.values[facet.curser_offset + facet.curser_row].clone();
            (key, value, facet.universe.clone())
        };
        self.filter_state.toggle_value(&key, &value, &universe);
        self.update_facet_view();
    }

    fn clear_current_facet(&mut self) {
        let key = self.cols[self.facet_view.column_idx].spec.key.clone();
        self.filter_state.clear_column(&key);
        self.update_facet_view();
    }

    fn move_facet_selection_up(&mut self, size: usize) {
        let facet = &mut self.facet_view;
        if facet.curser_row > 0 {
            facet.curser_row = facet.curser_row.saturating_sub(size);
        } else if facet.curser_offset > 0 {
            facet.curser_offset = facet.curser_offset.saturating_sub(size);
        }
        self.update_facet_view();
    }

    fn move_facet_selection_down(&mut self, size: usize) {
        let facet = &mut self.facet_view;
        if facet.values.is_empty() {
            return;
        }
        if facet.curser_row + facet.curser_offset < facet.values.len() - 1 {
            if facet.curser_row < facet.height.saturating_sub(1) {
                facet.curser_row = std::cmp::min(facet.curser_row + size, facet.values.len() - 1);
            } else {
                facet.curser_offset =
                    std::cmp::min(facet.curser_offset + size, facet.values.len() - 1);
                facet.curser_row = std::cmp::min(
                    facet.height - 1,
                    facet.values.len() - facet.curser_offset - 1,
                );
            }
            self.update_facet_view();
        }
    }

    // ------------------------------ sort ------------------------------- //

    fn sort_current_column(&mut self, ascending: bool) {
        let Some(&cidx) = self.grid.visible_columns.get(self.grid.curser_column) else {
            return;
        };
        let spec = &self.cols[cidx].spec;
        let rows = self.store.rows();

        let mut indexed: Vec<usize> = self.grid.visible_rows.clone();
        match spec.kind {
            columns::ColumnKind::Number => {
                indexed.sort_by(|&a, &b| {
                    let av = numeric_value(&rows[a], &spec.key);
                    let bv = numeric_value(&rows[b], &spec.key);
                    let ord = av.partial_cmp(&bv).unwrap_or(std::cmp::Ordering::Equal);
                    if ascending { ord } else { ord.reverse() }
                });
            }
            columns::ColumnKind::Date => {
                indexed.sort_by(|&a, &b| {
                    let av = date_value(&rows[a], &spec.key);
                    let bv = date_value(&rows[b], &spec.key);
                    let ord = av.cmp(&bv);
                    if ascending { ord } else { ord.reverse() }
                });
            }
            columns::ColumnKind::Text => {
                indexed.sort_by(|&a, &b| {
                    let av = columns::cell_text(&rows[a], &spec.key);
                    let bv = columns::cell_text(&rows[b], &spec.key);
                    if ascending { av.cmp(&bv) } else { bv.cmp(&av) }
                });
            }
        }
        let label = spec.label.clone();
        self.grid.visible_rows = indexed;
        self.grid.page.reset();
        self.grid.offset_row = 0;
        self.grid.curser_row = 0;
        self.update_grid_data();
        self.set_status_message(format!(
            "Sorted by {label} {}",
            if ascending { "ascending" } else { "descending" }
        ));
    }

    // --------------------------- navigation ---------------------------- //

    fn next_page(&mut self) {
        let len = self.grid.visible_rows.len();
        self.grid.page.next(len);
        self.grid.offset_row = 0;
        self.grid.curser_row = 0;
        self.update_grid_data();
    }

    fn prev_page(&mut self) {
        let len = self.grid.visible_rows.len();
        self.grid.page.prev(len);
        self.grid.offset_row = 0;
        self.grid.curser_row = 0;
        self.update_grid_data();
    }

    fn move_grid_selection_beginning(&mut self) {
        self.grid.curser_row = 0;
        self.grid.offset_row = 0;
        self.update_grid_data();
    }

    fn move_grid_selection_end(&mut self) {
        let page_len = self.grid.page_len();
        if page_len == 0 {
            return;
        }
        let grid = &mut self.grid;
        if page_len <= grid.heigh {
            grid.offset_row = 0;
            grid.curser_row = page_len - 1;
        } else {
            grid.offset_row = page_len - grid.heigh;
            grid.curser_row = grid.heigh - 1;
        }
        self.update_grid_data();
    }

    fn move_grid_selection_up(&mut self, size: usize) {
        let grid = &mut self.grid;
        if grid.curser_row > 0 {
            grid.curser_row = grid.curser_row.saturating_sub(size);
        } else if grid.offset_row > 0 {
            grid.offset_row = grid.offset_row.saturating_sub(size);
        }
        self.update_grid_data();
    }

    fn move_grid_selection_down(&mut self, size: usize) {
        let page_len = self.grid.page_len();
        if page_len == 0 {
            return;
        }
        let grid = &mut self.grid;
        if grid.curser_row + grid.offset_row < page_len - 1 {
            if grid.curser_row < grid.heigh.saturating_sub(1) {
                grid.curser_row = std::cmp::min(grid.curser_row + size, page_len - 1);
            } else {
                grid.offset_row = std::cmp::min(grid.offset_row + size, page_len - 1);
                grid.curser_row = std::cmp::min(
                    grid.heigh - 1,
                    page_len - grid.offset_row - 1,
                );
            }
            self.update_grid_data();
        }
    }

    fn move_grid_selection_left(&mut self) {
        let grid = &mut self.grid;
        if grid.curser_column > 0 {
            grid.curser_column -= 1;
        } else if grid.offset_column > self.n_sticky {
            grid.offset_column -= 1;
        }
        self.update_grid_data();
    }

    fn move_grid_selection_right(&mut self) {
        let grid = &mut self.grid;
        if grid.visible_columns.is_empty() {
            return;
        }
        let last_visible = *grid.visible_columns.last().unwrap_or(&0);
        if grid.curser_column < grid.visible_columns.len() - 1 {
            grid.curser_column += 1;
            self.update_grid_data();
        } else if last_visible < self.cols.len() - 1 {
            grid.offset_column += 1;
            self.update_grid_data();
        } else if grid.visible_width > grid.width && grid.offset_column < self.cols.len() - 1 {
            // The last column is wider than the screen, keep scrolling it in.
            grid.offset_column += 1;
            self.update_grid_data();
        }
    }

    fn move_to_first_column(&mut self) {
        self.grid.curser_column = 0;
        self.grid.offset_column = self.n_sticky;
        self.update_grid_data();
    }

    fn move_to_last_column(&mut self) {
        if self.cols.is_empty() {
            return;
        }
        self.grid.offset_column = self.cols.len() - 1;
        self.update_grid_data();
        self.grid.curser_column = self.grid.visible_columns.len().saturating_sub(1);
        self.update_grid_data();
    }

    fn toggle_grid_index(&mut self) {
        self.grid.show_index = !self.grid.show_index;
        self.uilayout = UILayout::from_model(self, self.uilayout.width, self.uilayout.height);
        self.update_grid_data();
    }

    fn toggle_column_status(&mut self, toggle_to_expand: bool) {
        let Some(&cidx) = self.grid.visible_columns.get(self.grid.curser_column) else {
            return;
        };
        let new_status = if toggle_to_expand {
            match self.cols[cidx].status {
                ColumnStatus::COLLAPSED => ColumnStatus::EXPANDED,
                ColumnStatus::NORMAL => ColumnStatus::EXPANDED,
                ColumnStatus::EXPANDED => ColumnStatus::COLLAPSED,
            }
        } else {
            match self.cols[cidx].status {
                ColumnStatus::COLLAPSED => ColumnStatus::NORMAL,
                ColumnStatus::NORMAL => ColumnStatus::COLLAPSED,
                ColumnStatus::EXPANDED => ColumnStatus::COLLAPSED,
            }
        };
        self.cols[cidx].status = new_status;
        self.update_grid_data();
    }

    // --------------------------- clipboard ----------------------------- //

    fn copy_grid_cell(&mut self) {
        if self.grid.page_len() == 0 {
            return;
        }
        let Some(&cidx) = self.grid.visible_columns.get(self.grid.curser_column) else {
            return;
        };
        let ridx = self.grid.visible_rows[self.grid.selected_subset_idx()];
        let cell = columns::cell_text(&self.store.rows()[ridx], &self.cols[cidx].spec.key);
        self.copy_to_clipboard(cell);
    }

    fn copy_grid_row(&mut self) {
        if self.grid.page_len() == 0 {
            return;
        }
        let ridx = self.grid.visible_rows[self.grid.selected_subset_idx()];
        let record = &self.store.rows()[ridx];
        let content = self
            .cols
            .iter()
            .map(|c| Self::wrap_cell_content(&columns::cell_text(record, &c.spec.key)))
            .collect::<Vec<String>>();
        self.copy_to_clipboard(content.join(","));
    }

    fn copy_record_cell(&mut self) {
        let record = &self.record_view;
        if record.row_data.is_empty() {
            return;
        }
        let cell = record.row_data[record.curser_offset + record.curser_row].clone();
        self.copy_to_clipboard(cell);
    }

    fn copy_to_clipboard(&mut self, content: String) {
        trace!("Cell content: {}", content);
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(content) {
                Ok(_) => self.set_status_message("Copied to clipboard".to_string()),
                Err(e) => {
                    warn!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Clipboard unavailable".to_string());
                }
            },
            None => self.set_status_message("Clipboard unavailable".to_string()),
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    // --------------------------- record view --------------------------- //

    fn build_record_view(&mut self, record_idx: usize) {
        trace!("Building record view for subset idx {record_idx}");
        let record = &mut self.record_view;
        record.header_data = self
            .cols
            .iter()
            .map(|c| {
                c.spec
                    .label
                    .chars()
                    .take(self.config.max_column_width)
                    .collect::<String>()
            })
            .collect();
        record.curser_offset = 0;
        record.curser_row = 0;
        record.record_idx = record_idx;
        record.height = self.uilayout.table_height;
        record.width = self.uilayout.table_width;
        record.header_width = record
            .header_data
            .iter()
            .map(|h| h.chars().count())
            .max()
            .unwrap_or(0);
        record.row_width = record.width.saturating_sub(record.header_width);

        self.update_record_data();
    }

    fn update_record_data(&mut self) {
        let rows = self.store.rows();
        let record = &mut self.record_view;
        let Some(&ridx) = self.grid.visible_rows.get(record.record_idx) else {
            return;
        };
        record.row_data = self
            .cols
            .iter()
            .map(|c| columns::cell_text(&rows[ridx], &c.spec.key))
            .collect();

        record.height = self.uilayout.table_height;
        let len = record.row_data.len();
        record.curser_offset = record.curser_offset.min(len.saturating_sub(1));
        let window = std::cmp::min(record.height, len - record.curser_offset);
        record.curser_row = record.curser_row.min(window.saturating_sub(1));

        let rbegin = record.curser_offset;
        let rend = std::cmp::min(rbegin + record.height, len);

        record.header_view = ColumnView {
            name: "Column".to_string(),
            data: record.header_data[rbegin..rend].to_vec(),
            width: record.header_width,
        };
        record.row_view = ColumnView {
            name: "Value".to_string(),
            data: record.row_data[rbegin..rend].to_vec(),
            width: record.row_width,
        };

        self.update_uidata_for_record();
    }

    fn update_uidata_for_record(&mut self) {
        let record = &self.record_view;
        self.uidata = UIData {
            name: format!("R[record {}]", record.record_idx + 1),
            table: vec![record.header_view.clone(), record.row_view.clone()],
            index: self.grid.index.clone(),
            nrows: self.grid.visible_rows.len(),
            selected_row: record.curser_row,
            selected_column: 1,
            abs_selected_row: record.record_idx,
            show_popup: false,
            popup_message: String::new(),
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            last_update: Instant::now(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            page: self.grid.page_view.page,
            total_pages: self.grid.page_view.total_pages,
            page_window: self.grid.page_view.window.clone(),
            display_range: self.grid.page_view.display_range.clone(),
            filter_active: self.filter_state.is_active(),
        };
    }

    fn move_record_selection_up(&mut self, size: usize) {
        let record = &mut self.record_view;
        if record.curser_row > 0 {
            record.curser_row = record.curser_row.saturating_sub(size);
        } else if record.curser_offset > 0 {
            record.curser_offset = record.curser_offset.saturating_sub(size);
        }
        self.update_record_data();
    }

    fn move_record_selection_down(&mut self, size: usize) {
        let record = &mut self.record_view;
        if record.row_data.is_empty() {
            return;
        }
        if record.curser_row + record.curser_offset < record.row_data.len() - 1 {
            if record.curser_row < record.height.saturating_sub(1) {
                record.curser_row =
                    std::cmp::min(record.curser_row + size, record.row_data.len() - 1);
            } else {
                record.curser_offset =
                    std::cmp::min(record.curser_offset + size, record.row_data.len() - 1);
                record.curser_row = std::cmp::min(
                    record.height - 1,
                    record.row_data.len() - record.curser_offset - 1,
                );
            }
            self.update_record_data();
        }
    }

    fn previous_record(&mut self) {
        let record = &mut self.record_view;
        if record.record_idx > 0 {
            record.record_idx -= 1;
        }
        self.update_record_data();
    }

    fn next_record(&mut self) {
        if self.record_view.record_idx + 1 < self.grid.visible_rows.len() {
            self.record_view.record_idx += 1;
        }
        self.update_record_data();
    }
}

fn numeric_value(record: &crate::records::AbsenceRecord, key: &str) -> f64 {
    match key {
        "duracao" => record.duration,
        "dias_perdidos" => record.lost_days,
        "horas_perdidas" => record.lost_hours,
        "upload_id" => record.upload_id as f64,
        _ => f64::NAN,
    }
}

fn date_value(
    record: &crate::records::AbsenceRecord,
    key: &str,
) -> Option<chrono::NaiveDate> {
    match key {
        "data_afastamento" => record.absence_start,
        "data_retorno" => record.return_date,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DatasetSnapshot;
    use crate::records::{AbsenceRecord, AbsenceType, DatasetStats};
    use ratatui::crossterm::event::KeyCode;

    fn record(id: i64, name: &str, unit: &str) -> AbsenceRecord {
        AbsenceRecord {
            id,
            name: name.to_string(),
            cpf: format!("{id:011}"),
            unit: unit.to_string(),
            role: "Operador".to_string(),
            gender: Some("F".to_string()),
            absence_start: None,
            return_date: None,
            absence_type: AbsenceType::Days,
            duration: 1.0,
            cid_code: None,
            cid_description: None,
            lost_days: 1.0,
            lost_hours: 8.0,
            upload_id: 1,
        }
    }

    fn model_with_rows(rows: Vec<AbsenceRecord>, page_size: usize) -> Model {
        let config = AppConfig {
            event_poll_time: 100,
            page_size,
            max_column_width: 40,
            api_url: "http://localhost:8000".to_string(),
            client_id: None,
            upload_id: None,
        };
        let api = ApiClient::new("http://localhost:8000", None);
        let mut model = Model::init(config, api, 160, 40).unwrap();
        model.store.apply_snapshot(
            1,
            DatasetSnapshot {
                rows,
                stats: DatasetStats::default(),
                original_columns: None,
            },
        );
        model.rebuild_columns();
        model.recompute_visible(true);
        model.status = Status::READY;
        model
    }

    fn dataset(n: usize) -> Vec<AbsenceRecord> {
        (0..n)
            .map(|i| {
                let unit = if i % 2 == 0 { "Produção" } else { "Logística" };
                record(i as i64 + 1, &format!("Pessoa {:03}", i + 1), unit)
            })
            .collect()
    }

    fn type_line(model: &mut Model, text: &str) {
        for c in text.chars() {
            model.update(Message::RawKey(KeyCode::Char(c).into())).unwrap();
        }
        model.update(Message::RawKey(KeyCode::Enter.into())).unwrap();
    }

    #[test]
    fn page_navigation_is_clamped() {
        let mut model = model_with_rows(dataset(25), 10);
        assert_eq!(model.get_uidata().page, 1);
        assert_eq!(model.get_uidata().total_pages, 3);
        assert_eq!(model.get_uidata().display_range, "1-10 of 25");

        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page, 2);
        model.update(Message::NextPage).unwrap();
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page, 3);
        assert_eq!(model.get_uidata().display_range, "21-25 of 25");

        model.update(Message::PrevPage).unwrap();
        assert_eq!(model.get_uidata().page, 2);
    }

    #[test]
    fn search_filters_and_resets_to_the_first_page() {
        let mut model = model_with_rows(dataset(25), 10);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page, 2);

        model.update(Message::Search).unwrap();
        assert!(model.raw_keyevents());
        type_line(&mut model, "pessoa 00");

        let uidata = model.get_uidata();
        assert_eq!(uidata.nrows, 9);
        assert_eq!(uidata.page, 1);
        assert!(uidata.filter_active);
    }

    #[test]
    fn clearing_the_search_restores_everything() {
        let mut model = model_with_rows(dataset(12), 10);
        model.update(Message::Search).unwrap();
        type_line(&mut model, "pessoa 001");
        assert_eq!(model.get_uidata().nrows, 1);

        model.update(Message::ClearFilters).unwrap();
        assert_eq!(model.get_uidata().nrows, 12);
        assert!(!model.get_uidata().filter_active);
    }

    #[test]
    fn a_canceled_search_changes_nothing() {
        let mut model = model_with_rows(dataset(12), 10);
        model.update(Message::Search).unwrap();
        for c in "xyz".chars() {
            model.update(Message::RawKey(KeyCode::Char(c).into())).unwrap();
        }
        model.update(Message::RawKey(KeyCode::Esc.into())).unwrap();
        assert_eq!(model.get_uidata().nrows, 12);
        assert!(!model.raw_keyevents());
    }

    #[test]
    fn facet_toggle_narrows_the_grid() {
        let mut model = model_with_rows(dataset(10), 10);
        // Move the cursor onto the unit column before opening the facet.
        let setor = model
            .grid
            .visible_columns
            .iter()
            .position(|&c| model.cols[c].spec.key == "setor");
        if let Some(pos) = setor {
            model.grid.curser_column = pos;
        }
        model.update(Message::FacetFilter).unwrap();

        // Both units have five rows each; deselect the one under the cursor.
        model.update(Message::Enter).unwrap();
        model.update(Message::Exit).unwrap();
        assert_eq!(model.get_uidata().nrows, 5);
        assert_eq!(model.get_uidata().page, 1);
    }

    #[test]
    fn facet_cursor_survives_page_jumps_at_the_list_end() {
        // 25 distinct units against a 20 row facet window.
        let rows = (0..25)
            .map(|i| {
                record(
                    i as i64 + 1,
                    &format!("Pessoa {:03}", i + 1),
                    &format!("Setor {i:02}"),
                )
            })
            .collect();
        let mut model = model_with_rows(rows, 50);
        model.update(Message::Resize(160, 24)).unwrap();

        let setor = model
            .grid
            .visible_columns
            .iter()
            .position(|&c| model.cols[c].spec.key == "setor");
        if let Some(pos) = setor {
            model.grid.curser_column = pos;
        }
        model.update(Message::FacetFilter).unwrap();
        assert_eq!(model.get_uidata().nrows, 25);

        // Page jumps past the end used to leave the cursor outside the
        // value list, so the following toggle indexed out of bounds.
        model.update(Message::MovePageDown).unwrap();
        model.update(Message::MovePageDown).unwrap();
        model.update(Message::MovePageDown).unwrap();
        model.update(Message::MoveUp).unwrap();
        model.update(Message::MovePageDown).unwrap();
        assert_eq!(model.get_uidata().abs_selected_row, 24);

        model.update(Message::Enter).unwrap();
        model.update(Message::Exit).unwrap();
        assert_eq!(model.get_uidata().nrows, 24);
    }

    #[test]
    fn record_view_cursor_stays_inside_the_window() {
        // 13 record fields against an 8 row window.
        let mut model = model_with_rows(dataset(3), 10);
        model.update(Message::Resize(160, 12)).unwrap();
        model.update(Message::Enter).unwrap();

        model.update(Message::MovePageDown).unwrap();
        model.update(Message::MovePageDown).unwrap();
        model.update(Message::MoveUp).unwrap();
        model.update(Message::MovePageDown).unwrap();
        assert!(model.record_view.curser_offset + model.record_view.curser_row < 13);

        // Copying reads the cell under the cursor and must stay in bounds.
        model.update(Message::CopyCell).unwrap();
    }

    #[test]
    fn sort_orders_the_visible_subset() {
        let mut rows = dataset(3);
        rows[0].name = "Carla".to_string();
        rows[1].name = "Ana".to_string();
        rows[2].name = "Bruno".to_string();
        let mut model = model_with_rows(rows, 10);

        model.update(Message::SortAscending).unwrap();
        assert_eq!(model.get_uidata().table[0].data[0], "Ana");
        model.update(Message::SortDescending).unwrap();
        assert_eq!(model.get_uidata().table[0].data[0], "Carla");
    }

    #[test]
    fn cursor_stays_inside_the_page() {
        let mut model = model_with_rows(dataset(25), 10);
        for _ in 0..50 {
            model.update(Message::MoveDown).unwrap();
        }
        // Arrow keys never cross a page boundary.
        assert_eq!(model.get_uidata().page, 1);
        assert_eq!(model.get_uidata().abs_selected_row, 9);

        model.update(Message::MoveEnd).unwrap();
        assert_eq!(model.get_uidata().abs_selected_row, 9);
        model.update(Message::MoveBeginning).unwrap();
        assert_eq!(model.get_uidata().abs_selected_row, 0);
    }

    #[test]
    fn record_view_opens_on_the_selected_row() {
        let mut model = model_with_rows(dataset(5), 10);
        model.update(Message::MoveDown).unwrap();
        model.update(Message::Enter).unwrap();
        let uidata = model.get_uidata();
        assert!(uidata.name.starts_with("R["));
        assert_eq!(uidata.table.len(), 2);
        assert!(uidata.table[1].data.contains(&"Pessoa 002".to_string()));

        model.update(Message::Exit).unwrap();
        assert!(!model.get_uidata().name.starts_with("R["));
    }

    fn batch(id: i64, filename: &str, records: u64) -> UploadBatch {
        UploadBatch {
            id,
            filename: filename.to_string(),
            reference_month: "2024-03".to_string(),
            uploaded_at: None,
            record_count: records,
        }
    }

    #[test]
    fn upload_batches_open_in_their_own_view() {
        let mut model = model_with_rows(dataset(5), 10);
        model.show_uploads(vec![
            batch(1, "faltas_jan.xlsx", 40),
            batch(2, "faltas_fev.xlsx", 38),
            batch(3, "faltas_mar.xlsx", 42),
        ]);

        let uidata = model.get_uidata();
        assert_eq!(uidata.name, "Uploads");
        assert_eq!(uidata.nrows, 3);
        assert!(uidata.table[0].data.contains(&"faltas_fev.xlsx".to_string()));

        // Selection clamps at the end of the batch list.
        model.update(Message::MovePageDown).unwrap();
        model.update(Message::MovePageDown).unwrap();
        assert_eq!(model.get_uidata().abs_selected_row, 2);

        model.update(Message::Exit).unwrap();
        assert_ne!(model.get_uidata().name, "Uploads");
        assert_eq!(model.get_uidata().nrows, 5);
    }

    #[test]
    fn rollup_totals_render_with_formatted_numbers() {
        let mut model = model_with_rows(dataset(5), 10);
        model.show_rollups(vec![
            EmployeeRollup {
                name: "Pessoa 001".to_string(),
                unit: Some("Produção".to_string()),
                absence_count: 3,
                lost_days: 1234.5,
                lost_hours: 9876.0,
            },
            EmployeeRollup {
                name: "Pessoa 002".to_string(),
                unit: None,
                absence_count: 1,
                lost_days: 2.0,
                lost_hours: 16.0,
            },
        ]);

        let uidata = model.get_uidata();
        assert_eq!(uidata.nrows, 2);
        assert!(uidata.table[3].data.contains(&"1.234,5".to_string()));
        // A missing unit renders as the placeholder.
        assert!(uidata.table[1].data.contains(&format::PLACEHOLDER.to_string()));

        model.update(Message::Exit).unwrap();
        assert_eq!(model.get_uidata().nrows, 5);
    }

    #[test]
    fn an_empty_batch_list_never_opens_the_view() {
        let mut model = model_with_rows(dataset(5), 10);
        model.show_uploads(Vec::new());
        assert_ne!(model.get_uidata().name, "Uploads");
        assert_eq!(model.get_uidata().nrows, 5);
    }
}
