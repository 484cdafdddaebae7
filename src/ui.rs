use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};

use crate::domain::CMDMode;
use crate::model::{ColumnView, Model, UIData};

// Statusline plus command line.
pub const CMDLINE_HEIGH: usize = 2;
// Title line plus column header line.
pub const TABLE_HEADER_HEIGHT: usize = 2;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2;
pub const COLUMN_WIDTH_COLLAPSED_COLUMN: usize = 3;

pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let area = frame.area();
        if area.height < (CMDLINE_HEIGH + TABLE_HEADER_HEIGHT) as u16 {
            return;
        }

        let title_area = Rect::new(area.x, area.y, area.width, 1);
        let header_y = area.y + 1;
        let body_y = area.y + TABLE_HEADER_HEIGHT as u16;
        let body_height = uidata.layout.table_height.min(
            area.height.saturating_sub((CMDLINE_HEIGH + TABLE_HEADER_HEIGHT) as u16) as usize,
        ) as u16;
        let status_y = body_y + body_height;

        self.draw_title(uidata, frame, title_area);

        let mut x = area.x;
        if uidata.layout.index_width > 0 {
            let index_area = Rect::new(
                x,
                body_y,
                uidata.layout.index_width.min(area.width as usize) as u16,
                body_height,
            );
            self.draw_index(uidata, frame, index_area);
            x += index_area.width;
        }

        for (cidx, column) in uidata.table.iter().enumerate() {
            if x >= area.x + area.width {
                break;
            }
            let width = (column.width as u16).min(area.x + area.width - x);
            self.draw_column(uidata, column, cidx, frame, x, header_y, body_y, body_height);
            x += width + 1;
        }

        self.draw_scrollbar(uidata, frame, area, body_y, body_height);
        self.draw_statusline(uidata, frame, Rect::new(area.x, status_y, area.width, 1));
        if status_y + 1 < area.y + area.height {
            self.draw_cmdline(
                uidata,
                frame,
                Rect::new(area.x, status_y + 1, area.width, 1),
            );
        }

        if uidata.show_popup {
            self.draw_popup(uidata, frame, area);
        }
    }

    fn draw_title(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::from(format!(" faltas [{}] ", uidata.name)).bold(),
            Span::from(format!("{} rows ", uidata.nrows)).dim(),
        ];
        if uidata.filter_active {
            spans.push(Span::from("filtered ").yellow());
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_index(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = uidata
            .index
            .data
            .iter()
            .enumerate()
            .map(|(ridx, number)| {
                let style = if ridx == uidata.selected_row {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default().dim()
                };
                Line::from(Span::styled(number.clone(), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_column(
        &self,
        uidata: &UIData,
        column: &ColumnView,
        cidx: usize,
        frame: &mut Frame,
        x: u16,
        header_y: u16,
        body_y: u16,
        body_height: u16,
    ) {
        let area = frame.area();
        let width = (column.width as u16).min(area.x + area.width - x);
        if width == 0 {
            return;
        }

        let header_style = if cidx == uidata.selected_column {
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::UNDERLINED)
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(column.name.clone(), header_style))),
            Rect::new(x, header_y, width, 1),
        );

        let lines: Vec<Line> = column
            .data
            .iter()
            .take(body_height as usize)
            .enumerate()
            .map(|(ridx, cell)| {
                let style = if ridx == uidata.selected_row && cidx == uidata.selected_column {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else if ridx == uidata.selected_row {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(cell.clone(), style))
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines),
            Rect::new(x, body_y, width, body_height),
        );
    }

    // A minimal thumb marking where the selection sits in the filtered
    // subset, drawn into the reserved rightmost column.
    fn draw_scrollbar(
        &self,
        uidata: &UIData,
        frame: &mut Frame,
        area: Rect,
        body_y: u16,
        body_height: u16,
    ) {
        if uidata.nrows == 0 || body_height == 0 {
            return;
        }
        let x = area.x + area.width - SCROLLBAR_WIDTH as u16;
        let thumb = (uidata.abs_selected_row * (body_height as usize - 1).max(1))
            / uidata.nrows.max(1);
        let lines: Vec<Line> = (0..body_height as usize)
            .map(|row| {
                if row == thumb.min(body_height as usize - 1) {
                    Line::from("█")
                } else {
                    Line::from(Span::from("│").dim())
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines),
            Rect::new(x, body_y, SCROLLBAR_WIDTH as u16, body_height),
        );
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans: Vec<Span> = vec![Span::from(" ")];
        for &page in uidata.page_window.iter() {
            if page == uidata.page {
                spans.push(Span::from(format!("[{page}]")).reversed());
            } else {
                spans.push(Span::from(format!(" {page} ")).dim());
            }
        }
        spans.push(Span::from(format!(
            "  page {}/{}  {}",
            uidata.page, uidata.total_pages, uidata.display_range
        )));
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
            area,
        );
    }

    fn draw_cmdline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prefix = match uidata.cmd_mode {
                Some(CMDMode::SearchTable) => "/",
                Some(CMDMode::EditCell) => "edit: ",
                Some(CMDMode::BulkUnit) => "setor: ",
                Some(CMDMode::Token) => "token: ",
                None => "",
            };
            let line = format!("{prefix}{}", uidata.cmdinput.input);
            frame.render_widget(Paragraph::new(line), area);
            let cursor_x = area.x
                + (prefix.chars().count() + uidata.cmdinput.curser_pos)
                    .min(area.width.saturating_sub(1) as usize) as u16;
            frame.set_cursor_position((cursor_x, area.y));
        } else {
            frame.render_widget(
                Paragraph::new(Span::from(uidata.status_message.clone()).dim()),
                area,
            );
        }
    }

    fn draw_popup(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let popup = Self::centered_rect(area, 50, 28);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.clone())
                .block(Block::bordered().title(" help (Esc to close) ")),
            popup,
        );
    }

    fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}

impl Default for TableUI {
    fn default() -> Self {
        Self::new()
    }
}
