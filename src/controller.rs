use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode};

use crate::domain::{AppConfig, AppError, Message};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, AppError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    // While line input is active the model consumes raw keys.
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up => Some(Message::MoveUp),
            KeyCode::Down => Some(Message::MoveDown),
            KeyCode::Left => Some(Message::MoveLeft),
            KeyCode::Right => Some(Message::MoveRight),
            KeyCode::PageUp => Some(Message::MovePageUp),
            KeyCode::PageDown => Some(Message::MovePageDown),
            KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Char('0') | KeyCode::Home => Some(Message::MoveToFirstColumn),
            KeyCode::Char('$') | KeyCode::End => Some(Message::MoveToLastColumn),
            KeyCode::Char('n') => Some(Message::NextPage),
            KeyCode::Char('p') => Some(Message::PrevPage),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char('e') => Some(Message::EditCell),
            KeyCode::Char('a') => Some(Message::Duplicate),
            KeyCode::Char('d') => Some(Message::Delete),
            KeyCode::Char('u') => Some(Message::Uploads),
            KeyCode::Char('R') => Some(Message::Rollups),
            KeyCode::Char('U') => Some(Message::Propagate),
            KeyCode::Char('t') => Some(Message::Token),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Char('f') => Some(Message::FacetFilter),
            KeyCode::Char('F') => Some(Message::ClearFilters),
            KeyCode::Char('s') => Some(Message::SortAscending),
            KeyCode::Char('S') => Some(Message::SortDescending),
            KeyCode::Char('x') => Some(Message::ToggleColumnState),
            KeyCode::Char('X') => Some(Message::ToggleExpandColumnState),
            KeyCode::Char('i') => Some(Message::ToggleIndex),
            KeyCode::Char('c') => Some(Message::CopyCell),
            KeyCode::Char('C') => Some(Message::CopyRow),
            KeyCode::Char('r') => Some(Message::Reload),
            KeyCode::Char('?') => Some(Message::Help),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
