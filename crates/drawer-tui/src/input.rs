//! Keyboard and mouse input mapping.
//!
//! | Input                        | Event                          |
//! |------------------------------|--------------------------------|
//! | `m`, `Enter`                 | open                           |
//! | `Esc`                        | close (escape)                 |
//! | `c`, click on `[x] Close`    | close (close button)           |
//! | `b`, click outside the panel | close (backdrop)               |
//! | `q`, `Ctrl+C`                | quit                           |

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use drawer_app::AppEvent;
use drawer_core::{CloseTrigger, MenuEvent};
use ratatui::layout::{Position, Rect};

use crate::ui;

/// Map a key press to an event. Releases and repeats are ignored.
pub fn map_key(key: KeyEvent) -> Option<AppEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(AppEvent::Quit),
        KeyCode::Char('q') => Some(AppEvent::Quit),
        KeyCode::Char('m') | KeyCode::Enter => Some(MenuEvent::Open.into()),
        KeyCode::Esc => Some(close(CloseTrigger::Escape)),
        KeyCode::Char('c') => Some(close(CloseTrigger::CloseButton)),
        KeyCode::Char('b') => Some(close(CloseTrigger::Backdrop)),
        _ => None,
    }
}

/// Map a left click on a screen of size `area` to an event.
///
/// Hit testing uses the fully open panel; the controller ignores closes that
/// arrive while the menu is not open.
pub fn map_mouse(mouse: MouseEvent, area: Rect) -> Option<AppEvent> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }

    let at = Position::new(mouse.column, mouse.row);
    let (page, _) = ui::screen_areas(area);
    if ui::close_button_area(area).contains(at) {
        Some(close(CloseTrigger::CloseButton))
    } else if page.contains(at) && !ui::panel_area(area).contains(at) {
        Some(close(CloseTrigger::Backdrop))
    } else {
        None
    }
}

fn close(trigger: CloseTrigger) -> AppEvent {
    MenuEvent::Close(trigger).into()
}
