use crate::model::Mode;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    SelectMode(Mode),
    CycleMode,
    ToggleAnimation,
    ToggleHud,
    Quit,
    /// Live drag translation from the press origin, in cell units.
    DragMoved { dx_cells: i32, dy_cells: i32 },
    DragEnded,
    /// Press and release without leaving the press cell.
    Tapped,
    Resized(u16, u16),
}

/// Tracks one mouse gesture across events so a release can be told
/// apart as tap vs drag end.
#[derive(Default)]
pub(crate) struct Pointer {
    pressed: bool,
    origin: (u16, u16),
    moved: bool,
}

pub(crate) fn collect_actions(pointer: &mut Pointer) -> anyhow::Result<Vec<Action>> {
    let mut out = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                if let Some(a) = map_key(k.code) {
                    out.push(a);
                }
            }
            Event::Mouse(m) => {
                if let Some(a) = apply_mouse(pointer, m.kind, m.column, m.row) {
                    out.push(a);
                }
            }
            Event::Resize(w, h) => out.push(Action::Resized(w, h)),
            _ => {}
        }
    }
    Ok(out)
}

fn map_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('1') => Some(Action::SelectMode(Mode::Single)),
        KeyCode::Char('2') => Some(Action::SelectMode(Mode::Clubbed)),
        KeyCode::Tab => Some(Action::CycleMode),
        KeyCode::Char(' ') => Some(Action::ToggleAnimation),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(Action::ToggleHud),
        _ => None,
    }
}

fn apply_mouse(pointer: &mut Pointer, kind: MouseEventKind, col: u16, row: u16) -> Option<Action> {
    match kind {
        MouseEventKind::Down(MouseButton::Left) => {
            pointer.pressed = true;
            pointer.origin = (col, row);
            pointer.moved = false;
            None
        }
        MouseEventKind::Drag(MouseButton::Left) if pointer.pressed => {
            let dx = col as i32 - pointer.origin.0 as i32;
            let dy = row as i32 - pointer.origin.1 as i32;
            if dx != 0 || dy != 0 {
                pointer.moved = true;
            }
            Some(Action::DragMoved {
                dx_cells: dx,
                dy_cells: dy,
            })
        }
        MouseEventKind::Up(MouseButton::Left) if pointer.pressed => {
            pointer.pressed = false;
            if pointer.moved {
                Some(Action::DragEnded)
            } else {
                Some(Action::Tapped)
            }
        }
        _ => None,
    }
}
