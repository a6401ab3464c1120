use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use civmap_core::{ExportFormat, FacilityId};

use crate::app::{App, Screen};

#[derive(Debug, Clone)]
pub(crate) enum Action {
    None,
    Quit,
    /// Rank facilities against the search box
    Search,
    /// Flip the like of a facility and persist it
    ToggleLike(FacilityId),
    /// Write the store to the export directory
    Export(ExportFormat),
    /// Register the GeoJSON file named in the upload box
    UploadBoundary,
}

fn is_plain(key: &KeyEvent) -> bool {
    !key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT)
}

fn step_up(index: &mut usize) {
    *index = index.saturating_sub(1);
}

fn step_down(index: &mut usize, len: usize) {
    if *index + 1 < len {
        *index += 1;
    }
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Tab, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    let typing = matches!(app.screen, Screen::Search | Screen::Upload);
    if !typing && key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Facilities => match key.code {
            Up | Char('k') => step_up(&mut app.table_index),
            Down | Char('j') => {
                let count = app.visible().len();
                step_down(&mut app.table_index, count);
            }
            Enter => {
                if let Some(id) = app.current_facility_id() {
                    app.open_details(id);
                }
            }
            Char('l') => {
                if let Some(id) = app.current_facility_id() {
                    action = Action::ToggleLike(id);
                }
            }
            Char(digit @ '1'..='8') => {
                let position = digit
                    .to_digit(10)
                    .and_then(|value| usize::try_from(value).ok())
                    .unwrap_or(1);
                app.toggle_type_at(position.saturating_sub(1));
            }
            Char('a') => app.toggle_all_types(),
            Char('d') => app.cycle_district(),
            Char('r') => app.reset_filters(),
            Char('/') => app.screen = Screen::Search,
            Char('s') => app.screen = Screen::Analytics,
            Char('m') => app.screen = Screen::Map,
            Char('e') => app.screen = Screen::Export,
            Char('u') => app.screen = Screen::Upload,
            _ => {}
        },

        Screen::Search => match key.code {
            Up => step_up(&mut app.result_index),
            Down => {
                let count = app.search_list().len();
                step_down(&mut app.result_index, count);
            }
            Char(character) if is_plain(&key) => {
                app.search_input.push(character);
                app.refresh_suggestions();
            }
            Backspace => {
                app.search_input.pop();
                app.refresh_suggestions();
            }
            Enter => action = Action::Search,
            Tab => {
                if let Some(id) = app.search_list().get(app.result_index).cloned() {
                    app.open_details(id);
                }
            }
            Esc => app.screen = Screen::Facilities,
            _ => {}
        },

        Screen::Analytics => match key.code {
            Left | Esc | Char('b') => app.screen = Screen::Facilities,
            _ => {}
        },

        Screen::Map => match key.code {
            Tab | Char('d') => app.cycle_district(),
            Char('a') => app.clear_district(),
            Char('h') => app.show_heat = !app.show_heat,
            Left | Esc | Char('b') => app.screen = Screen::Facilities,
            _ => {}
        },

        Screen::Details => match key.code {
            Char('l') => {
                if let Some(id) = app.detail.clone() {
                    action = Action::ToggleLike(id);
                }
            }
            Left | Esc | Char('b') => app.screen = app.return_to,
            _ => {}
        },

        Screen::Export => match key.code {
            Up | Char('k') => step_up(&mut app.export_index),
            Down | Char('j') => step_down(&mut app.export_index, ExportFormat::ALL.len()),
            Enter | Char(' ') => action = Action::Export(app.selected_export_format()),
            Left | Esc | Char('b') => app.screen = Screen::Facilities,
            _ => {}
        },

        Screen::Upload => match key.code {
            Char(character) if is_plain(&key) => app.upload_input.push(character),
            Backspace => {
                app.upload_input.pop();
            }
            Enter => action = Action::UploadBoundary,
            Esc => app.screen = Screen::Facilities,
            _ => {}
        },
    }
    action
}
