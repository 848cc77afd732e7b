use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, Screen};
use crate::api::EventsApi;
use crate::dashboard::filter::FilterCategory;
use crate::dashboard::Route;

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key<C: EventsApi + 'static>(app: &mut App<C>, code: KeyCode, modifiers: KeyModifiers) {
    if let (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) = (code, modifiers) {
        app.running = false;
        return;
    }

    match app.screen {
        Screen::Login => handle_login_key(app, code),
        Screen::Dashboard(_) => handle_dashboard_key(app, code, modifiers),
        Screen::SigningOut => {}
    }
}

fn handle_login_key<C: EventsApi + 'static>(app: &mut App<C>, code: KeyCode) {
    match code {
        KeyCode::Char('l') => app.login(),
        KeyCode::Enter => app.navigate(Route::Dashboard),
        _ => {}
    }
}

fn handle_dashboard_key<C: EventsApi + 'static>(
    app: &mut App<C>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    match (code, modifiers) {
        (KeyCode::Tab, _) | (KeyCode::Right, KeyModifiers::SHIFT) => {
            app.cycle_filter(true);
            return;
        }
        (KeyCode::BackTab, _) | (KeyCode::Left, KeyModifiers::SHIFT) => {
            app.cycle_filter(false);
            return;
        }
        _ => {}
    }

    match code {
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            app.set_filter(FilterCategory::ALL[idx]);
        }
        KeyCode::Down | KeyCode::Char('j') => app.card_list_state.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.card_list_state.select_prev(),
        KeyCode::Home | KeyCode::Char('g') => app.card_list_state.selected = 0,
        KeyCode::End | KeyCode::Char('G') => app.card_list_state.select_last(),
        KeyCode::Char('s') => app.start_sync(),
        KeyCode::Char('o') | KeyCode::Enter => app.open_selected_link(),
        KeyCode::Char('x') => app.begin_logout(),
        _ => {}
    }
}
