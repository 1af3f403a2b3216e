use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text field editing shared by the chat input and the key popup.
/// Returns `false` for keys it does not handle.
fn edit_line(input: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(input.chars().count()),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(input, *cursor);
            input.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => return false,
    }
    true
}

fn insert_text(input: &mut String, cursor: &mut usize, text: &str) {
    let byte_pos = char_to_byte_index(input, *cursor);
    input.insert_str(byte_pos, text);
    *cursor += text.chars().count();
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => app.scroll_query_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_paste(app: &mut App, text: &str) {
    // Newlines would submit half a paste in a single-line field
    let text = text.replace(['\r', '\n'], " ");
    if app.show_api_key_input {
        insert_text(&mut app.api_key_input, &mut app.api_key_input_cursor, text.trim());
    } else if app.input_mode == InputMode::Editing {
        insert_text(&mut app.query_input, &mut app.query_cursor, &text);
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
    } else if app.show_preset_picker {
        handle_preset_picker(app, key);
    } else {
        match app.input_mode {
            InputMode::Normal => handle_normal_mode(app, key),
            InputMode::Editing => handle_editing_mode(app, key),
        }
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_api_key_input = false;
            app.api_key_input.clear();
            app.api_key_input_cursor = 0;
        }
        KeyCode::Enter => {
            // An empty entry clears the key
            let key = std::mem::take(&mut app.api_key_input);
            app.set_credential(key.trim().to_string());
            app.api_key_input_cursor = 0;
            app.show_api_key_input = false;
        }
        _ => {
            edit_line(&mut app.api_key_input, &mut app.api_key_input_cursor, key);
        }
    }
}

fn handle_preset_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_preset_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.preset_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.preset_picker_nav_up(),
        KeyCode::Enter => app.select_preset(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Tab => app.input_mode = InputMode::Editing,

        KeyCode::Char('a') => {
            app.show_api_key_input = true;
            app.api_key_input.clear();
            app.api_key_input_cursor = 0;
        }
        KeyCode::Char('p') => app.open_preset_picker(),
        KeyCode::Char('n') => app.clear_conversation(),

        // Parameter sliders
        KeyCode::Up => app.param_nav(false),
        KeyCode::Down => app.param_nav(true),
        KeyCode::Left | KeyCode::Char('-') => app.adjust_param(false),
        KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_param(true),

        // Chat scrolling
        KeyCode::Char('j') => app.query_scroll = app.query_scroll.saturating_add(1),
        KeyCode::Char('k') => app.query_scroll = app.query_scroll.saturating_sub(1),
        KeyCode::PageDown => {
            let half_page = (app.query_chat_height / 2).max(1);
            app.query_scroll = app.query_scroll.saturating_add(half_page);
        }
        KeyCode::PageUp => {
            let half_page = (app.query_chat_height / 2).max(1);
            app.query_scroll = app.query_scroll.saturating_sub(half_page);
        }
        KeyCode::Char('G') | KeyCode::End => app.scroll_query_to_bottom(),
        KeyCode::Char('g') | KeyCode::Home => app.query_scroll = 0,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_query(),
        _ => {
            edit_line(&mut app.query_input, &mut app.query_cursor, key);
        }
    }
}
