use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Reply(text) => app.on_reply(text),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_model_picker {
        handle_model_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_model_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.show_model_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.model_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.model_picker_nav_up(),
        KeyCode::Enter => app.select_model(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the input box
        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter | KeyCode::Tab => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('j') | KeyCode::Down => app.autoscroll.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.autoscroll.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') => app.autoscroll.scroll_to_top(),
        KeyCode::Char('G') => app.autoscroll.scroll_to_bottom(),

        KeyCode::Char('m') | KeyCode::Char('M') => app.open_model_picker(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    // Chat scrolling stays available while typing
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            return;
        }
        KeyCode::Up => {
            app.autoscroll.scroll_up(1);
            return;
        }
        KeyCode::Down => {
            app.autoscroll.scroll_down(1);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        _ => {}
    }

    // The input is read-only while a request is pending
    if app.is_busy() {
        return;
    }

    if key.code == KeyCode::Enter {
        let newline = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
        if newline && app.variant.multiline_input() {
            app.conversation.input.insert('\n');
        } else {
            app.submit();
        }
        return;
    }

    let input = &mut app.conversation.input;
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.is_busy() || app.input_mode != InputMode::Editing || app.show_model_picker {
        return;
    }
    if app.variant.multiline_input() {
        app.conversation.input.insert_str(text);
    } else {
        let flat = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
        app.conversation.input.insert_str(&flat);
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.autoscroll.scroll_down(3),
        MouseEventKind::ScrollUp => app.autoscroll.scroll_up(3),
        _ => {}
    }
}
