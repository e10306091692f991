use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use ratatui::prelude::Rect;

use crate::commands::dispatch;
use crate::platform;
use crate::rendering::scrollbar_click_offset;
use crate::tree::{active_pane_mut, compute_rects, find_pane_mut, pane_at_mut};
use crate::types::AppState;

/// Route one key event. Input always applies to the pane that is active at
/// the moment the event is processed: raw forwarding while its child runs,
/// the line editor otherwise.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    // Clipboard copy is available at any time, even mid-command.
    if ctrl && shift && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
        if let Some(p) = active_pane_mut(app) {
            let text = p.selection_text();
            if !text.is_empty() {
                platform::copy_to_system_clipboard(&text);
            }
        }
        return;
    }

    let busy = active_pane_mut(app).map(|p| p.session.is_busy()).unwrap_or(false);
    if busy {
        handle_key_busy(app, key, ctrl);
    } else {
        handle_key_idle(app, key, ctrl, shift);
    }
}

fn handle_key_busy(app: &mut AppState, key: KeyEvent, ctrl: bool) {
    let Some(p) = active_pane_mut(app) else { return };
    if ctrl && matches!(key.code, KeyCode::Char('c')) {
        p.session.interrupt();
        return;
    }
    match key.code {
        KeyCode::Enter => {
            p.session.write_input(b"\r\n");
            p.write_str("\n");
        }
        KeyCode::Backspace => {
            p.session.write_input(&[0x08]);
            p.put_char('\x08');
        }
        KeyCode::Char(c) => {
            let s = c.to_string();
            p.session.write_input(s.as_bytes());
            p.write_str(&s); // cooked-mode children do not echo for us
        }
        _ => {}
    }
}

fn handle_key_idle(app: &mut AppState, key: KeyEvent, ctrl: bool, shift: bool) {
    if ctrl {
        match key.code {
            KeyCode::Char('c') => {
                if let Some(p) = active_pane_mut(app) {
                    p.write_str("^C");
                    p.current_input.clear();
                    p.input_cursor = 0;
                    p.has_selection = false;
                    p.session.reset_history();
                    p.emit_prompt(true);
                }
            }
            KeyCode::Char('v') => {
                if let Some(text) = platform::read_from_system_clipboard() {
                    if let Some(p) = active_pane_mut(app) {
                        for c in text.chars().filter(|c| *c as u32 >= 0x20) {
                            p.insert_char(c);
                        }
                    }
                }
            }
            KeyCode::Char('a') => {
                if let Some(p) = active_pane_mut(app) {
                    p.select_all();
                }
            }
            KeyCode::Char('l') => {
                if let Some(p) = active_pane_mut(app) {
                    p.repaint();
                }
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => submit_line(app),
        KeyCode::Backspace => {
            if let Some(p) = active_pane_mut(app) {
                p.delete_char();
            }
        }
        KeyCode::Delete => {
            if let Some(p) = active_pane_mut(app) {
                p.delete_char_forward();
            }
        }
        KeyCode::Left => move_cursor_key(app, -1, shift),
        KeyCode::Right => move_cursor_key(app, 1, shift),
        KeyCode::Home => {
            if let Some(p) = active_pane_mut(app) {
                p.move_home();
                if !shift {
                    p.has_selection = false;
                }
            }
        }
        KeyCode::End => {
            if let Some(p) = active_pane_mut(app) {
                p.move_end();
                if !shift {
                    p.has_selection = false;
                }
            }
        }
        KeyCode::Up => history_up_key(app),
        KeyCode::Down => history_down_key(app),
        KeyCode::Char(c) if c as u32 >= 0x20 => {
            if let Some(p) = active_pane_mut(app) {
                p.insert_char(c);
            }
        }
        _ => {}
    }
}

fn move_cursor_key(app: &mut AppState, delta: isize, shift: bool) {
    if let Some(p) = active_pane_mut(app) {
        p.move_cursor(delta);
        if !shift {
            p.has_selection = false;
        }
    }
}

fn history_up_key(app: &mut AppState) {
    if let Some(p) = active_pane_mut(app) {
        let current = p.current_input.clone();
        let prev = p.session.history_up(&current);
        if !prev.is_empty() {
            p.replace_input(&prev);
        }
    }
}

fn history_down_key(app: &mut AppState) {
    if let Some(p) = active_pane_mut(app) {
        let next = p.session.history_down();
        p.replace_input(&next);
    }
}

/// Enter on an idle pane: snapshot the line, remember it, dispatch it, and
/// re-prompt unless the command handed the pane to a child.
fn submit_line(app: &mut AppState) {
    let (cmd, pane_id) = {
        let Some(p) = active_pane_mut(app) else { return };
        p.write_str("\n");
        p.input_cursor = 0;
        p.has_selection = false;
        p.reset_scroll();
        (std::mem::take(&mut p.current_input), p.id)
    };

    if cmd.is_empty() {
        if let Some(p) = active_pane_mut(app) {
            p.emit_prompt(false);
        }
        return;
    }

    if let Some(p) = active_pane_mut(app) {
        p.session.add_history(&cmd);
        p.session.reset_history();
    }

    dispatch(app, &cmd);
    if !app.running {
        return;
    }

    // The prompt belongs to the pane that ran the command; `sesh` may have
    // re-focused or even stashed it meanwhile.
    let in_tree = find_pane_mut(&mut app.root, pane_id);
    let pane = match in_tree {
        Some(p) => Some(p),
        None => app.background.iter_mut().map(|b| &mut b.pane).find(|p| p.id == pane_id),
    };
    if let Some(p) = pane {
        if !p.waiting {
            p.emit_prompt(true);
        }
    }
}

/// Wheel scrolling targets the pane under the cursor; a left click on a
/// pane's last column jumps the scrollback to the clicked track position.
pub fn handle_mouse(app: &mut AppState, me: MouseEvent) {
    let area = app.last_area;
    let mut rects = Vec::new();
    compute_rects(&app.root, area, &mut rects);
    let hit = rects
        .iter()
        .find(|(_, r)| r.contains(Position::new(me.column, me.row)))
        .map(|(path, r)| (path.clone(), *r));
    let Some((path, rect)) = hit else { return };
    let step = app.config.scroll_step as isize;

    match me.kind {
        MouseEventKind::ScrollUp => {
            if let Some(p) = pane_at_mut(&mut app.root, &path) {
                p.scroll_by(step);
            }
        }
        MouseEventKind::ScrollDown => {
            if let Some(p) = pane_at_mut(&mut app.root, &path) {
                p.scroll_by(-step);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if rect.width > 0 && me.column == rect.right() - 1 {
                scrollbar_jump(app, &path, rect, me.row);
            }
        }
        _ => {}
    }
}

fn scrollbar_jump(app: &mut AppState, path: &[usize], rect: Rect, row: u16) {
    if let Some(p) = pane_at_mut(&mut app.root, path) {
        let total = p.grid.lines.len();
        if total > rect.height as usize {
            let y = (row - rect.y) as usize;
            p.scroll_offset = scrollbar_click_offset(total, rect.height as usize, y);
        }
    }
}
