use std::env;
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::Rect;
use ratatui::Terminal;

use crate::commands::{log_error, sync_process_cwd};
use crate::config::{initial_cwd, Config, Paths};
use crate::input::{handle_key, handle_mouse};
use crate::pane::Pane;
use crate::rendering::render;
use crate::tree::{for_each_pane_mut, resize_all};
use crate::types::{AppState, Node};
use crate::util::debug_log;

const INPUT_BATCH_MAX: usize = 128;

pub fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    paths: Paths,
    config: Config,
) -> io::Result<()> {
    let size = terminal.size()?;
    let area = Rect::new(0, 0, size.width, size.height);

    let cwd = initial_cwd();
    let _ = env::set_current_dir(&cwd);
    if !std::path::Path::new("cmds").exists() {
        let _ = std::fs::create_dir("cmds");
    }

    let mut first = Pane::new(
        1,
        area.width.max(2) as usize,
        area.height.max(2) as usize,
        cwd,
        Some(paths.history_file.clone()),
    );
    first.emit_prompt(false);

    let mut app = AppState::new(Node::Leaf(first), paths, config);
    app.last_area = area;

    // Any failure inside a tick lands in debug.log and a red line in the
    // active pane; the loop itself must always make progress.
    while app.running {
        if let Err(e) = tick(&mut app, terminal) {
            debug_log(&app.paths.debug_log, &format!("CRASH AVOIDED: {e}"));
            log_error(&mut app, &format!("Internal Crash Avoided: {e}"));
        }
    }
    Ok(())
}

/// One cooperative tick: pump every pane's child, sync the process cwd to
/// the active pane, composite a frame, then service input (or idle).
fn tick(app: &mut AppState, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    pump_sessions(app);
    sync_process_cwd(app);
    terminal.draw(|f| render(f, app))?;
    drain_input(app)
}

/// Feed pipe output through each pane's emulator and flip panes whose child
/// has exited back to prompt mode. Panes in the background stash are idle by
/// construction and are skipped until re-attached.
pub fn pump_sessions(app: &mut AppState) {
    for_each_pane_mut(&mut app.root, &mut |pane| {
        let busy = pane.session.is_busy();
        let out = pane.session.poll_output();
        if !out.is_empty() {
            pane.write_bytes(&out);
        }
        if pane.waiting && !busy {
            pane.waiting = false;
            pane.current_input.clear();
            pane.input_cursor = 0;
            pane.emit_prompt(true);
        }
    });
}

fn drain_input(app: &mut AppState) -> io::Result<()> {
    // The poll timeout doubles as the idle sleep (CPU guard).
    if !event::poll(Duration::from_millis(10))? {
        return Ok(());
    }
    let mut batch = 0;
    loop {
        match event::read()? {
            Event::Key(k) if matches!(k.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                handle_key(app, k)
            }
            Event::Mouse(me) if app.config.mouse_enabled => handle_mouse(app, me),
            Event::Resize(cols, rows) => {
                app.last_area = Rect::new(0, 0, cols, rows);
                resize_all(app);
            }
            _ => {}
        }
        batch += 1;
        if !app.running || batch >= INPUT_BATCH_MAX || !event::poll(Duration::ZERO)? {
            break;
        }
    }
    Ok(())
}
