use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::lexer;
use crate::pane::Pane;
use crate::tree::{
    active_pane_mut, detach_leaf, first_leaf_path, heuristic_kind, leaf_paths, rect_of,
    resize_all, split_leaf,
};
use crate::types::{AppState, BackgroundPane};

pub fn log_line(app: &mut AppState, text: &str) {
    if let Some(p) = active_pane_mut(app) {
        p.write_str(text);
        p.write_str("\n");
    }
}

pub fn log_error(app: &mut AppState, text: &str) {
    if let Some(p) = active_pane_mut(app) {
        p.write_str(&format!("\x1b[31m{text}\x1b[0m\n"));
    }
}

/// Parse one submitted line and run it. Every failure is rendered into the
/// active pane; nothing propagates.
pub fn dispatch(app: &mut AppState, input: &str) {
    let args = lexer::split_words(input);
    let Some(command) = args.first().cloned() else { return };

    match command.as_str() {
        "exit" => app.running = false,
        "help" => cmd_help(app),
        "say" => cmd_say(app, &args),
        "cwd" => cmd_cwd(app),
        "goto" => cmd_goto(app, &args),
        "make" => cmd_make(app, &args),
        "remove" => cmd_remove(app, &args),
        "list" => cmd_list(app, &args),
        "read" => cmd_read(app, &args),
        "sesh" => cmd_sesh(app, &args),
        _ => execute_external(app, &args),
    }
}

fn cmd_help(app: &mut AppState) {
    for line in [
        "Commands:",
        "  say <text>                 - prints text",
        "  goto <path>                - goto any directory",
        "  cwd                        - current directory",
        "  make [-f/-d] <name>        - creates a file or directory",
        "  remove [-f/-d] <name>      - removes a file or directory",
        "  list [-all/-hidden] <path> - lists files and directories",
        "  read <file> [-h(<word>)] [-f(<n>)] [-l(<n>)] - prints a file",
        "  sesh <subcommand>          - session management:",
        "    save <name>              - saves current session",
        "    load <name>              - loads a session",
        "    update <name>            - updates a saved session",
        "    remove <name>            - removes a session",
        "    list [-b]                - lists all sessions",
        "    add                      - splits screen with new session",
        "    switch <number>          - switches focus to session N",
        "    detach                   - moves active session to background",
        "    retach <index>           - brings background session to foreground",
        "  exit                       - exits the shell",
    ] {
        log_line(app, line);
    }
}

fn cmd_say(app: &mut AppState, args: &[String]) {
    log_line(app, &args[1..].join(" "));
}

fn cmd_cwd(app: &mut AppState) {
    let cwd = match active_pane_mut(app) {
        Some(p) => p.session.cwd().display().to_string(),
        None => return,
    };
    log_line(app, &cwd);
}

fn cmd_goto(app: &mut AppState, args: &[String]) {
    let Some(target) = args.get(1) else {
        log_error(app, "Minsh: goto: invalid arguments");
        return;
    };
    let base = match active_pane_mut(app) {
        Some(p) => p.session.cwd().clone(),
        None => return,
    };
    let resolved = resolve_rel(&base, target);
    match fs::canonicalize(&resolved) {
        Ok(path) if path.is_dir() => {
            if let Some(p) = active_pane_mut(app) {
                p.session.set_cwd(path.clone());
                p.cwd = path;
            }
        }
        _ => log_error(app, &format!("Minsh: {target}: directory not found")),
    }
}

fn cmd_make(app: &mut AppState, args: &[String]) {
    let (Some(flag), Some(name)) = (args.get(1), args.get(2)) else {
        log_error(app, "Minsh: make: invalid arguments");
        return;
    };
    let path = active_rel(app, name);
    let result = match flag.as_str() {
        "-f" => fs::write(&path, ""),
        "-d" => fs::create_dir(&path),
        _ => {
            log_error(app, "Minsh: make: invalid arguments");
            return;
        }
    };
    if let Err(e) = result {
        // Creating a directory that already exists is tolerated.
        if !(flag == "-d" && path.exists()) {
            log_error(app, &format!("Minsh: {name}: {}", fs_error_text(&e)));
        }
    }
}

fn cmd_remove(app: &mut AppState, args: &[String]) {
    let (Some(flag), Some(name)) = (args.get(1), args.get(2)) else {
        log_error(app, "Minsh: remove: invalid arguments");
        return;
    };
    let path = active_rel(app, name);
    if !path.exists() {
        let what = if flag == "-d" { "directory" } else { "file" };
        log_error(app, &format!("Minsh: {name}: {what} not found"));
        return;
    }
    let result = match flag.as_str() {
        "-f" => {
            if path.is_dir() {
                log_error(app, &format!("Minsh: {name}: is a directory"));
                return;
            }
            fs::remove_file(&path)
        }
        "-d" => {
            if !path.is_dir() {
                log_error(app, &format!("Minsh: {name}: is not a directory"));
                return;
            }
            fs::remove_dir_all(&path)
        }
        _ => {
            log_error(app, "Minsh: remove: invalid arguments");
            return;
        }
    };
    if result.is_err() {
        log_error(app, "Minsh: remove: permission denied");
    }
}

fn cmd_list(app: &mut AppState, args: &[String]) {
    let mut show_hidden = false;
    let mut path_arg = ".".to_string();
    for arg in &args[1..] {
        if arg == "-all" || arg == "-hidden" {
            show_hidden = true;
        } else {
            path_arg = arg.clone();
        }
    }
    let path = active_rel(app, &path_arg);
    if !path.exists() {
        log_error(app, &format!("Minsh: {path_arg}: directory not found"));
        return;
    }
    let entries = match fs::read_dir(&path) {
        Ok(entries) => entries,
        Err(_) => {
            log_error(app, "Minsh: list: permission denied");
            return;
        }
    };
    let mut names: Vec<String> = entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| show_hidden || !n.starts_with('.'))
        .collect();
    names.sort();
    for name in names {
        log_line(app, &name);
    }
}

fn cmd_read(app: &mut AppState, args: &[String]) {
    let Some(file) = args.get(1) else {
        log_error(app, "Minsh: read: invalid arguments");
        return;
    };
    let mut highlight: Option<String> = None;
    let mut first: Option<usize> = None;
    let mut last: Option<usize> = None;
    for arg in &args[2..] {
        match parse_read_flag(arg) {
            Some(('h', word)) => highlight = Some(word),
            Some(('f', n)) => first = n.parse().ok(),
            Some(('l', n)) => last = n.parse().ok(),
            _ => {
                log_error(app, &format!("Minsh: read: invalid flag '{arg}'"));
                return;
            }
        }
    }
    let path = active_rel(app, file);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            log_error(app, &format!("Minsh: {file}: file not found"));
            return;
        }
    };
    let lines = head_tail(content.lines().collect(), first, last);
    for line in lines {
        let shown = match &highlight {
            Some(word) => highlight_word(line, word),
            None => line.to_string(),
        };
        log_line(app, &shown);
    }
}

/// `-h(<word>)`, `-f(<n>)`, `-l(<n>)` → (flag char, inner text).
fn parse_read_flag(arg: &str) -> Option<(char, String)> {
    let rest = arg.strip_prefix('-')?;
    let mut chars = rest.chars();
    let flag = chars.next()?;
    let inner = chars.as_str().strip_prefix('(')?.strip_suffix(')')?;
    Some((flag, inner.to_string()))
}

fn head_tail<'a>(lines: Vec<&'a str>, first: Option<usize>, last: Option<usize>) -> Vec<&'a str> {
    let mut lines = lines;
    if let Some(n) = first {
        lines.truncate(n);
    }
    if let Some(n) = last {
        let skip = lines.len().saturating_sub(n);
        lines.drain(..skip);
    }
    lines
}

fn highlight_word(line: &str, word: &str) -> String {
    if word.is_empty() {
        return line.to_string();
    }
    line.replace(word, &format!("\x1b[31m{word}\x1b[0m"))
}

// --- sesh ----------------------------------------------------------------

fn cmd_sesh(app: &mut AppState, args: &[String]) {
    let Some(subcmd) = args.get(1).cloned() else {
        log_error(app, "Minsh: sesh: invalid arguments. Use save, load, list, add, switch, detach, retach.");
        return;
    };
    match subcmd.as_str() {
        "save" | "update" => sesh_save(app, args, subcmd == "update"),
        "load" => sesh_load(app, args),
        "remove" => sesh_remove(app, args),
        "list" => sesh_list(app, args),
        "add" => sesh_add(app),
        "switch" => sesh_switch(app, args),
        "detach" => sesh_detach(app),
        "retach" => sesh_retach(app, args),
        _ => log_error(app, &format!("Minsh: sesh: unknown subcommand '{subcmd}'")),
    }
}

fn sesh_save(app: &mut AppState, args: &[String], update: bool) {
    let verb = if update { "update" } else { "save" };
    let Some(name) = args.get(2).cloned() else {
        log_error(app, &format!("Minsh: sesh {verb}: missing session name"));
        return;
    };
    let (content, cwd) = match active_pane_mut(app) {
        Some(p) => (p.grid_text(), p.cwd.display().to_string()),
        None => return,
    };
    match app.store.save(&name, &content, &cwd) {
        Ok(()) => {
            let done = if update { "updated" } else { "saved" };
            log_line(app, &format!("Session '{name}' {done}."));
        }
        Err(_) => log_error(app, &format!("Minsh: sesh {verb}: failed to {verb} session")),
    }
}

fn sesh_load(app: &mut AppState, args: &[String]) {
    let Some(name) = args.get(2).cloned() else {
        log_error(app, "Minsh: sesh load: missing session name");
        return;
    };
    let data = match app.store.load(&name) {
        Ok(d) if !(d.cwd.is_empty() && d.content.is_empty()) => d,
        _ => {
            log_error(app, "Minsh: sesh load: session not found or empty");
            return;
        }
    };
    if let Some(p) = active_pane_mut(app) {
        let cwd = PathBuf::from(&data.cwd);
        p.cwd = cwd.clone();
        p.session.set_cwd(cwd.clone());
        p.load_content(&data.content);
        let _ = env::set_current_dir(&cwd);
    }
}

fn sesh_remove(app: &mut AppState, args: &[String]) {
    let Some(name) = args.get(2).cloned() else {
        log_error(app, "Minsh: sesh remove: missing session name");
        return;
    };
    match app.store.remove(&name) {
        Ok(true) => log_line(app, &format!("Session '{name}' removed.")),
        _ => log_error(app, "Minsh: sesh remove: session not found"),
    }
}

fn sesh_list(app: &mut AppState, args: &[String]) {
    let only_background = args.get(2).map(|a| a == "-b").unwrap_or(false);

    let saved = app.store.list();
    if !only_background && !saved.is_empty() {
        log_line(app, "Saved Sessions:");
        for name in &saved {
            let line = format!("  {name}");
            log_line(app, &line);
        }
    }

    let entries: Vec<String> = app
        .background
        .iter()
        .enumerate()
        .map(|(i, bg)| {
            let secs = (Local::now() - bg.detached_at).num_seconds().max(0);
            format!("  [{i}] CWD: {} (Detached: {secs}s ago)", bg.pane.cwd.display())
        })
        .collect();
    if !entries.is_empty() {
        let header = if only_background { "Background Panes (Detached):" } else { "Background Panes:" };
        log_line(app, header);
        for line in entries {
            log_line(app, &line);
        }
    }

    if !only_background && saved.is_empty() && app.background.is_empty() {
        log_line(app, "No sessions found.");
    } else if only_background && app.background.is_empty() {
        log_line(app, "No background sessions found.");
    }
}

fn sesh_add(app: &mut AppState) {
    let rect = rect_of(&app.root, app.last_area, &app.active_path).unwrap_or(app.last_area);
    let kind = heuristic_kind(rect);
    let cwd = match active_pane_mut(app) {
        Some(p) => p.cwd.clone(),
        None => return,
    };
    let id = app.take_pane_id();
    let mut pane = Pane::new(
        id,
        rect.width.max(2) as usize,
        rect.height.max(2) as usize,
        cwd,
        Some(app.paths.history_file.clone()),
    );
    pane.emit_prompt(false);
    let path = app.active_path.clone();
    app.active_path = split_leaf(&mut app.root, &path, kind, pane);
    resize_all(app);
}

fn sesh_switch(app: &mut AppState, args: &[String]) {
    let Some(num) = args.get(2).and_then(|a| a.parse::<usize>().ok()) else {
        log_error(app, "Minsh: sesh switch: invalid number");
        return;
    };
    let paths = leaf_paths(&app.root);
    match num.checked_sub(1).and_then(|i| paths.get(i)) {
        Some(path) => {
            app.active_path = path.clone();
            sync_process_cwd(app);
        }
        None => log_error(app, &format!("Minsh: sesh switch: pane {num} does not exist")),
    }
}

fn sesh_detach(app: &mut AppState) {
    let path = app.active_path.clone();
    if path.is_empty() {
        log_error(app, "Minsh: sesh detach: cannot detach the last pane");
        return;
    }
    if let Some(pane) = detach_leaf(&mut app.root, &path) {
        app.background.push(BackgroundPane { pane, detached_at: Local::now() });
        app.active_path = first_leaf_path(&app.root);
        resize_all(app);
        sync_process_cwd(app);
    }
}

fn sesh_retach(app: &mut AppState, args: &[String]) {
    let Some(index) = args.get(2).and_then(|a| a.parse::<usize>().ok()) else {
        log_error(app, "Minsh: sesh retach: invalid number");
        return;
    };
    if index >= app.background.len() {
        log_error(app, &format!("Minsh: sesh retach: invalid index {index}"));
        return;
    }
    let bg = app.background.remove(index);
    let rect = rect_of(&app.root, app.last_area, &app.active_path).unwrap_or(app.last_area);
    let kind = heuristic_kind(rect);
    let path = app.active_path.clone();
    app.active_path = split_leaf(&mut app.root, &path, kind, bg.pane);
    resize_all(app);
    sync_process_cwd(app);
}

// --- external commands ---------------------------------------------------

fn execute_external(app: &mut AppState, args: &[String]) {
    let name = &args[0];
    let program = resolve_external(Path::new("cmds"), name);
    let rest = args[1..].to_vec();
    let Some(p) = active_pane_mut(app) else { return };
    match p.session.execute(&program, &rest) {
        Ok(()) => p.waiting = true,
        Err(e) => {
            let code = e.raw_os_error().unwrap_or(0);
            log_error(
                app,
                &format!("Minsh: {name}: command not found or failed to execute ({code})"),
            );
        }
    }
}

/// Look in the cmds directory with the usual Windows suffixes, then fall
/// back to PATH resolution, then to the bare name.
pub fn resolve_external(cmds_dir: &Path, name: &str) -> String {
    for ext in ["", ".exe", ".bat", ".cmd", ".com"] {
        let candidate = cmds_dir.join(format!("{name}{ext}"));
        if candidate.exists() {
            return candidate.display().to_string();
        }
    }
    if let Ok(found) = which::which(name) {
        return found.display().to_string();
    }
    name.to_string()
}

// --- helpers -------------------------------------------------------------

fn resolve_rel(base: &Path, name: &str) -> PathBuf {
    let p = PathBuf::from(name);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

/// Resolve a user-supplied path against the active pane's cwd.
fn active_rel(app: &mut AppState, name: &str) -> PathBuf {
    let base = active_pane_mut(app)
        .map(|p| p.session.cwd().clone())
        .unwrap_or_else(|| PathBuf::from("."));
    resolve_rel(&base, name)
}

/// Keep the process cwd aligned with the active pane, so that children and
/// relative paths behave. Failure is tolerated.
pub fn sync_process_cwd(app: &mut AppState) {
    if let Some(p) = active_pane_mut(app) {
        let cwd = p.session.cwd().clone();
        let _ = env::set_current_dir(cwd);
    }
}

fn fs_error_text(e: &std::io::Error) -> &'static str {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => "permission denied",
        std::io::ErrorKind::NotFound => "not found",
        _ => "operation failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Paths};
    use crate::grid::FG_RED;
    use crate::tree::leaf_count;
    use crate::types::Node;
    use ratatui::prelude::Rect;

    fn test_app(dir: &Path) -> AppState {
        let paths = Paths {
            exe_dir: dir.to_path_buf(),
            sessions_dir: dir.join("sessions"),
            history_file: dir.join("history.min"),
            debug_log: dir.join("debug.log"),
        };
        let pane = Pane::new(1, 120, 20, dir.to_path_buf(), None);
        let mut app = AppState::new(Node::Leaf(pane), paths, Config::default());
        app.last_area = Rect::new(0, 0, 120, 20);
        app
    }

    fn visible_text(app: &mut AppState) -> String {
        let p = active_pane_mut(app).unwrap();
        p.grid
            .lines
            .iter()
            .map(|l| l.text_trimmed())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn say_echoes_joined_args() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        dispatch(&mut app, "say hello world");
        assert!(visible_text(&mut app).contains("hello world"));
        let p = active_pane_mut(&mut app).unwrap();
        assert!(p.current_input.is_empty());
        assert_eq!(p.input_cursor, 0);
    }

    #[test]
    fn unknown_flags_render_errors_in_red() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        dispatch(&mut app, "make -x thing");
        let p = active_pane_mut(&mut app).unwrap();
        // The error row carries the red attribute.
        let row = p.grid.abs_row(p.cy) - 1;
        assert_eq!(p.grid.get_cell(0, row).attr, FG_RED);
    }

    #[test]
    fn make_and_remove_files_against_pane_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        dispatch(&mut app, "make -f probe.txt");
        assert!(dir.path().join("probe.txt").exists());
        dispatch(&mut app, "make -d sub");
        assert!(dir.path().join("sub").is_dir());
        dispatch(&mut app, "remove -f sub");
        assert!(dir.path().join("sub").exists(), "-f must refuse directories");
        dispatch(&mut app, "remove -d sub");
        assert!(!dir.path().join("sub").exists());
        dispatch(&mut app, "remove -f probe.txt");
        assert!(!dir.path().join("probe.txt").exists());
    }

    #[test]
    fn goto_canonicalises_and_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        fs::create_dir(dir.path().join("inner")).unwrap();
        fs::write(dir.path().join("plain.txt"), "").unwrap();
        dispatch(&mut app, "goto inner");
        let cwd = active_pane_mut(&mut app).unwrap().session.cwd().clone();
        assert!(cwd.ends_with("inner"));
        dispatch(&mut app, "goto plain.txt");
        let cwd2 = active_pane_mut(&mut app).unwrap().session.cwd().clone();
        assert_eq!(cwd, cwd2);
    }

    #[test]
    fn list_hides_dotfiles_unless_asked() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::write(dir.path().join("shown"), "").unwrap();
        dispatch(&mut app, "list");
        let text = visible_text(&mut app);
        assert!(text.contains("shown"));
        assert!(!text.contains(".hidden"));
        dispatch(&mut app, "list -all");
        assert!(visible_text(&mut app).contains(".hidden"));
    }

    #[test]
    fn read_supports_head_tail_and_highlight() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        fs::write(dir.path().join("f.txt"), "alpha\nbeta\ngamma\nbeta end\n").unwrap();
        dispatch(&mut app, "read f.txt -f(2)");
        let text = visible_text(&mut app);
        assert!(text.contains("alpha") && text.contains("beta"));
        assert!(!text.contains("gamma"));
        // Highlight wraps the match in red; the grid keeps the visible text.
        dispatch(&mut app, "read f.txt -h(gamma)");
        let p = active_pane_mut(&mut app).unwrap();
        let found = p
            .grid
            .lines
            .iter()
            .any(|l| l.text_trimmed() == "gamma" && l.cells[0].attr == FG_RED);
        assert!(found);
    }

    #[test]
    fn head_tail_combination() {
        let lines = vec!["a", "b", "c", "d"];
        assert_eq!(head_tail(lines.clone(), Some(3), None), vec!["a", "b", "c"]);
        assert_eq!(head_tail(lines.clone(), None, Some(2)), vec!["c", "d"]);
        assert_eq!(head_tail(lines, Some(3), Some(1)), vec!["c"]);
    }

    #[test]
    fn read_flag_syntax() {
        assert_eq!(parse_read_flag("-h(word)"), Some(('h', "word".into())));
        assert_eq!(parse_read_flag("-f(10)"), Some(('f', "10".into())));
        assert_eq!(parse_read_flag("-f10"), None);
        assert_eq!(parse_read_flag("plain"), None);
    }

    #[test]
    fn sesh_add_switch_detach_retach_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        // 120x20 leaf: 120 > 60, so the split is vertical (side by side).
        dispatch(&mut app, "sesh add");
        assert_eq!(leaf_count(&app.root), 2);
        assert_eq!(app.active_path, vec![1]);
        match &app.root {
            Node::Split { kind, .. } => assert_eq!(*kind, crate::types::SplitKind::Vertical),
            _ => panic!("root must be a split"),
        }

        dispatch(&mut app, "sesh switch 1");
        assert_eq!(app.active_path, vec![0]);
        dispatch(&mut app, "sesh switch 9");
        assert_eq!(app.active_path, vec![0]); // unchanged, error logged

        dispatch(&mut app, "sesh detach");
        assert_eq!(leaf_count(&app.root), 1);
        assert!(matches!(app.root, Node::Leaf(_)));
        assert_eq!(app.background.len(), 1);

        dispatch(&mut app, "sesh retach 0");
        assert_eq!(leaf_count(&app.root), 2);
        assert!(app.background.is_empty());
        assert_eq!(app.active_path, vec![1]);
    }

    #[test]
    fn detaching_the_last_pane_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        dispatch(&mut app, "sesh detach");
        assert_eq!(leaf_count(&app.root), 1);
        assert!(app.background.is_empty());
        assert!(visible_text(&mut app).contains("cannot detach the last pane"));
    }

    #[test]
    fn split_heuristic_stacks_tall_panes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.last_area = Rect::new(0, 0, 120, 40);
        resize_all(&mut app);
        dispatch(&mut app, "sesh add");
        match &app.root {
            Node::Split { kind, .. } => assert_eq!(*kind, crate::types::SplitKind::Horizontal),
            _ => panic!("root must be a split"),
        }
    }

    #[test]
    fn sesh_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        dispatch(&mut app, "say remember me");
        dispatch(&mut app, "sesh save demo");
        assert!(visible_text(&mut app).contains("Session 'demo' saved."));

        dispatch(&mut app, "sesh load demo");
        let text = visible_text(&mut app);
        assert!(text.contains("remember me"));

        dispatch(&mut app, "sesh list");
        assert!(visible_text(&mut app).contains("demo.sesh"));
        dispatch(&mut app, "sesh remove demo");
        dispatch(&mut app, "sesh remove demo");
        assert!(visible_text(&mut app).contains("session not found"));
    }

    #[test]
    fn sesh_list_shows_background_panes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        dispatch(&mut app, "sesh add");
        dispatch(&mut app, "sesh detach");
        dispatch(&mut app, "sesh list -b");
        let text = visible_text(&mut app);
        assert!(text.contains("Background Panes (Detached):"));
        assert!(text.contains("Detached:"));
    }

    #[test]
    fn resolve_external_prefers_cmds_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cmds = dir.path().join("cmds");
        fs::create_dir(&cmds).unwrap();
        fs::write(cmds.join("mytool.bat"), "").unwrap();
        let resolved = resolve_external(&cmds, "mytool");
        assert!(resolved.ends_with("mytool.bat"));
        // Unknown names come back unchanged.
        assert_eq!(resolve_external(&cmds, "definitely-not-a-command-xyz"), "definitely-not-a-command-xyz");
    }
}
