use std::env;
use std::path::{Path, PathBuf};

/// Filesystem locations resolved once at startup and injected everywhere
/// they are needed; nothing here lives in process-global state.
#[derive(Clone, Debug)]
pub struct Paths {
    pub exe_dir: PathBuf,
    pub sessions_dir: PathBuf,
    pub history_file: PathBuf,
    pub debug_log: PathBuf,
}

/// Tunables read from the rc file.
#[derive(Clone, Debug)]
pub struct Config {
    pub mouse_enabled: bool,
    pub scroll_step: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { mouse_enabled: true, scroll_step: 3 }
    }
}

/// Where new sessions start: USERPROFILE, then HOME, then the process cwd.
pub fn initial_cwd() -> PathBuf {
    env::var("USERPROFILE")
        .or_else(|_| env::var("HOME"))
        .map(PathBuf::from)
        .ok()
        .filter(|p| p.is_dir())
        .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// The sessions directory sits next to the executable, or beside a `bin`
/// directory when the executable is installed into one.
fn resolve_sessions_dir(exe_dir: &Path) -> PathBuf {
    let local = exe_dir.join("sessions");
    if local.exists() {
        return local;
    }
    if exe_dir.file_name().map(|n| n == "bin").unwrap_or(false) {
        if let Some(parent) = exe_dir.parent() {
            return parent.join("sessions");
        }
    }
    local
}

pub fn resolve_paths() -> Paths {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    let sessions_dir = resolve_sessions_dir(&exe_dir);
    Paths {
        history_file: exe_dir.join("history.min"),
        debug_log: exe_dir.join("debug.log"),
        sessions_dir,
        exe_dir,
    }
}

/// Load `.minshrc` from the home directory, falling back to `minsh.conf`
/// next to the executable. Unknown keys are ignored. The `sessions-dir` and
/// `history-file` keys override the resolved paths.
pub fn load_config(paths: &mut Paths) -> Config {
    let mut cfg = Config::default();
    let home = env::var("USERPROFILE").or_else(|_| env::var("HOME")).unwrap_or_default();
    let candidates = [
        PathBuf::from(&home).join(".minshrc"),
        paths.exe_dir.join("minsh.conf"),
    ];
    for path in &candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            parse_config(&content, &mut cfg, paths);
            break;
        }
    }
    cfg
}

fn parse_config(content: &str, cfg: &mut Config, paths: &mut Paths) {
    for line in content.lines() {
        let l = line.trim();
        if l.is_empty() || l.starts_with('#') {
            continue;
        }
        let (key, value) = match l.split_once(char::is_whitespace) {
            Some((k, v)) => (k, v.trim().trim_matches('"')),
            None => continue,
        };
        match key {
            "mouse" => cfg.mouse_enabled = value != "off" && value != "0" && value != "false",
            "scroll-step" => {
                if let Ok(n) = value.parse::<usize>() {
                    if n > 0 {
                        cfg.scroll_step = n;
                    }
                }
            }
            "sessions-dir" => paths.sessions_dir = PathBuf::from(value),
            "history-file" => paths.history_file = PathBuf::from(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths(dir: &Path) -> Paths {
        Paths {
            exe_dir: dir.to_path_buf(),
            sessions_dir: dir.join("sessions"),
            history_file: dir.join("history.min"),
            debug_log: dir.join("debug.log"),
        }
    }

    #[test]
    fn parse_overrides_and_ignores_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = test_paths(dir.path());
        let mut cfg = Config::default();
        parse_config(
            "# comment\nmouse off\nscroll-step 5\nnot-a-key 1\nsessions-dir /tmp/s\n",
            &mut cfg,
            &mut paths,
        );
        assert!(!cfg.mouse_enabled);
        assert_eq!(cfg.scroll_step, 5);
        assert_eq!(paths.sessions_dir, PathBuf::from("/tmp/s"));
    }

    #[test]
    fn zero_scroll_step_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = test_paths(dir.path());
        let mut cfg = Config::default();
        parse_config("scroll-step 0\n", &mut cfg, &mut paths);
        assert_eq!(cfg.scroll_step, 3);
    }

    #[test]
    fn sessions_dir_prefers_existing_local() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sessions")).unwrap();
        assert_eq!(resolve_sessions_dir(dir.path()), dir.path().join("sessions"));
    }

    #[test]
    fn sessions_dir_escapes_bin() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        assert_eq!(resolve_sessions_dir(&bin), dir.path().join("sessions"));
    }

    #[test]
    fn initial_cwd_is_a_directory() {
        assert!(initial_cwd().is_dir());
    }
}
