use std::fs;
use std::io;
use std::path::PathBuf;

/// Contents of a saved session: the working directory and the raw grid text
/// (re-interpreted through the emulator on load, so stored ANSI sequences
/// come back in colour).
#[derive(Default, Debug)]
pub struct SessionData {
    pub cwd: String,
    pub content: String,
}

/// On-disk store for named sessions, `<name>.sesh` files under the resolved
/// sessions directory.
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: PathBuf) -> Self {
        SessionStore { root }
    }

    fn ensure_dir(&self) -> io::Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    fn file_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.sesh"))
    }

    /// Line 1 is the cwd; the rest is the grid text verbatim.
    pub fn save(&self, name: &str, content: &str, cwd: &str) -> io::Result<()> {
        self.ensure_dir()?;
        fs::write(self.file_for(name), format!("{cwd}\n{content}"))
    }

    pub fn load(&self, name: &str) -> io::Result<SessionData> {
        let raw = fs::read_to_string(self.file_for(name))?;
        let mut data = SessionData::default();
        match raw.split_once('\n') {
            Some((first, rest)) => {
                data.cwd = first.trim_end_matches('\r').to_string();
                data.content = rest.to_string();
            }
            None => {
                data.cwd = raw.trim_end_matches('\r').to_string();
            }
        }
        Ok(data)
    }

    pub fn remove(&self, name: &str) -> io::Result<bool> {
        let path = self.file_for(name);
        if path.exists() {
            fs::remove_file(path)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Saved session file names (with the `.sesh` suffix), sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.root) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "sesh").unwrap_or(false) {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        names.push(name.to_string());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
