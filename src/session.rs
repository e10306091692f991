use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::platform;

/// One pane's pairing with an (optionally running) child process plus the
/// command history shared through `history.min`.
///
/// Children are connected through plain pipes, not a PTY: cooked-mode line
/// programs are the target. Each output pipe gets a blocking reader thread
/// that forwards chunks over a channel, so `poll_output` is a channel drain
/// and never blocks the coordinator.
pub struct ShellSession {
    child: Option<Child>,
    child_pid: Option<u32>,
    stdin: Option<ChildStdin>,
    output_rx: Option<Receiver<Vec<u8>>>,
    cwd: PathBuf,

    history: Vec<String>,
    /// None = not navigating (the -1 sentinel of the history contract).
    history_index: Option<usize>,
    temp_history_input: String,
    history_file: Option<PathBuf>,
}

impl ShellSession {
    pub fn new(cwd: PathBuf) -> Self {
        ShellSession {
            child: None,
            child_pid: None,
            stdin: None,
            output_rx: None,
            cwd,
            history: Vec::new(),
            history_index: None,
            temp_history_input: String::new(),
            history_file: None,
        }
    }

    pub fn cwd(&self) -> &PathBuf {
        &self.cwd
    }

    pub fn set_cwd(&mut self, cwd: PathBuf) {
        self.cwd = cwd;
    }

    /// Spawn `program` with `args`, both ends piped. Fails when a child is
    /// already running for this session.
    pub fn execute(&mut self, program: &str, args: &[String]) -> io::Result<()> {
        if self.is_busy() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "a process is already running in this session",
            ));
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group so a control-break reaches the child, not us.
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(platform::CREATE_NEW_PROCESS_GROUP);
        }

        let mut child = cmd.spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        self.stdin = child.stdin.take();
        self.child_pid = Some(child.id());

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        if let Some(out) = stdout {
            spawn_reader(out, tx.clone());
        }
        if let Some(err) = stderr {
            spawn_reader(err, tx);
        }
        self.output_rx = Some(rx);
        self.child = Some(child);
        Ok(())
    }

    /// Drain whatever the reader threads have queued. Never blocks; returns
    /// an empty buffer when the child is quiet (or gone).
    pub fn poll_output(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(rx) = &self.output_rx {
            while let Ok(chunk) = rx.try_recv() {
                out.extend_from_slice(&chunk);
            }
        }
        out
    }

    /// Best-effort write to the child's stdin.
    pub fn write_input(&mut self, bytes: &[u8]) {
        if let Some(stdin) = &mut self.stdin {
            let _ = stdin.write_all(bytes);
            let _ = stdin.flush();
        }
    }

    /// Queries the child's exit status without blocking. The first call that
    /// observes exit releases the handles and the session returns to Idle.
    /// The output channel stays drainable so trailing bytes are not lost.
    pub fn is_busy(&mut self) -> bool {
        let exited = match &mut self.child {
            None => return false,
            Some(child) => !matches!(child.try_wait(), Ok(None)),
        };
        if exited {
            self.child = None;
            self.child_pid = None;
            self.stdin = None;
            return false;
        }
        true
    }

    /// Ctrl+C while the child runs: console control-break on Windows,
    /// best-effort kill elsewhere.
    pub fn interrupt(&mut self) {
        let delivered = self.child_pid.map(platform::send_ctrl_break).unwrap_or(false);
        if !delivered {
            if let Some(child) = &mut self.child {
                let _ = child.kill();
            }
        }
    }

    // --- command history -------------------------------------------------

    pub fn init_history(&mut self, path: PathBuf) {
        if let Ok(content) = fs::read_to_string(&path) {
            self.history
                .extend(content.lines().filter(|l| !l.is_empty()).map(|l| l.to_string()));
        }
        self.history_file = Some(path);
    }

    fn save_history(&self) {
        if let Some(path) = &self.history_file {
            let mut body = self.history.join("\n");
            if !body.is_empty() {
                body.push('\n');
            }
            let _ = fs::write(path, body);
        }
    }

    /// Ignores empty commands and immediate repeats; flushes to disk.
    pub fn add_history(&mut self, cmd: &str) {
        if cmd.is_empty() {
            return;
        }
        if self.history.last().map(|l| l == cmd).unwrap_or(false) {
            self.history_index = None;
            return;
        }
        self.history.push(cmd.to_string());
        self.history_index = None;
        self.save_history();
    }

    /// Move one step back in history, stashing the in-progress input on the
    /// first step. Returns an empty string when there is no history.
    pub fn history_up(&mut self, current_input: &str) -> String {
        if self.history.is_empty() {
            return String::new();
        }
        let idx = match self.history_index {
            None => {
                self.temp_history_input = current_input.to_string();
                self.history.len() - 1
            }
            Some(i) if i > 0 => i - 1,
            Some(i) => i,
        };
        self.history_index = Some(idx);
        self.history[idx].clone()
    }

    /// Move one step forward; stepping past the newest entry restores the
    /// stashed in-progress input and leaves navigation.
    pub fn history_down(&mut self) -> String {
        match self.history_index {
            None => String::new(),
            Some(i) if i + 1 < self.history.len() => {
                self.history_index = Some(i + 1);
                self.history[i + 1].clone()
            }
            Some(_) => {
                self.history_index = None;
                std::mem::take(&mut self.temp_history_input)
            }
        }
    }

    pub fn reset_history(&mut self) {
        self.history_index = None;
        self.temp_history_input.clear();
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        if let Some(child) = &mut self.child {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.save_history();
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R, tx: Sender<Vec<u8>>) {
    thread::spawn(move || {
        let mut buf = [0u8; 8192];
        loop {
            match pipe.read(&mut buf) {
                Ok(n) if n > 0 => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        }
    });
}
