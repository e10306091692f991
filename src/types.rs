use chrono::{DateTime, Local};
use ratatui::prelude::Rect;

use crate::config::{Config, Paths};
use crate::pane::Pane;
use crate::store::SessionStore;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SplitKind {
    /// Side-by-side panes separated by a `│` divider column.
    Vertical,
    /// Stacked panes separated by a `─` divider row.
    Horizontal,
}

/// The layout tree. A split always owns exactly two children; child 0 is the
/// pane that was split, child 1 the newcomer. Nodes are addressed by
/// child-index paths from the root, so no parent back-pointers exist.
pub enum Node {
    Leaf(Pane),
    Split {
        kind: SplitKind,
        /// Share of the split axis given to child 0, clamped to (0, 1).
        ratio: f32,
        children: Vec<Node>,
    },
}

/// A detached pane parked in the background stash.
pub struct BackgroundPane {
    pub pane: Pane,
    pub detached_at: DateTime<Local>,
}

pub struct AppState {
    pub root: Node,
    pub active_path: Vec<usize>,
    /// FIFO of detached panes; `sesh retach <i>` consumes by index.
    pub background: Vec<BackgroundPane>,
    pub next_pane_id: u32,
    pub last_area: Rect,
    pub running: bool,
    pub store: SessionStore,
    pub paths: Paths,
    pub config: Config,
}

impl AppState {
    pub fn new(root: Node, paths: Paths, config: Config) -> Self {
        AppState {
            root,
            active_path: Vec::new(),
            background: Vec::new(),
            next_pane_id: 2, // pane 1 is created before the state
            last_area: Rect::new(0, 0, 0, 0),
            running: true,
            store: SessionStore::new(paths.sessions_dir.clone()),
            paths,
            config,
        }
    }

    pub fn take_pane_id(&mut self) -> u32 {
        let id = self.next_pane_id;
        self.next_pane_id += 1;
        id
    }
}
