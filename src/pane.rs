use std::path::PathBuf;

use crate::grid::{Cell, Grid, DEFAULT_ATTR, FG_BLUE, FG_GREEN, FG_INTENSITY, FG_RED};
use crate::session::ShellSession;
use crate::util::folder_name;

#[derive(Clone, Copy, PartialEq, Debug)]
enum AnsiState {
    Normal,
    Esc,
    Csi,
}

/// One virtual terminal: a grid plus the escape-sequence decoder feeding it,
/// the line editor owning the in-progress command, and the child-process
/// session bound to this pane.
pub struct Pane {
    pub id: u32,
    pub grid: Grid,
    pub session: ShellSession,
    pub cwd: PathBuf,

    pub current_input: String,
    /// Char index into `current_input`.
    pub input_cursor: usize,
    pub has_selection: bool,
    pub selection_start: usize,
    pub selection_end: usize,

    /// 0 = pinned to the bottom; positive scrolls up into history.
    pub scroll_offset: usize,
    /// True between dispatching an external command and observing its exit.
    pub waiting: bool,

    // Emulator state.
    pub cx: usize,
    pub cy: usize,
    attr: u16,
    state: AnsiState,
    params: String,
}

impl Pane {
    pub fn new(id: u32, cols: usize, rows: usize, cwd: PathBuf, history_file: Option<PathBuf>) -> Self {
        let mut session = ShellSession::new(cwd.clone());
        if let Some(path) = history_file {
            session.init_history(path);
        }
        Pane {
            id,
            grid: Grid::new(cols, rows),
            session,
            cwd,
            current_input: String::new(),
            input_cursor: 0,
            has_selection: false,
            selection_start: 0,
            selection_end: 0,
            scroll_offset: 0,
            waiting: false,
            cx: 0,
            cy: 0,
            attr: DEFAULT_ATTR,
            state: AnsiState::Normal,
            params: String::new(),
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        if cols == 0 || rows == 0 {
            return;
        }
        self.grid.resize(cols, rows);
        if self.cx >= cols {
            self.cx = cols - 1;
        }
        if self.cy >= rows {
            self.cy = rows - 1;
        }
    }

    // --- emulator --------------------------------------------------------

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for c in String::from_utf8_lossy(bytes).chars() {
            self.put_char(c);
        }
    }

    pub fn write_str(&mut self, text: &str) {
        for c in text.chars() {
            self.put_char(c);
        }
    }

    pub fn put_char(&mut self, c: char) {
        if self.state != AnsiState::Normal {
            self.handle_ansi(c);
            return;
        }
        match c {
            '\x1b' => self.state = AnsiState::Esc,
            '\n' => {
                self.new_line();
                self.cx = 0;
            }
            '\r' => self.cx = 0,
            '\x08' => self.backspace(),
            c if c as u32 >= 0x20 => {
                if self.cx >= self.grid.cols {
                    self.new_line();
                    self.cx = 0;
                }
                let abs = self.grid.abs_row(self.cy);
                self.grid.write_cell(self.cx, abs, Cell::new(c, self.attr));
                self.cx += 1;
            }
            _ => {} // remaining control bytes are discarded
        }
    }

    fn handle_ansi(&mut self, c: char) {
        match self.state {
            AnsiState::Esc => {
                if c == '[' {
                    self.state = AnsiState::Csi;
                    self.params.clear();
                } else {
                    // Unknown sequence, drop it.
                    self.state = AnsiState::Normal;
                }
            }
            AnsiState::Csi => {
                if c.is_ascii_digit() || c == ';' {
                    self.params.push(c);
                } else {
                    if c == 'm' {
                        self.apply_sgr();
                    }
                    self.state = AnsiState::Normal;
                }
            }
            AnsiState::Normal => {}
        }
    }

    fn apply_sgr(&mut self) {
        let mut codes: Vec<u16> = self
            .params
            .split(';')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        if codes.is_empty() {
            codes.push(0);
        }
        for code in codes {
            match code {
                0 => self.attr = DEFAULT_ATTR,
                1 => self.attr |= FG_INTENSITY,
                30..=37 => {
                    self.attr &= !(FG_RED | FG_GREEN | FG_BLUE);
                    self.attr |= ansi_base_bits(code - 30);
                }
                90..=97 => {
                    self.attr &= !(FG_RED | FG_GREEN | FG_BLUE);
                    self.attr |= FG_INTENSITY | ansi_base_bits(code - 90);
                }
                _ => {} // background colours and the rest are not implemented
            }
        }
    }

    fn new_line(&mut self) {
        self.cy += 1;
        if self.cy >= self.grid.rows {
            self.grid.scroll_up();
            self.cy = self.grid.rows - 1;
        }
    }

    fn backspace(&mut self) {
        if self.cx > 0 {
            self.cx -= 1;
            let abs = self.grid.abs_row(self.cy);
            self.grid.write_cell(self.cx, abs, Cell::new(' ', self.attr));
        }
    }

    // --- scrolling -------------------------------------------------------

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.grid.max_scroll() as isize;
        self.scroll_offset = (self.scroll_offset as isize + delta).clamp(0, max) as usize;
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }

    // --- line editor -----------------------------------------------------

    pub fn input_len(&self) -> usize {
        self.current_input.chars().count()
    }

    fn byte_cursor(&self) -> usize {
        byte_index(&self.current_input, self.input_cursor)
    }

    fn suffix(&self) -> String {
        self.current_input[self.byte_cursor()..].to_string()
    }

    pub fn insert_char(&mut self, c: char) {
        if self.waiting {
            return;
        }
        self.has_selection = false;
        let at = self.byte_cursor();
        self.current_input.insert(at, c);
        self.input_cursor += 1;
        self.put_char(c);
        let suffix = self.suffix();
        if !suffix.is_empty() {
            let n = suffix.chars().count();
            self.write_str(&suffix);
            self.cursor_back(n);
        }
    }

    /// Backspace: remove the char before the cursor and close the gap.
    pub fn delete_char(&mut self) {
        if self.waiting || self.input_cursor == 0 {
            return;
        }
        self.has_selection = false;
        self.input_cursor -= 1;
        let at = self.byte_cursor();
        self.current_input.remove(at);
        self.put_char('\x08');
        let suffix = self.suffix();
        if !suffix.is_empty() {
            let n = suffix.chars().count();
            self.write_str(&suffix);
            self.put_char(' ');
            self.cursor_back(n + 1);
        }
    }

    /// Delete: remove the char under the cursor.
    pub fn delete_char_forward(&mut self) {
        if self.waiting || self.input_cursor >= self.input_len() {
            return;
        }
        self.has_selection = false;
        let at = self.byte_cursor();
        self.current_input.remove(at);
        let suffix = self.suffix();
        let n = suffix.chars().count();
        self.write_str(&suffix);
        self.put_char(' ');
        self.cursor_back(n + 1);
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.waiting {
            return;
        }
        let len = self.input_len() as isize;
        let target = (self.input_cursor as isize + delta).clamp(0, len) as usize;
        let moved = target as isize - self.input_cursor as isize;
        if moved > 0 {
            self.cursor_fwd(moved as usize);
        } else {
            self.cursor_back((-moved) as usize);
        }
        self.input_cursor = target;
    }

    pub fn move_home(&mut self) {
        let back = self.input_cursor as isize;
        self.move_cursor(-back);
    }

    pub fn move_end(&mut self) {
        let fwd = self.input_len() as isize - self.input_cursor as isize;
        self.move_cursor(fwd);
    }

    pub fn select_all(&mut self) {
        if self.waiting {
            return;
        }
        self.has_selection = true;
        self.selection_start = 0;
        self.selection_end = self.input_len();
        self.move_end();
    }

    /// Text that a clipboard copy should take: the marked range when one is
    /// active, the whole buffer otherwise.
    pub fn selection_text(&self) -> String {
        if self.has_selection && self.selection_start < self.selection_end {
            let start = byte_index(&self.current_input, self.selection_start);
            let end = byte_index(&self.current_input, self.selection_end);
            return self.current_input[start..end].to_string();
        }
        self.current_input.clone()
    }

    /// Replace the whole input line, erasing the old one visually first.
    /// Drives the history Up/Down key handlers.
    pub fn replace_input(&mut self, text: &str) {
        if self.waiting {
            return;
        }
        self.move_end();
        while !self.current_input.is_empty() {
            self.delete_char();
        }
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    /// Ctrl+L: redraw the input from the prompt end. The walk back is a
    /// no-op once the cursor reaches the grid origin.
    pub fn repaint(&mut self) {
        self.cursor_back(self.input_cursor);
        let text = self.current_input.clone();
        let len = text.chars().count();
        self.write_str(&text);
        self.cursor_back(len - self.input_cursor);
    }

    /// Walk the visual cursor back `n` cells, wrapping row boundaries.
    fn cursor_back(&mut self, n: usize) {
        for _ in 0..n {
            if self.cx > 0 {
                self.cx -= 1;
            } else if self.cy > 0 {
                self.cy -= 1;
                self.cx = self.grid.cols - 1;
            } else {
                break;
            }
        }
    }

    fn cursor_fwd(&mut self, n: usize) {
        for _ in 0..n {
            self.cx += 1;
            if self.cx >= self.grid.cols {
                self.cx = 0;
                if self.cy + 1 < self.grid.rows {
                    self.cy += 1;
                }
            }
        }
    }

    // --- prompt & serialisation -----------------------------------------

    pub fn prompt_string(&self, leading_newline: bool) -> String {
        let folder = folder_name(self.session.cwd());
        let nl = if leading_newline { "\n" } else { "" };
        format!("{nl}\x1b[36mMinSh[{}]\x1b[0m@\x1b[32m{}\x1b[0m: ", self.id, folder)
    }

    pub fn emit_prompt(&mut self, leading_newline: bool) {
        let prompt = self.prompt_string(leading_newline);
        self.write_str(&prompt);
    }

    /// Grid text for `sesh save`: trailing spaces stripped, empty lines
    /// skipped, each line newline-terminated.
    pub fn grid_text(&self) -> String {
        let mut out = String::new();
        for line in self.grid.lines.iter() {
            let text = line.text_trimmed();
            if !text.is_empty() {
                out.push_str(&text);
                out.push('\n');
            }
        }
        out
    }

    /// `sesh load`: drop the old grid, replay the stored content through the
    /// emulator so saved escape sequences are re-interpreted.
    pub fn load_content(&mut self, content: &str) {
        self.grid = Grid::new(self.grid.cols, self.grid.rows);
        self.cx = 0;
        self.cy = 0;
        self.attr = DEFAULT_ATTR;
        self.state = AnsiState::Normal;
        self.scroll_offset = 0;
        self.current_input.clear();
        self.input_cursor = 0;
        self.write_str(content);
    }
}

fn ansi_base_bits(n: u16) -> u16 {
    match n {
        1 => FG_RED,
        2 => FG_GREEN,
        3 => FG_RED | FG_GREEN,
        4 => FG_BLUE,
        5 => FG_RED | FG_BLUE,
        6 => FG_GREEN | FG_BLUE,
        7 => FG_RED | FG_GREEN | FG_BLUE,
        _ => 0,
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SCROLLBACK_MAX;

    fn pane(cols: usize, rows: usize) -> Pane {
        Pane::new(1, cols, rows, std::env::temp_dir(), None)
    }

    fn row_text(p: &Pane, cy: usize) -> String {
        let abs = p.grid.abs_row(cy);
        p.grid.lines[abs].text_trimmed()
    }

    #[test]
    fn plain_text_advances_cursor() {
        let mut p = pane(20, 5);
        p.write_str("hi");
        assert_eq!(row_text(&p, 0), "hi");
        assert_eq!((p.cx, p.cy), (2, 0));
    }

    #[test]
    fn newline_and_carriage_return() {
        let mut p = pane(20, 5);
        p.write_str("ab\ncd\rC");
        assert_eq!(row_text(&p, 0), "ab");
        assert_eq!(row_text(&p, 1), "Cd");
        assert_eq!((p.cx, p.cy), (1, 1));
    }

    #[test]
    fn long_line_wraps_implicitly() {
        let mut p = pane(4, 5);
        p.write_str("abcdef");
        assert_eq!(row_text(&p, 0), "abcd");
        assert_eq!(row_text(&p, 1), "ef");
    }

    #[test]
    fn backspace_clears_cell_and_stops_at_column_zero() {
        let mut p = pane(20, 5);
        p.write_str("ab\x08");
        assert_eq!(row_text(&p, 0), "a");
        assert_eq!(p.cx, 1);
        p.write_str("\x08\x08\x08");
        assert_eq!(p.cx, 0);
    }

    #[test]
    fn other_control_bytes_are_discarded() {
        let mut p = pane(20, 5);
        p.write_str("a\x07\x01b");
        assert_eq!(row_text(&p, 0), "ab");
    }

    #[test]
    fn sgr_red_then_reset() {
        let mut p = pane(20, 5);
        p.write_str("\x1b[31mA\x1b[0mB");
        assert_eq!(p.grid.get_cell(0, 0).attr, FG_RED);
        assert_eq!(p.grid.get_cell(1, 0).attr, DEFAULT_ATTR);
    }

    #[test]
    fn sgr_supported_codes_round_trip() {
        for code in (30u16..=37).chain(90..=97) {
            let mut p = pane(20, 5);
            p.write_str(&format!("\x1b[{code}mX\x1b[0mY"));
            let base = if code >= 90 { code - 90 } else { code - 30 };
            let mut want = ansi_base_bits(base);
            if code >= 90 {
                want |= FG_INTENSITY;
            }
            assert_eq!(p.grid.get_cell(0, 0).attr, want, "code {code}");
            assert_eq!(p.grid.get_cell(1, 0).attr, DEFAULT_ATTR, "code {code}");
        }
    }

    #[test]
    fn sgr_bold_sets_intensity() {
        let mut p = pane(20, 5);
        p.write_str("\x1b[1;32mG");
        assert_eq!(p.grid.get_cell(0, 0).attr, FG_GREEN | FG_INTENSITY);
    }

    #[test]
    fn sgr_empty_params_reset() {
        let mut p = pane(20, 5);
        p.write_str("\x1b[31mA\x1b[mB");
        assert_eq!(p.grid.get_cell(1, 0).attr, DEFAULT_ATTR);
    }

    #[test]
    fn unknown_csi_and_esc_sequences_are_dropped() {
        let mut p = pane(20, 5);
        p.write_str("\x1b[2J\x1bMA");
        assert_eq!(row_text(&p, 0), "A");
        assert_eq!(p.grid.get_cell(0, 0).attr, DEFAULT_ATTR);
    }

    #[test]
    fn unknown_sgr_codes_are_ignored() {
        let mut p = pane(20, 5);
        p.write_str("\x1b[45mX");
        assert_eq!(p.grid.get_cell(0, 0).attr, DEFAULT_ATTR);
    }

    #[test]
    fn scrollback_cap_keeps_the_newest_two_thousand() {
        let mut p = pane(80, 24);
        let body: Vec<String> = (0..3000).map(|i| format!("line {i}")).collect();
        p.write_str(&body.join("\n"));
        assert_eq!(p.grid.lines.len(), SCROLLBACK_MAX);
        // 1000 evictions: the 1001st written line is now first.
        assert_eq!(p.grid.lines[0].text_trimmed(), "line 1000");
    }

    #[test]
    fn prompt_then_echo_matches_input() {
        let mut p = pane(80, 24);
        p.emit_prompt(false);
        let prompt_len = p.cx;
        for c in "say hello".chars() {
            p.insert_char(c);
        }
        assert_eq!(row_text(&p, 0).chars().skip(prompt_len).collect::<String>(), "say hello");
        assert_eq!(p.cx, prompt_len + p.input_cursor);
    }

    #[test]
    fn insert_in_the_middle_reflows_suffix() {
        let mut p = pane(80, 24);
        p.emit_prompt(false);
        let prompt_len = p.cx;
        for c in "helo".chars() {
            p.insert_char(c);
        }
        p.move_cursor(-1);
        p.insert_char('l');
        assert_eq!(p.current_input, "hello");
        assert_eq!(row_text(&p, 0).chars().skip(prompt_len).collect::<String>(), "hello");
        assert_eq!(p.cx, prompt_len + p.input_cursor);
        assert_eq!(p.input_cursor, 4);
    }

    #[test]
    fn delete_back_closes_the_gap() {
        let mut p = pane(80, 24);
        p.emit_prompt(false);
        let prompt_len = p.cx;
        for c in "abcd".chars() {
            p.insert_char(c);
        }
        p.move_cursor(-2);
        p.delete_char();
        assert_eq!(p.current_input, "acd");
        assert_eq!(row_text(&p, 0).chars().skip(prompt_len).collect::<String>(), "acd");
        assert_eq!(p.cx, prompt_len + 1);
    }

    #[test]
    fn delete_forward_under_cursor() {
        let mut p = pane(80, 24);
        p.emit_prompt(false);
        for c in "abcd".chars() {
            p.insert_char(c);
        }
        p.move_home();
        p.delete_char_forward();
        assert_eq!(p.current_input, "bcd");
        assert_eq!(p.input_cursor, 0);
    }

    #[test]
    fn cursor_walk_wraps_row_boundaries() {
        let mut p = pane(10, 5);
        for c in "abcdefghijkl".chars() {
            p.insert_char(c);
        }
        assert_eq!((p.cx, p.cy), (2, 1));
        p.move_cursor(-3);
        assert_eq!((p.cx, p.cy), (9, 0));
        p.move_cursor(3);
        assert_eq!((p.cx, p.cy), (2, 1));
    }

    #[test]
    fn replace_input_swaps_the_visible_line() {
        let mut p = pane(80, 24);
        p.emit_prompt(false);
        let prompt_len = p.cx;
        for c in "draft".chars() {
            p.insert_char(c);
        }
        p.move_cursor(-2);
        p.replace_input("two");
        assert_eq!(p.current_input, "two");
        assert_eq!(p.input_cursor, 3);
        assert_eq!(row_text(&p, 0).chars().skip(prompt_len).collect::<String>(), "two");
        assert_eq!(p.cx, prompt_len + 3);
    }

    #[test]
    fn editor_is_inert_while_waiting() {
        let mut p = pane(80, 24);
        p.waiting = true;
        p.insert_char('x');
        p.delete_char();
        p.replace_input("y");
        assert!(p.current_input.is_empty());
    }

    #[test]
    fn select_all_marks_whole_buffer() {
        let mut p = pane(80, 24);
        for c in "abc".chars() {
            p.insert_char(c);
        }
        p.move_home();
        p.select_all();
        assert!(p.has_selection);
        assert_eq!(p.selection_text(), "abc");
        assert_eq!(p.input_cursor, 3);
        // Typing clears the selection.
        p.insert_char('d');
        assert!(!p.has_selection);
    }

    #[test]
    fn repaint_is_a_noop_at_origin() {
        let mut p = pane(80, 24);
        p.repaint();
        assert_eq!((p.cx, p.cy), (0, 0));
    }

    #[test]
    fn save_and_load_round_trip_through_emulator() {
        let mut p = pane(40, 6);
        p.write_str("\x1b[36mtitle\x1b[0m\nbody");
        let saved = p.grid_text();
        assert_eq!(saved, "title\nbody\n");
        p.load_content("\x1b[31mred\x1b[0m line\n");
        assert_eq!(p.grid.lines[p.grid.abs_row(0)].text_trimmed(), "red line");
        assert_eq!(p.grid.get_cell(0, p.grid.abs_row(0)).attr, FG_RED);
    }
}
