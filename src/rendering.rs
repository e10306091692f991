use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use unicode_width::UnicodeWidthChar;

use crate::grid::{Grid, FG_INTENSITY};
use crate::pane::Pane;
use crate::tree::{rect_of, split_rects};
use crate::types::{AppState, Node, SplitKind};

/// Map a legacy console attribute word to terminal colours. The low nibble
/// is the foreground, the next nibble the background.
pub fn attr_to_style(attr: u16) -> Style {
    let fg = nibble_to_color(attr & 0xF);
    let bg = (attr >> 4) & 0xF;
    let mut style = Style::default().fg(fg);
    if bg != 0 {
        style = style.bg(nibble_to_color(bg));
    }
    if attr & FG_INTENSITY != 0 {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

fn nibble_to_color(n: u16) -> Color {
    match n {
        0 => Color::Reset,
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Cyan,
        4 => Color::Red,
        5 => Color::Magenta,
        6 => Color::Yellow,
        7 => Color::Gray,
        8 => Color::DarkGray,
        9 => Color::LightBlue,
        10 => Color::LightGreen,
        11 => Color::LightCyan,
        12 => Color::LightRed,
        13 => Color::LightMagenta,
        14 => Color::LightYellow,
        15 => Color::White,
        _ => Color::Reset,
    }
}

/// First visible line of a pane's viewport for the given height.
pub fn viewport_start(grid: &Grid, view_h: usize, scroll_offset: usize) -> usize {
    let total = grid.lines.len();
    let start = total.saturating_sub(view_h + scroll_offset);
    start.min(total.saturating_sub(1))
}

/// Scrollbar thumb geometry: (thumb_y, thumb_h) within a track of `view_h`
/// rows over `total` lines starting at `start`.
pub fn scrollbar_thumb(total: usize, view_h: usize, start: usize) -> (usize, usize) {
    let h = ((view_h * view_h) / total).max(1);
    let mut y = (start * view_h) / total;
    if y + h > view_h {
        y = view_h - h;
    }
    (y, h)
}

/// Invert a click at track row `y` back to a scroll offset.
pub fn scrollbar_click_offset(total: usize, view_h: usize, y: usize) -> usize {
    let start = (y * total) / view_h.max(1);
    total.saturating_sub(view_h).saturating_sub(start.min(total))
        .min(total.saturating_sub(view_h))
}

/// Composite the whole tree into the frame buffer and park the hardware
/// cursor on the active pane. One `terminal.draw` call flushes everything,
/// so partially drawn frames never reach the console.
pub fn render(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    app.last_area = area;
    render_node(f.buffer_mut(), &app.root, area);

    if let Some(rect) = rect_of(&app.root, area, &app.active_path) {
        if let Some(pane) = crate::tree::pane_at(&app.root, &app.active_path) {
            let cx = (rect.x + pane.cx as u16).min(area.width.saturating_sub(1));
            let cy = (rect.y + pane.cy as u16).min(area.height.saturating_sub(1));
            f.set_cursor_position((cx, cy));
        }
    }
}

fn render_node(buf: &mut Buffer, node: &Node, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match node {
        Node::Leaf(pane) => render_pane(buf, pane, area),
        Node::Split { kind, ratio, children } => {
            let (a, b, divider) = split_rects(*kind, *ratio, area);
            if let Some(child) = children.first() {
                render_node(buf, child, a);
            }
            if let Some(child) = children.get(1) {
                render_node(buf, child, b);
            }
            draw_divider(buf, *kind, divider);
        }
    }
}

fn draw_divider(buf: &mut Buffer, kind: SplitKind, rect: Rect) {
    let style = Style::default().fg(Color::DarkGray);
    let symbol = match kind {
        SplitKind::Vertical => "│",
        SplitKind::Horizontal => "─",
    };
    for y in rect.top()..rect.bottom() {
        for x in rect.left()..rect.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(symbol).set_style(style);
            }
        }
    }
}

fn render_pane(buf: &mut Buffer, pane: &Pane, rect: Rect) {
    let grid = &pane.grid;
    let view_h = (grid.rows).min(rect.height as usize);
    let start = viewport_start(grid, grid.rows, pane.scroll_offset);

    for y in 0..view_h {
        let Some(line) = grid.lines.get(start + y) else { break };
        let max_x = (rect.width as usize).min(line.cells.len());
        let mut x = 0;
        while x < max_x {
            let cell = line.cells[x];
            if let Some(out) = buf.cell_mut((rect.x + x as u16, rect.y + y as u16)) {
                out.set_char(cell.ch).set_style(attr_to_style(cell.attr));
            }
            // A wide glyph owns the following cell as well.
            let w = UnicodeWidthChar::width(cell.ch).unwrap_or(1).max(1);
            x += w;
        }
    }

    // Scrollbar on the last column once history outgrows the pane.
    let total = grid.lines.len();
    if total > rect.height as usize && rect.width > 0 {
        let track_x = rect.right() - 1;
        let (thumb_y, thumb_h) = scrollbar_thumb(total, rect.height as usize, start);
        let style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
        for y in 0..rect.height as usize {
            let symbol = if y >= thumb_y && y < thumb_y + thumb_h { "█" } else { "│" };
            if let Some(out) = buf.cell_mut((track_x, rect.y + y as u16)) {
                out.set_symbol(symbol).set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DEFAULT_ATTR, FG_GREEN, FG_RED};

    #[test]
    fn attr_map_covers_defaults_and_bold() {
        let st = attr_to_style(DEFAULT_ATTR);
        assert_eq!(st.fg, Some(Color::Gray));
        assert_eq!(st.bg, None);
        let bold = attr_to_style(FG_GREEN | FG_INTENSITY);
        assert!(bold.add_modifier.contains(Modifier::BOLD));
        assert_eq!(attr_to_style(FG_RED).fg, Some(Color::Red));
    }

    #[test]
    fn viewport_pinned_to_bottom_shows_last_rows() {
        let mut g = Grid::new(10, 4);
        for _ in 0..16 {
            g.scroll_up();
        }
        assert_eq!(g.lines.len(), 20);
        assert_eq!(viewport_start(&g, 4, 0), 16);
        assert_eq!(viewport_start(&g, 4, 5), 11);
        // Scrolled all the way back, clamped to the first line.
        assert_eq!(viewport_start(&g, 4, 1000), 0);
    }

    #[test]
    fn thumb_fits_the_track() {
        let (y, h) = scrollbar_thumb(2000, 20, 1980);
        assert!(h >= 1);
        assert!(y + h <= 20);
        let (y0, h0) = scrollbar_thumb(40, 20, 0);
        assert_eq!(y0, 0);
        assert_eq!(h0, 10);
    }

    #[test]
    fn click_offset_inverts_thumb_position() {
        // Click at the top of the track scrolls to the oldest lines; at the
        // bottom, back to (near) the live tail.
        let total = 100;
        let view = 20;
        assert_eq!(scrollbar_click_offset(total, view, 0), total - view);
        let near_tail = scrollbar_click_offset(total, view, view - 1);
        assert!(near_tail <= 5);
    }

    #[test]
    fn render_composites_cells_and_scrollbar() {
        let mut pane = Pane::new(1, 10, 4, std::env::temp_dir(), None);
        for i in 0..8 {
            pane.write_str(&format!("row{i}\n"));
        }
        let rect = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(rect);
        render_pane(&mut buf, &pane, rect);
        // Last column is the scrollbar track.
        let track: Vec<&str> = (0..4).map(|y| buf.cell((9u16, y as u16)).unwrap().symbol()).collect();
        assert!(track.iter().all(|s| *s == "│" || *s == "█"));
        assert!(track.iter().any(|s| *s == "█"));
        // The viewport shows the tail of the scrollback.
        let first_row: String = (0..4).map(|x| buf.cell((x as u16, 0u16)).unwrap().symbol().to_string()).collect();
        assert!(first_row.starts_with("row5"));
    }
}
