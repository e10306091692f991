mod app;
mod commands;
mod config;
mod grid;
mod input;
mod lexer;
mod pane;
mod platform;
mod rendering;
mod session;
mod store;
mod tree;
mod types;
mod util;

use std::io;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("-h" | "--help" | "help") => {
            print_usage();
            return Ok(());
        }
        Some("-V" | "--version" | "version") => {
            println!("minsh {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let mut paths = config::resolve_paths();
    let cfg = config::load_config(&mut paths);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app::run(&mut terminal, paths, cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

fn print_usage() {
    println!("minsh - terminal shell + pane multiplexer");
    println!();
    println!("usage: minsh [-h | -V]");
    println!("Everything else happens at the prompt; type 'help' there.");
}
