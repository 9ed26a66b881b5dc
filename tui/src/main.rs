//! Terminal Minesweeper on top of the `sweeps-core` rules engine.
//!
//! The whole frontend is synchronous: one event at a time, each board call
//! runs to completion before the next event is read. A short poll timeout
//! keeps the timer repainting between events.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use sweeps_core::Difficulty;

use crate::app::App;

mod app;
mod records;
mod ui;

#[derive(Parser, Debug)]
#[command(name = "sweeps", about = "Minesweeper in the terminal", version)]
struct Cli {
    /// Board preset: beginner, intermediate, or advanced
    #[arg(short, long, default_value = "beginner")]
    difficulty: Difficulty,

    /// Fixed RNG seed for a reproducible mine layout
    #[arg(long)]
    seed: Option<u64>,

    /// File holding the best time in milliseconds
    #[arg(long, default_value = "sweeps_best_time.txt")]
    record_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut app = App::new(cli.difficulty, cli.seed, cli.record_file);
    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

/// The terminal is owned by the UI, so logs only go to a side file, and only
/// when `RUST_LOG` asks for them.
fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let Ok(file) = std::fs::File::create("sweeps.log") else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    app.handle_key(key.code);
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }
    Ok(())
}
