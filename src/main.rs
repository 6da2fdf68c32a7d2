//! Itemdex - Entry Point
//!
//! Initializes logging and the terminal, then runs the UI loop.

use std::fs::OpenOptions;
use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use itemdex::render::KittyGraphics;
use itemdex::{App, CatalogConfig};

/// Target frames per second for the UI loop
const TARGET_FPS: u64 = 30;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

fn main() -> Result<()> {
    // Log to a file so output never lands on the TUI
    let log_target: Box<dyn io::Write + Send> = match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("itemdex.log")
    {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::sink()),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(log_target))
        .init();

    log::info!("Starting Itemdex v{}", env!("CARGO_PKG_VERSION"));

    let config = CatalogConfig::load();
    let mut app = App::new(&config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut kitty = KittyGraphics::stdout();

    let result = run_ui_loop(&mut terminal, &mut app, &mut kitty);

    // Restore terminal
    if app.render_mode().supports_images() {
        let _ = kitty.clear_all();
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Itemdex exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Itemdex shut down cleanly");
    result
}

/// Main UI loop
fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    kitty: &mut KittyGraphics,
) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        // Drain pending input
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(_, _) => app.invalidate_images(),
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }

        app.tick();

        terminal.draw(|frame| app.render(frame))?;
        app.present_images(kitty)?;

        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
