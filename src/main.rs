use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal, ExecutableCommand,
};

use snake_game::config::{ConfigOverrides, GameConfig};
use snake_game::error::GameError;
use snake_game::events::panic_message;
use snake_game::Session;

#[derive(Parser, Debug)]
#[command(name = "snake_game", about = "Snake in the terminal")]
struct Cli {
    /// TOML file with game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board width in cells
    #[arg(long)]
    cols: Option<i32>,

    /// Board height in cells
    #[arg(long)]
    rows: Option<i32>,

    /// Movement interval in milliseconds at speed 1.0
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Tick scale; below 1.0 is faster and scores a bonus
    #[arg(long)]
    speed: Option<f64>,

    /// Seed for reproducible food and power-up placement
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write logs (defaults to the temp directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            cols: self.cols,
            rows: self.rows,
            base_tick_ms: self.tick_ms,
            speed_multiplier: self.speed,
            seed: self.seed,
        }
    }
}

/// Logs go to a file; stdout belongs to the game.
fn init_logging(path: Option<PathBuf>) {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("snake_game.log"));
    let writer: Box<dyn Write + Send> = match File::create(&path) {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(std::io::sink()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .init();
}

/// While the game owns the terminal, panics go to the log instead of being
/// printed over the board.  Listener panics are caught by the bus and the
/// game carries on.
fn log_panics() {
    panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let message = panic_message(info.payload());
        tracing::error!(%location, %message, "panic");
    }));
}

fn load_config(cli: &Cli) -> Result<GameConfig, GameError> {
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    Ok(config.apply(&cli.overrides()).validate()?)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.  Input arrives over `rx` from the reader
/// thread; the simulation is fed real elapsed time each frame.
fn game_loop<W: Write>(
    out: &mut W,
    session: &Session,
    config: &GameConfig,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let frame = config.frame();
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    modifiers,
                    ..
                }) => match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    _ => session.handle_key(code),
                },
                Event::Resize(w, h) => session.resize(w, h),
                _ => {}
            }
        }

        let now = Instant::now();
        session.frame(now - last);
        last = now;

        session.render(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), GameError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.clone());

    let config = load_config(&cli)?;
    let (width, height) = terminal::size()?;
    // Checked before touching the terminal so the error prints cleanly.
    let session = Session::new(&config, width, height)?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    log_panics();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        game_loop(&mut out, &session, &config, &rx)
    }));

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = panic::take_hook();

    let result = match result {
        Ok(result) => result,
        Err(payload) => {
            eprintln!("snake_game crashed: {}", panic_message(payload.as_ref()));
            panic::resume_unwind(payload);
        }
    };

    tracing::info!(score = session.score().score, "bye");
    result.map_err(GameError::from)
}
