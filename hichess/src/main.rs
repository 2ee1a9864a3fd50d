//! HiChess text front end.
//!
//! Renders the board after every change and reads commands from stdin.
//! Logs go to a file (see [`hichess::config::get_log_path`]) so stdout stays
//! reserved for the board.

use std::path::{Path, PathBuf};

use anyhow::Context;
use board::{AccessibleSides, BoardConfig, BoardEvent, ClickOutcome};
use chess::STARTING_FEN;
use clap::Parser;
use engine::{EngineConfig, Level, MoveSearch, UciEngine};
use hichess::input::{Input, HELP};
use hichess::session::SessionError;
use hichess::{
    config, render, spawn_session, ColorChoice, GameSetup, SessionConfig, SessionEvent,
    SessionHandle, SessionSnapshot, Settings, StartPosition,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "hichess", about = "Interactive chess board with an optional engine opponent")]
struct Cli {
    /// Start from this FEN instead of the standard position.
    #[arg(long)]
    fen: Option<String>,

    /// Start with black at the bottom.
    #[arg(long)]
    flipped: bool,

    /// Sides you may move: none, white, black or both.
    #[arg(long, default_value = "both")]
    sides: AccessibleSides,

    /// Keep the rest of the game while reviewing earlier moves.
    #[arg(long)]
    block_on_pop: bool,

    /// UCI engine executable. Selected and remembered in the settings.
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Engine strength, 0 (Very Easy) to 7 (Very Hard).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7))]
    level: Option<u8>,

    /// Your color against the engine: white, black or random.
    #[arg(long)]
    color: Option<ColorChoice>,

    /// Username to select and remember.
    #[arg(long)]
    username: Option<String>,

    /// Forget all remembered settings before starting.
    #[arg(long)]
    reset_settings: bool,
}

impl Cli {
    /// `--engine`, `--level` and `--color` each start a game against the
    /// engine.
    fn wants_engine(&self) -> bool {
        self.engine.is_some() || self.level.is_some() || self.color.is_some()
    }
}

fn init_tracing(log_path: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let dir = log_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file_name = log_path
        .file_name()
        .with_context(|| format!("Log path {} has no file name", log_path.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(guard)
}

/// Apply the settings flags and persist them when anything changed.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let path = config::get_settings_path();
    let mut settings = Settings::load(&path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let before = settings.clone();

    if cli.reset_settings {
        settings.reset();
    }
    if let Some(name) = &cli.username {
        settings.set_username(name)?;
    }
    if let Some(engine) = &cli.engine {
        settings.set_engine_path(engine)?;
    }

    if settings != before {
        settings
            .save(&path)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        tracing::info!("Settings updated");
    }
    Ok(settings)
}

async fn session_config(
    cli: &Cli,
    settings: &Settings,
) -> anyhow::Result<(SessionConfig, Option<Box<dyn MoveSearch>>)> {
    if !cli.wants_engine() {
        let config = SessionConfig {
            board: BoardConfig {
                fen: Some(cli.fen.clone().unwrap_or_else(|| STARTING_FEN.to_string())),
                flipped: cli.flipped,
                sides: cli.sides,
                block_on_pop: cli.block_on_pop,
            },
            online: false,
            opponent: None,
        };
        return Ok((config, None));
    }

    let setup = GameSetup {
        start: cli
            .fen
            .clone()
            .map_or(StartPosition::Standard, StartPosition::FromPosition),
        level: Level::new(cli.level.unwrap_or(0))?,
        color: cli.color.unwrap_or_default(),
    };
    let game = setup.resolve()?;
    let engine = UciEngine::spawn(EngineConfig {
        path: settings.engine_path.clone(),
        skill_level: Some(game.level.skill_level()),
        ..Default::default()
    })
    .await
    .context("Failed to start the engine")?;

    println!("You play {} against the engine ({}).", game.human, game.level);
    let engine: Box<dyn MoveSearch> = Box::new(engine);
    Ok((game.session_config(), Some(engine)))
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!();
    print!("{}", render::render_board(snapshot));
    println!("{}", render::render_status(snapshot));
    if !snapshot.move_list.is_empty() {
        print!("{}", render::render_move_list(&snapshot.move_list));
    }
}

fn show_event(event: SessionEvent) {
    match event {
        SessionEvent::StateChanged(snapshot) => print_snapshot(&snapshot),
        SessionEvent::Board(BoardEvent::Checkmate { winner }) => {
            println!("Checkmate, {winner} wins.");
        }
        SessionEvent::Board(BoardEvent::Draw) => println!("Draw."),
        SessionEvent::Board(BoardEvent::GameOver) => println!("Game over."),
        SessionEvent::Board(event) => tracing::debug!(?event, "Board event"),
        SessionEvent::Outbound(packet) => {
            tracing::debug!(%packet, "No server connection, packet dropped");
        }
        SessionEvent::GameStarted { color, opponent } => {
            println!("New game against {opponent}, you play {color}.");
        }
        SessionEvent::Chat(text) => println!("> {text}"),
        SessionEvent::ServerMessage(text) => println!("[server] {text}"),
        SessionEvent::ServerError(text) | SessionEvent::Error(text) => {
            println!("error: {text}");
        }
    }
}

async fn execute(
    session: &SessionHandle,
    username: Option<&str>,
    input: Input,
) -> Result<(), SessionError> {
    match input {
        Input::Click(square) => {
            if session.click(square).await? == ClickOutcome::Blocked {
                println!("Reviewing history, type `end` to return to the game.");
            }
        }
        Input::Mark(square) => {
            session.mark(square).await?;
        }
        Input::Move(mv) => {
            session.push(mv).await?;
        }
        Input::Undo => {
            if session.pop().await?.is_none() {
                println!("Nothing to undo.");
            }
        }
        Input::Redo => {
            if session.unpop().await?.is_none() {
                println!("Nothing to redo.");
            }
        }
        Input::GoTo(ply) => {
            session.go_to(ply).await?;
        }
        Input::Start => {
            session.go_to_start().await?;
        }
        Input::End => {
            session.go_to_end().await?;
        }
        Input::Flip => session.flip().await?,
        Input::Reset(fen) => {
            session.reset(fen).await?;
        }
        Input::Fen => println!("{}", session.get_snapshot().await?.fen),
        Input::Connect => match username {
            Some(name) => session.connect(name).await?,
            None => println!("Choose a username first (--username)."),
        },
        Input::Say(text) => session.send_chat(text).await?,
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
    Ok(())
}

async fn run_repl(session: &SessionHandle, username: Option<&str>) -> anyhow::Result<()> {
    let (snapshot, mut events) = session.subscribe().await?;
    print_snapshot(&snapshot);
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        if let Err(e) = execute(session, username, input).await {
                            println!("error: {e}");
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => show_event(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Missed {} session events", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&config::get_log_path())?;
    tracing::info!("HiChess starting up");

    let settings = load_settings(&cli)?;
    if let Some(name) = &settings.username {
        println!("Playing as {name}.");
    }

    let (config, engine) = session_config(&cli, &settings).await?;
    let session = spawn_session(config, engine)?;
    let result = run_repl(&session, settings.username.as_deref()).await;
    session.shutdown().await;

    tracing::info!("HiChess shutting down");
    result
}
