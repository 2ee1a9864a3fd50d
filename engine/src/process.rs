use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chess::Move;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

use crate::search::{MoveSearch, SearchBudget, SearchError};
use crate::uci::{parse_uci_message, UciError, UciMessage};
use crate::{EngineEvent, SearchProgress};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
/// Slack on top of the requested move time before a search is abandoned.
const SEARCH_GRACE: Duration = Duration::from_secs(10);
const DEPTH_SEARCH_TIMEOUT: Duration = Duration::from_secs(300);

/// How to launch and tune the engine process.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Executable. Falls back to well-known stockfish locations.
    pub path: Option<PathBuf>,
    pub args: Vec<String>,
    pub skill_level: Option<u8>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

/// A UCI engine running as a child process.
pub struct UciEngine {
    process: Child,
    stdin: mpsc::Sender<String>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl UciEngine {
    #[tracing::instrument(level = "info")]
    pub async fn spawn(config: EngineConfig) -> Result<Self, UciError> {
        let path = config
            .path
            .clone()
            .or_else(find_engine_path)
            .ok_or(UciError::NotFound)?;
        tracing::info!("Spawning engine at {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| UciError::Spawn {
                path: path.display().to_string(),
                source,
            })?;

        let mut stdin = process.stdin.take().ok_or(UciError::NoStdin)?;
        let stdout = process.stdout.take().ok_or(UciError::NoStdout)?;

        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(64);
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::warn!("Engine stdout EOF - engine closed");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        tracing::trace!("UCI << {}", trimmed);

                        let event = match parse_uci_message(trimmed) {
                            Ok(UciMessage::UciOk) => EngineEvent::UciOk,
                            Ok(UciMessage::ReadyOk) => EngineEvent::ReadyOk,
                            Ok(UciMessage::BestMove { mv, .. }) => EngineEvent::BestMove(mv),
                            Ok(UciMessage::Info(progress)) => EngineEvent::Progress(progress),
                            Ok(UciMessage::Id { name, value }) => {
                                tracing::debug!("Engine id {}: {}", name, value);
                                continue;
                            }
                            Err(_) => continue,
                        };
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error reading from engine stdout: {}", e);
                        break;
                    }
                }
            }
            tracing::debug!("Output reader task exiting");
        });

        let (stdin_tx, mut stdin_rx) = mpsc::channel::<String>(32);
        tokio::spawn(async move {
            while let Some(cmd) = stdin_rx.recv().await {
                tracing::trace!("UCI >> {}", cmd);
                let line = format!("{}\n", cmd);
                if let Err(e) = stdin.write_all(line.as_bytes()).await {
                    tracing::error!("Failed to write to engine stdin: {}", e);
                    break;
                }
                if let Err(e) = stdin.flush().await {
                    tracing::error!("Failed to flush engine stdin: {}", e);
                    break;
                }
            }
            tracing::debug!("Stdin writer task exiting");
        });

        let mut engine = Self {
            process,
            stdin: stdin_tx,
            event_rx,
        };

        engine.send("uci").await?;
        engine
            .wait_for("uciok", HANDSHAKE_TIMEOUT, |e| matches!(e, EngineEvent::UciOk))
            .await?;

        if let Some(level) = config.skill_level {
            tracing::info!("Setting skill level to {}", level);
            engine
                .send(format!("setoption name Skill Level value {}", level.min(20)))
                .await?;
        }
        if let Some(threads) = config.threads {
            let threads = threads.clamp(1, 16);
            tracing::info!("Setting Threads to {}", threads);
            engine
                .send(format!("setoption name Threads value {}", threads))
                .await?;
        }
        if let Some(hash_mb) = config.hash_mb {
            let hash_mb = hash_mb.clamp(1, 2048);
            tracing::info!("Setting Hash to {} MB", hash_mb);
            engine
                .send(format!("setoption name Hash value {}", hash_mb))
                .await?;
        }

        engine.sync().await?;
        tracing::info!("Engine initialized");
        Ok(engine)
    }

    async fn send(&self, cmd: impl Into<String>) -> Result<(), UciError> {
        self.stdin
            .send(cmd.into())
            .await
            .map_err(|_| UciError::Closed)
    }

    /// Discard events until one matches, failing after `limit`.
    async fn wait_for(
        &mut self,
        what: &'static str,
        limit: Duration,
        pred: impl Fn(&EngineEvent) -> bool,
    ) -> Result<EngineEvent, UciError> {
        let rx = &mut self.event_rx;
        tokio::time::timeout(limit, async {
            while let Some(event) = rx.recv().await {
                if pred(&event) {
                    return Ok(event);
                }
                tracing::trace!("Skipping {:?} while waiting for {}", event, what);
            }
            Err(UciError::Closed)
        })
        .await
        .map_err(|_| UciError::Timeout(what))?
    }

    /// Stop any running search and wait until the engine has caught up.
    ///
    /// Output of an abandoned search (its `bestmove` included) arrives before
    /// `readyok` and is discarded here.
    pub async fn sync(&mut self) -> Result<(), UciError> {
        self.send("stop").await?;
        self.send("isready").await?;
        self.wait_for("readyok", HANDSHAKE_TIMEOUT, |e| {
            matches!(e, EngineEvent::ReadyOk)
        })
        .await?;
        Ok(())
    }

    /// Search `fen` within `budget`. `None` when the engine has no move.
    pub async fn search(
        &mut self,
        fen: &str,
        budget: SearchBudget,
    ) -> Result<Option<Move>, UciError> {
        self.sync().await?;
        self.send(format!("position fen {}", fen)).await?;
        self.send(budget.go_command()).await?;
        tracing::debug!(fen, ?budget, "Search started");

        let limit = match budget {
            SearchBudget::MoveTime(ms) => Duration::from_millis(ms) + SEARCH_GRACE,
            SearchBudget::Depth(_) => DEPTH_SEARCH_TIMEOUT,
        };
        let rx = &mut self.event_rx;
        let (mv, progress) = tokio::time::timeout(limit, async {
            let mut progress = SearchProgress::default();
            while let Some(event) = rx.recv().await {
                match event {
                    EngineEvent::Progress(update) => {
                        progress.depth = update.depth.or(progress.depth);
                        progress.score = update.score.or(progress.score);
                    }
                    EngineEvent::BestMove(mv) => return Ok((mv, progress)),
                    _ => {}
                }
            }
            Err(UciError::Closed)
        })
        .await
        .map_err(|_| UciError::Timeout("bestmove"))??;

        tracing::debug!(depth = ?progress.depth, score = ?progress.score, "Search finished");
        tracing::info!("Engine chose {:?}", mv.map(|m| m.to_string()));
        Ok(mv)
    }

    /// Ask the engine to quit, killing it if it lingers.
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = tokio::time::timeout(Duration::from_secs(1), self.process.wait()).await;
        let _ = self.process.kill().await;
    }
}

#[async_trait]
impl MoveSearch for UciEngine {
    async fn best_move(&mut self, fen: &str, budget: SearchBudget) -> Result<Move, SearchError> {
        self.search(fen, budget)
            .await?
            .ok_or_else(|| SearchError::NoMove(fen.to_string()))
    }

    async fn shutdown(&mut self) {
        self.quit().await;
    }
}

/// Find a Stockfish executable in common locations
pub fn find_engine_path() -> Option<PathBuf> {
    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];

    paths
        .iter()
        .map(Path::new)
        .find(|path| path.is_file())
        .map(Path::to_path_buf)
}
