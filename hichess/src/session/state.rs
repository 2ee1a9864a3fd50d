use std::sync::Arc;

use board::{AccessibleSides, BoardController, BoardEvent, ClickOutcome};
use chess::{Move, Outcome, PieceColor, Square};
use engine::{MoveSearch, SearchError};
use protocol::{Message, Packet};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::commands::SessionError;
use super::events::SessionEvent;
use super::snapshot::SessionSnapshot;
use super::Opponent;
use crate::move_list::MoveList;

/// Shared so an aborted search task releases the engine for the next one.
pub(crate) type SharedEngine = Arc<Mutex<Box<dyn MoveSearch>>>;

/// A finished search, tagged with the generation it was started under.
pub(crate) struct SearchOutcome {
    pub generation: u64,
    pub result: Result<Move, SearchError>,
}

/// What a packet from the server asks of the actor.
pub(crate) enum Inbound {
    Applied,
    GameStarted { color: PieceColor, opponent: String },
    Notice(SessionEvent),
}

/// Internal mutable state, owned entirely by the session actor. No locks.
pub(crate) struct SessionState {
    pub board: BoardController,
    pub move_list: MoveList,
    pub online: bool,
    pub opponent_name: Option<String>,
    pub opponent: Option<Opponent>,
    engine: Option<SharedEngine>,
    search: Option<JoinHandle<()>>,
    generation: u64,
    board_events: mpsc::UnboundedReceiver<BoardEvent>,
}

impl SessionState {
    pub fn new(
        mut board: BoardController,
        online: bool,
        opponent: Option<Opponent>,
        engine: Option<Box<dyn MoveSearch>>,
    ) -> Self {
        let (tx, board_events) = mpsc::unbounded_channel();
        board.subscribe_all(Box::new(move |event| {
            let _ = tx.send(event.clone());
        }));
        let mut move_list = MoveList::starting_with(first_mover(&board));
        for mv in board.game_moves() {
            move_list.add_move(mv.to_string());
        }
        Self {
            board,
            move_list,
            online,
            opponent_name: None,
            opponent,
            engine: engine.map(|e| Arc::new(Mutex::new(e))),
            search: None,
            generation: 0,
            board_events,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(
            &self.board,
            &self.move_list,
            self.online,
            self.opponent_name.clone(),
            self.engine_thinking(),
        )
    }

    pub fn engine_thinking(&self) -> bool {
        self.search.is_some()
    }

    // --- Board notifications ---

    /// Board notifications emitted since the last call, in emission order.
    /// The move list follows every move and navigation.
    pub fn drain_board_events(&mut self) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.board_events.try_recv() {
            match &event {
                BoardEvent::MoveMade(text) => {
                    // A fresh move off the live end discarded the redo moves.
                    let kept = self.board.total_moves().saturating_sub(1);
                    self.move_list.truncate(kept);
                    self.move_list.add_move(text.clone());
                }
                BoardEvent::HistoryNavigated { ply, .. } => self.move_list.go_to(*ply),
                _ => {}
            }
            events.push(event);
        }
        events
    }

    // --- Local input ---

    pub fn apply_click(&mut self, square: Square) -> Result<ClickOutcome, SessionError> {
        if self.is_engine_turn() {
            tracing::debug!(%square, "Click ignored while the engine is to move");
            return Ok(ClickOutcome::Ignored);
        }
        Ok(self.board.click(square)?)
    }

    pub fn apply_push(&mut self, mv: Move) -> Result<Move, SessionError> {
        if self.is_engine_turn() {
            return Err(SessionError::NotYourTurn);
        }
        Ok(self.board.push(mv)?)
    }

    pub fn apply_reset(&mut self, fen: Option<String>) -> Result<(), SessionError> {
        self.cancel_search();
        match fen {
            Some(fen) => self.board.set_fen(Some(&fen))?,
            None => self.board.reset(),
        }
        self.move_list
            .restart(self.board.position().side_to_move());
        Ok(())
    }

    // --- Server packets ---

    pub fn apply_packet(&mut self, bytes: &[u8]) -> Result<Inbound, SessionError> {
        let packet = Packet::decode(bytes)?;
        tracing::trace!(%packet, "Packet received");
        let Some(message) = Message::from_packet(packet) else {
            return Ok(Inbound::Applied);
        };
        match message {
            Message::Move(text) => {
                if !self.online {
                    return Err(SessionError::UnexpectedPacket(
                        "move received while offline".into(),
                    ));
                }
                let to_move = self.board.position().side_to_move();
                if self.board.accessible_sides().allows(to_move) {
                    return Err(SessionError::UnexpectedPacket(format!(
                        "move {text} received on our turn"
                    )));
                }
                self.board.push_text(&text)?;
                Ok(Inbound::Applied)
            }
            Message::WhitePlayerData(opponent) => {
                Ok(self.start_online_game(PieceColor::White, opponent))
            }
            Message::BlackPlayerData(opponent) => {
                Ok(self.start_online_game(PieceColor::Black, opponent))
            }
            Message::Chat(text) => Ok(Inbound::Notice(SessionEvent::Chat(text))),
            Message::ServerMessage(text) => {
                Ok(Inbound::Notice(SessionEvent::ServerMessage(text)))
            }
            Message::Error(text) => {
                tracing::warn!("Server error: {}", text);
                Ok(Inbound::Notice(SessionEvent::ServerError(text)))
            }
            Message::PlayerData(name) => Err(SessionError::UnexpectedPacket(format!(
                "player data for {name}"
            ))),
        }
    }

    /// A fresh game where only `color` is ours and it sits at the bottom.
    fn start_online_game(&mut self, color: PieceColor, opponent: String) -> Inbound {
        tracing::info!(%color, opponent, "Online game started");
        self.cancel_search();
        self.online = true;
        self.opponent = None;
        self.opponent_name = Some(opponent.clone());
        self.board.reset();
        self.move_list.restart(PieceColor::White);
        self.board.set_accessible_sides(AccessibleSides::only(color));
        if self.board.is_flipped() != (color == PieceColor::Black) {
            self.board.flip();
        }
        Inbound::GameStarted { color, opponent }
    }

    /// Go online. The returned handshake packet identifies us to the server.
    pub fn connect(&mut self, username: &str) -> Packet {
        tracing::info!(username, "Connecting to server");
        self.online = true;
        Message::handshake(username)
    }

    pub fn chat_packet(&self, text: String) -> Result<Packet, SessionError> {
        if !self.online {
            return Err(SessionError::Offline);
        }
        Ok(Message::Chat(text).into_packet())
    }

    /// The packet announcing a local move to the server.
    pub fn outbound_move(&self, text: &str) -> Option<Packet> {
        self.online
            .then(|| Message::Move(text.to_string()).into_packet())
    }

    // --- Engine opponent ---

    fn is_engine_turn(&self) -> bool {
        self.opponent
            .is_some_and(|o| o.color == self.board.position().side_to_move())
    }

    /// Whether a search should start now: an engine is attached, it is its
    /// turn at the live end of an unfinished game, and none is running.
    pub fn wants_search(&self) -> bool {
        self.engine.is_some()
            && self.search.is_none()
            && self.is_engine_turn()
            && self.board.is_live()
            && self.board.position().outcome() == Outcome::Ongoing
    }

    pub fn start_search(&mut self, result_tx: mpsc::Sender<SearchOutcome>) {
        let (Some(engine), Some(opponent)) = (self.engine.clone(), self.opponent) else {
            return;
        };
        self.generation += 1;
        let generation = self.generation;
        let fen = self.board.fen();
        let budget = opponent.level.budget();
        tracing::debug!(generation, fen, ?budget, "Engine search started");

        self.search = Some(tokio::spawn(async move {
            let result = engine.lock().await.best_move(&fen, budget).await;
            let _ = result_tx.send(SearchOutcome { generation, result }).await;
        }));
    }

    /// Abort the running search. Whatever it was about to answer is stale.
    pub fn cancel_search(&mut self) {
        if let Some(task) = self.search.take() {
            task.abort();
            self.generation += 1;
            tracing::debug!(generation = self.generation, "Engine search cancelled");
        }
    }

    /// Apply a finished search. `None` when the answer is stale.
    pub fn apply_search(&mut self, outcome: SearchOutcome) -> Option<Result<Move, SessionError>> {
        if outcome.generation != self.generation || self.search.is_none() {
            tracing::debug!(generation = outcome.generation, "Discarding stale search result");
            return None;
        }
        self.search = None;
        let mv = match outcome.result {
            Ok(mv) => mv,
            Err(e) => {
                tracing::warn!("Engine search failed: {}", e);
                return Some(Err(SessionError::Internal(e.to_string())));
            }
        };
        if !self.board.position().is_legal(mv) {
            tracing::warn!(%mv, "Engine answered an illegal move");
            return Some(Err(SessionError::Board(board::BoardError::IllegalMove(mv))));
        }
        Some(Ok(self.board.move_piece(mv)))
    }

    pub async fn shutdown_engine(&mut self) {
        self.cancel_search();
        if let Some(engine) = self.engine.take() {
            engine.lock().await.shutdown().await;
        }
    }
}

/// The side that made the first move of the board's game.
fn first_mover(board: &BoardController) -> PieceColor {
    let side = board.position().side_to_move();
    if board.ply() % 2 == 0 {
        side
    } else {
        side.opponent()
    }
}
