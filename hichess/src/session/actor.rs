use board::BoardEvent;
use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;

use super::commands::*;
use super::events::SessionEvent;
use super::state::{Inbound, SearchOutcome, SessionState};

/// The main session actor loop.
/// Owns all mutable state. Processes commands and search results
/// sequentially.
pub(crate) async fn run_session_actor(
    state: SessionState,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    let span = tracing::info_span!(
        "session",
        online = state.online,
        engine = ?state.opponent.map(|o| o.color),
    );
    run_session_actor_inner(state, cmd_rx, event_tx)
        .instrument(span)
        .await;
}

async fn run_session_actor_inner(
    mut state: SessionState,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    tracing::info!("Session actor started");

    let (search_tx, mut search_rx) = mpsc::channel::<SearchOutcome>(4);

    // The engine may be first to move.
    maybe_start_search(&mut state, &search_tx);

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        state.shutdown_engine().await;
                        break;
                    }
                    Some(cmd) => {
                        let changed = handle_command(&mut state, cmd, &event_tx);
                        if !state.board.is_live() {
                            state.cancel_search();
                        }
                        maybe_start_search(&mut state, &search_tx);
                        if changed {
                            let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
                        }
                    }
                }
            }

            Some(outcome) = search_rx.recv() => {
                if handle_search_outcome(&mut state, outcome, &event_tx) {
                    maybe_start_search(&mut state, &search_tx);
                    let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
                }
            }
        }
    }

    tracing::info!("Session actor exited");
}

/// Returns whether the command may have changed what subscribers see.
fn handle_command(
    state: &mut SessionState,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) -> bool {
    match cmd {
        SessionCommand::Click { square, reply } => {
            let result = state.apply_click(square);
            publish_board_events(state, event_tx, true);
            let _ = reply.send(result);
        }
        SessionCommand::Mark { square, reply } => {
            let marked = state.board.right_click(square);
            publish_board_events(state, event_tx, true);
            let _ = reply.send(marked);
        }
        SessionCommand::Push { mv, reply } => {
            let result = state.apply_push(mv);
            publish_board_events(state, event_tx, true);
            let _ = reply.send(result);
        }
        SessionCommand::Receive { bytes, reply } => {
            let result = state.apply_packet(&bytes);
            // Moves from the server are never sent back.
            publish_board_events(state, event_tx, false);
            let result = match result {
                Ok(Inbound::Applied) => Ok(()),
                Ok(Inbound::GameStarted { color, opponent }) => {
                    let _ = event_tx.send(SessionEvent::GameStarted { color, opponent });
                    Ok(())
                }
                Ok(Inbound::Notice(event)) => {
                    let _ = event_tx.send(event);
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Rejected packet: {}", e);
                    let _ = event_tx.send(SessionEvent::Error(e.to_string()));
                    Err(e)
                }
            };
            let _ = reply.send(result);
        }
        SessionCommand::Connect { username, reply } => {
            let packet = state.connect(&username);
            let _ = event_tx.send(SessionEvent::Outbound(packet));
            let _ = reply.send(());
        }
        SessionCommand::SendChat { text, reply } => {
            let result = state.chat_packet(text).map(|packet| {
                let _ = event_tx.send(SessionEvent::Outbound(packet));
            });
            let _ = reply.send(result);
            return false;
        }
        SessionCommand::Pop { reply } => {
            let mv = state.board.pop();
            publish_board_events(state, event_tx, false);
            let _ = reply.send(mv);
        }
        SessionCommand::Unpop { reply } => {
            let mv = state.board.unpop();
            publish_board_events(state, event_tx, false);
            let _ = reply.send(mv);
        }
        SessionCommand::GoTo { ply, reply } => {
            state.board.go_to_move(ply);
            publish_board_events(state, event_tx, false);
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::Flip { reply } => {
            state.board.flip();
            let _ = reply.send(());
        }
        SessionCommand::Reset { fen, reply } => {
            let result = state.apply_reset(fen).map(|()| state.snapshot());
            publish_board_events(state, event_tx, false);
            let _ = reply.send(result);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
            return false;
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
            return false;
        }
        SessionCommand::Shutdown => unreachable!(),
    }
    true
}

/// Returns whether the outcome was current (applied or reported).
fn handle_search_outcome(
    state: &mut SessionState,
    outcome: SearchOutcome,
    event_tx: &broadcast::Sender<SessionEvent>,
) -> bool {
    match state.apply_search(outcome) {
        None => false,
        Some(Ok(mv)) => {
            tracing::info!(%mv, "Engine moved");
            publish_board_events(state, event_tx, true);
            true
        }
        Some(Err(e)) => {
            let _ = event_tx.send(SessionEvent::Error(e.to_string()));
            true
        }
    }
}

fn maybe_start_search(state: &mut SessionState, search_tx: &mpsc::Sender<SearchOutcome>) {
    if state.wants_search() {
        state.start_search(search_tx.clone());
    }
}

/// Re-broadcast board notifications. With `echo`, moves also go out as
/// packets when playing online.
fn publish_board_events(
    state: &mut SessionState,
    event_tx: &broadcast::Sender<SessionEvent>,
    echo: bool,
) {
    for event in state.drain_board_events() {
        let outbound = match &event {
            BoardEvent::MoveMade(text) if echo => state.outbound_move(text),
            _ => None,
        };
        let _ = event_tx.send(SessionEvent::Board(event));
        if let Some(packet) = outbound {
            tracing::trace!(%packet, "Packet sent");
            let _ = event_tx.send(SessionEvent::Outbound(packet));
        }
    }
}
