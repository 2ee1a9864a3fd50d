use chess::{parse_uci_move, Move};

use super::UciError;
use crate::{Score, SearchProgress};

/// One line of engine output.
#[derive(Debug, Clone)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    BestMove { mv: Option<Move>, ponder: Option<Move> },
    Info(SearchProgress),
}

pub fn parse_uci_message(line: &str) -> Result<UciMessage, UciError> {
    let malformed = || UciError::MalformedMessage(line.to_string());
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some("uciok") => Ok(UciMessage::UciOk),
        Some("readyok") => Ok(UciMessage::ReadyOk),
        Some("id") => {
            let name = tokens.next().ok_or_else(malformed)?.to_string();
            let value = tokens.collect::<Vec<_>>().join(" ");
            if value.is_empty() {
                return Err(malformed());
            }
            Ok(UciMessage::Id { name, value })
        }
        Some("bestmove") => {
            let mv = parse_best_move(tokens.next().ok_or_else(malformed)?)?;
            let ponder = match (tokens.next(), tokens.next()) {
                (Some("ponder"), Some(text)) => parse_best_move(text)?,
                _ => None,
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }
        Some("info") => Ok(UciMessage::Info(parse_progress(tokens))),
        _ => Err(UciError::UnknownMessage(line.to_string())),
    }
}

/// Pick depth and score out of an `info` line, ignoring everything else.
fn parse_progress<'a>(mut tokens: impl Iterator<Item = &'a str>) -> SearchProgress {
    let mut progress = SearchProgress::default();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => progress.depth = tokens.next().and_then(|s| s.parse().ok()),
            "score" => {
                progress.score = match (tokens.next(), tokens.next()) {
                    (Some("cp"), Some(v)) => v.parse().ok().map(Score::Centipawns),
                    (Some("mate"), Some(v)) => v.parse().ok().map(Score::Mate),
                    _ => None,
                }
            }
            // The rest of the line is free text or a move list.
            "string" | "pv" => break,
            _ => {}
        }
    }
    progress
}

/// "(none)" and "0000" mean the side to move has no legal move.
fn parse_best_move(text: &str) -> Result<Option<Move>, UciError> {
    match text {
        "(none)" | "0000" => Ok(None),
        _ => Ok(Some(parse_uci_move(text)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove() {
        let msg = parse_uci_message("bestmove e2e4 ponder e7e5").unwrap();
        let UciMessage::BestMove { mv, ponder } = msg else {
            panic!("expected bestmove, got {msg:?}");
        };
        assert_eq!(mv.unwrap().to_string(), "e2e4");
        assert_eq!(ponder.unwrap().to_string(), "e7e5");
    }

    #[test]
    fn test_parse_bestmove_none() {
        let msg = parse_uci_message("bestmove (none)").unwrap();
        assert!(matches!(msg, UciMessage::BestMove { mv: None, .. }));
        let msg = parse_uci_message("bestmove 0000").unwrap();
        assert!(matches!(msg, UciMessage::BestMove { mv: None, .. }));
    }

    #[test]
    fn test_parse_promotion_bestmove() {
        let msg = parse_uci_message("bestmove a7a8q").unwrap();
        let UciMessage::BestMove { mv: Some(mv), .. } = msg else {
            panic!("expected a move, got {msg:?}");
        };
        assert_eq!(mv.promotion, Some(chess::PieceKind::Queen));
    }

    #[test]
    fn test_parse_progress() {
        let msg =
            parse_uci_message("info depth 12 seldepth 18 score cp 35 nodes 15234 pv e2e4 e7e5")
                .unwrap();
        let UciMessage::Info(progress) = msg else {
            panic!("expected info, got {msg:?}");
        };
        assert_eq!(progress.depth, Some(12));
        assert_eq!(progress.score, Some(Score::Centipawns(35)));

        let UciMessage::Info(progress) = parse_uci_message("info depth 30 score mate -3").unwrap()
        else {
            panic!("expected info");
        };
        assert_eq!(progress.score, Some(Score::Mate(-3)));
    }

    #[test]
    fn test_info_string_is_ignored() {
        let UciMessage::Info(progress) =
            parse_uci_message("info string depth 5 is not a field").unwrap()
        else {
            panic!("expected info");
        };
        assert_eq!(progress, SearchProgress::default());
    }

    #[test]
    fn test_parse_id_and_garbage() {
        assert!(matches!(
            parse_uci_message("id name Stockfish 16"),
            Ok(UciMessage::Id { ref value, .. }) if value == "Stockfish 16"
        ));
        assert!(parse_uci_message("id name").is_err());
        assert!(parse_uci_message("bestmove").is_err());
        assert!(parse_uci_message("option name Hash type spin").is_err());
        assert!(parse_uci_message("bestmove e9e4").is_err());
    }
}
