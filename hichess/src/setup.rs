//! Parameters of a game against the engine and how they turn into a board.

use std::fmt;
use std::str::FromStr;

use board::{AccessibleSides, BoardConfig};
use chess::{FenError, PieceColor, Position, STARTING_FEN};
use engine::Level;
use rand::Rng;

use crate::session::{Opponent, SessionConfig};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartPosition {
    #[default]
    Standard,
    FromPosition(String),
}

impl StartPosition {
    pub fn fen(&self) -> &str {
        match self {
            Self::Standard => STARTING_FEN,
            Self::FromPosition(fen) => fen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    White,
    Black,
    Random,
}

impl ColorChoice {
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> PieceColor {
        match self {
            Self::White => PieceColor::White,
            Self::Black => PieceColor::Black,
            Self::Random if rng.random_bool(0.5) => PieceColor::White,
            Self::Random => PieceColor::Black,
        }
    }
}

impl fmt::Display for ColorChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "white",
            Self::Black => "black",
            Self::Random => "random",
        })
    }
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Self::White),
            "black" | "b" => Ok(Self::Black),
            "random" | "r" => Ok(Self::Random),
            other => Err(format!("Unknown color: {other} (expected white, black or random)")),
        }
    }
}

/// A game against the engine as chosen by the player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSetup {
    pub start: StartPosition,
    pub level: Level,
    pub color: ColorChoice,
}

/// A [`GameSetup`] with the colour decided and the position checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PveGame {
    pub human: PieceColor,
    pub level: Level,
    pub board: BoardConfig,
}

impl GameSetup {
    pub fn resolve(&self) -> Result<PveGame, FenError> {
        self.resolve_with(&mut rand::rng())
    }

    /// Only the human's pieces are accessible, and the board is flipped
    /// when the human plays black.
    pub fn resolve_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PveGame, FenError> {
        let fen = self.start.fen();
        Position::from_fen(fen)?;
        let human = self.color.resolve(rng);
        tracing::info!(%human, level = %self.level, fen, "Game against engine");

        Ok(PveGame {
            human,
            level: self.level,
            board: BoardConfig {
                fen: Some(fen.to_string()),
                flipped: human == PieceColor::Black,
                sides: AccessibleSides::only(human),
                block_on_pop: true,
            },
        })
    }
}

impl PveGame {
    pub fn opponent(&self) -> Opponent {
        Opponent {
            color: self.human.opponent(),
            level: self.level,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            board: self.board.clone(),
            online: false,
            opponent: Some(self.opponent()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_black_flips_the_board() {
        let setup = GameSetup {
            color: ColorChoice::Black,
            level: Level::new(3).unwrap(),
            ..Default::default()
        };
        let game = setup.resolve().unwrap();
        assert_eq!(game.human, PieceColor::Black);
        assert!(game.board.flipped);
        assert_eq!(game.board.sides, AccessibleSides::OnlyBlack);
        assert_eq!(game.opponent().color, PieceColor::White);
        assert_eq!(game.opponent().level.name(), "Medium 1");
    }

    #[test]
    fn test_white_keeps_orientation() {
        let game = GameSetup::default().resolve().unwrap();
        assert_eq!(game.human, PieceColor::White);
        assert!(!game.board.flipped);
        assert_eq!(game.board.sides, AccessibleSides::OnlyWhite);
        assert_eq!(game.board.fen.as_deref(), Some(STARTING_FEN));
        let config = game.session_config();
        assert!(!config.online);
        assert_eq!(config.opponent, Some(game.opponent()));
    }

    #[test]
    fn test_random_color_picks_both() {
        let mut rng = SmallRng::seed_from_u64(7);
        let colors: Vec<PieceColor> = (0..64)
            .map(|_| ColorChoice::Random.resolve(&mut rng))
            .collect();
        assert!(colors.contains(&PieceColor::White));
        assert!(colors.contains(&PieceColor::Black));
    }

    #[test]
    fn test_from_position() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
        let setup = GameSetup {
            start: StartPosition::FromPosition(fen.to_string()),
            ..Default::default()
        };
        assert_eq!(setup.resolve().unwrap().board.fen.as_deref(), Some(fen));

        let bad = GameSetup {
            start: StartPosition::FromPosition("not a fen".to_string()),
            ..Default::default()
        };
        assert!(bad.resolve().is_err());
    }

    #[test]
    fn test_parse_color_choice() {
        assert_eq!("White".parse::<ColorChoice>(), Ok(ColorChoice::White));
        assert_eq!("b".parse::<ColorChoice>(), Ok(ColorChoice::Black));
        assert_eq!("random".parse::<ColorChoice>(), Ok(ColorChoice::Random));
        assert!("green".parse::<ColorChoice>().is_err());
    }
}
