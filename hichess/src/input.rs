//! Commands typed at the text front end.

use std::str::FromStr;

use chess::{Move, MoveParseError, Square, SquareError};

pub const HELP: &str = "\
commands:
  click <sq>     select a piece or move the selected one (e.g. click e2)
  mark <sq>      toggle a mark on a square
  move <uci>     play a move (e.g. move e2e4, move a7a8q)
  undo / redo    step back / forward through the game
  goto <n>       show the position after n moves
  start / end    jump to the first / live position
  flip           turn the board around
  reset [fen]    start over, optionally from a FEN
  fen            print the current FEN
  connect        introduce yourself to the server with your username
  say <text>     send a chat message to your opponent
  help           show this text
  quit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Click(Square),
    Mark(Square),
    Move(Move),
    Undo,
    Redo,
    GoTo(usize),
    Start,
    End,
    Flip,
    Reset(Option<String>),
    Fen,
    Connect,
    Say(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Square(#[from] SquareError),
    #[error(transparent)]
    Move(#[from] MoveParseError),
    #[error("Not a move number: {0}")]
    Ply(String),
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = |name: &'static str| {
            if rest.is_empty() {
                Err(InputError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };

        let input = match word.to_ascii_lowercase().as_str() {
            "" => return Err(InputError::Empty),
            "click" | "c" => Self::Click(arg("click")?.parse()?),
            "mark" | "m" => Self::Mark(arg("mark")?.parse()?),
            "move" | "mv" => Self::Move(arg("move")?.parse()?),
            "undo" | "u" => Self::Undo,
            "redo" | "r" => Self::Redo,
            "goto" | "g" => {
                let ply = arg("goto")?;
                Self::GoTo(ply.parse().map_err(|_| InputError::Ply(ply.to_string()))?)
            }
            "start" => Self::Start,
            "end" => Self::End,
            "flip" | "f" => Self::Flip,
            "reset" => Self::Reset((!rest.is_empty()).then(|| rest.to_string())),
            "fen" => Self::Fen,
            "connect" => Self::Connect,
            "say" => Self::Say(arg("say")?.to_string()),
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => return Err(InputError::Unknown(word.to_string())),
        };
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_gestures() {
        assert_eq!("click e2".parse(), Ok(Input::Click(sq("e2"))));
        assert_eq!("  MARK   h8 ".parse(), Ok(Input::Mark(sq("h8"))));
        assert_eq!(
            "move a7a8q".parse(),
            Ok(Input::Move("a7a8q".parse().unwrap()))
        );
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!("undo".parse(), Ok(Input::Undo));
        assert_eq!("redo".parse(), Ok(Input::Redo));
        assert_eq!("goto 12".parse(), Ok(Input::GoTo(12)));
        assert_eq!("start".parse(), Ok(Input::Start));
        assert_eq!("end".parse(), Ok(Input::End));
    }

    #[test]
    fn test_parse_reset() {
        assert_eq!("reset".parse(), Ok(Input::Reset(None)));
        let fen = "8/8/8/8/8/8/8/4K2k w - - 0 1";
        assert_eq!(
            format!("reset {fen}").parse(),
            Ok(Input::Reset(Some(fen.to_string())))
        );
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(
            "say  good luck, have fun ".parse(),
            Ok(Input::Say("good luck, have fun".to_string()))
        );
        assert_eq!("connect".parse(), Ok(Input::Connect));
        assert_eq!(
            "say".parse::<Input>(),
            Err(InputError::MissingArgument("say"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Input>(), Err(InputError::Empty));
        assert_eq!(
            "dance".parse::<Input>(),
            Err(InputError::Unknown("dance".to_string()))
        );
        assert_eq!(
            "click".parse::<Input>(),
            Err(InputError::MissingArgument("click"))
        );
        assert!(matches!(
            "click z9".parse::<Input>(),
            Err(InputError::Square(_))
        ));
        assert!(matches!(
            "move e2".parse::<Input>(),
            Err(InputError::Move(_))
        ));
        assert_eq!(
            "goto x".parse::<Input>(),
            Err(InputError::Ply("x".to_string()))
        );
    }
}
