use async_trait::async_trait;
use chess::Move;

use crate::uci::UciError;

/// How much thinking a search may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBudget {
    /// Milliseconds of thinking time.
    MoveTime(u64),
    /// Plies of search depth.
    Depth(u8),
}

impl SearchBudget {
    /// The `go` command for this budget.
    pub fn go_command(self) -> String {
        match self {
            Self::MoveTime(ms) => format!("go movetime {}", ms),
            Self::Depth(depth) => format!("go depth {}", depth),
        }
    }
}

/// Opponent difficulty, 0 ("Very Easy") through 7 ("Very Hard").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Level(u8);

impl Level {
    pub const MAX: u8 = 7;
    const NAMES: [&'static str; 8] = [
        "Very Easy",
        "Easy 1",
        "Easy 2",
        "Medium 1",
        "Medium 2",
        "Hard 1",
        "Hard 2",
        "Very Hard",
    ];
    const MOVE_TIME_MS: [u64; 8] = [50, 100, 200, 400, 700, 1000, 1500, 2500];

    pub fn new(level: u8) -> Result<Self, SearchError> {
        if level > Self::MAX {
            return Err(SearchError::InvalidLevel(level));
        }
        Ok(Self(level))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self.0 as usize]
    }

    /// UCI `Skill Level` option, spread over 0..=20.
    pub fn skill_level(self) -> u8 {
        (self.0 as u16 * 20 / Self::MAX as u16) as u8
    }

    pub fn budget(self) -> SearchBudget {
        SearchBudget::MoveTime(Self::MOVE_TIME_MS[self.0 as usize])
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that picks a move for a position.
///
/// A search may be dropped mid-flight (its task aborted); the next call
/// must not see the abandoned search's answer.
#[async_trait]
pub trait MoveSearch: Send {
    async fn best_move(&mut self, fen: &str, budget: SearchBudget) -> Result<Move, SearchError>;

    /// Release the underlying process, if any.
    async fn shutdown(&mut self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Engine error: {0}")]
    Uci(#[from] UciError),
    #[error("Engine found no move in {0}")]
    NoMove(String),
    #[error("Level {0} is out of range (0..=7)")]
    InvalidLevel(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        let easiest = Level::new(0).unwrap();
        let hardest = Level::new(7).unwrap();
        assert_eq!(easiest.name(), "Very Easy");
        assert_eq!(hardest.name(), "Very Hard");
        assert_eq!(easiest.skill_level(), 0);
        assert_eq!(hardest.skill_level(), 20);
        assert_eq!(easiest.budget(), SearchBudget::MoveTime(50));
        assert!(Level::new(8).is_err());
    }

    #[test]
    fn test_skill_levels_increase() {
        let skills: Vec<u8> = (0..=Level::MAX)
            .map(|l| Level::new(l).unwrap().skill_level())
            .collect();
        assert!(skills.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_go_command() {
        assert_eq!(SearchBudget::MoveTime(250).go_command(), "go movetime 250");
        assert_eq!(SearchBudget::Depth(12).go_command(), "go depth 12");
    }
}
