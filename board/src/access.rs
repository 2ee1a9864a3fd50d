use std::fmt;
use std::str::FromStr;

use chess::PieceColor;

/// Which side's pieces accept user selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessibleSides {
    #[default]
    None,
    OnlyWhite,
    OnlyBlack,
    Both,
}

impl AccessibleSides {
    pub fn allows(self, color: PieceColor) -> bool {
        match self {
            Self::None => false,
            Self::OnlyWhite => color == PieceColor::White,
            Self::OnlyBlack => color == PieceColor::Black,
            Self::Both => true,
        }
    }

    /// Policy giving access to exactly one side.
    pub fn only(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Self::OnlyWhite,
            PieceColor::Black => Self::OnlyBlack,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OnlyWhite => "white",
            Self::OnlyBlack => "black",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for AccessibleSides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessibleSides {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "white" | "only-white" => Ok(Self::OnlyWhite),
            "black" | "only-black" => Ok(Self::OnlyBlack),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown side policy: {other}")),
        }
    }
}
