use std::str::FromStr;

use crate::domain::MatchError;

/// A board square in algebraic form, `a1` through `h8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn file(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank(&self) -> char {
        (b'1' + self.rank) as char
    }
}

impl FromStr for Square {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        let [file, rank] = bytes else {
            return Err(MatchError::InvalidInput(format!("invalid square '{}'", s)));
        };
        let file = file.to_ascii_lowercase();
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(rank) {
            return Err(MatchError::InvalidInput(format!("invalid square '{}'", s)));
        }
        Ok(Square {
            file: file - b'a',
            rank: rank - b'1',
        })
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    pub fn as_char(&self) -> char {
        match self {
            Promotion::Queen => 'q',
            Promotion::Rook => 'r',
            Promotion::Bishop => 'b',
            Promotion::Knight => 'n',
        }
    }
}

impl FromStr for Promotion {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" => Ok(Promotion::Queen),
            "r" => Ok(Promotion::Rook),
            "b" => Ok(Promotion::Bishop),
            "n" => Ok(Promotion::Knight),
            _ => Err(MatchError::InvalidInput(format!(
                "invalid promotion '{}'",
                s
            ))),
        }
    }
}

/// A candidate move as exchanged with the rules engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoardMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl BoardMove {
    /// Parses the raw request fields; an empty promotion string counts as none.
    pub fn parse(from: &str, to: &str, promotion: Option<&str>) -> Result<Self, MatchError> {
        let promotion = match promotion.map(str::trim) {
            None | Some("") => None,
            Some(p) => Some(p.parse()?),
        };
        Ok(BoardMove {
            from: from.parse()?,
            to: to.parse()?,
            promotion,
        })
    }

    /// Parses long algebraic form such as `e2e4` or `e7e8q`.
    pub fn from_uci(uci: &str) -> Result<Self, MatchError> {
        let uci = uci.trim();
        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            return Err(MatchError::InvalidInput(format!("invalid move '{}'", uci)));
        }
        let promotion = if uci.len() == 5 {
            Some(&uci[4..5])
        } else {
            None
        };
        Self::parse(&uci[0..2], &uci[2..4], promotion)
    }

    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p.as_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl std::fmt::Display for BoardMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
