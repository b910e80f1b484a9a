use crate::domain::board_move::BoardMove;

/// Move legality and board interpretation. Boards are opaque strings produced
/// by the engine itself and round-trip through persistence unchanged.
pub trait RulesEngine {
    fn initial_board(&self) -> String;
    fn legal_moves(&self, board: &str) -> Result<Vec<BoardMove>, RulesError>;
    fn is_legal(&self, board: &str, mv: &BoardMove) -> Result<bool, RulesError>;
    fn apply(&self, board: &str, mv: &BoardMove) -> Result<String, RulesError>;
    fn notation(&self, board: &str, mv: &BoardMove) -> Result<String, RulesError>;
    fn is_checkmate(&self, board: &str) -> Result<bool, RulesError>;
    fn is_stalemate(&self, board: &str) -> Result<bool, RulesError>;
    fn is_insufficient_material(&self, board: &str) -> Result<bool, RulesError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    #[error("invalid move: {0}")]
    InvalidMove(String),
}
