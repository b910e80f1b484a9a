use chess_match_app::{
    domain::board_move::BoardMove,
    ports::rules::{RulesEngine, RulesError},
};
use shakmaty::{
    CastlingMode, Chess, EnPassantMode, Move, Position, fen::Fen, san::San, uci::UciMove,
};

/// Standard chess over FEN boards.
pub struct ShakmatyRulesEngine;

impl ShakmatyRulesEngine {
    pub fn new() -> Self {
        Self {}
    }

    fn position(board: &str) -> Result<Chess, RulesError> {
        let fen: Fen = board
            .parse()
            .map_err(|e| RulesError::InvalidBoard(format!("{}: {}", board, e)))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::InvalidBoard(format!("{}: {}", board, e)))
    }

    fn to_fen(position: Chess) -> String {
        Fen::from_position(position, EnPassantMode::Legal).to_string()
    }

    /// Resolves a move against the position; `Ok(None)` if it cannot be
    /// played there.
    fn resolve(position: &Chess, mv: &BoardMove) -> Result<Option<Move>, RulesError> {
        let uci: UciMove = mv
            .to_uci()
            .parse()
            .map_err(|_| RulesError::InvalidMove(mv.to_uci()))?;
        match uci.to_move(position) {
            Ok(m) if position.is_legal(&m) => Ok(Some(m)),
            _ => Ok(None),
        }
    }

    fn legal_move(position: &Chess, mv: &BoardMove) -> Result<Move, RulesError> {
        Self::resolve(position, mv)?.ok_or_else(|| RulesError::InvalidMove(mv.to_uci()))
    }
}

impl RulesEngine for ShakmatyRulesEngine {
    fn initial_board(&self) -> String {
        Self::to_fen(Chess::default())
    }

    fn legal_moves(&self, board: &str) -> Result<Vec<BoardMove>, RulesError> {
        let position = Self::position(board)?;
        position
            .legal_moves()
            .iter()
            .map(|m| {
                let uci = UciMove::from_move(m, CastlingMode::Standard).to_string();
                BoardMove::from_uci(&uci).map_err(|_| RulesError::InvalidMove(uci))
            })
            .collect()
    }

    fn is_legal(&self, board: &str, mv: &BoardMove) -> Result<bool, RulesError> {
        let position = Self::position(board)?;
        Ok(Self::resolve(&position, mv)?.is_some())
    }

    fn apply(&self, board: &str, mv: &BoardMove) -> Result<String, RulesError> {
        let position = Self::position(board)?;
        let m = Self::legal_move(&position, mv)?;
        let next = position
            .play(&m)
            .map_err(|_| RulesError::InvalidMove(mv.to_uci()))?;
        log::trace!("{} played on {}", mv, board);
        Ok(Self::to_fen(next))
    }

    fn notation(&self, board: &str, mv: &BoardMove) -> Result<String, RulesError> {
        let position = Self::position(board)?;
        let m = Self::legal_move(&position, mv)?;
        Ok(San::from_move(&position, &m).to_string())
    }

    fn is_checkmate(&self, board: &str) -> Result<bool, RulesError> {
        Ok(Self::position(board)?.is_checkmate())
    }

    fn is_stalemate(&self, board: &str) -> Result<bool, RulesError> {
        Ok(Self::position(board)?.is_stalemate())
    }

    fn is_insufficient_material(&self, board: &str) -> Result<bool, RulesError> {
        Ok(Self::position(board)?.is_insufficient_material())
    }
}
