use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{Rng, seq::IndexedRandom};
use tokio::time::Instant;

use crate::{
    domain::{
        Color, MatchError, PlayerId, SessionId,
        board_move::{BoardMove, Promotion, Square},
        rating::GameResult,
    },
    ports::rules::{RulesEngine, RulesError},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Active,
    Checkmate,
    Stalemate,
    Draw,
    Resigned,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Active => "active",
            SessionStatus::Checkmate => "checkmate",
            SessionStatus::Stalemate => "stalemate",
            SessionStatus::Draw => "draw",
            SessionStatus::Resigned => "resigned",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveRecord {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
    pub notation: String,
    pub timestamp: DateTime<Utc>,
    /// Chosen by the turn clock after the deadline ran out.
    pub forced: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOfferOutcome {
    Drawn,
    Recorded,
}

/// One match between two players. Fields are private so that every change
/// goes through the transitions below; once `status` leaves `Active` nothing
/// mutates the session anymore.
#[derive(Clone, Debug)]
pub struct MatchSession {
    id: SessionId,
    white_id: PlayerId,
    black_id: PlayerId,
    board: String,
    status: SessionStatus,
    turn: Color,
    turn_deadline: Duration,
    last_move_at: Instant,
    winner: Option<PlayerId>,
    draw_offered_by: Option<PlayerId>,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    moves: Vec<MoveRecord>,
}

impl MatchSession {
    pub fn new(
        id: SessionId,
        white_id: PlayerId,
        black_id: PlayerId,
        board: String,
        turn_deadline: Duration,
        now: Instant,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            white_id,
            black_id,
            board,
            status: SessionStatus::Active,
            turn: Color::White,
            turn_deadline,
            last_move_at: now,
            winner: None,
            draw_offered_by: None,
            created_at: date,
            ended_at: None,
            moves: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn white_id(&self) -> PlayerId {
        self.white_id
    }

    pub fn black_id(&self) -> PlayerId {
        self.black_id
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn turn_deadline(&self) -> Duration {
        self.turn_deadline
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn draw_offered_by(&self) -> Option<PlayerId> {
        self.draw_offered_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        player == self.white_id || player == self.black_id
    }

    pub fn player_color(&self, player: PlayerId) -> Option<Color> {
        if player == self.white_id {
            Some(Color::White)
        } else if player == self.black_id {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn player_of(&self, color: Color) -> PlayerId {
        match color {
            Color::White => self.white_id,
            Color::Black => self.black_id,
        }
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        self.player_color(player)
            .map(|color| self.player_of(color.opposite()))
    }

    /// `None` while the session is still being played.
    pub fn result(&self) -> Option<GameResult> {
        if !self.status.is_terminal() {
            return None;
        }
        Some(match self.winner {
            Some(w) if w == self.white_id => GameResult::WhiteWins,
            Some(_) => GameResult::BlackWins,
            None => GameResult::Draw,
        })
    }

    pub fn time_remaining(&self, now: Instant) -> Duration {
        if !self.is_active() {
            return Duration::ZERO;
        }
        let elapsed = now.saturating_duration_since(self.last_move_at);
        self.turn_deadline.saturating_sub(elapsed)
    }

    pub fn make_move<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &R,
        player: PlayerId,
        mv: &BoardMove,
        now: Instant,
        date: DateTime<Utc>,
    ) -> Result<MoveRecord, MatchError> {
        if !self.is_active() {
            return Err(MatchError::GameNotActive);
        }
        let color = self
            .player_color(player)
            .ok_or(MatchError::NotAParticipant)?;
        if color != self.turn {
            return Err(MatchError::NotYourTurn);
        }
        self.play(rules, mv, now, date, false)
    }

    pub fn resign(&mut self, player: PlayerId, date: DateTime<Utc>) -> Result<(), MatchError> {
        let opponent = self.opponent_of(player).ok_or(MatchError::NotAParticipant)?;
        if !self.is_active() {
            return Err(MatchError::GameNotActive);
        }
        self.finish(SessionStatus::Resigned, Some(opponent), date);
        Ok(())
    }

    /// Only insufficient material resolves an offer; anything else is kept as
    /// a standing offer that the next move clears.
    pub fn offer_draw<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &R,
        player: PlayerId,
        date: DateTime<Utc>,
    ) -> Result<DrawOfferOutcome, MatchError> {
        if !self.has_player(player) {
            return Err(MatchError::NotAParticipant);
        }
        if !self.is_active() {
            return Err(MatchError::GameNotActive);
        }
        if engine(rules.is_insufficient_material(&self.board))? {
            self.finish(SessionStatus::Draw, None, date);
            return Ok(DrawOfferOutcome::Drawn);
        }
        self.draw_offered_by = Some(player);
        Ok(DrawOfferOutcome::Recorded)
    }

    /// Plays a random legal move for the side to move once its deadline is
    /// gone. Returns `Ok(None)` when the deadline has not elapsed at the time
    /// of the call or when the position has no legal move.
    pub fn force_expired_move<R: RulesEngine + ?Sized, G: Rng + ?Sized>(
        &mut self,
        rules: &R,
        rng: &mut G,
        now: Instant,
        date: DateTime<Utc>,
    ) -> Result<Option<MoveRecord>, MatchError> {
        if !self.is_active() {
            return Err(MatchError::GameNotActive);
        }
        if !self.time_remaining(now).is_zero() {
            return Ok(None);
        }
        let legal_moves = engine(rules.legal_moves(&self.board))?;
        let Some(mv) = legal_moves.choose(rng) else {
            return Ok(None);
        };
        let mv = *mv;
        self.play(rules, &mv, now, date, true).map(Some)
    }

    fn play<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &R,
        mv: &BoardMove,
        now: Instant,
        date: DateTime<Utc>,
        forced: bool,
    ) -> Result<MoveRecord, MatchError> {
        match rules.is_legal(&self.board, mv) {
            Ok(true) => {}
            Ok(false) | Err(RulesError::InvalidMove(_)) => return Err(MatchError::IllegalMove),
            Err(e) => return Err(MatchError::internal("rules engine failed", e)),
        }
        let notation = engine(rules.notation(&self.board, mv))?;
        let next_board = engine(rules.apply(&self.board, mv))?;

        let terminal = if engine(rules.is_checkmate(&next_board))? {
            Some(SessionStatus::Checkmate)
        } else if engine(rules.is_stalemate(&next_board))? {
            Some(SessionStatus::Stalemate)
        } else if engine(rules.is_insufficient_material(&next_board))? {
            Some(SessionStatus::Draw)
        } else {
            None
        };

        let mover_color = self.turn;
        let mover = self.player_of(mover_color);
        let record = MoveRecord {
            session_id: self.id,
            player_id: mover,
            color: mover_color,
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion,
            notation,
            timestamp: date,
            forced,
        };

        self.board = next_board;
        self.turn = mover_color.opposite();
        self.last_move_at = now;
        self.draw_offered_by = None;
        self.moves.push(record.clone());

        match terminal {
            Some(SessionStatus::Checkmate) => {
                self.finish(SessionStatus::Checkmate, Some(mover), date)
            }
            Some(status) => self.finish(status, None, date),
            None => {}
        }

        Ok(record)
    }

    fn finish(&mut self, status: SessionStatus, winner: Option<PlayerId>, date: DateTime<Utc>) {
        self.status = status;
        self.winner = winner;
        self.draw_offered_by = None;
        self.ended_at = Some(date);
    }
}

fn engine<T>(res: Result<T, RulesError>) -> Result<T, MatchError> {
    res.map_err(|e| MatchError::internal("rules engine failed", e))
}
