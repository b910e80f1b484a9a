use crate::domain::player::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    /// Score from white's point of view: 1 win, 0.5 draw, 0 loss.
    pub fn white_score(&self) -> f64 {
        match self {
            GameResult::WhiteWins => 1.0,
            GameResult::BlackWins => 0.0,
            GameResult::Draw => 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRatingInfo {
    pub rating_change_white: i32,
    pub rating_change_black: i32,
}

pub trait RatingService {
    fn expected_score(&self, rating: i32, opponent_rating: i32) -> f64;
    fn calculate_rating(&self, rating: i32, opponent_rating: i32, score: f64) -> i32;
    fn calculate_ratings(
        &self,
        result: GameResult,
        white: Player,
        black: Player,
    ) -> (Player, Player, GameRatingInfo);
}

pub struct EloRatingService;

impl EloRatingService {
    const K_FACTOR: f64 = 32.0;

    pub fn new() -> Self {
        Self {}
    }
}

impl RatingService for EloRatingService {
    fn expected_score(&self, rating: i32, opponent_rating: i32) -> f64 {
        1.0 / (1.0 + 10f64.powf((opponent_rating - rating) as f64 / 400.0))
    }

    fn calculate_rating(&self, rating: i32, opponent_rating: i32, score: f64) -> i32 {
        let expected = self.expected_score(rating, opponent_rating);
        (rating as f64 + Self::K_FACTOR * (score - expected)).round() as i32
    }

    /// Both new ratings are computed from the pre-game ratings, so the order
    /// in which the two players are written back does not matter.
    fn calculate_ratings(
        &self,
        result: GameResult,
        mut white: Player,
        mut black: Player,
    ) -> (Player, Player, GameRatingInfo) {
        let white_score = result.white_score();
        let new_white = self.calculate_rating(white.rating, black.rating, white_score);
        let new_black = self.calculate_rating(black.rating, white.rating, 1.0 - white_score);

        let info = GameRatingInfo {
            rating_change_white: new_white - white.rating,
            rating_change_black: new_black - black.rating,
        };

        white.rating = new_white;
        black.rating = new_black;
        match result {
            GameResult::WhiteWins => {
                white.wins += 1;
                black.losses += 1;
            }
            GameResult::BlackWins => {
                white.losses += 1;
                black.wins += 1;
            }
            GameResult::Draw => {}
        }

        (white, black, info)
    }
}
