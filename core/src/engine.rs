use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::protocol::{
    ArchivedRound, BoardDimensions, GameReport, MoveRecord, NullSink, ReportPayload, ReportSink,
    RoundReport,
};
use crate::*;

/// Valid transitions:
/// - RoundActive -> RoundOver
/// - RoundOver -> RoundActive
/// - RoundOver -> GameOver
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    RoundActive,
    RoundOver,
    GameOver,
}

impl SessionState {
    pub const fn is_round_over(self) -> bool {
        matches!(self, Self::RoundOver | Self::GameOver)
    }

    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::RoundActive
    }
}

/// Result of asking for the next round.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NewRound {
    /// The current round has not ended yet.
    NotReady,
    Started(Round),
    /// The round budget is spent, carries the final score.
    GameOver(Score),
}

/// One game from the first round to the final score.
pub struct GameSession {
    levels: LevelTable,
    level_id: String,
    config: LevelConfig,
    state: SessionState,
    round: Round,
    round_score: Score,
    cumulative_score: Score,
    final_score: Option<Score>,
    position: Coord2,
    board: Board,
    history: History,
    moves: Vec<MoveRecord>,
    archive: Vec<ArchivedRound>,
    last_outcome: Option<MoveOutcome>,
    rng: SmallRng,
    sink: Box<dyn ReportSink>,
}

impl GameSession {
    /// Starts a game on the table's default level.
    pub fn new(levels: LevelTable, seed: u64) -> Result<Self> {
        levels.validate()?;
        let (level_id, config) = levels.default_level()?;
        let level_id = level_id.to_owned();
        let board = CoinFlipGenerator.generate(config)?;

        Ok(Self {
            levels,
            level_id,
            config,
            state: SessionState::RoundActive,
            round: 1,
            round_score: 0,
            cumulative_score: 0,
            final_score: None,
            position: config.home(),
            board,
            history: History::init_empty(config.size()),
            moves: Vec::new(),
            archive: Vec::new(),
            last_outcome: None,
            rng: SmallRng::seed_from_u64(seed),
            sink: Box::new(NullSink),
        })
    }

    /// Routes round and game payloads to `sink`.
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_round_over(&self) -> bool {
        self.state.is_round_over()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn config(&self) -> LevelConfig {
        self.config
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn round_score(&self) -> Score {
        self.round_score
    }

    pub fn cumulative_score(&self) -> Score {
        self.cumulative_score
    }

    pub fn final_score(&self) -> Option<Score> {
        self.final_score
    }

    pub fn position(&self) -> Coord2 {
        self.position
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Moves of the round in progress, or of the round that just ended.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn archive(&self) -> &[ArchivedRound] {
        &self.archive
    }

    pub fn last_outcome(&self) -> Option<MoveOutcome> {
        self.last_outcome
    }

    /// Steps the player onto `to`. Rejected moves leave the session untouched.
    pub fn move_to(&mut self, to: Coord2) -> core::result::Result<MoveOutcome, Rejection> {
        let context = RoundContext {
            round: self.round,
            steps_taken: self.moves.len() as u32,
            is_over: self.state.is_round_over(),
        };
        let rng = &mut self.rng;
        let resolution = resolve_move(
            &self.board,
            self.position,
            to,
            &self.history,
            context,
            || rng.random::<f64>(),
        )?;

        self.board = resolution.board;
        self.position = to;
        self.round_score += resolution.score_delta;
        self.moves.push(resolution.record);
        self.last_outcome = Some(resolution.outcome);

        match resolution.outcome {
            MoveOutcome::Survived => {}
            MoveOutcome::ReturnedHome => self.finish_round(true),
            MoveOutcome::Failed => {
                self.round_score = 0;
                self.finish_round(false);
            }
        }
        Ok(resolution.outcome)
    }

    /// Banks the round, records its snapshot, and hands the report off.
    fn finish_round(&mut self, success: bool) {
        self.state = SessionState::RoundOver;

        if self.round_score > 0 {
            self.cumulative_score += self.round_score;
        }

        // the next board is derived from this snapshot, so it must precede any regeneration
        if let Err(err) = self.history.append_round_snapshot(&self.board, self.round) {
            log::error!("Could not record round {}: {}", self.round, err);
        }

        self.archive.push(ArchivedRound {
            round_number: self.round,
            moves: self.moves.clone(),
            final_score: self.round_score,
        });

        log::info!(
            "Round {} {} with {} points after {} steps, total {}",
            self.round,
            if success { "banked" } else { "lost" },
            self.round_score,
            self.moves.len(),
            self.cumulative_score
        );

        self.sink.submit(ReportPayload::Round(RoundReport {
            round_number: self.round,
            final_score: self.round_score,
            moves: self.moves.clone(),
            board: self.dimensions(),
            level_id: self.level_id.clone(),
            success,
        }));
    }

    /// Moves on to the next round, or ends the game once the budget is spent.
    pub fn start_new_round(&mut self) -> Result<NewRound> {
        match self.state {
            SessionState::RoundActive => return Ok(NewRound::NotReady),
            SessionState::GameOver => {
                return Ok(NewRound::GameOver(self.final_score.unwrap_or_default()));
            }
            SessionState::RoundOver => {}
        }

        if self.round >= TOTAL_ROUNDS {
            return Ok(NewRound::GameOver(self.finish_game()));
        }

        let fresh = CoinFlipGenerator.generate(self.config)?;
        self.board = update_probabilities_from_past_visits(&fresh, &self.history, self.config.coins)?;
        self.round += 1;
        self.reset_round();

        log::info!("Round {} started", self.round);
        Ok(NewRound::Started(self.round))
    }

    fn finish_game(&mut self) -> Score {
        let total = self.archive.iter().map(|round| round.final_score).sum();
        self.final_score = Some(total);
        self.state = SessionState::GameOver;

        // only the past-round rings stay visible on the final board
        let home = self.config.home();
        for cell in self.board.cells_mut().iter_mut() {
            cell.opened = false;
            cell.player_here = false;
        }
        self.board[home].player_here = true;
        self.position = home;

        log::info!(
            "Game over on level {} after {} rounds, final score {}",
            self.level_id,
            self.round,
            total
        );

        self.sink.submit(ReportPayload::Game(GameReport {
            total_score: total,
            rounds: self.archive.clone(),
            level_id: self.level_id.clone(),
            completed: true,
        }));
        total
    }

    /// Switches difficulty, which restarts the game from scratch.
    pub fn change_level(&mut self, level_id: &str) -> Result<()> {
        let config = self.levels.get(level_id)?;
        self.level_id = level_id.to_owned();
        self.config = config;
        log::info!("Level changed to {}", level_id);
        self.start_new_game()
    }

    /// Clears rounds, history, archive, and scores, and deals a fresh board.
    pub fn start_new_game(&mut self) -> Result<()> {
        self.board = CoinFlipGenerator.generate(self.config)?;
        self.history = History::init_empty(self.config.size());
        self.archive.clear();
        self.cumulative_score = 0;
        self.final_score = None;
        self.round = 1;
        self.reset_round();
        Ok(())
    }

    fn reset_round(&mut self) {
        self.state = SessionState::RoundActive;
        self.round_score = 0;
        self.moves.clear();
        self.last_outcome = None;
        self.position = self.config.home();
    }

    fn dimensions(&self) -> BoardDimensions {
        BoardDimensions {
            rows: self.config.rows,
            cols: self.config.cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MemorySink;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<MemorySink>>);

    impl ReportSink for SharedSink {
        fn submit(&mut self, payload: ReportPayload) {
            self.0.borrow_mut().submit(payload);
        }
    }

    fn session() -> GameSession {
        GameSession::new(LevelTable::standard(), 7).unwrap()
    }

    /// Small board where every non-home cell always fails.
    fn doomed_session() -> GameSession {
        let mut levels = LevelTable::standard();
        levels
            .levels
            .insert("doom".into(), LevelConfig::new_unchecked(3, 3, MAX_COINS));
        let mut session = GameSession::new(levels, 1).unwrap();
        session.change_level("doom").unwrap();
        doom(&mut session.board);
        session
    }

    fn doom(board: &mut Board) {
        for coords in board.iter_coords() {
            if !board.is_home(coords) {
                board[coords].probability = 0.0;
            }
        }
    }

    /// Board where every cell is safe.
    fn safe_session() -> GameSession {
        let mut session = session();
        for cell in session.board.cells_mut().iter_mut() {
            cell.probability = 1.0;
        }
        session
    }

    #[test]
    fn new_session_starts_at_home_in_round_one() {
        let session = session();

        assert_eq!(session.state(), SessionState::RoundActive);
        assert_eq!(session.round(), 1);
        assert_eq!(session.level_id(), "deuce");
        assert_eq!(session.position(), (6, 6));
        assert_eq!(session.board().size(), (13, 13));
        assert_eq!(session.history().round_count(), 0);
    }

    #[test]
    fn rejected_moves_change_nothing() {
        let mut session = session();
        let board = session.board().clone();

        assert_eq!(session.move_to((7, 7)), Err(Rejection::IllegalMove));
        assert_eq!(session.move_to((6, 6)), Err(Rejection::IllegalMove));
        assert_eq!(session.move_to((6, 13)), Err(Rejection::OutOfBounds));

        assert_eq!(session.board(), &board);
        assert!(session.moves().is_empty());
        assert_eq!(session.round_score(), 0);
    }

    #[test]
    fn banking_a_round_keeps_its_score() {
        let mut session = safe_session();

        assert_eq!(session.move_to((6, 7)), Ok(MoveOutcome::Survived));
        assert_eq!(session.move_to((6, 8)), Ok(MoveOutcome::Survived));
        assert_eq!(session.move_to((6, 7)), Ok(MoveOutcome::Survived));
        assert_eq!(session.round_score(), 3);
        assert_eq!(session.move_to((6, 6)), Ok(MoveOutcome::ReturnedHome));

        assert_eq!(session.state(), SessionState::RoundOver);
        assert_eq!(session.round_score(), 3);
        assert_eq!(session.cumulative_score(), 3);
        assert_eq!(session.history().round_count(), 1);
        assert_eq!(session.archive().len(), 1);
        assert_eq!(session.archive()[0].final_score, 3);
        assert_eq!(session.archive()[0].moves.len(), 4);
        assert_eq!(session.board()[(6, 6)].highlight, Highlight::Success);
        assert_eq!(session.move_to((6, 7)), Err(Rejection::RoundAlreadyOver));
    }

    #[test]
    fn failing_forfeits_the_round() {
        let mut session = doomed_session();

        assert_eq!(session.move_to((1, 2)), Ok(MoveOutcome::Failed));

        assert!(session.is_round_over());
        assert_eq!(session.round_score(), 0);
        assert_eq!(session.cumulative_score(), 0);
        assert_eq!(session.archive()[0].final_score, 0);
        assert_eq!(session.board()[(1, 2)].highlight, Highlight::Failure);
        assert_eq!(session.moves().len(), 1);
    }

    #[test]
    fn new_round_waits_for_round_end() {
        let mut session = session();

        assert_eq!(session.start_new_round().unwrap(), NewRound::NotReady);
        assert_eq!(session.round(), 1);
    }

    #[test]
    fn next_round_is_harder_where_we_walked() {
        let mut session = safe_session();
        let untouched = init_game(13, 13, 2).unwrap();
        session.move_to((6, 7)).unwrap();
        session.move_to((6, 6)).unwrap();

        assert_eq!(session.start_new_round().unwrap(), NewRound::Started(2));

        assert_eq!(session.state(), SessionState::RoundActive);
        assert_eq!(session.round_score(), 0);
        assert!(session.moves().is_empty());
        assert_eq!(session.position(), (6, 6));
        assert!(session.board()[(6, 8)].probability < untouched[(6, 8)].probability);
        assert_eq!(session.board()[(0, 0)].probability, untouched[(0, 0)].probability);
        assert!(session.board().cells().iter().all(|cell| !cell.opened));
    }

    #[test]
    fn game_ends_after_the_round_budget() {
        let sink = SharedSink::default();
        let mut session = doomed_session().with_sink(sink.clone());

        for round in 1..=TOTAL_ROUNDS {
            assert_eq!(session.round(), round);
            assert_eq!(session.move_to((1, 2)), Ok(MoveOutcome::Failed));
            let next = session.start_new_round().unwrap();
            if round < TOTAL_ROUNDS {
                assert_eq!(next, NewRound::Started(round + 1));
                doom(&mut session.board);
            } else {
                assert_eq!(next, NewRound::GameOver(0));
            }
        }

        assert!(session.is_game_over());
        assert_eq!(session.round(), TOTAL_ROUNDS);
        assert_eq!(session.final_score(), Some(0));
        assert_eq!(session.start_new_round().unwrap(), NewRound::GameOver(0));
        assert_eq!(session.round(), TOTAL_ROUNDS);
        assert_eq!(session.history().round_count(), TOTAL_ROUNDS as usize);
        assert!(session.board().cells().iter().all(|cell| !cell.opened));
        assert_eq!(session.board().player_position(), Some((1, 1)));

        let memory = sink.0.borrow();
        let payloads = &memory.payloads;
        assert_eq!(payloads.len(), TOTAL_ROUNDS as usize + 1);
        assert!(matches!(
            payloads.last(),
            Some(ReportPayload::Game(GameReport { completed: true, .. }))
        ));
    }

    #[test]
    fn change_level_restarts_everything() {
        let mut session = safe_session();
        session.move_to((6, 7)).unwrap();
        session.move_to((6, 6)).unwrap();
        session.start_new_round().unwrap();

        session.change_level("trey").unwrap();

        assert_eq!(session.level_id(), "trey");
        assert_eq!(session.round(), 1);
        assert_eq!(session.cumulative_score(), 0);
        assert_eq!(session.board().size(), (17, 17));
        assert_eq!(session.history().size(), (17, 17));
        assert_eq!(session.history().round_count(), 0);
        assert!(session.archive().is_empty());
        assert_eq!(session.position(), (8, 8));

        assert_eq!(session.change_level("quint"), Err(GameError::UnknownLevel));
        assert_eq!(session.level_id(), "trey");
    }

    #[test]
    fn start_new_game_clears_scores() {
        let mut session = safe_session();
        session.move_to((5, 6)).unwrap();
        session.move_to((6, 6)).unwrap();
        assert_eq!(session.cumulative_score(), 1);

        session.start_new_game().unwrap();

        assert_eq!(session.round(), 1);
        assert_eq!(session.cumulative_score(), 0);
        assert_eq!(session.final_score(), None);
        assert_eq!(session.history().round_count(), 0);
        assert_eq!(session.state(), SessionState::RoundActive);
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let walk = [(6, 7), (6, 8), (6, 9), (6, 8), (6, 7), (6, 6)];
        let play = || {
            let mut session = session();
            for to in walk {
                if session.move_to(to).is_err() {
                    break;
                }
            }
            (session.moves().to_vec(), session.round_score())
        };

        assert_eq!(play(), play());
    }
}
