use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Point;
use crate::ai;
use crate::error::GoError;
use crate::goban::{Captures, Goban};
use crate::handicap;
use crate::stone::Stone;
use crate::territory::{self, GameScore};
use crate::turn::Turn;

/// Game phase. `Play` alternates the turn flag between the colors; `Scoring`
/// is entered on two consecutive passes; `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Play,
    Scoring,
    Ended,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Play => write!(f, "play"),
            Stage::Scoring => write!(f, "scoring"),
            Stage::Ended => write!(f, "ended"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(Stage::Play),
            "scoring" => Ok(Stage::Scoring),
            "ended" => Ok(Stage::Ended),
            _ => Err(format!("unknown stage: {s}")),
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub captured: Vec<Point>,
}

/// Result of an accepted pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    pub entered_scoring: bool,
}

/// What the computer side did on its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotMove {
    Played { point: Point, captured: Vec<Point> },
    Passed { entered_scoring: bool },
}

/// Serializable snapshot of the live game for a presentation layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct GameState {
    pub board: Vec<i8>,
    pub size: u8,
    pub captures: Captures,
    pub ko: Option<Vec<i8>>,
    pub stage: Stage,
    pub turn: Stone,
    pub passes: u8,
    pub dead: Vec<Point>,
}

/// The game state machine. Owns the board, the move history, the capture
/// tallies and the dead-stone marks; every mutation goes through the
/// transactional move applier, so a rejected request leaves the engine
/// exactly as it was.
#[derive(Debug, Clone)]
pub struct Engine {
    size: u8,
    handicap: u8,
    komi: f64,
    goban: Goban,
    moves: Vec<Turn>,
    stage: Stage,
    turn: Stone,
    passes: u8,
    dead: HashSet<Point>,
    rng: fastrand::Rng,
}

impl Engine {
    /// A fresh even game: no handicap, komi 6.5.
    pub fn new(size: u8) -> Self {
        Self::with_rules(size, 0, 6.5)
    }

    /// A handicap game with the conventional komi: 0.5 when handicap stones
    /// are placed, 6.5 otherwise.
    pub fn with_handicap(size: u8, handicap: u8) -> Self {
        let komi = if handicap > 0 { 0.5 } else { 6.5 };
        Self::with_rules(size, handicap, komi)
    }

    /// Fully explicit game setup. Handicap stones go on the fixed standard
    /// points for the board size, capped at the number of defined points;
    /// with handicap stones on the board, White moves first.
    pub fn with_rules(size: u8, handicap: u8, komi: f64) -> Self {
        let (goban, placed) = Self::starting_goban(size, handicap);
        let turn = if placed > 0 { Stone::White } else { Stone::Black };

        Engine {
            size,
            handicap,
            komi,
            goban,
            moves: Vec::new(),
            stage: Stage::Play,
            turn,
            passes: 0,
            dead: HashSet::new(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Seed the move selector's tie-break rng, for deterministic play.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    fn starting_goban(size: u8, handicap: u8) -> (Goban, usize) {
        let mut goban = Goban::new(size);
        let mut placed = 0;
        if handicap > 0 {
            for &pt in handicap::handicap_points(size)
                .iter()
                .take(handicap as usize)
            {
                goban.set_stone(pt, Stone::Black);
                placed += 1;
            }
        }
        (goban, placed)
    }

    /// Back to the start state: handicap re-placed, tallies, history, ko
    /// reference and dead marks cleared. The rng carries over so a seeded
    /// engine stays deterministic across resets.
    pub fn reset(&mut self) {
        let (goban, placed) = Self::starting_goban(self.size, self.handicap);
        self.goban = goban;
        self.moves.clear();
        self.stage = Stage::Play;
        self.turn = if placed > 0 { Stone::White } else { Stone::Black };
        self.passes = 0;
        self.dead.clear();
    }

    // -- Accessors --

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn handicap(&self) -> u8 {
        self.handicap
    }

    pub fn komi(&self) -> f64 {
        self.komi
    }

    pub fn goban(&self) -> &Goban {
        &self.goban
    }

    pub fn board(&self) -> &[i8] {
        self.goban.board()
    }

    pub fn captures(&self) -> &Captures {
        self.goban.captures()
    }

    pub fn stone_captures(&self, stone: Stone) -> u32 {
        self.goban.captures().get(stone)
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        self.goban.stone_at(point)
    }

    pub fn moves(&self) -> &[Turn] {
        &self.moves
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn turn(&self) -> Stone {
        self.turn
    }

    pub fn passes(&self) -> u8 {
        self.passes
    }

    pub fn dead_marks(&self) -> &HashSet<Point> {
        &self.dead
    }

    /// Rules legality only; turn and stage gates are checked by `try_play`.
    pub fn is_legal(&self, point: Point, stone: Stone) -> bool {
        self.goban.is_legal(point, stone)
    }

    fn ensure_in_play(&self) -> Result<(), GoError> {
        match self.stage {
            Stage::Play => Ok(()),
            Stage::Scoring => Err(GoError::WrongStage),
            Stage::Ended => Err(GoError::GameEnded),
        }
    }

    // -- Game actions --

    /// Attempt a move for `stone`. On success the board is committed, the
    /// move recorded, the pass counter reset and the turn flipped.
    pub fn try_play(&mut self, stone: Stone, point: Point) -> Result<MoveOutcome, GoError> {
        self.ensure_in_play()?;
        if stone != self.turn {
            return Err(GoError::OutOfTurn);
        }

        let (goban, captured) = self.goban.play(point, stone)?;
        self.goban = goban;
        self.moves
            .push(Turn::play(stone, point, captured.len() as u32));
        self.passes = 0;
        self.turn = stone.opp();
        debug!(%stone, ?point, captured = captured.len(), "move accepted");

        Ok(MoveOutcome { captured })
    }

    /// Attempt a pass. The second consecutive pass enters scoring.
    pub fn try_pass(&mut self, stone: Stone) -> Result<PassOutcome, GoError> {
        self.ensure_in_play()?;
        if stone != self.turn {
            return Err(GoError::OutOfTurn);
        }

        self.moves.push(Turn::pass(stone));
        self.passes += 1;
        self.turn = stone.opp();

        let entered_scoring = self.passes >= 2;
        if entered_scoring {
            self.stage = Stage::Scoring;
            info!("two consecutive passes, entering scoring");
        }

        Ok(PassOutcome { entered_scoring })
    }

    /// Run the move selector for the side to move and apply its choice.
    /// A declined or impossible move becomes a pass; having no legal move at
    /// all is never surfaced as a rejection.
    pub fn bot_turn(&mut self) -> Result<BotMove, GoError> {
        self.ensure_in_play()?;
        let stone = self.turn;

        match ai::choose_move(&self.goban, stone, &mut self.rng) {
            Some(point) => {
                let outcome = self.try_play(stone, point)?;
                Ok(BotMove::Played {
                    point,
                    captured: outcome.captured,
                })
            }
            None => {
                if !self.goban.has_legal_move(stone) {
                    info!(%stone, "no legal moves, automatic pass");
                } else {
                    debug!(%stone, "selector declined to play, passing");
                }
                let outcome = self.try_pass(stone)?;
                Ok(BotMove::Passed {
                    entered_scoring: outcome.entered_scoring,
                })
            }
        }
    }

    // -- Scoring --

    /// Toggle the dead mark on a stone during scoring. Empty points are
    /// ignored.
    pub fn toggle_dead_mark(&mut self, point: Point) -> Result<(), GoError> {
        match self.stage {
            Stage::Scoring => {}
            Stage::Play => return Err(GoError::WrongStage),
            Stage::Ended => return Err(GoError::GameEnded),
        }
        if !self.goban.on_board(point) {
            return Err(GoError::OutOfBounds);
        }
        if self.goban.stone_at(point).is_none() {
            return Ok(());
        }

        if !self.dead.remove(&point) {
            self.dead.insert(point);
        }
        Ok(())
    }

    /// Recompute territory and score from scratch. Available once the game
    /// has left the play stage; idempotent for unchanged dead marks.
    pub fn score(&self) -> Result<GameScore, GoError> {
        if self.stage == Stage::Play {
            return Err(GoError::WrongStage);
        }
        let ownership = territory::estimate_territory(&self.goban, &self.dead);
        Ok(territory::score(
            &self.goban,
            &ownership,
            &self.dead,
            self.komi,
        ))
    }

    /// Territory ownership per point (board layout, `1`/`-1`/`0`), available
    /// outside the play stage only.
    pub fn territory_owners(&self) -> Option<Vec<i8>> {
        if self.stage == Stage::Play {
            return None;
        }
        Some(territory::estimate_territory(&self.goban, &self.dead))
    }

    /// Leave scoring and resume play. Dead marks and the territory map are
    /// discarded and the pass counter resets, so scoring is re-entered only
    /// after two fresh passes.
    pub fn resume_play(&mut self) -> Result<(), GoError> {
        match self.stage {
            Stage::Scoring => {}
            Stage::Play => return Err(GoError::WrongStage),
            Stage::Ended => return Err(GoError::GameEnded),
        }
        self.stage = Stage::Play;
        self.dead.clear();
        self.passes = 0;
        info!("scoring abandoned, resuming play");
        Ok(())
    }

    /// Accept the current scoring result and end the game. Terminal: no
    /// further moves, passes or dead-mark edits are accepted.
    pub fn confirm_end(&mut self) -> Result<(), GoError> {
        match self.stage {
            Stage::Scoring => {}
            Stage::Play => return Err(GoError::WrongStage),
            Stage::Ended => return Err(GoError::GameEnded),
        }
        self.stage = Stage::Ended;
        info!("game ended");
        Ok(())
    }

    // -- Serialization --

    /// Snapshot for external display. Dead marks are sorted so equal states
    /// serialize identically.
    pub fn game_state(&self) -> GameState {
        let mut dead: Vec<Point> = self.dead.iter().copied().collect();
        dead.sort_unstable();

        GameState {
            board: self.goban.board().to_vec(),
            size: self.size,
            captures: self.goban.captures().clone(),
            ko: self.goban.ko().map(<[i8]>::to_vec),
            stage: self.stage,
            turn: self.turn,
            passes: self.passes,
            dead,
        }
    }
}
