use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::choices::LegalChoices;
use crate::constants::NON_MEANINGFUL_MOVE_LIMIT;
use crate::position::{GameError, Position, StartingLayout};
use crate::rules::{Action, RuleSet};
use crate::troop::TroopId;
use crate::types::{Choice, Coord, Facing, Side, TroopKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinReason {
    Checkmate,
    Resignation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    FiftyMoveRule,
    Stalemate { stuck: Side },
    DeadPosition,
    Agreement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Won { winner: Side, reason: WinReason },
    Drawn { reason: DrawReason },
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Ongoing)
    }

    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }

    pub const fn is_draw(self) -> bool {
        matches!(self, Self::Drawn { .. })
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Ongoing => f.write_str("Game in progress."),
            Self::Won {
                winner,
                reason: WinReason::Checkmate,
            } => write!(f, "Checkmate! {winner} wins!"),
            Self::Won {
                winner,
                reason: WinReason::Resignation,
            } => write!(f, "{} resigned. {winner} wins!", winner.opponent()),
            Self::Drawn {
                reason: DrawReason::FiftyMoveRule,
            } => f.write_str("Game over by the 50 move rule."),
            Self::Drawn {
                reason: DrawReason::Stalemate { stuck },
            } => write!(f, "Stalemate! {stuck} cannot move."),
            Self::Drawn {
                reason: DrawReason::DeadPosition,
            } => f.write_str("Draw by dead position."),
            Self::Drawn {
                reason: DrawReason::Agreement,
            } => f.write_str("Draw by agreement."),
        }
    }
}

impl Position {
    /// Conservative proof that no troop of `side` other than the leader can
    /// ever move again. False negatives are fine; false positives are not.
    ///
    /// Command analysis looks one hop deep only: a commanded teammate is
    /// checked from each command destination, not from chains of commands.
    pub fn can_only_move_leader(&self, side: Side) -> bool {
        let player = self.player(side);
        if !player.bag.is_empty() {
            return false;
        }
        let rules = self.rules();
        let leader_kind = rules.leader();
        // A commanding leader can move a stranded troop.
        let leader_commands = [Facing::Front, Facing::Back].into_iter().any(|facing| {
            rules
                .movements(leader_kind, facing)
                .iter()
                .any(|rule| rule.action == Action::Command)
        });
        if leader_commands {
            return false;
        }

        for &id in &player.in_play {
            let troop = self.troop(id);
            if troop.kind == leader_kind {
                continue;
            }
            let Some(origin) = troop.coords else {
                continue;
            };

            let mut teammates: Vec<TroopId> = Vec::new();
            let mut destinations: Vec<Coord> = Vec::new();
            for rule in rules.movements(troop.kind, troop.facing) {
                let Some(target) = rule.target(origin, side) else {
                    continue;
                };
                // A strike flips the striker, which may unlock motion.
                if rule.action.is_motion() || rule.action == Action::Strike {
                    return false;
                }
                match self.board.get(target) {
                    Some(other) if self.troop(other).owner == side => teammates.push(other),
                    _ => destinations.push(target),
                }
            }
            if destinations.is_empty() {
                continue;
            }

            for &teammate_id in &teammates {
                let teammate = self.troop(teammate_id);
                if teammate.kind != leader_kind {
                    return false;
                }
                let from_destination = destinations.iter().any(|&dst| {
                    rules
                        .movements(teammate.kind, teammate.facing)
                        .iter()
                        .any(|rule| rule.action.is_motion() && rule.target(dst, side).is_some())
                });
                if from_destination {
                    return false;
                }
            }

            let flipped_can_move = rules
                .movements(troop.kind, troop.facing.flipped())
                .iter()
                .any(|rule| rule.action.is_motion() && rule.target(origin, side).is_some());
            if flipped_can_move {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub choices: [LegalChoices; 2],
    pub in_check: [bool; 2],
    pub status: GameStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDraw {
    side: Side,
    dest: Coord,
    kind: TroopKind,
}

#[derive(Debug, Clone)]
pub struct DukeGame {
    position: Position,
    to_move: Side,
    turn: u32,
    choices: [LegalChoices; 2],
    status: GameStatus,
    played: Vec<(Side, Choice)>,
    pending_draw: Option<PendingDraw>,
    rng: StdRng,
}

impl DukeGame {
    pub fn new(
        rules: Arc<RuleSet>,
        layouts: &[StartingLayout; 2],
        seed: u64,
    ) -> Result<Self, GameError> {
        let position = Position::new(rules, layouts)?;
        Ok(Self::from_position(position, Side::One, seed))
    }

    pub fn standard(seed: u64) -> Self {
        Self::from_position(Position::standard(), Side::One, seed)
    }

    pub fn from_position(position: Position, to_move: Side, seed: u64) -> Self {
        let mut game = Self {
            position,
            to_move,
            turn: 0,
            choices: [LegalChoices::default(), LegalChoices::default()],
            status: GameStatus::Ongoing,
            played: Vec::new(),
            pending_draw: None,
            rng: StdRng::seed_from_u64(seed),
        };
        for side in Side::BOTH {
            game.choices[side.index()] = game.position.calculate_choices(side, true);
            let in_check = game.leader_attacked(side);
            game.position.player_mut(side).in_check = in_check;
        }
        game
    }

    pub const fn position(&self) -> &Position {
        &self.position
    }

    pub fn rules(&self) -> &RuleSet {
        self.position.rules()
    }

    pub const fn to_move(&self) -> Side {
        self.to_move
    }

    pub const fn turn(&self) -> u32 {
        self.turn
    }

    pub const fn status(&self) -> GameStatus {
        self.status
    }

    pub const fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn choices(&self, side: Side) -> &LegalChoices {
        &self.choices[side.index()]
    }

    pub fn in_check(&self, side: Side) -> bool {
        self.position.player(side).in_check
    }

    pub fn played(&self) -> &[(Side, Choice)] {
        &self.played
    }

    pub fn report(&self) -> TurnReport {
        TurnReport {
            choices: self.choices.clone(),
            in_check: [self.in_check(Side::One), self.in_check(Side::Two)],
            status: self.status,
        }
    }

    /// Draws the troop for a pull to `dest` with the caller's generator.
    /// The returned choice must be played next.
    pub fn materialize_pull<R: Rng>(&mut self, dest: Coord, rng: &mut R) -> Result<Choice, GameError> {
        self.check_pull(dest)?;
        let side = self.to_move;
        let kind = self.position.draw_from_bag(side, rng)?;
        self.pending_draw = Some(PendingDraw { side, dest, kind });
        Ok(Choice::Pull {
            dest,
            kind: Some(kind),
        })
    }

    pub fn play(&mut self, choice: Choice) -> Result<TurnReport, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        let side = self.to_move;

        let choice = match choice {
            Choice::Pull { dest, kind: None } => {
                if self.pending_draw.is_some() {
                    return Err(GameError::PendingDraw);
                }
                self.check_pull(dest)?;
                let kind = self.position.player_mut(side).bag.pull(&mut self.rng)?;
                Choice::Pull {
                    dest,
                    kind: Some(kind),
                }
            }
            Choice::Pull {
                dest,
                kind: Some(kind),
            } => {
                let expected = PendingDraw { side, dest, kind };
                if self.pending_draw != Some(expected) {
                    return Err(GameError::UndrawnPull(dest));
                }
                choice
            }
            other => {
                if self.pending_draw.is_some() {
                    return Err(GameError::PendingDraw);
                }
                if !self.choices(side).contains(&other) {
                    warn!(%side, choice = %other, "rejected illegal choice");
                    return Err(GameError::IllegalChoice(other));
                }
                other
            }
        };

        self.position.apply_choice(side, &choice, false)?;
        self.pending_draw = None;
        self.played.push((side, choice));
        self.turn = self.turn.saturating_add(1);
        self.to_move = side.opponent();
        self.finish_turn(side);
        Ok(self.report())
    }

    /// Plays a recorded choice. A pull must name its troop, which is taken
    /// out of the bag instead of drawn.
    pub fn replay(&mut self, choice: Choice) -> Result<TurnReport, GameError> {
        if let Choice::Pull { dest, kind } = choice {
            let kind = kind.ok_or(GameError::UndrawnPull(dest))?;
            self.check_pull(dest)?;
            let side = self.to_move;
            self.position.player_mut(side).bag.take(kind)?;
            self.pending_draw = Some(PendingDraw { side, dest, kind });
        }
        self.play(choice)
    }

    pub fn play_as(&mut self, side: Side, choice: Choice) -> Result<TurnReport, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if side != self.to_move {
            return Err(GameError::WrongTurn(side));
        }
        self.play(choice)
    }

    pub fn resign(&mut self, side: Side) -> Result<GameStatus, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        self.status = GameStatus::Won {
            winner: side.opponent(),
            reason: WinReason::Resignation,
        };
        debug!(status = %self.status, "game ended");
        Ok(self.status)
    }

    pub fn agree_draw(&mut self) -> Result<GameStatus, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        self.status = GameStatus::Drawn {
            reason: DrawReason::Agreement,
        };
        debug!(status = %self.status, "game ended");
        Ok(self.status)
    }

    fn check_pull(&self, dest: Coord) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if self.pending_draw.is_some() {
            return Err(GameError::PendingDraw);
        }
        let choice = Choice::Pull { dest, kind: None };
        if !self.choices(self.to_move).contains(&choice) {
            return Err(GameError::IllegalChoice(choice));
        }
        Ok(())
    }

    fn leader_attacked(&self, side: Side) -> bool {
        let Some(leader) = self.position.leader_coords(side) else {
            return true;
        };
        side.opponents()
            .any(|opponent| self.position.attacks(opponent).contains(&leader))
    }

    fn finish_turn(&mut self, mover: Side) {
        self.position.player_mut(mover).in_check = false;
        self.choices[mover.index()] = self.position.calculate_choices(mover, true);
        let mover_attacks = self.position.attacks(mover);

        for opponent in mover.opponents() {
            self.choices[opponent.index()] = self.position.calculate_choices(opponent, true);
            let in_check = self
                .position
                .leader_coords(opponent)
                .map_or(true, |leader| mover_attacks.contains(&leader));
            self.position.player_mut(opponent).in_check = in_check;
        }

        if self.position.non_meaningful_moves() >= NON_MEANINGFUL_MOVE_LIMIT {
            self.end(GameStatus::Drawn {
                reason: DrawReason::FiftyMoveRule,
            });
            return;
        }

        for opponent in mover.opponents() {
            if !self.choices[opponent.index()].has_no_valid_choices() {
                continue;
            }
            let status = if self.position.player(opponent).in_check {
                GameStatus::Won {
                    winner: mover,
                    reason: WinReason::Checkmate,
                }
            } else {
                GameStatus::Drawn {
                    reason: DrawReason::Stalemate { stuck: opponent },
                }
            };
            self.end(status);
            return;
        }

        if Side::BOTH
            .into_iter()
            .all(|side| self.position.can_only_move_leader(side))
        {
            self.end(GameStatus::Drawn {
                reason: DrawReason::DeadPosition,
            });
        }
    }

    fn end(&mut self, status: GameStatus) {
        debug!(turn = self.turn, %status, "game ended");
        self.status = status;
    }
}
