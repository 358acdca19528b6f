use std::sync::Arc;

use duke_core::{Agent, Choice, DukeGame, GameError, GameStatus, RuleSet, Side, StartingLayout};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{AiConfig, DukeAi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
    /// Stopped at the turn limit.
    Unfinished,
}

impl GameResult {
    pub fn from_status(status: GameStatus) -> Self {
        match status {
            GameStatus::Ongoing => Self::Unfinished,
            GameStatus::Won {
                winner: Side::One, ..
            } => Self::PlayerOneWin,
            GameStatus::Won {
                winner: Side::Two, ..
            } => Self::PlayerTwoWin,
            GameStatus::Drawn { .. } => Self::Draw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub layouts: [StartingLayout; 2],
    pub choices: Vec<(Side, Choice)>,
    pub result: GameResult,
    pub reason: String,
    pub turns: u32,
    pub seeds: [u64; 2],
}

#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    pub rules: Arc<RuleSet>,
    pub players: [AiConfig; 2],
    pub max_turns: u32,
    /// Seeds the game itself and any seat without a seed of its own.
    pub seed: u64,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            rules: RuleSet::standard(),
            players: [AiConfig::default(); 2],
            max_turns: 300,
            seed: 0,
        }
    }
}

impl SelfPlayConfig {
    fn seat(&self, side: Side) -> AiConfig {
        let mut config = self.players[side.index()];
        if config.seed.is_none() {
            config.seed = Some(
                self.seed
                    .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                    .wrapping_add(u64::from(side.to_code())),
            );
        }
        config
    }
}

/// Plays one AI-vs-AI game to its end or to `max_turns`.
pub fn play_game(config: &SelfPlayConfig) -> Result<GameRecord, GameError> {
    let mut seats = Side::BOTH.map(|side| DukeAi::new(side, config.seat(side)));
    let layouts = [
        seats[0].choose_layout(&config.rules),
        seats[1].choose_layout(&config.rules),
    ];
    let mut game = DukeGame::new(Arc::clone(&config.rules), &layouts, config.seed)?;

    while !game.is_finished() && game.turn() < config.max_turns {
        let side = game.to_move();
        let choice = seats[side.index()].take_turn(&mut game)?;
        game.play_as(side, choice)?;
    }

    let status = game.status();
    let result = GameResult::from_status(status);
    debug!(?result, turns = game.turn(), %status, "self-play game finished");

    Ok(GameRecord {
        layouts,
        choices: game.played().to_vec(),
        result,
        reason: status.to_string(),
        turns: game.turn(),
        seeds: [seats[0].seed(), seats[1].seed()],
    })
}
