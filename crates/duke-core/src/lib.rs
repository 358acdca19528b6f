pub mod agent;
pub mod bag;
pub mod board;
pub mod choices;
pub mod constants;
pub mod game;
pub mod movegen;
pub mod player;
pub mod position;
pub mod rules;
pub mod troop;
pub mod types;

pub use agent::Agent;
pub use bag::Bag;
pub use board::Board;
pub use choices::{LegalChoices, TroopActions};
pub use constants::{BOARD_SIZE, COORDS, NON_MEANINGFUL_MOVE_LIMIT};
pub use game::{DrawReason, DukeGame, GameStatus, TurnReport, WinReason};
pub use player::Player;
pub use position::{
    CaptureRecord, GameError, HistoryEntry, Position, PositionBuilder, StartingLayout,
};
pub use rules::{Action, MovementRule, RuleSet, RulesError, TroopProfile};
pub use troop::{Troop, TroopId};
pub use types::{Choice, Coord, Facing, Side, TroopKind};
