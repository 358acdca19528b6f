pub mod ai;
pub mod consequences;
pub mod heuristics;
pub mod selfplay;

pub use ai::{
    weighted_index, AiConfig, CandidateScore, Difficulty, DukeAi, DEFAULT_BASE_SCORE,
    DEFAULT_DIFFICULTY,
};
pub use consequences::{consequences, pull_consequences, Consequence, CHECK_BONUS, THREAT_DELTA};
pub use heuristics::{capture_value, general_score, trapped_leader, CAPTURE_BONUS};
pub use selfplay::{play_game, GameRecord, GameResult, SelfPlayConfig};
