use std::fmt;

use duke_core::{Agent, Choice, DukeGame, GameError, RuleSet, Side, StartingLayout};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consequences::{consequences, Consequence};
use crate::heuristics::general_score;

pub const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Normal;
pub const DEFAULT_BASE_SCORE: u32 = 100;

/// Ordered AI strength. The numeric level steers how far selection trusts
/// raw scores over the candidate average.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Difficulty {
    /// Uniformly random.
    Beginner = 0,
    /// General heuristics only.
    Easy = 1,
    /// General heuristics plus one-ply consequences.
    #[default]
    Normal = 2,
    /// Like `Normal` with a steeper selection bias.
    Hard = 3,
    /// Consequences only.
    Expert = 4,
}

impl Difficulty {
    pub const ALL: [Self; 5] = [
        Self::Beginner,
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::Expert,
    ];

    pub const fn level(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    /// Accepts a name (any case) or the numeric level.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name() == name || difficulty.level().to_string() == name)
    }

    const fn uses_general_heuristics(self) -> bool {
        matches!(self, Self::Easy | Self::Normal | Self::Hard)
    }

    const fn uses_consequences(self) -> bool {
        matches!(self, Self::Normal | Self::Hard | Self::Expert)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    /// `None` picks a random seed; either way the seed is logged.
    pub seed: Option<u64>,
    pub base_score: u32,
}

impl AiConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            seed: None,
            base_score: DEFAULT_BASE_SCORE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateScore {
    /// Mates the opponent; take it.
    Checkmate,
    Points(u32),
}

/// Heuristic player. Every decision is scored and then drawn at random in
/// proportion to its score, so equal seeds replay equal games.
#[derive(Debug, Clone)]
pub struct DukeAi {
    side: Side,
    config: AiConfig,
    seed: u64,
    rng: StdRng,
}

impl DukeAi {
    pub fn new(side: Side, config: AiConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(%side, seed, difficulty = %config.difficulty, "ai seeded");
        Self {
            side,
            config,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }

    pub const fn config(&self) -> &AiConfig {
        &self.config
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn score_choice(&self, game: &DukeGame, choice: &Choice) -> Result<CandidateScore, GameError> {
        let difficulty = self.config.difficulty;
        if difficulty == Difficulty::Beginner {
            return Ok(CandidateScore::Points(0));
        }

        let mut score = i64::from(self.config.base_score);
        if difficulty.uses_general_heuristics() {
            score += general_score(game.position(), self.side, choice);
        }
        if difficulty.uses_consequences() {
            match consequences(game, self.side, choice)? {
                Consequence::Checkmate => return Ok(CandidateScore::Checkmate),
                Consequence::Delta(delta) => score += delta,
            }
        }
        Ok(CandidateScore::Points(
            u32::try_from(score.max(0)).unwrap_or(u32::MAX),
        ))
    }

    /// Picks one of the legal choices. Pulls come back with the kind still
    /// undrawn.
    pub fn select(&mut self, game: &DukeGame) -> Result<Choice, GameError> {
        let mut candidates = game.choices(self.side).to_choices();
        if candidates.is_empty() {
            return Err(GameError::NoLegalChoices);
        }
        candidates.shuffle(&mut self.rng);

        let mut scores = Vec::with_capacity(candidates.len());
        for choice in &candidates {
            let points = match self.score_choice(game, choice)? {
                CandidateScore::Checkmate => {
                    debug!(side = %self.side, %choice, "taking mate");
                    return Ok(*choice);
                }
                CandidateScore::Points(points) => points,
            };
            scores.push(points);
        }

        let idx = weighted_index(&scores, self.config.difficulty.level(), &mut self.rng);
        debug!(
            side = %self.side,
            choice = %candidates[idx],
            score = scores[idx],
            candidates = candidates.len(),
            "selected"
        );
        Ok(candidates[idx])
    }
}

impl Agent for DukeAi {
    fn side(&self) -> Side {
        self.side
    }

    fn choose_layout(&mut self, rules: &RuleSet) -> StartingLayout {
        let auxiliaries = rules.starting_troops().len().saturating_sub(1);
        StartingLayout::random(self.side, auxiliaries, &mut self.rng)
    }

    fn take_turn(&mut self, game: &mut DukeGame) -> Result<Choice, GameError> {
        if game.is_finished() {
            return Err(GameError::GameOver);
        }
        if game.to_move() != self.side {
            return Err(GameError::WrongTurn(self.side));
        }
        match self.select(game)? {
            Choice::Pull { dest, kind: None } => game.materialize_pull(dest, &mut self.rng),
            choice => Ok(choice),
        }
    }
}

/// Roulette pick over scores pulled toward their average. `level` 0 makes
/// every candidate equally likely; higher levels trust the raw scores more.
/// An all-zero board picks the first candidate.
pub fn weighted_index<R: Rng>(scores: &[u32], level: u32, rng: &mut R) -> usize {
    let total: u64 = scores.iter().map(|&score| u64::from(score)).sum();
    if total == 0 || scores.is_empty() {
        return 0;
    }
    let average = (total / scores.len() as u64) as f64;
    let trust = f64::from(10 * level);
    let roll = rng.gen_range(0..total) as f64;

    let mut cumulative = 0.0;
    for (idx, &score) in scores.iter().enumerate() {
        let blended = (f64::from(score) * trust + average) / (trust + 1.0);
        cumulative += (blended * 100.0).round() / 100.0;
        if roll < cumulative {
            return idx;
        }
    }
    scores.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_names_and_levels() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::from_name(difficulty.name()), Some(difficulty));
            assert_eq!(
                Difficulty::from_name(&difficulty.level().to_string()),
                Some(difficulty)
            );
        }
        assert_eq!(Difficulty::from_name(" HARD "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_name("grandmaster"), None);
        assert!(Difficulty::Beginner < Difficulty::Expert);
        assert_eq!(Difficulty::default(), DEFAULT_DIFFICULTY);
    }

    #[test]
    fn all_zero_scores_pick_the_first() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(weighted_index(&[0, 0, 0], 4, &mut rng), 0);
        assert_eq!(weighted_index(&[], 2, &mut rng), 0);
    }

    #[test]
    fn high_scores_dominate_at_high_levels() {
        let mut rng = StdRng::seed_from_u64(7);
        let scores = [1, 1, 1, 97];
        let hits = (0..1000)
            .filter(|_| weighted_index(&scores, 4, &mut rng) == 3)
            .count();
        assert!(hits > 850, "{hits}");
    }

    #[test]
    fn level_zero_flattens_to_uniform() {
        let mut rng = StdRng::seed_from_u64(7);
        let scores = [1, 1, 1, 97];
        let hits = (0..1000)
            .filter(|_| weighted_index(&scores, 0, &mut rng) == 3)
            .count();
        assert!((150..350).contains(&hits), "{hits}");
    }
}
