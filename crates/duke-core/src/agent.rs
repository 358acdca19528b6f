use crate::game::DukeGame;
use crate::position::{GameError, StartingLayout};
use crate::rules::RuleSet;
use crate::types::{Choice, Side};

pub trait Agent {
    fn side(&self) -> Side;

    fn choose_layout(&mut self, rules: &RuleSet) -> StartingLayout;

    /// Returns a choice ready for [`DukeGame::play`]. Pulls come back with
    /// their troop already drawn.
    fn take_turn(&mut self, game: &mut DukeGame) -> Result<Choice, GameError>;
}
