use rand::Rng;

use crate::position::GameError;
use crate::types::TroopKind;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bag {
    troops: Vec<TroopKind>,
}

impl Bag {
    pub fn new(troops: Vec<TroopKind>) -> Self {
        Self { troops }
    }

    pub fn len(&self) -> usize {
        self.troops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.troops.is_empty()
    }

    pub fn contents(&self) -> &[TroopKind] {
        &self.troops
    }

    /// Draws one troop uniformly at random.
    ///
    /// Legal choices never offer a pull from an empty bag, so `EmptyBag`
    /// means the caller skipped them.
    pub fn pull<R: Rng>(&mut self, rng: &mut R) -> Result<TroopKind, GameError> {
        if self.troops.is_empty() {
            return Err(GameError::EmptyBag);
        }
        let idx = rng.gen_range(0..self.troops.len());
        Ok(self.troops.swap_remove(idx))
    }

    pub fn take(&mut self, kind: TroopKind) -> Result<TroopKind, GameError> {
        let idx = self
            .troops
            .iter()
            .position(|troop| *troop == kind)
            .ok_or(GameError::NotInBag(kind))?;
        Ok(self.troops.swap_remove(idx))
    }
}
