use crate::bag::Bag;
use crate::troop::TroopId;
use crate::types::Side;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) side: Side,
    pub(crate) bag: Bag,
    pub(crate) in_play: Vec<TroopId>,
    pub(crate) captured: Vec<TroopId>,
    pub(crate) leader: TroopId,
    pub(crate) in_check: bool,
}

impl Player {
    pub(crate) fn new(side: Side, bag: Bag, leader: TroopId) -> Self {
        Self {
            side,
            bag,
            in_play: Vec::new(),
            captured: Vec::new(),
            leader,
            in_check: false,
        }
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub fn bag(&self) -> &Bag {
        &self.bag
    }

    pub fn in_play(&self) -> &[TroopId] {
        &self.in_play
    }

    pub fn captured(&self) -> &[TroopId] {
        &self.captured
    }

    pub const fn leader(&self) -> TroopId {
        self.leader
    }

    pub const fn in_check(&self) -> bool {
        self.in_check
    }
}
