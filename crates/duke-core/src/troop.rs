use serde::{Deserialize, Serialize};

use crate::types::{Coord, Facing, Side, TroopKind};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TroopId(pub u16);

impl TroopId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Troop {
    pub id: TroopId,
    pub kind: TroopKind,
    pub owner: Side,
    pub coords: Option<Coord>,
    pub facing: Facing,
    pub in_play: bool,
    pub captured: bool,
}

impl Troop {
    pub const fn placed(id: TroopId, kind: TroopKind, owner: Side, coords: Coord) -> Self {
        Self {
            id,
            kind,
            owner,
            coords: Some(coords),
            facing: Facing::Front,
            in_play: true,
            captured: false,
        }
    }

    pub fn flip(&mut self) {
        self.facing = self.facing.flipped();
    }
}
