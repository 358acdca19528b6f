use crate::constants::BOARD_SIZE;
use crate::troop::TroopId;
use crate::types::Coord;

const SIZE: usize = BOARD_SIZE as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[Option<TroopId>; SIZE]; SIZE],
}

impl Board {
    pub const fn empty() -> Self {
        Self {
            cells: [[None; SIZE]; SIZE],
        }
    }

    pub fn get(&self, coord: Coord) -> Option<TroopId> {
        let (x, y) = index(coord);
        self.cells[x][y]
    }

    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    pub fn set(&mut self, coord: Coord, troop: Option<TroopId>) {
        let (x, y) = index(coord);
        self.cells[x][y] = troop;
    }
}

fn index(coord: Coord) -> (usize, usize) {
    assert!(
        coord.x < BOARD_SIZE && coord.y < BOARD_SIZE,
        "coordinate ({}, {}) is off the board",
        coord.x,
        coord.y
    );
    (usize::from(coord.x), usize::from(coord.y))
}
