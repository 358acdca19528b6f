use crate::types::Coord;

pub const BOARD_SIZE: u8 = 6;

pub const NON_MEANINGFUL_MOVE_LIMIT: u16 = 100;

pub const OWN_RANK: i8 = 3;

pub const OWN_FILE: char = 'c';

pub const STANDARD_RULES_JSON: &str = include_str!("../data/standard.json");

pub const COORDS: [Coord; 36] = build_coords();

const fn build_coords() -> [Coord; 36] {
    let mut coords = [Coord::new_unchecked(0, 0); 36];
    let mut idx = 0;
    let mut y = 0u8;
    while y < BOARD_SIZE {
        let mut x = 0u8;
        while x < BOARD_SIZE {
            coords[idx] = Coord::new_unchecked(x, y);
            idx += 1;
            x += 1;
        }
        y += 1;
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_cover_the_board_once() {
        let mut seen = std::collections::BTreeSet::new();
        for coord in COORDS {
            assert!(Coord::new(coord.x, coord.y).is_some());
            assert!(seen.insert(coord));
        }
        assert_eq!(seen.len(), 36);
    }
}
