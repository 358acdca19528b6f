use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    One = 1,
    Two = 2,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::One, Self::Two];

    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub const fn to_code(self) -> u8 {
        self as u8
    }

    pub const fn home_rank(self) -> u8 {
        match self {
            Self::One => 0,
            Self::Two => BOARD_SIZE - 1,
        }
    }

    pub const fn forward(self) -> i8 {
        match self {
            Self::One => 1,
            Self::Two => -1,
        }
    }

    pub fn opponents(self) -> impl Iterator<Item = Self> {
        Self::BOTH.into_iter().filter(move |side| *side != self)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.to_code())
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facing {
    Front = 1,
    Back = 2,
}

impl Facing {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Front => 0,
            Self::Back => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TroopKind {
    Duke,
    Footman,
    Pikeman,
    Knight,
    Longbowman,
    Champion,
    Wizard,
    Marshall,
    General,
    Priest,
    Seer,
    Dragoon,
    Assassin,
    Bowman,
    Ranger,
    /// Stand-in for a pulled troop whose kind has not been drawn yet.
    #[serde(skip)]
    Undrawn,
}

impl TroopKind {
    pub const ALL: [Self; 15] = [
        Self::Duke,
        Self::Footman,
        Self::Pikeman,
        Self::Knight,
        Self::Longbowman,
        Self::Champion,
        Self::Wizard,
        Self::Marshall,
        Self::General,
        Self::Priest,
        Self::Seer,
        Self::Dragoon,
        Self::Assassin,
        Self::Bowman,
        Self::Ranger,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Duke => "Duke",
            Self::Footman => "Footman",
            Self::Pikeman => "Pikeman",
            Self::Knight => "Knight",
            Self::Longbowman => "Longbowman",
            Self::Champion => "Champion",
            Self::Wizard => "Wizard",
            Self::Marshall => "Marshall",
            Self::General => "General",
            Self::Priest => "Priest",
            Self::Seer => "Seer",
            Self::Dragoon => "Dragoon",
            Self::Assassin => "Assassin",
            Self::Bowman => "Bowman",
            Self::Ranger => "Ranger",
            Self::Undrawn => "",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for TroopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Board cell. (0, 0) is the bottom-left corner as seen by side one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub const fn new_unchecked(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        let x = i16::from(self.x) + i16::from(dx);
        let y = i16::from(self.y) + i16::from(dy);
        let x = u8::try_from(x).ok()?;
        let y = u8::try_from(y).ok()?;
        Self::new(x, y)
    }

    pub fn orthogonal_neighbors(self) -> ArrayVec<Self, 4> {
        [(0, 1), (1, 0), (0, -1), (-1, 0)]
            .into_iter()
            .filter_map(|(dx, dy)| self.offset(dx, dy))
            .collect()
    }

    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.chars();
        let file = chars.next()?.to_ascii_uppercase();
        let rank = chars.as_str().parse::<u8>().ok()?;
        if !file.is_ascii_uppercase() || rank == 0 {
            return None;
        }
        Self::new(file as u8 - b'A', rank - 1)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(b'A' + self.x), self.y + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    /// Place a troop from the bag next to the leader. `kind` stays `None`
    /// until the draw happens.
    Pull { dest: Coord, kind: Option<TroopKind> },
    Move { src: Coord, dst: Coord },
    Strike { src: Coord, target: Coord },
    Command {
        commander: Coord,
        teammate: Coord,
        dst: Coord,
    },
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Pull {
                dest,
                kind: Some(kind),
            } => write!(f, "pull {kind} to {dest}"),
            Self::Pull { dest, kind: None } => write!(f, "pull to {dest}"),
            Self::Move { src, dst } => write!(f, "move {src} to {dst}"),
            Self::Strike { src, target } => write!(f, "strike {target} from {src}"),
            Self::Command {
                commander,
                teammate,
                dst,
            } => write!(f, "command {teammate} to {dst} from {commander}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn troop_kind_name_round_trip() {
        for kind in TroopKind::ALL {
            assert_eq!(TroopKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TroopKind::from_name(""), None);
        assert_eq!(TroopKind::from_name("Marshal"), None);
    }

    #[test]
    fn coord_offset_stays_on_board() {
        let corner = Coord::new_unchecked(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, -1), None);
        assert_eq!(corner.offset(5, 5), Coord::new(5, 5));
        assert_eq!(corner.offset(6, 0), None);
        assert_eq!(corner.orthogonal_neighbors().len(), 2);
        assert_eq!(Coord::new_unchecked(2, 2).orthogonal_neighbors().len(), 4);
    }

    #[test]
    fn parse_coord() {
        assert_eq!(Coord::parse("A1"), Some(Coord::new_unchecked(0, 0)));
        assert_eq!(Coord::parse("f6"), Some(Coord::new_unchecked(5, 5)));
        assert_eq!(Coord::parse("G1"), None);
        assert_eq!(Coord::parse("A0"), None);
        assert_eq!(Coord::parse("A7"), None);
        assert_eq!(Coord::new_unchecked(2, 1).to_string(), "C2");
    }

    #[test]
    fn sides_and_facings_toggle() {
        assert_eq!(Side::One.opponent(), Side::Two);
        assert_eq!(Side::Two.opponent().opponent(), Side::Two);
        assert_eq!(Side::One.opponents().collect::<Vec<_>>(), vec![Side::Two]);
        assert_eq!(Facing::Front.flipped(), Facing::Back);
        assert_eq!(Facing::Back.flipped(), Facing::Front);
    }
}
