//! Rules of thumb that score a choice without playing it out.

use duke_core::{Choice, Coord, Facing, Position, Side};

/// Flat bonus for any choice that takes an enemy troop.
pub const CAPTURE_BONUS: i64 = 50;

/// Adjustment for a troop standing right next to its leader on the leader's
/// line of movement.
pub const TRAP_WEIGHT: i64 = 200;

/// How much the trap adjustment shrinks per cell of distance.
pub const TRAP_FALLOFF: i64 = 40;

pub fn general_score(position: &Position, side: Side, choice: &Choice) -> i64 {
    match *choice {
        Choice::Pull { dest, .. } => trapped_leader(position, side, None, dest),
        Choice::Move { src, dst } => {
            capture_value(position, side, dst) + trapped_leader(position, side, Some(src), dst)
        }
        Choice::Strike { target, .. } => capture_value(position, side, target),
        Choice::Command { teammate, dst, .. } => {
            capture_value(position, side, dst) + trapped_leader(position, side, Some(teammate), dst)
        }
    }
}

/// Bonus plus the victim's weight if `cell` holds an enemy of `side`.
pub fn capture_value(position: &Position, side: Side, cell: Coord) -> i64 {
    position
        .troop_at(cell)
        .filter(|troop| troop.owner != side)
        .map_or(0, |troop| {
            CAPTURE_BONUS + i64::from(position.rules().weight(troop.kind, troop.facing))
        })
}

/// Signed score for how a troop leaving `src` for `dst` changes the
/// crowding of its own leader's line: front facing checks the leader's rank,
/// back facing its file. Leaving the line scores positive, entering it
/// negative, both scaled by closeness. The leader itself scores 0.
pub fn trapped_leader(position: &Position, side: Side, src: Option<Coord>, dst: Coord) -> i64 {
    let leader = position.troop(position.player(side).leader());
    let Some(at) = leader.coords else {
        return 0;
    };
    if src == Some(at) {
        return 0;
    }

    let distance = |cell: Coord| -> Option<i64> {
        let (along, same_line) = match leader.facing {
            Facing::Front => (i64::from(cell.x.abs_diff(at.x)), cell.y == at.y),
            Facing::Back => (i64::from(cell.y.abs_diff(at.y)), cell.x == at.x),
        };
        same_line.then(|| along - 1)
    };
    let weight = |gap: i64| TRAP_WEIGHT - TRAP_FALLOFF * gap;

    let mut score = 0;
    if let Some(gap) = src.and_then(distance) {
        score += weight(gap);
    }
    if let Some(gap) = distance(dst) {
        score -= weight(gap);
    }
    score
}
