//! One-ply look-ahead: play a candidate on a snapshot and compare who
//! threatens what before and after.

use std::collections::BTreeSet;

use duke_core::{Choice, Coord, DukeGame, Facing, GameError, Position, Side, TroopKind};
use tracing::trace;

/// Reward for leaving an opponent in check.
pub const CHECK_BONUS: i64 = 200;

/// Reward (or penalty) per troop whose threatened state changes.
pub const THREAT_DELTA: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consequence {
    /// The opponent is checkmated on the spot.
    Checkmate,
    Delta(i64),
}

/// Scores `choice` for `side` by simulation. An unresolved pull is averaged
/// over every troop still in the bag.
pub fn consequences(game: &DukeGame, side: Side, choice: &Choice) -> Result<Consequence, GameError> {
    match *choice {
        Choice::Pull { dest, kind: None } => pull_consequences(game, side, dest),
        _ => simulate(game, side, choice),
    }
}

/// Expected consequence of pulling onto `dest`, one draw per bag entry.
/// Mating draws count double the average of the others; if every draw
/// mates the pull is a mate.
pub fn pull_consequences(game: &DukeGame, side: Side, dest: Coord) -> Result<Consequence, GameError> {
    let bag = game.position().player(side).bag().contents();
    if bag.is_empty() {
        return Err(GameError::EmptyBag);
    }

    let mut seen: Vec<(TroopKind, Consequence)> = Vec::new();
    let mut outcomes = Vec::with_capacity(bag.len());
    for &kind in bag {
        let outcome = match seen.iter().find(|(drawn, _)| *drawn == kind) {
            Some(&(_, outcome)) => outcome,
            None => {
                let pull = Choice::Pull {
                    dest,
                    kind: Some(kind),
                };
                let outcome = simulate(game, side, &pull)?;
                seen.push((kind, outcome));
                outcome
            }
        };
        outcomes.push(outcome);
    }

    let quiet: Vec<i64> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Consequence::Delta(delta) => Some(*delta),
            Consequence::Checkmate => None,
        })
        .collect();
    if quiet.is_empty() {
        return Ok(Consequence::Checkmate);
    }
    let average = quiet.iter().sum::<i64>().div_euclid(quiet.len() as i64);

    let total: i64 = outcomes
        .iter()
        .map(|outcome| match outcome {
            Consequence::Delta(delta) => *delta,
            Consequence::Checkmate => average * 2,
        })
        .sum();
    Ok(Consequence::Delta(total.div_euclid(outcomes.len() as i64)))
}

fn simulate(game: &DukeGame, side: Side, choice: &Choice) -> Result<Consequence, GameError> {
    let position = game.position();
    let threatened_before = game.choices(side).attacks();
    let threats_before: BTreeSet<Coord> = side
        .opponents()
        .flat_map(|opponent| game.choices(opponent).attacks())
        .collect();

    let mut probe = position.snapshot();
    probe.apply_choice(side, choice, true)?;

    let mut score = 0i64;
    if let Choice::Pull { kind: Some(kind), .. } = *choice {
        score += i64::from(position.rules().weight(kind, Facing::Front));
    }

    let threatened_after = probe.calculate_choices(side, true).attacks();
    let reach = probe.attacks(side);
    let mut threats_after = BTreeSet::new();

    for opponent in side.opponents() {
        let choices = probe.calculate_choices(opponent, true);
        let in_check = probe
            .leader_coords(opponent)
            .map_or(true, |leader| reach.contains(&leader));
        if in_check {
            if choices.has_no_valid_choices() {
                trace!(%choice, "candidate mates");
                return Ok(Consequence::Checkmate);
            }
            score += CHECK_BONUS;
        }
        score += threat_shift(&probe, opponent, &threatened_before, &threatened_after);
        threats_after.extend(choices.attacks());
    }

    // Own troops gain when they fall out of reach, lose when they come into it.
    score -= threat_shift(&probe, side, &threats_before, &threats_after);
    Ok(Consequence::Delta(score))
}

/// +1 per troop of `owner` that became threatened, -1 per troop that stopped
/// being threatened, scaled by [`THREAT_DELTA`].
fn threat_shift(
    position: &Position,
    owner: Side,
    before: &BTreeSet<Coord>,
    after: &BTreeSet<Coord>,
) -> i64 {
    position
        .player(owner)
        .in_play()
        .iter()
        .filter_map(|&id| position.troop(id).coords)
        .map(|cell| match (before.contains(&cell), after.contains(&cell)) {
            (false, true) => THREAT_DELTA,
            (true, false) => -THREAT_DELTA,
            _ => 0,
        })
        .sum()
}
