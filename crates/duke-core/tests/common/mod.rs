#![allow(dead_code)]

use std::sync::Arc;

use duke_core::{Choice, Coord, Position, RuleSet, Side};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub fn c(x: u8, y: u8) -> Coord {
    Coord::new_unchecked(x, y)
}

const DUKE: &str = r#""Duke": {
    "count": 1,
    "weights": [0, 0],
    "front": [{ "file": "b", "rank": 3, "action": "SLIDE" }, { "file": "d", "rank": 3, "action": "SLIDE" }],
    "back": [{ "file": "c", "rank": 4, "action": "SLIDE" }, { "file": "c", "rank": 2, "action": "SLIDE" }]
}"#;

/// Rule set with the standard Duke plus the given troop entries.
pub fn rules_with(troops: &str) -> Arc<RuleSet> {
    rules_with_duke(DUKE, troops)
}

pub fn rules_with_duke(duke: &str, troops: &str) -> Arc<RuleSet> {
    let json = format!(
        r#"{{"leader": "Duke", "starting": ["Duke"], "troops": {{ {duke}, {troops} }}}}"#
    );
    Arc::new(RuleSet::from_json(&json).unwrap())
}

/// Fills in a drawable kind for pulls so the choice can be applied.
pub fn resolve_pull(position: &Position, side: Side, choice: Choice) -> Choice {
    match choice {
        Choice::Pull { dest, kind: None } => Choice::Pull {
            dest,
            kind: position.player(side).bag().contents().first().copied(),
        },
        other => other,
    }
}

/// Picks a random legal choice for `side`, or `None` if it has none.
pub fn random_choice(position: &Position, side: Side, rng: &mut StdRng) -> Option<Choice> {
    let choices = position.calculate_choices(side, true).to_choices();
    choices.choose(rng).copied()
}
