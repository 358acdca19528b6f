use std::collections::{BTreeMap, BTreeSet};

use crate::types::{Choice, Coord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TroopActions {
    pub moves: BTreeSet<Coord>,
    pub strikes: BTreeSet<Coord>,
    pub commands: BTreeMap<Coord, BTreeSet<Coord>>,
}

impl TroopActions {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
            && self.strikes.is_empty()
            && self.commands.values().all(BTreeSet::is_empty)
    }

    pub fn attacks(&self) -> impl Iterator<Item = Coord> + '_ {
        self.moves
            .iter()
            .chain(self.strikes.iter())
            .chain(self.commands.values().flatten())
            .copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalChoices {
    pub pull: BTreeSet<Coord>,
    pub act: BTreeMap<Coord, TroopActions>,
}

impl LegalChoices {
    pub fn has_no_valid_choices(&self) -> bool {
        self.pull.is_empty() && self.act.values().all(TroopActions::is_empty)
    }

    pub fn attacks(&self) -> BTreeSet<Coord> {
        self.act.values().flat_map(TroopActions::attacks).collect()
    }

    pub fn contains(&self, choice: &Choice) -> bool {
        match *choice {
            Choice::Pull { dest, .. } => self.pull.contains(&dest),
            Choice::Move { src, dst } => self
                .act
                .get(&src)
                .is_some_and(|actions| actions.moves.contains(&dst)),
            Choice::Strike { src, target } => self
                .act
                .get(&src)
                .is_some_and(|actions| actions.strikes.contains(&target)),
            Choice::Command {
                commander,
                teammate,
                dst,
            } => self
                .act
                .get(&commander)
                .and_then(|actions| actions.commands.get(&teammate))
                .is_some_and(|dsts| dsts.contains(&dst)),
        }
    }

    pub fn to_choices(&self) -> Vec<Choice> {
        let mut choices = Vec::with_capacity(self.len());
        choices.extend(
            self.pull
                .iter()
                .map(|&dest| Choice::Pull { dest, kind: None }),
        );
        for (&src, actions) in &self.act {
            choices.extend(actions.moves.iter().map(|&dst| Choice::Move { src, dst }));
            choices.extend(
                actions
                    .strikes
                    .iter()
                    .map(|&target| Choice::Strike { src, target }),
            );
            for (&teammate, dsts) in &actions.commands {
                choices.extend(dsts.iter().map(|&dst| Choice::Command {
                    commander: src,
                    teammate,
                    dst,
                }));
            }
        }
        choices
    }

    pub fn len(&self) -> usize {
        self.pull.len()
            + self
                .act
                .values()
                .map(|actions| {
                    actions.moves.len()
                        + actions.strikes.len()
                        + actions.commands.values().map(BTreeSet::len).sum::<usize>()
                })
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.has_no_valid_choices()
    }
}
