use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use tracing::trace;

use crate::choices::{LegalChoices, TroopActions};
use crate::position::Position;
use crate::rules::Action;
use crate::troop::Troop;
use crate::types::{Choice, Coord, Side};

impl Position {
    /// Legal choices for `side`.
    ///
    /// With `consider_leader_safety` off the result is raw reach: no pulls
    /// and no check filtering. That mode is what the safety filter itself
    /// uses for the opponent, which keeps the recursion one level deep.
    pub fn calculate_choices(&self, side: Side, consider_leader_safety: bool) -> LegalChoices {
        let mut choices = LegalChoices::default();
        if consider_leader_safety {
            choices.pull = self.pull_locations(side);
        }

        for &id in &self.player(side).in_play {
            let troop = self.troop(id);
            let Some(origin) = troop.coords else {
                continue;
            };
            let actions = self.troop_actions(side, troop, origin, consider_leader_safety);
            choices.act.insert(origin, actions);
        }
        choices
    }

    pub fn attacks(&self, side: Side) -> BTreeSet<Coord> {
        self.calculate_choices(side, false).attacks()
    }

    /// True if making `choice` would leave `side`'s leader attacked. A choice
    /// that cannot be applied counts as endangering.
    pub fn would_endanger_leader(&self, side: Side, choice: &Choice) -> bool {
        let mut probe = self.snapshot();
        if probe.apply_choice(side, choice, true).is_err() {
            trace!(%choice, "speculative choice failed to apply");
            return true;
        }
        let Some(leader) = probe.leader_coords(side) else {
            return true;
        };
        side.opponents()
            .any(|opponent| probe.attacks(opponent).contains(&leader))
    }

    fn pull_locations(&self, side: Side) -> BTreeSet<Coord> {
        if self.player(side).bag.is_empty() {
            return BTreeSet::new();
        }
        let Some(leader) = self.leader_coords(side) else {
            return BTreeSet::new();
        };
        leader
            .orthogonal_neighbors()
            .into_iter()
            .filter(|&dest| self.board.is_empty_at(dest))
            .filter(|&dest| !self.would_endanger_leader(side, &Choice::Pull { dest, kind: None }))
            .collect()
    }

    fn troop_actions(
        &self,
        side: Side,
        troop: &Troop,
        origin: Coord,
        consider_leader_safety: bool,
    ) -> TroopActions {
        let mut actions = TroopActions::default();
        let mut teammates: ArrayVec<Coord, 24> = ArrayVec::new();
        let mut command_targets: ArrayVec<Coord, 24> = ArrayVec::new();
        let safe = |choice: Choice| !consider_leader_safety || !self.would_endanger_leader(side, &choice);

        for rule in self.rules().movements(troop.kind, troop.facing) {
            let (dx, dy) = rule.offset_for(side);
            let Some(target) = origin.offset(dx, dy) else {
                continue;
            };

            match rule.action {
                Action::Move => {
                    if self.is_open_or_enemy(side, target)
                        && self.path_is_open(origin, dx, dy)
                        && safe(Choice::Move { src: origin, dst: target })
                    {
                        actions.moves.insert(target);
                    }
                }
                Action::Jump => {
                    if self.is_open_or_enemy(side, target)
                        && safe(Choice::Move { src: origin, dst: target })
                    {
                        actions.moves.insert(target);
                    }
                }
                Action::Slide | Action::JumpSlide => {
                    let step = (dx.signum(), dy.signum());
                    let mut cursor = Some(target);
                    while let Some(cell) = cursor {
                        if !self.board.is_empty_at(cell) {
                            break;
                        }
                        if safe(Choice::Move { src: origin, dst: cell }) {
                            actions.moves.insert(cell);
                        }
                        cursor = cell.offset(step.0, step.1);
                    }
                    if let Some(cell) = cursor {
                        if self.is_enemy_at(side, cell)
                            && safe(Choice::Move { src: origin, dst: cell })
                        {
                            actions.moves.insert(cell);
                        }
                    }
                }
                Action::Strike => {
                    if self.is_enemy_at(side, target)
                        && safe(Choice::Strike { src: origin, target })
                    {
                        actions.strikes.insert(target);
                    }
                }
                Action::Command => {
                    if self.is_open_or_enemy(side, target) {
                        let _ = command_targets.try_push(target);
                    } else {
                        let _ = teammates.try_push(target);
                    }
                }
            }
        }

        for &teammate in &teammates {
            let destinations = command_targets
                .iter()
                .copied()
                .filter(|&dst| {
                    safe(Choice::Command {
                        commander: origin,
                        teammate,
                        dst,
                    })
                })
                .collect();
            actions.commands.insert(teammate, destinations);
        }

        // A capture is offered once, as a move.
        let moves = &actions.moves;
        actions.strikes.retain(|target| !moves.contains(target));
        actions
    }

    fn path_is_open(&self, origin: Coord, dx: i8, dy: i8) -> bool {
        let Some(dst) = origin.offset(dx, dy) else {
            return false;
        };
        let steps = dx.abs().max(dy.abs());
        let (sx, sy) = (dx.signum(), dy.signum());
        (1..steps).all(|step| {
            dst.offset(-step * sx, -step * sy)
                .map_or(true, |cell| self.board.is_empty_at(cell))
        })
    }
}
