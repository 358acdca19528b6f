use std::sync::Arc;

use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::bag::Bag;
use crate::board::Board;
use crate::player::Player;
use crate::rules::RuleSet;
use crate::troop::{Troop, TroopId};
use crate::types::{Choice, Coord, Facing, Side, TroopKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("no choice to undo")]
    EmptyHistory,
    #[error("undo requested for {requested} but the last choice belongs to {recorded}")]
    UndoOutOfOrder { requested: Side, recorded: Side },
    #[error("bag is empty")]
    EmptyBag,
    #[error("no {0} left in the bag")]
    NotInBag(TroopKind),
    #[error("no troop at {0}")]
    NoTroopAt(Coord),
    #[error("troop at {0} belongs to the other side")]
    NotYourTroop(Coord),
    #[error("{0} is occupied by a friendly troop")]
    OccupiedDestination(Coord),
    #[error("no enemy troop at {0}")]
    NoEnemyAt(Coord),
    #[error("pull to {0} has no drawn troop")]
    UndrawnPull(Coord),
    #[error("{0} is not a legal choice")]
    IllegalChoice(Choice),
    #[error("it is not {0}'s turn")]
    WrongTurn(Side),
    #[error("the game is already over")]
    GameOver,
    #[error("a drawn troop must be placed before any other choice")]
    PendingDraw,
    #[error("invalid setup: {0}")]
    InvalidSetup(String),
    #[error("no legal choices available")]
    NoLegalChoices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRecord {
    pub troop: TroopId,
    pub coord: Coord,
    pub in_play_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub choice: Choice,
    pub side: Side,
    pub considering: bool,
    pub captured: Option<CaptureRecord>,
    pub placed: Option<TroopId>,
    pub non_meaningful_moves: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StartingLayout {
    pub leader: Coord,
    pub auxiliaries: Vec<Coord>,
}

impl StartingLayout {
    pub fn standard(side: Side) -> Self {
        match side {
            Side::One => Self {
                leader: Coord::new_unchecked(2, 0),
                auxiliaries: vec![Coord::new_unchecked(2, 1), Coord::new_unchecked(3, 0)],
            },
            Side::Two => Self {
                leader: Coord::new_unchecked(3, 5),
                auxiliaries: vec![Coord::new_unchecked(2, 5), Coord::new_unchecked(4, 5)],
            },
        }
    }

    pub fn random<R: Rng>(side: Side, auxiliaries: usize, rng: &mut R) -> Self {
        let rank = side.home_rank();
        let leader = Coord::new_unchecked(rng.gen_range(2..=3), rank);
        let mut cells = Self::candidate_cells(side, leader);
        cells.shuffle(rng);
        cells.truncate(auxiliaries);
        Self {
            leader,
            auxiliaries: cells.into_iter().collect(),
        }
    }

    fn candidate_cells(side: Side, leader: Coord) -> ArrayVec<Coord, 3> {
        [(-1, 0), (0, side.forward()), (1, 0)]
            .into_iter()
            .filter_map(|(dx, dy)| leader.offset(dx, dy))
            .collect()
    }

    pub fn validate(&self, side: Side, rules: &RuleSet) -> Result<(), GameError> {
        if self.leader.y != side.home_rank() || !(2..=3).contains(&self.leader.x) {
            return Err(GameError::InvalidSetup(format!(
                "{side} leader must start on file C or D of rank {}",
                side.home_rank() + 1
            )));
        }
        let expected = rules.starting_troops().len().saturating_sub(1);
        if self.auxiliaries.len() != expected {
            return Err(GameError::InvalidSetup(format!(
                "{side} needs {expected} starting troops beside the leader"
            )));
        }
        let allowed = Self::candidate_cells(side, self.leader);
        for (idx, cell) in self.auxiliaries.iter().enumerate() {
            if !allowed.contains(cell) || self.auxiliaries[..idx].contains(cell) {
                return Err(GameError::InvalidSetup(format!(
                    "{side} cannot start a troop on {cell}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    rules: Arc<RuleSet>,
    pub(crate) board: Board,
    pub(crate) troops: Vec<Troop>,
    pub(crate) players: [Player; 2],
    pub(crate) non_meaningful_moves: u16,
    pub(crate) history: Vec<HistoryEntry>,
}

impl Position {
    pub fn new(rules: Arc<RuleSet>, layouts: &[StartingLayout; 2]) -> Result<Self, GameError> {
        let mut builder = PositionBuilder::new(Arc::clone(&rules));
        for side in Side::BOTH {
            let layout = &layouts[side.index()];
            layout.validate(side, &rules)?;
            let mut cells = std::iter::once(layout.leader).chain(layout.auxiliaries.iter().copied());
            for &kind in rules.starting_troops() {
                if let Some(cell) = cells.next() {
                    builder = builder.place(side, kind, cell);
                }
            }
        }
        builder.build()
    }

    pub fn standard() -> Self {
        let layouts = [
            StartingLayout::standard(Side::One),
            StartingLayout::standard(Side::Two),
        ];
        Self::new(RuleSet::standard(), &layouts).expect("standard layout must be valid")
    }

    pub fn builder(rules: Arc<RuleSet>) -> PositionBuilder {
        PositionBuilder::new(rules)
    }

    pub fn snapshot(&self) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
            board: self.board,
            troops: self.troops.clone(),
            players: self.players.clone(),
            non_meaningful_moves: self.non_meaningful_moves,
            history: Vec::new(),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub fn troops(&self) -> &[Troop] {
        &self.troops
    }

    pub fn troop(&self, id: TroopId) -> &Troop {
        &self.troops[id.index()]
    }

    pub fn troop_at(&self, coord: Coord) -> Option<&Troop> {
        self.board.get(coord).map(|id| self.troop(id))
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub(crate) fn player_mut(&mut self, side: Side) -> &mut Player {
        &mut self.players[side.index()]
    }

    pub fn leader_coords(&self, side: Side) -> Option<Coord> {
        let leader = self.troop(self.player(side).leader);
        if leader.captured {
            None
        } else {
            leader.coords
        }
    }

    pub const fn non_meaningful_moves(&self) -> u16 {
        self.non_meaningful_moves
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_enemy_at(&self, side: Side, coord: Coord) -> bool {
        self.troop_at(coord).is_some_and(|troop| troop.owner != side)
    }

    pub fn is_open_or_enemy(&self, side: Side, coord: Coord) -> bool {
        self.troop_at(coord).map_or(true, |troop| troop.owner != side)
    }

    pub fn draw_from_bag<R: Rng>(
        &mut self,
        side: Side,
        rng: &mut R,
    ) -> Result<TroopKind, GameError> {
        self.player_mut(side).bag.pull(rng)
    }

    /// Executes `choice` for `side`. With `considering` set the draw counter
    /// is left alone and an unresolved pull places a blocker of unknown kind.
    pub fn apply_choice(
        &mut self,
        side: Side,
        choice: &Choice,
        considering: bool,
    ) -> Result<(), GameError> {
        let mut entry = HistoryEntry {
            choice: *choice,
            side,
            considering,
            captured: None,
            placed: None,
            non_meaningful_moves: self.non_meaningful_moves,
        };

        match *choice {
            Choice::Pull { dest, kind } => {
                let kind = match kind {
                    Some(kind) => kind,
                    None if considering => TroopKind::Undrawn,
                    None => return Err(GameError::UndrawnPull(dest)),
                };
                if !self.board.is_empty_at(dest) {
                    return Err(GameError::OccupiedDestination(dest));
                }
                entry.placed = Some(self.place_new(side, kind, dest)?);
                if !considering {
                    self.non_meaningful_moves = 0;
                }
            }
            Choice::Move { src, dst } => {
                let mover = self.own_troop_at(side, src)?;
                self.check_destination(side, dst)?;
                entry.captured = self.capture_at(side, dst);
                self.count_progress(considering, entry.captured.is_some());
                self.relocate(mover, src, dst);
                self.troops[mover.index()].flip();
            }
            Choice::Command {
                commander,
                teammate,
                dst,
            } => {
                self.own_troop_at(side, commander)?;
                let commanded = self.own_troop_at(side, teammate)?;
                self.check_destination(side, dst)?;
                entry.captured = self.capture_at(side, dst);
                self.count_progress(considering, entry.captured.is_some());
                self.relocate(commanded, teammate, dst);
                self.troops[commanded.index()].flip();
            }
            Choice::Strike { src, target } => {
                let striker = self.own_troop_at(side, src)?;
                if !self.is_enemy_at(side, target) {
                    return Err(GameError::NoEnemyAt(target));
                }
                entry.captured = self.capture_at(side, target);
                self.count_progress(considering, true);
                self.troops[striker.index()].flip();
            }
        }

        self.history.push(entry);
        Ok(())
    }

    pub fn undo_choice(&mut self, side: Side) -> Result<HistoryEntry, GameError> {
        let recorded = self
            .history
            .last()
            .map(|entry| entry.side)
            .ok_or(GameError::EmptyHistory)?;
        if recorded != side {
            return Err(GameError::UndoOutOfOrder {
                requested: side,
                recorded,
            });
        }
        let Some(entry) = self.history.pop() else {
            return Err(GameError::EmptyHistory);
        };

        match entry.choice {
            Choice::Pull { dest, .. } => {
                self.board.set(dest, None);
                if let Some(placed) = entry.placed {
                    self.player_mut(side).in_play.retain(|id| *id != placed);
                    if self.troops.last().is_some_and(|troop| troop.id == placed) {
                        self.troops.pop();
                    }
                }
            }
            Choice::Move { src, dst } => {
                if let Some(mover) = self.board.get(dst) {
                    self.troops[mover.index()].flip();
                    self.relocate(mover, dst, src);
                }
            }
            Choice::Command { teammate, dst, .. } => {
                if let Some(commanded) = self.board.get(dst) {
                    self.troops[commanded.index()].flip();
                    self.relocate(commanded, dst, teammate);
                }
            }
            Choice::Strike { src, .. } => {
                if let Some(striker) = self.board.get(src) {
                    self.troops[striker.index()].flip();
                }
            }
        }

        if let Some(capture) = entry.captured {
            self.restore_capture(side, capture);
        }
        self.non_meaningful_moves = entry.non_meaningful_moves;
        Ok(entry)
    }

    fn own_troop_at(&self, side: Side, coord: Coord) -> Result<TroopId, GameError> {
        let id = self.board.get(coord).ok_or(GameError::NoTroopAt(coord))?;
        if self.troop(id).owner != side {
            return Err(GameError::NotYourTroop(coord));
        }
        Ok(id)
    }

    fn check_destination(&self, side: Side, dst: Coord) -> Result<(), GameError> {
        if self.is_open_or_enemy(side, dst) {
            Ok(())
        } else {
            Err(GameError::OccupiedDestination(dst))
        }
    }

    fn count_progress(&mut self, considering: bool, captured: bool) {
        if considering {
            return;
        }
        if captured {
            self.non_meaningful_moves = 0;
        } else {
            self.non_meaningful_moves = self.non_meaningful_moves.saturating_add(1);
        }
    }

    fn place_new(&mut self, side: Side, kind: TroopKind, dest: Coord) -> Result<TroopId, GameError> {
        let id = u16::try_from(self.troops.len())
            .map(TroopId)
            .map_err(|_| GameError::InvalidSetup("too many troops".to_string()))?;
        self.troops.push(Troop::placed(id, kind, side, dest));
        self.player_mut(side).in_play.push(id);
        self.board.set(dest, Some(id));
        Ok(id)
    }

    fn relocate(&mut self, troop: TroopId, from: Coord, to: Coord) {
        self.board.set(from, None);
        self.board.set(to, Some(troop));
        self.troops[troop.index()].coords = Some(to);
    }

    fn capture_at(&mut self, side: Side, coord: Coord) -> Option<CaptureRecord> {
        let id = self.board.get(coord)?;
        let victim = self.troops[id.index()].owner;
        if victim == side {
            return None;
        }
        let in_play = &mut self.players[victim.index()].in_play;
        let in_play_index = in_play.iter().position(|other| *other == id)?;
        in_play.remove(in_play_index);

        let troop = &mut self.troops[id.index()];
        troop.captured = true;
        troop.coords = None;
        self.board.set(coord, None);
        self.player_mut(side).captured.push(id);

        Some(CaptureRecord {
            troop: id,
            coord,
            in_play_index,
        })
    }

    fn restore_capture(&mut self, side: Side, capture: CaptureRecord) {
        let captured = &mut self.player_mut(side).captured;
        if let Some(idx) = captured.iter().rposition(|id| *id == capture.troop) {
            captured.remove(idx);
        }

        let troop = &mut self.troops[capture.troop.index()];
        troop.captured = false;
        troop.coords = Some(capture.coord);
        let victim = troop.owner;

        let in_play = &mut self.players[victim.index()].in_play;
        let idx = capture.in_play_index.min(in_play.len());
        in_play.insert(idx, capture.troop);
        self.board.set(capture.coord, Some(capture.troop));
    }
}

#[derive(Debug, Clone)]
pub struct PositionBuilder {
    rules: Arc<RuleSet>,
    placements: Vec<(Side, TroopKind, Coord, Facing)>,
    bags: [Option<Vec<TroopKind>>; 2],
    non_meaningful_moves: u16,
}

impl PositionBuilder {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            placements: Vec::new(),
            bags: [None, None],
            non_meaningful_moves: 0,
        }
    }

    pub fn place(self, side: Side, kind: TroopKind, coord: Coord) -> Self {
        self.place_facing(side, kind, coord, Facing::Front)
    }

    pub fn place_facing(mut self, side: Side, kind: TroopKind, coord: Coord, facing: Facing) -> Self {
        self.placements.push((side, kind, coord, facing));
        self
    }

    pub fn bag(mut self, side: Side, troops: Vec<TroopKind>) -> Self {
        self.bags[side.index()] = Some(troops);
        self
    }

    pub fn empty_bags(self) -> Self {
        self.bag(Side::One, Vec::new()).bag(Side::Two, Vec::new())
    }

    pub fn non_meaningful_moves(mut self, count: u16) -> Self {
        self.non_meaningful_moves = count;
        self
    }

    pub fn build(self) -> Result<Position, GameError> {
        let leader_kind = self.rules.leader();
        let mut board = Board::empty();
        let mut troops: Vec<Troop> = Vec::with_capacity(self.placements.len());
        let mut leaders: [Option<TroopId>; 2] = [None, None];

        // Leaders first so they own the lowest ids.
        let mut ordered = self.placements.clone();
        ordered.sort_by_key(|(_, kind, _, _)| *kind != leader_kind);

        for (side, kind, coord, facing) in ordered {
            if kind == TroopKind::Undrawn {
                return Err(GameError::InvalidSetup(format!("{coord} has no troop kind")));
            }
            if !board.is_empty_at(coord) {
                return Err(GameError::InvalidSetup(format!("{coord} is used twice")));
            }
            if kind == leader_kind {
                if leaders[side.index()].is_some() {
                    return Err(GameError::InvalidSetup(format!("{side} has two leaders")));
                }
                leaders[side.index()] = Some(TroopId(troops.len() as u16));
            }
            let id = TroopId(troops.len() as u16);
            let mut troop = Troop::placed(id, kind, side, coord);
            troop.facing = facing;
            troops.push(troop);
            board.set(coord, Some(id));
        }

        let mut players = Vec::with_capacity(2);
        for side in Side::BOTH {
            let leader = leaders[side.index()]
                .ok_or_else(|| GameError::InvalidSetup(format!("{side} has no leader")))?;
            let bag = match &self.bags[side.index()] {
                Some(contents) => contents.clone(),
                None => self.default_bag(side),
            };
            let mut player = Player::new(side, Bag::new(bag), leader);
            player.in_play = troops
                .iter()
                .filter(|troop| troop.owner == side)
                .map(|troop| troop.id)
                .collect();
            players.push(player);
        }
        let Ok(players) = <[Player; 2]>::try_from(players) else {
            return Err(GameError::InvalidSetup("expected two players".to_string()));
        };

        Ok(Position {
            rules: self.rules,
            board,
            troops,
            players,
            non_meaningful_moves: self.non_meaningful_moves,
            history: Vec::new(),
        })
    }

    fn default_bag(&self, side: Side) -> Vec<TroopKind> {
        let mut bag = Vec::new();
        for kind in TroopKind::ALL {
            let Some(profile) = self.rules.profile(kind) else {
                continue;
            };
            if kind == self.rules.leader() {
                continue;
            }
            let placed = self
                .placements
                .iter()
                .filter(|(owner, placed, _, _)| *owner == side && *placed == kind)
                .count();
            let remaining = usize::from(profile.count).saturating_sub(placed);
            bag.extend(std::iter::repeat(kind).take(remaining));
        }
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: u8, y: u8) -> Coord {
        Coord::new_unchecked(x, y)
    }

    #[test]
    fn standard_position_matches_layouts() {
        let position = Position::standard();
        assert_eq!(position.leader_coords(Side::One), Some(c(2, 0)));
        assert_eq!(position.leader_coords(Side::Two), Some(c(3, 5)));
        assert_eq!(position.troop_at(c(2, 1)).map(|t| t.kind), Some(TroopKind::Footman));
        assert_eq!(position.troop_at(c(4, 5)).map(|t| t.owner), Some(Side::Two));
        for side in Side::BOTH {
            assert_eq!(position.player(side).in_play().len(), 3);
            assert_eq!(position.player(side).bag().len(), 16);
        }
        assert_eq!(position.troops().len(), 6);
    }

    #[test]
    fn layout_validation() {
        let rules = RuleSet::standard();
        assert!(StartingLayout::standard(Side::One).validate(Side::One, &rules).is_ok());
        assert!(StartingLayout::standard(Side::Two).validate(Side::Two, &rules).is_ok());

        let wrong_file = StartingLayout {
            leader: c(1, 0),
            auxiliaries: vec![c(0, 0), c(2, 0)],
        };
        assert!(wrong_file.validate(Side::One, &rules).is_err());

        let behind = StartingLayout {
            leader: c(3, 5),
            auxiliaries: vec![c(3, 4), c(3, 4)],
        };
        assert!(behind.validate(Side::Two, &rules).is_err());

        let wrong_rank = StartingLayout::standard(Side::One);
        assert!(wrong_rank.validate(Side::Two, &rules).is_err());
    }

    #[test]
    fn random_layouts_are_valid() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let rules = RuleSet::standard();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            for side in Side::BOTH {
                let layout = StartingLayout::random(side, 2, &mut rng);
                assert!(layout.validate(side, &rules).is_ok(), "{layout:?}");
            }
        }
    }

    #[test]
    fn snapshot_drops_history_only() {
        let mut position = Position::standard();
        position
            .apply_choice(Side::One, &Choice::Move { src: c(3, 0), dst: c(4, 0) }, false)
            .unwrap();
        let snapshot = position.snapshot();
        assert!(snapshot.history().is_empty());
        assert_eq!(snapshot.board(), position.board());
        assert_eq!(snapshot.troops(), position.troops());
        assert_eq!(snapshot.non_meaningful_moves(), 1);
    }

    #[test]
    fn builder_rejects_missing_leader_and_overlap() {
        let rules = RuleSet::standard();
        let missing = Position::builder(Arc::clone(&rules))
            .place(Side::One, TroopKind::Duke, c(0, 0))
            .build();
        assert!(matches!(missing, Err(GameError::InvalidSetup(_))));

        let overlap = Position::builder(rules)
            .place(Side::One, TroopKind::Duke, c(0, 0))
            .place(Side::Two, TroopKind::Duke, c(0, 0))
            .build();
        assert!(matches!(overlap, Err(GameError::InvalidSetup(_))));
    }

    #[test]
    fn undo_requires_matching_history() {
        let mut position = Position::standard();
        assert_eq!(position.undo_choice(Side::One), Err(GameError::EmptyHistory));

        position
            .apply_choice(Side::One, &Choice::Move { src: c(3, 0), dst: c(4, 0) }, false)
            .unwrap();
        assert_eq!(
            position.undo_choice(Side::Two),
            Err(GameError::UndoOutOfOrder {
                requested: Side::Two,
                recorded: Side::One
            })
        );
        assert_eq!(position.history().len(), 1);
        assert!(position.undo_choice(Side::One).is_ok());
        assert_eq!(position, Position::standard());
    }
}
