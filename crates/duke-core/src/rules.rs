use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{OWN_FILE, OWN_RANK, STANDARD_RULES_JSON};
use crate::types::{Coord, Facing, Side, TroopKind};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("invalid rule data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not read rule data: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown troop kind '{0}'")]
    UnknownTroop(String),
    #[error("file '{0}' is outside a..e")]
    InvalidFile(char),
    #[error("no movement profile for {0}")]
    MissingProfile(TroopKind),
    #[error("starting troops must begin with exactly one {0}")]
    BadLeader(TroopKind),
    #[error("starting troops use more {0} than the roster holds")]
    RosterExceeded(TroopKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Move,
    Jump,
    Slide,
    JumpSlide,
    Strike,
    Command,
}

impl Action {
    pub const fn is_motion(self) -> bool {
        matches!(self, Self::Move | Self::Jump | Self::Slide | Self::JumpSlide)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovementRule {
    pub dx: i8,
    pub dy: i8,
    pub action: Action,
}

impl MovementRule {
    /// Converts table notation (file `c`, rank 3 is the troop's own cell).
    pub fn from_notation(file: char, rank: i8, action: Action) -> Result<Self, RulesError> {
        if !('a'..='e').contains(&file) {
            return Err(RulesError::InvalidFile(file));
        }
        let dx = file as u8 as i8 - OWN_FILE as u8 as i8;
        Ok(Self {
            dx,
            dy: rank - OWN_RANK,
            action,
        })
    }

    pub const fn offset_for(self, side: Side) -> (i8, i8) {
        match side {
            Side::One => (self.dx, self.dy),
            Side::Two => (-self.dx, -self.dy),
        }
    }

    pub fn target(self, origin: Coord, side: Side) -> Option<Coord> {
        let (dx, dy) = self.offset_for(side);
        origin.offset(dx, dy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroopProfile {
    pub count: u8,
    weights: [u32; 2],
    movements: [Vec<MovementRule>; 2],
}

impl TroopProfile {
    pub fn movements(&self, facing: Facing) -> &[MovementRule] {
        &self.movements[facing.index()]
    }

    pub const fn weight(&self, facing: Facing) -> u32 {
        self.weights[facing.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    leader: TroopKind,
    starting: Vec<TroopKind>,
    profiles: HashMap<TroopKind, TroopProfile>,
}

static STANDARD: LazyLock<Arc<RuleSet>> = LazyLock::new(|| {
    Arc::new(RuleSet::from_json(STANDARD_RULES_JSON).expect("embedded rule data must be valid"))
});

impl RuleSet {
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let raw: RawRuleSet = serde_json::from_str(json)?;

        let leader = parse_kind(&raw.leader)?;
        let starting = raw
            .starting
            .iter()
            .map(|name| parse_kind(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut profiles = HashMap::with_capacity(raw.troops.len());
        for (name, troop) in raw.troops {
            let kind = parse_kind(&name)?;
            let front = convert_rules(&troop.front)?;
            let back = convert_rules(&troop.back)?;
            profiles.insert(
                kind,
                TroopProfile {
                    count: troop.count,
                    weights: troop.weights,
                    movements: [front, back],
                },
            );
        }

        let rules = Self {
            leader,
            starting,
            profiles,
        };
        rules.validate()?;
        Ok(rules)
    }

    fn validate(&self) -> Result<(), RulesError> {
        let leaders = self.starting.iter().filter(|k| **k == self.leader).count();
        if leaders != 1 || self.starting.first() != Some(&self.leader) {
            return Err(RulesError::BadLeader(self.leader));
        }
        let leader_profile = self
            .profiles
            .get(&self.leader)
            .ok_or(RulesError::MissingProfile(self.leader))?;
        if leader_profile.count != 1 {
            return Err(RulesError::BadLeader(self.leader));
        }
        for kind in &self.starting {
            let profile = self
                .profiles
                .get(kind)
                .ok_or(RulesError::MissingProfile(*kind))?;
            let used = self.starting.iter().filter(|k| *k == kind).count();
            if used > usize::from(profile.count) {
                return Err(RulesError::RosterExceeded(*kind));
            }
        }
        Ok(())
    }

    pub const fn leader(&self) -> TroopKind {
        self.leader
    }

    pub fn starting_troops(&self) -> &[TroopKind] {
        &self.starting
    }

    pub fn profile(&self, kind: TroopKind) -> Option<&TroopProfile> {
        self.profiles.get(&kind)
    }

    pub fn movements(&self, kind: TroopKind, facing: Facing) -> &[MovementRule] {
        self.profiles
            .get(&kind)
            .map(|profile| profile.movements(facing))
            .unwrap_or(&[])
    }

    pub fn weight(&self, kind: TroopKind, facing: Facing) -> u32 {
        self.profiles
            .get(&kind)
            .map_or(0, |profile| profile.weight(facing))
    }

    pub fn bag_contents(&self) -> Vec<TroopKind> {
        let mut bag = Vec::new();
        for kind in TroopKind::ALL {
            let Some(profile) = self.profiles.get(&kind) else {
                continue;
            };
            let used = self.starting.iter().filter(|k| **k == kind).count();
            let remaining = usize::from(profile.count).saturating_sub(used);
            bag.extend(std::iter::repeat(kind).take(remaining));
        }
        bag
    }
}

#[derive(Debug, Deserialize)]
struct RawRuleSet {
    leader: String,
    starting: Vec<String>,
    troops: BTreeMap<String, RawTroop>,
}

#[derive(Debug, Deserialize)]
struct RawTroop {
    count: u8,
    weights: [u32; 2],
    #[serde(default)]
    front: Vec<RawRule>,
    #[serde(default)]
    back: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    file: char,
    rank: i8,
    action: Action,
}

fn parse_kind(name: &str) -> Result<TroopKind, RulesError> {
    TroopKind::from_name(name).ok_or_else(|| RulesError::UnknownTroop(name.to_string()))
}

fn convert_rules(raw: &[RawRule]) -> Result<Vec<MovementRule>, RulesError> {
    raw.iter()
        .map(|rule| MovementRule::from_notation(rule.file, rule.rank, rule.action))
        .collect()
}
