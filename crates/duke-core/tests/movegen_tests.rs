mod common;

use std::collections::BTreeSet;

use common::{c, random_choice, resolve_pull, rules_with};
use duke_core::{Choice, Coord, Facing, Position, RuleSet, Side, TroopKind};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn set(cells: &[(u8, u8)]) -> BTreeSet<Coord> {
    cells.iter().map(|&(x, y)| c(x, y)).collect()
}

#[test]
fn slide_runs_until_blocked_and_takes_the_enemy() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(0, 2))
        .place(Side::Two, TroopKind::Duke, c(5, 5))
        .place(Side::Two, TroopKind::Footman, c(3, 2))
        .build()
        .unwrap();

    let raw = position.calculate_choices(Side::One, false);
    assert_eq!(raw.act[&c(0, 2)].moves, set(&[(1, 2), (2, 2), (3, 2)]));

    // The enemy footman covers (2, 2); taking it is still fine.
    let safe = position.calculate_choices(Side::One, true);
    assert_eq!(safe.act[&c(0, 2)].moves, set(&[(1, 2), (3, 2)]));
}

#[test]
fn slide_stops_before_a_friendly_troop() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(0, 0))
        .place(Side::One, TroopKind::Footman, c(3, 0))
        .place(Side::Two, TroopKind::Duke, c(5, 5))
        .build()
        .unwrap();

    let choices = position.calculate_choices(Side::One, false);
    assert_eq!(choices.act[&c(0, 0)].moves, set(&[(1, 0), (2, 0)]));
}

#[test]
fn jump_ignores_troops_in_between() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(5, 0))
        .place(Side::Two, TroopKind::Duke, c(0, 5))
        .place(Side::One, TroopKind::Champion, c(4, 2))
        .place(Side::One, TroopKind::Marshall, c(4, 3))
        .build()
        .unwrap();
    let champion = &position.calculate_choices(Side::One, false).act[&c(4, 2)].moves;

    assert!(!champion.contains(&c(4, 3)));
    assert!(champion.contains(&c(4, 4)));
    assert!(champion.contains(&c(2, 2)));
    assert!(champion.contains(&c(4, 0)));
    assert!(champion.contains(&c(5, 2)));
}

#[test]
fn pikeman_long_moves_check_the_cell_in_between() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(5, 0))
        .place(Side::Two, TroopKind::Duke, c(0, 5))
        .place(Side::One, TroopKind::Pikeman, c(2, 1))
        .place(Side::One, TroopKind::Footman, c(1, 2))
        .build()
        .unwrap();
    let choices = position.calculate_choices(Side::One, false);
    assert_eq!(choices.act[&c(2, 1)].moves, set(&[(3, 2), (4, 3)]));
}

#[test]
fn second_side_offsets_are_mirrored() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(0, 0))
        .place(Side::Two, TroopKind::Duke, c(5, 5))
        .place(Side::Two, TroopKind::Pikeman, c(2, 4))
        .build()
        .unwrap();
    let choices = position.calculate_choices(Side::Two, false);
    assert_eq!(
        choices.act[&c(2, 4)].moves,
        set(&[(3, 3), (1, 3), (4, 2), (0, 2)])
    );
}

#[test]
fn standard_start_offers_one_pull_each() {
    let position = Position::standard();
    assert_eq!(position.calculate_choices(Side::One, true).pull, set(&[(1, 0)]));
    assert_eq!(position.calculate_choices(Side::Two, true).pull, set(&[(3, 4)]));
    assert!(position.calculate_choices(Side::One, false).pull.is_empty());
}

#[test]
fn empty_bag_offers_no_pulls() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(2, 0))
        .place(Side::Two, TroopKind::Duke, c(3, 5))
        .empty_bags()
        .build()
        .unwrap();
    assert!(position.calculate_choices(Side::One, true).pull.is_empty());
    assert!(position.calculate_choices(Side::Two, true).pull.is_empty());
}

#[test]
fn pinned_troop_may_only_stay_in_the_line() {
    let position = Position::builder(RuleSet::standard())
        .place(Side::One, TroopKind::Duke, c(0, 0))
        .place(Side::One, TroopKind::Footman, c(1, 0))
        .place(Side::Two, TroopKind::Duke, c(5, 0))
        .build()
        .unwrap();

    let raw = position.calculate_choices(Side::One, false);
    assert_eq!(raw.act[&c(1, 0)].moves, set(&[(1, 1), (2, 0)]));
    let safe = position.calculate_choices(Side::One, true);
    assert_eq!(safe.act[&c(1, 0)].moves, set(&[(2, 0)]));
    assert!(position.would_endanger_leader(
        Side::One,
        &Choice::Move {
            src: c(1, 0),
            dst: c(1, 1)
        }
    ));
}

#[test]
fn capture_is_offered_as_a_move_not_a_strike() {
    let rules = rules_with(
        r#""Footman": {
            "count": 3,
            "weights": [20, 25],
            "front": [{ "file": "c", "rank": 4, "action": "MOVE" }, { "file": "c", "rank": 4, "action": "STRIKE" }, { "file": "b", "rank": 4, "action": "STRIKE" }],
            "back": [{ "file": "c", "rank": 2, "action": "MOVE" }]
        }"#,
    );
    let position = Position::builder(rules)
        .place(Side::One, TroopKind::Duke, c(5, 0))
        .place(Side::Two, TroopKind::Duke, c(5, 5))
        .place(Side::One, TroopKind::Footman, c(2, 2))
        .place(Side::Two, TroopKind::Footman, c(2, 3))
        .place(Side::Two, TroopKind::Footman, c(1, 3))
        .build()
        .unwrap();

    let actions = &position.calculate_choices(Side::One, true).act[&c(2, 2)];
    assert_eq!(actions.moves, set(&[(2, 3)]));
    assert_eq!(actions.strikes, set(&[(1, 3)]));
}

#[test]
fn command_destinations_count_as_attacks() {
    let rules = rules_with(
        r#""Footman": {
            "count": 3,
            "weights": [20, 25],
            "front": [{ "file": "c", "rank": 2, "action": "MOVE" }],
            "back": [{ "file": "c", "rank": 2, "action": "MOVE" }]
        },
        "Marshall": {
            "count": 1,
            "weights": [70, 80],
            "front": [{ "file": "b", "rank": 3, "action": "COMMAND" }, { "file": "d", "rank": 4, "action": "COMMAND" }],
            "back": [{ "file": "c", "rank": 4, "action": "MOVE" }]
        }"#,
    );
    let position = Position::builder(rules)
        .place(Side::One, TroopKind::Duke, c(5, 0))
        .place(Side::Two, TroopKind::Duke, c(0, 5))
        .place(Side::One, TroopKind::Marshall, c(2, 2))
        .place(Side::One, TroopKind::Footman, c(1, 2))
        .place_facing(Side::Two, TroopKind::Footman, c(3, 3), Facing::Back)
        .build()
        .unwrap();

    let choices = position.calculate_choices(Side::One, true);
    let marshall = &choices.act[&c(2, 2)];
    assert_eq!(marshall.commands[&c(1, 2)], set(&[(3, 3)]));
    assert!(position.attacks(Side::One).contains(&c(3, 3)));
    assert!(choices.contains(&Choice::Command {
        commander: c(2, 2),
        teammate: c(1, 2),
        dst: c(3, 3)
    }));
}

#[test]
fn legal_choices_are_sound_and_closed_during_random_games() {
    for seed in 0..6 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut position = Position::standard();
        let mut side = Side::One;

        for _ in 0..40 {
            let safe = position.calculate_choices(side, true);
            let raw = position.calculate_choices(side, false);
            assert_eq!(safe, position.calculate_choices(side, true));

            for (src, actions) in &safe.act {
                let reach = &raw.act[src];
                assert!(actions.moves.is_subset(&reach.moves));
                assert!(actions.strikes.iter().all(|target| {
                    reach.strikes.contains(target) || reach.moves.contains(target)
                }));
            }

            for choice in safe.to_choices() {
                assert!(safe.contains(&choice));
                if let Choice::Pull { dest, .. } = choice {
                    let leader = position.leader_coords(side).unwrap();
                    assert!(leader.orthogonal_neighbors().contains(&dest));
                    assert!(position.board().is_empty_at(dest));
                }

                let choice = resolve_pull(&position, side, choice);
                let mut probe = position.clone();
                probe.apply_choice(side, &choice, true).unwrap();
                let leader = probe.leader_coords(side).unwrap();
                assert!(
                    !probe.attacks(side.opponent()).contains(&leader),
                    "seed {seed}: {choice} exposes the leader"
                );
            }

            let Some(choice) = random_choice(&position, side, &mut rng) else {
                break;
            };
            let choice = match choice {
                Choice::Pull { dest, .. } => Choice::Pull {
                    dest,
                    kind: Some(position.draw_from_bag(side, &mut rng).unwrap()),
                },
                other => other,
            };
            position.apply_choice(side, &choice, false).unwrap();
            side = side.opponent();
        }
    }
}
