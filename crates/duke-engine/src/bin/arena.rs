use std::sync::{Arc, Mutex};
use std::thread;

use duke_core::RuleSet;
use duke_engine::{play_game, AiConfig, Difficulty, GameRecord, GameResult, SelfPlayConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct ArenaArgs {
    games: u32,
    difficulties: [Difficulty; 2],
    threads: usize,
    seed: u64,
    json: bool,
}

fn parse_difficulty(s: &str) -> Difficulty {
    Difficulty::from_name(s).unwrap_or_else(|| {
        warn!("unknown difficulty '{s}', defaulting to normal");
        Difficulty::Normal
    })
}

fn parse_args() -> ArenaArgs {
    let mut positional = Vec::new();
    let mut seed = 0u64;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--seed" => {
                seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    warn!("--seed needs a number, using 0");
                    0
                });
            }
            _ => positional.push(arg),
        }
    }

    ArenaArgs {
        games: positional.first().and_then(|s| s.parse().ok()).unwrap_or(20),
        difficulties: [
            positional
                .get(1)
                .map(|s| parse_difficulty(s))
                .unwrap_or(Difficulty::Normal),
            positional
                .get(2)
                .map(|s| parse_difficulty(s))
                .unwrap_or(Difficulty::Normal),
        ],
        threads: positional
            .get(3)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(4)),
        seed,
        json,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let [one, two] = args.difficulties;
    info!(
        games = args.games,
        %one,
        %two,
        threads = args.threads,
        seed = args.seed,
        "starting arena"
    );

    let rules = RuleSet::standard();
    let next_game = Arc::new(Mutex::new(0u32));
    let records: Arc<Mutex<Vec<(u32, GameRecord)>>> =
        Arc::new(Mutex::new(Vec::with_capacity(args.games as usize)));

    let handles: Vec<_> = (0..args.threads)
        .map(|thread_id| {
            let next_game = Arc::clone(&next_game);
            let records = Arc::clone(&records);
            let rules = Arc::clone(&rules);
            let (games, seed) = (args.games, args.seed);

            thread::spawn(move || loop {
                let game_num = {
                    let Ok(mut next) = next_game.lock() else {
                        break;
                    };
                    if *next >= games {
                        break;
                    }
                    *next += 1;
                    *next
                };

                let config = SelfPlayConfig {
                    rules: Arc::clone(&rules),
                    players: [
                        AiConfig::with_difficulty(one),
                        AiConfig::with_difficulty(two),
                    ],
                    seed: seed.wrapping_add(u64::from(game_num)),
                    ..SelfPlayConfig::default()
                };
                match play_game(&config) {
                    Ok(record) => {
                        info!(
                            thread = thread_id,
                            game = game_num,
                            turns = record.turns,
                            result = ?record.result,
                            "{}",
                            record.reason
                        );
                        if let Ok(mut records) = records.lock() {
                            records.push((game_num, record));
                        }
                    }
                    Err(err) => error!(thread = thread_id, game = game_num, %err, "game aborted"),
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            error!("arena thread panicked");
        }
    }

    let mut records = match records.lock() {
        Ok(mut records) => std::mem::take(&mut *records),
        Err(_) => {
            error!("result list poisoned");
            return;
        }
    };
    records.sort_by_key(|(game_num, _)| *game_num);

    let (mut one_wins, mut two_wins, mut draws, mut unfinished) = (0u32, 0u32, 0u32, 0u32);
    for (_, record) in &records {
        match record.result {
            GameResult::PlayerOneWin => one_wins += 1,
            GameResult::PlayerTwoWin => two_wins += 1,
            GameResult::Draw => draws += 1,
            GameResult::Unfinished => unfinished += 1,
        }
        if args.json {
            match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(err) => error!(%err, "could not encode record"),
            }
        }
    }

    println!(
        "Player 1 ({one}): {one_wins}W | Player 2 ({two}): {two_wins}W | {draws} draws | {unfinished} unfinished"
    );
}
