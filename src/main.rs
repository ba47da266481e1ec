use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use wildspire::core::world::Snapshot;
use wildspire::data::species::load_species_catalog;
use wildspire::simulation::collection::InstanceId;
use wildspire::world::repository::SaveRepository;
use wildspire::world::sqlite::SaveDb;
use wildspire::{ActionIntent, Game};

const HELP: &str = "Commands: status | roster | dex | challenges | explore | pick <n> | catch <hit|miss> [score] | flee | release <id> | fuse <a> <b> | battle <a> <b> <c> | clash | finish | forfeit | boss <a> <b> <c> | bossclash | bossfinish | bossforfeit | claim <id|all> | streak | rename <name> | grant <n> | save | quit";

fn main() {
    println!("Initializing Wildspire (Engine Debug)...");
    let options = parse_args(env::args().collect());

    let mut repo: Box<dyn SaveRepository> = match SaveDb::open(&options.db_path) {
        Ok(db) => Box::new(db),
        Err(err) => {
            eprintln!(
                "Failed to open save DB at {}: {}",
                options.db_path.display(),
                err
            );
            std::process::exit(1);
        }
    };

    let mut game = match &options.catalog_path {
        Some(path) => {
            let catalog = match load_species_catalog(path) {
                Ok(catalog) => catalog,
                Err(err) => {
                    eprintln!("Failed to load catalog from {}: {}", path.display(), err);
                    std::process::exit(1);
                }
            };
            match Game::with_catalog(wall_clock_seed(), now_secs(), catalog) {
                Ok(game) => {
                    println!("Catalog override loaded from {}.", path.display());
                    game
                }
                Err(err) => {
                    eprintln!("Catalog override rejected: {}", err);
                    std::process::exit(1);
                }
            }
        }
        None => Game::new(wall_clock_seed(), now_secs()),
    };
    match repo.load() {
        Ok(Some(state)) => {
            game.load_state(state);
            println!("Save loaded from {}.", options.db_path.display());
        }
        Ok(None) => {
            println!("No save found, starting fresh.");
        }
        Err(err) => {
            eprintln!("Failed to load save: {}", err);
        }
    }

    println!("{}", HELP);
    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();

        let intents = match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => {
                println!("{}", HELP);
                continue;
            }
            "status" => {
                print_status(&game.tick(now_secs(), Vec::new()));
                continue;
            }
            "roster" => {
                print_roster(&game.snapshot());
                continue;
            }
            "dex" => {
                let snapshot = game.snapshot();
                println!(
                    "Dex: seen {} / caught {} of {} species",
                    snapshot.dex.seen, snapshot.dex.caught, snapshot.dex.total
                );
                continue;
            }
            "challenges" => {
                print_challenges(&game.tick(now_secs(), Vec::new()));
                continue;
            }
            "explore" => vec![ActionIntent::StartEncounter],
            "pick" => match parts.next().and_then(|v| v.parse::<usize>().ok()) {
                Some(n) if n >= 1 => vec![ActionIntent::SelectCandidate { index: n - 1 }],
                _ => {
                    println!("Usage: pick <1-3>");
                    continue;
                }
            },
            "catch" => {
                let success = match parts.next() {
                    Some("hit") => true,
                    Some("miss") => false,
                    _ => {
                        println!("Usage: catch <hit|miss> [score]");
                        continue;
                    }
                };
                let score = parts.next().and_then(|v| v.parse::<u32>().ok());
                vec![ActionIntent::ResolveCatch { success, score }]
            }
            "flee" => vec![ActionIntent::CancelEncounter],
            "release" => match parse_instance(parts.next()) {
                Some(id) => vec![ActionIntent::Release { id }],
                None => {
                    println!("Usage: release <instance_id>");
                    continue;
                }
            },
            "fuse" => match (parse_instance(parts.next()), parse_instance(parts.next())) {
                (Some(a), Some(b)) => vec![ActionIntent::Fuse { a, b }],
                _ => {
                    println!("Usage: fuse <instance_id> <instance_id>");
                    continue;
                }
            },
            "battle" => match parse_team(&mut parts) {
                Some(team) => vec![ActionIntent::StartBattle { team }],
                None => {
                    println!("Usage: battle <id> <id> <id>");
                    continue;
                }
            },
            "clash" => vec![ActionIntent::ResolveBattle],
            "finish" => vec![ActionIntent::EndBattle],
            "forfeit" => vec![ActionIntent::CancelBattle],
            "boss" => match parse_team(&mut parts) {
                Some(team) => vec![ActionIntent::StartBossEncounter { team }],
                None => {
                    println!("Usage: boss <id> <id> <id>");
                    continue;
                }
            },
            "bossclash" => vec![ActionIntent::ResolveBossEncounter],
            "bossfinish" => vec![ActionIntent::EndBossEncounter],
            "bossforfeit" => vec![ActionIntent::CancelBossEncounter],
            "claim" => match parts.next() {
                Some("all") => vec![ActionIntent::ClaimAllChallengeRewards],
                Some(raw) => match raw.parse::<u32>() {
                    Ok(id) => vec![ActionIntent::ClaimChallengeReward { id }],
                    Err(_) => {
                        println!("Usage: claim <id|all>");
                        continue;
                    }
                },
                None => {
                    println!("Usage: claim <id|all>");
                    continue;
                }
            },
            "streak" => vec![ActionIntent::ClaimStreakReward],
            "rename" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    println!("Usage: rename <name>");
                    continue;
                }
                vec![ActionIntent::SetDisplayName { name }]
            }
            "grant" => match parts.next().and_then(|v| v.parse::<u32>().ok()) {
                Some(amount) => vec![ActionIntent::CreditCurrency { amount }],
                None => {
                    println!("Usage: grant <amount>");
                    continue;
                }
            },
            "save" => {
                match repo.save(&game.save_state()) {
                    Ok(()) => println!("Saved to {}.", options.db_path.display()),
                    Err(err) => eprintln!("Save failed: {}", err),
                }
                continue;
            }
            _ => {
                println!("Unknown command. Type 'help'.");
                continue;
            }
        };

        let snapshot = game.tick(now_secs(), intents);
        print_log(&snapshot);
        print_sessions(&snapshot);
    }

    if let Err(err) = repo.save(&game.save_state()) {
        eprintln!("Save on exit failed: {}", err);
    }
}

struct Options {
    db_path: PathBuf,
    catalog_path: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Options {
    let mut iter = args.iter();
    let mut options = Options {
        db_path: PathBuf::from("./wildspire_save.db"),
        catalog_path: None,
    };
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                if let Some(value) = iter.next() {
                    options.db_path = PathBuf::from(value);
                }
            }
            "--catalog" => {
                if let Some(value) = iter.next() {
                    options.catalog_path = Some(PathBuf::from(value));
                }
            }
            _ => {}
        }
    }
    options
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

fn parse_instance(raw: Option<&str>) -> Option<InstanceId> {
    raw.and_then(|v| v.parse::<u32>().ok()).map(InstanceId)
}

fn parse_team(parts: &mut std::str::SplitWhitespace) -> Option<Vec<InstanceId>> {
    let team: Vec<InstanceId> = parts
        .filter_map(|raw| raw.parse::<u32>().ok().map(InstanceId))
        .collect();
    if team.len() == 3 {
        Some(team)
    } else {
        None
    }
}

fn print_log(snapshot: &Snapshot) {
    for line in &snapshot.log {
        println!("  {}", line);
    }
}

fn print_status(snapshot: &Snapshot) {
    print_log(snapshot);
    println!(
        "{} | day {} | {} coins | energy {} | boss energy {} | {}W/{}L | streak {}",
        snapshot.profile.display_name,
        snapshot.day,
        snapshot.profile.currency,
        snapshot.profile.energy,
        snapshot.profile.boss_energy,
        snapshot.profile.wins,
        snapshot.profile.losses,
        snapshot.profile.streak
    );
}

fn print_roster(snapshot: &Snapshot) {
    if snapshot.creatures.is_empty() {
        println!("Roster: empty");
        return;
    }
    println!("Roster:");
    for creature in &snapshot.creatures {
        println!(
            "  [{}] {} | {} {} | pwr {} grd {} spd {} | {} wins",
            creature.id.0,
            creature.name,
            creature.rarity,
            creature.element,
            creature.power,
            creature.guard,
            creature.speed,
            creature.wins
        );
    }
}

fn print_challenges(snapshot: &Snapshot) {
    println!("Challenges:");
    for challenge in &snapshot.challenges {
        let mark = if challenge.claimed {
            "paid"
        } else if challenge.completed {
            "done"
        } else {
            "open"
        };
        println!(
            "  [{}] {} | {}/{} | {} coins | {}",
            challenge.id,
            challenge.description,
            challenge.progress,
            challenge.target,
            challenge.reward,
            mark
        );
    }
}

fn print_sessions(snapshot: &Snapshot) {
    if let Some(encounter) = &snapshot.encounter {
        println!("Wild encounter:");
        for (i, card) in encounter.cards.iter().enumerate() {
            let marker = if encounter.selected == Some(i) { ">" } else { " " };
            println!(
                " {} {}. {} ({}) difficulty {:.0}%",
                marker,
                i + 1,
                card.name,
                card.element,
                card.difficulty * 100.0
            );
        }
    }
    if let Some(battle) = &snapshot.battle {
        println!(
            "Battle: {} | {} - {}",
            if battle.resolved { "resolved" } else { "ready" },
            battle.player_score,
            battle.opponent_score
        );
        for (member, opponent) in battle.team.iter().zip(battle.opponents.iter()) {
            println!(
                "  {} ({}, {}) vs {} ({}, {})",
                member.name,
                member.element,
                member.power,
                opponent.name,
                opponent.element,
                opponent.power
            );
        }
    }
    if let Some(boss) = &snapshot.boss {
        println!(
            "Boss {}: {} | {} - {}",
            boss.title,
            if boss.resolved { "resolved" } else { "ready" },
            boss.player_score,
            boss.opponent_score
        );
    }
}
