use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use rpg_progression::components::skill::{Skill, SkillId};
use rpg_progression::core::world::{Game, PlayerSummary, ProgressionIntent, Snapshot};
use rpg_progression::events::ProgressionEvent;
use rpg_progression::skills::{SkillCall, SkillEffect, SkillEventArgs};
use rpg_progression::world::{ProgressionDb, ProgressionRepository};
use rpg_progression::SaveState;

const COMMANDS: &str = "Commands: players | add <index> [name] | learn <index> <skill_id> | xp <index> <amount> | up <index> <skill_id> | down <index> <skill_id> | reset <index> | event <index> <name> [key=value ...] | tick [n] | save | quit";

fn main() {
    println!("Initializing RPG progression (debug shell)...");
    let db_path = parse_db_path(env::args().collect());

    let mut repo: Box<dyn ProgressionRepository> = match ProgressionDb::open(&db_path) {
        Ok(db) => Box::new(db),
        Err(err) => {
            eprintln!(
                "Failed to open progression DB at {}: {}",
                db_path.display(),
                err
            );
            std::process::exit(1);
        }
    };
    let state = match repo.load_or_init() {
        Ok(state) => state,
        Err(err) => {
            eprintln!("Failed to load progression state: {}", err);
            SaveState::default()
        }
    };
    println!(
        "Loaded {} player(s) from {}.",
        state.players.len(),
        db_path.display()
    );

    let mut game = Game::new();
    game.load_state(state);
    register_demo_effects(&mut game);

    println!("{}", COMMANDS);
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

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => {
                println!("{}", COMMANDS);
            }
            "players" | "list" => {
                let snapshot = game.tick(Vec::new());
                print_players(&snapshot);
            }
            "add" => {
                let Some(index) = parse_index(parts.next()) else {
                    println!("Usage: add <index> [name]");
                    continue;
                };
                let name = parts.collect::<Vec<_>>().join(" ");
                let name = if name.is_empty() {
                    format!("Player {}", index)
                } else {
                    name
                };
                if game.add_player(index, &name) {
                    println!("Added player {} ({}).", index, name);
                } else {
                    println!("Player index {} is already taken.", index);
                }
            }
            "learn" => {
                let (Some(index), Some(skill_id)) = (parse_index(parts.next()), parts.next())
                else {
                    println!("Usage: learn <index> <skill_id>");
                    continue;
                };
                match demo_skill(skill_id) {
                    Some(skill) => {
                        if game.grant_skill(index, skill) {
                            println!("Player {} learned {}.", index, skill_id);
                        } else {
                            println!("Unknown player {} or skill already known.", index);
                        }
                    }
                    None => println!("Unknown skill id: {} (try: {})", skill_id, demo_skill_ids()),
                }
            }
            "xp" => {
                let (Some(index), Some(raw_amount)) = (parse_index(parts.next()), parts.next())
                else {
                    println!("Usage: xp <index> <amount>");
                    continue;
                };
                let Ok(amount) = raw_amount.parse::<i32>() else {
                    println!("Invalid amount: {}", raw_amount);
                    continue;
                };
                run_and_report(
                    &mut game,
                    &mut *repo,
                    vec![ProgressionIntent::GiveXp {
                        player_index: index,
                        amount,
                    }],
                );
            }
            "up" => {
                let (Some(index), Some(skill_id)) = (parse_index(parts.next()), parts.next())
                else {
                    println!("Usage: up <index> <skill_id>");
                    continue;
                };
                let snapshot = run_and_report(
                    &mut game,
                    &mut *repo,
                    vec![ProgressionIntent::UpgradeSkill {
                        player_index: index,
                        skill_id: SkillId::new(skill_id),
                    }],
                );
                if snapshot.events.is_empty() {
                    println!("No upgrade applied (unknown skill, capped, or not enough credits).");
                }
            }
            "down" => {
                let (Some(index), Some(skill_id)) = (parse_index(parts.next()), parts.next())
                else {
                    println!("Usage: down <index> <skill_id>");
                    continue;
                };
                let snapshot = run_and_report(
                    &mut game,
                    &mut *repo,
                    vec![ProgressionIntent::DowngradeSkill {
                        player_index: index,
                        skill_id: SkillId::new(skill_id),
                    }],
                );
                if snapshot.events.is_empty() {
                    println!("No downgrade applied (unknown skill or no invested levels).");
                }
            }
            "reset" => {
                let Some(index) = parse_index(parts.next()) else {
                    println!("Usage: reset <index>");
                    continue;
                };
                run_and_report(
                    &mut game,
                    &mut *repo,
                    vec![ProgressionIntent::ResetProgress {
                        player_index: index,
                    }],
                );
                println!("Progress reset for player {}.", index);
            }
            "event" => {
                let (Some(index), Some(event_name)) = (parse_index(parts.next()), parts.next())
                else {
                    println!("Usage: event <index> <name> [key=value ...]");
                    continue;
                };
                let args = parse_event_args(parts);
                run_and_report(
                    &mut game,
                    &mut *repo,
                    vec![ProgressionIntent::GameEvent {
                        player_index: index,
                        event_name: event_name.to_string(),
                        args,
                    }],
                );
            }
            "tick" => {
                let count = parts
                    .next()
                    .and_then(|raw| raw.parse::<u32>().ok())
                    .unwrap_or(1);
                for _ in 0..count {
                    run_and_report(&mut game, &mut *repo, Vec::new());
                }
            }
            "save" => {
                persist(&mut *repo, &game);
                println!("Saved.");
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }

    persist(&mut *repo, &game);
}

fn run_and_report(
    game: &mut Game,
    repo: &mut dyn ProgressionRepository,
    intents: Vec<ProgressionIntent>,
) -> Snapshot {
    let snapshot = game.tick(intents);
    for event in &snapshot.events {
        println!("{}", format_event(event));
    }
    persist(repo, game);
    snapshot
}

fn persist(repo: &mut dyn ProgressionRepository, game: &Game) {
    if let Err(err) = repo.save_state(&game.save_state()) {
        eprintln!("Failed to persist progression state: {}", err);
    }
}

fn parse_index(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.parse::<u32>().ok())
}

fn parse_event_args<'a>(parts: impl Iterator<Item = &'a str>) -> SkillEventArgs {
    let mut args = SkillEventArgs::new();
    for part in parts {
        let Some((key, raw_value)) = part.split_once('=') else {
            continue;
        };
        let value = match raw_value.parse::<i64>() {
            Ok(number) => serde_json::Value::from(number),
            Err(_) => serde_json::Value::String(raw_value.to_string()),
        };
        args.insert(key.to_string(), value);
    }
    args
}

fn print_players(snapshot: &Snapshot) {
    if snapshot.players.is_empty() {
        println!("No players. Use 'add <index> [name]'.");
        return;
    }
    for player in &snapshot.players {
        print_player(player);
    }
}

fn print_player(player: &PlayerSummary) {
    println!(
        "#{} {} | level {} | xp {}/{} | credits {}",
        player.index, player.name, player.level, player.xp, player.required_xp, player.credits
    );
    for skill in &player.skills {
        let cap = skill
            .max_level
            .map(|max| format!("/{}", max))
            .unwrap_or_default();
        println!(
            "    {} level {}{} (cost {}, refund {})",
            skill.class_id, skill.level, cap, skill.upgrade_cost, skill.downgrade_refund
        );
    }
}

fn format_event(event: &ProgressionEvent) -> String {
    match event {
        ProgressionEvent::LevelUp {
            player,
            levels,
            credits,
        } => format!(
            "Player {} gained {} level(s) and {} credit(s).",
            player.0, levels, credits
        ),
        ProgressionEvent::SkillUpgraded {
            player,
            skill,
            level,
        } => format!("Player {} upgraded {} to level {}.", player.0, skill, level),
        ProgressionEvent::SkillDowngraded {
            player,
            skill,
            level,
        } => format!(
            "Player {} downgraded {} to level {}.",
            player.0, skill, level
        ),
    }
}

struct AnnounceEffect {
    label: &'static str,
}

impl SkillEffect for AnnounceEffect {
    fn on_event(&mut self, event_name: &str, call: &SkillCall) {
        println!(
            "[{}] level {} triggers on '{}' for player {} ({} arg(s))",
            self.label,
            call.skill_level,
            event_name,
            call.player.0,
            call.args.len()
        );
    }
}

fn demo_skill(id: &str) -> Option<Skill> {
    match id {
        "regeneration" => Some(Skill::new(SkillId::new("regeneration"), 1, 1, Some(5))),
        "long_jump" => Some(Skill::new(SkillId::new("long_jump"), 2, 1, None)),
        "vampirism" => Some(Skill::new(SkillId::new("vampirism"), 3, 2, Some(3))),
        _ => None,
    }
}

fn demo_skill_ids() -> &'static str {
    "regeneration, long_jump, vampirism"
}

fn register_demo_effects(game: &mut Game) {
    for label in ["regeneration", "long_jump", "vampirism"] {
        game.register_effect(SkillId::new(label), Box::new(AnnounceEffect { label }));
    }
}

fn parse_db_path(args: Vec<String>) -> PathBuf {
    let mut iter = args.iter();
    let mut path = PathBuf::from("./assets/db/rpg.db");
    while let Some(arg) = iter.next() {
        if arg.as_str() == "--db" {
            if let Some(value) = iter.next() {
                path = PathBuf::from(value);
            }
        }
    }
    path
}
