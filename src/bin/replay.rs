// Standalone replay tool for analyzing Isolation game logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay every logged move
//   --games <id1,id2>      Replay the moves of specific games (comma-separated)
//   --verbose              Show detailed output for each move
//   --config <path>        Path to Isolation.toml (default: Isolation.toml)

use std::env;
use std::process;

use isolation_agent::config::Config;
use isolation_agent::replay::ReplayEngine;

fn print_usage() {
    eprintln!("Isolation Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay every move in the log");
    eprintln!("  --games <G1,G2,...>     Replay specific games (comma-separated)");
    eprintln!("  --verbose               Show detailed output for each move");
    eprintln!("  --config <path>         Path to Isolation.toml (default: Isolation.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all moves");
    eprintln!("  replay isolation_games.jsonl --all");
    eprintln!();
    eprintln!("  # Replay games 0 and 3 with per-move output");
    eprintln!("  replay isolation_games.jsonl --games 0,3 --verbose");
}

fn parse_games(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .map(|g| {
            g.trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid game id '{}': {}", g, e))
        })
        .collect()
}

enum Mode {
    All,
    Games(Vec<usize>),
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let log_file = &args[1];
    let mut config_path = "Isolation.toml".to_string();
    let mut verbose = false;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--games" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --games requires an argument");
                    process::exit(1);
                }
                match parse_games(&args[i + 1]) {
                    Ok(ids) => mode = Some(Mode::Games(ids)),
                    Err(e) => {
                        eprintln!("Error parsing games: {}", e);
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                }
                config_path = args[i + 1].clone();
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mode = match mode {
        Some(mode) => mode,
        None => {
            eprintln!("Error: Must specify --all or --games");
            print_usage();
            process::exit(1);
        }
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let engine = ReplayEngine::new(config, verbose);

    let entries = match engine.load_log_file(log_file) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading log file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        eprintln!("Error: Log file is empty");
        process::exit(1);
    }

    println!("Loaded {} log entries\n", entries.len());

    let results = match mode {
        Mode::All => {
            println!("Replaying all {} moves...\n", entries.len());
            engine.replay_all(&entries)
        }
        Mode::Games(ids) => {
            println!("Replaying {} game(s)...\n", ids.len());
            engine.replay_games(&entries, &ids)
        }
    };

    match results {
        Ok(results) => engine.print_report(&results),
        Err(e) => {
            eprintln!("Error during replay: {}", e);
            process::exit(1);
        }
    }
}
