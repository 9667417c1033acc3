use log::info;
use std::env;
use std::process;

use isolation_agent::config::Config;
use isolation_agent::debug_logger::GameLogger;
use isolation_agent::tournament::Tournament;

fn print_usage() {
    eprintln!("Isolation Tournament Runner");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  isolation-agent [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>    Path to Isolation.toml (default: Isolation.toml)");
    eprintln!("  --games <n>        Override the number of games");
    eprintln!("  --show             Print the final board of the first game");
    eprintln!("  --help             Show this help message");
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config_path = None;
    let mut games = None;
    let mut show = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                }
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--games" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --games requires an argument");
                    process::exit(1);
                }
                match args[i + 1].parse::<usize>() {
                    Ok(n) => games = Some(n),
                    Err(e) => {
                        eprintln!("Error: invalid game count '{}': {}", args[i + 1], e);
                        process::exit(1);
                    }
                }
                i += 1;
            }
            "--show" => {
                show = true;
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => Config::load_or_default(),
    };
    if let Some(n) = games {
        config.tournament.num_matches = n;
    }

    info!("Starting Isolation tournament...");

    let logger = GameLogger::new(config.debug.enabled, &config.debug.log_file_path);
    let tournament = Tournament::new(config, logger);
    let results = tournament.run();
    tournament.print_report(&results);

    let debug = &tournament.config().debug;
    if debug.enabled {
        println!("Game log written to {}", debug.log_file_path);
    }

    if show {
        if let Some(first) = results.first() {
            println!("Final board of game {}:", first.game_id);
            println!("{}", first.record.final_state);
        }
    }
}
