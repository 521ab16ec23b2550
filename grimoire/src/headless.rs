//! Headless mode for the grimoire.
//!
//! This module runs the line protocol from `grimoire_core::headless` over
//! stdin/stdout. It's designed for automated testing and scripted sessions.

use grimoire_core::headless::{Command, HeadlessSession};
use grimoire_core::{Grimoire, GrimoireConfig};
use std::io::{self, BufRead};

/// Run the grimoire in headless mode.
///
/// Every input line is a `#` command; everything printed on stdout is a
/// reply. Logs go to stderr.
pub async fn run_headless(config: GrimoireConfig) {
    tracing::info!(data_dir = %config.data_dir.display(), "starting headless session");
    let mut session = HeadlessSession::new(Grimoire::new(config));

    println!("=== Grimoire Headless Mode ===");
    println!("Party: {}", session.grimoire().config().group_name);
    println!(
        "Secret items: {} ({} available)",
        session.grimoire().secrets().len(),
        session.grimoire().secrets().available().count()
    );
    println!();
    println!("Type #help for the command list.");
    println!();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                println!("[ERROR] {e}");
                continue;
            }
        };
        let quit = command == Command::Quit;

        for reply in session.execute(command).await {
            println!("{reply}");
        }
        if quit {
            break;
        }
    }
}

/// Apply command line overrides on top of the environment config.
pub fn parse_config_from_args(args: &[String], mut config: GrimoireConfig) -> GrimoireConfig {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" => {
                if let Some(dir) = args.get(i + 1) {
                    config.data_dir = dir.into();
                    i += 1;
                }
            }
            "--group" => {
                if let Some(name) = args.get(i + 1) {
                    config.group_name = name.clone();
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(seed) = args.get(i + 1) {
                    match seed.parse() {
                        Ok(seed) => config.rng_seed = Some(seed),
                        Err(_) => tracing::warn!(value = %seed, "ignoring invalid --seed"),
                    }
                    i += 1;
                }
            }
            "--starter-items" => config.starter_items = true,
            _ => {}
        }
        i += 1;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_args_override_config() {
        let config = parse_config_from_args(
            &args(&["grimoire", "--data-dir", "/srv/party", "--seed", "9", "--starter-items"]),
            GrimoireConfig::new(),
        );
        assert_eq!(config.data_dir, PathBuf::from("/srv/party"));
        assert_eq!(config.rng_seed, Some(9));
        assert!(config.starter_items);
    }

    #[test]
    fn test_bad_seed_is_ignored() {
        let config = parse_config_from_args(
            &args(&["grimoire", "--seed", "soon"]),
            GrimoireConfig::new().with_rng_seed(1),
        );
        assert_eq!(config.rng_seed, Some(1));
    }
}
