// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Palaver - a session-aware chat-bot gateway.
//!
//! This is the binary entry point for the Palaver gateway.

mod loopback;
mod serve;

use clap::{Parser, Subcommand};

/// Palaver - a session-aware chat-bot gateway.
#[derive(Parser, Debug)]
#[command(name = "palaver", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway with the dev loopback backend (stdin in, stdout out).
    Serve,
    /// Print the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match palaver_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            palaver_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: cannot render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("palaver: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config = palaver_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "palaver");
        assert_eq!(config.dispatch.concurrency_in_session, 4);
    }
}
