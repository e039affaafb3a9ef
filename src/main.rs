use clap::{Parser, Subcommand};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::process;

use servolle_reset::cli;
use servolle_reset::clock::SystemClock;
use servolle_reset::config;
use servolle_reset::flow::{validate_new_password, FlowSettings, ResetFlow};
use servolle_reset::store::{FileStore, KeyValueStore, MemoryStore};

/// Servolle Password Reset - the forgot-password wizard as a terminal flow
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Sets the configuration file
    #[clap(short, long, value_name = "FILE", default_value = "config.toml")]
    config: String,

    /// Turn debugging information on
    #[clap(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive password reset wizard
    Reset {
        /// Keep state in memory only; nothing survives the run
        #[clap(long)]
        ephemeral: bool,
    },

    /// Show the persisted countdown and attempt state
    Status {},

    /// Clear the persisted reset state
    Clear {},

    /// Check a candidate password against the strength rules
    CheckPassword {
        /// The password to check
        password: String,
    },
}

fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Err(e) = config::load_config(&cli.config) {
        error!("Failed to load configuration: {:#}", e);
        process::exit(1);
    }

    let app_config = config::get_config();
    let settings = FlowSettings::from(&app_config);
    info!("{} v{}", app_config.app_name, app_config.version);

    let result = match cli.command {
        Commands::Reset { ephemeral } => {
            let store: Box<dyn KeyValueStore> = if ephemeral {
                Box::new(MemoryStore::new())
            } else {
                Box::new(FileStore::new(&app_config.store.path))
            };

            ResetFlow::resume(Box::new(SystemClock), store, settings)
                .map_err(anyhow::Error::from)
                .and_then(cli::run_reset)
        }
        Commands::Status {} => {
            let store = FileStore::new(&app_config.store.path);
            cli::show_status(&store, &SystemClock, &settings)
        }
        Commands::Clear {} => {
            let store = FileStore::new(&app_config.store.path);
            cli::clear_state(&store)
        }
        Commands::CheckPassword { password } => {
            match validate_new_password(&password, &password, settings.min_password_length) {
                Ok(()) => {
                    cli::utils::print_success("Password meets all requirements.");
                    Ok(())
                }
                Err(e) => {
                    cli::utils::print_error(&e.to_string());
                    process::exit(1)
                }
            }
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}
