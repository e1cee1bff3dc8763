//! BioIntelX CLI - explore and curate a microbial-culture catalog.

use biointelx::action_log;
use biointelx::cli::{
    Cli, Commands, ConfigCommands, ExportCommands, RecordCommands, SystemCommands,
};
use biointelx::commands::{self, Output};
use biointelx::config;
use clap::Parser;
use std::path::Path;
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();

    // Determine the data directory: --data-dir flag > BIX_DATA_DIR env >
    // platform data dir
    let data_dir = match commands::resolve_data_dir(cli.data_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    // CLI flag wins; otherwise the configured preference applies
    let human = cli.human_readable || config::prefers_human(&data_dir);

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    // Start timing
    let start = Instant::now();

    // Execute command
    let result = run_command(cli.command, &data_dir, human);

    // Calculate duration
    let duration = start.elapsed().as_millis() as u64;

    // Determine success/error
    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (silently fails if logging encounters errors)
    let _ = action_log::log_action(&data_dir, &cmd_name, args_json, success, error, duration);

    // Handle result
    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(
    command: Commands,
    data_dir: &Path,
    human: bool,
) -> Result<(), biointelx::Error> {
    match command {
        Commands::Record { command } => match command {
            RecordCommands::Add { id, set, field } => {
                let result = commands::record_add(data_dir, id, &set, &field)?;
                output(&result, human);
            }
            RecordCommands::List {
                search,
                location,
                risk_group,
                limit,
            } => {
                let filters = commands::filter_set(search, location, risk_group);
                let result = commands::record_list(data_dir, filters, limit)?;
                output(&result, human);
            }
            RecordCommands::Show { id } => {
                let result = commands::record_show(data_dir, &id)?;
                output(&result, human);
            }
            RecordCommands::Update { id, set, field } => {
                let result = commands::record_update(data_dir, &id, &set, &field)?;
                output(&result, human);
            }
            RecordCommands::Delete { id } => {
                let result = commands::record_delete(data_dir, &id)?;
                output(&result, human);
            }
        },

        Commands::Stats {
            search,
            location,
            risk_group,
            top,
        } => {
            let filters = commands::filter_set(search, location, risk_group);
            let result = commands::stats(data_dir, filters, top)?;
            output(&result, human);
        }

        Commands::Export { command } => match command {
            ExportCommands::Csv {
                filtered,
                search,
                location,
                risk_group,
                output: out_path,
            } => {
                let filters = commands::filter_set(search, location, risk_group);
                let result = commands::export_csv(data_dir, filtered, filters, out_path)?;
                output(&result, human);
            }
            ExportCommands::Json {
                search,
                location,
                risk_group,
                output: out_path,
            } => {
                let filters = commands::filter_set(search, location, risk_group);
                let result = commands::export_json(data_dir, filters, out_path)?;
                output(&result, human);
            }
        },

        Commands::Login { email, password } => {
            let result = commands::login(data_dir, &email, &password)?;
            output(&result, human);
        }

        Commands::Logout => {
            let result = commands::logout(data_dir)?;
            output(&result, human);
        }

        Commands::Whoami => {
            let result = commands::whoami(data_dir)?;
            output(&result, human);
        }

        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => {
                let result = commands::config_get(data_dir, &key)?;
                output(&result, human);
            }
            ConfigCommands::Set { key, value } => {
                let result = commands::config_set(data_dir, &key, &value)?;
                output(&result, human);
            }
            ConfigCommands::List => {
                let result = commands::config_list(data_dir)?;
                output(&result, human);
            }
        },

        Commands::System { command } => match command {
            SystemCommands::Reset { force } => {
                let result = commands::system_reset(data_dir, force)?;
                output(&result, human);
            }
            SystemCommands::Info => {
                let result = commands::system_info(data_dir)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

/// Serialize a command into a name and argument object for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    match command {
        Commands::Record { command } => match command {
            RecordCommands::Add { id, set, field } => (
                "record add".to_string(),
                serde_json::json!({ "id": id, "set": set, "field": field }),
            ),
            RecordCommands::List {
                search,
                location,
                risk_group,
                limit,
            } => (
                "record list".to_string(),
                serde_json::json!({
                    "search": search, "location": location,
                    "risk_group": risk_group, "limit": limit
                }),
            ),
            RecordCommands::Show { id } => {
                ("record show".to_string(), serde_json::json!({ "id": id }))
            }
            RecordCommands::Update { id, set, field } => (
                "record update".to_string(),
                serde_json::json!({ "id": id, "set": set, "field": field }),
            ),
            RecordCommands::Delete { id } => (
                "record delete".to_string(),
                serde_json::json!({ "id": id }),
            ),
        },

        Commands::Stats {
            search,
            location,
            risk_group,
            top,
        } => (
            "stats".to_string(),
            serde_json::json!({
                "search": search, "location": location,
                "risk_group": risk_group, "top": top
            }),
        ),

        Commands::Export { command } => match command {
            ExportCommands::Csv {
                filtered,
                search,
                location,
                risk_group,
                output,
            } => (
                "export csv".to_string(),
                serde_json::json!({
                    "filtered": filtered, "search": search, "location": location,
                    "risk_group": risk_group, "output": output
                }),
            ),
            ExportCommands::Json {
                search,
                location,
                risk_group,
                output,
            } => (
                "export json".to_string(),
                serde_json::json!({
                    "search": search, "location": location,
                    "risk_group": risk_group, "output": output
                }),
            ),
        },

        // The password never reaches the action log.
        Commands::Login { email, .. } => (
            "login".to_string(),
            serde_json::json!({ "email": email }),
        ),

        Commands::Logout => ("logout".to_string(), serde_json::json!({})),

        Commands::Whoami => ("whoami".to_string(), serde_json::json!({})),

        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => {
                ("config get".to_string(), serde_json::json!({ "key": key }))
            }
            ConfigCommands::Set { key, value } => (
                "config set".to_string(),
                serde_json::json!({ "key": key, "value": value }),
            ),
            ConfigCommands::List => ("config list".to_string(), serde_json::json!({})),
        },

        Commands::System { command } => match command {
            SystemCommands::Reset { force } => (
                "system reset".to_string(),
                serde_json::json!({ "force": force }),
            ),
            SystemCommands::Info => ("system info".to_string(), serde_json::json!({})),
        },
    }
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
