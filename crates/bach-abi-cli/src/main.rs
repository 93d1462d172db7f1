//! # bach-abi
//!
//! Command-line ABI encoder and decoder for BachLedger.
//!
//! ## Usage
//!
//! ```bash
//! # Encoding
//! bach-abi encode "address,uint256" 0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d 1000
//! bach-abi encode-packed "string,uint8" '"gm"' 7
//! bach-abi decode "uint256 amount,string memo" 0x...
//!
//! # Signatures
//! bach-abi selector "transfer(address,uint256)"
//! bach-abi topic "Transfer(address indexed from, address indexed to, uint256 value)"
//!
//! # Inspection against JSON ABIs (ERC-20 when none are given)
//! bach-abi decode-call --abi token.json 0xa9059cbb...
//! bach-abi decode-log --topic 0xddf252ad... --topic 0x... --topic 0x... --data 0x...
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// BachLedger ABI tool
#[derive(Parser, Debug)]
#[command(name = "bach-abi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ~/.bachledger/abi.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "bach_abi=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// ABI-encode values
    Encode(commands::codec::EncodeArgs),
    /// Decode ABI-encoded data
    Decode(commands::codec::DecodeArgs),
    /// Packed (non-standard) encoding of values
    EncodePacked(commands::codec::EncodeArgs),
    /// Function selector of a signature
    Selector(commands::signature::SignatureArgs),
    /// Event topic of a signature
    Topic(commands::signature::SignatureArgs),
    /// Decode call data against known functions
    DecodeCall(commands::inspect::DecodeCallArgs),
    /// Decode a log against known events
    DecodeLog(commands::inspect::DecodeLogArgs),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Register a JSON ABI file
        #[arg(long)]
        add_abi: Option<PathBuf>,
        /// Set the default output format
        #[arg(long)]
        set_json: Option<bool>,
        /// Set the default log filter
        #[arg(long)]
        set_log_level: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::config_path);
    let config = match &config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => exit_with(&format!("{:#}", e), cli.json),
    };

    let json = cli.json || config.json;
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = run(cli.command, config, config_path, json);
    if let Err(e) = result {
        exit_with(&e.to_string(), json);
    }
}

fn run(
    command: Commands,
    mut config: Config,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    match command {
        Commands::Encode(args) => args.encode(json),
        Commands::Decode(args) => args.execute(json),
        Commands::EncodePacked(args) => args.encode_packed(json),
        Commands::Selector(args) => args.selector(json),
        Commands::Topic(args) => args.topic(json),
        Commands::DecodeCall(args) => args.execute(&config, json),
        Commands::DecodeLog(args) => args.execute(&config, json),
        Commands::Config {
            show,
            add_abi,
            set_json,
            set_log_level,
        } => handle_config(
            &mut config,
            config_path,
            ConfigEdit {
                show,
                add_abi,
                set_json,
                set_log_level,
            },
            json,
        ),
    }
}

fn exit_with(message: &str, json: bool) -> ! {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "error": message,
                "success": false
            })
        );
    } else {
        eprintln!("Error: {}", message);
    }
    std::process::exit(1);
}

struct ConfigEdit {
    show: bool,
    add_abi: Option<PathBuf>,
    set_json: Option<bool>,
    set_log_level: Option<String>,
}

fn handle_config(
    config: &mut Config,
    path: Option<PathBuf>,
    edit: ConfigEdit,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(abi) = edit.add_abi {
        if !abi.exists() {
            return Err(CliError::InvalidInput(format!("no such ABI file: {}", abi.display())));
        }
        modified |= config.add_abi(abi);
    }

    if let Some(value) = edit.set_json {
        config.json = value;
        modified = true;
    }

    if let Some(level) = edit.set_log_level {
        config.log_level = level;
        modified = true;
    }

    if modified {
        let path = path.ok_or_else(|| CliError::Config("cannot determine config path".to_string()))?;
        config.save_to(&path)?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Output::new(json)
            .field("status", "saved")
            .field("path", &path.display().to_string())
            .message("Configuration saved")
            .print();
    } else if edit.show {
        let abis: Vec<String> = config
            .abi_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        Output::new(json)
            .field_value("abi_paths", serde_json::json!(abis))
            .field_bool("json", config.json)
            .field("log_level", &config.log_level)
            .message(&format!(
                "ABI files: {}\nJSON output: {}\nLog level: {}",
                if abis.is_empty() { "(none)".to_string() } else { abis.join(", ") },
                config.json,
                config.log_level
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --add-abi/--set-json/--set-log-level to modify")
            .print();
    }

    Ok(())
}
