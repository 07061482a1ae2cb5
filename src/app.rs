//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config::{apply_env_overrides, default_config_path, SolatranConfig};
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::{Path, PathBuf};

/// Social-media tip bot for a public ledger
#[derive(Parser)]
#[command(name = "solatran")]
#[command(version)]
#[command(about = "Social-media tip bot for a public ledger")]
#[command(long_about = "Social-media tip bot for a public ledger.\n\nUsers log in with OAuth2 (PKCE); the bot then reads recent messages addressed\nto it and executes '!send <lamports> <address>' commands as ledger transfers,\nreplying with the transaction signature.\n\nEXAMPLES:\n    # Create the payer keypair and fund it on devnet\n    $ solatran keygen\n\n    # Check the payer's balance\n    $ solatran balance\n\n    # Run the login server\n    $ solatran serve\n\n    # Generate subtitles for a video\n    $ solatran subtitle talk.mp4")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/solatran/solatran.toml\n    Keypair:            ~/.local/share/solatran/keypair.json\n    Logs:               ~/.local/state/solatran/solatran.log.*"
)]
struct Cli {
    /// Use another config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the OAuth login server and dispatch transfer commands
    ///
    /// GET / starts the login; the provider redirects back to /callback,
    /// where recent messages are fetched and '!send' commands executed.
    #[command(visible_alias = "s")]
    Serve,

    /// Generate the payer keypair
    ///
    /// Writes a 64-byte JSON keypair to the configured path (or FILE) and
    /// prints its public key.
    Keygen {
        /// Where to write the keypair
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Overwrite an existing keypair file
        #[arg(long)]
        force: bool,
    },

    /// Show the ledger balance of the payer keypair or ADDRESS
    #[command(visible_alias = "b")]
    Balance {
        /// Base58 address; defaults to the payer keypair
        #[arg(value_name = "ADDRESS")]
        address: Option<String>,
    },

    /// Transcribe an audio or video file into SRT subtitles
    ///
    /// Video files are converted with ffmpeg first. Uses OPENAI_API_KEY or
    /// GROQ_API_KEY depending on the model.
    ///
    /// Examples:
    ///   solatran subtitle output.mp4
    ///   solatran subtitle talk.mp3 -o talk.en.srt --language en
    ///   solatran subtitle talk.mp4 --model whisper-large-v3-turbo
    Subtitle {
        /// Audio or video file to transcribe
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Subtitle file to write (default: FILE with .srt extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Speech model (whisper-1, whisper-large-v3, whisper-large-v3-turbo)
        #[arg(short, long)]
        model: Option<String>,

        /// ISO-639-1 language hint, e.g. "en"
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Open configuration file in your preferred editor
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = commands::logs::DEFAULT_LINES)]
        lines: usize,
    },

    /// Generate shell completion script
    ///
    /// Examples:
    ///   solatran completions bash > solatran.bash
    ///   solatran completions zsh > _solatran
    ///   solatran completions fish > solatran.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Loads the config file and applies environment overrides.
///
/// # Errors
/// - If the file cannot be read or parsed
fn load_config(config_path: &Path) -> anyhow::Result<SolatranConfig> {
    let mut config = SolatranConfig::load(config_path)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization or setup fails
/// - If the configuration cannot be loaded
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config
    match &cli.command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "solatran", &mut io::stdout());
            return Ok(());
        }
        Commands::Logs { lines } => return commands::handle_logs(*lines),
        _ => {}
    }

    logging::init_logging(matches!(cli.command, Commands::Serve))?;

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    crate::setup::ensure_config(&config_path).map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow::anyhow!("Setup failed: {e}")
    })?;

    if let Commands::Config = cli.command {
        return commands::handle_config(&config_path);
    }

    let config = load_config(&config_path)?;
    tracing::debug!("Loaded config from {}", config_path.display());

    match cli.command {
        Commands::Serve => commands::handle_serve(&config).await,
        Commands::Keygen { output, force } => commands::handle_keygen(&config, output, force),
        Commands::Balance { address } => commands::handle_balance(&config, address).await,
        Commands::Subtitle {
            input,
            output,
            model,
            language,
        } => commands::handle_subtitle(&config, input, output, model, language).await,
        Commands::Config | Commands::Logs { .. } | Commands::Completions { .. } => {
            unreachable!("These commands are handled earlier")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subtitle_options() {
        let cli = Cli::try_parse_from([
            "solatran",
            "--config",
            "/tmp/s.toml",
            "subtitle",
            "talk.mp4",
            "-m",
            "whisper-large-v3",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.toml")));
        match cli.command {
            Commands::Subtitle { input, model, .. } => {
                assert_eq!(input, PathBuf::from("talk.mp4"));
                assert_eq!(model.as_deref(), Some("whisper-large-v3"));
            }
            _ => panic!("expected subtitle command"),
        }
    }
}
