use anyhow::Result;
use clap::{Parser, Subcommand};
use ratebot::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for ratebot::AppCommand {
    fn from(cmd: Commands) -> ratebot::AppCommand {
        match cmd {
            Commands::Run => ratebot::AppCommand::Run,
            Commands::Convert {
                source,
                target,
                amount,
            } => ratebot::AppCommand::Convert {
                text: format!("{source} {target} {amount}"),
            },
            Commands::Values => ratebot::AppCommand::Values,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start the bot (default)
    Run,
    /// Convert an amount once and print the reply
    Convert {
        source: String,
        target: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List supported currencies
    Values,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Run);
    let result = match command {
        Commands::Setup => ratebot::cli::setup::setup(),
        cmd => ratebot::run_command(cmd.into(), cli.config_path.as_deref())
            .await
            .map(|output| {
                if !output.is_empty() {
                    println!("{output}");
                }
            }),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
