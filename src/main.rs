mod cli;
mod core;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "costwatch", about = "Daily cloud cost delta report CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON (for scheduled runs)
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch billing data, build the cost report and email it
    Run,
    /// Build the cost report and print it without sending
    Preview {
        /// Print the HTML email body instead of a terminal table
        #[arg(long)]
        html: bool,

        /// Report date (default: today, UTC)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    let opts = cli::output::OutputOptions {
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Run => {
            let status = cli::report_cmd::run().await;
            println!("{}", serde_json::to_string(&status)?);
            if status.status_code != 200 {
                std::process::exit(1);
            }
        }
        Commands::Preview { html, date } => {
            cli::report_cmd::preview(date, html, &opts).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init(&opts)?,
            ConfigAction::Check => cli::config_cmd::check(&opts)?,
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "costwatch=debug" } else { "costwatch=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
