mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, order::OrderSubcommand, user::UserSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "aquaflow",
    about = "Water-can delivery storefront — place, track, and manage orders",
    version,
    propagate_version = true
)]
struct Cli {
    /// Store root (default: auto-detect from .aquaflow/ or .git/)
    #[arg(long, global = true, env = "AQUAFLOW_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an AquaFlow store in the current directory
    Init,

    /// List the product catalog
    Products,

    /// Place, track, and manage orders
    Order {
        #[command(subcommand)]
        subcommand: OrderSubcommand,
    },

    /// Sign up, sign in, and inspect accounts
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Inspect and validate the store configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Products => cmd::product::run(&root, cli.json),
        Commands::Order { subcommand } => cmd::order::run(&root, subcommand, cli.json),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
