use clap::Parser;
use tracing_subscriber::{filter::LevelFilter, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Pyfinder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Find the interpreter that best matches a version request
    Find(commands::find::Opt),
    /// Resolve a free-form interpreter line to an executable
    Resolve(commands::resolve::Opt),
    /// Locate an executable by name on the search order
    Which(commands::which::Opt),
    /// List every interpreter discovery can see
    List(commands::list::Opt),
    /// Show the shell the current process is running under
    Shell(commands::shell::Opt),
}

/// Entry point of the `pyfinder` cli.
fn main() -> anyhow::Result<()> {
    // Parse the command line arguments
    let cli = Cli::parse();

    // Setup default logging level
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    // Setup the tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .finish()
        .try_init()?;

    // Dispatch the selected command
    match cli.command {
        Commands::Find(opt) => commands::find::find(opt),
        Commands::Resolve(opt) => commands::resolve::resolve(opt),
        Commands::Which(opt) => commands::which::which(opt),
        Commands::List(opt) => commands::list::list(opt),
        Commands::Shell(opt) => commands::shell::shell(opt),
    }
}
