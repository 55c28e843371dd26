use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "rainodoro", version, about = "Rainodoro CLI: a pomodoro timer that fills with rain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task list for pomodoros
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Short and long break items
    Break {
        #[command(subcommand)]
        action: commands::breaks::BreakAction,
    },
    /// Per-mode session budgets
    Budget {
        #[command(subcommand)]
        action: commands::budget::BudgetAction,
    },
    /// Pour counters
    Pours {
        #[command(subcommand)]
        action: commands::pours::PoursAction,
    },
    /// Completed countdowns
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RAINODORO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Break { action } => commands::breaks::run(action),
        Commands::Budget { action } => commands::budget::run(action),
        Commands::Pours { action } => commands::pours::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "rainodoro", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
