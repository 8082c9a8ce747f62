//! RPSLS - Main Binary
//!
//! Rock Paper Scissors Lizard Spock in the terminal

use clap::{Parser, Subcommand, ValueEnum};
use rpsls_rs::{
    core::{outcome::rules_lines, StatsRecord},
    game::{
        EventKind, FixedScriptController, GameConfig, GameLoop, InteractiveController,
        OutputFormat, PlayerController, RandomController, RoundController, RoundEvent,
        VerbosityLevel,
    },
    storage::{file::DEFAULT_STATS_FILE, JsonFileStatsStore, StatsStore},
    tournament::{print_report, run_simulation},
    Result, RpslsError,
};
use std::path::PathBuf;

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

/// Output format for the stats command and for diagnostics
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(name = "rpsls")]
#[command(about = "Rock Paper Scissors Lizard Spock", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play rounds against the computer
    Play {
        /// Statistics file
        #[arg(long, default_value = DEFAULT_STATS_FILE)]
        stats_file: PathBuf,

        /// Stop after this many rounds (default: until you quit)
        #[arg(long)]
        rounds: Option<u32>,

        /// Seed the computer's moves for a reproducible session
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the countdown and reveal delays
        #[arg(long)]
        fast: bool,

        /// Verbosity level for diagnostics (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "minimal", short = 'v')]
        verbosity: VerbosityArg,

        /// Diagnostic log lines as text or one JSON object per line
        #[arg(long, value_enum, default_value = "text")]
        log_format: FormatArg,

        /// Play these moves instead of prompting (space or comma separated, e.g. "rock spock 3")
        #[arg(long = "move", value_name = "MOVES")]
        moves: Option<String>,
    },

    /// Show lifetime statistics
    Stats {
        /// Statistics file
        #[arg(long, default_value = DEFAULT_STATS_FILE)]
        stats_file: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,
    },

    /// Print what beats what
    Rules,

    /// Run a parallel random-vs-random simulation
    Simulate {
        /// Number of rounds to play
        #[arg(long, default_value = "10000")]
        rounds: u64,

        /// Set random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            stats_file,
            rounds,
            seed,
            fast,
            verbosity,
            log_format,
            moves,
        } => {
            let options = PlayOptions {
                rounds,
                seed,
                fast,
                verbosity: verbosity.into(),
                log_format: log_format.into(),
            };
            run_play(stats_file, options, moves).await
        }
        Commands::Stats { stats_file, format } => run_stats(stats_file, format),
        Commands::Rules => {
            for line in rules_lines() {
                println!("{line}");
            }
            Ok(())
        }
        Commands::Simulate { rounds, seed } => {
            let report = run_simulation(rounds, seed)?;
            print_report(&report);
            Ok(())
        }
    }
}

/// Print one event the way the toasts read
fn render_event(event: &RoundEvent) {
    if let EventKind::PersistenceFailed { .. } = event.kind {
        if let Some(text) = event.describe() {
            eprintln!("{text}");
        }
        return;
    }

    if let Some(text) = event.describe() {
        println!("{text}");
    }

    if event.kind == EventKind::Settled {
        let stats = &event.stats;
        println!(
            "Wins {} | Losses {} | Ties {} | Win Rate {:.1}% | Best Streak {}",
            stats.wins,
            stats.losses,
            stats.ties,
            stats.win_rate(),
            stats.best_streak
        );
    }
}

struct PlayOptions {
    rounds: Option<u32>,
    seed: Option<u64>,
    fast: bool,
    verbosity: VerbosityLevel,
    log_format: OutputFormat,
}

async fn run_play(stats_file: PathBuf, options: PlayOptions, moves: Option<String>) -> Result<()> {
    let PlayOptions {
        rounds,
        seed,
        fast,
        verbosity,
        log_format,
    } = options;

    let config = if fast {
        GameConfig::instant()
    } else {
        GameConfig::default()
    };

    let opponent = match seed {
        Some(seed) => RandomController::with_seed(seed),
        None => RandomController::new(),
    };

    let mut round = RoundController::new(
        config,
        JsonFileStatsStore::new(&stats_file),
        Box::new(opponent),
    )?
    .with_verbosity(verbosity)
    .with_sink(render_event);
    round.logger.set_output_format(log_format);

    let mut player: Box<dyn PlayerController> = match moves {
        Some(script) => Box::new(FixedScriptController::parse(&script)?),
        None => {
            println!("Rock Paper Scissors Lizard Spock");
            println!("Enter a move (1-5 or a name), 'rules', 'stats' or 'quit'.");
            Box::new(InteractiveController::new())
        }
    };

    let mut game_loop = GameLoop::new(&mut round);
    if let Some(rounds) = rounds {
        game_loop = game_loop.with_max_rounds(rounds);
    }

    if fast {
        game_loop.run_session(&mut *player)?;
    } else {
        game_loop.run_session_realtime(&mut *player).await?;
    }

    // Statistics stay in memory for the session; a last failed save is only reported
    if round.has_pending_write() {
        if let Err(e) = round.flush() {
            round
                .logger
                .persistence_warning(&format!("{e}; statistics from this session were not saved"));
        }
    }
    Ok(())
}

fn run_stats(stats_file: PathBuf, format: FormatArg) -> Result<()> {
    let store = JsonFileStatsStore::new(&stats_file);
    let stats = match store.load() {
        Ok(stats) => stats.unwrap_or_default(),
        Err(e) => {
            eprintln!("warning: {e}; showing empty statistics");
            StatsRecord::default()
        }
    };

    match format {
        FormatArg::Text => {
            println!("Statistics ({})", stats_file.display());
            println!("  Wins:        {}", stats.wins);
            println!("  Losses:      {}", stats.losses);
            println!("  Ties:        {}", stats.ties);
            println!("  Total games: {}", stats.total_games());
            println!("  Win rate:    {:.1}%", stats.win_rate());
            println!("  Streak:      {}", stats.streak);
            println!("  Best streak: {}", stats.best_streak);
        }
        FormatArg::Json => {
            let value = serde_json::json!({
                "wins": stats.wins,
                "losses": stats.losses,
                "ties": stats.ties,
                "streak": stats.streak,
                "bestStreak": stats.best_streak,
                "totalGames": stats.total_games(),
                "winRate": stats.win_rate(),
            });
            let text = serde_json::to_string_pretty(&value)
                .map_err(|e| RpslsError::SerializationError(e.to_string()))?;
            println!("{text}");
        }
    }
    Ok(())
}
