//! WHEELWATCH — roulette column/tier pattern analysis
//!
//! Entry point. Loads configuration, initialises structured logging and
//! dispatches to one of the subcommands: one-shot analysis, a random
//! history, an interactive session on stdin, or the JSON API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use wheelwatch::analysis::report::AnalysisResult;
use wheelwatch::config::AppConfig;
use wheelwatch::dashboard::{self, ApiState};
use wheelwatch::session::{parse_draw_list, HistorySnapshot, Session, SessionCommand};

const BANNER: &str = r#"
__        ___   _ _____ _____ _     __        ___  _____ ____ _   _
\ \      / / | | | ____| ____| |    \ \      / / \|_   _/ ___| | | |
 \ \ /\ / /| |_| |  _| |  _| | |     \ \ /\ / / _ \ | || |   | |_| |
  \ V  V / |  _  | |___| |___| |___   \ V  V / ___ \| || |___|  _  |
   \_/\_/  |_| |_|_____|_____|_____|   \_/\_/_/   \_\_| \____|_| |_|

  Column & tier absence / no-repetition tracker
"#;

#[derive(Parser)]
#[command(name = "wheelwatch")]
#[command(about = "Column and tier pattern analysis for European roulette")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a history given most recent first
    Analyze {
        /// Draws, separated by spaces or commas
        #[arg(required = true, allow_negative_numbers = true)]
        draws: Vec<String>,
        /// Highest stake of the bet series
        #[arg(short, long)]
        max_stake: Option<u32>,
    },
    /// Generate and analyze a random history
    Random {
        /// Number of draws
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Seed for a reproducible history
        #[arg(short, long)]
        seed: Option<u64>,
        /// Highest stake of the bet series
        #[arg(short, long)]
        max_stake: Option<u32>,
    },
    /// Enter spins one per line and follow the progression
    Session {
        /// Highest stake of the bet series
        #[arg(short, long)]
        max_stake: Option<u32>,
    },
    /// Run the JSON API
    Serve {
        /// Listen address
        #[arg(long)]
        host: Option<String>,
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Serialize)]
struct Output<'a> {
    history: HistorySnapshot,
    analysis: &'a AnalysisResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    init_logging();

    let cfg = AppConfig::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Analyze { draws, max_stake } => {
            let values = parse_draw_list(&draws)?;
            let mut session = new_session(&cfg, max_stake)?;
            let result = session.replace_history(&values)?;
            report(&session, &result, cli.json)?;
        }
        Commands::Random {
            count,
            seed,
            max_stake,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut session = new_session(&cfg, max_stake)?;
            let result = session.randomize(&mut rng, count)?;
            report(&session, &result, cli.json)?;
        }
        Commands::Session { max_stake } => {
            let session = new_session(&cfg, max_stake)?;
            run_session(session, cli.json).await?;
        }
        Commands::Serve { host, port } => {
            println!("{BANNER}");
            let host = host.unwrap_or_else(|| cfg.server.host.clone());
            let port = port.unwrap_or(cfg.server.port);
            info!(
                max_stake = cfg.engine.max_stake,
                min_absence = cfg.engine.min_absence,
                no_repetition_window = cfg.engine.no_repetition_window,
                "WHEELWATCH starting up"
            );
            let state = Arc::new(ApiState::new(Session::new(&cfg.engine)));
            dashboard::serve(state, &host, port).await?;
        }
    }

    Ok(())
}

fn new_session(cfg: &AppConfig, max_stake: Option<u32>) -> Result<Session> {
    let mut session = Session::new(&cfg.engine);
    if let Some(max_stake) = max_stake {
        session.set_max_stake(max_stake)?;
    }
    Ok(session)
}

/// Print one analysis, as text or JSON.
fn report(session: &Session, result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        let out = Output {
            history: session.snapshot(),
            analysis: result,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialize analysis")?
        );
        return Ok(());
    }

    if let Err(e) = session.readiness() {
        warn!(error = %e, "Not enough draws for a recommendation");
    }
    println!("History: {session}");
    println!("{result}");
    Ok(())
}

/// Read commands from stdin until EOF or `quit`.
async fn run_session(mut session: Session, json: bool) -> Result<()> {
    println!("{BANNER}");
    println!("Enter a number (0-36), or: random, reset, clear, history, max <n>, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Unrecognised input");
                continue;
            }
        };

        let outcome = match command {
            SessionCommand::Quit => break,
            SessionCommand::Draw(n) => session.add_draw(n).map(Some),
            SessionCommand::Random => session.randomize(&mut StdRng::from_entropy(), None).map(Some),
            SessionCommand::Reset => {
                session.reset_progression();
                println!("Progression reset");
                Ok(None)
            }
            SessionCommand::Clear => {
                session.clear();
                println!("History cleared");
                Ok(None)
            }
            SessionCommand::History => {
                println!("History: {session}");
                Ok(None)
            }
            SessionCommand::MaxStake(max) => session.set_max_stake(max).map(|()| {
                println!("Max stake set to {max}");
                None
            }),
        };

        match outcome {
            Ok(Some(result)) => report(&session, &result, json)?,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Input rejected"),
        }
    }

    info!(draws = session.history().len(), "Session ended");
    Ok(())
}

/// Initialise the `tracing` subscriber. Logs go to stderr so that
/// `--json` output on stdout stays machine-readable.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wheelwatch=info"));

    let json_logging = std::env::var("WHEELWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
