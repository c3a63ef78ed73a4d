#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use parlance::config::Config;
use parlance::dialogue::{
    ConfirmStatus, DialogueItem, DialogueState, Role, compute_new_state, compute_prediction,
    create_constants, prepare_context, ConstantType, DeltaEntry, Prediction,
};
use parlance::executor::{Executor, SimulationExecutor};
use parlance::predictor::RemotePredictor;
use parlance::program::{Program, ProgramCodec, TokenCodec};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "parlance", about = "Dialogue-state prediction server and tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway in front of a remote predictor.
    Serve {
        /// Path to config.toml; defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate seeded self-play turns and print training pairs as JSON lines.
    Simulate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        turns: usize,
        /// Overrides the seed from config.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config, host, port } => {
            let mut config = Config::load_or_default(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let predictor = Arc::new(RemotePredictor::new(
                &config.predictor.url,
                Some(config.predictor.timeout_secs),
            ));
            let codec = Arc::new(TokenCodec::new());
            parlance::gateway::run_gateway(&config, predictor, codec).await
        }
        Commands::Simulate { config, turns, seed } => {
            let config = Config::load_or_default(config.as_deref())?;
            let seed = seed.unwrap_or(config.simulator.seed);
            run_simulation(turns, seed).await
        }
    }
}

/// Self-play generation: append a confirmed command each turn, execute it
/// through the simulator, and emit `(context, prediction)` training pairs.
async fn run_simulation(turns: usize, seed: u64) -> Result<()> {
    const FUNCTIONS: [&str; 3] = ["get_current_weather", "search_restaurants", "book_table"];

    let executor = SimulationExecutor::new(seed);
    let codec = TokenCodec::new();
    let numbers = create_constants("NUMBER", ConstantType::Number, turns.max(1));

    let mut state = DialogueState::new();
    for turn in 0..turns {
        let old = state.clone();

        let constant = &numbers[turn % numbers.len()];
        let program = Program::new(FUNCTIONS[turn % FUNCTIONS.len()])
            .with_arg("count", constant.value.clone());

        let mut append = Prediction::empty();
        append.push(DeltaEntry::Append {
            item: DialogueItem::new(program.clone(), ConfirmStatus::Confirmed),
        });
        state = compute_new_state(&state, &append, Role::User)?;

        let results = executor.execute(&program).await?;
        let attach = Prediction::attach_results(state.len() - 1, results);
        state = compute_new_state(&state, &attach, Role::User)?;

        let prediction = compute_prediction(&old, &state, Role::User);
        let context = prepare_context(&old, Role::User);
        println!(
            "{}",
            serde_json::json!({
                "turn": turn,
                "context": context.to_tokens(&codec).join(" "),
                "prediction": codec.serialize_prediction(&prediction).join(" "),
                "state": state,
            })
        );
    }
    Ok(())
}
