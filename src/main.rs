use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use sortviz::{
    core::{
        input::parse_custom,
        sink::{SinkError, SinkSnapshot, VisualSink},
    },
    engine::registry::{Algorithm, CompileError, compile},
    runtime::{
        events::PlaybackEvent,
        handle::{RuntimeConfig, RuntimeError, spawn_player},
    },
    types::{Delay, Value},
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("delay must be between 1 and 200 ms, got {0}")]
    Delay(u64),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Algorithms => {
            for algo in Algorithm::ALL {
                println!("{algo}");
            }
            Ok(())
        }
        Commands::Compile {
            algorithm,
            values,
            json,
        } => run_compile(&algorithm, &values, json),
        Commands::Play {
            algorithm,
            array,
            delay,
        } => run_play(&algorithm, &array, delay).await,
    }
}

fn run_compile(algorithm: &str, values: &str, json: bool) -> Result<(), CliError> {
    let algorithm = resolve(algorithm);
    let input = parse_custom(values)?;
    let log = compile(algorithm, &input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
        return Ok(());
    }

    let counts = log.counts();
    let sorted = log.replay(&input).map_err(SinkError::from)?;
    println!("{algorithm}: {} ops", log.len());
    println!(
        "  compares={} swaps={} overwrites={} marks={}",
        counts.compares, counts.swaps, counts.overwrites, counts.marks
    );
    println!("  result: {sorted:?}");
    Ok(())
}

async fn run_play(algorithm: &str, array: &ArrayArgs, delay: u64) -> Result<(), CliError> {
    let algorithm = resolve(algorithm);
    let initial_delay = Delay::from_millis(delay).ok_or(CliError::Delay(delay))?;
    let sink = array.build()?;
    tracing::info!(%algorithm, len = sink.len(), delay_ms = delay, "starting playback");

    let config = RuntimeConfig {
        initial_delay,
        ..RuntimeConfig::default()
    };
    let handle = spawn_player(sink, config);
    let mut events = handle.subscribe();

    print_frame(&handle.snapshot().await?);
    handle.sort(algorithm).await?;

    loop {
        match events.recv().await {
            Ok(PlaybackEvent::Progress { .. }) => print_frame(&handle.snapshot().await?),
            Ok(PlaybackEvent::Completed { ops }) => {
                println!("Status: Completed ({ops} ops)");
                break;
            }
            Ok(PlaybackEvent::Stopped { applied }) => {
                println!("Status: Stopped after {applied} ops");
                break;
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "renderer fell behind");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }

    handle.shutdown().await?;
    Ok(())
}

fn resolve(name: &str) -> Algorithm {
    name.parse().unwrap_or_else(|err| {
        tracing::warn!(%err, "falling back to {}", Algorithm::default());
        Algorithm::default()
    })
}

fn print_frame(frame: &SinkSnapshot) {
    let row: Vec<String> = frame
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if Some(i) == frame.highlight_a || Some(i) == frame.highlight_b {
                format!("[{v}]")
            } else if frame.finalized.binary_search(&i).is_ok() {
                format!("{v}.")
            } else {
                v.to_string()
            }
        })
        .collect();
    println!("{}", row.join(" "));
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Step-by-step sorting visualizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available algorithms.
    Algorithms,
    /// Compile an algorithm over an array and print its operation log.
    Compile {
        /// Algorithm name, e.g. "Quick Sort" or "quick".
        algorithm: String,
        /// Comma-separated positive integers.
        #[arg(short, long)]
        values: String,
        /// Print the full log as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Animate an algorithm in the terminal.
    Play {
        /// Algorithm name, e.g. "Quick Sort" or "quick".
        algorithm: String,
        #[command(flatten)]
        array: ArrayArgs,
        /// Milliseconds between steps (1..=200).
        #[arg(short, long, default_value_t = 80)]
        delay: u64,
    },
}

#[derive(clap::Args, Debug)]
struct ArrayArgs {
    /// Comma-separated positive integers; overrides random generation.
    #[arg(short, long)]
    values: Option<String>,
    /// Random array length.
    #[arg(short, long, default_value_t = 80)]
    size: usize,
    /// Exclusive upper bound for random values.
    #[arg(short, long, default_value_t = 405)]
    max: Value,
    /// Seed for reproducible random arrays.
    #[arg(long)]
    seed: Option<u64>,
}

impl ArrayArgs {
    fn build(&self) -> Result<VisualSink, SinkError> {
        let mut sink = VisualSink::default();
        match (&self.values, self.seed) {
            (Some(values), _) => sink.load_custom(parse_custom(values)?)?,
            (None, Some(seed)) => {
                sink.generate_random_with(&mut StdRng::seed_from_u64(seed), self.size, self.max)?;
            }
            (None, None) => sink.generate_random(self.size, self.max)?,
        }
        Ok(sink)
    }
}
