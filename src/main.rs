use clap::{Parser, Subcommand, ValueEnum};
use secbridge::config;
use secbridge::pipeline::{Direction, PipelineAction};
use secbridge::telemetry::init_logging;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "secbridge")]
#[command(about = "Security pipeline for a dual-interface Ethernet bridge")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Report platform capabilities and the loaded policy
    Status {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Run hex-encoded frames through the pipeline and print verdicts
    Check {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Frame direction
        #[arg(short, long, value_enum, default_value = "outbound")]
        direction: DirectionArg,

        /// Hex-encoded frames; read from stdin (one per line) when empty
        frames: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config.toml without building a pipeline
    Validate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Outbound,
    Inbound,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Outbound => Direction::Outbound,
            DirectionArg::Inbound => Direction::Inbound,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config {
            action: ConfigAction::Validate { config },
        } => cmd_validate(&config),
        Commands::Status { config } => cmd_status(&config),
        Commands::Check {
            config,
            direction,
            frames,
        } => cmd_check(&config, direction.into(), frames),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

fn cmd_validate(path: &PathBuf) -> secbridge::Result<()> {
    init_logging(None);

    let cfg = config::load(path)?;
    let result = config::validate(&cfg);
    result.print_diagnostics();

    if result.has_errors() {
        std::process::exit(1);
    }
    println!("Configuration OK");
    Ok(())
}

fn cmd_status(path: &PathBuf) -> secbridge::Result<()> {
    let cfg = config::load(path)?;
    init_logging(Some(&(&cfg.log).into()));

    let pipeline = config::build_pipeline(&cfg)?;
    let platform = config::platform(&cfg);
    platform.report_status();

    println!("filter mode:       {:?}", pipeline.mac_filter().mode());
    println!(
        "allowed addresses: {}",
        pipeline.mac_filter().allowed_count()
    );
    println!(
        "blocked addresses: {}",
        pipeline.mac_filter().blocked_count()
    );
    println!(
        "blocked ports:     {}",
        pipeline.inspector().blocked_port_count()
    );
    println!(
        "cipher:            {}",
        match (pipeline.cipher().is_enabled(), pipeline.cipher().has_key()) {
            (true, true) => "enabled",
            (true, false) => "enabled (no key, pass-through)",
            (false, _) => "disabled",
        }
    );
    Ok(())
}

fn cmd_check(path: &PathBuf, direction: Direction, frames: Vec<String>) -> secbridge::Result<()> {
    let cfg = config::load(path)?;
    init_logging(Some(&(&cfg.log).into()));

    let pipeline = config::build_pipeline(&cfg)?;

    let inputs: Vec<String> = if frames.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect()
    } else {
        frames
    };

    for (i, input) in inputs.iter().enumerate() {
        let bytes = hex::decode(input.trim())
            .map_err(|e| secbridge::Error::Parse(format!("frame {}: {e}", i + 1)))?;

        match pipeline.process(&bytes, direction) {
            PipelineAction::Forward { frame } => {
                println!("frame {}: forward ({} bytes)", i + 1, frame.len());
            }
            PipelineAction::Drop { reason } => {
                println!("frame {}: drop ({})", i + 1, reason);
            }
        }
    }

    let stats = pipeline.stats();
    println!(
        "{} forwarded, {} dropped",
        stats.frames_forwarded.get(),
        stats.dropped_total()
    );
    Ok(())
}
