//! Command-line timetable generator.
//!
//! Usage:
//!   u-timetable institution.json                 # Random run, compact JSON
//!   u-timetable institution.json --seed 42       # Reproducible run
//!   u-timetable institution.json --pretty        # Indented JSON
//!   u-timetable institution.json --summary       # Teacher/room summary instead

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use u_timetable::models::InstitutionConfig;
use u_timetable::scheduler::{ScheduleSummary, TimetableGenerator};

#[derive(Parser)]
#[command(name = "u-timetable")]
#[command(about = "Generate weekly timetables for every stream and section")]
struct Args {
    /// Path to the institution configuration (JSON)
    config: PathBuf,

    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Print the teacher/room summary instead of the timetables
    #[arg(long)]
    summary: bool,

    /// Trial budget per subject
    #[arg(long)]
    max_attempts: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(&args.config)?;
    let config: InstitutionConfig = serde_json::from_str(&text)?;
    info!("loaded {} streams from {}", config.streams.len(), args.config.display());

    let mut generator = TimetableGenerator::new(config)?;
    if let Some(max_attempts) = args.max_attempts {
        generator = generator.with_max_attempts(max_attempts);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = generator.generate(&mut rng)?;

    let output = if args.summary {
        let summary = ScheduleSummary::calculate(&result);
        if args.pretty {
            serde_json::to_string_pretty(&summary)?
        } else {
            serde_json::to_string(&summary)?
        }
    } else if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");

    Ok(())
}
