// src/main.rs
mod docx;
mod extractors;
mod model;
mod selector;
mod utils;

use clap::Parser;
use extractors::items::ItemExtractor;
use model::QuotaCondition;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use utils::AppError;

/// Command Line Interface for the question bank exam generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the question bank document (.docx)
    #[arg(short, long)]
    bank: PathBuf,

    /// Path to the test matrix file (JSON array of quota conditions)
    #[arg(short, long)]
    matrix: PathBuf,

    /// Output path for the assembled exam document
    #[arg(short, long, default_value = "exam.docx")]
    output: PathBuf,

    /// Title printed at the top of the exam
    #[arg(long, default_value = "ĐỀ KIỂM TRA")]
    title: String,

    /// Seed for the sampling RNG (a fresh random draw when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Debug mode - dump the parsed items as JSON next to the output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting exam assembly for args: {:?}", args);

    // 3. Load the test matrix
    let matrix = load_matrix(&args.matrix)?;
    if matrix.is_empty() {
        return Err(AppError::Config(format!(
            "Test matrix {} contains no conditions",
            args.matrix.display()
        )));
    }

    // 4. Read the bank and extract tagged items
    let blocks = docx::reader::read_blocks(&args.bank)?;
    let items = ItemExtractor::new().parse(blocks);

    if args.debug {
        let dump_path = args.output.with_extension("items.json");
        let dump = serde_json::to_string_pretty(&items)
            .map_err(|e| AppError::Config(format!("Failed to serialize item dump: {}", e)))?;
        fs::write(&dump_path, dump)?;
        tracing::info!(
            "Dumped {} parsed items to {}",
            items.len(),
            dump_path.display()
        );
    }

    // 5. Draw questions per the matrix
    // Use seeded RNG for deterministic results, or thread RNG for random
    let mut seeded_rng;
    let mut thread_rng;
    let rng: &mut dyn rand::RngCore = match args.seed {
        Some(seed) => {
            seeded_rng = rand::rngs::StdRng::seed_from_u64(seed);
            &mut seeded_rng
        }
        None => {
            thread_rng = rand::rng();
            &mut thread_rng
        }
    };
    let selected = selector::select(&items, &matrix, rng)?;
    tracing::info!(
        "Selected {} questions across {} conditions",
        selected.len(),
        matrix.len()
    );

    // 6. Assemble and save the exam
    docx::writer::write_exam(&selected, &args.output, &args.title)?;
    tracing::info!("Exam written to {}", args.output.display());

    Ok(())
}

fn load_matrix(path: &Path) -> Result<Vec<QuotaCondition>, AppError> {
    let raw = fs::read_to_string(path)?;
    let matrix: Vec<QuotaCondition> = serde_json::from_str(&raw)?;
    tracing::debug!(
        "Loaded {} quota conditions from {}",
        matrix.len(),
        path.display()
    );
    Ok(matrix)
}
