use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use surveygraph::data::SurveyTable;
use surveygraph::selection::ColumnRoles;
use surveygraph::{ingest, runtime, ChartOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "surveygraph")]
#[command(about = "Generate one stacked bar chart per survey question, bundled as a ZIP", long_about = None)]
struct Args {
    /// Survey file (.csv or .xlsx), or '-' to read CSV from stdin
    input: String,

    /// Column holding the age group of each respondent
    #[arg(long = "age")]
    age_column: String,

    /// Column holding the question text
    #[arg(long = "question")]
    question_column: String,

    /// Column holding the answer value
    #[arg(long = "answer")]
    answer_column: String,

    /// Where to write the archive
    #[arg(short, long, default_value = "graphs.zip")]
    output: PathBuf,

    /// JSON file with chart options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the first N rows after loading
    #[arg(long, value_name = "N")]
    preview: Option<usize>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!(?args, "Arguments");

    let options = match &args.config {
        Some(path) => ChartOptions::from_json_file(path)?,
        None => ChartOptions::default(),
    };

    let mut table = match read_input(&args.input)? {
        Some(table) => table,
        None => {
            eprintln!("Error: unsupported file format for '{}' (expected .csv or .xlsx)", args.input);
            std::process::exit(1);
        }
    };

    table.fill_nulls();

    if let Some(n) = args.preview {
        print!("{}", table.head(n).to_text_grid());
    }

    let roles = ColumnRoles::new(args.age_column, args.question_column, args.answer_column);
    if let Err(e) = roles.validate(&table) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let archive = runtime::render_survey_archive(&table, &roles, &options)
        .context("Failed to generate charts")?;

    std::fs::write(&args.output, archive.get_ref())
        .context(format!("Failed to write '{}'", args.output.display()))?;

    info!(output = %args.output.display(), "Wrote archive");
    println!("Bar graphs are generated: {}", args.output.display());

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Load the input table; `None` means the format is not supported
fn read_input(input: &str) -> Result<Option<SurveyTable>> {
    if input == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read CSV from stdin")?;
        return ingest::load_table_from_reader("stdin.csv", buf.as_slice());
    }
    ingest::load_table(std::path::Path::new(input))
}
