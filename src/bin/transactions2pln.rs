//! transactions2pln CLI - adds PLN values to a CSV file of transactions
//!
//! ## Example Usage
//!
//! ```bash
//! # Amounts in the last column, dates found automatically, USD
//! transactions2pln transactions.csv -f %Y/%m/%d
//!
//! # Currency read from column E, amounts from column F, JSON output
//! transactions2pln transactions.csv -c E -a F -d D -f %Y/%m/%d --json -o out.json
//! ```
//!
//! Exit status: 0 on success, 1 uncategorized error, 2 environment or
//! network error, 3 input/output error, 4 column option error, 5 row
//! processing error.

use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tempfile::TempDir;
use transactions2pln::config::Settings;
use transactions2pln::error::Result;
use transactions2pln::output::{DelimitedSink, JsonArraySink, RowSink};
use transactions2pln::pipeline::{input_reader, read_rows, ConversionOptions, Converter};
use transactions2pln::rates::HttpTableFetcher;

/// Adds PLN values to a CSV file of transactions
#[derive(Parser)]
#[command(name = "transactions2pln")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Adds PLN values to a CSV file of transactions", long_about = None)]
struct Cli {
    /// Path to the CSV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; standard output when not given
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Write results as JSON
    #[arg(short = 'j', long)]
    json: bool,

    /// Column with transaction amounts: header, number or letter.
    /// Default: the last column
    #[arg(short = 'a', long)]
    amount_column: Option<String>,

    /// Transaction currency: a three-letter code, or a column header,
    /// number or letter. Default: USD
    #[arg(short = 'c', long)]
    currency: Option<String>,

    /// Column with transaction dates: header, number or letter.
    /// Default: the first cell in each row that parses as a date
    #[arg(short = 'd', long)]
    date_column: Option<String>,

    /// strftime-style format of transaction dates. Default: %d.%m.%Y
    #[arg(short = 'f', long)]
    date_format: Option<String>,

    /// Do not treat the first row as column headers
    #[arg(short = 'l', long = "no-labels")]
    no_labels: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Output file created on the first write, so a run that fails before
/// producing output leaves no file behind
struct LazyFile {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl LazyFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file: None,
        }
    }
}

impl Write for LazyFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let file = match self.file {
            Some(ref mut file) => file,
            None => self.file.insert(BufWriter::new(File::create(&self.path)?)),
        };
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file {
            Some(ref mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref());

    let options = ConversionOptions {
        currency: cli.currency.unwrap_or_else(|| settings.currency.clone()),
        amount_column: cli.amount_column,
        date_column: cli.date_column,
        date_format: cli.date_format.unwrap_or_else(|| settings.date_format.clone()),
        labels: !cli.no_labels,
        number_format: settings.number_format,
    };

    let input = File::open(&cli.input)?;
    let rows = read_rows(input_reader(input));

    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(LazyFile::new(path)),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink: Box<dyn RowSink> = if cli.json {
        Box::new(JsonArraySink::new(output))
    } else {
        Box::new(DelimitedSink::new(output))
    };

    // removed on drop, whether or not the run succeeds
    let scratch = TempDir::new()?;
    let fetcher = Arc::new(HttpTableFetcher::new(settings.http_timeout())?);

    let converter =
        Converter::new(options).with_source_name(cli.input.display().to_string());
    let summary = converter.run_with_nbp(
        rows,
        sink.as_mut(),
        fetcher,
        scratch.path(),
        Some(&settings.table_url),
    )?;

    drop(sink);
    // empty CSV output still produces a file
    if let Some(path) = &cli.output {
        if !path.exists() {
            File::create(path)?;
        }
    }

    log::info!(
        "Wrote {} rows ({} tables, year {:?})",
        summary.rows,
        summary.tables_fetched,
        summary.year
    );
    Ok(())
}
