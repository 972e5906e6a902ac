use clap::{Parser, Subcommand};
use iban_gen::logging;
use iban_gen::reference::{is_supported_country, SUPPORTED_COUNTRIES};
use iban_gen::{BankDirectory, BankRecord, Iban, IbanGenerator, COUNTRY_CODE_DE};
use serde::Serialize;
use std::fs::create_dir_all;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

static BUNDLED_BANK_DATA: &[u8] = include_bytes!("../data/bundesbank.txt");

#[derive(Parser)]
#[command(name = "iban-gen")]
#[command(about = "Synthetic IBAN generator for German bank codes", long_about = None)]
#[command(version)]
struct Cli {
    /// Bank directory feed to load instead of the bundled Bundesbank data.
    #[arg(long, global = true)]
    bank_data: Option<PathBuf>,
    /// One of all, debug, info, warn, error, none. Falls back to IBANGEN_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate IBANs for a BIC, a bank code, or a random bank.
    Random(RandomArgs),
    /// List or search the bank directory.
    Bics(BicsArgs),
    /// Print the supported country codes.
    Countries,
}

#[derive(Parser)]
struct RandomArgs {
    #[arg(long, default_value = COUNTRY_CODE_DE)]
    country: String,
    #[arg(long, conflicts_with = "bank_code")]
    bic: Option<String>,
    #[arg(long)]
    bank_code: Option<String>,
    #[arg(long, default_value_t = 1)]
    count: usize,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct BicsArgs {
    /// Case-insensitive bank name filter, closest matches first.
    #[arg(long)]
    bank: Option<String>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct IbanRow {
    iban: String,
    bank_code: String,
    bic: Option<String>,
}

impl IbanRow {
    fn new(iban: &Iban, bic: Option<&str>) -> Self {
        IbanRow {
            iban: iban.to_string(),
            bank_code: iban.bank_code().to_string(),
            bic: bic.map(str::to_string),
        }
    }
}

/// Where generated IBANs come from for one `random` invocation.
#[derive(Debug, PartialEq, Eq)]
enum IbanSource {
    Bic { bic: String, bank_code: String },
    BankCode(String),
    Random,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let level = cli
        .log_level
        .as_deref()
        .map(logging::parse_level)
        .transpose()?;
    logging::init_logging("iban-gen", level)?;
    match cli.command {
        Command::Random(args) => run_random(cli.bank_data.as_deref(), args),
        Command::Bics(args) => run_bics(cli.bank_data.as_deref(), args),
        Command::Countries => run_countries(),
    }
}

fn run_random(bank_data: Option<&Path>, args: RandomArgs) -> Result<(), String> {
    let country = resolve_country(&args.country)?;
    let source = match non_empty(args.bic.as_deref()) {
        Some(bic) => {
            let directory = load_directory(bank_data)?;
            resolve_bic(&directory, bic)?
        }
        None => match non_empty(args.bank_code.as_deref()) {
            Some(bank_code) => IbanSource::BankCode(bank_code.to_string()),
            None => IbanSource::Random,
        },
    };

    let generator = match args.seed {
        Some(seed) => IbanGenerator::with_seed(seed),
        None => IbanGenerator::from_time(),
    };
    let rows = generate_rows(&generator, &country, &source, args.count)?;

    match args.output {
        Some(path) => {
            write_csv(&path, &rows)?;
            emit_info_line(&format!(
                "Wrote {} IBAN(s) to {}",
                rows.len(),
                path.display()
            ));
        }
        None => {
            for row in &rows {
                println!("{}", row.iban);
            }
        }
    }
    Ok(())
}

fn resolve_country(value: &str) -> Result<String, String> {
    let code = value.trim().to_uppercase();
    if is_supported_country(&code) {
        Ok(code)
    } else {
        Err(format!(
            "unsupported country {}; supported: {}",
            value,
            SUPPORTED_COUNTRIES.join(", ")
        ))
    }
}

fn resolve_bic(directory: &BankDirectory, bic: &str) -> Result<IbanSource, String> {
    let bank_code = directory
        .lookup_bank_code(bic)
        .ok_or_else(|| format!("unknown bic {}", bic))?;
    Ok(IbanSource::Bic {
        bic: bic.to_string(),
        bank_code: bank_code.to_string(),
    })
}

fn generate_rows(
    generator: &IbanGenerator,
    country: &str,
    source: &IbanSource,
    count: usize,
) -> Result<Vec<IbanRow>, String> {
    let mut rows = Vec::with_capacity(count);
    for _ in 0..count {
        let row = match source {
            IbanSource::Bic { bic, bank_code } => {
                let iban = generator
                    .generate_from_bank_code(country, bank_code)
                    .map_err(|err| format!("directory entry for {} is unusable: {}", bic, err))?;
                IbanRow::new(&iban, Some(bic))
            }
            IbanSource::BankCode(bank_code) => {
                let iban = generator
                    .generate_from_bank_code(country, bank_code)
                    .map_err(|err| err.to_string())?;
                IbanRow::new(&iban, None)
            }
            IbanSource::Random => {
                let iban = generator
                    .generate_for_country(country)
                    .map_err(|err| err.to_string())?;
                IbanRow::new(&iban, None)
            }
        };
        rows.push(row);
    }
    Ok(rows)
}

fn run_bics(bank_data: Option<&Path>, args: BicsArgs) -> Result<(), String> {
    let directory = load_directory(bank_data)?;
    let records = directory.search_by_name(args.bank.as_deref().unwrap_or(""));

    match args.output {
        Some(path) => {
            write_csv(&path, &records)?;
            emit_info_line(&format!(
                "Wrote {} bank record(s) to {}",
                records.len(),
                path.display()
            ));
        }
        None => {
            for record in &records {
                println!("{}", format_record(record));
            }
        }
    }
    Ok(())
}

fn run_countries() -> Result<(), String> {
    for code in SUPPORTED_COUNTRIES {
        println!("{code}");
    }
    Ok(())
}

fn load_directory(path: Option<&Path>) -> Result<BankDirectory, String> {
    let start = Instant::now();
    let mut directory = BankDirectory::new();
    match path {
        Some(path) => {
            directory
                .load_from_path(path)
                .map_err(|err| format!("{}: {}", path.display(), err))?;
        }
        None => {
            let count = directory
                .load(Cursor::new(BUNDLED_BANK_DATA))
                .map_err(|err| format!("bundled bank data: {}", err))?;
            log::info!("loaded {} bank records from bundled data", count);
        }
    }
    log::debug!(
        "bank directory ready with {} entries in {} ms",
        directory.len(),
        start.elapsed().as_millis()
    );
    Ok(directory)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn format_record(record: &BankRecord) -> String {
    format!(
        "{}\t{}\t{}",
        record.bic(),
        record.country_code(),
        record.bank_name()
    )
}

fn write_csv<T: Serialize>(output: &Path, rows: &[T]) -> Result<(), String> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|err| err.to_string())?;
        }
    }
    let mut writer = csv::Writer::from_path(output).map_err(|err| err.to_string())?;
    for row in rows {
        writer.serialize(row).map_err(|err| err.to_string())?;
    }
    writer.flush().map_err(|err| err.to_string())
}

fn emit_info_line(message: &str) {
    if log::log_enabled!(log::Level::Info) {
        log::info!("{}", message);
    } else {
        eprintln!("{message}");
    }
}
