use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use freight_audit::config::{self, Settings};
use freight_audit::output::{self, JsonReport};
use freight_audit::table::{artifact_path, write_report};
use freight_audit::{audit_manifest, AuditError, AuditReport};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_DATA: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Audit one or more shipment manifests
    Process {
        /// Spreadsheet manifests (.xlsx, .xlsm, .xls, .ods)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Worksheet to read (defaults to the first one)
        #[arg(long)]
        sheet: Option<String>,

        /// Directory for the processed workbooks (defaults to each input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Report only, do not write the processed workbook
        #[arg(long)]
        no_write: bool,
    },
    /// Print the effective tariff schedule
    Tariff,
    /// Write a config file with the built-in defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "freight-audit")]
#[command(
    about = "Freight tariff reconciliation for carrier shipment manifests",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/freight-audit/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &AuditError) -> i32 {
    match err {
        AuditError::MissingInput(_) | AuditError::Read(_) | AuditError::Output { .. } => EXIT_INPUT,
        AuditError::Schema(_) | AuditError::Computation { .. } => EXIT_DATA,
    }
}

/// Load and validate the whole config before any manifest is touched.
/// Exits with the configuration code on failure.
fn load_settings(path: Option<PathBuf>) -> Settings {
    let config = match config::load_config(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    match config.resolve() {
        Ok(s) => s,
        Err(errors) => {
            eprintln!("Config errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let use_colors = output::should_use_colors();

    let code = match cli.command {
        Commands::Init { force } => match config::write_default_config(cli.config, force) {
            Ok(path) => {
                println!("Config written to {}", path.display());
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                EXIT_CONFIG
            }
        },
        Commands::Tariff => {
            let settings = load_settings(cli.config);
            println!(
                "{}",
                output::format_tariff_table(
                    &settings.schedule,
                    &settings.output.number_format,
                    use_colors
                )
            );
            EXIT_SUCCESS
        }
        Commands::Process {
            files,
            sheet,
            output_dir,
            format,
            no_write,
        } => {
            let settings = load_settings(cli.config);
            let options = ProcessOptions {
                sheet: sheet.as_deref(),
                output_dir: output_dir.as_deref(),
                write: !no_write,
            };
            run_process(&files, &settings, &options, format, use_colors)
        }
    };

    std::process::exit(code);
}

struct ProcessOptions<'a> {
    sheet: Option<&'a str>,
    output_dir: Option<&'a Path>,
    write: bool,
}

/// Outcome of one manifest: the report and where its artifact went.
struct Processed {
    input: PathBuf,
    artifact: Option<PathBuf>,
    report: AuditReport,
}

fn process_file(
    input: &Path,
    settings: &Settings,
    options: &ProcessOptions<'_>,
) -> Result<Processed, AuditError> {
    let start = Instant::now();
    let report = audit_manifest(input, options.sheet, &settings.schedule, &settings.aliases)?;

    let artifact = if options.write {
        let path = artifact_path(input, options.output_dir, &settings.output.suffix);
        write_report(&report, &path, &settings.output)?;
        Some(path)
    } else {
        None
    };

    tracing::debug!(input = %input.display(), elapsed = ?start.elapsed(), "manifest processed");
    Ok(Processed {
        input: input.to_path_buf(),
        artifact,
        report,
    })
}

/// Process every file independently; a failure on one does not stop the rest.
/// Returns the exit code of the most recent failure, or success.
fn run_process(
    files: &[PathBuf],
    settings: &Settings,
    options: &ProcessOptions<'_>,
    format: OutputFormat,
    use_colors: bool,
) -> i32 {
    let mut code = EXIT_SUCCESS;
    let mut processed = Vec::with_capacity(files.len());

    if let Some(dir) = options.output_dir {
        if options.write {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("Failed to create output directory {}: {}", dir.display(), e);
                return EXIT_INPUT;
            }
        }
    }

    for input in files {
        match process_file(input, settings, options) {
            Ok(p) => processed.push(p),
            Err(e) => {
                eprintln!("{}: {}", input.display(), e);
                code = exit_code(&e);
            }
        }
    }

    match format {
        OutputFormat::Table => {
            for (i, p) in processed.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_table_report(p, settings, use_colors);
            }
        }
        OutputFormat::Json => {
            let reports: Vec<JsonReport<'_>> = processed
                .iter()
                .map(|p| JsonReport::new(&p.input, p.artifact.as_deref(), &p.report))
                .collect();
            match output::format_json(&reports) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Failed to render JSON report: {}", e);
                    code = EXIT_INPUT;
                }
            }
        }
    }

    code
}

fn print_table_report(p: &Processed, settings: &Settings, use_colors: bool) {
    let report = &p.report;
    println!(
        "{} ({} rows, {} schema, {} need review, {} duplicated)",
        p.input.display(),
        report.rows.len(),
        report.variant.as_str(),
        report.needs_review_count(),
        report.duplicate_count()
    );
    println!(
        "{}",
        output::format_summary_table(&report.summary, &settings.output.number_format, use_colors)
    );
    if let Some(artifact) = &p.artifact {
        println!("Written to {}", artifact.display());
    }
}
