use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use met_history::app::{App, IngestResult, ProgressSink};
use met_history::config::{ConfigLoader, ResolvedConfig};
use met_history::domain::{Region, ValueType, parse_region_slugs, parse_value_type_slug};
use met_history::error::MetError;
use met_history::metoffice::MetOfficeHttpClient;
use met_history::output::{JsonOutput, OutputMode, StderrProgress, UpsertResult};
use met_history::store::{DataStore, JsonFileStore};
use met_history::{reconcile, report, series, server};

#[derive(Parser)]
#[command(name = "met-history")]
#[command(about = "UK Met Office historical climate data: ingest, store and chart monthly series")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch every configured report and store its monthly values")]
    Ingest(IngestArgs),
    #[command(about = "Parse a report file from disk and print its data points")]
    Parse(ParseArgs),
    #[command(about = "Store a single monthly value")]
    Upsert(UpsertArgs),
    #[command(about = "Print a time series as JSON")]
    Series(SeriesArgs),
    #[command(about = "Serve time series over HTTP")]
    Serve(ServeArgs),
}

#[derive(Args)]
struct IngestArgs {
    #[arg(long = "region")]
    regions: Vec<String>,

    #[arg(long = "value-type")]
    value_types: Vec<String>,
}

#[derive(Args)]
struct ParseArgs {
    file: PathBuf,

    #[arg(long)]
    region: String,

    #[arg(long)]
    value_type: String,
}

#[derive(Args)]
struct UpsertArgs {
    region: String,

    #[arg(allow_negative_numbers = true)]
    year: i32,

    month: String,

    value_type: String,

    #[arg(allow_negative_numbers = true)]
    value: f64,
}

#[derive(Args)]
struct SeriesArgs {
    /// Value type slug, e.g. `maxtemp`.
    value_type: String,

    /// Hyphen-joined region slugs, e.g. `scotland-england`.
    regions: String,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long)]
    bind: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<MetError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MetError) -> u8 {
    match error {
        MetError::NotFound(_) | MetError::ConfigRead(_) | MetError::ConfigParse(_) => 2,
        MetError::FetchHttp(_) | MetError::FetchStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest(args) => run_ingest(args, &config, output_mode),
        Commands::Parse(args) => run_parse(args),
        Commands::Upsert(args) => run_upsert(args, &config),
        Commands::Series(args) => run_series(args, &config),
        Commands::Serve(args) => {
            let bind = args.bind.unwrap_or_else(|| config.bind.clone());
            server::run_server(&bind, &config.store_path).into_diagnostic()
        }
    }
}

fn run_ingest(
    args: IngestArgs,
    config: &ResolvedConfig,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let mut config = config.clone();
    if !args.regions.is_empty() {
        config.regions = args
            .regions
            .iter()
            .map(|value| value.parse())
            .collect::<Result<Vec<Region>, MetError>>()?;
    }
    if !args.value_types.is_empty() {
        config.value_types = args
            .value_types
            .iter()
            .map(|value| value.parse())
            .collect::<Result<Vec<ValueType>, MetError>>()?;
    }
    let targets = config.targets();

    let store = JsonFileStore::open(config.store_path.clone())?;
    let client = MetOfficeHttpClient::new(config.client.clone())?;
    let mut app = App::new(client, store);

    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::Interactive => &StderrProgress,
        OutputMode::NonInteractive => &JsonOutput,
    };
    let result = app.ingest(&targets, sink);

    match output_mode {
        OutputMode::Interactive => print_ingest_summary(&result),
        OutputMode::NonInteractive => JsonOutput::print_ingest(&result).into_diagnostic()?,
    }
    Ok(())
}

fn print_ingest_summary(result: &IngestResult) {
    let green = "\x1b[32m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    for item in &result.items {
        println!(
            "{green}{} {}: {} points ({} created, {} updated){reset}",
            item.region, item.value_type, item.points, item.created, item.updated
        );
    }
    for failure in &result.failures {
        println!(
            "{red}{} {}: {}{reset}",
            failure.region, failure.value_type, failure.error
        );
    }

    let color = if result.is_success() { green } else { red };
    println!("{color}{}{reset}", result.summary_message());
}

fn run_parse(args: ParseArgs) -> miette::Result<()> {
    let region: Region = args.region.parse()?;
    let value_type: ValueType = args.value_type.parse()?;
    let raw = std::fs::read_to_string(&args.file)
        .map_err(|err| MetError::Filesystem(format!("read {}: {err}", args.file.display())))?;
    let points = report::parse_report(&raw, region, value_type)?;
    JsonOutput::print_points(&points).into_diagnostic()
}

fn run_upsert(args: UpsertArgs, config: &ResolvedConfig) -> miette::Result<()> {
    let mut store = JsonFileStore::open(config.store_path.clone())?;
    let (point, outcome) = reconcile::upsert_raw(
        &mut store,
        &args.region,
        args.year,
        &args.month,
        &args.value_type,
        args.value,
    )?;
    store.flush()?;
    JsonOutput::print_upsert(&UpsertResult::new(&point, outcome)).into_diagnostic()
}

fn run_series(args: SeriesArgs, config: &ResolvedConfig) -> miette::Result<()> {
    let value_type = parse_value_type_slug(&args.value_type)?;
    let regions = parse_region_slugs(&args.regions)?;
    let store = JsonFileStore::open(config.store_path.clone())?;
    let series = series::assemble(value_type, &regions, &store)?;
    JsonOutput::print_series(&series).into_diagnostic()
}
