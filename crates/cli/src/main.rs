// grantbudget - grant budget generator (headless)
//
// Scales the baseline operating and program templates to a locality, rolls
// the program lines into SF-424A categories and splits them into federal and
// match shares.

mod exit_codes;
mod extract;
mod report;
mod request;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use grantbudget_config::Settings;
use grantbudget_engine::allocate::split_match_str;
use grantbudget_engine::config::OrganizationInfo;
use grantbudget_engine::engine::{rebuild_federal, run};
use grantbudget_engine::money::format_whole_dollars;
use grantbudget_engine::{find_city_state_from_text, BudgetError, BudgetPackage, FederalRow};
use grantbudget_io::pdf::FederalPdfHeader;
use grantbudget_io::{csv as csv_io, json as json_io, pdf};

use exit_codes::{budget_exit_code, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};
use request::{apply_locality, load_request, LocalityArgs, LocalitySource, RequestArgs};

#[derive(Parser)]
#[command(name = "grantbudget")]
#[command(about = "Generate locality-scaled nonprofit grant budgets (operating, program, SF-424A)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG also works.
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Settings file (defaults to ~/.config/grantbudget/settings.json)
    #[arg(long, global = true, env = "GRANTBUDGET_SETTINGS", value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate operating, program and federal budgets and export them
    #[command(after_help = "\
Examples:
  grantbudget generate design.pdf need.pdf --match-percent 25
  grantbudget generate --request columbus.budget.toml --out budgets/
  grantbudget generate --city Boston --state MA --target 250000 --json")]
    Generate {
        /// Program design / statement of need documents (PDF or text)
        documents: Vec<PathBuf>,

        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        locality: LocalityArgs,

        /// Output directory (defaults to settings, then the current directory)
        #[arg(long, short = 'o', value_name = "DIR")]
        out: Option<PathBuf>,

        /// Skip the federal PDF
        #[arg(long)]
        no_pdf: bool,

        /// Print the budget package as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Find the locality signal in text and resolve its cost factor
    #[command(after_help = "\
Examples:
  grantbudget locality need.pdf
  grantbudget locality --text 'Serving families in Austin, TX'")]
    Locality {
        /// Documents to scan (PDF or text)
        documents: Vec<PathBuf>,

        /// Scan this text instead of (or in addition to) documents
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Split a total project cost into federal and match shares
    #[command(after_help = "\
Examples:
  grantbudget split 1000 --mode percent_of_total --percent 25
  grantbudget split 1000 --mode percent_of_federal --percent 25 --json")]
    Split {
        /// Total project cost in dollars
        #[arg(allow_negative_numbers = true)]
        total: f64,

        /// percent_of_total or percent_of_federal
        #[arg(long, default_value = "percent_of_total")]
        mode: String,

        /// Match percent (0-100)
        #[arg(long, default_value_t = 0.0)]
        percent: f64,

        #[arg(long)]
        json: bool,
    },

    /// Re-roll an edited program CSV into a fresh federal table
    #[command(after_help = "\
Examples:
  grantbudget federal --program budgets/program_budget.csv --match-percent 25
  grantbudget federal --program edited.csv --request columbus.budget.toml --out budgets/")]
    Federal {
        /// Edited program budget CSV
        #[arg(long, short = 'p', value_name = "CSV")]
        program: PathBuf,

        #[command(flatten)]
        request: RequestArgs,

        /// Write federal_budget.csv and the PDF here
        #[arg(long, short = 'o', value_name = "DIR")]
        out: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Check request files without generating anything
    Validate {
        /// Request files (*.budget.toml)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  grantbudget-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if verbose == 1 {
        builder.filter_level(log::LevelFilter::Info);
    } else if verbose > 1 {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let settings = match &cli.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let ctx = Context { settings, quiet: cli.quiet };

    let result = match cli.command {
        Commands::Generate { documents, request, locality, out, no_pdf, json } => {
            cmd_generate(&ctx, documents, request, locality, out, no_pdf, json)
        }
        Commands::Locality { documents, text, json } => cmd_locality(documents, text, json),
        Commands::Split { total, mode, percent, json } => cmd_split(total, mode, percent, json),
        Commands::Federal { program, request, out, json } => {
            cmd_federal(&ctx, program, request, out, json)
        }
        Commands::Validate { files } => cmd_validate(&ctx, files),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn budget(err: BudgetError) -> Self {
        let hint = match &err {
            BudgetError::InvalidMatchMode(_) => {
                Some("use --match-mode percent_of_total or percent_of_federal".to_string())
            }
            BudgetError::InvalidParameter { name, .. } if name == "match_percent" => {
                Some("match percent is a whole percent, e.g. 25 for a 25% match".to_string())
            }
            _ => None,
        };
        Self { code: budget_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

struct Context {
    settings: Settings,
    quiet: bool,
}

impl Context {
    /// Progress line on stderr, silenced by --quiet.
    fn note(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", msg.as_ref());
        }
    }

    fn out_dir(&self, flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
        let dir = flag
            .or_else(|| self.settings.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&dir)
            .map_err(|e| CliError::io(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(dir)
    }
}

fn print_stdout(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| CliError::io(format!("cannot write to stdout: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("cannot serialize output: {}", e)))?;
    print_stdout(&format!("{json}\n"))
}

// ============================================================================
// generate
// ============================================================================

fn cmd_generate(
    ctx: &Context,
    documents: Vec<PathBuf>,
    request_args: RequestArgs,
    locality_args: LocalityArgs,
    out: Option<PathBuf>,
    no_pdf: bool,
    json: bool,
) -> Result<(), CliError> {
    let mut request = load_request(&request_args, &ctx.settings)?;
    let text = extract::documents_text(&documents);
    if !documents.is_empty() && text.is_empty() {
        ctx.note("warning: no text could be extracted from the input documents");
    }
    let source = apply_locality(&mut request, &locality_args, &text)?;

    let params = request.to_params().map_err(CliError::budget)?;
    let package = run(&params);

    let dir = ctx.out_dir(out)?;
    let generated = report::generated_on();
    let written = export_package(&package, &request.organization, &dir, no_pdf, &generated)?;
    for path in &written {
        ctx.note(format!("Wrote {}", path.display()));
    }

    if json {
        return print_json(&package);
    }

    let place = match (&request.locality.city, &request.locality.state) {
        (Some(city), Some(state)) => Some(format!("{city}, {state}")),
        (Some(place), None) | (None, Some(place)) => Some(place.clone()),
        (None, None) => None,
    };
    let place = if source == LocalitySource::Override { None } else { place };
    print_stdout(&report::budget_summary(
        &request.organization,
        &package,
        place,
        &source,
        &generated,
    ))
}

/// Write the three CSVs, the package JSON and (unless skipped) the federal PDF.
fn export_package(
    package: &BudgetPackage,
    org: &OrganizationInfo,
    dir: &Path,
    no_pdf: bool,
    generated: &str,
) -> Result<Vec<PathBuf>, CliError> {
    let mut written = Vec::new();

    let path = dir.join(grantbudget_io::OPERATING_CSV);
    csv_io::export_operating(&package.operating, &path).map_err(CliError::io)?;
    written.push(path);

    let path = dir.join(grantbudget_io::PROGRAM_CSV);
    csv_io::export_program(&package.program, &path).map_err(CliError::io)?;
    written.push(path);

    let path = dir.join(grantbudget_io::FEDERAL_CSV);
    csv_io::export_federal(&package.federal, &path).map_err(CliError::io)?;
    written.push(path);

    if !no_pdf {
        let path = dir.join(grantbudget_io::FEDERAL_PDF);
        export_federal_pdf(org, &package.federal, &path, generated)?;
        written.push(path);
    }

    let path = dir.join(grantbudget_io::PACKAGE_JSON);
    json_io::export(package, &path).map_err(CliError::io)?;
    written.push(path);

    Ok(written)
}

fn export_federal_pdf(
    org: &OrganizationInfo,
    rows: &[FederalRow],
    path: &Path,
    generated: &str,
) -> Result<(), CliError> {
    let header = FederalPdfHeader {
        organization: &org.name,
        program_title: &org.program_title,
        generated_on: Some(generated),
    };
    pdf::export_federal(&header, rows, path).map_err(CliError::io)
}

// ============================================================================
// locality
// ============================================================================

fn cmd_locality(documents: Vec<PathBuf>, text: Option<String>, json: bool) -> Result<(), CliError> {
    if documents.is_empty() && text.is_none() {
        return Err(CliError::args("nothing to scan")
            .with_hint("pass documents or --text 'Serving families in Austin, TX'"));
    }

    let mut combined = extract::documents_text(&documents);
    if let Some(text) = text {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&text);
    }

    let signal = find_city_state_from_text(&combined);
    let factor = signal.resolve();

    if json {
        return print_json(&serde_json::json!({
            "city": signal.city,
            "state": signal.state,
            "factor": factor.value(),
        }));
    }

    let out = if signal.is_empty() {
        format!("No City, ST pair found\nFactor: {factor}\n")
    } else {
        format!(
            "City:   {}\nState:  {}\nFactor: {}\n",
            signal.city.as_deref().unwrap_or("-"),
            signal.state.as_deref().unwrap_or("-"),
            factor
        )
    };
    print_stdout(&out)
}

// ============================================================================
// split
// ============================================================================

fn cmd_split(total: f64, mode: String, percent: f64, json: bool) -> Result<(), CliError> {
    if !total.is_finite() {
        return Err(CliError::args(format!("total must be a number, got {total}")));
    }
    if !(0.0..=100.0).contains(&percent) {
        return Err(CliError::budget(BudgetError::InvalidParameter {
            name: "match_percent".into(),
            value: percent.to_string(),
        }));
    }

    let split = split_match_str(total, percent / 100.0, &mode).map_err(CliError::budget)?;
    if json {
        print_json(&split)
    } else {
        print_stdout(&report::split(&split))
    }
}

// ============================================================================
// federal
// ============================================================================

fn cmd_federal(
    ctx: &Context,
    program: PathBuf,
    request_args: RequestArgs,
    out: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    let request = load_request(&request_args, &ctx.settings)?;
    let params = request.to_params().map_err(CliError::budget)?;

    let mut rows = csv_io::import_program(&program).map_err(|e| {
        if e.starts_with("cannot open") {
            CliError::io(e)
        } else {
            CliError::parse(format!("{}: {}", program.display(), e))
        }
    })?;
    if rows.is_empty() {
        return Err(CliError::parse(format!("{}: no program rows", program.display())));
    }

    let (split, federal) = rebuild_federal(&mut rows, &params);
    log::info!(
        "re-rolled {} program rows: federal {} / match {}",
        rows.len(),
        split.federal_cents,
        split.match_cents
    );

    if let Some(dir) = out {
        let dir = ctx.out_dir(Some(dir))?;
        let path = dir.join(grantbudget_io::FEDERAL_CSV);
        csv_io::export_federal(&federal, &path).map_err(CliError::io)?;
        ctx.note(format!("Wrote {}", path.display()));

        let path = dir.join(grantbudget_io::FEDERAL_PDF);
        export_federal_pdf(&request.organization, &federal, &path, &report::generated_on())?;
        ctx.note(format!("Wrote {}", path.display()));
    }

    if json {
        print_json(&serde_json::json!({ "split": split, "federal": federal }))
    } else {
        print_stdout(&report::federal_table(&federal))
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(ctx: &Context, files: Vec<PathBuf>) -> Result<(), CliError> {
    let mut failed = None;

    for file in &files {
        let args = RequestArgs { request: Some(file.clone()), ..RequestArgs::default() };
        let checked = load_request(&args, &ctx.settings)
            .and_then(|r| r.to_params().map_err(CliError::budget));
        match checked {
            Ok(params) => {
                let target = params
                    .target
                    .map(|t| format!(", target {}", format_whole_dollars(t.amount_cents)))
                    .unwrap_or_default();
                print_stdout(&format!(
                    "ok: {} (factor {}, {} {}%{})\n",
                    file.display(),
                    params.factor,
                    params.rule.mode,
                    report::percent(params.rule.value * 100.0),
                    target
                ))?;
            }
            Err(e) => {
                eprintln!("{}: {}", file.display(), e.message);
                failed.get_or_insert(e.code);
            }
        }
    }

    match failed {
        Some(code) => Err(CliError {
            code,
            message: String::new(),
            hint: None,
        }),
        None => Ok(()),
    }
}
