use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use czicheck_core::{
    CziChecker, ValidationEngine, render_checks_table, render_json_for_results,
    render_text_for_result,
};
use czicheck_domain::{FileResult, decode_report};
use czicheck_types::{AGGREGATES, CHECKS, CheckStatus, Configuration};

mod config_loader;

use config_loader::{Overrides, load_config, resolve_configuration};

#[derive(Parser)]
#[command(name = "czicheck")]
#[command(about = "Check CZI files for structural and metadata problems", long_about = None)]
struct Cli {
    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate CZI files with the native engine.
    Check(CheckArgs),

    /// Decode a saved engine report (render-only mode).
    Decode(DecodeArgs),

    /// List the available checks and their aliases.
    Checks(ChecksArgs),

    /// Print the tool version and, if linked, the engine version.
    Version,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// CZI files to validate.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Comma-separated checks, by any alias or aggregate (`default`, `all`, `optin`).
    #[arg(long, value_name = "LIST")]
    checks: Option<String>,

    /// Findings reported per check; negative means no limit.
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    max_findings: Option<i32>,

    /// Tolerate some malformed files that could otherwise not be analyzed.
    #[arg(long)]
    lax_parsing: bool,

    /// Ignore the 'SizeM' field of pyramid subblocks.
    #[arg(long)]
    ignore_size_m: bool,

    /// Path to a config file. If omitted, uses ./czicheck.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Lowest file status that makes the command fail.
    #[arg(long, value_enum, default_value_t = FailOn::Fail)]
    fail_on: FailOn,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Engine JSON report.
    report: PathBuf,

    /// File name to attach to the result (defaults to the report path).
    #[arg(long)]
    file: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ChecksArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FailOn {
    Fail,
    Warn,
    Never,
}

const EXIT_OK: i32 = 0;
const EXIT_TOOL_ERROR: i32 = 1;
const EXIT_FAIL: i32 = 2;
const EXIT_WARN: i32 = 3;

fn main() -> std::process::ExitCode {
    match run_with_args(std::env::args_os()) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(EXIT_TOOL_ERROR as u8)
        }
    }
}

fn run_with_args<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Check(args) => cmd_check(args),
        Commands::Decode(args) => {
            cmd_decode(args)?;
            Ok(EXIT_OK)
        }
        Commands::Checks(args) => {
            cmd_checks(args)?;
            Ok(EXIT_OK)
        }
        Commands::Version => {
            cmd_version();
            Ok(EXIT_OK)
        }
    }
}

fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

#[cfg(feature = "native")]
fn native_engine() -> Result<Arc<dyn ValidationEngine>> {
    Ok(Arc::new(czicheck_core::NativeEngine))
}

#[cfg(not(feature = "native"))]
fn native_engine() -> Result<Arc<dyn ValidationEngine>> {
    anyhow::bail!(
        "this czicheck was built without the native engine; rebuild with `--features native`"
    )
}

fn cmd_check(args: CheckArgs) -> Result<i32> {
    let file = load_config(args.config.clone())?;
    let overrides = Overrides {
        checks: args.checks.clone(),
        max_findings: args.max_findings,
        lax_parsing: args.lax_parsing,
        ignore_size_m: args.ignore_size_m,
    };
    let config = resolve_configuration(&file, &overrides)?;
    let engine = native_engine()?;

    let results = check_files(&config, engine, &args.files)?;
    emit_results(&results, args.format)?;
    Ok(compute_exit_code(&results, args.fail_on))
}

fn check_files(
    config: &Configuration,
    engine: Arc<dyn ValidationEngine>,
    files: &[PathBuf],
) -> Result<Vec<FileResult>> {
    let checker = CziChecker::new(*config, engine);
    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let path_text = path.to_string_lossy();
        info!("Checking '{}'", path_text);
        let result = checker
            .check(&path_text)
            .with_context(|| format!("check '{}'", path.display()))?;
        results.push(result);
    }
    checker.dispose();
    Ok(results)
}

fn cmd_decode(args: DecodeArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.report)
        .with_context(|| format!("read report {}", args.report.display()))?;
    let file = args
        .file
        .clone()
        .unwrap_or_else(|| args.report.display().to_string());

    let result = decode_report(&text, &file)
        .with_context(|| format!("decode report {}", args.report.display()))?;

    emit_results(std::slice::from_ref(&result), args.format)
}

fn cmd_checks(args: ChecksArgs) -> Result<()> {
    match args.format {
        OutputFormat::Text => print!("{}", render_checks_table()),
        OutputFormat::Json => {
            let checks: Vec<serde_json::Value> = CHECKS
                .iter()
                .map(|info| {
                    serde_json::json!({
                        "name": info.name,
                        "short_name": info.short_name,
                        "legacy_name": info.legacy_name,
                        "bit": info.check.bits(),
                        "opt_in": info.is_opt_in(),
                        "description": info.description,
                    })
                })
                .collect();
            let aggregates: serde_json::Map<String, serde_json::Value> = AGGREGATES
                .iter()
                .filter(|(_, mask)| !mask.is_empty())
                .map(|(keyword, mask)| (keyword.to_string(), mask.bits().into()))
                .collect();
            let doc = serde_json::json!({ "checks": checks, "aggregates": aggregates });
            let s = serde_json::to_string_pretty(&doc).context("render json")?;
            println!("{s}");
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("czicheck {}", env!("CARGO_PKG_VERSION"));
    if let Ok(engine) = native_engine() {
        let checker = CziChecker::new(Configuration::DEFAULT, engine);
        if let Ok(version) = checker.engine_version() {
            println!("libczicheckc {version}");
        }
    }
}

fn emit_results(results: &[FileResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for result in results {
                print!("{}", render_text_for_result(result));
            }
        }
        OutputFormat::Json => {
            let s = render_json_for_results(results).context("render json")?;
            println!("{s}");
        }
    }
    Ok(())
}

fn compute_exit_code(results: &[FileResult], fail_on: FailOn) -> i32 {
    let worst = results.iter().map(FileResult::file_status).max();
    match (fail_on, worst) {
        (FailOn::Never, _) | (_, None) | (_, Some(CheckStatus::Ok)) => EXIT_OK,
        (_, Some(CheckStatus::Fail)) => EXIT_FAIL,
        (FailOn::Warn, Some(CheckStatus::Warn)) => EXIT_WARN,
        (FailOn::Fail, Some(CheckStatus::Warn)) => EXIT_OK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use czicheck_testkit::{FakeEngine, fixtures};

    fn result_with(status: CheckStatus) -> FileResult {
        FileResult::new("f.czi", status, Vec::new())
    }

    #[test]
    fn exit_code_follows_worst_status() {
        let ok = result_with(CheckStatus::Ok);
        let warn = result_with(CheckStatus::Warn);
        let fail = result_with(CheckStatus::Fail);
        let ok_warn = vec![ok.clone(), warn.clone()];
        let warn_fail = vec![warn, fail.clone()];

        assert_eq!(compute_exit_code(&[], FailOn::Fail), EXIT_OK);
        assert_eq!(
            compute_exit_code(std::slice::from_ref(&ok), FailOn::Warn),
            EXIT_OK
        );
        assert_eq!(compute_exit_code(&ok_warn, FailOn::Fail), EXIT_OK);
        assert_eq!(compute_exit_code(&ok_warn, FailOn::Warn), EXIT_WARN);
        assert_eq!(compute_exit_code(&warn_fail, FailOn::Warn), EXIT_FAIL);
        assert_eq!(
            compute_exit_code(std::slice::from_ref(&fail), FailOn::Fail),
            EXIT_FAIL
        );
        assert_eq!(
            compute_exit_code(std::slice::from_ref(&fail), FailOn::Never),
            EXIT_OK
        );
    }

    #[test]
    fn check_files_runs_every_file_in_order() {
        let engine = Arc::new(FakeEngine::succeeding(fixtures::SAMPLE_REPORT_JSON));
        let files = vec![PathBuf::from("a.czi"), PathBuf::from("b.czi")];
        let results = check_files(&Configuration::DEFAULT, engine.clone(), &files).unwrap();

        let names: Vec<&str> = results.iter().map(FileResult::file).collect();
        assert_eq!(names, vec!["a.czi", "b.czi"]);
        assert!(results.iter().all(|r| r.file_status() == CheckStatus::Fail));
        assert_eq!(engine.destroys(), 2);
    }

    #[test]
    fn check_files_stops_on_usage_error() {
        let engine = Arc::new(FakeEngine::succeeding("{}"));
        let files = vec![PathBuf::from("  ")];
        let err = check_files(&Configuration::DEFAULT, engine, &files).unwrap_err();
        assert!(format!("{err:#}").contains("CZI file path must be specified."));
    }
}
