use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use schemars::schema_for;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Repo automation tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the local CI suite: fmt, clippy, test.
    Ci {
        /// Also build and test against the linked libczicheckc
        /// (needs `CZICHECK_LIB_DIR` or a system install). Sample cases are
        /// read from `CZICHECK_SAMPLES_DIR` when set.
        #[arg(long)]
        native: bool,
    },

    /// Generate JSON Schemas for the engine report and config into `schemas/`.
    Schema {
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Ci { native } => ci(native),
        Cmd::Schema { out_dir } => schema(out_dir),
    }
}

fn ci(native: bool) -> Result<()> {
    let mut steps: Vec<Vec<&str>> = vec![
        vec!["fmt", "--all", "--check"],
        vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        vec!["test", "--workspace"],
    ];
    if native {
        steps.push(vec![
            "test",
            "-p",
            "czicheck-core",
            "-p",
            "czicheck",
            "--features",
            "czicheck-core/native,czicheck/native",
        ]);
    }
    for args in &steps {
        run("cargo", args)?;
    }
    Ok(())
}

fn schema(out_dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&out_dir).context("create schema output dir")?;

    let outputs = [
        (
            out_dir.join("czicheck.config.schema.json"),
            schema_for!(czicheck_types::ConfigFile),
        ),
        (
            out_dir.join("czicheck.report.schema.json"),
            schema_for!(czicheck_types::ReportDto),
        ),
    ];

    for (path, schema) in &outputs {
        write_pretty_json(path, schema)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn write_pretty_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serialize json")?;
    std::fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn run(bin: &str, args: &[&str]) -> Result<()> {
    eprintln!("$ {bin} {}", args.join(" "));
    let status = Command::new(bin)
        .args(args)
        .status()
        .with_context(|| format!("run {bin} {args:?}"))?;
    if !status.success() {
        bail!("command failed: {bin} {args:?}");
    }
    Ok(())
}
