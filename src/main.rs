//! pkgpatch - CLI entry point.

mod logging;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use pkgpatch::version::try_bump_package_version;
use pkgpatch::{RawUpgrade, Upgrade, patch_dependency};

use logging::LogFormat;

/// Patch package.json dependencies and versions without reformatting.
#[derive(Parser, Debug)]
#[command(name = "pkgpatch")]
#[command(about = "Patch package.json dependencies and versions without reformatting")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace one dependency's version in a manifest
    Update {
        /// Path to the manifest
        #[arg(short, long, default_value = "package.json")]
        manifest: PathBuf,

        /// Path to a JSON upgrade descriptor
        #[arg(short, long)]
        upgrade: PathBuf,

        /// Which occurrence of a duplicated key to patch (0-based)
        #[arg(long, default_value_t = 0)]
        occurrence: usize,

        /// Read the descriptor in the loose upstream shape
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Bump the manifest's own version
    Bump {
        /// Path to the manifest
        #[arg(short, long, default_value = "package.json")]
        manifest: PathBuf,

        /// The version the bump is computed from
        #[arg(long)]
        current_version: String,

        /// major, minor, patch, premajor, preminor, prepatch, prerelease or mirror:<dep>
        #[arg(long)]
        policy: String,

        /// JSON array of the upgrades applied in this batch (for mirror:<dep>)
        #[arg(long)]
        batch: Option<PathBuf>,

        /// Read batch descriptors in the loose upstream shape
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Overwrite the manifest in place
    #[arg(short, long, conflicts_with = "output")]
    write: bool,

    /// Write the result to this path instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    match cli.command {
        Command::Update {
            manifest,
            upgrade,
            occurrence,
            raw,
            output,
        } => {
            let content = read_manifest(&manifest)?;
            let upgrade = read_upgrade(&upgrade, raw)?;

            let patched = patch_dependency(&content, &upgrade, occurrence).with_context(|| {
                format!(
                    "Could not patch '{}' in {}",
                    upgrade.dep_name,
                    manifest.display()
                )
            })?;

            emit(&manifest, &output, &content, &patched)
        }
        Command::Bump {
            manifest,
            current_version,
            policy,
            batch,
            raw,
            output,
        } => {
            let content = read_manifest(&manifest)?;
            let batch = match batch {
                Some(path) => read_batch(&path, raw)?,
                None => Vec::new(),
            };

            let bumped = try_bump_package_version(&content, &current_version, &policy, &batch)
                .with_context(|| format!("Could not bump version in {}", manifest.display()))?;

            emit(&manifest, &output, &content, &bumped)
        }
    }
}

fn read_manifest(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid descriptor in {}", path.display()))
}

fn read_upgrade(path: &Path, raw: bool) -> Result<Upgrade> {
    if raw {
        let raw: RawUpgrade = read_json(path)?;
        Ok(Upgrade::try_from(raw)?)
    } else {
        read_json(path)
    }
}

fn read_batch(path: &Path, raw: bool) -> Result<Vec<Upgrade>> {
    if raw {
        let raw: Vec<RawUpgrade> = read_json(path)?;
        raw.into_iter()
            .map(|r| Upgrade::try_from(r).map_err(Into::into))
            .collect()
    } else {
        read_json(path)
    }
}

/// Print or write the result.
fn emit(manifest: &Path, args: &OutputArgs, original: &str, updated: &str) -> Result<()> {
    let target = match (&args.output, args.write) {
        (Some(path), _) => path.as_path(),
        (None, true) => manifest,
        (None, false) => {
            print!("{}", updated);
            return Ok(());
        }
    };

    if target == manifest && original == updated {
        println!("{} is already up to date", manifest.display());
        return Ok(());
    }

    write_atomic(target, updated)?;
    println!("✓ Wrote {}", target.display());
    Ok(())
}

/// Write via a temp file in the destination directory, then rename over it.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .context("Failed to write temp file")?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
