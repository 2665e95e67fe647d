use clap::{Parser, Subcommand};
use envunpack::archive::{EnvArchive, ExtractOptions};
use envunpack::assembly::{BlockDisposition, DecodeOptions};
use envunpack::block::DEFAULT_BINARY_THRESHOLD;
use envunpack::extract::output_path;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "envunpack", about = "Unpack files bundled in a .env container")]
struct Cli {
    /// More log output (-v info, -vv debug).  RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Printable-byte ratio below which a block is treated as binary payload
    #[arg(long, default_value_t = DEFAULT_BINARY_THRESHOLD, global = true)]
    threshold: f64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every file and verify its declared SHA-1
    Unpack {
        input: PathBuf,
        #[arg(short = 'C', long, default_value = "output")]
        output_dir: PathBuf,
        /// Also write manifest.json into the output directory
        #[arg(short, long)]
        manifest: bool,
    },
    /// List the files a container holds
    List {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Check declared hashes without writing anything
    Verify {
        input: PathBuf,
    },
    /// Show how each block was interpreted
    Scan {
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct ListEntry<'a> {
    name: String,
    guid: Option<&'a str>,
    ext:  &'a str,
    kind: Option<&'static str>,
    size: usize,
    sha1: &'a str,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let opts = DecodeOptions { binary_threshold: cli.threshold };

    match cli.command {

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { input, output_dir, manifest } => {
            let ar = EnvArchive::open_with(&input, &opts)?;
            println!("processing {} file(s) from: {}", ar.records().len(), input.display());
            let files = ar.extract_all(&output_dir, &ExtractOptions { manifest })?;
            for f in &files {
                println!("- {} (size={}, ok={})", f.path.display(), f.size, f.verified);
            }
            println!("extracted {} file(s) to {}", files.len(), output_dir.display());
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json } => {
            let ar = EnvArchive::open_with(&input, &opts)?;
            let entries: Vec<ListEntry> = ar.records().iter().enumerate().map(|(i, r)| ListEntry {
                name: output_path(r, i).display().to_string(),
                guid: r.guid.as_deref(),
                ext:  &r.ext,
                kind: r.kind.map(|k| k.tag()),
                size: r.size,
                sha1: &r.hash,
            }).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                println!("Container: {}", input.display());
                println!("{:<32} {:>10} {:<6} {:<38} SHA-1", "Name", "Size", "Type", "GUID");
                for e in &entries {
                    println!("{:<32} {:>10} {:<6} {:<38} {}",
                        e.name, e.size, e.kind.unwrap_or("-"),
                        e.guid.unwrap_or("-"),
                        if e.sha1.is_empty() { "-" } else { e.sha1 });
                }
            }
        }

        // ── Verify ───────────────────────────────────────────────────────────
        Commands::Verify { input } => {
            let ar = EnvArchive::open_with(&input, &opts)?;
            let results = ar.verify();
            for v in &results {
                let status = match (v.ok, v.declared.is_empty()) {
                    (true, true)  => "unverified",
                    (true, false) => "ok",
                    (false, _)    => "MISMATCH",
                };
                println!("- {} (size={}) {}", v.name, v.size, status);
            }
            let bad = results.iter().filter(|v| !v.ok).count();
            if bad > 0 {
                eprintln!("{bad} of {} file(s) failed verification", results.len());
                std::process::exit(2);
            }
        }

        // ── Scan ─────────────────────────────────────────────────────────────
        Commands::Scan { input } => {
            let ar = EnvArchive::open_with(&input, &opts)?;
            let report = ar.report();
            for b in &report.blocks {
                let what = match &b.disposition {
                    BlockDisposition::Empty => "empty".to_string(),
                    BlockDisposition::Metadata { record } => format!("metadata -> #{record}"),
                    BlockDisposition::Payload { record, kind, skipped } => format!(
                        "payload  -> #{record} type={} skipped={skipped}",
                        kind.map_or("-", |k| k.tag())
                    ),
                    BlockDisposition::Rescued { record, kind, skipped } => {
                        format!("rescued  -> #{record} type={kind} skipped={skipped}")
                    }
                    BlockDisposition::Discarded => "discarded".to_string(),
                };
                println!("  block {:>4}  @{:<10} {:>10} B  {}", b.index, b.offset, b.len, what);
            }
            println!("{}", report.summary());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
