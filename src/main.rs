use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use mcp_extract::config::load_config;
use mcp_extract::error::{ExtractError, Result};
use mcp_extract::scanner::scan_corpus;
use mcp_types::{AnomalyReason, ComicRecord, EntrySnapshot, Figure};
use tracing::{error, info};

const OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(
    name = "mcp_extract",
    about = "Marvel Chronology Project cross-reference extractor"
)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run full corpus extraction → output/*
    Extract {
        /// Directory holding the downloaded chronology pages
        #[arg(default_value = ".")]
        corpus: PathBuf,
        /// Output directory
        #[arg(long, default_value = OUTPUT_DIR)]
        out: PathBuf,
        /// TOML file overriding the built-in corpus layout
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show every figure appearing in a comic, from cached output
    Comic {
        /// Abbreviated reference, e.g. "ASM 121"
        abbreviation: Vec<String>,
        #[arg(long, default_value = OUTPUT_DIR)]
        out: PathBuf,
    },
    /// Search figure names and aliases in cached output
    Figure {
        query: Vec<String>,
        #[arg(long, default_value = OUTPUT_DIR)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Some(Command::Extract {
            corpus,
            out,
            config,
        }) => run_extract(&corpus, &out, config.as_deref()),
        Some(Command::Comic { abbreviation, out }) => run_comic(&abbreviation.join(" "), &out),
        Some(Command::Figure { query, out }) => run_figure(&query.join(" "), &out),
        // Default: extract from current directory
        None => run_extract(Path::new("."), Path::new(OUTPUT_DIR), None),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mcp_extract=info",
        1 => "mcp_extract=debug",
        _ => "mcp_extract=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(dir: &Path, name: &str, data: &T) -> Result<()> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(&path, &json).map_err(|e| ExtractError::io(&path, e))?;
    info!(path = %path.display(), bytes = json.len(), "written");
    Ok(())
}

fn write_text(dir: &Path, name: &str, text: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, text).map_err(|e| ExtractError::io(&path, e))?;
    info!(path = %path.display(), bytes = text.len(), "written");
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let path = dir.join(name);
    let json = std::fs::read_to_string(&path).map_err(|e| {
        eprintln!("Run extraction first to generate {}.", path.display());
        ExtractError::io(&path, e)
    })?;
    Ok(serde_json::from_str(&json)?)
}

// ═══════════════════════════════════════════════════════════════════════
//  EXTRACT MODE
// ═══════════════════════════════════════════════════════════════════════

fn run_extract(root: &Path, out: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    info!(root = %root.display(), "scanning corpus");
    let corpus = scan_corpus(root, &config)?;
    info!(documents = corpus.len(), "corpus loaded");

    let extraction = mcp_extract::extract(&corpus, &config)?;

    std::fs::create_dir_all(out).map_err(|e| ExtractError::io(out, e))?;
    write_json(out, "figures.json", &extraction.figures)?;
    write_json(out, "comics.json", &extraction.comics.to_records())?;
    write_json(out, "warnings.json", &extraction.warnings)?;
    write_text(out, "anomalies.txt", &extraction.anomalies.to_string())?;

    let mut listing = String::new();
    for comic in extraction.comic_listing() {
        listing.push_str(comic);
        listing.push('\n');
    }
    write_text(out, "comics.txt", &listing)?;

    // ── Print statistics ───────────────────────────────────────────
    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  CORPUS STATISTICS");
    eprintln!("══════════════════════════════════════════");

    let mut by_dimension: BTreeMap<&str, usize> = BTreeMap::new();
    for f in &extraction.figures {
        *by_dimension.entry(f.dimension.as_str()).or_insert(0) += 1;
    }
    eprintln!("\nFigures by dimension:");
    for (dimension, count) in &by_dimension {
        eprintln!("  {dimension}: {count}");
    }

    eprintln!("\nComics:       {}", extraction.comics.len());
    eprintln!("Occurrences:  {}", extraction.comics.occurrence_count());
    eprintln!("Anomalies:    {}", extraction.anomalies.len());
    for reason in [
        AnomalyReason::UnexpectedCharacter,
        AnomalyReason::UnknownAbbreviation,
    ] {
        eprintln!(
            "  {reason}: {}",
            extraction.anomalies.count_by_reason(reason)
        );
    }

    if !extraction.warnings.is_empty() {
        eprintln!("\n══════════════════════════════════════════");
        eprintln!("  LAYOUT WARNINGS ({} total)", extraction.warnings.len());
        eprintln!("══════════════════════════════════════════");
        for w in extraction.warnings.iter().take(30) {
            eprintln!("  {}:{} {:?} {}", w.document, w.line, w.kind, w.text);
        }
        if extraction.warnings.len() > 30 {
            eprintln!("  ... and {} more", extraction.warnings.len() - 30);
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  COMIC MODE: who appears in a comic, with reading context
// ═══════════════════════════════════════════════════════════════════════

fn run_comic(abbreviation: &str, out: &Path) -> Result<()> {
    let comics: BTreeMap<String, ComicRecord> = read_json(out, "comics.json")?;
    let figures: Vec<Figure> = read_json(out, "figures.json")?;

    let Some(record) = comics.get(abbreviation) else {
        eprintln!("No comic \"{abbreviation}\" in {}", out.display());
        return Ok(());
    };

    println!("{} ({})", record.abbreviation, record.full_name);
    for (appendix, figure, occ) in record.occurrences() {
        let name = figures
            .get(figure)
            .map(|f| f.name.as_str())
            .unwrap_or("?");
        println!("\n  {name} {appendix} [entry {}]", occ.index);
        println!("    before: {}", snapshot_text(&occ.previous));
        println!("    this:   {}", snapshot_text(&occ.current));
        println!("    after:  {}", snapshot_text(&occ.next));
    }
    Ok(())
}

fn snapshot_text(s: &EntrySnapshot) -> &str {
    if s.is_placeholder() { "-" } else { &s.rawstr }
}

// ═══════════════════════════════════════════════════════════════════════
//  FIGURE MODE: name / alias search
// ═══════════════════════════════════════════════════════════════════════

fn run_figure(query: &str, out: &Path) -> Result<()> {
    let figures: Vec<Figure> = read_json(out, "figures.json")?;
    let needle = query.to_lowercase();

    let mut hits = 0usize;
    for f in &figures {
        if !f.name.to_lowercase().contains(&needle) && !f.search.to_lowercase().contains(&needle) {
            continue;
        }
        hits += 1;
        if f.dimension == "standard" {
            println!("{}  {}", f.name, f.link);
        } else {
            println!("{} ({})  {}", f.name, f.dimension, f.link);
        }
    }
    eprintln!("{hits} figure(s) matching \"{query}\"");
    Ok(())
}
