//! `bsondoc` CLI: convert between JSON and binary documents and inspect them.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to a binary document (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | bsondoc encode > alice.bson
//!
//! # Decode to canonical extended JSON (type wrappers on every number)
//! bsondoc decode -i alice.bson
//!
//! # Decode to relaxed extended JSON (plain numbers)
//! bsondoc decode --relaxed -i alice.bson -o alice.json
//!
//! # Read one field (first match wins when keys repeat)
//! bsondoc get name -i alice.bson
//!
//! # Show size and shape statistics
//! bsondoc stats -i alice.bson
//!
//! # Reject anything nested deeper than 16 levels, with debug logging
//! bsondoc --max-depth 16 -v decode -i untrusted.bson
//! ```

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use bsondoc::json::{self, JsonMode};
use bsondoc::limits::DEFAULT_MAX_NESTING_DEPTH;
use bsondoc::{Document, Limits, Value};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bsondoc",
    version,
    about = "Convert and inspect BSON-style binary documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum nesting depth of embedded documents and arrays
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_NESTING_DEPTH)]
    max_depth: usize,

    /// Log more detail to stderr (-v debug, -vv trace). RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON object into a binary document
    Encode {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Decode a binary document to extended JSON
    Decode {
        /// Input binary file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Print the first field with the given name as extended JSON
    Get {
        /// Field name
        field: String,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Treat the input as JSON text instead of a binary document
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        format: FormatArgs,
    },
    /// Show document statistics (fields, depth, encoded sizes)
    Stats {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Treat the input as JSON text instead of a binary document
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct FormatArgs {
    /// Write finite numbers as plain JSON numbers
    #[arg(long, conflicts_with = "canonical")]
    relaxed: bool,
    /// Wrap every number as {"$numberDouble": ...} (the default)
    #[arg(long)]
    canonical: bool,
}

impl FormatArgs {
    fn mode(&self) -> JsonMode {
        if self.relaxed {
            JsonMode::Relaxed
        } else {
            JsonMode::Canonical
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let limits = Limits::default().with_max_nesting_depth(cli.max_depth);

    match cli.command {
        Commands::Encode { input, output } => {
            let text = read_input(input.as_deref())?;
            let doc =
                Document::from_json_with(&text, &limits).context("Failed to encode JSON input")?;
            tracing::debug!(bytes = doc.data_len(), fields = doc.len(), "encoded document");
            write_output_bytes(output.as_deref(), doc.as_bytes())?;
        }
        Commands::Decode {
            input,
            output,
            format,
        } => {
            let doc = load_document(input.as_deref(), false, &limits)?;
            let text = json::render(&doc, format.mode());
            write_output(output.as_deref(), &text)?;
        }
        Commands::Get {
            field,
            input,
            json: from_json,
            format,
        } => {
            let doc = load_document(input.as_deref(), from_json, &limits)?;
            if !doc.has_field(&field) {
                anyhow::bail!("Field not found: '{}'", field);
            }
            let value = doc.get_field(&field);
            println!("{}", json::render_value(&value, format.mode()));
        }
        Commands::Stats {
            input,
            json: from_json,
        } => {
            let doc = load_document(input.as_deref(), from_json, &limits)?;
            let fields = doc.len();
            let mut keys: Vec<&str> = doc.keys().collect();
            keys.sort_unstable();
            keys.dedup();
            println!("Fields:          {}", fields);
            println!("Distinct keys:   {}", keys.len());
            println!("Nesting depth:   {}", document_depth(&doc));
            println!("Binary size:     {} bytes", doc.data_len());
            println!("Relaxed JSON:    {} bytes", doc.to_relaxed_json().len());
            println!("Canonical JSON:  {} bytes", doc.to_canonical_json().len());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. Library diagnostics arrive under the
/// `bsondoc` target.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_document(path: Option<&str>, from_json: bool, limits: &Limits) -> Result<Document> {
    if from_json {
        let text = read_input(path)?;
        return Document::from_json_with(&text, limits).context("Failed to parse JSON input");
    }
    let bytes = read_input_bytes(path)?;
    let doc =
        Document::from_bytes_with(&bytes, limits).context("Failed to decode binary document")?;
    tracing::debug!(bytes = doc.data_len(), "decoded document");
    Ok(doc)
}

/// Deepest level of embedding; a document of scalars is depth 0.
fn document_depth(doc: &Document) -> usize {
    doc.iter().map(|(_, value)| value_depth(&value)).max().unwrap_or(0)
}

fn value_depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(value_depth).max().unwrap_or(0),
        Value::Object(doc) => 1 + document_depth(doc),
        _ => 0,
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn read_input_bytes(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    write_output_bytes(path, content.as_bytes())
}

fn write_output_bytes(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
