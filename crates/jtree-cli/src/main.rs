//! `jtree` CLI: query, edit, index and translate JSON trees from the command line.
//!
//! Input is read from a file or stdin and may be JSON text or a compact form;
//! the format is detected from the leading magic bytes.
//!
//! ## Usage
//!
//! ```sh
//! # List leaf paths
//! jtree paths -i data.json --filter leaves
//!
//! # Read and write single nodes
//! jtree get -i data.json org/name
//! jtree set -i data.json -o data.json org/versions/[] 3 --type int
//! jtree delete -i data.json org/versions/[0]
//!
//! # Build a compact form and query it without deserializing
//! jtree serialize -i catalog.json -o catalog.oiJS
//! jtree lookup -i catalog.oiJS translations/de/Hello
//! jtree dump -i catalog.oiJS
//!
//! # Translate text or the string leaves of a document
//! jtree translate -c catalog.oiJS --locale de_DE Hello
//! jtree translate -c catalog.json --locale de_DE -i ui.json --key name --key title
//!
//! # Render as another format
//! jtree convert -i data.json --to yaml
//!
//! # Trace every access to a node (also read from JTREE_DEBUG_NODE)
//! jtree --debug-node org/name get -i data.json org/name
//! ```

use std::io::{self, Read, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jtree_core::watch::{self, DebugWatch};
use jtree_core::{
    deserialize, is_compact, serialize, translate_json, Catalog, Coercion, CompactForm,
    Delimiter, PathFilter, TranslateFlags, Translation, Value,
};

#[derive(Parser)]
#[command(name = "jtree", version, about = "Path-addressed JSON trees and compact indexes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every access to a path, as `path` or `path:value-substring`
    #[arg(long, global = true)]
    debug_node: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the paths of a tree
    Paths {
        #[arg(short, long)]
        input: Option<String>,
        /// Restrict to paths below this xpath; empty terms match anything
        #[arg(long, default_value = "")]
        xpath: String,
        /// Maximum depth, 0 for unlimited
        #[arg(long, default_value_t = 0)]
        depth: usize,
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },
    /// Print the node at a path
    Get {
        #[arg(short, long)]
        input: Option<String>,
        path: String,
    },
    /// Set the node at a path, creating it if needed
    Set {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        path: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long, value_enum, default_value_t = ValueType::String)]
        r#type: ValueType,
        /// Fail instead of replacing nodes of the wrong kind
        #[arg(long)]
        strict: bool,
    },
    /// Delete the node at a path and any parents it leaves empty
    Delete {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        path: String,
    },
    /// Write the compact binary form of a tree
    Serialize {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Rebuild JSON from a compact form
    Deserialize {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the entries of a compact form as text
    Dump {
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Look a single path up in a compact form
    Lookup {
        #[arg(short, long)]
        input: Option<String>,
        path: String,
        /// Binary-search only entries whose path starts with this prefix
        #[arg(long)]
        within: Option<String>,
    },
    /// Translate a text, or string leaves of a JSON document
    Translate {
        /// Catalog, JSON or compact form
        #[arg(short, long)]
        catalog: String,
        #[arg(long)]
        locale: String,
        /// Section prefix inside the catalog
        #[arg(long, default_value = jtree_core::catalog::DEFAULT_PREFIX)]
        prefix: String,
        /// Document to translate (when no TEXT is given)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        /// Leaf keys to translate in the document
        #[arg(long = "key")]
        keys: Vec<String>,
        /// Always run the full fallback chain
        #[arg(long)]
        no_optimise: bool,
        text: Option<String>,
    },
    /// Render a tree as JSON, YAML, XML or CSV
    Convert {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        to: Format,
        /// Use `;` between CSV cells
        #[arg(long)]
        semicolon: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    Leaves,
    Interior,
    All,
}

impl From<Filter> for PathFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Leaves => PathFilter::Leaves,
            Filter::Interior => PathFilter::Interior,
            Filter::All => PathFilter::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueType {
    String,
    Int,
    Double,
    Bool,
    /// Parse the value as a JSON subtree
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
    Yaml,
    Xml,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug_node.is_some() || std::env::var_os(watch::DEBUG_NODE_ENV).is_some());

    let debug_watch = match cli.debug_node.as_deref() {
        Some(spec) => Some(
            DebugWatch::parse(spec).with_context(|| format!("Invalid --debug-node: '{spec}'"))?,
        ),
        None => DebugWatch::from_env(),
    };
    if let Some(debug_watch) = debug_watch {
        watch::install(debug_watch);
    }

    match cli.command {
        Commands::Paths {
            input,
            xpath,
            depth,
            filter,
        } => {
            let tree = load_tree(input.as_deref())?;
            let mut out = String::new();
            for path in tree.find_paths(&xpath, depth, filter.into()) {
                out.push_str(&path);
                out.push('\n');
            }
            write_output(None, out.as_bytes())?;
        }
        Commands::Get { input, path } => {
            let tree = load_tree(input.as_deref())?;
            let node = tree
                .get(&path)
                .with_context(|| format!("Path not found: '{path}'"))?;
            write_output(None, format!("{}\n", node_text(node)?).as_bytes())?;
        }
        Commands::Set {
            input,
            output,
            path,
            value,
            r#type,
            strict,
        } => {
            let mut tree = load_tree(input.as_deref())?;
            let coercion = if strict { Coercion::Strict } else { Coercion::Coerce };
            let node = tree
                .create_with(&path, coercion)
                .with_context(|| format!("Failed to create '{path}'"))?;
            *node = parse_value(&value, r#type)?;
            write_tree(output.as_deref(), &tree)?;
        }
        Commands::Delete {
            input,
            output,
            path,
        } => {
            let mut tree = load_tree(input.as_deref())?;
            if !tree.delete(&path) {
                bail!("Path not found: '{path}'");
            }
            write_tree(output.as_deref(), &tree)?;
        }
        Commands::Serialize { input, output } => {
            let tree = load_tree(input.as_deref())?;
            let form = serialize(&tree).context("Failed to build compact form")?;
            write_output(output.as_deref(), form.as_bytes())?;
        }
        Commands::Deserialize { input, output } => {
            let form = load_compact(input.as_deref())?;
            let tree = deserialize(&form).context("Failed to read compact form")?;
            write_tree(output.as_deref(), &tree)?;
        }
        Commands::Dump { input } => {
            let form = load_compact(input.as_deref())?;
            write_output(None, form.to_string().as_bytes())?;
        }
        Commands::Lookup {
            input,
            path,
            within,
        } => {
            let form = load_compact(input.as_deref())?;
            let window = match within {
                Some(prefix) => form.prefix_range(&prefix)?,
                None => None,
            };
            match form.lookup_text(&path, window)? {
                Some(text) => write_output(None, format!("{text}\n").as_bytes())?,
                None => bail!("Path not found: '{path}'"),
            }
        }
        Commands::Translate {
            catalog,
            locale,
            prefix,
            input,
            output,
            keys,
            no_optimise,
            text,
        } => {
            let bytes = read_input(Some(&catalog))?;
            let flags = TranslateFlags {
                no_optimise,
                ..TranslateFlags::default()
            };
            let catalog: Catalog = if is_compact(&bytes) {
                CompactForm::from_bytes(bytes)
                    .context("Invalid compact catalog")?
                    .into()
            } else {
                parse_json(&bytes)?.into()
            };
            let translation = Translation::new(&locale, None, catalog, flags).with_prefix(&prefix);

            match text {
                Some(text) => {
                    let translated = translation.translate(&text);
                    write_output(output.as_deref(), format!("{translated}\n").as_bytes())?;
                }
                None => {
                    if keys.is_empty() {
                        bail!("Give a TEXT to translate, or --key names for a document");
                    }
                    let mut tree = load_tree(input.as_deref())?;
                    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                    let changed = translate_json(&mut tree, &translation, &keys);
                    tracing::info!(changed, "translated document");
                    write_tree(output.as_deref(), &tree)?;
                }
            }
        }
        Commands::Convert {
            input,
            output,
            to,
            semicolon,
        } => {
            let tree = load_tree(input.as_deref())?;
            let rendered = match to {
                Format::Json => format!("{}\n", tree.to_json()?),
                Format::Pretty => format!("{}\n", tree.to_json_pretty()?),
                Format::Yaml => tree.to_yaml(),
                Format::Xml => tree.to_xml().context("Failed to render XML")?,
                Format::Csv => {
                    let delimiter = if semicolon {
                        Delimiter::Semicolon
                    } else {
                        Delimiter::Comma
                    };
                    tree.to_csv(delimiter).context("Failed to render CSV")?
                }
            };
            write_output(output.as_deref(), rendered.as_bytes())?;
        }
    }

    Ok(())
}

/// Warnings by default; `RUST_LOG` overrides. A debug watch needs its
/// `jtree::watch` events at info level.
fn init_tracing(watching: bool) {
    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if watching {
        if let Ok(directive) = "jtree::watch=info".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Scalars print as their text, containers as pretty JSON.
fn node_text(node: &Value) -> Result<String> {
    Ok(match node.to_text() {
        Some(text) => text.to_string(),
        None => node.to_json_pretty()?,
    })
}

fn parse_value(text: &str, ty: ValueType) -> Result<Value> {
    Ok(match ty {
        ValueType::String => Value::from(text),
        ValueType::Int => Value::from(
            text.parse::<i64>()
                .with_context(|| format!("Not an integer: '{text}'"))?,
        ),
        ValueType::Double => Value::from(
            text.parse::<f64>()
                .with_context(|| format!("Not a number: '{text}'"))?,
        ),
        ValueType::Bool => Value::from(
            text.parse::<bool>()
                .with_context(|| format!("Not a boolean: '{text}'"))?,
        ),
        ValueType::Json => Value::from_json(text).context("Invalid JSON value")?,
    })
}

fn parse_json(bytes: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(bytes).context("Input is not UTF-8")?;
    Value::from_json(text).context("Failed to parse JSON")
}

/// Read a tree from JSON text or a compact form.
fn load_tree(path: Option<&str>) -> Result<Value> {
    let bytes = read_input(path)?;
    if is_compact(&bytes) {
        let form = CompactForm::from_bytes(bytes).context("Invalid compact form")?;
        return deserialize(&form).context("Failed to read compact form");
    }
    parse_json(&bytes)
}

/// Read a compact form, building one first if the input is JSON.
fn load_compact(path: Option<&str>) -> Result<CompactForm> {
    let bytes = read_input(path)?;
    if is_compact(&bytes) {
        return CompactForm::from_bytes(bytes).context("Invalid compact form");
    }
    tracing::debug!("input is JSON; serializing before lookup");
    serialize(&parse_json(&bytes)?).context("Failed to build compact form")
}

fn write_tree(path: Option<&str>, tree: &Value) -> Result<()> {
    let json = format!("{}\n", tree.to_json_pretty()?);
    write_output(path, json.as_bytes())
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {path}")),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("Failed to write file: {path}"))?;
        }
        None => {
            io::stdout()
                .write_all(content)
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
