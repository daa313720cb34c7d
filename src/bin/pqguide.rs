//! Command-line front end over the function catalog.
//!
//! Loads the catalog once, runs a single query, and prints plain text or,
//! with `--json`, the same records the static snapshots carry. Logs go to
//! stderr so JSON output can be piped.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pqguide::render::{
    render_audit, render_entry, render_entry_list, render_groups, render_origin,
};
use pqguide::{
    CatalogStore, Entry, EntryFilter, SUGGESTION_LIMIT, audit_catalog, catalog_source,
    resolve_data_dir, write_snapshot,
};
use serde::Serialize;
use serde_json::json;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pqguide", version, about = "Query the Power Query M function catalog")]
struct Cli {
    /// Directory holding processed-functions.json and processed-categories.json
    #[arg(long, global = true, env = "PQGUIDE_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Override the entries document path
    #[arg(long, global = true, value_name = "FILE")]
    entries: Option<PathBuf>,
    /// Override the groups document path
    #[arg(long, global = true, value_name = "FILE")]
    groups: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List functions, optionally filtered by group and text
    List {
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        query: Option<String>,
    },
    /// Show one function by exact name
    Show { name: String },
    /// Show a group and its functions
    Group { name: String },
    /// List groups with their function counts
    Groups,
    /// Search names, descriptions, and groups
    Search { query: String },
    /// Quick name search, sorted and capped
    Suggest {
        query: String,
        #[arg(long, default_value_t = SUGGESTION_LIMIT)]
        limit: usize,
    },
    /// Report orphaned entries, empty groups, duplicates, and count drift
    Audit {
        /// Fail instead of falling back when the documents cannot be loaded,
        /// and exit non-zero when problems are found
        #[arg(long)]
        strict: bool,
    },
    /// Write functions.json and categories.json for the static site
    Export { out_dir: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pqguide=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start = env::current_dir().context("reading working directory")?;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), &start);
    let source = catalog_source(&data_dir, cli.entries.as_deref(), cli.groups.as_deref());

    let strict = matches!(cli.command, Command::Audit { strict: true });
    let store = if strict {
        CatalogStore::try_load(&source).context("loading catalog documents")?
    } else {
        CatalogStore::load(&source)
    };

    let mut out = String::new();
    match cli.command {
        Command::List { group, query } => {
            let entries = store.filter_entries(&EntryFilter { query, group });
            emit_entries(&entries, cli.json, &mut out)?;
        }
        Command::Show { name } => {
            let Some(entry) = store.entry_by_name(&name) else {
                bail!("{}", not_found_message(&store, &name));
            };
            if cli.json {
                out = to_json(entry)?;
            } else {
                render_entry(entry, &mut out)?;
            }
        }
        Command::Group { name } => {
            let Some(group) = store.group_by_name(&name) else {
                bail!("no group named '{name}'");
            };
            let mut entries = store.entries_by_group(&group.name);
            entries.sort_by(|a, b| pqguide::catalog::collate(&a.name, &b.name));
            if cli.json {
                out = to_json(&json!({
                    "group": group,
                    "functionCount": entries.len(),
                    "functions": entries,
                }))?;
            } else {
                use std::fmt::Write;
                writeln!(out, "{} functions", group.label())?;
                writeln!(out, "{}", group.description)?;
                writeln!(out)?;
                render_entry_list(&entries, &mut out)?;
            }
        }
        Command::Groups => {
            let summaries = store.group_summaries();
            if cli.json {
                out = to_json(&summaries)?;
            } else {
                render_origin(&store, &mut out)?;
                render_groups(&summaries, &mut out)?;
            }
        }
        Command::Search { query } => {
            let entries = store.search_entries(&query);
            emit_entries(&entries, cli.json, &mut out)?;
        }
        Command::Suggest { query, limit } => {
            let entries = store.name_suggestions(&query, limit);
            if cli.json {
                let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
                out = to_json(&names)?;
            } else {
                for entry in entries {
                    out.push_str(&entry.name);
                    out.push('\n');
                }
            }
        }
        Command::Audit { strict } => {
            let audit = audit_catalog(&store);
            if cli.json {
                out = to_json(&json!({
                    "report": store.report(),
                    "audit": &audit,
                }))?;
            } else {
                render_audit(&store, &audit, &mut out)?;
            }
            if strict && !audit.is_clean() {
                print!("{out}");
                bail!("catalog audit found {} problems", audit.problems().len());
            }
        }
        Command::Export { out_dir } => {
            let paths = write_snapshot(&store, &out_dir)
                .with_context(|| format!("exporting snapshot to {}", out_dir.display()))?;
            if cli.json {
                out = to_json(&json!({
                    "entries": paths.entries,
                    "groups": paths.groups,
                }))?;
            } else {
                render_origin(&store, &mut out)?;
                out.push_str(&format!(
                    "wrote {}\nwrote {}\n",
                    paths.entries.display(),
                    paths.groups.display()
                ));
            }
        }
    }

    print!("{out}");
    Ok(())
}

fn emit_entries(entries: &[&Entry], json: bool, out: &mut String) -> Result<()> {
    if json {
        *out = to_json(&entries)?;
    } else {
        render_entry_list(entries, out)?;
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(value).context("serializing output")?;
    rendered.push('\n');
    Ok(rendered)
}

fn not_found_message(store: &CatalogStore, name: &str) -> String {
    let close: Vec<&str> = store
        .name_suggestions(name, 5)
        .into_iter()
        .map(|entry| entry.name.as_str())
        .collect();
    if close.is_empty() {
        format!("no function named '{name}'")
    } else {
        format!("no function named '{name}' (did you mean: {})", close.join(", "))
    }
}
