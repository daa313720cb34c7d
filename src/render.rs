//! Plain-text views of catalog records for the command line.
//!
//! Renderers write into any `fmt::Write` so tests can capture output in a
//! `String`. Long descriptions are truncated in listings and shown in full,
//! split on their bullet markers, in the detail view.

use crate::audit::CatalogAudit;
use crate::catalog::{CatalogOrigin, CatalogStore, Entry, GroupSummary, group_label};
use std::fmt;

const MAX_SUMMARY_CHARS: usize = 96;

/// One line per entry: name, group, and a shortened description.
pub fn render_entry_list(entries: &[&Entry], writer: &mut impl fmt::Write) -> fmt::Result {
    let width = entries
        .iter()
        .map(|entry| entry.name.chars().count())
        .max()
        .unwrap_or(0);
    for entry in entries {
        let mut flags = String::new();
        if entry.deprecated {
            flags.push_str(" [deprecated]");
        }
        writeln!(
            writer,
            "{:<width$}  {:<12}  {}{}",
            entry.name,
            entry.group,
            truncate(&entry.description, MAX_SUMMARY_CHARS),
            flags,
            width = width
        )?;
    }
    writeln!(writer, "{} functions found", entries.len())
}

/// Full detail view of a single entry.
pub fn render_entry(entry: &Entry, writer: &mut impl fmt::Write) -> fmt::Result {
    writeln!(writer, "{}", entry.name)?;
    writeln!(writer, "{}", "=".repeat(entry.name.chars().count()))?;
    writeln!(writer, "group      : {}", group_label(&entry.group))?;
    writeln!(writer, "syntax     : {}", entry.syntax())?;
    writeln!(writer, "returns    : {}", entry.return_type())?;
    if entry.deprecated || entry.volatile {
        let mut flags = Vec::new();
        if entry.deprecated {
            flags.push("deprecated");
        }
        if entry.volatile {
            flags.push("volatile");
        }
        writeln!(writer, "flags      : {}", flags.join(", "))?;
    }

    writeln!(writer)?;
    let points = entry.description_points();
    match points.split_first() {
        Some((lead, rest)) => {
            writeln!(writer, "{lead}")?;
            for point in rest {
                writeln!(writer, "  • {point}")?;
            }
        }
        None => writeln!(writer, "(no description)")?,
    }

    if !entry.parameters.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "parameters:")?;
        for param in &entry.parameters {
            let kind = if param.kind.is_empty() { "any" } else { param.kind.as_str() };
            writeln!(writer, "  {} ({})", param.name, kind)?;
            if !param.description.trim().is_empty() {
                writeln!(writer, "      {}", param.description.trim())?;
            }
        }
    }

    if let Some(remarks) = entry
        .remarks
        .as_deref()
        .map(str::trim)
        .filter(|remarks| !remarks.is_empty())
    {
        writeln!(writer)?;
        writeln!(writer, "remarks: {remarks}")?;
    }

    for (idx, example) in entry.examples.iter().enumerate() {
        writeln!(writer)?;
        match example.title.as_deref() {
            Some(title) => writeln!(writer, "example {}: {}", idx + 1, title)?,
            None => writeln!(writer, "example {}:", idx + 1)?,
        }
        if let Some(code) = example.code.as_deref() {
            for line in code.lines() {
                writeln!(writer, "    {line}")?;
            }
        }
        if let Some(output) = example.output.as_deref() {
            writeln!(writer, "  => {output}")?;
        }
    }

    if !entry.compatibility.is_empty() {
        writeln!(writer)?;
        let platforms = entry
            .compatibility
            .iter()
            .map(|(platform, supported)| {
                format!("{platform}={}", if *supported { "yes" } else { "no" })
            })
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(writer, "compatibility: {platforms}")?;
    }
    Ok(())
}

/// Groups with their live counts.
pub fn render_groups(summaries: &[GroupSummary<'_>], writer: &mut impl fmt::Write) -> fmt::Result {
    for summary in summaries {
        writeln!(
            writer,
            "{:<28} {:>4}  {}",
            summary.group.label(),
            summary.function_count,
            truncate(&summary.group.description, MAX_SUMMARY_CHARS)
        )?;
    }
    Ok(())
}

/// Header line describing where the store's data came from.
pub fn render_origin(store: &CatalogStore, writer: &mut impl fmt::Write) -> fmt::Result {
    match store.origin() {
        CatalogOrigin::Empty => writeln!(writer, "catalog: empty"),
        CatalogOrigin::Documents => writeln!(
            writer,
            "catalog: {} functions, {} groups ({} records skipped)",
            store.entry_count(),
            store.group_count(),
            store.report().skipped.len()
        ),
        CatalogOrigin::Records => writeln!(
            writer,
            "catalog: {} functions, {} groups (in-memory records)",
            store.entry_count(),
            store.group_count()
        ),
        CatalogOrigin::Fallback { reason } => writeln!(
            writer,
            "catalog: fallback dataset ({} functions, {} groups); {}",
            store.entry_count(),
            store.group_count(),
            reason
        ),
    }
}

pub fn render_audit(
    store: &CatalogStore,
    audit: &CatalogAudit,
    writer: &mut impl fmt::Write,
) -> fmt::Result {
    render_origin(store, writer)?;
    for skipped in &store.report().skipped {
        writeln!(
            writer,
            "skipped {} #{}: {}",
            skipped.kind.as_str(),
            skipped.index,
            skipped.reason
        )?;
    }
    let problems = audit.problems();
    if problems.is_empty() {
        return writeln!(writer, "no problems found");
    }
    for problem in &problems {
        writeln!(writer, "- {problem}")?;
    }
    writeln!(writer, "{} problems found", problems.len())
}

fn truncate(text: &str, max_chars: usize) -> String {
    let clean = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if clean.chars().count() <= max_chars {
        return clean;
    }
    let mut shortened: String = clean.chars().take(max_chars - 1).collect();
    shortened.push('…');
    shortened
}
