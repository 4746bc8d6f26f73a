// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ListArgs, OutputFormat};
use crate::provider::DomainInfo;
use crate::registry::ProviderRegistry;

#[derive(Debug, Serialize)]
struct DomainListing<T: Serialize> {
    total: usize,
    domains: Vec<T>,
}

/// Print every managed domain, sorted by name.
///
/// Without `--detail` only names are printed. With it, each entry also
/// carries its provider details and registration dates.
pub fn list(args: &ListArgs, registry: &ProviderRegistry, out: &mut impl Write) -> anyhow::Result<()> {
    let domains = registry.list_all_domain_info();
    match args.format {
        OutputFormat::Json if args.detail => write_json(domains, out)?,
        OutputFormat::Json => write_json(domains.into_iter().map(|d| d.name).collect::<Vec<_>>(), out)?,
        OutputFormat::Table if args.detail => write_detail_table(&domains, out)?,
        OutputFormat::Table => write_name_table(&domains, out)?,
        OutputFormat::Simple => {
            for d in &domains {
                writeln!(out, "{}", d.name)?;
            }
        }
    }
    Ok(())
}

fn write_json<T: Serialize>(domains: Vec<T>, out: &mut impl Write) -> anyhow::Result<()> {
    let listing = DomainListing { total: domains.len(), domains };
    serde_json::to_writer_pretty(&mut *out, &listing)?;
    writeln!(out)?;
    Ok(())
}

fn write_name_table(domains: &[DomainInfo], out: &mut impl Write) -> std::io::Result<()> {
    if domains.is_empty() {
        return writeln!(out, "No domains found");
    }

    writeln!(out, "DOMAINS")?;
    writeln!(out, "{}", "-".repeat(40))?;
    for d in domains {
        writeln!(out, "{}", d.name)?;
    }
    writeln!(out)?;
    writeln!(out, "Total: {} domain(s)", domains.len())
}

fn write_detail_table(domains: &[DomainInfo], out: &mut impl Write) -> std::io::Result<()> {
    if domains.is_empty() {
        return writeln!(out, "No domains found");
    }

    let rows: Vec<[String; 5]> = domains
        .iter()
        .map(|d| {
            [
                d.name.clone(),
                d.provider.clone(),
                d.status.to_string(),
                date_cell(d.created_at),
                date_cell(d.expires_at),
            ]
        })
        .collect();

    let header = ["DOMAIN", "PROVIDER", "STATUS", "CREATED", "EXPIRES"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    write_row(out, &header, &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    writeln!(out)?;
    writeln!(out, "Total: {} domain(s)", domains.len())
}

fn write_row<S: AsRef<str>>(out: &mut impl Write, cells: &[S], widths: &[usize]) -> std::io::Result<()> {
    let line: Vec<String> =
        cells.iter().zip(widths).map(|(cell, w)| format!("{:<w$}", cell.as_ref(), w = *w)).collect();
    writeln!(out, "{}", line.join("  ").trim_end())
}

fn date_cell(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_else(|| "-".to_owned())
}

#[cfg(test)]
#[path = "domain_tests.rs"]
mod tests;
