// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::provider::testing::StaticProvider;

use super::*;

fn registry() -> anyhow::Result<ProviderRegistry> {
    let registry = ProviderRegistry::new();
    registry.register(Arc::new(StaticProvider::new("beta", &["zeta.io"])))?;
    registry.register(Arc::new(StaticProvider::new("alpha", &["example.com", "b.example.org"])))?;
    Ok(registry)
}

fn render(format: OutputFormat, detail: bool, registry: &ProviderRegistry) -> anyhow::Result<String> {
    let mut out = Vec::new();
    list(&ListArgs { format, detail }, registry, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn table_lists_names_only() -> anyhow::Result<()> {
    let text = render(OutputFormat::Table, false, &registry()?)?;
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "DOMAINS");
    assert_eq!(lines[1], "-".repeat(40));
    assert_eq!(lines[2..5], ["b.example.org", "example.com", "zeta.io"]);
    assert_eq!(lines[6], "Total: 3 domain(s)");
    Ok(())
}

#[test]
fn detail_table_is_sorted_and_aligned() -> anyhow::Result<()> {
    let text = render(OutputFormat::Table, true, &registry()?)?;
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "DOMAIN         PROVIDER  STATUS  CREATED  EXPIRES");
    assert_eq!(lines[1], "b.example.org  alpha     ACTIVE  -        -");
    assert_eq!(lines[2], "example.com    alpha     ACTIVE  -        -");
    assert_eq!(lines[3], "zeta.io        beta      ACTIVE  -        -");
    assert_eq!(lines[5], "Total: 3 domain(s)");
    Ok(())
}

#[yare::parameterized(
    names = { false },
    detail = { true },
)]
fn empty_table_says_so(detail: bool) {
    let text = render(OutputFormat::Table, detail, &ProviderRegistry::new()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(text, "No domains found\n");
}

#[yare::parameterized(
    names = { false },
    detail = { true },
)]
fn simple_prints_one_name_per_line(detail: bool) {
    let registry = registry().unwrap_or_else(|e| panic!("{e}"));
    let text = render(OutputFormat::Simple, detail, &registry).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(text, "b.example.org\nexample.com\nzeta.io\n");
}

#[test]
fn simple_empty_prints_nothing() -> anyhow::Result<()> {
    assert_eq!(render(OutputFormat::Simple, false, &ProviderRegistry::new())?, "");
    Ok(())
}

#[test]
fn json_lists_names() -> anyhow::Result<()> {
    let text = render(OutputFormat::Json, false, &registry()?)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    assert_eq!(value["total"], 3);
    assert_eq!(value["domains"], serde_json::json!(["b.example.org", "example.com", "zeta.io"]));
    Ok(())
}

#[test]
fn json_detail_has_provider_and_status() -> anyhow::Result<()> {
    let text = render(OutputFormat::Json, true, &registry()?)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;

    assert_eq!(value["total"], 3);
    let names: Vec<&str> =
        value["domains"].as_array().into_iter().flatten().filter_map(|d| d["name"].as_str()).collect();
    assert_eq!(names, ["b.example.org", "example.com", "zeta.io"]);
    assert_eq!(value["domains"][0]["status"], "ACTIVE");
    assert_eq!(value["domains"][0]["provider"], "alpha");
    Ok(())
}

#[test]
fn json_empty_listing() -> anyhow::Result<()> {
    let text = render(OutputFormat::Json, false, &ProviderRegistry::new())?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["total"], 0);
    assert_eq!(value["domains"], serde_json::json!([]));
    Ok(())
}

#[test]
fn date_cells_show_minute_or_dash() {
    let at = DateTime::parse_from_rfc3339("2027-03-04T05:06:07Z")
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(date_cell(Some(at)), "2027-03-04 05:06");
    assert_eq!(date_cell(None), "-");
}
