//! Integration Test: Core Layering
//!
//! **Policy**: `oria-core` holds no surface concerns. CLI parsing, subscriber
//! setup, DOM state and terminal formatting belong to surface crates.

use std::fs;

use architectural_enforcement::workspace_root;

/// Crates only a surface may depend on
const SURFACE_CRATES: &[&str] = &[
    "clap",
    "dashmap",
    "tracing-subscriber",
    "textwrap",
    "oria-shell",
    "ratatui",
    "crossterm",
];

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut in_dependencies = false;

    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn test_core_has_no_surface_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("core/Cargo.toml"))
        .expect("core/Cargo.toml should be readable");

    let offending: Vec<String> = dependency_names(&manifest)
        .into_iter()
        .filter(|name| SURFACE_CRATES.contains(&name.as_str()))
        .collect();

    assert!(
        offending.is_empty(),
        "oria-core depends on surface crates: {offending:?}"
    );
}

#[test]
fn test_core_sources_do_not_print() {
    let root = workspace_root().join("core/src");
    let mut offenders = Vec::new();

    for entry in walkdir::WalkDir::new(&root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
    {
        let content = fs::read_to_string(entry.path()).unwrap_or_default();
        // Test modules may print freely
        let production = content.split("#[cfg(test)]").next().unwrap_or_default();
        for (idx, line) in production.lines().enumerate() {
            let code = line.split("//").next().unwrap_or_default();
            if code.contains("println!(") || code.contains("eprintln!(") {
                offenders.push(format!("{}:{}", entry.path().display(), idx + 1));
            }
        }
    }

    assert!(offenders.is_empty(), "core prints directly: {offenders:?}");
}

#[test]
fn test_dependency_names_reads_only_dependencies_table() {
    let manifest = r#"
[package]
name = "x"

[dependencies]
# Logging
tracing = "0.1"
tokio = { version = "1", features = ["full"] }

[dev-dependencies]
clap = "4"
"#;
    assert_eq!(dependency_names(manifest), vec!["tracing", "tokio"]);
}
