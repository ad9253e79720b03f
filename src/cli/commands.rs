use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Serialize;

use repo_map::analysis::{
    find_circular_dependencies, find_orphaned_infrastructure, find_unused_exports,
    get_dependency_graph,
};
use repo_map::index::{build_usage_index, find_dependents, find_usages, normalize_rel_path};
use repo_map::indexer::{ensure_repo_map, Analysis, AstGrepMatcher, BuildOptions, RepoMapStatus};
use repo_map::{ProjectConfig, RepoMap, REGISTRY};

use super::{Cli, OutputFormat};

/// Config file values overridden by command-line flags.
pub fn build_options(cli: &Cli) -> anyhow::Result<BuildOptions> {
    let config = ProjectConfig::load(&cli.root)
        .with_context(|| format!("Failed to load config from {}", cli.root.display()))?;
    let mut options = BuildOptions::from_config(&config);

    if !cli.languages.is_empty() {
        options.languages = cli.languages.clone();
    }
    if let Some(max_files) = cli.max_files {
        options.max_files = Some(max_files);
    }
    if let Some(secs) = cli.timeout {
        options.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(ref binary) = cli.matcher {
        options.matcher = Some(Arc::new(AstGrepMatcher::with_binary(binary)));
    }
    Ok(options)
}

pub async fn load_status(cli: &Cli) -> anyhow::Result<RepoMapStatus> {
    let options = build_options(cli)?;
    tracing::debug!("Build options: {:?}", options);
    Ok(ensure_repo_map(cli.root.clone(), options).await)
}

/// The map, or an error carrying the fallback reason.
pub fn require_map(status: &RepoMapStatus) -> anyhow::Result<&RepoMap> {
    match status.analysis() {
        Analysis::Full(map) => Ok(map),
        Analysis::Degraded(reason) => bail!("Repo map unavailable: {}", reason),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn show_map(status: &RepoMapStatus, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(status);
    }
    match status.analysis() {
        Analysis::Full(map) => {
            let stats = map.stats();
            println!("Repo map:");
            println!("  Files: {}", stats.file_count);
            println!("  Symbols: {}", stats.symbol_count);
            println!("  Exports: {}", stats.export_count);
            println!("  Imports: {}", stats.import_count);
        }
        Analysis::Degraded(reason) => println!("Repo map unavailable: {}", reason),
    }
    Ok(())
}

fn print_files(files: &[String], empty: &str, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(files);
    }
    if files.is_empty() {
        println!("{}", empty);
    }
    for file in files {
        println!("{}", file);
    }
    Ok(())
}

pub fn usages(map: &RepoMap, file: &str, symbol: &str, format: OutputFormat) -> anyhow::Result<()> {
    let index = build_usage_index(map);
    let file = normalize_rel_path(file);
    let users = find_usages(&index, &file, symbol);
    print_files(&users, &format!("No usages of {} from {}", symbol, file), format)
}

pub fn dependents(map: &RepoMap, file: &str, format: OutputFormat) -> anyhow::Result<()> {
    let index = build_usage_index(map);
    let file = normalize_rel_path(file);
    let users = find_dependents(&index, &file);
    print_files(&users, &format!("Nothing imports {}", file), format)
}

pub fn unused(map: &RepoMap, format: OutputFormat) -> anyhow::Result<()> {
    let unused = find_unused_exports(map);
    if format == OutputFormat::Json {
        return print_json(&unused);
    }
    if unused.is_empty() {
        println!("No unused exports found");
        return Ok(());
    }
    println!("Unused exports ({}):", unused.len());
    for item in unused {
        match item.line {
            Some(line) => println!("  {}:{} {}", item.file, line, item.name),
            None => println!("  {} {}", item.file, item.name),
        }
    }
    Ok(())
}

pub fn orphans(map: &RepoMap, format: OutputFormat) -> anyhow::Result<()> {
    let orphans = find_orphaned_infrastructure(map);
    if format == OutputFormat::Json {
        return print_json(&orphans);
    }
    if orphans.is_empty() {
        println!("No orphaned infrastructure found");
        return Ok(());
    }
    println!("Orphaned infrastructure ({}):", orphans.len());
    for item in orphans {
        println!("  {} {} [{:?}]", item.file, item.name, item.kind);
        println!("    {}", item.reason);
    }
    Ok(())
}

pub fn graph(map: &RepoMap, format: OutputFormat) -> anyhow::Result<()> {
    let graph = get_dependency_graph(map);
    if format == OutputFormat::Json {
        return print_json(&graph);
    }
    println!("Nodes: {}  Edges: {}", graph.nodes.len(), graph.edges.len());
    for edge in graph.edges {
        println!("  {} -> {}", edge.from, edge.to);
    }
    Ok(())
}

pub fn cycles(map: &RepoMap, format: OutputFormat) -> anyhow::Result<()> {
    let cycles = find_circular_dependencies(map);
    if format == OutputFormat::Json {
        return print_json(&cycles);
    }
    if cycles.is_empty() {
        println!("No circular dependencies found");
        return Ok(());
    }
    println!("Circular dependencies ({}):", cycles.len());
    for cycle in cycles {
        let mut chain = cycle.clone();
        if let Some(first) = cycle.first() {
            chain.push(first.clone());
        }
        println!("  {}", chain.join(" -> "));
    }
    Ok(())
}

#[derive(Serialize)]
struct LanguageInfo {
    name: &'static str,
    extensions: &'static [&'static str],
    patterns: usize,
}

pub fn languages(format: OutputFormat) -> anyhow::Result<()> {
    let infos: Vec<LanguageInfo> = REGISTRY
        .supported_languages()
        .into_iter()
        .map(|name| LanguageInfo {
            name,
            extensions: REGISTRY.extensions_for(name),
            patterns: REGISTRY.patterns_for(name).map(|t| t.len()).unwrap_or(0),
        })
        .collect();

    if format == OutputFormat::Json {
        return print_json(&infos);
    }
    for info in infos {
        println!("{} ({}) - {} patterns", info.name, info.extensions.join(", "), info.patterns);
    }
    Ok(())
}

pub fn check_root(root: &Path) -> anyhow::Result<()> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }
    Ok(())
}
