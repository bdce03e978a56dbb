use clap::{Parser, ValueEnum};
use kumitate::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// A mind map file bundles the record's identity with its node and edge lists.

#[derive(Deserialize)]
struct MindMapFile {
    id: String,
    #[serde(default)]
    title: Option<String>,
    nodes: Vec<WireNode>,
    #[serde(default)]
    edges: Vec<WireEdge>,
}

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TierCli {
    Free,
    Pro,
    Team,
}

impl From<TierCli> for PlanTier {
    fn from(tier: TierCli) -> Self {
        match tier {
            TierCli::Free => PlanTier::Free,
            TierCli::Pro => PlanTier::Pro,
            TierCli::Team => PlanTier::Team,
        }
    }
}

/// Converts a mind map into projects and tasks against a persisted workspace
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the mind map JSON file
    mind_map_path: String,

    /// Workspace snapshot to load and save; created if missing
    #[arg(short, long, default_value = "workspace.bin")]
    state: String,

    /// Optional settings JSON (engine options and plan quotas)
    #[arg(long)]
    settings: Option<String>,

    /// Subscription tier of the converting owner
    #[arg(short, long, value_enum, default_value = "pro")]
    tier: TierCli,

    /// Converting user; also the owner of newly inserted mind maps
    #[arg(short, long, default_value = "local")]
    user: String,

    /// Owning team for newly inserted mind maps instead of the user
    #[arg(long)]
    team: Option<String>,

    /// Write the resulting node-to-resource mapping JSON here
    #[arg(long)]
    mapping_out: Option<String>,

    /// Print the per-node outcomes
    #[arg(short, long)]
    verbose: bool,
}

/// INFO unless `RUST_LOG`-style directives say otherwise.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

fn main() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .init();

    let cli = Cli::parse();
    run_conversion(cli);
}

fn run_conversion(cli: Cli) {
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let load_start = Instant::now();
    let mind_map_json = fs::read_to_string(&cli.mind_map_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read mind map file '{}': {}",
            &cli.mind_map_path, e
        ))
    });
    let file: MindMapFile = serde_json::from_str(&mind_map_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse mind map JSON: {}", e)));

    let settings = match &cli.settings {
        Some(path) => Settings::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load settings: {}", e))),
        None => Settings::default(),
    };

    let mut workspace = if Path::new(&cli.state).exists() {
        MemoryWorkspace::from_file(&cli.state)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workspace: {}", e)))
    } else {
        println!("No workspace at '{}'. Starting a fresh one.", cli.state);
        MemoryWorkspace::new()
    };
    let load_duration = load_start.elapsed();

    // --- 2. Request Assembly ---
    let nodes = serde_json::to_string(&file.nodes)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode nodes: {}", e)));
    let edges = serde_json::to_string(&file.edges)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode edges: {}", e)));

    let mut request = ConversionRequest::new(&file.id, &cli.user, cli.tier.into());
    if workspace.mind_maps.get(&file.id).is_some() {
        request = request.with_graph(nodes, edges);
    } else {
        let owner = match &cli.team {
            Some(team) => Owner::Team(team.clone()),
            None => Owner::User(cli.user.clone()),
        };
        let title = file.title.clone().unwrap_or_else(|| file.id.clone());
        workspace
            .mind_maps
            .insert(MindMap::new(&file.id, owner, title, nodes, edges));
    }

    // --- 3. Conversion ---
    println!("\nStarting Kumitate Conversion...");
    let convert_start = Instant::now();
    let reconciler = Reconciler::builder(settings.quotas, AllowAll)
        .with_config(settings.engine)
        .build();
    let summary = reconciler
        .convert(&mut workspace.store, &mut workspace.mind_maps, request)
        .unwrap_or_else(|e| exit_with_error(&format!("Conversion failed: {}", e)));
    let convert_duration = convert_start.elapsed();

    println!("{}", summary.message);
    if let Some(root) = &summary.root_resource_id {
        println!("  -> Root Project: {}", root);
    }
    if cli.verbose {
        for entry in &summary.outcomes {
            println!("  -> {}: {:?}", entry.node_id, entry.outcome);
        }
    }

    // --- 4. Persistence ---
    let save_start = Instant::now();
    if let Some(path) = &cli.mapping_out {
        let mapping = workspace
            .mind_maps
            .get(&file.id)
            .map(|m| m.mapping.clone())
            .unwrap_or_default();
        let json = mapping
            .to_json()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode mapping: {}", e)));
        fs::write(path, json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
    }
    workspace
        .save(&cli.state)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to save workspace: {}", e)));
    let save_duration = save_start.elapsed();

    // --- 5. Summary ---
    let total_duration = total_start.elapsed();
    println!("\n--- Conversion Summary ---");
    println!("Re-conversion:        {}", summary.is_re_conversion);
    println!("Projects Created:     {}", summary.projects_created);
    println!("Projects Updated:     {}", summary.projects_updated);
    println!("Tasks Created:        {}", summary.tasks_created);
    println!("Tasks Updated:        {}", summary.tasks_updated);
    println!("Resources Deleted:    {}", summary.resources_deleted);
    println!("Dependencies Set:     {}", summary.edges_processed);
    println!("Nodes Skipped:        {}", summary.skipped);

    println!("\n--- Workspace ---");
    println!("Projects:             {}", workspace.store.project_count());
    println!("Tasks:                {}", workspace.store.task_count());
    println!("Mind Maps:            {}", workspace.mind_maps.len());

    println!("\n--- Performance Summary ---");
    println!("File Loading:         {:?}", load_duration);
    println!("Conversion:           {:?}", convert_duration);
    println!("Persistence:          {:?}", save_duration);
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_duration);
    println!();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter("").max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_level_can_be_raised() {
        assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            log_filter("kumitate=trace").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }
}
