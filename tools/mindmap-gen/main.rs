use clap::Parser;
use kumitate::graph::{WireEdge, WireMetadata, WireNode};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::fs;

/// A CLI tool to generate random mind maps for the Kumitate converter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_mind_map.json")]
    output: String,

    /// Identifier of the generated mind map
    #[arg(long, default_value = "generated")]
    id: String,

    /// Total number of nodes, root included
    #[arg(short, long, default_value_t = 30)]
    nodes: usize,

    /// Deepest level a node may sit at; the root is level 0
    #[arg(short, long, default_value_t = 3)]
    depth: usize,

    /// Number of dependency edges between random nodes
    #[arg(short, long, default_value_t = 10)]
    edges: usize,

    /// Chance (0.0 to 1.0) that a node carries task metadata
    #[arg(long, default_value_t = 0.5)]
    metadata: f64,
}

#[derive(Serialize)]
struct GeneratedMindMap {
    id: String,
    title: String,
    nodes: Vec<WireNode>,
    edges: Vec<WireEdge>,
}

const TOPICS: [&str; 12] = [
    "Research", "Design", "Build", "Review", "Launch", "Budget", "Hiring", "Docs",
    "Testing", "Outreach", "Support", "Planning",
];

const PRIORITIES: [&str; 4] = ["low", "medium", "high", "urgent"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.nodes == 0 {
        eprintln!("Error: --nodes must be at least 1");
        std::process::exit(1);
    }
    if !(0.0..=1.0).contains(&cli.metadata) {
        eprintln!("Error: --metadata ({}) must be between 0.0 and 1.0", cli.metadata);
        std::process::exit(1);
    }

    println!(
        "Generating a mind map with {} node(s), depth {} and {} edge(s)...",
        cli.nodes, cli.depth, cli.edges
    );

    let nodes = generate_nodes(&mut rng, cli.nodes, cli.depth, cli.metadata);
    let edges = generate_edges(&mut rng, &nodes, cli.edges);

    let mind_map = GeneratedMindMap {
        title: format!("Generated plan ({} nodes)", nodes.len()),
        id: cli.id,
        nodes,
        edges,
    };

    let json_output = serde_json::to_string_pretty(&mind_map)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved mind map to '{}'",
        cli.output
    );

    Ok(())
}

/// Grows a random tree: every new node hangs off an existing node that still has
/// room below it.
fn generate_nodes(
    rng: &mut impl Rng,
    count: usize,
    max_depth: usize,
    metadata: f64,
) -> Vec<WireNode> {
    let mut nodes = Vec::with_capacity(count);
    let mut depths = Vec::with_capacity(count);

    nodes.push(WireNode {
        id: "n0".to_string(),
        label: "Plan".to_string(),
        description: Some("Generated root".to_string()),
        color: Some("#4f46e5".to_string()),
        parent_id: None,
        metadata: None,
    });
    depths.push(0);

    for i in 1..count {
        let candidates: Vec<usize> = (0..nodes.len())
            .filter(|&n| depths[n] < max_depth)
            .collect();
        let parent = candidates.choose(rng).copied().unwrap_or(0);
        let topic = TOPICS.choose(rng).copied().unwrap_or("Item");
        let parent_id = nodes[parent].id.clone();
        let node_metadata = rng.random_bool(metadata).then(|| generate_metadata(rng));
        nodes.push(WireNode {
            id: format!("n{}", i),
            label: format!("{} {}", topic, i),
            description: None,
            color: None,
            parent_id: Some(parent_id),
            metadata: node_metadata,
        });
        depths.push(depths[parent] + 1);
    }
    println!("-> Generated {} node(s).", nodes.len());
    nodes
}

fn generate_metadata(rng: &mut impl Rng) -> WireMetadata {
    let month = rng.random_range(1..=12);
    let day = rng.random_range(1..=28);
    WireMetadata {
        priority: PRIORITIES
            .choose(rng)
            .map(|p| serde_json::Value::String(p.to_string())),
        due_date: Some(serde_json::Value::String(format!(
            "2026-{:02}-{:02}",
            month, day
        ))),
        start_date: None,
        parent_project_id: None,
    }
}

/// Picks random node pairs. Some will land on projects and be ignored by the
/// converter, which is intended.
fn generate_edges(rng: &mut impl Rng, nodes: &[WireNode], count: usize) -> Vec<WireEdge> {
    if nodes.len() < 2 {
        return Vec::new();
    }
    let edges: Vec<WireEdge> = (0..count)
        .map(|i| {
            let source = rng.random_range(0..nodes.len());
            let mut target = rng.random_range(0..nodes.len() - 1);
            if target >= source {
                target += 1;
            }
            WireEdge {
                id: format!("e{}", i),
                source: nodes[source].id.clone(),
                target: nodes[target].id.clone(),
                label: None,
            }
        })
        .collect();
    println!("-> Generated {} edge(s).", edges.len());
    edges
}
