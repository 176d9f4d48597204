//! modsplit command-line driver
//!
//! # Usage
//!
//! ```bash
//! # Refine a planted barbell with the spectral walk
//! modsplit --generator barbell -l 10 --iter-size 8 --verbose
//!
//! # Refine an edge list and keep the run artifact
//! modsplit --edgelist karate.txt --subset bfs --seed 7 --output run.json
//! ```

use clap::{Parser, ValueEnum};
use modsplit::generators::{barbell, connected_caveman, random_partition, two_triangles, BenchmarkGraph};
use modsplit::{
    ExactSubsetSolver, Graph, ModularityMatrix, RefinementConfig, RunArtifact, SingleLevelRefinement,
    SubproblemSolver, SubsetMethod,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Generator {
    Barbell,
    Caveman,
    RandomPartition,
    TwoTriangles,
}

#[derive(Parser)]
#[command(name = "modsplit", version)]
#[command(about = "Two-way modularity maximization by local refinement", long_about = None)]
struct Cli {
    /// Edge list file (`u v [weight]` per line, `%` or `#` comments).
    /// A repeated pair is one edge; the last weight given for it wins
    #[arg(long, conflicts_with = "generator", required_unless_present = "generator")]
    edgelist: Option<PathBuf>,

    /// Benchmark graph with a planted split
    #[arg(long, value_enum)]
    generator: Option<Generator>,

    /// Left size (barbell clique size, caveman clique count)
    #[arg(short, long, default_value = "10")]
    left: usize,

    /// Right size (caveman clique size); defaults to the left size.
    /// A barbell has equal halves, so it rejects a different value
    #[arg(short, long)]
    right: Option<usize>,

    /// Intra-block edge probability for the random partition
    #[arg(long, default_value = "0.5")]
    p_in: f64,

    /// Inter-block edge probability for the random partition
    #[arg(long, default_value = "0.05")]
    p_out: f64,

    /// JSON configuration file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Vertices per subproblem
    #[arg(long)]
    iter_size: Option<usize>,

    /// Non-improving iterations tolerated before stopping
    #[arg(long)]
    stopping_criteria: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Subset selection: spectral, bfs or top_gain
    #[arg(long)]
    subset: Option<SubsetMethod>,

    /// Write the run artifact here (never overwrites)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log per-iteration progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(path) = &cli.output {
        if path.exists() {
            return Err(format!("{} already exists", path.display()).into());
        }
    }

    let bench = load_graph(&cli)?;
    let mut config = match &cli.config {
        Some(path) => RefinementConfig::from_json(&fs::read_to_string(path)?)?,
        None => RefinementConfig::new(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(iter_size) = cli.iter_size {
        config = config.with_iter_size(iter_size);
    }
    if let Some(stopping) = cli.stopping_criteria {
        config = config.with_stopping_criteria(stopping);
    }
    if let Some(method) = cli.subset {
        config = config.with_subset_method(method);
    }
    if let Some(solution) = &bench.solution {
        let model = ModularityMatrix::from_graph(&bench.graph)?;
        config = config.with_reference_assignment(&model, solution)?;
    }

    let solver = ExactSubsetSolver::new();
    let outcome = SingleLevelRefinement::new(config.clone())?.run_with_solver(&bench.graph, &solver)?;
    let artifact = RunArtifact::new(outcome, &config, &bench.graph, Some(bench.name), solver.name());

    println!(
        "{}: {} vertices, modularity {:.6} after {} iterations ({:?})",
        artifact.graph.as_deref().unwrap_or("graph"),
        artifact.n_vertices,
        artifact.best_modularity_scaled,
        artifact.iterations,
        artifact.stop_reason,
    );
    if let Some(optimal) = artifact.optimal_modularity {
        println!(
            "reference modularity {:.6}",
            modsplit::scaled_modularity(optimal, artifact.total_weight)
        );
    }

    if let Some(path) = &cli.output {
        artifact.write_json(path)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn load_graph(cli: &Cli) -> Result<BenchmarkGraph, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.edgelist {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok(BenchmarkGraph {
            name,
            graph: read_edgelist(path)?,
            solution: None,
        });
    }
    generate(
        cli.generator.unwrap_or(Generator::TwoTriangles),
        cli.left,
        cli.right,
        cli.p_in,
        cli.p_out,
        cli.seed.unwrap_or(42),
    )
}

fn generate(
    generator: Generator,
    left: usize,
    right: Option<usize>,
    p_in: f64,
    p_out: f64,
    seed: u64,
) -> Result<BenchmarkGraph, Box<dyn std::error::Error>> {
    let right_size = right.unwrap_or(left);
    let bench = match generator {
        Generator::Barbell => {
            if right_size != left {
                return Err(format!("barbell needs equal halves, got {left} and {right_size}").into());
            }
            barbell(left)?
        }
        Generator::Caveman => connected_caveman(left, right_size)?,
        Generator::RandomPartition => random_partition(left, right_size, p_in, p_out, seed)?,
        Generator::TwoTriangles => two_triangles()?,
    };
    Ok(bench)
}

fn read_edgelist(path: &Path) -> Result<Graph, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    parse_edgelist(&text, &path.display().to_string())
}

/// Parse a whitespace-separated edge list, relabelling vertices by first appearance.
///
/// Both orientations of a pair name the same undirected edge, which is kept
/// once. A missing weight column means unit weight.
fn parse_edgelist(text: &str, source: &str) -> Result<Graph, Box<dyn std::error::Error>> {
    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut slots: HashMap<(usize, usize), usize> = HashMap::new();
    let mut edges: Vec<(usize, usize, f64)> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(format!("{source}:{}: expected `u v [weight]`", lineno + 1).into());
        }
        let mut id = |label: &str| {
            let next = ids.len();
            *ids.entry(label.to_string()).or_insert(next)
        };
        let u = id(fields[0]);
        let v = id(fields[1]);
        let w = match fields.get(2) {
            Some(w) => w
                .parse::<f64>()
                .map_err(|e| format!("{source}:{}: bad weight {w}: {e}", lineno + 1))?,
            None => 1.0,
        };
        let key = (u.min(v), u.max(v));
        match slots.get(&key) {
            Some(&slot) => edges[slot].2 = w,
            None => {
                let _ = slots.insert(key, edges.len());
                edges.push((u, v, w));
            }
        }
    }
    Ok(Graph::from_edges(ids.len(), &edges)?)
}
