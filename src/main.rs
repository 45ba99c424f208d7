use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use diagramkit::{
    init_logging, DesignerState, DiagramError, DiagramFile, EditorConfig, EventBus,
    ShapeRegistry, BUILD_DATE, VERSION,
};

#[derive(Parser, Debug)]
#[command(
    name = "diagramkit",
    version,
    about = "Inspect and validate a DiagramKit diagram file"
)]
struct Cli {
    /// Diagram file to load (.json)
    file: PathBuf,

    /// Editor configuration file (.json or .toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    if let Some(path) = path {
        return EditorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    match EditorConfig::default_path() {
        Ok(path) if path.exists() => EditorConfig::load_or_default(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        _ => Ok(EditorConfig::default()),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let file = DiagramFile::load_from_file(&cli.file)?;

    let mut state = DesignerState::with_config(
        Arc::new(ShapeRegistry::builtin()),
        Arc::new(EventBus::new()),
        config,
    );
    state
        .open(file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    let doc = state.document();
    if !state.metadata.title.is_empty() {
        println!("Title: {}", state.metadata.title);
    }
    println!("Nodes: {}", doc.node_count());
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for node in doc.nodes() {
        *by_type.entry(node.shape_type.as_str()).or_default() += 1;
    }
    for (shape_type, count) in by_type {
        println!("  {}: {}", shape_type, count);
    }
    println!("Edges: {}", doc.edge_count());
    if let Some(bounds) = doc.bounds() {
        println!(
            "Bounds: ({}, {}) {} x {}",
            bounds.x, bounds.y, bounds.width, bounds.height
        );
    }

    let cycles = doc.detect_cycles();
    if cycles.is_empty() {
        println!("Cycles: none");
    } else {
        println!("Cycles: {}", cycles.len());
        for cycle in cycles {
            let path: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
            println!("  {}", path.join(" -> "));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging() {
        eprintln!("warning: logging unavailable: {:#}", err);
    }
    tracing::debug!("diagramkit {} (built {})", VERSION, BUILD_DATE);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            let malformed = err
                .chain()
                .filter_map(|cause| cause.downcast_ref::<DiagramError>())
                .any(DiagramError::is_malformed);
            if malformed {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
