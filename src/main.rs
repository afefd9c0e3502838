use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use addon_graph::config::{GraphConfig, ImageFormat};
use addon_graph::export::ListFormat;
use addon_graph::pipeline::{self, RunReport};

#[derive(Parser)]
#[command(name = "addon-graph")]
#[command(version)]
#[command(about = "Module dependency graph analyzer for Odoo-style addons trees")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the dependency graph, and subgraphs for a root module
    Graph(GraphArgs),
    /// Report circular dependencies between modules
    Cycles {
        /// Path to the addons directory
        #[arg(short, long)]
        path: PathBuf,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
struct GraphArgs {
    /// Path to the addons directory
    #[arg(short, long)]
    path: PathBuf,

    /// Module to analyze, or 'all' for the full graph only
    #[arg(short, long)]
    module_name: Option<String>,

    /// Output file name for the graph (without extension)
    #[arg(short, long)]
    output: Option<String>,

    /// Directory to save output files (defaults to the addons directory)
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Image format: svg, pdf or png
    #[arg(short, long, default_value = "svg")]
    format: ImageFormat,

    /// Output file path for the adjacency list
    #[arg(short = 't', long)]
    list: Option<PathBuf>,

    /// Adjacency list format: text, csv or json
    #[arg(long, default_value = "text")]
    list_format: ListFormat,

    /// Include code complexity metrics (requires eslintcc)
    #[arg(long)]
    metrics: bool,

    /// Output file path for the complexity metrics JSON
    #[arg(long, requires = "metrics")]
    metrics_output: Option<PathBuf>,

    /// Only write DOT files, do not invoke Graphviz
    #[arg(long)]
    no_render: bool,
}

impl GraphArgs {
    fn into_config(self) -> GraphConfig {
        let mut config = GraphConfig::new(self.path)
            .with_format(self.format)
            .with_render(!self.no_render);
        if let Some(dir) = self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(name) = self.output {
            config = config.with_output_name(name);
        }
        if let Some(module) = self.module_name {
            config = config.with_root_module(module);
        }
        if let Some(list) = self.list {
            config = config.with_list(list, self.list_format);
        }
        if self.metrics {
            config = config.with_metrics(self.metrics_output);
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Graph(args)) => {
            let config = args.into_config();
            let report = pipeline::run(&config).context("Graph generation failed")?;
            print_report(&config, &report);
        }
        Some(Commands::Cycles { path }) => {
            let graph = pipeline::scan(&path).context("Cycle detection failed")?;
            let cycles = graph.detect_cycles();
            if cycles.is_empty() {
                println!("No circular dependencies found.");
            }
            for cycle in cycles {
                println!("{}", cycle.cycle_path());
            }
        }
        Some(Commands::Version) => {
            println!("addon-graph v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("addon-graph - Module dependency graph analyzer");
            println!("Run 'addon-graph graph -p <addons_path>' to generate a dependency graph");
            println!("Run 'addon-graph --help' for more information");
        }
    }

    Ok(())
}

fn print_report(config: &GraphConfig, report: &RunReport) {
    println!("\nFiles generated:");
    for graph in &report.graphs {
        println!("- DOT file ({}): {}", graph.label, graph.dot_path.display());
        if let Some(image) = &graph.image_path {
            println!(
                "- {} file ({}): {}",
                config.format.extension().to_uppercase(),
                graph.label,
                image.display()
            );
        }
    }
    for list in &report.lists {
        println!("- Adjacency list: {}", list.display());
    }

    if let Some(root) = &report.missing_root {
        println!("\nModule '{}' not found in the dependency graph.", root);
    }
    if !report.cycles.is_empty() {
        println!("\nCircular dependencies:");
        for cycle in &report.cycles {
            println!("  {}", cycle.cycle_path());
        }
    }

    println!("\nDone!");
}
