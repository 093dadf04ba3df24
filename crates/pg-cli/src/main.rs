//! plotgroup CLI
//!
//! Builds the groups described by a figure file and inspects, snapshots or
//! removes them.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pg_container::Artist;
use pg_surface::Surface;
use tracing_subscriber::EnvFilter;

use crate::config::FigureConfig;

#[derive(Parser)]
#[command(name = "plotgroup", version)]
#[command(about = "Build and inspect grouped plot series from a figure description")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter such as `debug` or `pg_container=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every group with its label, kind and leaf count.
    Inspect {
        /// Figure description (TOML)
        figure: PathBuf,
    },

    /// Write the built surface as a JSON snapshot.
    Snapshot {
        /// Figure description (TOML)
        figure: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Remove the group carrying a label and print what remains in the legend.
    Remove {
        /// Figure description (TOML)
        figure: PathBuf,
        /// Label of the group to remove
        #[arg(short, long)]
        label: String,
    },
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn group_lines(surface: &Surface) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, group) in surface.groups().iter().enumerate() {
        lines.push(format!(
            "[{index}] {group} kind={} label={} leaves={}",
            group.kind().name(),
            group.label().as_deref().unwrap_or("-"),
            group.leaves().count(),
        ));
        for leaf in group.leaves() {
            let state = if surface.contains(leaf.id()) { "" } else { " (detached)" };
            lines.push(format!("    {}{state}", leaf.describe()));
        }
    }
    lines
}

fn print_legend(surface: &Surface) {
    let entries = surface.legend_entries();
    if entries.is_empty() {
        println!("legend: (empty)");
        return;
    }
    println!("legend:");
    for (label, group) in entries {
        println!("  {label} ({})", group.kind().name());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Inspect { figure } => {
            let surface = FigureConfig::load(&figure)?.build()?;
            println!(
                "{}: {} groups, {} primitives",
                figure.display(),
                surface.groups().len(),
                surface.primitive_count()
            );
            for line in group_lines(&surface) {
                println!("{line}");
            }
            print_legend(&surface);
        }

        Commands::Snapshot { figure, out } => {
            let surface = FigureConfig::load(&figure)?.build()?;
            let json = surface
                .save_state()
                .to_json()
                .context("failed to encode snapshot")?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    tracing::info!(path = %path.display(), "snapshot written");
                }
                None => println!("{json}"),
            }
        }

        Commands::Remove { figure, label } => {
            let surface = FigureConfig::load(&figure)?.build()?;
            surface
                .remove_group(&label)
                .with_context(|| format!("failed to remove `{label}`"))?;
            println!(
                "removed `{label}`: {} groups, {} primitives left",
                surface.groups().len(),
                surface.primitive_count()
            );
            print_legend(&surface);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn group_lines_describe_each_leaf() {
        let figure = FigureConfig::from_toml(
            "[[series]]\nkind = \"stem\"\nx = [0.0]\ny = [2.0]\nlabel = \"s\"\n",
        )
        .unwrap();
        let surface = figure.build().unwrap();
        let stem = surface.find_group("s").unwrap();
        stem.stemlines()[0].remove().unwrap();

        assert_eq!(
            group_lines(&surface),
            vec![
                "[0] <Container object of 3 artists> kind=stem label=s leaves=3".to_string(),
                "    marker artist#0 (1 points)".to_string(),
                "    line artist#1 (2 points) (detached)".to_string(),
                "    line artist#2 (2 points)".to_string(),
            ]
        );
    }
}
