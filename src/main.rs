use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use toml::Table;

use meshgen::engine::RecordingEngine;
use meshgen::sim::config::SystemConfig;
use meshgen::sim::top::SystemTop;

#[derive(Parser)]
#[command(version, about)]
struct MeshgenArgs {
    #[arg(help="Path to system.toml")]
    config_path: PathBuf,
    #[arg(long, short, help="Write the graph description here instead of stdout")]
    output: Option<PathBuf>,
    #[arg(long, help="Override mesh width")]
    xdim: Option<usize>,
    #[arg(long, help="Override mesh height")]
    ydim: Option<usize>,
    #[arg(long, help="Override NIC debug level (0 disables)")]
    nic_debug: Option<u32>,
    #[arg(long, help="Emit compact JSON")]
    compact: bool,
}

impl MeshgenArgs {
    /// Command-line flags win over the TOML file.
    fn apply(&self, system: &mut SystemConfig) {
        system.mesh.xdim = self.xdim.unwrap_or(system.mesh.xdim);
        system.mesh.ydim = self.ydim.unwrap_or(system.mesh.ydim);
        system.sim.nic_debug = self.nic_debug.unwrap_or(system.sim.nic_debug);
        if let Some(output) = &self.output {
            system.sim.output = Some(output.clone());
        }
        system.sim.pretty &= !self.compact;
    }
}

pub fn main() -> Result<()> {
    env_logger::init();

    let argv = MeshgenArgs::parse();
    let config = fs::read_to_string(&argv.config_path)
        .with_context(|| format!("failed to read config file {}", argv.config_path.display()))?;

    let config_table: Table = toml::from_str(&config).context("cannot parse config toml")?;
    let mut system = SystemConfig::from_table(&config_table).context("invalid system description")?;

    argv.apply(&mut system);

    let mut engine = RecordingEngine::new();
    let top = SystemTop::build(&mut engine, &system).context("cannot build system")?;
    info!(
        "{} endpoints on {} routers, {} nodes, {} links",
        top.endpoints(),
        top.mesh.routers().len(),
        engine.node_count(),
        engine.link_count()
    );

    let graph = engine.into_graph();
    let json = if system.sim.pretty {
        serde_json::to_string_pretty(&graph)?
    } else {
        serde_json::to_string(&graph)?
    };

    match &system.sim.output {
        Some(path) => fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?,
        None => writeln!(io::stdout().lock(), "{json}")?,
    }
    Ok(())
}
