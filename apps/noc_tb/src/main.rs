// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use anyhow::Context;
use env_logger::{Env, Target};
use structopt::StructOpt;

use harness::{
    HarnessConfig, IdealMesh, NullTrace, RunSummary, Simulation, TraceSink, UniformRandom,
    VcdTrace,
};

#[derive(StructOpt)]
#[structopt(
    name = "noc-tb",
    about = "Random traffic testbench for a grid network-on-chip"
)]
struct Arguments {
    /// YAML file with harness parameters; flags below override it
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Traffic seed; random when neither here nor in the config
    #[structopt(short, long)]
    seed: Option<u64>,
    /// Routers along one dimension of the grid (1 to 4)
    #[structopt(short, long)]
    grid_width: Option<usize>,
    /// Number of half-cycle steps to simulate
    #[structopt(long)]
    cycles: Option<u64>,
    /// Waveform output file
    #[structopt(long, parse(from_os_str))]
    vcd: Option<PathBuf>,
    /// Do not write a waveform
    #[structopt(long)]
    no_trace: bool,
}

fn load_config(args: &Arguments) -> anyhow::Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(width) = args.grid_width {
        config.grid_width = width;
    }
    if let Some(cycles) = args.cycles {
        config.max_sim_time = cycles;
    }
    if let Some(vcd) = &args.vcd {
        config.vcd_path = Some(vcd.clone());
    }
    if args.no_trace {
        config.vcd_path = None;
    }
    if config.seed.is_none() {
        config.seed = Some(rand::random());
    }
    config.validate()?;
    Ok(config)
}

fn run(config: &HarnessConfig) -> anyhow::Result<RunSummary> {
    let grid = config.grid()?;
    let seed = config.seed.unwrap_or_default();
    log::info!(
        "Simulating a {}x{} grid for {} steps, seed {}",
        grid.width,
        grid.width,
        config.max_sim_time,
        seed
    );
    let trace: Box<dyn TraceSink> = match &config.vcd_path {
        Some(path) => Box::new(
            VcdTrace::create(path, grid)
                .with_context(|| format!("Failed to create VCD file {}", path.display()))?,
        ),
        None => Box::new(NullTrace),
    };
    let simulation = Simulation::new(
        config,
        IdealMesh::new(grid),
        trace,
        UniformRandom::from_seed(seed),
    )?;
    simulation.run()
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::from_args();

    let _logger = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .try_init();

    let config = load_config(&args)?;
    let summary = run(&config)?;
    if summary.mismatches() > 0 {
        log::error!(
            "{} of {} delivery checks failed",
            summary.mismatches(),
            summary.verdicts.len()
        );
    }
    Ok(())
}
