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

use crate::error::Error;
use crate::grid::GridSize;
use crate::Cycle;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Default waveform file, written to the working directory.
pub const DEFAULT_VCD_FILE: &str = "waveform.vcd";

/// Parameters of one harness run.
///
/// Constructed programmatically or read from a YAML file; every field has a
/// default, so a config file only needs the values it changes.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Routers along one dimension of the grid.
    pub grid_width: usize,
    /// Number of half-cycle steps to simulate.
    pub max_sim_time: Cycle,
    /// Reset is held active for `reset_start < time <= reset_end`.
    pub reset_start: Cycle,
    pub reset_end: Cycle,
    /// Inject a packet every this many positive edges.
    pub injection_interval: Cycle,
    /// Seed of the traffic RNG; drawn at random when absent.
    pub seed: Option<u64>,
    /// Waveform destination; `None` disables tracing.
    pub vcd_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            grid_width: 4,
            max_sim_time: 1000,
            reset_start: 2,
            reset_end: 5,
            injection_interval: 10,
            seed: None,
            vcd_path: Some(PathBuf::from(DEFAULT_VCD_FILE)),
        }
    }
}

impl HarnessConfig {
    pub fn from_file(file_name: &Path) -> anyhow::Result<Self> {
        let file = File::open(file_name)
            .with_context(|| format!("Config file {} not found", file_name.display()))?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse config {}", file_name.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_str(config: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(config).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        GridSize::new(self.grid_width)?;
        if self.injection_interval == 0 {
            return Err(Error::InvalidInjectionInterval);
        }
        if self.reset_start >= self.reset_end {
            return Err(Error::InvalidResetWindow {
                start: self.reset_start,
                end: self.reset_end,
            });
        }
        if self.max_sim_time <= self.reset_end {
            return Err(Error::InvalidSimTime(self.max_sim_time));
        }
        Ok(())
    }

    pub fn grid(&self) -> Result<GridSize, Error> {
        GridSize::new(self.grid_width)
    }

    /// Positive edges between an injection and its delivery check.
    pub fn delivery_latency(&self) -> Cycle {
        2 * self.grid_width as Cycle
    }

    pub fn bus_words(&self) -> Result<usize, Error> {
        Ok(self.grid()?.bus_words())
    }
}
