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

use std::io;

use anyhow::Context;

use crate::config::HarnessConfig;
use crate::error::Error;
use crate::model::{DeviceModel, DevicePorts};
use crate::sequencer::{ResetPhase, ResetSequencer};
use crate::trace::TraceSink;
use crate::traffic::{InFlightTransaction, TrafficGenerator, TrafficSource};
use crate::verifier::{DeliveryVerifier, Verdict};
use crate::Cycle;

/// Counters shared by the harness components during a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimulationContext {
    /// Half-cycle steps taken so far.
    pub time: Cycle,
    /// Positive clock edges seen so far, including those before reset.
    pub posedge_count: Cycle,
    /// Latest injected packet; replaced by every injection.
    pub in_flight: Option<InFlightTransaction>,
}

/// What happened during a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub steps: Cycle,
    pub posedges: Cycle,
    pub injected: Vec<InFlightTransaction>,
    pub verdicts: Vec<Verdict>,
}

impl RunSummary {
    pub fn matches(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_match()).count()
    }

    pub fn mismatches(&self) -> usize {
        self.verdicts.len() - self.matches()
    }
}

/// Steps a device model through reset and random traffic.
///
/// The simulation owns the device, its ports and the trace sink; all of them
/// are released when it is dropped, whether or not the run finished.
pub struct Simulation<M, T, S> {
    max_sim_time: Cycle,
    sequencer: ResetSequencer,
    generator: TrafficGenerator<S>,
    verifier: DeliveryVerifier,
    model: M,
    trace: T,
    ports: DevicePorts,
    context: SimulationContext,
    summary: RunSummary,
    last_phase: Option<ResetPhase>,
}

impl<M, T, S> Simulation<M, T, S>
where
    M: DeviceModel,
    T: TraceSink,
    S: TrafficSource,
{
    pub fn new(config: &HarnessConfig, model: M, trace: T, traffic: S) -> Result<Self, Error> {
        config.validate()?;
        let grid = config.grid()?;
        Ok(Simulation {
            max_sim_time: config.max_sim_time,
            sequencer: ResetSequencer::new(config.reset_start, config.reset_end),
            generator: TrafficGenerator::new(grid, config.injection_interval, traffic),
            verifier: DeliveryVerifier::new(grid, config.delivery_latency()),
            model,
            trace,
            ports: DevicePorts::for_grid(grid),
            context: SimulationContext::default(),
            summary: RunSummary::default(),
            last_phase: None,
        })
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    pub fn ports(&self) -> &DevicePorts {
        &self.ports
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn is_finished(&self) -> bool {
        self.context.time >= self.max_sim_time
    }

    /// Advances the simulation by one half cycle.
    ///
    /// The order is fixed: reset and bus clearing, clock toggle, model
    /// evaluation, then on a positive edge injection followed by the delivery
    /// check once the sequencer has settled, and finally the trace dump.
    pub fn step(&mut self) -> io::Result<()> {
        let phase = self.sequencer.apply(self.context.time, &mut self.ports);
        if self.last_phase != Some(phase) {
            log::debug!("Time: {} reset phase {:?}", self.context.time, phase);
            self.last_phase = Some(phase);
        }

        self.ports.clk = !self.ports.clk;
        self.model.eval(&mut self.ports);

        if self.ports.clk {
            self.context.posedge_count += 1;
            log::trace!(
                "Time: {} posedge {}",
                self.context.time,
                self.context.posedge_count
            );
            if self.sequencer.settled(self.context.time) {
                if let Some(sent) = self.generator.on_posedge(&mut self.context, &mut self.ports) {
                    self.summary.injected.push(sent);
                }
                if let Some(verdict) = self.verifier.on_posedge(&self.context, &self.ports) {
                    self.summary.verdicts.push(verdict);
                }
            }
        }

        self.trace.dump(self.context.time, &self.ports)?;
        self.context.time += 1;
        Ok(())
    }

    /// Runs to `max_sim_time` and closes the trace. Delivery mismatches do not
    /// stop the run; trace failures do.
    pub fn run(mut self) -> anyhow::Result<RunSummary> {
        self.trace
            .open(&self.ports)
            .context("Failed to open the trace")?;
        while !self.is_finished() {
            self.step()
                .with_context(|| format!("Failed to trace step {}", self.context.time))?;
        }
        self.trace.close().context("Failed to close the trace")?;

        self.summary.steps = self.context.time;
        self.summary.posedges = self.context.posedge_count;
        log::info!(
            "Simulated {} steps: {} packets sent, {} checked, {} matched, {} mismatched",
            self.summary.steps,
            self.summary.injected.len(),
            self.summary.verdicts.len(),
            self.summary.matches(),
            self.summary.mismatches()
        );
        Ok(self.summary)
    }
}
