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

use crate::codec;
use crate::grid::{GridSize, RouterAddress};
use crate::model::DevicePorts;
use crate::sim::SimulationContext;
use crate::traffic::InFlightTransaction;
use crate::Cycle;

/// Outcome of one delivery check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Match {
        cycle: Cycle,
        router: RouterAddress,
        payload: u64,
    },
    Mismatch {
        cycle: Cycle,
        router: RouterAddress,
        expected: u64,
        received: u64,
    },
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match { .. })
    }

    /// Positive edge on which the check ran.
    pub fn cycle(&self) -> Cycle {
        match self {
            Verdict::Match { cycle, .. } | Verdict::Mismatch { cycle, .. } => *cycle,
        }
    }
}

/// Checks the output bus a fixed number of edges after each injection.
#[derive(Clone, Copy, Debug)]
pub struct DeliveryVerifier {
    grid: GridSize,
    latency: Cycle,
}

impl DeliveryVerifier {
    pub fn new(grid: GridSize, latency: Cycle) -> Self {
        DeliveryVerifier { grid, latency }
    }

    /// The transaction whose check is scheduled for the current edge, if any.
    pub fn due<'a>(&self, context: &'a SimulationContext) -> Option<&'a InFlightTransaction> {
        context
            .in_flight
            .as_ref()
            .filter(|t| context.posedge_count == t.sent_cycle + self.latency)
    }

    /// Compares the destination's output slot with the expected payload.
    /// Only observes; a mismatch is reported, not acted upon.
    pub fn on_posedge(&self, context: &SimulationContext, ports: &DevicePorts) -> Option<Verdict> {
        let transaction = self.due(context)?;
        let router = transaction.destination;
        let received = codec::decode(&ports.router_to_ni, router.id(self.grid)).payload;
        if received == transaction.payload {
            log::info!(
                "Time: {} Received expected packet at router {} with payload: 0x{:016x}",
                context.time,
                router,
                received
            );
            Some(Verdict::Match {
                cycle: context.posedge_count,
                router,
                payload: received,
            })
        } else {
            log::error!(
                "Time: {} ERROR: Mismatched packet at router {}. Expected payload: 0x{:016x}, but received: 0x{:016x}",
                context.time,
                router,
                transaction.payload,
                received
            );
            Some(Verdict::Mismatch {
                cycle: context.posedge_count,
                router,
                expected: transaction.payload,
                received,
            })
        }
    }
}
