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

use std::mem;

use crate::codec::{self, Packet};
use crate::grid::{GridSize, RouterAddress};
use crate::model::{DeviceModel, DevicePorts};
use crate::Cycle;

#[derive(Clone, Copy, Debug)]
struct Delivery {
    due: Cycle,
    source: RouterAddress,
    destination: usize,
    bits: u128,
}

/// Behavioural reference for a correct mesh.
///
/// A packet is picked up on the first positive edge after its input slot
/// changes and appears in the destination's output slot `hops + 1` edges
/// later, where it stays until the next delivery to that router. An all-zero
/// input slot is idle. No contention is modelled.
#[derive(Debug)]
pub struct IdealMesh {
    grid: GridSize,
    last_clk: bool,
    posedges: Cycle,
    /// Input slots as sampled on the previous positive edge.
    sampled: Vec<u128>,
    in_flight: Vec<Delivery>,
}

impl IdealMesh {
    pub fn new(grid: GridSize) -> Self {
        IdealMesh {
            grid,
            last_clk: false,
            posedges: 0,
            sampled: vec![0; grid.routers()],
            in_flight: Vec::new(),
        }
    }

    pub fn packets_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn reset(&mut self, ports: &mut DevicePorts) {
        for slot in self.sampled.iter_mut() {
            *slot = 0;
        }
        self.in_flight.clear();
        for word in ports.router_to_ni.iter_mut() {
            *word = 0;
        }
    }

    fn sample_inputs(&mut self, ports: &DevicePorts) {
        for id in 0..self.grid.routers() {
            let bits = codec::read_slot(&ports.ni_to_router, id);
            if bits == self.sampled[id] {
                continue;
            }
            self.sampled[id] = bits;
            if bits == 0 {
                continue;
            }
            let source = RouterAddress::from_id(id, self.grid);
            let packet = Packet::from_bits(bits);
            if !self.grid.contains(packet.destination) {
                log::warn!(
                    "ideal mesh: dropping packet from {} to {} outside the grid",
                    source,
                    packet.destination
                );
                continue;
            }
            self.in_flight.push(Delivery {
                due: self.posedges + source.hops(packet.destination) as Cycle + 1,
                source,
                destination: packet.destination_id(self.grid),
                bits,
            });
        }
    }

    fn deliver(&mut self, ports: &mut DevicePorts) {
        let now = self.posedges;
        let (due, pending): (Vec<_>, Vec<_>) = mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|delivery| delivery.due <= now);
        self.in_flight = pending;
        for delivery in due {
            log::trace!(
                "ideal mesh: edge {} delivered packet from {} at router {}",
                now,
                delivery.source,
                delivery.destination
            );
            codec::clear_slot(&mut ports.router_to_ni, delivery.destination);
            codec::write_slot(&mut ports.router_to_ni, delivery.destination, delivery.bits);
        }
    }
}

impl DeviceModel for IdealMesh {
    fn eval(&mut self, ports: &mut DevicePorts) {
        let posedge = ports.clk && !self.last_clk;
        self.last_clk = ports.clk;
        if !ports.arst_n {
            self.reset(ports);
            return;
        }
        if !posedge {
            return;
        }
        self.posedges += 1;
        self.sample_inputs(ports);
        self.deliver(ports);
    }
}
