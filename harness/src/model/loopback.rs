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
use crate::model::{DeviceModel, DevicePorts};

/// Combinational stub: each wired router's output slot mirrors another
/// router's input slot. Unwired outputs read as zero.
#[derive(Clone, Debug)]
pub struct Loopback {
    grid: GridSize,
    /// (input router id, output router id)
    wiring: Vec<(usize, usize)>,
    /// XORed into every forwarded payload.
    corruption: u64,
}

impl Loopback {
    pub fn new(grid: GridSize) -> Self {
        Loopback {
            grid,
            wiring: Vec::new(),
            corruption: 0,
        }
    }

    /// Makes `to`'s output equal `from`'s input.
    pub fn wire(mut self, from: RouterAddress, to: RouterAddress) -> Self {
        assert!(
            self.grid.contains(from) && self.grid.contains(to),
            "loopback wire {} -> {} leaves the grid",
            from,
            to
        );
        self.wiring.push((from.id(self.grid), to.id(self.grid)));
        self
    }

    pub fn with_corruption(mut self, mask: u64) -> Self {
        self.corruption = mask;
        self
    }
}

impl DeviceModel for Loopback {
    fn eval(&mut self, ports: &mut DevicePorts) {
        for word in ports.router_to_ni.iter_mut() {
            *word = 0;
        }
        if !ports.arst_n {
            return;
        }
        for &(from, to) in self.wiring.iter() {
            let mut packet = codec::decode(&ports.ni_to_router, from);
            packet.payload ^= self.corruption;
            codec::clear_slot(&mut ports.router_to_ni, to);
            codec::encode(&mut ports.router_to_ni, to, &packet);
        }
    }
}
