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

//! The device under test, seen through its top-level ports.

mod ideal_mesh;
mod loopback;

pub use ideal_mesh::IdealMesh;
pub use loopback::Loopback;

use crate::grid::GridSize;

/// Top-level signals of the network-on-chip.
///
/// The two buses use the flattened layout described in [`crate::codec`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DevicePorts {
    pub clk: bool,
    /// Asynchronous reset, active low.
    pub arst_n: bool,
    /// Network interface to router packets, one slot per router.
    pub ni_to_router: Vec<u32>,
    /// Router to network interface packets, same layout.
    pub router_to_ni: Vec<u32>,
}

impl DevicePorts {
    /// All signals start at zero, like a freshly constructed simulator.
    pub fn new(bus_words: usize) -> Self {
        DevicePorts {
            clk: false,
            arst_n: false,
            ni_to_router: vec![0; bus_words],
            router_to_ni: vec![0; bus_words],
        }
    }

    pub fn for_grid(grid: GridSize) -> Self {
        Self::new(grid.bus_words())
    }
}

/// A stepped hardware model.
///
/// `eval` is called once per half cycle after the inputs changed; it must
/// leave the outputs fully settled before returning.
pub trait DeviceModel {
    fn eval(&mut self, ports: &mut DevicePorts);
}

impl<M: DeviceModel + ?Sized> DeviceModel for Box<M> {
    fn eval(&mut self, ports: &mut DevicePorts) {
        (**self).eval(ports)
    }
}
