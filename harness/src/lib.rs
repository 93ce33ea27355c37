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

//! Verification harness for a grid network-on-chip device model.
//!
//! The harness steps a device in half clock cycles, injects random packets
//! into the device's flattened input bus and checks that each packet shows
//! up on the output bus of its destination router a fixed number of cycles
//! later.

pub mod codec;
mod config;
mod error;
mod grid;
pub mod model;
mod sequencer;
mod sim;
mod trace;
mod traffic;
mod vcd;
mod verifier;

// Public types
// type to use for positive-edge counts and simulated time
pub type Cycle = u64;

pub use crate::codec::{slot_address, Packet, SlotAddress, BUS_WORD_BITS, PACKET_BITS};
pub use crate::config::HarnessConfig;
pub use crate::error::Error;
pub use crate::grid::{GridSize, RouterAddress};
pub use crate::model::{DeviceModel, DevicePorts, IdealMesh, Loopback};
pub use crate::sequencer::{ResetPhase, ResetSequencer};
pub use crate::sim::{RunSummary, Simulation, SimulationContext};
pub use crate::trace::{NullTrace, TraceSink};
pub use crate::traffic::{
    InFlightTransaction, TrafficGenerator, TrafficSource, Transfer, UniformRandom,
};
pub use crate::vcd::VcdTrace;
pub use crate::verifier::{DeliveryVerifier, Verdict};
