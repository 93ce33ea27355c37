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

use crate::codec::PACKET_BITS;
use crate::grid::GridSize;
use crate::model::DevicePorts;
use crate::trace::TraceSink;
use crate::Cycle;
use bitvec::prelude::*;
use chrono;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use vcd;

pub const DEFAULT_TOP_MODULE: &str = "noc";
const DEFAULT_VCD_HEADER: &str = "noc harness VCD";

const CLK: &str = "i_clk";
const ARST_N: &str = "i_arst_n";
const NI_TO_ROUTER: &str = "i_niToRouter";
const ROUTER_TO_NI: &str = "o_routerToNi";

type SignalBits = BitVec<u32, Lsb0>;

/// Writes the device's top-level ports as a Value Change Dump.
///
/// Only signals whose value differs from the previous dump are written.
pub struct VcdTrace {
    writer: Option<vcd::Writer<fs::File>>,
    path: PathBuf,
    /// Valid bits of each bus; the last word is only partly used.
    bus_bits: usize,
    id_map: HashMap<&'static str, vcd::IdCode>,
    last_value_map: HashMap<vcd::IdCode, SignalBits>,
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "VCD trace is already closed")
}

impl VcdTrace {
    pub fn create(dst: &Path, grid: GridSize) -> io::Result<Self> {
        let dst_file = fs::File::create(dst)?;
        log::debug!("VCD file: {}", dst.display());
        Ok(Self {
            writer: Some(vcd::Writer::new(dst_file)),
            path: dst.to_path_buf(),
            bus_bits: grid.routers() * PACKET_BITS,
            id_map: HashMap::new(),
            last_value_map: HashMap::new(),
        })
    }

    fn writer(&mut self) -> io::Result<&mut vcd::Writer<fs::File>> {
        self.writer.as_mut().ok_or_else(closed_error)
    }

    fn add_wire(&mut self, width: usize, reference: &'static str) -> io::Result<()> {
        let var_id = self
            .writer()?
            .add_var(vcd::VarType::Wire, width as u32, reference, None)?;
        if self.id_map.insert(reference, var_id).is_some() {
            log::warn!("Signal {} was redefined for VCD dumps.", reference);
        }
        Ok(())
    }

    fn record_change(&mut self, name: &'static str, bits: SignalBits) -> io::Result<()> {
        let id_code = match self.id_map.get(name) {
            Some(id_code) => *id_code,
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("signal {} was not declared for VCD dumps", name),
                ))
            }
        };
        if self.last_value_map.get(&id_code) == Some(&bits) {
            return Ok(());
        }
        if cfg!(feature = "trace-echo-vcd-signal-changes") {
            log::trace!("VCD changing {}.{}", DEFAULT_TOP_MODULE, name);
        }
        // VCD vectors are written most significant bit first.
        let values = bits.iter().rev().map(|b| (*b).into()).collect::<Vec<vcd::Value>>();
        self.writer()?.change_vector(id_code, values.as_slice())?;
        self.last_value_map.insert(id_code, bits);
        Ok(())
    }

    fn bus_value(&self, bus: &[u32]) -> SignalBits {
        bus.view_bits::<Lsb0>()[..self.bus_bits].to_bitvec()
    }
}

fn bit_value(bit: bool) -> SignalBits {
    let mut bits = SignalBits::new();
    bits.push(bit);
    bits
}

impl TraceSink for VcdTrace {
    fn open(&mut self, _ports: &DevicePorts) -> io::Result<()> {
        {
            let writer = self.writer()?;
            writer.comment(DEFAULT_VCD_HEADER)?;
            writer.date(chrono::Utc::now().to_string().as_str())?;
            // one time unit per half clock cycle
            writer.timescale(1, vcd::TimescaleUnit::NS)?;
            writer.add_module(DEFAULT_TOP_MODULE)?;
        }
        let bus_bits = self.bus_bits;
        self.add_wire(1, CLK)?;
        self.add_wire(1, ARST_N)?;
        self.add_wire(bus_bits, NI_TO_ROUTER)?;
        self.add_wire(bus_bits, ROUTER_TO_NI)?;
        let writer = self.writer()?;
        writer.upscope()?;
        writer.enddefinitions()
    }

    fn dump(&mut self, time: Cycle, ports: &DevicePorts) -> io::Result<()> {
        self.writer()?.timestamp(time)?;
        self.record_change(CLK, bit_value(ports.clk))?;
        self.record_change(ARST_N, bit_value(ports.arst_n))?;
        let inputs = self.bus_value(&ports.ni_to_router);
        self.record_change(NI_TO_ROUTER, inputs)?;
        let outputs = self.bus_value(&ports.router_to_ni);
        self.record_change(ROUTER_TO_NI, outputs)
    }

    fn close(&mut self) -> io::Result<()> {
        let writer = self.writer.take().ok_or_else(closed_error)?;
        drop(writer);
        log::debug!("VCD file {} closed", self.path.display());
        Ok(())
    }
}

impl Drop for VcdTrace {
    fn drop(&mut self) {
        if self.writer.is_some() {
            log::debug!("VCD file {} released without close", self.path.display());
        }
    }
}
