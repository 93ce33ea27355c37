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

//! Packing packets into the device's flattened router buses.
//!
//! The device exposes one 73-bit packet slot per router, concatenated in
//! router-id order with no padding, and split into 32-bit words:
//! <pre>
//!   word:    |       0        |       1        |       2        | ...
//!   bits:    0               31 32            63 64            95
//!   slots:   [ router 0: 0..73                  ][ router 1: 73..146 ...
//! </pre>
//! Inside a slot the layout is `payload(69) | dest_row(2) | dest_col(2)`,
//! least significant field first. Only the low 64 payload bits are used.
//!
//! All functions take the router id as a precondition: an id with no slot in
//! the given bus is a caller bug and panics.

use std::ops::Range;

use bitvec::prelude::*;

use crate::grid::{GridSize, RouterAddress};

/// Width of one router's packet slot.
pub const PACKET_BITS: usize = 73;
/// Width of one element of the flattened bus.
pub const BUS_WORD_BITS: usize = 32;

const COORD_MASK: u128 = 0x3;
const ROW_SHIFT: u32 = 2;
const PAYLOAD_SHIFT: u32 = 4;
const SLOT_MASK: u128 = (1 << PACKET_BITS) - 1;

/// Number of bus words needed to hold one slot for each of `routers`.
pub fn bus_word_count(routers: usize) -> usize {
    (routers * PACKET_BITS + BUS_WORD_BITS - 1) / BUS_WORD_BITS
}

/// Location of a router's slot in the flattened bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotAddress {
    pub router_id: usize,
    pub word_index: usize,
    pub bit_offset: usize,
}

impl SlotAddress {
    pub fn of(router_id: usize) -> Self {
        let start_bit = router_id * PACKET_BITS;
        SlotAddress {
            router_id,
            word_index: start_bit / BUS_WORD_BITS,
            bit_offset: start_bit % BUS_WORD_BITS,
        }
    }

    pub fn bit_range(self) -> Range<usize> {
        let start = self.word_index * BUS_WORD_BITS + self.bit_offset;
        start..start + PACKET_BITS
    }

    /// Number of consecutive words the slot touches: 3 or 4.
    pub fn word_span(self) -> usize {
        (self.bit_offset + PACKET_BITS + BUS_WORD_BITS - 1) / BUS_WORD_BITS
    }

    fn assert_fits(self, bus_len: usize) {
        assert!(
            self.word_index + self.word_span() <= bus_len,
            "router {} has no slot in a bus of {} words",
            self.router_id,
            bus_len
        );
    }
}

/// Where `router_id`'s slot starts in the bus.
pub fn slot_address(router_id: usize) -> SlotAddress {
    SlotAddress::of(router_id)
}

/// A packet as seen by the network: where it goes and what it carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Packet {
    pub destination: RouterAddress,
    pub payload: u64,
}

impl Packet {
    pub fn new(destination: RouterAddress, payload: u64) -> Self {
        Packet {
            destination,
            payload,
        }
    }

    /// The 73-bit on-wire value. Coordinates are truncated to their 2-bit
    /// fields and the upper 5 payload bits are zero.
    pub fn to_bits(&self) -> u128 {
        (self.destination.col as u128 & COORD_MASK)
            | ((self.destination.row as u128 & COORD_MASK) << ROW_SHIFT)
            | ((self.payload as u128) << PAYLOAD_SHIFT)
    }

    /// Inverse of `to_bits`; payload bits above 64 are dropped.
    pub fn from_bits(bits: u128) -> Self {
        Packet {
            destination: RouterAddress {
                row: ((bits >> ROW_SHIFT) & COORD_MASK) as usize,
                col: (bits & COORD_MASK) as usize,
            },
            payload: (bits >> PAYLOAD_SHIFT) as u64,
        }
    }

    pub fn destination_id(&self, grid: GridSize) -> usize {
        self.destination.id(grid)
    }
}

/// ORs a raw 73-bit slot value into the bus. Bits outside the slot are left
/// alone; bits inside are merged, so the slot must be zero beforehand.
pub fn write_slot(bus: &mut [u32], router_id: usize, bits: u128) {
    let slot = slot_address(router_id);
    slot.assert_fits(bus.len());
    let field = &mut bus.view_bits_mut::<Lsb0>()[slot.bit_range()];
    let merged = field.load_le::<u128>() | (bits & SLOT_MASK);
    field.store_le(merged);
}

/// Reads the raw 73-bit slot value of a router.
pub fn read_slot(bus: &[u32], router_id: usize) -> u128 {
    let slot = slot_address(router_id);
    slot.assert_fits(bus.len());
    bus.view_bits::<Lsb0>()[slot.bit_range()].load_le::<u128>()
}

/// Zeroes exactly the bits of a router's slot.
pub fn clear_slot(bus: &mut [u32], router_id: usize) {
    let slot = slot_address(router_id);
    slot.assert_fits(bus.len());
    bus.view_bits_mut::<Lsb0>()[slot.bit_range()].fill(false);
}

/// Merges `packet` into the slot of `router_id`.
pub fn encode(bus: &mut [u32], router_id: usize, packet: &Packet) {
    write_slot(bus, router_id, packet.to_bits());
}

pub fn decode(bus: &[u32], router_id: usize) -> Packet {
    Packet::from_bits(read_slot(bus, router_id))
}
