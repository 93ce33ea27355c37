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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::Error;

/// Widest grid whose coordinates still fit the packet's 2-bit fields.
pub const MAX_GRID_WIDTH: usize = 4;

/// A square grid of routers, `width` routers along each dimension.
///
/// For example a 4x4 grid looks like this, with linear ids in row-major
/// order:
/// <pre>
///  0 ---  1 ---  2 ---  3
///  |      |      |      |
///  4 ---  5 ---  6 ---  7
///  |      |      |      |
///  8 ---  9 --- 10 --- 11
///  |      |      |      |
/// 12 --- 13 --- 14 --- 15
/// </pre>
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct GridSize {
    pub width: usize,
}

impl GridSize {
    pub fn new(width: usize) -> Result<Self, Error> {
        if width == 0 || width > MAX_GRID_WIDTH {
            return Err(Error::InvalidGridWidth(width));
        }
        Ok(GridSize { width })
    }

    pub fn routers(self) -> usize {
        self.width * self.width
    }

    /// Number of 32-bit words in each of the device's flattened buses.
    pub fn bus_words(self) -> usize {
        codec::bus_word_count(self.routers())
    }

    pub fn contains(self, address: RouterAddress) -> bool {
        address.row < self.width && address.col < self.width
    }

    pub fn iter_routers(self) -> impl Iterator<Item = RouterAddress> {
        (0..self.routers()).map(move |id| RouterAddress::from_id(id, self))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize {
            width: MAX_GRID_WIDTH,
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct RouterAddress {
    pub row: usize,
    pub col: usize,
}

impl RouterAddress {
    pub fn new(row: usize, col: usize) -> Self {
        RouterAddress { row, col }
    }

    /// Linear id of the router, which is also the index of its bus slot.
    pub fn id(self, grid: GridSize) -> usize {
        self.row * grid.width + self.col
    }

    pub fn from_id(id: usize, grid: GridSize) -> Self {
        RouterAddress {
            row: id / grid.width,
            col: id % grid.width,
        }
    }

    /// Manhattan distance, i.e. the hop count of dimension-ordered routing on
    /// a mesh without wrap-around links.
    pub fn hops(self, to: RouterAddress) -> usize {
        let dist = |a: usize, b: usize| if a > b { a - b } else { b - a };
        dist(self.row, to.row) + dist(self.col, to.col)
    }
}

impl fmt::Display for RouterAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl fmt::Debug for RouterAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_ids_are_row_major() {
        let grid = GridSize::new(4).unwrap();
        assert_eq!(RouterAddress::new(0, 0).id(grid), 0);
        assert_eq!(RouterAddress::new(1, 2).id(grid), 6);
        assert_eq!(RouterAddress::new(3, 3).id(grid), 15);
        for id in 0..grid.routers() {
            assert_eq!(RouterAddress::from_id(id, grid).id(grid), id);
        }
        assert_eq!(grid.iter_routers().count(), 16);
    }

    #[test]
    fn grid_width_is_bounded_by_coordinate_bits() {
        assert_eq!(GridSize::new(0), Err(Error::InvalidGridWidth(0)));
        assert_eq!(GridSize::new(5), Err(Error::InvalidGridWidth(5)));
        assert_eq!(GridSize::new(2).unwrap().routers(), 4);
        assert_eq!(GridSize::default().bus_words(), 37);
    }

    #[test]
    fn hop_count() {
        let a = RouterAddress::new(0, 0);
        assert_eq!(a.hops(a), 0);
        assert_eq!(a.hops(RouterAddress::new(1, 2)), 3);
        assert_eq!(RouterAddress::new(3, 0).hops(RouterAddress::new(0, 3)), 6);
    }

    #[test]
    fn display_uses_parenthesized_coordinates() {
        assert_eq!(RouterAddress::new(1, 2).to_string(), "(1,2)");
    }
}
