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

use crate::Cycle;

/// Configuration problems detected before a simulation starts.
///
/// Codec contract violations (bad router id, short bus) are not represented
/// here: they are programming errors and panic at the call site.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    InvalidGridWidth(usize),
    InvalidInjectionInterval,
    InvalidResetWindow { start: Cycle, end: Cycle },
    InvalidSimTime(Cycle),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidGridWidth(width) => {
                write!(
                    f,
                    "ERROR: Invalid grid width {}; destination coordinates are 2 bits wide, width must be in 1..=4",
                    width
                )
            }
            Self::InvalidResetWindow { start, end } => {
                write!(
                    f,
                    "ERROR: Invalid reset window ({}, {}]; start must be before end",
                    start, end
                )
            }
            Self::InvalidSimTime(time) => {
                write!(
                    f,
                    "ERROR: Simulation time {} does not extend past the reset window",
                    time
                )
            }
            _ => write!(f, "{:?}", self),
        }
    }
}

// Allows `anyhow::Result` to carry configuration errors up to the binary.
impl std::error::Error for Error {}
