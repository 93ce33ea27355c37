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

use crate::model::DevicePorts;
use crate::Cycle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResetPhase {
    /// Before the reset window; the device runs from its power-on state.
    Init,
    /// Reset held active and the injection bus forced to zero.
    Resetting,
    /// Reset released.
    Running,
}

/// Drives the active-low reset on a fixed schedule.
///
/// Holds no state of its own: the phase is re-derived from the simulated
/// time on every step.
#[derive(Clone, Copy, Debug)]
pub struct ResetSequencer {
    start: Cycle,
    end: Cycle,
}

impl ResetSequencer {
    /// Reset is active for `start < time <= end`.
    pub fn new(start: Cycle, end: Cycle) -> Self {
        ResetSequencer { start, end }
    }

    pub fn phase(&self, time: Cycle) -> ResetPhase {
        if time <= self.start {
            ResetPhase::Init
        } else if time <= self.end {
            ResetPhase::Resetting
        } else {
            ResetPhase::Running
        }
    }

    /// True once the step right after reset release has passed. Traffic is
    /// only injected and checked from here on.
    pub fn settled(&self, time: Cycle) -> bool {
        time > self.end + 1
    }

    /// Sets `arst_n` for this step and, while in reset, zeroes the input bus.
    /// The clock is left alone.
    pub fn apply(&self, time: Cycle, ports: &mut DevicePorts) -> ResetPhase {
        let phase = self.phase(time);
        ports.arst_n = phase != ResetPhase::Resetting;
        if phase == ResetPhase::Resetting {
            for word in ports.ni_to_router.iter_mut() {
                *word = 0;
            }
        }
        phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_time() {
        let sequencer = ResetSequencer::new(2, 5);
        let phases: Vec<_> = (0..8).map(|t| sequencer.phase(t)).collect();
        use ResetPhase::*;
        assert_eq!(
            phases,
            vec![Init, Init, Init, Resetting, Resetting, Resetting, Running, Running]
        );
        let settled: Vec<_> = (0..9).filter(|&t| sequencer.settled(t)).collect();
        assert_eq!(settled, vec![7, 8]);
    }

    #[test]
    fn reset_window_clears_input_bus() {
        let sequencer = ResetSequencer::new(2, 5);
        let mut ports = DevicePorts::new(37);
        for time in 0..20 {
            for word in ports.ni_to_router.iter_mut() {
                *word = 0xFFFF_FFFF;
            }
            ports.router_to_ni[0] = 0x1234;
            ports.clk = time % 2 == 0;
            let clk = ports.clk;
            sequencer.apply(time, &mut ports);
            if time > 2 && time <= 5 {
                assert!(!ports.arst_n, "time {}", time);
                assert!(ports.ni_to_router.iter().all(|&w| w == 0));
            } else {
                assert!(ports.arst_n, "time {}", time);
                assert!(ports.ni_to_router.iter().all(|&w| w == 0xFFFF_FFFF));
            }
            // outputs and clock belong to others
            assert_eq!(ports.router_to_ni[0], 0x1234);
            assert_eq!(ports.clk, clk);
        }
    }
}
