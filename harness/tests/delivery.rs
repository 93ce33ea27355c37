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

use harness::*;

/// Replays a fixed list of transfers, starting over when it runs out.
struct Scripted {
    transfers: Vec<Transfer>,
    next: usize,
}

impl Scripted {
    fn new(transfers: Vec<Transfer>) -> Self {
        Scripted { transfers, next: 0 }
    }
}

impl TrafficSource for Scripted {
    fn next_transfer(&mut self, _grid: GridSize) -> Transfer {
        let transfer = self.transfers[self.next % self.transfers.len()];
        self.next += 1;
        transfer
    }
}

const PAYLOAD: u64 = 0xDEAD_BEEF_CAFE_BABE;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(max_sim_time: Cycle) -> HarnessConfig {
    HarnessConfig {
        max_sim_time,
        seed: Some(0),
        vcd_path: None,
        ..Default::default()
    }
}

/// Edges 10 and 20 send warm-up packets along the same wire; edge 30 sends
/// the packet under test.
fn scenario() -> Scripted {
    let from = RouterAddress::new(0, 0);
    let to = RouterAddress::new(1, 2);
    Scripted::new(vec![
        Transfer {
            source: from,
            destination: to,
            payload: 1,
        },
        Transfer {
            source: from,
            destination: to,
            payload: 2,
        },
        Transfer {
            source: from,
            destination: to,
            payload: PAYLOAD,
        },
    ])
}

fn loopback(grid: GridSize) -> Loopback {
    Loopback::new(grid).wire(RouterAddress::new(0, 0), RouterAddress::new(1, 2))
}

#[test]
fn loopback_delivers_expected_payload() {
    init_logger();
    let config = config(80);
    let grid = config.grid().unwrap();
    let summary = Simulation::new(&config, loopback(grid), NullTrace, scenario())
        .unwrap()
        .run()
        .unwrap();

    let sent: Vec<Cycle> = summary.injected.iter().map(|t| t.sent_cycle).collect();
    assert_eq!(sent, vec![10, 20, 30, 40]);
    assert_eq!(summary.injected[2].payload, PAYLOAD);
    assert_eq!(summary.mismatches(), 0);
    assert!(summary.verdicts.contains(&Verdict::Match {
        cycle: 38,
        router: RouterAddress::new(1, 2),
        payload: PAYLOAD,
    }));
}

#[test]
fn corrupted_payload_is_reported_and_run_continues() {
    init_logger();
    let config = config(80);
    let grid = config.grid().unwrap();
    let model = loopback(grid).with_corruption(1 << 33);
    let summary = Simulation::new(&config, model, NullTrace, scenario())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(summary.steps, 80);
    assert_eq!(summary.verdicts.len(), 3);
    assert_eq!(summary.matches(), 0);
    assert_eq!(
        summary.verdicts[2],
        Verdict::Mismatch {
            cycle: 38,
            router: RouterAddress::new(1, 2),
            expected: PAYLOAD,
            received: PAYLOAD ^ (1 << 33),
        }
    );
}

#[test]
fn checks_run_a_fixed_latency_after_each_injection() {
    init_logger();
    for width in 1..=4 {
        let config = HarnessConfig {
            grid_width: width,
            ..config(1000)
        };
        let grid = config.grid().unwrap();
        let summary = Simulation::new(
            &config,
            IdealMesh::new(grid),
            NullTrace,
            UniformRandom::from_seed(width as u64),
        )
        .unwrap()
        .run()
        .unwrap();
        let latency = 2 * width as Cycle;
        let expected: Vec<Cycle> = summary
            .injected
            .iter()
            .map(|t| t.sent_cycle + latency)
            .filter(|&edge| edge <= summary.posedges)
            .collect();
        let checked: Vec<Cycle> = summary.verdicts.iter().map(|v| v.cycle()).collect();
        assert_eq!(checked, expected, "grid width {}", width);
        assert_eq!(summary.mismatches(), 0, "grid width {}", width);
    }
}

#[test]
fn later_injection_preempts_pending_check() {
    init_logger();
    // a new packet every 4 edges, each check due 8 edges after its packet
    let config = HarnessConfig {
        injection_interval: 4,
        ..config(400)
    };
    let grid = config.grid().unwrap();
    let summary = Simulation::new(
        &config,
        IdealMesh::new(grid),
        NullTrace,
        UniformRandom::from_seed(9),
    )
    .unwrap()
    .run()
    .unwrap();
    // edges 8, 12, ..., 200
    assert_eq!(summary.injected.len(), 49);
    assert!(summary.verdicts.is_empty());
}

#[test]
fn traffic_waits_for_the_step_after_reset_release() {
    init_logger();
    // reset is released at time 6, which is also positive edge 4
    let config = HarnessConfig {
        injection_interval: 2,
        ..config(20)
    };
    let grid = config.grid().unwrap();
    let summary = Simulation::new(
        &config,
        IdealMesh::new(grid),
        NullTrace,
        UniformRandom::from_seed(3),
    )
    .unwrap()
    .run()
    .unwrap();
    let sent: Vec<Cycle> = summary.injected.iter().map(|t| t.sent_cycle).collect();
    assert_eq!(sent, vec![6, 8, 10]);
}

#[test]
fn same_seed_reproduces_traffic() {
    init_logger();
    let run = |seed: u64| {
        let config = config(600);
        let grid = config.grid().unwrap();
        Simulation::new(
            &config,
            IdealMesh::new(grid),
            NullTrace,
            UniformRandom::from_seed(seed),
        )
        .unwrap()
        .run()
        .unwrap()
    };
    let first = run(17);
    assert_eq!(first, run(17));
    assert_ne!(first.injected, run(18).injected);
}
