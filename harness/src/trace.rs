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

use std::io;

use crate::model::DevicePorts;
use crate::Cycle;

/// Receives the device's signals once per simulation step.
///
/// Errors are returned to the driver, which stops the run; a sink is never
/// expected to recover on its own.
pub trait TraceSink {
    /// Declares the traced signals; called once before the first `dump`.
    fn open(&mut self, ports: &DevicePorts) -> io::Result<()>;

    /// Records the settled signal values of step `time`.
    fn dump(&mut self, time: Cycle, ports: &DevicePorts) -> io::Result<()>;

    /// Finishes the trace. Dropping a sink without closing it releases its
    /// resources too, but any final write error is lost.
    fn close(&mut self) -> io::Result<()>;
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn open(&mut self, _ports: &DevicePorts) -> io::Result<()> {
        Ok(())
    }

    fn dump(&mut self, _time: Cycle, _ports: &DevicePorts) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: TraceSink + ?Sized> TraceSink for Box<T> {
    fn open(&mut self, ports: &DevicePorts) -> io::Result<()> {
        (**self).open(ports)
    }

    fn dump(&mut self, time: Cycle, ports: &DevicePorts) -> io::Result<()> {
        (**self).dump(time, ports)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
