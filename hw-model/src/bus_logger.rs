// Licensed under the Apache-2.0 license

use std::io::Write;

use tqv_emu_bus::{Bus, BusError};
use tqv_emu_types::{RvAddr, RvData, RvSize};

use crate::OutputSink;

/// Forwards to `bus` and, when `log` is set, records every transaction.
pub struct BusLogger<TBus: Bus> {
    pub bus: TBus,
    pub log: Option<OutputSink>,
}
impl<TBus: Bus> BusLogger<TBus> {
    pub fn new(bus: TBus) -> Self {
        Self { bus, log: None }
    }
    pub fn log_read(
        &mut self,
        bus_name: &str,
        size: RvSize,
        addr: RvAddr,
        result: Result<RvData, BusError>,
    ) {
        if let Some(log) = &mut self.log {
            let size = usize::from(size);
            // Trace output is best effort.
            let _ = match result {
                Ok(val) => writeln!(log, "{bus_name}  read{size} *0x{addr:08x} -> 0x{val:x}"),
                Err(e) => writeln!(log, "{bus_name}  read{size} *0x{addr:08x} ***FAULT {e:?}"),
            };
        }
    }
    pub fn log_write(
        &mut self,
        bus_name: &str,
        size: RvSize,
        addr: RvAddr,
        val: RvData,
        result: Result<(), BusError>,
    ) {
        if let Some(log) = &mut self.log {
            let size = usize::from(size);
            let _ = match result {
                Ok(()) => writeln!(log, "{bus_name} write{size} *0x{addr:08x} <- 0x{val:x}"),
                Err(e) => writeln!(
                    log,
                    "{bus_name} write{size} *0x{addr:08x} <- 0x{val:x} ***FAULT {e:?}"
                ),
            };
        }
    }
}
impl<TBus: Bus> Bus for BusLogger<TBus> {
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        let result = self.bus.read(size, addr);
        self.log_read("TQV", size, addr, result);
        result
    }

    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        let result = self.bus.write(size, addr, val);
        self.log_write("TQV", size, addr, val, result);
        result
    }
    fn poll(&mut self) {
        self.bus.poll();
    }
    fn warm_reset(&mut self) {
        self.bus.warm_reset();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Sink;

    use tqv_emu_bus::testing::FakeBus;

    use super::*;
    use crate::Output;

    #[test]
    fn test_log_transactions() {
        let mut out = Output::new(Sink::default());
        let mut bus = BusLogger::new(FakeBus::new());
        bus.log = Some(out.sink().clone());

        bus.bus.read_result = Ok(0x2);
        assert_eq!(bus.read(RvSize::Word, 0x0800_0340), Ok(0x2));
        bus.write(RvSize::Word, 0x0800_0348, 0x800).unwrap();
        bus.bus.write_result = Err(BusError::StoreAccessFault);
        assert_eq!(
            bus.write(RvSize::Word, 0x0800_0344, 1),
            Err(BusError::StoreAccessFault)
        );

        assert_eq!(
            out.take(usize::MAX),
            "TQV  read4 *0x08000340 -> 0x2\n\
             TQV write4 *0x08000348 <- 0x800\n\
             TQV write4 *0x08000344 <- 0x1 ***FAULT StoreAccessFault\n"
        );
    }

    #[test]
    fn test_no_log() {
        let mut bus = BusLogger::new(FakeBus::new());
        bus.read(RvSize::Word, 0).unwrap();
        bus.poll();
        assert_eq!(bus.bus.log.take(), "read(RvSize::Word, 0x0)\npoll()\n");
    }
}
