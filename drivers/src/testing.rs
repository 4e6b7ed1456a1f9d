// Licensed under the Apache-2.0 license

use crate::{Control, RegisterPort, Status, TrngReg};
use std::fmt::Write;
use tqv_emu_bus::testing::Log;

/// A RegisterPort that records every access and fakes just enough of the
/// peripheral to exercise the driver: READY rises a fixed number of cycles
/// after CALIBRATION or READ_REQUEST is raised.
pub struct FakePort {
    pub log: Log,
    pub regs: [u32; 8],

    /// Bits always reported in STATUS.
    pub status: u32,

    /// Absolute cycle from which READY reads as set.
    pub ready_at: Option<u64>,

    /// Cycles from a rising CALIBRATION or READ_REQUEST until READY.
    pub ready_delay: Option<u64>,

    /// Implemented bits of CALIBRATION_CYCLES.
    pub calibration_mask: u32,

    pub next_random: u32,
    cycles: u64,
}

impl FakePort {
    pub fn new() -> Self {
        Self {
            log: Log::new(),
            regs: [0; 8],
            status: 0,
            ready_at: None,
            ready_delay: None,
            calibration_mask: u32::MAX,
            next_random: 0x1234_5678,
            cycles: 0,
        }
    }

    /// A fake that completes calibration and reads after `delay` cycles.
    pub fn with_ready_delay(delay: u64) -> Self {
        Self {
            ready_delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn control(&self) -> Control {
        Control::from_bits_truncate(self.regs[TrngReg::Control.offset() as usize])
    }

    /// The log without STATUS polls and single-cycle advances.
    pub fn take_transactions(&self) -> String {
        self.log
            .take()
            .lines()
            .filter(|line| !line.starts_with("read(STATUS)") && *line != "advance(1)")
            .fold(String::new(), |mut acc, line| {
                acc.push_str(line);
                acc.push('\n');
                acc
            })
    }

    fn status_now(&self) -> u32 {
        let ready = match self.ready_at {
            Some(at) if self.cycles >= at => Status::READY.bits(),
            _ => 0,
        };
        self.status | ready
    }
}

impl RegisterPort for FakePort {
    fn read(&mut self, reg: TrngReg) -> u32 {
        let val = match reg {
            TrngReg::Status => self.status_now(),
            TrngReg::RandomNumber => {
                let val = self.next_random;
                self.next_random = self.next_random.wrapping_add(0x1111_1111);
                val
            }
            _ => self.regs[reg.offset() as usize],
        };
        writeln!(self.log.w(), "read({}) -> {val:#x}", reg.name()).unwrap();
        val
    }

    fn write(&mut self, reg: TrngReg, val: u32) {
        writeln!(self.log.w(), "write({}, {val:#x})", reg.name()).unwrap();
        match reg {
            TrngReg::Control => {
                let old = self.control();
                let new = Control::from_bits_truncate(val);
                let raised = new - old;
                if raised.intersects(Control::CALIBRATION | Control::READ_REQUEST) {
                    self.status &= !Status::READY.bits();
                    self.ready_at = self.ready_delay.map(|delay| self.cycles + delay);
                }
                if old.contains(Control::READ_REQUEST) && !new.contains(Control::READ_REQUEST) {
                    self.ready_at = None;
                }
                self.regs[reg.offset() as usize] = val;
            }
            TrngReg::CalibrationCycles => {
                self.regs[reg.offset() as usize] = val & self.calibration_mask;
            }
            _ => self.regs[reg.offset() as usize] = val,
        }
    }

    fn advance_cycles(&mut self, cycles: u64) {
        writeln!(self.log.w(), "advance({cycles})").unwrap();
        self.cycles += cycles;
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}
