/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the TinyQV Emulator Bus library.

--*/
mod bus;
mod clock;
mod register;
pub mod testing;

pub use crate::bus::{Bus, BusError};
pub use crate::clock::{ActionHandle, Clock, Timer};
pub use crate::register::{ReadOnlyRegister, ReadWriteRegister, Register, WriteOnlyRegister};
