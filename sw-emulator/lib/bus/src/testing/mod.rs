/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains fakes useful for testing code that drives a Bus.

--*/
mod fake_bus;
mod log;

pub use fake_bus::FakeBus;
pub use log::Log;
